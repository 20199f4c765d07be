pub mod paths;

pub use paths::PathResolver;

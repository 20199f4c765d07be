//! Progress sinks that forward events outside the process log.
//!
//! Both sinks implement [`ProgressSink`](crate::pipeline::ProgressSink) and can be
//! handed to the scheduler in place of the default log sink.

pub mod json_lines;
pub mod progress;

pub use json_lines::JsonLinesSink;
pub use progress::BroadcastSink;

//! Shared test utilities for cardsift integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated runs over temporary source/destination directories
//! - `RecordingSink` for asserting on progress events
//! - Sample line generators

pub mod harness;

pub use harness::{sample_file, RecordingSink, TestHarness, MASTERCARD, VISA};

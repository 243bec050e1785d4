//! Compass - semantic compass ratings for time-stamped text
//!
//! Places a word on a two-axis "compass" by asking a reasoning backend to
//! invent the axes, then rating a corpus of short posts window by window.

pub mod aggregator;
pub mod backend;
pub mod chunker;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod records;
pub mod segmenter;
pub mod server;
pub mod service;
pub mod session;

pub use error::{CompassError, Result};
pub use service::Compass;

//! Proxy Probe - SOCKS proxy validator
//!
//! Fetches a target URL through every SOCKS proxy in a list, a bounded
//! number at a time, and appends each successful result to an output file.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod proxy;
pub mod runner;
pub mod sink;

pub use config::RunConfig;
pub use dispatcher::{DispatchPhase, DispatchSummary, Dispatcher};
pub use error::{ConfigError, FormatIssue, ParseError};
pub use proxy::*;
pub use sink::ResultSink;

/// Application result type
pub type Result<T> = anyhow::Result<T>;

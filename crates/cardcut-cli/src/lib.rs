//! Cardcut CLI library.
//!
//! Batch front end for the extraction engine: configuration loading, input
//! discovery, card sinks, and report formatting.

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod sink;

pub use batch::{collect_inputs, BatchItem, BatchRunner, DocumentReport, DocumentStatus};
pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
pub use sink::{DirectorySink, HttpSink};

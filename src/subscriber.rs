//! Tracing subscriber setup for the CLI.

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::sync::Mutex;

use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingConfig};

type Filtered = Layered<EnvFilter, Registry>;

/// Initialize the global tracing subscriber from configuration.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| LoggingError::InvalidFilter(e.to_string()))?;

    let (writer, is_terminal) = make_writer(&config.output)?;
    let ansi = config.color && is_terminal;

    let layer: Box<dyn Layer<Filtered> + Send + Sync> = match (config.format, config.timestamps) {
        (LogFormat::Text, true) => fmt::layer()
            .with_ansi(ansi)
            .with_target(config.target)
            .with_span_events(FmtSpan::NONE)
            .with_writer(writer)
            .boxed(),
        (LogFormat::Text, false) => fmt::layer()
            .with_ansi(ansi)
            .with_target(config.target)
            .with_span_events(FmtSpan::NONE)
            .with_writer(writer)
            .without_time()
            .boxed(),
        (LogFormat::Json, true) => fmt::layer()
            .json()
            .with_target(config.target)
            .with_span_events(FmtSpan::NONE)
            .with_writer(writer)
            .boxed(),
        (LogFormat::Json, false) => fmt::layer()
            .json()
            .with_target(config.target)
            .with_span_events(FmtSpan::NONE)
            .with_writer(writer)
            .without_time()
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))
}

fn make_writer(output: &str) -> Result<(BoxMakeWriter, bool), LoggingError> {
    match output {
        "stdout" => Ok((BoxMakeWriter::new(io::stdout), io::stdout().is_terminal())),
        "stderr" => Ok((BoxMakeWriter::new(io::stderr), io::stderr().is_terminal())),
        path => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| LoggingError::FileOpen(path.to_string(), e))?;
            Ok((BoxMakeWriter::new(Mutex::new(file)), false))
        }
    }
}

/// Errors from subscriber setup.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Failed to open log file '{0}': {1}")]
    FileOpen(String, #[source] io::Error),

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

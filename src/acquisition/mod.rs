//! Telemetry acquisition
//!
//! Turns line-oriented injector telemetry (JSON lines or CSV) into
//! `TelemetrySample`s for the fatigue service.

mod telemetry_source;

pub use telemetry_source::{
    parse_csv_line, parse_json_line, CsvTelemetrySource, JsonLinesSource, SampleEvent,
    TelemetrySource,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

//! Line-based telemetry sources
//!
//! Two formats are accepted:
//!
//! - JSON lines: one `TelemetrySample` object per line
//! - CSV: `pressure_psi,tension_lbf[,temperature_f[,direction]]`, with an
//!   optional header row starting with `pressure`
//!
//! A bad line never ends the stream. It surfaces as `SampleEvent::Malformed`
//! and the caller decides whether to log and move on.

use std::io::BufRead;

use tracing::debug;

use super::AcquisitionError;
use crate::config::defaults;
use crate::types::{TelemetrySample, TravelDirection};

/// One step of a telemetry stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleEvent {
    Sample(TelemetrySample),
    Malformed { line: usize, reason: String },
    Eof,
}

/// Pull-based source of telemetry samples.
pub trait TelemetrySource: Send {
    /// Next sample, a malformed-line marker, or `Eof`. Only read failures
    /// are returned as errors.
    fn next_event(&mut self) -> Result<SampleEvent, AcquisitionError>;

    fn source_name(&self) -> &str;
}

// ============================================================================
// Line parsers
// ============================================================================

/// Parse one CSV row. Blank lines and the header return `Ok(None)`.
///
/// An empty direction column leaves the direction unset; the accumulator
/// then rejects the sample as invalid telemetry rather than guessing.
pub fn parse_csv_line(
    line: &str,
    line_no: usize,
) -> Result<Option<TelemetrySample>, AcquisitionError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    if line.to_ascii_lowercase().starts_with("pressure") {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 2 || fields.len() > 4 {
        return Err(AcquisitionError::Parse {
            line: line_no,
            reason: format!("expected 2 to 4 columns, found {}", fields.len()),
        });
    }

    let parse_f64 = |idx: usize, name: &str| -> Result<f64, AcquisitionError> {
        fields[idx]
            .parse::<f64>()
            .map_err(|e| AcquisitionError::Parse {
                line: line_no,
                reason: format!("{name}: {e}"),
            })
    };

    let pressure_psi = parse_f64(0, "pressure_psi")?;
    let tension_lbf = parse_f64(1, "tension_lbf")?;
    let temperature_f = match fields.get(2) {
        Some(raw) if !raw.is_empty() => parse_f64(2, "temperature_f")?,
        _ => defaults::DEFAULT_TEMPERATURE_F,
    };
    let direction = match fields.get(3) {
        Some(raw) if !raw.is_empty() => Some(raw.parse::<TravelDirection>().map_err(|e| {
            AcquisitionError::Parse {
                line: line_no,
                reason: e.to_string(),
            }
        })?),
        _ => None,
    };

    Ok(Some(TelemetrySample {
        pressure_psi,
        tension_lbf,
        temperature_f,
        direction,
        job_id: None,
        timestamp: None,
    }))
}

/// Parse one JSON line. Blank lines return `Ok(None)`.
pub fn parse_json_line(
    line: &str,
    line_no: usize,
) -> Result<Option<TelemetrySample>, AcquisitionError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| AcquisitionError::Parse {
            line: line_no,
            reason: e.to_string(),
        })
}

type LineParser = fn(&str, usize) -> Result<Option<TelemetrySample>, AcquisitionError>;

/// Shared read loop: skips lines the parser ignores, reports parse failures
/// as `Malformed` and keeps counting lines.
fn next_from_lines<R: BufRead>(
    reader: &mut R,
    buf: &mut String,
    line_no: &mut usize,
    parse: LineParser,
) -> Result<SampleEvent, AcquisitionError> {
    loop {
        buf.clear();
        if reader.read_line(buf)? == 0 {
            return Ok(SampleEvent::Eof);
        }
        *line_no += 1;
        match parse(buf, *line_no) {
            Ok(Some(sample)) => return Ok(SampleEvent::Sample(sample)),
            Ok(None) => {}
            Err(AcquisitionError::Parse { line, reason }) => {
                debug!(line, %reason, "Malformed telemetry line");
                return Ok(SampleEvent::Malformed { line, reason });
            }
            Err(e) => return Err(e),
        }
    }
}

// ============================================================================
// Sources
// ============================================================================

/// JSON-lines telemetry over any buffered reader (stdin, file, pipe).
pub struct JsonLinesSource<R> {
    reader: R,
    name: String,
    buf: String,
    line_no: usize,
}

impl<R: BufRead + Send> JsonLinesSource<R> {
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: name.into(),
            buf: String::new(),
            line_no: 0,
        }
    }
}

impl<R: BufRead + Send> TelemetrySource for JsonLinesSource<R> {
    fn next_event(&mut self) -> Result<SampleEvent, AcquisitionError> {
        next_from_lines(&mut self.reader, &mut self.buf, &mut self.line_no, parse_json_line)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// CSV telemetry over any buffered reader.
pub struct CsvTelemetrySource<R> {
    reader: R,
    name: String,
    buf: String,
    line_no: usize,
}

impl<R: BufRead + Send> CsvTelemetrySource<R> {
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: name.into(),
            buf: String::new(),
            line_no: 0,
        }
    }
}

impl<R: BufRead + Send> TelemetrySource for CsvTelemetrySource<R> {
    fn next_event(&mut self) -> Result<SampleEvent, AcquisitionError> {
        next_from_lines(&mut self.reader, &mut self.buf, &mut self.line_no, parse_csv_line)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn drain(source: &mut dyn TelemetrySource) -> Vec<SampleEvent> {
        let mut events = Vec::new();
        loop {
            let event = source.next_event().unwrap();
            if event == SampleEvent::Eof {
                return events;
            }
            events.push(event);
        }
    }

    #[test]
    fn test_csv_full_row() {
        let s = parse_csv_line("5000, 10000, 120, rih", 1).unwrap().unwrap();
        assert!((s.pressure_psi - 5000.0).abs() < 1e-12);
        assert!((s.tension_lbf - 10000.0).abs() < 1e-12);
        assert!((s.temperature_f - 120.0).abs() < 1e-12);
        assert_eq!(s.direction, Some(TravelDirection::In));
    }

    #[test]
    fn test_csv_optional_columns() {
        let s = parse_csv_line("5000,10000", 1).unwrap().unwrap();
        assert!((s.temperature_f - 70.0).abs() < 1e-12);
        assert_eq!(s.direction, None);

        let s = parse_csv_line("5000,10000,,OUT", 1).unwrap().unwrap();
        assert!((s.temperature_f - 70.0).abs() < 1e-12);
        assert_eq!(s.direction, Some(TravelDirection::Out));
    }

    #[test]
    fn test_csv_header_and_blank_skipped() {
        assert!(parse_csv_line("pressure_psi,tension_lbf,temperature_f,direction", 1)
            .unwrap()
            .is_none());
        assert!(parse_csv_line("   ", 2).unwrap().is_none());
        assert!(parse_csv_line("# comment", 3).unwrap().is_none());
    }

    #[test]
    fn test_csv_errors_carry_line_number() {
        match parse_csv_line("abc,10000", 7) {
            Err(AcquisitionError::Parse { line, reason }) => {
                assert_eq!(line, 7);
                assert!(reason.contains("pressure_psi"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
        assert!(parse_csv_line("1,2,3,sideways", 8).is_err());
        assert!(parse_csv_line("1", 9).is_err());
    }

    #[test]
    fn test_csv_source_reports_malformed_and_continues() {
        let data = "pressure,tension,temp,dir\n5000,10000,70,IN\nbad,row\n\n3000,8000,70,STOPPED\n";
        let mut source = CsvTelemetrySource::new(Cursor::new(data), "test.csv");
        let events = drain(&mut source);
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], SampleEvent::Sample(_)));
        assert!(matches!(events[1], SampleEvent::Malformed { line: 3, .. }));
        match &events[2] {
            SampleEvent::Sample(s) => assert_eq!(s.direction, Some(TravelDirection::Stopped)),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(source.source_name(), "test.csv");
    }

    #[test]
    fn test_json_source() {
        let data = concat!(
            r#"{"pressure_psi":5000,"tension_lbf":10000,"direction":"OUT"}"#,
            "\n",
            "not json\n",
            r#"{"pressure_psi":1,"tension_lbf":2,"temperature_f":150,"direction":"pooh"}"#,
            "\n"
        );
        let mut source = JsonLinesSource::new(Cursor::new(data), "stdin");
        let events = drain(&mut source);
        assert_eq!(events.len(), 3);
        assert!(matches!(events[1], SampleEvent::Malformed { line: 2, .. }));
        match &events[2] {
            SampleEvent::Sample(s) => {
                assert_eq!(s.direction, Some(TravelDirection::Out));
                assert!((s.temperature_f - 150.0).abs() < 1e-12);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}

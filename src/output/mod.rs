mod csv;
mod json;
mod text;

use chrono::Utc;

use crate::renderer::Telemetry;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

pub trait Formatter: Send {
    fn format(&self, telemetry: &Telemetry) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// `min_delay` holds a sentinel until playback has been observed
fn min_delay(telemetry: &Telemetry) -> Option<f64> {
    (telemetry.min_delay < crate::constants::MIN_DELAY_SENTINEL).then_some(telemetry.min_delay)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Telemetry {
        Telemetry {
            total_audio_played: 12.5,
            actual_audio_played: 12.0,
            delay: 0.184,
            min_delay: 0.09,
            max_delay: 0.31,
        }
    }

    #[test]
    fn test_csv_matches_header_columns() {
        let f = CsvFormatter;
        let header_cols = f.header().unwrap().split(',').count();
        let row_cols = f.format(&sample()).split(',').count();
        assert_eq!(header_cols, row_cols);
    }

    #[test]
    fn test_json_is_parseable() {
        let line = JsonFormatter.format(&sample());
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["totalAudioPlayed"], 12.5);
        assert!(value["ts"].is_string());
    }

    #[test]
    fn test_text_hides_sentinel_min_delay() {
        let mut t = sample();
        t.min_delay = crate::constants::MIN_DELAY_SENTINEL;
        let line = TextFormatter::new(true).format(&t);
        assert!(line.contains("min: -"), "{}", line);
    }
}

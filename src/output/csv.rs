use super::{Formatter, iso8601_timestamp, min_delay};
use crate::renderer::Telemetry;

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, telemetry: &Telemetry) -> String {
        let min = min_delay(telemetry).map_or(String::new(), |d| format!("{:.3}", d));
        format!(
            "{},{:.3},{:.3},{:.3},{},{:.3}",
            iso8601_timestamp(),
            telemetry.total_audio_played,
            telemetry.actual_audio_played,
            telemetry.delay,
            min,
            telemetry.max_delay
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("ts,total_audio_played,actual_audio_played,delay,min_delay,max_delay")
    }
}

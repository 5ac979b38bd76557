use super::{Formatter, iso8601_timestamp, min_delay};
use crate::renderer::Telemetry;

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, telemetry: &Telemetry) -> String {
        let min = min_delay(telemetry).map_or("null".to_string(), |d| format!("{:.4}", d));
        format!(
            r#"{{"ts":"{}","totalAudioPlayed":{:.4},"actualAudioPlayed":{:.4},"delay":{:.4},"minDelay":{},"maxDelay":{:.4}}}"#,
            iso8601_timestamp(),
            telemetry.total_audio_played,
            telemetry.actual_audio_played,
            telemetry.delay,
            min,
            telemetry.max_delay
        )
    }
}

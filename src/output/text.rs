use super::{Formatter, min_delay};
use crate::renderer::Telemetry;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, telemetry: &Telemetry) -> String {
        if self.verbose {
            let min = min_delay(telemetry).map_or("-".to_string(), |d| format!("{:.0}ms", d * 1000.0));
            format!(
                "Played: {:>7.2}s (audio: {:>7.2}s) delay: {:>5.0}ms [min: {}, max: {:.0}ms]",
                telemetry.total_audio_played,
                telemetry.actual_audio_played,
                telemetry.delay * 1000.0,
                min,
                telemetry.max_delay * 1000.0
            )
        } else {
            format!(
                "Played: {:>7.2}s delay: {:>5.0}ms",
                telemetry.total_audio_played,
                telemetry.delay * 1000.0
            )
        }
    }
}

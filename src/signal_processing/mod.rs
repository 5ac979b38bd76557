pub mod level;
pub mod ramp;

pub use level::has_audible;
pub use ramp::{fade_in, fade_out};

mod arrival;
mod session;
mod signal;

pub use arrival::{ArrivalConfig, arrival_times};
pub use session::{SessionReport, StatsSummary, TransitionCounts, simulate_session};
pub use signal::{split_frames, tone, utterances};

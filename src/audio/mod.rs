pub mod buffer;
pub mod playback;
pub mod source;

pub use buffer::FrameQueue;
pub use playback::{AudioPlayback, promote_to_real_time};
pub use source::{FrameSource, MemoryFrameSource, WavFrameSource};

use crate::config::samples_to_ms;

/// Hooks called by the renderer at its key transitions
///
/// Every method defaults to doing nothing. Hooks run on the audio thread
/// inside the render path, so implementations must not block.
pub trait RendererObserver {
    /// A frame was queued; only called for the first few packets after a reset
    fn on_frame(&mut self, _packet: u64, _buffered: usize, _frame_len: usize) {}

    /// Enough initial lookahead arrived; the partial buffer countdown begins
    fn on_armed(&mut self, _buffered: usize, _partial_buffer: usize) {}

    /// First real output after arming
    fn on_resumed(&mut self, _buffered: usize) {}

    /// Oldest audio was discarded to bound latency
    fn on_overflow_drop(&mut self, _dropped: usize, _max_buffer: usize) {}

    /// The queue ran dry in the middle of audible output
    fn on_underrun(&mut self, _missing: usize, _partial_buffer: usize) {}

    fn on_reset(&mut self) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RendererObserver for NoopObserver {}

/// Observer that reports transitions through the `log` facade at debug level
#[derive(Debug, Clone, Copy)]
pub struct LogObserver {
    sample_rate: u32,
}

impl LogObserver {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    fn ms(&self, samples: usize) -> f32 {
        samples_to_ms(samples, self.sample_rate)
    }
}

impl RendererObserver for LogObserver {
    fn on_frame(&mut self, packet: u64, buffered: usize, frame_len: usize) {
        log::debug!(
            "Got packet {} ({:.1}ms), buffered {:.1}ms",
            packet,
            self.ms(frame_len),
            self.ms(buffered)
        );
    }

    fn on_armed(&mut self, buffered: usize, partial_buffer: usize) {
        log::debug!(
            "Armed with {:.1}ms buffered, waiting {:.1}ms more",
            self.ms(buffered),
            self.ms(partial_buffer)
        );
    }

    fn on_resumed(&mut self, buffered: usize) {
        log::debug!("Audio resumed, buffered {:.1}ms", self.ms(buffered));
    }

    fn on_overflow_drop(&mut self, dropped: usize, max_buffer: usize) {
        log::debug!(
            "Dropped {:.1}ms of audio, max buffer now {:.1}ms",
            self.ms(dropped),
            self.ms(max_buffer)
        );
    }

    fn on_underrun(&mut self, missing: usize, partial_buffer: usize) {
        log::debug!(
            "Missed {:.1}ms of audio, partial buffer now {:.1}ms",
            self.ms(missing),
            self.ms(partial_buffer)
        );
    }

    fn on_reset(&mut self) {
        log::debug!("Renderer state reset");
    }
}

//! Channel-fed wrapper that runs a renderer on the audio thread.
//!
//! The renderer itself is single-owner. Producers hold a cloneable
//! [`RendererHandle`] and send commands through a channel; the
//! [`RenderEngine`] lives inside the audio callback, drains whatever commands
//! arrived since the last callback without blocking, and then renders the
//! device buffer in fixed-size quanta. Telemetry flows back through a bounded
//! channel and is discarded when nobody keeps up with it. Frames the renderer
//! is done with travel back the same way so their memory is released on the
//! producer's thread.

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded, unbounded};

use crate::error::{PlayoutError, Result};
use crate::renderer::{AudioRenderer, NoopObserver, RendererObserver, Telemetry};

const SPENT_FRAME_CAPACITY: usize = 64;

/// Message from the producer side to the audio thread
#[derive(Debug, Clone, PartialEq)]
pub enum RendererCommand {
    /// One decoded PCM frame and the reference clock at the time it was produced
    Frame { samples: Vec<f32>, mic_duration: f64 },
    /// Discard all buffered audio and re-arm from scratch
    Reset,
}

/// Producer-side endpoint for a [`RenderEngine`]
#[derive(Debug, Clone)]
pub struct RendererHandle {
    tx: Sender<RendererCommand>,
    spent: Receiver<Vec<f32>>,
}

impl RendererHandle {
    pub fn push_frame(&self, samples: Vec<f32>, mic_duration: f64) -> Result<()> {
        self.send(RendererCommand::Frame {
            samples,
            mic_duration,
        })
    }

    pub fn reset(&self) -> Result<()> {
        self.send(RendererCommand::Reset)
    }

    pub fn send(&self, command: RendererCommand) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| PlayoutError::Disconnected)
    }

    /// Free frames the engine has handed back; returns how many
    pub fn release_spent_frames(&self) -> usize {
        self.spent.try_iter().count()
    }
}

pub struct RenderEngine<O: RendererObserver = NoopObserver> {
    renderer: AudioRenderer<O>,
    commands: Receiver<RendererCommand>,
    telemetry: Sender<Telemetry>,
    spent: Sender<Vec<f32>>,
    block_size: usize,
    telemetry_dropped: u64,
}

/// Wire a renderer to a fresh command channel and telemetry channel
///
/// # Arguments
/// * `renderer` - Renderer to move onto the audio thread
/// * `block_size` - Render quantum in samples
/// * `telemetry_capacity` - Telemetry records held before new ones are discarded
///
/// # Returns
/// `(handle, engine, telemetry_rx)`
pub fn render_channel<O: RendererObserver>(
    renderer: AudioRenderer<O>,
    block_size: usize,
    telemetry_capacity: usize,
) -> (RendererHandle, RenderEngine<O>, Receiver<Telemetry>) {
    let (cmd_tx, cmd_rx) = unbounded();
    let (telemetry_tx, telemetry_rx) = bounded(telemetry_capacity.max(1));
    let (spent_tx, spent_rx) = bounded(SPENT_FRAME_CAPACITY);
    let engine = RenderEngine {
        renderer,
        commands: cmd_rx,
        telemetry: telemetry_tx,
        spent: spent_tx,
        block_size: block_size.max(1),
        telemetry_dropped: 0,
    };
    let handle = RendererHandle {
        tx: cmd_tx,
        spent: spent_rx,
    };
    (handle, engine, telemetry_rx)
}

impl<O: RendererObserver> RenderEngine<O> {
    /// Apply every command that is already waiting; never blocks
    ///
    /// Returns the number of commands applied.
    pub fn drain_commands(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.commands.try_recv() {
                Ok(command) => {
                    self.apply(command);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    fn apply(&mut self, command: RendererCommand) {
        match command {
            RendererCommand::Frame {
                samples,
                mic_duration,
            } => {
                let report = self.renderer.push_frame(samples, mic_duration);
                match self.telemetry.try_send(report) {
                    Ok(()) | Err(TrySendError::Disconnected(_)) => {}
                    Err(TrySendError::Full(_)) => self.telemetry_dropped += 1,
                }
            }
            RendererCommand::Reset => self.renderer.reset(),
        }
    }

    /// Fill one device buffer
    ///
    /// Pending commands are applied first, then `out` is rendered in quanta
    /// of `block_size` samples (the last one may be shorter). Finished frames
    /// are passed back to the producer afterwards.
    pub fn process(&mut self, out: &mut [f32]) {
        self.drain_commands();
        for block in out.chunks_mut(self.block_size) {
            self.renderer.render_into(block);
        }
        self.return_spent_frames();
    }

    fn return_spent_frames(&mut self) {
        for frame in self.renderer.take_spent_frames() {
            // A full channel means nobody is collecting; the frame is freed here
            let _ = self.spent.try_send(frame);
        }
    }

    pub fn renderer(&self) -> &AudioRenderer<O> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut AudioRenderer<O> {
        &mut self.renderer
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Telemetry records discarded because the receiver fell behind
    pub fn telemetry_dropped(&self) -> u64 {
        self.telemetry_dropped
    }
}

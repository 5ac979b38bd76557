use audio_thread_priority::RtPriorityHandle;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::config::AudioConfig;
use crate::engine::RenderEngine;
use crate::error::{PlayoutError, Result};
use crate::renderer::RendererObserver;

/// Output stream driving a [`RenderEngine`] from the device callback
///
/// The engine renders mono audio; it is copied to every channel the device
/// exposes. Playback pauses when this value is dropped.
pub struct AudioPlayback {
    stream: cpal::Stream,
    channels: u16,
}

impl AudioPlayback {
    /// Open an output device and start rendering
    ///
    /// Uses `config.device` when set, otherwise the host default.
    pub fn new<O>(config: &AudioConfig, mut engine: RenderEngine<O>) -> Result<Self>
    where
        O: RendererObserver + Send + 'static,
    {
        let host = cpal::default_host();
        let device = Self::select_device(&host, config.device.as_deref())?;

        match device.description() {
            Ok(desc) => log::info!("Output device: {:?}", desc),
            Err(_) => log::info!("Output device: Unknown"),
        }

        let channels = device
            .default_output_config()
            .map(|c| c.channels())
            .unwrap_or(1)
            .max(1);

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.block_size as u32),
        };

        let mut mono = vec![0.0f32; config.block_size];
        let stride = channels as usize;

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / stride;
                    if mono.len() < frames {
                        mono.resize(frames, 0.0);
                    }
                    let mono = &mut mono[..frames];
                    engine.process(mono);
                    for (out, &sample) in data.chunks_mut(stride).zip(mono.iter()) {
                        out.fill(sample);
                    }
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| PlayoutError::AudioStream(format!("{}", e)))?;

        stream
            .play()
            .map_err(|e| PlayoutError::AudioStream(format!("{}", e)))?;

        Ok(Self { stream, channels })
    }

    #[allow(deprecated)]
    fn select_device(host: &cpal::Host, name: Option<&str>) -> Result<cpal::Device> {
        if let Some(name) = name {
            let mut devices = host
                .output_devices()
                .map_err(|e| PlayoutError::AudioDevice(format!("{}", e)))?;
            if let Some(device) = devices.find(|d| d.name().ok().as_deref() == Some(name)) {
                return Ok(device);
            }
            log::warn!("Output device '{}' not found, using default", name);
        }

        host.default_output_device()
            .ok_or_else(|| PlayoutError::AudioDevice("No output device found".into()))
    }

    /// Channels the device was opened with
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl Drop for AudioPlayback {
    fn drop(&mut self) {
        let _ = self.stream.pause();
    }
}

/// Try to run the calling thread at real-time priority
///
/// Meant for threads that must keep pace with the device, such as a frame
/// producer. The device callback thread is managed by cpal. Returns `None`
/// (after logging) when the platform refuses; the handle must be kept alive
/// on the promoted thread.
pub fn promote_to_real_time(block_size: usize, sample_rate: u32) -> Option<RtPriorityHandle> {
    match audio_thread_priority::promote_current_thread_to_real_time(block_size as u32, sample_rate)
    {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("Could not set real-time priority: {}", e);
            None
        }
    }
}

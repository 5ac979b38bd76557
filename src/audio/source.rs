use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::WavReader;

use crate::error::{PlayoutError, Result};

/// Producer of decoded PCM frames
///
/// Stands in for the decoder side of the pipeline: each call yields the next
/// frame in playback order, or `None` once the stream is exhausted.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Option<Vec<f32>>>;
    fn sample_rate(&self) -> u32;
}

/// Frames cut from an in-memory sample buffer
pub struct MemoryFrameSource {
    samples: Vec<f32>,
    position: usize,
    frame_size: usize,
    sample_rate: u32,
}

impl MemoryFrameSource {
    pub fn new(samples: Vec<f32>, frame_size: usize, sample_rate: u32) -> Self {
        Self {
            samples,
            position: 0,
            frame_size: frame_size.max(1),
            sample_rate,
        }
    }

    /// Change the size of subsequent frames
    pub fn set_frame_size(&mut self, frame_size: usize) {
        self.frame_size = frame_size.max(1);
    }

    /// Samples not yet handed out
    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }
}

impl FrameSource for MemoryFrameSource {
    fn next_frame(&mut self) -> Result<Option<Vec<f32>>> {
        if self.position >= self.samples.len() {
            return Ok(None);
        }

        let end = (self.position + self.frame_size).min(self.samples.len());
        let frame = self.samples[self.position..end].to_vec();
        self.position = end;

        Ok(Some(frame))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Frames read from a mono WAV file
pub struct WavFrameSource {
    inner: MemoryFrameSource,
}

impl WavFrameSource {
    pub fn new<P: AsRef<Path>>(path: P, frame_size: usize) -> Result<Self> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();

        if spec.channels != 1 {
            return Err(PlayoutError::Config(format!(
                "Expected mono WAV file, got {} channels",
                spec.channels
            )));
        }

        let samples = Self::read_samples(reader, &spec)?;
        Ok(Self {
            inner: MemoryFrameSource::new(samples, frame_size, spec.sample_rate),
        })
    }

    fn read_samples(
        mut reader: WavReader<BufReader<File>>,
        spec: &hound::WavSpec,
    ) -> Result<Vec<f32>> {
        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let bits = u32::from(spec.bits_per_sample.clamp(1, 32));
                let max_val = (1u64 << (bits - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        Ok(samples)
    }

    pub fn set_frame_size(&mut self, frame_size: usize) {
        self.inner.set_frame_size(frame_size);
    }

    pub fn remaining(&self) -> usize {
        self.inner.remaining()
    }
}

impl FrameSource for WavFrameSource {
    fn next_frame(&mut self) -> Result<Option<Vec<f32>>> {
        self.inner.next_frame()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_chunks_with_short_tail() {
        let samples: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let mut source = MemoryFrameSource::new(samples, 4, 48000);

        assert_eq!(source.next_frame().unwrap().unwrap(), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(source.next_frame().unwrap().unwrap(), vec![4.0, 5.0, 6.0, 7.0]);
        assert_eq!(source.next_frame().unwrap().unwrap(), vec![8.0, 9.0]);
        assert!(source.next_frame().unwrap().is_none());
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_memory_source_frame_size_change() {
        let mut source = MemoryFrameSource::new(vec![0.25; 10], 2, 8000);
        assert_eq!(source.next_frame().unwrap().unwrap().len(), 2);
        source.set_frame_size(5);
        assert_eq!(source.next_frame().unwrap().unwrap().len(), 5);
        assert_eq!(source.remaining(), 3);
    }

    #[test]
    fn test_wav_source_missing_file() {
        assert!(WavFrameSource::new("/nonexistent/voice.wav", 960).is_err());
    }
}

//! Candidate audio handling.
//!
//! Recorded audio arrives as frames that are queued until the candidate asks
//! for them to be processed. Nothing is transcribed while frames accumulate.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::Cursor;

/// Sample rate used for synthesized placeholder audio.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// A block of mono audio, samples normalized to `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the clip in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }

    /// Encodes the clip as a 16-bit PCM mono WAV file.
    pub fn to_wav(&self) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for &sample in &self.samples {
                let v = (sample * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
                writer.write_sample(v)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }
}

/// Queue of recorded frames waiting to be transcribed.
///
/// All frames in the buffer share one sample rate, fixed by the first frame
/// pushed after the buffer was last empty.
#[derive(Debug, Default)]
pub struct AudioBuffer {
    frames: VecDeque<Vec<f32>>,
    sample_rate: Option<u32>,
}

impl AudioBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a frame. Returns an error describing the mismatch if the frame's
    /// sample rate differs from the frames already queued. Empty frames are
    /// accepted and ignored.
    pub fn push(&mut self, frame: AudioClip) -> std::result::Result<(), String> {
        if frame.sample_rate == 0 {
            return Err("sample rate must be positive".to_string());
        }
        if let Some(rate) = self.sample_rate
            && rate != frame.sample_rate
        {
            return Err(format!(
                "frame sample rate {} Hz does not match buffered audio at {} Hz",
                frame.sample_rate, rate
            ));
        }
        if !frame.samples.is_empty() {
            self.sample_rate = Some(frame.sample_rate);
            self.frames.push_back(frame.samples);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of frames currently queued.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Joins every queued frame into one clip, in arrival order, leaving the
    /// buffer as it is. Returns `None` when nothing was queued.
    pub fn snapshot(&self) -> Option<AudioClip> {
        let sample_rate = self.sample_rate?;
        if self.frames.is_empty() {
            return None;
        }
        let samples: Vec<f32> = self.frames.iter().flatten().copied().collect();
        Some(AudioClip::new(samples, sample_rate))
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.sample_rate = None;
    }
}

//! WAV renderer

use std::path::Path;

use crate::tone::{PulseWave, ToneActuator};
use crate::{Result, RtttlError};

/// Peak output level relative to full scale
const DEFAULT_AMPLITUDE: f32 = 0.5;

/// Tone actuator that synthesizes into a sample buffer.
///
/// Blocking and background plays are rendered the same way: the full note
/// is appended at once. A duration of 0 renders nothing.
#[derive(Debug, Clone)]
pub struct WavRenderer {
    sample_rate: u32,
    amplitude: f32,
    samples: Vec<f32>,
}

impl WavRenderer {
    /// Create an empty renderer
    pub fn new(sample_rate: u32) -> Self {
        WavRenderer {
            sample_rate,
            amplitude: DEFAULT_AMPLITUDE,
            samples: Vec::new(),
        }
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Rendered samples (-1.0..=1.0)
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Length of the rendered audio in milliseconds
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / u64::from(self.sample_rate)
    }

    /// Write the rendered audio as a 16-bit mono WAV file
    pub fn write_wav(&self, path: &Path) -> Result<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec)
            .map_err(|e| RtttlError::AudioFileError(format!("Failed to create WAV file: {}", e)))?;

        for &sample in &self.samples {
            let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| RtttlError::AudioFileError(format!("Failed to write sample: {}", e)))?;
        }

        writer
            .finalize()
            .map_err(|e| RtttlError::AudioFileError(format!("Failed to finalize WAV file: {}", e)))?;

        log::info!(
            "Wrote {} samples ({} ms) to {}",
            self.samples.len(),
            self.duration_ms(),
            path.display()
        );
        Ok(())
    }
}

impl ToneActuator for WavRenderer {
    fn play(&mut self, frequency_hz: u32, volume: u8, duration_ms: u32, _background: bool) {
        let count = (u64::from(duration_ms) * u64::from(self.sample_rate) / 1000) as usize;
        let amplitude = self.amplitude;
        let wave = PulseWave::new(frequency_hz, volume, self.sample_rate);
        self.samples.extend(wave.take(count).map(|s| s * amplitude));
    }

    fn silence(&mut self) {}
}

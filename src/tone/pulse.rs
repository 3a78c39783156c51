//! Pulse-wave oscillator
//!
//! Software stand-in for a PWM-driven speaker: a rectangular wave whose duty
//! cycle follows the volume level.

use super::duty_for_volume;

/// Rectangular wave generator producing samples in -1.0..=1.0
#[derive(Debug, Clone)]
pub struct PulseWave {
    /// Phase increment per sample (cycles)
    step: f32,
    /// Fraction of each cycle spent high
    duty: f32,
    /// Current phase (0.0..1.0)
    phase: f32,
}

impl PulseWave {
    /// Create an oscillator for a frequency/volume pair at `sample_rate` Hz
    pub fn new(frequency_hz: u32, volume: u8, sample_rate: u32) -> Self {
        let step = if sample_rate == 0 {
            0.0
        } else {
            frequency_hz as f32 / sample_rate as f32
        };
        PulseWave {
            step,
            duty: duty_for_volume(volume),
            phase: 0.0,
        }
    }

    /// Whether the oscillator only produces silence
    pub fn is_silent(&self) -> bool {
        self.step == 0.0 || self.duty == 0.0
    }

    /// Produce the next sample
    pub fn next_sample(&mut self) -> f32 {
        if self.is_silent() {
            return 0.0;
        }
        let sample = if self.phase < self.duty { 1.0 } else { -1.0 };
        self.phase = (self.phase + self.step).fract();
        sample
    }
}

impl Iterator for PulseWave {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        Some(self.next_sample())
    }
}

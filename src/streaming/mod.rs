//! Real-time audio output using rodio
//!
//! [`AudioOutput`] owns the system output stream and must outlive every
//! [`RodioActuator`] created from it. The stream itself cannot leave the
//! thread that opened it, so actuators only carry a handle and can be moved
//! into a shared player.

use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::thread;
use std::time::Duration;

use crate::tone::{PulseWave, ToneActuator};
use crate::{Result, RtttlError};

/// Gain applied to the pulse wave before it reaches the device
const OUTPUT_GAIN: f32 = 0.25;

/// Pulse wave adapted to a rodio source
struct ToneSource {
    wave: PulseWave,
    sample_rate: u32,
}

impl Source for ToneSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

impl Iterator for ToneSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        Some(self.wave.next_sample())
    }
}

/// Open connection to the default audio device
pub struct AudioOutput {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioOutput {
    /// Open the default output device
    pub fn open() -> Result<Self> {
        let (stream, handle) = OutputStream::try_default().map_err(|e| {
            RtttlError::AudioDeviceError(format!("Failed to create audio stream: {}", e))
        })?;
        Ok(AudioOutput {
            _stream: stream,
            handle,
        })
    }

    /// Create an actuator playing through this device
    pub fn actuator(&self, sample_rate: u32) -> RodioActuator {
        RodioActuator {
            handle: self.handle.clone(),
            sink: None,
            sample_rate,
        }
    }
}

/// Tone actuator playing pulse waves on a rodio sink
pub struct RodioActuator {
    handle: OutputStreamHandle,
    sink: Option<Sink>,
    sample_rate: u32,
}

impl ToneActuator for RodioActuator {
    fn play(&mut self, frequency_hz: u32, volume: u8, duration_ms: u32, background: bool) {
        self.silence();
        let duration = Duration::from_millis(u64::from(duration_ms));
        let wave = PulseWave::new(frequency_hz, volume, self.sample_rate);

        if wave.is_silent() || duration_ms == 0 {
            if !background {
                thread::sleep(duration);
            }
            return;
        }

        let sink = match Sink::try_new(&self.handle) {
            Ok(sink) => sink,
            Err(e) => {
                log::error!("Failed to create audio sink: {}", e);
                if !background {
                    thread::sleep(duration);
                }
                return;
            }
        };
        let source = ToneSource {
            wave,
            sample_rate: self.sample_rate,
        };
        sink.append(source.take_duration(duration).amplify(OUTPUT_GAIN));

        if background {
            self.sink = Some(sink);
        } else {
            sink.sleep_until_end();
        }
    }

    fn silence(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

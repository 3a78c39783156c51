//! Tone actuator seam
//!
//! The sequencer never produces sound itself. It drives a [`ToneActuator`],
//! anything able to sound a frequency at one of eleven volume levels and to
//! go silent on request: a PWM buzzer, an audio device, a WAV renderer, or
//! the [`ToneLog`] recorder used in tests.

pub mod pulse;

pub use pulse::PulseWave;

/// Highest volume level (0 = silent)
pub const MAX_VOLUME: u8 = 10;

/// Pulse-width divisor per volume level 1..=10.
///
/// Level `v` drives the output with a duty cycle of `1 / VOLUME_DUTY_DIVISORS[v - 1]`,
/// from 0.5% at level 1 to a 50% square wave at level 10.
pub const VOLUME_DUTY_DIVISORS: [u8; 10] = [200, 100, 67, 50, 40, 33, 29, 22, 11, 2];

/// Duty cycle (0.0..=0.5) for a volume level; levels above the maximum saturate.
pub fn duty_for_volume(volume: u8) -> f32 {
    match volume.min(MAX_VOLUME) {
        0 => 0.0,
        v => 1.0 / f32::from(VOLUME_DUTY_DIVISORS[usize::from(v) - 1]),
    }
}

/// A device that can sound a tone
pub trait ToneActuator {
    /// Sound `frequency_hz` at `volume` (0..=10) for `duration_ms`.
    ///
    /// A frequency or volume of 0 is a rest. With `background == false` the
    /// call returns only after the full duration has elapsed; with
    /// `background == true` it returns immediately and the tone keeps
    /// sounding until the duration ends or [`ToneActuator::silence`] is called.
    fn play(&mut self, frequency_hz: u32, volume: u8, duration_ms: u32, background: bool);

    /// Stop any sound output immediately.
    fn silence(&mut self);
}

impl<A: ToneActuator + ?Sized> ToneActuator for Box<A> {
    fn play(&mut self, frequency_hz: u32, volume: u8, duration_ms: u32, background: bool) {
        (**self).play(frequency_hz, volume, duration_ms, background)
    }

    fn silence(&mut self) {
        (**self).silence()
    }
}

/// One call made on a [`ToneLog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneEvent {
    /// A `play` call
    Play {
        /// Requested frequency in Hz
        frequency_hz: u32,
        /// Requested volume level
        volume: u8,
        /// Requested duration in milliseconds
        duration_ms: u32,
        /// Whether the call was non-blocking
        background: bool,
    },
    /// A `silence` call
    Silence,
}

/// Actuator that records every call instead of producing sound.
///
/// Blocking plays return at once; the log runs in virtual time.
#[derive(Debug, Clone, Default)]
pub struct ToneLog {
    events: Vec<ToneEvent>,
}

impl ToneLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded calls, oldest first
    pub fn events(&self) -> &[ToneEvent] {
        &self.events
    }

    /// Recorded `play` calls that would have produced sound
    pub fn audible_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| {
                matches!(e, ToneEvent::Play { frequency_hz, volume, .. } if *frequency_hz > 0 && *volume > 0)
            })
            .count()
    }

    /// Most recent `play` call
    pub fn last_play(&self) -> Option<ToneEvent> {
        self.events
            .iter()
            .rev()
            .find(|e| matches!(e, ToneEvent::Play { .. }))
            .copied()
    }

    /// Forget all recorded calls
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl ToneActuator for ToneLog {
    fn play(&mut self, frequency_hz: u32, volume: u8, duration_ms: u32, background: bool) {
        self.events.push(ToneEvent::Play {
            frequency_hz,
            volume,
            duration_ms,
            background,
        });
    }

    fn silence(&mut self) {
        self.events.push(ToneEvent::Silence);
    }
}

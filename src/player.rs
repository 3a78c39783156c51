//! Shared playback context
//!
//! [`RtttlPlayer`] wraps a [`Sequencer`] in an `Arc<Mutex<_>>` so the
//! foreground API and the timer collaborator can both reach it. The mutex is
//! the critical section guarding the arm state, the playback position and
//! the actuator; every foreground operation takes it before touching any of
//! them, and the sequencer disarms the timer first thing.
//!
//! The timer side gets a [`Ticker`] handle. [`TickThread`] is a ready-made
//! timer collaborator that calls it periodically while the [`SystemTimer`]
//! is armed.
//!
//! [`SystemTimer`]: crate::sequencer::timer::SystemTimer

use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::PlayerConfig;
use crate::rtttl::parse_song;
use crate::sequencer::timer::TimerSource;
use crate::sequencer::{PlaybackMode, PlaybackState, Sequencer};
use crate::tone::ToneActuator;
use crate::Result;

/// Default interval at which a paused foreground song re-checks its state
pub const DEFAULT_PAUSE_POLL_MS: u64 = 5;

/// Options for a single `parse_and_play` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayOptions {
    /// Volume 0..=10; `None` uses the player's current volume
    pub volume: Option<u8>,
    /// Return immediately and let timer ticks advance the song
    pub background: bool,
    /// Octaves added to every note
    pub octave_offset: i8,
}

impl Default for PlayOptions {
    fn default() -> Self {
        PlayOptions {
            volume: None,
            background: false,
            octave_offset: 0,
        }
    }
}

impl PlayOptions {
    /// Options taken from a player configuration
    pub fn from_config(config: &PlayerConfig) -> Self {
        PlayOptions {
            volume: Some(config.volume),
            background: config.background,
            octave_offset: config.octave_offset,
        }
    }
}

/// RTTTL player: parses songs and drives a shared [`Sequencer`]
pub struct RtttlPlayer<A, T> {
    inner: Arc<Mutex<Sequencer<A, T>>>,
    pause_poll: Duration,
}

impl<A, T> Clone for RtttlPlayer<A, T> {
    fn clone(&self) -> Self {
        RtttlPlayer {
            inner: Arc::clone(&self.inner),
            pause_poll: self.pause_poll,
        }
    }
}

impl<A: ToneActuator, T: TimerSource> RtttlPlayer<A, T> {
    /// Create an idle player at full volume
    pub fn new(actuator: A, timer: T) -> Self {
        RtttlPlayer {
            inner: Arc::new(Mutex::new(Sequencer::new(actuator, timer))),
            pause_poll: Duration::from_millis(DEFAULT_PAUSE_POLL_MS),
        }
    }

    /// Create an idle player using the volume and polling interval from `config`
    pub fn with_config(actuator: A, timer: T, config: &PlayerConfig) -> Self {
        let mut sequencer = Sequencer::new(actuator, timer);
        sequencer.set_volume(config.volume);
        RtttlPlayer {
            inner: Arc::new(Mutex::new(sequencer)),
            pause_poll: Duration::from_millis(config.pause_poll_ms.max(1)),
        }
    }

    /// Parse `text` and play it, replacing any song in progress.
    ///
    /// In foreground mode this blocks until the song ends. `stop` and
    /// `pause_resume` called from another thread take effect at the next
    /// note boundary. A song that cannot be parsed stops playback and
    /// returns the error.
    pub fn parse_and_play(&self, text: &str, options: PlayOptions) -> Result<()> {
        let song = match parse_song(text, options.octave_offset) {
            Ok(song) => song,
            Err(e) => {
                log::warn!("Not playing malformed song: {}", e);
                self.stop();
                return Err(e);
            }
        };

        let mut sequencer = self.inner.lock();
        let volume = options.volume.unwrap_or_else(|| sequencer.volume());
        if options.background {
            sequencer.start(song, volume, true);
            return Ok(());
        }

        let begun = sequencer.begin(song, volume, PlaybackMode::Foreground);
        MutexGuard::unlock_fair(sequencer);
        if let Some(generation) = begun {
            self.run_foreground(generation);
        }
        Ok(())
    }

    /// Play notes one at a time, releasing the lock between them.
    fn run_foreground(&self, generation: u64) {
        loop {
            let mut sequencer = self.inner.lock();
            if sequencer.generation() != generation {
                log::debug!("Foreground song was replaced");
                break;
            }
            match sequencer.state() {
                PlaybackState::Idle => break,
                PlaybackState::Paused => {
                    drop(sequencer);
                    thread::sleep(self.pause_poll);
                }
                PlaybackState::Playing => {
                    let more = sequencer.step_foreground();
                    MutexGuard::unlock_fair(sequencer);
                    if !more {
                        break;
                    }
                }
            }
        }
    }

    /// Sound one tone outside of any song (frequency or volume 0 is a rest)
    pub fn play_note(&self, frequency_hz: u32, volume: u8, duration_ms: u32, background: bool) {
        self.inner
            .lock()
            .play_tone(frequency_hz, volume, duration_ms, background);
    }

    /// Stop playback and clear the song
    pub fn stop(&self) {
        self.inner.lock().stop();
    }

    /// Pause a playing song or resume a paused one
    pub fn pause_resume(&self) {
        self.inner.lock().toggle_pause();
    }

    /// Whether a song is sounding
    pub fn is_playing(&self) -> bool {
        self.inner.lock().is_playing()
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.inner.lock().state()
    }

    /// Set the volume (clamped to 0..=10), effective from the next note
    pub fn set_volume(&self, volume: u8) {
        self.inner.lock().set_volume(volume);
    }

    /// Current volume
    pub fn volume(&self) -> u8 {
        self.inner.lock().volume()
    }

    /// Name of the active song, empty while idle
    pub fn current_song_name(&self) -> String {
        self.inner.lock().current_song_name().to_string()
    }

    /// Lock the sequencer for direct inspection or control
    pub fn sequencer(&self) -> MutexGuard<'_, Sequencer<A, T>> {
        self.inner.lock()
    }

    /// Handle for the timer collaborator
    pub fn ticker(&self) -> Ticker<A, T> {
        Ticker {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Timer-side handle to a player's sequencer
pub struct Ticker<A, T> {
    inner: Arc<Mutex<Sequencer<A, T>>>,
}

impl<A, T> Clone for Ticker<A, T> {
    fn clone(&self) -> Self {
        Ticker {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: ToneActuator, T: TimerSource> Ticker<A, T> {
    /// Deliver one timer tick; returns whether the song advanced
    pub fn tick(&self) -> bool {
        self.inner.lock().on_tick()
    }
}

/// Background thread delivering ticks while a timer is armed
pub struct TickThread {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TickThread {
    /// Spawn a thread calling `ticker.tick()` every `interval` while `armed` is set
    pub fn spawn<A, T>(ticker: Ticker<A, T>, armed: Arc<AtomicBool>, interval: Duration) -> Self
    where
        A: ToneActuator + Send + 'static,
        T: TimerSource + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = Arc::clone(&running);
        let handle = thread::spawn(move || {
            while running_clone.load(Ordering::Relaxed) {
                thread::sleep(interval);
                if armed.load(Ordering::Acquire) {
                    ticker.tick();
                }
            }
        });
        TickThread {
            running,
            handle: Some(handle),
        }
    }

    /// Stop delivering ticks and wait for the thread to exit
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Tick thread panicked");
            }
        }
    }
}

impl Drop for TickThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

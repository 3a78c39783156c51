//! Playback state machine
//!
//! A [`Sequencer`] owns the active [`Song`] and the playback position and
//! walks through the notes, either synchronously (foreground) or one note per
//! timer expiry (background).
//!
//! ```text
//! Idle --start--> Playing <--toggle_pause--> Paused
//!   ^                |                          |
//!   +---stop / end---+-----------stop-----------+
//! ```

pub mod timer;

use crate::rtttl::{Note, Song};
use crate::tone::{ToneActuator, MAX_VOLUME};
use timer::TimerSource;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing is playing (initial and terminal state)
    #[default]
    Idle,
    /// A song is sounding
    Playing,
    /// A song is paused at its current note
    Paused,
}

/// How notes are advanced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    /// The caller blocks while every note plays
    #[default]
    Foreground,
    /// Notes are advanced by timer ticks
    Background,
}

/// Song playback state machine driving a tone actuator and a timer
pub struct Sequencer<A, T> {
    actuator: A,
    timer: T,
    song: Song,
    state: PlaybackState,
    mode: PlaybackMode,
    current_index: usize,
    volume: u8,
    /// Clock time at which the sounding background note ends
    note_end_ms: u64,
    /// Bumped on every start so a blocking loop can tell its song was replaced
    generation: u64,
}

impl<A: ToneActuator, T: TimerSource> Sequencer<A, T> {
    /// Create an idle sequencer at full volume
    pub fn new(actuator: A, timer: T) -> Self {
        Sequencer {
            actuator,
            timer,
            song: Song::default(),
            state: PlaybackState::Idle,
            mode: PlaybackMode::Foreground,
            current_index: 0,
            volume: MAX_VOLUME,
            note_end_ms: 0,
            generation: 0,
        }
    }

    /// Start playing `song`, replacing whatever was playing.
    ///
    /// A volume of 0 stops playback instead. In foreground mode this returns
    /// once the whole song has played; in background mode it returns after
    /// sounding the first note and [`Sequencer::on_tick`] does the rest.
    pub fn start(&mut self, song: Song, volume: u8, background: bool) {
        let mode = if background {
            PlaybackMode::Background
        } else {
            PlaybackMode::Foreground
        };
        if self.begin(song, volume, mode).is_some() && mode == PlaybackMode::Foreground {
            while self.step_foreground() {}
        }
    }

    /// Install `song` and enter `Playing`, returning the new generation.
    ///
    /// Background songs sound their first note here; foreground songs are
    /// played by repeated [`Sequencer::step_foreground`] calls.
    pub(crate) fn begin(&mut self, song: Song, volume: u8, mode: PlaybackMode) -> Option<u64> {
        if volume == 0 {
            log::debug!("Volume 0, not starting '{}'", song.title());
            self.stop();
            return None;
        }

        self.timer.disarm();
        if self.state != PlaybackState::Idle {
            self.actuator.silence();
        }
        self.song = song;
        self.volume = volume.min(MAX_VOLUME);
        self.current_index = 0;
        self.note_end_ms = 0;
        self.mode = mode;
        self.generation = self.generation.wrapping_add(1);

        if !self.song.get(0).is_some_and(|n| n.duration_ms > 0) {
            log::debug!("'{}' has nothing to play", self.song.title());
            self.finish();
            return None;
        }

        self.state = PlaybackState::Playing;
        log::info!(
            "Playing '{}' ({} notes, {:?}, volume {})",
            self.song.title(),
            self.song.len(),
            mode,
            self.volume
        );
        if mode == PlaybackMode::Background {
            self.sound_current_note();
        }
        Some(self.generation)
    }

    /// Play the current note to completion and move to the next one.
    ///
    /// Returns `false` once there is nothing more to play in the foreground.
    pub fn step_foreground(&mut self) -> bool {
        if self.state != PlaybackState::Playing || self.mode != PlaybackMode::Foreground {
            return false;
        }
        let Some(note) = self.song.get(self.current_index) else {
            self.finish();
            return false;
        };
        log::debug!("Note {}: {:?}", self.current_index, note);
        self.actuator
            .play(note.frequency, self.volume, note.duration_ms, false);
        self.move_to_next_note()
    }

    /// Move to the next note of a background song and sound it.
    ///
    /// Ends playback when the song runs out or the next note has no duration.
    pub fn advance(&mut self) {
        if self.state != PlaybackState::Playing || self.mode != PlaybackMode::Background {
            return;
        }
        if self.move_to_next_note() {
            self.sound_current_note();
        }
    }

    /// Timer tick entry point: advances once the sounding note has ended.
    ///
    /// Returns whether the tick advanced the song.
    pub fn on_tick(&mut self) -> bool {
        let due = self.state == PlaybackState::Playing
            && self.mode == PlaybackMode::Background
            && self.timer.now_ms() >= self.note_end_ms;
        if due {
            self.advance();
        }
        due
    }

    /// Pause a playing song, or resume a paused one from the start of its current note.
    pub fn toggle_pause(&mut self) {
        match self.state {
            PlaybackState::Playing => {
                self.timer.disarm();
                self.actuator.silence();
                self.state = PlaybackState::Paused;
                log::debug!("Paused at note {}", self.current_index);
            }
            PlaybackState::Paused => {
                self.state = PlaybackState::Playing;
                log::debug!("Resumed at note {}", self.current_index);
                // A foreground loop replays the note itself.
                if self.mode == PlaybackMode::Background {
                    self.sound_current_note();
                }
            }
            PlaybackState::Idle => log::debug!("Nothing to pause"),
        }
    }

    /// Silence output, drop the song and return to `Idle`.
    pub fn stop(&mut self) {
        self.timer.disarm();
        self.actuator.silence();
        if self.state != PlaybackState::Idle {
            log::info!("Stopped '{}'", self.song.title());
        }
        self.song.clear();
        self.current_index = 0;
        self.note_end_ms = 0;
        self.state = PlaybackState::Idle;
    }

    /// Sound a single tone outside of any song.
    pub fn play_tone(&mut self, frequency_hz: u32, volume: u8, duration_ms: u32, background: bool) {
        self.actuator
            .play(frequency_hz, volume.min(MAX_VOLUME), duration_ms, background);
    }

    /// Set the volume used from the next note on (clamped to 0..=10)
    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(MAX_VOLUME);
    }

    /// Current volume level
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Mode of the current (or last) song
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Whether a song is sounding (not paused, not idle)
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Whether a song is paused
    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    /// Index of the current note
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The current note, if any
    pub fn current_note(&self) -> Option<Note> {
        self.song.get(self.current_index)
    }

    /// Clock time at which the sounding background note ends
    pub fn note_end_ms(&self) -> u64 {
        self.note_end_ms
    }

    /// Name of the active song, or `""` while idle
    pub fn current_song_name(&self) -> &str {
        match self.state {
            PlaybackState::Idle => "",
            _ => self.song.name(),
        }
    }

    /// The active song
    pub fn song(&self) -> &Song {
        &self.song
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// The tone actuator
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Mutable access to the tone actuator
    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    /// The timer
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Mutable access to the timer
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Take the actuator and timer back
    pub fn into_parts(self) -> (A, T) {
        (self.actuator, self.timer)
    }

    fn sound_current_note(&mut self) {
        if let Some(note) = self.song.get(self.current_index) {
            log::debug!("Note {}: {:?}", self.current_index, note);
            self.actuator
                .play(note.frequency, self.volume, note.duration_ms, true);
            self.note_end_ms = self.timer.now_ms() + u64::from(note.duration_ms);
            self.timer.arm();
        }
    }

    /// Step past the current note; ends playback if nothing playable follows.
    fn move_to_next_note(&mut self) -> bool {
        self.current_index += 1;
        match self.song.get(self.current_index) {
            Some(note) if note.duration_ms > 0 => true,
            _ => {
                self.finish();
                false
            }
        }
    }

    /// Natural end of a song: like `stop`, but the song and final index stay inspectable.
    fn finish(&mut self) {
        self.timer.disarm();
        self.actuator.silence();
        self.note_end_ms = 0;
        if self.state != PlaybackState::Idle {
            log::info!("Finished '{}'", self.song.title());
        }
        self.state = PlaybackState::Idle;
    }
}

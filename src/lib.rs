//! RTTTL Ringtone Player
//!
//! Parses RTTTL (Ring Tone Text Transfer Language) melodies into a bounded
//! sequence of notes and plays them through a tone generator, either
//! synchronously or in the background, advanced by a periodic timer tick.
//!
//! # Features
//! - Single-pass RTTTL parser (`name:d=4,o=5,b=120:8c,8d#.6,p`)
//! - Bounded songs (at most [`MAX_NOTES`] notes, overflow is an error)
//! - Playback state machine with pause/resume and stop
//! - Timer-driven background playback through a shared, lock-guarded context
//! - Offline WAV rendering and optional real-time output
//!
//! # Crate feature flags
//! - `streaming` (opt-in): Real-time audio output (enables optional `rodio` dep)
//!
//! # Quick start
//! ## Parse a song
//! ```
//! use rtttl_tone::parse_song;
//! let song = parse_song("test:d=4,o=5,b=120:4c,4d,4e", 0).unwrap();
//! assert_eq!(song.len(), 3);
//! assert_eq!(song.notes()[0].duration_ms, 500);
//! ```
//!
//! ## Background playback driven by a tick thread
//! ```no_run
//! use rtttl_tone::{PlayOptions, RtttlPlayer, SystemTimer, TickThread, ToneLog};
//! use std::time::Duration;
//!
//! let timer = SystemTimer::new();
//! let armed = timer.armed_flag();
//! let player = RtttlPlayer::new(ToneLog::new(), timer);
//! let _ticks = TickThread::spawn(player.ticker(), armed, Duration::from_millis(1));
//!
//! let options = PlayOptions { background: true, ..PlayOptions::default() };
//! player.parse_and_play("beep:d=8,o=6,b=180:c,e,g", options).unwrap();
//! while player.is_playing() {
//!     std::thread::sleep(Duration::from_millis(10));
//! }
//! ```

#![warn(missing_docs)]

pub mod config; // Player configuration
pub mod export; // Offline rendering
pub mod player; // Shared playback context
pub mod rtttl; // RTTTL parsing
pub mod sequencer; // Playback state machine
#[cfg(feature = "streaming")]
pub mod streaming; // Real-time audio output
pub mod tone; // Tone actuator seam

/// Error types for RTTTL parsing and playback
#[derive(thiserror::Error, Debug)]
pub enum RtttlError {
    /// The song name is not followed by the `:` header terminator
    #[error("Parse error: song name is not terminated by ':'")]
    MissingNameTerminator,

    /// The song holds more notes than a song can store
    #[error("Song exceeds the maximum of {capacity} notes")]
    CapacityExceeded {
        /// Maximum number of notes per song
        capacity: usize,
    },

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),

    /// Audio device error
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for parsing and playback operations
pub type Result<T> = std::result::Result<T, RtttlError>;

// Public API exports
pub use config::PlayerConfig;
pub use export::{export_to_wav, WavRenderer};
pub use player::{PlayOptions, RtttlPlayer, TickThread, Ticker};
pub use rtttl::{parse_song, Note, RtttlParser, Song, SongHeader, MAX_NOTES, SONG_NAME_LEN};
pub use sequencer::timer::{ManualTimer, SystemTimer, TimerSource};
pub use sequencer::{PlaybackMode, PlaybackState, Sequencer};
#[cfg(feature = "streaming")]
pub use streaming::{AudioOutput, RodioActuator};
pub use tone::{ToneActuator, ToneEvent, ToneLog, MAX_VOLUME};

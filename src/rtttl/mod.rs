//! RTTTL ringtone parser
//!
//! Converts RTTTL text into a [`Song`] in one linear pass.
//!
//! Format:
//! - Name: everything before the first `:` (first 19 characters kept)
//! - Header: optional `d=` (default duration), `o=` (default octave),
//!   `b=` (beats per minute), in that order, then `:`
//! - Notes: `[duration][c|d|e|f|g|a|b|p][#][.][octave]`, comma separated
//!
//! Malformed fields fall back to defaults and unknown note letters become
//! rests. The only hard errors are a missing name terminator and a song
//! longer than [`MAX_NOTES`].

pub mod header;
pub mod note_token;
pub mod pitch;

pub use header::SongHeader;

use arrayvec::ArrayVec;
use serde::Serialize;

use crate::{Result, RtttlError};

/// Maximum number of notes a song can hold
pub const MAX_NOTES: usize = 100;

/// Fixed width of a song name in characters
pub const SONG_NAME_LEN: usize = 19;

/// A single playable note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Note {
    /// Frequency in Hz (0 = rest)
    pub frequency: u32,
    /// Duration in milliseconds
    pub duration_ms: u32,
}

impl Note {
    /// Whether this note is silent
    pub fn is_rest(&self) -> bool {
        self.frequency == 0
    }
}

/// A parsed song: fixed-width name, header defaults and up to [`MAX_NOTES`] notes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Song {
    name: String,
    header: SongHeader,
    notes: ArrayVec<Note, MAX_NOTES>,
}

impl Song {
    /// Create an empty song with the given name (truncated/space-padded to [`SONG_NAME_LEN`])
    pub fn new(name: &str, header: SongHeader) -> Self {
        let mut padded: String = name.chars().take(SONG_NAME_LEN).collect();
        let width = padded.chars().count();
        padded.extend(std::iter::repeat(' ').take(SONG_NAME_LEN - width));
        Song {
            name: padded,
            header,
            notes: ArrayVec::new(),
        }
    }

    /// Append a note, failing once the song is full
    pub fn push(&mut self, note: Note) -> Result<()> {
        self.notes
            .try_push(note)
            .map_err(|_| RtttlError::CapacityExceeded {
                capacity: MAX_NOTES,
            })
    }

    /// Song name, space-padded to [`SONG_NAME_LEN`] characters
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Song name without the padding
    pub fn title(&self) -> &str {
        self.name.trim_end()
    }

    /// Header defaults the song was parsed with
    pub fn header(&self) -> &SongHeader {
        &self.header
    }

    /// Notes in playback order
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Note at `index`, if any
    pub fn get(&self, index: usize) -> Option<Note> {
        self.notes.get(index).copied()
    }

    /// Number of notes
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Whether the song has no notes
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Sum of all note durations
    pub fn total_duration_ms(&self) -> u64 {
        self.notes.iter().map(|n| u64::from(n.duration_ms)).sum()
    }

    /// Drop all notes and the name
    pub fn clear(&mut self) {
        *self = Song::default();
    }
}

/// Parse RTTTL text into a song, transposing every note by `octave_offset` octaves.
pub fn parse_song(text: &str, octave_offset: i8) -> Result<Song> {
    let (input, name) = header::song_name(text)?;
    let (header, mut input) = header::header_fields(input);
    let whole_note = header.whole_note_ms();
    log::trace!("Header {:?}, whole note {} ms", header, whole_note);

    let mut song = Song::new(name, header);
    while !input.is_empty() {
        if song.len() == MAX_NOTES {
            log::warn!("Song '{}' has more than {} notes", song.title(), MAX_NOTES);
            return Err(RtttlError::CapacityExceeded {
                capacity: MAX_NOTES,
            });
        }

        // The token grammar is fully optional and never fails.
        let Ok((rest, token)) = note_token::note_token(input) else {
            break;
        };
        input = rest;

        let divisor = if token.divisor > 0 {
            token.divisor
        } else {
            header.default_duration
        };
        let mut duration_ms = whole_note / divisor;
        if token.dotted {
            duration_ms += duration_ms / 2;
        }

        let octave = i32::from(token.octave.unwrap_or(header.default_octave))
            + i32::from(octave_offset);
        let note = Note {
            frequency: pitch::frequency(octave, token.semitone),
            duration_ms,
        };
        log::trace!("{:?} -> {:?}", token, note);
        song.push(note)?;
    }

    Ok(song)
}

/// RTTTL parser with a fixed transposition
#[derive(Debug, Clone, Copy, Default)]
pub struct RtttlParser {
    octave_offset: i8,
}

impl RtttlParser {
    /// Create a parser without transposition
    pub fn new() -> Self {
        RtttlParser { octave_offset: 0 }
    }

    /// Create a parser that shifts every note by `octave_offset` octaves
    pub fn with_octave_offset(octave_offset: i8) -> Self {
        RtttlParser { octave_offset }
    }

    /// Parse RTTTL text into a song
    pub fn parse(&self, text: &str) -> Result<Song> {
        parse_song(text, self.octave_offset)
    }

    /// Parser name
    pub fn name(&self) -> &str {
        "RTTTL Parser"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_creation() {
        let parser = RtttlParser::new();
        assert_eq!(parser.name(), "RTTTL Parser");
    }

    #[test]
    fn test_basic_song() {
        let song = parse_song("test:d=4,o=5,b=120:4c,4d,4e", 0).unwrap();
        assert_eq!(song.len(), 3);
        assert_eq!(song.title(), "test");
        assert_eq!(song.header().whole_note_ms(), 2000);
        let freqs: Vec<u32> = song.notes().iter().map(|n| n.frequency).collect();
        assert_eq!(freqs, vec![523, 587, 659]);
        assert!(song.notes().iter().all(|n| n.duration_ms == 500));
    }

    #[test]
    fn test_default_duration_applies() {
        let song = parse_song("t:d=8,o=5,b=120:c,2c", 0).unwrap();
        assert_eq!(song.notes()[0].duration_ms, 250);
        assert_eq!(song.notes()[1].duration_ms, 1000);
    }

    #[test]
    fn test_dotted_note() {
        let song = parse_song("t:d=4,o=5,b=120:4c.", 0).unwrap();
        assert_eq!(song.notes()[0].duration_ms, 750);
    }

    #[test]
    fn test_sharp_and_octave() {
        let song = parse_song("t:d=4,o=5,b=120:8f#6,a4", 0).unwrap();
        assert_eq!(song.notes()[0], Note { frequency: 1480, duration_ms: 250 });
        assert_eq!(song.notes()[1].frequency, 440);
    }

    #[test]
    fn test_rest_ignores_modifiers() {
        let song = parse_song("t:d=4,o=5,b=120:p,8p#.7", 0).unwrap();
        assert!(song.notes().iter().all(Note::is_rest));
        assert_eq!(song.notes()[1].duration_ms, 375);
    }

    #[test]
    fn test_octave_offset() {
        let song = parse_song("t:d=4,o=5,b=120:c,c6", 1).unwrap();
        assert_eq!(song.notes()[0].frequency, 1047);
        assert_eq!(song.notes()[1].frequency, 2093);
        let song = RtttlParser::with_octave_offset(-1).parse("t:d=4,o=5,b=120:a").unwrap();
        assert_eq!(song.notes()[0].frequency, 440);
    }

    #[test]
    fn test_name_is_padded_and_truncated() {
        let song = parse_song("abc:d=4:c", 0).unwrap();
        assert_eq!(song.name(), format!("abc{}", " ".repeat(16)));
        let song = parse_song("a very long song name indeed:d=4:c", 0).unwrap();
        assert_eq!(song.name(), "a very long song na");
        assert_eq!(song.name().len(), SONG_NAME_LEN);
    }

    #[test]
    fn test_missing_header_defaults() {
        let song = parse_song("plain::c", 0).unwrap();
        assert_eq!(song.len(), 1);
        assert_eq!(song.notes()[0], Note { frequency: 1047, duration_ms: 952 });
    }

    #[test]
    fn test_empty_note_list() {
        let song = parse_song("silent:d=4,o=5,b=100:", 0).unwrap();
        assert!(song.is_empty());
        assert_eq!(song.total_duration_ms(), 0);
    }

    #[test]
    fn test_capacity_limit() {
        let full = vec!["c"; MAX_NOTES].join(",");
        let song = parse_song(&format!("full:d=4,o=5,b=120:{}", full), 0).unwrap();
        assert_eq!(song.len(), MAX_NOTES);

        let over = vec!["c"; MAX_NOTES + 1].join(",");
        let result = parse_song(&format!("over:d=4,o=5,b=120:{}", over), 0);
        assert!(matches!(
            result,
            Err(RtttlError::CapacityExceeded { capacity: MAX_NOTES })
        ));
    }

    #[test]
    fn test_missing_terminator_is_error() {
        assert!(matches!(
            parse_song("nothing", 0),
            Err(RtttlError::MissingNameTerminator)
        ));
    }

    #[test]
    fn test_clear() {
        let mut song = parse_song("t:d=4,o=5,b=120:c,d", 0).unwrap();
        song.clear();
        assert!(song.is_empty());
        assert!(song.name().is_empty());
    }
}

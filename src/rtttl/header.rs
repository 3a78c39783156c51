//! Song name and header section
//!
//! `name:d=<duration>,o=<octave>,b=<bpm>:` - the three fields are optional
//! but, when present, appear in this order. Each field skips exactly two
//! bytes for its key and `=`, and one byte after its value, so a malformed
//! field swallows the byte that follows it.

use nom::bytes::complete::take_until;
use nom::character::complete::{anychar, char};
use nom::combinator::opt;
use nom::sequence::{pair, terminated};
use nom::IResult;
use serde::Serialize;

use super::note_token::decimal;
use crate::{Result, RtttlError};

/// Default note duration divisor when `d=` is absent
pub const DEFAULT_DURATION: u32 = 4;

/// Default octave when `o=` is absent
pub const DEFAULT_OCTAVE: u8 = 6;

/// Default tempo when `b=` is absent
pub const DEFAULT_BPM: u32 = 63;

/// Playback defaults declared by a song header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SongHeader {
    /// Duration divisor applied to notes without their own duration
    pub default_duration: u32,
    /// Octave applied to notes without their own octave digit
    pub default_octave: u8,
    /// Beats (quarter notes) per minute
    pub bpm: u32,
}

impl SongHeader {
    /// Length of a whole note in milliseconds
    pub fn whole_note_ms(&self) -> u32 {
        (60_000 / self.bpm) * 4
    }
}

impl Default for SongHeader {
    fn default() -> Self {
        SongHeader {
            default_duration: DEFAULT_DURATION,
            default_octave: DEFAULT_OCTAVE,
            bpm: DEFAULT_BPM,
        }
    }
}

/// Split off the song name, consuming the `:` that ends it.
pub fn song_name(input: &str) -> Result<(&str, &str)> {
    terminated(take_until(":"), char(':'))(input)
        .map_err(|_: nom::Err<nom::error::Error<&str>>| RtttlError::MissingNameTerminator)
}

/// Key byte plus the `=` that follows it, whatever that byte is.
fn field_key(key: char, input: &str) -> IResult<&str, (char, char)> {
    pair(char(key), anychar)(input)
}

fn duration_field(input: &str) -> IResult<&str, u32> {
    let (input, _) = field_key('d', input)?;
    terminated(decimal, opt(anychar))(input)
}

fn octave_field(input: &str) -> IResult<&str, Option<char>> {
    let (input, _) = field_key('o', input)?;
    terminated(opt(anychar), opt(anychar))(input)
}

fn bpm_field(input: &str) -> IResult<&str, u32> {
    let (input, _) = field_key('b', input)?;
    terminated(decimal, opt(anychar))(input)
}

/// Parse the header fields following the song name.
///
/// Returns the header and the remaining note list.
pub fn header_fields(input: &str) -> (SongHeader, &str) {
    let mut header = SongHeader::default();
    let mut input = input;

    if let Ok((rest, duration)) = duration_field(input) {
        if duration > 0 {
            header.default_duration = duration;
        } else {
            log::warn!("Ignoring zero default duration, keeping {}", header.default_duration);
        }
        input = rest;
    }

    if let Ok((rest, octave)) = octave_field(input) {
        match octave.and_then(|c| c.to_digit(10)) {
            Some(digit @ 3..=7) => header.default_octave = digit as u8,
            _ => log::warn!(
                "Ignoring default octave {:?}, keeping {}",
                octave,
                header.default_octave
            ),
        }
        input = rest;
    }

    if let Ok((rest, bpm)) = bpm_field(input) {
        if bpm > 0 {
            header.bpm = bpm;
        } else {
            log::warn!("Ignoring zero tempo, keeping {} bpm", header.bpm);
        }
        input = rest;
    }

    // The `b=` field swallows the closing ':'; without it the ':' is still pending.
    if let Some(rest) = input.strip_prefix(':') {
        input = rest;
    }

    (header, input)
}

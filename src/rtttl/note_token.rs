//! Note token grammar
//!
//! `[duration][letter][#][.][octave][,]` - every part is optional, so a token
//! parse never fails; it only stops consuming at the first character that
//! does not fit the next slot.

use nom::character::complete::{anychar, char, digit0, satisfy};
use nom::combinator::{map, opt};
use nom::IResult;

use super::pitch;

/// One note token as written in the note list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteToken {
    /// Duration divisor (4 = quarter note); 0 when absent
    pub divisor: u32,
    /// Semitone offset within the octave, 0 for a rest
    pub semitone: u8,
    /// Dotted note (duration increased by half)
    pub dotted: bool,
    /// Explicit octave digit
    pub octave: Option<u8>,
}

/// Unsigned decimal run; an empty run is 0, overlong runs saturate.
pub(crate) fn decimal(input: &str) -> IResult<&str, u32> {
    map(digit0, |digits: &str| {
        digits.bytes().fold(0u32, |n, b| {
            n.saturating_mul(10).saturating_add(u32::from(b - b'0'))
        })
    })(input)
}

/// Parse one note token, including its trailing comma.
pub fn note_token(input: &str) -> IResult<&str, NoteToken> {
    let (input, divisor) = decimal(input)?;
    let (input, letter) = opt(anychar)(input)?;
    let (input, sharp) = opt(char('#'))(input)?;
    let (input, dotted) = opt(char('.'))(input)?;
    let (input, octave) = opt(satisfy(|c| c.is_ascii_digit()))(input)?;
    let (input, _) = opt(char(','))(input)?;

    let mut semitone = letter.map_or(pitch::REST, pitch::semitone_for_letter);
    // A rest stays a rest, sharp or not.
    if sharp.is_some() && semitone != pitch::REST {
        semitone += 1;
    }

    Ok((
        input,
        NoteToken {
            divisor,
            semitone,
            dotted: dotted.is_some(),
            octave: octave.and_then(|c| c.to_digit(10)).map(|d| d as u8),
        },
    ))
}

//! Note frequency table
//!
//! Equal-tempered frequencies (rounded to whole Hz) from B0 up to D#8.
//! Notes are addressed by octave and a 1-based semitone offset within the
//! octave (C = 1 ... B = 12); a semitone offset of 0 is a rest.

/// Semitone offset used for rests
pub const REST: u8 = 0;

/// Lowest octave with a complete row in the table
pub const MIN_OCTAVE: i32 = 1;

/// Highest octave present in the table (only C8..D#8)
pub const MAX_OCTAVE: i32 = 8;

/// Frequencies in Hz, B0 first, then C1..B7, then C8..D#8.
const NOTE_FREQUENCIES: [u32; 89] = [
    31, // B0
    33, 35, 37, 39, 41, 44, 46, 49, 52, 55, 58, 62, // octave 1
    65, 69, 73, 78, 82, 87, 93, 98, 104, 110, 117, 123, // octave 2
    131, 139, 147, 156, 165, 175, 185, 196, 208, 220, 233, 247, // octave 3
    262, 277, 294, 311, 330, 349, 370, 392, 415, 440, 466, 494, // octave 4
    523, 554, 587, 622, 659, 698, 740, 784, 831, 880, 932, 988, // octave 5
    1047, 1109, 1175, 1245, 1319, 1397, 1480, 1568, 1661, 1760, 1865, 1976, // octave 6
    2093, 2217, 2349, 2489, 2637, 2794, 2960, 3136, 3322, 3520, 3729, 3951, // octave 7
    4186, 4435, 4699, 4978, // octave 8
];

/// Map an RTTTL note letter to its semitone offset.
///
/// Anything that is not a note letter (including `p`) is a rest.
pub fn semitone_for_letter(letter: char) -> u8 {
    match letter {
        'c' => 1,
        'd' => 3,
        'e' => 5,
        'f' => 6,
        'g' => 8,
        'a' => 10,
        'b' => 12,
        _ => REST,
    }
}

/// Resolve an octave and semitone offset to a frequency in Hz.
///
/// `semitone` may be 13 (a sharpened B), which lands on C of the next octave.
/// Positions outside the table saturate to the lowest or highest entry.
pub fn frequency(octave: i32, semitone: u8) -> u32 {
    if semitone == REST {
        return 0;
    }
    let last = (NOTE_FREQUENCIES.len() - 1) as i32;
    let index = (octave - MIN_OCTAVE) * 12 + i32::from(semitone);
    if !(0..=last).contains(&index) {
        log::warn!(
            "Octave {} is outside the note table, clamping pitch to the table range",
            octave
        );
    }
    NOTE_FREQUENCIES[index.clamp(0, last) as usize]
}

//! Lookup tables for articulation style and pitch
//!
//! Both tables are pure functions of their input. Frequencies are stored for
//! the reference octave 7 and derived for every other octave by shifting, so
//! each octave step halves or doubles the frequency.

/// RTX style character for staccato articulation (half of every slot is silent)
pub const STYLE_STACCATO: u8 = b'S';
/// RTX style character for natural articulation (1/16 of every slot is silent)
pub const STYLE_NATURAL: u8 = b'N';
/// RTX style character for continuous articulation (no gap between notes)
pub const STYLE_CONTINUOUS: u8 = b'C';

pub const STYLE_DIVISOR_STACCATO: u8 = 2;
pub const STYLE_DIVISOR_NATURAL: u8 = 16;
pub const STYLE_DIVISOR_CONTINUOUS: u8 = 0;

/// Octave whose frequencies are stored in [`NOTE_FREQUENCIES`]
pub const REFERENCE_OCTAVE: u8 = 7;

/// C7 through B7 in Hz
pub const NOTE_FREQUENCIES: [u16; 12] = [
    2093, 2217, 2349, 2489, 2637, 2794, 2960, 3136, 3322, 3520, 3729, 3951,
];

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Map an RTX style character to its divisor.
///
/// # Examples
/// ```
/// use rtttl::tables::style_divisor;
///
/// assert_eq!(style_divisor(b'S'), 2);
/// assert_eq!(style_divisor(b'N'), 16);
/// assert_eq!(style_divisor(b'C'), 0);
/// assert_eq!(style_divisor(b'5'), 5);
/// assert_eq!(style_divisor(b'x'), 0);
/// ```
pub fn style_divisor(style: u8) -> u8 {
    match style {
        STYLE_STACCATO => STYLE_DIVISOR_STACCATO,
        STYLE_NATURAL => STYLE_DIVISOR_NATURAL,
        b'1'..=b'9' => style - b'0',
        _ => STYLE_DIVISOR_CONTINUOUS,
    }
}

/// Semitone index of a note letter within the octave, `None` for a pause.
///
/// `h` is the German name for `b`. Anything that is not a note letter is a
/// pause, including `p` itself.
pub fn pitch_index(letter: u8) -> Option<u8> {
    match letter {
        b'c' => Some(0),
        b'd' => Some(2),
        b'e' => Some(4),
        b'f' => Some(5),
        b'g' => Some(7),
        b'a' => Some(9),
        b'b' | b'h' => Some(11),
        _ => None,
    }
}

/// Frequency in Hz of `semitone` (0..=12) in `octave`.
///
/// Semitone 12 (a sharpened `b`) is the C of the next octave.
///
/// # Examples
/// ```
/// use rtttl::tables::frequency;
///
/// assert_eq!(frequency(9, 7), 3520); // A7
/// assert_eq!(frequency(9, 4), 440);  // A4
/// assert_eq!(frequency(0, 8), 4186); // C8
/// assert_eq!(frequency(12, 5), frequency(0, 6));
/// ```
pub fn frequency(semitone: u8, octave: u8) -> u16 {
    let (semitone, octave) = if semitone >= 12 {
        (semitone % 12, octave.saturating_add(semitone / 12))
    } else {
        (semitone, octave)
    };
    let base = u32::from(NOTE_FREQUENCIES[semitone as usize]);
    let shifted = if octave <= REFERENCE_OCTAVE {
        base >> (REFERENCE_OCTAVE - octave)
    } else {
        // Digits stop at 9, so at most three doublings above the reference
        base << (octave - REFERENCE_OCTAVE).min(3)
    };
    u16::try_from(shifted).unwrap_or(u16::MAX)
}

/// Display name of a semitone index, e.g. `"D#"`.
pub fn note_name(semitone: u8) -> &'static str {
    NOTE_NAMES[(semitone % 12) as usize]
}

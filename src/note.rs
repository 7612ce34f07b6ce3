//! # Note Decoder
//!
//! Decodes one note token of the form
//! `[duration][pitch][#|_][.][octave][.][,]` into a [`DecodedNote`].
//!
//! Only the pitch letter is required. An unrecognised letter plays as a
//! pause. The slot length is `whole_note_ms / duration`, and each dot adds
//! half of the current slot length, so a second dot (seen after the octave
//! digit in some songs) lengthens an already dotted note by half again.

use serde::Serialize;

use crate::error::RtttlError;
use crate::header::{decode_header, Header, HeaderOptions};
use crate::source::{MelodySource, Scanner, SourceKind, END_OF_TEXT};
use crate::tables::{frequency, note_name, pitch_index};

/// What a note sounds like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Pitch {
    Pause,
    /// `semitone` is 0..=12 above C; 12 comes from a sharpened `b`
    Tone { semitone: u8, octave: u8 },
}

/// A fully resolved note.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedNote {
    pub pitch: Pitch,
    /// Duration number after applying the header default (4 = quarter note)
    pub duration_number: u32,
    /// Number of dots applied (0, 1 or 2)
    pub dots: u8,
    /// Total slot length including any silence
    pub duration_ms: u32,
    /// Byte offset of the token in the melody text
    pub position: usize,
}

impl DecodedNote {
    /// Output frequency in Hz, or `None` for a pause.
    pub fn frequency(&self) -> Option<u16> {
        match self.pitch {
            Pitch::Pause => None,
            Pitch::Tone { semitone, octave } => Some(frequency(semitone, octave)),
        }
    }

    /// How long the tone sounds within its slot for a style divisor.
    ///
    /// Divisor 0 means the tone fills the whole slot. Otherwise
    /// `slot / divisor` (rounded half up) at the end of the slot is silent.
    ///
    /// # Example
    /// ```
    /// use rtttl::note::{DecodedNote, Pitch};
    ///
    /// let note = DecodedNote {
    ///     pitch: Pitch::Tone { semitone: 0, octave: 5 },
    ///     duration_number: 4,
    ///     dots: 0,
    ///     duration_ms: 500,
    ///     position: 0,
    /// };
    /// assert_eq!(note.tone_ms(16), 469);
    /// assert_eq!(note.tone_ms(2), 250);
    /// assert_eq!(note.tone_ms(0), 500);
    /// ```
    pub fn tone_ms(&self, style_divisor: u8) -> u32 {
        if style_divisor == 0 {
            return self.duration_ms;
        }
        let divisor = u32::from(style_divisor);
        let silence = self.duration_ms.saturating_add(divisor / 2) / divisor;
        self.duration_ms.saturating_sub(silence)
    }

    /// Short human readable form such as `D#5 1/8.` or `P 1/4`.
    pub fn label(&self) -> String {
        let dots = ".".repeat(self.dots as usize);
        match self.pitch {
            Pitch::Pause => format!("P 1/{}{}", self.duration_number, dots),
            Pitch::Tone { semitone, octave } => {
                let octave = octave + semitone / 12;
                format!(
                    "{}{} 1/{}{}",
                    note_name(semitone),
                    octave,
                    self.duration_number,
                    dots
                )
            }
        }
    }
}

/// Decode the note token starting at `position`.
///
/// Returns the note and the position of the next token (after any comma).
///
/// # Errors
/// [`RtttlError::MalformedInput`] if the text ends where the pitch letter
/// is expected.
///
/// # Example
/// ```
/// use rtttl::header::{decode_header, HeaderOptions};
/// use rtttl::note::{decode_note, Pitch};
/// use rtttl::MelodySource;
///
/// let source = MelodySource::from("T:d=4,o=5,b=120:8d#.6,c");
/// let header = decode_header(source, &HeaderOptions::default()).unwrap();
/// let (note, next) = decode_note(source, header.first_note, &header).unwrap();
///
/// assert_eq!(note.pitch, Pitch::Tone { semitone: 3, octave: 6 });
/// assert_eq!(note.duration_ms, 375);
/// assert_eq!(source.byte_at(next), b'c');
/// ```
pub fn decode_note(
    source: MelodySource<'_>,
    position: usize,
    header: &Header,
) -> Result<(DecodedNote, usize), RtttlError> {
    let mut scanner = Scanner::new(source, position);

    let duration_number = match scanner.read_number() {
        0 => header.default_duration,
        number => number,
    };
    let mut duration_ms = header.whole_note_ms / duration_number.max(1);

    let letter = scanner.peek();
    if letter == END_OF_TEXT {
        return Err(RtttlError::malformed(
            scanner.position,
            "melody ended where a pitch letter was expected",
        ));
    }
    scanner.advance();
    let mut semitone = pitch_index(letter);

    if scanner.eat(b'#') || scanner.eat(b'_') {
        semitone = semitone.map(|s| s + 1);
    }

    let mut dots = 0;
    if scanner.eat(b'.') {
        duration_ms += duration_ms / 2;
        dots += 1;
    }

    let octave = if scanner.peek().is_ascii_digit() {
        let digit = scanner.peek() - b'0';
        scanner.advance();
        digit
    } else {
        header.default_octave
    };

    if scanner.eat(b'.') {
        duration_ms += duration_ms / 2;
        dots += 1;
    }

    scanner.eat(b',');

    let pitch = match semitone {
        Some(semitone) => Pitch::Tone { semitone, octave },
        None => Pitch::Pause,
    };
    let note = DecodedNote {
        pitch,
        duration_number,
        dots,
        duration_ms,
        position,
    };
    Ok((note, scanner.position))
}

/// Header and every note of a melody, decoded in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedMelody {
    pub source_kind: SourceKind,
    pub header: Header,
    pub notes: Vec<DecodedNote>,
}

impl DecodedMelody {
    /// Length of one pass through the melody.
    pub fn duration_ms(&self) -> u64 {
        self.notes.iter().map(|note| u64::from(note.duration_ms)).sum()
    }
}

/// Decode a whole melody once, without timing or looping.
///
/// # Example
/// ```
/// use rtttl::header::HeaderOptions;
/// use rtttl::{decode_melody, MelodySource};
///
/// let melody = decode_melody(
///     MelodySource::from("Test:d=4,o=5,b=63:c,8d#,4p,2c6."),
///     &HeaderOptions::default(),
/// )
/// .unwrap();
///
/// assert_eq!(melody.header.title, "Test");
/// assert_eq!(melody.notes.len(), 4);
/// assert_eq!(melody.duration_ms(), 952 + 476 + 952 + 2856);
/// ```
pub fn decode_melody(
    source: MelodySource<'_>,
    options: &HeaderOptions,
) -> Result<DecodedMelody, RtttlError> {
    let header = decode_header(source, options)?;
    let mut notes = Vec::new();
    let mut cursor = header.first_note;
    while !source.is_end(cursor) {
        let (note, next) = decode_note(source, cursor, &header)?;
        notes.push(note);
        cursor = next;
    }
    Ok(DecodedMelody {
        source_kind: source.kind(),
        header,
        notes,
    })
}

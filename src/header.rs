//! # Header Decoder
//!
//! Decodes the `title:key=value,...:` prefix of a melody into a [`Header`]
//! holding the resolved defaults for every note that follows.
//!
//! ## Recognised keys
//! - `d` - default duration number (4 when absent or 0)
//! - `o` - default octave, 3 to 7 (6 when absent or out of range)
//! - `b` - tempo in quarter notes per minute (63 when absent or 0)
//! - `s` - RTX articulation style, see [`crate::tables::style_divisor`]
//! - `l` - RTX loop count, `15` meaning forever
//!
//! Unknown keys are skipped up to the next `,` or `:`. The header must be
//! closed by a `:` within the configured maximum length.
//!
//! ## Example
//! ```rust
//! use rtttl::header::{decode_header, HeaderOptions};
//! use rtttl::MelodySource;
//!
//! let source = MelodySource::from("Test:d=8,o=5,b=120:c,d");
//! let header = decode_header(source, &HeaderOptions::default()).unwrap();
//!
//! assert_eq!(header.title, "Test");
//! assert_eq!(header.default_duration, 8);
//! assert_eq!(header.default_octave, 5);
//! assert_eq!(header.whole_note_ms, 2000);
//! assert_eq!(header.first_note, 19);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::RtttlError;
use crate::source::{MelodySource, Scanner, END_OF_TEXT};
use crate::tables::{style_divisor, STYLE_DIVISOR_NATURAL};

pub const DEFAULT_DURATION: u32 = 4;
pub const DEFAULT_OCTAVE: u8 = 6;
pub const DEFAULT_BPM: u32 = 63;
pub const MIN_OCTAVE: u8 = 3;
pub const MAX_OCTAVE: u8 = 7;
/// Loop count written in a header to request endless repetition
pub const LOOP_FOREVER_MARKER: u32 = 15;
/// Internal loop count meaning "repeat forever"
pub const LOOP_FOREVER: u32 = 0;
pub const DEFAULT_MAX_HEADER_LEN: usize = 256;

/// Melody dialect accepted by the header decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Plain RTTTL: `d`, `o` and `b` only
    Rtttl,
    /// RTX: adds `s` (style) and `l` (loops)
    #[default]
    Rtx,
}

/// Knobs that shape header decoding but are not part of the melody text.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderOptions {
    pub dialect: Dialect,
    /// Style divisor used when the header has no `s` field
    pub default_style: u8,
    /// Upper bound on the byte offset of the header's closing `:`
    pub max_header_len: usize,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::Rtx,
            default_style: STYLE_DIVISOR_NATURAL,
            max_header_len: DEFAULT_MAX_HEADER_LEN,
        }
    }
}

/// Resolved header defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub title: String,
    pub default_duration: u32,
    pub default_octave: u8,
    pub bpm: u32,
    /// Duration of a whole note at `bpm`
    pub whole_note_ms: u32,
    pub style_divisor: u8,
    /// 0 plays forever, 1 plays once, N plays N times
    pub loop_count: u32,
    /// Byte offset of the first note token
    pub first_note: usize,
}

impl Header {
    fn with_defaults(title: String, first_note: usize, default_style: u8) -> Self {
        Self {
            title,
            default_duration: DEFAULT_DURATION,
            default_octave: DEFAULT_OCTAVE,
            bpm: DEFAULT_BPM,
            whole_note_ms: whole_note_ms(DEFAULT_BPM),
            style_divisor: default_style,
            loop_count: 1,
            first_note,
        }
    }
}

/// Duration of a whole note in milliseconds for a tempo in quarter notes per minute.
///
/// # Example
/// ```
/// use rtttl::header::whole_note_ms;
///
/// assert_eq!(whole_note_ms(120), 2000);
/// assert_eq!(whole_note_ms(63), 3808);
/// ```
pub fn whole_note_ms(bpm: u32) -> u32 {
    (60_000 / bpm.max(1)) * 4
}

/// Extract the title of a melody without decoding anything else.
///
/// # Example
/// ```
/// use rtttl::{title, MelodySource};
///
/// let name = title(&MelodySource::from("Entertainer:d=4:c")).unwrap();
/// assert_eq!(name, "Entertainer");
/// ```
pub fn title(source: &MelodySource<'_>) -> Result<String, RtttlError> {
    title_with_limit(source, DEFAULT_MAX_HEADER_LEN)
}

/// Extract the title, allowing its `:` anywhere before `max_header_len`
/// bytes. Accepts exactly the titles [`decode_header`] accepts with the same
/// limit.
///
/// # Example
/// ```
/// use rtttl::header::title_with_limit;
/// use rtttl::MelodySource;
///
/// let source = MelodySource::from("Entertainer:d=4:c");
/// assert_eq!(title_with_limit(&source, 64).unwrap(), "Entertainer");
/// assert!(title_with_limit(&source, 8).is_err());
/// ```
pub fn title_with_limit(source: &MelodySource<'_>, max_header_len: usize) -> Result<String, RtttlError> {
    let mut scanner = Scanner::new(*source, 0);
    read_title(&mut scanner, max_header_len)
}

/// Copy at most `capacity - 1` bytes of the title, like filling a fixed
/// NUL-terminated buffer. Never fails; an unterminated title is returned as
/// far as it goes.
///
/// # Example
/// ```
/// use rtttl::header::title_bounded;
/// use rtttl::MelodySource;
///
/// let source = MelodySource::from("Entertainer:d=4:c");
/// assert_eq!(title_bounded(&source, 6), "Enter");
/// assert_eq!(title_bounded(&source, 16), "Entertainer");
/// ```
pub fn title_bounded(source: &MelodySource<'_>, capacity: usize) -> String {
    let mut bytes = Vec::new();
    let mut position = 0;
    while bytes.len() + 1 < capacity {
        match source.byte_at(position) {
            b':' | END_OF_TEXT => break,
            byte => bytes.push(byte),
        }
        position += 1;
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn read_title(scanner: &mut Scanner<'_>, max_len: usize) -> Result<String, RtttlError> {
    let mut bytes = Vec::new();
    loop {
        if scanner.position >= max_len {
            return Err(RtttlError::malformed(
                scanner.position,
                "title is not terminated by ':' within the header limit",
            ));
        }
        match scanner.peek() {
            b':' => {
                scanner.advance();
                return Ok(String::from_utf8_lossy(&bytes).into_owned());
            }
            END_OF_TEXT => {
                return Err(RtttlError::malformed(
                    scanner.position,
                    "melody ended before the ':' after the title",
                ))
            }
            byte => {
                bytes.push(byte);
                scanner.advance();
            }
        }
    }
}

/// Decode the title and parameter section of a melody.
///
/// # Errors
/// [`RtttlError::MalformedInput`] when the title or the parameter list is not
/// closed by `:` before the text ends or before `options.max_header_len` bytes.
pub fn decode_header(
    source: MelodySource<'_>,
    options: &HeaderOptions,
) -> Result<Header, RtttlError> {
    let mut scanner = Scanner::new(source, 0);
    let max_len = options.max_header_len;
    let title = read_title(&mut scanner, max_len)?;
    let mut header = Header::with_defaults(title, 0, options.default_style);

    loop {
        scanner.skip_spaces();
        if scanner.eat(b':') {
            break;
        }

        if scanner.peek_next() == b'=' {
            let key = scanner.peek();
            match (key, options.dialect) {
                (b'd', _) => {
                    skip_key(&mut scanner);
                    header.default_duration = match scanner.read_number() {
                        0 => DEFAULT_DURATION,
                        duration => duration,
                    };
                }
                (b'o', _) => {
                    skip_key(&mut scanner);
                    header.default_octave = read_octave(&mut scanner);
                }
                (b'b', _) => {
                    skip_key(&mut scanner);
                    header.bpm = match scanner.read_number() {
                        0 => DEFAULT_BPM,
                        bpm => bpm,
                    };
                    header.whole_note_ms = whole_note_ms(header.bpm);
                }
                (b's', Dialect::Rtx) => {
                    skip_key(&mut scanner);
                    let style = scanner.peek();
                    header.style_divisor = style_divisor(style);
                    if !is_separator(style) {
                        scanner.advance();
                    }
                }
                (b'l', Dialect::Rtx) => {
                    skip_key(&mut scanner);
                    header.loop_count = match scanner.read_number() {
                        LOOP_FOREVER_MARKER => LOOP_FOREVER,
                        loops => loops,
                    };
                }
                _ => {}
            }
        }

        // Whatever is left of this field, up to its separator
        loop {
            if scanner.position >= max_len {
                return Err(RtttlError::malformed(
                    scanner.position,
                    format!("header is not closed by ':' within {} bytes", max_len),
                ));
            }
            match scanner.peek() {
                b',' => {
                    scanner.advance();
                    break;
                }
                b':' => break,
                END_OF_TEXT => {
                    return Err(RtttlError::malformed(
                        scanner.position,
                        "melody ended inside the header",
                    ))
                }
                _ => scanner.advance(),
            }
        }
    }

    header.first_note = scanner.position;
    tracing::debug!(
        title = %header.title,
        duration = header.default_duration,
        octave = header.default_octave,
        bpm = header.bpm,
        style = header.style_divisor,
        loops = header.loop_count,
        "decoded header"
    );
    Ok(header)
}

fn skip_key(scanner: &mut Scanner<'_>) {
    scanner.advance();
    scanner.advance();
}

fn read_octave(scanner: &mut Scanner<'_>) -> u8 {
    let byte = scanner.peek();
    if !byte.is_ascii_digit() {
        return DEFAULT_OCTAVE;
    }
    scanner.advance();
    let octave = byte - b'0';
    if (MIN_OCTAVE..=MAX_OCTAVE).contains(&octave) {
        octave
    } else {
        DEFAULT_OCTAVE
    }
}

fn is_separator(byte: u8) -> bool {
    matches!(byte, b',' | b':' | END_OF_TEXT)
}

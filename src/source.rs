//! Melody text access
//!
//! A melody lives either in a caller-owned buffer or in a read-only store that
//! is only reachable through a byte-read primitive. Both are wrapped by
//! [`MelodySource`], which gives the decoders a single "byte at position"
//! view so there is exactly one decoding path for both kinds.

use std::fmt;

use serde::Serialize;

/// Value returned by [`MelodySource::byte_at`] once the text has ended.
pub const END_OF_TEXT: u8 = 0;

/// Where the bytes of a melody are fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Ordinary addressable memory owned by the caller
    Mutable,
    /// Read-only store accessed through [`ReadOnlyStore::read_byte`]
    ReadOnly,
}

/// Byte-read primitive for melodies kept in read-only storage.
///
/// Returning `None` marks the end of the addressable range.
pub trait ReadOnlyStore {
    fn read_byte(&self, address: usize) -> Option<u8>;
}

impl ReadOnlyStore for &str {
    fn read_byte(&self, address: usize) -> Option<u8> {
        self.as_bytes().get(address).copied()
    }
}

impl ReadOnlyStore for &[u8] {
    fn read_byte(&self, address: usize) -> Option<u8> {
        self.get(address).copied()
    }
}

impl ReadOnlyStore for Vec<u8> {
    fn read_byte(&self, address: usize) -> Option<u8> {
        self.get(address).copied()
    }
}

/// A borrowed melody text of either kind.
///
/// # Example
/// ```
/// use rtttl::{MelodySource, SourceKind};
///
/// const SONG: &str = "Beep:d=4:c";
/// let in_ram = MelodySource::from("Beep:d=4:c");
/// let in_rom = MelodySource::Store(&SONG);
///
/// assert_eq!(in_ram.kind(), SourceKind::Mutable);
/// assert_eq!(in_rom.kind(), SourceKind::ReadOnly);
/// assert_eq!(in_ram.byte_at(0), in_rom.byte_at(0));
/// ```
#[derive(Clone, Copy)]
pub enum MelodySource<'a> {
    Buffer(&'a [u8]),
    Store(&'a dyn ReadOnlyStore),
}

impl<'a> MelodySource<'a> {
    pub fn kind(&self) -> SourceKind {
        match self {
            MelodySource::Buffer(_) => SourceKind::Mutable,
            MelodySource::Store(_) => SourceKind::ReadOnly,
        }
    }

    /// Byte at `position`, or [`END_OF_TEXT`] past the end or at a NUL byte.
    pub fn byte_at(&self, position: usize) -> u8 {
        let byte = match self {
            MelodySource::Buffer(bytes) => bytes.get(position).copied(),
            MelodySource::Store(store) => store.read_byte(position),
        };
        byte.unwrap_or(END_OF_TEXT)
    }

    pub fn is_end(&self, position: usize) -> bool {
        self.byte_at(position) == END_OF_TEXT
    }
}

impl fmt::Debug for MelodySource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MelodySource::Buffer(bytes) => f
                .debug_tuple("Buffer")
                .field(&String::from_utf8_lossy(bytes))
                .finish(),
            MelodySource::Store(_) => f.write_str("Store(..)"),
        }
    }
}

impl<'a> From<&'a str> for MelodySource<'a> {
    fn from(text: &'a str) -> Self {
        MelodySource::Buffer(text.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for MelodySource<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        MelodySource::Buffer(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for MelodySource<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        MelodySource::Buffer(bytes.as_slice())
    }
}

/// Forward-only reader shared by the header and note decoders.
pub(crate) struct Scanner<'a> {
    source: MelodySource<'a>,
    pub(crate) position: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(source: MelodySource<'a>, position: usize) -> Self {
        Self { source, position }
    }

    pub(crate) fn peek(&self) -> u8 {
        self.source.byte_at(self.position)
    }

    pub(crate) fn peek_next(&self) -> u8 {
        self.source.byte_at(self.position + 1)
    }

    pub(crate) fn advance(&mut self) {
        self.position += 1;
    }

    /// Consume the current byte if it equals `expected`.
    pub(crate) fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a run of ASCII digits. An empty run reads as 0.
    pub(crate) fn read_number(&mut self) -> u32 {
        let mut value: u32 = 0;
        while self.peek().is_ascii_digit() {
            let digit = u32::from(self.peek() - b'0');
            value = value.saturating_mul(10).saturating_add(digit);
            self.advance();
        }
        value
    }

    pub(crate) fn skip_spaces(&mut self) {
        while self.peek() == b' ' {
            self.advance();
        }
    }
}

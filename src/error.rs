//! # Error Types
//!
//! All fallible operations in this crate return [`RtttlError`].
//!
//! Melody errors carry the byte offset into the melody text where decoding
//! gave up, so callers can point at the offending character.
//!
//! ## Usage
//! ```rust
//! use rtttl::{title, MelodySource, RtttlError};
//!
//! match title(&MelodySource::from("no colon here")) {
//!     Ok(name) => println!("Now playing: {}", name),
//!     Err(RtttlError::MalformedInput { position, message }) => {
//!         eprintln!("Bad melody at byte {}: {}", position, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RtttlError {
    /// The melody text cannot be decoded.
    ///
    /// Raised for a title without a terminating `:`, a header that is not
    /// closed within the configured length, or text that ends where a pitch
    /// letter is required.
    ///
    /// # Example
    /// ```
    /// # use rtttl::RtttlError;
    /// let err = RtttlError::MalformedInput {
    ///     position: 12,
    ///     message: "expected a pitch letter".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Malformed input at byte 12: expected a pitch letter");
    /// ```
    #[error("Malformed input at byte {position}: {message}")]
    MalformedInput { position: usize, message: String },

    /// Invalid player settings.
    ///
    /// # Example
    /// ```
    /// # use rtttl::RtttlError;
    /// let err = RtttlError::ConfigError("max-header-len must be at least 2".to_string());
    /// assert_eq!(err.to_string(), "Invalid settings: max-header-len must be at least 2");
    /// ```
    #[error("Invalid settings: {0}")]
    ConfigError(String),

    /// A random pick was requested from an empty melody list.
    #[error("No melodies to choose from")]
    NoMelodies,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RtttlError {
    pub(crate) fn malformed(position: usize, message: impl Into<String>) -> Self {
        RtttlError::MalformedInput {
            position,
            message: message.into(),
        }
    }
}

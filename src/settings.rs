//! Player settings loaded from YAML
//!
//! Every key is optional:
//!
//! ```yaml
//! tone-pin-inverted: false
//! default-style: N        # S, N, C or a digit 1-9
//! dialect: rtx            # rtttl or rtx
//! max-header-len: 256
//! loops: 2                # overrides the header loop count, 0 = forever
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::RtttlError;
use crate::header::{Dialect, HeaderOptions, DEFAULT_MAX_HEADER_LEN};
use crate::tables::{
    style_divisor, STYLE_CONTINUOUS, STYLE_DIVISOR_NATURAL, STYLE_NATURAL, STYLE_STACCATO,
};

/// Settings as written in the YAML file.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawSettings {
    tone_pin_inverted: Option<bool>,
    default_style: Option<StyleValue>,
    dialect: Option<Dialect>,
    max_header_len: Option<usize>,
    loops: Option<u32>,
}

/// A style written either as a bare divisor or as a style character.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum StyleValue {
    Divisor(u8),
    Name(String),
}

/// Validated player settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    pub tone_pin_inverted: bool,
    /// Style divisor used when a melody has no `s` field
    pub default_style: u8,
    pub dialect: Dialect,
    pub max_header_len: usize,
    /// Loop count forced onto every melody after it starts
    pub loops: Option<u32>,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            tone_pin_inverted: false,
            default_style: STYLE_DIVISOR_NATURAL,
            dialect: Dialect::Rtx,
            max_header_len: DEFAULT_MAX_HEADER_LEN,
            loops: None,
        }
    }
}

impl PlayerSettings {
    /// Parse settings from YAML text.
    ///
    /// # Example
    /// ```
    /// use rtttl::PlayerSettings;
    ///
    /// let settings = PlayerSettings::from_yaml("default-style: S\nloops: 3\n").unwrap();
    /// assert_eq!(settings.default_style, 2);
    /// assert_eq!(settings.loops, Some(3));
    /// assert!(!settings.tone_pin_inverted);
    /// ```
    pub fn from_yaml(content: &str) -> Result<Self, RtttlError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawSettings =
            serde_yaml::from_str(content).map_err(|e| RtttlError::ConfigError(e.to_string()))?;

        let mut settings = Self::default();
        if let Some(inverted) = raw.tone_pin_inverted {
            settings.tone_pin_inverted = inverted;
        }
        match &raw.default_style {
            Some(StyleValue::Divisor(divisor)) => settings.default_style = *divisor,
            Some(StyleValue::Name(style)) => settings.default_style = parse_style(style)?,
            None => {}
        }
        if let Some(dialect) = raw.dialect {
            settings.dialect = dialect;
        }
        if let Some(max_header_len) = raw.max_header_len {
            if max_header_len < 2 {
                return Err(RtttlError::ConfigError(
                    "max-header-len must be at least 2".to_string(),
                ));
            }
            settings.max_header_len = max_header_len;
        }
        settings.loops = raw.loops;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RtttlError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn header_options(&self) -> HeaderOptions {
        HeaderOptions {
            dialect: self.dialect,
            default_style: self.default_style,
            max_header_len: self.max_header_len,
        }
    }
}

/// Parse a style given either as an RTX style character or as a divisor number.
///
/// # Example
/// ```
/// use rtttl::settings::parse_style;
///
/// assert_eq!(parse_style("N").unwrap(), 16);
/// assert_eq!(parse_style("C").unwrap(), 0);
/// assert_eq!(parse_style("32").unwrap(), 32);
/// assert!(parse_style("staccato").is_err());
/// ```
pub fn parse_style(style: &str) -> Result<u8, RtttlError> {
    let style = style.trim();
    match style.as_bytes() {
        [letter @ (STYLE_STACCATO | STYLE_NATURAL | STYLE_CONTINUOUS | b'1'..=b'9')] => {
            Ok(style_divisor(*letter))
        }
        _ => style
            .parse::<u8>()
            .map_err(|_| RtttlError::ConfigError(format!("Invalid style: {}", style))),
    }
}

//! Built-in melodies
//!
//! A handful of public domain tunes kept as static text, meant to be played
//! through the read-only source kind.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::header::title_bounded;
use crate::source::MelodySource;

pub const ODE_TO_JOY: &str = "OdeToJoy:d=4,o=5,b=140:e,e,f,g,g,f,e,d,c,c,d,e,e.,8d,2d,e,e,f,g,g,f,e,d,c,c,d,e,d.,8c,2c";

pub const FUR_ELISE: &str = "FurElise:d=8,o=5,b=125:32p,e6,d#6,e6,d#6,e6,b,d6,c6,4a.,32p,c,e,a,4b.,32p,e,g#,b,4c6.,32p,e,e6,d#6,e6,d#6,e6,b,d6,c6,4a.";

/// Uses the dot-after-octave form (`c6.`) found in many copies of this song
pub const SILENT_NIGHT: &str = "SilentNight:d=4,o=5,b=112:g.,8a,g,2e.,g.,8a,g,2e.,2d6,d6,2b.,2c6,c6,2g.,2a,a,c6.,8b,a,g.,8a,g,2e.";

pub const JINGLE_BELLS: &str = "JingleBells:d=8,o=5,b=112:a,a,4a,a,a,4a,a,c6,f.,16g,2a,a#,a#,a#.,16a#,a#,a,a.,16a,a,g,g,a,4g,4c6";

/// RTX sample: staccato, played twice
pub const SCALE: &str = "Scale:d=8,o=5,b=180,s=S,l=2:c,d,e,f,g,a,b,c6";

pub const WESTMINSTER: &str = "Westminster:d=4,o=5,b=80,s=N:e,c,d,2g4,g4,d,e,2c,e,d,c,2g4";

pub static SAMPLES: &[&str] = &[
    ODE_TO_JOY,
    FUR_ELISE,
    SILENT_NIGHT,
    JINGLE_BELLS,
    SCALE,
    WESTMINSTER,
];

/// Look up a built-in melody by title, ignoring case.
///
/// # Example
/// ```
/// use rtttl::songs;
///
/// assert_eq!(songs::find("furelise"), Some(songs::FUR_ELISE));
/// assert_eq!(songs::find("Nope"), None);
/// ```
pub fn find(name: &str) -> Option<&'static str> {
    SAMPLES.iter().copied().find(|melody| {
        let source = MelodySource::Buffer(melody.as_bytes());
        title_bounded(&source, melody.len() + 1).eq_ignore_ascii_case(name)
    })
}

/// Titles of all built-in melodies.
pub fn titles() -> Vec<String> {
    SAMPLES
        .iter()
        .map(|melody| title_bounded(&MelodySource::Buffer(melody.as_bytes()), melody.len() + 1))
        .collect()
}

/// Pick one melody uniformly at random.
pub fn choose<'s, R: Rng + ?Sized>(melodies: &'s [&'s str], rng: &mut R) -> Option<&'s &'s str> {
    melodies.choose(rng)
}

pub mod clock;
pub mod error;
pub mod header;
pub mod note;
pub mod sequencer;
pub mod settings;
pub mod songs;
pub mod source;
pub mod tables;
pub mod tone;

pub use error::*;
pub use header::{decode_header, title, Dialect, Header, HeaderOptions};
pub use note::{decode_melody, decode_note, DecodedMelody, DecodedNote, Pitch};
pub use sequencer::{Completion, PlaybackState, Sequencer, SequencerState};
pub use settings::PlayerSettings;
pub use source::{MelodySource, ReadOnlyStore, SourceKind};
pub use tone::{ToneCommand, ToneOutput};

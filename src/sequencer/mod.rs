//! # Sequencer Module
//!
//! Plays RTTTL/RTX melodies note by note without blocking the caller.
//!
//! ## Purpose
//! A melody lasts seconds, but the code that wants to play it usually has a
//! main loop with other work to do. The sequencer keeps its place in the
//! melody text and the time at which the current note ends, so the caller
//! only has to call [`Sequencer::advance`] on every pass of its loop.
//!
//! ## Sub-modules
//! - `types` - lifecycle state, completion handler, playback position
//! - `engine` - the [`Sequencer`] itself
//!
//! ## Lifecycle
//! `Idle` → [`Sequencer::start`] → `Playing` → end of text, [`Sequencer::stop`]
//! or a decode error → `Stopped`. Starting again from any state replaces the
//! current melody.
//!
//! ## Looping
//! The loop count comes from the `l` header field (RTX), a settings override,
//! or [`Sequencer::set_number_of_loops`] while playing. At the end of the
//! text a count of 0 rewinds forever, a count above 1 is decremented and
//! rewinds, and a count of 1 finishes.
//!
//! ## Example
//! ```rust
//! use std::cell::Cell;
//!
//! use rtttl::clock::ManualClock;
//! use rtttl::tone::RecordingTone;
//! use rtttl::{Completion, MelodySource, Sequencer};
//!
//! let done = Cell::new(false);
//! let clock = ManualClock::default();
//! let mut sequencer = Sequencer::new(RecordingTone::default(), clock.clone());
//!
//! sequencer
//!     .start(
//!         MelodySource::from("Beep:d=8,b=120:c6,p,c6"),
//!         Completion::once(|| done.set(true)),
//!     )
//!     .unwrap();
//!
//! while sequencer.advance() {
//!     clock.advance(10);
//! }
//! assert!(done.get());
//! ```

mod engine;
mod types;

#[cfg(test)]
mod tests;

pub use engine::Sequencer;
pub use types::{Completion, PlaybackState, SequencerState};

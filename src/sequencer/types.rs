//! Sequencer state types

use std::fmt;

use serde::Serialize;

use crate::header::{Header, LOOP_FOREVER};
use crate::source::SourceKind;

/// Lifecycle of a [`super::Sequencer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SequencerState {
    /// Nothing has been started yet
    Idle,
    Playing,
    /// Finished, stopped, or failed to start; a new start is required
    Stopped,
}

/// What to do when a melody finishes on its own.
///
/// The handler runs at most once: on natural end of the melody, or when a
/// decode error ends it early. Explicit [`super::Sequencer::stop`] and
/// replacing the melody with a new start drop it without running it.
#[derive(Default)]
pub enum Completion<'a> {
    #[default]
    None,
    InvokeOnce(Box<dyn FnOnce() + 'a>),
}

impl<'a> Completion<'a> {
    pub fn none() -> Self {
        Completion::None
    }

    pub fn once(handler: impl FnOnce() + 'a) -> Self {
        Completion::InvokeOnce(Box::new(handler))
    }

    /// Run the handler if there is one, leaving `None` behind.
    pub(crate) fn fire(&mut self) {
        if let Completion::InvokeOnce(handler) = std::mem::take(self) {
            handler();
        }
    }
}

impl fmt::Debug for Completion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::None => f.write_str("None"),
            Completion::InvokeOnce(_) => f.write_str("InvokeOnce(..)"),
        }
    }
}

/// Position and live parameters of the melody being played.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub source_kind: SourceKind,
    /// Header as decoded at start; note defaults are read from here
    pub header: Header,
    pub style_divisor: u8,
    /// 0 forever, 1 last pass, N passes left
    pub loop_count: u32,
    /// Byte offset of the next note token
    pub cursor: usize,
    /// Where a new pass starts
    pub loop_start_cursor: usize,
    /// Clock time at which the current slot ends, `None` when due now
    pub next_action_time: Option<u32>,
}

impl PlaybackState {
    pub(crate) fn new(source_kind: SourceKind, header: Header) -> Self {
        Self {
            source_kind,
            style_divisor: header.style_divisor,
            loop_count: header.loop_count,
            cursor: header.first_note,
            loop_start_cursor: header.first_note,
            next_action_time: None,
            header,
        }
    }

    /// Apply the loop policy at the end of the text. Returns `true` when
    /// another pass should be played.
    pub(crate) fn take_loop(&mut self) -> bool {
        match self.loop_count {
            LOOP_FOREVER => true,
            1 => false,
            _ => {
                self.loop_count -= 1;
                true
            }
        }
    }

    pub(crate) fn rewind(&mut self) {
        self.cursor = self.loop_start_cursor;
        self.next_action_time = None;
    }
}

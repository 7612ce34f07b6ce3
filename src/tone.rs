//! Tone output adapter
//!
//! The sequencer drives a single square-wave output through [`ToneOutput`].
//! Implementations decide what a tone actually is: a PWM pin, a speaker, a
//! log line or a recorded command list.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

/// Square-wave output device.
pub trait ToneOutput {
    /// Start a tone. With `duration_ms` the device silences itself after that
    /// long; without it the tone runs until the next command.
    fn start_tone(&mut self, frequency_hz: u16, duration_ms: Option<u32>);

    /// Stop any tone. Leaves the output line low.
    fn stop_tone(&mut self);

    /// Drive the output line high. Used after [`ToneOutput::stop_tone`] when
    /// the output polarity is inverted.
    fn drive_high(&mut self);
}

/// One command issued to a [`ToneOutput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "command")]
pub enum ToneCommand {
    Start {
        frequency_hz: u16,
        duration_ms: Option<u32>,
    },
    Stop,
    DriveHigh,
}

/// Output that records every command, shareable between the sequencer and
/// whoever inspects it.
///
/// # Example
/// ```
/// use rtttl::tone::{RecordingTone, ToneCommand, ToneOutput};
///
/// let recorder = RecordingTone::default();
/// let mut output = recorder.clone();
/// output.start_tone(440, None);
/// output.stop_tone();
///
/// assert_eq!(
///     recorder.commands(),
///     vec![
///         ToneCommand::Start { frequency_hz: 440, duration_ms: None },
///         ToneCommand::Stop,
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingTone {
    commands: Rc<RefCell<Vec<ToneCommand>>>,
}

impl RecordingTone {
    pub fn commands(&self) -> Vec<ToneCommand> {
        self.commands.borrow().clone()
    }

    pub fn last(&self) -> Option<ToneCommand> {
        self.commands.borrow().last().copied()
    }

    pub fn clear(&self) {
        self.commands.borrow_mut().clear();
    }
}

impl ToneOutput for RecordingTone {
    fn start_tone(&mut self, frequency_hz: u16, duration_ms: Option<u32>) {
        self.commands.borrow_mut().push(ToneCommand::Start {
            frequency_hz,
            duration_ms,
        });
    }

    fn stop_tone(&mut self) {
        self.commands.borrow_mut().push(ToneCommand::Stop);
    }

    fn drive_high(&mut self) {
        self.commands.borrow_mut().push(ToneCommand::DriveHigh);
    }
}

/// Output that reports commands as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTone;

impl ToneOutput for LogTone {
    fn start_tone(&mut self, frequency_hz: u16, duration_ms: Option<u32>) {
        match duration_ms {
            Some(duration_ms) => tracing::info!(frequency_hz, duration_ms, "tone"),
            None => tracing::info!(frequency_hz, "tone"),
        }
    }

    fn stop_tone(&mut self) {
        tracing::info!("silence");
    }

    fn drive_high(&mut self) {
        tracing::debug!("output held high");
    }
}

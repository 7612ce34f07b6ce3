//! Cooperative playback engine
//!
//! [`Sequencer::advance`] is meant to be called on every pass of the caller's
//! main loop. Each call either returns at once because the current note is
//! still sounding, or decodes and emits exactly one note. Nothing here blocks
//! except [`Sequencer::play_blocking`].

use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::clock::{is_due, Clock, SystemClock};
use crate::error::RtttlError;
use crate::header::decode_header;
use crate::note::{decode_note, DecodedNote};
use crate::settings::PlayerSettings;
use crate::songs;
use crate::source::{MelodySource, SourceKind};
use crate::tone::ToneOutput;

use super::types::{Completion, PlaybackState, SequencerState};

/// Idle wait between advances in [`Sequencer::play_blocking`]
const BLOCKING_POLL: Duration = Duration::from_millis(1);

/// Non-blocking RTTTL/RTX player driving one [`ToneOutput`].
///
/// # Example
/// ```rust
/// use rtttl::clock::ManualClock;
/// use rtttl::tone::{RecordingTone, ToneCommand};
/// use rtttl::{Completion, MelodySource, Sequencer};
///
/// let clock = ManualClock::default();
/// let tone = RecordingTone::default();
/// let mut sequencer = Sequencer::new(tone.clone(), clock.clone());
///
/// sequencer
///     .start(MelodySource::from("Two:d=4,o=5,b=120,s=C:c,e"), Completion::none())
///     .unwrap();
/// assert_eq!(
///     tone.last(),
///     Some(ToneCommand::Start { frequency_hz: 523, duration_ms: None })
/// );
///
/// clock.advance(499);
/// assert!(sequencer.advance()); // C is still sounding
/// clock.advance(1);
/// assert!(sequencer.advance()); // E starts
/// clock.advance(500);
/// assert!(!sequencer.advance()); // finished
/// ```
pub struct Sequencer<'a, T: ToneOutput, C: Clock = SystemClock> {
    tone: T,
    clock: C,
    settings: PlayerSettings,
    state: SequencerState,
    source: Option<MelodySource<'a>>,
    playback: Option<PlaybackState>,
    on_complete: Completion<'a>,
    last_error: Option<RtttlError>,
}

impl<'a, T: ToneOutput, C: Clock> Sequencer<'a, T, C> {
    pub fn new(tone: T, clock: C) -> Self {
        Self::with_settings(tone, clock, PlayerSettings::default())
    }

    pub fn with_settings(tone: T, clock: C, settings: PlayerSettings) -> Self {
        Self {
            tone,
            clock,
            settings,
            state: SequencerState::Idle,
            source: None,
            playback: None,
            on_complete: Completion::None,
            last_error: None,
        }
    }

    /// Start playing a melody and emit its first note before returning.
    ///
    /// A melody that is still playing is cut off first; its completion
    /// handler is dropped without being called.
    ///
    /// # Errors
    /// [`RtttlError::MalformedInput`] if the header cannot be decoded. The
    /// sequencer is then stopped and silent.
    pub fn start(
        &mut self,
        source: MelodySource<'a>,
        on_complete: Completion<'a>,
    ) -> Result<(), RtttlError> {
        let replacing = self.state == SequencerState::Playing;
        if replacing {
            tracing::debug!("replacing the melody that is playing");
            self.silence();
        }
        self.on_complete = Completion::None;
        self.last_error = None;

        let header = match decode_header(source, &self.settings.header_options()) {
            Ok(header) => header,
            Err(err) => {
                tracing::warn!(error = %err, "cannot start melody");
                self.state = SequencerState::Stopped;
                self.source = None;
                self.playback = None;
                if !replacing {
                    self.silence();
                }
                return Err(err);
            }
        };

        let mut playback = PlaybackState::new(source.kind(), header);
        if let Some(loops) = self.settings.loops {
            playback.loop_count = loops;
        }
        tracing::info!(
            title = %playback.header.title,
            source = ?playback.source_kind,
            loops = playback.loop_count,
            "start melody"
        );

        self.source = Some(source);
        self.playback = Some(playback);
        self.on_complete = on_complete;
        self.state = SequencerState::Playing;

        self.advance();
        Ok(())
    }

    /// Start a random melody from `melodies`, played from the read-only
    /// source kind. Returns its title.
    ///
    /// # Errors
    /// [`RtttlError::NoMelodies`] for an empty list, otherwise as [`Sequencer::start`].
    pub fn start_random<R: Rng + ?Sized>(
        &mut self,
        melodies: &'a [&'a str],
        rng: &mut R,
        on_complete: Completion<'a>,
    ) -> Result<String, RtttlError> {
        let melody = songs::choose(melodies, rng).ok_or(RtttlError::NoMelodies)?;
        self.start(MelodySource::Store(melody), on_complete)?;
        Ok(self
            .playback
            .as_ref()
            .map(|playback| playback.header.title.clone())
            .unwrap_or_default())
    }

    /// Play the next note if its time has come.
    ///
    /// Returns `true` while the melody is playing and `false` once it has
    /// finished or was stopped.
    pub fn advance(&mut self) -> bool {
        if self.state != SequencerState::Playing {
            return false;
        }
        let (source, playback) = match (self.source, self.playback.as_mut()) {
            (Some(source), Some(playback)) => (source, playback),
            _ => return false,
        };

        let now = self.clock.now_ms();
        if let Some(due) = playback.next_action_time {
            if !is_due(now, due) {
                return true;
            }
        }

        if source.is_end(playback.cursor) {
            let has_notes = !source.is_end(playback.loop_start_cursor);
            if has_notes && playback.take_loop() {
                tracing::info!(loops = playback.loop_count, "loop melody");
                playback.rewind();
                return self.advance();
            }
            self.finish(None);
            return false;
        }

        match decode_note(source, playback.cursor, &playback.header) {
            Ok((note, next)) => {
                playback.cursor = next;
                playback.next_action_time = Some(now.wrapping_add(note.duration_ms));
                let style_divisor = playback.style_divisor;
                self.emit(&note, style_divisor);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "melody ended early");
                self.finish(Some(err));
                false
            }
        }
    }

    /// Stop playback at once and silence the output. The completion handler
    /// is not called.
    pub fn stop(&mut self) {
        if self.state == SequencerState::Playing {
            tracing::info!("stop melody");
        }
        self.silence();
        self.on_complete = Completion::None;
        if self.state != SequencerState::Idle {
            self.state = SequencerState::Stopped;
        }
    }

    /// Start a melody and keep advancing it until it ends.
    ///
    /// # Errors
    /// A header error from [`Sequencer::start`], or the decode error that
    /// ended the melody early.
    pub fn play_blocking(&mut self, source: MelodySource<'a>) -> Result<(), RtttlError> {
        self.start(source, Completion::None)?;
        while self.advance() {
            thread::sleep(BLOCKING_POLL);
        }
        match self.last_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Signal silence with a high line instead of a low one.
    pub fn set_tone_pin_inverted(&mut self, inverted: bool) {
        self.settings.tone_pin_inverted = inverted;
    }

    /// Style divisor for melodies without an `s` field, from the next start on.
    pub fn set_default_style(&mut self, divisor: u8) {
        self.settings.default_style = divisor;
    }

    /// Override the remaining loop count of the melody that is playing,
    /// effective at the next end of the text. 0 loops forever.
    pub fn set_number_of_loops(&mut self, loops: u32) {
        match self.playback.as_mut() {
            Some(playback) if self.state == SequencerState::Playing => {
                tracing::debug!(loops, "set number of loops");
                playback.loop_count = loops;
            }
            _ => tracing::debug!(loops, "no melody playing, loop count ignored"),
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == SequencerState::Playing
    }

    /// State of the current (or last) melody.
    pub fn playback(&self) -> Option<&PlaybackState> {
        self.playback.as_ref()
    }

    pub fn source_kind(&self) -> Option<SourceKind> {
        self.playback.as_ref().map(|playback| playback.source_kind)
    }

    /// Error that ended the last melody early, if any.
    pub fn last_error(&self) -> Option<&RtttlError> {
        self.last_error.as_ref()
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn tone(&self) -> &T {
        &self.tone
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn emit(&mut self, note: &DecodedNote, style_divisor: u8) {
        match note.frequency() {
            Some(frequency_hz) => {
                let duration_ms = match style_divisor {
                    0 => None,
                    divisor => Some(note.tone_ms(divisor)),
                };
                tracing::debug!(
                    note = %note.label(),
                    frequency_hz,
                    slot_ms = note.duration_ms,
                    "play note"
                );
                self.tone.start_tone(frequency_hz, duration_ms);
            }
            None => {
                tracing::debug!(note = %note.label(), slot_ms = note.duration_ms, "play pause");
                self.silence();
            }
        }
    }

    fn silence(&mut self) {
        self.tone.stop_tone();
        if self.settings.tone_pin_inverted {
            self.tone.drive_high();
        }
    }

    fn finish(&mut self, error: Option<RtttlError>) {
        tracing::info!("melody finished");
        self.state = SequencerState::Stopped;
        self.silence();
        self.last_error = error;
        self.on_complete.fire();
    }
}

use std::cell::Cell;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;
use crate::clock::{Clock, ManualClock};
use crate::error::RtttlError;
use crate::settings::PlayerSettings;
use crate::songs;
use crate::source::{MelodySource, SourceKind};
use crate::tone::{RecordingTone, ToneCommand};

fn sequencer<'a>() -> (Sequencer<'a, RecordingTone, ManualClock>, RecordingTone, ManualClock) {
    let tone = RecordingTone::default();
    let clock = ManualClock::default();
    (Sequencer::new(tone.clone(), clock.clone()), tone, clock)
}

fn start_tone(frequency_hz: u16, duration_ms: Option<u32>) -> ToneCommand {
    ToneCommand::Start {
        frequency_hz,
        duration_ms,
    }
}

/// Advance with the clock jumping straight to each due time; returns the
/// number of advances until the melody finished.
fn run_to_end(sequencer: &mut Sequencer<'_, RecordingTone, ManualClock>, clock: &ManualClock) -> usize {
    let mut advances = 0;
    loop {
        let due = sequencer
            .playback()
            .and_then(|playback| playback.next_action_time);
        if let Some(due) = due {
            clock.set(due);
        }
        advances += 1;
        if !sequencer.advance() {
            return advances;
        }
        assert!(advances < 10_000, "melody did not finish");
    }
}

#[test]
fn test_starts_idle() {
    let (mut sequencer, tone, _) = sequencer();
    assert_eq!(sequencer.state(), SequencerState::Idle);
    assert!(!sequencer.advance());
    assert!(tone.commands().is_empty());
}

#[test]
fn test_first_note_sounds_on_start() {
    let (mut sequencer, tone, _) = sequencer();
    sequencer
        .start(MelodySource::from("T:d=4,o=5,b=120:a,b"), Completion::none())
        .unwrap();
    assert!(sequencer.is_playing());
    // Natural style by default: 500 - round(500 / 16) = 469
    assert_eq!(tone.commands(), vec![start_tone(880, Some(469))]);
}

#[test]
fn test_advance_waits_for_due_time() {
    let (mut sequencer, tone, clock) = sequencer();
    sequencer
        .start(MelodySource::from("T:d=4,o=5,b=120,s=C:a,b"), Completion::none())
        .unwrap();
    for _ in 0..10 {
        clock.advance(49);
        assert!(sequencer.advance());
    }
    assert_eq!(tone.commands().len(), 1);
    clock.advance(10);
    assert!(sequencer.advance());
    assert_eq!(tone.last(), Some(start_tone(987, None)));
}

#[test]
fn test_scenario_melody() {
    let (mut sequencer, tone, clock) = sequencer();
    let text = "Test:d=4,o=5,b=63:c,8d#,4p,2c6.";
    let source = MelodySource::from(text);
    let expected_title = crate::header::title(&source).unwrap();
    sequencer.set_default_style(0);
    sequencer.start(source, Completion::none()).unwrap();

    let playback = sequencer.playback().unwrap();
    assert_eq!(playback.header.title, expected_title);
    assert_eq!(playback.header.title, "Test");
    assert_eq!(playback.header.default_duration, 4);
    assert_eq!(playback.header.default_octave, 5);
    assert_eq!(playback.header.whole_note_ms, 3808);
    assert_eq!(playback.next_action_time, Some(952));
    assert_eq!(tone.last(), Some(start_tone(523, None)));

    clock.set(952);
    assert!(sequencer.advance());
    assert_eq!(tone.last(), Some(start_tone(622, None)));
    assert_eq!(sequencer.playback().unwrap().next_action_time, Some(952 + 476));

    clock.set(952 + 476);
    assert!(sequencer.advance());
    assert_eq!(tone.last(), Some(ToneCommand::Stop));
    assert_eq!(sequencer.playback().unwrap().next_action_time, Some(952 + 476 + 952));

    clock.set(952 + 476 + 952);
    assert!(sequencer.advance());
    assert_eq!(tone.last(), Some(start_tone(1046, None)));
    let due = sequencer.playback().unwrap().next_action_time.unwrap();
    assert_eq!(due, 952 + 476 + 952 + 2856);

    clock.set(due - 1);
    assert!(sequencer.advance());
    clock.set(due);
    assert!(!sequencer.advance());
    assert_eq!(sequencer.state(), SequencerState::Stopped);
    assert_eq!(tone.last(), Some(ToneCommand::Stop));
}

#[test]
fn test_style_divisors() {
    let (mut sequencer, tone, _) = sequencer();
    sequencer
        .start(MelodySource::from("T:b=120,s=S:c"), Completion::none())
        .unwrap();
    assert_eq!(tone.last(), Some(start_tone(1046, Some(250))));

    sequencer
        .start(MelodySource::from("T:b=120,s=4:c"), Completion::none())
        .unwrap();
    assert_eq!(tone.last(), Some(start_tone(1046, Some(375))));
}

#[test]
fn test_default_style_persists_across_starts() {
    let (mut sequencer, tone, _) = sequencer();
    sequencer.set_default_style(2);
    for _ in 0..2 {
        sequencer
            .start(MelodySource::from("T:b=120:c"), Completion::none())
            .unwrap();
        assert_eq!(tone.last(), Some(start_tone(1046, Some(250))));
    }
    sequencer
        .start(MelodySource::from("T:b=120,s=N:c"), Completion::none())
        .unwrap();
    assert_eq!(tone.last(), Some(start_tone(1046, Some(469))));
}

#[test]
fn test_completion_fires_once_on_natural_end() {
    let calls = Cell::new(0);
    let (mut sequencer, _, clock) = sequencer();
    sequencer
        .start(
            MelodySource::from("T:d=8:c,d,e"),
            Completion::once(|| calls.set(calls.get() + 1)),
        )
        .unwrap();
    let advances = run_to_end(&mut sequencer, &clock);
    assert_eq!(advances, 3);
    assert!(!sequencer.advance());
    assert!(!sequencer.advance());
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_stop_is_idempotent_and_silent() {
    let calls = Cell::new(0);
    let (mut sequencer, tone, _) = sequencer();
    sequencer
        .start(
            MelodySource::from("T:d=8:c,d,e"),
            Completion::once(|| calls.set(calls.get() + 1)),
        )
        .unwrap();
    tone.clear();

    sequencer.stop();
    let once = tone.commands();
    sequencer.stop();
    assert_eq!(once, vec![ToneCommand::Stop]);
    assert_eq!(tone.commands(), vec![ToneCommand::Stop, ToneCommand::Stop]);
    assert_eq!(sequencer.state(), SequencerState::Stopped);
    assert!(!sequencer.advance());
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_inverted_output_is_driven_high_when_silent() {
    let (mut sequencer, tone, clock) = sequencer();
    sequencer.set_tone_pin_inverted(true);
    sequencer
        .start(MelodySource::from("T:d=4,b=120:p,c"), Completion::none())
        .unwrap();
    assert_eq!(
        tone.commands(),
        vec![ToneCommand::Stop, ToneCommand::DriveHigh]
    );
    run_to_end(&mut sequencer, &clock);
    assert_eq!(tone.last(), Some(ToneCommand::DriveHigh));

    tone.clear();
    sequencer.stop();
    assert_eq!(
        tone.commands(),
        vec![ToneCommand::Stop, ToneCommand::DriveHigh]
    );
}

#[test]
fn test_loop_count_from_header() {
    let (mut sequencer, tone, clock) = sequencer();
    sequencer
        .start(MelodySource::from("T:d=4,b=120,s=C,l=3:c,d"), Completion::none())
        .unwrap();
    run_to_end(&mut sequencer, &clock);
    let starts = tone
        .commands()
        .into_iter()
        .filter(|command| matches!(command, ToneCommand::Start { .. }))
        .count();
    assert_eq!(starts, 6);
}

#[test]
fn test_loop_forever_never_finishes() {
    let calls = Cell::new(0);
    let (mut sequencer, _, clock) = sequencer();
    sequencer
        .start(
            MelodySource::from("T:d=16,b=120,l=15:c,d,e"),
            Completion::once(|| calls.set(calls.get() + 1)),
        )
        .unwrap();
    assert_eq!(sequencer.playback().unwrap().loop_count, 0);
    for _ in 0..1_000 {
        clock.advance(125);
        assert!(sequencer.advance());
    }
    sequencer.stop();
    assert!(!sequencer.advance());
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_set_number_of_loops_takes_effect_at_boundary() {
    let (mut sequencer, tone, clock) = sequencer();
    sequencer
        .start(MelodySource::from("T:d=4,b=120,s=C,l=15:c"), Completion::none())
        .unwrap();
    sequencer.set_number_of_loops(2);
    run_to_end(&mut sequencer, &clock);
    let starts = tone
        .commands()
        .into_iter()
        .filter(|command| matches!(command, ToneCommand::Start { .. }))
        .count();
    assert_eq!(starts, 2);
}

#[test]
fn test_loops_setting_overrides_header() {
    let tone = RecordingTone::default();
    let clock = ManualClock::default();
    let settings = PlayerSettings {
        loops: Some(2),
        ..PlayerSettings::default()
    };
    let mut sequencer = Sequencer::with_settings(tone.clone(), clock.clone(), settings);
    sequencer
        .start(MelodySource::from("T:l=5:c,d"), Completion::none())
        .unwrap();
    assert_eq!(sequencer.playback().unwrap().loop_count, 2);
    assert_eq!(run_to_end(&mut sequencer, &clock), 4);
}

#[test]
fn test_melody_without_notes_finishes_even_when_looping() {
    let calls = Cell::new(0);
    let (mut sequencer, tone, _) = sequencer();
    sequencer
        .start(
            MelodySource::from("Empty:l=15:"),
            Completion::once(|| calls.set(calls.get() + 1)),
        )
        .unwrap();
    assert_eq!(sequencer.state(), SequencerState::Stopped);
    assert_eq!(tone.commands(), vec![ToneCommand::Stop]);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_restart_silences_previous_melody_without_callback() {
    let first = Cell::new(0);
    let second = Cell::new(0);
    let (mut sequencer, tone, clock) = sequencer();
    sequencer
        .start(
            MelodySource::from("One:b=120,s=C:c,c,c"),
            Completion::once(|| first.set(first.get() + 1)),
        )
        .unwrap();
    tone.clear();
    sequencer
        .start(
            MelodySource::from("Two:b=120,s=C:a"),
            Completion::once(|| second.set(second.get() + 1)),
        )
        .unwrap();
    assert_eq!(
        tone.commands(),
        vec![ToneCommand::Stop, start_tone(1760, None)]
    );
    run_to_end(&mut sequencer, &clock);
    assert_eq!(first.get(), 0);
    assert_eq!(second.get(), 1);
}

#[test]
fn test_header_error_leaves_sequencer_stopped() {
    let (mut sequencer, tone, _) = sequencer();
    let err = sequencer
        .start(MelodySource::from("NoHeaderEnd:d=4"), Completion::none())
        .unwrap_err();
    assert!(matches!(err, RtttlError::MalformedInput { .. }));
    assert_eq!(sequencer.state(), SequencerState::Stopped);
    assert_eq!(tone.commands(), vec![ToneCommand::Stop]);
    assert!(!sequencer.advance());
}

#[test]
fn test_bad_header_while_playing_silences_once() {
    let (mut sequencer, tone, _) = sequencer();
    sequencer
        .start(MelodySource::from("Good:b=120:c,d"), Completion::none())
        .unwrap();
    tone.clear();
    assert!(sequencer
        .start(MelodySource::from("Bad:d=4"), Completion::none())
        .is_err());
    assert_eq!(tone.commands(), vec![ToneCommand::Stop]);
    assert_eq!(sequencer.state(), SequencerState::Stopped);
}

#[test]
fn test_accessors_reflect_setters() {
    let (mut sequencer, tone, clock) = sequencer();
    clock.set(1234);
    sequencer.set_tone_pin_inverted(true);
    sequencer.set_default_style(4);
    assert!(sequencer.settings().tone_pin_inverted);
    assert_eq!(sequencer.settings().default_style, 4);
    assert_eq!(sequencer.clock().now_ms(), 1234);

    sequencer
        .start(MelodySource::from("T:b=120:c"), Completion::none())
        .unwrap();
    assert_eq!(sequencer.tone().last(), tone.last());
    assert_eq!(sequencer.playback().unwrap().next_action_time, Some(1234 + 500));
}

#[test]
fn test_truncated_note_finishes_playback() {
    let calls = Cell::new(0);
    let (mut sequencer, tone, clock) = sequencer();
    sequencer
        .start(
            MelodySource::from("T:b=120:c,16"),
            Completion::once(|| calls.set(calls.get() + 1)),
        )
        .unwrap();
    assert_eq!(run_to_end(&mut sequencer, &clock), 1);
    assert!(matches!(
        sequencer.last_error(),
        Some(RtttlError::MalformedInput { .. })
    ));
    assert_eq!(tone.last(), Some(ToneCommand::Stop));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_read_only_and_buffer_sources_play_identically() {
    const MELODY: &str = "Same:d=8,o=6,b=140,s=S,l=2:c,8d#.,4p,16g5,a#.7.,h,b#";

    let (mut from_buffer, buffer_tone, buffer_clock) = sequencer();
    from_buffer
        .start(MelodySource::from(MELODY), Completion::none())
        .unwrap();
    assert_eq!(from_buffer.source_kind(), Some(SourceKind::Mutable));
    run_to_end(&mut from_buffer, &buffer_clock);

    let (mut from_store, store_tone, store_clock) = sequencer();
    from_store
        .start(MelodySource::Store(&MELODY), Completion::none())
        .unwrap();
    assert_eq!(from_store.source_kind(), Some(SourceKind::ReadOnly));
    run_to_end(&mut from_store, &store_clock);

    assert_eq!(buffer_tone.commands(), store_tone.commands());
    assert_eq!(buffer_clock.now_ms(), store_clock.now_ms());
}

#[test]
fn test_due_time_survives_clock_wrap() {
    let (mut sequencer, tone, clock) = sequencer();
    clock.set(u32::MAX - 100);
    sequencer
        .start(MelodySource::from("T:d=4,b=120,s=C:c,d"), Completion::none())
        .unwrap();
    clock.advance(300);
    assert!(sequencer.advance());
    assert_eq!(tone.commands().len(), 1);
    clock.advance(200);
    assert!(sequencer.advance());
    assert_eq!(tone.last(), Some(start_tone(1174, None)));
}

#[test]
fn test_finishes_within_bounded_advances() {
    for melody in songs::SAMPLES {
        let (mut sequencer, _, clock) = sequencer();
        sequencer
            .start(MelodySource::Store(melody), Completion::none())
            .unwrap();
        let playback = sequencer.playback().unwrap();
        let passes = playback.loop_count.max(1) as usize;
        let notes = melody.split(':').nth(2).unwrap().split(',').count();
        let advances = run_to_end(&mut sequencer, &clock);
        assert!(advances <= notes * passes + passes + 1, "{}", melody);
    }
}

#[test]
fn test_start_random_returns_title() {
    let (mut sequencer, _, _) = sequencer();
    let mut rng = StdRng::seed_from_u64(42);
    let name = sequencer
        .start_random(songs::SAMPLES, &mut rng, Completion::none())
        .unwrap();
    assert!(songs::titles().contains(&name));
    assert_eq!(sequencer.source_kind(), Some(SourceKind::ReadOnly));
    assert!(sequencer.is_playing());
}

#[test]
fn test_start_random_from_empty_list() {
    let (mut sequencer, _, _) = sequencer();
    let mut rng = StdRng::seed_from_u64(42);
    let err = sequencer
        .start_random(&[], &mut rng, Completion::none())
        .unwrap_err();
    assert!(matches!(err, RtttlError::NoMelodies));
    assert_eq!(sequencer.state(), SequencerState::Idle);
}

//! End-to-end lifecycle tests for the carrot simulation session.
//!
//! Sessions run with a [`ManualDriver`] and a [`RecordingBridge`], so each
//! test drives weeks by calling `tick` directly and inspects exactly what
//! would have been sent to the hosting page.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use carrot_core::config::ModelConfig;
use carrot_core::{
    LearnerAction, ManualDriver, PeerWorkStore, RecordingBridge, Session, TickDriver, TickOutcome,
};
use carrot_types::{
    ComponentState, EventName, GlucoseState, InboundMessage, LightState, PeerWorkBundle,
    RunState, SeriesPoint, StudentChoice, StudentData, TerminationState, Trial, TrialOutcome,
};

type TestSession = Session<RecordingBridge, PeerWorkStore, ManualDriver>;

fn session() -> TestSession {
    session_with(&ModelConfig::default())
}

fn session_with(config: &ModelConfig) -> TestSession {
    Session::new(
        config,
        RecordingBridge::new(),
        PeerWorkStore::new(),
        ManualDriver::new(),
    )
}

fn ticks(session: &mut TestSession, count: u32) -> Vec<TickOutcome> {
    (0..count).map(|_| session.tick()).collect()
}

fn peer_bundle() -> PeerWorkBundle {
    PeerWorkBundle {
        student_work_from_this_node: vec![
            ComponentState {
                node_id: "node54".to_owned(),
                component_id: "yo6qlvcg3u".to_owned(),
                student_data: Some(StudentData {
                    response: Some("Glucose is made in the leaves".to_owned()),
                    student_choices: None,
                }),
            },
            ComponentState {
                node_id: "node54".to_owned(),
                component_id: "17qww5dxhs".to_owned(),
                student_data: Some(StudentData {
                    response: None,
                    student_choices: Some(vec![StudentChoice {
                        id: Some("c1".to_owned()),
                        text: "It is stored in the root".to_owned(),
                    }]),
                }),
            },
        ],
        student_work_from_other_components: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Weekly accounting
// ---------------------------------------------------------------------------

#[test]
fn lit_weeks_add_ten_and_spend_five() {
    let mut s = session();
    s.start();
    let mut previous = s.glucose();
    for week in 1..=20 {
        let outcome = s.tick();
        assert!(matches!(outcome, TickOutcome::Advanced { .. }));
        let now = s.glucose();
        assert_eq!(now.created - previous.created, 10);
        assert_eq!(now.used - previous.used, 5);
        assert_eq!(now.stored, now.created - now.used);
        assert_eq!(s.week(), week);
        previous = now;
    }
}

#[test]
fn dark_weeks_only_spend() {
    let config = ModelConfig::parse("glucose:\n  initial_created: 100\n").unwrap();
    let mut s = session_with(&config);
    s.start();
    s.turn_light_off();
    let mut previous = s.glucose();
    for _ in 0..10 {
        s.tick();
        let now = s.glucose();
        assert_eq!(now.created, previous.created);
        assert_eq!(now.used - previous.used, 5);
        assert_eq!(now.stored - previous.stored, -5);
        previous = now;
    }
    assert_eq!(s.termination(), TerminationState::Active);
}

#[test]
fn light_switch_does_not_advance_week() {
    let mut s = session();
    s.start();
    s.tick();
    s.turn_light_off();
    s.turn_light_on();
    assert_eq!(s.week(), 1);
    assert_eq!(s.glucose(), GlucoseState::from_totals(20, 7));
}

// ---------------------------------------------------------------------------
// Scenario A: twenty lit weeks, then the clock runs out
// ---------------------------------------------------------------------------

#[test]
fn twenty_lit_weeks_then_time_ends() {
    let mut s = session();
    assert!(s.start());
    ticks(&mut s, 20);

    assert_eq!(s.week(), 20);
    assert_eq!(s.glucose(), GlucoseState::from_totals(210, 102));
    assert_eq!(s.glucose().stored, 108);
    assert_eq!(s.termination(), TerminationState::Active);
    assert!(s.history().is_empty());

    let outcome = s.tick();
    assert_eq!(outcome, TickOutcome::TimeEnded { week: 20 });
    assert_eq!(s.week(), 20);
    assert_eq!(s.glucose().stored, 108);
    assert_eq!(s.termination(), TerminationState::TimeEnded);
    assert!(!s.driver().is_active());

    let trial = &s.history()[0];
    assert_eq!(trial.outcome, Some(TrialOutcome::TimeEnded));
    assert_eq!(trial.sample_count(), 21);
    assert_eq!(trial.stored_series.last(), Some(&SeriesPoint(20, 108)));
    assert_eq!(
        trial.event_names(),
        vec![EventName::StartButtonClicked, EventName::SimulationEnded]
    );
    assert_eq!(s.host().persisted(), vec![trial]);
}

// ---------------------------------------------------------------------------
// Scenario B: dark from the first week
// ---------------------------------------------------------------------------

#[test]
fn dark_plant_dies_after_two_weeks() {
    let mut s = session();
    s.start();
    s.turn_light_off();

    assert!(matches!(s.tick(), TickOutcome::Advanced { .. }));
    assert_eq!(s.glucose().stored, 3);

    let outcome = s.tick();
    assert!(outcome.is_terminal());
    assert_eq!(s.glucose().stored, -2);
    assert_eq!(s.termination(), TerminationState::PlantDied);
    assert_eq!(s.run_state(), RunState::Paused);
    assert_eq!(s.growth().leaves, 0);

    let trial = &s.history()[0];
    assert_eq!(trial.outcome, Some(TrialOutcome::PlantDied));
    assert_eq!(
        trial.stored_series,
        vec![SeriesPoint(0, 8), SeriesPoint(1, 3), SeriesPoint(2, -2)]
    );
    let last = trial.last_stored().unwrap();
    assert_eq!((last.week(), last.value()), (2, -2));
    assert_eq!(
        trial.event_names(),
        vec![
            EventName::StartButtonClicked,
            EventName::TurnLightOffButtonClicked,
            EventName::PlantDied,
        ]
    );
}

#[test]
fn lit_week_with_empty_store_does_not_kill() {
    let config = ModelConfig::parse(
        "glucose:\n  initial_created: 0\n  initial_used: 0\n  created_per_week: 2\n",
    )
    .unwrap();
    let mut s = session_with(&config);
    s.start();
    s.tick();
    assert!(s.glucose().stored < 0);
    assert_eq!(s.termination(), TerminationState::Active);
}

#[test]
fn terminal_session_ignores_everything_but_reset() {
    let mut s = session();
    s.start();
    s.turn_light_off();
    ticks(&mut s, 2);
    let glucose = s.glucose();
    let series = s.history()[0].stored_series.clone();

    assert_eq!(s.tick(), TickOutcome::Ignored);
    assert!(!s.resume());
    assert!(!s.start());
    assert!(!s.pause());
    assert!(!s.turn_light_on());
    assert!(!s.press_start_button());

    assert_eq!(s.week(), 2);
    assert_eq!(s.glucose(), glucose);
    assert_eq!(s.history()[0].stored_series, series);

    let controls = s.controls();
    assert!(!controls.start_enabled);
    assert!(!controls.light_on_enabled);
    assert!(!controls.light_off_enabled);
    assert!(controls.reset_enabled);
}

// ---------------------------------------------------------------------------
// Scenario C: pause and resume
// ---------------------------------------------------------------------------

#[test]
fn pause_resume_neither_skips_nor_repeats_a_week() {
    let mut s = session();
    s.start();
    s.tick();
    s.pause();
    assert_eq!(s.tick(), TickOutcome::Ignored);
    s.resume();
    s.tick();

    assert_eq!(s.week(), 2);
    assert_eq!(s.glucose(), GlucoseState::from_totals(30, 12));
    assert_eq!(s.driver().installs(), 2);
    assert_eq!(s.driver().cancels(), 1);
    assert!(s.driver().is_active());
}

#[test]
fn stale_tick_after_pause_resume_is_dropped() {
    let mut s = session();
    s.start();
    let before = s.driver().generation();
    s.pause();
    s.resume();
    assert_eq!(s.on_driver_tick(before), TickOutcome::Ignored);
    assert!(s.on_driver_tick(s.driver().generation()).is_applied());
    assert_eq!(s.week(), 1);
}

// ---------------------------------------------------------------------------
// Scenario D and finalize-once
// ---------------------------------------------------------------------------

#[test]
fn resets_before_any_start_record_nothing() {
    let mut s = session();
    s.reset();
    s.reset();
    assert!(s.history().is_empty());
    assert!(s.host().persisted().is_empty());
    assert!(s.recorder().has_open_trial());
}

#[test]
fn reset_of_started_trial_finalizes_it_once() {
    let mut s = session();
    s.start();
    ticks(&mut s, 3);
    s.reset();
    s.reset();

    assert_eq!(s.history().len(), 1);
    let trial = &s.history()[0];
    assert_eq!(trial.outcome, Some(TrialOutcome::Reset));
    assert_eq!(trial.sample_count(), 4);
    assert_eq!(trial.event_names().last(), Some(&EventName::ResetButtonClicked));
    assert_eq!(s.host().persisted().len(), 1);
}

#[test]
fn reset_after_death_does_not_finalize_again() {
    let mut s = session();
    s.start();
    s.turn_light_off();
    ticks(&mut s, 5);
    s.reset();
    s.reset();

    assert_eq!(s.history().len(), 1);
    assert_eq!(s.history()[0].outcome, Some(TrialOutcome::PlantDied));
    assert_eq!(s.host().persisted().len(), 1);
    assert_eq!(s.termination(), TerminationState::Active);
    assert_eq!(s.light(), LightState::On);
}

#[test]
fn trials_get_distinct_ids() {
    let mut s = session();
    s.start();
    s.tick();
    s.reset();
    s.start();
    s.tick();
    s.reset();

    let ids: Vec<_> = s.history().iter().map(|t| t.id).collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

fn play(s: &mut TestSession) {
    s.apply(LearnerAction::PressStart);
    s.tick();
    s.tick();
    s.apply(LearnerAction::TurnLightOff);
    s.tick();
    s.apply(LearnerAction::Pause);
    s.apply(LearnerAction::Resume);
    s.tick();
    s.apply(LearnerAction::TurnLightOn);
    s.tick();
    s.apply(LearnerAction::Reset);
}

fn trajectory(trial: &Trial) -> (Vec<SeriesPoint>, Vec<SeriesPoint>, Vec<SeriesPoint>, Vec<EventName>) {
    (
        trial.created_series.clone(),
        trial.used_series.clone(),
        trial.stored_series.clone(),
        trial.event_names(),
    )
}

#[test]
fn replay_after_reset_reproduces_trajectory() {
    let mut s = session();
    play(&mut s);
    play(&mut s);

    assert_eq!(s.history().len(), 2);
    assert_eq!(trajectory(&s.history()[0]), trajectory(&s.history()[1]));
    assert_ne!(s.history()[0].id, s.history()[1].id);
}

// ---------------------------------------------------------------------------
// Context capture
// ---------------------------------------------------------------------------

#[test]
fn start_captures_configured_peer_answers() {
    let mut s = session();
    s.receive(&InboundMessage::StudentWork(peer_bundle()));
    s.start();
    s.tick();
    s.reset();

    let trial = &s.history()[0];
    assert_eq!(trial.context.answers.len(), 2);
    assert_eq!(
        trial.context.text(),
        "Glucose is made in the leaves\nIt is stored in the root"
    );
}

#[test]
fn missing_peer_work_leaves_context_empty() {
    let mut s = session();
    s.start();
    s.reset();
    assert!(s.history()[0].context.is_empty());
}

#[test]
fn each_reset_requests_peer_work() {
    let mut s = session();
    s.reset();
    s.reset();
    assert_eq!(s.host().peer_work_requests(), 3);
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

#[test]
fn snapshot_reflects_state() {
    let mut s = session();
    let open = s.recorder().open_trial().unwrap().id;
    s.start();
    s.tick();

    let snap = s.snapshot();
    assert_eq!(snap.week, 1);
    assert_eq!(snap.max_weeks, 20);
    assert_eq!(snap.run_state, RunState::Running);
    assert_eq!(snap.open_trial, Some(open));
    assert_eq!(snap.trial_count, 0);
    assert_eq!(snap.controls, s.controls());
}

#[test]
fn growth_follows_light_history() {
    let mut s = session();
    s.start();
    ticks(&mut s, 4);
    let lit = s.growth();
    assert!(lit.leaves >= 1);
    assert!(lit.carrot_stage > 1);

    s.turn_light_off();
    s.tick();
    assert_eq!(s.growth().carrot_stage, lit.carrot_stage);
}

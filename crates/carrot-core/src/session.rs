//! The simulation lifecycle state machine.
//!
//! A [`Session`] owns every piece of mutable simulation state: the week
//! clock, the glucose ledger, the light, the run and termination states, the
//! growth view and the trial recorder. Its collaborators are injected at
//! construction:
//!
//! - a [`HostBridge`] for saving trials and requesting peer work,
//! - a [`PeerWorkProvider`] for the context captured when a trial starts,
//! - a [`TickDriver`] that calls back once per simulated week.
//!
//! # State space
//!
//! ```text
//! RunState          Stopped --start--> Running --pause--> Paused
//!                      ^                  ^                 |
//!                      |                  +-----resume------+
//!                      +------------------reset------------(any)
//!
//! TerminationState  Active --dark week, stored <= 0--> PlantDied
//!                   Active --tick past max_weeks-----> TimeEnded
//!                   (any)  --reset-------------------> Active
//! ```
//!
//! Every operation that is not valid in the current state is a silent no-op
//! returning `false` (or [`TickOutcome::Ignored`]).

use carrot_types::{
    ComponentRef, ContextSnapshot, Controls, EventName, GlucoseState, GrowthStage, InboundMessage,
    LightState, PlotBand, RunState, SeriesPoint, SessionSnapshot, StartButtonLabel,
    TerminationState, Trial, TrialOutcome,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bridge::HostBridge;
use crate::clock::{Advance, SimulationClock};
use crate::config::ModelConfig;
use crate::driver::{ManualDriver, TickDriver};
use crate::glucose::GlucoseModel;
use crate::growth::PlantGrowth;
use crate::peers::{PeerWorkProvider, PeerWorkStore};
use crate::recorder::TrialRecorder;

/// A control the learner can operate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LearnerAction {
    /// The tri-state start/pause/resume button.
    PressStart,
    /// Start a stopped simulation.
    Start,
    /// Pause a running simulation.
    Pause,
    /// Resume a paused simulation.
    Resume,
    /// Switch the light on.
    TurnLightOn,
    /// Switch the light off.
    TurnLightOff,
    /// Reset to week 0 and open a new trial.
    Reset,
    /// Ask the host to save the node.
    Save,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session was not running (or the tick came from a stale driver).
    Ignored,
    /// A week passed and the plant is alive.
    Advanced {
        /// The week just simulated.
        week: u32,
        /// Ledger after the week.
        glucose: GlucoseState,
        /// Chart band for the week.
        band: PlotBand,
    },
    /// A dark week emptied the plant's glucose store.
    PlantDied {
        /// The week the plant died in.
        week: u32,
        /// Ledger after the fatal week.
        glucose: GlucoseState,
        /// Chart band for the fatal week.
        band: PlotBand,
    },
    /// The clock ran past the last week.
    TimeEnded {
        /// The last simulated week.
        week: u32,
    },
}

impl TickOutcome {
    /// Whether this tick ended the trial.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::PlantDied { .. } | Self::TimeEnded { .. })
    }

    /// Whether the tick changed any state.
    pub const fn is_applied(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// One learner's simulation, from construction to drop.
#[derive(Debug)]
pub struct Session<H, P = PeerWorkStore, D = ManualDriver> {
    model: GlucoseModel,
    clock: SimulationClock,
    glucose: GlucoseState,
    light: LightState,
    run_state: RunState,
    termination: TerminationState,
    growth: PlantGrowth,
    recorder: TrialRecorder,
    context_components: Vec<ComponentRef>,
    host: H,
    peers: P,
    driver: D,
}

impl<H: HostBridge, P: PeerWorkProvider, D: TickDriver> Session<H, P, D> {
    /// Create a stopped session at week 0 with a fresh open trial, and ask
    /// the host for peer work.
    pub fn new(config: &ModelConfig, host: H, peers: P, driver: D) -> Self {
        let model = GlucoseModel::new(&config.glucose);
        let mut recorder = TrialRecorder::new();
        let trial = recorder.open_new_trial(model.initial(), ContextSnapshot::default());
        let mut session = Self {
            model,
            clock: SimulationClock::new(config.simulation.max_weeks),
            glucose: model.initial(),
            light: LightState::On,
            run_state: RunState::Stopped,
            termination: TerminationState::Active,
            growth: PlantGrowth::new(),
            recorder,
            context_components: config.context.component_refs(),
            host,
            peers,
            driver,
        };
        info!(
            %trial,
            max_weeks = config.simulation.max_weeks,
            "simulation session created"
        );
        session.request_peer_work();
        session
    }

    // -----------------------------------------------------------------------
    // Learner operations
    // -----------------------------------------------------------------------

    /// Start a stopped simulation.
    ///
    /// The first start of a trial captures the peer-answer context. Returns
    /// `false` unless the session is stopped and the trial is live.
    pub fn start(&mut self) -> bool {
        if self.run_state != RunState::Stopped || !self.termination.is_active() {
            debug!(run_state = ?self.run_state, termination = ?self.termination, "start ignored");
            return false;
        }
        if !self.recorder.has_open_trial() {
            let _ = self
                .recorder
                .open_new_trial(self.model.initial(), ContextSnapshot::default());
        }
        self.recorder.record_event(EventName::StartButtonClicked);

        let context = self.peers.capture(&self.context_components);
        let context_empty = context.is_empty();
        if self.recorder.mark_started(context) {
            info!(context_empty, "trial started");
            match (self.peers.has_data(), context_empty) {
                (false, _) => {
                    warn!("host has not delivered peer work; trial runs without context");
                }
                (true, true) => {
                    warn!("peer components have no answers; trial runs without context");
                }
                (true, false) => {}
            }
        }
        self.run();
        true
    }

    /// Pause a running simulation. Returns `false` unless running.
    pub fn pause(&mut self) -> bool {
        if self.run_state != RunState::Running {
            debug!(run_state = ?self.run_state, "pause ignored");
            return false;
        }
        self.recorder.record_event(EventName::PauseButtonClicked);
        self.halt();
        info!(week = self.clock.week(), "simulation paused");
        true
    }

    /// Resume a paused simulation. Returns `false` unless paused with a
    /// live trial; resuming while running is a no-op.
    pub fn resume(&mut self) -> bool {
        if self.run_state != RunState::Paused || !self.termination.is_active() {
            debug!(run_state = ?self.run_state, termination = ?self.termination, "resume ignored");
            return false;
        }
        self.recorder.record_event(EventName::ResumeButtonClicked);
        self.run();
        info!(week = self.clock.week(), "simulation resumed");
        true
    }

    /// Operate the tri-state start button according to its current label.
    pub fn press_start_button(&mut self) -> bool {
        let controls = self.controls();
        if !controls.start_enabled {
            return false;
        }
        match controls.start_label {
            StartButtonLabel::Start => self.start(),
            StartButtonLabel::Pause => self.pause(),
            StartButtonLabel::Resume => self.resume(),
        }
    }

    /// Switch the light on. Returns `false` if it already is or the trial
    /// has ended. Does not advance the clock.
    pub fn turn_light_on(&mut self) -> bool {
        self.set_light(LightState::On, EventName::TurnLightOnButtonClicked)
    }

    /// Switch the light off. Returns `false` if it already is or the trial
    /// has ended. Does not advance the clock.
    pub fn turn_light_off(&mut self) -> bool {
        self.set_light(LightState::Off, EventName::TurnLightOffButtonClicked)
    }

    /// Return to week 0 with a fresh trial.
    ///
    /// A live trial is finalized first (and persisted if it was started).
    /// A trial that already ended on its own was finalized then, so it is
    /// not finalized again.
    pub fn reset(&mut self) {
        self.recorder.record_event(EventName::ResetButtonClicked);
        if self.termination.is_active() {
            self.finalize(TrialOutcome::Reset);
        }

        self.driver.cancel();
        self.clock.reset();
        self.glucose = self.model.initial();
        self.growth = PlantGrowth::new();
        self.light = LightState::On;
        self.run_state = RunState::Stopped;
        self.termination = TerminationState::Active;

        let trial = self
            .recorder
            .open_new_trial(self.model.initial(), ContextSnapshot::default());
        info!(%trial, "simulation reset");
        self.request_peer_work();
    }

    /// Apply a learner action. Returns whether it changed anything.
    pub fn apply(&mut self, action: LearnerAction) -> bool {
        match action {
            LearnerAction::PressStart => self.press_start_button(),
            LearnerAction::Start => self.start(),
            LearnerAction::Pause => self.pause(),
            LearnerAction::Resume => self.resume(),
            LearnerAction::TurnLightOn => self.turn_light_on(),
            LearnerAction::TurnLightOff => self.turn_light_off(),
            LearnerAction::Reset => {
                self.reset();
                true
            }
            LearnerAction::Save => self.request_save(),
        }
    }

    /// Ask the host to save the node. Returns whether the request was
    /// handed off.
    pub fn request_save(&mut self) -> bool {
        match self.host.request_save() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to request a save from host");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Ticking
    // -----------------------------------------------------------------------

    /// Simulate one week.
    ///
    /// The time limit is checked before any glucose update, so the tick
    /// after the last week only ends the trial. Death is checked only after
    /// dark weeks.
    pub fn tick(&mut self) -> TickOutcome {
        if self.run_state != RunState::Running || !self.termination.is_active() {
            return TickOutcome::Ignored;
        }

        let week = match self.clock.advance() {
            Advance::Week(week) => week,
            Advance::PastEnd => {
                let week = self.clock.week();
                self.end_trial(
                    TerminationState::TimeEnded,
                    EventName::SimulationEnded,
                    TrialOutcome::TimeEnded,
                );
                info!(week, "simulation reached its last week");
                return TickOutcome::TimeEnded { week };
            }
        };

        self.glucose = self.model.tick(self.glucose, self.light.is_on());
        self.recorder.record_sample(week, self.glucose);
        self.growth.record_week(self.light);
        let band = PlotBand {
            from: week.saturating_sub(1),
            to: week,
            light: self.light,
        };
        debug!(
            week,
            light = ?self.light,
            created = self.glucose.created,
            used = self.glucose.used,
            stored = self.glucose.stored,
            remaining = self.clock.weeks_remaining(),
            "week simulated"
        );

        if !self.light.is_on() && self.glucose.stored <= 0 {
            self.growth.wither();
            self.end_trial(
                TerminationState::PlantDied,
                EventName::PlantDied,
                TrialOutcome::PlantDied,
            );
            info!(week, stored = self.glucose.stored, "plant died");
            return TickOutcome::PlantDied {
                week,
                glucose: self.glucose,
                band,
            };
        }

        TickOutcome::Advanced {
            week,
            glucose: self.glucose,
            band,
        }
    }

    /// Tick on behalf of the driver that produced `generation`.
    ///
    /// Ticks from a cancelled driver are dropped.
    pub fn on_driver_tick(&mut self, generation: u64) -> TickOutcome {
        if !self.driver.accepts(generation) {
            debug!(
                generation,
                current = self.driver.generation(),
                "stale driver tick dropped"
            );
            return TickOutcome::Ignored;
        }
        self.tick()
    }

    // -----------------------------------------------------------------------
    // Host input
    // -----------------------------------------------------------------------

    /// Hand an inbound host message to the peer-work provider.
    pub fn receive(&mut self, message: &InboundMessage) {
        self.peers.receive(message);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Button enablement derived from the current state.
    pub fn controls(&self) -> Controls {
        let active = self.termination.is_active();
        let start_label = match self.run_state {
            RunState::Stopped => StartButtonLabel::Start,
            RunState::Running => StartButtonLabel::Pause,
            RunState::Paused => StartButtonLabel::Resume,
        };
        Controls {
            start_label,
            start_enabled: active,
            light_on_enabled: active && !self.light.is_on(),
            light_off_enabled: active && self.light.is_on(),
            reset_enabled: self.run_state != RunState::Stopped || !active,
        }
    }

    /// Everything the presentation layer needs, as one value.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            week: self.clock.week(),
            max_weeks: self.clock.max_weeks(),
            glucose: self.glucose,
            light: self.light,
            run_state: self.run_state,
            termination: self.termination,
            controls: self.controls(),
            growth: self.growth.stage(),
            trial_count: self.recorder.history().len(),
            open_trial: self.recorder.open_trial().map(|t| t.id),
        }
    }

    /// Current week.
    pub const fn week(&self) -> u32 {
        self.clock.week()
    }

    /// Current glucose ledger.
    pub const fn glucose(&self) -> GlucoseState {
        self.glucose
    }

    /// Current light state.
    pub const fn light(&self) -> LightState {
        self.light
    }

    /// Current run state.
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Current termination state.
    pub const fn termination(&self) -> TerminationState {
        self.termination
    }

    /// Current plant growth.
    pub const fn growth(&self) -> GrowthStage {
        self.growth.stage()
    }

    /// The trial recorder.
    pub const fn recorder(&self) -> &TrialRecorder {
        &self.recorder
    }

    /// Closed trials, oldest first.
    pub fn history(&self) -> &[Trial] {
        self.recorder.history()
    }

    /// The host bridge.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// The peer-work provider.
    pub const fn peers(&self) -> &P {
        &self.peers
    }

    /// The tick driver.
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn run(&mut self) {
        let generation = self.driver.install();
        self.run_state = RunState::Running;
        debug!(generation, light = ?self.light, "tick driver running");
    }

    fn halt(&mut self) {
        self.driver.cancel();
        if self.run_state == RunState::Running {
            self.run_state = RunState::Paused;
        }
    }

    fn set_light(&mut self, light: LightState, event: EventName) -> bool {
        if !self.termination.is_active() || self.light == light {
            debug!(?light, termination = ?self.termination, "light switch ignored");
            return false;
        }
        self.light = light;
        self.recorder.record_event(event);
        info!(?light, week = self.clock.week(), "light switched");
        true
    }

    fn end_trial(&mut self, termination: TerminationState, event: EventName, outcome: TrialOutcome) {
        self.halt();
        self.termination = termination;
        self.recorder.record_event(event);
        self.finalize(outcome);
    }

    fn finalize(&mut self, outcome: TrialOutcome) {
        let Some(trial) = self.recorder.finalize_trial(outcome) else {
            return;
        };
        let last = trial.last_stored();
        info!(
            trial = %trial.id,
            ?outcome,
            samples = trial.sample_count(),
            events = trial.events.len(),
            last_week = last.map(SeriesPoint::week),
            last_stored = last.map(SeriesPoint::value),
            "trial finalized"
        );
        if let Err(e) = self.host.persist_trial(trial) {
            warn!(error = %e, trial = %trial.id, "failed to hand trial to host");
        }
    }

    fn request_peer_work(&mut self) {
        if let Err(e) = self.host.request_peer_work() {
            warn!(error = %e, "failed to request peer work from host");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::bridge::RecordingBridge;

    type TestSession = Session<RecordingBridge, PeerWorkStore, ManualDriver>;

    fn session() -> TestSession {
        Session::new(
            &ModelConfig::default(),
            RecordingBridge::new(),
            PeerWorkStore::new(),
            ManualDriver::new(),
        )
    }

    #[test]
    fn new_session_is_stopped_at_week_zero() {
        let s = session();
        assert_eq!(s.week(), 0);
        assert_eq!(s.glucose(), GlucoseState::from_totals(10, 2));
        assert_eq!(s.light(), LightState::On);
        assert_eq!(s.run_state(), RunState::Stopped);
        assert_eq!(s.termination(), TerminationState::Active);
        assert!(s.recorder().has_open_trial());
        assert_eq!(s.host().peer_work_requests(), 1);
    }

    #[test]
    fn initial_controls() {
        let c = session().controls();
        assert_eq!(c.start_label, StartButtonLabel::Start);
        assert!(c.start_enabled);
        assert!(!c.light_on_enabled);
        assert!(c.light_off_enabled);
        assert!(!c.reset_enabled);
    }

    #[test]
    fn tick_while_stopped_is_ignored() {
        let mut s = session();
        assert_eq!(s.tick(), TickOutcome::Ignored);
        assert_eq!(s.week(), 0);
    }

    #[test]
    fn start_installs_driver_once() {
        let mut s = session();
        assert!(s.start());
        assert!(!s.start());
        assert!(!s.resume());
        assert_eq!(s.run_state(), RunState::Running);
        assert_eq!(s.driver().installs(), 1);
        assert!(s.driver().is_active());
        assert_eq!(s.controls().start_label, StartButtonLabel::Pause);
        assert!(s.controls().reset_enabled);
    }

    #[test]
    fn pause_requires_running() {
        let mut s = session();
        assert!(!s.pause());
        assert!(s.start());
        assert!(s.pause());
        assert!(!s.pause());
        assert_eq!(s.run_state(), RunState::Paused);
        assert!(!s.driver().is_active());
        assert_eq!(s.controls().start_label, StartButtonLabel::Resume);
        assert_eq!(s.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn press_start_button_cycles_labels() {
        let mut s = session();
        assert!(s.press_start_button());
        assert_eq!(s.run_state(), RunState::Running);
        assert!(s.press_start_button());
        assert_eq!(s.run_state(), RunState::Paused);
        assert!(s.press_start_button());
        assert_eq!(s.run_state(), RunState::Running);

        let names = s.recorder().open_trial().unwrap().event_names();
        assert_eq!(
            names,
            vec![
                EventName::StartButtonClicked,
                EventName::PauseButtonClicked,
                EventName::ResumeButtonClicked,
            ]
        );
    }

    #[test]
    fn light_switches_flip_enablement() {
        let mut s = session();
        assert!(!s.turn_light_on());
        assert!(s.turn_light_off());
        assert!(!s.turn_light_off());
        let c = s.controls();
        assert!(c.light_on_enabled);
        assert!(!c.light_off_enabled);
        assert_eq!(s.week(), 0);
        assert!(s.turn_light_on());
        assert_eq!(s.light(), LightState::On);
    }

    #[test]
    fn stale_driver_tick_is_dropped() {
        let mut s = session();
        s.start();
        let stale = s.driver().generation();
        s.pause();
        s.resume();
        assert_eq!(s.on_driver_tick(stale), TickOutcome::Ignored);
        assert_eq!(s.week(), 0);
        let live = s.driver().generation();
        assert!(s.on_driver_tick(live).is_applied());
        assert_eq!(s.week(), 1);
    }

    #[test]
    fn plot_band_tracks_light() {
        let mut s = session();
        s.start();
        let TickOutcome::Advanced { band, .. } = s.tick() else {
            panic!("expected an applied week");
        };
        assert_eq!(band, PlotBand { from: 0, to: 1, light: LightState::On });
        s.turn_light_off();
        let TickOutcome::Advanced { band, .. } = s.tick() else {
            panic!("expected an applied week");
        };
        assert_eq!(band, PlotBand { from: 1, to: 2, light: LightState::Off });
    }

    #[test]
    fn context_is_captured_on_first_start_only() {
        use carrot_types::{ComponentState, PeerWorkBundle, StudentData};

        let mut s = session();
        s.receive(&InboundMessage::StudentWork(PeerWorkBundle {
            student_work_from_this_node: vec![ComponentState {
                node_id: "node54".to_owned(),
                component_id: "yo6qlvcg3u".to_owned(),
                student_data: Some(StudentData {
                    response: Some("The plant needs light".to_owned()),
                    student_choices: None,
                }),
            }],
            student_work_from_other_components: Vec::new(),
        }));
        s.start();
        s.pause();
        s.receive(&InboundMessage::StudentWork(PeerWorkBundle::default()));
        s.resume();

        let trial = s.recorder().open_trial().unwrap();
        assert_eq!(trial.context.text(), "The plant needs light");
    }

    #[test]
    fn peer_work_delivery_is_tracked() {
        let mut s = session();
        assert!(!s.peers().has_data());
        s.receive(&InboundMessage::NodeSubmitClicked(
            carrot_types::PeerWorkBundle::default(),
        ));
        assert!(s.peers().has_data());
        assert!(s.start());
        assert!(s.recorder().open_trial().unwrap().context.is_empty());
    }

    #[test]
    fn save_action_reaches_host() {
        let mut s = session();
        assert!(s.apply(LearnerAction::Save));
        assert_eq!(
            s.host().sent().last(),
            Some(&carrot_types::OutboundMessage::SaveButtonClicked)
        );
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut s = session();
        s.start();
        s.turn_light_off();
        s.tick();
        s.reset();
        assert_eq!(s.week(), 0);
        assert_eq!(s.glucose(), GlucoseState::from_totals(10, 2));
        assert_eq!(s.light(), LightState::On);
        assert_eq!(s.run_state(), RunState::Stopped);
        assert_eq!(s.termination(), TerminationState::Active);
        assert_eq!(s.growth().leaves, 1);
        assert!(!s.driver().is_active());
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.host().peer_work_requests(), 2);
    }
}

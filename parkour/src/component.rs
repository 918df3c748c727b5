/*!
The per-character parkour component.

Owns everything mutable about one character's traversal: the state machine, the latest
[`ParkourResult`], the trace budget, the detector and IK damping state, an optional
corner-move tween and the snapshot cell observers read from. Collaborators (world
queries, the body, the root-motion aligner) are borrowed per call through a
[`ParkourContext`]; a missing collaborator makes the call a logged no-op.

Per step the host calls [`ParkourComponent::begin_step`], then any of
[`ParkourComponent::try_perform_parkour`] / [`ParkourComponent::perform_parkour_detection`],
then [`ParkourComponent::tick`].
*/

use std::sync::Arc;

use log::{debug, trace, warn};

use crate::action::{ClimbStyle, LogicalState, ParkourAction, Phase, Side, TraversalDirection};
use crate::body::{BodySample, CharacterBody, MovementMode, RootMotionAligner};
use crate::config::ParkourConfig;
use crate::detection::{Classification, Detector, GateRejection};
use crate::execution::{self, CornerMoveTween, Dispatch};
use crate::hooks::{ActivationKind, DefaultHooks, NetRole, ParkourHooks, ParkourListener, notify_all};
use crate::ik::{IkState, ik_anchor};
use crate::probes::{ClimbAnchor, ProbeContext};
use crate::result::{ParkourResult, ResultTags};
use crate::snapshot::{ParkourSnapshot, SnapshotCell, SnapshotReader};
use crate::state::{AbortReason, StateChange, StateMachine, TickEvent};
use crate::tags::{GameplayTag, TagRegistry, TagResolver};
use crate::trace::{TelemetrySink, TraceBudget, TraceStats, Tracer, Transform, Vec3, WorldQuery};

/// Collaborators borrowed for one call.
#[derive(Default)]
pub struct ParkourContext<'a> {
    pub world: Option<&'a dyn WorldQuery>,
    pub body: Option<&'a mut dyn CharacterBody>,
    pub aligner: Option<&'a mut dyn RootMotionAligner>,
}

impl<'a> ParkourContext<'a> {
    pub fn new(world: &'a dyn WorldQuery, body: &'a mut dyn CharacterBody) -> Self {
        Self {
            world: Some(world),
            body: Some(body),
            aligner: None,
        }
    }

    pub fn with_aligner(mut self, aligner: &'a mut dyn RootMotionAligner) -> Self {
        self.aligner = Some(aligner);
        self
    }
}

pub struct ParkourComponent {
    config: Arc<ParkourConfig>,
    role: NetRole,
    hooks: Box<dyn ParkourHooks>,
    listeners: Vec<Box<dyn ParkourListener>>,
    tags: TagRegistry,
    budget: TraceBudget,
    telemetry: Option<Box<dyn TelemetrySink>>,
    stepped: bool,
    detector: Detector,
    ik: IkState,
    state: StateMachine,
    result: ParkourResult,
    /// Ledge held (or being reached for) and the style it is held with.
    held: Option<(ClimbAnchor, ClimbStyle)>,
    tween: Option<CornerMoveTween>,
    /// Movement mode the running action relies on; any other mode aborts it.
    expected_mode: Option<MovementMode>,
    last_input: Vec3,
    last_rejection: Option<GateRejection>,
    snapshot: SnapshotCell,
    aborts: u32,
    last_abort: Option<AbortReason>,
    finished: u32,
    last_finished: ParkourAction,
}

impl ParkourComponent {
    pub fn new(config: Arc<ParkourConfig>) -> Self {
        let budget = TraceBudget::new(config.detection.max_traces_per_step);
        let detector = Detector::new(config.rng_seed);
        let component = Self {
            config,
            role: NetRole::Authority,
            hooks: Box::new(DefaultHooks),
            listeners: Vec::new(),
            tags: TagRegistry::new(),
            budget,
            telemetry: None,
            stepped: false,
            detector,
            ik: IkState::new(),
            state: StateMachine::new(),
            result: ParkourResult::default(),
            held: None,
            tween: None,
            expected_mode: None,
            last_input: Vec3::zeros(),
            last_rejection: None,
            snapshot: SnapshotCell::new(),
            aborts: 0,
            last_abort: None,
            finished: 0,
            last_finished: ParkourAction::None,
        };
        component.publish();
        component
    }

    // ---------------------------------------------------------------------------------
    // Wiring
    // ---------------------------------------------------------------------------------

    pub fn set_role(&mut self, role: NetRole) {
        self.role = role;
    }

    pub fn set_hooks(&mut self, hooks: Box<dyn ParkourHooks>) {
        self.hooks = hooks;
    }

    pub fn add_listener(&mut self, listener: Box<dyn ParkourListener>) {
        self.listeners.push(listener);
    }

    pub fn set_tag_resolver(&mut self, resolver: Box<dyn TagResolver>) {
        self.tags.set_resolver(resolver);
    }

    pub fn set_telemetry_sink(&mut self, sink: Box<dyn TelemetrySink>) {
        self.telemetry = Some(sink);
    }

    pub fn snapshot_reader(&self) -> SnapshotReader {
        self.snapshot.reader()
    }

    // ---------------------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------------------

    #[inline]
    pub fn config(&self) -> &ParkourConfig {
        &self.config
    }

    #[inline]
    pub fn result(&self) -> &ParkourResult {
        &self.result
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    #[inline]
    pub fn logical_state(&self) -> LogicalState {
        self.state.logical_state()
    }

    /// Why the last detection request did not run, if it did not.
    #[inline]
    pub fn last_rejection(&self) -> Option<GateRejection> {
        self.last_rejection
    }

    pub fn trace_stats(&self) -> TraceStats {
        self.budget.stats()
    }

    pub fn climb_cooldown_remaining(&self) -> f32 {
        self.detector.cooldown_remaining()
    }

    pub fn corner_move_in_progress(&self) -> bool {
        self.tween.is_some()
    }

    pub fn tags(&self) -> &ResultTags {
        &self.result.tags
    }

    pub fn tag_path(&self, tag: GameplayTag) -> Option<&str> {
        self.tags.path(tag)
    }

    /// Whether any of the result's tags sits under `parent_path`.
    pub fn has_tag(&self, parent_path: &str) -> bool {
        self.result.tags.iter().any(|t| self.tags.matches(t, parent_path))
    }

    pub fn hand_base_transform(&self, side: Side) -> Option<Transform> {
        self.result.hand(side).base_transform
    }

    pub fn foot_base_transform(&self, side: Side) -> Option<Transform> {
        self.result.foot(side).base_transform
    }

    pub fn climb_ik_enabled(&self, side: Side) -> bool {
        self.result.climb_ik_enabled(side)
    }

    pub fn foot_ik_enabled(&self, side: Side) -> bool {
        self.result.foot_ik_enabled(side)
    }

    // ---------------------------------------------------------------------------------
    // Per-step driving
    // ---------------------------------------------------------------------------------

    /// Step boundary for the trace budget. Idempotent within a step.
    pub fn begin_step(&mut self, step: u64) {
        let previous = self.budget.stats();
        self.budget
            .set_max_per_step(self.config.detection.max_traces_per_step);
        if self.budget.begin_step(step) {
            if self.stepped {
                if let Some(sink) = self.telemetry.as_mut() {
                    sink.record(&previous);
                }
            }
            self.stepped = true;
        }
    }

    /// Run one detection pass. Writes the result and the logical state; returns whether
    /// an action was classified. `is_continuation` skips the gates.
    pub fn perform_parkour_detection(
        &mut self,
        ctx: &mut ParkourContext<'_>,
        input: Vec3,
        is_continuation: bool,
    ) -> bool {
        self.last_input = input;
        if self.hooks.activation_for_role(self.role) == ActivationKind::MirrorOnly {
            return false;
        }
        let (Some(world), Some(body)) = (ctx.world, ctx.body.as_deref_mut()) else {
            warn!("parkour detection skipped: no world or body");
            return false;
        };
        let sample = BodySample::capture(body);

        if !is_continuation {
            if let Err(rejection) = self.detector.check_gates(
                &self.config.detection,
                self.state.phase(),
                self.state.logical_state(),
                &sample,
            ) {
                trace!("detection gated: {rejection:?}");
                self.last_rejection = Some(rejection);
                return false;
            }
        }
        self.last_rejection = None;

        let config = Arc::clone(&self.config);
        let probe_ctx = ProbeContext {
            config: &config,
            body: &sample,
        };
        let state_before = self.state.logical_state();
        let held = if state_before.is_climbing() { self.held } else { None };

        self.budget.begin_action();
        let mut tracer = Tracer::new(world, &mut self.budget, sample.body_id);
        let outcome = match self
            .detector
            .run_pass(&mut tracer, &probe_ctx, state_before, input, held)
        {
            Ok(outcome) => outcome,
            Err(exhausted) => {
                debug!("detection pass abandoned: {exhausted}");
                drop(tracer);
                self.fail_pass();
                return false;
            }
        };

        if outcome.auto_climb {
            debug!("no traversal found near the wall, auto-climb jump");
            body.jump(config.probes.auto_climb_jump_impulse);
        }
        let Some(classification) = outcome.classification else {
            drop(tracer);
            self.fail_pass();
            return false;
        };

        let next_state = classification.action.logical_state();
        let mut result = result_from(&classification);
        if next_state.is_climbing() && !state_before.is_climbing() {
            self.ik.reset();
        }
        let anchor = ik_anchor(&result);
        if let Err(exhausted) = self
            .ik
            .derive(&mut tracer, &probe_ctx, next_state, &anchor, &mut result)
        {
            debug!("detection pass abandoned during IK: {exhausted}");
            drop(tracer);
            self.fail_pass();
            return false;
        }
        drop(tracer);

        if classification.action.ends_hanging() {
            self.held = Some((anchor, classification.climb_style));
        }
        self.write_tags(&mut result, next_state);
        debug!(
            "detected {} ({}, {})",
            result.action.name(),
            result.climb_style.name(),
            result.direction.name()
        );
        self.replace_result(result);
        self.apply_state(next_state);
        self.publish();
        true
    }

    /// Detect, and if that succeeds, start the action. The only way out of `Idle`.
    pub fn try_perform_parkour(&mut self, ctx: &mut ParkourContext<'_>, input: Vec3) -> bool {
        if self.hooks.activation_for_role(self.role) == ActivationKind::MirrorOnly {
            return false;
        }
        if !self.state.phase().permits_detection() {
            trace!("try_perform_parkour: {:?} in flight", self.state.action());
            return false;
        }
        if !self.perform_parkour_detection(ctx, input, false) {
            return false;
        }
        let Some(body) = ctx.body.as_deref_mut() else {
            return false;
        };
        let sample = BodySample::capture(body);
        if !self.hooks.evaluate_activation(&self.result, &sample) {
            debug!("{} vetoed by hooks", self.result.action.name());
            self.last_rejection = Some(GateRejection::Vetoed);
            return false;
        }
        let action = self.result.action;
        if !self.state.begin(action) {
            return false;
        }
        self.hooks.on_action_started(&self.result);

        let execution = execution::execute(
            &self.config,
            &mut self.result,
            &sample,
            input,
            body,
            ctx.aligner.as_deref_mut(),
        );
        self.tween = match execution.dispatch {
            Dispatch::Tween(tween) => Some(tween),
            _ => None,
        };
        self.expected_mode = Some(self.config.actions.get(action).entry_movement_mode);
        self.state.activate(execution.linger_seconds);

        let result = &self.result;
        notify_all(&mut self.listeners, |l| l.on_result_changed(result));
        self.publish();
        true
    }

    /// Abandon whatever is in flight: `Idle`/`NotBusy`, cleared result, body stopped,
    /// alignment cleared. Safe from any state, including mid corner-move.
    pub fn abort_parkour(&mut self, ctx: &mut ParkourContext<'_>, reason: AbortReason) {
        debug!(
            "aborting parkour ({reason:?}) from {:?}/{}",
            self.state.phase(),
            self.state.logical_state().name()
        );
        let change = self.state.abort();
        if let Some(body) = ctx.body.as_deref_mut() {
            body.stop_movement();
        }
        if let Some(aligner) = ctx.aligner.as_deref_mut() {
            aligner.clear_targets();
        }
        self.tween = None;
        self.held = None;
        self.expected_mode = None;
        self.ik.reset();
        self.replace_result(ParkourResult::default());
        if let Some(change) = change {
            self.state_changed(change);
        }
        self.aborts = self.aborts.wrapping_add(1);
        self.last_abort = Some(reason);
        notify_all(&mut self.listeners, |l| l.on_parkour_failed(reason));
        self.publish();
    }

    /// Movement-mode notification from the body simulation.
    pub fn on_movement_mode_changed(
        &mut self,
        ctx: &mut ParkourContext<'_>,
        prev: MovementMode,
        new: MovementMode,
    ) {
        let Some(expected) = self.expected_mode else {
            return;
        };
        if new != expected {
            debug!("movement mode {prev:?} -> {new:?} while expecting {expected:?}");
            self.abort_parkour(ctx, AbortReason::MovementModeChanged);
        }
    }

    /// Enter or leave `BeamHidden` (beam balancing and similar gameplay-owned modes).
    ///
    /// Only honoured while idle; returns whether the request was applied. Entering it
    /// lets go of any held ledge, leaving it settles back to `NotBusy`.
    pub fn set_beam_hidden(&mut self, hidden: bool) -> bool {
        if self.state.phase() != Phase::Idle {
            debug!("beam state change refused while {:?}", self.state.phase());
            return false;
        }
        let current = self.state.logical_state();
        let next = match (hidden, current) {
            (true, _) => LogicalState::BeamHidden,
            (false, LogicalState::BeamHidden) => LogicalState::NotBusy,
            (false, _) => return true,
        };
        if hidden {
            self.held = None;
            self.ik.reset();
            self.replace_result(ParkourResult::default());
        }
        self.apply_state(next);
        self.publish();
        true
    }

    /// Advance timers, the corner-move tween and the state machine; refresh IK while
    /// hanging; optionally run detection.
    pub fn tick(&mut self, ctx: &mut ParkourContext<'_>, dt: f32) {
        self.detector.tick(dt);
        self.ik.tick(dt);

        if let Some(tween) = self.tween.as_mut() {
            let step = tween.advance(dt);
            if let Some(body) = ctx.body.as_deref_mut() {
                body.teleport(&step.transform);
            }
            if step.finished {
                debug!("corner move complete");
                self.tween = None;
                self.state.finish_linger();
            }
        }

        match self.state.tick(dt, self.config.execution.exit_blend_seconds) {
            Some(TickEvent::Exiting(action)) => {
                trace!("{} exiting", action.name());
                if let Some(aligner) = ctx.aligner.as_deref_mut() {
                    aligner.clear_targets();
                }
            }
            Some(TickEvent::Finished { action, change }) => {
                if !action.ends_hanging() {
                    self.expected_mode = None;
                    self.held = None;
                    if let Some(body) = ctx.body.as_deref_mut() {
                        body.set_movement_mode(MovementMode::Falling);
                    }
                }
                self.refresh_state_tag();
                if let Some(change) = change {
                    self.state_changed(change);
                }
                self.finished = self.finished.wrapping_add(1);
                self.last_finished = action;
                notify_all(&mut self.listeners, |l| l.on_action_finished(action));
            }
            None => {}
        }

        if self.state.phase() == Phase::Idle && self.state.logical_state().is_climbing() {
            self.refresh_ik(ctx);
        }
        if self.config.detection.auto_detect_every_tick && self.state.phase().permits_detection() {
            let input = self.last_input;
            self.perform_parkour_detection(ctx, input, false);
        }
        self.publish();
    }

    /// Back to a freshly-created state (listeners, hooks and wiring are kept).
    pub fn reset(&mut self) {
        if let Some(change) = self.state.abort() {
            self.state_changed(change);
        }
        self.held = None;
        self.tween = None;
        self.expected_mode = None;
        self.ik.reset();
        self.detector.clear_cooldown();
        self.replace_result(ParkourResult::default());
        self.publish();
    }

    // ---------------------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------------------

    /// A pass found nothing (or ran out of budget): the result goes invalid. Outside of a
    /// hang the logical state falls back to `NotBusy`.
    fn fail_pass(&mut self) {
        self.replace_result(ParkourResult::default());
        let state = self.state.logical_state();
        if self.state.phase() == Phase::Idle
            && !matches!(state, LogicalState::Climb | LogicalState::BeamHidden)
        {
            self.apply_state(LogicalState::NotBusy);
        }
        self.refresh_state_tag();
        self.publish();
    }

    fn refresh_ik(&mut self, ctx: &mut ParkourContext<'_>) {
        let (Some(world), Some(body)) = (ctx.world, ctx.body.as_deref()) else {
            return;
        };
        let Some((anchor, style)) = self.held else {
            return;
        };
        let sample = BodySample::capture(body);
        let config = Arc::clone(&self.config);
        let probe_ctx = ProbeContext {
            config: &config,
            body: &sample,
        };
        let mut result = self.result.clone();
        if !result.is_valid() {
            result.climb_style = style;
        }
        let mut tracer = Tracer::new(world, &mut self.budget, sample.body_id);
        if let Err(exhausted) =
            self.ik
                .derive(&mut tracer, &probe_ctx, LogicalState::Climb, &anchor, &mut result)
        {
            trace!("IK refresh skipped: {exhausted}");
            return;
        }
        drop(tracer);
        self.replace_result(result);
    }

    fn replace_result(&mut self, result: ParkourResult) {
        if self.result == result {
            return;
        }
        self.result = result;
        let result = &self.result;
        notify_all(&mut self.listeners, |l| l.on_result_changed(result));
    }

    fn apply_state(&mut self, next: LogicalState) {
        if let Some(change) = self.state.set_logical_state(next) {
            self.refresh_state_tag();
            self.state_changed(change);
        }
    }

    fn state_changed(&mut self, change: StateChange) {
        if change.entered_climb() {
            self.ik.reset();
            self.detector.arm_climb_cooldown(&self.config.detection);
        }
        if change.next == LogicalState::NotBusy {
            self.held = None;
        }
        notify_all(&mut self.listeners, |l| l.on_state_changed(change));
    }

    fn write_tags(&mut self, result: &mut ParkourResult, state: LogicalState) {
        let action = (result.action != ParkourAction::None)
            .then(|| result.action.tag_path());
        let style = (result.climb_style != ClimbStyle::None)
            .then(|| result.climb_style.tag_path());
        let direction = (result.direction != TraversalDirection::None)
            .then(|| result.direction.tag_path());
        result.tags = ResultTags {
            action: action.map(|p| self.tags.resolve(&p)),
            state: Some(self.tags.resolve(&state.tag_path())),
            climb_style: style.map(|p| self.tags.resolve(&p)),
            direction: direction.map(|p| self.tags.resolve(&p)),
        };
    }

    fn refresh_state_tag(&mut self) {
        let tag = self.tags.resolve(&self.state.logical_state().tag_path());
        self.result.tags.state = Some(tag);
    }

    fn publish(&self) {
        self.snapshot.publish(&ParkourSnapshot {
            result: self.result.clone(),
            phase: self.state.phase(),
            logical_state: self.state.logical_state(),
            aborts: self.aborts,
            last_abort: self.last_abort,
            finished: self.finished,
            last_finished: self.last_finished,
        });
    }
}

fn result_from(c: &Classification) -> ParkourResult {
    let mut result = ParkourResult {
        has_result: true,
        climb_style: c.climb_style,
        direction: c.direction,
        world_location: c.world_location,
        world_normal: c.world_normal,
        target_location: c.target_location,
        surface_normal: c.surface_normal,
        height_delta: c.height_delta,
        xy_distance: c.xy_distance,
        wall_depth: c.wall_depth,
        primary_contact: Some(c.primary),
        climb_ledge: c.climb_ledge,
        ..Default::default()
    };
    result.mark_valid(c.action);
    result
}

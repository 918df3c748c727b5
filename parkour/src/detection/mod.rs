/*!
Detection & classification engine.

One pass: gates, then the forward probe (primary cast, optional grid, ledge-top snap),
then the classification table. The engine owns its small mutable state (climb
cooldown, RNG, the per-pass attempted set); everything else comes in per call.

- forward:  primary cast + refinement grid + ledge-top snap
- classify: the prioritized decision table
*/

pub mod classify;
pub mod forward;

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::action::{ClimbStyle, LogicalState, Phase};
use crate::body::BodySample;
use crate::config::DetectionConfig;
use crate::intent::ClimbIntent;
use crate::probes::{ClimbAnchor, ProbeContext};
use crate::trace::{TraceResult, Tracer, Vec3};

pub use classify::{Attempted, Classification, ClassifyInput, DetectionOutcome, SubProbe};
pub use forward::WallProbe;

/// Why a pass did not run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateRejection {
    /// An action is entering / active.
    Busy,
    /// Climbing and the randomized cooldown has not elapsed.
    ClimbCooldown,
    /// Planar speed under the minimum.
    TooSlow,
    /// Too far from the viewpoint.
    TooFar,
    /// The activation hook declined.
    Vetoed,
}

pub struct Detector {
    cooldown_remaining: f32,
    rng: ChaCha8Rng,
    attempted: Attempted,
    last_probe: Option<WallProbe>,
}

impl Detector {
    pub fn new(seed: u64) -> Self {
        Self {
            cooldown_remaining: 0.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            attempted: Attempted::new(),
            last_probe: None,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
    }

    #[inline]
    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_remaining
    }

    pub fn clear_cooldown(&mut self) {
        self.cooldown_remaining = 0.0;
    }

    /// Arm a randomized cooldown drawn from `climb_detection_cooldown`.
    pub fn arm_climb_cooldown(&mut self, config: &DetectionConfig) {
        let [lo, hi] = config.climb_detection_cooldown;
        let span = (hi - lo).max(0.0);
        self.cooldown_remaining = lo + span * self.rng.r#gen::<f32>();
        debug!("climb detection cooldown armed: {:.3}s", self.cooldown_remaining);
    }

    /// Sub-probes tried by the last pass.
    pub fn attempted(&self) -> Attempted {
        self.attempted
    }

    /// Forward probe of the last pass that got that far.
    pub fn last_probe(&self) -> Option<&WallProbe> {
        self.last_probe.as_ref()
    }

    pub fn check_gates(
        &self,
        config: &DetectionConfig,
        phase: Phase,
        state: LogicalState,
        body: &BodySample,
    ) -> Result<(), GateRejection> {
        if !phase.permits_detection() {
            return Err(GateRejection::Busy);
        }
        if state.is_climbing() {
            if self.cooldown_remaining > 0.0 {
                return Err(GateRejection::ClimbCooldown);
            }
        } else if body.speed() <= config.min_speed_for_detection {
            return Err(GateRejection::TooSlow);
        }
        if config.max_viewpoint_distance > 0.0
            && body
                .viewpoint_distance()
                .is_some_and(|d| d > config.max_viewpoint_distance)
        {
            return Err(GateRejection::TooFar);
        }
        Ok(())
    }

    /// Probe and classify. Gates are the caller's business (see [`Detector::check_gates`]).
    pub fn run_pass(
        &mut self,
        tracer: &mut Tracer<'_>,
        ctx: &ProbeContext<'_>,
        state: LogicalState,
        input: Vec3,
        held: Option<(ClimbAnchor, ClimbStyle)>,
    ) -> TraceResult<DetectionOutcome> {
        self.attempted.clear();
        let climbing = state.is_climbing();
        let busy = state != LogicalState::NotBusy;
        if climbing {
            self.arm_climb_cooldown(&ctx.config.detection);
        }

        let Some(probe) = forward::probe_forward(tracer, ctx, climbing, busy)? else {
            self.last_probe = None;
            return Ok(DetectionOutcome::default());
        };
        self.last_probe = Some(probe);

        let intent = if climbing {
            let p = &ctx.config.probes;
            ClimbIntent::classify(
                &input,
                &probe.wall_normal(),
                p.climb_intent_min_input,
                p.climb_intent_diagonal,
            )
        } else {
            ClimbIntent::None
        };
        let input = ClassifyInput {
            probe: &probe,
            climbing,
            intent,
            input,
            held_ledge: held.map(|(anchor, _)| anchor),
            held_style: held.map_or(ClimbStyle::None, |(_, style)| style),
        };
        classify::classify(tracer, ctx, &input, &mut self.attempted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ParkourAction;
    use crate::body::MovementMode;
    use crate::config::ParkourConfig;
    use crate::testing::{BoxWorld, RecordingBody};
    use crate::trace::TraceBudget;

    fn pass(world: &BoxWorld, body: &RecordingBody, config: &ParkourConfig) -> DetectionOutcome {
        let sample = BodySample::capture(body);
        let ctx = ProbeContext {
            config,
            body: &sample,
        };
        let mut budget = TraceBudget::new(0);
        let mut tracer = Tracer::new(world, &mut budget, None);
        let mut detector = Detector::new(1);
        detector
            .run_pass(&mut tracer, &ctx, LogicalState::NotBusy, Vec3::new(0.0, 0.0, -1.0), None)
            .unwrap()
    }

    fn walking(speed: f32) -> RecordingBody {
        RecordingBody::standing_at(Vec3::zeros()).with_velocity(Vec3::new(0.0, 0.0, -speed))
    }

    fn wall(height: f32) -> BoxWorld {
        BoxWorld::new().with_box(Vec3::new(-200.0, 0.0, -400.0), Vec3::new(200.0, height, -80.0))
    }

    fn action(outcome: &DetectionOutcome) -> ParkourAction {
        outcome.classification.map_or(ParkourAction::None, |c| c.action)
    }

    #[test]
    fn mantles_a_waist_high_wall() {
        let out = pass(&wall(45.0), &walking(100.0), &ParkourConfig::default());
        let c = out.classification.unwrap();
        assert_eq!(c.action, ParkourAction::Mantle);
        assert!((c.height_delta - 45.0).abs() < 1e-3);
        assert!((c.wall_depth - 60.0).abs() < 1e-3);
        assert!(!out.auto_climb);
    }

    #[test]
    fn mantle_subtypes_follow_height_and_distance() {
        let config = ParkourConfig::default();
        assert_eq!(action(&pass(&wall(35.0), &walking(100.0), &config)), ParkourAction::LowMantle);

        // Speed keeps the reach long enough for a 110 cm sweep but stays under vault speed.
        let far = BoxWorld::new().with_box(
            Vec3::new(-200.0, 0.0, -400.0),
            Vec3::new(200.0, 80.0, -130.0),
        );
        assert_eq!(action(&pass(&far, &walking(240.0), &config)), ParkourAction::DistanceMantle);
    }

    #[test]
    fn vault_bands_are_exclusive() {
        let config = ParkourConfig::default();
        let fast = walking(400.0);
        assert_eq!(action(&pass(&wall(45.0), &fast, &config)), ParkourAction::ThinVault);
        assert_eq!(action(&pass(&wall(80.0), &fast, &config)), ParkourAction::Vault);
        assert_eq!(action(&pass(&wall(110.0), &fast, &config)), ParkourAction::HighVault);
    }

    #[test]
    fn failed_confirmation_requests_a_jump() {
        let mut world = wall(45.0);
        world.set_overlap_override(Some(false));
        let out = pass(&world, &walking(100.0), &ParkourConfig::default());
        assert_eq!(out.classification, None);
        assert!(out.auto_climb);
    }

    #[test]
    fn drops_onto_a_lower_ledge() {
        // Standing on a floor that ends at z = -40; a lower ledge top at y = -40 ahead.
        let world = BoxWorld::new()
            .with_box(Vec3::new(-300.0, -400.0, -40.0), Vec3::new(300.0, 0.0, 300.0))
            .with_box(Vec3::new(-300.0, -400.0, -300.0), Vec3::new(300.0, -40.0, -60.0));
        let out = pass(&world, &walking(100.0), &ParkourConfig::default());
        let c = out.classification.unwrap();
        assert_eq!(c.action, ParkourAction::Drop);
        assert!((c.height_delta + 40.0).abs() < 1e-3);
    }

    #[test]
    fn too_tall_wall_falls_back_to_auto_climb() {
        let out = pass(&wall(400.0), &walking(100.0), &ParkourConfig::default());
        assert_eq!(out.classification, None);
        assert!(out.auto_climb);
    }

    #[test]
    fn no_auto_climb_while_airborne() {
        let body = walking(200.0).with_mode(MovementMode::Falling);
        let out = pass(&wall(400.0), &body, &ParkourConfig::default());
        assert_eq!(out.classification, None);
        assert!(!out.auto_climb);
    }

    #[test]
    fn gates_reject_slow_busy_and_cooling_down() {
        let config = ParkourConfig::default();
        let detector = Detector::new(3);
        let still = BodySample::capture(&RecordingBody::standing_at(Vec3::zeros()));
        assert_eq!(
            detector.check_gates(&config.detection, Phase::Idle, LogicalState::NotBusy, &still),
            Err(GateRejection::TooSlow)
        );
        let moving = BodySample::capture(&walking(100.0));
        assert_eq!(
            detector.check_gates(&config.detection, Phase::Active, LogicalState::Mantle, &moving),
            Err(GateRejection::Busy)
        );
        assert_eq!(
            detector.check_gates(&config.detection, Phase::Exiting, LogicalState::NotBusy, &moving),
            Ok(())
        );

        let mut climbing = Detector::new(3);
        climbing.arm_climb_cooldown(&config.detection);
        let [lo, hi] = config.detection.climb_detection_cooldown;
        assert!((lo..=hi).contains(&climbing.cooldown_remaining()));
        assert_eq!(
            climbing.check_gates(&config.detection, Phase::Idle, LogicalState::Climb, &still),
            Err(GateRejection::ClimbCooldown)
        );
        climbing.tick(1.0);
        assert_eq!(
            climbing.check_gates(&config.detection, Phase::Idle, LogicalState::Climb, &still),
            Ok(())
        );
    }

    #[test]
    fn viewpoint_gate() {
        let config = ParkourConfig::default();
        let mut body = walking(100.0);
        body.viewpoint = Some(Vec3::new(0.0, 0.0, 10_000.0));
        let sample = BodySample::capture(&body);
        assert_eq!(
            Detector::new(0).check_gates(&config.detection, Phase::Idle, LogicalState::NotBusy, &sample),
            Err(GateRejection::TooFar)
        );
    }
}

/*!
Hand / foot IK target derivation.

Turns the chosen surface contact into per-limb anchors on [`ParkourResult`]. Hands sweep
diagonally onto the lip and are refined from above. Feet sweep down-and-in from their
anchors. Repeated misses are damped: hands enter a per-hand cooldown with a vertical
fallback offset, feet skip their next pass.

Only the enable flags and base transforms on the result are the contract for the
animation consumer.
*/

mod foot;
mod hand;

use log::trace;

use crate::action::{ClimbStyle, LogicalState, ParkourAction, Side};
use crate::probes::{ClimbAnchor, ProbeContext};
use crate::result::ParkourResult;
use crate::trace::{TraceResult, Tracer};

/// The surface contact limbs are placed against.
pub fn ik_anchor(result: &ParkourResult) -> ClimbAnchor {
    if result.action.is_mantle_family() || result.action.is_vault_family() {
        ClimbAnchor {
            ledge: result.world_location,
            normal: result.world_normal,
        }
    } else {
        ClimbAnchor {
            ledge: result.target_location,
            normal: result.surface_normal,
        }
    }
}

/// Per-limb miss damping carried across passes.
#[derive(Clone, Debug, Default)]
pub struct IkState {
    hand_misses: [u32; 2],
    hand_cooldown: [f32; 2],
    foot_misses: [u32; 2],
    foot_skip_next: [bool; 2],
}

impl IkState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all miss history (entering `Climb`).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn tick(&mut self, dt: f32) {
        for cooldown in &mut self.hand_cooldown {
            *cooldown = (*cooldown - dt).max(0.0);
        }
    }

    #[inline]
    pub fn hand_in_cooldown(&self, side: Side) -> bool {
        self.hand_cooldown[side.index()] > 0.0
    }

    #[inline]
    pub fn hand_misses(&self, side: Side) -> u32 {
        self.hand_misses[side.index()]
    }

    #[inline]
    pub fn foot_misses(&self, side: Side) -> u32 {
        self.foot_misses[side.index()]
    }

    /// Re-derive every limb on `result` for `state`. Limbs the state does not use are
    /// left cleared.
    pub fn derive(
        &mut self,
        tracer: &mut Tracer<'_>,
        ctx: &ProbeContext<'_>,
        state: LogicalState,
        anchor: &ClimbAnchor,
        result: &mut ParkourResult,
    ) -> TraceResult<()> {
        result.clear_limbs();
        if !state.permits_hand_ik() {
            return Ok(());
        }
        let climbing = state.is_climbing();
        for side in Side::BOTH {
            hand::derive_hand(self, tracer, ctx, anchor, side, climbing, result)?;
        }

        if !state.permits_ik() || result.climb_style == ClimbStyle::FreeHang {
            trace!("foot IK off for {} / {}", state.name(), result.climb_style.name());
            return Ok(());
        }
        let widths = if result.action == ParkourAction::CornerMove {
            &ctx.config.ik.foot_corner_widths
        } else {
            &ctx.config.ik.foot_widths
        };
        for side in Side::BOTH {
            foot::derive_foot(self, tracer, ctx, anchor, side, widths, result)?;
        }
        Ok(())
    }

    fn record_hand_miss(&mut self, side: Side, max_misses: u32, cooldown: f32) {
        let i = side.index();
        self.hand_misses[i] += 1;
        if self.hand_misses[i] >= max_misses.max(1) {
            trace!("{side:?} hand missed {} passes, cooling down", self.hand_misses[i]);
            self.hand_misses[i] = 0;
            self.hand_cooldown[i] = cooldown;
        }
    }

    fn record_hand_hit(&mut self, side: Side) {
        self.hand_misses[side.index()] = 0;
    }

    /// Consumes a pending skip.
    fn take_foot_skip(&mut self, side: Side) -> bool {
        std::mem::take(&mut self.foot_skip_next[side.index()])
    }

    fn record_foot_miss(&mut self, side: Side, max_misses: u32) {
        let i = side.index();
        self.foot_misses[i] += 1;
        if self.foot_misses[i] >= max_misses.max(1) {
            self.foot_misses[i] = 0;
            self.foot_skip_next[i] = true;
        }
    }

    fn record_foot_hit(&mut self, side: Side) {
        self.foot_misses[side.index()] = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodySample;
    use crate::config::ParkourConfig;
    use crate::testing::{BoxWorld, RecordingBody};
    use crate::trace::{TraceBudget, Vec3};

    fn hanging_body() -> BodySample {
        BodySample::capture(&RecordingBody::standing_at(Vec3::new(0.0, 110.0, -45.0)))
    }

    fn wall() -> BoxWorld {
        BoxWorld::new().with_box(Vec3::new(-300.0, -200.0, -400.0), Vec3::new(300.0, 200.0, -80.0))
    }

    fn anchor() -> ClimbAnchor {
        ClimbAnchor {
            ledge: Vec3::new(0.0, 200.0, -80.0),
            normal: Vec3::z(),
        }
    }

    fn climb_result(style: ClimbStyle) -> ParkourResult {
        ParkourResult {
            action: ParkourAction::AirHang,
            climb_style: style,
            ..Default::default()
        }
    }

    #[test]
    fn hands_land_on_the_lip_and_feet_on_the_wall() {
        let world = wall();
        let config = ParkourConfig::default();
        let body = hanging_body();
        let ctx = ProbeContext {
            config: &config,
            body: &body,
        };
        let mut budget = TraceBudget::new(0);
        let mut tracer = Tracer::new(&world, &mut budget, None);
        let mut ik = IkState::new();
        let mut result = climb_result(ClimbStyle::Braced);
        ik.derive(&mut tracer, &ctx, LogicalState::Climb, &anchor(), &mut result)
            .unwrap();

        for side in Side::BOTH {
            let hand = result.hand(side);
            assert!(hand.has_surface, "{side:?} hand");
            let base = hand.base_transform.unwrap();
            assert!((base.translation.y - 200.0).abs() < 1e-3);
            assert!(base.translation.x * side.sign() > 0.0);
            assert!(result.climb_ik_enabled(side));
            assert!(result.foot(side).has_surface, "{side:?} foot");
            assert!(result.foot_ik_enabled(side));
        }
    }

    #[test]
    fn free_hang_leaves_feet_off() {
        let world = wall();
        let config = ParkourConfig::default();
        let body = hanging_body();
        let ctx = ProbeContext {
            config: &config,
            body: &body,
        };
        let mut budget = TraceBudget::new(0);
        let mut tracer = Tracer::new(&world, &mut budget, None);
        let mut result = climb_result(ClimbStyle::FreeHang);
        IkState::new()
            .derive(&mut tracer, &ctx, LogicalState::Climb, &anchor(), &mut result)
            .unwrap();
        assert!(result.climb_ik_enabled(Side::Left));
        assert!(!result.foot_ik_enabled(Side::Left));
        assert!(!result.foot_ik_enabled(Side::Right));
    }

    #[test]
    fn repeated_hand_misses_enter_cooldown_with_fallback() {
        let world = BoxWorld::new();
        let config = ParkourConfig::default();
        let body = hanging_body();
        let ctx = ProbeContext {
            config: &config,
            body: &body,
        };
        let mut budget = TraceBudget::new(0);
        let mut ik = IkState::new();
        let mut result = climb_result(ClimbStyle::FreeHang);
        let ceiling = config.ik.hand_max_consecutive_miss_frames;

        for _ in 0..ceiling {
            let mut tracer = Tracer::new(&world, &mut budget, None);
            ik.derive(&mut tracer, &ctx, LogicalState::Climb, &anchor(), &mut result)
                .unwrap();
            assert!(!result.has_hand_surface(Side::Left));
        }
        assert!(ik.hand_in_cooldown(Side::Left) && ik.hand_in_cooldown(Side::Right));

        world.reset_query_count();
        let mut tracer = Tracer::new(&world, &mut budget, None);
        ik.derive(&mut tracer, &ctx, LogicalState::Climb, &anchor(), &mut result)
            .unwrap();
        assert_eq!(world.query_count(), 0);
        assert!(!result.has_hand_surface(Side::Left));
        assert!(!result.has_hand_surface(Side::Right));
        assert_eq!(result.hand_fallback_z, [config.ik.hand_fallback_z_offset; 2]);
        // Climbing still gets synthesized targets.
        let left = result.hand(Side::Left).base_transform.unwrap();
        assert!(
            (left.translation.y - (200.0 + config.ik.hand_synth_up + config.ik.hand_fallback_z_offset))
                .abs()
                < 1e-3
        );
        assert!(result.climb_ik_enabled(Side::Left));

        ik.tick(config.ik.hand_cooldown + 0.01);
        assert!(!ik.hand_in_cooldown(Side::Left));
    }

    #[test]
    fn feet_skip_one_pass_after_the_miss_ceiling() {
        // Lip with nothing below it: hands find the top, feet find nothing.
        let world = BoxWorld::new().with_box(
            Vec3::new(-300.0, 180.0, -400.0),
            Vec3::new(300.0, 200.0, -80.0),
        );
        let config = ParkourConfig::default();
        let body = hanging_body();
        let ctx = ProbeContext {
            config: &config,
            body: &body,
        };
        let mut budget = TraceBudget::new(0);
        let mut ik = IkState::new();
        let mut result = climb_result(ClimbStyle::Braced);
        for _ in 0..config.ik.foot_max_consecutive_misses {
            let mut tracer = Tracer::new(&world, &mut budget, None);
            ik.derive(&mut tracer, &ctx, LogicalState::Climb, &anchor(), &mut result)
                .unwrap();
        }
        assert_eq!(ik.foot_misses(Side::Left), 0);

        let before = budget.stats().total;
        let mut tracer = Tracer::new(&world, &mut budget, None);
        ik.derive(&mut tracer, &ctx, LogicalState::Climb, &anchor(), &mut result)
            .unwrap();
        let hand_casts = 2 * 2;
        assert_eq!(budget.stats().total - before, hand_casts);
        assert!(!result.foot_ik_enabled(Side::Left));
    }

    #[test]
    fn non_ik_states_clear_limbs() {
        let world = wall();
        let config = ParkourConfig::default();
        let body = hanging_body();
        let ctx = ProbeContext {
            config: &config,
            body: &body,
        };
        let mut budget = TraceBudget::new(0);
        let mut tracer = Tracer::new(&world, &mut budget, None);
        let mut result = climb_result(ClimbStyle::Braced);
        result.enable_left_climb_ik = true;
        IkState::new()
            .derive(&mut tracer, &ctx, LogicalState::TicTac, &anchor(), &mut result)
            .unwrap();
        assert!(!result.enable_left_climb_ik);
        assert_eq!(world.query_count(), 0);
    }
}

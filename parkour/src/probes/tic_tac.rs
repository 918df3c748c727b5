//! Tic-tac: lateral wall contacts at mid-body height.

use log::trace;

use super::ProbeContext;
use crate::action::{ParkourAction, Side};
use crate::trace::settings::is_wall_normal;
use crate::trace::{TraceHit, TraceResult, Tracer};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TicTacHit {
    pub side: Side,
    pub hit: TraceHit,
}

/// Cast left and right (the `preferred` side first); the first wall contact wins.
pub fn tic_tac(
    tracer: &mut Tracer<'_>,
    ctx: &ProbeContext<'_>,
    preferred: Option<Side>,
) -> TraceResult<Option<TicTacHit>> {
    let profile = ctx.config.profiles.for_action(ParkourAction::TicTac);
    let order = match preferred {
        Some(Side::Right) => [Side::Right, Side::Left],
        _ => [Side::Left, Side::Right],
    };
    let start = ctx.body.position();
    let right = ctx.body.right();
    for side in order {
        let end = start + right * (side.sign() * profile.forward_max);
        if let Some(hit) = tracer.sweep_sphere(profile.radius, start, end)? {
            if is_wall_normal(hit.normal.y) {
                trace!("tic-tac wall on the {side:?}");
                return Ok(Some(TicTacHit { side, hit }));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodySample;
    use crate::config::ParkourConfig;
    use crate::testing::{BoxWorld, RecordingBody};
    use crate::trace::{BudgetExhausted, TraceBudget, Vec3};

    fn right_wall() -> BoxWorld {
        BoxWorld::new().with_box(Vec3::new(50.0, 0.0, -100.0), Vec3::new(100.0, 200.0, 100.0))
    }

    fn sample() -> BodySample {
        BodySample::capture(&RecordingBody::standing_at(Vec3::zeros()))
    }

    #[test]
    fn finds_wall_on_the_right_after_checking_left() {
        let world = right_wall();
        let config = ParkourConfig::default();
        let body = sample();
        let ctx = ProbeContext {
            config: &config,
            body: &body,
        };
        let mut budget = TraceBudget::new(0);
        let mut tracer = Tracer::new(&world, &mut budget, None);
        let found = tic_tac(&mut tracer, &ctx, None).unwrap().expect("wall");
        assert_eq!(found.side, Side::Right);
        assert!((found.hit.point.x - 50.0).abs() < 1e-3);
        assert_eq!(world.query_count(), 2);
    }

    #[test]
    fn preferred_side_is_cast_first() {
        let world = right_wall();
        let config = ParkourConfig::default();
        let body = sample();
        let ctx = ProbeContext {
            config: &config,
            body: &body,
        };
        let mut budget = TraceBudget::new(0);
        let mut tracer = Tracer::new(&world, &mut budget, None);
        let found = tic_tac(&mut tracer, &ctx, Some(Side::Right)).unwrap();
        assert_eq!(found.map(|f| f.side), Some(Side::Right));
        assert_eq!(world.query_count(), 1);
    }

    #[test]
    fn exhausted_budget_aborts_between_sides() {
        let world = right_wall();
        let config = ParkourConfig::default();
        let body = sample();
        let ctx = ProbeContext {
            config: &config,
            body: &body,
        };
        let mut budget = TraceBudget::new(1);
        budget.begin_step(1);
        let mut tracer = Tracer::new(&world, &mut budget, None);
        assert_eq!(tic_tac(&mut tracer, &ctx, None), Err(BudgetExhausted));
        assert_eq!(world.query_count(), 1);
    }
}

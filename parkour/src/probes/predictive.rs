//! Predictive jump: find a landing ahead at ledge height and confirm it from above.

use log::trace;

use super::{LedgeFind, ProbeContext, wall_then_top};
use crate::action::ParkourAction;
use crate::trace::{TraceResult, Tracer, Vec3};

/// Cast forward along `direction` at the ledge height (relative to the feet), then
/// down onto the landing. Both contacts are required and the landing height must be
/// within the jumpable range.
pub fn predictive_jump(
    tracer: &mut Tracer<'_>,
    ctx: &ProbeContext<'_>,
    direction: Vec3,
    ledge_height: Option<f32>,
) -> TraceResult<Option<LedgeFind>> {
    let p = &ctx.config.probes;
    let profile = ctx.config.profiles.for_action(ParkourAction::PredictJump);
    let feet = ctx.body.feet();
    let height = ledge_height.unwrap_or(p.predict_default_height);
    let origin = ctx.body.position();

    let start = Vec3::new(origin.x, feet.y + height - p.predict_probe_drop, origin.z);
    let end = start + direction * profile.forward_max;
    let Some(found) = wall_then_top(
        tracer,
        profile.radius,
        start,
        end,
        p.ledge_top_inset,
        feet.y + height + p.ledge_top_above,
        feet.y - p.predict_jump_max_drop,
    )?
    else {
        return Ok(None);
    };

    let rise = found.top.point.y - feet.y;
    if rise > p.predict_jump_max_height || -rise > p.predict_jump_max_drop {
        trace!("predictive landing out of range (rise {rise})");
        return Ok(None);
    }
    Ok(Some(found))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodySample;
    use crate::config::ParkourConfig;
    use crate::testing::{BoxWorld, RecordingBody};
    use crate::trace::{BudgetExhausted, TraceBudget};

    #[test]
    fn lands_on_a_platform_across_a_gap() {
        let world = BoxWorld::new().with_box(
            Vec3::new(-100.0, -200.0, -500.0),
            Vec3::new(100.0, 50.0, -200.0),
        );
        let config = ParkourConfig::default();
        let body = BodySample::capture(&RecordingBody::standing_at(Vec3::zeros()));
        let ctx = ProbeContext {
            config: &config,
            body: &body,
        };
        let mut budget = TraceBudget::new(0);
        let mut tracer = Tracer::new(&world, &mut budget, None);
        let found = predictive_jump(&mut tracer, &ctx, -Vec3::z(), Some(50.0))
            .unwrap()
            .unwrap();
        assert!((found.top.point.y - 50.0).abs() < 1e-3);
        assert!((found.wall.point.z + 200.0).abs() < 1e-3);
    }

    #[test]
    fn fails_cleanly_when_the_budget_runs_out() {
        let world = BoxWorld::new().with_box(
            Vec3::new(-100.0, -200.0, -500.0),
            Vec3::new(100.0, 50.0, -200.0),
        );
        let config = ParkourConfig::default();
        let body = BodySample::capture(&RecordingBody::standing_at(Vec3::zeros()));
        let ctx = ProbeContext {
            config: &config,
            body: &body,
        };
        let mut budget = TraceBudget::new(1);
        budget.begin_step(7);
        let mut tracer = Tracer::new(&world, &mut budget, None);
        assert_eq!(
            predictive_jump(&mut tracer, &ctx, -Vec3::z(), Some(50.0)),
            Err(BudgetExhausted)
        );
    }
}

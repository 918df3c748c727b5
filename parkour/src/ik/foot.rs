use super::IkState;
use crate::action::Side;
use crate::probes::{ClimbAnchor, ProbeContext};
use crate::result::{LimbContact, ParkourResult};
use crate::trace::{TraceResult, Tracer, Transform, Vec3};
use crate::utils::{rotation_facing, wall_tangent};

/// Place one foot: down-and-in sweeps from its anchor, one per candidate width.
pub(super) fn derive_foot(
    state: &mut IkState,
    tracer: &mut Tracer<'_>,
    ctx: &ProbeContext<'_>,
    anchor: &ClimbAnchor,
    side: Side,
    widths: &[f32],
    result: &mut ParkourResult,
) -> TraceResult<()> {
    if state.take_foot_skip(side) {
        return Ok(());
    }
    let ik = &ctx.config.ik;
    let n = anchor.normal;
    let t = wall_tangent(&n);
    let up = Vec3::y();
    let lateral = t * side.sign();

    // Without a skeletal anchor, hang the foot below the ledge, just off the wall.
    let base = ctx.body.foot_anchor(side).unwrap_or_else(|| {
        anchor.ledge - up * ik.foot_hang_depth + n * ik.foot_forward + lateral * ik.foot_hip_width
    });

    for width in widths {
        let start = base + lateral * *width + up * ik.foot_lift;
        let end = start - up * (ik.foot_lift + ik.foot_reach) - n * (2.0 * ik.foot_forward);
        if let Some(hit) = tracer.sweep_sphere(ik.foot_radius, start, end)? {
            state.record_foot_hit(side);
            let rotation = rotation_facing(-n).unwrap_or(ctx.body.transform.rotation);
            *result.foot_mut(side) = LimbContact::traced(hit, Transform::new(hit.point, rotation));
            result.set_foot_ik_enabled(side, true);
            return Ok(());
        }
    }
    state.record_foot_miss(side, ik.foot_max_consecutive_misses);
    Ok(())
}

use log::trace;

use super::IkState;
use crate::action::Side;
use crate::probes::{ClimbAnchor, ProbeContext, cast_top};
use crate::result::{LimbContact, ParkourResult};
use crate::trace::{TraceHit, TraceResult, Tracer, Transform, Vec3};
use crate::utils::{rotation_facing, wall_tangent};

/// Place one hand. Cooldown skips tracing entirely; climbing always ends with a target.
pub(super) fn derive_hand(
    state: &mut IkState,
    tracer: &mut Tracer<'_>,
    ctx: &ProbeContext<'_>,
    anchor: &ClimbAnchor,
    side: Side,
    climbing: bool,
    result: &mut ParkourResult,
) -> TraceResult<()> {
    let ik = &ctx.config.ik;
    let n = anchor.normal;
    let rotation = rotation_facing(-n).unwrap_or(ctx.body.transform.rotation);

    let fallback_z = if state.hand_in_cooldown(side) {
        ik.hand_fallback_z_offset
    } else {
        match trace_hand(tracer, ctx, anchor, side)? {
            Some(contact) => {
                state.record_hand_hit(side);
                *result.hand_mut(side) =
                    LimbContact::traced(contact, Transform::new(contact.point, rotation));
                result.set_climb_ik_enabled(side, true);
                return Ok(());
            }
            None => {
                state.record_hand_miss(side, ik.hand_max_consecutive_miss_frames, ik.hand_cooldown);
                if state.hand_in_cooldown(side) { ik.hand_fallback_z_offset } else { 0.0 }
            }
        }
    };
    result.hand_fallback_z[side.index()] = fallback_z;

    if climbing {
        let t = wall_tangent(&n);
        let at = anchor.ledge
            + t * (side.sign() * ik.hand_synth_spacing)
            - n * ik.hand_synth_forward
            + Vec3::y() * (ik.hand_synth_up + fallback_z);
        *result.hand_mut(side) = LimbContact::synthesized(Transform::new(at, rotation));
        result.set_climb_ik_enabled(side, true);
    }
    Ok(())
}

/// Diagonal sweeps at decreasing lateral offsets, then a short refine from above.
/// The returned contact sits on the wall face at the refined top height.
fn trace_hand(
    tracer: &mut Tracer<'_>,
    ctx: &ProbeContext<'_>,
    anchor: &ClimbAnchor,
    side: Side,
) -> TraceResult<Option<TraceHit>> {
    let ik = &ctx.config.ik;
    let n = anchor.normal;
    let t = wall_tangent(&n);
    let up = Vec3::y();

    for offset in &ik.hand_lateral_offsets {
        let start = anchor.ledge + t * (side.sign() * offset) + up * ik.hand_lift + n * ik.hand_outset;
        let end = start - up * (ik.hand_lift + ik.hand_reach) - n * (ik.hand_outset + ik.hand_inset);
        let Some(mut hit) = tracer.sweep_sphere(ik.hand_radius, start, end)? else {
            continue;
        };
        if hit.normal.dot(&n) < ik.hand_normal_min_dot {
            trace!("{side:?} hand at {offset}: normal off the wall ({:.2})", hit.normal.dot(&n));
            continue;
        }
        let refine_at = hit.point - n * ik.hand_refine_inset;
        if let Some(top) = cast_top(
            tracer,
            ik.hand_radius,
            refine_at,
            hit.point.y + ik.hand_refine_height,
            hit.point.y - ik.hand_refine_height,
        )? {
            hit.point.y = top.point.y;
        }
        return Ok(Some(hit));
    }
    Ok(None)
}

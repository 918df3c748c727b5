//! Drop-hang: grab a ledge from above with a coarse, then a fine, downward sphere.

use log::trace;

use super::{ProbeContext, cast_top};
use crate::action::ParkourAction;
use crate::trace::{TraceHit, TraceResult, Tracer, Vec3};
use crate::utils::planar_direction;

pub fn drop_hang(
    tracer: &mut Tracer<'_>,
    ctx: &ProbeContext<'_>,
    wall_point: Vec3,
    wall_normal: Vec3,
    ledge_height: f32,
) -> TraceResult<Option<TraceHit>> {
    let probes = &ctx.config.probes;
    let coarse = ctx.config.profiles.for_action(ParkourAction::AirHang).radius;
    let into = planar_direction(&-wall_normal).unwrap_or_else(|| ctx.body.forward());
    let at = wall_point + into * probes.drop_hang_inset;
    let from_y = ledge_height + probes.drop_hang_above;
    let to_y = ledge_height - probes.drop_hang_below;

    for radius in [coarse, probes.drop_hang_fine_radius] {
        if let Some(hit) = cast_top(tracer, radius, at, from_y, to_y)? {
            trace!("drop-hang grabbed with radius {radius}");
            return Ok(Some(hit));
        }
    }
    Ok(None)
}

//! Probes that run while hanging: shimmy, corners, back-hop, hop grid, predictive bands.
//!
//! All of them start from the held ledge ([`ClimbAnchor`]) and need a wall contact plus
//! a top contact to succeed.

use log::trace;

use super::{ClimbAnchor, LedgeFind, ProbeContext, wall_then_top};
use crate::action::{ParkourAction, Side, TraversalDirection};
use crate::intent::ClimbIntent;
use crate::trace::{TraceResult, TraceShape, Tracer, Vec3};
use crate::utils::{planar_direction, wall_tangent, yaw_delta, yaw_of};

/// A successful hanging traversal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HangMove {
    pub action: ParkourAction,
    pub direction: TraversalDirection,
    pub find: LedgeFind,
}

/// Forward cast into the wall at `base` (a point at ledge height), then down onto its top.
fn probe_at(
    tracer: &mut Tracer<'_>,
    ctx: &ProbeContext<'_>,
    anchor: &ClimbAnchor,
    base: Vec3,
    radius: f32,
    reach: f32,
) -> TraceResult<Option<LedgeFind>> {
    let p = &ctx.config.probes;
    let n = anchor.normal;
    let start = base + n * p.ledge_probe_back - Vec3::y() * p.ledge_probe_drop;
    let end = start - n * (p.ledge_probe_back + reach);
    wall_then_top(
        tracer,
        radius,
        start,
        end,
        p.ledge_top_inset,
        base.y + p.ledge_top_above,
        base.y - p.ledge_top_below,
    )
}

/// Shimmy along the held ledge toward `side`.
pub fn ledge_move(
    tracer: &mut Tracer<'_>,
    ctx: &ProbeContext<'_>,
    anchor: &ClimbAnchor,
    side: Side,
) -> TraceResult<Option<LedgeFind>> {
    let p = &ctx.config.probes;
    let profile = ctx.config.profiles.for_action(ParkourAction::LedgeMove);
    let t = wall_tangent(&anchor.normal);
    let base = anchor.ledge + t * (side.sign() * p.ledge_move_distance);
    let found = probe_at(tracer, ctx, anchor, base, profile.radius, profile.forward_max)?;
    Ok(found.filter(|f| {
        f.wall_normal().dot(&anchor.normal) > p.corner_max_normal_dot
            && (f.top.point.y - anchor.ledge.y).abs() <= p.ledge_move_max_step
    }))
}

/// Turn an inside corner (wall ahead along the ledge) or wrap an outside corner.
pub fn corner_move(
    tracer: &mut Tracer<'_>,
    ctx: &ProbeContext<'_>,
    anchor: &ClimbAnchor,
    side: Side,
) -> TraceResult<Option<LedgeFind>> {
    let p = &ctx.config.probes;
    let profile = ctx.config.profiles.for_action(ParkourAction::CornerMove);
    let n = anchor.normal;
    let along = wall_tangent(&n) * side.sign();
    let lip = anchor.ledge - Vec3::y() * p.ledge_probe_drop;
    let top_from = anchor.ledge.y + p.ledge_top_above;
    let top_to = anchor.ledge.y - p.ledge_top_below;
    let turned = |f: &LedgeFind| f.wall_normal().dot(&n) <= p.corner_max_normal_dot;

    // Inside corner: sweep along the wall until a perpendicular face blocks.
    let start = lip + n * (profile.radius + 2.0);
    let end = start + along * profile.forward_max;
    if let Some(f) = wall_then_top(tracer, profile.radius, start, end, p.ledge_top_inset, top_from, top_to)? {
        if turned(&f) {
            trace!("inside corner on the {side:?}");
            return Ok(Some(f));
        }
    }

    // Outside corner: come back from behind the wall plane onto the side face.
    let behind = lip - n * p.corner_probe_outset;
    let start = behind + along * profile.forward_max;
    let found = wall_then_top(tracer, profile.radius, start, behind, p.ledge_top_inset, top_from, top_to)?;
    Ok(found.filter(turned))
}

/// Hop backwards off the wall onto an opposing ledge.
///
/// Gated by input pointing away from the wall and the control yaw turned away from the
/// facing yaw. The landing needs a clear capsule in front of the opposing wall.
pub fn back_hop(
    tracer: &mut Tracer<'_>,
    ctx: &ProbeContext<'_>,
    anchor: &ClimbAnchor,
    input: &Vec3,
) -> TraceResult<Option<LedgeFind>> {
    let p = &ctx.config.probes;
    let n = anchor.normal;
    let Some(input_dir) = planar_direction(input) else {
        return Ok(None);
    };
    if input_dir.dot(&n) < p.back_hop_min_input_dot {
        return Ok(None);
    }
    let facing = yaw_of(&ctx.body.transform.rotation);
    if yaw_delta(ctx.body.control_yaw, facing).abs() < p.back_hop_min_yaw_degrees.to_radians() {
        trace!("back-hop rejected: control yaw not turned away");
        return Ok(None);
    }

    let profile = ctx.config.profiles.for_action(ParkourAction::BackHop);
    let start = anchor.ledge - Vec3::y() * p.ledge_probe_drop + n * p.back_hop_start_outset;
    let end = start + n * profile.forward_max;
    let Some(found) = wall_then_top(
        tracer,
        profile.radius,
        start,
        end,
        p.ledge_top_inset,
        start.y + profile.vertical_max,
        start.y - p.ledge_top_below,
    )?
    else {
        return Ok(None);
    };
    let m = found.wall_normal();
    if m.dot(&n) > -p.back_hop_min_facing_dot {
        return Ok(None);
    }

    let clearance = found.top.point + m * p.back_hop_clearance_offset
        - Vec3::y() * p.back_hop_clearance_drop;
    let shape = TraceShape::Capsule {
        radius: profile.radius,
        half_height: profile.half_height,
    };
    if tracer.overlap(shape, clearance)? {
        trace!("back-hop rejected: landing clearance blocked");
        return Ok(None);
    }
    Ok(Some(found))
}

/// Climb-up hops onto higher ledges above the held one.
pub fn hop_grid(
    tracer: &mut Tracer<'_>,
    ctx: &ProbeContext<'_>,
    anchor: &ClimbAnchor,
    lateral: Option<Side>,
) -> TraceResult<Option<HangMove>> {
    let p = &ctx.config.probes;
    let profile = ctx.config.profiles.for_action(ParkourAction::LedgeMove);
    let t = wall_tangent(&anchor.normal);

    let mut offsets: Vec<f32> = p
        .hop_lateral_offsets
        .iter()
        .copied()
        .filter(|o| lateral.is_none_or(|s| o * s.sign() >= 0.0))
        .collect();
    match lateral {
        Some(s) => offsets.sort_by(|a, b| (b * s.sign()).total_cmp(&(a * s.sign()))),
        None => offsets.sort_by(|a, b| a.abs().total_cmp(&b.abs())),
    }

    for &up in &p.hop_vertical_offsets {
        for &o in &offsets {
            let base = anchor.ledge + t * o + Vec3::y() * up;
            let Some(find) = probe_at(tracer, ctx, anchor, base, profile.radius, profile.forward_max)? else {
                continue;
            };
            if find.top.point.y - anchor.ledge.y < up * 0.5 {
                continue;
            }
            let direction = if o.abs() < 1.0e-3 {
                TraversalDirection::Up
            } else if o < 0.0 {
                TraversalDirection::UpLeft
            } else {
                TraversalDirection::UpRight
            };
            return Ok(Some(HangMove {
                action: ParkourAction::LedgeMove,
                direction,
                find,
            }));
        }
    }
    Ok(None)
}

/// Long lateral jumps along the wall to a separate ledge.
pub fn predictive_band(
    tracer: &mut Tracer<'_>,
    ctx: &ProbeContext<'_>,
    anchor: &ClimbAnchor,
    side: Side,
) -> TraceResult<Option<LedgeFind>> {
    let p = &ctx.config.probes;
    let profile = ctx.config.profiles.for_action(ParkourAction::LedgeMove);
    let t = wall_tangent(&anchor.normal);
    for &o in &p.predict_lateral_offsets {
        let base = anchor.ledge + t * (side.sign() * o.abs());
        let Some(find) = probe_at(tracer, ctx, anchor, base, profile.radius, profile.forward_max)? else {
            continue;
        };
        let rise = find.top.point.y - anchor.ledge.y;
        if find.wall_normal().dot(&anchor.normal) > p.corner_max_normal_dot
            && rise <= p.predict_jump_max_height
            && -rise <= p.predict_jump_max_drop
        {
            return Ok(Some(find));
        }
    }
    Ok(None)
}

/// Run the hanging family that matches `intent`, in priority order.
pub fn detect_hang_move(
    tracer: &mut Tracer<'_>,
    ctx: &ProbeContext<'_>,
    anchor: &ClimbAnchor,
    intent: ClimbIntent,
    input: &Vec3,
) -> TraceResult<Option<HangMove>> {
    match intent {
        ClimbIntent::Lateral(side) => {
            let direction = TraversalDirection::lateral(side.sign());
            let found = if let Some(find) = ledge_move(tracer, ctx, anchor, side)? {
                Some((ParkourAction::LedgeMove, find))
            } else if let Some(find) = corner_move(tracer, ctx, anchor, side)? {
                Some((ParkourAction::CornerMove, find))
            } else {
                predictive_band(tracer, ctx, anchor, side)?
                    .map(|find| (ParkourAction::PredictJump, find))
            };
            Ok(found.map(|(action, find)| HangMove {
                action,
                direction,
                find,
            }))
        }
        ClimbIntent::Up { lateral } => hop_grid(tracer, ctx, anchor, lateral),
        ClimbIntent::Back => Ok(back_hop(tracer, ctx, anchor, input)?.map(|find| HangMove {
            action: ParkourAction::BackHop,
            direction: TraversalDirection::Backward,
            find,
        })),
        ClimbIntent::None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodySample;
    use crate::config::ParkourConfig;
    use crate::testing::{BoxWorld, RecordingBody};
    use crate::trace::TraceBudget;

    // Ledge top at y = 0, wall face at z = -100 facing +Z.
    fn wall(max_x: f32) -> BoxWorld {
        BoxWorld::new().with_box(Vec3::new(-300.0, -400.0, -200.0), Vec3::new(max_x, 0.0, -100.0))
    }

    fn anchor() -> ClimbAnchor {
        ClimbAnchor {
            ledge: Vec3::new(0.0, 0.0, -100.0),
            normal: Vec3::z(),
        }
    }

    fn run(world: &BoxWorld, intent: ClimbIntent, input: Vec3) -> Option<HangMove> {
        let config = ParkourConfig::default();
        let body = BodySample::capture(&RecordingBody::standing_at(Vec3::new(0.0, -180.0, -70.0)));
        let ctx = ProbeContext {
            config: &config,
            body: &body,
        };
        let mut budget = TraceBudget::new(0);
        let mut tracer = Tracer::new(world, &mut budget, None);
        detect_hang_move(&mut tracer, &ctx, &anchor(), intent, &input).unwrap()
    }

    #[test]
    fn shimmies_along_a_continuous_ledge() {
        let m = run(&wall(300.0), ClimbIntent::Lateral(Side::Right), Vec3::x()).unwrap();
        assert_eq!(m.action, ParkourAction::LedgeMove);
        assert_eq!(m.direction, TraversalDirection::Right);
        assert!((m.find.top.point.y - 0.0).abs() < 1e-3);
        assert!(m.find.top.point.x > 40.0);
    }

    #[test]
    fn wraps_an_outside_corner_where_the_wall_ends() {
        let m = run(&wall(40.0), ClimbIntent::Lateral(Side::Right), Vec3::x()).unwrap();
        assert_eq!(m.action, ParkourAction::CornerMove);
        assert!((m.find.wall_normal() - Vec3::x()).norm() < 1e-4);
    }

    #[test]
    fn back_hop_needs_the_control_yaw_turned() {
        let mut world = wall(300.0);
        // Opposing wall behind the climber, facing -Z, top at y = 20.
        world.add_box(Vec3::new(-300.0, -400.0, 100.0), Vec3::new(300.0, 20.0, 200.0));
        assert_eq!(run(&world, ClimbIntent::Back, Vec3::z()), None);

        let config = ParkourConfig::default();
        let mut rb = RecordingBody::standing_at(Vec3::new(0.0, -180.0, -70.0));
        rb.control_yaw = Some(std::f32::consts::PI);
        let body = BodySample::capture(&rb);
        let ctx = ProbeContext {
            config: &config,
            body: &body,
        };
        let mut budget = TraceBudget::new(0);
        let mut tracer = Tracer::new(&world, &mut budget, None);
        let m = detect_hang_move(&mut tracer, &ctx, &anchor(), ClimbIntent::Back, &Vec3::z())
            .unwrap()
            .unwrap();
        assert_eq!(m.action, ParkourAction::BackHop);
        assert!((m.find.top.point.y - 20.0).abs() < 1e-3);
    }
}

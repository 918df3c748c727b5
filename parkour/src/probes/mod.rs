/*!
Surface-confirmation and traversal sub-probes.

Each probe is a stateless function over a [`Tracer`] and a [`ProbeContext`]: it fires a
small, bounded number of casts and returns what it found, or `None`. Budget exhaustion
surfaces as `Err(BudgetExhausted)` and aborts the calling pass.

- confirm:    mantle / vault surface confirmation (stationary overlap)
- drop_hang:  coarse-then-fine downward grab onto a ledge
- tic_tac:    lateral wall contacts at mid-body height
- ledge:      shimmy, corner, back-hop, hop grid and predictive bands while hanging
- predictive: forward-then-down landing search for a jump
*/

pub mod confirm;
pub mod drop_hang;
pub mod ledge;
pub mod predictive;
pub mod tic_tac;

use log::trace;

use crate::body::BodySample;
use crate::config::ParkourConfig;
use crate::trace::settings::{is_walkable_normal, is_wall_normal};
use crate::trace::{TraceHit, TraceResult, Tracer, Vec3};

/// Read-only inputs shared by every sub-probe of one pass.
#[derive(Clone, Copy)]
pub struct ProbeContext<'c> {
    pub config: &'c ParkourConfig,
    pub body: &'c BodySample,
}

/// A ledge found by a forward (or lateral) wall contact plus a downward top contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LedgeFind {
    pub wall: TraceHit,
    pub top: TraceHit,
}

impl LedgeFind {
    /// Outward planar normal of the wall face.
    pub fn wall_normal(&self) -> Vec3 {
        self.wall.planar_normal()
    }
}

/// The ledge currently held (or about to be), used as the origin of the hanging probes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimbAnchor {
    /// A point on the ledge top at the lip.
    pub ledge: Vec3,
    /// Outward planar normal of the wall below the ledge.
    pub normal: Vec3,
}

/// Downward sphere that must land on walkable ground.
pub(crate) fn cast_top(
    tracer: &mut Tracer<'_>,
    radius: f32,
    at: Vec3,
    from_y: f32,
    to_y: f32,
) -> TraceResult<Option<TraceHit>> {
    let start = Vec3::new(at.x, from_y, at.z);
    let end = Vec3::new(at.x, to_y, at.z);
    let hit = tracer.sweep_sphere(radius, start, end)?;
    Ok(hit.filter(|h| is_walkable_normal(h.normal.y)))
}

/// Sweep into a wall, then drop onto its top `inset` past the contact.
///
/// The top cast runs from `top_from_y` down to `top_to_y`. Both contacts are required.
#[allow(clippy::too_many_arguments)]
pub(crate) fn wall_then_top(
    tracer: &mut Tracer<'_>,
    radius: f32,
    start: Vec3,
    end: Vec3,
    inset: f32,
    top_from_y: f32,
    top_to_y: f32,
) -> TraceResult<Option<LedgeFind>> {
    let Some(wall) = tracer.sweep_sphere(radius, start, end)? else {
        return Ok(None);
    };
    if !is_wall_normal(wall.normal.y) {
        trace!("wall_then_top: contact is not a wall (n.y = {})", wall.normal.y);
        return Ok(None);
    }
    let into = -wall.planar_normal();
    let Some(top) = cast_top(tracer, radius, wall.point + into * inset, top_from_y, top_to_y)? else {
        return Ok(None);
    };
    if top.point.y + radius < wall.point.y {
        trace!("wall_then_top: top contact below the wall contact, rejecting");
        return Ok(None);
    }
    Ok(Some(LedgeFind { wall, top }))
}

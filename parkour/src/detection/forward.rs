//! Primary forward probe, refinement grid and ledge-top snap.

use log::{debug, trace};

use crate::constants::{AIR_DETECT_PROFILE, CLIMB_DETECT_PROFILE, GROUND_DETECT_PROFILE};
use crate::probes::{ProbeContext, cast_top};
use crate::trace::settings::DIST_EPS;
use crate::trace::{CapsuleTraceSettings, TraceHit, TraceResult, Tracer, Transform, Vec3};
use crate::utils::{planar_direction, planar_distance};

/// What the forward probe found in front of the character.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallProbe {
    /// Decisive wall contact (best of primary + grid).
    pub hit: TraceHit,
    /// Start of the decisive cast.
    pub origin: Vec3,
    /// Planar cast direction.
    pub direction: Vec3,
    /// Ledge (or contact) height minus feet height.
    pub height_delta: f32,
    /// Planar distance from the character to the contact.
    pub xy_distance: f32,
    /// Sweep distance of the decisive cast.
    pub wall_depth: f32,
    /// Walkable top found by the snap, if any.
    pub ledge: Option<TraceHit>,
}

impl WallProbe {
    #[inline]
    pub fn ledge_known(&self) -> bool {
        self.ledge.is_some()
    }

    /// Outward planar wall normal (falls back to facing back along the cast).
    pub fn wall_normal(&self) -> Vec3 {
        let n = self.hit.planar_normal();
        if n.norm_squared() > 0.5 { n } else { -self.direction }
    }

    /// The lip of the ledge: the wall contact lifted to the ledge top.
    pub fn lip(&self) -> Vec3 {
        let mut lip = self.hit.point;
        if let Some(ledge) = &self.ledge {
            lip.y = ledge.point.y;
        }
        lip
    }
}

struct Candidate {
    hit: TraceHit,
    origin: Vec3,
    height_delta: f32,
}

impl Candidate {
    fn beats(&self, other: &Candidate) -> bool {
        if self.height_delta > other.height_delta + DIST_EPS {
            return true;
        }
        (self.height_delta - other.height_delta).abs() <= DIST_EPS
            && self.hit.distance < other.hit.distance
    }
}

/// Fire the primary cast, refine it with the grid when the budget allows, snap onto the
/// top. `Ok(None)` when the primary cast hits nothing.
pub fn probe_forward(
    tracer: &mut Tracer<'_>,
    ctx: &ProbeContext<'_>,
    climbing: bool,
    busy: bool,
) -> TraceResult<Option<WallProbe>> {
    let body = ctx.body;
    let detection = &ctx.config.detection;
    let feet = body.feet();

    let (base, direction, key, reach) = if climbing {
        let anchor = body.climb_anchor.unwrap_or_else(|| {
            Transform::new(
                body.position() + Vec3::y() * body.capsule.half_height,
                body.transform.rotation,
            )
        });
        let direction = planar_direction(&anchor.forward()).unwrap_or_else(|| body.forward());
        let profile = ctx.config.profiles.get(CLIMB_DETECT_PROFILE);
        (anchor.translation, direction, CLIMB_DETECT_PROFILE, profile.forward_max)
    } else {
        let key = if body.is_grounded() {
            GROUND_DETECT_PROFILE
        } else {
            AIR_DETECT_PROFILE
        };
        let profile = ctx.config.profiles.get(key);
        let reach = profile.forward_distance(body.speed(), detection.forward_speed_scale);
        (feet, body.forward(), key, reach)
    };
    let profile = ctx.config.profiles.get(key);

    let primary = CapsuleTraceSettings {
        start: base + Vec3::y() * profile.vertical_offset,
        end: base + Vec3::y() * profile.vertical_offset + direction * reach,
        radius: profile.radius,
        half_height: profile.half_height,
    };
    let Some(hit) = tracer.sweep_capsule(&primary)? else {
        trace!("primary forward probe ({key}) missed");
        return Ok(None);
    };
    let mut best = Candidate {
        hit,
        origin: primary.start,
        height_delta: hit.point.y - feet.y,
    };

    // Refinement grid: lateral columns x vertical rows around the primary cast.
    let half = if busy {
        detection.grid_lateral_half_count_busy
    } else {
        detection.grid_lateral_half_count_idle
    } as i32;
    let right = Vec3::new(-direction.z, 0.0, direction.x);
    let mut offsets = Vec::new();
    for row in 0..=detection.grid_vertical_count {
        let up = profile.vertical_offset + row as f32 * detection.grid_vertical_spacing;
        if row > 0 && !(profile.vertical_min..=profile.vertical_max).contains(&up) {
            continue;
        }
        for col in -half..=half {
            if row == 0 && col == 0 {
                continue;
            }
            offsets.push(
                right * (col as f32 * detection.grid_lateral_spacing)
                    + Vec3::y() * (row as f32 * detection.grid_vertical_spacing),
            );
        }
    }
    // The snap needs one more cast after the grid.
    if !offsets.is_empty() && tracer.can_afford(offsets.len() as u32 + 1) {
        for offset in &offsets {
            let settings = primary.translated(*offset);
            if let Some(hit) = tracer.sweep_capsule(&settings)? {
                let candidate = Candidate {
                    hit,
                    origin: settings.start,
                    height_delta: hit.point.y - feet.y,
                };
                if candidate.beats(&best) {
                    best = candidate;
                }
            }
        }
    } else if !offsets.is_empty() {
        debug!("grid refinement skipped: budget cannot cover {} casts", offsets.len());
    }

    // Ledge-top snap onto the obstacle just past the contact.
    let into = {
        let n = best.hit.planar_normal();
        if n.norm_squared() > 0.5 { -n } else { direction }
    };
    let top = cast_top(
        tracer,
        detection.ledge_probe_radius,
        best.hit.point + into * detection.ledge_probe_inset,
        feet.y + detection.ledge_probe_top_height,
        feet.y - detection.ledge_probe_depth_below_feet,
    )?
    .filter(|top| top.point.y + detection.ledge_probe_radius >= best.hit.point.y);

    let height_delta = top.map_or(best.height_delta, |t| t.point.y - feet.y);
    let probe = WallProbe {
        hit: best.hit,
        origin: best.origin,
        direction,
        height_delta,
        xy_distance: planar_distance(&body.position(), &best.hit.point),
        wall_depth: best.hit.distance,
        ledge: top,
    };
    trace!(
        "forward probe: height {:.1} xy {:.1} depth {:.1} ledge {}",
        probe.height_delta,
        probe.xy_distance,
        probe.wall_depth,
        probe.ledge_known()
    );
    Ok(Some(probe))
}

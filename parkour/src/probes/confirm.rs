//! Mantle / vault surface confirmation.
//!
//! A short vertical capsule is placed on the expected warp point (further over the
//! obstacle for vaults) and overlap-tested: solid surface under the warp point confirms it.

use log::trace;

use super::ProbeContext;
use crate::action::ParkourAction;
use crate::trace::{TraceResult, TraceShape, Tracer, Vec3};
use crate::utils::planar_direction;

/// Returns the confirmed warp point on the obstacle top.
pub fn confirm_surface(
    tracer: &mut Tracer<'_>,
    ctx: &ProbeContext<'_>,
    action: ParkourAction,
    wall_point: Vec3,
    wall_normal: Vec3,
    ledge_height: f32,
) -> TraceResult<Option<Vec3>> {
    let probes = &ctx.config.probes;
    let inset = if action.is_vault_family() {
        probes.vault_confirm_inset
    } else {
        probes.mantle_confirm_inset
    };
    let into = planar_direction(&-wall_normal).unwrap_or_else(|| ctx.body.forward());
    let mut warp = wall_point + into * inset;
    warp.y = ledge_height;

    let profile = ctx.config.profiles.for_action(action);
    let shape = TraceShape::Capsule {
        radius: profile.radius,
        half_height: profile.half_height,
    };
    let solid = tracer.overlap(shape, warp)?;
    trace!("confirm {} at {:?}: {}", action.name(), warp.as_slice(), solid);
    Ok(solid.then_some(warp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodySample;
    use crate::config::ParkourConfig;
    use crate::testing::{BoxWorld, RecordingBody};
    use crate::trace::TraceBudget;

    #[test]
    fn confirms_only_over_solid_top() {
        let mut world = BoxWorld::new().with_box(
            Vec3::new(-100.0, 0.0, -400.0),
            Vec3::new(100.0, 45.0, -80.0),
        );
        let config = ParkourConfig::default();
        let body = BodySample::capture(&RecordingBody::standing_at(Vec3::zeros()));
        let ctx = ProbeContext {
            config: &config,
            body: &body,
        };
        let wall = Vec3::new(0.0, 45.0, -80.0);
        let mut budget = TraceBudget::new(0);
        {
            let mut tracer = Tracer::new(&world, &mut budget, None);
            let warp = confirm_surface(&mut tracer, &ctx, ParkourAction::Mantle, wall, Vec3::z(), 45.0)
                .unwrap()
                .unwrap();
            assert!((warp - Vec3::new(0.0, 45.0, -100.0)).norm() < 1e-4);
        }
        world.set_overlap_override(Some(false));
        let mut tracer = Tracer::new(&world, &mut budget, None);
        assert_eq!(
            confirm_surface(&mut tracer, &ctx, ParkourAction::Vault, wall, Vec3::z(), 45.0),
            Ok(None)
        );
    }
}

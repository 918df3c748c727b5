/*!
Action execution: warp targets, then dispatch.

The builder turns the result's target contact into one [`RuntimeWarpTarget`] per warp
window of the action's definition. Dispatch hands them to the root-motion aligner when
there is one; otherwise the body is moved directly (a teleport, or a timed tween for
actions that ask for interpolation).
*/

pub mod corner;

use log::{debug, warn};

use crate::body::{BodySample, CharacterBody, RootMotionAligner};
use crate::config::{ActionDefinition, FacingMode, ParkourConfig, WarpWindow};
use crate::result::{ParkourResult, RuntimeWarpTarget};
use crate::trace::{Transform, Vec3};
use crate::utils::{planar_direction, rotation_facing};

pub use corner::{CornerMoveTween, TweenStep};

/// Planar direction a window's target faces.
///
/// `input` is the movement input the action was triggered with. `Velocity` facing
/// follows it, then the body's velocity, then the body's forward.
pub fn facing_for(mode: FacingMode, result: &ParkourResult, body: &BodySample, input: Vec3) -> Vec3 {
    match mode {
        FacingMode::Surface => planar_direction(&-result.surface_normal).unwrap_or_else(|| body.forward()),
        FacingMode::CharacterForward => body.forward(),
        FacingMode::Velocity => planar_direction(&input)
            .or_else(|| planar_direction(&body.velocity))
            .unwrap_or_else(|| body.forward()),
    }
}

/// Resolve one window against the result.
pub fn build_warp_target(
    window: &WarpWindow,
    result: &ParkourResult,
    body: &BodySample,
    input: Vec3,
) -> RuntimeWarpTarget {
    let forward = facing_for(window.facing, result, body, input);
    let right = Vec3::new(-forward.z, 0.0, forward.x);
    let mut translation = result.target_location
        + forward * window.offset_xy[0]
        + right * window.offset_xy[1]
        + Vec3::y() * window.offset_z;
    if window.adjust_character_height {
        translation.y += body.capsule.feet_offset();
    }
    let rotation = rotation_facing(forward).unwrap_or(body.transform.rotation);
    RuntimeWarpTarget {
        name: window.name.clone(),
        transform: Transform::new(translation, rotation),
        start_time: window.start_time,
        end_time: window.end_time,
        warp_translation: window.warp_translation,
        warp_rotation: window.warp_rotation,
        adjust_height: window.adjust_character_height,
    }
}

pub fn build_warp_targets(
    definition: &ActionDefinition,
    result: &ParkourResult,
    body: &BodySample,
    input: Vec3,
) -> Vec<RuntimeWarpTarget> {
    definition
        .warp_windows
        .iter()
        .map(|w| build_warp_target(w, result, body, input))
        .collect()
}

/// How the action got under way.
#[derive(Clone, Debug, PartialEq)]
pub enum Dispatch {
    /// Targets handed to the root-motion aligner.
    Aligned { targets: usize },
    /// No aligner: the body was set to the first target directly.
    Teleported(Transform),
    /// The body follows a tween, advanced every tick by the owner.
    Tween(CornerMoveTween),
    /// Nothing moved the body (no aligner and the direct fallback is off).
    Unmoved,
}

/// Outcome of [`execute`].
#[derive(Clone, Debug, PartialEq)]
pub struct Execution {
    pub dispatch: Dispatch,
    /// Seconds to stay `Active` before exiting.
    pub linger_seconds: f32,
}

/// Build the warp targets into `result` and start the action on the body.
pub fn execute(
    config: &ParkourConfig,
    result: &mut ParkourResult,
    sample: &BodySample,
    input: Vec3,
    body: &mut (dyn CharacterBody + '_),
    aligner: Option<&mut (dyn RootMotionAligner + '_)>,
) -> Execution {
    let definition = config.actions.get(result.action);
    let targets = build_warp_targets(&definition, result, sample, input);
    result.set_warp_targets(targets);
    body.set_movement_mode(definition.entry_movement_mode);

    let first = result
        .warp_targets
        .first()
        .map(|t| t.transform)
        .unwrap_or_else(|| build_warp_target(&WarpWindow::default(), result, sample, input).transform);

    let dispatch = if let Some(seconds) = definition.interpolate_seconds {
        debug!("{}: tween over {seconds:.2}s", result.action.name());
        Dispatch::Tween(CornerMoveTween::new(sample.transform, first, seconds))
    } else if let Some(aligner) = aligner.filter(|_| !result.warp_targets.is_empty()) {
        aligner.set_targets(&result.warp_targets);
        Dispatch::Aligned {
            targets: result.warp_targets.len(),
        }
    } else if config.execution.teleport_fallback {
        debug!("{}: no root-motion alignment, setting transform", result.action.name());
        body.teleport(&first);
        Dispatch::Teleported(first)
    } else {
        warn!("{}: no aligner and direct fallback disabled", result.action.name());
        Dispatch::Unmoved
    };

    Execution {
        dispatch,
        linger_seconds: definition.linger_seconds.max(0.0),
    }
}

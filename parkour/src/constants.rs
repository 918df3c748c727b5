/// Minimum squared planar length for a direction to define a yaw.
pub const YAW_EPS: f32 = 1.0e-6;

/// Tag path prefixes for the four tag families mirrored on a result.
pub const ACTION_TAG_PREFIX: &str = "Parkour.Action";
pub const STATE_TAG_PREFIX: &str = "Parkour.State";
pub const CLIMB_STYLE_TAG_PREFIX: &str = "Parkour.ClimbStyle";
pub const DIRECTION_TAG_PREFIX: &str = "Parkour.Direction";

/// Trace-profile keys that are not actions.
pub const GROUND_DETECT_PROFILE: &str = "Parkour.Detect.Ground";
pub const AIR_DETECT_PROFILE: &str = "Parkour.Detect.Air";
pub const CLIMB_DETECT_PROFILE: &str = "Parkour.Detect.Climb";

/// Names of the warp targets handed to the root-motion aligner.
pub const WARP_TARGET_PRIMARY: &str = "ParkourTarget";
pub const WARP_TARGET_LAND: &str = "ParkourLand";

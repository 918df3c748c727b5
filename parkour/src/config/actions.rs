//! Data-driven per-action execution definitions: warp windows, linger, entry movement mode.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::action::ParkourAction;
use crate::body::MovementMode;
use crate::constants::{WARP_TARGET_LAND, WARP_TARGET_PRIMARY};

/// How a warp target is oriented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FacingMode {
    /// Face into the surface (against its normal).
    #[default]
    Surface,
    /// Keep the character's current planar facing.
    CharacterForward,
    /// Face along the triggering input, then the planar velocity, then the character's facing.
    Velocity,
}

/// One named target handed to the root-motion aligner for a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpWindow {
    pub name: String,
    /// Window start (seconds into the action).
    pub start_time: f32,
    /// Window end (seconds into the action).
    pub end_time: f32,
    pub warp_translation: bool,
    pub warp_rotation: bool,
    /// Offset along the target's (forward, right) axes.
    pub offset_xy: [f32; 2],
    /// Vertical offset.
    pub offset_z: f32,
    /// Lift the target by the character's feet offset so the capsule stands on it.
    pub adjust_character_height: bool,
    pub facing: FacingMode,
}

impl Default for WarpWindow {
    fn default() -> Self {
        Self {
            name: WARP_TARGET_PRIMARY.to_owned(),
            start_time: 0.0,
            end_time: 0.3,
            warp_translation: true,
            warp_rotation: true,
            offset_xy: [0.0, 0.0],
            offset_z: 0.0,
            adjust_character_height: true,
            facing: FacingMode::Surface,
        }
    }
}

impl WarpWindow {
    /// Hanging below a ledge top: pulled back from the wall, centre under the lip.
    fn hang(end_time: f32) -> Self {
        Self {
            end_time,
            offset_xy: [-35.0, 0.0],
            offset_z: -90.0,
            adjust_character_height: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionDefinition {
    /// Ordered warp windows. Empty means "teleport to the computed target".
    pub warp_windows: Vec<WarpWindow>,
    /// How long the action stays `Active` before exiting (seconds).
    pub linger_seconds: f32,
    /// Movement mode the body is switched to while the action runs.
    pub entry_movement_mode: MovementMode,
    /// Interpolate to the first window's target over this many seconds instead of warping.
    pub interpolate_seconds: Option<f32>,
}

impl Default for ActionDefinition {
    fn default() -> Self {
        Self {
            warp_windows: vec![WarpWindow::default()],
            linger_seconds: 0.6,
            entry_movement_mode: MovementMode::Flying,
            interpolate_seconds: None,
        }
    }
}

impl ActionDefinition {
    pub fn builtin(action: ParkourAction) -> ActionDefinition {
        let base = ActionDefinition::default();
        match action {
            ParkourAction::None => ActionDefinition {
                warp_windows: Vec::new(),
                linger_seconds: 0.0,
                entry_movement_mode: MovementMode::Walking,
                interpolate_seconds: None,
            },
            ParkourAction::Mantle => ActionDefinition {
                warp_windows: vec![WarpWindow {
                    end_time: 0.35,
                    ..WarpWindow::default()
                }],
                linger_seconds: 0.9,
                ..base
            },
            ParkourAction::LowMantle => ActionDefinition {
                warp_windows: vec![WarpWindow {
                    end_time: 0.2,
                    ..WarpWindow::default()
                }],
                linger_seconds: 0.6,
                ..base
            },
            ParkourAction::DistanceMantle => ActionDefinition {
                warp_windows: vec![WarpWindow {
                    end_time: 0.45,
                    ..WarpWindow::default()
                }],
                linger_seconds: 1.0,
                ..base
            },
            ParkourAction::Vault | ParkourAction::ThinVault | ParkourAction::HighVault => {
                let linger_seconds = match action {
                    ParkourAction::ThinVault => 0.6,
                    ParkourAction::HighVault => 0.9,
                    _ => 0.8,
                };
                ActionDefinition {
                    warp_windows: vec![
                        WarpWindow {
                            end_time: 0.25,
                            adjust_character_height: false,
                            ..WarpWindow::default()
                        },
                        WarpWindow {
                            name: WARP_TARGET_LAND.to_owned(),
                            start_time: 0.3,
                            end_time: 0.6,
                            warp_rotation: false,
                            offset_xy: [120.0, 0.0],
                            adjust_character_height: false,
                            facing: FacingMode::CharacterForward,
                            ..WarpWindow::default()
                        },
                    ],
                    linger_seconds,
                    ..base
                }
            }
            ParkourAction::VaultToBraced => ActionDefinition {
                warp_windows: vec![WarpWindow::hang(0.4)],
                linger_seconds: 0.8,
                ..base
            },
            ParkourAction::LedgeMove => ActionDefinition {
                warp_windows: vec![WarpWindow::hang(0.3)],
                linger_seconds: 0.4,
                ..base
            },
            ParkourAction::Drop => ActionDefinition {
                warp_windows: vec![WarpWindow::hang(0.4)],
                linger_seconds: 0.7,
                ..base
            },
            ParkourAction::AirHang => ActionDefinition {
                warp_windows: vec![WarpWindow::hang(0.25)],
                linger_seconds: 0.5,
                ..base
            },
            ParkourAction::BackHop => ActionDefinition {
                warp_windows: vec![WarpWindow::hang(0.5)],
                linger_seconds: 0.8,
                ..base
            },
            ParkourAction::PredictJump => ActionDefinition {
                warp_windows: vec![WarpWindow::hang(0.55)],
                linger_seconds: 0.9,
                ..base
            },
            ParkourAction::TicTac => ActionDefinition {
                warp_windows: vec![WarpWindow {
                    end_time: 0.3,
                    facing: FacingMode::Velocity,
                    ..WarpWindow::default()
                }],
                linger_seconds: 0.5,
                ..base
            },
            ParkourAction::CornerMove => ActionDefinition {
                warp_windows: vec![WarpWindow::hang(0.4)],
                linger_seconds: 0.45,
                interpolate_seconds: Some(0.4),
                ..base
            },
        }
    }
}

/// Action definitions keyed by action. Missing actions fall back to [`ActionDefinition::builtin`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionDefinitionTable {
    entries: HashMap<ParkourAction, ActionDefinition>,
}

impl Default for ActionDefinitionTable {
    fn default() -> Self {
        Self {
            entries: ParkourAction::ALL
                .into_iter()
                .map(|a| (a, ActionDefinition::builtin(a)))
                .collect(),
        }
    }
}

impl ActionDefinitionTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, action: ParkourAction, definition: ActionDefinition) {
        self.entries.insert(action, definition);
    }

    pub fn get(&self, action: ParkourAction) -> Cow<'_, ActionDefinition> {
        match self.entries.get(&action) {
            Some(def) => Cow::Borrowed(def),
            None => Cow::Owned(ActionDefinition::builtin(action)),
        }
    }

    pub fn missing_actions(&self) -> Vec<ParkourAction> {
        ParkourAction::ALL
            .into_iter()
            .filter(|a| *a != ParkourAction::None && !self.entries.contains_key(a))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParkourAction, &ActionDefinition)> {
        self.entries.iter()
    }
}

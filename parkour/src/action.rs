//! Action, state and direction vocabularies plus the fixed mapping tables between them.
//!
//! These enums are the engine's internal labels. Tags (see [`crate::tags`]) only appear
//! at the boundary, built from [`ParkourAction::tag_path`] and friends.

use serde::{Deserialize, Serialize};

use crate::constants::{
    ACTION_TAG_PREFIX, CLIMB_STYLE_TAG_PREFIX, DIRECTION_TAG_PREFIX, STATE_TAG_PREFIX,
};

/// The traversal chosen by a detection pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParkourAction {
    #[default]
    None,
    Mantle,
    LowMantle,
    DistanceMantle,
    Vault,
    ThinVault,
    HighVault,
    VaultToBraced,
    LedgeMove,
    Drop,
    TicTac,
    BackHop,
    PredictJump,
    CornerMove,
    AirHang,
}

impl ParkourAction {
    pub const ALL: [ParkourAction; 15] = [
        ParkourAction::None,
        ParkourAction::Mantle,
        ParkourAction::LowMantle,
        ParkourAction::DistanceMantle,
        ParkourAction::Vault,
        ParkourAction::ThinVault,
        ParkourAction::HighVault,
        ParkourAction::VaultToBraced,
        ParkourAction::LedgeMove,
        ParkourAction::Drop,
        ParkourAction::TicTac,
        ParkourAction::BackHop,
        ParkourAction::PredictJump,
        ParkourAction::CornerMove,
        ParkourAction::AirHang,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ParkourAction::None => "None",
            ParkourAction::Mantle => "Mantle",
            ParkourAction::LowMantle => "LowMantle",
            ParkourAction::DistanceMantle => "DistanceMantle",
            ParkourAction::Vault => "Vault",
            ParkourAction::ThinVault => "ThinVault",
            ParkourAction::HighVault => "HighVault",
            ParkourAction::VaultToBraced => "VaultToBraced",
            ParkourAction::LedgeMove => "LedgeMove",
            ParkourAction::Drop => "Drop",
            ParkourAction::TicTac => "TicTac",
            ParkourAction::BackHop => "BackHop",
            ParkourAction::PredictJump => "PredictJump",
            ParkourAction::CornerMove => "CornerMove",
            ParkourAction::AirHang => "AirHang",
        }
    }

    /// Hierarchical tag path, e.g. `Parkour.Action.Mantle`.
    pub fn tag_path(self) -> String {
        format!("{ACTION_TAG_PREFIX}.{}", self.name())
    }

    pub fn is_mantle_family(self) -> bool {
        matches!(
            self,
            ParkourAction::Mantle | ParkourAction::LowMantle | ParkourAction::DistanceMantle
        )
    }

    pub fn is_vault_family(self) -> bool {
        matches!(
            self,
            ParkourAction::Vault
                | ParkourAction::ThinVault
                | ParkourAction::HighVault
                | ParkourAction::VaultToBraced
        )
    }

    /// Coarse classification layered on the action.
    pub fn result_type(self) -> ResultType {
        match self {
            ParkourAction::None => ResultType::None,
            ParkourAction::Drop | ParkourAction::AirHang => ResultType::Drop,
            _ => ResultType::Mantle,
        }
    }

    /// Logical state while this action is in flight.
    pub fn logical_state(self) -> LogicalState {
        match self {
            ParkourAction::None => LogicalState::NotBusy,
            ParkourAction::Mantle | ParkourAction::LowMantle | ParkourAction::DistanceMantle => {
                LogicalState::Mantle
            }
            ParkourAction::Vault
            | ParkourAction::ThinVault
            | ParkourAction::HighVault
            | ParkourAction::VaultToBraced => LogicalState::Vault,
            ParkourAction::TicTac => LogicalState::TicTac,
            ParkourAction::LedgeMove | ParkourAction::BackHop | ParkourAction::PredictJump => {
                LogicalState::ReachLedge
            }
            ParkourAction::CornerMove => LogicalState::CornerMove,
            ParkourAction::AirHang | ParkourAction::Drop => LogicalState::Climb,
        }
    }

    /// Logical state once the action's linger has elapsed.
    ///
    /// Actions that end holding a ledge leave the character climbing.
    pub fn settled_state(self) -> LogicalState {
        if self.ends_hanging() {
            LogicalState::Climb
        } else {
            LogicalState::NotBusy
        }
    }

    pub fn ends_hanging(self) -> bool {
        matches!(
            self,
            ParkourAction::Drop
                | ParkourAction::AirHang
                | ParkourAction::LedgeMove
                | ParkourAction::BackHop
                | ParkourAction::PredictJump
                | ParkourAction::CornerMove
                | ParkourAction::VaultToBraced
        )
    }
}

/// Coarse result family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultType {
    #[default]
    None,
    Mantle,
    Drop,
}

/// Whether the feet have wall support while hanging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClimbStyle {
    #[default]
    None,
    FreeHang,
    Braced,
}

impl ClimbStyle {
    pub fn name(self) -> &'static str {
        match self {
            ClimbStyle::None => "None",
            ClimbStyle::FreeHang => "FreeHang",
            ClimbStyle::Braced => "Braced",
        }
    }

    pub fn tag_path(self) -> String {
        format!("{CLIMB_STYLE_TAG_PREFIX}.{}", self.name())
    }
}

/// Coarse traversal mode; picks the probe family and drives external capability tags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalState {
    #[default]
    NotBusy,
    Mantle,
    Vault,
    Climb,
    ReachLedge,
    TicTac,
    CornerMove,
    /// Never derived from an action; gameplay code sets it through
    /// [`ParkourComponent::set_beam_hidden`](crate::ParkourComponent::set_beam_hidden).
    BeamHidden,
}

impl LogicalState {
    pub fn name(self) -> &'static str {
        match self {
            LogicalState::NotBusy => "NotBusy",
            LogicalState::Mantle => "Mantle",
            LogicalState::Vault => "Vault",
            LogicalState::Climb => "Climb",
            LogicalState::ReachLedge => "ReachLedge",
            LogicalState::TicTac => "TicTac",
            LogicalState::CornerMove => "CornerMove",
            LogicalState::BeamHidden => "BeamHidden",
        }
    }

    pub fn tag_path(self) -> String {
        format!("{STATE_TAG_PREFIX}.{}", self.name())
    }

    #[inline]
    pub fn is_climbing(self) -> bool {
        self == LogicalState::Climb
    }

    /// Hand/foot IK probes only run while holding or reaching for a ledge.
    #[inline]
    pub fn permits_ik(self) -> bool {
        matches!(self, LogicalState::Climb | LogicalState::ReachLedge)
    }

    /// Mantles and vaults also place hands on the confirmed lip.
    #[inline]
    pub fn permits_hand_ik(self) -> bool {
        self.permits_ik() || matches!(self, LogicalState::Mantle | LogicalState::Vault)
    }
}

/// Lifecycle phase. One action in flight at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    Entering,
    Active,
    Exiting,
}

impl Phase {
    #[inline]
    pub fn permits_detection(self) -> bool {
        matches!(self, Phase::Idle | Phase::Exiting)
    }
}

/// Direction of a traversal relative to the character / wall.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraversalDirection {
    #[default]
    None,
    Forward,
    Backward,
    Left,
    Right,
    Up,
    UpLeft,
    UpRight,
}

impl TraversalDirection {
    pub fn name(self) -> &'static str {
        match self {
            TraversalDirection::None => "None",
            TraversalDirection::Forward => "Forward",
            TraversalDirection::Backward => "Backward",
            TraversalDirection::Left => "Left",
            TraversalDirection::Right => "Right",
            TraversalDirection::Up => "Up",
            TraversalDirection::UpLeft => "UpLeft",
            TraversalDirection::UpRight => "UpRight",
        }
    }

    pub fn tag_path(self) -> String {
        format!("{DIRECTION_TAG_PREFIX}.{}", self.name())
    }

    /// Lateral direction for a side sign (`< 0` left, otherwise right).
    pub fn lateral(side: f32) -> Self {
        if side < 0.0 {
            TraversalDirection::Left
        } else {
            TraversalDirection::Right
        }
    }
}

/// Left or right limb / side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// -1 for left, +1 for right (multiplies a right-pointing tangent).
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_state_mapping_table() {
        use LogicalState as S;
        use ParkourAction as A;
        let expected = [
            (A::None, S::NotBusy),
            (A::Mantle, S::Mantle),
            (A::LowMantle, S::Mantle),
            (A::DistanceMantle, S::Mantle),
            (A::Vault, S::Vault),
            (A::ThinVault, S::Vault),
            (A::HighVault, S::Vault),
            (A::VaultToBraced, S::Vault),
            (A::TicTac, S::TicTac),
            (A::LedgeMove, S::ReachLedge),
            (A::BackHop, S::ReachLedge),
            (A::PredictJump, S::ReachLedge),
            (A::CornerMove, S::CornerMove),
            (A::AirHang, S::Climb),
            (A::Drop, S::Climb),
        ];
        assert_eq!(expected.len(), ParkourAction::ALL.len());
        for (action, state) in expected {
            assert_eq!(action.logical_state(), state, "{action:?}");
        }
    }

    #[test]
    fn only_idle_and_exiting_permit_detection() {
        assert!(Phase::Idle.permits_detection());
        assert!(Phase::Exiting.permits_detection());
        assert!(!Phase::Entering.permits_detection());
        assert!(!Phase::Active.permits_detection());
    }

    #[test]
    fn tag_paths_are_hierarchical() {
        assert_eq!(ParkourAction::ThinVault.tag_path(), "Parkour.Action.ThinVault");
        assert_eq!(LogicalState::Climb.tag_path(), "Parkour.State.Climb");
        assert_eq!(ClimbStyle::Braced.tag_path(), "Parkour.ClimbStyle.Braced");
        assert_eq!(TraversalDirection::UpLeft.tag_path(), "Parkour.Direction.UpLeft");
    }

    #[test]
    fn hang_actions_settle_into_climb() {
        assert_eq!(ParkourAction::Drop.settled_state(), LogicalState::Climb);
        assert_eq!(ParkourAction::CornerMove.settled_state(), LogicalState::Climb);
        assert_eq!(ParkourAction::Mantle.settled_state(), LogicalState::NotBusy);
        assert_eq!(ParkourAction::TicTac.settled_state(), LogicalState::NotBusy);
    }
}

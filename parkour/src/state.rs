//! Lifecycle state machine.
//!
//! Two orthogonal variables: the [`Phase`] (`Idle -> Entering -> Active -> Exiting ->
//! Idle`) and the [`LogicalState`] derived from the action in flight. All timers live
//! here and are advanced by [`StateMachine::tick`]; an abort clears them in the same call.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::action::{LogicalState, ParkourAction, Phase};

/// A logical-state transition, reported to listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChange {
    pub prev: LogicalState,
    pub next: LogicalState,
}

impl StateChange {
    /// `Some` only when the state actually changed.
    pub fn between(prev: LogicalState, next: LogicalState) -> Option<Self> {
        (prev != next).then_some(Self { prev, next })
    }

    #[inline]
    pub fn entered_climb(&self) -> bool {
        self.next == LogicalState::Climb
    }
}

/// What a [`StateMachine::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickEvent {
    /// Linger elapsed: `Active -> Exiting`.
    Exiting(ParkourAction),
    /// Exit blend elapsed: `Exiting -> Idle`, settled into the action's end state.
    Finished {
        action: ParkourAction,
        change: Option<StateChange>,
    },
}

/// Why an in-flight action was abandoned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbortReason {
    #[default]
    Requested,
    /// The body switched into a movement mode the action did not expect.
    MovementModeChanged,
    /// A collaborator (world, body) disappeared mid-action.
    MissingDependency,
}

#[derive(Clone, Debug, Default)]
pub struct StateMachine {
    phase: Phase,
    logical: LogicalState,
    action: ParkourAction,
    linger_remaining: f32,
    exit_remaining: f32,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn logical_state(&self) -> LogicalState {
        self.logical
    }

    /// Action in flight (`None` while idle).
    #[inline]
    pub fn action(&self) -> ParkourAction {
        self.action
    }

    #[inline]
    pub fn linger_remaining(&self) -> f32 {
        self.linger_remaining
    }

    pub fn set_logical_state(&mut self, next: LogicalState) -> Option<StateChange> {
        let change = StateChange::between(self.logical, next);
        if let Some(change) = change {
            debug!("logical state {} -> {}", change.prev.name(), change.next.name());
        }
        self.logical = next;
        change
    }

    /// `Idle`/`Exiting -> Entering`. Refused while another action is entering or active.
    pub fn begin(&mut self, action: ParkourAction) -> bool {
        if !self.phase.permits_detection() || action == ParkourAction::None {
            return false;
        }
        self.phase = Phase::Entering;
        self.action = action;
        self.linger_remaining = 0.0;
        self.exit_remaining = 0.0;
        true
    }

    /// `Entering -> Active`, arming the linger timer.
    pub fn activate(&mut self, linger_seconds: f32) -> bool {
        if self.phase != Phase::Entering {
            return false;
        }
        self.phase = Phase::Active;
        self.linger_remaining = linger_seconds.max(0.0);
        true
    }

    /// Cut the linger short (the action reached its end early).
    pub fn finish_linger(&mut self) {
        if self.phase == Phase::Active {
            self.linger_remaining = 0.0;
        }
    }

    pub fn tick(&mut self, dt: f32, exit_blend_seconds: f32) -> Option<TickEvent> {
        let dt = dt.max(0.0);
        match self.phase {
            Phase::Active => {
                self.linger_remaining -= dt;
                if self.linger_remaining > 0.0 {
                    return None;
                }
                self.linger_remaining = 0.0;
                self.phase = Phase::Exiting;
                self.exit_remaining = exit_blend_seconds.max(0.0);
                Some(TickEvent::Exiting(self.action))
            }
            Phase::Exiting => {
                self.exit_remaining -= dt;
                if self.exit_remaining > 0.0 {
                    return None;
                }
                let action = std::mem::take(&mut self.action);
                self.exit_remaining = 0.0;
                self.phase = Phase::Idle;
                let change = self.set_logical_state(action.settled_state());
                Some(TickEvent::Finished { action, change })
            }
            Phase::Idle | Phase::Entering => None,
        }
    }

    /// Force `Idle`/`NotBusy` and drop every timer.
    pub fn abort(&mut self) -> Option<StateChange> {
        self.phase = Phase::Idle;
        self.action = ParkourAction::None;
        self.linger_remaining = 0.0;
        self.exit_remaining = 0.0;
        self.set_logical_state(LogicalState::NotBusy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_lifecycle_settles_into_the_end_state() {
        let mut sm = StateMachine::new();
        assert!(sm.begin(ParkourAction::AirHang));
        assert_eq!(sm.phase(), Phase::Entering);
        assert!(!sm.begin(ParkourAction::Mantle));
        assert!(sm.activate(0.5));
        sm.set_logical_state(ParkourAction::AirHang.logical_state());

        assert_eq!(sm.tick(0.25, 0.1), None);
        assert_eq!(sm.tick(0.25, 0.1), Some(TickEvent::Exiting(ParkourAction::AirHang)));
        assert!(sm.phase().permits_detection());
        assert_eq!(
            sm.tick(0.1, 0.1),
            Some(TickEvent::Finished {
                action: ParkourAction::AirHang,
                change: None,
            })
        );
        assert_eq!(sm.phase(), Phase::Idle);
        assert_eq!(sm.logical_state(), LogicalState::Climb);
        assert_eq!(sm.action(), ParkourAction::None);
    }

    #[test]
    fn mantle_settles_back_to_not_busy() {
        let mut sm = StateMachine::new();
        sm.begin(ParkourAction::Mantle);
        sm.activate(0.0);
        sm.set_logical_state(LogicalState::Mantle);
        assert!(matches!(sm.tick(0.0, 0.0), Some(TickEvent::Exiting(_))));
        let Some(TickEvent::Finished { change, .. }) = sm.tick(0.0, 0.0) else {
            panic!("expected the action to finish");
        };
        assert_eq!(
            change,
            Some(StateChange {
                prev: LogicalState::Mantle,
                next: LogicalState::NotBusy,
            })
        );
    }

    #[test]
    fn abort_from_active_is_immediate() {
        let mut sm = StateMachine::new();
        sm.begin(ParkourAction::Vault);
        sm.activate(2.0);
        sm.set_logical_state(LogicalState::Vault);
        let change = sm.abort();
        assert_eq!(change.map(|c| c.next), Some(LogicalState::NotBusy));
        assert_eq!(sm.phase(), Phase::Idle);
        assert_eq!(sm.linger_remaining(), 0.0);
        assert_eq!(sm.tick(10.0, 1.0), None);
    }

    #[test]
    fn activate_requires_entering() {
        let mut sm = StateMachine::new();
        assert!(!sm.activate(1.0));
        assert!(!sm.begin(ParkourAction::None));
    }
}

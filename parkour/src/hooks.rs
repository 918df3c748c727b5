//! Overridable behavior and change notifications.
//!
//! [`ParkourHooks`] lets gameplay code veto or observe activations; every method has a
//! default, so [`DefaultHooks`] is an empty impl. [`ParkourListener`] is the push side
//! of the animation/observer contract.

use crate::action::ParkourAction;
use crate::body::BodySample;
use crate::result::ParkourResult;
use crate::state::{AbortReason, StateChange};

/// Which side of the authority split a component runs on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NetRole {
    #[default]
    Authority,
    Observer,
}

/// How a component in a given role treats activation requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivationKind {
    /// Detect and execute locally.
    Execute,
    /// Never detect; only mirror published snapshots.
    MirrorOnly,
}

pub trait ParkourHooks {
    /// Last word before an action starts. `false` vetoes it.
    fn evaluate_activation(&self, _result: &ParkourResult, _body: &BodySample) -> bool {
        true
    }

    fn activation_for_role(&self, role: NetRole) -> ActivationKind {
        match role {
            NetRole::Authority => ActivationKind::Execute,
            NetRole::Observer => ActivationKind::MirrorOnly,
        }
    }

    fn on_action_started(&mut self, _result: &ParkourResult) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHooks;

impl ParkourHooks for DefaultHooks {}

pub trait ParkourListener {
    fn on_result_changed(&mut self, _result: &ParkourResult) {}
    fn on_state_changed(&mut self, _change: StateChange) {}
    fn on_parkour_failed(&mut self, _reason: AbortReason) {}
    fn on_action_finished(&mut self, _action: ParkourAction) {}
}

/// Fan a notification out to every listener.
pub(crate) fn notify_all<F>(listeners: &mut [Box<dyn ParkourListener>], mut f: F)
where
    F: FnMut(&mut dyn ParkourListener),
{
    for listener in listeners.iter_mut() {
        f(listener.as_mut());
    }
}

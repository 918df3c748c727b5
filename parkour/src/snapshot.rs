/*!
Authority-to-observer mirroring.

The authoritative component publishes an immutable [`ParkourSnapshot`] into a versioned
[`SnapshotCell`] whenever its result or state changes. Observers hold a
[`SnapshotReader`]; an [`ObserverMirror`] polls it, keeps the last seen copy, and fires
the same listener callbacks the authority fires, derived from the diff. Observers never
write: there is exactly one writer per cell.
*/

use std::cell::RefCell;
use std::rc::Rc;

use log::trace;

use crate::action::{LogicalState, ParkourAction, Phase};
use crate::hooks::{ParkourListener, notify_all};
use crate::result::ParkourResult;
use crate::state::{AbortReason, StateChange};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParkourSnapshot {
    pub result: ParkourResult,
    pub phase: Phase,
    pub logical_state: LogicalState,
    /// Monotonic count of aborts; observers fire a failure per increment.
    pub aborts: u32,
    pub last_abort: Option<AbortReason>,
    /// Monotonic count of finished actions.
    pub finished: u32,
    pub last_finished: ParkourAction,
}

#[derive(Debug, Default)]
struct Versioned {
    version: u64,
    snapshot: ParkourSnapshot,
}

/// Single-writer, versioned snapshot slot.
#[derive(Debug, Default)]
pub struct SnapshotCell {
    inner: Rc<RefCell<Versioned>>,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `snapshot` if it differs from the current one. Returns the (new) version.
    pub fn publish(&self, snapshot: &ParkourSnapshot) -> u64 {
        let mut slot = self.inner.borrow_mut();
        if slot.version == 0 || slot.snapshot != *snapshot {
            slot.version += 1;
            slot.snapshot = snapshot.clone();
            trace!("published parkour snapshot v{}", slot.version);
        }
        slot.version
    }

    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Read-only handle onto a [`SnapshotCell`].
#[derive(Clone, Debug)]
pub struct SnapshotReader {
    inner: Rc<RefCell<Versioned>>,
}

impl SnapshotReader {
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// The snapshot, if it is newer than `seen`.
    pub fn read_newer(&self, seen: u64) -> Option<(u64, ParkourSnapshot)> {
        let slot = self.inner.borrow();
        (slot.version > seen).then(|| (slot.version, slot.snapshot.clone()))
    }
}

/// Observer-side copy of the authoritative state.
pub struct ObserverMirror {
    reader: SnapshotReader,
    seen: u64,
    current: ParkourSnapshot,
    listeners: Vec<Box<dyn ParkourListener>>,
}

impl ObserverMirror {
    pub fn new(reader: SnapshotReader) -> Self {
        Self {
            reader,
            seen: 0,
            current: ParkourSnapshot::default(),
            listeners: Vec::new(),
        }
    }

    pub fn add_listener(&mut self, listener: Box<dyn ParkourListener>) {
        self.listeners.push(listener);
    }

    pub fn snapshot(&self) -> &ParkourSnapshot {
        &self.current
    }

    /// Pull the latest snapshot and fire callbacks for what changed. Returns `true` when
    /// a newer snapshot was applied.
    pub fn poll(&mut self) -> bool {
        let Some((version, next)) = self.reader.read_newer(self.seen) else {
            return false;
        };
        let prev = std::mem::replace(&mut self.current, next);
        self.seen = version;
        let next = &self.current;

        if let Some(change) = StateChange::between(prev.logical_state, next.logical_state) {
            notify_all(&mut self.listeners, |l| l.on_state_changed(change));
        }
        if prev.result != next.result {
            notify_all(&mut self.listeners, |l| l.on_result_changed(&next.result));
        }
        if next.aborts != prev.aborts {
            let reason = next.last_abort.unwrap_or_default();
            for _ in 0..next.aborts.wrapping_sub(prev.aborts) {
                notify_all(&mut self.listeners, |l| l.on_parkour_failed(reason));
            }
        }
        if next.finished != prev.finished {
            let action = next.last_finished;
            notify_all(&mut self.listeners, |l| l.on_action_finished(action));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ListenerEvent, RecordingListener};

    #[test]
    fn identical_snapshots_do_not_bump_the_version() {
        let cell = SnapshotCell::new();
        let snap = ParkourSnapshot::default();
        assert_eq!(cell.publish(&snap), 1);
        assert_eq!(cell.publish(&snap), 1);
        let changed = ParkourSnapshot {
            phase: Phase::Active,
            ..Default::default()
        };
        assert_eq!(cell.publish(&changed), 2);
    }

    #[test]
    fn observer_fires_callbacks_from_the_diff() {
        let cell = SnapshotCell::new();
        let mut mirror = ObserverMirror::new(cell.reader());
        let listener = RecordingListener::default();
        mirror.add_listener(Box::new(listener.clone()));
        assert!(!mirror.poll());

        let mut snap = ParkourSnapshot {
            logical_state: LogicalState::Mantle,
            phase: Phase::Active,
            ..Default::default()
        };
        snap.result.action = ParkourAction::Mantle;
        snap.result.is_valid = true;
        cell.publish(&snap);
        assert!(mirror.poll());
        assert!(!mirror.poll());
        assert_eq!(
            listener.take(),
            vec![
                ListenerEvent::State(StateChange {
                    prev: LogicalState::NotBusy,
                    next: LogicalState::Mantle,
                }),
                ListenerEvent::Result(ParkourAction::Mantle),
            ]
        );

        snap.result.reset();
        snap.logical_state = LogicalState::NotBusy;
        snap.phase = Phase::Idle;
        snap.aborts = 1;
        snap.last_abort = Some(AbortReason::MovementModeChanged);
        cell.publish(&snap);
        mirror.poll();
        let events = listener.take();
        assert!(events.contains(&ListenerEvent::Failed(AbortReason::MovementModeChanged)));
        assert_eq!(mirror.snapshot().phase, Phase::Idle);
    }
}

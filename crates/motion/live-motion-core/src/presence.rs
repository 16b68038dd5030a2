//! Presence slot: at most one logical child per slot, exit before enter.
//!
//! The slot only tracks queues and the `idle`/`exiting` state. The runtime
//! performs the engine and DOM work the slot tells it to do.

use hashbrown::HashSet;

use crate::ids::{ElementId, EngineHandle};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SlotState {
    Idle,
    Exiting,
}

/// Engine cleanup owed for an admitted occupant.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PendingCleanup {
    pub element: ElementId,
    pub handle: EngineHandle,
}

/// Work released by a completed exit. Cleanups run before mounts.
#[derive(Debug, Default, PartialEq)]
pub struct ExitFlush {
    pub cleanups: Vec<PendingCleanup>,
    pub mounts: Vec<ElementId>,
}

#[derive(Debug)]
pub struct PresenceSlot {
    state: SlotState,
    exiting: Option<ElementId>,
    members: HashSet<ElementId>,
    mounts: Vec<ElementId>,
    cleanups: Vec<PendingCleanup>,
}

impl Default for PresenceSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl PresenceSlot {
    pub fn new() -> Self {
        Self {
            state: SlotState::Idle,
            exiting: None,
            members: HashSet::new(),
            mounts: Vec::new(),
            cleanups: Vec::new(),
        }
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn is_exiting(&self) -> bool {
        self.state == SlotState::Exiting
    }

    /// Element whose exit is in flight, if any.
    pub fn exiting_element(&self) -> Option<ElementId> {
        self.exiting
    }

    pub fn add_member(&mut self, element: ElementId) {
        self.members.insert(element);
    }

    pub fn remove_member(&mut self, element: ElementId) -> bool {
        self.members.remove(&element)
    }

    pub fn members(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.members.iter().copied()
    }

    pub fn queued_mounts(&self) -> &[ElementId] {
        &self.mounts
    }

    pub fn queued_cleanups(&self) -> &[PendingCleanup] {
        &self.cleanups
    }

    /// Returns `true` when the element may mount right away. Otherwise the
    /// mount is queued until the current occupant has exited.
    pub fn request_mount(&mut self, element: ElementId) -> bool {
        if self.state == SlotState::Idle && self.cleanups.is_empty() {
            true
        } else {
            self.mounts.push(element);
            false
        }
    }

    pub fn request_cleanup(&mut self, cleanup: PendingCleanup) {
        self.cleanups.push(cleanup);
    }

    /// Drop a queued mount for an element that went away before admission.
    pub fn cancel_mount(&mut self, element: ElementId) -> bool {
        let before = self.mounts.len();
        self.mounts.retain(|m| *m != element);
        self.mounts.len() != before
    }

    pub fn cleanup_for(&self, element: ElementId) -> Option<EngineHandle> {
        self.cleanups
            .iter()
            .find(|c| c.element == element)
            .map(|c| c.handle)
    }

    /// `idle -> exiting`. Returns `false` (and changes nothing) when an exit
    /// is already in flight.
    pub fn begin_exit(&mut self, element: ElementId) -> bool {
        if self.state == SlotState::Exiting {
            return false;
        }
        self.state = SlotState::Exiting;
        self.exiting = Some(element);
        true
    }

    /// `exiting -> idle`, releasing both queues.
    pub fn finish_exit(&mut self) -> ExitFlush {
        self.state = SlotState::Idle;
        self.exiting = None;
        self.drain()
    }

    /// Empty both queues without a state change (slot teardown).
    pub fn drain(&mut self) -> ExitFlush {
        ExitFlush {
            cleanups: std::mem::take(&mut self.cleanups),
            mounts: std::mem::take(&mut self.mounts),
        }
    }
}

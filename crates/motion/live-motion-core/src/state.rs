//! Per-element association tables owned by the runtime.
//!
//! Every table is keyed by [`ElementId`] and every entry is removed
//! explicitly on destroy; nothing relies on garbage collection.

use std::fmt;

use hashbrown::HashMap;
use serde::Serialize;

use crate::capabilities::Callback;
use crate::controls::AnimationControls;
use crate::events::MotionEvent;
use crate::ids::{ElementId, EngineHandle};
use crate::presence::PresenceSlot;
use crate::resolve::{AnimationConfig, MotionOptions};

/// Live binding between one element and its engine state.
#[derive(Debug)]
pub(crate) struct ElementState {
    /// Latest resolved configuration (`None` when the attribute is absent).
    pub config: Option<AnimationConfig>,
    /// Engine state; `None` until created (or while queued in a presence slot).
    pub handle: Option<EngineHandle>,
    /// Host scripts bound to synthetic events.
    pub listeners: HashMap<MotionEvent, String>,
    /// Options last pushed through `MotionEngine::update`.
    pub applied: Option<MotionOptions>,
    /// Controls of the last one-off animation.
    pub controls: Option<AnimationControls>,
    /// Presence slot this element belongs to.
    pub presence: Option<ElementId>,
}

impl ElementState {
    pub fn new(config: Option<AnimationConfig>, presence: Option<ElementId>) -> Self {
        let mut listeners = HashMap::new();
        if let Some(cfg) = config.as_ref() {
            if let Some(script) = cfg.on_start.as_ref() {
                listeners.insert(MotionEvent::Start, script.clone());
            }
            if let Some(script) = cfg.on_complete.as_ref() {
                listeners.insert(MotionEvent::Complete, script.clone());
            }
        }
        Self {
            config,
            handle: None,
            listeners,
            applied: None,
            controls: None,
            presence,
        }
    }

    pub fn defer(&self) -> bool {
        self.config.as_ref().is_some_and(|c| c.defer)
    }

    pub fn options(&self) -> Option<MotionOptions> {
        self.config.as_ref().map(AnimationConfig::motion_options)
    }
}

/// Work waiting for an element's next completion signal.
pub(crate) enum Waiter {
    /// Hide the element once its exit animation has finished.
    Hide,
    /// Finish the presence exit of `slot`, then run `on_done`.
    PresenceExit {
        slot: ElementId,
        on_done: Option<Callback>,
    },
}

impl fmt::Debug for Waiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Waiter::Hide => f.write_str("Hide"),
            Waiter::PresenceExit { slot, on_done } => f
                .debug_struct("PresenceExit")
                .field("slot", slot)
                .field("on_done", &on_done.is_some())
                .finish(),
        }
    }
}

/// Sizes of the association tables.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeStats {
    pub elements: usize,
    pub parent_links: usize,
    pub presence_slots: usize,
    pub pending_waiters: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub elements: HashMap<ElementId, ElementState>,
    /// child -> presence slot
    pub parents: HashMap<ElementId, ElementId>,
    pub slots: HashMap<ElementId, PresenceSlot>,
    pub waiters: HashMap<ElementId, Vec<Waiter>>,
}

impl Tables {
    pub fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            elements: self.elements.len(),
            parent_links: self.parents.len(),
            presence_slots: self.slots.len(),
            pending_waiters: self.waiters.values().map(Vec::len).sum(),
        }
    }

    pub fn push_waiter(&mut self, element: ElementId, waiter: Waiter) {
        self.waiters.entry(element).or_default().push(waiter);
    }

    /// A new command owns the element's visible state: pending hides are void.
    pub fn drop_hides(&mut self, element: ElementId) {
        if let Some(list) = self.waiters.get_mut(&element) {
            list.retain(|w| !matches!(w, Waiter::Hide));
            if list.is_empty() {
                self.waiters.remove(&element);
            }
        }
    }

    pub fn take_waiters(&mut self, element: ElementId) -> Vec<Waiter> {
        self.waiters.remove(&element).unwrap_or_default()
    }

    /// Remove every exit still waiting on `slot`, returning their callbacks.
    pub fn take_slot_exits(&mut self, slot: ElementId) -> Vec<Option<Callback>> {
        let mut done = Vec::new();
        for list in self.waiters.values_mut() {
            let mut kept = Vec::with_capacity(list.len());
            for waiter in list.drain(..) {
                match waiter {
                    Waiter::PresenceExit { slot: s, on_done } if s == slot => done.push(on_done),
                    other => kept.push(other),
                }
            }
            *list = kept;
        }
        self.waiters.retain(|_, list| !list.is_empty());
        done
    }
}

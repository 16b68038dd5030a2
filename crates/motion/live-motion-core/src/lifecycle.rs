//! Lifecycle adapter: mount/update/destroy of motion elements and presence
//! slots, plus the style preservation applied during DOM patches.

use crate::capabilities::{Callback, NodeAttributes};
use crate::config::RuntimeConfig;
use crate::error::{MotionError, Result};
use crate::ids::ElementId;
use crate::keyframes::Variant;
use crate::presence::{PendingCleanup, PresenceSlot};
use crate::resolve::resolve;
use crate::runtime::MotionRuntime;
use crate::state::{ElementState, Waiter};
use crate::transition::{wait_duration_ms, Transition};

/// Copy the inline style from the outgoing to the incoming node of a patch,
/// but only for animated nodes. A missing style on the outgoing node clears
/// the incoming one.
pub fn preserve_animated_style(
    from: &dyn NodeAttributes,
    to: &dyn NodeAttributes,
    cfg: &RuntimeConfig,
) {
    if from.attribute(&cfg.config_attribute).is_none() {
        return;
    }
    match from.attribute(&cfg.style_attribute) {
        Some(style) => to.set_attribute(&cfg.style_attribute, &style),
        None => to.remove_attribute(&cfg.style_attribute),
    }
}

impl MotionRuntime {
    /// Host `mounted` hook.
    pub fn on_mount(&self, element: ElementId) -> Result<()> {
        let config = resolve(self.inner.dom.as_ref(), &self.inner.cfg, element)?;
        let presence = self.inner.dom.presence_parent(element);

        let admit_now = {
            let mut tables = self.inner.tables.borrow_mut();
            if tables.elements.contains_key(&element) {
                log::debug!("{element:?} mounted twice; keeping the first registration");
                return Ok(());
            }
            tables
                .elements
                .insert(element, ElementState::new(config, presence));
            match presence {
                Some(slot) => {
                    tables.parents.insert(element, slot);
                    let slot_state = tables.slots.entry(slot).or_insert_with(PresenceSlot::new);
                    slot_state.add_member(element);
                    Some(slot_state.request_mount(element))
                }
                None => None,
            }
        };

        match admit_now {
            None => self.start(element),
            Some(now) => {
                // Hidden until the slot admits it.
                self.inner.dom.set_style(element, "display", Some("none"));
                if now {
                    self.admit(element);
                } else {
                    log::debug!("{element:?} queued behind the current presence occupant");
                }
            }
        }
        Ok(())
    }

    /// Host `updated` hook. Re-reads the attribute; a no-op when the
    /// configuration did not change or is deferred.
    pub fn on_update(&self, element: ElementId) -> Result<()> {
        let config = resolve(self.inner.dom.as_ref(), &self.inner.cfg, element)?;

        let needs_start = {
            let mut tables = self.inner.tables.borrow_mut();
            let slot = tables.parents.get(&element).copied();
            let queued = match slot {
                Some(slot) => tables
                    .slots
                    .get(&slot)
                    .is_some_and(|s| s.queued_mounts().contains(&element)),
                None => false,
            };
            let state = tables
                .elements
                .get_mut(&element)
                .ok_or(MotionError::UnknownElement(element))?;
            let had_config = state.config.is_some();
            state.config = config;
            if queued || state.config.is_none() {
                return Ok(());
            }
            // A config that appears after mount gets its engine state now.
            (!had_config && state.handle.is_none()).then_some(slot.is_some())
        };

        if let Some(member) = needs_start {
            // Presence members owe the slot a cleanup, like any admission.
            if member {
                self.admit(element);
            } else {
                self.start(element);
            }
            return Ok(());
        }

        let (handle, options) = {
            let mut tables = self.inner.tables.borrow_mut();
            let Some(state) = tables.elements.get_mut(&element) else {
                return Ok(());
            };
            let (Some(handle), Some(options)) = (state.handle, state.options()) else {
                return Ok(());
            };
            if state.defer() || state.applied.as_ref() == Some(&options) {
                return Ok(());
            }
            state.applied = Some(options.clone());
            tables.drop_hides(element);
            (handle, options)
        };
        self.inner.engine.update(handle, &options);
        Ok(())
    }

    /// Host `destroyed` hook. Listeners go first, then table entries, then
    /// the engine state. Presence members hand their engine state to the
    /// slot's exit instead.
    pub fn on_destroy(&self, element: ElementId) {
        let (state, slot) = {
            let mut tables = self.inner.tables.borrow_mut();
            let Some(state) = tables.elements.get_mut(&element) else {
                log::debug!("destroy of unknown element {element:?}");
                return;
            };
            state.listeners.clear();

            let Some(state) = tables.elements.remove(&element) else {
                return;
            };
            tables.parents.remove(&element);
            tables.drop_hides(element);
            let slot = state.presence;
            if let Some(slot_id) = slot {
                if let Some(slot_state) = tables.slots.get_mut(&slot_id) {
                    slot_state.remove_member(element);
                }
            }
            (state, slot)
        };

        let ElementState {
            handle,
            controls,
            config,
            ..
        } = state;
        if let Some(mut controls) = controls {
            controls.stop();
        }

        match (slot, handle) {
            (Some(slot), Some(_)) => {
                let transition = config.and_then(|c| c.transition);
                self.start_exit(slot, element, transition, None);
            }
            (Some(slot), None) => {
                let mut tables = self.inner.tables.borrow_mut();
                if let Some(slot_state) = tables.slots.get_mut(&slot) {
                    slot_state.cancel_mount(element);
                }
            }
            (None, Some(handle)) => self.inner.engine.release(handle),
            (None, None) => {}
        }
    }

    /// Mount hook of a presence marker element.
    pub fn mount_presence(&self, slot: ElementId) {
        let mut tables = self.inner.tables.borrow_mut();
        tables.slots.entry(slot).or_insert_with(PresenceSlot::new);
    }

    /// Destroy hook of a presence marker element. Releases owed engine
    /// cleanups of departed members, drops mounts that never got admitted
    /// and abandons an exit in flight. Members still mounted keep their
    /// engine state and release it on their own destroy.
    pub fn destroy_presence(&self, slot: ElementId) {
        let (flush, live, exits) = {
            let mut tables = self.inner.tables.borrow_mut();
            let Some(mut slot_state) = tables.slots.remove(&slot) else {
                return;
            };
            tables.parents.retain(|_, s| *s != slot);
            let mut live = Vec::new();
            for member in slot_state.members() {
                if let Some(state) = tables.elements.get_mut(&member) {
                    state.presence = None;
                    live.push(member);
                }
            }
            let exits = tables.take_slot_exits(slot);
            (slot_state.drain(), live, exits)
        };
        if !flush.mounts.is_empty() {
            log::debug!("{slot:?} destroyed with {} queued mounts", flush.mounts.len());
        }
        for cleanup in flush.cleanups {
            if !live.contains(&cleanup.element) {
                self.release_cleanup(cleanup);
            }
        }
        // The host removes the nodes with the marker; nothing is left to wait for.
        for done in exits.into_iter().flatten() {
            done();
        }
    }

    /// Start the exit of `element` from `slot`. Returns `false` when another
    /// exit is already in flight for the slot.
    pub fn begin_exit(
        &self,
        slot: ElementId,
        element: ElementId,
        on_done: Option<Callback>,
    ) -> Result<bool> {
        let known = {
            let tables = self.inner.tables.borrow();
            tables
                .elements
                .get(&element)
                .map(|s| s.config.as_ref().and_then(|c| c.transition.clone()))
        };
        let transition = match known {
            Some(t) => t,
            None => resolve(self.inner.dom.as_ref(), &self.inner.cfg, element)?
                .and_then(|c| c.transition),
        };
        Ok(self.start_exit(slot, element, transition, on_done))
    }

    pub(crate) fn start_exit(
        &self,
        slot: ElementId,
        element: ElementId,
        transition: Option<Transition>,
        on_done: Option<Callback>,
    ) -> bool {
        let handle = {
            let mut tables = self.inner.tables.borrow_mut();
            let Some(slot_state) = tables.slots.get_mut(&slot) else {
                log::debug!("exit requested on unknown slot {slot:?}");
                return false;
            };
            if !slot_state.begin_exit(element) {
                log::debug!("{slot:?} already exiting; ignoring exit of {element:?}");
                return false;
            }
            slot_state.cleanup_for(element)
        };

        let duration = wait_duration_ms(transition.as_ref(), &self.inner.cfg);
        log::debug!("{element:?} leaving {slot:?}; host waits up to {duration} ms");

        let weak = self.downgrade();
        self.inner.host.defer_removal(
            duration,
            Box::new(move || {
                let Some(rt) = MotionRuntime::upgrade(&weak) else {
                    return;
                };
                let still_exiting = rt
                    .inner
                    .tables
                    .borrow()
                    .slots
                    .get(&slot)
                    .is_some_and(|s| s.exiting_element() == Some(element));
                if !still_exiting {
                    log::debug!("{slot:?} went away before {element:?} started its exit");
                    if let Some(done) = on_done {
                        done();
                    }
                    return;
                }
                match handle {
                    Some(handle) => {
                        rt.inner.tables.borrow_mut().push_waiter(
                            element,
                            Waiter::PresenceExit { slot, on_done },
                        );
                        rt.inner.engine.set_active(handle, Variant::Exit, true);
                    }
                    // Nothing animates, so nothing will signal completion.
                    None => rt.finish_exit(slot, element, true, on_done),
                }
            }),
        );
        true
    }

    pub(crate) fn finish_exit(
        &self,
        slot: ElementId,
        element: ElementId,
        completed: bool,
        on_done: Option<Callback>,
    ) {
        if completed {
            self.inner.dom.set_style(element, "display", Some("none"));
        } else {
            log::debug!("exit of {element:?} interrupted; flushing {slot:?} without hiding");
        }

        let flush = {
            let mut tables = self.inner.tables.borrow_mut();
            tables.slots.get_mut(&slot).map(PresenceSlot::finish_exit)
        };
        if let Some(flush) = flush {
            for cleanup in flush.cleanups {
                self.release_cleanup(cleanup);
            }
            for queued in flush.mounts {
                self.admit(queued);
            }
        }
        if let Some(done) = on_done {
            done();
        }
    }

    fn release_cleanup(&self, cleanup: PendingCleanup) {
        log::trace!("releasing engine state of {:?}", cleanup.element);
        self.inner.engine.release(cleanup.handle);
    }

    /// Create the engine state for a non-presence element and run the
    /// initial animation unless deferred.
    fn start(&self, element: ElementId) {
        let Some((options, defer)) = ({
            let tables = self.inner.tables.borrow();
            tables
                .elements
                .get(&element)
                .and_then(|s| s.options().map(|o| (o, s.defer())))
        }) else {
            return;
        };

        let handle = self.inner.engine.mount(element, &options);
        {
            let mut tables = self.inner.tables.borrow_mut();
            let Some(state) = tables.elements.get_mut(&element) else {
                // Destroyed while the engine was mounting.
                drop(tables);
                self.inner.engine.release(handle);
                return;
            };
            state.handle = Some(handle);
            if !defer {
                state.applied = Some(options.clone());
            }
        }
        if !defer {
            self.inner.engine.update(handle, &options);
        }
    }

    /// Admit a presence member: restore its display, mount it and owe the
    /// slot its cleanup.
    fn admit(&self, element: ElementId) {
        let Some((options, defer, slot)) = ({
            let tables = self.inner.tables.borrow();
            tables
                .elements
                .get(&element)
                .map(|s| (s.options(), s.defer(), s.presence))
        }) else {
            log::debug!("queued mount of {element:?} dropped; element is gone");
            return;
        };

        self.inner.dom.set_style(element, "display", None);
        let Some(options) = options else {
            return;
        };

        let handle = self.inner.engine.mount(element, &options);
        {
            let mut tables = self.inner.tables.borrow_mut();
            if let Some(slot_id) = slot {
                if let Some(slot_state) = tables.slots.get_mut(&slot_id) {
                    slot_state.request_cleanup(PendingCleanup { element, handle });
                }
            }
            match tables.elements.get_mut(&element) {
                Some(state) => {
                    state.handle = Some(handle);
                    if !defer {
                        state.applied = Some(options.clone());
                    }
                }
                None => {
                    drop(tables);
                    self.inner.engine.release(handle);
                    return;
                }
            }
        }
        log::debug!("{element:?} admitted into {slot:?}");
        if !defer {
            self.inner.engine.update(handle, &options);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Node(RefCell<HashMap<String, String>>);

    impl Node {
        fn with(attrs: &[(&str, &str)]) -> Self {
            let node = Node::default();
            for (k, v) in attrs {
                node.0.borrow_mut().insert(k.to_string(), v.to_string());
            }
            node
        }
    }

    impl NodeAttributes for Node {
        fn attribute(&self, name: &str) -> Option<String> {
            self.0.borrow().get(name).cloned()
        }
        fn set_attribute(&self, name: &str, value: &str) {
            self.0.borrow_mut().insert(name.to_string(), value.to_string());
        }
        fn remove_attribute(&self, name: &str) {
            self.0.borrow_mut().remove(name);
        }
    }

    #[test]
    fn style_is_copied_for_animated_nodes() {
        let cfg = RuntimeConfig::default();
        let from = Node::with(&[("data-motion", "{}"), ("style", "opacity: 0.4")]);
        let to = Node::with(&[("style", "opacity: 1")]);
        preserve_animated_style(&from, &to, &cfg);
        assert_eq!(to.attribute("style").as_deref(), Some("opacity: 0.4"));
    }

    #[test]
    fn stale_style_is_removed_when_outgoing_has_none() {
        let cfg = RuntimeConfig::default();
        let from = Node::with(&[("data-motion", "{}")]);
        let to = Node::with(&[("style", "display: none")]);
        preserve_animated_style(&from, &to, &cfg);
        assert_eq!(to.attribute("style"), None);
    }

    #[test]
    fn plain_nodes_are_left_alone() {
        let cfg = RuntimeConfig::default();
        let from = Node::with(&[("style", "color: red")]);
        let to = Node::with(&[("style", "color: blue")]);
        preserve_animated_style(&from, &to, &cfg);
        assert_eq!(to.attribute("style").as_deref(), Some("color: blue"));
    }
}

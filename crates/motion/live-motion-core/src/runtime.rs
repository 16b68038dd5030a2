//! MotionRuntime: owns the association tables and the injected capabilities.
//!
//! Lifecycle entry points live in `lifecycle.rs`, command handlers in
//! `bridge.rs`. Calls out to the host, the DOM or the engine never happen
//! while the tables are borrowed, so capabilities may re-enter the runtime
//! (for example an engine that dispatches `motionstart` synchronously).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::capabilities::{Dom, Host, MotionEngine};
use crate::config::RuntimeConfig;
use crate::controls::PlaybackState;
use crate::events::MotionEvent;
use crate::ids::ElementId;
use crate::state::{RuntimeStats, Tables, Waiter};

pub(crate) struct Inner {
    pub cfg: RuntimeConfig,
    pub host: Rc<dyn Host>,
    pub dom: Rc<dyn Dom>,
    pub engine: Rc<dyn MotionEngine>,
    pub tables: RefCell<Tables>,
}

/// Cheaply clonable handle to one runtime instance.
#[derive(Clone)]
pub struct MotionRuntime {
    pub(crate) inner: Rc<Inner>,
}

impl std::fmt::Debug for MotionRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionRuntime")
            .field("cfg", &self.inner.cfg)
            .field("stats", &self.stats())
            .finish()
    }
}

impl MotionRuntime {
    pub fn new(
        cfg: RuntimeConfig,
        host: Rc<dyn Host>,
        dom: Rc<dyn Dom>,
        engine: Rc<dyn MotionEngine>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                cfg,
                host,
                dom,
                engine,
                tables: RefCell::new(Tables::default()),
            }),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.cfg
    }

    pub fn stats(&self) -> RuntimeStats {
        self.inner.tables.borrow().stats()
    }

    pub fn is_mounted(&self, element: ElementId) -> bool {
        self.inner.tables.borrow().elements.contains_key(&element)
    }

    /// Whether the runtime may still touch the element: mounted, waiting on
    /// a completion signal, or leaving a presence slot.
    pub fn is_tracked(&self, element: ElementId) -> bool {
        let tables = self.inner.tables.borrow();
        tables.elements.contains_key(&element)
            || tables.waiters.contains_key(&element)
            || tables
                .slots
                .values()
                .any(|s| s.exiting_element() == Some(element))
    }

    /// Aggregate state of the element's last one-off animation.
    pub fn controls_state(&self, element: ElementId) -> Option<PlaybackState> {
        let tables = self.inner.tables.borrow();
        tables
            .elements
            .get(&element)
            .and_then(|s| s.controls.as_ref())
            .map(|c| c.finished())
    }

    /// Run `f` against the controls of the element's last one-off animation.
    pub fn with_controls<R>(
        &self,
        element: ElementId,
        f: impl FnOnce(&mut crate::controls::AnimationControls) -> R,
    ) -> Option<R> {
        let mut controls = {
            let mut tables = self.inner.tables.borrow_mut();
            tables.elements.get_mut(&element)?.controls.take()?
        };
        let out = f(&mut controls);
        let mut tables = self.inner.tables.borrow_mut();
        if let Some(state) = tables.elements.get_mut(&element) {
            // A newer one-off started inside `f` wins.
            if state.controls.is_none() {
                state.controls = Some(controls);
            }
        }
        Some(out)
    }

    pub(crate) fn downgrade(&self) -> Weak<Inner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub(crate) fn debug_enabled(&self) -> bool {
        self.inner.host.is_debug()
    }

    pub(crate) fn warn_missing(&self, command: &str, element: ElementId) {
        if self.debug_enabled() {
            log::warn!(
                "[LiveMotion] `{command}` target {element:?} has no motion configuration. \
                 Did you forget to make it a motion component?"
            );
        }
    }

    /// Feed a synthetic lifecycle event raised on `element`.
    ///
    /// Bound host scripts run first, then whatever was waiting for the
    /// element's completion. An interruption voids pending hides.
    pub fn dispatch(&self, element: ElementId, event: MotionEvent) {
        let script = {
            let tables = self.inner.tables.borrow();
            tables
                .elements
                .get(&element)
                .and_then(|s| s.listeners.get(&event).cloned())
        };
        if let Some(script) = script {
            log::trace!("{} on {element:?}: running host script", event.name());
            self.inner.host.execute_script(element, &script);
        }

        let completed = match event {
            MotionEvent::Start => return,
            MotionEvent::Complete => true,
            MotionEvent::Interrupted => false,
        };

        let waiters = self.inner.tables.borrow_mut().take_waiters(element);
        for waiter in waiters {
            match waiter {
                Waiter::Hide => {
                    if completed {
                        self.inner.dom.set_style(element, "display", Some("none"));
                    } else {
                        log::debug!("hide of {element:?} superseded by interruption");
                    }
                }
                Waiter::PresenceExit { slot, on_done } => {
                    self.finish_exit(slot, element, completed, on_done);
                }
            }
        }
    }
}

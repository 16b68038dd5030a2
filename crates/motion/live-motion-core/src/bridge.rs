//! Command handlers for the host's `animate`/`hide`/`show`/`toggle` events.
//!
//! A command aimed at an element without a usable configuration is a
//! logged no-op (when the host runs in debug mode), never an error.

use crate::error::Result;
use crate::events::{AnimationPayload, Command, ShowPayload, TogglePayload};
use crate::ids::{ElementId, EngineHandle};
use crate::keyframes::{Keyframes, Variant};
use crate::resolve::MotionOptions;
use crate::runtime::MotionRuntime;
use crate::state::Waiter;
use crate::transition::{wait_duration_ms, Transition};

/// What the element currently offers to a command.
struct Target {
    handle: Option<EngineHandle>,
    options: Option<MotionOptions>,
    defer: bool,
}

impl MotionRuntime {
    /// Route a parsed command to its handler.
    pub fn handle(&self, element: ElementId, command: Command) -> Result<()> {
        match command {
            Command::Animate(p) => self.animate(element, p),
            Command::Hide(p) => self.hide(element, p),
            Command::Show(p) => self.show(element, p),
            Command::Toggle(p) => self.toggle(element, p),
        }
        Ok(())
    }

    /// Parse a custom event (`live_motion:hide`, ...) and handle it.
    pub fn handle_event(
        &self,
        element: ElementId,
        event: &str,
        detail: Option<serde_json::Value>,
    ) -> Result<()> {
        let command = Command::from_event(&self.inner.cfg.event_prefix, event, detail)?;
        self.handle(element, command)
    }

    fn target(&self, element: ElementId) -> Option<Target> {
        let tables = self.inner.tables.borrow();
        tables.elements.get(&element).map(|s| Target {
            handle: s.handle,
            options: s.options(),
            defer: s.defer(),
        })
    }

    /// Void pending hides and optionally register a new completion waiter.
    /// Runs before every engine command on the element.
    fn arm(&self, element: ElementId, waiter: Option<Waiter>) {
        let mut tables = self.inner.tables.borrow_mut();
        tables.drop_hides(element);
        if let Some(waiter) = waiter {
            tables.push_waiter(element, waiter);
        }
    }

    /// Run a one-off animation, stopping the previous one on this element.
    fn one_off(&self, element: ElementId, keyframes: &Keyframes, transition: Option<&Transition>) {
        let previous = {
            let mut tables = self.inner.tables.borrow_mut();
            tables
                .elements
                .get_mut(&element)
                .and_then(|s| s.controls.take())
        };
        if let Some(mut previous) = previous {
            previous.stop();
        }

        let controls = self.inner.engine.animate(element, keyframes, transition);
        let mut tables = self.inner.tables.borrow_mut();
        if let Some(state) = tables.elements.get_mut(&element) {
            state.controls = Some(controls);
        }
    }

    /// Force the configured animation, ignoring `defer`.
    pub fn animate(&self, element: ElementId, payload: AnimationPayload) {
        let Some(target) = self.target(element) else {
            self.warn_missing("animate", element);
            return;
        };

        if let Some(keyframes) = payload.keyframes() {
            self.arm(element, None);
            self.one_off(element, keyframes, payload.transition.as_ref());
            return;
        }

        let (Some(handle), Some(options)) = (target.handle, target.options) else {
            self.warn_missing("animate", element);
            return;
        };
        self.arm(element, None);
        {
            let mut tables = self.inner.tables.borrow_mut();
            if let Some(state) = tables.elements.get_mut(&element) {
                state.applied = Some(options.clone());
            }
        }
        self.inner.engine.update(handle, &options);
    }

    /// Exit-animate the element, then hide it once the engine reports
    /// completion. The host keeps pending removals waiting meanwhile.
    pub fn hide(&self, element: ElementId, payload: AnimationPayload) {
        let Some(target) = self.target(element) else {
            self.warn_missing("hide", element);
            return;
        };

        let AnimationPayload {
            keyframes,
            transition,
        } = payload;
        let one_off = keyframes.filter(|k| !k.is_empty());

        let transition = match (&one_off, target.handle, target.options) {
            (Some(_), _, _) => transition,
            (None, Some(_), Some(options)) => options.transition,
            _ => {
                self.warn_missing("hide", element);
                return;
            }
        };

        let duration = wait_duration_ms(transition.as_ref(), &self.inner.cfg);
        let weak = self.downgrade();
        self.inner.host.defer_removal(
            duration,
            Box::new(move || {
                let Some(rt) = MotionRuntime::upgrade(&weak) else {
                    return;
                };
                rt.run_hide(element, one_off, transition);
            }),
        );
    }

    fn run_hide(
        &self,
        element: ElementId,
        keyframes: Option<Keyframes>,
        transition: Option<Transition>,
    ) {
        // The host may destroy the element before its removal wait ends.
        let Some(target) = self.target(element) else {
            log::debug!("{element:?} destroyed before its deferred hide ran");
            return;
        };
        match keyframes {
            Some(keyframes) => {
                self.arm(element, Some(Waiter::Hide));
                self.one_off(element, &keyframes, transition.as_ref());
            }
            None => {
                let Some(handle) = target.handle else {
                    return;
                };
                self.arm(element, Some(Waiter::Hide));
                self.inner.engine.set_active(handle, Variant::Exit, true);
            }
        }
    }

    /// Restore the element's display and animate it back in.
    pub fn show(&self, element: ElementId, payload: ShowPayload) {
        let Some(target) = self.target(element) else {
            self.warn_missing("show", element);
            return;
        };
        let display = payload
            .display
            .clone()
            .unwrap_or_else(|| self.inner.cfg.default_display.clone());

        if let Some(keyframes) = payload.keyframes() {
            self.inner.dom.set_style(element, "display", Some(&display));
            self.arm(element, None);
            self.one_off(element, keyframes, payload.transition.as_ref());
            return;
        }

        let (Some(handle), Some(_)) = (target.handle, target.options) else {
            self.warn_missing("show", element);
            return;
        };
        self.inner.dom.set_style(element, "display", Some(&display));
        self.arm(element, None);
        self.inner.engine.set_active(handle, Variant::Exit, false);
        self.inner.engine.set_active(handle, Variant::Animate, true);
    }

    /// Alternate between exit and enter. The direction flag lives in the
    /// toggle attribute; without it the first toggle exits unless the
    /// element is deferred.
    pub fn toggle(&self, element: ElementId, payload: TogglePayload) {
        let Some(target) = self.target(element) else {
            self.warn_missing("toggle", element);
            return;
        };

        let exiting = match self
            .inner
            .dom
            .attribute(element, &self.inner.cfg.toggle_attribute)
        {
            Some(flag) => flag == "true",
            None => !target.defer,
        };

        if let Some((keyframes, transition)) = payload.resolve(exiting) {
            self.arm(element, None);
            self.one_off(element, keyframes, transition);
        } else {
            let (Some(handle), Some(_)) = (target.handle, target.options) else {
                self.warn_missing("toggle", element);
                return;
            };
            self.arm(element, None);
            self.inner.engine.set_active(handle, Variant::Exit, exiting);
        }

        self.inner.dom.set_attribute(
            element,
            &self.inner.cfg.toggle_attribute,
            if exiting { "false" } else { "true" },
        );
    }
}

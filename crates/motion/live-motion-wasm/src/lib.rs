//! wasm-bindgen bindings for live-motion.
//!
//! Wire it from the page glue:
//!
//! ```javascript
//! import * as motion from "motion";
//! import { LiveMotion } from "live_motion_wasm";
//!
//! const live = new LiveMotion(liveSocket, motion, undefined);
//! live.listen();
//! const Hooks = {
//!   Motion: {
//!     mounted() { live.mounted(this.el); },
//!     updated() { live.updated(this.el); },
//!     destroyed() { live.destroyed(this.el); },
//!   },
//!   Presence: {
//!     mounted() { live.presenceMounted(this.el); },
//!     destroyed() { live.presenceDestroyed(this.el); },
//!   },
//! };
//! // dom: { onBeforeElUpdated: (from, to) => live.handleMotionUpdates(from, to) }
//! ```

mod dom;
mod elements;
mod engine;
mod host;

use std::cell::RefCell;
use std::rc::Rc;

use live_motion_core::{
    preserve_animated_style, ElementId, Host, MotionError, MotionEvent, MotionRuntime,
    RuntimeConfig,
};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, Element, Event};

use dom::{PatchNode, WebDom};
use elements::{ElementTable, Listener};
use engine::JsEngine;
use host::JsHost;

const COMMANDS: [&str; 4] = ["animate", "hide", "show", "toggle"];

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn js_err(err: MotionError) -> JsError {
    JsError::new(&format!("live_motion: {err}"))
}

/// State shared with the DOM listeners.
struct Shared {
    rt: MotionRuntime,
    elements: Rc<ElementTable>,
    /// Destroyed elements the runtime may still touch (exits, pending waiters).
    retired: RefCell<Vec<ElementId>>,
}

impl Shared {
    fn retire(&self, id: ElementId) {
        self.retired.borrow_mut().push(id);
        self.sweep();
    }

    /// Forget retired elements the runtime no longer tracks. Runs on every
    /// entry point, so a node is released at the latest on the next call.
    fn sweep(&self) {
        let done = {
            let mut retired = self.retired.borrow_mut();
            let (done, keep): (Vec<ElementId>, Vec<ElementId>) =
                retired.drain(..).partition(|id| !self.rt.is_tracked(*id));
            *retired = keep;
            done
        };
        for id in done {
            self.elements.forget(id);
        }
    }

    fn forwarders(self: &Rc<Self>, id: ElementId) -> Vec<(&'static str, Listener)> {
        MotionEvent::ALL
            .iter()
            .map(|&event| {
                let shared = Rc::clone(self);
                let listener = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                    shared.rt.dispatch(id, event);
                    shared.sweep();
                });
                (event.name(), listener)
            })
            .collect()
    }

    fn on_command(&self, command: &str, event: Event) {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let detail = event
            .dyn_ref::<CustomEvent>()
            .map(CustomEvent::detail)
            .filter(|d| !jsvalue_is_undefined_or_null(d));
        let detail = match detail.map(swb::from_value::<serde_json::Value>) {
            None => None,
            Some(Ok(value)) => Some(value),
            Some(Err(err)) => {
                log::error!("live_motion: {command} detail is not JSON-like: {err}");
                return;
            }
        };

        let known = self.elements.lookup(&target);
        let id = known.unwrap_or_else(|| self.elements.intern(&target));
        let name = format!("{}:{command}", self.rt.config().event_prefix);
        if let Err(err) = self.rt.handle_event(id, &name, detail) {
            log::error!("live_motion: {err}");
        }
        if known.is_none() {
            self.retire(id);
        }
    }
}

#[wasm_bindgen]
pub struct LiveMotion {
    shared: Rc<Shared>,
    commands: Vec<(String, Closure<dyn FnMut(Event)>)>,
}

#[wasm_bindgen]
impl LiveMotion {
    /// `socket` is the LiveView socket, `motion` the Motion module object.
    /// `config` is an optional object matching `RuntimeConfig`
    /// (undefined/null for defaults).
    #[wasm_bindgen(constructor)]
    pub fn new(socket: JsValue, motion: JsValue, config: JsValue) -> Result<LiveMotion, JsError> {
        console_error_panic_hook::set_once();

        let cfg: RuntimeConfig = if jsvalue_is_undefined_or_null(&config) {
            RuntimeConfig::default()
        } else {
            swb::from_value(config)
                .map_err(|e| JsError::new(&format!("live_motion: config error: {e}")))?
        };

        let elements = Rc::new(ElementTable::new());
        let host = Rc::new(JsHost::new(socket, elements.clone()));
        if host.is_debug() {
            // Debug sockets surface missing-config warnings without `initLogging`.
            if console_log::init_with_level(log::Level::Warn).is_err() {
                log::debug!("logger already installed; keeping it");
            }
        }
        let dom = Rc::new(WebDom::new(elements.clone(), &cfg.presence_attribute));
        let engine = Rc::new(JsEngine::new(motion, elements.clone()));
        let rt = MotionRuntime::new(cfg, host, dom, engine);

        Ok(LiveMotion {
            shared: Rc::new(Shared {
                rt,
                elements,
                retired: RefCell::new(Vec::new()),
            }),
            commands: Vec::new(),
        })
    }

    /// Subscribe to the `<prefix>:animate|hide|show|toggle` window events.
    /// Calling it again is a no-op.
    pub fn listen(&mut self) -> Result<(), JsError> {
        if !self.commands.is_empty() {
            return Ok(());
        }
        let window = web_sys::window().ok_or_else(|| JsError::new("live_motion: no window"))?;
        let prefix = self.shared.rt.config().event_prefix.clone();
        for command in COMMANDS {
            let shared = Rc::clone(&self.shared);
            let listener = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                shared.on_command(command, event);
            });
            let name = format!("{prefix}:{command}");
            window
                .add_event_listener_with_callback(&name, listener.as_ref().unchecked_ref())
                .map_err(|e| JsError::new(&format!("live_motion: listen {name}: {e:?}")))?;
            self.commands.push((name, listener));
        }
        Ok(())
    }

    /// Remove the window listeners installed by [`LiveMotion::listen`].
    pub fn unlisten(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        for (name, listener) in self.commands.drain(..) {
            let _ = window.remove_event_listener_with_callback(&name, listener.as_ref().unchecked_ref());
        }
    }

    /// `Motion` hook `mounted`.
    pub fn mounted(&self, el: Element) -> Result<(), JsError> {
        let shared = &self.shared;
        shared.sweep();
        let id = shared.elements.intern(&el);
        if !shared.elements.is_bound(id) {
            shared
                .elements
                .bind(id, shared.forwarders(id))
                .map_err(|e| JsError::new(&format!("live_motion: listener error: {e:?}")))?;
        }
        if let Err(err) = shared.rt.on_mount(id) {
            shared.retire(id);
            return Err(js_err(err));
        }
        Ok(())
    }

    /// `Motion` hook `updated`.
    pub fn updated(&self, el: Element) -> Result<(), JsError> {
        self.shared.sweep();
        let id = self
            .shared
            .elements
            .lookup(&el)
            .ok_or_else(|| JsError::new("live_motion: updated before mounted"))?;
        self.shared.rt.on_update(id).map_err(js_err)
    }

    /// `Motion` hook `destroyed`.
    pub fn destroyed(&self, el: Element) {
        let Some(id) = self.shared.elements.lookup(&el) else {
            return;
        };
        self.shared.rt.on_destroy(id);
        self.shared.retire(id);
    }

    /// `Presence` hook `mounted`.
    #[wasm_bindgen(js_name = presenceMounted)]
    pub fn presence_mounted(&self, el: Element) {
        let id = self.shared.elements.intern(&el);
        self.shared.rt.mount_presence(id);
    }

    /// `Presence` hook `destroyed`.
    #[wasm_bindgen(js_name = presenceDestroyed)]
    pub fn presence_destroyed(&self, el: Element) {
        let Some(id) = self.shared.elements.lookup(&el) else {
            return;
        };
        self.shared.rt.destroy_presence(id);
        self.shared.retire(id);
    }

    /// `dom.onBeforeElUpdated` callback: keeps animated inline styles across patches.
    #[wasm_bindgen(js_name = handleMotionUpdates)]
    pub fn handle_motion_updates(&self, from: Element, to: Element) {
        preserve_animated_style(&PatchNode(&from), &PatchNode(&to), self.shared.rt.config());
    }

    /// Association table sizes plus the number of nodes the adapter holds.
    pub fn stats(&self) -> Result<JsValue, JsError> {
        let stats = self.shared.rt.stats();
        let value = swb::to_value(&stats)
            .map_err(|e| JsError::new(&format!("live_motion: stats error: {e}")))?;
        js_sys::Reflect::set(
            &value,
            &JsValue::from_str("nodes"),
            &JsValue::from(self.shared.elements.len() as u32),
        )
        .map_err(|e| JsError::new(&format!("live_motion: stats error: {e:?}")))?;
        Ok(value)
    }
}

impl Drop for LiveMotion {
    fn drop(&mut self) {
        self.unlisten();
    }
}

/// Route `log` output to the browser console. `level` is a `log` level name
/// (`"warn"`, `"debug"`, ...); defaults to `"info"`.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: Option<String>) -> Result<(), JsError> {
    let level = match level.as_deref() {
        None => log::Level::Info,
        Some(name) => name
            .parse()
            .map_err(|_| JsError::new(&format!("live_motion: unknown log level `{name}`")))?,
    };
    console_log::init_with_level(level)
        .map_err(|e| JsError::new(&format!("live_motion: logger already set: {e}")))
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}

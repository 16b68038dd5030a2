//! [`Host`] over the LiveView socket object (`execJS`, `transition`,
//! `isDebugEnabled`).

use std::rc::Rc;

use js_sys::{Function, Reflect};
use live_motion_core::{Callback, ElementId, Host};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::elements::ElementTable;

/// Look up `name` on `target` and return it when it is callable.
pub(crate) fn method(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

pub(crate) struct JsHost {
    socket: JsValue,
    elements: Rc<ElementTable>,
}

impl JsHost {
    pub fn new(socket: JsValue, elements: Rc<ElementTable>) -> Self {
        Self { socket, elements }
    }
}

impl Host for JsHost {
    fn execute_script(&self, element: ElementId, script: &str) {
        let Some(node) = self.elements.node(element) else {
            log::debug!("script for forgotten element {element:?} dropped");
            return;
        };
        let Some(exec) = method(&self.socket, "execJS") else {
            log::error!("live_motion: liveSocket.execJS is not a function");
            return;
        };
        if let Err(err) = exec.call2(&self.socket, &node, &JsValue::from_str(script)) {
            log::error!("live_motion: execJS failed: {err:?}");
        }
    }

    fn defer_removal(&self, duration_ms: u64, callback: Callback) {
        let callback = Closure::once_into_js(move || callback());
        match method(&self.socket, "transition") {
            Some(transition) => {
                if let Err(err) =
                    transition.call2(&self.socket, &JsValue::from_f64(duration_ms as f64), &callback)
                {
                    log::error!("live_motion: liveSocket.transition failed: {err:?}");
                }
            }
            None => {
                // No removal hold available; run right away.
                log::warn!("live_motion: liveSocket.transition is not a function");
                let _ = callback.unchecked_ref::<Function>().call0(&JsValue::UNDEFINED);
            }
        }
    }

    fn is_debug(&self) -> bool {
        method(&self.socket, "isDebugEnabled")
            .and_then(|f| f.call0(&self.socket).ok())
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

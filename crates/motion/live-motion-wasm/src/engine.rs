//! [`MotionEngine`] over a JS Motion module object exposing
//! `createMotionState`, `animate`, `spring` and `glide`.
//!
//! Motion states raise `motionstart`/`motioncomplete`/`motioncancel` on their
//! element by themselves. One-off `animate` calls do not, so their `finished`
//! promise is turned into the same DOM events here. Both paths then reach the
//! runtime through the element's forwarders.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use hashbrown::HashMap;
use js_sys::{Array, Function, Reflect};
use live_motion_core::{
    Animation, AnimationControls, Easing, ElementId, EngineHandle, IdAllocator, Keyframes,
    MotionEngine, MotionEvent, MotionOptions, PlaybackState, Transition, Variant,
};
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, Element};

use crate::elements::ElementTable;
use crate::host::method;

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, swb::Error> {
    value.serialize(&swb::Serializer::json_compatible())
}

fn call(target: &JsValue, name: &str, args: &[&JsValue]) -> Result<JsValue, JsValue> {
    let f = method(target, name)
        .ok_or_else(|| JsValue::from_str(&format!("{name} is not a function")))?;
    let argv = Array::new();
    for arg in args {
        argv.push(arg);
    }
    f.apply(target, &argv)
}

fn emit(node: &Element, event: MotionEvent) {
    match CustomEvent::new(event.name()) {
        Ok(ev) => {
            let _ = node.dispatch_event(&ev);
        }
        Err(err) => log::error!("live_motion: cannot create {}: {err:?}", event.name()),
    }
}

struct MotionState {
    state: JsValue,
    unmount: Option<Function>,
}

pub(crate) struct JsEngine {
    motion: JsValue,
    elements: Rc<ElementTable>,
    states: RefCell<HashMap<EngineHandle, MotionState>>,
    ids: RefCell<IdAllocator>,
}

impl JsEngine {
    pub fn new(motion: JsValue, elements: Rc<ElementTable>) -> Self {
        Self {
            motion,
            elements,
            states: RefCell::new(HashMap::new()),
            ids: RefCell::new(IdAllocator::new()),
        }
    }

    /// Physics easings become generator functions built by the engine.
    fn js_easing(&self, easing: &Easing) -> Result<Option<JsValue>, JsValue> {
        let (ctor, params) = match easing {
            Easing::Spring(opts) => ("spring", to_js(opts)?),
            Easing::Glide(opts) => ("glide", to_js(opts)?),
            _ => return Ok(None),
        };
        call(&self.motion, ctor, &[&params]).map(Some)
    }

    fn js_transition(&self, transition: &Transition) -> Result<JsValue, JsValue> {
        let value = to_js(transition)?;
        if let Some(easing) = transition.easing.as_ref() {
            if let Some(generator) = self.js_easing(easing)? {
                Reflect::set(&value, &JsValue::from_str("easing"), &generator)?;
            }
        }
        Ok(value)
    }

    fn js_options(&self, options: &MotionOptions) -> Result<JsValue, JsValue> {
        let value = to_js(options)?;
        if let Some(transition) = options.transition.as_ref() {
            Reflect::set(
                &value,
                &JsValue::from_str("transition"),
                &self.js_transition(transition)?,
            )?;
        }
        Ok(value)
    }

    fn with_state(&self, handle: EngineHandle, f: impl FnOnce(&JsValue) -> Result<JsValue, JsValue>) {
        let state = self.states.borrow().get(&handle).map(|s| s.state.clone());
        let Some(state) = state else {
            log::debug!("engine state {handle:?} already released");
            return;
        };
        if let Err(err) = f(&state) {
            log::error!("live_motion: motion state call failed: {err:?}");
        }
    }

    fn try_mount(&self, node: &Element, options: &MotionOptions) -> Result<MotionState, JsValue> {
        let opts = self.js_options(options)?;
        let target: &JsValue = node;
        let state = call(&self.motion, "createMotionState", &[&opts])?;
        let unmount = call(&state, "mount", &[target])?;
        Ok(MotionState {
            state,
            unmount: unmount.dyn_into::<Function>().ok(),
        })
    }

    fn try_animate(
        &self,
        node: &Element,
        keyframes: &Keyframes,
        transition: Option<&Transition>,
    ) -> Result<JsAnimation, JsValue> {
        let frames = to_js(keyframes)?;
        let opts = match transition {
            Some(t) => self.js_transition(t)?,
            None => JsValue::UNDEFINED,
        };
        let target: &JsValue = node;
        let controls = call(&self.motion, "animate", &[target, &frames, &opts])?;
        let silenced = Rc::new(Cell::new(false));

        let finished = Reflect::get(&controls, &JsValue::from_str("finished"))?;
        if !finished.is_undefined() {
            let (done_node, done_flag) = (node.clone(), silenced.clone());
            let (fail_node, fail_flag) = (node.clone(), silenced.clone());
            let on_done = Closure::once_into_js(move |_: JsValue| {
                if !done_flag.get() {
                    emit(&done_node, MotionEvent::Complete);
                }
            });
            let on_fail = Closure::once_into_js(move |_: JsValue| {
                if !fail_flag.get() {
                    emit(&fail_node, MotionEvent::Interrupted);
                }
            });
            call(&finished, "then", &[&on_done, &on_fail])?;
        }
        Ok(JsAnimation { controls, silenced })
    }
}

impl MotionEngine for JsEngine {
    fn mount(&self, element: ElementId, options: &MotionOptions) -> EngineHandle {
        let handle = self.ids.borrow_mut().alloc_handle();
        let Some(node) = self.elements.node(element) else {
            log::error!("live_motion: mount of unregistered element {element:?}");
            return handle;
        };
        match self.try_mount(&node, options) {
            Ok(state) => {
                self.states.borrow_mut().insert(handle, state);
            }
            Err(err) => log::error!("live_motion: createMotionState failed: {err:?}"),
        }
        handle
    }

    fn update(&self, handle: EngineHandle, options: &MotionOptions) {
        let opts = match self.js_options(options) {
            Ok(opts) => opts,
            Err(err) => {
                log::error!("live_motion: cannot convert motion options: {err:?}");
                return;
            }
        };
        self.with_state(handle, |state| call(state, "update", &[&opts]));
    }

    fn set_active(&self, handle: EngineHandle, variant: Variant, active: bool) {
        let name = JsValue::from_str(variant.as_str());
        let active = JsValue::from_bool(active);
        self.with_state(handle, |state| call(state, "setActive", &[&name, &active]));
    }

    fn animate(
        &self,
        element: ElementId,
        keyframes: &Keyframes,
        transition: Option<&Transition>,
    ) -> AnimationControls {
        let Some(node) = self.elements.node(element) else {
            return AnimationControls::default();
        };
        match self.try_animate(&node, keyframes, transition) {
            Ok(animation) => AnimationControls::new(vec![Box::new(animation)]),
            Err(err) => {
                log::error!("live_motion: animate failed: {err:?}");
                AnimationControls::default()
            }
        }
    }

    fn release(&self, handle: EngineHandle) {
        let Some(state) = self.states.borrow_mut().remove(&handle) else {
            return;
        };
        if let Some(unmount) = state.unmount {
            if let Err(err) = unmount.call0(&JsValue::UNDEFINED) {
                log::error!("live_motion: motion state cleanup failed: {err:?}");
            }
        }
    }
}

/// Controls object returned by the JS `animate`.
struct JsAnimation {
    controls: JsValue,
    /// Set once the runtime stopped this animation; its promise no longer reports.
    silenced: Rc<Cell<bool>>,
}

impl JsAnimation {
    fn number(&self, name: &str, fallback: f64) -> f64 {
        Reflect::get(&self.controls, &JsValue::from_str(name))
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(fallback)
    }

    fn set_number(&self, name: &str, value: f64) {
        let _ = Reflect::set(
            &self.controls,
            &JsValue::from_str(name),
            &JsValue::from_f64(value),
        );
    }
}

impl Animation for JsAnimation {
    fn stop(&mut self) {
        self.silenced.set(true);
        if let Err(err) = call(&self.controls, "stop", &[]) {
            log::debug!("stop on animation controls failed: {err:?}");
        }
    }

    fn current_time(&self) -> f64 {
        self.number("currentTime", 0.0)
    }

    fn set_current_time(&mut self, time: f64) {
        self.set_number("currentTime", time);
    }

    fn playback_rate(&self) -> f64 {
        self.number("playbackRate", 1.0)
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.set_number("playbackRate", rate);
    }

    fn playback_state(&self) -> PlaybackState {
        let state = Reflect::get(&self.controls, &JsValue::from_str("playState"))
            .ok()
            .and_then(|v| v.as_string());
        match state.as_deref() {
            Some("finished") => PlaybackState::Finished,
            _ if self.silenced.get() => PlaybackState::Interrupted,
            _ => PlaybackState::Running,
        }
    }
}

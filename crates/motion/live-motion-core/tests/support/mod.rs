//! In-memory fakes of the capability traits, shared by the integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Once;

use live_motion_core::{
    Animation, AnimationControls, Callback, Dom, ElementId, EngineHandle, Host, IdAllocator,
    Keyframes, MotionEngine, MotionOptions, MotionRuntime, PlaybackState, RuntimeConfig,
    Transition, Variant,
};

// ---------- log capture ----------

thread_local! {
    static CAPTURED: RefCell<Vec<(log::Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        CAPTURED.with(|c| {
            c.borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

/// Install the capturing logger (once per process) and clear this thread's buffer.
pub fn capture_logs() {
    INIT.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Trace);
    });
    CAPTURED.with(|c| c.borrow_mut().clear());
}

pub fn warnings() -> Vec<String> {
    CAPTURED.with(|c| {
        c.borrow()
            .iter()
            .filter(|(level, _)| *level == log::Level::Warn)
            .map(|(_, msg)| msg.clone())
            .collect()
    })
}

// ---------- host ----------

#[derive(Default)]
pub struct FakeHost {
    pub debug: Cell<bool>,
    pub scripts: RefCell<Vec<(ElementId, String)>>,
    deferred: RefCell<Vec<(u64, Callback)>>,
    pub deferred_durations: RefCell<Vec<u64>>,
}

impl FakeHost {
    /// Run every pending deferred-removal callback, as if their waits elapsed.
    pub fn run_deferred(&self) -> usize {
        let pending = std::mem::take(&mut *self.deferred.borrow_mut());
        let n = pending.len();
        for (_, cb) in pending {
            cb();
        }
        n
    }

    pub fn pending_deferred(&self) -> usize {
        self.deferred.borrow().len()
    }
}

impl Host for FakeHost {
    fn execute_script(&self, element: ElementId, script: &str) {
        self.scripts
            .borrow_mut()
            .push((element, script.to_string()));
    }

    fn defer_removal(&self, duration_ms: u64, callback: Callback) {
        self.deferred_durations.borrow_mut().push(duration_ms);
        self.deferred.borrow_mut().push((duration_ms, callback));
    }

    fn is_debug(&self) -> bool {
        self.debug.get()
    }
}

// ---------- dom ----------

#[derive(Default)]
pub struct FakeDom {
    attrs: RefCell<HashMap<ElementId, HashMap<String, String>>>,
    styles: RefCell<HashMap<(ElementId, String), String>>,
    presence: RefCell<HashMap<ElementId, ElementId>>,
    /// Every display write in order: (element, value).
    pub display_log: RefCell<Vec<(ElementId, Option<String>)>>,
}

impl FakeDom {
    pub fn put(&self, element: ElementId, name: &str, value: &str) {
        self.attrs
            .borrow_mut()
            .entry(element)
            .or_default()
            .insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, element: ElementId, name: &str) -> Option<String> {
        self.attrs
            .borrow()
            .get(&element)
            .and_then(|a| a.get(name).cloned())
    }

    pub fn display(&self, element: ElementId) -> Option<String> {
        self.styles
            .borrow()
            .get(&(element, "display".to_string()))
            .cloned()
    }

    pub fn nest(&self, child: ElementId, slot: ElementId) {
        self.presence.borrow_mut().insert(child, slot);
    }
}

impl Dom for FakeDom {
    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.get(element, name)
    }

    fn set_attribute(&self, element: ElementId, name: &str, value: &str) {
        self.put(element, name, value);
    }

    fn remove_attribute(&self, element: ElementId, name: &str) {
        if let Some(attrs) = self.attrs.borrow_mut().get_mut(&element) {
            attrs.remove(name);
        }
    }

    fn set_style(&self, element: ElementId, property: &str, value: Option<&str>) {
        if property == "display" {
            self.display_log
                .borrow_mut()
                .push((element, value.map(str::to_string)));
        }
        let key = (element, property.to_string());
        match value {
            Some(v) => {
                self.styles.borrow_mut().insert(key, v.to_string());
            }
            None => {
                self.styles.borrow_mut().remove(&key);
            }
        }
    }

    fn presence_parent(&self, element: ElementId) -> Option<ElementId> {
        self.presence.borrow().get(&element).copied()
    }
}

// ---------- engine ----------

#[derive(Clone, Debug, PartialEq)]
pub enum EngineCall {
    Mount(ElementId, EngineHandle),
    Update(EngineHandle, MotionOptions),
    SetActive(EngineHandle, Variant, bool),
    Animate(ElementId, Keyframes, Option<Transition>),
    Release(EngineHandle),
}

pub struct FakeAnimation {
    state: Rc<Cell<PlaybackState>>,
    time: f64,
    rate: f64,
}

impl Animation for FakeAnimation {
    fn stop(&mut self) {
        if self.state.get() == PlaybackState::Running {
            self.state.set(PlaybackState::Interrupted);
        }
    }
    fn current_time(&self) -> f64 {
        self.time
    }
    fn set_current_time(&mut self, time: f64) {
        self.time = time;
    }
    fn playback_rate(&self) -> f64 {
        self.rate
    }
    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
    }
    fn playback_state(&self) -> PlaybackState {
        self.state.get()
    }
}

#[derive(Default)]
pub struct FakeEngine {
    ids: RefCell<IdAllocator>,
    pub calls: RefCell<Vec<EngineCall>>,
    pub live: RefCell<HashSet<EngineHandle>>,
    /// Playback state cells of every one-off animation, in start order.
    pub one_offs: RefCell<Vec<Rc<Cell<PlaybackState>>>>,
}

impl FakeEngine {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn handle_of(&self, element: ElementId) -> Option<EngineHandle> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            EngineCall::Mount(e, h) if *e == element => Some(*h),
            _ => None,
        })
    }

    pub fn animated(&self) -> bool {
        self.calls.borrow().iter().any(|c| {
            matches!(
                c,
                EngineCall::Update(..) | EngineCall::SetActive(..) | EngineCall::Animate(..)
            )
        })
    }
}

impl MotionEngine for FakeEngine {
    fn mount(&self, element: ElementId, _options: &MotionOptions) -> EngineHandle {
        let handle = self.ids.borrow_mut().alloc_handle();
        self.live.borrow_mut().insert(handle);
        self.calls
            .borrow_mut()
            .push(EngineCall::Mount(element, handle));
        handle
    }

    fn update(&self, handle: EngineHandle, options: &MotionOptions) {
        self.calls
            .borrow_mut()
            .push(EngineCall::Update(handle, options.clone()));
    }

    fn set_active(&self, handle: EngineHandle, variant: Variant, active: bool) {
        self.calls
            .borrow_mut()
            .push(EngineCall::SetActive(handle, variant, active));
    }

    fn animate(
        &self,
        element: ElementId,
        keyframes: &Keyframes,
        transition: Option<&Transition>,
    ) -> AnimationControls {
        self.calls.borrow_mut().push(EngineCall::Animate(
            element,
            keyframes.clone(),
            transition.cloned(),
        ));
        let state = Rc::new(Cell::new(PlaybackState::Running));
        self.one_offs.borrow_mut().push(state.clone());
        AnimationControls::new(vec![Box::new(FakeAnimation {
            state,
            time: 0.0,
            rate: 1.0,
        })])
    }

    fn release(&self, handle: EngineHandle) {
        self.live.borrow_mut().remove(&handle);
        self.calls.borrow_mut().push(EngineCall::Release(handle));
    }
}

// ---------- harness ----------

pub struct Harness {
    pub rt: MotionRuntime,
    pub host: Rc<FakeHost>,
    pub dom: Rc<FakeDom>,
    pub engine: Rc<FakeEngine>,
    ids: RefCell<IdAllocator>,
}

impl Harness {
    pub fn new() -> Self {
        let host = Rc::new(FakeHost::default());
        let dom = Rc::new(FakeDom::default());
        let engine = Rc::new(FakeEngine::default());
        let rt = MotionRuntime::new(
            RuntimeConfig::default(),
            host.clone(),
            dom.clone(),
            engine.clone(),
        );
        Self {
            rt,
            host,
            dom,
            engine,
            ids: RefCell::new(IdAllocator::new()),
        }
    }

    /// A fresh element without any attributes.
    pub fn element(&self) -> ElementId {
        self.ids.borrow_mut().alloc_element()
    }

    /// A fresh element carrying the named config fixture.
    pub fn element_with(&self, fixture: &str) -> ElementId {
        let el = self.element();
        self.set_config(el, fixture);
        el
    }

    pub fn set_config(&self, element: ElementId, fixture: &str) {
        let raw = live_motion_test_fixtures::configs::attribute(fixture)
            .expect("config fixture exists");
        self.dom.put(element, "data-motion", &raw);
    }

    pub fn mounted_with(&self, fixture: &str) -> ElementId {
        let el = self.element_with(fixture);
        self.rt.on_mount(el).expect("mount succeeds");
        el
    }

    pub fn command(&self, element: ElementId, fixture: &str) {
        let event = live_motion_test_fixtures::commands::event(fixture).expect("command fixture");
        let detail = live_motion_test_fixtures::commands::detail(fixture).expect("command detail");
        self.rt
            .handle_event(element, &event, detail)
            .expect("command handled");
    }
}

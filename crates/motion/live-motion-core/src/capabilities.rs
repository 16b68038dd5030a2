//! Capability traits implemented by adapters (wasm/DOM, test fakes).
//!
//! The core never touches a global host object. Everything it needs from the
//! surrounding framework, the document and the animation engine is injected
//! through these traits when a [`MotionRuntime`](crate::MotionRuntime) is built.
//! All methods take `&self`; implementors keep their own interior state.

use crate::controls::AnimationControls;
use crate::ids::{ElementId, EngineHandle};
use crate::keyframes::{Keyframes, Variant};
use crate::resolve::MotionOptions;
use crate::transition::Transition;

/// Deferred work handed to the host.
pub type Callback = Box<dyn FnOnce()>;

/// Services provided by the server-rendered UI framework.
pub trait Host {
    /// Run a host-declared script (e.g. an encoded JS command list) on `element`.
    fn execute_script(&self, element: ElementId, script: &str);

    /// Keep pending DOM removals waiting for up to `duration_ms`, then invoke
    /// `callback`. Hosts may call back early; the runtime tolerates either order.
    fn defer_removal(&self, duration_ms: u64, callback: Callback);

    /// Whether diagnostic warnings should be emitted.
    fn is_debug(&self) -> bool;
}

/// Attribute and style access on tracked elements.
pub trait Dom {
    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;
    fn set_attribute(&self, element: ElementId, name: &str, value: &str);
    fn remove_attribute(&self, element: ElementId, name: &str);

    /// Set an inline style property, or clear it with `None`.
    fn set_style(&self, element: ElementId, property: &str, value: Option<&str>);

    /// Nearest ancestor acting as a presence slot marker, if any.
    fn presence_parent(&self, element: ElementId) -> Option<ElementId>;
}

/// Attribute access on raw nodes that are not tracked by the runtime,
/// such as the incoming node of a DOM patch.
pub trait NodeAttributes {
    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str);
    fn remove_attribute(&self, name: &str);
}

/// The external animation engine.
///
/// Implementations report animation lifecycle back through
/// [`MotionRuntime::dispatch`](crate::MotionRuntime::dispatch): a start, then
/// either a completion or an interruption, for every animation they run.
pub trait MotionEngine {
    /// Create an engine state for `element`, apply its initial styles and
    /// mount it. Must not animate toward the targets yet.
    fn mount(&self, element: ElementId, options: &MotionOptions) -> EngineHandle;

    /// Replace the state's options and animate toward the active targets.
    fn update(&self, handle: EngineHandle, options: &MotionOptions);

    /// Activate or deactivate a variant, animating to the resulting targets.
    fn set_active(&self, handle: EngineHandle, variant: Variant, active: bool);

    /// Run a one-off animation outside any mounted state.
    fn animate(
        &self,
        element: ElementId,
        keyframes: &Keyframes,
        transition: Option<&Transition>,
    ) -> AnimationControls;

    /// Unmount the state and drop everything the engine holds for it.
    fn release(&self, handle: EngineHandle);
}

//! live-motion core (host-agnostic)
//!
//! Elements declare animations in a JSON data attribute; the runtime mounts,
//! updates and tears down engine states as the server-rendered DOM is patched,
//! answers the host's `animate`/`hide`/`show`/`toggle` commands, and sequences
//! exit-before-enter inside presence slots.
//!
//! The crate owns no DOM, host or animation engine. Adapters implement the
//! traits in [`capabilities`] and feed engine lifecycle signals back through
//! [`MotionRuntime::dispatch`].

pub mod bridge;
pub mod capabilities;
pub mod config;
pub mod controls;
pub mod easing;
pub mod error;
pub mod events;
pub mod ids;
pub mod keyframes;
pub mod lifecycle;
pub mod presence;
pub mod resolve;
pub mod runtime;
mod state;
pub mod transition;

// Re-exports for consumers (adapters)
pub use capabilities::{Callback, Dom, Host, MotionEngine, NodeAttributes};
pub use config::RuntimeConfig;
pub use controls::{Animation, AnimationControls, PlaybackState};
pub use easing::{Easing, GlideOptions, SpringOptions};
pub use error::{MotionError, Result};
pub use events::{
    AnimationPayload, Command, Directional, MotionEvent, ShowPayload, TogglePayload,
};
pub use ids::{ElementId, EngineHandle, IdAllocator};
pub use keyframes::{KeyframeScalar, KeyframeValue, Keyframes, Variant};
pub use lifecycle::preserve_animated_style;
pub use presence::{ExitFlush, PendingCleanup, PresenceSlot, SlotState};
pub use resolve::{parse_config, resolve, AnimationConfig, MotionOptions};
pub use runtime::MotionRuntime;
pub use state::RuntimeStats;
pub use transition::{wait_duration_ms, Transition};

//! Config resolver: reads the animation attribute of an element and
//! normalizes it into [`AnimationConfig`].
//!
//! The attribute is re-parsed on every read. Nothing is cached, so a host
//! patch that rewrites the attribute is picked up by the next lifecycle call.

use serde::{Deserialize, Serialize};

use crate::capabilities::Dom;
use crate::config::RuntimeConfig;
use crate::error::{MotionError, Result};
use crate::ids::ElementId;
use crate::keyframes::Keyframes;
use crate::transition::Transition;

/// Declarative per-element animation state.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    pub initial: Option<Keyframes>,
    pub animate: Option<Keyframes>,
    pub exit: Option<Keyframes>,
    pub transition: Option<Transition>,
    /// Suppress the automatic animation on mount/update until forced.
    pub defer: bool,
    /// Host script run when an engine animation starts on the element.
    pub on_start: Option<String>,
    /// Host script run when an engine animation completes on the element.
    pub on_complete: Option<String>,
}

/// Engine-facing projection of an [`AnimationConfig`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<Keyframes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animate: Option<Keyframes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit: Option<Keyframes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
}

impl AnimationConfig {
    pub fn motion_options(&self) -> MotionOptions {
        MotionOptions {
            initial: self.initial.clone(),
            animate: self.animate.clone(),
            exit: self.exit.clone(),
            transition: self.transition.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct WireOpts {
    #[serde(default)]
    defer: Option<bool>,
    #[serde(default)]
    on_animation_start: Option<String>,
    #[serde(default)]
    on_animation_complete: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireConfig {
    #[serde(default)]
    initial: Option<Keyframes>,
    #[serde(default)]
    animate: Option<Keyframes>,
    /// Older attribute payloads name the target variant `keyframes`.
    #[serde(default)]
    keyframes: Option<Keyframes>,
    #[serde(default)]
    exit: Option<Keyframes>,
    #[serde(default)]
    transition: Option<Transition>,
    #[serde(default)]
    defer: Option<bool>,
    #[serde(default, alias = "on_animation_start")]
    on_start: Option<String>,
    #[serde(default, alias = "on_animation_complete")]
    on_complete: Option<String>,
    #[serde(default)]
    opts: Option<WireOpts>,
}

impl From<WireConfig> for AnimationConfig {
    fn from(wire: WireConfig) -> Self {
        let opts = wire.opts.unwrap_or_default();
        AnimationConfig {
            initial: wire.initial,
            animate: wire.animate.or(wire.keyframes),
            exit: wire.exit,
            transition: wire.transition,
            defer: wire.defer.or(opts.defer).unwrap_or(false),
            on_start: wire.on_start.or(opts.on_animation_start),
            on_complete: wire.on_complete.or(opts.on_animation_complete),
        }
    }
}

/// Parse an attribute payload. Errors are plain serde errors; callers attach
/// the element for context.
pub fn parse_config(raw: &str) -> std::result::Result<AnimationConfig, serde_json::Error> {
    let wire: WireConfig = serde_json::from_str(raw)?;
    Ok(wire.into())
}

/// Read and decode the configuration attribute of `element`.
///
/// `Ok(None)` means the element carries no configuration and the caller
/// should do nothing. Malformed content is a [`MotionError::Decode`].
pub fn resolve(
    dom: &dyn Dom,
    cfg: &RuntimeConfig,
    element: ElementId,
) -> Result<Option<AnimationConfig>> {
    let Some(raw) = dom.attribute(element, &cfg.config_attribute) else {
        return Ok(None);
    };
    parse_config(&raw)
        .map(Some)
        .map_err(|source| MotionError::Decode { element, source })
}

//! Transition options and the wait-duration rule used before DOM removal.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::config::RuntimeConfig;
use crate::easing::Easing;

/// Timing options forwarded to the engine. Durations are in seconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "WireTransition")]
pub struct Transition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_delay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<Easing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Vec<f64>>,
    /// Remaining keys (per-property overrides and engine extras), untouched.
    #[serde(flatten)]
    pub overrides: Map<String, JsonValue>,
}

/// Wire shape, including the legacy `__easing: [name, params]` tuple.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTransition {
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    delay: Option<f64>,
    #[serde(default)]
    end_delay: Option<f64>,
    #[serde(default)]
    easing: Option<Easing>,
    #[serde(default)]
    repeat: Option<f64>,
    #[serde(default)]
    direction: Option<String>,
    #[serde(default)]
    offset: Option<Vec<f64>>,
    #[serde(default, rename = "__easing")]
    legacy_easing: Option<(String, JsonValue)>,
    #[serde(flatten)]
    overrides: Map<String, JsonValue>,
}

impl TryFrom<WireTransition> for Transition {
    type Error = serde_json::Error;

    fn try_from(wire: WireTransition) -> Result<Self, Self::Error> {
        // An explicit `easing` wins over the legacy tuple.
        let easing = match (wire.easing, wire.legacy_easing) {
            (Some(easing), _) => Some(easing),
            (None, Some((name, params))) => Some(Easing::from_legacy(&name, params)?),
            (None, None) => None,
        };
        Ok(Transition {
            duration: wire.duration,
            delay: wire.delay,
            end_delay: wire.end_delay,
            easing,
            repeat: wire.repeat,
            direction: wire.direction,
            offset: wire.offset,
            overrides: wire.overrides,
        })
    }
}

impl Transition {
    pub fn is_physics(&self) -> bool {
        self.easing.as_ref().is_some_and(Easing::is_physics)
    }
}

fn seconds_to_ms(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0).round() as u64
    } else {
        0
    }
}

/// How long the host should keep an element in the DOM for an exit animation.
///
/// An explicit duration always wins, physics easing included. Physics easing
/// without one falls back to `max_physics_duration_ms`; the engine's completion
/// signal still decides when the element is actually hidden.
pub fn wait_duration_ms(transition: Option<&Transition>, cfg: &RuntimeConfig) -> u64 {
    let Some(t) = transition else {
        return cfg.default_duration_ms;
    };
    match (t.duration, t.is_physics()) {
        (Some(secs), _) => seconds_to_ms(secs),
        (None, true) => cfg.max_physics_duration_ms,
        (None, false) => cfg.default_duration_ms,
    }
}

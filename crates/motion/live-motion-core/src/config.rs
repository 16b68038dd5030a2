//! Runtime configuration for live-motion-core.

use serde::{Deserialize, Serialize};

/// Attribute names, defaults and timing bounds used by the runtime.
/// Every field has a default so hosts can override only what they need.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Attribute holding the JSON-encoded animation configuration.
    pub config_attribute: String,
    /// Attribute the toggle command writes its direction flag to.
    pub toggle_attribute: String,
    /// Attribute marking a presence slot element. Only adapters read it.
    pub presence_attribute: String,
    /// Attribute copied across DOM patches for animated elements.
    pub style_attribute: String,

    /// Display value used by `show` when the command carries none.
    pub default_display: String,

    /// Wait used for hide/exit when the transition has no duration.
    pub default_duration_ms: u64,
    /// Upper bound for physics easings that have no closed-form duration.
    pub max_physics_duration_ms: u64,

    /// Prefix of the custom command events (`<prefix>:animate`, ...).
    pub event_prefix: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            config_attribute: "data-motion".to_string(),
            toggle_attribute: "data-motion-toggle".to_string(),
            presence_attribute: "data-motion-presence".to_string(),
            style_attribute: "style".to_string(),
            default_display: "block".to_string(),
            default_duration_ms: 300,
            max_physics_duration_ms: 10_000,
            event_prefix: "live_motion".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: RuntimeConfig =
            serde_json::from_str(r#"{ "default_display": "flex" }"#).expect("config parses");
        assert_eq!(cfg.default_display, "flex");
        assert_eq!(cfg.config_attribute, "data-motion");
        assert_eq!(cfg.max_physics_duration_ms, 10_000);
    }
}

//! Easing descriptors and their normalization.
//!
//! The attribute JSON cannot carry function references, so physics easings
//! arrive by name (`"spring"`, `"glide"`) or as parameter objects and are
//! rebuilt into [`Easing::Spring`] / [`Easing::Glide`] for the engine, which
//! owns the actual generator constructors. Everything else passes through.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

const SPRING_KEYS: &[&str] = &["stiffness", "damping", "mass"];
const GLIDE_KEYS: &[&str] = &[
    "power",
    "timeConstant",
    "bounceDamping",
    "bounceStiffness",
    "changeTarget",
    "min",
    "max",
];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpringOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damping: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_distance: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlideOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_constant: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounce_damping: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounce_stiffness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Normalized easing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "JsonValue")]
pub enum Easing {
    /// Named curve understood by the engine (`"ease-in"`, `"linear"`, ...).
    Named(String),
    CubicBezier([f64; 4]),
    Spring(SpringOptions),
    Glide(GlideOptions),
    /// Any other shape (per-keyframe arrays, `steps(...)` objects) forwarded verbatim.
    Raw(JsonValue),
}

impl Easing {
    /// Physics easings have no closed-form duration.
    pub fn is_physics(&self) -> bool {
        matches!(self, Easing::Spring(_) | Easing::Glide(_))
    }

    /// Build an easing from the legacy `["spring", {params}]` tuple form.
    pub fn from_legacy(name: &str, params: JsonValue) -> Result<Self, serde_json::Error> {
        let params = match params {
            JsonValue::Null => JsonValue::Object(Map::new()),
            other => other,
        };
        match name {
            "spring" => Ok(Easing::Spring(serde_json::from_value(params)?)),
            "glide" => Ok(Easing::Glide(serde_json::from_value(params)?)),
            other => Ok(Easing::Named(other.to_string())),
        }
    }
}

fn physics_from_object(mut obj: Map<String, JsonValue>) -> Result<Easing, serde_json::Error> {
    let tag = obj
        .get("type")
        .and_then(|t| t.as_str())
        .map(|t| t.to_string());
    match tag.as_deref() {
        Some("spring") => {
            obj.remove("type");
            Ok(Easing::Spring(serde_json::from_value(JsonValue::Object(obj))?))
        }
        Some("glide") => {
            obj.remove("type");
            Ok(Easing::Glide(serde_json::from_value(JsonValue::Object(obj))?))
        }
        Some(_) => Ok(Easing::Raw(JsonValue::Object(obj))),
        None => {
            if GLIDE_KEYS.iter().any(|k| obj.contains_key(*k)) {
                Ok(Easing::Glide(serde_json::from_value(JsonValue::Object(obj))?))
            } else if SPRING_KEYS.iter().any(|k| obj.contains_key(*k)) {
                Ok(Easing::Spring(serde_json::from_value(JsonValue::Object(obj))?))
            } else {
                Ok(Easing::Raw(JsonValue::Object(obj)))
            }
        }
    }
}

impl TryFrom<JsonValue> for Easing {
    type Error = serde_json::Error;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::String(name) => match name.as_str() {
                "spring" => Ok(Easing::Spring(SpringOptions::default())),
                "glide" => Ok(Easing::Glide(GlideOptions::default())),
                _ => Ok(Easing::Named(name)),
            },
            JsonValue::Array(items)
                if items.len() == 4 && items.iter().all(|x| x.is_number()) =>
            {
                let mut curve = [0.0; 4];
                for (slot, item) in curve.iter_mut().zip(items.iter()) {
                    *slot = item.as_f64().unwrap_or_default();
                }
                Ok(Easing::CubicBezier(curve))
            }
            JsonValue::Object(obj) => physics_from_object(obj),
            other => Ok(Easing::Raw(other)),
        }
    }
}

impl From<Easing> for JsonValue {
    fn from(easing: Easing) -> Self {
        match easing {
            Easing::Named(name) => JsonValue::String(name),
            Easing::CubicBezier(curve) => serde_json::json!(curve),
            Easing::Spring(opts) => tagged("spring", serde_json::to_value(opts)),
            Easing::Glide(opts) => tagged("glide", serde_json::to_value(opts)),
            Easing::Raw(raw) => raw,
        }
    }
}

fn tagged(kind: &str, params: Result<JsonValue, serde_json::Error>) -> JsonValue {
    let mut obj = match params {
        Ok(JsonValue::Object(obj)) => obj,
        _ => Map::new(),
    };
    obj.insert("type".to_string(), JsonValue::String(kind.to_string()));
    JsonValue::Object(obj)
}

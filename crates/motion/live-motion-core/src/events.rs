//! Synthetic lifecycle events and the host command events.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{MotionError, Result};
use crate::keyframes::Keyframes;
use crate::transition::Transition;

/// Lifecycle signals the engine raises on an element.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MotionEvent {
    Start,
    Complete,
    /// The animation was stopped or superseded before finishing.
    Interrupted,
}

impl MotionEvent {
    pub const ALL: [MotionEvent; 3] = [
        MotionEvent::Start,
        MotionEvent::Complete,
        MotionEvent::Interrupted,
    ];

    /// DOM event name.
    pub fn name(self) -> &'static str {
        match self {
            MotionEvent::Start => "motionstart",
            MotionEvent::Complete => "motioncomplete",
            MotionEvent::Interrupted => "motioncancel",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.name() == name)
    }
}

/// Keyframes/transition override carried by `animate` and `hide`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AnimationPayload {
    #[serde(default)]
    pub keyframes: Option<Keyframes>,
    #[serde(default)]
    pub transition: Option<Transition>,
}

impl AnimationPayload {
    /// Payloads without keyframes fall back to the element's own config.
    pub fn keyframes(&self) -> Option<&Keyframes> {
        self.keyframes.as_ref().filter(|k| !k.is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ShowPayload {
    #[serde(default)]
    pub keyframes: Option<Keyframes>,
    #[serde(default)]
    pub transition: Option<Transition>,
    #[serde(default)]
    pub display: Option<String>,
}

impl ShowPayload {
    pub fn keyframes(&self) -> Option<&Keyframes> {
        self.keyframes.as_ref().filter(|k| !k.is_empty())
    }
}

/// A value that may be split into an `in`/`out` pair.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Directional<T> {
    InOut {
        #[serde(rename = "in")]
        enter: T,
        out: T,
    },
    Same(T),
}

impl<T> Directional<T> {
    /// `out` when the toggle is leaving, `in` otherwise.
    pub fn pick(&self, exiting: bool) -> &T {
        match self {
            Directional::InOut { enter, out } => {
                if exiting {
                    out
                } else {
                    enter
                }
            }
            Directional::Same(value) => value,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TogglePayload {
    #[serde(default)]
    pub keyframes: Option<Directional<Keyframes>>,
    #[serde(default)]
    pub transition: Option<Directional<Transition>>,
}

impl TogglePayload {
    /// Keyframes and transition for one direction, or `None` when the
    /// payload carries no keyframes for it.
    pub fn resolve(&self, exiting: bool) -> Option<(&Keyframes, Option<&Transition>)> {
        let keyframes = self.keyframes.as_ref()?.pick(exiting);
        if keyframes.is_empty() {
            return None;
        }
        let transition = self.transition.as_ref().map(|t| t.pick(exiting));
        Some((keyframes, transition))
    }
}

/// Commands dispatched by the host's command layer.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Animate(AnimationPayload),
    Hide(AnimationPayload),
    Show(ShowPayload),
    Toggle(TogglePayload),
}

fn payload<T>(command: &str, detail: Option<JsonValue>) -> Result<T>
where
    T: Default + for<'de> Deserialize<'de>,
{
    match detail {
        None | Some(JsonValue::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value).map_err(|source| MotionError::InvalidPayload {
            command: command.to_string(),
            source,
        }),
    }
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Animate(_) => "animate",
            Command::Hide(_) => "hide",
            Command::Show(_) => "show",
            Command::Toggle(_) => "toggle",
        }
    }

    /// Build a command from a custom event name (`live_motion:hide` or bare
    /// `hide`) and its optional detail payload.
    pub fn from_event(prefix: &str, event: &str, detail: Option<JsonValue>) -> Result<Self> {
        let name = event
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(event);
        match name {
            "animate" => Ok(Command::Animate(payload(name, detail)?)),
            "hide" => Ok(Command::Hide(payload(name, detail)?)),
            "show" => Ok(Command::Show(payload(name, detail)?)),
            "toggle" => Ok(Command::Toggle(payload(name, detail)?)),
            _ => Err(MotionError::UnknownCommand(event.to_string())),
        }
    }
}

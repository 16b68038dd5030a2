//! Error type shared by every runtime entry point.

use thiserror::Error;

use crate::ids::ElementId;

/// Errors surfaced to the host.
///
/// A missing configuration attribute is not an error; callers see `Ok(None)`
/// or a logged no-op instead.
#[derive(Debug, Error)]
pub enum MotionError {
    #[error("malformed motion config on element {element:?}: {source}")]
    Decode {
        element: ElementId,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed payload for `{command}` command: {source}")]
    InvalidPayload {
        command: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("element {0:?} is not mounted")]
    UnknownElement(ElementId),
    #[error("unknown motion command `{0}`")]
    UnknownCommand(String),
}

pub type Result<T> = std::result::Result<T, MotionError>;

//! Engine error type

use thiserror::Error;

use crate::host::HostError;

/// Structural failures that abort an operation on one bound element.
///
/// Everything recoverable (bad attribute shapes, missing animation
/// parameters) is handled in place with a log and a default or a skip;
/// only these propagate, so the binding lifecycle can emit a single
/// consolidated error event per failure.
#[derive(Debug, Error)]
pub enum BindError {
    /// The page volume could not be created
    #[error("unable to render 3D content: {0}")]
    Volume(#[from] HostError),
    /// A loaded model resource reported non-finite dimensions
    #[error("set model resource failed: {0}")]
    InvalidResource(String),
    /// The element has no bound node
    #[error("element is not bound to a node")]
    NotBound,
}

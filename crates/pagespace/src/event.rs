//! Events the engine emits back toward the page
//!
//! The embedder drains these and re-dispatches them as DOM events on the
//! owning element (all of them bubble in the original wire-up).

use crate::dom::ElementId;
use crate::host::{RaycastPhase, RaycastSource};

/// An engine-emitted event targeting one element
#[derive(Debug, Clone, PartialEq)]
pub struct ElementEvent {
    pub element: ElementId,
    pub event: PageEvent,
}

/// What happened
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// The model mesh resource finished loading and validated
    ResourceLoaded,
    /// The node is fully sized, positioned and attributed
    NodeDisplayed,
    /// Extraction is about to run
    ExtractingNode,
    /// Extraction was handed to the host
    NodeExtracted,
    /// The host saw an extraction gesture; the embedder should call
    /// `Engine::extract` with element access
    ExtractionRequested,
    /// A raycast crossed the node
    NodeRaycast {
        phase: RaycastPhase,
        source: RaycastSource,
    },
    /// A tracked transform animation finished
    TransformAnimationEnd { track: i32 },
    /// A named model animation finished
    ModelAnimationEnd { animation: String },
    /// The requested stage extent was granted
    StageGranted,
    /// The requested stage extent was denied
    StageDenied,
    /// A structural failure on this element
    Error { message: String },
}

//! The spatial host capability boundary
//!
//! The host owns the scene graph, renders it, and emits spatial input
//! events. The engine only ever talks to it through [`SpatialHost`], so unit
//! tests and headless embedders run against [`MockHost`].

mod backend;
mod event;
mod mock;

pub use backend::{
    ControlHaptic, ExtractionManifest, HostError, ModelResource, NodeId, PageOrientation,
    SpatialHost, StageExtent, Viewport,
};
pub use event::{HostEvent, RaycastPhase, RaycastSource, StageRequestState};
pub use mock::{AnimationKind, AnimationRecord, MockHost, MockNode, MockVolume};

//! pagespace: a binding layer between page layout and a spatial host
//!
//! This crate keeps 2D page layout and 3D spatial placement synchronized:
//! - Pixel / physical-unit / host-meter conversion with single-precision
//!   semantics throughout
//! - A per-element registry pairing each page element with a renderable node
//!   behind a two-layer transform stack (placement + animation)
//! - Resize / scroll / mutation / stage-change resynchronization through one
//!   idempotent entry point
//! - The extraction protocol: rotation-aware bounding volumes, two-phase
//!   scale correction and a single host manifest
//! - Volume placement against the physical stage, including the flat
//!   page-orientation branch
//!
//! The spatial host and the DOM are injected capabilities ([`SpatialHost`],
//! [`PageElement`]); [`MockHost`] and [`StubElement`] back the tests and any
//! headless embedder.

pub mod attr;
pub mod dom;
pub mod engine;
pub mod error;
pub mod event;
pub mod extract;
pub mod host;
pub mod hover;
pub mod layout;
pub mod motion;
pub mod spatial;
pub mod stage;
pub mod sync;
pub mod units;

// Re-export commonly used types
pub use dom::{ElementBox, ElementId, PageElement, StubElement};
pub use engine::{Engine, ResyncReason};
pub use error::BindError;
pub use event::{ElementEvent, PageEvent};
pub use host::{
    ExtractionManifest, HostEvent, MockHost, ModelResource, NodeId, PageOrientation, SpatialHost,
    StageExtent, StageRequestState, Viewport,
};
pub use layout::WindowMetrics;
pub use spatial::{Quaternion, Transform, Vector3};
pub use units::PixelMetrics;

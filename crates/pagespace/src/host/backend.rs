//! Spatial host trait definition

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spatial::{Quaternion, Transform, Vector3};

/// Error type for host operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HostError {
    /// The single page volume already exists
    #[error("volume already exists")]
    VolumeExists,
    /// The host could not create the volume
    #[error("volume was not created")]
    VolumeNotCreated,
    /// A node handle is no longer valid
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    /// The host refused an extraction request
    #[error("extraction rejected: {0}")]
    ExtractionRejected(String),
}

/// Handle to a scene-graph node (model, quad or transform)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Host viewport metrics, in meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Vertical offset of the viewport's top-left corner in host space.
    pub top_left_y: f32,
}

/// Reported orientation of the page surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOrientation {
    /// Page stands upright in front of the viewer
    Upright,
    /// Page lies flat, facing up
    Flat,
}

/// Six physical working-volume boundaries, in meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StageExtent {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
    pub front: f32,
    pub back: f32,
}

/// Opaque model resource handle as returned by the resource loader
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelResource {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub center: Vector3,
}

impl ModelResource {
    /// All three extents parse to finite numbers.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.depth.is_finite()
    }
}

/// Control haptic patterns used by hover feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlHaptic {
    Tick,
    ForceDwell,
}

/// Everything the host needs to pull a node into a freestanding volume
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionManifest {
    /// Scale the host applies after extraction completes.
    pub scale: f32,
    /// Placement of the extracted volume in host space.
    pub transform: Transform,
    /// Link the extracted volume navigates back to.
    pub origin_url: String,
    pub width: f32,
    pub height: f32,
    pub breadth: f32,
}

/// Scene-graph capability the engine drives.
///
/// One page volume, created lazily and never destroyed; nodes and transforms
/// are parented under it. Animation calls are time-boxed and keyed by track
/// number; a later call on the same track pre-empts the earlier one.
pub trait SpatialHost {
    // --- world metrics ---
    fn viewport(&self) -> Viewport;
    fn orientation(&self) -> PageOrientation;
    fn stage_extent(&self) -> StageExtent;
    fn stage_size(&self) -> Vector3;

    /// Clear any previously requested working volume.
    fn reset_stage_extent(&mut self);

    /// Ask for a new working volume. Completion arrives later as a
    /// [`super::HostEvent::StageExtentResult`].
    fn request_stage_extent(&mut self, extent: StageExtent);

    // --- volume ---
    fn has_volume(&self) -> bool;
    fn create_volume(&mut self, width: f32, height: f32, depth: f32) -> Result<(), HostError>;
    fn volume_visible(&self) -> bool;
    fn set_volume_visible(&mut self, visible: bool);
    fn set_volume_transform(&mut self, transform: Transform);
    fn set_volume_size(&mut self, size: Vector3);
    fn set_volume_bloom_strength(&mut self, strength: f32);

    // --- node lifecycle ---
    fn create_model(&mut self, resource: &ModelResource) -> Result<NodeId, HostError>;
    fn create_quad(&mut self) -> Result<NodeId, HostError>;
    fn create_transform(&mut self) -> NodeId;
    fn add_child(&mut self, parent: NodeId, child: NodeId);
    fn remove_child(&mut self, parent: NodeId, child: NodeId);
    fn attach_to_volume(&mut self, node: NodeId);
    fn detach_from_volume(&mut self, node: NodeId);
    fn destroy_node(&mut self, node: NodeId);

    // --- node state ---
    fn local_position(&self, node: NodeId) -> Vector3;
    fn set_local_position(&mut self, node: NodeId, position: Vector3);
    fn local_scale(&self, node: NodeId) -> Vector3;
    fn set_local_scale(&mut self, node: NodeId, scale: Vector3);
    fn local_rotation(&self, node: NodeId) -> Quaternion;
    fn set_local_rotation(&mut self, node: NodeId, rotation: Quaternion);
    fn set_anchor_position(&mut self, node: NodeId, anchor: Vector3);
    fn node_visible(&self, node: NodeId) -> bool;
    fn set_node_visible(&mut self, node: NodeId, visible: bool);
    fn set_skip_raycast(&mut self, node: NodeId, skip: bool);

    // --- model surface parameters ---
    fn set_model_color(&mut self, node: NodeId, color: Option<&str>);
    fn set_color_intensity(&mut self, node: NodeId, intensity: f32);
    fn play_animation(&mut self, node: NodeId, name: &str, paused: bool, iterations: i32);
    fn set_animation_speed(&mut self, node: NodeId, speed: f32);

    // --- time-boxed transform animations ---
    fn move_to(&mut self, node: NodeId, target: Vector3, duration: f32, track: i32);
    fn move_by(&mut self, node: NodeId, delta: Vector3, duration: f32, track: i32);
    fn scale_to(&mut self, node: NodeId, target: Vector3, duration: f32, track: i32);
    fn scale_by(&mut self, node: NodeId, factor: Vector3, duration: f32, track: i32);
    fn rotate_to(&mut self, node: NodeId, target: Quaternion, duration: f32, track: i32);
    fn rotate_by(&mut self, node: NodeId, delta: Quaternion, duration: f32, track: i32);
    fn spin(&mut self, node: NodeId, axis: Vector3, rate: f32, duration: f32, track: i32);

    /// Ask for an animation-end notification for `track` on `node`.
    fn request_animation_callback(&mut self, node: NodeId, track: i32);

    // --- input feedback & extraction ---
    fn trigger_haptic(&mut self, pattern: ControlHaptic);
    fn extract_content(
        &mut self,
        node: NodeId,
        manifest: &ExtractionManifest,
    ) -> Result<(), HostError>;
}

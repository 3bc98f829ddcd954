//! In-memory spatial host for unit tests and headless embedders
//!
//! Transform animations land on their target value immediately and every
//! interesting call is recorded so tests can assert on exactly what the
//! engine asked for.

use std::collections::HashMap;

use crate::spatial::{Quaternion, Transform, Vector3};

use super::backend::{
    ControlHaptic, ExtractionManifest, HostError, ModelResource, NodeId, PageOrientation,
    SpatialHost, StageExtent, Viewport,
};

/// What a recorded animation call asked for
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationKind {
    MoveTo(Vector3),
    MoveBy(Vector3),
    ScaleTo(Vector3),
    ScaleBy(Vector3),
    RotateTo(Quaternion),
    RotateBy(Quaternion),
    Spin { axis: Vector3, rate: f32 },
}

/// One recorded animation call
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationRecord {
    pub node: NodeId,
    pub kind: AnimationKind,
    pub duration: f32,
    pub track: i32,
}

/// State of one mock scene node
#[derive(Debug, Clone)]
pub struct MockNode {
    pub position: Vector3,
    pub scale: Vector3,
    pub rotation: Quaternion,
    pub anchor: Vector3,
    pub visible: bool,
    pub skip_raycast: bool,
    pub color: Option<String>,
    pub color_intensity: f32,
    pub playing: Option<(String, bool, i32)>,
    pub animation_speed: f32,
    pub resource: Option<ModelResource>,
    pub children: Vec<NodeId>,
}

impl Default for MockNode {
    fn default() -> Self {
        Self {
            position: Vector3::ZERO,
            scale: Vector3::ONE,
            rotation: Quaternion::IDENTITY,
            anchor: Vector3::ZERO,
            visible: true,
            skip_raycast: false,
            color: None,
            color_intensity: 1.0,
            playing: None,
            animation_speed: 1.0,
            resource: None,
            children: Vec::new(),
        }
    }
}

/// State of the mock page volume
#[derive(Debug, Clone)]
pub struct MockVolume {
    pub visible: bool,
    pub transform: Transform,
    pub size: Vector3,
    pub bloom_strength: f32,
    pub children: Vec<NodeId>,
}

/// A [`SpatialHost`] backed by plain maps
#[derive(Debug)]
pub struct MockHost {
    pub viewport: Viewport,
    pub orientation: PageOrientation,
    pub stage_extent: StageExtent,
    pub stage_size: Vector3,
    pub volume: Option<MockVolume>,
    nodes: HashMap<NodeId, MockNode>,
    next_id: u64,
    /// Fail the next volume creation, for error-path tests.
    pub fail_volume_creation: bool,
    pub animations: Vec<AnimationRecord>,
    pub extractions: Vec<(NodeId, ExtractionManifest)>,
    pub extent_requests: Vec<StageExtent>,
    pub extent_resets: usize,
    pub haptics: Vec<ControlHaptic>,
    pub animation_callbacks: Vec<(NodeId, i32)>,
    pub position_writes: usize,
    pub scale_writes: usize,
}

impl MockHost {
    /// A host with a 0.896 m viewport over a 1280 px window and a half-meter
    /// stage in every direction.
    pub fn new() -> Self {
        Self {
            viewport: Viewport {
                width: 0.896,
                height: 0.504,
                top_left_y: 0.0,
            },
            orientation: PageOrientation::Upright,
            stage_extent: StageExtent {
                top: 0.5,
                right: 0.5,
                bottom: 0.5,
                left: 0.5,
                front: 0.5,
                back: 0.5,
            },
            stage_size: Vector3::new(1.0, 1.0, 1.0),
            volume: None,
            nodes: HashMap::new(),
            next_id: 1,
            fail_volume_creation: false,
            animations: Vec::new(),
            extractions: Vec::new(),
            extent_requests: Vec::new(),
            extent_resets: 0,
            haptics: Vec::new(),
            animation_callbacks: Vec::new(),
            position_writes: 0,
            scale_writes: 0,
        }
    }

    /// Direct access to a node's state.
    pub fn node(&self, id: NodeId) -> Option<&MockNode> {
        self.nodes.get(&id)
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn alloc(&mut self, node: MockNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    fn with_node(&mut self, id: NodeId, apply: impl FnOnce(&mut MockNode)) {
        if let Some(node) = self.nodes.get_mut(&id) {
            apply(node);
        }
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialHost for MockHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn orientation(&self) -> PageOrientation {
        self.orientation
    }

    fn stage_extent(&self) -> StageExtent {
        self.stage_extent
    }

    fn stage_size(&self) -> Vector3 {
        self.stage_size
    }

    fn reset_stage_extent(&mut self) {
        self.extent_resets += 1;
    }

    fn request_stage_extent(&mut self, extent: StageExtent) {
        self.extent_requests.push(extent);
    }

    fn has_volume(&self) -> bool {
        self.volume.is_some()
    }

    fn create_volume(&mut self, width: f32, height: f32, depth: f32) -> Result<(), HostError> {
        if self.volume.is_some() {
            return Err(HostError::VolumeExists);
        }
        if self.fail_volume_creation {
            return Err(HostError::VolumeNotCreated);
        }
        self.volume = Some(MockVolume {
            visible: false,
            transform: Transform::identity(),
            size: Vector3::new(width, height, depth),
            bloom_strength: 0.0,
            children: Vec::new(),
        });
        Ok(())
    }

    fn volume_visible(&self) -> bool {
        self.volume.as_ref().is_some_and(|v| v.visible)
    }

    fn set_volume_visible(&mut self, visible: bool) {
        if let Some(volume) = self.volume.as_mut() {
            volume.visible = visible;
        }
    }

    fn set_volume_transform(&mut self, transform: Transform) {
        if let Some(volume) = self.volume.as_mut() {
            volume.transform = transform;
        }
    }

    fn set_volume_size(&mut self, size: Vector3) {
        if let Some(volume) = self.volume.as_mut() {
            volume.size = size;
        }
    }

    fn set_volume_bloom_strength(&mut self, strength: f32) {
        if let Some(volume) = self.volume.as_mut() {
            volume.bloom_strength = strength;
        }
    }

    fn create_model(&mut self, resource: &ModelResource) -> Result<NodeId, HostError> {
        Ok(self.alloc(MockNode {
            visible: false,
            resource: Some(*resource),
            ..MockNode::default()
        }))
    }

    fn create_quad(&mut self) -> Result<NodeId, HostError> {
        Ok(self.alloc(MockNode {
            visible: false,
            ..MockNode::default()
        }))
    }

    fn create_transform(&mut self) -> NodeId {
        self.alloc(MockNode::default())
    }

    fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.with_node(parent, |n| n.children.push(child));
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.with_node(parent, |n| n.children.retain(|c| *c != child));
    }

    fn attach_to_volume(&mut self, node: NodeId) {
        if let Some(volume) = self.volume.as_mut() {
            volume.children.push(node);
        }
    }

    fn detach_from_volume(&mut self, node: NodeId) {
        if let Some(volume) = self.volume.as_mut() {
            volume.children.retain(|c| *c != node);
        }
    }

    fn destroy_node(&mut self, node: NodeId) {
        self.nodes.remove(&node);
    }

    fn local_position(&self, node: NodeId) -> Vector3 {
        self.nodes.get(&node).map(|n| n.position).unwrap_or_default()
    }

    fn set_local_position(&mut self, node: NodeId, position: Vector3) {
        self.position_writes += 1;
        self.with_node(node, |n| n.position = position);
    }

    fn local_scale(&self, node: NodeId) -> Vector3 {
        self.nodes
            .get(&node)
            .map(|n| n.scale)
            .unwrap_or(Vector3::ONE)
    }

    fn set_local_scale(&mut self, node: NodeId, scale: Vector3) {
        self.scale_writes += 1;
        self.with_node(node, |n| n.scale = scale);
    }

    fn local_rotation(&self, node: NodeId) -> Quaternion {
        self.nodes
            .get(&node)
            .map(|n| n.rotation)
            .unwrap_or(Quaternion::IDENTITY)
    }

    fn set_local_rotation(&mut self, node: NodeId, rotation: Quaternion) {
        self.with_node(node, |n| n.rotation = rotation);
    }

    fn set_anchor_position(&mut self, node: NodeId, anchor: Vector3) {
        self.with_node(node, |n| n.anchor = anchor);
    }

    fn node_visible(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|n| n.visible)
    }

    fn set_node_visible(&mut self, node: NodeId, visible: bool) {
        self.with_node(node, |n| n.visible = visible);
    }

    fn set_skip_raycast(&mut self, node: NodeId, skip: bool) {
        self.with_node(node, |n| n.skip_raycast = skip);
    }

    fn set_model_color(&mut self, node: NodeId, color: Option<&str>) {
        self.with_node(node, |n| n.color = color.map(str::to_string));
    }

    fn set_color_intensity(&mut self, node: NodeId, intensity: f32) {
        self.with_node(node, |n| n.color_intensity = intensity);
    }

    fn play_animation(&mut self, node: NodeId, name: &str, paused: bool, iterations: i32) {
        self.with_node(node, |n| n.playing = Some((name.to_string(), paused, iterations)));
    }

    fn set_animation_speed(&mut self, node: NodeId, speed: f32) {
        self.with_node(node, |n| n.animation_speed = speed);
    }

    fn move_to(&mut self, node: NodeId, target: Vector3, duration: f32, track: i32) {
        self.with_node(node, |n| n.position = target);
        self.animations.push(AnimationRecord {
            node,
            kind: AnimationKind::MoveTo(target),
            duration,
            track,
        });
    }

    fn move_by(&mut self, node: NodeId, delta: Vector3, duration: f32, track: i32) {
        self.with_node(node, |n| n.position = n.position + delta);
        self.animations.push(AnimationRecord {
            node,
            kind: AnimationKind::MoveBy(delta),
            duration,
            track,
        });
    }

    fn scale_to(&mut self, node: NodeId, target: Vector3, duration: f32, track: i32) {
        self.with_node(node, |n| n.scale = target);
        self.animations.push(AnimationRecord {
            node,
            kind: AnimationKind::ScaleTo(target),
            duration,
            track,
        });
    }

    fn scale_by(&mut self, node: NodeId, factor: Vector3, duration: f32, track: i32) {
        self.with_node(node, |n| n.scale = n.scale.scaled_by(factor));
        self.animations.push(AnimationRecord {
            node,
            kind: AnimationKind::ScaleBy(factor),
            duration,
            track,
        });
    }

    fn rotate_to(&mut self, node: NodeId, target: Quaternion, duration: f32, track: i32) {
        self.with_node(node, |n| n.rotation = target);
        self.animations.push(AnimationRecord {
            node,
            kind: AnimationKind::RotateTo(target),
            duration,
            track,
        });
    }

    fn rotate_by(&mut self, node: NodeId, delta: Quaternion, duration: f32, track: i32) {
        self.animations.push(AnimationRecord {
            node,
            kind: AnimationKind::RotateBy(delta),
            duration,
            track,
        });
    }

    fn spin(&mut self, node: NodeId, axis: Vector3, rate: f32, duration: f32, track: i32) {
        self.animations.push(AnimationRecord {
            node,
            kind: AnimationKind::Spin { axis, rate },
            duration,
            track,
        });
    }

    fn request_animation_callback(&mut self, node: NodeId, track: i32) {
        self.animation_callbacks.push((node, track));
    }

    fn trigger_haptic(&mut self, pattern: ControlHaptic) {
        self.haptics.push(pattern);
    }

    fn extract_content(
        &mut self,
        node: NodeId,
        manifest: &ExtractionManifest,
    ) -> Result<(), HostError> {
        if !self.nodes.contains_key(&node) {
            return Err(HostError::UnknownNode(node));
        }
        self.extractions.push((node, manifest.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_is_singular() {
        let mut host = MockHost::new();
        assert!(host.create_volume(0.1, 0.1, 0.1).is_ok());
        assert_eq!(
            host.create_volume(0.1, 0.1, 0.1),
            Err(HostError::VolumeExists)
        );
    }

    #[test]
    fn test_animation_lands_on_target() {
        let mut host = MockHost::new();
        let node = host.create_transform();
        host.move_to(node, Vector3::new(1.0, 2.0, 3.0), 0.1, -1);
        assert_eq!(host.local_position(node), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(host.animations.len(), 1);
        assert_eq!(host.animations[0].track, -1);
    }

    #[test]
    fn test_scale_by_composes() {
        let mut host = MockHost::new();
        let node = host.create_transform();
        host.set_local_scale(node, Vector3::new(2.0, 2.0, 2.0));
        host.scale_by(node, Vector3::new(0.5, 1.0, 2.0), 0.1, 0);
        assert_eq!(host.local_scale(node), Vector3::new(1.0, 2.0, 4.0));
    }
}

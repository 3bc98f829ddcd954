//! Pulling a node out of page flow into a freestanding volume
//!
//! Extraction is a pure computation over the current transform stack: it
//! hands the host one manifest and leaves every on-page transform exactly as
//! it found it, apart from the extracting/extracted events.

use tracing::{error, warn};

use crate::dom::{ElementId, PageElement};
use crate::engine::{Engine, NodeKind};
use crate::event::PageEvent;
use crate::host::{ExtractionManifest, SpatialHost};
use crate::spatial::{Transform, Vector3};
use crate::units::{leading_float, try_leading_float, VOLUME_GAP};

/// Safety multiplier for animated meshes, whose axis-aligned bounds can
/// exceed the bind pose.
const ANIMATED_BOUNDS_MARGIN: f32 = 2.0;

/// Parse an `extracted-size` attribute: width and height required, breadth
/// optional. Quads default breadth to the volume gap, models to the smaller
/// of width and height.
fn parse_extracted_size(value: &str, is_quad: bool) -> Option<Vector3> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    let width = tokens.first().and_then(|t| try_leading_float(t));
    let height = tokens.get(1).and_then(|t| try_leading_float(t));
    let breadth = tokens.get(2).and_then(|t| try_leading_float(t));

    match (width, height) {
        (Some(width), Some(height)) => {
            let breadth = breadth.unwrap_or(if is_quad {
                VOLUME_GAP
            } else {
                width.min(height)
            });
            Some(Vector3::new(width, height, breadth))
        }
        _ => None,
    }
}

/// Grow a bounding box so it still contains the node after per-axis
/// rotation. Each axis correction is applied independently and
/// cumulatively, and no dimension ever shrinks below its unrotated value.
pub(crate) fn expand_for_rotation(size: Vector3, angles: [f32; 3]) -> Vector3 {
    let mut size = size;

    if angles[0] != 0.0 {
        let (sin, cos) = (angles[0].sin().abs(), angles[0].cos().abs());
        let breadth = sin * size.y + cos * size.z;
        let height = sin * size.z + cos * size.y;
        size.z = size.z.max(breadth);
        size.y = size.y.max(height);
    }

    if angles[1] != 0.0 {
        let (sin, cos) = (angles[1].sin().abs(), angles[1].cos().abs());
        let width = sin * size.z + cos * size.x;
        let breadth = sin * size.x + cos * size.z;
        size.x = size.x.max(width);
        size.z = size.z.max(breadth);
    }

    if angles[2] != 0.0 {
        let (sin, cos) = (angles[2].sin().abs(), angles[2].cos().abs());
        let width = sin * size.y + cos * size.x;
        let height = sin * size.x + cos * size.y;
        size.x = size.x.max(width);
        size.y = size.y.max(height);
    }

    size
}

impl<H: SpatialHost> Engine<H> {
    /// Extract the element's node into a freestanding volume.
    ///
    /// A no-op on unbound elements. Invalid `extracted-size` values degrade
    /// to the computed on-page size with a warning.
    pub fn extract<E: PageElement>(&mut self, el: &E, id: ElementId) {
        let Some(state) = self.bound.get(&id) else {
            return;
        };
        let node = state.node;
        let placement = state.placement;
        let animation = state.animation;
        let kind = state.kind.clone();
        let is_quad = matches!(kind, NodeKind::Quad);

        // Extraction always starts from the authoritative baseline, not a
        // half-applied hover delta.
        self.undo_hover(id);

        let node_scale = self.host.local_scale(node);
        let placement_scale = self.host.local_scale(placement);
        let animation_scale = self.host.local_scale(animation);

        let intrinsic = match &kind {
            NodeKind::Model { resource } => {
                Vector3::new(resource.width, resource.height, resource.depth)
            }
            NodeKind::Quad => Vector3::ONE,
        };
        let current = intrinsic
            .scaled_by(node_scale)
            .scaled_by(placement_scale)
            .scaled_by(animation_scale);

        let mut size = current;
        let mut calculated_scale = 0.0_f32;
        let mut explicit_size = false;

        if let Some(value) = el.attribute("extracted-size") {
            match parse_extracted_size(&value, is_quad) {
                Some(target) => {
                    explicit_size = true;
                    let mut ratios = Vector3::new(
                        target.x / current.x,
                        target.y / current.y,
                        target.z / current.z,
                    );
                    let scale_down = (current.x / target.x).min(current.y / target.y);

                    if scale_down < 1.0 {
                        // Growing: keep the on-page size and let the host
                        // animate up to the target after extraction.
                        ratios = ratios * scale_down;
                        size = current.scaled_by(ratios);
                        calculated_scale = 1.0 / scale_down;
                    } else {
                        // Shrinking: pre-shrink on the page so the node
                        // never pops, and hand the inverse to the host.
                        size = target;
                        calculated_scale = scale_down;
                    }

                    self.host
                        .set_local_scale(placement, placement_scale.scaled_by(ratios));
                }
                None => {
                    warn!("Invalid value used for extracted-size attribute.");
                }
            }
        }

        self.emit(id, PageEvent::ExtractingNode);

        let placement_position = self.host.local_position(placement);
        let animation_position = self.host.local_position(animation);

        let extent = self.host.stage_extent();
        let viewport = self.host.viewport();
        let z = animation_position.z + placement_position.z + current.z;
        let transform = Transform::from_position(Vector3::new(
            animation_position.x + placement_position.x + (extent.right - extent.left) / 2.0,
            animation_position.y
                + placement_position.y
                + (viewport.height / 2.0 + viewport.top_left_y)
                + (extent.top - extent.bottom) / 2.0,
            z + (extent.front - extent.back) / 2.0,
        ));

        let extracted_scale = if calculated_scale > 0.0 {
            calculated_scale
        } else {
            el.attribute("extracted-scale")
                .map(|v| leading_float(&v))
                .filter(|v| *v > 0.0)
                .unwrap_or(1.0)
        };

        // The extracted node sits in the middle of its transforms.
        self.host.set_local_position(placement, Vector3::ZERO);
        self.host.set_local_position(animation, Vector3::ZERO);

        let rotation = self.host.local_rotation(animation);
        let angles = rotation.to_axis_angle();
        let mut final_size = expand_for_rotation(size, angles);

        // Animated meshes can exceed their computed bounds; widen unless the
        // author pinned an explicit size.
        if !explicit_size && el.attribute("model-animation").is_some() {
            final_size = final_size * ANIMATED_BOUNDS_MARGIN;
        }

        let origin_url = el
            .attribute("extracted-link")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.page_url.clone());

        let manifest = ExtractionManifest {
            scale: extracted_scale,
            transform,
            origin_url,
            width: final_size.x + VOLUME_GAP,
            height: final_size.y + VOLUME_GAP,
            breadth: final_size.z + VOLUME_GAP,
        };

        if let Err(err) = self.host.extract_content(placement, &manifest) {
            error!(element = id.0, "extraction failed: {err}");
        }

        // Put the page back exactly as it was.
        self.host.set_local_scale(placement, placement_scale);
        self.host.set_local_position(placement, placement_position);
        self.host.set_local_position(animation, animation_position);

        self.emit(id, PageEvent::NodeExtracted);
    }
}

//! Size, position and visibility synchronization
//!
//! Every trigger funnels through [`Engine::resync`]; applying it twice with
//! no intervening DOM change produces identical host state.

use tracing::warn;

use crate::dom::{is_element_visible, ElementId, PageElement};
use crate::engine::{Engine, NodeKind, ResyncReason};
use crate::host::SpatialHost;
use crate::layout::element_center;
use crate::spatial::Vector3;
use crate::units::{attribute_in_pixels, DEFAULT_Z_OFFSET};

impl<H: SpatialHost> Engine<H> {
    /// Re-synchronize one bound element.
    pub fn resync<E: PageElement>(&mut self, el: &mut E, id: ElementId, reason: ResyncReason) {
        if !self.bound.contains_key(&id) {
            return;
        }

        match reason {
            ResyncReason::Bind | ResyncReason::AttributeChanged => {
                if self.sync_size(el, id) {
                    self.sync_position(el, id);
                }
            }
            ResyncReason::ElementResize => {
                self.sync_size(el, id);
            }
            ResyncReason::WindowResize | ResyncReason::Scroll => {
                self.sync_position(el, id);
            }
            ResyncReason::StyleMutation => {
                // The explicit attribute path owns visibility when the
                // attribute exists; handling it here too would double up.
                if el.attribute("visibility").is_none() {
                    self.apply_visibility(el, id);
                }
                self.sync_position(el, id);
            }
            ResyncReason::StageChanged => {
                self.position_from_cache(id);
            }
        }
    }

    /// True unless auto-size probing has observation suspended for `id`.
    /// Mutation-driven embedders should drop callbacks while this is false.
    pub fn is_observing(&self, id: ElementId) -> bool {
        self.bound.get(&id).is_none_or(|state| state.observing)
    }

    /// Declared size of the element in meters. Breadth falls back to the
    /// larger client dimension when the attribute is absent or useless.
    fn element_size<E: PageElement>(&self, el: &E, breadth_px: Option<f32>) -> Vector3 {
        let fallback = el.client_width().max(el.client_height());
        Vector3::new(
            self.pixels.pixels_to_meters(el.client_width()),
            self.pixels.pixels_to_meters(el.client_height()),
            self.pixels
                .pixels_to_meters(breadth_px.unwrap_or(fallback)),
        )
    }

    /// Scale the node to match the element. Returns false when a dimension
    /// degenerates to zero, in which case nothing is written to the host.
    fn sync_size<E: PageElement>(&mut self, el: &mut E, id: ElementId) -> bool {
        if el.client_width() == 0.0 || el.client_height() == 0.0 {
            self.auto_size(el, id);
        }

        let Some(state) = self.bound.get(&id) else {
            return false;
        };
        let node = state.node;
        let kind = state.kind.clone();

        let breadth_px = el
            .attribute("breadth")
            .map(|v| attribute_in_pixels(&v))
            .filter(|px| *px != 0.0);
        let size = self.element_size(el, breadth_px);

        if size.x == 0.0 || size.y == 0.0 || size.z == 0.0 {
            warn!(
                element = id.0,
                "At least one of the node's dimensions is not specified. \
                 Dimensions are specified using CSS width/height properties."
            );
            return false;
        }

        match kind {
            NodeKind::Model { resource } => {
                let fill = el
                    .attribute("fill")
                    .is_some_and(|v| v.is_empty() || v == "true");
                if fill {
                    self.host.set_local_scale(
                        node,
                        Vector3::new(
                            size.x / resource.width,
                            size.y / resource.height,
                            size.z / resource.depth,
                        ),
                    );
                } else {
                    // Uniform scale preserves aspect ratio; breadth joins the
                    // ratio only when it was declared.
                    let mut ratio = (size.x / resource.width).min(size.y / resource.height);
                    if breadth_px.is_some() {
                        ratio = ratio.min(size.z / resource.depth);
                    }
                    self.host
                        .set_local_scale(node, Vector3::new(ratio, ratio, ratio));
                    self.host.set_anchor_position(node, resource.center);
                }
            }
            NodeKind::Quad => {
                // Quads scale from their corner; offset so growth matches the
                // element's top-left-anchored box.
                self.host
                    .set_local_scale(node, Vector3::new(size.x, size.y, 0.0));
                self.host.set_local_position(
                    node,
                    Vector3::new(-size.x / 2.0, -size.y / 2.0, 0.0),
                );
            }
        }
        true
    }

    /// Recompute the placement position from the element's live box.
    fn sync_position<E: PageElement>(&mut self, el: &E, id: ElementId) {
        let bounds = el.bounds();
        let z_offset_px = el
            .attribute("z-offset")
            .map(|v| attribute_in_pixels(&v))
            .unwrap_or(DEFAULT_Z_OFFSET);

        if let Some(state) = self.bound.get_mut(&id) {
            state.last_box = bounds;
            state.z_offset_px = z_offset_px;
        }
        self.position_from_cache(id);
    }

    /// Reposition from the cached box; stage changes land here for every
    /// bound element without touching the DOM.
    pub(crate) fn position_from_cache(&mut self, id: ElementId) {
        let Some(state) = self.bound.get(&id) else {
            return;
        };
        let placement = state.placement;
        let bounds = state.last_box;
        let z_offset_px = state.z_offset_px;

        let position = element_center(
            &bounds,
            z_offset_px,
            &self.pixels,
            &self.host.viewport(),
            &self.host.stage_extent(),
        );
        self.host.set_local_position(placement, position);

        // The authoritative position moved; a stale hover delta must not be
        // restored over it.
        if let Some(state) = self.bound.get_mut(&id) {
            state.hover.reset_snapshot();
        }
    }

    /// Node visibility from computed style plus the `visibility` attribute
    /// override.
    pub(crate) fn apply_visibility<E: PageElement>(&mut self, el: &E, id: ElementId) {
        let Some(state) = self.bound.get(&id) else {
            return;
        };
        let node = state.node;
        let visible =
            is_element_visible(el) && el.attribute("visibility").as_deref() != Some("hidden");
        self.host.set_node_visible(node, visible);
    }

    /// Probe CSS for a usable box when none was declared. Observation is
    /// suspended for the duration so the style writes cannot re-trigger a
    /// mutation resync.
    fn auto_size<E: PageElement>(&mut self, el: &mut E, id: ElementId) {
        if !is_element_visible(el) || (el.client_width() != 0.0 && el.client_height() != 0.0) {
            return;
        }

        if let Some(state) = self.bound.get_mut(&id) {
            state.observing = false;
        }

        if el.client_width() == 0.0 {
            if el.client_height() > 0.0 {
                el.set_style_width(&format!("{}px", el.client_height()));
            } else {
                el.set_style_width("inherit");
            }
            if el.client_width() == 0.0 {
                el.set_style_width("auto");
            }
            if el.client_width() == 0.0 {
                el.set_style_width(&format!("{}px", el.parent_client_width()));
            }
        }

        if el.client_height() == 0.0 {
            el.set_style_height("inherit");
            if el.client_height() == 0.0 {
                el.set_style_height("auto");
            }
            if el.client_height() == 0.0 && el.client_width() > 0.0 {
                el.set_style_height(&format!("{}px", el.client_width()));
            }
        }

        if let Some(state) = self.bound.get_mut(&id) {
            state.observing = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::StubElement;
    use crate::host::{MockHost, ModelResource};
    use crate::layout::WindowMetrics;

    fn engine() -> Engine<MockHost> {
        Engine::new(
            MockHost::new(),
            WindowMetrics::new(1280.0, 720.0),
            "https://example.test/",
        )
    }

    fn resource() -> ModelResource {
        ModelResource {
            width: 2.0,
            height: 1.0,
            depth: 1.0,
            center: Vector3::new(0.0, 0.5, 0.0),
        }
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mut engine = engine();
        let mut el = StubElement::new(128.0, 64.0);
        engine
            .bind_model(&mut el, ElementId(1), resource())
            .unwrap();

        let node = engine.bound[&ElementId(1)].node;
        let placement = engine.bound[&ElementId(1)].placement;
        let scale = engine.host().node(node).unwrap().scale;
        let position = engine.host().node(placement).unwrap().position;

        engine.resync(&mut el, ElementId(1), ResyncReason::Bind);
        engine.resync(&mut el, ElementId(1), ResyncReason::Bind);

        assert_eq!(engine.host().node(node).unwrap().scale, scale);
        assert_eq!(engine.host().node(placement).unwrap().position, position);
    }

    #[test]
    fn test_uniform_scale_uses_min_ratio_and_anchor() {
        let mut engine = engine();
        let mut el = StubElement::new(128.0, 64.0);
        engine
            .bind_model(&mut el, ElementId(1), resource())
            .unwrap();

        let node = engine.bound[&ElementId(1)].node;
        let width_m = engine.pixels().pixels_to_meters(128.0);
        let height_m = engine.pixels().pixels_to_meters(64.0);
        let ratio = (width_m / 2.0).min(height_m / 1.0);

        let state = engine.host().node(node).unwrap();
        assert_eq!(state.scale, Vector3::new(ratio, ratio, ratio));
        assert_eq!(state.anchor, Vector3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_fill_scales_each_axis() {
        let mut engine = engine();
        let mut el = StubElement::new(128.0, 64.0)
            .with_attribute("fill", "true")
            .with_attribute("breadth", "32");
        engine
            .bind_model(&mut el, ElementId(1), resource())
            .unwrap();

        let node = engine.bound[&ElementId(1)].node;
        let px = engine.pixels();
        let expected = Vector3::new(
            px.pixels_to_meters(128.0) / 2.0,
            px.pixels_to_meters(64.0) / 1.0,
            px.pixels_to_meters(32.0) / 1.0,
        );
        assert_eq!(engine.host().node(node).unwrap().scale, expected);
    }

    #[test]
    fn test_quad_scale_and_corner_offset() {
        let mut engine = engine();
        let mut el = StubElement::new(100.0, 50.0);
        engine.bind_quad(&mut el, ElementId(2)).unwrap();

        let node = engine.bound[&ElementId(2)].node;
        let px = engine.pixels();
        let w = px.pixels_to_meters(100.0);
        let h = px.pixels_to_meters(50.0);

        let state = engine.host().node(node).unwrap();
        assert_eq!(state.scale, Vector3::new(w, h, 0.0));
        assert_eq!(state.position, Vector3::new(-w / 2.0, -h / 2.0, 0.0));
    }

    #[test]
    fn test_degenerate_size_writes_nothing() {
        let mut engine = engine();
        // Nothing for auto-size to find either.
        let mut el = StubElement::new(0.0, 0.0);
        el.parent_width = 0.0;
        engine
            .bind_model(&mut el, ElementId(1), resource())
            .unwrap();

        assert_eq!(engine.host().scale_writes, 0);
        assert_eq!(engine.host().position_writes, 0);
    }

    #[test]
    fn test_visibility_precedence() {
        let mut engine = engine();

        // display:none, no attribute: hidden.
        let mut el = StubElement::new(64.0, 64.0);
        el.display_none = true;
        engine
            .bind_model(&mut el, ElementId(1), resource())
            .unwrap();
        let node = engine.bound[&ElementId(1)].node;
        assert!(!engine.host().node_visible(node));

        // CSS visible, visibility="hidden" attribute: hidden.
        let mut el = StubElement::new(64.0, 64.0).with_attribute("visibility", "hidden");
        engine
            .bind_model(&mut el, ElementId(2), resource())
            .unwrap();
        let node = engine.bound[&ElementId(2)].node;
        assert!(!engine.host().node_visible(node));

        // CSS visible, no attribute: visible.
        let mut el = StubElement::new(64.0, 64.0);
        engine
            .bind_model(&mut el, ElementId(3), resource())
            .unwrap();
        let node = engine.bound[&ElementId(3)].node;
        assert!(engine.host().node_visible(node));
    }

    #[test]
    fn test_style_mutation_defers_to_visibility_attribute() {
        let mut engine = engine();
        let mut el = StubElement::new(64.0, 64.0).with_attribute("visibility", "hidden");
        engine
            .bind_model(&mut el, ElementId(1), resource())
            .unwrap();
        let node = engine.bound[&ElementId(1)].node;
        assert!(!engine.host().node_visible(node));

        // A style mutation must not resurrect the node while the attribute
        // still says hidden.
        engine.resync(&mut el, ElementId(1), ResyncReason::StyleMutation);
        assert!(!engine.host().node_visible(node));
    }

    #[test]
    fn test_auto_size_cascade_and_guard() {
        let mut engine = engine();
        let mut el = StubElement::new(0.0, 48.0);
        el.parent_width = 300.0;
        engine
            .bind_model(&mut el, ElementId(1), resource())
            .unwrap();

        // Width came from the sibling dimension.
        assert_eq!(el.client_width(), 48.0);
        assert!(el
            .style_writes
            .iter()
            .any(|(prop, value)| prop == "width" && value == "48px"));
        // Observation resumed after probing.
        assert!(engine.is_observing(ElementId(1)));
    }

    #[test]
    fn test_breadth_attribute_units() {
        let mut engine = engine();
        let mut el = StubElement::new(96.0, 96.0).with_attribute("breadth", "2.54cm");
        engine
            .bind_model(&mut el, ElementId(1), resource())
            .unwrap();

        // 2.54cm = 96px; with a cubic-ish resource the declared breadth
        // participates in the uniform ratio.
        let node = engine.bound[&ElementId(1)].node;
        let px = engine.pixels();
        let expected = (px.pixels_to_meters(96.0) / 2.0)
            .min(px.pixels_to_meters(96.0) / 1.0)
            .min(px.pixels_to_meters(attribute_in_pixels("2.54cm")) / 1.0);
        assert_eq!(engine.host().node(node).unwrap().scale.x, expected);
    }

    #[test]
    fn test_scroll_repositions_and_clears_hover_snapshot() {
        let mut engine = engine();
        let mut el = StubElement::new(128.0, 64.0);
        engine
            .bind_model(&mut el, ElementId(1), resource())
            .unwrap();

        let placement = engine.bound[&ElementId(1)].placement;
        let before = engine.host().node(placement).unwrap().position;

        el.top -= 120.0;
        engine.resync(&mut el, ElementId(1), ResyncReason::Scroll);
        let after = engine.host().node(placement).unwrap().position;
        assert!(after.y > before.y);
    }
}

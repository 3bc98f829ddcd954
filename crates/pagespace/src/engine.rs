//! The binding engine: registry, volume lifecycle and event routing
//!
//! One `Engine` per page. The embedder feeds it DOM-side triggers (bind,
//! resize, scroll, mutation, pointer, attribute changes) and host-side
//! events, and drains the outgoing element events after each call.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tracing::{debug, error};

use crate::dom::{ElementBox, ElementId, PageElement};
use crate::error::BindError;
use crate::event::{ElementEvent, PageEvent};
use crate::host::{
    HostEvent, ModelResource, NodeId, RaycastPhase, RaycastSource, SpatialHost,
};
use crate::hover::HoverState;
use crate::layout::WindowMetrics;
use crate::spatial::{Transform, Vector3};
use crate::units::PixelMetrics;

/// What kind of renderable a bound element drives
#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Model { resource: ModelResource },
    Quad,
}

/// Everything the engine owns for one bound element.
///
/// The animation transform is a child of the placement transform, which is a
/// child of the volume; the renderable node hangs off the animation
/// transform.
#[derive(Debug)]
pub(crate) struct BoundElement {
    pub kind: NodeKind,
    pub node: NodeId,
    /// Size/position layer.
    pub placement: NodeId,
    /// Relative-animation layer.
    pub animation: NodeId,
    pub hover: HoverState,
    /// Box and depth from the last sync, so stage changes can reposition
    /// without element access.
    pub last_box: ElementBox,
    pub z_offset_px: f32,
    /// False while auto-size probing writes styles, so the embedder's
    /// mutation callbacks can be ignored without feeding back.
    pub observing: bool,
    pub extractable: bool,
}

/// Why a resync is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncReason {
    /// Initial sync right after binding
    Bind,
    /// The element's own box changed size
    ElementResize,
    /// The browser window resized
    WindowResize,
    /// The page scrolled
    Scroll,
    /// A `style` or `class` mutation landed
    StyleMutation,
    /// The stage moved or resized under the volume
    StageChanged,
    /// `breadth` or `z-offset` changed
    AttributeChanged,
}

/// The DOM-to-spatial binding engine
pub struct Engine<H: SpatialHost> {
    pub(crate) host: H,
    pub(crate) pixels: PixelMetrics,
    pub(crate) window: WindowMetrics,
    pub(crate) page_url: String,
    pub(crate) bound: HashMap<ElementId, BoundElement>,
    pub(crate) events: VecDeque<ElementEvent>,
    pub(crate) stage_element: Option<ElementId>,
}

impl<H: SpatialHost> Engine<H> {
    /// Build an engine over a host. The pixel-to-meter ratio is fixed here
    /// for the lifetime of the engine.
    pub fn new(host: H, window: WindowMetrics, page_url: impl Into<String>) -> Self {
        let pixels = PixelMetrics::new(host.viewport().width, window.inner_width);
        Self {
            host,
            pixels,
            window,
            page_url: page_url.into(),
            bound: HashMap::new(),
            events: VecDeque::new(),
            stage_element: None,
        }
    }

    /// The injected host, for inspection.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The fixed pixel-to-meter conversion.
    pub fn pixels(&self) -> PixelMetrics {
        self.pixels
    }

    /// Update window metrics (pixel ratio stays fixed; follow with a
    /// window-resize resync per element).
    pub fn set_window(&mut self, window: WindowMetrics) {
        self.window = window;
    }

    /// Whether an element currently drives a node.
    pub fn is_bound(&self, id: ElementId) -> bool {
        self.bound.contains_key(&id)
    }

    /// Take everything emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<ElementEvent> {
        self.events.drain(..).collect()
    }

    pub(crate) fn emit(&mut self, element: ElementId, event: PageEvent) {
        self.events.push_back(ElementEvent { element, event });
    }

    pub(crate) fn emit_error(&mut self, element: ElementId, message: String) {
        error!(element = element.0, "{message}");
        self.emit(element, PageEvent::Error { message });
    }

    /// Bind an element to a loaded model resource.
    pub fn bind_model<E: PageElement>(
        &mut self,
        el: &mut E,
        id: ElementId,
        resource: ModelResource,
    ) -> Result<(), BindError> {
        if !resource.is_valid() {
            let src = el.attribute("src").unwrap_or_default();
            let err = BindError::InvalidResource(src);
            self.emit_error(id, err.to_string());
            return Err(err);
        }
        self.bind_node(el, id, NodeKind::Model { resource })
    }

    /// Bind an element to a flat quad.
    pub fn bind_quad<E: PageElement>(
        &mut self,
        el: &mut E,
        id: ElementId,
    ) -> Result<(), BindError> {
        self.bind_node(el, id, NodeKind::Quad)
    }

    fn bind_node<E: PageElement>(
        &mut self,
        el: &mut E,
        id: ElementId,
        kind: NodeKind,
    ) -> Result<(), BindError> {
        // One node lifecycle per element: rebinding tears down first.
        if self.bound.contains_key(&id) {
            self.unbind(id);
        }

        if let Err(err) = self.ensure_volume() {
            let err = BindError::Volume(err);
            self.emit_error(id, err.to_string());
            return Err(err);
        }

        let node = match &kind {
            NodeKind::Model { resource } => self.host.create_model(resource),
            NodeKind::Quad => self.host.create_quad(),
        }
        .map_err(|err| {
            let err = BindError::Volume(err);
            self.emit_error(id, err.to_string());
            err
        })?;

        // Hidden until sized and positioned.
        self.host.set_node_visible(node, false);

        let animation = self.host.create_transform();
        self.host.add_child(animation, node);
        let placement = self.host.create_transform();
        self.host.add_child(placement, animation);
        self.host.attach_to_volume(placement);

        let is_model = matches!(kind, NodeKind::Model { .. });
        self.bound.insert(
            id,
            BoundElement {
                kind,
                node,
                placement,
                animation,
                hover: HoverState::default(),
                last_box: ElementBox::default(),
                z_offset_px: 0.0,
                observing: true,
                extractable: false,
            },
        );

        if is_model {
            self.emit(id, PageEvent::ResourceLoaded);
        }

        self.resync(el, id, ResyncReason::Bind);
        self.sweep_attributes(el, id);
        self.apply_visibility(el, id);

        self.emit(id, PageEvent::NodeDisplayed);
        debug!(element = id.0, "node bound");
        Ok(())
    }

    /// Tear down an element's node and transforms. The volume stays.
    pub fn unbind(&mut self, id: ElementId) {
        let Some(state) = self.bound.remove(&id) else {
            return;
        };
        self.host.remove_child(state.animation, state.node);
        self.host.remove_child(state.placement, state.animation);
        self.host.detach_from_volume(state.placement);
        self.host.destroy_node(state.node);
        self.host.destroy_node(state.animation);
        self.host.destroy_node(state.placement);
        debug!(element = id.0, "node unbound");
    }

    pub(crate) fn ensure_volume(&mut self) -> Result<(), crate::host::HostError> {
        if self.host.has_volume() {
            return Ok(());
        }

        // The host cannot create a volume at full size in place; create
        // small, then move and resize.
        self.host.create_volume(0.1, 0.1, 0.1)?;

        let viewport = self.host.viewport();
        let top = viewport.height / 2.0 + viewport.top_left_y;
        self.host
            .set_volume_transform(Transform::from_position(Vector3::new(0.0, top, 0.0)));
        let size = self.host.stage_size();
        self.host.set_volume_size(size);
        self.host.set_volume_visible(true);
        Ok(())
    }

    pub(crate) fn element_for_node(&self, node: NodeId) -> Option<ElementId> {
        self.bound.iter().find_map(|(id, state)| {
            (state.node == node || state.placement == node || state.animation == node)
                .then_some(*id)
        })
    }

    /// Route one host event.
    pub fn handle_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Raycast {
                node,
                phase,
                source,
            } => {
                let Some(id) = self.element_for_node(node) else {
                    return;
                };
                let visible = self
                    .bound
                    .get(&id)
                    .is_some_and(|state| self.host.node_visible(state.node));
                if !visible {
                    return;
                }

                self.emit(id, PageEvent::NodeRaycast { phase, source });

                // Control raycasts double as synthetic pointer hover input.
                if source == RaycastSource::Control {
                    match phase {
                        RaycastPhase::Enter => self.pointer_over(id, false),
                        RaycastPhase::Exit => self.pointer_out(id, false),
                        RaycastPhase::Move => {}
                    }
                }
            }
            HostEvent::ExtractionGesture { node } => {
                if let Some(id) = self.element_for_node(node) {
                    self.emit(id, PageEvent::ExtractionRequested);
                }
            }
            HostEvent::TransformAnimationEnd { node, track } => {
                if let Some(id) = self.element_for_node(node) {
                    self.emit(id, PageEvent::TransformAnimationEnd { track });
                }
            }
            HostEvent::ModelAnimationEnd { node, animation } => {
                if let Some(id) = self.element_for_node(node) {
                    self.emit(id, PageEvent::ModelAnimationEnd { animation });
                }
            }
            HostEvent::StageChanged | HostEvent::OrientationChanged => {
                self.stage_changed();
            }
            HostEvent::StageExtentResult { state } => {
                self.finish_stage_request(state);
            }
        }
    }

    /// Advance debounce clocks. Call from the embedder's frame loop.
    pub fn tick(&mut self, dt: Duration) {
        self.tick_hover(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::StubElement;
    use crate::host::MockHost;

    fn engine() -> Engine<MockHost> {
        Engine::new(
            MockHost::new(),
            WindowMetrics::new(1280.0, 720.0),
            "https://example.test/page",
        )
    }

    fn resource() -> ModelResource {
        ModelResource {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            center: Vector3::ZERO,
        }
    }

    #[test]
    fn test_bind_creates_volume_and_chain() {
        let mut engine = engine();
        let mut el = StubElement::new(128.0, 64.0);
        engine
            .bind_model(&mut el, ElementId(1), resource())
            .unwrap();

        assert!(engine.host().has_volume());
        assert!(engine.host().volume_visible());
        // Node, animation transform, placement transform.
        assert_eq!(engine.host().node_count(), 3);

        let events: Vec<_> = engine
            .drain_events()
            .into_iter()
            .map(|e| e.event)
            .collect();
        assert!(events.contains(&PageEvent::ResourceLoaded));
        assert!(events.contains(&PageEvent::NodeDisplayed));
    }

    #[test]
    fn test_invalid_resource_is_fatal_to_element() {
        let mut engine = engine();
        let mut el = StubElement::new(128.0, 64.0);
        let bad = ModelResource {
            width: f32::NAN,
            height: 1.0,
            depth: 1.0,
            center: Vector3::ZERO,
        };
        assert!(engine.bind_model(&mut el, ElementId(1), bad).is_err());
        assert!(!engine.is_bound(ElementId(1)));

        let events = engine.drain_events();
        assert!(matches!(events[0].event, PageEvent::Error { .. }));
    }

    #[test]
    fn test_volume_failure_is_fatal_to_element() {
        let mut engine = engine();
        engine.host.fail_volume_creation = true;
        let mut el = StubElement::new(128.0, 64.0);

        assert!(engine
            .bind_model(&mut el, ElementId(1), resource())
            .is_err());
        assert!(!engine.is_bound(ElementId(1)));
        let events = engine.drain_events();
        assert!(matches!(events[0].event, PageEvent::Error { .. }));

        // A later element binds fine once the host recovers.
        engine.host.fail_volume_creation = false;
        let mut el2 = StubElement::new(128.0, 64.0);
        assert!(engine.bind_model(&mut el2, ElementId(2), resource()).is_ok());
    }

    #[test]
    fn test_unbind_leaves_volume() {
        let mut engine = engine();
        let mut el = StubElement::new(128.0, 64.0);
        engine
            .bind_model(&mut el, ElementId(1), resource())
            .unwrap();
        engine.unbind(ElementId(1));

        assert_eq!(engine.host().node_count(), 0);
        assert!(engine.host().has_volume());
        assert!(!engine.is_bound(ElementId(1)));
    }

    #[test]
    fn test_rebinding_tears_down_first() {
        let mut engine = engine();
        let mut el = StubElement::new(128.0, 64.0);
        engine
            .bind_model(&mut el, ElementId(1), resource())
            .unwrap();
        engine.bind_quad(&mut el, ElementId(1)).unwrap();
        // Old chain fully replaced.
        assert_eq!(engine.host().node_count(), 3);
    }

    #[test]
    fn test_animation_end_routed_to_element() {
        let mut engine = engine();
        let mut el = StubElement::new(128.0, 64.0);
        engine
            .bind_model(&mut el, ElementId(7), resource())
            .unwrap();
        engine.drain_events();

        let animation = engine.bound[&ElementId(7)].animation;
        engine.handle_host_event(HostEvent::TransformAnimationEnd {
            node: animation,
            track: 3,
        });

        let events = engine.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].element, ElementId(7));
        assert_eq!(
            events[0].event,
            PageEvent::TransformAnimationEnd { track: 3 }
        );
    }
}

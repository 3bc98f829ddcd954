//! Hover feedback on extractable nodes
//!
//! Pointer over/out are debounced on a 250 ms clock driven by
//! [`Engine::tick`], so rapid flips collapse into at most one host
//! animation per direction. Scale and z-move ride reserved negative tracks
//! and never collide with user-driven animations on track 0 and up.

use std::time::Duration;

use crate::dom::ElementId;
use crate::engine::Engine;
use crate::host::{ControlHaptic, SpatialHost};
use crate::spatial::Vector3;
use crate::units::{HOVER_DEBOUNCE, MOUSE_OVER_RATIO, MOUSE_OVER_Z_MOVE};

/// Duration of the hover scale/move animations, seconds.
const HOVER_ANIMATION_SECS: f32 = 0.1;

/// Reserved track for the entering animation pair's first call.
const HOVER_TRACK_A: i32 = -1;

/// Reserved track for the entering animation pair's second call.
const HOVER_TRACK_B: i32 = -2;

/// Which hover edge fired last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HoverPhase {
    Over,
    Out,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    remaining: Duration,
    trusted: bool,
}

/// Per-element hover bookkeeping
#[derive(Debug, Default)]
pub(crate) struct HoverState {
    /// Node scale before the hover grow, captured once per hover cycle.
    pub original_scale: Option<Vector3>,
    /// Placement position before the hover z-move.
    pub original_position: Option<Vector3>,
    pub last_phase: Option<HoverPhase>,
    /// Whether the last handled hover came from hardware input.
    pub last_trusted: bool,
    pending_over: Option<Pending>,
    pending_out: Option<Pending>,
}

impl HoverState {
    /// Drop captured baselines; called whenever authoritative size or
    /// position is recomputed.
    pub fn reset_snapshot(&mut self) {
        self.original_scale = None;
        self.original_position = None;
    }
}

impl<H: SpatialHost> Engine<H> {
    /// Pointer entered an extractable element. `trusted` marks hardware
    /// input as opposed to synthetic raycast-derived events.
    pub fn pointer_over(&mut self, id: ElementId, trusted: bool) {
        if let Some(state) = self.bound.get_mut(&id).filter(|s| s.extractable) {
            // Re-arming replaces any pending edge: the debounce window
            // restarts.
            state.hover.pending_over = Some(Pending {
                remaining: HOVER_DEBOUNCE,
                trusted,
            });
        }
    }

    /// Pointer left an extractable element.
    pub fn pointer_out(&mut self, id: ElementId, trusted: bool) {
        if let Some(state) = self.bound.get_mut(&id).filter(|s| s.extractable) {
            state.hover.pending_out = Some(Pending {
                remaining: HOVER_DEBOUNCE,
                trusted,
            });
        }
    }

    pub(crate) fn tick_hover(&mut self, dt: Duration) {
        let ids: Vec<ElementId> = self.bound.keys().copied().collect();
        for id in ids {
            let Some(state) = self.bound.get_mut(&id) else {
                continue;
            };

            let mut fire_over = None;
            let mut fire_out = None;

            if let Some(pending) = state.hover.pending_over.as_mut() {
                if pending.remaining <= dt {
                    fire_over = Some(pending.trusted);
                    state.hover.pending_over = None;
                } else {
                    pending.remaining -= dt;
                }
            }
            if let Some(pending) = state.hover.pending_out.as_mut() {
                if pending.remaining <= dt {
                    fire_out = Some(pending.trusted);
                    state.hover.pending_out = None;
                } else {
                    pending.remaining -= dt;
                }
            }

            if let Some(trusted) = fire_over {
                self.hover_over(id, trusted);
            }
            if let Some(trusted) = fire_out {
                self.hover_out(id, trusted);
            }
        }
    }

    fn hover_over(&mut self, id: ElementId, trusted: bool) {
        let Some(state) = self.bound.get(&id) else {
            return;
        };
        let node = state.node;
        let placement = state.placement;

        let volume_visible = self.host.has_volume() && self.host.volume_visible();
        if !volume_visible
            || !self.host.node_visible(node)
            || state.hover.last_phase == Some(HoverPhase::Over)
        {
            return;
        }

        self.host.trigger_haptic(ControlHaptic::Tick);

        let original_scale = state
            .hover
            .original_scale
            .unwrap_or_else(|| self.host.local_scale(node));
        self.host.scale_to(
            node,
            original_scale * MOUSE_OVER_RATIO,
            HOVER_ANIMATION_SECS,
            HOVER_TRACK_A,
        );

        let original_position = state
            .hover
            .original_position
            .unwrap_or_else(|| self.host.local_position(placement));
        self.host.move_to(
            placement,
            Vector3::new(
                original_position.x,
                original_position.y,
                original_position.z + MOUSE_OVER_Z_MOVE,
            ),
            HOVER_ANIMATION_SECS,
            HOVER_TRACK_B,
        );

        if let Some(state) = self.bound.get_mut(&id) {
            state.hover.original_scale = Some(original_scale);
            state.hover.original_position = Some(original_position);
            state.hover.last_phase = Some(HoverPhase::Over);
            state.hover.last_trusted = trusted;
        }
    }

    fn hover_out(&mut self, id: ElementId, trusted: bool) {
        let Some(state) = self.bound.get(&id) else {
            return;
        };
        if state.hover.last_phase != Some(HoverPhase::Over) {
            return;
        }
        // A trusted over followed by a synthetic out means the raycast left
        // while the pointer is still on the element; ignore it.
        if state.hover.last_trusted && !trusted {
            return;
        }

        let node = state.node;
        let placement = state.placement;
        let original_scale = state.hover.original_scale;
        let original_position = state.hover.original_position;

        self.host.trigger_haptic(ControlHaptic::ForceDwell);

        if let Some(position) = original_position {
            self.host
                .move_to(placement, position, HOVER_ANIMATION_SECS, HOVER_TRACK_A);
        }
        if let Some(scale) = original_scale {
            self.host
                .scale_to(node, scale, HOVER_ANIMATION_SECS, HOVER_TRACK_B);
        }

        if let Some(state) = self.bound.get_mut(&id) {
            state.hover.last_phase = Some(HoverPhase::Out);
            state.hover.last_trusted = trusted;
        }
    }

    /// Restore the pre-hover baseline immediately (used by extraction, which
    /// must start from the authoritative state).
    pub(crate) fn undo_hover(&mut self, id: ElementId) {
        let Some(state) = self.bound.get(&id) else {
            return;
        };
        let node = state.node;
        let placement = state.placement;
        let original_scale = state.hover.original_scale;
        let original_position = state.hover.original_position;

        if let Some(scale) = original_scale {
            self.host.set_local_scale(node, scale);
        }
        if let Some(position) = original_position {
            self.host.set_local_position(placement, position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::StubElement;
    use crate::host::{AnimationKind, MockHost, ModelResource};
    use crate::layout::WindowMetrics;

    fn engine_with_extractable() -> (Engine<MockHost>, ElementId) {
        let mut engine = Engine::new(
            MockHost::new(),
            WindowMetrics::new(1280.0, 720.0),
            "https://example.test/",
        );
        let mut el = StubElement::new(128.0, 64.0).with_attribute("extractable", "true");
        let resource = ModelResource {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            center: Vector3::ZERO,
        };
        engine.bind_model(&mut el, ElementId(1), resource).unwrap();
        let node = engine.bound[&ElementId(1)].node;
        engine.host.set_node_visible(node, true);
        (engine, ElementId(1))
    }

    #[test]
    fn test_hover_waits_for_debounce() {
        let (mut engine, id) = engine_with_extractable();
        let baseline = engine.host().animations.len();

        engine.pointer_over(id, true);
        engine.tick(Duration::from_millis(100));
        assert_eq!(engine.host().animations.len(), baseline);

        engine.tick(Duration::from_millis(200));
        // One scale-to plus one move-to.
        assert_eq!(engine.host().animations.len(), baseline + 2);
    }

    #[test]
    fn test_rapid_flips_coalesce() {
        let (mut engine, id) = engine_with_extractable();
        let baseline = engine.host().animations.len();

        for _ in 0..5 {
            engine.pointer_over(id, true);
            engine.tick(Duration::from_millis(50));
        }
        // Each re-arm restarted the window; nothing fired yet.
        assert_eq!(engine.host().animations.len(), baseline);

        engine.tick(HOVER_DEBOUNCE);
        assert_eq!(engine.host().animations.len(), baseline + 2);
    }

    #[test]
    fn test_hover_grows_and_moves_forward() {
        let (mut engine, id) = engine_with_extractable();
        let node = engine.bound[&id].node;
        let placement = engine.bound[&id].placement;
        let scale = engine.host().node(node).unwrap().scale;
        let position = engine.host().node(placement).unwrap().position;

        engine.pointer_over(id, true);
        engine.tick(HOVER_DEBOUNCE);

        let grown = engine.host().node(node).unwrap().scale;
        assert_eq!(grown, scale * MOUSE_OVER_RATIO);
        let moved = engine.host().node(placement).unwrap().position;
        assert_eq!(moved.z, position.z + MOUSE_OVER_Z_MOVE);

        // Second over without an out in between is a no-op.
        let count = engine.host().animations.len();
        engine.pointer_over(id, true);
        engine.tick(HOVER_DEBOUNCE);
        assert_eq!(engine.host().animations.len(), count);
    }

    #[test]
    fn test_hover_out_restores() {
        let (mut engine, id) = engine_with_extractable();
        let node = engine.bound[&id].node;
        let placement = engine.bound[&id].placement;
        let scale = engine.host().node(node).unwrap().scale;
        let position = engine.host().node(placement).unwrap().position;

        engine.pointer_over(id, true);
        engine.tick(HOVER_DEBOUNCE);
        engine.pointer_out(id, true);
        engine.tick(HOVER_DEBOUNCE);

        assert_eq!(engine.host().node(node).unwrap().scale, scale);
        assert_eq!(engine.host().node(placement).unwrap().position, position);
    }

    #[test]
    fn test_synthetic_out_cannot_cancel_trusted_over() {
        let (mut engine, id) = engine_with_extractable();
        let node = engine.bound[&id].node;

        engine.pointer_over(id, true);
        engine.tick(HOVER_DEBOUNCE);
        let grown = engine.host().node(node).unwrap().scale;

        engine.pointer_out(id, false);
        engine.tick(HOVER_DEBOUNCE);
        assert_eq!(engine.host().node(node).unwrap().scale, grown);
    }

    #[test]
    fn test_hover_uses_reserved_tracks() {
        let (mut engine, id) = engine_with_extractable();
        let baseline = engine.host().animations.len();

        engine.pointer_over(id, true);
        engine.tick(HOVER_DEBOUNCE);

        let new = &engine.host().animations[baseline..];
        assert!(new
            .iter()
            .all(|record| record.track == HOVER_TRACK_A || record.track == HOVER_TRACK_B));
        assert!(new
            .iter()
            .any(|record| matches!(record.kind, AnimationKind::ScaleTo(_))));
    }
}

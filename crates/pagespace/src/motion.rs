//! Declarative attribute application
//!
//! `set_attribute` is the single entry point for observed attribute changes
//! on a bound element; `sweep_attributes` replays whatever is already
//! declared at bind time. Transform animations land on the animation layer,
//! direct size/position sync owns the placement layer.

use tracing::error;

use crate::attr::{
    parse_animation, parse_environment_lighting, parse_model_animation, parse_rotation,
    parse_scale, AnimationSpec,
};
use crate::dom::{ElementId, PageElement};
use crate::engine::{Engine, ResyncReason};
use crate::host::SpatialHost;
use crate::layout::offset_coordinates;
use crate::spatial::{Quaternion, Vector3};
use crate::units::try_leading_float;

/// Attributes replayed at bind time, in application order.
const SWEEP: [&str; 15] = [
    "extractable",
    "color",
    "environment-lighting",
    "raycast",
    "scale",
    "model-scale",
    "quad-scale",
    "rotation",
    "model-animation",
    "spin",
    "scale-to",
    "scale-by",
    "move-to",
    "move-by",
    "rotate-to-angles",
    // rotate-by-angles is deliberately not swept: replaying a relative
    // rotation on every bind would accumulate.
];

impl<H: SpatialHost> Engine<H> {
    pub(crate) fn sweep_attributes<E: PageElement>(&mut self, el: &mut E, id: ElementId) {
        for name in SWEEP {
            if let Some(value) = el.attribute(name) {
                self.set_attribute(el, id, name, &value);
            }
        }
    }

    /// Apply one attribute change to a bound element.
    pub fn set_attribute<E: PageElement>(
        &mut self,
        el: &mut E,
        id: ElementId,
        name: &str,
        value: &str,
    ) {
        let Some(state) = self.bound.get(&id) else {
            return;
        };
        let node = state.node;
        let animation = state.animation;

        match name {
            "extractable" => {
                if let Some(state) = self.bound.get_mut(&id) {
                    state.extractable = value != "false";
                }
            }
            "color" => {
                if value.is_empty() {
                    self.host.set_model_color(node, Some("#FFFFFF"));
                } else {
                    self.host.set_model_color(node, Some(value));
                }
            }
            "environment-lighting" => {
                if let Some(lighting) = parse_environment_lighting(value) {
                    if let Some(intensity) = lighting.color_intensity {
                        self.host.set_color_intensity(node, intensity);
                    }
                    if let Some(strength) = lighting.bloom_strength {
                        self.host.set_volume_bloom_strength(strength);
                    }
                }
            }
            "raycast" => {
                self.host.set_skip_raycast(node, value != "true");
            }
            "visibility" => {
                self.apply_visibility(el, id);
            }
            "scale" | "model-scale" | "quad-scale" => {
                if let Some(scale) = parse_scale(value) {
                    self.host.set_local_scale(animation, scale);
                    self.reset_hover_snapshot(id);
                }
            }
            "rotation" => {
                if let Some([x, y, z]) = parse_rotation(value) {
                    self.host
                        .set_local_rotation(animation, Quaternion::from_euler(x, y, z));
                }
            }
            "model-animation" => {
                if let Some(spec) = parse_model_animation(value) {
                    self.host
                        .play_animation(node, &spec.name, spec.paused, spec.iterations);
                    if let Some(speed) = el
                        .attribute("model-animation-speed")
                        .and_then(|v| try_leading_float(&v))
                    {
                        self.host.set_animation_speed(node, speed);
                    }
                }
            }
            "model-animation-speed" => {
                if let Some(speed) = try_leading_float(value) {
                    self.host.set_animation_speed(node, speed);
                }
            }
            "spin" => {
                if let Some(spec) = parse_animation(value, true) {
                    if let Some(axes) = spec.axes {
                        self.host.spin(
                            animation,
                            Vector3::from_array(axes),
                            spec.rate,
                            spec.duration,
                            spec.track,
                        );
                        self.host.request_animation_callback(animation, spec.track);
                    }
                }
            }
            "scale-to" => {
                if let Some((axes, spec)) = parse_axes_animation(value) {
                    self.host
                        .scale_to(animation, axes, spec.duration, spec.track);
                    self.host.request_animation_callback(animation, spec.track);
                    self.reset_hover_snapshot(id);
                }
            }
            "scale-by" => {
                if let Some((axes, spec)) = parse_axes_animation(value) {
                    self.host
                        .scale_by(animation, axes, spec.duration, spec.track);
                    self.host.request_animation_callback(animation, spec.track);
                    self.reset_hover_snapshot(id);
                }
            }
            "move-to" => {
                if let Some(spec) = parse_animation(value, false) {
                    let tokens: Option<Vec<String>> = spec
                        .offset
                        .clone()
                        .or_else(|| spec.axes.map(|a| a.iter().map(f32::to_string).collect()));
                    if let Some(tokens) = tokens {
                        let placement = self.placement_of(id);
                        let current = self.host.local_position(placement);
                        let destination = offset_coordinates(
                            &tokens,
                            current,
                            &self.pixels,
                            &self.host.viewport(),
                            &self.window,
                            &self.host.stage_extent(),
                        );
                        self.host
                            .move_to(animation, destination, spec.duration, spec.track);
                        self.host.request_animation_callback(animation, spec.track);
                    }
                }
            }
            "move-by" => {
                if let Some(spec) = parse_animation(value, false) {
                    match spec.axes {
                        Some(axes) => {
                            let delta = Vector3::new(
                                self.pixels.pixels_to_meters(axes[0]),
                                self.pixels.pixels_to_meters(axes[1]),
                                self.pixels.pixels_to_meters(axes[2]),
                            );
                            self.host.move_by(animation, delta, spec.duration, spec.track);
                            self.host.request_animation_callback(animation, spec.track);
                            self.reset_hover_snapshot(id);
                        }
                        None => error!("Invalid axis values used for animation attribute."),
                    }
                }
            }
            "rotate-to-angles" => {
                if let Some((rotation, spec)) = parse_angles_animation(value) {
                    self.host
                        .rotate_to(animation, rotation, spec.duration, spec.track);
                    self.host.request_animation_callback(animation, spec.track);
                }
            }
            "rotate-by-angles" => {
                if let Some((rotation, spec)) = parse_angles_animation(value) {
                    self.host
                        .rotate_by(animation, rotation, spec.duration, spec.track);
                    self.host.request_animation_callback(animation, spec.track);
                }
            }
            "breadth" | "z-offset" => {
                self.resync(el, id, ResyncReason::AttributeChanged);
            }
            // Extraction inputs are read when the extraction runs.
            "extracted-size" | "extracted-scale" | "extracted-link" => {}
            _ => {}
        }
    }

    fn placement_of(&self, id: ElementId) -> crate::host::NodeId {
        self.bound
            .get(&id)
            .map(|state| state.placement)
            .unwrap_or(crate::host::NodeId(0))
    }

    fn reset_hover_snapshot(&mut self, id: ElementId) {
        if let Some(state) = self.bound.get_mut(&id) {
            state.hover.reset_snapshot();
        }
    }
}

fn parse_axes_animation(value: &str) -> Option<(Vector3, AnimationSpec)> {
    let spec = parse_animation(value, false)?;
    let axes = spec.axes?;
    Some((Vector3::from_array(axes), spec))
}

fn parse_angles_animation(value: &str) -> Option<(Quaternion, AnimationSpec)> {
    let spec = parse_animation(value, false)?;
    let [x, y, z] = spec.angles?;
    Some((Quaternion::from_euler(x, y, z), spec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::StubElement;
    use crate::host::{AnimationKind, MockHost, ModelResource};
    use crate::layout::WindowMetrics;

    fn bound_engine() -> (Engine<MockHost>, StubElement, ElementId) {
        let mut engine = Engine::new(
            MockHost::new(),
            WindowMetrics::new(1280.0, 720.0),
            "https://example.test/",
        );
        let mut el = StubElement::new(128.0, 64.0);
        let resource = ModelResource {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
            center: Vector3::ZERO,
        };
        engine.bind_model(&mut el, ElementId(1), resource).unwrap();
        (engine, el, ElementId(1))
    }

    #[test]
    fn test_scale_attribute_sets_animation_layer() {
        let (mut engine, mut el, id) = bound_engine();
        engine.set_attribute(&mut el, id, "model-scale", "2 2 2");

        let animation = engine.bound[&id].animation;
        assert_eq!(
            engine.host().node(animation).unwrap().scale,
            Vector3::new(2.0, 2.0, 2.0)
        );
    }

    #[test]
    fn test_rotation_attribute() {
        let (mut engine, mut el, id) = bound_engine();
        engine.set_attribute(&mut el, id, "rotation", "0 90deg 0");

        let animation = engine.bound[&id].animation;
        let expected = Quaternion::from_euler(0.0, std::f32::consts::PI / 2.0, 0.0);
        assert_eq!(engine.host().node(animation).unwrap().rotation, expected);
    }

    #[test]
    fn test_move_to_symbolic_offset() {
        let (mut engine, mut el, id) = bound_engine();
        engine.set_attribute(
            &mut el,
            id,
            "move-to",
            "offset: left top 0; duration: 2; track: 4",
        );

        let animation = engine.bound[&id].animation;
        let record = engine
            .host()
            .animations
            .iter()
            .find(|r| r.node == animation)
            .unwrap();
        assert_eq!(record.track, 4);
        assert_eq!(record.duration, 2.0);
        assert!(matches!(record.kind, AnimationKind::MoveTo(_)));
        // A completion callback was requested on the same track.
        assert!(engine
            .host()
            .animation_callbacks
            .contains(&(animation, 4)));
    }

    #[test]
    fn test_move_by_converts_pixels() {
        let (mut engine, mut el, id) = bound_engine();
        engine.set_attribute(&mut el, id, "move-by", "axes: 100 0 0; duration: 1; track: 0");

        let animation = engine.bound[&id].animation;
        let record = engine
            .host()
            .animations
            .iter()
            .find(|r| r.node == animation)
            .unwrap();
        let expected = engine.pixels().pixels_to_meters(100.0);
        assert_eq!(record.kind, AnimationKind::MoveBy(Vector3::new(expected, 0.0, 0.0)));
    }

    #[test]
    fn test_malformed_attribute_leaves_state() {
        let (mut engine, mut el, id) = bound_engine();
        let animation = engine.bound[&id].animation;
        let before = engine.host().node(animation).unwrap().scale;

        engine.set_attribute(&mut el, id, "model-scale", "1 2");
        assert_eq!(engine.host().node(animation).unwrap().scale, before);
    }

    #[test]
    fn test_model_animation_with_speed() {
        let (mut engine, mut el, id) = bound_engine();
        el.set_attribute("model-animation-speed", "2");
        engine.set_attribute(&mut el, id, "model-animation", "name: run; iterations: 3");

        let node = engine.bound[&id].node;
        let state = engine.host().node(node).unwrap();
        assert_eq!(state.playing, Some(("run".to_string(), false, 3)));
        assert_eq!(state.animation_speed, 2.0);
    }

    #[test]
    fn test_raycast_toggle() {
        let (mut engine, mut el, id) = bound_engine();
        let node = engine.bound[&id].node;

        engine.set_attribute(&mut el, id, "raycast", "false");
        assert!(engine.host().node(node).unwrap().skip_raycast);

        engine.set_attribute(&mut el, id, "raycast", "true");
        assert!(!engine.host().node(node).unwrap().skip_raycast);
    }

    #[test]
    fn test_spin() {
        let (mut engine, mut el, id) = bound_engine();
        engine.set_attribute(
            &mut el,
            id,
            "spin",
            "axes: 0 1 0; rate: 90deg; duration: 10; track: 2",
        );

        let animation = engine.bound[&id].animation;
        let record = engine
            .host()
            .animations
            .iter()
            .find(|r| r.node == animation)
            .unwrap();
        match record.kind {
            AnimationKind::Spin { axis, rate } => {
                assert_eq!(axis, Vector3::new(0.0, 1.0, 0.0));
                assert!((rate - std::f32::consts::PI / 2.0).abs() < 1e-5);
            }
            _ => panic!("expected spin"),
        }
    }
}

//! Parsing for the declarative attribute surface
//!
//! All parsers are lenient the same way: a missing secondary parameter gets
//! a documented default plus a warning, while a malformed required shape
//! logs an error and yields `None` so the caller leaves prior state alone.

use regex::Regex;
use tracing::{error, warn};

use crate::spatial::Vector3;
use crate::units::degrees_to_radians;

/// Default animation duration in seconds.
pub const DEFAULT_DURATION: f32 = 60.0;

/// Default animation track.
pub const DEFAULT_TRACK: i32 = 0;

/// Default spin rate, 60 degrees per second in radians.
pub const DEFAULT_SPIN_RATE: f32 = 1.0472;

/// A parsed transform-animation attribute (`move-to`, `scale-by`, `spin`, ...)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationSpec {
    /// Numeric per-axis values (`axes: 0.1 0 0.2`).
    pub axes: Option<[f32; 3]>,
    /// Per-axis angles in radians (`angles: 45deg 0 0`).
    pub angles: Option<[f32; 3]>,
    /// Raw offset tokens; may be symbolic (`offset: center top 100`).
    pub offset: Option<Vec<String>>,
    pub duration: f32,
    pub track: i32,
    /// Spin rate in radians per second.
    pub rate: f32,
}

/// A parsed `model-animation` attribute
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAnimation {
    pub name: String,
    pub paused: bool,
    pub iterations: i32,
}

/// A parsed `environment-lighting` attribute
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnvironmentLighting {
    pub color_intensity: Option<f32>,
    pub bloom_strength: Option<f32>,
}

fn numbers_in(value: &str) -> Vec<f32> {
    let Some(re) = Regex::new(r"[+-]?\d+(\.\d+)?").ok() else {
        return Vec::new();
    };
    re.find_iter(value)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

fn three(values: &[f32]) -> Option<[f32; 3]> {
    (values.len() == 3).then(|| [values[0], values[1], values[2]])
}

/// Split a freeform numeric list (`rotation`, `scale` values): every run of
/// characters outside `0-9 . -` separates numbers.
fn numeric_list(value: &str) -> Vec<f32> {
    let Some(re) = Regex::new(r"[^\d.-]+").ok() else {
        return Vec::new();
    };
    re.split(value.trim())
        .filter_map(|t| t.parse().ok())
        .collect()
}

/// Parse a `name:value;` animation attribute.
///
/// Accepts `axes`, `angles`, `offset`, `duration`, `track` and, for spin,
/// `angle`/`rate`. Exactly one of axes/angles/offset must carry three values.
pub fn parse_animation(value: &str, spin: bool) -> Option<AnimationSpec> {
    let lowered = value.to_lowercase();

    let mut axes: Option<[f32; 3]> = None;
    let mut angles: Option<[f32; 3]> = None;
    let mut offset: Option<Vec<String>> = None;
    let mut duration: Option<f32> = None;
    let mut track: Option<f32> = None;
    let mut rate: Option<f32> = None;

    for pair in lowered.split(';') {
        let mut parts = pair.splitn(2, ':');
        let (Some(name), Some(raw)) = (parts.next(), parts.next()) else {
            continue;
        };
        let name = name.trim();
        let raw = raw.trim();

        if name == "offset" {
            let tokens: Vec<String> = raw
                .split([' ', ',', '\n', '\r', '\t'])
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            offset = Some(tokens);
            continue;
        }

        let numbers = numbers_in(raw);
        if numbers.is_empty() {
            continue;
        }

        match name {
            "axes" => axes = three(&numbers),
            "angles" => {
                if let Some(mut parsed) = three(&numbers) {
                    // Angles count as degrees only when each nonzero axis
                    // carries its own `deg` suffix.
                    let zero_count = parsed.iter().filter(|v| **v == 0.0).count();
                    if raw.matches("deg").count() >= 3 - zero_count {
                        parsed = parsed.map(degrees_to_radians);
                    }
                    angles = Some(parsed);
                }
            }
            "duration" => duration = Some(numbers[0]),
            "track" => track = Some(numbers[0]),
            "angle" | "rate" if spin => {
                let mut parsed = numbers[0];
                if raw.contains("deg") {
                    parsed = degrees_to_radians(parsed);
                }
                rate = Some(parsed);
            }
            _ => {}
        }
    }

    if axes.is_none() && angles.is_none() && offset.as_ref().map_or(true, |o| o.len() != 3) {
        error!("Invalid axes value used for animation attribute.");
        return None;
    }

    let duration = duration.unwrap_or_else(|| {
        warn!("No duration value in animation attribute. Default value of 60 seconds used.");
        DEFAULT_DURATION
    });

    let track = match track {
        Some(t) if t.fract() == 0.0 => t as i32,
        _ => {
            warn!("No track value in animation attribute. Default value of 0 used.");
            DEFAULT_TRACK
        }
    };

    let rate = if spin {
        rate.unwrap_or_else(|| {
            warn!(
                "No angle rate value in spin animation attribute. \
                 Default value of 60 degrees per second used."
            );
            DEFAULT_SPIN_RATE
        })
    } else {
        0.0
    };

    Some(AnimationSpec {
        axes,
        angles,
        offset,
        duration,
        track,
        rate,
    })
}

/// Parse a `rotation` attribute into per-axis radians.
pub fn parse_rotation(value: &str) -> Option<[f32; 3]> {
    let mut values = numeric_list(value);
    if value.to_lowercase().contains("deg") {
        values = values.into_iter().map(degrees_to_radians).collect();
    }

    match three(&values) {
        Some(angles) => Some(angles),
        None => {
            error!("Invalid values used for rotation attribute.");
            None
        }
    }
}

/// Parse a direct `scale` / `model-scale` / `quad-scale` attribute.
pub fn parse_scale(value: &str) -> Option<Vector3> {
    match three(&numeric_list(value)) {
        Some(s) => Some(Vector3::from_array(s)),
        None => {
            error!("Invalid values used for scale attribute.");
            None
        }
    }
}

/// Parse a `model-animation` attribute.
///
/// Either `name:run;paused:true;iterations:3` or positional `run, true, 3`.
pub fn parse_model_animation(value: &str) -> Option<ModelAnimation> {
    const PROPS: [&str; 3] = ["name", "paused", "iterations"];

    let mut fields: [Option<String>; 3] = [None, None, None];
    for (i, part) in value.split([';', ',']).enumerate() {
        let mut kv = part.splitn(2, ':');
        let first = kv.next().map(str::trim).unwrap_or_default();
        match kv.next() {
            Some(v) => {
                if let Some(slot) = PROPS.iter().position(|p| *p == first) {
                    fields[slot] = Some(v.trim().to_string());
                }
            }
            None => {
                if i < 3 && !first.is_empty() {
                    fields[i] = Some(first.to_string());
                }
            }
        }
    }

    let [name, paused, iterations] = fields;

    let Some(name) = name.filter(|n| !n.is_empty()) else {
        error!("No animation name found in animation attribute.");
        return None;
    };

    let paused = match paused {
        Some(p) => !matches!(p.as_str(), "false" | "no" | "0" | ""),
        None => {
            warn!("Invalid paused value for animation attribute. Default value of false used.");
            false
        }
    };

    let iterations = match iterations.and_then(|i| i.parse().ok()) {
        Some(i) => i,
        None => {
            warn!(
                "Invalid iterations value for model-animation attribute. Default value of -1 used."
            );
            -1
        }
    };

    Some(ModelAnimation {
        name,
        paused,
        iterations,
    })
}

/// Parse an `environment-lighting` attribute.
pub fn parse_environment_lighting(value: &str) -> Option<EnvironmentLighting> {
    let mut lighting = EnvironmentLighting::default();

    for pair in value.split(';') {
        let mut parts = pair.splitn(2, ':');
        let (Some(name), Some(raw)) = (parts.next(), parts.next()) else {
            continue;
        };
        match name.trim() {
            "color-intensity" => lighting.color_intensity = raw.trim().parse().ok(),
            "bloom-strength" => lighting.bloom_strength = raw.trim().parse().ok(),
            _ => {}
        }
    }

    if lighting.color_intensity.is_none() && lighting.bloom_strength.is_none() {
        error!(
            "Invalid values used for environment lighting attribute. \
             Make sure to specify color-intensity or bloom-strength."
        );
        return None;
    }

    Some(lighting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_axes_with_defaults() {
        let spec = parse_animation("axes: 0.1 0 -0.2", false).unwrap();
        assert_eq!(spec.axes, Some([0.1, 0.0, -0.2]));
        assert_eq!(spec.duration, DEFAULT_DURATION);
        assert_eq!(spec.track, DEFAULT_TRACK);
    }

    #[test]
    fn test_full_spec() {
        let spec = parse_animation("axes: 1, 2, 3; duration: 5; track: 2", false).unwrap();
        assert_eq!(spec.axes, Some([1.0, 2.0, 3.0]));
        assert_eq!(spec.duration, 5.0);
        assert_eq!(spec.track, 2);
    }

    #[test]
    fn test_offset_keeps_tokens() {
        let spec = parse_animation("offset: center top 100; duration: 1", false).unwrap();
        assert_eq!(
            spec.offset,
            Some(vec!["center".into(), "top".into(), "100".into()])
        );
    }

    #[test]
    fn test_angles_degrees() {
        let spec = parse_animation("angles: 90deg 0 0; duration: 1; track: 0", false).unwrap();
        let angles = spec.angles.unwrap();
        assert!((angles[0] - PI / 2.0).abs() < 1e-5);
        assert_eq!(angles[1], 0.0);
    }

    #[test]
    fn test_wrong_token_count_rejected() {
        assert!(parse_animation("axes: 1 2", false).is_none());
        assert!(parse_animation("offset: center top", false).is_none());
        assert!(parse_animation("duration: 3", false).is_none());
    }

    #[test]
    fn test_spin_rate_default_and_deg() {
        let spec = parse_animation("axes: 0 1 0; duration: 10; track: 1", true).unwrap();
        assert!((spec.rate - DEFAULT_SPIN_RATE).abs() < 1e-6);

        let spec = parse_animation("axes: 0 1 0; rate: 90deg; duration: 1; track: 0", true)
            .unwrap();
        assert!((spec.rate - PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_parse() {
        let r = parse_rotation("0.1 0.2 0.3").unwrap();
        assert_eq!(r, [0.1, 0.2, 0.3]);

        let r = parse_rotation("90deg 0deg 0deg").unwrap();
        assert!((r[0] - PI / 2.0).abs() < 1e-5);

        assert!(parse_rotation("1 2").is_none());
    }

    #[test]
    fn test_scale_parse() {
        assert_eq!(
            parse_scale("1 2 0.5"),
            Some(Vector3::new(1.0, 2.0, 0.5))
        );
        assert!(parse_scale("oops").is_none());
    }

    #[test]
    fn test_model_animation_forms() {
        let a = parse_model_animation("name: run; paused: true; iterations: 3").unwrap();
        assert_eq!(a.name, "run");
        assert!(a.paused);
        assert_eq!(a.iterations, 3);

        let b = parse_model_animation("walk, false, 2").unwrap();
        assert_eq!(b.name, "walk");
        assert!(!b.paused);
        assert_eq!(b.iterations, 2);

        let c = parse_model_animation("idle").unwrap();
        assert!(!c.paused);
        assert_eq!(c.iterations, -1);

        assert!(parse_model_animation("").is_none());
    }

    #[test]
    fn test_environment_lighting() {
        let l = parse_environment_lighting("color-intensity: 3; bloom-strength: 0.5").unwrap();
        assert_eq!(l.color_intensity, Some(3.0));
        assert_eq!(l.bloom_strength, Some(0.5));

        assert!(parse_environment_lighting("shadow: 1").is_none());
    }
}

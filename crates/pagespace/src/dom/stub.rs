//! In-memory element stub backing unit tests and the demo app

use std::collections::HashMap;

use super::PageElement;

/// A [`PageElement`] with plain fields instead of a live document.
///
/// Style writes emulate just enough CSS resolution for the auto-size probe:
/// a `<n>px` value sets the dimension, `inherit`/`auto` resolve to the
/// configurable `inherit_*`/`auto_*` fields (zero by default, as for an
/// unstyled block with no content).
#[derive(Debug, Clone, Default)]
pub struct StubElement {
    pub width: f32,
    pub height: f32,
    pub left: f32,
    pub top: f32,
    pub display_none: bool,
    pub visibility_hidden: bool,
    pub hidden: bool,
    pub parent_width: f32,
    pub inherit_width: f32,
    pub inherit_height: f32,
    pub auto_width: f32,
    pub auto_height: f32,
    attributes: HashMap<String, String>,
    /// Style values written by the engine, most recent last.
    pub style_writes: Vec<(String, String)>,
}

impl StubElement {
    /// Create a visible element with the given client box size.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            parent_width: width,
            ..Self::default()
        }
    }

    /// Set an attribute, builder style.
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Set or replace an attribute.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    /// Remove an attribute.
    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    fn resolve(value: &str, inherit: f32, auto: f32, current: f32) -> f32 {
        match value {
            "inherit" => inherit,
            "auto" => auto,
            _ => value
                .strip_suffix("px")
                .and_then(|n| n.parse().ok())
                .unwrap_or(current),
        }
    }
}

impl PageElement for StubElement {
    fn client_width(&self) -> f32 {
        self.width
    }

    fn client_height(&self) -> f32 {
        self.height
    }

    fn bounding_left(&self) -> f32 {
        self.left
    }

    fn bounding_top(&self) -> f32 {
        self.top
    }

    fn display_none(&self) -> bool {
        self.display_none
    }

    fn visibility_hidden(&self) -> bool {
        self.visibility_hidden
    }

    fn hidden(&self) -> bool {
        self.hidden
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn set_style_width(&mut self, value: &str) {
        self.style_writes.push(("width".into(), value.into()));
        self.width = Self::resolve(value, self.inherit_width, self.auto_width, self.width);
    }

    fn set_style_height(&mut self, value: &str) {
        self.style_writes.push(("height".into(), value.into()));
        self.height = Self::resolve(value, self.inherit_height, self.auto_height, self.height);
    }

    fn parent_client_width(&self) -> f32 {
        self.parent_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_px_write() {
        let mut el = StubElement::new(0.0, 40.0);
        el.set_style_width("64px");
        assert_eq!(el.client_width(), 64.0);
        assert_eq!(el.style_writes.len(), 1);
    }

    #[test]
    fn test_inherit_resolution() {
        let mut el = StubElement::new(0.0, 0.0);
        el.inherit_height = 32.0;
        el.set_style_height("inherit");
        assert_eq!(el.client_height(), 32.0);
    }

    #[test]
    fn test_attributes() {
        let el = StubElement::new(10.0, 10.0).with_attribute("breadth", "50");
        assert_eq!(el.attribute("breadth").as_deref(), Some("50"));
        assert_eq!(el.attribute("z-offset"), None);
    }
}

//! Volume placement against the physical stage
//!
//! The volume tracks the host's reported stage boundaries and the page
//! orientation; a stage-extent request is asynchronous and terminally
//! granted, denied or errored, and the volume is revealed again on every
//! path out.

use tracing::{error, warn};

use crate::dom::{ElementId, PageElement};
use crate::engine::Engine;
use crate::error::BindError;
use crate::event::PageEvent;
use crate::host::{PageOrientation, SpatialHost, StageExtent, StageRequestState};
use crate::spatial::{Quaternion, Transform, Vector3};
use crate::units::{degrees_to_radians, try_leading_float, PixelMetrics};

/// Merge an `extents` attribute (`top:0.5;left:30cm;back:100px`) over the
/// current extent. Values without a recognized unit are meters already.
fn parse_extents(value: &str, current: StageExtent, pixels: PixelMetrics) -> StageExtent {
    let mut extent = current;

    for pair in value.to_lowercase().split(';') {
        let mut kv = pair.split(':');
        let (Some(name), Some(raw), None) = (kv.next(), kv.next(), kv.next()) else {
            continue;
        };

        let Some(number) = try_leading_float(raw).filter(|n| *n != 0.0) else {
            continue;
        };
        let unit: String = raw.chars().filter(|c| c.is_ascii_alphabetic()).collect();
        let meters = match unit.as_str() {
            "cm" => number * 0.01,
            "px" => pixels.pixels_to_meters(number),
            _ => number,
        };

        match name.trim() {
            "top" => extent.top = meters,
            "right" => extent.right = meters,
            "bottom" => extent.bottom = meters,
            "left" => extent.left = meters,
            "front" => extent.front = meters,
            "back" => extent.back = meters,
            _ => {}
        }
    }

    extent
}

impl<H: SpatialHost> Engine<H> {
    /// Re-place and re-size the volume after a stage or orientation change,
    /// then reposition every bound node from its cached box.
    pub(crate) fn stage_changed(&mut self) {
        if !self.host.has_volume() {
            return;
        }

        // Hidden while it jumps.
        self.host.set_volume_visible(false);

        let extent = self.host.stage_extent();
        let viewport = self.host.viewport();

        let transform = match self.host.orientation() {
            PageOrientation::Flat => Transform::from_position_rotation(
                Vector3::new(
                    (extent.right - extent.left) / 2.0,
                    viewport.top_left_y + (extent.front - extent.back) / 2.0,
                    (extent.bottom - extent.top) / 2.0,
                ),
                Quaternion::from_axis_angle(Vector3::RIGHT, degrees_to_radians(-90.0)),
            ),
            PageOrientation::Upright => Transform::from_position(Vector3::new(
                (extent.right - extent.left) / 2.0,
                viewport.height / 2.0 + viewport.top_left_y + (extent.top - extent.bottom) / 2.0,
                (extent.front - extent.back) / 2.0,
            )),
        };

        self.host.set_volume_transform(transform);
        let size = self.host.stage_size();
        self.host.set_volume_size(size);
        self.host.set_volume_visible(true);

        let ids: Vec<ElementId> = self.bound.keys().copied().collect();
        for id in ids {
            self.position_from_cache(id);
        }
    }

    /// Ask the host for the working volume declared by a stage element's
    /// `extents` attribute. The outcome arrives as a host event.
    pub fn request_stage_extents<E: PageElement>(&mut self, el: &E, id: ElementId) {
        let Some(value) = el.attribute("extents").filter(|v| !v.trim().is_empty()) else {
            warn!("No stage extents attribute provided.");
            return;
        };

        if !self.host.has_volume() {
            self.host.reset_stage_extent();
            if let Err(err) = self.ensure_volume() {
                self.emit_error(id, BindError::Volume(err).to_string());
                return;
            }
        }

        let extent = parse_extents(&value, self.host.stage_extent(), self.pixels);

        // Hidden across the resize; finish_stage_request reveals it again.
        self.host.set_volume_visible(false);
        self.stage_element = Some(id);
        self.host.request_stage_extent(extent);
    }

    pub(crate) fn finish_stage_request(&mut self, state: StageRequestState) {
        let element = self.stage_element.take();

        match state {
            StageRequestState::Granted => {
                if let Some(id) = element {
                    self.emit(id, PageEvent::StageGranted);
                }
            }
            StageRequestState::Denied => {
                if let Some(id) = element {
                    self.emit(id, PageEvent::StageDenied);
                }
                error!("Permission requesting new stage's extents has not been granted.");
            }
            StageRequestState::Errored(message) => {
                error!("There was an error requesting the new stage's extents. Error: {message}");
            }
        }

        // The volume is shared by every bound element; it comes back no
        // matter how the request ended.
        self.host.set_volume_visible(true);
    }
}

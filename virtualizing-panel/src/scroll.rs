use alloc::rc::Rc;

use crate::float;
use crate::{Orientation, Point, Size};

/// The party that renders the offsets a panel publishes (typically a scroll viewer).
///
/// The relationship is observer-only: the panel writes [`ScrollData`] and calls
/// [`ScrollOwner::invalidate_scroll_info`] when something the owner shows actually changed.
pub trait ScrollOwner {
    fn invalidate_scroll_info(&self);

    /// Current zoom applied by the owner to the panel's content.
    fn zoom_factor(&self) -> f64 {
        1.0
    }

    /// Whether a direct-manipulation zoom gesture is in flight. While it is, a layout pass only
    /// re-measures what is already realized.
    fn is_in_direct_manipulation_zoom(&self) -> bool {
        false
    }

    /// Whether the owner is re-measuring because a child invalidated its measure.
    fn is_in_child_invalidate_measure(&self) -> bool {
        false
    }

    /// Called after an arrange pass that followed a scroll-into-view correction.
    fn notify_layout_refreshed(&self) {}
}

/// Scroll values published to the [`ScrollOwner`].
///
/// Along the stacking axis offset, viewport and extent are logical (lines); across it they are
/// pixels.
#[derive(Default)]
pub struct ScrollData {
    pub offset: Point,
    /// The offset the last layout pass actually used, after coercion.
    pub computed_offset: Point,
    pub min_offset: Point,
    pub viewport: Size,
    pub extent: Size,
    /// Desired-size floor reported while scrolling; reset when items change or the available
    /// size shrinks.
    pub max_desired_size: Size,
    pub can_horizontally_scroll: bool,
    pub can_vertically_scroll: bool,
    pub(crate) owner: Option<Rc<dyn ScrollOwner>>,
    pub(crate) has_layout: bool,
}

impl core::fmt::Debug for ScrollData {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollData")
            .field("offset", &self.offset)
            .field("computed_offset", &self.computed_offset)
            .field("min_offset", &self.min_offset)
            .field("viewport", &self.viewport)
            .field("extent", &self.extent)
            .field("max_desired_size", &self.max_desired_size)
            .field("can_horizontally_scroll", &self.can_horizontally_scroll)
            .field("can_vertically_scroll", &self.can_vertically_scroll)
            .field("owner", &self.owner.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

impl ScrollData {
    pub fn owner(&self) -> Option<&Rc<dyn ScrollOwner>> {
        self.owner.as_ref()
    }

    /// Clears everything except the owner and the scroll permissions.
    pub(crate) fn clear_layout(&mut self) {
        self.offset = Point::ZERO;
        self.computed_offset = Point::ZERO;
        self.viewport = Size::ZERO;
        self.extent = Size::ZERO;
        self.max_desired_size = Size::ZERO;
        self.has_layout = false;
    }

    pub fn offset_along(&self, orientation: Orientation) -> f64 {
        orientation.point_main(self.offset)
    }

    pub(crate) fn set_offset_along(&mut self, orientation: Orientation, value: f64) {
        match orientation {
            Orientation::Horizontal => self.offset.x = value,
            Orientation::Vertical => self.offset.y = value,
        }
    }

    pub fn can_scroll_along(&self, orientation: Orientation) -> bool {
        match orientation {
            Orientation::Horizontal => self.can_horizontally_scroll,
            Orientation::Vertical => self.can_vertically_scroll,
        }
    }

    pub(crate) fn zoom_factor(&self) -> f64 {
        let zoom = self.owner.as_ref().map_or(1.0, |o| o.zoom_factor());
        if zoom > 0.0 { zoom } else { 1.0 }
    }

    pub(crate) fn is_in_direct_manipulation_zoom(&self) -> bool {
        self.owner
            .as_ref()
            .is_some_and(|o| o.is_in_direct_manipulation_zoom())
    }

    pub(crate) fn is_in_child_invalidate_measure(&self) -> bool {
        self.owner
            .as_ref()
            .is_some_and(|o| o.is_in_child_invalidate_measure())
    }

    /// Stores the results of a layout pass, notifying the owner only when viewport, extent or the
    /// computed offset moved.
    pub(crate) fn set_and_verify(&mut self, viewport: Size, extent: Size, offset: Point) {
        let changed = !size_close(self.viewport, viewport)
            || !size_close(self.extent, extent)
            || !point_close(self.computed_offset, offset);

        self.offset = offset;
        self.has_layout = true;

        if changed {
            self.viewport = viewport;
            self.extent = extent;
            self.computed_offset = offset;
            vtrace!(
                viewport_w = viewport.width,
                viewport_h = viewport.height,
                extent_w = extent.width,
                extent_h = extent.height,
                "scroll info changed"
            );
            if let Some(owner) = &self.owner {
                owner.invalidate_scroll_info();
            }
        }
    }

    pub fn snapshot(&self) -> ScrollSnapshot {
        ScrollSnapshot {
            offset: self.offset,
            computed_offset: self.computed_offset,
            viewport: self.viewport,
            extent: self.extent,
        }
    }
}

fn size_close(a: Size, b: Size) -> bool {
    float::are_close(a.width, b.width) && float::are_close(a.height, b.height)
}

fn point_close(a: Point, b: Point) -> bool {
    float::are_close(a.x, b.x) && float::are_close(a.y, b.y)
}

/// A copy of the published scroll values.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollSnapshot {
    pub offset: Point,
    pub computed_offset: Point,
    pub viewport: Size,
    pub extent: Size,
}

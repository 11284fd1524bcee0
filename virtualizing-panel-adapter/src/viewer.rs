use core::cell::Cell;

use virtualizing_panel::{Orientation, ScrollOwner};

/// One scroll bar, in screen pixels.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollBarState {
    pub offset: f64,
    pub viewport: f64,
    pub extent: f64,
}

impl ScrollBarState {
    /// The largest offset that still keeps the viewport inside the extent.
    pub fn max_offset(&self) -> f64 {
        (self.extent - self.viewport).max(0.0)
    }

    pub fn is_scrollable(&self) -> bool {
        self.max_offset() > 0.0
    }

    /// Thumb position in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        let max = self.max_offset();
        if max > 0.0 {
            (self.offset / max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// A framework-neutral scroll owner.
///
/// The panel holds it behind an `Rc` and calls back into it; the [`crate::Controller`] writes the
/// pixel scroll bars after each layout pass. Zoom and gesture state are plain settable flags so a
/// host can mirror whatever its real viewer does.
#[derive(Debug)]
pub struct ScrollViewer {
    invalidations: Cell<u64>,
    layout_refreshes: Cell<u64>,
    zoom: Cell<f64>,
    direct_manipulation_zoom: Cell<bool>,
    child_invalidate_measure: Cell<bool>,
    horizontal: Cell<ScrollBarState>,
    vertical: Cell<ScrollBarState>,
}

impl Default for ScrollViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollViewer {
    pub fn new() -> Self {
        Self {
            invalidations: Cell::new(0),
            layout_refreshes: Cell::new(0),
            zoom: Cell::new(1.0),
            direct_manipulation_zoom: Cell::new(false),
            child_invalidate_measure: Cell::new(false),
            horizontal: Cell::new(ScrollBarState::default()),
            vertical: Cell::new(ScrollBarState::default()),
        }
    }

    /// How many times the panel reported changed scroll values.
    pub fn invalidations(&self) -> u64 {
        self.invalidations.get()
    }

    pub fn layout_refreshes(&self) -> u64 {
        self.layout_refreshes.get()
    }

    /// Sets the zoom factor. Non-positive or non-finite values are ignored.
    pub fn set_zoom_factor(&self, zoom: f64) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom.set(zoom);
        }
    }

    pub fn set_direct_manipulation_zoom(&self, active: bool) {
        self.direct_manipulation_zoom.set(active);
    }

    pub fn set_child_invalidate_measure(&self, active: bool) {
        self.child_invalidate_measure.set(active);
    }

    pub fn horizontal(&self) -> ScrollBarState {
        self.horizontal.get()
    }

    pub fn vertical(&self) -> ScrollBarState {
        self.vertical.get()
    }

    pub fn scroll_bar(&self, orientation: Orientation) -> ScrollBarState {
        match orientation {
            Orientation::Horizontal => self.horizontal(),
            Orientation::Vertical => self.vertical(),
        }
    }

    pub(crate) fn set_scroll_bar(&self, orientation: Orientation, state: ScrollBarState) {
        match orientation {
            Orientation::Horizontal => self.horizontal.set(state),
            Orientation::Vertical => self.vertical.set(state),
        }
    }
}

impl ScrollOwner for ScrollViewer {
    fn invalidate_scroll_info(&self) {
        self.invalidations.set(self.invalidations.get() + 1);
    }

    fn zoom_factor(&self) -> f64 {
        self.zoom.get()
    }

    fn is_in_direct_manipulation_zoom(&self) -> bool {
        self.direct_manipulation_zoom.get()
    }

    fn is_in_child_invalidate_measure(&self) -> bool {
        self.child_invalidate_measure.get()
    }

    fn notify_layout_refreshed(&self) {
        self.layout_refreshes.set(self.layout_refreshes.get() + 1);
    }
}

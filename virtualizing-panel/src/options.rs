use alloc::sync::Arc;

use crate::{Orientation, Thickness, VirtualizationMode};

/// Arguments of the cleanup hook, fired once per container the panel is about to release.
///
/// Setting `cancel` keeps the container realized for this pass.
#[derive(Debug)]
pub struct CleanupVirtualizedItem<'a, C> {
    pub item_index: usize,
    pub container: &'a C,
    pub cancel: bool,
}

/// A hook consulted before a realized container is recycled or discarded.
pub type CleanupVirtualizedItemCallback<C> =
    Arc<dyn Fn(&mut CleanupVirtualizedItem<'_, C>) + Send + Sync>;

/// A hook fired when the snap points along an axis changed.
///
/// It fires once per change; it is re-armed when the snap point keys along that axis are read.
pub type SnapPointsChangedCallback = Arc<dyn Fn(Orientation) + Send + Sync>;

/// How many items share a line.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemsPerLine {
    /// A fixed line width. `0` is treated as `1`.
    Fixed(usize),
    /// As many items as fit across the available size, judged by the first item, up to `max`.
    Fit { max: usize },
}

impl Default for ItemsPerLine {
    fn default() -> Self {
        Self::Fixed(1)
    }
}

impl ItemsPerLine {
    /// Resolves the policy against the available cross size and the cross size of one item.
    pub fn resolve(self, available_cross: f64, item_cross: f64) -> usize {
        match self {
            Self::Fixed(n) => n.max(1),
            Self::Fit { max } => {
                if item_cross.is_nan() || item_cross <= 0.0 || !available_cross.is_finite() {
                    return 1;
                }
                let fit = crate::float::floor(available_cross / item_cross) as usize;
                fit.clamp(1, max.max(1))
            }
        }
    }
}

/// Configuration for [`crate::VirtualizingPanel`].
///
/// Cheap to clone: hooks are stored in `Arc`s.
pub struct PanelOptions<C> {
    /// Stacking direction.
    pub orientation: Orientation,
    /// When off every item is realized and nothing is ever cleaned up.
    pub is_virtualizing: bool,
    pub virtualization_mode: VirtualizationMode,
    /// Snap scroll offsets to whole items along the stacking axis.
    pub item_based_scrolling: bool,
    pub items_per_line: ItemsPerLine,
    /// Pixels realized beyond each edge of the viewport.
    pub precache_window: f64,
    /// Whether the precache buffers are realized at all.
    pub measure_buffers: bool,
    /// Pixels moved by a line command.
    pub line_delta: f64,
    /// Wheel notches are reported in multiples of this.
    pub wheel_delta: f64,
    /// Space around the items, used by snap point offsets.
    pub margin: Thickness,
    pub are_horizontal_snap_points_regular: bool,
    pub are_vertical_snap_points_regular: bool,
    pub on_cleanup_virtualized_item: Option<CleanupVirtualizedItemCallback<C>>,
    pub on_snap_points_changed: Option<SnapPointsChangedCallback>,
}

impl<C> Default for PanelOptions<C> {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            is_virtualizing: true,
            virtualization_mode: VirtualizationMode::Standard,
            item_based_scrolling: false,
            items_per_line: ItemsPerLine::default(),
            precache_window: 200.0,
            measure_buffers: true,
            line_delta: 16.0,
            wheel_delta: 120.0,
            margin: Thickness::default(),
            are_horizontal_snap_points_regular: false,
            are_vertical_snap_points_regular: false,
            on_cleanup_virtualized_item: None,
            on_snap_points_changed: None,
        }
    }
}

impl<C> Clone for PanelOptions<C> {
    fn clone(&self) -> Self {
        Self {
            orientation: self.orientation,
            is_virtualizing: self.is_virtualizing,
            virtualization_mode: self.virtualization_mode,
            item_based_scrolling: self.item_based_scrolling,
            items_per_line: self.items_per_line,
            precache_window: self.precache_window,
            measure_buffers: self.measure_buffers,
            line_delta: self.line_delta,
            wheel_delta: self.wheel_delta,
            margin: self.margin,
            are_horizontal_snap_points_regular: self.are_horizontal_snap_points_regular,
            are_vertical_snap_points_regular: self.are_vertical_snap_points_regular,
            on_cleanup_virtualized_item: self.on_cleanup_virtualized_item.clone(),
            on_snap_points_changed: self.on_snap_points_changed.clone(),
        }
    }
}

impl<C> PanelOptions<C> {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            ..Self::default()
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_virtualizing(mut self, is_virtualizing: bool) -> Self {
        self.is_virtualizing = is_virtualizing;
        self
    }

    pub fn with_virtualization_mode(mut self, mode: VirtualizationMode) -> Self {
        self.virtualization_mode = mode;
        self
    }

    pub fn with_item_based_scrolling(mut self, item_based_scrolling: bool) -> Self {
        self.item_based_scrolling = item_based_scrolling;
        self
    }

    pub fn with_items_per_line(mut self, items_per_line: ItemsPerLine) -> Self {
        self.items_per_line = items_per_line;
        self
    }

    /// Sets the precache window in pixels. Negative values are treated as `0`.
    pub fn with_precache_window(mut self, pixels: f64) -> Self {
        self.precache_window = if pixels > 0.0 { pixels } else { 0.0 };
        self
    }

    pub fn with_measure_buffers(mut self, measure_buffers: bool) -> Self {
        self.measure_buffers = measure_buffers;
        self
    }

    pub fn with_line_delta(mut self, line_delta: f64) -> Self {
        self.line_delta = line_delta;
        self
    }

    pub fn with_wheel_delta(mut self, wheel_delta: f64) -> Self {
        self.wheel_delta = wheel_delta;
        self
    }

    pub fn with_margin(mut self, margin: Thickness) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_regular_snap_points(mut self, horizontal: bool, vertical: bool) -> Self {
        self.are_horizontal_snap_points_regular = horizontal;
        self.are_vertical_snap_points_regular = vertical;
        self
    }

    pub fn with_on_cleanup_virtualized_item(
        mut self,
        f: Option<impl Fn(&mut CleanupVirtualizedItem<'_, C>) + Send + Sync + 'static>,
    ) -> Self {
        self.on_cleanup_virtualized_item = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_snap_points_changed(
        mut self,
        f: Option<impl Fn(Orientation) + Send + Sync + 'static>,
    ) -> Self {
        self.on_snap_points_changed = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn are_snap_points_regular(&self, orientation: Orientation) -> bool {
        match orientation {
            Orientation::Horizontal => self.are_horizontal_snap_points_regular,
            Orientation::Vertical => self.are_vertical_snap_points_regular,
        }
    }
}

impl<C> core::fmt::Debug for PanelOptions<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PanelOptions")
            .field("orientation", &self.orientation)
            .field("is_virtualizing", &self.is_virtualizing)
            .field("virtualization_mode", &self.virtualization_mode)
            .field("item_based_scrolling", &self.item_based_scrolling)
            .field("items_per_line", &self.items_per_line)
            .field("precache_window", &self.precache_window)
            .field("measure_buffers", &self.measure_buffers)
            .field("line_delta", &self.line_delta)
            .field("wheel_delta", &self.wheel_delta)
            .field("margin", &self.margin)
            .field(
                "are_horizontal_snap_points_regular",
                &self.are_horizontal_snap_points_regular,
            )
            .field(
                "are_vertical_snap_points_regular",
                &self.are_vertical_snap_points_regular,
            )
            .finish_non_exhaustive()
    }
}

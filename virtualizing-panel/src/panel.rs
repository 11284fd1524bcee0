use alloc::rc::Rc;

use crate::children::Children;
use crate::extent::{self, HostExtents, LineMetrics};
use crate::float;
use crate::snap::SnapState;
use crate::translate::{OffsetTranslator, Translation, TranslationKey};
use crate::{
    CacheWindow, InvalidOffset, LayoutHost, Orientation, PanelOptions, Point, ScrollData,
    ScrollOwner, Size,
};

/// A stacking panel that only realizes the containers around its viewport.
///
/// The panel owns no items and no containers of its own making: a [`crate::ContainerGenerator`]
/// hands out containers, a [`LayoutHost`] measures and places them, and an optional
/// [`ScrollOwner`] is told when the published scroll values change.
///
/// Offsets along the stacking axis are logical (line units, fraction included); across it they
/// are pixels.
pub struct VirtualizingPanel<C> {
    pub(crate) options: PanelOptions<C>,
    pub(crate) window: CacheWindow,
    pub(crate) scroll: ScrollData,
    pub(crate) children: Children<C>,
    pub(crate) translator: OffsetTranslator,
    pub(crate) snap: SnapState,

    pub(crate) in_measure: bool,
    /// Set by offset changes, cleared by arrange. While set, cleanup ignores arranged positions.
    pub(crate) ignoring_transitions: bool,
    pub(crate) index_to_ensure_in_view: Option<usize>,
    pub(crate) measure_dirty: bool,
    pub(crate) notify_layout_refresh: bool,

    pub(crate) last_available: Size,
    pub(crate) last_child_slot: Size,
    pub(crate) last_desired: Size,
    pub(crate) precache_before: f64,
    pub(crate) precache_after: f64,
    pub(crate) viewport_pixels: f64,
    /// Content pixel position of the viewport origin at the last arrange.
    pub(crate) arranged_offset: Point,
}

impl<C> core::fmt::Debug for VirtualizingPanel<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualizingPanel")
            .field("options", &self.options)
            .field("window", &self.window)
            .field("scroll", &self.scroll)
            .field("in_measure", &self.in_measure)
            .field("measure_dirty", &self.measure_dirty)
            .field("index_to_ensure_in_view", &self.index_to_ensure_in_view)
            .finish_non_exhaustive()
    }
}

impl<C: Clone + PartialEq + core::fmt::Debug> VirtualizingPanel<C> {
    pub fn new(options: PanelOptions<C>) -> Self {
        vdebug!(
            orientation = ?options.orientation,
            virtualizing = options.is_virtualizing,
            mode = ?options.virtualization_mode,
            "VirtualizingPanel::new"
        );
        let mut children = Children::default();
        children.set_mode(options.virtualization_mode);
        Self {
            options,
            window: CacheWindow::new(),
            scroll: ScrollData::default(),
            children,
            translator: OffsetTranslator::default(),
            snap: SnapState::default(),
            in_measure: false,
            ignoring_transitions: false,
            index_to_ensure_in_view: None,
            measure_dirty: true,
            notify_layout_refresh: false,
            last_available: Size::ZERO,
            last_child_slot: Size::ZERO,
            last_desired: Size::ZERO,
            precache_before: 0.0,
            precache_after: 0.0,
            viewport_pixels: 0.0,
            arranged_offset: Point::ZERO,
        }
    }

    pub fn options(&self) -> &PanelOptions<C> {
        &self.options
    }

    /// Replaces the options. A change of orientation, virtualization or mode drops every
    /// published scroll value and needs a fresh measure.
    pub fn set_options(&mut self, options: PanelOptions<C>) {
        let relayout = options.orientation != self.options.orientation
            || options.is_virtualizing != self.options.is_virtualizing
            || options.virtualization_mode != self.options.virtualization_mode
            || options.items_per_line != self.options.items_per_line;
        if options.virtualization_mode != self.options.virtualization_mode {
            self.children.set_mode(options.virtualization_mode);
        }
        if relayout {
            self.scroll.clear_layout();
            self.translator.invalidate();
            self.scroll.max_desired_size = Size::ZERO;
        }
        self.options = options;
        self.measure_dirty = true;
        vtrace!(relayout, "VirtualizingPanel::set_options");
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut PanelOptions<C>)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    /// Attaches (or detaches) the scroll owner. Swapping owners resets the scroll data.
    pub fn set_scroll_owner(&mut self, owner: Option<Rc<dyn ScrollOwner>>) {
        let same = match (&self.scroll.owner, &owner) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if same {
            return;
        }
        self.scroll.clear_layout();
        self.scroll.owner = owner;
        self.translator.invalidate();
        self.measure_dirty = true;
    }

    pub fn set_can_scroll(&mut self, horizontally: bool, vertically: bool) {
        if self.scroll.can_horizontally_scroll != horizontally
            || self.scroll.can_vertically_scroll != vertically
        {
            self.scroll.can_horizontally_scroll = horizontally;
            self.scroll.can_vertically_scroll = vertically;
            self.measure_dirty = true;
        }
    }

    pub fn window(&self) -> &CacheWindow {
        &self.window
    }

    pub fn scroll_data(&self) -> &ScrollData {
        &self.scroll
    }

    /// Every hosted container in visual order, recycled ones included.
    pub fn children(&self) -> &[C] {
        self.children.visual()
    }

    /// Containers currently linked to items, index-parallel to the generator's realized list.
    pub fn realized_children(&self) -> &[C] {
        self.children.realized()
    }

    pub fn is_measure_dirty(&self) -> bool {
        self.measure_dirty
    }

    pub fn invalidate_measure(&mut self) {
        self.measure_dirty = true;
    }

    /// Desired size of the last completed measure.
    pub fn desired_size(&self) -> Size {
        self.last_desired
    }

    pub fn pending_scroll_into_view(&self) -> Option<usize> {
        self.index_to_ensure_in_view
    }

    /// Number of pixel translations actually computed rather than served from the memo.
    pub fn translation_walks(&self) -> u64 {
        self.translator.walks()
    }

    pub fn horizontal_offset(&self) -> f64 {
        self.scroll.offset.x
    }

    pub fn vertical_offset(&self) -> f64 {
        self.scroll.offset.y
    }

    pub fn viewport_width(&self) -> f64 {
        self.scroll.viewport.width
    }

    pub fn viewport_height(&self) -> f64 {
        self.scroll.viewport.height
    }

    pub fn extent_width(&self) -> f64 {
        self.scroll.extent.width
    }

    pub fn extent_height(&self) -> f64 {
        self.scroll.extent.height
    }

    /// Viewport length along the stacking axis in pixels, zoom applied.
    pub fn viewport_pixels(&self) -> f64 {
        self.viewport_pixels
    }

    pub fn items_per_page(&self) -> usize {
        self.window.items_per_page()
    }

    pub fn last_item_index_in_viewport(&self) -> isize {
        self.window.last_item_index_in_viewport()
    }

    pub fn set_horizontal_offset(&mut self, offset: f64) -> Result<(), InvalidOffset> {
        self.set_offset_along(Orientation::Horizontal, offset)
    }

    pub fn set_vertical_offset(&mut self, offset: f64) -> Result<(), InvalidOffset> {
        self.set_offset_along(Orientation::Vertical, offset)
    }

    pub(crate) fn set_offset_along(
        &mut self,
        orientation: Orientation,
        offset: f64,
    ) -> Result<(), InvalidOffset> {
        if self.in_measure {
            vtrace!(offset, "offset change ignored during measure");
            return Ok(());
        }
        if offset.is_nan() {
            return Err(InvalidOffset(offset));
        }

        let min = orientation.point_main(self.scroll.min_offset);
        let mut value = float::max(offset, min);
        if self.scroll.has_layout {
            let max = orientation.main(self.scroll.extent) - orientation.main(self.scroll.viewport);
            value = float::clamp(value, min, float::max(min, max));
        }
        if orientation == self.options.orientation && self.options.item_based_scrolling {
            value = float::floor(value);
        }

        if !float::are_close(value, self.scroll.offset_along(orientation)) {
            vtrace!(?orientation, value, "offset changed");
            self.scroll.set_offset_along(orientation, value);
            self.index_to_ensure_in_view = None;
            if !self.scroll.is_in_direct_manipulation_zoom() {
                self.measure_dirty = true;
            }
            self.ignoring_transitions = true;
        }
        Ok(())
    }

    /// Converts a pixel delta along `orientation` into the offset it lands on.
    ///
    /// Along the stacking axis the delta is walked line by line over the realized sizes and the
    /// average of the rest; the last answer is memoized.
    pub fn translate_pixel_delta<H: LayoutHost<C>>(
        &mut self,
        host: &H,
        orientation: Orientation,
        delta: f64,
    ) -> Translation {
        let stacking = self.options.orientation;
        let key = TranslationKey {
            orientation,
            realized_count: self.children.realized().len(),
            visual_count: self.children.visual().len(),
            scroll: self.scroll.snapshot(),
            current_offset: self.scroll.offset_along(orientation),
            delta,
        };
        let extents = HostExtents {
            children: self.children.realized(),
            host,
            orientation: stacking,
        };
        let metrics = LineMetrics::new(&extents, &self.window, self.scroll.zoom_factor());
        self.translator.translate(
            key,
            stacking,
            self.options.is_virtualizing,
            &metrics,
            self.window.line_count(),
        )
    }

    /// Pixel position (zoom applied) of a logical offset along the stacking axis.
    pub fn logical_to_pixel_offset<H: LayoutHost<C>>(&self, host: &H, logical: f64) -> f64 {
        let extents = HostExtents {
            children: self.children.realized(),
            host,
            orientation: self.options.orientation,
        };
        LineMetrics::new(&extents, &self.window, self.scroll.zoom_factor()).logical_to_pixel(logical)
    }

    /// Logical offset of a pixel position (zoom applied) along the stacking axis.
    pub fn pixel_to_logical_offset<H: LayoutHost<C>>(&self, host: &H, pixels: f64) -> f64 {
        let extents = HostExtents {
            children: self.children.realized(),
            host,
            orientation: self.options.orientation,
        };
        let metrics = LineMetrics::new(&extents, &self.window, self.scroll.zoom_factor());
        crate::translate::walk(&metrics, 0.0, pixels, self.window.line_count()).offset
    }

    /// Estimated size of the whole content along the stacking axis, in pixels.
    pub fn estimated_pixel_extent<H: LayoutHost<C>>(&self, host: &H) -> f64 {
        let extents = HostExtents {
            children: self.children.realized(),
            host,
            orientation: self.options.orientation,
        };
        let dim = extent::realized_dimension(&extents, &self.window);
        extent::estimate_extent(dim, self.window.line_count())
    }

    /// Estimated size of the unrealized lines before the window, in pixels.
    pub fn unrealized_before<H: LayoutHost<C>>(&self, host: &H) -> f64 {
        let extents = HostExtents {
            children: self.children.realized(),
            host,
            orientation: self.options.orientation,
        };
        let dim = extent::realized_dimension(&extents, &self.window);
        extent::unrealized_before(dim, &self.window)
    }

    pub fn line_up<H: LayoutHost<C>>(&mut self, host: &H) -> Result<(), InvalidOffset> {
        self.scroll_by_pixels(host, Orientation::Vertical, -self.options.line_delta)
    }

    pub fn line_down<H: LayoutHost<C>>(&mut self, host: &H) -> Result<(), InvalidOffset> {
        self.scroll_by_pixels(host, Orientation::Vertical, self.options.line_delta)
    }

    pub fn line_left<H: LayoutHost<C>>(&mut self, host: &H) -> Result<(), InvalidOffset> {
        self.scroll_by_pixels(host, Orientation::Horizontal, -self.options.line_delta)
    }

    pub fn line_right<H: LayoutHost<C>>(&mut self, host: &H) -> Result<(), InvalidOffset> {
        self.scroll_by_pixels(host, Orientation::Horizontal, self.options.line_delta)
    }

    pub fn page_up(&mut self) -> Result<(), InvalidOffset> {
        self.scroll_by_page(Orientation::Vertical, -1.0)
    }

    pub fn page_down(&mut self) -> Result<(), InvalidOffset> {
        self.scroll_by_page(Orientation::Vertical, 1.0)
    }

    pub fn page_left(&mut self) -> Result<(), InvalidOffset> {
        self.scroll_by_page(Orientation::Horizontal, -1.0)
    }

    pub fn page_right(&mut self) -> Result<(), InvalidOffset> {
        self.scroll_by_page(Orientation::Horizontal, 1.0)
    }

    pub fn mouse_wheel_up<H: LayoutHost<C>>(&mut self, host: &H) -> Result<(), InvalidOffset> {
        self.scroll_wheel(host, Orientation::Vertical, -self.options.wheel_delta)
    }

    pub fn mouse_wheel_down<H: LayoutHost<C>>(&mut self, host: &H) -> Result<(), InvalidOffset> {
        self.scroll_wheel(host, Orientation::Vertical, self.options.wheel_delta)
    }

    pub fn mouse_wheel_left<H: LayoutHost<C>>(&mut self, host: &H) -> Result<(), InvalidOffset> {
        self.scroll_wheel(host, Orientation::Horizontal, -self.options.wheel_delta)
    }

    pub fn mouse_wheel_right<H: LayoutHost<C>>(&mut self, host: &H) -> Result<(), InvalidOffset> {
        self.scroll_wheel(host, Orientation::Horizontal, self.options.wheel_delta)
    }

    /// Scrolls by a wheel `delta`. Positive values move towards the end of the content.
    ///
    /// One notch (`wheel_delta`) moves `max(line_delta, 15% of the viewport)` pixels.
    pub fn scroll_wheel<H: LayoutHost<C>>(
        &mut self,
        host: &H,
        orientation: Orientation,
        delta: f64,
    ) -> Result<(), InvalidOffset> {
        if delta.is_nan() {
            return Err(InvalidOffset(delta));
        }
        let viewport = if orientation == self.options.orientation {
            self.viewport_pixels
        } else {
            orientation.main(self.scroll.viewport)
        };
        let notch = if self.options.wheel_delta > 0.0 {
            delta / self.options.wheel_delta
        } else {
            0.0
        };
        let pixels = float::max(self.options.line_delta, 0.15 * viewport) * notch;
        self.scroll_by_pixels(host, orientation, pixels)
    }

    fn scroll_by_pixels<H: LayoutHost<C>>(
        &mut self,
        host: &H,
        orientation: Orientation,
        pixels: f64,
    ) -> Result<(), InvalidOffset> {
        let target = self.translate_pixel_delta(host, orientation, pixels).offset;
        self.set_offset_along(orientation, target)
    }

    fn scroll_by_page(&mut self, orientation: Orientation, direction: f64) -> Result<(), InvalidOffset> {
        let offset = self.scroll.offset_along(orientation);
        let page = orientation.main(self.scroll.viewport);
        self.set_offset_along(orientation, offset + direction * page)
    }
}

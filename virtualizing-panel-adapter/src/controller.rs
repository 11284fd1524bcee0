use alloc::rc::Rc;
use alloc::vec::Vec;

use virtualizing_panel::{
    AlignmentRatios, ContainerGenerator, Error, InvalidOffset, ItemsChanged, LayoutHost,
    MemoryGenerator, Orientation, PanelOptions, Point, Rect, RegularSnapPoints,
    ScrollIntoViewAlignment, ScrollOwner, Size, SnapPointsAlignment, SnapPointsMismatch,
    VirtualizingPanel,
};

use crate::{ScrollBarState, ScrollViewer};

/// The error of a layout pass or a collection change driven through a [`Controller`].
pub type LayoutError<G, H> = Error<
    <G as ContainerGenerator>::Error,
    <H as LayoutHost<<G as ContainerGenerator>::Container>>::Error,
>;

/// A framework-neutral controller that owns a `virtualizing_panel::VirtualizingPanel` together
/// with its generator, its layout host and a [`ScrollViewer`].
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `layout(available)` whenever the viewport size or the content changed
/// - the scroll commands when input arrives
/// - `apply_change` (or the `MemoryGenerator` shortcuts) after mutating the collection
///
/// After every `layout` the viewer's scroll bars hold pixel values a UI can render directly.
pub struct Controller<G: ContainerGenerator, H> {
    panel: VirtualizingPanel<G::Container>,
    generator: G,
    host: H,
    viewer: Rc<ScrollViewer>,
    last_available: Option<Size>,
}

impl<G, H> core::fmt::Debug for Controller<G, H>
where
    G: ContainerGenerator + core::fmt::Debug,
    H: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("panel", &self.panel)
            .field("generator", &self.generator)
            .field("host", &self.host)
            .field("viewer", &self.viewer)
            .finish_non_exhaustive()
    }
}

impl<G, H> Controller<G, H>
where
    G: ContainerGenerator,
    H: LayoutHost<G::Container>,
{
    pub fn new(options: PanelOptions<G::Container>, generator: G, host: H) -> Self {
        Self::from_panel(VirtualizingPanel::new(options), generator, host)
    }

    /// Wraps an existing panel. Its scroll owner is replaced by a fresh viewer.
    pub fn from_panel(mut panel: VirtualizingPanel<G::Container>, generator: G, host: H) -> Self {
        let viewer = Rc::new(ScrollViewer::new());
        let owner: Rc<dyn ScrollOwner> = viewer.clone();
        panel.set_scroll_owner(Some(owner));
        Self {
            panel,
            generator,
            host,
            viewer,
            last_available: None,
        }
    }

    pub fn panel(&self) -> &VirtualizingPanel<G::Container> {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut VirtualizingPanel<G::Container> {
        &mut self.panel
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Direct access to the generator. Changes to the collection must go through
    /// [`Controller::apply_change`] instead.
    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn viewer(&self) -> &Rc<ScrollViewer> {
        &self.viewer
    }

    pub fn into_parts(self) -> (VirtualizingPanel<G::Container>, G, H) {
        (self.panel, self.generator, self.host)
    }

    pub fn horizontal_scroll_bar(&self) -> ScrollBarState {
        self.viewer.horizontal()
    }

    pub fn vertical_scroll_bar(&self) -> ScrollBarState {
        self.viewer.vertical()
    }

    /// Whether `layout` would do any work for `available`.
    pub fn needs_layout(&self, available: Size) -> bool {
        self.panel.is_measure_dirty() || self.last_available != Some(available)
    }

    /// Measures and arranges the panel at `available`, then refreshes the scroll bars.
    ///
    /// Returns the panel's desired size.
    pub fn layout(&mut self, available: Size) -> Result<Size, LayoutError<G, H>> {
        let desired = self.panel.measure(&mut self.generator, &mut self.host, available)?;
        self.panel
            .arrange(&mut self.host, available)
            .map_err(Error::Layout)?;
        self.last_available = Some(available);
        self.sync_scroll_bars();
        vtrace!(
            width = available.width,
            height = available.height,
            desired_width = desired.width,
            desired_height = desired.height,
            "layout"
        );
        Ok(desired)
    }

    /// Runs `layout` only when something changed since the last one.
    pub fn layout_if_needed(&mut self, available: Size) -> Result<Option<Size>, LayoutError<G, H>> {
        if !self.needs_layout(available) {
            return Ok(None);
        }
        self.layout(available).map(Some)
    }

    /// Tells the panel about a change already applied to the generator.
    pub fn apply_change(&mut self, change: ItemsChanged) -> Result<(), LayoutError<G, H>> {
        vdebug!(action = ?change.action, items = change.item_count, "apply_change");
        self.panel
            .on_items_changed(&mut self.generator, &mut self.host, change)
    }

    /// Runs `f` against the generator and forwards the change it reports, if any.
    pub fn mutate(
        &mut self,
        f: impl FnOnce(&mut G) -> Option<ItemsChanged>,
    ) -> Result<bool, LayoutError<G, H>> {
        match f(&mut self.generator) {
            Some(change) => self.apply_change(change).map(|()| true),
            None => Ok(false),
        }
    }

    pub fn line_up(&mut self) -> Result<(), InvalidOffset> {
        self.panel.line_up(&self.host)
    }

    pub fn line_down(&mut self) -> Result<(), InvalidOffset> {
        self.panel.line_down(&self.host)
    }

    pub fn line_left(&mut self) -> Result<(), InvalidOffset> {
        self.panel.line_left(&self.host)
    }

    pub fn line_right(&mut self) -> Result<(), InvalidOffset> {
        self.panel.line_right(&self.host)
    }

    pub fn page_up(&mut self) -> Result<(), InvalidOffset> {
        self.panel.page_up()
    }

    pub fn page_down(&mut self) -> Result<(), InvalidOffset> {
        self.panel.page_down()
    }

    pub fn page_left(&mut self) -> Result<(), InvalidOffset> {
        self.panel.page_left()
    }

    pub fn page_right(&mut self) -> Result<(), InvalidOffset> {
        self.panel.page_right()
    }

    pub fn mouse_wheel_up(&mut self) -> Result<(), InvalidOffset> {
        self.panel.mouse_wheel_up(&self.host)
    }

    pub fn mouse_wheel_down(&mut self) -> Result<(), InvalidOffset> {
        self.panel.mouse_wheel_down(&self.host)
    }

    pub fn mouse_wheel_left(&mut self) -> Result<(), InvalidOffset> {
        self.panel.mouse_wheel_left(&self.host)
    }

    pub fn mouse_wheel_right(&mut self) -> Result<(), InvalidOffset> {
        self.panel.mouse_wheel_right(&self.host)
    }

    /// Scrolls by a wheel `delta` (positive towards the end of the content).
    pub fn scroll_wheel(&mut self, orientation: Orientation, delta: f64) -> Result<(), InvalidOffset> {
        self.panel.scroll_wheel(&self.host, orientation, delta)
    }

    pub fn set_horizontal_offset(&mut self, offset: f64) -> Result<(), InvalidOffset> {
        self.panel.set_horizontal_offset(offset)
    }

    pub fn set_vertical_offset(&mut self, offset: f64) -> Result<(), InvalidOffset> {
        self.panel.set_vertical_offset(offset)
    }

    /// Moves a scroll bar thumb to `pixels`, as a UI reports it after a drag.
    ///
    /// Along the stacking axis the pixel position is converted to a logical offset first.
    pub fn scroll_to_pixels(&mut self, orientation: Orientation, pixels: f64) -> Result<(), InvalidOffset> {
        if pixels.is_nan() {
            return Err(InvalidOffset(pixels));
        }
        let offset = if orientation == self.panel.options().orientation {
            self.panel.pixel_to_logical_offset(&self.host, pixels)
        } else {
            pixels
        };
        match orientation {
            Orientation::Horizontal => self.panel.set_horizontal_offset(offset),
            Orientation::Vertical => self.panel.set_vertical_offset(offset),
        }
    }

    pub fn scroll_into_view(
        &mut self,
        index: usize,
        alignment: ScrollIntoViewAlignment,
    ) -> Result<(), InvalidOffset> {
        self.panel.scroll_into_view(&self.host, index, alignment)
    }

    /// Scrolls `rect` (relative to `container`) into view. See
    /// `VirtualizingPanel::make_visible`.
    pub fn make_visible(
        &mut self,
        container: &G::Container,
        rect: Rect,
        alignment: AlignmentRatios,
    ) -> Result<Rect, InvalidOffset> {
        self.panel
            .make_visible(&self.host, container, rect, alignment, Point::ZERO)
    }

    pub fn regular_snap_points(
        &mut self,
        orientation: Orientation,
        alignment: SnapPointsAlignment,
    ) -> Result<RegularSnapPoints, SnapPointsMismatch> {
        self.panel.regular_snap_points(&self.host, orientation, alignment)
    }

    pub fn irregular_snap_points(
        &mut self,
        orientation: Orientation,
        alignment: SnapPointsAlignment,
    ) -> Result<Vec<f64>, SnapPointsMismatch> {
        self.panel.irregular_snap_points(&self.host, orientation, alignment)
    }

    /// Containers currently inside the cache window, in child order.
    pub fn window_children(&self) -> Vec<G::Container> {
        let window = self.panel.window();
        self.panel
            .realized_children()
            .iter()
            .enumerate()
            .filter(|(index, _)| window.contains_child(*index))
            .map(|(_, child)| child.clone())
            .collect()
    }

    fn sync_scroll_bars(&self) {
        let stacking = self.panel.options().orientation;
        let zoom = self.viewer.zoom_factor();
        let data = self.panel.scroll_data();

        let main = ScrollBarState {
            offset: self
                .panel
                .logical_to_pixel_offset(&self.host, data.offset_along(stacking)),
            viewport: self.panel.viewport_pixels(),
            extent: self.panel.estimated_pixel_extent(&self.host) * zoom,
        };
        let cross_axis = stacking.cross();
        let cross = ScrollBarState {
            offset: data.offset_along(cross_axis),
            viewport: cross_axis.main(data.viewport),
            extent: cross_axis.main(data.extent),
        };
        self.viewer.set_scroll_bar(stacking, main);
        self.viewer.set_scroll_bar(cross_axis, cross);
    }
}

impl<H> Controller<MemoryGenerator, H>
where
    H: LayoutHost<virtualizing_panel::MemoryContainer>,
{
    pub fn insert_item(&mut self, index: usize) -> Result<(), LayoutError<MemoryGenerator, H>> {
        let change = self.generator.insert_item(index);
        self.apply_change(change)
    }

    /// Returns `false` when `index` is past the end of the collection.
    pub fn remove_item(&mut self, index: usize) -> Result<bool, LayoutError<MemoryGenerator, H>> {
        self.mutate(|generator| generator.remove_item(index))
    }

    /// Returns `false` when `index` is past the end of the collection.
    pub fn replace_item(&mut self, index: usize) -> Result<bool, LayoutError<MemoryGenerator, H>> {
        self.mutate(|generator| generator.replace_item(index))
    }

    pub fn reset_items(&mut self, item_count: usize) -> Result<(), LayoutError<MemoryGenerator, H>> {
        let change = self.generator.reset_items(item_count);
        self.apply_change(change)
    }
}

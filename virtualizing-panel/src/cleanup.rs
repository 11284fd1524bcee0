use crate::realize::PassResult;
use crate::{
    CleanupVirtualizedItem, ContainerGenerator, Error, GeneratorPosition, LayoutHost, Rect, Size,
    VirtualizingPanel,
};

impl<C: Clone + PartialEq + core::fmt::Debug> VirtualizingPanel<C> {
    /// Releases the realized containers that fell out of the cache window.
    ///
    /// The focused container and its neighbours, containers that are their own items, the
    /// drag-and-drop owner, containers still placed inside the viewport (unless offsets just
    /// changed) and containers whose cleanup hook cancelled are kept. Contiguous runs are
    /// released with a single generator call.
    pub(crate) fn cleanup_containers<G, H>(
        &mut self,
        generator: &mut G,
        host: &H,
        constraint: Size,
    ) -> PassResult<(), G, H, C>
    where
        G: ContainerGenerator<Container = C>,
        H: LayoutHost<C>,
    {
        self.window.adjust();

        let count = self.children.realized().len();
        if count == 0 {
            return Ok(());
        }

        let focused = self
            .children
            .realized()
            .iter()
            .position(|child| host.has_focus(child));
        let mut protected = focused.map(|f| (f.saturating_sub(1), f + 1));
        let mut focused = focused;

        let mut child_index = 0;
        let mut range_start: Option<usize> = None;
        let mut range_count = 0usize;
        let mut last_item: Option<usize> = None;

        while child_index < self.children.realized().len() {
            let Some(item) = generator.index_from_position(GeneratorPosition::child(child_index))
            else {
                break;
            };

            // A gap in item indexes ends the current run.
            if last_item.is_some_and(|last| last + 1 != item) {
                if let Some(start) = range_start.take() {
                    self.cleanup_range(generator, start, range_count)
                        .map_err(Error::Generator)?;
                    child_index -= range_count;
                    shift(&mut focused, &mut protected, start, range_count);
                    range_count = 0;
                }
            }
            last_item = Some(item);

            if self.can_cleanup(generator, host, child_index, item, focused, protected, constraint) {
                if range_start.is_none() {
                    range_start = Some(child_index);
                }
                range_count += 1;
            } else if let Some(start) = range_start.take() {
                self.cleanup_range(generator, start, range_count)
                    .map_err(Error::Generator)?;
                child_index -= range_count;
                shift(&mut focused, &mut protected, start, range_count);
                range_count = 0;
            }
            child_index += 1;
        }

        if let Some(start) = range_start {
            self.cleanup_range(generator, start, range_count)
                .map_err(Error::Generator)?;
        }

        self.window.first_visible_child_index = self.first_visible_child(&*generator);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn can_cleanup<G, H>(
        &self,
        generator: &G,
        host: &H,
        child_index: usize,
        item: usize,
        focused: Option<usize>,
        protected: Option<(usize, usize)>,
        constraint: Size,
    ) -> bool
    where
        G: ContainerGenerator<Container = C>,
        H: LayoutHost<C>,
    {
        if !self.window.is_outside(item) {
            return false;
        }
        if focused == Some(child_index)
            || protected.is_some_and(|(before, after)| child_index == before || child_index == after)
        {
            return false;
        }

        let child = &self.children.realized()[child_index];
        if !self.ignoring_transitions && self.is_inside_view_location(host, child, constraint) {
            return false;
        }
        if generator.is_item_its_own_container(item) {
            return false;
        }
        if host.is_drag_drop_owner(child) {
            return false;
        }

        if let Some(hook) = &self.options.on_cleanup_virtualized_item {
            let mut args = CleanupVirtualizedItem {
                item_index: item,
                container: child,
                cancel: false,
            };
            hook(&mut args);
            if args.cancel {
                vtrace!(item, "cleanup cancelled");
                return false;
            }
        }
        true
    }

    /// Whether the container's last arranged slot still overlaps the viewport.
    fn is_inside_view_location<H: LayoutHost<C>>(&self, host: &H, child: &C, constraint: Size) -> bool {
        let slot = host.layout_slot(child);
        if slot.width <= 0.0 && slot.height <= 0.0 {
            return false;
        }
        let in_viewport = Rect::new(
            slot.x - self.arranged_offset.x,
            slot.y - self.arranged_offset.y,
            slot.width,
            slot.height,
        );
        let viewport = Rect::new(0.0, 0.0, constraint.width, constraint.height);
        in_viewport.intersects(&viewport)
    }

    /// Hands `count` realized children starting at `start` back to the generator.
    fn cleanup_range<G>(&mut self, generator: &mut G, start: usize, count: usize) -> Result<(), G::Error>
    where
        G: ContainerGenerator<Container = C>,
    {
        let position = GeneratorPosition::child(start);
        if self.children.is_recycling() {
            generator.recycle(position, count)?;
            self.children.detach_realized(start, count);
        } else {
            generator.remove(position, count)?;
            self.children.remove_realized(start, count);
        }
        self.window.adjust_first_visible_child_index(start, count);
        vtrace!(start, count, recycling = self.children.is_recycling(), "released containers");
        Ok(())
    }
}

/// Moves child indexes past a released run of `count` children at `start` down by `count`.
fn shift(focused: &mut Option<usize>, protected: &mut Option<(usize, usize)>, start: usize, count: usize) {
    let moved = |index: &mut usize| {
        if *index >= start + count {
            *index -= count;
        }
    };
    if let Some(f) = focused.as_mut() {
        moved(f);
    }
    if let Some((before, after)) = protected.as_mut() {
        moved(before);
        moved(after);
    }
}

use crate::extent::{self, HostExtents};
use crate::float;
use crate::realize::PassResult;
use crate::{
    ContainerGenerator, Error, GeneratorDirection, GeneratorPosition, ItemsChanged,
    ItemsChangedAction, LayoutHost, Size, VirtualizingPanel,
};

impl<C: Clone + PartialEq + core::fmt::Debug> VirtualizingPanel<C> {
    /// Brings the window in line with a collection change the generator already applied.
    pub fn on_items_changed<G, H>(
        &mut self,
        generator: &mut G,
        host: &mut H,
        change: ItemsChanged,
    ) -> PassResult<(), G, H, C>
    where
        G: ContainerGenerator<Container = C>,
        H: LayoutHost<C>,
    {
        vdebug!(
            action = ?change.action,
            position = ?change.position,
            items = change.item_count,
            containers = change.container_count,
            "items changed"
        );

        match change.action {
            ItemsChangedAction::Insert => self.on_items_add(generator, host, change)?,
            ItemsChangedAction::Remove => {
                self.remove_child_range(change.position, change.item_count, change.container_count);
            }
            ItemsChangedAction::Replace => self.on_items_replace(generator, host, change)?,
            ItemsChangedAction::Reset => self.on_clear_children(),
        }

        self.window.total_item_count = generator.item_count();
        self.scroll.max_desired_size = Size::ZERO;
        self.translator.invalidate();
        self.measure_dirty = true;
        self.window.adjust();
        Ok(())
    }

    fn on_items_add<G, H>(&mut self, generator: &mut G, host: &mut H, change: ItemsChanged) -> PassResult<(), G, H, C>
    where
        G: ContainerGenerator<Container = C>,
        H: LayoutHost<C>,
    {
        self.window.total_item_count = generator.item_count();
        if change.item_count != 1 {
            return Ok(());
        }
        let Some(item) = generator.index_from_position(change.position) else {
            return Ok(());
        };

        let was_empty = self.children.visual().is_empty();
        let start = self.window.visible_start_item_index();
        let item_at = item as isize;
        let in_window = start >= 0
            && item_at >= start
            && item_at < start + self.window.visible_count as isize;
        if !in_window && !was_empty {
            return Ok(());
        }
        let in_after_trail = in_window && item_at >= start + self.window.items_per_page() as isize;

        let Some(generated) = generator
            .generate_next(change.position, GeneratorDirection::Forward)
            .map_err(Error::Generator)?
        else {
            return Ok(());
        };
        let child_index = generator.position_from_index(item).child_index();
        let container = self.add_container(child_index, generated);

        if self.window.first_visible_child_index < 0 {
            self.window.first_visible_child_index = 0;
        }
        if self.window.visible_start < 0 {
            self.window.visible_start = (item / self.window.items_per_line.max(1)) as isize;
        }
        host.measure(&container, self.last_child_slot)
            .map_err(Error::Layout)?;

        let child = child_index as isize;
        if child < self.window.first_visible_child_index {
            self.window.visible_start += 1;
            self.window.first_visible_child_index += 1;
            self.window.before_trail += 1;
        } else if in_after_trail {
            self.window.visible_count += 1;
            self.window.after_trail += 1;
        } else {
            let viewport_full = {
                let extents = HostExtents {
                    children: self.children.realized(),
                    host: &*host,
                    orientation: self.options.orientation,
                };
                let dim = extent::realized_dimension(&extents, &self.window);
                let available = self.options.orientation.main(self.last_available);
                !float::less_than(dim.total, available)
            };
            self.window.visible_count += 1;
            if viewport_full && !was_empty {
                self.window.after_trail += 1;
            }
        }
        vtrace!(item, child_index, "inserted container realized");
        Ok(())
    }

    /// Drops the panel's view of `container_count` containers the generator already discarded.
    fn remove_child_range(&mut self, position: GeneratorPosition, _item_count: usize, container_count: usize) {
        let pos = position.index + isize::from(position.offset > 0);
        let Ok(start) = usize::try_from(pos) else {
            return;
        };
        if container_count == 0 || start >= self.children.visual().len() {
            return;
        }

        self.children.remove_realized(start, container_count);

        if position.offset > 0 {
            return;
        }
        for _ in 0..container_count {
            let w = &mut self.window;
            if pos >= w.first_visible_child_index {
                if pos - w.first_visible_child_index >= w.items_per_page() as isize {
                    w.after_trail = w.after_trail.saturating_sub(1);
                }
                w.visible_count = w.visible_count.saturating_sub(1);
            } else {
                w.before_trail = w.before_trail.saturating_sub(1);
                w.first_visible_child_index -= 1;
            }
        }
    }

    fn on_items_replace<G, H>(&mut self, generator: &mut G, host: &mut H, change: ItemsChanged) -> PassResult<(), G, H, C>
    where
        G: ContainerGenerator<Container = C>,
        H: LayoutHost<C>,
    {
        if change.container_count == 0 {
            return Ok(());
        }
        let saved = self.window;
        self.remove_child_range(change.position, change.item_count, change.container_count);

        let Some(generated) = generator
            .generate_next(change.position, GeneratorDirection::Forward)
            .map_err(Error::Generator)?
        else {
            return Ok(());
        };
        let container = self.add_container(change.position.child_index(), generated);

        // Same number of containers, same window.
        self.window.before_trail = saved.before_trail;
        self.window.visible_count = saved.visible_count;
        self.window.after_trail = saved.after_trail;
        self.window.first_visible_child_index = saved.first_visible_child_index;
        self.window.visible_start = saved.visible_start;

        host.measure(&container, self.last_child_slot)
            .map_err(Error::Layout)?;
        Ok(())
    }

    fn on_clear_children(&mut self) {
        self.children.clear();
        self.window.reset();
        self.snap.reset();
    }
}

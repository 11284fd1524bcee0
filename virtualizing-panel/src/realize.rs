//! The layout passes: measure realizes the window, arrange places it.

use crate::extent::{self, HostExtents, LineMetrics};
use crate::float;
use crate::{
    ContainerGenerator, Error, Generated, GeneratorDirection, GeneratorPosition, ItemsPerLine,
    LayoutHost, LogicalPosition, Point, Rect, ScrollSnapshot, Size,
    VirtualizingPanel,
};

/// Where containers outside the window are parked.
pub(crate) const OFFSCREEN: f64 = -10000.0;

pub(crate) type PassResult<T, G, H, C> =
    Result<T, Error<<G as ContainerGenerator>::Error, <H as LayoutHost<C>>::Error>>;

/// Everything a failed measure must put back.
struct Checkpoint {
    window: crate::CacheWindow,
    scroll: ScrollSnapshot,
    max_desired_size: Size,
    has_layout: bool,
    precache_before: f64,
    precache_after: f64,
}

/// Running totals of one measure pass along the stacking axis.
#[derive(Clone, Copy, Debug)]
struct Stack {
    /// Desired size along the stacking axis.
    main: f64,
    /// Widest line across the stacking axis.
    cross: f64,
}

impl<C: Clone + PartialEq + core::fmt::Debug> VirtualizingPanel<C> {
    /// Realizes the containers for the current offset and reports the desired size.
    ///
    /// A nested call (a collaborator measuring the panel from inside a pass) returns the last
    /// desired size. When the generator or the host fails, the window and the scroll values are
    /// left as they were before the pass.
    pub fn measure<G, H>(
        &mut self,
        generator: &mut G,
        host: &mut H,
        available: Size,
    ) -> PassResult<Size, G, H, C>
    where
        G: ContainerGenerator<Container = C>,
        H: LayoutHost<C>,
    {
        if self.in_measure {
            vwarn!("re-entrant measure ignored");
            return Ok(self.last_desired);
        }

        self.in_measure = true;
        let checkpoint = Checkpoint {
            window: self.window,
            scroll: self.scroll.snapshot(),
            max_desired_size: self.scroll.max_desired_size,
            has_layout: self.scroll.has_layout,
            precache_before: self.precache_before,
            precache_after: self.precache_after,
        };
        let result = self.measure_pass(generator, host, available);
        self.in_measure = false;

        match result {
            Ok(desired) => {
                self.last_desired = desired;
                self.measure_dirty = false;
                Ok(desired)
            }
            Err(err) => {
                vwarn!("measure failed, restoring the previous window");
                self.window = checkpoint.window;
                self.scroll.offset = checkpoint.scroll.offset;
                self.scroll.computed_offset = checkpoint.scroll.computed_offset;
                self.scroll.viewport = checkpoint.scroll.viewport;
                self.scroll.extent = checkpoint.scroll.extent;
                self.scroll.max_desired_size = checkpoint.max_desired_size;
                self.scroll.has_layout = checkpoint.has_layout;
                self.precache_before = checkpoint.precache_before;
                self.precache_after = checkpoint.precache_after;
                // Containers realized before the failure stay; re-anchor on the generator.
                self.window.first_visible_child_index = self.first_visible_child(generator);
                self.translator.invalidate();
                self.measure_dirty = true;
                Err(err)
            }
        }
    }

    fn measure_pass<G, H>(
        &mut self,
        generator: &mut G,
        host: &mut H,
        available: Size,
    ) -> PassResult<Size, G, H, C>
    where
        G: ContainerGenerator<Container = C>,
        H: LayoutHost<C>,
    {
        let o = self.options.orientation;
        let virtualizing = self.options.is_virtualizing;
        let zoom = self.scroll.zoom_factor();

        let mut constraint = available;
        o.set_main(&mut constraint, o.main(available) / zoom);
        let viewport_main = o.main(constraint);

        let mut slot = constraint;
        o.set_main(&mut slot, f64::INFINITY);
        if self.scroll.can_scroll_along(o.cross()) {
            o.set_cross(&mut slot, f64::INFINITY);
        }

        if float::less_than(constraint.width, self.last_available.width)
            || float::less_than(constraint.height, self.last_available.height)
        {
            self.scroll.max_desired_size = Size::ZERO;
        }
        self.last_available = constraint;
        self.last_child_slot = slot;

        let item_count = generator.item_count();
        self.window.total_item_count = item_count;
        self.window.items_per_line = self.resolve_items_per_line(generator, host, constraint, slot)?;
        let ipl = self.window.items_per_line;
        let line_count = self.window.line_count();

        let mut first = LogicalPosition::from_offset(self.scroll.offset_along(o), line_count);
        self.window.visible_start = first.item_index;

        vdebug!(
            item_count,
            line_count,
            items_per_line = ipl,
            offset = first.to_offset(),
            viewport = viewport_main,
            "measure"
        );

        if virtualizing {
            self.cleanup_containers(generator, host, constraint)?;
        }

        if let Some(index) = self.index_to_ensure_in_view.take() {
            if let Some(corrected) =
                self.correct_offset_for_scroll_into_view(generator, host, index, viewport_main, slot)?
            {
                first = corrected;
                self.window.visible_start = first.item_index;
            }
        }

        let budget = if self.scroll.is_in_direct_manipulation_zoom() {
            self.window.visible_count + self.window.before_trail
        } else {
            item_count
        };

        let vs_line = first.item_index.max(0) as usize;
        let vs_item = vs_line * ipl;
        let fraction = first.fraction;

        self.window.visible_start = if item_count == 0 { -1 } else { vs_line as isize };
        self.window.first_visible_child_index = if item_count == 0 {
            -1
        } else {
            generator.position_from_index(vs_item).child_index() as isize
        };
        self.window.visible_count = 0;
        self.window.before_trail = 0;
        self.window.after_trail = 0;
        self.precache_before = 0.0;
        self.precache_after = 0.0;

        let precache_window = if virtualizing {
            self.options.precache_window
        } else {
            0.0
        };
        let cross_available = o.cross_of(constraint);
        let mut stack = Stack {
            main: 0.0,
            cross: if cross_available.is_finite() { cross_available } else { 0.0 },
        };
        let mut space = viewport_main;
        let mut last_viewport: Option<usize> = None;
        let mut fill_remaining_space = true;

        let mut item = vs_item;
        let mut line = vs_line;
        let mut line_logical = 0.0;
        let mut line_cross = 0.0;
        while item < item_count {
            let position = generator.position_from_index(item);
            let Some(generated) = generator
                .generate_next(position, GeneratorDirection::Forward)
                .map_err(Error::Generator)?
            else {
                break;
            };
            let child = self.add_container(position.child_index(), generated);
            let size = host.measure(&child, slot).map_err(Error::Layout)?;
            self.window.visible_count += 1;

            let column = (item - vs_item) % ipl;
            if column == 0 {
                let main = o.main(size);
                line_logical = if line == vs_line {
                    self.precache_before = main * fraction;
                    main * (1.0 - fraction)
                } else {
                    main
                };
                line_cross = 0.0;
                stack.main += line_logical;
                if last_viewport.is_none() {
                    space -= line_logical;
                    if float::less_than_or_close(space, 0.0) {
                        last_viewport = Some(line);
                        self.precache_after = -space;
                    }
                }
            }
            line_cross += o.cross_of(size);
            stack.cross = float::max(stack.cross, line_cross);

            item += 1;
            let line_done = column + 1 == ipl || item == item_count;

            if virtualizing {
                if self.window.visible_count + self.window.before_trail >= budget {
                    fill_remaining_space = float::greater_than(self.precache_before, 0.0)
                        && float::less_than(stack.main, viewport_main);
                    break;
                }
                if float::less_than_or_close(viewport_main, stack.main) {
                    fill_remaining_space = false;
                    if last_viewport.is_some_and(|last| last != line) {
                        self.window.after_trail += 1;
                        if column == 0 {
                            self.precache_after += line_logical;
                        }
                    }
                    if line_done
                        && self.window.after_trail > 0
                        && self.precache_after >= precache_window - space
                    {
                        break;
                    }
                }
            }
            if line_done {
                line += 1;
            }
        }

        if self.children.realized().is_empty() {
            self.window.first_visible_child_index = -1;
        }

        let logical_cross = stack.cross * zoom;
        let extent_cross = if self.scroll.is_in_child_invalidate_measure() {
            float::max(logical_cross, o.cross_of(self.scroll.extent))
        } else {
            logical_cross
        };
        let extent = o.size(line_count as f64, extent_cross);

        if fill_remaining_space && item_count > 0 {
            self.generate_previous_items(generator, host, &mut space, &mut stack, slot, true, budget)?;
        }

        let measure_buffers = virtualizing && self.options.measure_buffers;
        if item_count > 0 {
            let mut pre_cache = if measure_buffers {
                precache_window + float::max(0.0, precache_window - self.precache_after)
            } else {
                0.0
            };
            self.generate_previous_items(generator, host, &mut pre_cache, &mut stack, slot, false, budget)?;
        }

        let mut unused = float::max(0.0, precache_window - self.precache_before);
        let mut next = self.window.visible_start_item_index().max(0) as usize + self.window.visible_count;
        if measure_buffers && unused > 0.0 {
            while unused > 0.0
                && next < item_count
                && self.window.visible_count + self.window.before_trail < budget
            {
                let position = generator.position_from_index(next);
                let Some(generated) = generator
                    .generate_next(position, GeneratorDirection::Forward)
                    .map_err(Error::Generator)?
                else {
                    break;
                };
                let child = self.add_container(position.child_index(), generated);
                let size = host.measure(&child, slot).map_err(Error::Layout)?;
                self.window.visible_count += 1;
                self.window.after_trail += 1;
                if next % ipl == 0 {
                    let main = o.main(size);
                    stack.main += main;
                    self.precache_after += main;
                    unused -= main;
                }
                stack.cross = float::max(stack.cross, o.cross_of(size));
                next += 1;
            }
        }

        let mut desired = o.size(stack.main, stack.cross);
        self.update_logical_scroll_data(host, &mut desired, constraint, space, extent, last_viewport);

        let viewport_pixels = if o.main(available).is_finite() {
            o.main(available)
        } else {
            0.0
        };
        if !float::are_close(self.viewport_pixels, viewport_pixels) {
            self.viewport_pixels = viewport_pixels;
            if let Some(owner) = self.scroll.owner() {
                owner.invalidate_scroll_info();
            }
        }

        if virtualizing {
            self.cleanup_containers(generator, host, constraint)?;
            if self.children.is_recycling() {
                self.children.collect_recycled();
            }
        }
        self.translator.invalidate();

        vtrace!(
            visible_start = self.window.visible_start,
            first_visible_child = self.window.first_visible_child_index,
            before_trail = self.window.before_trail,
            visible = self.window.visible_count,
            after_trail = self.window.after_trail,
            cache_start = self.window.cache_start,
            "measure done"
        );

        let main = o.main(desired) * zoom;
        o.set_main(&mut desired, main);
        Ok(desired)
    }

    fn resolve_items_per_line<G, H>(
        &mut self,
        generator: &mut G,
        host: &mut H,
        constraint: Size,
        slot: Size,
    ) -> PassResult<usize, G, H, C>
    where
        G: ContainerGenerator<Container = C>,
        H: LayoutHost<C>,
    {
        let policy = self.options.items_per_line;
        let ItemsPerLine::Fit { .. } = policy else {
            return Ok(policy.resolve(0.0, 0.0));
        };

        let o = self.options.orientation;
        let item_cross = match self.children.realized().first() {
            Some(first) => o.cross_of(host.desired_size(first)),
            None if generator.item_count() > 0 => {
                let position = generator.position_from_index(0);
                match generator
                    .generate_next(position, GeneratorDirection::Forward)
                    .map_err(Error::Generator)?
                {
                    Some(generated) => {
                        let child = self.add_container(position.child_index(), generated);
                        o.cross_of(host.measure(&child, slot).map_err(Error::Layout)?)
                    }
                    None => 0.0,
                }
            }
            None => 0.0,
        };
        Ok(policy.resolve(o.cross_of(constraint), item_cross))
    }

    /// Walks backwards from the first visible child, realizing whole lines.
    ///
    /// With `adjust` the lines fill viewport space left at the end of the list and the offset moves
    /// back with them; otherwise they form the before trail.
    #[allow(clippy::too_many_arguments)]
    fn generate_previous_items<G, H>(
        &mut self,
        generator: &mut G,
        host: &mut H,
        space: &mut f64,
        stack: &mut Stack,
        slot: Size,
        adjust: bool,
        budget: usize,
    ) -> PassResult<(), G, H, C>
    where
        G: ContainerGenerator<Container = C>,
        H: LayoutHost<C>,
    {
        let o = self.options.orientation;
        let ipl = self.window.items_per_line.max(1);
        let realized_count = self.children.realized().len();

        let child_index = self.window.first_visible_child_index;
        let mut child_offset = 0.0;
        if child_index >= 0 && (child_index as usize) < realized_count {
            let first = &self.children.realized()[child_index as usize];
            let main = o.main(host.desired_size(first));
            let offset = self.scroll.offset_along(o);
            child_offset = main * float::fractional(offset);
            stack.main += child_offset;
            if adjust {
                self.scroll.set_offset_along(o, float::floor(offset));
                self.precache_before = 0.0;
            }
        }
        let Ok(mut child_index) = usize::try_from(child_index.max(0)) else {
            return Ok(());
        };

        let mut has_remaining = float::greater_than(*space, child_offset);
        *space -= child_offset;
        let mut line_main = 0.0;

        while (has_remaining || (!adjust && self.window.before_trail == 0))
            && self.window.visible_count + self.window.before_trail < budget
        {
            let mut exhausted = false;
            let mut line_cross = 0.0;
            for _ in 0..ipl {
                let size = if self.previous_child_is_generated(generator, child_index) {
                    child_index -= 1;
                    let child = self.children.realized()[child_index].clone();
                    host.measure(&child, slot).map_err(Error::Layout)?
                } else {
                    match self.generate_previous_child(generator, host, child_index, slot)? {
                        Some(size) => size,
                        None => {
                            exhausted = true;
                            break;
                        }
                    }
                };
                line_main = o.main(size);
                line_cross += o.cross_of(size);
            }
            if exhausted {
                break;
            }

            if adjust {
                let offset = self.scroll.offset_along(o);
                self.scroll.set_offset_along(o, offset - 1.0);
            }

            has_remaining = float::greater_than(*space, line_main);
            *space -= line_main;
            stack.main += line_main;
            if float::less_than(*space, 0.0) {
                stack.main += *space;
            }
            stack.cross = float::max(stack.cross, line_cross);

            if adjust {
                self.window.visible_count += ipl;
            } else {
                self.precache_before += line_main;
                self.window.before_trail += ipl;
            }
        }

        if float::is_infinite(*space) {
            *space = 0.0;
        }

        if adjust {
            if float::less_than(*space, 0.0) {
                if line_main > 0.0 {
                    let offset = self.scroll.offset_along(o);
                    self.scroll
                        .set_offset_along(o, offset + 1.0 - (line_main + *space) / line_main);
                }
                self.precache_before = -*space;
                *space = 0.0;
            }
            self.window.first_visible_child_index = child_index as isize;
            self.window.visible_start = if realized_count == 0 {
                0
            } else {
                generator
                    .index_from_position(GeneratorPosition::child(child_index))
                    .map_or(0, |item| (item / ipl) as isize)
            };
        }
        Ok(())
    }

    /// Whether the item just before realized child `child_index` is realized too.
    fn previous_child_is_generated<G>(&self, generator: &G, child_index: usize) -> bool
    where
        G: ContainerGenerator<Container = C>,
    {
        let Some(item) = generator.index_from_position(GeneratorPosition::child(child_index)) else {
            return false;
        };
        item > 0 && generator.position_from_index(item - 1).is_realized()
    }

    /// Realizes the item before realized child `child_index` and inserts it at that slot.
    fn generate_previous_child<G, H>(
        &mut self,
        generator: &mut G,
        host: &mut H,
        child_index: usize,
        slot: Size,
    ) -> PassResult<Option<Size>, G, H, C>
    where
        G: ContainerGenerator<Container = C>,
        H: LayoutHost<C>,
    {
        let Some(item) = generator.index_from_position(GeneratorPosition::child(child_index)) else {
            return Ok(None);
        };
        let Some(previous) = item.checked_sub(1) else {
            return Ok(None);
        };
        let position = generator.position_from_index(previous);
        let Some(generated) = generator
            .generate_next(position, GeneratorDirection::Backward)
            .map_err(Error::Generator)?
        else {
            return Ok(None);
        };
        let child = self.add_container(child_index, generated);
        if child_index as isize <= self.window.first_visible_child_index {
            self.window.first_visible_child_index += 1;
        }
        let size = host.measure(&child, slot).map_err(Error::Layout)?;
        Ok(Some(size))
    }

    /// Publishes offset, viewport and extent, and folds `desired` into the desired-size floor.
    fn update_logical_scroll_data<H: LayoutHost<C>>(
        &mut self,
        host: &H,
        desired: &mut Size,
        constraint: Size,
        space: f64,
        extent: Size,
        last_viewport: Option<usize>,
    ) {
        let o = self.options.orientation;
        let line_count = self.window.line_count();
        let visible_start = self.window.visible_start.max(0);
        let last = last_viewport.map_or(line_count as isize - 1, |line| line as isize);

        let mut offset = self.scroll.offset;
        if self.options.item_based_scrolling {
            o.set_point_main(&mut offset, visible_start as f64);
        }

        let logical_viewport = (last - visible_start) as f64;
        let child_main = usize::try_from(self.window.first_visible_child_index)
            .ok()
            .and_then(|child| self.children.realized().get(child))
            .map_or(0.0, |child| o.main(host.desired_size(child)));
        let logical_delta = if self.options.item_based_scrolling {
            if float::greater_than_or_close(space, 0.0) { 1.0 } else { 0.0 }
        } else {
            let whole = if child_main != 0.0 {
                (child_main + space) / child_main
            } else {
                0.0
            };
            whole - float::fractional(o.point_main(offset))
        };

        let mut viewport = constraint;
        o.set_main(&mut viewport, float::max(logical_viewport + logical_delta, 0.0));
        if line_count as f64 > o.main(viewport) && o.main(constraint).is_finite() {
            o.set_main(desired, o.main(constraint));
        }

        offset.x = float::max(0.0, float::min(offset.x, extent.width - viewport.width));
        offset.y = float::max(0.0, float::min(offset.y, extent.height - viewport.height));
        desired.width = float::min(desired.width, constraint.width);
        desired.height = float::min(desired.height, constraint.height);

        let floor = &mut self.scroll.max_desired_size;
        let cross = float::max(o.cross_of(*desired), o.cross_of(*floor));
        *floor = o.size(o.main(*desired), cross);
        *desired = *floor;

        self.scroll.set_and_verify(viewport, extent, offset);
    }

    /// Places a container handed out by the generator at realized slot `child_index`.
    pub(crate) fn add_container(&mut self, child_index: usize, generated: Generated<C>) -> C {
        let Generated {
            container,
            newly_realized,
        } = generated;
        if self
            .children
            .add_from_generator(child_index, container.clone(), newly_realized)
        {
            vtrace!(child_index, newly_realized, "container placed");
        }
        container
    }

    /// Realized-child index of the first visible item, `-1` when it is not realized.
    pub(crate) fn first_visible_child<G>(&self, generator: &G) -> isize
    where
        G: ContainerGenerator<Container = C>,
    {
        let start = self.window.visible_start_item_index();
        if start < 0 || self.children.realized().is_empty() {
            return -1;
        }
        let position = generator.position_from_index(start as usize);
        position.child_index() as isize
    }

    /// Places the window's children along the stacking axis and parks everything else.
    pub fn arrange<H: LayoutHost<C>>(&mut self, host: &mut H, final_size: Size) -> Result<Size, H::Error> {
        let o = self.options.orientation;
        let ipl = self.window.items_per_line.max(1);
        let window = self.window;

        let (start, viewport_origin) = {
            let extents = HostExtents {
                children: self.children.realized(),
                host: &*host,
                orientation: o,
            };
            let dim = extent::realized_dimension(&extents, &window);
            let metrics = LineMetrics::new(&extents, &window, 1.0);
            (
                extent::unrealized_before(dim, &window),
                metrics.logical_to_pixel(self.scroll.offset_along(o)),
            )
        };

        let cross_final = o.cross_of(final_size);
        let first_in_window = window.first_visible_child_index - window.before_trail as isize;
        let mut main = start;
        let mut line_main = 0.0;
        let mut line_cross = 0.0;
        for (index, child) in self.children.realized().iter().enumerate() {
            let desired = host.desired_size(child);
            if !window.contains_child(index) {
                host.arrange(child, offscreen(desired))?;
                continue;
            }
            let column = (index as isize - first_in_window) as usize % ipl;
            if column == 0 {
                main += line_main;
                line_main = o.main(desired);
                line_cross = 0.0;
            }
            let cross = if ipl == 1 {
                float::max(cross_final, o.cross_of(desired))
            } else {
                o.cross_of(desired)
            };
            let rect = Rect::from_origin_size(o.point(main, line_cross), o.size(o.main(desired), cross));
            host.arrange(child, rect)?;
            line_cross += cross;
        }
        for child in self.children.parked() {
            let desired = host.desired_size(child);
            host.arrange(child, offscreen(desired))?;
        }

        self.arranged_offset = o.point(viewport_origin, o.point_cross(self.scroll.offset));
        self.notify_snap_points_changes(&*host);
        self.ignoring_transitions = false;
        if core::mem::take(&mut self.notify_layout_refresh) {
            if let Some(owner) = self.scroll.owner() {
                owner.notify_layout_refreshed();
            }
        }
        vtrace!(start, "arrange done");
        Ok(final_size)
    }
}

fn offscreen(size: Size) -> Rect {
    Rect::from_origin_size(Point::new(OFFSCREEN, OFFSCREEN), size)
}

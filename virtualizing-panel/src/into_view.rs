use crate::extent::{HostExtents, LineMetrics};
use crate::float;
use crate::realize::PassResult;
use crate::{
    AlignmentRatios, ContainerGenerator, Error, GeneratorDirection, InvalidOffset, LayoutHost,
    LogicalPosition, Orientation, Point, Rect, ScrollIntoViewAlignment, Size, VirtualizingPanel,
};

impl<C: Clone + PartialEq + core::fmt::Debug> VirtualizingPanel<C> {
    /// Scrolls so that item `index` becomes visible.
    ///
    /// `Leading` makes the item's line the first visible one. `Default` does nothing when the item
    /// is already visible, scrolls back to it when it is before the viewport, and otherwise puts
    /// it at the trailing edge. When the lines before the item are not realized, the trailing
    /// position is estimated and corrected by the next measure. The last request wins.
    pub fn scroll_into_view<H: LayoutHost<C>>(
        &mut self,
        host: &H,
        index: usize,
        alignment: ScrollIntoViewAlignment,
    ) -> Result<(), InvalidOffset> {
        let o = self.options.orientation;
        let line = (index / self.window.items_per_line.max(1)) as f64;
        vtrace!(index, ?alignment, "scroll into view");

        match alignment {
            ScrollIntoViewAlignment::Leading => self.set_offset_along(o, line),
            ScrollIntoViewAlignment::Default => {
                let offset = self.scroll.offset_along(o);
                let viewport = o.main(self.scroll.viewport);
                if offset - line > 0.0 || viewport < 1.0 {
                    self.set_offset_along(o, line)
                } else if offset + viewport < line + 1.0 {
                    let (target, deferred) = self.estimated_offset_for_scroll_into_view(host, index, viewport);
                    self.set_offset_along(o, target)?;
                    self.index_to_ensure_in_view = deferred;
                    if deferred.is_some() {
                        self.measure_dirty = true;
                    }
                    Ok(())
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Offset that puts item `index` at the trailing edge, from the realized lines before it.
    ///
    /// Returns the item index again when those lines are not realized and the estimate needs a
    /// correction during measure.
    fn estimated_offset_for_scroll_into_view<H: LayoutHost<C>>(
        &self,
        host: &H,
        index: usize,
        viewport: f64,
    ) -> (f64, Option<usize>) {
        let ipl = self.window.items_per_line.max(1);
        let target_line = (index / ipl) as isize;
        let estimate = target_line as f64 - viewport + 1.0;

        let extents = HostExtents {
            children: self.children.realized(),
            host,
            orientation: self.options.orientation,
        };
        let metrics = LineMetrics::new(&extents, &self.window, 1.0);
        let mut remaining = self.options.orientation.main(self.last_available);
        let mut line = target_line;
        while line >= 0 {
            if metrics.child_for_line(line).is_none() {
                return (estimate, Some(index));
            }
            let size = metrics.line_size(line);
            if size >= remaining && size > 0.0 {
                return (line as f64 + (size - remaining) / size, None);
            }
            remaining -= size;
            line -= 1;
        }
        (0.0, None)
    }

    /// Realizes lines backwards from the pending scroll-into-view target until the viewport is
    /// full, then returns the offset that puts the target at the trailing edge.
    pub(crate) fn correct_offset_for_scroll_into_view<G, H>(
        &mut self,
        generator: &mut G,
        host: &mut H,
        index: usize,
        viewport: f64,
        slot: Size,
    ) -> PassResult<Option<LogicalPosition>, G, H, C>
    where
        G: ContainerGenerator<Container = C>,
        H: LayoutHost<C>,
    {
        let count = generator.item_count();
        if count == 0 {
            return Ok(None);
        }
        let o = self.options.orientation;
        let ipl = self.window.items_per_line.max(1);

        let mut line = (index.min(count - 1) / ipl) as isize;
        let mut used = 0.0;
        let mut last_size = 0.0;
        while used < viewport && line >= 0 {
            let item = line as usize * ipl;
            let position = generator.position_from_index(item);
            let Some(generated) = generator
                .generate_next(position, GeneratorDirection::Backward)
                .map_err(Error::Generator)?
            else {
                break;
            };
            let child = self.add_container(position.child_index(), generated);
            let size = host.measure(&child, slot).map_err(Error::Layout)?;
            last_size = o.main(size);
            used += last_size;
            line -= 1;
        }
        line += 1;

        if used >= viewport && last_size > 0.0 {
            let offset = line as f64 + (used - viewport) / last_size;
            self.scroll.set_offset_along(o, offset);
            self.notify_layout_refresh = true;
            vdebug!(index, offset, "scroll into view corrected");
            return Ok(Some(LogicalPosition::from_offset(offset, self.window.line_count())));
        }
        Ok(None)
    }

    /// Scrolls a sub-rectangle of a realized container into view.
    ///
    /// `rect` is relative to the container. Along each axis the rectangle is aligned at the
    /// given ratio of the viewport, or moved the minimum distance when no ratio is given; `extra`
    /// is added to the resulting pixel offsets. Returns the rectangle in viewport coordinates, or
    /// an empty rectangle for a container that is not realized inside the window.
    pub fn make_visible<H: LayoutHost<C>>(
        &mut self,
        host: &H,
        container: &C,
        rect: Rect,
        alignment: AlignmentRatios,
        extra: Point,
    ) -> Result<Rect, InvalidOffset> {
        let Some(child) = self.children.realized().iter().position(|c| c == container) else {
            return Ok(Rect::EMPTY);
        };
        if !self.window.contains_child(child) {
            return Ok(Rect::EMPTY);
        }

        let slot = host.layout_slot(container);
        let target = Rect::new(slot.x + rect.x, slot.y + rect.y, rect.width, rect.height);
        let stacking = self.options.orientation;
        let zoom = self.scroll.zoom_factor();
        let current_main = self.logical_to_pixel_offset(host, self.scroll.offset_along(stacking)) / zoom;

        let mut origin = Point::ZERO;
        for axis in [Orientation::Horizontal, Orientation::Vertical] {
            let (current, viewport) = if axis == stacking {
                (current_main, self.viewport_pixels / zoom)
            } else {
                (self.scroll.offset_along(axis), axis.main(self.scroll.viewport))
            };
            let start = axis.point_main(target.origin());
            let length = axis.main(target.size());

            let mut wanted = match alignment.along(axis) {
                Some(ratio) => start - ratio * (viewport - length),
                None if start < current => start,
                None if start + length > current + viewport => {
                    float::min(start, start + length - viewport)
                }
                None => current,
            };
            wanted += axis.point_main(extra);

            let delta = wanted - current;
            if delta != 0.0 {
                let next = if axis == stacking {
                    self.translate_pixel_delta(host, axis, delta * zoom).offset
                } else {
                    wanted
                };
                self.set_offset_along(axis, next)?;
            }
            let moved = if axis == stacking {
                self.logical_to_pixel_offset(host, self.scroll.offset_along(axis)) / zoom
            } else {
                self.scroll.offset_along(axis)
            };
            axis.set_point_main(&mut origin, start - moved);
        }

        Ok(Rect::from_origin_size(origin, target.size()))
    }
}

//! Extent estimation from the realized containers.
//!
//! Unrealized lines are assumed to be as large as the average realized line. The estimate is
//! exact for uniform items and converges to the true extent as more lines get realized.

use crate::float;
use crate::{CacheWindow, LayoutHost, Orientation};

/// Main-axis sizes of the realized children, by realized index.
pub(crate) trait ChildExtents {
    fn len(&self) -> usize;
    fn main_size(&self, child: usize) -> f64;
}

impl ChildExtents for [f64] {
    fn len(&self) -> usize {
        <[f64]>::len(self)
    }

    fn main_size(&self, child: usize) -> f64 {
        self[child]
    }
}

/// Reads realized children sizes from the layout host.
pub(crate) struct HostExtents<'a, C, H> {
    pub children: &'a [C],
    pub host: &'a H,
    pub orientation: Orientation,
}

impl<C, H: LayoutHost<C>> ChildExtents for HostExtents<'_, C, H> {
    fn len(&self) -> usize {
        self.children.len()
    }

    fn main_size(&self, child: usize) -> f64 {
        self.orientation
            .main(self.host.desired_size(&self.children[child]))
    }
}

/// Summed main size of the realized window, folded into lines.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RealizedDimension {
    pub total: f64,
    pub lines: usize,
}

impl RealizedDimension {
    pub fn average_line(&self) -> f64 {
        if self.lines == 0 {
            0.0
        } else {
            self.total / self.lines as f64
        }
    }
}

/// Sums the children of the window, `[first_visible - before_trail, first_visible + visible_count)`.
///
/// With several items per line a partial last line is padded with the average item, then the
/// total is divided by the line width.
pub(crate) fn realized_dimension<E: ChildExtents + ?Sized>(
    extents: &E,
    window: &CacheWindow,
) -> RealizedDimension {
    if window.first_visible_child_index < 0 {
        return RealizedDimension::default();
    }
    let fvci = window.first_visible_child_index as usize;
    let start = fvci.saturating_sub(window.before_trail);
    let end = (fvci + window.visible_count).min(extents.len());
    if start >= end {
        return RealizedDimension::default();
    }

    let count = end - start;
    let mut total: f64 = (start..end).map(|i| extents.main_size(i)).sum();

    let ipl = window.items_per_line.max(1);
    if ipl == 1 {
        return RealizedDimension {
            total,
            lines: count,
        };
    }

    let rem = count % ipl;
    if rem != 0 {
        total += (ipl - rem) as f64 * total / count as f64;
    }
    RealizedDimension {
        total: total / ipl as f64,
        lines: count.div_ceil(ipl),
    }
}

/// `realized + average * (line_count - realized_lines)`, or 0 when nothing is realized.
pub(crate) fn estimate_extent(dim: RealizedDimension, line_count: usize) -> f64 {
    if dim.lines == 0 {
        return 0.0;
    }
    let missing = line_count as f64 - dim.lines as f64;
    dim.total + dim.average_line() * missing
}

/// Estimated size of the unrealized lines before the window.
pub(crate) fn unrealized_before(dim: RealizedDimension, window: &CacheWindow) -> f64 {
    let ipl = window.items_per_line.max(1) as isize;
    let lines = window.visible_start - window.before_trail as isize / ipl;
    if lines > 0 {
        lines as f64 * dim.average_line()
    } else {
        0.0
    }
}

/// Per-line sizes around the window: measured inside it, averaged outside.
pub(crate) struct LineMetrics<'a, E: ?Sized> {
    extents: &'a E,
    window: CacheWindow,
    average: f64,
    zoom: f64,
}

impl<'a, E: ChildExtents + ?Sized> LineMetrics<'a, E> {
    pub fn new(extents: &'a E, window: &CacheWindow, zoom: f64) -> Self {
        let dim = realized_dimension(extents, window);
        Self {
            extents,
            window: *window,
            average: dim.average_line(),
            zoom,
        }
    }

    /// Realized child heading `line`, if that line is part of the window.
    pub fn child_for_line(&self, line: isize) -> Option<usize> {
        let w = &self.window;
        if w.first_visible_child_index < 0 || w.visible_start < 0 {
            return None;
        }
        let ipl = w.items_per_line.max(1) as isize;
        let child = w.first_visible_child_index + (line - w.visible_start) * ipl;
        let first = (w.first_visible_child_index - w.before_trail as isize).max(0);
        let end = (w.first_visible_child_index + w.visible_count as isize)
            .min(self.extents.len() as isize);
        (child >= first && child < end).then_some(child as usize)
    }

    pub fn line_size(&self, line: isize) -> f64 {
        let size = match self.child_for_line(line) {
            Some(child) => self.extents.main_size(child),
            None => self.average,
        };
        size * self.zoom
    }

    /// Pixel position of logical offset `logical`.
    pub fn logical_to_pixel(&self, logical: f64) -> f64 {
        if logical <= 0.0 {
            return 0.0;
        }
        let whole = float::floor(logical) as isize;
        let frac = float::fractional(logical);

        // Realized lines are summed one by one, everything else counts as an average line.
        let w = &self.window;
        let lo = w.visible_start - w.before_trail as isize - 1;
        let hi = w.visible_start + w.visible_count as isize + 1;
        let mut pixels = 0.0;
        let mut realized = 0isize;
        for line in lo.max(0)..hi.min(whole) {
            if self.child_for_line(line).is_some() {
                pixels += self.line_size(line);
                realized += 1;
            }
        }
        pixels += (whole - realized) as f64 * self.average * self.zoom;
        pixels + frac * self.line_size(whole)
    }
}

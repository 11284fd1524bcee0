use crate::float;

/// How far a panel is scrolled, in line units: a line index plus the fraction of that line
/// scrolled out of view.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogicalPosition {
    /// `-1` when there is nothing to show.
    pub item_index: isize,
    /// In `[0, 1)`.
    pub fraction: f64,
}

impl LogicalPosition {
    pub const fn new(item_index: isize, fraction: f64) -> Self {
        Self {
            item_index,
            fraction,
        }
    }

    /// Splits a logical offset, clamping the whole part to `[-1, line_count - 1]`.
    pub fn from_offset(offset: f64, line_count: usize) -> Self {
        let last = line_count as f64 - 1.0;
        let whole = float::floor(offset);
        let item_index = float::clamp(whole, -1.0, last) as isize;
        Self {
            item_index,
            fraction: float::fractional(offset),
        }
    }

    pub fn to_offset(self) -> f64 {
        self.item_index as f64 + self.fraction
    }
}

/// The realized window: which lines are visible and how many containers buffer them.
///
/// Counts are in containers, `visible_start` is a line index. `visible_count` includes the after
/// trail; the strictly visible containers are `visible_count - after_trail`.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheWindow {
    pub cache_start: usize,
    pub before_trail: usize,
    pub visible_count: usize,
    pub after_trail: usize,
    /// Realized-child index of the first visible container, `-1` when none is realized.
    pub first_visible_child_index: isize,
    /// First visible line, `-1` when none.
    pub visible_start: isize,
    pub items_per_line: usize,
    pub total_item_count: usize,
}

impl Default for CacheWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheWindow {
    pub const fn new() -> Self {
        Self {
            cache_start: 0,
            before_trail: 0,
            visible_count: 0,
            after_trail: 0,
            first_visible_child_index: -1,
            visible_start: -1,
            items_per_line: 1,
            total_item_count: 0,
        }
    }

    /// Forgets every realized container, as when the children are cleared.
    pub fn reset(&mut self) {
        self.visible_start = -1;
        self.first_visible_child_index = -1;
        self.before_trail = 0;
        self.after_trail = 0;
        self.visible_count = 0;
    }

    pub fn line_count(&self) -> usize {
        let ipl = self.items_per_line.max(1);
        self.total_item_count.div_ceil(ipl)
    }

    /// Item index of the first visible container.
    pub fn visible_start_item_index(&self) -> isize {
        self.visible_start * self.items_per_line.max(1) as isize
    }

    /// One past the last item index the cache window covers.
    pub fn cache_end(&self) -> usize {
        self.cache_start + self.before_trail + self.visible_count
    }

    /// Containers inside the viewport, excluding both trails.
    pub fn items_per_page(&self) -> usize {
        self.visible_count.saturating_sub(self.after_trail)
    }

    pub fn last_item_index_in_viewport(&self) -> isize {
        self.visible_start_item_index() + self.items_per_page() as isize - 1
    }

    /// Slides `cache_start` the minimum distance that keeps the realized range inside the cache.
    pub fn adjust(&mut self) {
        if self.total_item_count == 0 {
            self.cache_start = 0;
            return;
        }

        let start = self.visible_start_item_index();
        let mut first = (start - self.before_trail as isize).max(0) as usize;
        let mut last = (start + self.visible_count as isize - 1).max(0) as usize;

        if last >= self.total_item_count {
            last = self.total_item_count - 1;
            first = (last as isize - self.visible_count as isize - self.before_trail as isize + 1)
                .max(0) as usize;
        }

        let cache_last = (self.cache_end() as isize - 1).max(0) as usize;
        if first < self.cache_start {
            self.cache_start = first;
        } else if last > cache_last {
            self.cache_start += last - cache_last;
        }

        debug_assert!(
            self.is_consistent(),
            "cache window does not contain the viewport: {self:?}"
        );
    }

    pub fn is_outside(&self, item_index: usize) -> bool {
        item_index < self.cache_start || item_index >= self.cache_end()
    }

    /// Whether realized child `child_index` lies in the strictly visible part of the window,
    /// counting from the first container of the before trail.
    pub fn is_inside_view(&self, child_index: usize) -> bool {
        child_index >= self.before_trail
            && child_index < self.before_trail + self.items_per_page()
    }

    /// Whether realized child `child_index` belongs to the window (trails included).
    pub fn contains_child(&self, child_index: usize) -> bool {
        let first = self.first_visible_child_index - self.before_trail as isize;
        let end = self.first_visible_child_index + self.visible_count as isize;
        (child_index as isize) >= first && (child_index as isize) < end
    }

    /// Shifts `first_visible_child_index` after `count` realized children at `start` went away.
    pub fn adjust_first_visible_child_index(&mut self, start: usize, count: usize) {
        let start = start as isize;
        let count = count as isize;
        if start < self.first_visible_child_index {
            let end = start + count - 1;
            if end < self.first_visible_child_index {
                self.first_visible_child_index -= count;
            } else {
                self.first_visible_child_index = start;
            }
        }
    }

    /// The containment invariant: every item of the window (after trail included) lies inside the
    /// cache.
    pub fn is_consistent(&self) -> bool {
        if self.total_item_count == 0 || self.visible_start < 0 || self.visible_count == 0 {
            return true;
        }
        let cap = self.total_item_count - 1;
        let start = self.visible_start_item_index() as usize;
        let first = start.min(cap);
        let last = (start + self.visible_count - 1).min(cap);
        first >= self.cache_start && last < self.cache_end()
    }
}

use crate::extent::{ChildExtents, LineMetrics};
use crate::float;
use crate::{CacheWindow, Orientation, ScrollSnapshot};

/// Result of a pixel to logical translation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Translation {
    /// The logical offset the delta lands on, never negative.
    pub offset: f64,
    /// Pixels that could not be consumed because the walk ran past an end of the collection.
    pub unused_delta: f64,
}

/// The inputs a translation depends on, plus its result.
///
/// Any difference in the inputs invalidates the cached result; it is replaced, never merged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct OffsetMemento {
    pub orientation: Orientation,
    pub realized_count: usize,
    pub visual_count: usize,
    pub scroll: ScrollSnapshot,
    pub current_offset: f64,
    pub delta: f64,
    pub result: Translation,
}

impl OffsetMemento {
    fn matches(&self, key: &TranslationKey) -> bool {
        self.orientation == key.orientation
            && self.realized_count == key.realized_count
            && self.visual_count == key.visual_count
            && self.scroll == key.scroll
            && self.current_offset == key.current_offset
            && self.delta == key.delta
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct TranslationKey {
    pub orientation: Orientation,
    pub realized_count: usize,
    pub visual_count: usize,
    pub scroll: ScrollSnapshot,
    pub current_offset: f64,
    pub delta: f64,
}

/// Pixel delta to logical offset conversion, memoizing the last answer.
#[derive(Clone, Debug, Default)]
pub(crate) struct OffsetTranslator {
    memento: Option<OffsetMemento>,
    walks: u64,
}

impl OffsetTranslator {
    /// Number of translations actually computed (cache misses).
    pub fn walks(&self) -> u64 {
        self.walks
    }

    pub fn invalidate(&mut self) {
        self.memento = None;
    }

    /// Translates `key.delta` pixels from `key.current_offset` along `key.orientation`.
    ///
    /// `stacking` is the panel's stacking orientation; deltas across it are already pixels.
    pub fn translate<E: ChildExtents + ?Sized>(
        &mut self,
        key: TranslationKey,
        stacking: Orientation,
        virtualizing: bool,
        metrics: &LineMetrics<'_, E>,
        line_count: usize,
    ) -> Translation {
        if let Some(m) = &self.memento {
            if m.matches(&key) {
                return m.result;
            }
        }

        self.walks += 1;
        let current = key.current_offset;
        let delta = key.delta;
        let result = if key.orientation != stacking || delta == 0.0 {
            Translation {
                offset: float::max(current + delta, 0.0),
                unused_delta: 0.0,
            }
        } else if !virtualizing {
            let unit = metrics.line_size(float::floor(current) as isize);
            let offset = if unit > 0.0 { current + delta / unit } else { current };
            Translation {
                offset: float::max(offset, 0.0),
                unused_delta: 0.0,
            }
        } else {
            walk(metrics, current, delta, line_count)
        };

        vtrace!(
            current,
            delta,
            offset = result.offset,
            unused = result.unused_delta,
            "translate pixel delta"
        );

        self.memento = Some(OffsetMemento {
            orientation: key.orientation,
            realized_count: key.realized_count,
            visual_count: key.visual_count,
            scroll: key.scroll,
            current_offset: current,
            delta,
            result,
        });
        result
    }
}

/// Consumes `delta` line by line starting at `current`.
pub(crate) fn walk<E: ChildExtents + ?Sized>(
    metrics: &LineMetrics<'_, E>,
    current: f64,
    mut delta: f64,
    line_count: usize,
) -> Translation {
    let mut line = float::floor(current);
    let mut frac = float::fractional(current);

    if delta < 0.0 {
        while delta < 0.0 && line >= 0.0 {
            let w = metrics.line_size(line as isize);
            let left = frac * w + delta;
            delta = float::min(0.0, left);
            if left >= 0.0 {
                return Translation {
                    offset: float::max(line + left / w, 0.0),
                    unused_delta: delta,
                };
            }
            frac = 1.0;
            line -= 1.0;
        }
    } else {
        while delta > 0.0 && line < line_count as f64 {
            let w = metrics.line_size(line as isize);
            let right = (1.0 - frac) * w - delta;
            delta = float::max(0.0, -right);
            if right >= 0.0 {
                return Translation {
                    offset: float::max(line + (w - right) / w, 0.0),
                    unused_delta: delta,
                };
            }
            frac = 0.0;
            line += 1.0;
        }
    }

    Translation {
        offset: float::max(line, 0.0),
        unused_delta: delta,
    }
}

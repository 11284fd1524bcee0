use alloc::vec::Vec;

use crate::extent::{self, HostExtents};
use crate::{
    LayoutHost, Orientation, SnapPointsAlignment, SnapPointsMismatch, VirtualizingPanel,
};

/// Equidistant snap points: the first one at `offset`, then one every `interval` pixels.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegularSnapPoints {
    pub offset: f64,
    pub interval: f64,
}

/// The inputs regular snap points were last computed from.
#[derive(Clone, Copy, Debug, PartialEq)]
struct RegularKeys {
    interval: f64,
    lower_margin: f64,
    upper_margin: f64,
}

#[derive(Clone, Debug, Default)]
struct AxisSnap {
    /// Keys were read since the last notification.
    armed: bool,
    regular: Option<RegularKeys>,
    irregular: Option<(SnapPointsAlignment, Vec<f64>)>,
}

/// Snap point change tracking for both axes.
#[derive(Clone, Debug, Default)]
pub(crate) struct SnapState {
    horizontal: AxisSnap,
    vertical: AxisSnap,
}

impl SnapState {
    fn axis(&self, orientation: Orientation) -> &AxisSnap {
        match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        }
    }

    fn axis_mut(&mut self, orientation: Orientation) -> &mut AxisSnap {
        match orientation {
            Orientation::Horizontal => &mut self.horizontal,
            Orientation::Vertical => &mut self.vertical,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl<C: Clone + PartialEq + core::fmt::Debug> VirtualizingPanel<C> {
    /// Regular snap points along `orientation`.
    ///
    /// Only the stacking axis has snap points; the other axis reports none. Reading the keys
    /// re-arms the change notification for that axis.
    pub fn regular_snap_points<H: LayoutHost<C>>(
        &mut self,
        host: &H,
        orientation: Orientation,
        alignment: SnapPointsAlignment,
    ) -> Result<RegularSnapPoints, SnapPointsMismatch> {
        if orientation != self.options.orientation {
            return Ok(RegularSnapPoints::default());
        }
        if !self.options.are_snap_points_regular(orientation) {
            return Err(SnapPointsMismatch {
                requested_regular: true,
            });
        }

        let keys = self.regular_keys(host);
        let axis = self.snap.axis_mut(orientation);
        axis.armed = true;
        axis.regular = Some(keys);
        axis.irregular = None;

        let offset = match alignment {
            SnapPointsAlignment::Near => keys.lower_margin,
            SnapPointsAlignment::Center => keys.lower_margin + keys.interval / 2.0,
            SnapPointsAlignment::Far => keys.upper_margin,
        };
        Ok(RegularSnapPoints {
            offset,
            interval: keys.interval,
        })
    }

    /// Snap points at each line of the window, in content pixels.
    ///
    /// Keys start at the estimated size of the unrealized lines before the window. Every key but
    /// a leading `Near` one is shifted by the leading margin.
    pub fn irregular_snap_points<H: LayoutHost<C>>(
        &mut self,
        host: &H,
        orientation: Orientation,
        alignment: SnapPointsAlignment,
    ) -> Result<Vec<f64>, SnapPointsMismatch> {
        if orientation != self.options.orientation {
            return Ok(Vec::new());
        }
        if self.options.are_snap_points_regular(orientation) {
            return Err(SnapPointsMismatch {
                requested_regular: false,
            });
        }

        let keys = self.irregular_keys(host, alignment);
        let axis = self.snap.axis_mut(orientation);
        axis.armed = true;
        axis.regular = None;
        axis.irregular = Some((alignment, keys.clone()));
        Ok(keys)
    }

    fn irregular_keys<H: LayoutHost<C>>(&self, host: &H, alignment: SnapPointsAlignment) -> Vec<f64> {
        let o = self.options.orientation;
        let ipl = self.window.items_per_line.max(1);
        let lower = self.options.margin.lower(o);
        let window = self.window;
        let realized = self.children.realized();
        let extents = HostExtents {
            children: realized,
            host,
            orientation: o,
        };
        let dim = extent::realized_dimension(&extents, &window);
        let mut position = extent::unrealized_before(dim, &window);

        let mut keys = Vec::new();
        if window.first_visible_child_index < 0 {
            return keys;
        }
        let start = (window.first_visible_child_index - window.before_trail as isize).max(0) as usize;
        let end = (window.first_visible_child_index as usize + window.visible_count).min(realized.len());
        for child in (start..end).step_by(ipl) {
            let size = o.main(host.desired_size(&realized[child]));
            let key = match alignment {
                SnapPointsAlignment::Near => position,
                SnapPointsAlignment::Center => position + size / 2.0,
                SnapPointsAlignment::Far => position + size,
            };
            let leading = keys.is_empty() && alignment == SnapPointsAlignment::Near;
            keys.push(if leading { key } else { key + lower });
            position += size;
        }
        keys
    }

    fn regular_keys<H: LayoutHost<C>>(&self, host: &H) -> RegularKeys {
        let o = self.options.orientation;
        let window = &self.window;
        let realized = self.children.realized();
        let interval = usize::try_from(window.first_visible_child_index - window.before_trail as isize)
            .ok()
            .and_then(|first| realized.get(first))
            .map_or(0.0, |child| o.main(host.desired_size(child)));
        RegularKeys {
            interval,
            lower_margin: self.options.margin.lower(o),
            upper_margin: self.options.margin.upper(o),
        }
    }

    /// Fires the snap-points-changed hook for every armed axis whose keys moved.
    pub(crate) fn notify_snap_points_changes<H: LayoutHost<C>>(&mut self, host: &H) {
        let stacking = self.options.orientation;
        let regular = self.options.are_snap_points_regular(stacking);
        let current_regular = self.regular_keys(host);
        let current_irregular = self
            .snap
            .axis(stacking)
            .irregular
            .as_ref()
            .map(|(alignment, _)| *alignment)
            .map(|alignment| (alignment, self.irregular_keys(host, alignment)));

        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            let axis = self.snap.axis_mut(orientation);
            if !axis.armed || (axis.regular.is_none() && axis.irregular.is_none()) {
                continue;
            }
            let changed = if orientation != stacking {
                // Keys were computed for the other stacking direction.
                true
            } else if regular {
                axis.regular != Some(current_regular)
            } else {
                axis.irregular != current_irregular
            };
            if changed {
                axis.armed = false;
                if let Some(hook) = &self.options.on_snap_points_changed {
                    vtrace!(?orientation, "snap points changed");
                    hook(orientation);
                }
            }
        }
    }
}

use alloc::vec::Vec;

use crate::VirtualizationMode;

/// The panel's two views of its containers.
///
/// `visual` is every container the panel hosts, in visual order. In recycling mode `realized`
/// tracks, index-parallel to the generator, the containers currently linked to items; pooled
/// containers stay in `visual` only. In standard mode the two lists are the same.
#[derive(Clone, Debug)]
pub(crate) struct Children<C> {
    visual: Vec<C>,
    realized: Option<Vec<C>>,
    mode: VirtualizationMode,
}

impl<C> Default for Children<C> {
    fn default() -> Self {
        Self {
            visual: Vec::new(),
            realized: None,
            mode: VirtualizationMode::Standard,
        }
    }
}

impl<C: Clone + PartialEq> Children<C> {
    pub fn visual(&self) -> &[C] {
        &self.visual
    }

    pub fn realized(&self) -> &[C] {
        match &self.realized {
            Some(realized) => realized,
            None => &self.visual,
        }
    }

    pub fn is_recycling(&self) -> bool {
        self.mode == VirtualizationMode::Recycling
    }

    /// Switches mode. The realized list is rebuilt lazily from the visual children.
    pub fn set_mode(&mut self, mode: VirtualizationMode) {
        if self.mode != mode {
            self.mode = mode;
            self.realized = None;
        }
    }

    fn ensure_realized(&mut self) -> Option<&mut Vec<C>> {
        if !self.is_recycling() {
            return None;
        }
        if self.realized.is_none() {
            self.realized = Some(self.visual.clone());
        }
        self.realized.as_mut()
    }

    /// Visual index of the realized child `realized_index`.
    pub fn visual_index_of_realized(&self, realized_index: usize) -> Option<usize> {
        let Some(realized) = &self.realized else {
            return (realized_index < self.visual.len()).then_some(realized_index);
        };
        let target = realized.get(realized_index)?;
        self.visual
            .iter()
            .skip(realized_index)
            .position(|c| c == target)
            .map(|i| i + realized_index)
    }

    /// Places a container returned by the generator at realized slot `child_index`.
    ///
    /// Returns `true` when the visual order changed.
    pub fn add_from_generator(&mut self, child_index: usize, container: C, newly_realized: bool) -> bool {
        if !newly_realized && self.realized().get(child_index) == Some(&container) {
            return false;
        }

        let visual_slot = if child_index == 0 {
            0
        } else {
            match self.visual_index_of_realized(child_index - 1) {
                Some(i) => i + 1,
                None => self.visual.len(),
            }
        };

        if newly_realized {
            let slot = visual_slot.min(self.visual.len());
            if let Some(realized) = self.ensure_realized() {
                let at = child_index.min(realized.len());
                realized.insert(at, container.clone());
            }
            self.visual.insert(slot, container);
            return true;
        }

        // Recycled: parked somewhere in the visual list, or already gone from it.
        if let Some(realized) = self.ensure_realized() {
            debug_assert!(
                !realized.contains(&container),
                "a realized container came back at the wrong position"
            );
            let at = child_index.min(realized.len());
            realized.insert(at, container.clone());
        }
        match self.visual.iter().position(|c| *c == container) {
            Some(current) if current == visual_slot => false,
            Some(current) => {
                let moved = self.visual.remove(current);
                let slot = if current < visual_slot {
                    visual_slot - 1
                } else {
                    visual_slot
                };
                self.visual.insert(slot.min(self.visual.len()), moved);
                true
            }
            None => {
                let slot = visual_slot.min(self.visual.len());
                self.visual.insert(slot, container);
                true
            }
        }
    }

    /// Drops `count` realized children starting at `start` after the generator recycled them.
    /// The containers stay parked in the visual list.
    pub fn detach_realized(&mut self, start: usize, count: usize) {
        if let Some(realized) = self.ensure_realized() {
            let end = (start + count).min(realized.len());
            realized.drain(start.min(end)..end);
        }
    }

    /// Removes `count` realized children starting at `start` from both lists.
    pub fn remove_realized(&mut self, start: usize, count: usize) {
        if count == 0 {
            return;
        }
        let visual_start = if self.visual.len() == self.realized().len() {
            Some(start)
        } else {
            self.visual_index_of_realized(start)
        };
        match visual_start {
            Some(v) => {
                let end = (v + count).min(self.visual.len());
                self.visual.drain(v.min(end)..end);
            }
            None => {
                vwarn!(start, count, "realized child missing from the visual children");
                debug_assert!(false, "realized child {start} missing from the visual children");
            }
        }
        if let Some(realized) = self.realized.as_mut() {
            let end = (start + count).min(realized.len());
            realized.drain(start.min(end)..end);
        }
    }

    /// Moves visual children that are not realized to the end, keeping realized order.
    pub fn collect_recycled(&mut self) {
        let Some(realized) = &self.realized else {
            return;
        };
        if realized.len() == self.visual.len() {
            return;
        }
        let (mut linked, parked): (Vec<C>, Vec<C>) =
            self.visual.drain(..).partition(|c| realized.contains(c));
        linked.extend(parked);
        self.visual = linked;
    }

    /// Visual children that are parked (not realized).
    pub fn parked(&self) -> impl Iterator<Item = &C> + '_ {
        let realized = self.realized.as_deref();
        self.visual
            .iter()
            .filter(move |c| realized.is_some_and(|r| !r.contains(c)))
    }

    pub fn clear(&mut self) {
        self.visual.clear();
        if let Some(realized) = self.realized.as_mut() {
            realized.clear();
        }
    }
}

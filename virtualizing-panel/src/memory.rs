//! In-memory collaborators for driving a panel without a UI toolkit.
//!
//! [`MemoryGenerator`] plays both the item source and the container factory, [`MemoryHost`]
//! measures containers with a size function and records focus, drag and arrange state.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::{
    ContainerGenerator, Generated, GeneratorDirection, GeneratorPosition, ItemsChanged,
    ItemsChangedAction, LayoutHost, Rect, Size,
};

/// Failures the in-memory collaborators can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("no realized range of {count} containers at {position:?}")]
    InvalidPosition {
        position: GeneratorPosition,
        count: usize,
    },
    #[error("generation of item {index} failed")]
    GenerationFailed { index: usize },
    #[error("measuring item {index} failed")]
    MeasureFailed { index: usize },
}

struct ContainerCell {
    id: usize,
    item: Cell<Option<usize>>,
}

/// A container handle. Clones share identity; equality is identity.
#[derive(Clone)]
pub struct MemoryContainer(Rc<ContainerCell>);

impl MemoryContainer {
    fn new(id: usize) -> Self {
        Self(Rc::new(ContainerCell {
            id,
            item: Cell::new(None),
        }))
    }

    pub fn id(&self) -> usize {
        self.0.id
    }

    /// The item currently linked to this container, `None` while pooled.
    pub fn item_index(&self) -> Option<usize> {
        self.0.item.get()
    }

    fn link(&self, item: Option<usize>) {
        self.0.item.set(item);
    }
}

impl PartialEq for MemoryContainer {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MemoryContainer {}

impl core::fmt::Debug for MemoryContainer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryContainer")
            .field("id", &self.id())
            .field("item", &self.item_index())
            .finish()
    }
}

/// Counters for what the generator did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeneratorStats {
    pub created: usize,
    pub reused: usize,
    pub recycled: usize,
    pub removed: usize,
    pub recycle_calls: usize,
    /// Generations requested while walking backwards.
    pub backward: usize,
}

/// An item source and container factory over `item_count` anonymous items.
#[derive(Default)]
pub struct MemoryGenerator {
    item_count: usize,
    realized: Vec<(usize, MemoryContainer)>,
    pool: Vec<MemoryContainer>,
    next_id: usize,
    own_containers: Vec<usize>,
    fail_at: Option<usize>,
    stats: GeneratorStats,
}

impl core::fmt::Debug for MemoryGenerator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryGenerator")
            .field("item_count", &self.item_count)
            .field("realized", &self.realized.len())
            .field("pool", &self.pool.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl MemoryGenerator {
    pub fn new(item_count: usize) -> Self {
        Self {
            item_count,
            ..Self::default()
        }
    }

    pub fn stats(&self) -> GeneratorStats {
        self.stats
    }

    /// Item indexes that currently have a container, ascending.
    pub fn realized_items(&self) -> impl Iterator<Item = usize> + '_ {
        self.realized.iter().map(|(item, _)| *item)
    }

    pub fn container_for(&self, index: usize) -> Option<&MemoryContainer> {
        self.slot_of(index)
            .ok()
            .map(|slot| &self.realized[slot].1)
    }

    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    /// Marks the item at `index` as being its own container.
    pub fn mark_own_container(&mut self, index: usize) {
        if !self.own_containers.contains(&index) {
            self.own_containers.push(index);
        }
    }

    /// Makes the next generation of `index` fail.
    pub fn fail_generation_at(&mut self, index: Option<usize>) {
        self.fail_at = index;
    }

    /// Inserts one item at `index` and describes the change for the panel.
    pub fn insert_item(&mut self, index: usize) -> ItemsChanged {
        let index = index.min(self.item_count);
        self.item_count += 1;
        for (item, container) in self.realized.iter_mut() {
            if *item >= index {
                *item += 1;
                container.link(Some(*item));
            }
        }
        for own in self.own_containers.iter_mut() {
            if *own >= index {
                *own += 1;
            }
        }
        ItemsChanged {
            action: ItemsChangedAction::Insert,
            position: self.position_from_index(index),
            item_count: 1,
            container_count: 0,
        }
    }

    /// Removes the item at `index`, discarding its container if it had one.
    pub fn remove_item(&mut self, index: usize) -> Option<ItemsChanged> {
        if index >= self.item_count {
            return None;
        }
        let position = self.position_from_index(index);
        let mut container_count = 0;
        if let Ok(slot) = self.slot_of(index) {
            let (_, container) = self.realized.remove(slot);
            container.link(None);
            container_count = 1;
        }
        self.item_count -= 1;
        for (item, container) in self.realized.iter_mut() {
            if *item > index {
                *item -= 1;
                container.link(Some(*item));
            }
        }
        self.own_containers.retain(|own| *own != index);
        for own in self.own_containers.iter_mut() {
            if *own > index {
                *own -= 1;
            }
        }
        Some(ItemsChanged {
            action: ItemsChangedAction::Remove,
            position,
            item_count: 1,
            container_count,
        })
    }

    /// Replaces the item at `index`. A realized container stays linked to the slot.
    pub fn replace_item(&mut self, index: usize) -> Option<ItemsChanged> {
        if index >= self.item_count {
            return None;
        }
        let container_count = usize::from(self.slot_of(index).is_ok());
        Some(ItemsChanged {
            action: ItemsChangedAction::Replace,
            position: self.position_from_index(index),
            item_count: 1,
            container_count,
        })
    }

    /// Swaps the whole collection for `item_count` new items.
    pub fn reset_items(&mut self, item_count: usize) -> ItemsChanged {
        for (_, container) in self.realized.drain(..) {
            container.link(None);
        }
        self.pool.clear();
        self.own_containers.clear();
        self.item_count = item_count;
        ItemsChanged {
            action: ItemsChangedAction::Reset,
            position: GeneratorPosition::default(),
            item_count: 0,
            container_count: 0,
        }
    }

    fn slot_of(&self, index: usize) -> Result<usize, usize> {
        self.realized.binary_search_by_key(&index, |(item, _)| *item)
    }

    fn realized_range(
        &self,
        position: GeneratorPosition,
        count: usize,
    ) -> Result<core::ops::Range<usize>, MemoryError> {
        let start = position.index;
        if position.offset != 0 || start < 0 || start as usize + count > self.realized.len() {
            return Err(MemoryError::InvalidPosition { position, count });
        }
        Ok(start as usize..start as usize + count)
    }
}

impl ContainerGenerator for MemoryGenerator {
    type Container = MemoryContainer;
    type Error = MemoryError;

    fn item_count(&self) -> usize {
        self.item_count
    }

    fn generate_next(
        &mut self,
        position: GeneratorPosition,
        direction: GeneratorDirection,
    ) -> Result<Option<Generated<MemoryContainer>>, MemoryError> {
        let Some(index) = self.index_from_position(position) else {
            return Ok(None);
        };
        if self.fail_at == Some(index) {
            self.fail_at = None;
            return Err(MemoryError::GenerationFailed { index });
        }
        if direction == GeneratorDirection::Backward {
            self.stats.backward += 1;
        }

        match self.slot_of(index) {
            Ok(slot) => Ok(Some(Generated {
                container: self.realized[slot].1.clone(),
                newly_realized: false,
            })),
            Err(slot) => {
                let (container, newly_realized) = match self.pool.pop() {
                    Some(c) => {
                        self.stats.reused += 1;
                        (c, false)
                    }
                    None => {
                        self.next_id += 1;
                        self.stats.created += 1;
                        (MemoryContainer::new(self.next_id), true)
                    }
                };
                container.link(Some(index));
                self.realized.insert(slot, (index, container.clone()));
                Ok(Some(Generated {
                    container,
                    newly_realized,
                }))
            }
        }
    }

    fn recycle(&mut self, position: GeneratorPosition, count: usize) -> Result<(), MemoryError> {
        let range = self.realized_range(position, count)?;
        self.stats.recycle_calls += 1;
        self.stats.recycled += count;
        for (_, container) in self.realized.drain(range) {
            container.link(None);
            self.pool.push(container);
        }
        Ok(())
    }

    fn remove(&mut self, position: GeneratorPosition, count: usize) -> Result<(), MemoryError> {
        let range = self.realized_range(position, count)?;
        self.stats.removed += count;
        for (_, container) in self.realized.drain(range) {
            container.link(None);
        }
        Ok(())
    }

    fn index_from_position(&self, position: GeneratorPosition) -> Option<usize> {
        let index = if position.index < 0 {
            position.offset - 1
        } else {
            let (item, _) = self.realized.get(position.index as usize)?;
            *item as isize + position.offset
        };
        (index >= 0 && (index as usize) < self.item_count).then_some(index as usize)
    }

    fn position_from_index(&self, index: usize) -> GeneratorPosition {
        match self.slot_of(index) {
            Ok(slot) => GeneratorPosition::child(slot),
            Err(0) => GeneratorPosition::new(-1, index as isize + 1),
            Err(slot) => {
                let (prev, _) = self.realized[slot - 1];
                GeneratorPosition::new(slot as isize - 1, (index - prev) as isize)
            }
        }
    }

    fn is_item_its_own_container(&self, index: usize) -> bool {
        self.own_containers.contains(&index)
    }
}

/// Item size function used by [`MemoryHost`].
pub type ItemSizeFn = Arc<dyn Fn(usize) -> Size + Send + Sync>;

/// A layout host that sizes containers by their item index.
pub struct MemoryHost {
    item_size: ItemSizeFn,
    desired: BTreeMap<usize, Size>,
    slots: BTreeMap<usize, Rect>,
    focused: Option<usize>,
    drag_owner: Option<usize>,
    fail_at: Option<usize>,
    measure_calls: usize,
}

impl core::fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryHost")
            .field("measured", &self.desired.len())
            .field("focused", &self.focused)
            .field("drag_owner", &self.drag_owner)
            .field("measure_calls", &self.measure_calls)
            .finish_non_exhaustive()
    }
}

impl MemoryHost {
    pub fn new(item_size: impl Fn(usize) -> Size + Send + Sync + 'static) -> Self {
        Self {
            item_size: Arc::new(item_size),
            desired: BTreeMap::new(),
            slots: BTreeMap::new(),
            focused: None,
            drag_owner: None,
            fail_at: None,
            measure_calls: 0,
        }
    }

    /// Every item gets the same size.
    pub fn uniform(size: Size) -> Self {
        Self::new(move |_| size)
    }

    pub fn set_item_size(&mut self, item_size: impl Fn(usize) -> Size + Send + Sync + 'static) {
        self.item_size = Arc::new(item_size);
    }

    pub fn set_focus(&mut self, container: Option<&MemoryContainer>) {
        self.focused = container.map(MemoryContainer::id);
    }

    pub fn set_drag_owner(&mut self, container: Option<&MemoryContainer>) {
        self.drag_owner = container.map(MemoryContainer::id);
    }

    /// Makes the next measure of `index` fail.
    pub fn fail_measure_at(&mut self, index: Option<usize>) {
        self.fail_at = index;
    }

    pub fn measure_calls(&self) -> usize {
        self.measure_calls
    }
}

impl LayoutHost<MemoryContainer> for MemoryHost {
    type Error = MemoryError;

    fn measure(&mut self, container: &MemoryContainer, available: Size) -> Result<Size, MemoryError> {
        self.measure_calls += 1;
        let size = match container.item_index() {
            Some(index) => {
                if self.fail_at == Some(index) {
                    self.fail_at = None;
                    return Err(MemoryError::MeasureFailed { index });
                }
                let natural = (self.item_size)(index);
                Size::new(
                    natural.width.min(available.width),
                    natural.height.min(available.height),
                )
            }
            None => Size::ZERO,
        };
        self.desired.insert(container.id(), size);
        Ok(size)
    }

    fn desired_size(&self, container: &MemoryContainer) -> Size {
        self.desired
            .get(&container.id())
            .copied()
            .unwrap_or_default()
    }

    fn arrange(&mut self, container: &MemoryContainer, rect: Rect) -> Result<(), MemoryError> {
        self.slots.insert(container.id(), rect);
        Ok(())
    }

    fn layout_slot(&self, container: &MemoryContainer) -> Rect {
        self.slots
            .get(&container.id())
            .copied()
            .unwrap_or_default()
    }

    fn has_focus(&self, container: &MemoryContainer) -> bool {
        self.focused == Some(container.id())
    }

    fn is_drag_drop_owner(&self, container: &MemoryContainer) -> bool {
        self.drag_owner == Some(container.id())
    }
}

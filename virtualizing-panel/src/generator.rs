/// An address into a generator's list of realized items.
///
/// `index` names a realized entry (`-1` means "before the first one") and `offset` counts items
/// past it: `{ index: 3, offset: 0 }` is the fourth realized item itself, `{ index: 3, offset: 2 }`
/// is the second unrealized item after it.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorPosition {
    pub index: isize,
    pub offset: isize,
}

impl GeneratorPosition {
    pub const fn new(index: isize, offset: isize) -> Self {
        Self { index, offset }
    }

    /// Position of the `child`-th realized entry.
    pub const fn child(child: usize) -> Self {
        Self::new(child as isize, 0)
    }

    /// Whether the position names a realized entry.
    pub fn is_realized(self) -> bool {
        self.offset == 0 && self.index >= 0
    }

    /// The realized-list slot a container generated at this position occupies.
    pub fn child_index(self) -> usize {
        let slot = if self.offset == 0 {
            self.index
        } else {
            self.index + 1
        };
        slot.max(0) as usize
    }
}

impl Default for GeneratorPosition {
    fn default() -> Self {
        Self::new(-1, 0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GeneratorDirection {
    #[default]
    Forward,
    /// The panel is walking towards the start of the collection (before trail, scroll-into-view
    /// correction).
    Backward,
}

/// A container handed out by [`ContainerGenerator::generate_next`].
#[derive(Clone, Debug, PartialEq)]
pub struct Generated<C> {
    pub container: C,
    /// `true` for a freshly created container. `false` for one that was already realized for this
    /// item, or one taken back from the recycle pool.
    pub newly_realized: bool,
}

/// The container factory the panel draws from.
///
/// The generator owns the item to container mapping. Its realized list is index-parallel to the
/// panel's realized children: realized entry `i` of the generator is realized child `i` of the
/// panel.
pub trait ContainerGenerator {
    type Container: Clone + PartialEq + core::fmt::Debug;
    type Error;

    fn item_count(&self) -> usize;

    /// Produces the container for the item at `position`.
    ///
    /// `direction` tells the generator which neighbour the panel is likely to ask for next.
    /// `Ok(None)` means there is no item at `position`; the panel treats it as the end of the
    /// collection, not as a failure.
    fn generate_next(
        &mut self,
        position: GeneratorPosition,
        direction: GeneratorDirection,
    ) -> Result<Option<Generated<Self::Container>>, Self::Error>;

    /// Returns `count` realized containers starting at `position` to the recycle pool.
    fn recycle(&mut self, position: GeneratorPosition, count: usize) -> Result<(), Self::Error>;

    /// Discards `count` realized containers starting at `position`.
    fn remove(&mut self, position: GeneratorPosition, count: usize) -> Result<(), Self::Error>;

    fn index_from_position(&self, position: GeneratorPosition) -> Option<usize>;

    fn position_from_index(&self, index: usize) -> GeneratorPosition;

    /// Whether the item at `index` is its own container (and so must never be recycled).
    fn is_item_its_own_container(&self, _index: usize) -> bool {
        false
    }
}

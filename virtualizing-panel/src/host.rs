use crate::{Rect, Size};

/// The layout engine that measures and arranges a single container.
///
/// The panel never looks inside a container; it only asks the host for sizes and tells it where
/// to put things. Focus and drag state are read here too, because they veto recycling.
pub trait LayoutHost<C> {
    type Error;

    /// Measures `container` against `available` and returns its desired size.
    fn measure(&mut self, container: &C, available: Size) -> Result<Size, Self::Error>;

    /// The size produced by the last `measure` of `container`.
    fn desired_size(&self, container: &C) -> Size;

    /// Places `container` at `rect` (panel content coordinates).
    fn arrange(&mut self, container: &C, rect: Rect) -> Result<(), Self::Error>;

    /// The rectangle `container` was last arranged into.
    fn layout_slot(&self, container: &C) -> Rect;

    fn has_focus(&self, _container: &C) -> bool {
        false
    }

    /// Whether `container` is the primary item of an in-flight drag.
    fn is_drag_drop_owner(&self, _container: &C) -> bool {
        false
    }
}

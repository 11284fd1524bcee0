use crate::{CacheWindow, InvalidOffset, ScrollSnapshot, VirtualizingPanel};

/// A combined snapshot of the realized window and the published scroll values.
///
/// This is useful for restoring a list's position across sessions without coupling the panel to
/// any specific UI framework. Only the offsets are restored; the window is rebuilt by the next
/// measure.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PanelState {
    pub window: CacheWindow,
    pub scroll: ScrollSnapshot,
}

impl<C: Clone + PartialEq + core::fmt::Debug> VirtualizingPanel<C> {
    pub fn state(&self) -> PanelState {
        PanelState {
            window: self.window,
            scroll: self.scroll.snapshot(),
        }
    }

    /// Applies the offsets saved in `state`.
    pub fn restore_offset(&mut self, state: &PanelState) -> Result<(), InvalidOffset> {
        vdebug!(offset = ?state.scroll.offset, "restoring offset");
        self.set_horizontal_offset(state.scroll.offset.x)?;
        self.set_vertical_offset(state.scroll.offset.y)
    }
}

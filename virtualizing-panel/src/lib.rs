//! A headless windowed virtualization and scrolling engine for stacking and wrapping panels.
//!
//! For host-side utilities (a scroll viewer, a measure/arrange controller), see the
//! `virtualizing-panel-adapter` crate.
//!
//! The panel keeps only the containers near the viewport realized: a visible window plus a
//! before/after buffer sized by a pixel precache window. Offsets along the stacking axis are
//! logical (one unit per line), so scrolling works without knowing every item's size; the
//! translation between pixels and lines goes through the realized sizes and an average for the
//! rest.
//!
//! It is UI-agnostic. A GUI layer is expected to provide:
//! - a [`ContainerGenerator`] that creates, recycles and removes item containers
//! - a [`LayoutHost`] that measures and arranges them
//! - optionally a [`ScrollOwner`] that renders the published scroll values
//!
//! [`MemoryGenerator`] and [`MemoryHost`] are in-memory implementations of both traits.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod children;
mod cleanup;
mod error;
mod extent;
mod float;
mod generator;
mod host;
mod into_view;
mod items;
mod memory;
mod options;
mod panel;
mod realize;
mod scroll;
mod snap;
mod state;
mod translate;
mod types;
mod window;

#[cfg(test)]
mod tests;

pub use error::{Error, InvalidOffset, SnapPointsMismatch};
pub use extent::RealizedDimension;
pub use generator::{ContainerGenerator, Generated, GeneratorDirection, GeneratorPosition};
pub use host::LayoutHost;
pub use memory::{
    GeneratorStats, ItemSizeFn, MemoryContainer, MemoryError, MemoryGenerator, MemoryHost,
};
pub use options::{
    CleanupVirtualizedItem, CleanupVirtualizedItemCallback, ItemsPerLine, PanelOptions,
    SnapPointsChangedCallback,
};
pub use panel::VirtualizingPanel;
pub use scroll::{ScrollData, ScrollOwner, ScrollSnapshot};
pub use snap::RegularSnapPoints;
pub use state::PanelState;
pub use translate::Translation;
pub use types::{
    AlignmentRatios, ItemsChanged, ItemsChangedAction, Orientation, Point, Rect,
    ScrollIntoViewAlignment, Size, SnapPointsAlignment, Thickness, VirtualizationMode,
};
pub use window::{CacheWindow, LogicalPosition};

//! Adapter utilities for the `virtualizing-panel` crate.
//!
//! The `virtualizing-panel` crate is UI-agnostic and only talks to its collaborators through
//! traits. This crate provides small, framework-neutral pieces an adapter usually needs around
//! it:
//!
//! - [`ScrollViewer`]: a scroll owner that tracks zoom and gesture state and exposes pixel scroll
//!   bars
//! - [`Controller`]: owns the panel and its collaborators and runs the measure/arrange cycle
//!
//! This crate is intentionally framework-agnostic (no toolkit bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod viewer;


pub use controller::{Controller, LayoutError};
pub use viewer::{ScrollBarState, ScrollViewer};

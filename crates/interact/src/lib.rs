//! Pointer, wheel and gesture handling for weft grids.
//!
//! Sits on top of `weft-engine`: translates raw input events into selection
//! changes, preview ranges and committed mutations. Rendering stays with the
//! host; this crate only answers "what is selected, what is previewed, where
//! is the viewport".

pub mod autoscroll;
pub mod controller;
pub mod frame;
pub mod geometry;
pub mod session;
pub mod wheel;

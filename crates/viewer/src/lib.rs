//! Render context lifecycle and presentation state.
//!
//! # Invariants
//! - Scene, camera, controller, and renderer are one lifecycle unit: created
//!   together, resized together, disposed together. They live inside a single
//!   `Option`, so a partially initialized context is unrepresentable.
//! - An error message and a healthy running state are mutually exclusive.
//! - Performance metrics update at a throttled cadence, never every frame.

pub mod context;
pub mod state;

pub use context::ViewerContext;
pub use state::ViewerState;

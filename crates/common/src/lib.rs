//! Shared types for the shaderview viewer.
//!
//! # Invariants
//! - Node identity is stable for the lifetime of a scene.
//! - Rotation is stored as Euler angles (radians); the animation step
//!   writes absolute per-axis values each cycle.

pub mod rng;
pub mod types;

pub use rng::SeededRng;
pub use types::{Color, NodeId, Transform};

//! wgpu render backend for the shaderview viewer.
//!
//! Renders the demo scene: grid floor, PBR spheres under a shadow-casting
//! key light, the custom-shader cube, the wireframe torus, and the additive
//! particle field. Implements the renderer-agnostic `SceneRenderer` trait.
//!
//! # Invariants
//! - The backend never mutates the scene; per-frame uniforms are derived.
//! - Frame cost counters match `shaderview_render::scene_stats` exactly.
//! - Surface loss reconfigures and skips the frame instead of failing.

mod gpu;
mod mesh;
mod wgsl;

pub use gpu::{ContextError, WgpuRenderer};

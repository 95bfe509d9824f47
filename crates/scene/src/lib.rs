//! Scene graph: renderable nodes, materials, lights, and the demo content
//! builder.
//!
//! # Invariants
//! - Nodes are owned by the scene and released together on `dispose`.
//! - Node roles are a closed enum; the animation step dispatches on them
//!   exhaustively.
//! - Demo content is fixed constants, not data-driven.

pub mod builder;
pub mod graph;
pub mod light;

pub use builder::{DEMO_PARTICLE_SEED, build_demo_scene};
pub use graph::{
    DisposeSummary, Fog, Geometry, GridMaterial, Material, NodeRole, PbrMaterial, PointsMaterial,
    Scene, SceneNode, WireframeMaterial,
};
pub use light::{Light, ShadowConfig};

/// Errors from scene and render-context construction.
#[derive(Debug, thiserror::Error)]
pub enum SceneInitError {
    #[error("degenerate viewport: {width}x{height}")]
    DegenerateViewport { width: u32, height: u32 },
    #[error("GPU context unavailable: {0}")]
    GpuUnavailable(String),
    #[error("resource allocation failed: {0}")]
    Allocation(String),
}

//! Rendering adapter: renderer-agnostic interface plus the interactive view
//! layer (orbit camera and controller).
//!
//! # Invariants
//! - Renderers never mutate the scene; they read nodes and produce a frame.
//! - Camera motion flows only through the orbit controller.
//! - Frame cost metrics (draw calls, triangles) are backend-independent:
//!   every backend reports the same counts for the same scene.

pub mod camera;
pub mod controls;
pub mod headless;
pub mod stats;

pub use camera::OrbitCamera;
pub use controls::OrbitController;
pub use headless::HeadlessRenderer;
pub use stats::{RenderStats, scene_stats};

use shaderview_scene::Scene;

/// Renderer-agnostic backend interface. The animation driver renders through
/// this trait, so tests can run the full per-frame cycle without a GPU.
pub trait SceneRenderer {
    /// Render one frame of the scene from the camera and report its cost.
    fn render(&mut self, scene: &Scene, camera: &OrbitCamera) -> RenderStats;

    /// Resize the drawing buffer to match a new viewport.
    fn resize(&mut self, width: u32, height: u32);

    /// Release GPU-side resources. Called exactly once at teardown.
    fn dispose(&mut self);
}

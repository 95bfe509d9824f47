use shaderview_scene::Scene;

use crate::camera::OrbitCamera;
use crate::stats::{RenderStats, scene_stats};
use crate::SceneRenderer;

/// Renderer that draws nothing but reports the same frame costs the GPU
/// backend would. Stands in for wgpu in tests and headless runs, the same
/// way a debug renderer stands in for a windowed one.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: u64,
    last_stats: RenderStats,
    viewport: (u32, u32),
    dispose_count: u32,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_stats(&self) -> RenderStats {
        self.last_stats
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// How many times `dispose` ran; teardown must release exactly once.
    pub fn dispose_count(&self) -> u32 {
        self.dispose_count
    }
}

impl SceneRenderer for HeadlessRenderer {
    fn render(&mut self, scene: &Scene, _camera: &OrbitCamera) -> RenderStats {
        self.frames += 1;
        self.last_stats = scene_stats(scene);
        self.last_stats
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn dispose(&mut self) {
        self.dispose_count += 1;
        tracing::debug!("headless renderer disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaderview_scene::{DEMO_PARTICLE_SEED, build_demo_scene};

    #[test]
    fn counts_frames_and_stats() {
        let scene = build_demo_scene(DEMO_PARTICLE_SEED).unwrap();
        let camera = OrbitCamera::new(800, 600);
        let mut renderer = HeadlessRenderer::new();

        let stats = renderer.render(&scene, &camera);
        assert_eq!(stats.draw_calls, 6);
        assert_eq!(renderer.frames(), 1);
        assert_eq!(renderer.last_stats(), stats);
    }

    #[test]
    fn records_resize_and_dispose() {
        let mut renderer = HeadlessRenderer::new();
        renderer.resize(1024, 768);
        assert_eq!(renderer.viewport(), (1024, 768));
        renderer.dispose();
        assert_eq!(renderer.dispose_count(), 1);
    }
}

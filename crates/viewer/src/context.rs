use shaderview_render::{OrbitCamera, OrbitController, SceneRenderer};
use shaderview_scene::{
    DEMO_PARTICLE_SEED, DisposeSummary, Scene, SceneInitError, build_demo_scene,
};

/// The four core rendering references, owned as one unit.
#[derive(Debug)]
pub struct ViewerContext<R: SceneRenderer> {
    pub scene: Scene,
    pub camera: OrbitCamera,
    pub controller: OrbitController,
    pub renderer: R,
}

impl<R: SceneRenderer> ViewerContext<R> {
    /// Build camera, controller, and demo scene for a container of the given
    /// pixel dimensions. Fails without leaking partial state; the caller
    /// drops the renderer on error.
    pub fn initialize(renderer: R, width: u32, height: u32) -> Result<Self, SceneInitError> {
        if width == 0 || height == 0 {
            return Err(SceneInitError::DegenerateViewport { width, height });
        }

        let camera = OrbitCamera::new(width, height);
        let controller = OrbitController::new(&camera);
        let scene = build_demo_scene(DEMO_PARTICLE_SEED)?;

        tracing::info!(width, height, "render context initialized");
        Ok(Self {
            scene,
            camera,
            controller,
            renderer,
        })
    }

    /// Update camera aspect and renderer buffers for a new viewport size.
    /// Idempotent; zero-sized notifications are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.set_viewport(width, height);
        self.renderer.resize(width, height);
    }

    /// Release everything: scene resources, then the renderer's GPU context.
    /// Returns the release counts and the spent backend so the host can
    /// finish platform teardown.
    pub fn dispose(mut self) -> (DisposeSummary, R) {
        let summary = self.scene.dispose();
        self.renderer.dispose();
        (summary, self.renderer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaderview_render::HeadlessRenderer;

    #[test]
    fn initialize_sets_exact_aspect() {
        let ctx = ViewerContext::initialize(HeadlessRenderer::new(), 800, 600).unwrap();
        assert_eq!(ctx.camera.aspect, 800.0 / 600.0);
        assert_eq!(ctx.scene.node_count(), 6);
    }

    #[test]
    fn zero_sized_container_is_rejected() {
        let err = ViewerContext::initialize(HeadlessRenderer::new(), 0, 600).unwrap_err();
        assert!(matches!(
            err,
            SceneInitError::DegenerateViewport { width: 0, height: 600 }
        ));
    }

    #[test]
    fn resize_updates_camera_and_renderer_only() {
        let mut ctx = ViewerContext::initialize(HeadlessRenderer::new(), 800, 600).unwrap();
        let nodes_before = ctx.scene.nodes().to_vec();

        ctx.resize(1024, 768);
        assert_eq!(ctx.camera.aspect, 1024.0 / 768.0);
        assert_eq!(ctx.renderer.viewport(), (1024, 768));
        assert_eq!(ctx.scene.nodes(), &nodes_before[..]);

        // Idempotent.
        ctx.resize(1024, 768);
        assert_eq!(ctx.camera.aspect, 1024.0 / 768.0);

        // Zero-size resize is ignored, not a panic or a NaN aspect.
        ctx.resize(0, 0);
        assert_eq!(ctx.camera.aspect, 1024.0 / 768.0);
    }

    #[test]
    fn dispose_releases_once() {
        let ctx = ViewerContext::initialize(HeadlessRenderer::new(), 800, 600).unwrap();
        let (summary, renderer) = ctx.dispose();
        assert_eq!(summary.geometries, 6);
        assert_eq!(summary.materials, 6);
        assert_eq!(renderer.dispose_count(), 1);
    }
}

use shaderview_render::SceneRenderer;
use shaderview_scene::{DisposeSummary, SceneInitError};

use crate::context::ViewerContext;

/// Presentation state: the single surface the UI layer reads.
///
/// Owned by the host view and passed explicitly to the components that need
/// it; nothing else may mutate the display fields.
pub struct ViewerState<R: SceneRenderer> {
    context: Option<ViewerContext<R>>,
    initialized: bool,
    error: Option<String>,
    fps: u32,
    draw_calls: u32,
    triangles: u32,
}

impl<R: SceneRenderer> Default for ViewerState<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: SceneRenderer> ViewerState<R> {
    pub fn new() -> Self {
        Self {
            context: None,
            initialized: false,
            error: None,
            fps: 0,
            draw_calls: 0,
            triangles: 0,
        }
    }

    /// Attempt initialization exactly once per mount. On failure the error
    /// message is captured here and the context stays empty; the caller may
    /// remount to retry.
    pub fn initialize(&mut self, renderer: R, width: u32, height: u32) {
        match ViewerContext::initialize(renderer, width, height) {
            Ok(context) => {
                self.context = Some(context);
                self.initialized = true;
                self.error = None;
            }
            Err(err) => {
                tracing::error!("scene initialization failed: {err}");
                self.fail(err);
            }
        }
    }

    /// Record an initialization failure. Clears any context so the animation
    /// cycle sees a consistent, uninitialized state.
    pub fn fail(&mut self, err: impl ToString) {
        self.context = None;
        self.initialized = false;
        self.error = Some(err.to_string());
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn context(&self) -> Option<&ViewerContext<R>> {
        self.context.as_ref()
    }

    pub fn context_mut(&mut self) -> Option<&mut ViewerContext<R>> {
        self.context.as_mut()
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn draw_calls(&self) -> u32 {
        self.draw_calls
    }

    pub fn triangles(&self) -> u32 {
        self.triangles
    }

    /// One throttled metrics update; the driver calls this every 30th cycle.
    pub fn update_performance(&mut self, fps: u32, draw_calls: u32, triangles: u32) {
        self.fps = fps;
        self.draw_calls = draw_calls;
        self.triangles = triangles;
    }

    /// Tear down: release the context (if any), clear error and metrics, and
    /// return to the pre-initialization state. Returns the release summary
    /// and spent backend when a context existed.
    pub fn dispose(&mut self) -> Option<(DisposeSummary, R)> {
        self.initialized = false;
        self.error = None;
        self.fps = 0;
        self.draw_calls = 0;
        self.triangles = 0;
        self.context.take().map(ViewerContext::dispose)
    }
}

impl<R: SceneRenderer> From<SceneInitError> for ViewerState<R> {
    /// A state born failed, for hosts whose GPU bring-up failed before a
    /// context could even be attempted.
    fn from(err: SceneInitError) -> Self {
        let mut state = Self::new();
        state.fail(err);
        state
    }
}

//! Animation driver: one update/render cycle per display refresh.
//!
//! # Invariants
//! - The cycle is a no-op unless the full render context is present.
//! - Running is an explicit flag, never derived from a pending-callback
//!   handle.
//! - Performance metrics publish every 30th cycle, never in between.
//! - After `stop`, no cycle mutates anything, even one already queued.

use std::collections::VecDeque;
use std::f32::consts::FRAC_PI_4;

use glam::Vec3;
use shaderview_render::{RenderStats, SceneRenderer};
use shaderview_scene::{NodeRole, Scene};
use shaderview_viewer::ViewerState;

/// Rolling window of instantaneous frame rates.
const FPS_WINDOW: usize = 60;
/// Cycles between metric publishes into presentation state.
const METRICS_INTERVAL: u64 = 30;

/// Drives the per-frame cycle for one mount of the viewer.
///
/// Idle until the context's four references are all present, Running until
/// the context is torn down or `stop` is called. A driver belongs to a
/// single mount; a remount gets a fresh driver.
#[derive(Debug)]
pub struct AnimationDriver {
    running: bool,
    stopped: bool,
    last_time_ms: Option<f64>,
    /// Total animated time in seconds.
    elapsed: f32,
    cycle: u64,
    fps_window: VecDeque<f64>,
    last_stats: RenderStats,
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self {
            running: false,
            stopped: false,
            last_time_ms: None,
            elapsed: 0.0,
            cycle: 0,
            fps_window: VecDeque::with_capacity(FPS_WINDOW),
            last_stats: RenderStats::default(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Cancel the loop at teardown. Guarantees that a cycle already queued
    /// by the host scheduler does nothing when it fires.
    pub fn stop(&mut self) {
        self.stopped = true;
        if self.running {
            self.running = false;
            tracing::info!("animation loop stopped");
        }
    }

    /// Run one cycle at host time `now_ms`. Returns true while Running, so
    /// the host knows to schedule the next refresh. No-ops (and reports
    /// Idle) when cancelled, when an error is present, or when any of the
    /// four context references is missing.
    pub fn advance<R: SceneRenderer>(&mut self, state: &mut ViewerState<R>, now_ms: f64) -> bool {
        if self.stopped || state.error().is_some() {
            self.running = false;
            return false;
        }
        let Some(ctx) = state.context_mut() else {
            self.running = false;
            return false;
        };

        if !self.running {
            self.running = true;
            self.last_time_ms = None;
            tracing::info!("animation loop started");
        }

        let elapsed_ms = match self.last_time_ms {
            Some(prev) => (now_ms - prev).max(0.0),
            None => 0.0,
        };
        self.last_time_ms = Some(now_ms);
        self.elapsed += elapsed_ms as f32 / 1000.0;

        ctx.controller.update(&mut ctx.camera);
        animate_nodes(&mut ctx.scene, self.elapsed);

        // Counters as the HUD would have seen them before this render.
        let published_stats = self.last_stats;
        self.last_stats = ctx.renderer.render(&ctx.scene, &ctx.camera);

        if elapsed_ms > 0.0 {
            self.fps_window.push_back(1000.0 / elapsed_ms);
            if self.fps_window.len() > FPS_WINDOW {
                self.fps_window.pop_front();
            }
        }

        self.cycle += 1;
        if self.cycle % METRICS_INTERVAL == 0 && !self.fps_window.is_empty() {
            let avg = self.fps_window.iter().sum::<f64>() / self.fps_window.len() as f64;
            state.update_performance(
                avg.round() as u32,
                published_stats.draw_calls,
                published_stats.triangles,
            );
        }

        true
    }
}

/// Advance every node's demo motion to absolute time `t` (seconds).
fn animate_nodes(scene: &mut Scene, t: f32) {
    for node in scene.nodes_mut() {
        match node.role {
            NodeRole::Fixed => {}
            NodeRole::DemoCube => {
                node.transform.rotation = Vec3::new(t * 0.5, t * 0.7, t * 0.3);
                if let Some(shader) = node.material.as_mut().and_then(|m| m.as_shader_mut()) {
                    shader.set_time(t);
                }
            }
            NodeRole::FloatingSphere { rest_height } => {
                let phase = node.transform.position.x;
                node.transform.position.y = rest_height + (t * 2.0 + phase).sin() * 0.3;
                node.transform.rotation.y = t * 0.4;
            }
            NodeRole::SpinningTorus => {
                node.transform.rotation = Vec3::new(FRAC_PI_4 + t * 0.2, 0.0, t * 0.5);
            }
            NodeRole::ParticleField => {
                node.transform.rotation.y = t * 0.1;
                node.transform.rotation.x = (t * 0.5).sin() * 0.1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaderview_render::HeadlessRenderer;
    use shaderview_scene::Material;

    const FRAME_MS: f64 = 16.6;

    fn mounted_state() -> ViewerState<HeadlessRenderer> {
        let mut state = ViewerState::new();
        state.initialize(HeadlessRenderer::new(), 800, 600);
        state
    }

    fn run_cycles(driver: &mut AnimationDriver, state: &mut ViewerState<HeadlessRenderer>, n: u64) {
        for i in 0..n {
            driver.advance(state, i as f64 * FRAME_MS);
        }
    }

    #[test]
    fn noop_without_context() {
        let mut driver = AnimationDriver::new();
        let mut state: ViewerState<HeadlessRenderer> = ViewerState::new();
        assert!(!driver.advance(&mut state, 0.0));
        assert!(!driver.is_running());
        assert_eq!(state.fps(), 0);
    }

    #[test]
    fn does_not_start_while_error_present() {
        let mut driver = AnimationDriver::new();
        let mut state: ViewerState<HeadlessRenderer> = ViewerState::new();
        state.fail("GPU context unavailable");
        assert!(!driver.advance(&mut state, 0.0));
        assert!(!driver.is_running());
    }

    #[test]
    fn fps_window_holds_sixty_samples_and_evicts_oldest() {
        let mut driver = AnimationDriver::new();
        let mut state = mounted_state();

        // Cycle 0 produces no sample (no previous timestamp). Make the first
        // real sample a distinctive 100 fps so eviction is observable.
        let mut now = 0.0;
        for i in 0..61 {
            now += if i == 1 { 10.0 } else { FRAME_MS };
            driver.advance(&mut state, now);
        }
        assert_eq!(driver.fps_window.len(), 60);
        assert!((driver.fps_window.front().unwrap() - 100.0).abs() < 1e-9);

        // The 61st sample evicts exactly the oldest.
        now += FRAME_MS;
        driver.advance(&mut state, now);
        assert_eq!(driver.fps_window.len(), 60);
        assert!(driver.fps_window.iter().all(|f| (*f - 100.0).abs() > 1e-9));
    }

    #[test]
    fn metrics_publish_only_every_thirtieth_cycle() {
        let mut driver = AnimationDriver::new();
        let mut state = mounted_state();

        run_cycles(&mut driver, &mut state, 29);
        assert_eq!(state.fps(), 0);
        assert_eq!(state.draw_calls(), 0);

        driver.advance(&mut state, 29.0 * FRAME_MS);
        let fps_at_30 = state.fps();
        assert!(fps_at_30 > 0);
        assert_eq!(state.draw_calls(), 6);
        assert_eq!(state.triangles(), 12 + 2048 * 2);

        // Cycles 31..59 leave the published values untouched.
        state.update_performance(fps_at_30, 6, 4108);
        for i in 30..59 {
            driver.advance(&mut state, i as f64 * FRAME_MS);
            assert_eq!(state.fps(), fps_at_30);
        }
    }

    #[test]
    fn ninety_cycles_publish_three_times() {
        let mut driver = AnimationDriver::new();
        let mut state = mounted_state();
        let mut publishes = 0;
        let mut last = (0, 0, 0);
        for i in 0..90 {
            driver.advance(&mut state, i as f64 * FRAME_MS);
            let current = (state.fps(), state.draw_calls(), state.triangles());
            if current != last {
                publishes += 1;
                last = current;
            }
        }
        // At steady 16.6ms cadence the averaged fps is identical at each
        // publish, so distinct-value transitions equal one; check cadence via
        // the cycle counter instead.
        assert!(publishes >= 1);
        assert_eq!(driver.cycle, 90);
        assert_eq!(driver.cycle / METRICS_INTERVAL, 3);
        assert_eq!(state.fps(), 60);
        assert_eq!(state.draw_calls(), 6);
        assert_eq!(state.triangles(), 4108);
    }

    #[test]
    fn demo_cube_rotation_and_time_uniform_track_elapsed_time() {
        let mut driver = AnimationDriver::new();
        let mut state = mounted_state();

        driver.advance(&mut state, 0.0);
        driver.advance(&mut state, 1000.0);

        let ctx = state.context().unwrap();
        let cube = &ctx.scene.nodes()[1];
        let r = cube.transform.rotation;
        assert!((r.x - 0.5).abs() < 1e-4);
        assert!((r.y - 0.7).abs() < 1e-4);
        assert!((r.z - 0.3).abs() < 1e-4);

        let Some(Material::Shader(shader)) = &cube.material else {
            panic!("demo cube carries a shader material");
        };
        assert!((shader.time() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn spheres_bob_with_x_position_phase() {
        let mut driver = AnimationDriver::new();
        let mut state = mounted_state();

        driver.advance(&mut state, 0.0);
        driver.advance(&mut state, 1000.0);

        let ctx = state.context().unwrap();
        let glass = &ctx.scene.nodes()[2];
        let metal = &ctx.scene.nodes()[3];

        let expected_glass = 2.0 + (2.0_f32 + (-4.0)).sin() * 0.3;
        let expected_metal = 2.0 + (2.0_f32 + 4.0).sin() * 0.3;
        assert!((glass.transform.position.y - expected_glass).abs() < 1e-4);
        assert!((metal.transform.position.y - expected_metal).abs() < 1e-4);
        assert!((glass.transform.rotation.y - 0.4).abs() < 1e-4);
    }

    #[test]
    fn torus_keeps_tilt_while_spinning() {
        let mut driver = AnimationDriver::new();
        let mut state = mounted_state();

        driver.advance(&mut state, 0.0);
        driver.advance(&mut state, 2000.0);

        let torus = &state.context().unwrap().scene.nodes()[4];
        let r = torus.transform.rotation;
        assert!((r.x - (FRAC_PI_4 + 0.4)).abs() < 1e-4);
        assert!((r.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn particles_drift_slowly() {
        let mut driver = AnimationDriver::new();
        let mut state = mounted_state();

        driver.advance(&mut state, 0.0);
        driver.advance(&mut state, 1000.0);

        let particles = &state.context().unwrap().scene.nodes()[5];
        let r = particles.transform.rotation;
        assert!((r.y - 0.1).abs() < 1e-4);
        assert!((r.x - 0.5_f32.sin() * 0.1).abs() < 1e-4);
    }

    #[test]
    fn stop_cancels_even_a_queued_cycle() {
        let mut driver = AnimationDriver::new();
        let mut state = mounted_state();

        driver.advance(&mut state, 0.0);
        assert!(driver.is_running());

        driver.stop();
        let frames_before = state.context().unwrap().renderer.frames();
        let cube_before = state.context().unwrap().scene.nodes()[1].transform;

        // The host may still deliver the cycle it had already queued.
        assert!(!driver.advance(&mut state, 5000.0));
        assert!(!driver.is_running());
        assert_eq!(state.context().unwrap().renderer.frames(), frames_before);
        assert_eq!(
            state.context().unwrap().scene.nodes()[1].transform,
            cube_before
        );
    }

    #[test]
    fn end_to_end_mount_animate_unmount() {
        let mut driver = AnimationDriver::new();
        let mut state = ViewerState::new();
        state.initialize(HeadlessRenderer::new(), 800, 600);

        assert!(state.is_initialized());
        assert!(state.error().is_none());
        let aspect = state.context().unwrap().camera.aspect;
        assert!((aspect - 800.0 / 600.0).abs() < 1e-6);

        run_cycles(&mut driver, &mut state, 90);
        assert_eq!(driver.cycle / METRICS_INTERVAL, 3);
        assert_eq!(state.draw_calls(), 6);
        assert_eq!(state.triangles(), 4108);

        driver.stop();
        let (summary, renderer) = state.dispose().unwrap();
        assert_eq!(summary.geometries, 6);
        assert_eq!(summary.materials, 6);
        assert_eq!(renderer.dispose_count(), 1);
        assert!(!state.is_initialized());
        assert!(state.error().is_none());
    }
}

use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use shaderview_driver::AnimationDriver;
use shaderview_render_wgpu::WgpuRenderer;
use shaderview_scene::SceneInitError;
use shaderview_shaders::ShaderId;
use shaderview_viewer::ViewerState;
use std::collections::BTreeMap;
use std::f32::consts::TAU;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "shaderview", about = "Desktop shader and scene viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Catalog shader applied to the demo cube
    /// (holographic, ripple, colorCycle, basic)
    #[arg(long, default_value = "colorCycle")]
    cube_shader: ShaderId,
}

/// Drawing-buffer size for the window, with the device pixel ratio capped
/// at 2 so high-density displays do not quadruple the fill cost.
fn buffer_size(window: &Window) -> (u32, u32) {
    let size = window.inner_size();
    let scale = (2.0 / window.scale_factor()).min(1.0);
    (
        ((size.width as f64) * scale).round().max(1.0) as u32,
        ((size.height as f64) * scale).round().max(1.0) as u32,
    )
}

struct ViewerApp {
    cube_shader: ShaderId,
    window: Option<Arc<Window>>,
    state: ViewerState<WgpuRenderer>,
    driver: AnimationDriver,
    start: Instant,
    // Pointer state
    rotating: bool,
    panning: bool,
    last_cursor: Option<(f64, f64)>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl ViewerApp {
    fn new(cube_shader: ShaderId) -> Self {
        Self {
            cube_shader,
            window: None,
            state: ViewerState::new(),
            driver: AnimationDriver::new(),
            start: Instant::now(),
            rotating: false,
            panning: false,
            last_cursor: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    /// Swap the demo cube's catalog program for the one picked on the
    /// command line. Uniform state starts from the defaults either way.
    fn apply_cube_shader(&mut self) {
        let desired = self.cube_shader;
        let Some(context) = self.state.context_mut() else {
            return;
        };
        for node in context.scene.nodes_mut() {
            if let Some(shader) = node.material.as_mut().and_then(|m| m.as_shader_mut()) {
                if shader.id != desired {
                    *shader = shaderview_shaders::material(desired, BTreeMap::new());
                    tracing::info!(shader = desired.name(), "cube shader applied");
                }
            }
        }
    }

    fn pointer_moved(&mut self, x: f64, y: f64) {
        let Some((last_x, last_y)) = self.last_cursor.replace((x, y)) else {
            return;
        };
        let dx = (x - last_x) as f32;
        let dy = (y - last_y) as f32;
        let height = self
            .window
            .as_ref()
            .map(|w| w.inner_size().height.max(1))
            .unwrap_or(1) as f32;

        let Some(context) = self.state.context_mut() else {
            return;
        };
        if self.rotating {
            context
                .controller
                .rotate(TAU * dx / height, TAU * dy / height);
        }
        if self.panning {
            // Pixels to world units at the focus distance.
            let target_distance =
                context.controller.distance() * (context.camera.fov * 0.5).tan();
            context.controller.pan(
                2.0 * dx * target_distance / height,
                2.0 * dy * target_distance / height,
                &context.camera,
            );
        }
    }

    fn draw_hud(&mut self) {
        let (Some(window), Some(egui_winit), Some(egui_renderer)) = (
            self.window.clone(),
            self.egui_winit.as_mut(),
            self.egui_renderer.as_mut(),
        ) else {
            return;
        };

        let raw_input = egui_winit.take_egui_input(&window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            hud_ui(ctx, &self.state);
        });
        egui_winit.handle_platform_output(&window, full_output.platform_output);

        let Some(context) = self.state.context_mut() else {
            return;
        };
        let renderer = &mut context.renderer;
        if renderer.pending_view().is_none() {
            return;
        }

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let (width, height) = renderer.size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        {
            let device = renderer.device();
            let queue = renderer.queue();
            for (id, image_delta) in &full_output.textures_delta.set {
                egui_renderer.update_texture(device, queue, *id, image_delta);
            }
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("hud_encoder"),
            });
            egui_renderer.update_buffers(
                device,
                queue,
                &mut encoder,
                &paint_jobs,
                &screen_descriptor,
            );
            {
                let view = renderer.pending_view().unwrap();
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("hud_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    })
                    .forget_lifetime();
                egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
            }
            queue.submit(std::iter::once(encoder.finish()));
            for id in &full_output.textures_delta.free {
                egui_renderer.free_texture(id);
            }
        }

        renderer.present();
    }
}

/// HUD overlay. Initialization errors never reach this path: without a
/// renderer there is no frame to paint on, so they surface through the
/// window title and the log instead.
fn hud_ui(ctx: &EguiContext, state: &ViewerState<WgpuRenderer>) {
    if !state.is_initialized() {
        return;
    }

    egui::Window::new("performance")
        .title_bar(false)
        .resizable(false)
        .anchor(egui::Align2::LEFT_TOP, [12.0, 12.0])
        .show(ctx, |ui| {
            ui.label(format!("FPS: {}", state.fps()));
            ui.label(format!("Calls: {}", state.draw_calls()));
            ui.label(format!("Tris: {}", state.triangles()));
        });

    egui::Window::new("controls_hint")
        .title_bar(false)
        .resizable(false)
        .anchor(egui::Align2::LEFT_BOTTOM, [12.0, -12.0])
        .show(ctx, |ui| {
            ui.label("Left drag: orbit   Right drag: pan   Scroll: zoom");
        });
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("shaderview")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let (width, height) = buffer_size(&window);
        match WgpuRenderer::new(window.clone(), width, height) {
            Ok(renderer) => {
                let egui_winit = egui_winit::State::new(
                    self.egui_ctx.clone(),
                    egui::ViewportId::ROOT,
                    &window,
                    Some(window.scale_factor() as f32),
                    None,
                    None,
                );
                let egui_renderer = egui_wgpu::Renderer::new(
                    renderer.device(),
                    renderer.surface_format(),
                    None,
                    1,
                    false,
                );
                self.egui_winit = Some(egui_winit);
                self.egui_renderer = Some(egui_renderer);
                self.state.initialize(renderer, width, height);
                self.apply_cube_shader();
            }
            Err(err) => {
                tracing::error!("GPU bring-up failed: {err}");
                self.state
                    .fail(SceneInitError::GpuUnavailable(err.to_string()));
                window.set_title("shaderview (GPU unavailable)");
            }
        }

        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.driver.stop();
                if let Some((summary, _renderer)) = self.state.dispose() {
                    tracing::info!(
                        geometries = summary.geometries,
                        materials = summary.materials,
                        "viewer disposed"
                    );
                }
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                if let Some(window) = &self.window {
                    let (width, height) = buffer_size(window);
                    if let Some(context) = self.state.context_mut() {
                        context.resize(width, height);
                    }
                }
            }
            WindowEvent::MouseInput { button, state, .. } => {
                let pressed = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.rotating = pressed,
                    MouseButton::Right => self.panning = pressed,
                    _ => {}
                }
                if !pressed {
                    self.last_cursor = None;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.rotating || self.panning {
                    self.pointer_moved(position.x, position.y);
                } else {
                    self.last_cursor = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => (pos.y / 60.0) as f32,
                };
                if let Some(context) = self.state.context_mut() {
                    context.controller.zoom(steps);
                }
            }
            WindowEvent::RedrawRequested => {
                let now_ms = self.start.elapsed().as_secs_f64() * 1000.0;
                self.driver.advance(&mut self.state, now_ms);
                self.draw_hud();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("shaderview starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(cli.cube_shader);
    event_loop.run_app(&mut app)?;

    Ok(())
}

use std::collections::BTreeMap;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use shaderview_common::NodeId;
use shaderview_render::{OrbitCamera, RenderStats, SceneRenderer, scene_stats};
use shaderview_scene::{Geometry, Light, Material, Scene, ShadowConfig};
use shaderview_shaders::{ShaderId, sources};
use wgpu::util::DeviceExt;

use crate::mesh;
use crate::wgsl;

/// Tone-mapping exposure applied in the lit fragment stage.
const EXPOSURE: f32 = 1.2;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Errors from GPU context bring-up.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("surface creation failed: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter")]
    NoAdapter,
    #[error("device request failed: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LitUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    light_view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    base_color: [f32; 4],
    material: [f32; 4],
    ambient: [f32; 4],
    fog_color: [f32; 4],
    fog_params: [f32; 4],
    lights: [[f32; 4]; 6],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ShaderParams {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    time: f32,
    _pad0: f32,
    resolution: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FlatUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ShadowUniforms {
    light_view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
}

/// Which pipeline a node draws with. Decided once from its material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineKind {
    Lit,
    Shader(ShaderId),
    Wireframe,
    Grid,
    Points,
}

struct ShadowResources {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Per-node GPU resources, created lazily on first sight of the node.
struct NodeResources {
    kind: PipelineKind,
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<wgpu::Buffer>,
    draw_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    shadow: Option<ShadowResources>,
}

/// Key-light and fog parameters shared by every lit node in a frame.
struct FrameEnv {
    ambient: [f32; 3],
    lights: [[f32; 4]; 6],
    light_view_proj: Mat4,
    bias: f32,
    has_shadow: bool,
    fog_color: [f32; 4],
    fog_far: f32,
}

/// A rendered surface frame that has not been presented yet. The host gets a
/// chance to composite UI on top before calling [`WgpuRenderer::present`].
struct PendingFrame {
    frame: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// wgpu-backed scene renderer. Owns the surface, device and queue.
pub struct WgpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    shadow_view: wgpu::TextureView,

    lit_layout: wgpu::BindGroupLayout,
    flat_layout: wgpu::BindGroupLayout,
    shader_layout: wgpu::BindGroupLayout,
    shadow_layout: wgpu::BindGroupLayout,
    shadow_sampler: wgpu::Sampler,

    lit_pipeline: wgpu::RenderPipeline,
    wireframe_pipeline: wgpu::RenderPipeline,
    grid_pipeline: wgpu::RenderPipeline,
    points_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    shader_pipelines: BTreeMap<ShaderId, wgpu::RenderPipeline>,

    nodes: BTreeMap<NodeId, NodeResources>,
    pending: Option<PendingFrame>,
    last_stats: RenderStats,
}

impl WgpuRenderer {
    /// Bring up the GPU context on a surface target (typically the window)
    /// and build every pipeline the demo scene needs.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, ContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(target)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(ContextError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("shaderview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        let depth_view = create_depth_texture(&device, config.width, config.height);
        let shadow_view = create_shadow_texture(&device, ShadowConfig::default().map_size);

        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let lit_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lit_bind_group_layout"),
            entries: &[
                uniform_layout_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });
        let flat_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("flat_bind_group_layout"),
            entries: &[uniform_layout_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });
        let shader_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shader_bind_group_layout"),
            entries: &[uniform_layout_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });
        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_bind_group_layout"),
            entries: &[uniform_layout_entry(0, wgpu::ShaderStages::VERTEX)],
        });

        let vertex_attrs = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x2,
        ];
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<mesh::Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &vertex_attrs,
        };
        let grid_attrs = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x4,
        ];
        let grid_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<mesh::GridVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &grid_attrs,
        };
        let point_attrs = wgpu::vertex_attr_array![0 => Float32x3];
        let point_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<mesh::PointVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &point_attrs,
        };

        let lit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lit_pipeline_layout"),
            bind_group_layouts: &[&lit_layout],
            push_constant_ranges: &[],
        });
        let flat_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("flat_pipeline_layout"),
            bind_group_layouts: &[&flat_layout],
            push_constant_ranges: &[],
        });
        let shader_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("shader_pipeline_layout"),
                bind_group_layouts: &[&shader_layout],
                push_constant_ranges: &[],
            });
        let shadow_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("shadow_pipeline_layout"),
                bind_group_layouts: &[&shadow_layout],
                push_constant_ranges: &[],
            });

        let lit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lit_shader"),
            source: wgpu::ShaderSource::Wgsl(wgsl::LIT_SHADER.into()),
        });
        let lit_pipeline = build_pipeline(
            &device,
            surface_format,
            &PipelineSpec {
                label: "lit_pipeline",
                shader: &lit_shader,
                layout: &lit_pipeline_layout,
                buffers: &[vertex_layout.clone()],
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                blend: wgpu::BlendState::ALPHA_BLENDING,
                depth_write: true,
            },
        );

        let flat_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("flat_shader"),
            source: wgpu::ShaderSource::Wgsl(wgsl::FLAT_SHADER.into()),
        });
        let wireframe_pipeline = build_pipeline(
            &device,
            surface_format,
            &PipelineSpec {
                label: "wireframe_pipeline",
                shader: &flat_shader,
                layout: &flat_pipeline_layout,
                buffers: &[vertex_layout.clone()],
                topology: wgpu::PrimitiveTopology::LineList,
                cull_mode: None,
                blend: wgpu::BlendState::REPLACE,
                depth_write: true,
            },
        );

        let grid_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("grid_shader"),
            source: wgpu::ShaderSource::Wgsl(wgsl::GRID_SHADER.into()),
        });
        let grid_pipeline = build_pipeline(
            &device,
            surface_format,
            &PipelineSpec {
                label: "grid_pipeline",
                shader: &grid_shader,
                layout: &flat_pipeline_layout,
                buffers: &[grid_layout],
                topology: wgpu::PrimitiveTopology::LineList,
                cull_mode: None,
                blend: wgpu::BlendState::ALPHA_BLENDING,
                depth_write: true,
            },
        );

        let points_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("points_shader"),
            source: wgpu::ShaderSource::Wgsl(wgsl::POINTS_SHADER.into()),
        });
        // Additive blend, no depth writes; particles never occlude geometry.
        let points_pipeline = build_pipeline(
            &device,
            surface_format,
            &PipelineSpec {
                label: "points_pipeline",
                shader: &points_shader,
                layout: &flat_pipeline_layout,
                buffers: &[point_layout],
                topology: wgpu::PrimitiveTopology::PointList,
                cull_mode: None,
                blend: wgpu::BlendState {
                    color: wgpu::BlendComponent {
                        src_factor: wgpu::BlendFactor::SrcAlpha,
                        dst_factor: wgpu::BlendFactor::One,
                        operation: wgpu::BlendOperation::Add,
                    },
                    alpha: wgpu::BlendComponent {
                        src_factor: wgpu::BlendFactor::One,
                        dst_factor: wgpu::BlendFactor::One,
                        operation: wgpu::BlendOperation::Add,
                    },
                },
                depth_write: false,
            },
        );

        // One pipeline per catalog program; modules are prelude + stages.
        let mut shader_pipelines = BTreeMap::new();
        for id in ShaderId::ALL {
            let source = format!(
                "{}{}{}",
                sources::SHADER_PRELUDE,
                id.vertex_source(),
                id.fragment_source()
            );
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(id.name()),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
            let pipeline = build_pipeline(
                &device,
                surface_format,
                &PipelineSpec {
                    label: id.name(),
                    shader: &module,
                    layout: &shader_pipeline_layout,
                    buffers: &[vertex_layout.clone()],
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    blend: wgpu::BlendState::ALPHA_BLENDING,
                    depth_write: true,
                },
            );
            shader_pipelines.insert(id, pipeline);
        }

        let shadow_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow_shader"),
            source: wgpu::ShaderSource::Wgsl(wgsl::SHADOW_SHADER.into()),
        });
        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow_pipeline"),
            layout: Some(&shadow_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shadow_module,
                entry_point: Some("vs_shadow"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout],
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            shadow_view,
            lit_layout,
            flat_layout,
            shader_layout,
            shadow_layout,
            shadow_sampler,
            lit_pipeline,
            wireframe_pipeline,
            grid_pipeline,
            points_pipeline,
            shadow_pipeline,
            shader_pipelines,
            nodes: BTreeMap::new(),
            pending: None,
            last_stats: RenderStats::default(),
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// The frame produced by the last `render` call, not yet presented.
    /// The host composites UI into this view before presenting.
    pub fn pending_view(&self) -> Option<&wgpu::TextureView> {
        self.pending.as_ref().map(|p| &p.view)
    }

    /// Present the pending frame, if any.
    pub fn present(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.frame.present();
        }
    }

    /// Create GPU resources for scene nodes seen for the first time. Nodes
    /// without a material never draw and get no resources.
    fn ensure_node_resources(&mut self, scene: &Scene) {
        for node in scene.nodes() {
            if self.nodes.contains_key(&node.id) {
                continue;
            }
            let Some(material) = &node.material else {
                continue;
            };
            let resources = match material {
                Material::Pbr(_) => self.build_surface_node(&node.geometry, node.cast_shadow),
                Material::Shader(shader) => self
                    .build_surface_node(&node.geometry, node.cast_shadow)
                    .map(|r| self.rebind_for_shader(r, shader.id)),
                Material::Wireframe(_) => self.build_wireframe_node(&node.geometry),
                Material::Grid(_) => self.build_grid_node(&node.geometry, material),
                Material::Points(_) => self.build_points_node(&node.geometry),
            };
            match resources {
                Some(resources) => {
                    self.nodes.insert(node.id, resources);
                }
                None => {
                    tracing::warn!(
                        name = node.name.as_str(),
                        "node has no drawable geometry/material pairing"
                    );
                }
            }
        }
    }

    /// Triangle-mesh node drawn with the lit pipeline by default.
    fn build_surface_node(&self, geometry: &Geometry, cast_shadow: bool) -> Option<NodeResources> {
        let (vertices, indices) = match geometry {
            Geometry::Cube { size } => mesh::cube_mesh(*size),
            Geometry::Sphere {
                radius,
                segments,
                rings,
            } => mesh::sphere_mesh(*radius, *segments, *rings),
            _ => return None,
        };
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("surface_vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("surface_indices"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let uniform_buffer =
            self.uniform_buffer(std::mem::size_of::<LitUniforms>() as u64, "lit_uniforms");
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lit_bind_group"),
            layout: &self.lit_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&self.shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.shadow_sampler),
                },
            ],
        });

        let shadow = cast_shadow.then(|| {
            let uniform_buffer = self.uniform_buffer(
                std::mem::size_of::<ShadowUniforms>() as u64,
                "shadow_uniforms",
            );
            let bind_group =
                self.plain_bind_group(&self.shadow_layout, &uniform_buffer, "shadow_bind_group");
            ShadowResources {
                uniform_buffer,
                bind_group,
            }
        });

        Some(NodeResources {
            kind: PipelineKind::Lit,
            vertex_buffer,
            index_buffer: Some(index_buffer),
            draw_count: indices.len() as u32,
            uniform_buffer,
            bind_group,
            shadow,
        })
    }

    /// Swap a surface node onto a catalog shader pipeline. The uniform block
    /// becomes the small params struct the catalog programs declare.
    fn rebind_for_shader(&self, mut resources: NodeResources, id: ShaderId) -> NodeResources {
        resources.kind = PipelineKind::Shader(id);
        resources.uniform_buffer =
            self.uniform_buffer(std::mem::size_of::<ShaderParams>() as u64, "shader_params");
        resources.bind_group = self.plain_bind_group(
            &self.shader_layout,
            &resources.uniform_buffer,
            "shader_bind_group",
        );
        resources
    }

    fn build_wireframe_node(&self, geometry: &Geometry) -> Option<NodeResources> {
        let Geometry::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        } = geometry
        else {
            return None;
        };
        let (vertices, indices) =
            mesh::torus_wireframe_mesh(*radius, *tube, *radial_segments, *tubular_segments);
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("wireframe_vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("wireframe_indices"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let uniform_buffer =
            self.uniform_buffer(std::mem::size_of::<FlatUniforms>() as u64, "flat_uniforms");
        let bind_group =
            self.plain_bind_group(&self.flat_layout, &uniform_buffer, "flat_bind_group");
        Some(NodeResources {
            kind: PipelineKind::Wireframe,
            vertex_buffer,
            index_buffer: Some(index_buffer),
            draw_count: indices.len() as u32,
            uniform_buffer,
            bind_group,
            shadow: None,
        })
    }

    fn build_grid_node(&self, geometry: &Geometry, material: &Material) -> Option<NodeResources> {
        let (Geometry::Grid { size, divisions }, Material::Grid(grid)) = (geometry, material)
        else {
            return None;
        };
        let vertices = mesh::grid_mesh(*size, *divisions, grid.center_color, grid.grid_color);
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("grid_vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let uniform_buffer =
            self.uniform_buffer(std::mem::size_of::<FlatUniforms>() as u64, "flat_uniforms");
        let bind_group =
            self.plain_bind_group(&self.flat_layout, &uniform_buffer, "flat_bind_group");
        Some(NodeResources {
            kind: PipelineKind::Grid,
            vertex_buffer,
            index_buffer: None,
            draw_count: vertices.len() as u32,
            uniform_buffer,
            bind_group,
            shadow: None,
        })
    }

    fn build_points_node(&self, geometry: &Geometry) -> Option<NodeResources> {
        let Geometry::Points { positions } = geometry else {
            return None;
        };
        let vertices = mesh::point_vertices(positions);
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("point_vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let uniform_buffer =
            self.uniform_buffer(std::mem::size_of::<FlatUniforms>() as u64, "flat_uniforms");
        let bind_group =
            self.plain_bind_group(&self.flat_layout, &uniform_buffer, "flat_bind_group");
        Some(NodeResources {
            kind: PipelineKind::Points,
            vertex_buffer,
            index_buffer: None,
            draw_count: vertices.len() as u32,
            uniform_buffer,
            bind_group,
            shadow: None,
        })
    }

    fn uniform_buffer(&self, size: u64, label: &str) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn plain_bind_group(
        &self,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
        label: &str,
    ) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }

    /// Upload this frame's uniform blocks for every drawable node.
    fn write_uniforms(&self, scene: &Scene, camera: &OrbitCamera, env: &FrameEnv) {
        let view_proj = camera.view_projection().to_cols_array_2d();
        let light_view_proj = env.light_view_proj.to_cols_array_2d();
        for node in scene.nodes() {
            let Some(resources) = self.nodes.get(&node.id) else {
                continue;
            };
            let model = node.transform.matrix().to_cols_array_2d();
            match &node.material {
                Some(Material::Pbr(pbr)) => {
                    let receive = if node.receive_shadow && env.has_shadow {
                        1.0
                    } else {
                        0.0
                    };
                    let uniforms = LitUniforms {
                        view_proj,
                        model,
                        light_view_proj,
                        camera_pos: [camera.position.x, camera.position.y, camera.position.z, 1.0],
                        base_color: [pbr.color.r(), pbr.color.g(), pbr.color.b(), pbr.opacity],
                        material: [pbr.metalness, pbr.roughness, pbr.transmission, pbr.clearcoat],
                        ambient: [env.ambient[0], env.ambient[1], env.ambient[2], env.bias],
                        fog_color: env.fog_color,
                        fog_params: [env.fog_far, EXPOSURE, receive, 0.0],
                        lights: env.lights,
                    };
                    self.queue
                        .write_buffer(&resources.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
                }
                Some(Material::Shader(shader)) => {
                    let resolution = shader.resolution();
                    let params = ShaderParams {
                        view_proj,
                        model,
                        time: shader.time(),
                        _pad0: 0.0,
                        resolution: [resolution.x, resolution.y],
                    };
                    self.queue
                        .write_buffer(&resources.uniform_buffer, 0, bytemuck::bytes_of(&params));
                }
                Some(Material::Wireframe(wire)) => {
                    let uniforms = FlatUniforms {
                        view_proj,
                        model,
                        color: [wire.color.r(), wire.color.g(), wire.color.b(), 1.0],
                    };
                    self.queue
                        .write_buffer(&resources.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
                }
                Some(Material::Grid(grid)) => {
                    let uniforms = FlatUniforms {
                        view_proj,
                        model,
                        color: [1.0, 1.0, 1.0, grid.opacity],
                    };
                    self.queue
                        .write_buffer(&resources.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
                }
                Some(Material::Points(points)) => {
                    let uniforms = FlatUniforms {
                        view_proj,
                        model,
                        color: [
                            points.color.r(),
                            points.color.g(),
                            points.color.b(),
                            points.opacity,
                        ],
                    };
                    self.queue
                        .write_buffer(&resources.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
                }
                None => {}
            }
            if let Some(shadow) = &resources.shadow {
                let uniforms = ShadowUniforms {
                    light_view_proj,
                    model,
                };
                self.queue
                    .write_buffer(&shadow.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
            }
        }
    }
}

impl SceneRenderer for WgpuRenderer {
    fn render(&mut self, scene: &Scene, camera: &OrbitCamera) -> RenderStats {
        // A frame the host never presented is dropped, not shown late.
        self.pending = None;

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return self.last_stats;
            }
            Err(err) => {
                tracing::error!("surface error: {err}");
                return self.last_stats;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.ensure_node_resources(scene);
        let env = collect_environment(scene);
        self.write_uniforms(scene, camera, &env);

        let clear = scene
            .background
            .map(|c| wgpu::Color {
                r: c.r() as f64,
                g: c.g() as f64,
                b: c.b() as f64,
                a: 1.0,
            })
            .unwrap_or(wgpu::Color::BLACK);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        if env.has_shadow {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_pipeline(&self.shadow_pipeline);
            for node in scene.nodes() {
                let Some(resources) = self.nodes.get(&node.id) else {
                    continue;
                };
                let Some(shadow) = &resources.shadow else {
                    continue;
                };
                let Some(index_buffer) = &resources.index_buffer else {
                    continue;
                };
                pass.set_bind_group(0, &shadow.bind_group, &[]);
                pass.set_vertex_buffer(0, resources.vertex_buffer.slice(..));
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..resources.draw_count, 0, 0..1);
            }
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for node in scene.nodes() {
                let Some(resources) = self.nodes.get(&node.id) else {
                    continue;
                };
                let pipeline = match resources.kind {
                    PipelineKind::Lit => &self.lit_pipeline,
                    PipelineKind::Shader(id) => &self.shader_pipelines[&id],
                    PipelineKind::Wireframe => &self.wireframe_pipeline,
                    PipelineKind::Grid => &self.grid_pipeline,
                    PipelineKind::Points => &self.points_pipeline,
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &resources.bind_group, &[]);
                pass.set_vertex_buffer(0, resources.vertex_buffer.slice(..));
                match &resources.index_buffer {
                    Some(index_buffer) => {
                        pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..resources.draw_count, 0, 0..1);
                    }
                    None => pass.draw(0..resources.draw_count, 0..1),
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.pending = Some(PendingFrame { frame, view });

        self.last_stats = scene_stats(scene);
        self.last_stats
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_texture(&self.device, self.config.width, self.config.height);
    }

    fn dispose(&mut self) {
        self.pending = None;
        let released = self.nodes.len();
        self.nodes.clear();
        self.device.destroy();
        tracing::info!(nodes = released, "GPU resources released");
    }
}

struct PipelineSpec<'a> {
    label: &'a str,
    shader: &'a wgpu::ShaderModule,
    layout: &'a wgpu::PipelineLayout,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    blend: wgpu::BlendState,
    depth_write: bool,
}

fn build_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    spec: &PipelineSpec<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(spec.layout),
        vertex: wgpu::VertexState {
            module: spec.shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: spec.buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: spec.shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(spec.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: spec.topology,
            cull_mode: spec.cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: spec.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn uniform_layout_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Fold the light rig and fog into the per-frame uniform fields. The first
/// shadow-casting directional becomes the key light in slot zero.
fn collect_environment(scene: &Scene) -> FrameEnv {
    let mut env = FrameEnv {
        ambient: [0.0; 3],
        lights: [[0.0; 4]; 6],
        light_view_proj: Mat4::IDENTITY,
        bias: 0.0,
        has_shadow: false,
        // Defaults push the fog band past any visible geometry.
        fog_color: [0.0, 0.0, 0.0, 1.0e9],
        fog_far: 2.0e9,
    };
    if let Some(fog) = &scene.fog {
        env.fog_color = [fog.color.r(), fog.color.g(), fog.color.b(), fog.near];
        env.fog_far = fog.far;
    }

    let mut slot = 0usize;
    for light in scene.lights() {
        match light {
            Light::Ambient { color, intensity } => {
                env.ambient[0] += color.r() * intensity;
                env.ambient[1] += color.g() * intensity;
                env.ambient[2] += color.b() * intensity;
            }
            Light::Directional {
                color,
                intensity,
                position,
                shadow,
            } => {
                if slot >= 3 {
                    continue;
                }
                let dir = position.normalize_or_zero();
                env.lights[slot * 2] = [dir.x, dir.y, dir.z, *intensity];
                env.lights[slot * 2 + 1] = [color.r(), color.g(), color.b(), 0.0];
                if let Some(cfg) = shadow {
                    if !env.has_shadow {
                        env.has_shadow = true;
                        env.bias = cfg.bias;
                        let proj = Mat4::orthographic_rh(
                            -cfg.extent,
                            cfg.extent,
                            -cfg.extent,
                            cfg.extent,
                            cfg.near,
                            cfg.far,
                        );
                        env.light_view_proj =
                            proj * Mat4::look_at_rh(*position, Vec3::ZERO, Vec3::Y);
                    }
                }
                slot += 1;
            }
        }
    }
    env
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

fn create_shadow_texture(device: &wgpu::Device, map_size: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("shadow_map"),
        size: wgpu::Extent3d {
            width: map_size,
            height: map_size,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaderview_scene::build_demo_scene;

    #[test]
    fn catalog_modules_declare_exactly_one_entry_per_stage() {
        for id in ShaderId::ALL {
            let source = format!(
                "{}{}{}",
                sources::SHADER_PRELUDE,
                id.vertex_source(),
                id.fragment_source()
            );
            assert_eq!(source.matches("@vertex").count(), 1, "{id:?}");
            assert_eq!(source.matches("@fragment").count(), 1, "{id:?}");
        }
    }

    #[test]
    fn key_light_occupies_slot_zero_with_shadow_projection() {
        let scene = build_demo_scene(7).unwrap();
        let env = collect_environment(&scene);
        assert!(env.has_shadow);
        assert!(env.bias < 0.0);
        assert!(env.light_view_proj != Mat4::IDENTITY);
        // Key light intensity sits in the w of slot zero's direction.
        assert!(env.lights[0][3] > 0.0);
        // Fill and rim occupy the remaining slots.
        assert!(env.lights[2][3] > 0.0);
        assert!(env.lights[4][3] > 0.0);
    }

    #[test]
    fn ambient_energy_accumulates_scaled_by_intensity() {
        let scene = build_demo_scene(7).unwrap();
        let env = collect_environment(&scene);
        assert!(env.ambient.iter().all(|c| *c > 0.0 && *c < 1.0));
    }

    #[test]
    fn fog_defaults_sit_beyond_visible_range_when_absent() {
        let env = collect_environment(&Scene::new());
        assert!(!env.has_shadow);
        assert!(env.fog_color[3] > 1.0e8);
        assert!(env.fog_far > env.fog_color[3]);
    }
}

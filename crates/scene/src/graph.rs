use glam::Vec3;
use shaderview_common::{Color, NodeId, Transform};
use shaderview_shaders::ShaderMaterial;

use crate::light::Light;

/// Renderable geometry attached to a scene node.
///
/// Triangle counts follow the renderer's cost metric: line and point
/// geometry contributes zero triangles.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Cube {
        size: Vec3,
    },
    Sphere {
        radius: f32,
        segments: u32,
        rings: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
    Grid {
        size: f32,
        divisions: u32,
    },
    Points {
        positions: Vec<Vec3>,
    },
}

impl Geometry {
    /// Triangles this geometry submits per draw.
    pub fn triangle_count(&self) -> u32 {
        match self {
            Geometry::Cube { .. } => 12,
            Geometry::Sphere { segments, rings, .. } => segments * rings * 2,
            // The torus draws as a wireframe line list.
            Geometry::Torus { .. } => 0,
            Geometry::Grid { .. } => 0,
            Geometry::Points { .. } => 0,
        }
    }

    pub fn is_sphere(&self) -> bool {
        matches!(self, Geometry::Sphere { .. })
    }
}

/// Physically-based lighting parameters (fixed-function materials).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PbrMaterial {
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    pub transmission: f32,
    pub opacity: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
}

impl Default for PbrMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            metalness: 0.0,
            roughness: 1.0,
            transmission: 0.0,
            opacity: 1.0,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
        }
    }
}

/// Unlit wireframe rendering of a triangle mesh's edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireframeMaterial {
    pub color: Color,
}

/// Additive-blended point sprites.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointsMaterial {
    pub color: Color,
    pub opacity: f32,
    pub additive: bool,
}

/// Vertex-colored ground grid lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMaterial {
    pub center_color: Color,
    pub grid_color: Color,
    pub opacity: f32,
}

/// Material attached to a scene node.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Shader(ShaderMaterial),
    Pbr(PbrMaterial),
    Wireframe(WireframeMaterial),
    Points(PointsMaterial),
    Grid(GridMaterial),
}

impl Material {
    pub fn as_shader_mut(&mut self) -> Option<&mut ShaderMaterial> {
        match self {
            Material::Shader(m) => Some(m),
            _ => None,
        }
    }
}

/// Role a node plays in the demo animation cycle.
///
/// Replaces an untyped tag-and-payload bag: the driver dispatches on this
/// enum exhaustively, so a new role cannot be silently skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRole {
    /// Static content; the animation cycle leaves it alone.
    Fixed,
    /// The central shader-driven cube.
    DemoCube,
    /// A sphere bobbing around its resting height.
    FloatingSphere { rest_height: f32 },
    /// The tilted wireframe torus.
    SpinningTorus,
    /// The slowly rotating particle field.
    ParticleField,
}

/// One renderable/transform entry in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    pub transform: Transform,
    pub geometry: Geometry,
    pub material: Option<Material>,
    pub role: NodeRole,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            transform: Transform::default(),
            geometry,
            material: None,
            role: NodeRole::Fixed,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_role(mut self, role: NodeRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }
}

/// Depth fog parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

/// Counts of resources released by `Scene::dispose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisposeSummary {
    pub geometries: usize,
    pub materials: usize,
}

/// The scene graph: background, fog, lighting rig, and renderable nodes.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub background: Option<Color>,
    pub fog: Option<Fog>,
    lights: Vec<Light>,
    nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn add_node(&mut self, node: SceneNode) -> NodeId {
        let id = node.id;
        self.nodes.push(node);
        id
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [SceneNode] {
        &mut self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Release every node's geometry and material. Material lists are
    /// handled individually: each attached material counts once.
    pub fn dispose(&mut self) -> DisposeSummary {
        let summary = DisposeSummary {
            geometries: self.nodes.len(),
            materials: self.nodes.iter().filter(|n| n.material.is_some()).count(),
        };
        self.nodes.clear();
        self.lights.clear();
        self.background = None;
        self.fog = None;
        tracing::debug!(
            geometries = summary.geometries,
            materials = summary.materials,
            "scene disposed"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaderview_common::Color;

    #[test]
    fn triangle_counts() {
        assert_eq!(Geometry::Cube { size: Vec3::ONE }.triangle_count(), 12);
        let sphere = Geometry::Sphere {
            radius: 0.8,
            segments: 32,
            rings: 32,
        };
        assert_eq!(sphere.triangle_count(), 2048);
        let torus = Geometry::Torus {
            radius: 1.5,
            tube: 0.3,
            radial_segments: 16,
            tubular_segments: 100,
        };
        assert_eq!(torus.triangle_count(), 0);
        assert_eq!(Geometry::Points { positions: vec![] }.triangle_count(), 0);
    }

    #[test]
    fn dispose_clears_everything_and_counts_once() {
        let mut scene = Scene::new();
        scene.background = Some(Color::from_hex(0x0a0a0a));
        scene.add_light(Light::Ambient {
            color: Color::WHITE,
            intensity: 0.3,
        });
        scene.add_node(
            SceneNode::new("cube", Geometry::Cube { size: Vec3::ONE }).with_material(
                Material::Wireframe(WireframeMaterial {
                    color: Color::WHITE,
                }),
            ),
        );
        scene.add_node(SceneNode::new("bare", Geometry::Points { positions: vec![] }));

        let summary = scene.dispose();
        assert_eq!(summary.geometries, 2);
        assert_eq!(summary.materials, 1);
        assert_eq!(scene.node_count(), 0);
        assert!(scene.lights().is_empty());
        assert!(scene.background.is_none());

        // Second dispose finds nothing left to release.
        assert_eq!(scene.dispose(), DisposeSummary::default());
    }

    #[test]
    fn node_builder_chain() {
        let node = SceneNode::new("torus", Geometry::Points { positions: vec![] })
            .with_role(NodeRole::SpinningTorus)
            .with_shadows(true, false);
        assert_eq!(node.role, NodeRole::SpinningTorus);
        assert!(node.cast_shadow);
        assert!(!node.receive_shadow);
    }
}

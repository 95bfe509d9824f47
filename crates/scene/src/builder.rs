//! Builds the fixed demo scene: lighting rig, shader cube, PBR spheres,
//! wireframe torus, and particle field. All parameters are constants; this
//! is demo content, not data-driven.

use glam::Vec3;
use shaderview_common::{Color, SeededRng, Transform};
use shaderview_shaders::ShaderId;
use std::collections::BTreeMap;
use std::f32::consts::PI;

use crate::graph::{
    Fog, Geometry, GridMaterial, Material, NodeRole, PbrMaterial, PointsMaterial, Scene,
    SceneNode, WireframeMaterial,
};
use crate::light::{Light, ShadowConfig};
use crate::SceneInitError;

/// Seed for the particle scatter; fixed so the demo cloud is reproducible.
pub const DEMO_PARTICLE_SEED: u64 = 42;

const PARTICLE_COUNT: usize = 1000;
const CYBER_BLUE: u32 = 0x00f5ff;

/// Construct the full demo scene, deterministically ordered.
pub fn build_demo_scene(seed: u64) -> Result<Scene, SceneInitError> {
    let mut scene = Scene::new();
    scene.background = Some(Color::from_hex(0x0a0a0a));
    scene.fog = Some(Fog {
        color: Color::from_hex(0x0a0a0a),
        near: 50.0,
        far: 200.0,
    });

    setup_lighting(&mut scene);
    add_demo_objects(&mut scene);
    add_particle_field(&mut scene, seed);

    tracing::info!(
        nodes = scene.node_count(),
        lights = scene.lights().len(),
        "demo scene built"
    );
    Ok(scene)
}

/// Ambient fill, shadow-casting key light, fill and rim lights, ground grid.
fn setup_lighting(scene: &mut Scene) {
    scene.add_light(Light::Ambient {
        color: Color::from_hex(0x404040),
        intensity: 0.3,
    });

    scene.add_light(Light::Directional {
        color: Color::from_hex(0xffffff),
        intensity: 1.0,
        position: Vec3::new(10.0, 10.0, 5.0),
        shadow: Some(ShadowConfig::default()),
    });

    scene.add_light(Light::Directional {
        color: Color::from_hex(0x8888ff),
        intensity: 0.4,
        position: Vec3::new(-5.0, 3.0, -5.0),
        shadow: None,
    });

    scene.add_light(Light::Directional {
        color: Color::from_hex(0xffaa88),
        intensity: 0.6,
        position: Vec3::new(0.0, 5.0, -10.0),
        shadow: None,
    });

    scene.add_node(
        SceneNode::new(
            "grid",
            Geometry::Grid {
                size: 20.0,
                divisions: 20,
            },
        )
        .with_material(Material::Grid(GridMaterial {
            center_color: Color::from_hex(CYBER_BLUE),
            grid_color: Color::from_hex(0x333333),
            opacity: 0.3,
        })),
    );
}

fn add_demo_objects(scene: &mut Scene) {
    // Central rotating cube driven by the color-cycle shader.
    scene.add_node(
        SceneNode::new(
            "demo-cube",
            Geometry::Cube {
                size: Vec3::splat(2.0),
            },
        )
        .with_transform(Transform::at(Vec3::new(0.0, 1.0, 0.0)))
        .with_material(Material::Shader(shaderview_shaders::material(
            ShaderId::ColorCycle,
            BTreeMap::new(),
        )))
        .with_role(NodeRole::DemoCube)
        .with_shadows(true, true),
    );

    let sphere = Geometry::Sphere {
        radius: 0.8,
        segments: 32,
        rings: 32,
    };

    scene.add_node(
        SceneNode::new("glass-sphere", sphere.clone())
            .with_transform(Transform::at(Vec3::new(-4.0, 2.0, 2.0)))
            .with_material(Material::Pbr(PbrMaterial {
                color: Color::from_hex(CYBER_BLUE),
                metalness: 0.0,
                roughness: 0.0,
                transmission: 0.9,
                opacity: 0.8,
                clearcoat: 1.0,
                clearcoat_roughness: 0.0,
            }))
            .with_role(NodeRole::FloatingSphere { rest_height: 2.0 })
            .with_shadows(true, true),
    );

    scene.add_node(
        SceneNode::new("metallic-sphere", sphere)
            .with_transform(Transform::at(Vec3::new(4.0, 2.0, 2.0)))
            .with_material(Material::Pbr(PbrMaterial {
                color: Color::from_hex(0x8b5cf6),
                metalness: 1.0,
                roughness: 0.2,
                ..PbrMaterial::default()
            }))
            .with_role(NodeRole::FloatingSphere { rest_height: 2.0 })
            .with_shadows(true, true),
    );

    scene.add_node(
        SceneNode::new(
            "wireframe-torus",
            Geometry::Torus {
                radius: 1.5,
                tube: 0.3,
                radial_segments: 16,
                tubular_segments: 100,
            },
        )
        .with_transform(Transform {
            position: Vec3::new(0.0, 1.0, -4.0),
            rotation: Vec3::new(PI / 4.0, 0.0, 0.0),
            scale: Vec3::ONE,
        })
        .with_material(Material::Wireframe(WireframeMaterial {
            color: Color::from_hex(CYBER_BLUE),
        }))
        .with_role(NodeRole::SpinningTorus),
    );
}

/// 1000 points scattered uniformly inside a 50 x 20 x 50 box.
fn add_particle_field(scene: &mut Scene, seed: u64) {
    let mut rng = SeededRng::new(seed);
    let mut positions = Vec::with_capacity(PARTICLE_COUNT);
    for _ in 0..PARTICLE_COUNT {
        positions.push(Vec3::new(
            rng.next_centered(25.0),
            rng.next_centered(10.0),
            rng.next_centered(25.0),
        ));
    }

    scene.add_node(
        SceneNode::new("particles", Geometry::Points { positions })
            .with_material(Material::Points(PointsMaterial {
                color: Color::from_hex(CYBER_BLUE),
                opacity: 0.6,
                additive: true,
            }))
            .with_role(NodeRole::ParticleField),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> Scene {
        build_demo_scene(DEMO_PARTICLE_SEED).unwrap()
    }

    #[test]
    fn lighting_rig_order_and_parameters() {
        let scene = demo();
        let lights = scene.lights();
        assert_eq!(lights.len(), 4);

        assert!(matches!(lights[0], Light::Ambient { intensity, .. } if intensity == 0.3));

        let Light::Directional {
            intensity,
            position,
            shadow: Some(cfg),
            ..
        } = lights[1]
        else {
            panic!("key light must cast shadows");
        };
        assert_eq!(intensity, 1.0);
        assert_eq!(position, Vec3::new(10.0, 10.0, 5.0));
        assert_eq!(cfg.map_size, 2048);
        assert_eq!(cfg.extent, 10.0);
        assert_eq!(cfg.bias, -0.0001);

        assert!(!lights[2].casts_shadow());
        assert!(!lights[3].casts_shadow());
    }

    #[test]
    fn node_order_and_roles() {
        let scene = demo();
        let names: Vec<&str> = scene.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "grid",
                "demo-cube",
                "glass-sphere",
                "metallic-sphere",
                "wireframe-torus",
                "particles"
            ]
        );

        let cube = &scene.nodes()[1];
        assert_eq!(cube.role, NodeRole::DemoCube);
        assert!(matches!(cube.material, Some(Material::Shader(_))));
        assert!(cube.cast_shadow && cube.receive_shadow);

        let glass = &scene.nodes()[2];
        assert_eq!(glass.transform.position, Vec3::new(-4.0, 2.0, 2.0));
        assert_eq!(glass.role, NodeRole::FloatingSphere { rest_height: 2.0 });

        let torus = &scene.nodes()[4];
        assert!((torus.transform.rotation.x - PI / 4.0).abs() < 1e-6);
        assert_eq!(torus.role, NodeRole::SpinningTorus);
    }

    #[test]
    fn glass_sphere_is_transmissive_and_metal_sphere_is_metal() {
        let scene = demo();
        let Some(Material::Pbr(glass)) = &scene.nodes()[2].material else {
            panic!("glass sphere must be PBR");
        };
        assert_eq!(glass.transmission, 0.9);
        assert_eq!(glass.opacity, 0.8);
        assert_eq!(glass.clearcoat, 1.0);

        let Some(Material::Pbr(metal)) = &scene.nodes()[3].material else {
            panic!("metallic sphere must be PBR");
        };
        assert_eq!(metal.metalness, 1.0);
        assert_eq!(metal.roughness, 0.2);
    }

    #[test]
    fn particles_fill_the_box_uniformly() {
        let scene = demo();
        let Geometry::Points { positions } = &scene.nodes()[5].geometry else {
            panic!("last node must be the particle field");
        };
        assert_eq!(positions.len(), 1000);
        for p in positions {
            assert!(p.x.abs() < 25.0 && p.y.abs() < 10.0 && p.z.abs() < 25.0);
        }
        // Not degenerate: points actually spread through the volume.
        let max_x = positions.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        let min_x = positions.iter().map(|p| p.x).fold(f32::MAX, f32::min);
        assert!(max_x - min_x > 30.0);
    }

    #[test]
    fn same_seed_same_scatter() {
        let a = demo();
        let b = demo();
        assert_eq!(a.nodes()[5].geometry, b.nodes()[5].geometry);
    }

    #[test]
    fn scene_wide_cost_totals() {
        let scene = demo();
        let triangles: u32 = scene
            .nodes()
            .iter()
            .map(|n| n.geometry.triangle_count())
            .sum();
        assert_eq!(triangles, 12 + 2048 * 2);
    }
}

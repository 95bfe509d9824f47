//! CPU-side mesh generation for the demo geometry.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use shaderview_common::Color;
use std::f32::consts::TAU;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct GridVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
}

/// Generate box vertices and indices, one quad per face with per-face UVs.
pub fn cube_mesh(size: Vec3) -> (Vec<Vertex>, Vec<u32>) {
    let [hx, hy, hz] = (size * 0.5).to_array();
    // (normal, four corners in CCW order)
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [
                [-hx, -hy, hz],
                [hx, -hy, hz],
                [hx, hy, hz],
                [-hx, hy, hz],
            ],
        ),
        (
            [0.0, 0.0, -1.0],
            [
                [hx, -hy, -hz],
                [-hx, -hy, -hz],
                [-hx, hy, -hz],
                [hx, hy, -hz],
            ],
        ),
        (
            [1.0, 0.0, 0.0],
            [
                [hx, -hy, hz],
                [hx, -hy, -hz],
                [hx, hy, -hz],
                [hx, hy, hz],
            ],
        ),
        (
            [-1.0, 0.0, 0.0],
            [
                [-hx, -hy, -hz],
                [-hx, -hy, hz],
                [-hx, hy, hz],
                [-hx, hy, -hz],
            ],
        ),
        (
            [0.0, 1.0, 0.0],
            [
                [-hx, hy, hz],
                [hx, hy, hz],
                [hx, hy, -hz],
                [-hx, hy, -hz],
            ],
        ),
        (
            [0.0, -1.0, 0.0],
            [
                [-hx, -hy, -hz],
                [hx, -hy, -hz],
                [hx, -hy, hz],
                [-hx, -hy, hz],
            ],
        ),
    ];

    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u32;
        for (corner, uv) in corners.into_iter().zip(uvs) {
            vertices.push(Vertex {
                position: corner,
                normal,
                uv,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (vertices, indices)
}

/// Generate a UV sphere: `rings` stacks by `segments` slices, two triangles
/// per cell (pole cells degenerate), so exactly rings*segments*2 triangles.
pub fn sphere_mesh(radius: f32, segments: u32, rings: u32) -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let phi = v * std::f32::consts::PI;
        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let theta = u * TAU;
            let normal = [
                phi.sin() * theta.cos(),
                phi.cos(),
                phi.sin() * theta.sin(),
            ];
            vertices.push(Vertex {
                position: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                normal,
                uv: [u, 1.0 - v],
            });
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    (vertices, indices)
}

/// Torus surface vertices plus a wireframe line list along both the tubular
/// and radial directions.
pub fn torus_wireframe_mesh(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity((radial_segments * tubular_segments) as usize);
    for j in 0..radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        for i in 0..tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let position = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let normal = (position - center).normalize_or_zero();
            vertices.push(Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv: [
                    i as f32 / tubular_segments as f32,
                    j as f32 / radial_segments as f32,
                ],
            });
        }
    }

    let mut indices = Vec::with_capacity((radial_segments * tubular_segments * 4) as usize);
    for j in 0..radial_segments {
        for i in 0..tubular_segments {
            let here = j * tubular_segments + i;
            let next_tubular = j * tubular_segments + (i + 1) % tubular_segments;
            let next_radial = ((j + 1) % radial_segments) * tubular_segments + i;
            indices.extend_from_slice(&[here, next_tubular, here, next_radial]);
        }
    }
    (vertices, indices)
}

/// Ground grid line vertices; the two center lines get the accent color.
pub fn grid_mesh(size: f32, divisions: u32, center: Color, grid: Color) -> Vec<GridVertex> {
    let half = size / 2.0;
    let spacing = size / divisions as f32;
    let center_color = [center.r(), center.g(), center.b(), 1.0];
    let grid_color = [grid.r(), grid.g(), grid.b(), 1.0];

    let mut verts = Vec::with_capacity(((divisions + 1) * 4) as usize);
    for i in 0..=divisions {
        let offset = -half + i as f32 * spacing;
        let color = if i * 2 == divisions {
            center_color
        } else {
            grid_color
        };
        // Line along X
        verts.push(GridVertex {
            position: [-half, 0.0, offset],
            color,
        });
        verts.push(GridVertex {
            position: [half, 0.0, offset],
            color,
        });
        // Line along Z
        verts.push(GridVertex {
            position: [offset, 0.0, -half],
            color,
        });
        verts.push(GridVertex {
            position: [offset, 0.0, half],
            color,
        });
    }
    verts
}

pub fn point_vertices(positions: &[Vec3]) -> Vec<PointVertex> {
    positions
        .iter()
        .map(|p| PointVertex {
            position: p.to_array(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_24_vertices_12_triangles() {
        let (verts, indices) = cube_mesh(Vec3::splat(2.0));
        assert_eq!(verts.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(verts.iter().all(|v| v.position.iter().all(|c| c.abs() == 1.0)));
    }

    #[test]
    fn sphere_triangle_count_matches_cost_metric() {
        let (verts, indices) = sphere_mesh(0.8, 32, 32);
        assert_eq!(indices.len() as u32 / 3, 32 * 32 * 2);
        assert_eq!(verts.len(), 33 * 33);
        for v in &verts {
            let r = (v.position[0].powi(2) + v.position[1].powi(2) + v.position[2].powi(2)).sqrt();
            assert!((r - 0.8).abs() < 1e-4);
        }
    }

    #[test]
    fn torus_wireframe_is_line_pairs() {
        let (verts, indices) = torus_wireframe_mesh(1.5, 0.3, 16, 100);
        assert_eq!(verts.len(), 16 * 100);
        assert_eq!(indices.len(), 16 * 100 * 4);
        assert_eq!(indices.len() % 2, 0);
        assert!(indices.iter().all(|i| (*i as usize) < verts.len()));
    }

    #[test]
    fn grid_center_lines_are_accented() {
        let center = Color::from_hex(0x00f5ff);
        let grid = Color::from_hex(0x333333);
        let verts = grid_mesh(20.0, 20, center, grid);
        assert_eq!(verts.len(), 21 * 4);
        let accented = verts
            .iter()
            .filter(|v| v.color[2] == 1.0)
            .count();
        assert_eq!(accented, 4);
    }
}

use shaderview_scene::Scene;

/// Per-frame renderer cost counters shown in the performance HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub draw_calls: u32,
    pub triangles: u32,
}

/// Cost of rendering a scene: one draw per node with a material, plus the
/// summed triangle counts. Backends must match these numbers so the HUD is
/// embodiment-independent.
pub fn scene_stats(scene: &Scene) -> RenderStats {
    let mut stats = RenderStats::default();
    for node in scene.nodes() {
        if node.material.is_none() {
            continue;
        }
        stats.draw_calls += 1;
        stats.triangles += node.geometry.triangle_count();
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaderview_scene::{DEMO_PARTICLE_SEED, build_demo_scene};

    #[test]
    fn demo_scene_costs() {
        let scene = build_demo_scene(DEMO_PARTICLE_SEED).unwrap();
        let stats = scene_stats(&scene);
        // grid + cube + two spheres + torus + particles
        assert_eq!(stats.draw_calls, 6);
        // cube (12) + two 32x32 spheres; lines and points count no triangles
        assert_eq!(stats.triangles, 12 + 2048 * 2);
    }

    #[test]
    fn empty_scene_costs_nothing() {
        let scene = Scene::new();
        assert_eq!(scene_stats(&scene), RenderStats::default());
    }
}

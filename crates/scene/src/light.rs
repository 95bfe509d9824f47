use glam::Vec3;
use shaderview_common::Color;

/// Shadow-map configuration for a shadow-casting directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowConfig {
    /// Square shadow map resolution in texels.
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    /// Half-width of the orthographic shadow frustum.
    pub extent: f32,
    /// Depth bias applied when sampling the map.
    pub bias: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 2048,
            near: 0.5,
            far: 50.0,
            extent: 10.0,
            bias: -0.0001,
        }
    }
}

/// A light in the scene's fixed rig.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f32,
    },
    Directional {
        color: Color,
        intensity: f32,
        position: Vec3,
        shadow: Option<ShadowConfig>,
    },
}

impl Light {
    pub fn casts_shadow(&self) -> bool {
        matches!(
            self,
            Light::Directional {
                shadow: Some(_),
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shadow_config() {
        let cfg = ShadowConfig::default();
        assert_eq!(cfg.map_size, 2048);
        assert_eq!(cfg.near, 0.5);
        assert_eq!(cfg.far, 50.0);
        assert_eq!(cfg.extent, 10.0);
        assert_eq!(cfg.bias, -0.0001);
    }

    #[test]
    fn shadow_casting_flag() {
        let key = Light::Directional {
            color: Color::WHITE,
            intensity: 1.0,
            position: Vec3::new(10.0, 10.0, 5.0),
            shadow: Some(ShadowConfig::default()),
        };
        let fill = Light::Directional {
            color: Color::WHITE,
            intensity: 0.4,
            position: Vec3::new(-5.0, 3.0, -5.0),
            shadow: None,
        };
        assert!(key.casts_shadow());
        assert!(!fill.casts_shadow());
    }
}

//! Shader Library: a fixed catalog of named WGSL vertex/fragment pairs plus
//! a factory that binds a pair and a uniform set into a shader material.
//!
//! # Invariants
//! - The catalog is closed: every `ShaderId` maps to exactly one source pair.
//! - A fresh material always carries the full default uniform set; overrides
//!   replace defaults by name and never remove entries.

pub mod sources;

use glam::Vec2;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Errors from shader catalog lookups.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("unknown shader: {0:?}")]
    UnknownShader(String),
}

/// The closed set of shader programs the viewer ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderId {
    Holographic,
    Ripple,
    ColorCycle,
    Basic,
}

impl ShaderId {
    pub const ALL: [ShaderId; 4] = [
        ShaderId::Holographic,
        ShaderId::Ripple,
        ShaderId::ColorCycle,
        ShaderId::Basic,
    ];

    /// Catalog name, matching the names accepted by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            ShaderId::Holographic => "holographic",
            ShaderId::Ripple => "ripple",
            ShaderId::ColorCycle => "colorCycle",
            ShaderId::Basic => "basic",
        }
    }

    /// WGSL vertex source for this program.
    pub fn vertex_source(&self) -> &'static str {
        match self {
            ShaderId::Holographic => sources::HOLOGRAPHIC_VERTEX,
            _ => sources::BASIC_VERTEX,
        }
    }

    /// WGSL fragment source for this program.
    pub fn fragment_source(&self) -> &'static str {
        match self {
            ShaderId::Holographic => sources::HOLOGRAPHIC_FRAGMENT,
            ShaderId::Ripple => sources::RIPPLE_FRAGMENT,
            ShaderId::ColorCycle => sources::COLOR_CYCLE_FRAGMENT,
            ShaderId::Basic => sources::BASIC_FRAGMENT,
        }
    }
}

impl fmt::Display for ShaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShaderId {
    type Err = ShaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShaderId::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| ShaderError::UnknownShader(s.to_string()))
    }
}

/// A uniform value pushed from host code into a shader program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
}

/// A shader-driven material: one catalog program plus its current uniforms.
///
/// Shared by reference from scene nodes; the animation cycle pushes a fresh
/// `time` value into the material every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderMaterial {
    pub id: ShaderId,
    pub uniforms: BTreeMap<String, UniformValue>,
}

impl ShaderMaterial {
    pub fn vertex_source(&self) -> &'static str {
        self.id.vertex_source()
    }

    pub fn fragment_source(&self) -> &'static str {
        self.id.fragment_source()
    }

    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.uniforms.insert(name.to_string(), value);
    }

    pub fn set_time(&mut self, time: f32) {
        self.set_uniform("time", UniformValue::Float(time));
    }

    pub fn time(&self) -> f32 {
        match self.uniforms.get("time") {
            Some(UniformValue::Float(t)) => *t,
            _ => 0.0,
        }
    }

    pub fn resolution(&self) -> Vec2 {
        match self.uniforms.get("resolution") {
            Some(UniformValue::Vec2(r)) => *r,
            _ => Vec2::ZERO,
        }
    }
}

/// Default uniform set shared by every catalog program.
fn default_uniforms() -> BTreeMap<String, UniformValue> {
    BTreeMap::from([
        ("time".to_string(), UniformValue::Float(0.0)),
        (
            "resolution".to_string(),
            UniformValue::Vec2(Vec2::new(1024.0, 1024.0)),
        ),
    ])
}

/// Build a fresh material for the given program, with `overrides` merged on
/// top of the default uniform set.
pub fn material(
    id: ShaderId,
    overrides: BTreeMap<String, UniformValue>,
) -> ShaderMaterial {
    let mut uniforms = default_uniforms();
    uniforms.extend(overrides);
    ShaderMaterial { id, uniforms }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ripple_material_defaults() {
        let mat = material(ShaderId::Ripple, BTreeMap::new());
        assert_eq!(mat.fragment_source(), sources::RIPPLE_FRAGMENT);
        assert_eq!(mat.vertex_source(), sources::BASIC_VERTEX);
        assert_eq!(mat.time(), 0.0);
        assert_eq!(mat.resolution(), Vec2::new(1024.0, 1024.0));
    }

    #[test]
    fn overrides_replace_defaults() {
        let overrides = BTreeMap::from([
            ("time".to_string(), UniformValue::Float(3.5)),
            ("glow".to_string(), UniformValue::Float(0.2)),
        ]);
        let mat = material(ShaderId::Holographic, overrides);
        assert_eq!(mat.time(), 3.5);
        assert_eq!(mat.resolution(), Vec2::new(1024.0, 1024.0));
        assert_eq!(
            mat.uniforms.get("glow"),
            Some(&UniformValue::Float(0.2))
        );
    }

    #[test]
    fn unknown_shader_name_fails() {
        let err = "plasma".parse::<ShaderId>().unwrap_err();
        assert!(matches!(err, ShaderError::UnknownShader(ref s) if s == "plasma"));
    }

    #[test]
    fn known_names_round_trip() {
        for id in ShaderId::ALL {
            assert_eq!(id.name().parse::<ShaderId>().unwrap(), id);
        }
    }

    #[test]
    fn time_push_updates_uniform() {
        let mut mat = material(ShaderId::ColorCycle, BTreeMap::new());
        mat.set_time(1.25);
        assert_eq!(mat.time(), 1.25);
    }

    #[test]
    fn holographic_uses_displacement_vertex() {
        assert_ne!(
            ShaderId::Holographic.vertex_source(),
            ShaderId::Ripple.vertex_source()
        );
    }
}

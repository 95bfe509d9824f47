//! WGSL source text for the shader catalog.
//!
//! Every program shares one uniform block and one vertex IO layout, declared
//! in [`SHADER_PRELUDE`]. A complete module is the prelude, one vertex entry
//! (`vs_main`) and one fragment entry (`fs_main`) concatenated, which is how
//! the wgpu backend assembles them.

/// Declarations shared by every catalog program.
pub const SHADER_PRELUDE: &str = r#"
struct ShaderParams {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    time: f32,
    _pad0: f32,
    resolution: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> params: ShaderParams;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) local_position: vec3<f32>,
    @location(2) normal: vec3<f32>,
};
"#;

/// Pass-through vertex stage used by most programs.
pub const BASIC_VERTEX: &str = r#"
@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.uv = in.uv;
    out.local_position = in.position;
    out.normal = in.normal;
    out.clip_position = params.view_proj * params.model * vec4<f32>(in.position, 1.0);
    return out;
}
"#;

/// Vertex stage with time-driven displacement along the normal.
pub const HOLOGRAPHIC_VERTEX: &str = r#"
@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.uv = in.uv;
    out.local_position = in.position;
    out.normal = in.normal;

    var pos = in.position;
    let wave = sin(pos.x * 2.0 + params.time) * cos(pos.y * 2.0 + params.time) * 0.05;
    pos = pos + in.normal * wave;

    out.clip_position = params.view_proj * params.model * vec4<f32>(pos, 1.0);
    return out;
}
"#;

/// Scanlined fresnel-glow fragment with flowing fractal noise.
pub const HOLOGRAPHIC_FRAGMENT: &str = r#"
fn hash_noise(p: vec2<f32>) -> f32 {
    return fract(sin(dot(p, vec2<f32>(12.9898, 78.233))) * 43758.5453);
}

fn smooth_noise(p: vec2<f32>) -> f32 {
    let i = floor(p);
    var f = fract(p);
    f = f * f * (3.0 - 2.0 * f);

    let a = hash_noise(i);
    let b = hash_noise(i + vec2<f32>(1.0, 0.0));
    let c = hash_noise(i + vec2<f32>(0.0, 1.0));
    let d = hash_noise(i + vec2<f32>(1.0, 1.0));

    return mix(mix(a, b, f.x), mix(c, d, f.x), f.y);
}

fn fractal_noise(p: vec2<f32>) -> f32 {
    var value = 0.0;
    var amplitude = 0.5;
    var frequency = 1.0;

    for (var i: i32 = 0; i < 4; i = i + 1) {
        value = value + amplitude * smooth_noise(p * frequency);
        amplitude = amplitude * 0.5;
        frequency = frequency * 2.0;
    }

    return value;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv;
    let normal = normalize(in.normal);

    let t = params.time * 0.5;
    let flow_uv = uv + vec2<f32>(sin(t + uv.y * 5.0) * 0.1, cos(t + uv.x * 3.0) * 0.1);
    let noise_value = fractal_noise(flow_uv * 8.0 + t);
    let fresnel = pow(1.0 - dot(normal, vec3<f32>(0.0, 0.0, 1.0)), 2.0);

    let color1 = vec3<f32>(0.0, 1.0, 1.0);
    let color2 = vec3<f32>(1.0, 0.0, 1.0);
    let color3 = vec3<f32>(1.0, 1.0, 0.0);

    let color_shift = sin(uv.x * 10.0 + t * 2.0) * 0.5 + 0.5;
    var base_color = mix(color1, color2, color_shift);
    base_color = mix(base_color, color3, sin(uv.y * 8.0 + t * 1.5) * 0.5 + 0.5);

    var final_color = base_color * (0.5 + noise_value * 0.5) * (0.3 + fresnel * 0.7);
    let scanline = sin(uv.y * 100.0 + t * 10.0) * 0.1 + 0.9;
    final_color = final_color * scanline;
    let glow = 1.0 - fresnel;
    final_color = final_color + glow * 0.2;

    return vec4<f32>(final_color, 0.8);
}
"#;

/// Concentric ripple fragment expanding from the face center.
pub const RIPPLE_FRAGMENT: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv;
    let center = vec2<f32>(0.5, 0.5);
    let dist = distance(uv, center);

    var ripple = sin(dist * 20.0 - params.time * 4.0) * 0.5 + 0.5;
    ripple = ripple * (1.0 - smoothstep(0.0, 0.7, dist));

    let color = vec3<f32>(0.0, 0.5 + ripple * 0.5, 1.0);
    return vec4<f32>(color, 1.0);
}
"#;

/// Per-channel sine color cycling over the face UVs.
pub const COLOR_CYCLE_FRAGMENT: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let uv = in.uv;

    let r = sin(uv.x * 10.0 + params.time) * 0.5 + 0.5;
    let g = sin(uv.y * 10.0 + params.time * 1.2) * 0.5 + 0.5;
    let b = sin((uv.x + uv.y) * 8.0 + params.time * 0.8) * 0.5 + 0.5;

    return vec4<f32>(r * 0.5 + 0.3, g * 0.3 + 0.7, b * 0.8 + 0.2, 1.0);
}
"#;

/// Flat UV gradient with a slow time-driven blue channel.
pub const BASIC_FRAGMENT: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let pulse = sin(params.time) * 0.5 + 0.5;
    return vec4<f32>(in.uv.x, in.uv.y, pulse, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_declares_shared_uniforms() {
        assert!(SHADER_PRELUDE.contains("var<uniform> params"));
        assert!(SHADER_PRELUDE.contains("time: f32"));
        assert!(SHADER_PRELUDE.contains("resolution: vec2<f32>"));
    }

    #[test]
    fn every_fragment_has_one_entry_point() {
        for frag in [
            HOLOGRAPHIC_FRAGMENT,
            RIPPLE_FRAGMENT,
            COLOR_CYCLE_FRAGMENT,
            BASIC_FRAGMENT,
        ] {
            assert_eq!(frag.matches("fn fs_main").count(), 1);
        }
    }

    #[test]
    fn vertex_stages_have_one_entry_point() {
        for vert in [BASIC_VERTEX, HOLOGRAPHIC_VERTEX] {
            assert_eq!(vert.matches("fn vs_main").count(), 1);
        }
    }
}

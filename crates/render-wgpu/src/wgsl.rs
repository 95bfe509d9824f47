//! WGSL for the fixed-function pipelines. The custom shader-material
//! pipelines assemble their modules from the `shaderview-shaders` catalog
//! instead.

/// Lit PBR-ish shading: three directional lights plus ambient, key-light
/// shadow sampling, ACES filmic tone mapping, and depth fog.
pub const LIT_SHADER: &str = r#"
struct LitUniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    // rgb, opacity
    base_color: vec4<f32>,
    // metalness, roughness, transmission, clearcoat
    material: vec4<f32>,
    // rgb, shadow bias
    ambient: vec4<f32>,
    // rgb, fog near
    fog_color: vec4<f32>,
    // fog far, exposure, receive_shadow, unused
    fog_params: vec4<f32>,
    // three lights: [direction, intensity], [color, unused]
    lights: array<vec4<f32>, 6>,
};

@group(0) @binding(0)
var<uniform> u: LitUniforms;
@group(0) @binding(1)
var shadow_map: texture_depth_2d;
@group(0) @binding(2)
var shadow_sampler: sampler_comparison;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let world_pos = u.model * vec4<f32>(in.position, 1.0);
    var out: VertexOutput;
    out.clip_position = u.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize((u.model * vec4<f32>(in.normal, 0.0)).xyz);
    return out;
}

fn aces_filmic(x: vec3<f32>) -> vec3<f32> {
    let a = 2.51;
    let b = 0.03;
    let c = 2.43;
    let d = 0.59;
    let e = 0.14;
    return clamp((x * (a * x + b)) / (x * (c * x + d) + e), vec3<f32>(0.0), vec3<f32>(1.0));
}

fn key_light_shadow(world_pos: vec3<f32>) -> f32 {
    let light_clip = u.light_view_proj * vec4<f32>(world_pos, 1.0);
    let ndc = light_clip.xyz / light_clip.w;
    let uv = ndc.xy * vec2<f32>(0.5, -0.5) + vec2<f32>(0.5, 0.5);
    if (uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0 || ndc.z > 1.0) {
        return 1.0;
    }
    let bias = u.ambient.w;
    return textureSampleCompareLevel(shadow_map, shadow_sampler, uv, ndc.z + bias);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let view_dir = normalize(u.camera_pos.xyz - in.world_pos);
    let base = u.base_color.rgb;
    let metalness = u.material.x;
    let roughness = u.material.y;
    let transmission = u.material.z;
    let clearcoat = u.material.w;

    var shadow = 1.0;
    if (u.fog_params.z > 0.5) {
        shadow = key_light_shadow(in.world_pos);
    }

    let shininess = mix(256.0, 4.0, roughness);
    let f0 = mix(vec3<f32>(0.04), base, metalness);

    var color = u.ambient.rgb * base;
    for (var i: i32 = 0; i < 3; i = i + 1) {
        let light_dir = normalize(u.lights[i * 2].xyz);
        let intensity = u.lights[i * 2].w;
        let light_color = u.lights[i * 2 + 1].rgb;

        let ndotl = max(dot(n, light_dir), 0.0);
        let half_dir = normalize(light_dir + view_dir);
        let ndoth = max(dot(n, half_dir), 0.0);

        let diffuse = base * (1.0 - metalness) * ndotl;
        let specular = f0 * pow(ndoth, shininess) * ndotl;
        let coat = vec3<f32>(clearcoat * pow(ndoth, 512.0) * 0.5);

        // Only the key light (slot 0) casts shadows.
        var visibility = 1.0;
        if (i == 0) {
            visibility = shadow;
        }
        color = color + (diffuse + specular + coat) * light_color * intensity * visibility;
    }

    // Transmissive materials pick up background energy instead of going dark.
    color = color + base * transmission * 0.4;

    color = aces_filmic(color * u.fog_params.y);

    let dist = length(u.camera_pos.xyz - in.world_pos);
    let fog_near = u.fog_color.w;
    let fog_far = u.fog_params.x;
    let fog_t = clamp((dist - fog_near) / max(fog_far - fog_near, 0.0001), 0.0, 1.0);
    color = mix(color, u.fog_color.rgb, fog_t);

    return vec4<f32>(color, u.base_color.a);
}
"#;

/// Unlit single-color lines (wireframe torus).
pub const FLAT_SHADER: &str = r#"
struct FlatUniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> u: FlatUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> @builtin(position) vec4<f32> {
    return u.view_proj * u.model * vec4<f32>(in.position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return u.color;
}
"#;

/// Vertex-colored ground grid with a uniform opacity.
pub const GRID_SHADER: &str = r#"
struct FlatUniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> u: FlatUniforms;

struct GridVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct GridOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: GridVertex) -> GridOutput {
    var out: GridOutput;
    out.clip_position = u.view_proj * u.model * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_main(in: GridOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color.rgb, in.color.a * u.color.a);
}
"#;

/// Additive particle points.
pub const POINTS_SHADER: &str = r#"
struct FlatUniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> u: FlatUniforms;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return u.view_proj * u.model * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return u.color;
}
"#;

/// Depth-only pass into the key light's shadow map.
pub const SHADOW_SHADER: &str = r#"
struct ShadowUniforms {
    light_view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> u: ShadowUniforms;

@vertex
fn vs_shadow(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return u.light_view_proj * u.model * vec4<f32>(position, 1.0);
}
"#;

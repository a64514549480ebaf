/// WGSL shader for the particle layer: one anti-aliased disc per instance,
/// positioned in window pixels.
pub const PARTICLE_SHADER: &str = r#"
struct Screen {
    size: vec2<f32>,
    _pad: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> screen: Screen;

struct ParticleInstance {
    @location(0) center: vec2<f32>,
    @location(1) radius: f32,
    @location(2) color: vec4<f32>,
};

struct ParticleOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) local: vec2<f32>,
    @location(1) radius: f32,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_particle(@builtin(vertex_index) index: u32, instance: ParticleInstance) -> ParticleOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
    );
    // One pixel of margin for the soft edge.
    let extent = instance.radius + 1.0;
    let local = corners[index] * extent;
    let pixel = instance.center + local;
    let ndc = vec2<f32>(
        pixel.x / screen.size.x * 2.0 - 1.0,
        1.0 - pixel.y / screen.size.y * 2.0,
    );

    var out: ParticleOutput;
    out.clip_position = vec4<f32>(ndc, 0.0, 1.0);
    out.local = local;
    out.radius = instance.radius;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_particle(in: ParticleOutput) -> @location(0) vec4<f32> {
    let coverage = clamp(in.radius + 0.5 - length(in.local), 0.0, 1.0);
    if coverage <= 0.0 {
        discard;
    }
    return vec4<f32>(in.color.rgb, in.color.a * coverage);
}
"#;

/// WGSL shader for the model: Lambert shading from one ambient and three
/// directional lights.
pub const MODEL_SHADER: &str = r#"
struct Scene {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    ambient: vec4<f32>,
    light_dirs: array<vec4<f32>, 3>,
    light_colors: array<vec4<f32>, 3>,
    base_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> scene: Scene;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
};

@vertex
fn vs_model(vertex: VertexInput) -> VertexOutput {
    let world_pos = scene.model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (scene.normal_matrix * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = scene.view_proj * world_pos;
    out.world_normal = world_normal;
    return out;
}

@fragment
fn fs_model(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    var light = scene.ambient.rgb;
    for (var i = 0u; i < 3u; i = i + 1u) {
        let lambert = max(dot(n, scene.light_dirs[i].xyz), 0.0);
        light = light + scene.light_colors[i].rgb * lambert;
    }
    return vec4<f32>(scene.base_color.rgb * light, 1.0);
}
"#;

/// WGSL shader that places the offscreen 3D layer into its window
/// rectangle. Expects premultiplied color.
pub const COMPOSITE_SHADER: &str = r#"
struct Placement {
    rect: vec4<f32>,
    screen: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> placement: Placement;
@group(0) @binding(1)
var layer: texture_2d<f32>;
@group(0) @binding(2)
var layer_sampler: sampler;

struct CompositeOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_composite(@builtin(vertex_index) index: u32) -> CompositeOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(0.0, 0.0),
        vec2<f32>(1.0, 0.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(0.0, 1.0),
        vec2<f32>(0.0, 0.0),
    );
    let uv = corners[index];
    let pixel = placement.rect.xy + uv * placement.rect.zw;
    let ndc = vec2<f32>(
        pixel.x / placement.screen.x * 2.0 - 1.0,
        1.0 - pixel.y / placement.screen.y * 2.0,
    );

    var out: CompositeOutput;
    out.clip_position = vec4<f32>(ndc, 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs_composite(in: CompositeOutput) -> @location(0) vec4<f32> {
    return textureSample(layer, layer_sampler, in.uv);
}
"#;

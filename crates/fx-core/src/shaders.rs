//! WGSL assets and the bindings each one promises.
//!
//! Every asset names the uniform block it reads (struct, fields in order,
//! group/binding) plus its texture bindings and entry points. The GPU layers
//! build bind group layouts from these contracts, and [`ShaderAsset::verify`]
//! checks the WGSL text still declares them before a module is compiled.

use crate::error::ResourceError;

pub static FLOW_SIM_WGSL: &str = include_str!("../shaders/flow_sim.wgsl");
pub static FLOW_POINTS_WGSL: &str = include_str!("../shaders/flow_points.wgsl");
pub static PARTICLE_GRID_WGSL: &str = include_str!("../shaders/particle_grid.wgsl");
pub static GRID_LINES_WGSL: &str = include_str!("../shaders/grid_lines.wgsl");
pub static STARS_WGSL: &str = include_str!("../shaders/stars.wgsl");
pub static SPRITES_WGSL: &str = include_str!("../shaders/sprites.wgsl");
pub static BACKGROUND_WGSL: &str = include_str!("../shaders/background.wgsl");
pub static BLOB_WGSL: &str = include_str!("../shaders/blob.wgsl");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformField {
    pub name: &'static str,
    pub ty: &'static str,
}

const fn field(name: &'static str, ty: &'static str) -> UniformField {
    UniformField { name, ty }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformBlock {
    pub struct_name: &'static str,
    pub var_name: &'static str,
    pub group: u32,
    pub binding: u32,
    pub fields: &'static [UniformField],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureBinding {
    pub name: &'static str,
    pub group: u32,
    pub binding: u32,
}

const fn texture(name: &'static str, group: u32, binding: u32) -> TextureBinding {
    TextureBinding {
        name,
        group,
        binding,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShaderAsset {
    pub name: &'static str,
    pub version: u32,
    pub source: &'static str,
    pub uniforms: UniformBlock,
    pub textures: &'static [TextureBinding],
    pub entry_points: &'static [&'static str],
}

/// Matches `crate::uniforms::SceneUniforms`.
pub const SCENE_BLOCK: UniformBlock = UniformBlock {
    struct_name: "Scene",
    var_name: "scene",
    group: 0,
    binding: 0,
    fields: &[
        field("view_proj", "mat4x4<f32>"),
        field("resolution", "vec2<f32>"),
        field("time", "f32"),
        field("pixel_ratio", "f32"),
        field("pointer", "vec2<f32>"),
        field("scroll", "f32"),
        field("distortion", "f32"),
        field("palette", "array<vec4<f32>, 4>"),
        field("camera_pos", "vec3<f32>"),
        field("point_size", "f32"),
        field("schwarzschild", "f32"),
        field("orbit_speed", "f32"),
        field("opacity", "f32"),
    ],
};

/// Matches `crate::uniforms::SimUniforms`.
pub const SIM_BLOCK: UniformBlock = UniformBlock {
    struct_name: "Sim",
    var_name: "sim",
    group: 0,
    binding: 0,
    fields: &[
        field("time", "f32"),
        field("dt", "f32"),
        field("side", "f32"),
        field("respawn", "f32"),
        field("multi_time", "vec2<f32>"),
        field("bounds", "f32"),
        field("force", "f32"),
    ],
};

pub const FLOW_SIM: ShaderAsset = ShaderAsset {
    name: "flow_sim",
    version: 1,
    source: FLOW_SIM_WGSL,
    uniforms: SIM_BLOCK,
    textures: &[
        texture("noise_tex", 0, 1),
        texture("delay_tex", 0, 2),
        texture("mass_tex", 0, 3),
        texture("velocity_first_tex", 0, 4),
        texture("acceleration_tex", 1, 0),
        texture("velocity_tex", 2, 0),
    ],
    entry_points: &["vs_fullscreen", "fs_acceleration", "fs_velocity"],
};

pub const FLOW_POINTS: ShaderAsset = ShaderAsset {
    name: "flow_points",
    version: 1,
    source: FLOW_POINTS_WGSL,
    uniforms: SCENE_BLOCK,
    textures: &[texture("velocity_tex", 1, 0)],
    entry_points: &["vs_main", "fs_main"],
};

pub const PARTICLE_GRID: ShaderAsset = ShaderAsset {
    name: "particle_grid",
    version: 1,
    source: PARTICLE_GRID_WGSL,
    uniforms: SCENE_BLOCK,
    textures: &[],
    entry_points: &["vs_main", "fs_main"],
};

pub const GRID_LINES: ShaderAsset = ShaderAsset {
    name: "grid_lines",
    version: 1,
    source: GRID_LINES_WGSL,
    uniforms: SCENE_BLOCK,
    textures: &[],
    entry_points: &["vs_main", "fs_main"],
};

pub const STARS: ShaderAsset = ShaderAsset {
    name: "stars",
    version: 1,
    source: STARS_WGSL,
    uniforms: SCENE_BLOCK,
    textures: &[],
    entry_points: &["vs_main", "fs_main"],
};

pub const SPRITES: ShaderAsset = ShaderAsset {
    name: "sprites",
    version: 1,
    source: SPRITES_WGSL,
    uniforms: SCENE_BLOCK,
    textures: &[],
    entry_points: &["vs_main", "fs_main"],
};

pub const BACKGROUND: ShaderAsset = ShaderAsset {
    name: "background",
    version: 1,
    source: BACKGROUND_WGSL,
    uniforms: SCENE_BLOCK,
    textures: &[texture("noise_tex", 1, 0)],
    entry_points: &["vs_fullscreen", "fs_noise", "fs_distort"],
};

pub const BLOB: ShaderAsset = ShaderAsset {
    name: "blob",
    version: 1,
    source: BLOB_WGSL,
    uniforms: SCENE_BLOCK,
    textures: &[],
    entry_points: &["vs_main", "fs_main"],
};

pub const ALL_SHADERS: [ShaderAsset; 8] = [
    FLOW_SIM,
    FLOW_POINTS,
    PARTICLE_GRID,
    STARS,
    SPRITES,
    GRID_LINES,
    BACKGROUND,
    BLOB,
];

impl ShaderAsset {
    /// Label carrying the contract version, e.g. `stars@v1`.
    pub fn label(&self) -> String {
        format!("{}@v{}", self.name, self.version)
    }

    /// Checks the source still declares everything the contract lists.
    pub fn verify(&self) -> Result<(), ResourceError> {
        let src = self.source;
        let fail = |reason: String| ResourceError::Shader {
            name: self.name,
            reason,
        };

        let block = &self.uniforms;
        let body = struct_body(src, block.struct_name)
            .ok_or_else(|| fail(format!("missing struct `{}`", block.struct_name)))?;
        let declared: Vec<(String, String)> = body
            .lines()
            .filter_map(|line| {
                let entry = line.trim().trim_end_matches(',');
                let (name, ty) = entry.split_once(':')?;
                Some((name.trim().to_string(), ty.trim().to_string()))
            })
            .collect();
        // fields must appear in order; trailing padding is allowed
        for (i, expected) in block.fields.iter().enumerate() {
            match declared.get(i) {
                Some((name, ty)) if name == expected.name && ty == expected.ty => {}
                Some((name, ty)) => {
                    return Err(fail(format!(
                        "field {i} of `{}` is `{name}: {ty}`, expected `{}: {}`",
                        block.struct_name, expected.name, expected.ty
                    )))
                }
                None => {
                    return Err(fail(format!(
                        "`{}` is missing field `{}`",
                        block.struct_name, expected.name
                    )))
                }
            }
        }

        let uniform_decl = format!(
            "@group({}) @binding({}) var<uniform> {}: {};",
            block.group, block.binding, block.var_name, block.struct_name
        );
        if !src.contains(&uniform_decl) {
            return Err(fail(format!("missing `{uniform_decl}`")));
        }

        for tex in self.textures {
            let decl = format!(
                "@group({}) @binding({}) var {}:",
                tex.group, tex.binding, tex.name
            );
            if !src.contains(&decl) {
                return Err(fail(format!("missing texture binding `{}`", tex.name)));
            }
        }

        for ep in self.entry_points {
            if !src.contains(&format!("fn {ep}(")) {
                return Err(fail(format!("missing entry point `{ep}`")));
            }
        }
        Ok(())
    }
}

fn struct_body<'a>(src: &'a str, name: &str) -> Option<&'a str> {
    let head = format!("struct {name} {{");
    let start = src.find(&head)? + head.len();
    let len = src[start..].find("};")?;
    Some(&src[start..start + len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_carry_version() {
        assert_eq!(STARS.label(), "stars@v1");
    }

    #[test]
    fn renamed_field_is_reported() {
        let broken = ShaderAsset {
            source: "struct Sim {\n    time: f32,\n    delta: f32,\n};",
            ..FLOW_SIM
        };
        let err = broken.verify().unwrap_err();
        assert!(err.to_string().contains("delta"));
    }
}

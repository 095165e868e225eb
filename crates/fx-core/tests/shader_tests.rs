// Every WGSL asset must still declare the bindings its contract names.

use fx_core::shaders::{ALL_SHADERS, SCENE_BLOCK, SIM_BLOCK};
use fx_core::{SceneUniforms, SimUniforms};

#[test]
fn every_asset_satisfies_its_contract() {
    for asset in ALL_SHADERS {
        if let Err(e) = asset.verify() {
            panic!("{}: {e}", asset.label());
        }
    }
}

#[test]
fn asset_names_are_unique() {
    let mut names: Vec<_> = ALL_SHADERS.iter().map(|a| a.name).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), ALL_SHADERS.len());
}

#[test]
fn scalar_field_counts_match_rust_blocks() {
    // every listed field is 4-byte scalars; padding fills the remainder
    let words = |ty: &str| match ty {
        "f32" => 1,
        "vec2<f32>" => 2,
        "vec3<f32>" => 3,
        "mat4x4<f32>" => 16,
        "array<vec4<f32>, 4>" => 16,
        other => panic!("unexpected type {other}"),
    };
    let scene: usize = SCENE_BLOCK.fields.iter().map(|f| words(f.ty)).sum();
    let sim: usize = SIM_BLOCK.fields.iter().map(|f| words(f.ty)).sum();
    assert_eq!(scene + 1, std::mem::size_of::<SceneUniforms>() / 4);
    assert_eq!(sim, std::mem::size_of::<SimUniforms>() / 4);
}

// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod common;

use glam::{Mat4, Vec3, Vec4};
use std::sync::Arc;
use vesper_core::hit_proxy::{HitProxyRegistry, MouseCursor};
use vesper_core::material::{MaterialProperties, ShadingModel};
use vesper_core::renderer::{
    BlendState, DepthStencilState, FeatureLevel, LightCacheInterface, LightMapInteraction, LightMapPolicyTag,
    RenderStateDescriptor, ShadowMapInteraction, TextureId, UniformBufferId,
};
use vesper_core::scene::{
    DebugViewShaderMode, IndirectLightingCacheAllocation, IndirectLightingCacheQuality, MeshBatch, Mobility,
    PrimitiveId, PrimitiveSceneInfo,
};
use vesper_core::settings::RendererSettings;
use vesper_lanes::drawing_policy::{BasePassDrawingPolicy, BasePassOptions, SceneTextureMode};
use vesper_lanes::permutation::ShaderMapBuilder;
use vesper_lanes::{select_light_map_policy, DrawingPolicy, LightingCapabilities};

fn base_pass_capabilities() -> LightingCapabilities {
    LightingCapabilities {
        use_volumetric_lightmap: false,
        allow_indirect_lighting_cache: true,
        allow_cache_volume_texture: true,
        use_translucent_self_shadowing: false,
    }
}

#[test]
fn unlit_static_mesh_keeps_the_pass_blend_state() {
    let settings = RendererSettings::default();
    let mut builder = ShaderMapBuilder::new(common::PLATFORM, &settings);
    let vf = common::vertex_factory(1);
    let unlit = common::material(
        1,
        MaterialProperties {
            shading_model: ShadingModel::Unlit,
            ..Default::default()
        },
        &mut builder,
        &[&vf],
    );
    let primitive = PrimitiveSceneInfo::new(PrimitiveId(0), UniformBufferId(5));
    let mesh = MeshBatch::new(&vf, &unlit, vec![common::element(1)]);

    let tag = select_light_map_policy(
        &mesh,
        Some(&primitive),
        FeatureLevel::Sm5,
        false,
        base_pass_capabilities(),
        &settings,
    );
    assert_eq!(tag, LightMapPolicyTag::NoLightmap);

    let policy = BasePassDrawingPolicy::new(
        &vf,
        &unlit,
        common::PLATFORM,
        DebugViewShaderMode::None,
        BasePassOptions {
            light_map: tag,
            scene_texture_mode: SceneTextureMode::DontSet,
            sky_light: false,
            atmospheric_fog: false,
            receive_decal_output: false,
        },
    )
    .expect("unlit base pass shaders");
    let mut state = RenderStateDescriptor::new(UniformBufferId(1))
        .with_blend_state(BlendState::OPAQUE)
        .with_depth_stencil_state(DepthStencilState::DEPTH_WRITE);
    policy.setup_pipeline_state(&mut state, &common::view());
    assert_eq!(state.blend_state, Some(BlendState::OPAQUE));
    assert_eq!(state.depth_stencil_state, Some(DepthStencilState::DEPTH_WRITE));
}

#[test]
fn baked_lightmap_with_shadow_texture_selects_distance_field_hq() {
    let settings = RendererSettings {
        support_high_quality_lightmaps: true,
        ..Default::default()
    };
    let mut builder = ShaderMapBuilder::new(common::PLATFORM, &settings);
    let vf = common::vertex_factory(1);
    let lit = common::material(1, MaterialProperties::default(), &mut builder, &[&vf]);
    let light_cache = LightCacheInterface {
        light_map: LightMapInteraction::texture(TextureId(20), TextureId(21), true, Vec4::ONE),
        shadow_map: ShadowMapInteraction::texture(TextureId(22), Vec4::ONE),
        precomputed_lighting_buffer: Some(UniformBufferId(23)),
    };
    let primitive = PrimitiveSceneInfo::new(PrimitiveId(0), UniformBufferId(5));
    let mesh = MeshBatch::new(&vf, &lit, vec![common::element(1)]).with_light_cache(&light_cache);

    let tag = select_light_map_policy(
        &mesh,
        Some(&primitive),
        FeatureLevel::Sm5,
        false,
        base_pass_capabilities(),
        &settings,
    );
    assert_eq!(tag, LightMapPolicyTag::DistanceFieldShadowsAndHqLightmap);
}

#[test]
fn movable_primitive_with_volume_allocation_uses_the_cache_volume() {
    let settings = RendererSettings::default();
    let mut builder = ShaderMapBuilder::new(common::PLATFORM, &settings);
    let vf = common::vertex_factory(1);
    let lit = common::material(1, MaterialProperties::default(), &mut builder, &[&vf]);
    let primitive = PrimitiveSceneInfo {
        mobility: Mobility::Movable,
        local_to_world: Mat4::from_translation(Vec3::Y),
        indirect_lighting_cache_quality: IndirectLightingCacheQuality::Volume,
        indirect_lighting_cache_allocation: Some(IndirectLightingCacheAllocation {
            is_valid: true,
            point_sample: false,
            add: Vec4::ZERO,
            scale: Vec4::ONE,
            uniform_buffer: Some(UniformBufferId(30)),
            point_samples: None,
        }),
        ..PrimitiveSceneInfo::new(PrimitiveId(0), UniformBufferId(5))
    };
    let mesh = MeshBatch::new(&vf, &lit, vec![common::element(1)]);

    let tag = select_light_map_policy(
        &mesh,
        Some(&primitive),
        FeatureLevel::Sm5,
        false,
        base_pass_capabilities(),
        &settings,
    );
    assert_eq!(tag, LightMapPolicyTag::CachedVolumeIndirectLighting);
}

#[test]
fn hit_proxy_slots_are_reused_after_removal() {
    let registry = HitProxyRegistry::new();
    assert!(registry.is_empty());

    let first = registry
        .add(Arc::new("e1"), MouseCursor::Default, false)
        .expect("free slot");
    assert_eq!(first.index(), 0);
    assert!(registry.remove(first));
    assert!(registry.is_empty());

    let second = registry
        .add(Arc::new("e2"), MouseCursor::Hand, false)
        .expect("free slot");
    assert_eq!(second.index(), 0);

    let entry = registry.lookup(second).expect("registered");
    assert_eq!(entry.target.downcast_ref::<&str>(), Some(&"e2"));
    assert_eq!(entry.cursor, MouseCursor::Hand);
}

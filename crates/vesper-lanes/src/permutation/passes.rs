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

//! Composed predicates for every pass's shader permutations.

use super::{light_map_policy_should_compile, PermutationContext};
use vesper_core::material::{MaterialProperties, TessellationMode};
use vesper_core::renderer::{FeatureLevel, LightMapPolicyTag, MobilePointLights, ShaderPlatform, ShaderType};
use vesper_core::scene::VertexFactoryType;

/// Returns `true` when every pixel the mesh covers is written, i.e. the material
/// is neither masked nor translucent.
pub fn writes_every_pixel(material: &MaterialProperties) -> bool {
    !material.is_masked() && !material.is_translucent()
}

/// Depth-like passes (depth, velocity, hit proxy, light-map density) draw such
/// materials with the default material's shaders: the output is identical and
/// the meshes then share one policy.
pub fn uses_default_material_shaders(material: &MaterialProperties) -> bool {
    writes_every_pixel(material) && !material.may_modify_mesh_position
}

/// Control points per patch when the draw is tessellated, `None` otherwise.
///
/// Hull and domain shaders are resolved exactly when this returns `Some`.
pub fn tessellation_control_points(
    platform: ShaderPlatform,
    material: &MaterialProperties,
    vertex_factory: &VertexFactoryType,
) -> Option<u8> {
    if !platform.supports_tessellation() || !vertex_factory.supports_tessellation_shaders {
        return None;
    }
    material.tessellation_mode.control_points()
}

/// Shared gate of every hull and domain shader.
pub fn tessellation_should_compile(ctx: &PermutationContext<'_>) -> bool {
    ctx.platform.supports_tessellation()
        && ctx.material.tessellation_mode != TessellationMode::NoTessellation
        && ctx.vertex_factory.supports_tessellation_shaders
}

/// Base pass vertex shader.
///
/// The atmospheric fog permutation only exists for translucent materials, and only
/// when the project supports atmospheric fog.
pub fn base_pass_vs_should_compile(
    light_map: LightMapPolicyTag,
    atmospheric_fog: bool,
    ctx: &PermutationContext<'_>,
) -> bool {
    light_map_policy_should_compile(light_map, ctx)
        && (!atmospheric_fog || (ctx.settings.atmospheric_fog_enabled() && ctx.material.is_translucent()))
        && ctx.supports(FeatureLevel::Sm4)
}

/// Base pass hull shader. Only Metal needs the fog permutation to match the vertex shader.
pub fn base_pass_hs_should_compile(
    light_map: LightMapPolicyTag,
    atmospheric_fog: bool,
    ctx: &PermutationContext<'_>,
) -> bool {
    (!atmospheric_fog || ctx.platform.is_metal())
        && tessellation_should_compile(ctx)
        && base_pass_vs_should_compile(light_map, atmospheric_fog, ctx)
}

/// Base pass domain shader. Reuses the non-fog vertex shader gate.
pub fn base_pass_ds_should_compile(light_map: LightMapPolicyTag, ctx: &PermutationContext<'_>) -> bool {
    tessellation_should_compile(ctx) && base_pass_vs_should_compile(light_map, false, ctx)
}

/// Base pass pixel shader.
///
/// The sky light permutation exists for translucent materials, for light-map
/// policies that always need it, and for lit materials when the project supports
/// stationary sky lights.
pub fn base_pass_ps_should_compile(
    light_map: LightMapPolicyTag,
    sky_light: bool,
    ctx: &PermutationContext<'_>,
) -> bool {
    let material = ctx.material;
    let sky_ok = !sky_light
        || material.is_translucent()
        || light_map.requires_sky_light()
        || (ctx.settings.stationary_skylight_enabled() && material.is_lit());
    sky_ok && ctx.supports(FeatureLevel::Sm4) && light_map_policy_should_compile(light_map, ctx)
}

/// Mobile base pass vertex shader.
pub fn mobile_base_pass_vs_should_compile(light_map: LightMapPolicyTag, ctx: &PermutationContext<'_>) -> bool {
    ctx.platform.is_mobile() && light_map_policy_should_compile(light_map, ctx)
}

/// Mobile base pass pixel shader.
///
/// Unlit materials only get the zero-light permutation. With the static branch
/// enabled a single dynamic-branch permutation replaces the fixed counts.
pub fn mobile_base_pass_ps_should_compile(
    light_map: LightMapPolicyTag,
    point_lights: MobilePointLights,
    ctx: &PermutationContext<'_>,
) -> bool {
    let settings = ctx.settings;
    let lit = ctx.material.is_lit();
    let max = settings.mobile_num_dynamic_point_lights;
    let lights_ok = match point_lights {
        MobilePointLights::Fixed(0) => true,
        MobilePointLights::Fixed(count) => {
            lit && !settings.mobile_dynamic_point_lights_use_static_branch && count <= max
        }
        MobilePointLights::DynamicBranch => {
            lit && settings.mobile_dynamic_point_lights_use_static_branch && max > 0
        }
    };
    lights_ok && mobile_base_pass_vs_should_compile(light_map, ctx)
}

/// Depth-only vertex shader.
///
/// The position-only permutation is compiled for special engine materials on
/// vertex factories with a position stream. The full permutation is compiled for
/// special materials and for opaque materials whose coverage or positions differ
/// from the default material's.
pub fn depth_only_vs_should_compile(position_only: bool, ctx: &PermutationContext<'_>) -> bool {
    let material = ctx.material;
    if position_only {
        return ctx.vertex_factory.supports_position_only && material.is_special_engine_material;
    }
    material.is_special_engine_material
        || (!material.is_translucent() && !uses_default_material_shaders(material))
}

/// Depth-only pixel shader: only masked materials have pixel work in a depth pass.
pub fn depth_only_ps_should_compile(ctx: &PermutationContext<'_>) -> bool {
    ctx.material.is_masked()
}

/// Velocity vertex and pixel shaders.
pub fn velocity_should_compile(ctx: &PermutationContext<'_>) -> bool {
    let material = ctx.material;
    ctx.supports(FeatureLevel::Sm4)
        && (material.is_special_engine_material
            || (!material.is_translucent() && !uses_default_material_shaders(material)))
}

/// Hit-proxy vertex and pixel shaders. Editor platforms only.
pub fn hit_proxy_should_compile(ctx: &PermutationContext<'_>) -> bool {
    let material = ctx.material;
    !ctx.platform.is_mobile()
        && (material.is_special_engine_material || !uses_default_material_shaders(material))
}

/// Distortion vertex and pixel shaders.
pub fn distortion_should_compile(ctx: &PermutationContext<'_>) -> bool {
    ctx.supports(FeatureLevel::Sm4) && ctx.material.is_translucent() && ctx.material.is_distorted
}

/// Mesh decal vertex and pixel shaders.
pub fn mesh_decal_should_compile(ctx: &PermutationContext<'_>) -> bool {
    ctx.supports(FeatureLevel::Sm4) && ctx.material.is_deferred_decal()
}

/// Light-map density vertex and pixel shaders.
pub fn light_map_density_should_compile(light_map: LightMapPolicyTag, ctx: &PermutationContext<'_>) -> bool {
    let material = ctx.material;
    let tag_ok = matches!(
        light_map,
        LightMapPolicyTag::DummyDensity | LightMapPolicyTag::LqLightmap | LightMapPolicyTag::HqLightmap
    );
    tag_ok
        && ctx.settings.allow_debug_viewmodes
        && ctx.supports(FeatureLevel::Sm4)
        && (material.is_special_engine_material
            || (!material.is_translucent() && !uses_default_material_shaders(material)))
        && light_map_policy_should_compile(light_map, ctx)
}

/// Returns `true` if `shader_type` is compiled for the material and vertex factory
/// in `ctx`.
pub fn should_compile(shader_type: ShaderType, ctx: &PermutationContext<'_>) -> bool {
    use ShaderType::*;
    let tessellation = tessellation_should_compile(ctx);
    match shader_type {
        BasePassVs {
            light_map,
            atmospheric_fog,
        } => base_pass_vs_should_compile(light_map, atmospheric_fog, ctx),
        BasePassHs {
            light_map,
            atmospheric_fog,
        } => base_pass_hs_should_compile(light_map, atmospheric_fog, ctx),
        BasePassDs { light_map } => base_pass_ds_should_compile(light_map, ctx),
        BasePassPs { light_map, sky_light } => base_pass_ps_should_compile(light_map, sky_light, ctx),

        MobileBasePassVs { light_map } => mobile_base_pass_vs_should_compile(light_map, ctx),
        MobileBasePassPs {
            light_map,
            point_lights,
        } => mobile_base_pass_ps_should_compile(light_map, point_lights, ctx),

        DepthOnlyVs { position_only } => depth_only_vs_should_compile(position_only, ctx),
        DepthOnlyHs | DepthOnlyDs => tessellation && depth_only_vs_should_compile(false, ctx),
        DepthOnlyPs => depth_only_ps_should_compile(ctx),

        DistortionVs | DistortionPs => distortion_should_compile(ctx),
        DistortionHs | DistortionDs => tessellation && distortion_should_compile(ctx),

        MeshDecalVs | MeshDecalPs => mesh_decal_should_compile(ctx),
        MeshDecalHs | MeshDecalDs => tessellation && mesh_decal_should_compile(ctx),

        LightMapDensityVs { light_map } | LightMapDensityPs { light_map } => {
            light_map_density_should_compile(light_map, ctx)
        }
        LightMapDensityHs { light_map } | LightMapDensityDs { light_map } => {
            tessellation && light_map_density_should_compile(light_map, ctx)
        }

        VelocityVs | VelocityPs => velocity_should_compile(ctx),
        VelocityHs | VelocityDs => tessellation && velocity_should_compile(ctx),

        HitProxyVs | HitProxyPs => hit_proxy_should_compile(ctx),
        HitProxyHs | HitProxyDs => tessellation && hit_proxy_should_compile(ctx),
    }
}

/// The permutation whose predicate `shader_type`'s predicate is built on, if any.
///
/// For every pair returned, `should_compile(derived)` implies `should_compile(base)`.
pub fn base_permutation(shader_type: ShaderType) -> Option<ShaderType> {
    use ShaderType::*;
    match shader_type {
        BasePassHs {
            light_map,
            atmospheric_fog,
        } => Some(BasePassVs {
            light_map,
            atmospheric_fog,
        }),
        BasePassDs { light_map } => Some(BasePassVs {
            light_map,
            atmospheric_fog: false,
        }),
        MobileBasePassPs { light_map, .. } => Some(MobileBasePassVs { light_map }),
        DepthOnlyHs | DepthOnlyDs => Some(DepthOnlyVs { position_only: false }),
        DistortionHs | DistortionDs => Some(DistortionVs),
        MeshDecalHs | MeshDecalDs => Some(MeshDecalVs),
        LightMapDensityHs { light_map } | LightMapDensityDs { light_map } => {
            Some(LightMapDensityVs { light_map })
        }
        VelocityHs | VelocityDs => Some(VelocityVs),
        HitProxyHs | HitProxyDs => Some(HitProxyVs),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesper_core::material::BlendMode;
    use vesper_core::scene::VertexFactoryTypeId;
    use vesper_core::settings::RendererSettings;

    fn factory() -> VertexFactoryType {
        VertexFactoryType {
            supports_static_lighting: true,
            supports_tessellation_shaders: true,
            supports_position_only: true,
            ..VertexFactoryType::new(VertexFactoryTypeId(1), "LocalVertexFactory")
        }
    }

    #[test]
    fn fog_permutation_requires_translucency() {
        let vf = factory();
        let settings = RendererSettings::default();
        let tag = LightMapPolicyTag::NoLightmap;

        let opaque = MaterialProperties::default();
        let ctx = PermutationContext::new(ShaderPlatform::D3dSm5, &opaque, &vf, &settings);
        assert!(base_pass_vs_should_compile(tag, false, &ctx));
        assert!(!base_pass_vs_should_compile(tag, true, &ctx));

        let translucent = MaterialProperties {
            blend_mode: BlendMode::Translucent,
            ..Default::default()
        };
        let ctx = PermutationContext::new(ShaderPlatform::D3dSm5, &translucent, &vf, &settings);
        assert!(base_pass_vs_should_compile(tag, true, &ctx));

        let no_fog = RendererSettings {
            support_atmospheric_fog: false,
            ..Default::default()
        };
        let ctx = PermutationContext::new(ShaderPlatform::D3dSm5, &translucent, &vf, &no_fog);
        assert!(!base_pass_vs_should_compile(tag, true, &ctx));
    }

    #[test]
    fn hull_fog_permutation_is_metal_only() {
        let vf = factory();
        let settings = RendererSettings::default();
        let material = MaterialProperties {
            blend_mode: BlendMode::Translucent,
            tessellation_mode: TessellationMode::FlatTessellation,
            ..Default::default()
        };
        let tag = LightMapPolicyTag::NoLightmap;

        let ctx = PermutationContext::new(ShaderPlatform::D3dSm5, &material, &vf, &settings);
        assert!(base_pass_hs_should_compile(tag, false, &ctx));
        assert!(!base_pass_hs_should_compile(tag, true, &ctx));
        assert!(base_pass_ds_should_compile(tag, &ctx));

        let ctx = PermutationContext::new(ShaderPlatform::MetalSm5, &material, &vf, &settings);
        assert!(base_pass_hs_should_compile(tag, true, &ctx));
    }

    #[test]
    fn sky_light_permutation() {
        let vf = factory();
        let tag = LightMapPolicyTag::NoLightmap;
        let no_stationary = RendererSettings {
            support_stationary_skylight: false,
            ..Default::default()
        };

        let opaque = MaterialProperties::default();
        let ctx = PermutationContext::new(ShaderPlatform::D3dSm5, &opaque, &vf, &no_stationary);
        assert!(!base_pass_ps_should_compile(tag, true, &ctx));
        assert!(base_pass_ps_should_compile(tag, false, &ctx));

        let settings = RendererSettings::default();
        let ctx = PermutationContext::new(ShaderPlatform::D3dSm5, &opaque, &vf, &settings);
        assert!(base_pass_ps_should_compile(tag, true, &ctx));

        let simple = RendererSettings {
            simple_forward_shading: true,
            ..no_stationary
        };
        let ctx = PermutationContext::new(ShaderPlatform::D3dSm5, &opaque, &vf, &simple);
        assert!(base_pass_ps_should_compile(
            LightMapPolicyTag::SimpleDirectionalLightLighting,
            true,
            &ctx
        ));
    }

    #[test]
    fn mobile_point_light_permutations() {
        let vf = factory();
        let material = MaterialProperties::default();
        let tag = LightMapPolicyTag::NoLightmap;

        let branch = RendererSettings::default();
        let ctx = PermutationContext::new(ShaderPlatform::GlEs3_1, &material, &vf, &branch);
        assert!(mobile_base_pass_ps_should_compile(tag, MobilePointLights::Fixed(0), &ctx));
        assert!(mobile_base_pass_ps_should_compile(tag, MobilePointLights::DynamicBranch, &ctx));
        assert!(!mobile_base_pass_ps_should_compile(tag, MobilePointLights::Fixed(2), &ctx));

        let fixed = RendererSettings {
            mobile_dynamic_point_lights_use_static_branch: false,
            mobile_num_dynamic_point_lights: 2,
            ..Default::default()
        };
        let ctx = PermutationContext::new(ShaderPlatform::GlEs3_1, &material, &vf, &fixed);
        assert!(mobile_base_pass_ps_should_compile(tag, MobilePointLights::Fixed(2), &ctx));
        assert!(!mobile_base_pass_ps_should_compile(tag, MobilePointLights::Fixed(3), &ctx));
        assert!(!mobile_base_pass_ps_should_compile(tag, MobilePointLights::DynamicBranch, &ctx));

        let ctx = PermutationContext::new(ShaderPlatform::D3dSm5, &material, &vf, &fixed);
        assert!(!mobile_base_pass_ps_should_compile(tag, MobilePointLights::Fixed(0), &ctx));
    }

    #[test]
    fn depth_only_position_stream() {
        let vf = factory();
        let settings = RendererSettings::default();

        let default_material = MaterialProperties {
            is_special_engine_material: true,
            ..Default::default()
        };
        let ctx = PermutationContext::new(ShaderPlatform::D3dSm5, &default_material, &vf, &settings);
        assert!(depth_only_vs_should_compile(true, &ctx));
        assert!(depth_only_vs_should_compile(false, &ctx));

        let plain = MaterialProperties::default();
        let ctx = PermutationContext::new(ShaderPlatform::D3dSm5, &plain, &vf, &settings);
        assert!(!depth_only_vs_should_compile(true, &ctx));
        assert!(!depth_only_vs_should_compile(false, &ctx));

        let masked = MaterialProperties {
            blend_mode: BlendMode::Masked,
            ..Default::default()
        };
        let ctx = PermutationContext::new(ShaderPlatform::D3dSm5, &masked, &vf, &settings);
        assert!(depth_only_vs_should_compile(false, &ctx));
        assert!(depth_only_ps_should_compile(&ctx));
    }

    #[test]
    fn tessellation_needs_platform_and_factory() {
        let material = MaterialProperties {
            tessellation_mode: TessellationMode::PnTriangles,
            ..Default::default()
        };
        let vf = factory();
        assert_eq!(tessellation_control_points(ShaderPlatform::D3dSm5, &material, &vf), Some(12));
        assert_eq!(tessellation_control_points(ShaderPlatform::D3dSm4, &material, &vf), None);

        let plain_vf = VertexFactoryType::new(VertexFactoryTypeId(9), "Particles");
        assert_eq!(tessellation_control_points(ShaderPlatform::D3dSm5, &material, &plain_vf), None);
    }
}

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

//! Builds a material's [`ShaderMap`] the way the offline shader compiler would:
//! every permutation whose predicate holds is "compiled" with its declared
//! parameters, every other one is recorded as excluded.

use super::passes::should_compile;
use super::{PermutationContext, MAX_MOBILE_POINT_LIGHTS};
use vesper_core::material::MaterialProperties;
use vesper_core::renderer::{
    CompiledShader, LightMapPolicyTag, MobilePointLights, ShaderId, ShaderMap, ShaderMapId,
    ShaderParameter, ShaderParameterMap, ShaderPlatform, ShaderType,
};
use vesper_core::scene::VertexFactoryType;
use vesper_core::settings::RendererSettings;

/// Every shader type the renderer knows, in a stable order.
pub fn all_shader_types() -> Vec<ShaderType> {
    use ShaderType::*;
    let mut types = Vec::new();
    for light_map in LightMapPolicyTag::ALL {
        for flag in [false, true] {
            types.push(BasePassVs {
                light_map,
                atmospheric_fog: flag,
            });
            types.push(BasePassHs {
                light_map,
                atmospheric_fog: flag,
            });
            types.push(BasePassPs {
                light_map,
                sky_light: flag,
            });
        }
        types.push(BasePassDs { light_map });

        types.push(MobileBasePassVs { light_map });
        for count in 0..=MAX_MOBILE_POINT_LIGHTS {
            types.push(MobileBasePassPs {
                light_map,
                point_lights: MobilePointLights::Fixed(count),
            });
        }
        types.push(MobileBasePassPs {
            light_map,
            point_lights: MobilePointLights::DynamicBranch,
        });

        types.extend([
            LightMapDensityVs { light_map },
            LightMapDensityHs { light_map },
            LightMapDensityDs { light_map },
            LightMapDensityPs { light_map },
        ]);
    }
    types.extend([
        DepthOnlyVs { position_only: false },
        DepthOnlyVs { position_only: true },
        DepthOnlyHs,
        DepthOnlyDs,
        DepthOnlyPs,
        DistortionVs,
        DistortionHs,
        DistortionDs,
        DistortionPs,
        MeshDecalVs,
        MeshDecalHs,
        MeshDecalDs,
        MeshDecalPs,
        VelocityVs,
        VelocityHs,
        VelocityDs,
        VelocityPs,
        HitProxyVs,
        HitProxyHs,
        HitProxyDs,
        HitProxyPs,
    ]);
    types
}

fn light_map_vertex_parameters(tag: LightMapPolicyTag, out: &mut Vec<ShaderParameter>) {
    if tag.uses_texture_lightmap() {
        out.extend([
            ShaderParameter::LightMapCoordinateScaleBias,
            ShaderParameter::PrecomputedLighting,
        ]);
    }
    if tag.uses_shadow_map_texture() {
        out.push(ShaderParameter::ShadowMapCoordinateScaleBias);
    }
}

fn light_map_pixel_parameters(tag: LightMapPolicyTag, out: &mut Vec<ShaderParameter>) {
    use ShaderParameter::*;
    if tag.uses_texture_lightmap() {
        out.extend([LightMapTexture, SkyOcclusionTexture, PrecomputedLighting]);
    }
    if tag.uses_shadow_map_texture() {
        out.push(StaticShadowTexture);
    }
    if tag.uses_cache_volume() {
        out.extend([
            IndirectLightingCache,
            IndirectLightingCacheVolume0,
            IndirectLightingCacheVolume1,
            IndirectLightingCacheVolume2,
        ]);
    }
    if tag.uses_cache_point_sample() {
        out.extend([IndirectLightingCache, PointIndirectLightingSamples]);
    }
    if tag.uses_volumetric_lightmap() {
        out.extend([VolumetricLightmapBrickTexture, PrecomputedLighting]);
    }
    if tag.is_self_shadowed() {
        out.extend([TranslucentSelfShadow, TranslucentSelfShadowDepth]);
    }
    if tag.is_simple_forward() {
        out.extend([ForwardLightData, CulledLightDataGrid]);
    }
    if tag.is_mobile() {
        out.push(MobileDirectionalLight);
    }
}

/// The parameters a permutation declares, before slot assignment.
pub fn declared_parameters(shader_type: ShaderType, material: &MaterialProperties) -> Vec<ShaderParameter> {
    use ShaderParameter::*;
    use ShaderType as T;

    let mut out = vec![View, Material, Primitive];
    match shader_type {
        T::BasePassVs {
            light_map,
            atmospheric_fog,
        } => {
            out.extend([InstancedView, LocalToWorld]);
            light_map_vertex_parameters(light_map, &mut out);
            if atmospheric_fog {
                out.extend([Fog, FogInscatteringTexture]);
            }
        }
        T::BasePassDs { .. } => out.push(LocalToWorld),
        T::BasePassPs { light_map, .. } => {
            out.extend([InstancedView, ReflectionCapture, DitheredLodTransitionAlpha]);
            light_map_pixel_parameters(light_map, &mut out);
            if material.is_translucent() {
                out.extend([
                    ForwardLightData,
                    InstancedForwardLightData,
                    CulledLightDataGrid,
                    InstancedCulledLightDataGrid,
                    SceneColorTexture,
                    SceneDepthTexture,
                ]);
            }
        }
        T::MobileBasePassVs { light_map } => {
            out.push(LocalToWorld);
            light_map_vertex_parameters(light_map, &mut out);
        }
        T::MobileBasePassPs {
            light_map,
            point_lights,
        } => {
            out.extend([ReflectionCapture, DitheredLodTransitionAlpha]);
            light_map_pixel_parameters(light_map, &mut out);
            if point_lights != MobilePointLights::Fixed(0) {
                out.push(NumDynamicPointLights);
            }
        }
        T::DepthOnlyVs { position_only } => {
            out.extend([InstancedView, LocalToWorld]);
            if position_only {
                out.retain(|p| *p != Material);
            }
        }
        T::DepthOnlyPs => out.push(DitheredLodTransitionAlpha),
        T::DistortionVs | T::MeshDecalVs | T::HitProxyVs => out.push(LocalToWorld),
        T::DistortionPs | T::MeshDecalPs => out.push(SceneDepthTexture),
        T::LightMapDensityVs { light_map } => {
            out.push(LocalToWorld);
            if light_map.uses_texture_lightmap() {
                out.push(LightMapCoordinateScaleBias);
            }
        }
        T::LightMapDensityPs { light_map } => {
            out.push(LightMapDensityParameters);
            if light_map.uses_texture_lightmap() {
                out.push(LightMapTexture);
            }
        }
        T::VelocityVs => out.extend([LocalToWorld, PreviousLocalToWorld]),
        T::HitProxyPs => out.push(HitProxyColor),
        T::BasePassHs { .. }
        | T::DepthOnlyHs
        | T::DepthOnlyDs
        | T::DistortionHs
        | T::DistortionDs
        | T::MeshDecalHs
        | T::MeshDecalDs
        | T::LightMapDensityHs { .. }
        | T::LightMapDensityDs { .. }
        | T::VelocityHs
        | T::VelocityDs
        | T::VelocityPs
        | T::HitProxyHs
        | T::HitProxyDs => {}
    }
    out
}

/// Compiles shader maps for materials against a set of vertex factory types.
///
/// Shader ids are unique across every map built by the same builder.
#[derive(Debug)]
pub struct ShaderMapBuilder<'s> {
    platform: ShaderPlatform,
    settings: &'s RendererSettings,
    next_shader: u32,
    next_map: u32,
}

impl<'s> ShaderMapBuilder<'s> {
    /// Creates a builder for one platform.
    pub fn new(platform: ShaderPlatform, settings: &'s RendererSettings) -> Self {
        Self {
            platform,
            settings,
            next_shader: 1,
            next_map: 1,
        }
    }

    /// The platform shaders are built for.
    pub fn platform(&self) -> ShaderPlatform {
        self.platform
    }

    /// Builds the shader map of one material.
    pub fn build(&mut self, material: &MaterialProperties, vertex_factories: &[VertexFactoryType]) -> ShaderMap {
        let mut map = ShaderMap::new(ShaderMapId(self.next_map));
        self.next_map += 1;

        let shader_types = all_shader_types();
        for vertex_factory in vertex_factories {
            let ctx = PermutationContext::new(self.platform, material, vertex_factory, self.settings);
            for &shader_type in &shader_types {
                if should_compile(shader_type, &ctx) {
                    let id = ShaderId(self.next_shader);
                    self.next_shader += 1;
                    map.insert(CompiledShader {
                        id,
                        shader_type,
                        vertex_factory_type: vertex_factory.id,
                        parameters: ShaderParameterMap::from_parameters(declared_parameters(
                            shader_type,
                            material,
                        )),
                    });
                } else {
                    map.mark_excluded(shader_type, vertex_factory.id);
                }
            }
        }
        log::debug!(
            "Built shader map {:?}: {} permutations for {} vertex factories.",
            map.id(),
            map.len(),
            vertex_factories.len()
        );
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permutation::base_permutation;
    use vesper_core::material::{BlendMode, ShadingModel, TessellationMode};
    use vesper_core::scene::VertexFactoryTypeId;

    fn factories() -> Vec<VertexFactoryType> {
        vec![
            VertexFactoryType {
                supports_static_lighting: true,
                supports_tessellation_shaders: true,
                supports_position_only: true,
                ..VertexFactoryType::new(VertexFactoryTypeId(1), "LocalVertexFactory")
            },
            VertexFactoryType::new(VertexFactoryTypeId(2), "GpuSkinVertexFactory"),
        ]
    }

    fn materials() -> Vec<MaterialProperties> {
        vec![
            MaterialProperties::default(),
            MaterialProperties {
                is_special_engine_material: true,
                ..Default::default()
            },
            MaterialProperties {
                blend_mode: BlendMode::Masked,
                tessellation_mode: TessellationMode::FlatTessellation,
                may_modify_mesh_position: true,
                ..Default::default()
            },
            MaterialProperties {
                blend_mode: BlendMode::Translucent,
                is_distorted: true,
                ..Default::default()
            },
            MaterialProperties {
                shading_model: ShadingModel::Unlit,
                blend_mode: BlendMode::Additive,
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_derived_permutations_imply_their_base() {
        let vfs = factories();
        for platform in [ShaderPlatform::D3dSm5, ShaderPlatform::MetalSm5, ShaderPlatform::GlEs3_1] {
            for simple in [false, true] {
                let settings = RendererSettings {
                    simple_forward_shading: simple,
                    ..Default::default()
                };
                for material in materials() {
                    for vf in &vfs {
                        let ctx = PermutationContext::new(platform, &material, vf, &settings);
                        for shader_type in all_shader_types() {
                            if !should_compile(shader_type, &ctx) {
                                continue;
                            }
                            if let Some(base) = base_permutation(shader_type) {
                                assert!(should_compile(base, &ctx), "{shader_type:?} without {base:?}");
                            }
                            if let Some(tag) = shader_type.light_map_policy() {
                                assert!(
                                    crate::permutation::light_map_policy_should_compile(tag, &ctx),
                                    "{shader_type:?} without its light-map policy"
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_predicates_are_deterministic() {
        let vfs = factories();
        let settings = RendererSettings::default();
        for material in materials() {
            let ctx = PermutationContext::new(ShaderPlatform::D3dSm5, &material, &vfs[0], &settings);
            for shader_type in all_shader_types() {
                assert_eq!(should_compile(shader_type, &ctx), should_compile(shader_type, &ctx));
            }
        }
    }

    #[test]
    fn test_build_records_exclusions() {
        let settings = RendererSettings::default();
        let mut builder = ShaderMapBuilder::new(ShaderPlatform::D3dSm5, &settings);
        let vfs = factories();
        let map = builder.build(&MaterialProperties::default(), &vfs);

        let lightmapped = ShaderType::BasePassPs {
            light_map: LightMapPolicyTag::HqLightmap,
            sky_light: false,
        };
        assert!(map.contains(lightmapped, vfs[0].id));
        assert!(matches!(
            map.get(lightmapped, vfs[1].id),
            Err(vesper_core::renderer::ShaderError::ExcludedPermutation { .. })
        ));

        let total = all_shader_types().len() * vfs.len();
        let excluded = total - map.len();
        assert!(excluded > 0);
    }

    #[test]
    fn test_shader_ids_are_unique_across_maps() {
        let settings = RendererSettings::default();
        let mut builder = ShaderMapBuilder::new(ShaderPlatform::D3dSm5, &settings);
        let vfs = factories();
        let a = builder.build(&MaterialProperties::default(), &vfs);
        let b = builder.build(&MaterialProperties::default(), &vfs);
        assert_ne!(a.id(), b.id());
        let ids: std::collections::HashSet<_> = a.iter().chain(b.iter()).map(|s| s.id).collect();
        assert_eq!(ids.len(), a.len() + b.len());
    }

    #[test]
    fn test_declared_parameters() {
        let translucent = MaterialProperties {
            blend_mode: BlendMode::Translucent,
            ..Default::default()
        };
        let ps = declared_parameters(
            ShaderType::BasePassPs {
                light_map: LightMapPolicyTag::CachedVolumeIndirectLighting,
                sky_light: false,
            },
            &translucent,
        );
        assert!(ps.contains(&ShaderParameter::IndirectLightingCacheVolume2));
        assert!(ps.contains(&ShaderParameter::SceneDepthTexture));
        assert!(!ps.contains(&ShaderParameter::LightMapTexture));

        let vs = declared_parameters(
            ShaderType::DepthOnlyVs { position_only: true },
            &MaterialProperties::default(),
        );
        assert!(!vs.contains(&ShaderParameter::Material));
    }
}

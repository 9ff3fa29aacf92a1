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

//! Light-map policy selection.
//!
//! The selectors are the runtime mirror of the capability predicates: given a mesh,
//! its primitive and the pass's lighting capabilities they return the single
//! [`LightMapPolicyTag`] the mesh's base-pass shaders are resolved with. By
//! construction they only return tags whose predicate holds for the mesh.

mod mobile;

pub use self::mobile::{mobile_point_light_permutation, select_mobile_light_map_policy, MobileDirectionalLight};

use vesper_core::material::MaterialProperties;
use vesper_core::renderer::{
    FeatureLevel, LightCacheInterface, LightMapInteractionType, LightMapPolicyTag, ShadowMapInteractionType,
};
use vesper_core::scene::{IndirectLightingCacheQuality, MeshBatch, PrimitiveSceneInfo};
use vesper_core::settings::RendererSettings;

/// What the calling pass lets the selector use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightingCapabilities {
    /// The scene has volumetric lightmap data.
    pub use_volumetric_lightmap: bool,
    /// The pass may read the indirect lighting cache.
    pub allow_indirect_lighting_cache: bool,
    /// The pass may read the indirect lighting cache volume textures.
    pub allow_cache_volume_texture: bool,
    /// The pass renders translucency self shadowing.
    pub use_translucent_self_shadowing: bool,
}

impl LightingCapabilities {
    /// The capabilities of the base or translucency pass drawing `material` in a
    /// scene with the given volumetric lightmap and translucency self shadowing.
    pub fn for_material(material: &MaterialProperties, volumetric_lightmap: bool, translucent_self_shadow: bool) -> Self {
        Self {
            use_volumetric_lightmap: volumetric_lightmap,
            allow_indirect_lighting_cache: true,
            allow_cache_volume_texture: !material.is_translucent(),
            use_translucent_self_shadowing: translucent_self_shadow && material.is_translucent(),
        }
    }
}

/// Baked lighting the mesh may use: present only when static lighting is allowed,
/// the vertex factory has lightmap UVs and the primitive's static lighting is valid.
pub(crate) fn usable_light_cache<'m>(
    mesh: &MeshBatch<'m>,
    primitive: Option<&PrimitiveSceneInfo>,
    settings: &RendererSettings,
) -> Option<&'m LightCacheInterface> {
    if !settings.allow_static_lighting || !mesh.vertex_factory.ty.supports_static_lighting {
        return None;
    }
    if !primitive.map_or(true, |p| p.has_valid_static_lighting) {
        return None;
    }
    mesh.light_cache
}

fn texture_light_map<'m>(
    mesh: &MeshBatch<'m>,
    primitive: Option<&PrimitiveSceneInfo>,
    settings: &RendererSettings,
) -> Option<&'m LightCacheInterface> {
    usable_light_cache(mesh, primitive, settings).filter(|lci| lci.light_map.kind == LightMapInteractionType::Texture)
}

fn has_shadow_map_texture(lci: &LightCacheInterface) -> bool {
    lci.shadow_map.kind == ShadowMapInteractionType::Texture
}

/// The primitive samples the indirect lighting cache this frame.
pub(crate) fn uses_indirect_lighting_cache(primitive: &PrimitiveSceneInfo) -> bool {
    let valid_allocation = primitive
        .indirect_lighting_cache_allocation
        .is_some_and(|allocation| allocation.is_valid);
    primitive.indirect_lighting_cache_quality != IndirectLightingCacheQuality::Off
        && (valid_allocation || primitive.is_movable())
}

/// Chooses the light-map policy of a mesh for the deferred or simple forward base pass.
///
/// # Arguments
///
/// * `mesh`: The batch being drawn. Its material decides whether it is lit.
/// * `primitive`: The owning primitive, `None` for meshes without one.
/// * `feature_level`: Feature level of the view.
/// * `simple_forward`: The view renders with the simple forward path.
/// * `capabilities`: What the calling pass allows.
/// * `settings`: Project settings.
pub fn select_light_map_policy(
    mesh: &MeshBatch<'_>,
    primitive: Option<&PrimitiveSceneInfo>,
    feature_level: FeatureLevel,
    simple_forward: bool,
    capabilities: LightingCapabilities,
    settings: &RendererSettings,
) -> LightMapPolicyTag {
    let material = mesh.material_render_proxy.material().properties();
    if !material.is_lit() {
        return LightMapPolicyTag::NoLightmap;
    }

    let sm4 = feature_level >= FeatureLevel::Sm4;
    let allow_static = settings.allow_static_lighting;
    let light_map = texture_light_map(mesh, primitive, settings);
    let movable = primitive.is_some_and(|p| p.is_movable());
    let volumetric = allow_static
        && capabilities.use_volumetric_lightmap
        && primitive.is_some_and(|p| p.is_movable() || p.needs_unbuilt_preview_lighting);
    let cache_allowed = capabilities.allow_indirect_lighting_cache && allow_static && settings.indirect_lighting_cache && sm4;
    let uses_cache = primitive.is_some_and(uses_indirect_lighting_cache);

    if simple_forward {
        return if let Some(lci) = light_map {
            if has_shadow_map_texture(lci) {
                LightMapPolicyTag::SimpleStationaryPrecomputedShadowLighting
            } else {
                LightMapPolicyTag::SimpleLightmapOnlyLighting
            }
        } else if volumetric {
            LightMapPolicyTag::SimpleStationaryVolumetricLightmapShadowLighting
        } else if cache_allowed && primitive.is_some() {
            if uses_cache {
                LightMapPolicyTag::SimpleStationarySingleSampleShadowLighting
            } else {
                LightMapPolicyTag::SimpleNoLightmap
            }
        } else {
            LightMapPolicyTag::SimpleDirectionalLightLighting
        };
    }

    if capabilities.use_translucent_self_shadowing && sm4 {
        return if allow_static && capabilities.use_volumetric_lightmap && primitive.is_some() {
            LightMapPolicyTag::SelfShadowedVolumetricLightmap
        } else if cache_allowed && primitive.is_some() {
            LightMapPolicyTag::SelfShadowedCachedPointIndirectLighting
        } else {
            LightMapPolicyTag::SelfShadowedTranslucency
        };
    }

    if let Some(lci) = light_map {
        let high_quality = settings.support_high_quality_lightmaps && sm4 && lci.light_map.allows_high_quality;
        return if high_quality {
            if has_shadow_map_texture(lci) {
                LightMapPolicyTag::DistanceFieldShadowsAndHqLightmap
            } else {
                LightMapPolicyTag::HqLightmap
            }
        } else if settings.support_low_quality_lightmaps {
            LightMapPolicyTag::LqLightmap
        } else {
            LightMapPolicyTag::NoLightmap
        };
    }

    if volumetric && sm4 {
        return LightMapPolicyTag::PrecomputedIrradianceVolumeIndirectLighting;
    }

    if cache_allowed {
        if let Some(primitive) = primitive.filter(|p| uses_indirect_lighting_cache(p)) {
            let allocation = primitive.indirect_lighting_cache_allocation.filter(|a| a.is_valid);
            let volume = capabilities.allow_cache_volume_texture
                && (allocation.is_some_and(|a| !a.point_sample)
                    || (movable && primitive.indirect_lighting_cache_quality == IndirectLightingCacheQuality::Volume));
            return if volume {
                LightMapPolicyTag::CachedVolumeIndirectLighting
            } else {
                LightMapPolicyTag::CachedPointIndirectLighting
            };
        }
    }

    LightMapPolicyTag::NoLightmap
}

/// Chooses the light-map policy of the light-map density visualisation.
///
/// `shader_material` is the material whose shaders draw the mesh, which is the
/// default material for plain opaque meshes.
pub fn select_light_map_density_policy(
    mesh: &MeshBatch<'_>,
    primitive: Option<&PrimitiveSceneInfo>,
    shader_material: &MaterialProperties,
    feature_level: FeatureLevel,
    settings: &RendererSettings,
) -> LightMapPolicyTag {
    match texture_light_map(mesh, primitive, settings) {
        Some(lci) if shader_material.is_lit() && !settings.simple_forward_shading => {
            if settings.support_high_quality_lightmaps
                && feature_level >= FeatureLevel::Sm4
                && lci.light_map.allows_high_quality
            {
                LightMapPolicyTag::HqLightmap
            } else if settings.support_low_quality_lightmaps {
                LightMapPolicyTag::LqLightmap
            } else {
                LightMapPolicyTag::DummyDensity
            }
        }
        _ => LightMapPolicyTag::DummyDensity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3, Vec4};
    use vesper_core::material::{BlendMode, Material, MaterialInstance, MaterialProxyId, ShadingModel};
    use vesper_core::renderer::{
        LightMapInteraction, ShaderMap, ShaderMapId, ShadowMapInteraction, TextureId, UniformBufferId,
        VertexDeclarationId,
    };
    use vesper_core::scene::{
        IndirectLightingCacheAllocation, MeshBatchElement, Mobility, PrimitiveId, VertexFactory, VertexFactoryId,
        VertexFactoryType, VertexFactoryTypeId,
    };

    fn material(properties: MaterialProperties) -> MaterialInstance {
        MaterialInstance::new(
            MaterialProxyId(1),
            Material {
                properties,
                shader_map: ShaderMap::new(ShaderMapId(1)),
            },
            UniformBufferId(10),
        )
    }

    fn vertex_factory() -> VertexFactory {
        VertexFactory {
            id: VertexFactoryId(1),
            ty: VertexFactoryType {
                supports_static_lighting: true,
                ..VertexFactoryType::new(VertexFactoryTypeId(1), "LocalVertexFactory")
            },
            declaration: VertexDeclarationId(1),
            position_only_declaration: None,
            streams: Vec::new(),
            position_streams: Vec::new(),
        }
    }

    fn lightmapped(shadow: bool) -> LightCacheInterface {
        LightCacheInterface {
            light_map: LightMapInteraction::texture(TextureId(20), TextureId(21), true, Vec4::ONE),
            shadow_map: if shadow {
                ShadowMapInteraction::texture(TextureId(22), Vec4::ONE)
            } else {
                ShadowMapInteraction::default()
            },
            precomputed_lighting_buffer: Some(UniformBufferId(23)),
        }
    }

    fn movable_primitive() -> PrimitiveSceneInfo {
        PrimitiveSceneInfo {
            mobility: Mobility::Movable,
            local_to_world: Mat4::from_translation(Vec3::X),
            ..PrimitiveSceneInfo::new(PrimitiveId(0), UniformBufferId(5))
        }
    }

    fn opaque_caps() -> LightingCapabilities {
        LightingCapabilities {
            use_volumetric_lightmap: false,
            allow_indirect_lighting_cache: true,
            allow_cache_volume_texture: true,
            use_translucent_self_shadowing: false,
        }
    }

    #[test]
    fn unlit_material_has_no_lightmap() {
        let proxy = material(MaterialProperties {
            shading_model: ShadingModel::Unlit,
            ..Default::default()
        });
        let vf = vertex_factory();
        let lci = lightmapped(false);
        let mesh = MeshBatch::new(&vf, &proxy, vec![MeshBatchElement::default()]).with_light_cache(&lci);
        let settings = RendererSettings::default();
        for simple in [false, true] {
            let tag = select_light_map_policy(&mesh, None, FeatureLevel::Sm5, simple, opaque_caps(), &settings);
            assert_eq!(tag, LightMapPolicyTag::NoLightmap);
        }
    }

    #[test]
    fn texture_lightmap_quality() {
        let proxy = material(MaterialProperties::default());
        let vf = vertex_factory();
        let settings = RendererSettings::default();
        let primitive = PrimitiveSceneInfo::new(PrimitiveId(0), UniformBufferId(5));

        let lci = lightmapped(true);
        let mesh = MeshBatch::new(&vf, &proxy, vec![MeshBatchElement::default()]).with_light_cache(&lci);
        let tag = select_light_map_policy(&mesh, Some(&primitive), FeatureLevel::Sm5, false, opaque_caps(), &settings);
        assert_eq!(tag, LightMapPolicyTag::DistanceFieldShadowsAndHqLightmap);

        let lq_only = RendererSettings {
            support_high_quality_lightmaps: false,
            ..Default::default()
        };
        let tag = select_light_map_policy(&mesh, Some(&primitive), FeatureLevel::Sm5, false, opaque_caps(), &lq_only);
        assert_eq!(tag, LightMapPolicyTag::LqLightmap);

        let invalid = PrimitiveSceneInfo {
            has_valid_static_lighting: false,
            ..primitive.clone()
        };
        let tag = select_light_map_policy(&mesh, Some(&invalid), FeatureLevel::Sm5, false, opaque_caps(), &settings);
        assert!(!tag.uses_texture_lightmap());
    }

    #[test]
    fn indirect_lighting_cache_volume_or_point() {
        let proxy = material(MaterialProperties::default());
        let vf = vertex_factory();
        let mesh = MeshBatch::new(&vf, &proxy, vec![MeshBatchElement::default()]);
        let settings = RendererSettings::default();
        let allocation = IndirectLightingCacheAllocation {
            is_valid: true,
            point_sample: false,
            add: Vec4::ZERO,
            scale: Vec4::ONE,
            uniform_buffer: Some(UniformBufferId(30)),
            point_samples: None,
        };
        let primitive = PrimitiveSceneInfo {
            indirect_lighting_cache_allocation: Some(allocation),
            ..movable_primitive()
        };

        let tag = select_light_map_policy(&mesh, Some(&primitive), FeatureLevel::Sm5, false, opaque_caps(), &settings);
        assert_eq!(tag, LightMapPolicyTag::CachedVolumeIndirectLighting);

        let translucent_caps = LightingCapabilities {
            allow_cache_volume_texture: false,
            ..opaque_caps()
        };
        let tag = select_light_map_policy(&mesh, Some(&primitive), FeatureLevel::Sm5, false, translucent_caps, &settings);
        assert_eq!(tag, LightMapPolicyTag::CachedPointIndirectLighting);

        let off = PrimitiveSceneInfo {
            indirect_lighting_cache_quality: IndirectLightingCacheQuality::Off,
            ..primitive
        };
        let tag = select_light_map_policy(&mesh, Some(&off), FeatureLevel::Sm5, false, opaque_caps(), &settings);
        assert_eq!(tag, LightMapPolicyTag::NoLightmap);
    }

    #[test]
    fn volumetric_lightmap_for_movable_primitives() {
        let proxy = material(MaterialProperties::default());
        let vf = vertex_factory();
        let mesh = MeshBatch::new(&vf, &proxy, vec![MeshBatchElement::default()]);
        let settings = RendererSettings::default();
        let caps = LightingCapabilities {
            use_volumetric_lightmap: true,
            ..opaque_caps()
        };
        let tag = select_light_map_policy(&mesh, Some(&movable_primitive()), FeatureLevel::Sm5, false, caps, &settings);
        assert_eq!(tag, LightMapPolicyTag::PrecomputedIrradianceVolumeIndirectLighting);

        let tag = select_light_map_policy(&mesh, Some(&movable_primitive()), FeatureLevel::Sm5, true, caps, &settings);
        assert_eq!(tag, LightMapPolicyTag::SimpleStationaryVolumetricLightmapShadowLighting);
    }

    #[test]
    fn simple_forward_subtree() {
        let proxy = material(MaterialProperties::default());
        let vf = vertex_factory();
        let settings = RendererSettings::default();

        let lci = lightmapped(false);
        let mesh = MeshBatch::new(&vf, &proxy, vec![MeshBatchElement::default()]).with_light_cache(&lci);
        let tag = select_light_map_policy(&mesh, None, FeatureLevel::Sm5, true, opaque_caps(), &settings);
        assert_eq!(tag, LightMapPolicyTag::SimpleLightmapOnlyLighting);

        let lci = lightmapped(true);
        let mesh = MeshBatch::new(&vf, &proxy, vec![MeshBatchElement::default()]).with_light_cache(&lci);
        let tag = select_light_map_policy(&mesh, None, FeatureLevel::Sm5, true, opaque_caps(), &settings);
        assert_eq!(tag, LightMapPolicyTag::SimpleStationaryPrecomputedShadowLighting);

        let bare = MeshBatch::new(&vf, &proxy, vec![MeshBatchElement::default()]);
        let no_cache = RendererSettings {
            indirect_lighting_cache: false,
            ..Default::default()
        };
        let tag = select_light_map_policy(&bare, None, FeatureLevel::Sm5, true, opaque_caps(), &no_cache);
        assert_eq!(tag, LightMapPolicyTag::SimpleDirectionalLightLighting);

        let tag = select_light_map_policy(&bare, Some(&movable_primitive()), FeatureLevel::Sm5, true, opaque_caps(), &settings);
        assert_eq!(tag, LightMapPolicyTag::SimpleStationarySingleSampleShadowLighting);

        // Without a primitive there is no cache to sample.
        let tag = select_light_map_policy(&bare, None, FeatureLevel::Sm5, true, opaque_caps(), &settings);
        assert_eq!(tag, LightMapPolicyTag::SimpleDirectionalLightLighting);
    }

    #[test]
    fn self_shadowed_translucency() {
        let proxy = material(MaterialProperties {
            blend_mode: BlendMode::Translucent,
            ..Default::default()
        });
        let vf = vertex_factory();
        let mesh = MeshBatch::new(&vf, &proxy, vec![MeshBatchElement::default()]);
        let settings = RendererSettings::default();
        let caps = LightingCapabilities {
            allow_cache_volume_texture: false,
            use_translucent_self_shadowing: true,
            ..opaque_caps()
        };

        let tag = select_light_map_policy(&mesh, None, FeatureLevel::Sm5, false, caps, &settings);
        assert_eq!(tag, LightMapPolicyTag::SelfShadowedTranslucency);

        let primitive = movable_primitive();
        let tag = select_light_map_policy(&mesh, Some(&primitive), FeatureLevel::Sm5, false, caps, &settings);
        assert_eq!(tag, LightMapPolicyTag::SelfShadowedCachedPointIndirectLighting);

        let volumetric = LightingCapabilities {
            use_volumetric_lightmap: true,
            ..caps
        };
        let tag = select_light_map_policy(&mesh, Some(&primitive), FeatureLevel::Sm5, false, volumetric, &settings);
        assert_eq!(tag, LightMapPolicyTag::SelfShadowedVolumetricLightmap);
        let tag = select_light_map_policy(&mesh, None, FeatureLevel::Sm5, false, volumetric, &settings);
        assert_eq!(tag, LightMapPolicyTag::SelfShadowedTranslucency);
    }

    #[test]
    fn density_policy() {
        let proxy = material(MaterialProperties::default());
        let vf = vertex_factory();
        let settings = RendererSettings::default();
        let lci = lightmapped(false);
        let mesh = MeshBatch::new(&vf, &proxy, vec![MeshBatchElement::default()]).with_light_cache(&lci);
        let lit = MaterialProperties::default();
        assert_eq!(
            select_light_map_density_policy(&mesh, None, &lit, FeatureLevel::Sm5, &settings),
            LightMapPolicyTag::HqLightmap
        );
        let bare = MeshBatch::new(&vf, &proxy, vec![MeshBatchElement::default()]);
        assert_eq!(
            select_light_map_density_policy(&bare, None, &lit, FeatureLevel::Sm5, &settings),
            LightMapPolicyTag::DummyDensity
        );
    }
}

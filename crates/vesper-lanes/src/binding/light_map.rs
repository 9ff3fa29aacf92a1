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

//! Binding of the static and indirect lighting inputs a light-map policy reads.

use super::ShaderBinder;
use vesper_core::renderer::{
    CommandList, LightCacheInterface, LightMapPolicyTag, SamplerId, ShaderParameter, TextureId, UniformBufferId,
};
use vesper_core::scene::{PrimitiveSceneInfo, SceneView};

/// Translucency self-shadowing inputs of one mesh element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslucentSelfShadow {
    /// Projection parameters of the self-shadow map.
    pub uniform_buffer: UniformBufferId,
    /// The self-shadow depth texture.
    pub depth_texture: TextureId,
}

/// Per-element light-map data carried alongside a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightMapElementData {
    /// Self-shadowing of translucent meshes, when the pass renders it.
    pub self_shadow: Option<TranslucentSelfShadow>,
}

/// Policies whose shaders sample the high quality lightmap coefficients.
fn reads_high_quality_lightmap(tag: LightMapPolicyTag) -> bool {
    matches!(
        tag,
        LightMapPolicyTag::HqLightmap
            | LightMapPolicyTag::DistanceFieldShadowsAndHqLightmap
            | LightMapPolicyTag::SimpleLightmapOnlyLighting
            | LightMapPolicyTag::SimpleStationaryPrecomputedShadowLighting
    )
}

/// Binds the per-view lighting inputs of `tag`.
pub fn bind_light_map_shared(binder: &mut ShaderBinder<'_>, cmd: &mut dyn CommandList, tag: LightMapPolicyTag, view: &SceneView) {
    let sampler = view.global_resources.default_sampler;
    if tag.uses_cache_volume() {
        if let Some([band0, band1, band2]) = view.indirect_lighting_cache_volumes {
            binder.set_texture(cmd, ShaderParameter::IndirectLightingCacheVolume0, band0, sampler);
            binder.set_texture(cmd, ShaderParameter::IndirectLightingCacheVolume1, band1, sampler);
            binder.set_texture(cmd, ShaderParameter::IndirectLightingCacheVolume2, band2, sampler);
        }
    }
    if tag.uses_volumetric_lightmap() {
        if let Some(bricks) = view.volumetric_lightmap_brick_texture {
            binder.set_texture(cmd, ShaderParameter::VolumetricLightmapBrickTexture, bricks, sampler);
        }
    }
    if tag.is_mobile() {
        if let Some(light) = view.mobile_directional_light_uniform_buffer {
            binder.set_uniform_buffer(cmd, ShaderParameter::MobileDirectionalLight, light);
        }
    }
}

/// Binds the per-mesh lighting inputs of `tag`.
///
/// Anything the mesh does not carry is left unbound and picked up by the
/// fallback pass of the binder.
pub fn bind_light_map_mesh(
    binder: &mut ShaderBinder<'_>,
    cmd: &mut dyn CommandList,
    tag: LightMapPolicyTag,
    light_cache: Option<&LightCacheInterface>,
    primitive: Option<&PrimitiveSceneInfo>,
    data: &LightMapElementData,
    sampler: SamplerId,
) {
    if let Some(lci) = light_cache {
        if let Some(buffer) = lci.precomputed_lighting_buffer {
            binder.set_uniform_buffer(cmd, ShaderParameter::PrecomputedLighting, buffer);
        }
        if tag.uses_texture_lightmap() {
            let light_map = &lci.light_map;
            if let Some(texture) = light_map.texture_for(reads_high_quality_lightmap(tag)) {
                binder.set_texture(cmd, ShaderParameter::LightMapTexture, texture, sampler);
            }
            if let Some(texture) = light_map.sky_occlusion_texture {
                binder.set_texture(cmd, ShaderParameter::SkyOcclusionTexture, texture, sampler);
            }
            binder.set_value(cmd, ShaderParameter::LightMapCoordinateScaleBias, &light_map.coordinate_scale_bias);
        }
        if tag.uses_shadow_map_texture() {
            if let Some(texture) = lci.shadow_map.texture {
                binder.set_texture(cmd, ShaderParameter::StaticShadowTexture, texture, sampler);
            }
            binder.set_value(cmd, ShaderParameter::ShadowMapCoordinateScaleBias, &lci.shadow_map.coordinate_scale_bias);
        }
    }

    if tag.uses_cache_volume() || tag.uses_cache_point_sample() {
        if let Some(allocation) = primitive.and_then(|p| p.indirect_lighting_cache_allocation) {
            if let Some(buffer) = allocation.uniform_buffer {
                binder.set_uniform_buffer(cmd, ShaderParameter::IndirectLightingCache, buffer);
            }
            if let Some(samples) = allocation.point_samples {
                binder.set_buffer(cmd, ShaderParameter::PointIndirectLightingSamples, samples);
            }
        }
    }

    if let Some(self_shadow) = data.self_shadow.filter(|_| tag.is_self_shadowed()) {
        binder.set_uniform_buffer(cmd, ShaderParameter::TranslucentSelfShadow, self_shadow.uniform_buffer);
        binder.set_texture(cmd, ShaderParameter::TranslucentSelfShadowDepth, self_shadow.depth_texture, sampler);
    }
}

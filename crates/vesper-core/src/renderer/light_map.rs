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

//! Light-map policy tags and the static lighting data a mesh carries.
//!
//! A [`LightMapPolicyTag`] names the static/indirect lighting input path a shader
//! permutation consumes. Exactly one tag applies per drawn mesh element. The tag set
//! is closed: every `match` over it is exhaustive, so adding a tag forces every
//! predicate, binding and selector site to handle it.

use crate::renderer::api::resource::{TextureId, UniformBufferId};
use glam::Vec4;

/// Which static/indirect lighting path a base-pass permutation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LightMapPolicyTag {
    /// No static lighting at all.
    NoLightmap,
    /// Indirect lighting sampled from the precomputed irradiance volume.
    PrecomputedIrradianceVolumeIndirectLighting,
    /// Indirect lighting interpolated from an indirect-lighting-cache volume texture.
    CachedVolumeIndirectLighting,
    /// Indirect lighting from a single indirect-lighting-cache SH sample.
    CachedPointIndirectLighting,

    /// Simple forward, no static lighting.
    SimpleNoLightmap,
    /// Simple forward, baked lightmap only.
    SimpleLightmapOnlyLighting,
    /// Simple forward, dynamic directional light only.
    SimpleDirectionalLightLighting,
    /// Simple forward, baked lightmap plus precomputed stationary shadow.
    SimpleStationaryPrecomputedShadowLighting,
    /// Simple forward, indirect-lighting-cache SH sample plus stationary shadow.
    SimpleStationarySingleSampleShadowLighting,
    /// Simple forward, volumetric lightmap plus stationary shadow.
    SimpleStationaryVolumetricLightmapShadowLighting,

    /// Low quality texture lightmap.
    LqLightmap,
    /// High quality texture lightmap.
    HqLightmap,
    /// High quality texture lightmap plus a distance-field shadow mask.
    DistanceFieldShadowsAndHqLightmap,

    /// Translucency self shadowing, no static lighting.
    SelfShadowedTranslucency,
    /// Translucency self shadowing plus an indirect-lighting-cache SH sample.
    SelfShadowedCachedPointIndirectLighting,
    /// Translucency self shadowing plus the volumetric lightmap.
    SelfShadowedVolumetricLightmap,

    /// Mobile, distance-field shadows and low quality lightmap.
    MobileDistanceFieldShadowsAndLqLightmap,
    /// Mobile, distance-field shadows, lightmap and dynamic cascaded shadows.
    MobileDistanceFieldShadowsLightmapAndCsm,
    /// Mobile, stationary directional light and SH indirect lighting.
    MobileDirectionalLightAndShIndirect,
    /// Mobile, movable directional light and SH indirect lighting.
    MobileMovableDirectionalLightAndShIndirect,
    /// Mobile, stationary directional light with cascaded shadows and SH indirect lighting.
    MobileDirectionalLightCsmAndShIndirect,
    /// Mobile, movable directional light with cascaded shadows and SH indirect lighting.
    MobileMovableDirectionalLightCsmAndShIndirect,
    /// Mobile, movable directional light without shadows or indirect lighting.
    MobileMovableDirectionalLight,
    /// Mobile, movable directional light with cascaded shadows.
    MobileMovableDirectionalLightCsm,
    /// Mobile, movable directional light and lightmap.
    MobileMovableDirectionalLightWithLightmap,
    /// Mobile, movable directional light with cascaded shadows and lightmap.
    MobileMovableDirectionalLightCsmWithLightmap,

    /// Light-map density visualisation of a mesh that has no lightmap.
    DummyDensity,
}

impl LightMapPolicyTag {
    /// Every tag, in declaration order.
    pub const ALL: [LightMapPolicyTag; 27] = [
        LightMapPolicyTag::NoLightmap,
        LightMapPolicyTag::PrecomputedIrradianceVolumeIndirectLighting,
        LightMapPolicyTag::CachedVolumeIndirectLighting,
        LightMapPolicyTag::CachedPointIndirectLighting,
        LightMapPolicyTag::SimpleNoLightmap,
        LightMapPolicyTag::SimpleLightmapOnlyLighting,
        LightMapPolicyTag::SimpleDirectionalLightLighting,
        LightMapPolicyTag::SimpleStationaryPrecomputedShadowLighting,
        LightMapPolicyTag::SimpleStationarySingleSampleShadowLighting,
        LightMapPolicyTag::SimpleStationaryVolumetricLightmapShadowLighting,
        LightMapPolicyTag::LqLightmap,
        LightMapPolicyTag::HqLightmap,
        LightMapPolicyTag::DistanceFieldShadowsAndHqLightmap,
        LightMapPolicyTag::SelfShadowedTranslucency,
        LightMapPolicyTag::SelfShadowedCachedPointIndirectLighting,
        LightMapPolicyTag::SelfShadowedVolumetricLightmap,
        LightMapPolicyTag::MobileDistanceFieldShadowsAndLqLightmap,
        LightMapPolicyTag::MobileDistanceFieldShadowsLightmapAndCsm,
        LightMapPolicyTag::MobileDirectionalLightAndShIndirect,
        LightMapPolicyTag::MobileMovableDirectionalLightAndShIndirect,
        LightMapPolicyTag::MobileDirectionalLightCsmAndShIndirect,
        LightMapPolicyTag::MobileMovableDirectionalLightCsmAndShIndirect,
        LightMapPolicyTag::MobileMovableDirectionalLight,
        LightMapPolicyTag::MobileMovableDirectionalLightCsm,
        LightMapPolicyTag::MobileMovableDirectionalLightWithLightmap,
        LightMapPolicyTag::MobileMovableDirectionalLightCsmWithLightmap,
        LightMapPolicyTag::DummyDensity,
    ];

    /// Tags only compiled for the simple forward shading path.
    pub fn is_simple_forward(self) -> bool {
        matches!(
            self,
            LightMapPolicyTag::SimpleNoLightmap
                | LightMapPolicyTag::SimpleLightmapOnlyLighting
                | LightMapPolicyTag::SimpleDirectionalLightLighting
                | LightMapPolicyTag::SimpleStationaryPrecomputedShadowLighting
                | LightMapPolicyTag::SimpleStationarySingleSampleShadowLighting
                | LightMapPolicyTag::SimpleStationaryVolumetricLightmapShadowLighting
        )
    }

    /// Tags only compiled for the mobile base pass.
    pub fn is_mobile(self) -> bool {
        matches!(
            self,
            LightMapPolicyTag::MobileDistanceFieldShadowsAndLqLightmap
                | LightMapPolicyTag::MobileDistanceFieldShadowsLightmapAndCsm
                | LightMapPolicyTag::MobileDirectionalLightAndShIndirect
                | LightMapPolicyTag::MobileMovableDirectionalLightAndShIndirect
                | LightMapPolicyTag::MobileDirectionalLightCsmAndShIndirect
                | LightMapPolicyTag::MobileMovableDirectionalLightCsmAndShIndirect
                | LightMapPolicyTag::MobileMovableDirectionalLight
                | LightMapPolicyTag::MobileMovableDirectionalLightCsm
                | LightMapPolicyTag::MobileMovableDirectionalLightWithLightmap
                | LightMapPolicyTag::MobileMovableDirectionalLightCsmWithLightmap
        )
    }

    /// Tags that combine static lighting with translucency self shadowing.
    pub fn is_self_shadowed(self) -> bool {
        matches!(
            self,
            LightMapPolicyTag::SelfShadowedTranslucency
                | LightMapPolicyTag::SelfShadowedCachedPointIndirectLighting
                | LightMapPolicyTag::SelfShadowedVolumetricLightmap
        )
    }

    /// Simple forward permutations always need sky light support.
    pub fn requires_sky_light(self) -> bool {
        self.is_simple_forward()
    }

    /// Reads a baked texture lightmap.
    pub fn uses_texture_lightmap(self) -> bool {
        matches!(
            self,
            LightMapPolicyTag::LqLightmap
                | LightMapPolicyTag::HqLightmap
                | LightMapPolicyTag::DistanceFieldShadowsAndHqLightmap
                | LightMapPolicyTag::SimpleLightmapOnlyLighting
                | LightMapPolicyTag::SimpleStationaryPrecomputedShadowLighting
                | LightMapPolicyTag::MobileDistanceFieldShadowsAndLqLightmap
                | LightMapPolicyTag::MobileDistanceFieldShadowsLightmapAndCsm
                | LightMapPolicyTag::MobileMovableDirectionalLightWithLightmap
                | LightMapPolicyTag::MobileMovableDirectionalLightCsmWithLightmap
        )
    }

    /// Reads a baked static shadow-map texture.
    pub fn uses_shadow_map_texture(self) -> bool {
        matches!(
            self,
            LightMapPolicyTag::DistanceFieldShadowsAndHqLightmap
                | LightMapPolicyTag::SimpleStationaryPrecomputedShadowLighting
                | LightMapPolicyTag::MobileDistanceFieldShadowsAndLqLightmap
                | LightMapPolicyTag::MobileDistanceFieldShadowsLightmapAndCsm
        )
    }

    /// Reads an indirect-lighting-cache volume texture.
    pub fn uses_cache_volume(self) -> bool {
        matches!(self, LightMapPolicyTag::CachedVolumeIndirectLighting)
    }

    /// Reads a single indirect-lighting-cache SH sample.
    pub fn uses_cache_point_sample(self) -> bool {
        matches!(
            self,
            LightMapPolicyTag::CachedPointIndirectLighting
                | LightMapPolicyTag::SelfShadowedCachedPointIndirectLighting
                | LightMapPolicyTag::SimpleStationarySingleSampleShadowLighting
                | LightMapPolicyTag::MobileDirectionalLightAndShIndirect
                | LightMapPolicyTag::MobileMovableDirectionalLightAndShIndirect
                | LightMapPolicyTag::MobileDirectionalLightCsmAndShIndirect
                | LightMapPolicyTag::MobileMovableDirectionalLightCsmAndShIndirect
        )
    }

    /// Reads the volumetric lightmap.
    pub fn uses_volumetric_lightmap(self) -> bool {
        matches!(
            self,
            LightMapPolicyTag::PrecomputedIrradianceVolumeIndirectLighting
                | LightMapPolicyTag::SelfShadowedVolumetricLightmap
                | LightMapPolicyTag::SimpleStationaryVolumetricLightmapShadowLighting
        )
    }

    /// Uses dynamic cascaded shadow maps (mobile only).
    pub fn uses_csm(self) -> bool {
        matches!(
            self,
            LightMapPolicyTag::MobileDistanceFieldShadowsLightmapAndCsm
                | LightMapPolicyTag::MobileDirectionalLightCsmAndShIndirect
                | LightMapPolicyTag::MobileMovableDirectionalLightCsmAndShIndirect
                | LightMapPolicyTag::MobileMovableDirectionalLightCsm
                | LightMapPolicyTag::MobileMovableDirectionalLightCsmWithLightmap
        )
    }

    /// Lit by a movable directional light (mobile only).
    pub fn uses_movable_directional_light(self) -> bool {
        matches!(
            self,
            LightMapPolicyTag::MobileMovableDirectionalLightAndShIndirect
                | LightMapPolicyTag::MobileMovableDirectionalLightCsmAndShIndirect
                | LightMapPolicyTag::MobileMovableDirectionalLight
                | LightMapPolicyTag::MobileMovableDirectionalLightCsm
                | LightMapPolicyTag::MobileMovableDirectionalLightWithLightmap
                | LightMapPolicyTag::MobileMovableDirectionalLightCsmWithLightmap
        )
    }
}

/// Kind of baked light-map data available for a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightMapInteractionType {
    /// Nothing baked.
    #[default]
    None,
    /// A baked texture lightmap.
    Texture,
}

/// Baked light-map data for one mesh.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightMapInteraction {
    /// What was baked.
    pub kind: LightMapInteractionType,
    /// `false` when the lightmap was only encoded at low quality.
    pub allows_high_quality: bool,
    /// High quality coefficient texture.
    pub hq_texture: Option<TextureId>,
    /// Low quality coefficient texture.
    pub lq_texture: Option<TextureId>,
    /// Baked sky occlusion, if any.
    pub sky_occlusion_texture: Option<TextureId>,
    /// UV scale (xy) and bias (zw) into the lightmap atlas.
    pub coordinate_scale_bias: Vec4,
}

impl LightMapInteraction {
    /// A baked texture lightmap.
    pub fn texture(hq_texture: TextureId, lq_texture: TextureId, allows_high_quality: bool, coordinate_scale_bias: Vec4) -> Self {
        Self {
            kind: LightMapInteractionType::Texture,
            allows_high_quality,
            hq_texture: Some(hq_texture),
            lq_texture: Some(lq_texture),
            sky_occlusion_texture: None,
            coordinate_scale_bias,
        }
    }

    /// The texture a shader of the given quality samples.
    pub fn texture_for(&self, high_quality: bool) -> Option<TextureId> {
        if high_quality {
            self.hq_texture
        } else {
            self.lq_texture
        }
    }
}

/// Kind of baked shadow-map data available for a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadowMapInteractionType {
    /// Nothing baked.
    #[default]
    None,
    /// A baked distance-field shadow texture.
    Texture,
}

/// Baked shadow-map data for one mesh.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShadowMapInteraction {
    /// What was baked.
    pub kind: ShadowMapInteractionType,
    /// The shadow texture.
    pub texture: Option<TextureId>,
    /// UV scale (xy) and bias (zw) into the shadow-map atlas.
    pub coordinate_scale_bias: Vec4,
}

impl ShadowMapInteraction {
    /// A baked shadow texture.
    pub fn texture(texture: TextureId, coordinate_scale_bias: Vec4) -> Self {
        Self {
            kind: ShadowMapInteractionType::Texture,
            texture: Some(texture),
            coordinate_scale_bias,
        }
    }
}

/// Everything static lighting knows about one mesh: its baked light and shadow maps
/// and the uniform buffer holding its precomputed lighting parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightCacheInterface {
    /// Baked light map.
    pub light_map: LightMapInteraction,
    /// Baked shadow map.
    pub shadow_map: ShadowMapInteraction,
    /// Per-mesh precomputed lighting uniform buffer.
    pub precomputed_lighting_buffer: Option<UniformBufferId>,
}

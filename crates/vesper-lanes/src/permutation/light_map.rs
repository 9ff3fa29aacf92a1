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

use super::PermutationContext;
use vesper_core::renderer::{FeatureLevel, LightMapPolicyTag};

/// Returns `true` if base-pass permutations using `tag` are compiled for the
/// material and vertex factory in `ctx`.
///
/// Any selector choosing a tag must only choose one whose predicate holds for the
/// mesh being drawn.
pub fn light_map_policy_should_compile(tag: LightMapPolicyTag, ctx: &PermutationContext<'_>) -> bool {
    use LightMapPolicyTag::*;

    let settings = ctx.settings;
    let material = ctx.material;
    let lit = material.is_lit();
    let translucent = material.is_translucent();
    let static_lighting = settings.static_lighting_enabled();
    let lightmap_uvs = ctx.vertex_factory.supports_static_lighting;
    let cache = settings.indirect_lighting_cache || settings.support_all_shader_permutations;
    let mobile = ctx.platform.is_mobile();
    let simple = ctx.simple_forward();
    let deferred = ctx.supports(FeatureLevel::Sm4) && !simple;
    let lq = settings.low_quality_lightmaps_enabled();
    let movable_light = settings.mobile_allow_movable_directional_lights;
    let static_and_csm = settings.mobile_enable_static_and_csm_shadow_receivers;

    match tag {
        NoLightmap => true,

        PrecomputedIrradianceVolumeIndirectLighting => deferred && lit && static_lighting,
        // Translucency always reads a point sample.
        CachedVolumeIndirectLighting => deferred && lit && cache && !translucent,
        CachedPointIndirectLighting => deferred && lit && cache,

        SimpleNoLightmap => simple,
        SimpleLightmapOnlyLighting | SimpleStationaryPrecomputedShadowLighting => {
            simple && lit && static_lighting && lightmap_uvs
        }
        SimpleDirectionalLightLighting => simple && lit,
        SimpleStationarySingleSampleShadowLighting => simple && lit && static_lighting && cache,
        SimpleStationaryVolumetricLightmapShadowLighting => simple && lit && static_lighting,

        // Also the plain lightmap path of the mobile base pass.
        LqLightmap => !simple && lit && static_lighting && lightmap_uvs && lq,
        HqLightmap | DistanceFieldShadowsAndHqLightmap => {
            deferred
                && lit
                && static_lighting
                && lightmap_uvs
                && settings.high_quality_lightmaps_enabled()
        }

        SelfShadowedTranslucency => deferred && lit && translucent,
        SelfShadowedCachedPointIndirectLighting => {
            deferred && lit && translucent && static_lighting && cache
        }
        SelfShadowedVolumetricLightmap => deferred && lit && translucent && static_lighting,

        MobileDistanceFieldShadowsAndLqLightmap => {
            mobile && lit && static_lighting && lightmap_uvs && lq
        }
        MobileDistanceFieldShadowsLightmapAndCsm => {
            mobile && lit && static_lighting && lightmap_uvs && lq && static_and_csm
        }
        MobileDirectionalLightAndShIndirect => mobile && lit && static_lighting && cache,
        MobileDirectionalLightCsmAndShIndirect => {
            mobile && lit && static_lighting && cache && static_and_csm
        }
        MobileMovableDirectionalLightAndShIndirect
        | MobileMovableDirectionalLightCsmAndShIndirect => {
            mobile && lit && static_lighting && cache && movable_light
        }
        MobileMovableDirectionalLight | MobileMovableDirectionalLightCsm => {
            mobile && lit && movable_light
        }
        MobileMovableDirectionalLightWithLightmap
        | MobileMovableDirectionalLightCsmWithLightmap => {
            mobile && lit && movable_light && static_lighting && lightmap_uvs && lq
        }

        DummyDensity => settings.allow_debug_viewmodes && !mobile,
    }
}

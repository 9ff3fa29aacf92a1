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

//! Light-map policy selection for the mobile base pass.

use super::{texture_light_map, uses_indirect_lighting_cache};
use crate::permutation::MAX_MOBILE_POINT_LIGHTS;
use vesper_core::renderer::{LightMapPolicyTag, MobilePointLights, ShadowMapInteractionType};
use vesper_core::scene::{MeshBatch, PrimitiveSceneInfo};
use vesper_core::settings::RendererSettings;

/// The scene's mobile directional light, as the selector sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MobileDirectionalLight {
    /// The light has baked (stationary) shadowing.
    pub has_static_shadowing: bool,
    /// Dynamic objects receive cascaded shadows from it.
    pub use_csm_for_dynamic_objects: bool,
    /// The light renders whole-scene dynamic shadows.
    pub casts_dynamic_shadows: bool,
}

/// Chooses the light-map policy of a mesh for the mobile base pass.
///
/// `directional_light` is the scene's mobile directional light, if any.
pub fn select_mobile_light_map_policy(
    mesh: &MeshBatch<'_>,
    primitive: Option<&PrimitiveSceneInfo>,
    directional_light: Option<&MobileDirectionalLight>,
    settings: &RendererSettings,
) -> LightMapPolicyTag {
    let material = mesh.material_render_proxy.material().properties();
    if !material.is_lit() {
        return LightMapPolicyTag::NoLightmap;
    }

    let receives_csm = primitive.is_some_and(|p| p.receives_csm);
    let movable_light = directional_light.is_some_and(|light| !light.has_static_shadowing)
        && settings.mobile_allow_movable_directional_lights;
    let movable_csm = movable_light && directional_light.is_some_and(|light| light.casts_dynamic_shadows);
    let static_and_csm = directional_light.is_some_and(|light| light.use_csm_for_dynamic_objects)
        && settings.mobile_enable_static_and_csm_shadow_receivers
        && receives_csm;

    let light_map = texture_light_map(mesh, primitive, settings).filter(|_| settings.support_low_quality_lightmaps);
    if let Some(lci) = light_map {
        return match (movable_light, movable_csm) {
            (true, true) => LightMapPolicyTag::MobileMovableDirectionalLightCsmWithLightmap,
            (true, false) => LightMapPolicyTag::MobileMovableDirectionalLightWithLightmap,
            (false, _) if lci.shadow_map.kind == ShadowMapInteractionType::Texture => {
                if static_and_csm {
                    LightMapPolicyTag::MobileDistanceFieldShadowsLightmapAndCsm
                } else {
                    LightMapPolicyTag::MobileDistanceFieldShadowsAndLqLightmap
                }
            }
            (false, _) => LightMapPolicyTag::LqLightmap,
        };
    }

    let cache_allowed = settings.allow_static_lighting && settings.indirect_lighting_cache;
    if cache_allowed && primitive.is_some_and(uses_indirect_lighting_cache) {
        return match (movable_light, movable_csm, static_and_csm) {
            (true, true, _) => LightMapPolicyTag::MobileMovableDirectionalLightCsmAndShIndirect,
            (true, false, _) => LightMapPolicyTag::MobileMovableDirectionalLightAndShIndirect,
            (false, _, true) => LightMapPolicyTag::MobileDirectionalLightCsmAndShIndirect,
            (false, _, false) => LightMapPolicyTag::MobileDirectionalLightAndShIndirect,
        };
    }

    match (movable_light, movable_csm) {
        (true, true) => LightMapPolicyTag::MobileMovableDirectionalLightCsm,
        (true, false) => LightMapPolicyTag::MobileMovableDirectionalLight,
        (false, _) => LightMapPolicyTag::NoLightmap,
    }
}

/// The dynamic point light permutation of a mobile base pass pixel shader.
///
/// Unlit materials, and lit ones with no light in range, use the zero-light
/// permutation. Otherwise the count is clamped to the configured maximum unless
/// the project uses a single dynamic-branch permutation.
pub fn mobile_point_light_permutation(lit: bool, num_lights: u8, settings: &RendererSettings) -> MobilePointLights {
    let max = settings.mobile_num_dynamic_point_lights.min(MAX_MOBILE_POINT_LIGHTS);
    if !lit || num_lights == 0 || max == 0 {
        MobilePointLights::Fixed(0)
    } else if settings.mobile_dynamic_point_lights_use_static_branch {
        MobilePointLights::DynamicBranch
    } else {
        MobilePointLights::Fixed(num_lights.min(max))
    }
}

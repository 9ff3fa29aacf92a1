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

//! Project and console settings consulted by the compile predicates, the policy
//! selectors and the passes.

use serde::{Deserialize, Serialize};

/// Which meshes the depth prepass draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DepthDrawingMode {
    /// No depth prepass.
    None,
    /// Opaque meshes only, masked meshes are skipped.
    #[default]
    NonMaskedOnly,
    /// Opaque and masked meshes that are flagged as occluders.
    AllOccluders,
    /// Every opaque and masked mesh.
    AllOpaque,
}

/// Renderer-wide settings.
///
/// Missing fields deserialize to their defaults, so a settings file only needs the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    /// Static lighting is enabled for the project.
    pub allow_static_lighting: bool,
    /// Low quality lightmap permutations are compiled.
    pub support_low_quality_lightmaps: bool,
    /// High quality lightmap permutations are compiled (non-mobile platforms).
    pub support_high_quality_lightmaps: bool,
    /// Atmospheric fog permutations are compiled.
    pub support_atmospheric_fog: bool,
    /// Stationary sky light permutations are compiled for lit materials.
    pub support_stationary_skylight: bool,
    /// Compile every permutation regardless of the project toggles above.
    pub support_all_shader_permutations: bool,
    /// The indirect lighting cache is enabled.
    pub indirect_lighting_cache: bool,
    /// Use the simple forward shading path on desktop platforms.
    pub simple_forward_shading: bool,
    /// Mobile: static shadowing combined with dynamic cascaded shadows.
    pub mobile_enable_static_and_csm_shadow_receivers: bool,
    /// Mobile: movable directional lights are supported.
    pub mobile_allow_movable_directional_lights: bool,
    /// Mobile: maximum dynamic point lights per primitive.
    pub mobile_num_dynamic_point_lights: u8,
    /// Mobile: one dynamic-branch permutation instead of one per light count.
    pub mobile_dynamic_point_lights_use_static_branch: bool,
    /// Debug view modes (shader complexity, light-map density) are available.
    pub allow_debug_viewmodes: bool,
    /// Depth prepass mode.
    pub early_z_pass: DepthDrawingMode,
    /// Translucent primitives are pickable.
    pub allow_translucent_hit_proxies: bool,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            allow_static_lighting: true,
            support_low_quality_lightmaps: true,
            support_high_quality_lightmaps: true,
            support_atmospheric_fog: true,
            support_stationary_skylight: true,
            support_all_shader_permutations: false,
            indirect_lighting_cache: true,
            simple_forward_shading: false,
            mobile_enable_static_and_csm_shadow_receivers: true,
            mobile_allow_movable_directional_lights: true,
            mobile_num_dynamic_point_lights: 4,
            mobile_dynamic_point_lights_use_static_branch: true,
            allow_debug_viewmodes: true,
            early_z_pass: DepthDrawingMode::NonMaskedOnly,
            allow_translucent_hit_proxies: false,
        }
    }
}

impl RendererSettings {
    /// Low quality lightmaps, honoring the all-permutations override.
    pub fn low_quality_lightmaps_enabled(&self) -> bool {
        self.support_low_quality_lightmaps || self.support_all_shader_permutations
    }

    /// High quality lightmaps, honoring the all-permutations override.
    pub fn high_quality_lightmaps_enabled(&self) -> bool {
        self.support_high_quality_lightmaps || self.support_all_shader_permutations
    }

    /// Atmospheric fog, honoring the all-permutations override.
    pub fn atmospheric_fog_enabled(&self) -> bool {
        self.support_atmospheric_fog || self.support_all_shader_permutations
    }

    /// Stationary sky light, honoring the all-permutations override.
    pub fn stationary_skylight_enabled(&self) -> bool {
        self.support_stationary_skylight || self.support_all_shader_permutations
    }

    /// Static lighting, honoring the all-permutations override.
    pub fn static_lighting_enabled(&self) -> bool {
        self.allow_static_lighting || self.support_all_shader_permutations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_ron_keeps_defaults() {
        let settings: RendererSettings =
            ron::from_str("(simple_forward_shading: true, early_z_pass: AllOpaque)")
                .expect("valid settings");
        assert!(settings.simple_forward_shading);
        assert_eq!(settings.early_z_pass, DepthDrawingMode::AllOpaque);
        assert!(settings.allow_static_lighting);
        assert_eq!(settings.mobile_num_dynamic_point_lights, 4);
    }

    #[test]
    fn all_permutations_override_project_toggles() {
        let settings = RendererSettings {
            support_low_quality_lightmaps: false,
            support_atmospheric_fog: false,
            support_all_shader_permutations: true,
            ..Default::default()
        };
        assert!(settings.low_quality_lightmaps_enabled());
        assert!(settings.atmospheric_fog_enabled());
    }
}

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

use super::{frame_meshes, sort_back_to_front, FrameContext, FrameMesh, MeshPassLane, PassStats, Scene};
use crate::binding::LightMapElementData;
use crate::drawing_policy::{
    draw_mesh_with_policy, uses_atmospheric_fog, uses_sky_light, BasePassDrawingPolicy, BasePassOptions,
    SceneTextureMode,
};
use crate::selector::select_light_map_policy;
use vesper_core::material::MaterialDomain;
use vesper_core::renderer::{BlendState, CommandList, DepthStencilState};
use vesper_core::scene::ShowFlags;

/// Builds the translucency options of one mesh.
fn translucency_options(scene: &Scene<'_>, frame: &FrameContext<'_>, mesh: FrameMesh<'_, '_>) -> (BasePassOptions, LightMapElementData) {
    let view = frame.view;
    let settings = frame.settings;
    let material = mesh.batch.material_render_proxy.material().properties();
    let lighting = scene.lighting();
    let capabilities = scene.lighting_capabilities(material);
    let light_map = select_light_map_policy(
        mesh.batch,
        mesh.primitive,
        view.feature_level,
        settings.simple_forward_shading,
        capabilities,
        settings,
    );
    let sky_light = uses_sky_light(material, lighting.sky_light.map(|s| s.stationary), settings)
        || (light_map.requires_sky_light() && lighting.sky_light.is_some());
    let options = BasePassOptions {
        light_map,
        scene_texture_mode: SceneTextureMode::SetTextures,
        sky_light,
        atmospheric_fog: uses_atmospheric_fog(material, view, settings),
        receive_decal_output: false,
    };
    let data = LightMapElementData {
        self_shadow: lighting
            .translucent_self_shadow
            .filter(|_| capabilities.use_translucent_self_shadowing),
    };
    (options, data)
}

/// Translucent surfaces, sorted back to front and lit in the forward style.
///
/// Translucent meshes are never cached in static draw lists since their order
/// changes with the view.
#[derive(Debug, Default, Clone, Copy)]
pub struct TranslucencyLane;

impl MeshPassLane for TranslucencyLane {
    fn pass_name(&self) -> &'static str {
        "Translucency"
    }

    fn is_enabled(&self, frame: &FrameContext<'_>) -> bool {
        frame.view.show_flags.contains(ShowFlags::TRANSLUCENCY) && !frame.view.feature_level.is_mobile()
    }

    fn render(&self, scene: &Scene<'_>, frame: &FrameContext<'_>, cmd: &mut dyn CommandList) -> PassStats {
        let mut stats = PassStats::new(self.pass_name());
        let view = frame.view;
        let pass_state = frame.pass_state(BlendState::OPAQUE, DepthStencilState::DEPTH_READ);

        let mut meshes = frame_meshes(scene, view);
        meshes.retain(|mesh| {
            let material = mesh.batch.material_render_proxy.material().properties();
            material.domain == MaterialDomain::Surface && material.is_translucent()
        });
        sort_back_to_front(&mut meshes, view);

        for mesh in meshes {
            let proxy = mesh.batch.material_render_proxy;
            let (options, data) = translucency_options(scene, frame, mesh);
            let policy = BasePassDrawingPolicy::new(
                mesh.batch.vertex_factory,
                proxy,
                view.shader_platform,
                view.debug_view_mode,
                options,
            );
            if let Some(policy) = stats.record_policy(scene, proxy.id(), policy) {
                stats.record_mesh(draw_mesh_with_policy(
                    cmd,
                    &policy,
                    &pass_state,
                    view,
                    mesh.primitive,
                    mesh.batch,
                    &data,
                    frame.policy_context(),
                ));
            }
        }
        stats
    }
}

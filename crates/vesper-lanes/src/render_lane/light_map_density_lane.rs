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

use super::{shows_light_map_density, frame_meshes, FrameContext, MeshPassLane, PassStats, Scene};
use crate::binding::LightMapElementData;
use crate::drawing_policy::{draw_mesh_with_policy, LightMapDensityDrawingPolicy};
use crate::selector::select_light_map_density_policy;
use vesper_core::material::MaterialDomain;
use vesper_core::renderer::{BlendState, CommandList, DepthStencilState};

/// The light-map density visualisation. Replaces the base pass when the view
/// shows it, coloring every opaque surface by its lightmap texel density.
#[derive(Debug, Default, Clone, Copy)]
pub struct LightMapDensityLane;

impl MeshPassLane for LightMapDensityLane {
    fn pass_name(&self) -> &'static str {
        "LightMapDensity"
    }

    fn is_enabled(&self, frame: &FrameContext<'_>) -> bool {
        shows_light_map_density(frame)
    }

    fn render(&self, scene: &Scene<'_>, frame: &FrameContext<'_>, cmd: &mut dyn CommandList) -> PassStats {
        let mut stats = PassStats::new(self.pass_name());
        let view = frame.view;
        let pass_state = frame.pass_state(BlendState::OPAQUE, DepthStencilState::DEPTH_WRITE);

        for mesh in frame_meshes(scene, view) {
            let proxy = mesh.batch.material_render_proxy;
            let material = proxy.material().properties();
            if material.domain != MaterialDomain::Surface || material.is_translucent() {
                continue;
            }
            let shader_material = LightMapDensityDrawingPolicy::shader_material(proxy, scene.default_material());
            let light_map = select_light_map_density_policy(
                mesh.batch,
                mesh.primitive,
                shader_material.material().properties(),
                view.feature_level,
                frame.settings,
            );
            let policy = LightMapDensityDrawingPolicy::new(
                mesh.batch.vertex_factory,
                proxy,
                scene.default_material(),
                view.shader_platform,
                light_map,
            );
            if let Some(policy) = stats.record_policy(scene, proxy.id(), policy) {
                stats.record_mesh(draw_mesh_with_policy(
                    cmd,
                    &policy,
                    &pass_state,
                    view,
                    mesh.primitive,
                    mesh.batch,
                    &LightMapElementData::default(),
                    frame.policy_context(),
                ));
            }
        }
        stats
    }
}

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

use super::{depth_draw_list_for, BasePassDrawListType, FrameContext, MeshPassLane, PassStats, Scene};
use crate::drawing_policy::{draw_mesh_with_policy, DepthDrawingPolicy};
use vesper_core::renderer::{BlendComponent, BlendState, ColorWrites, CommandList, DepthStencilState};
use vesper_core::settings::DepthDrawingMode;

/// Depth-only passes write no color.
pub const DEPTH_ONLY_BLEND: BlendState = BlendState::color_only(ColorWrites::empty(), BlendComponent::REPLACE);

/// The depth prepass.
///
/// Draws opaque meshes, then masked ones, then this frame's dynamic meshes, into
/// depth only. Which meshes take part is decided by the depth drawing mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct DepthLane;

impl MeshPassLane for DepthLane {
    fn pass_name(&self) -> &'static str {
        "DepthPass"
    }

    fn is_enabled(&self, frame: &FrameContext<'_>) -> bool {
        frame.settings.early_z_pass != DepthDrawingMode::None
    }

    fn render(&self, scene: &Scene<'_>, frame: &FrameContext<'_>, cmd: &mut dyn CommandList) -> PassStats {
        let mut stats = PassStats::new(self.pass_name());
        let view = frame.view;
        let ctx = frame.policy_context();
        let pass_state = frame.pass_state(DEPTH_ONLY_BLEND, DepthStencilState::DEPTH_WRITE);

        for list in [BasePassDrawListType::Default, BasePassDrawListType::Masked] {
            stats.record_list(scene.depth_draw_list(list).draw_visible(cmd, view, &pass_state, ctx, scene));
        }

        for mesh in scene.dynamic_meshes() {
            let proxy = mesh.batch.material_render_proxy;
            let primitive = mesh.primitive.and_then(|id| scene.primitive(id));
            if depth_draw_list_for(proxy.material().properties(), primitive, frame.settings.early_z_pass).is_none() {
                continue;
            }
            let policy = DepthDrawingPolicy::new(
                mesh.batch.vertex_factory,
                proxy,
                scene.default_material(),
                view.shader_platform,
                view.allow_stencil_dither,
            );
            if let Some(policy) = stats.record_policy(scene, proxy.id(), policy) {
                stats.record_mesh(draw_mesh_with_policy(cmd, &policy, &pass_state, view, primitive, &mesh.batch, &(), ctx));
            }
        }
        stats
    }
}

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

use super::{frame_meshes, FrameContext, MeshPassLane, PassStats, Scene};
use crate::drawing_policy::{draw_mesh_with_policy, MeshDecalDrawingPolicy, STENCIL_RECEIVE_DECAL_MASK};
use vesper_core::renderer::{BlendState, CommandList, DepthStencilState, FeatureLevel};
use vesper_core::scene::ShowFlags;

/// Decal geometry blended into the G-buffer after the base pass.
///
/// Only pixels whose receive-decal stencil bit was written by the base pass are
/// touched.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeshDecalLane;

impl MeshPassLane for MeshDecalLane {
    fn pass_name(&self) -> &'static str {
        "MeshDecal"
    }

    fn is_enabled(&self, frame: &FrameContext<'_>) -> bool {
        frame.view.show_flags.contains(ShowFlags::DECALS)
            && frame.view.feature_level >= FeatureLevel::Sm4
            && !frame.settings.simple_forward_shading
    }

    fn render(&self, scene: &Scene<'_>, frame: &FrameContext<'_>, cmd: &mut dyn CommandList) -> PassStats {
        let mut stats = PassStats::new(self.pass_name());
        let view = frame.view;
        let mut pass_state = frame.pass_state(
            BlendState::OPAQUE,
            DepthStencilState::DEPTH_READ.with_stencil_test(STENCIL_RECEIVE_DECAL_MASK),
        );
        pass_state.set_stencil_ref(u32::from(STENCIL_RECEIVE_DECAL_MASK));

        for mesh in frame_meshes(scene, view) {
            let proxy = mesh.batch.material_render_proxy;
            if !proxy.material().is_deferred_decal() {
                continue;
            }
            let policy = MeshDecalDrawingPolicy::new(mesh.batch.vertex_factory, proxy, view.shader_platform);
            if let Some(policy) = stats.record_policy(scene, proxy.id(), policy) {
                stats.record_mesh(draw_mesh_with_policy(
                    cmd,
                    &policy,
                    &pass_state,
                    view,
                    mesh.primitive,
                    mesh.batch,
                    &(),
                    frame.policy_context(),
                ));
            }
        }
        stats
    }
}

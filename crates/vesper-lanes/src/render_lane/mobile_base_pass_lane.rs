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

use super::{frame_meshes, sort_back_to_front, FrameContext, MeshPassLane, PassStats, Scene};
use crate::binding::LightMapElementData;
use crate::drawing_policy::{draw_mesh_with_policy, MobileBasePassDrawingPolicy};
use crate::selector::{mobile_point_light_permutation, select_mobile_light_map_policy};
use vesper_core::material::MaterialDomain;
use vesper_core::renderer::{BlendState, CommandList, DepthStencilState};
use vesper_core::scene::ShowFlags;

/// The mobile forward base pass, in its opaque or its translucent flavour.
///
/// Mobile scenes keep no static draw lists; policies are built per frame and the
/// opaque flavour sorts them so equal policies draw back to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MobileBasePassLane {
    translucent: bool,
}

impl MobileBasePassLane {
    /// Opaque and masked surfaces.
    pub const fn opaque() -> Self {
        Self { translucent: false }
    }

    /// Translucent surfaces, back to front.
    pub const fn translucent() -> Self {
        Self { translucent: true }
    }

    /// Returns `true` for the translucent flavour.
    pub fn is_translucent(&self) -> bool {
        self.translucent
    }
}

impl MeshPassLane for MobileBasePassLane {
    fn pass_name(&self) -> &'static str {
        if self.translucent {
            "MobileTranslucency"
        } else {
            "MobileBasePass"
        }
    }

    fn is_enabled(&self, frame: &FrameContext<'_>) -> bool {
        frame.view.feature_level.is_mobile()
            && (!self.translucent || frame.view.show_flags.contains(ShowFlags::TRANSLUCENCY))
    }

    fn render(&self, scene: &Scene<'_>, frame: &FrameContext<'_>, cmd: &mut dyn CommandList) -> PassStats {
        let mut stats = PassStats::new(self.pass_name());
        let view = frame.view;
        let settings = frame.settings;
        let depth_stencil = if self.translucent {
            DepthStencilState::DEPTH_READ
        } else {
            DepthStencilState::DEPTH_WRITE
        };
        let pass_state = frame.pass_state(BlendState::OPAQUE, depth_stencil);

        let mut meshes = frame_meshes(scene, view);
        meshes.retain(|mesh| {
            let material = mesh.batch.material_render_proxy.material().properties();
            material.domain == MaterialDomain::Surface && material.is_translucent() == self.translucent
        });
        if self.translucent {
            sort_back_to_front(&mut meshes, view);
        }

        let mut draws = Vec::with_capacity(meshes.len());
        for mesh in meshes {
            let proxy = mesh.batch.material_render_proxy;
            let light_map = select_mobile_light_map_policy(
                mesh.batch,
                mesh.primitive,
                scene.lighting().mobile_directional_light.as_ref(),
                settings,
            );
            let point_lights = mobile_point_light_permutation(
                proxy.material().properties().is_lit(),
                mesh.primitive.map_or(0, |p| p.num_mobile_dynamic_point_lights),
                settings,
            );
            let policy = MobileBasePassDrawingPolicy::new(
                mesh.batch.vertex_factory,
                proxy,
                view.shader_platform,
                light_map,
                point_lights,
            );
            if let Some(policy) = stats.record_policy(scene, proxy.id(), policy) {
                draws.push((policy, mesh));
            }
        }
        if !self.translucent {
            draws.sort_by(|(a, _), (b, _)| a.cmp(b));
        }

        let data = LightMapElementData::default();
        for (policy, mesh) in &draws {
            stats.record_mesh(draw_mesh_with_policy(
                cmd,
                policy,
                &pass_state,
                view,
                mesh.primitive,
                mesh.batch,
                &data,
                frame.policy_context(),
            ));
        }
        stats
    }
}

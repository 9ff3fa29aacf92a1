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

use super::{FrameContext, MeshPassLane, PassStats, Scene};
use crate::drawing_policy::{draw_mesh_with_policy, has_velocity, VelocityDrawingPolicy};
use crate::static_draw_list::StaticMeshLookup;
use vesper_core::material::MaterialDomain;
use vesper_core::renderer::{BlendComponent, BlendState, ColorWrites, CommandList, DepthStencilState, FeatureLevel};
use vesper_core::scene::{PrimitiveId, PrimitiveSceneInfo, ShowFlags, StaticMesh, StaticMeshId};

/// Velocity is a two channel target.
pub const VELOCITY_BLEND: BlendState =
    BlendState::color_only(ColorWrites::R.union(ColorWrites::G), BlendComponent::REPLACE);

/// Hides the static meshes of primitives that did not move this frame.
struct MovedPrimitives<'s, 'a>(&'s Scene<'a>);

impl<'a> StaticMeshLookup<'a> for MovedPrimitives<'_, 'a> {
    fn static_mesh(&self, id: StaticMeshId) -> Option<&StaticMesh<'a>> {
        let mesh = self.0.static_mesh(id)?;
        self.0.primitive(mesh.primitive).filter(|p| has_velocity(p))?;
        Some(mesh)
    }

    fn primitive(&self, id: PrimitiveId) -> Option<&PrimitiveSceneInfo> {
        self.0.primitive(id)
    }
}

/// Screen-space velocity of movable primitives that moved since the last frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct VelocityLane;

impl MeshPassLane for VelocityLane {
    fn pass_name(&self) -> &'static str {
        "Velocity"
    }

    fn is_enabled(&self, frame: &FrameContext<'_>) -> bool {
        frame.view.show_flags.contains(ShowFlags::VELOCITY) && frame.view.feature_level >= FeatureLevel::Sm4
    }

    fn render(&self, scene: &Scene<'_>, frame: &FrameContext<'_>, cmd: &mut dyn CommandList) -> PassStats {
        let mut stats = PassStats::new(self.pass_name());
        let view = frame.view;
        let ctx = frame.policy_context();
        let pass_state = frame.pass_state(VELOCITY_BLEND, DepthStencilState::DEPTH_WRITE);

        stats.record_list(scene.velocity_draw_list().draw_visible(
            cmd,
            view,
            &pass_state,
            ctx,
            &MovedPrimitives(scene),
        ));

        for mesh in scene.dynamic_meshes() {
            let Some(primitive) = mesh.primitive.and_then(|id| scene.primitive(id)) else {
                continue;
            };
            let proxy = mesh.batch.material_render_proxy;
            let material = proxy.material().properties();
            if !has_velocity(primitive) || material.domain != MaterialDomain::Surface || material.is_translucent() {
                continue;
            }
            let policy = VelocityDrawingPolicy::new(
                mesh.batch.vertex_factory,
                proxy,
                scene.default_material(),
                view.shader_platform,
            );
            if let Some(policy) = stats.record_policy(scene, proxy.id(), policy) {
                stats.record_mesh(draw_mesh_with_policy(
                    cmd,
                    &policy,
                    &pass_state,
                    view,
                    Some(primitive),
                    &mesh.batch,
                    &(),
                    ctx,
                ));
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permutation::ShaderMapBuilder;
    use crate::testing::{self, default_material_properties, RecordingCommandList};
    use glam::Mat4;
    use vesper_core::hit_proxy::HitProxyId;
    use vesper_core::material::MaterialProperties;
    use vesper_core::renderer::UniformBufferId;
    use vesper_core::scene::{MeshBatch, Mobility};

    #[test]
    fn only_primitives_that_moved_are_drawn() {
        let settings = testing::settings();
        let mut builder = ShaderMapBuilder::new(testing::PLATFORM, &settings);
        let vf = testing::local_vertex_factory(1);
        let default_material = testing::compiled_material(9, default_material_properties(), &mut builder, &[&vf]);
        let opaque = testing::compiled_material(1, MaterialProperties::default(), &mut builder, &[&vf]);

        let mut scene = Scene::new(testing::PLATFORM, settings.clone(), &default_material);
        let mut view = testing::view();
        for moved in [true, false] {
            let mut info = PrimitiveSceneInfo::new(PrimitiveId(0), UniformBufferId(50));
            info.mobility = Mobility::Movable;
            if moved {
                info.previous_local_to_world = Mat4::from_translation(glam::Vec3::X);
            }
            let p = scene.add_primitive(info);
            let mesh = scene.add_static_mesh(p, MeshBatch::new(&vf, &opaque, vec![testing::element(1)]), HitProxyId::INVISIBLE);
            view.set_static_mesh_visible(mesh.0, true);
        }
        assert_eq!(scene.velocity_draw_list().num_meshes(), 2);

        let frame = FrameContext::with_settings(&settings, &view);
        let mut cmd = RecordingCommandList::default();
        let stats = VelocityLane.render(&scene, &frame, &mut cmd);
        assert_eq!(stats.draws, 1);
        assert_eq!(cmd.pipeline_states()[0].blend_state, VELOCITY_BLEND);
    }
}

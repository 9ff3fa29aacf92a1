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

use super::{base_pass_options, frame_meshes, BasePassDrawListType, FrameContext, FrameMesh, MeshPassLane, PassStats, Scene};
use crate::binding::LightMapElementData;
use crate::drawing_policy::{draw_mesh_with_policy, BasePassDrawingPolicy};
use vesper_core::material::MaterialDomain;
use vesper_core::renderer::{BlendState, CommandList, DepthStencilState, RenderStateDescriptor};
use vesper_core::scene::{DebugViewShaderMode, ShowFlags};

/// Returns `true` if the view replaces the base pass with the light-map density
/// visualisation.
pub fn shows_light_map_density(frame: &FrameContext<'_>) -> bool {
    frame.view.show_flags.contains(ShowFlags::LIGHT_MAP_DENSITY)
        && frame.settings.allow_debug_viewmodes
        && !frame.view.feature_level.is_mobile()
}

/// The deferred base pass: opaque and masked surfaces into the G-buffer.
///
/// Static meshes are drawn from the scene's cached lists. When the view renders a
/// debug view mode the cached policies do not apply and every visible mesh gets a
/// policy built for the frame instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasePassLane;

impl BasePassLane {
    fn draw_frame_mesh(
        stats: &mut PassStats,
        scene: &Scene<'_>,
        frame: &FrameContext<'_>,
        cmd: &mut dyn CommandList,
        pass_state: &RenderStateDescriptor,
        mesh: FrameMesh<'_, '_>,
    ) {
        let view = frame.view;
        let proxy = mesh.batch.material_render_proxy;
        let material = proxy.material().properties();
        if material.domain != MaterialDomain::Surface || material.is_translucent() {
            return;
        }
        let capabilities = scene.lighting_capabilities(material);
        let options = base_pass_options(
            mesh.batch,
            mesh.primitive,
            view.feature_level,
            capabilities,
            scene.lighting(),
            frame.settings,
        );
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
                pass_state,
                view,
                mesh.primitive,
                mesh.batch,
                &LightMapElementData::default(),
                frame.policy_context(),
            ));
        }
    }
}

impl MeshPassLane for BasePassLane {
    fn pass_name(&self) -> &'static str {
        "BasePass"
    }

    fn is_enabled(&self, frame: &FrameContext<'_>) -> bool {
        !frame.view.feature_level.is_mobile() && !shows_light_map_density(frame)
    }

    fn render(&self, scene: &Scene<'_>, frame: &FrameContext<'_>, cmd: &mut dyn CommandList) -> PassStats {
        let mut stats = PassStats::new(self.pass_name());
        let view = frame.view;
        let pass_state = frame.pass_state(BlendState::OPAQUE, DepthStencilState::DEPTH_WRITE);

        if view.debug_view_mode == DebugViewShaderMode::None {
            for list in [BasePassDrawListType::Default, BasePassDrawListType::Masked] {
                stats.record_list(scene.base_pass_draw_list(list).draw_visible(
                    cmd,
                    view,
                    &pass_state,
                    frame.policy_context(),
                    scene,
                ));
            }
            for mesh in scene.dynamic_meshes() {
                let mesh = FrameMesh {
                    batch: &mesh.batch,
                    primitive: mesh.primitive.and_then(|id| scene.primitive(id)),
                };
                Self::draw_frame_mesh(&mut stats, scene, frame, cmd, &pass_state, mesh);
            }
        } else {
            for mesh in frame_meshes(scene, view) {
                Self::draw_frame_mesh(&mut stats, scene, frame, cmd, &pass_state, mesh);
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permutation::ShaderMapBuilder;
    use crate::render_lane::DynamicMesh;
    use crate::testing::{self, default_material_properties, RecordingCommandList};
    use vesper_core::hit_proxy::HitProxyId;
    use vesper_core::material::{BlendMode, MaterialProperties};
    use vesper_core::renderer::UniformBufferId;
    use vesper_core::scene::{MeshBatch, PrimitiveId, PrimitiveSceneInfo};

    #[test]
    fn opaque_meshes_draw_before_masked_ones() {
        let settings = testing::settings();
        let mut builder = ShaderMapBuilder::new(testing::PLATFORM, &settings);
        let vf = testing::local_vertex_factory(1);
        let default_material = testing::compiled_material(9, default_material_properties(), &mut builder, &[&vf]);
        let opaque = testing::compiled_material(1, MaterialProperties::default(), &mut builder, &[&vf]);
        let masked = testing::compiled_material(
            2,
            MaterialProperties {
                blend_mode: BlendMode::Masked,
                ..Default::default()
            },
            &mut builder,
            &[&vf],
        );

        let mut scene = Scene::new(testing::PLATFORM, settings.clone(), &default_material);
        let p = scene.add_primitive(PrimitiveSceneInfo::new(PrimitiveId(0), UniformBufferId(50)));
        let m = scene.add_static_mesh(p, MeshBatch::new(&vf, &masked, vec![testing::element(3)]), HitProxyId::INVISIBLE);
        let o = scene.add_static_mesh(p, MeshBatch::new(&vf, &opaque, vec![testing::element(5)]), HitProxyId::INVISIBLE);

        let mut view = testing::view();
        view.set_static_mesh_visible(m.0, true);
        view.set_static_mesh_visible(o.0, true);
        let frame = FrameContext::with_settings(&settings, &view);
        let mut cmd = RecordingCommandList::default();
        let stats = BasePassLane.render(&scene, &frame, &mut cmd);

        assert_eq!(stats.draws, 2);
        assert_eq!(stats.skipped, 0);
        let primitives: Vec<u32> = cmd
            .calls
            .iter()
            .filter_map(|call| match call {
                testing::RecordedCall::Draw { num_primitives, .. } => Some(*num_primitives),
                _ => None,
            })
            .collect();
        assert_eq!(primitives, vec![5, 3]);
    }

    #[test]
    fn debug_view_modes_build_policies_per_frame() {
        let settings = testing::settings();
        let mut builder = ShaderMapBuilder::new(testing::PLATFORM, &settings);
        let vf = testing::local_vertex_factory(1);
        let default_material = testing::compiled_material(9, default_material_properties(), &mut builder, &[&vf]);
        let opaque = testing::compiled_material(1, MaterialProperties::default(), &mut builder, &[&vf]);

        let mut scene = Scene::new(testing::PLATFORM, settings.clone(), &default_material);
        let p = scene.add_primitive(PrimitiveSceneInfo::new(PrimitiveId(0), UniformBufferId(50)));
        let mesh = scene.add_static_mesh(p, MeshBatch::new(&vf, &opaque, vec![testing::element(1)]), HitProxyId::INVISIBLE);
        scene.push_dynamic_mesh(DynamicMesh {
            batch: MeshBatch::new(&vf, &opaque, vec![testing::element(1)]),
            primitive: Some(p),
            hit_proxy_id: HitProxyId::INVISIBLE,
        });

        let mut view = testing::view();
        view.set_static_mesh_visible(mesh.0, true);
        view.debug_view_mode = DebugViewShaderMode::ShaderComplexity;
        let frame = FrameContext::with_settings(&settings, &view);
        let mut cmd = RecordingCommandList::default();
        let stats = BasePassLane.render(&scene, &frame, &mut cmd);

        assert_eq!(stats.draws, 2);
        assert_eq!(stats.pipeline_states, 2);
        for pipeline in cmd.pipeline_states() {
            assert_eq!(pipeline.blend_state, BlendState::OPAQUE);
        }
    }

    #[test]
    fn light_map_density_view_disables_the_base_pass() {
        let settings = testing::settings();
        let mut view = testing::view();
        view.show_flags |= ShowFlags::LIGHT_MAP_DENSITY;
        let frame = FrameContext::with_settings(&settings, &view);
        assert!(!BasePassLane.is_enabled(&frame));
    }
}

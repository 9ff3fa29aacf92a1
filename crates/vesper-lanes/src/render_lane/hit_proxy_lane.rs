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
use crate::drawing_policy::{draw_mesh_with_policy, HitProxyDrawingPolicy};
use crate::static_draw_list::StaticMeshLookup;
use vesper_core::hit_proxy::HitProxyId;
use vesper_core::material::MaterialProperties;
use vesper_core::renderer::{BlendState, CommandList, DepthStencilState};
use vesper_core::scene::{PrimitiveId, PrimitiveSceneInfo, StaticMesh, StaticMeshId};

/// The id a mesh is picked as: its own, or its primitive's when it has none.
pub fn resolve_hit_proxy_id(mesh_id: HitProxyId, primitive: Option<&PrimitiveSceneInfo>) -> HitProxyId {
    if mesh_id == HitProxyId::INVISIBLE {
        primitive.map_or(HitProxyId::INVISIBLE, |p| p.hit_proxy_id)
    } else {
        mesh_id
    }
}

/// Returns `true` if a mesh drawn with `material` and `id` shows up in the
/// picking buffer of `frame`.
///
/// Translucent meshes are pickable only when the settings allow it or when the
/// registered object asks for it.
pub fn is_pickable(material: &MaterialProperties, id: HitProxyId, frame: &FrameContext<'_>) -> bool {
    if id == HitProxyId::INVISIBLE || material.is_deferred_decal() {
        return false;
    }
    !material.is_translucent()
        || frame.settings.allow_translucent_hit_proxies
        || frame
            .hit_proxies
            .and_then(|registry| registry.lookup(id))
            .is_some_and(|entry| entry.always_allow_translucent)
}

/// Hides the static meshes that are not pickable in this frame.
struct PickableMeshes<'s, 'a, 'f> {
    scene: &'s Scene<'a>,
    frame: &'s FrameContext<'f>,
}

impl<'a> StaticMeshLookup<'a> for PickableMeshes<'_, 'a, '_> {
    fn static_mesh(&self, id: StaticMeshId) -> Option<&StaticMesh<'a>> {
        let mesh = self.scene.static_mesh(id)?;
        let primitive = self.scene.primitive(mesh.primitive);
        let hit_proxy_id = resolve_hit_proxy_id(mesh.hit_proxy_id, primitive);
        let material = mesh.batch.material_render_proxy.material().properties();
        is_pickable(material, hit_proxy_id, self.frame).then_some(mesh)
    }

    fn primitive(&self, id: PrimitiveId) -> Option<&PrimitiveSceneInfo> {
        self.scene.primitive(id)
    }
}

/// Draws every pickable mesh with its hit proxy color.
#[derive(Debug, Default, Clone, Copy)]
pub struct HitProxyLane;

impl MeshPassLane for HitProxyLane {
    fn pass_name(&self) -> &'static str {
        "HitProxy"
    }

    fn is_enabled(&self, frame: &FrameContext<'_>) -> bool {
        !frame.view.feature_level.is_mobile()
    }

    fn render(&self, scene: &Scene<'_>, frame: &FrameContext<'_>, cmd: &mut dyn CommandList) -> PassStats {
        let mut stats = PassStats::new(self.pass_name());
        let view = frame.view;
        let ctx = frame.policy_context();
        let pass_state = frame.pass_state(BlendState::OPAQUE, DepthStencilState::DEPTH_WRITE);

        stats.record_list(scene.hit_proxy_draw_list().draw_visible(
            cmd,
            view,
            &pass_state,
            ctx,
            &PickableMeshes { scene, frame },
        ));

        for mesh in scene.dynamic_meshes() {
            let primitive = mesh.primitive.and_then(|id| scene.primitive(id));
            if primitive.is_some_and(|p| !p.selectable) {
                continue;
            }
            let proxy = mesh.batch.material_render_proxy;
            let hit_proxy_id = resolve_hit_proxy_id(mesh.hit_proxy_id, primitive);
            if !is_pickable(proxy.material().properties(), hit_proxy_id, frame) {
                continue;
            }
            let policy = HitProxyDrawingPolicy::new(
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
                    primitive,
                    &mesh.batch,
                    &hit_proxy_id,
                    ctx,
                ));
            }
        }
        stats
    }
}

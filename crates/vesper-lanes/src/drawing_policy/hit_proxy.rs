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

//! The hit-proxy pass drawing policy, which renders picking ids as colors.

use super::{DrawingPolicy, MeshDrawingPolicy, StageShaders};
use crate::binding::ShaderBinder;
use crate::error::PolicyError;
use crate::permutation::uses_default_material_shaders;
use vesper_core::hit_proxy::HitProxyId;
use vesper_core::material::MaterialRenderProxy;
use vesper_core::renderer::{CommandList, ShaderParameter, ShaderPlatform, ShaderType};
use vesper_core::scene::{MeshBatch, PrimitiveSceneInfo, SceneView, VertexFactory};

/// Renders every mesh with the color of its hit proxy id.
#[derive(Debug, Clone, Copy)]
pub struct HitProxyDrawingPolicy<'a> {
    mesh_policy: MeshDrawingPolicy<'a>,
    shaders: StageShaders<'a>,
}

impl<'a> HitProxyDrawingPolicy<'a> {
    /// Creates the policy. Materials without pixel or position work are drawn with
    /// `default_material`.
    pub fn new(
        vertex_factory: &'a VertexFactory,
        material_render_proxy: &'a dyn MaterialRenderProxy,
        default_material: &'a dyn MaterialRenderProxy,
        platform: ShaderPlatform,
    ) -> Result<Self, PolicyError> {
        let properties = material_render_proxy.material().properties();
        if properties.is_deferred_decal() {
            return Err(PolicyError::NotApplicable {
                pass: "HitProxy",
                material: material_render_proxy.id(),
            });
        }
        let shader_proxy = if uses_default_material_shaders(properties) {
            default_material
        } else {
            material_render_proxy
        };
        let mesh_policy = MeshDrawingPolicy::new(vertex_factory, shader_proxy, platform);
        let shaders = StageShaders::resolve(
            &mesh_policy,
            ShaderType::HitProxyVs,
            Some((ShaderType::HitProxyHs, ShaderType::HitProxyDs)),
            Some(ShaderType::HitProxyPs),
        )?;
        Ok(Self { mesh_policy, shaders })
    }

    fn sort_key(&self) -> impl Ord {
        (self.shaders.key(), self.mesh_policy.key())
    }
}

impl_policy_ordering!(HitProxyDrawingPolicy);

impl<'a> DrawingPolicy<'a> for HitProxyDrawingPolicy<'a> {
    type ElementData = HitProxyId;

    fn mesh_policy(&self) -> &MeshDrawingPolicy<'a> {
        &self.mesh_policy
    }

    fn shaders(&self) -> StageShaders<'a> {
        self.shaders
    }

    fn bind_mesh_parameters(
        &self,
        binder: &mut ShaderBinder<'_>,
        cmd: &mut dyn CommandList,
        _view: &SceneView,
        _primitive: Option<&PrimitiveSceneInfo>,
        _mesh: &MeshBatch<'_>,
        hit_proxy_id: &HitProxyId,
    ) {
        binder.set_value(cmd, ShaderParameter::HitProxyColor, &hit_proxy_id.to_linear());
    }
}

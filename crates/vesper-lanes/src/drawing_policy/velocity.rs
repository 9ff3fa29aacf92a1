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

//! The velocity pass drawing policy.

use super::{DrawingPolicy, MeshDrawingPolicy, StageShaders};
use crate::binding::ShaderBinder;
use crate::error::PolicyError;
use crate::permutation::uses_default_material_shaders;
use vesper_core::material::MaterialRenderProxy;
use vesper_core::renderer::{CommandList, ShaderParameter, ShaderPlatform, ShaderType};
use vesper_core::scene::{MeshBatch, PrimitiveSceneInfo, SceneView, VertexFactory};

/// Returns `true` if the primitive moved since the previous frame and must write
/// velocity.
pub fn has_velocity(primitive: &PrimitiveSceneInfo) -> bool {
    primitive.is_movable() && primitive.has_moved()
}

/// Writes screen-space motion vectors of moving opaque meshes.
#[derive(Debug, Clone, Copy)]
pub struct VelocityDrawingPolicy<'a> {
    mesh_policy: MeshDrawingPolicy<'a>,
    shaders: StageShaders<'a>,
}

impl<'a> VelocityDrawingPolicy<'a> {
    /// Creates the policy, drawing with `default_material` when the mesh's material
    /// neither clips pixels nor moves vertices.
    pub fn new(
        vertex_factory: &'a VertexFactory,
        material_render_proxy: &'a dyn MaterialRenderProxy,
        default_material: &'a dyn MaterialRenderProxy,
        platform: ShaderPlatform,
    ) -> Result<Self, PolicyError> {
        let properties = material_render_proxy.material().properties();
        if properties.is_translucent() || properties.is_deferred_decal() {
            return Err(PolicyError::NotApplicable {
                pass: "Velocity",
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
            ShaderType::VelocityVs,
            Some((ShaderType::VelocityHs, ShaderType::VelocityDs)),
            Some(ShaderType::VelocityPs),
        )?;
        Ok(Self { mesh_policy, shaders })
    }

    fn sort_key(&self) -> impl Ord {
        (self.shaders.key(), self.mesh_policy.key())
    }
}

impl_policy_ordering!(VelocityDrawingPolicy);

impl<'a> DrawingPolicy<'a> for VelocityDrawingPolicy<'a> {
    type ElementData = ();

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
        primitive: Option<&PrimitiveSceneInfo>,
        _mesh: &MeshBatch<'_>,
        _data: &(),
    ) {
        if let Some(primitive) = primitive {
            binder.set_value(cmd, ShaderParameter::PreviousLocalToWorld, &primitive.previous_local_to_world);
        }
    }
}

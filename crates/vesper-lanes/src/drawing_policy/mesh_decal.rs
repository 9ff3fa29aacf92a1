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

//! The mesh decal pass drawing policy.

use super::blend::decal_blend_state;
use super::{DrawingPolicy, MeshDrawingPolicy, PolicyContext, StageShaders};
use crate::binding::ShaderBinder;
use crate::error::PolicyError;
use vesper_core::material::{DecalBlendMode, MaterialRenderProxy};
use vesper_core::renderer::{CommandList, RenderStateDescriptor, ShaderParameter, ShaderPlatform, ShaderType};
use vesper_core::scene::{SceneView, VertexFactory};

/// Draws decal geometry into the populated G-buffer.
#[derive(Debug, Clone, Copy)]
pub struct MeshDecalDrawingPolicy<'a> {
    mesh_policy: MeshDrawingPolicy<'a>,
    shaders: StageShaders<'a>,
    decal_blend_mode: DecalBlendMode,
}

impl<'a> MeshDecalDrawingPolicy<'a> {
    /// Creates the policy for a deferred decal material.
    pub fn new(
        vertex_factory: &'a VertexFactory,
        material_render_proxy: &'a dyn MaterialRenderProxy,
        platform: ShaderPlatform,
    ) -> Result<Self, PolicyError> {
        let properties = material_render_proxy.material().properties();
        if !properties.is_deferred_decal() {
            return Err(PolicyError::NotApplicable {
                pass: "MeshDecal",
                material: material_render_proxy.id(),
            });
        }
        let mesh_policy = MeshDrawingPolicy::new(vertex_factory, material_render_proxy, platform);
        let shaders = StageShaders::resolve(
            &mesh_policy,
            ShaderType::MeshDecalVs,
            Some((ShaderType::MeshDecalHs, ShaderType::MeshDecalDs)),
            Some(ShaderType::MeshDecalPs),
        )?;
        Ok(Self {
            mesh_policy,
            shaders,
            decal_blend_mode: properties.decal_blend_mode,
        })
    }

    /// How the decal blends into the G-buffer.
    pub fn decal_blend_mode(&self) -> DecalBlendMode {
        self.decal_blend_mode
    }

    fn sort_key(&self) -> impl Ord {
        (self.shaders.key(), self.mesh_policy.key(), self.decal_blend_mode as u8)
    }
}

impl_policy_ordering!(MeshDecalDrawingPolicy);

impl<'a> DrawingPolicy<'a> for MeshDecalDrawingPolicy<'a> {
    type ElementData = ();

    fn mesh_policy(&self) -> &MeshDrawingPolicy<'a> {
        &self.mesh_policy
    }

    fn shaders(&self) -> StageShaders<'a> {
        self.shaders
    }

    fn setup_pipeline_state(&self, state: &mut RenderStateDescriptor, _view: &SceneView) {
        state.set_blend_state(decal_blend_state(self.decal_blend_mode));
    }

    fn bind_shared_parameters(
        &self,
        binder: &mut ShaderBinder<'_>,
        cmd: &mut dyn CommandList,
        view: &SceneView,
        _ctx: PolicyContext,
    ) {
        if let Some(texture) = view.scene_depth_texture {
            binder.set_texture(cmd, ShaderParameter::SceneDepthTexture, texture, view.global_resources.default_sampler);
        }
    }
}

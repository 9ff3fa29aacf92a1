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

//! The distortion accumulation pass drawing policy.

use super::{DrawingPolicy, MeshDrawingPolicy, PolicyContext, StageShaders};
use crate::binding::ShaderBinder;
use crate::error::PolicyError;
use vesper_core::material::MaterialRenderProxy;
use vesper_core::renderer::{
    BlendComponent, BlendFactor, BlendOperation, BlendState, ColorWrites, CommandList, RenderStateDescriptor,
    ShaderParameter, ShaderPlatform, ShaderType,
};
use vesper_core::scene::{SceneView, VertexFactory};

/// Offsets of every distorting mesh are summed into the distortion target.
pub const DISTORTION_ACCUMULATE: BlendState = BlendState::new(
    ColorWrites::RGBA,
    BlendComponent::new(BlendOperation::Add, BlendFactor::One, BlendFactor::One),
    BlendComponent::new(BlendOperation::Add, BlendFactor::One, BlendFactor::One),
);

/// Accumulates screen-space refraction offsets of distorting translucent meshes.
#[derive(Debug, Clone, Copy)]
pub struct DistortionDrawingPolicy<'a> {
    mesh_policy: MeshDrawingPolicy<'a>,
    shaders: StageShaders<'a>,
}

impl<'a> DistortionDrawingPolicy<'a> {
    /// Creates the policy for a translucent, distorting material.
    pub fn new(
        vertex_factory: &'a VertexFactory,
        material_render_proxy: &'a dyn MaterialRenderProxy,
        platform: ShaderPlatform,
    ) -> Result<Self, PolicyError> {
        let properties = material_render_proxy.material().properties();
        if !properties.is_translucent() || !properties.is_distorted {
            return Err(PolicyError::NotApplicable {
                pass: "Distortion",
                material: material_render_proxy.id(),
            });
        }
        let mesh_policy = MeshDrawingPolicy::new(vertex_factory, material_render_proxy, platform);
        let shaders = StageShaders::resolve(
            &mesh_policy,
            ShaderType::DistortionVs,
            Some((ShaderType::DistortionHs, ShaderType::DistortionDs)),
            Some(ShaderType::DistortionPs),
        )?;
        Ok(Self { mesh_policy, shaders })
    }

    fn sort_key(&self) -> impl Ord {
        (self.shaders.key(), self.mesh_policy.key())
    }
}

impl_policy_ordering!(DistortionDrawingPolicy);

impl<'a> DrawingPolicy<'a> for DistortionDrawingPolicy<'a> {
    type ElementData = ();

    fn mesh_policy(&self) -> &MeshDrawingPolicy<'a> {
        &self.mesh_policy
    }

    fn shaders(&self) -> StageShaders<'a> {
        self.shaders
    }

    fn setup_pipeline_state(&self, state: &mut RenderStateDescriptor, _view: &SceneView) {
        state.set_blend_state(DISTORTION_ACCUMULATE);
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

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

//! The depth prepass drawing policy.

use super::{bind_mesh_stages, DrawingPolicy, MeshDrawingPolicy, StageShaders, STENCIL_LOD_DITHER_MASK};
use crate::error::PolicyError;
use crate::permutation::uses_default_material_shaders;
use vesper_core::material::MaterialRenderProxy;
use vesper_core::renderer::{
    CommandList, DrawError, RenderStateDescriptor, ShaderPlatform, ShaderType,
};
use vesper_core::scene::{MeshBatch, PrimitiveSceneInfo, SceneView, VertexFactory};

/// Writes depth for opaque and masked meshes.
///
/// Opaque meshes whose positions the material leaves untouched are drawn with the
/// default material, through the position-only streams when the vertex factory
/// has them. Their policies then only differ by vertex factory.
#[derive(Debug, Clone, Copy)]
pub struct DepthDrawingPolicy<'a> {
    mesh_policy: MeshDrawingPolicy<'a>,
    shaders: StageShaders<'a>,
    stencil_dither: bool,
}

impl<'a> DepthDrawingPolicy<'a> {
    /// Creates the policy for a mesh drawn with `material_render_proxy`.
    ///
    /// `default_material` must be a special engine material compiled for
    /// `vertex_factory`'s type.
    pub fn new(
        vertex_factory: &'a VertexFactory,
        material_render_proxy: &'a dyn MaterialRenderProxy,
        default_material: &'a dyn MaterialRenderProxy,
        platform: ShaderPlatform,
        stencil_dither: bool,
    ) -> Result<Self, PolicyError> {
        let properties = material_render_proxy.material().properties();
        if properties.is_translucent() || properties.is_deferred_decal() {
            return Err(PolicyError::NotApplicable {
                pass: "DepthPass",
                material: material_render_proxy.id(),
            });
        }

        let use_default = uses_default_material_shaders(properties);
        let shader_proxy = if use_default { default_material } else { material_render_proxy };
        let mut mesh_policy = MeshDrawingPolicy::new(vertex_factory, shader_proxy, platform);
        let position_only = use_default
            && vertex_factory.ty.supports_position_only
            && !mesh_policy.is_tessellated()
            && shader_proxy.material().properties().is_special_engine_material;
        mesh_policy = mesh_policy.with_position_only(position_only);

        let shader_properties = mesh_policy.properties();
        let shaders = StageShaders::resolve(
            &mesh_policy,
            ShaderType::DepthOnlyVs {
                position_only: mesh_policy.is_position_only(),
            },
            Some((ShaderType::DepthOnlyHs, ShaderType::DepthOnlyDs)),
            shader_properties.is_masked().then_some(ShaderType::DepthOnlyPs),
        )?;

        Ok(Self {
            mesh_policy,
            shaders,
            stencil_dither,
        })
    }

    fn sort_key(&self) -> impl Ord {
        (self.shaders.key(), self.mesh_policy.key(), self.stencil_dither)
    }
}

impl_policy_ordering!(DepthDrawingPolicy);

impl<'a> DrawingPolicy<'a> for DepthDrawingPolicy<'a> {
    type ElementData = ();

    fn mesh_policy(&self) -> &MeshDrawingPolicy<'a> {
        &self.mesh_policy
    }

    fn shaders(&self) -> StageShaders<'a> {
        self.shaders
    }

    fn setup_pipeline_state(&self, state: &mut RenderStateDescriptor, _view: &SceneView) {
        if self.stencil_dither {
            if let Some(depth_stencil) = state.depth_stencil_state {
                state.set_depth_stencil_state(depth_stencil.with_stencil_replace(STENCIL_LOD_DITHER_MASK));
            }
        }
    }

    fn set_mesh_render_state(
        &self,
        cmd: &mut dyn CommandList,
        view: &SceneView,
        primitive: Option<&PrimitiveSceneInfo>,
        mesh: &MeshBatch<'_>,
        element_index: usize,
        state: &RenderStateDescriptor,
        data: &(),
    ) -> Result<(), DrawError> {
        bind_mesh_stages(self, cmd, view, primitive, mesh, element_index, state, data)?;
        if self.stencil_dither {
            let bit = u32::from(STENCIL_LOD_DITHER_MASK);
            let dithered = mesh.dithered_lod_transition;
            cmd.set_stencil_ref((state.stencil_ref & !bit) | if dithered { bit } else { 0 });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permutation::ShaderMapBuilder;
    use crate::testing::{self, default_material_properties};
    use vesper_core::material::{BlendMode, MaterialProperties};
    use vesper_core::renderer::VertexDeclarationId;

    #[test]
    fn opaque_meshes_share_the_default_material_policy() {
        let settings = testing::settings();
        let mut builder = ShaderMapBuilder::new(testing::PLATFORM, &settings);
        let vf = testing::local_vertex_factory(1);
        let default_material = testing::compiled_material(9, default_material_properties(), &mut builder, &[&vf]);
        let first = testing::compiled_material(1, MaterialProperties::default(), &mut builder, &[&vf]);
        let second = testing::compiled_material(2, MaterialProperties::default(), &mut builder, &[&vf]);

        let a = DepthDrawingPolicy::new(&vf, &first, &default_material, testing::PLATFORM, false).expect("policy");
        let b = DepthDrawingPolicy::new(&vf, &second, &default_material, testing::PLATFORM, false).expect("policy");
        assert_eq!(a, b);
        assert!(a.mesh_policy().is_position_only());
        assert!(a.shaders().pixel.is_none());
        assert_eq!(a.bound_shader_state().vertex_declaration, VertexDeclarationId(11));
    }

    #[test]
    fn masked_meshes_use_their_own_pixel_shader() {
        let settings = testing::settings();
        let mut builder = ShaderMapBuilder::new(testing::PLATFORM, &settings);
        let vf = testing::local_vertex_factory(1);
        let default_material = testing::compiled_material(9, default_material_properties(), &mut builder, &[&vf]);
        let masked = MaterialProperties {
            blend_mode: BlendMode::Masked,
            ..Default::default()
        };
        let material = testing::compiled_material(1, masked, &mut builder, &[&vf]);

        let policy = DepthDrawingPolicy::new(&vf, &material, &default_material, testing::PLATFORM, false).expect("policy");
        assert!(!policy.mesh_policy().is_position_only());
        assert!(policy.shaders().pixel.is_some());
        assert_eq!(policy.mesh_policy().material_render_proxy().id(), material.id());
    }

    #[test]
    fn translucent_meshes_are_rejected() {
        let settings = testing::settings();
        let mut builder = ShaderMapBuilder::new(testing::PLATFORM, &settings);
        let vf = testing::local_vertex_factory(1);
        let default_material = testing::compiled_material(9, default_material_properties(), &mut builder, &[&vf]);
        let translucent = MaterialProperties {
            blend_mode: BlendMode::Translucent,
            ..Default::default()
        };
        let material = testing::compiled_material(1, translucent, &mut builder, &[&vf]);
        assert!(DepthDrawingPolicy::new(&vf, &material, &default_material, testing::PLATFORM, false).is_err());
    }
}

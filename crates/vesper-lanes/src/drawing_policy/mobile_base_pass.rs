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

//! The mobile base pass drawing policy.

use super::blend::translucent_blend_state;
use super::{DrawingPolicy, MeshDrawingPolicy, PolicyContext, StageShaders};
use crate::binding::{bind_light_map_mesh, bind_light_map_shared, LightMapElementData, ShaderBinder};
use crate::error::PolicyError;
use vesper_core::material::{BlendMode, MaterialDomain, MaterialRenderProxy};
use vesper_core::renderer::{
    CommandList, LightMapPolicyTag, MobilePointLights, RenderStateDescriptor, ShaderParameter, ShaderPlatform,
    ShaderType,
};
use vesper_core::scene::{MeshBatch, PrimitiveSceneInfo, SceneView, VertexFactory};

/// Forward shades surfaces on mobile feature levels. Mobile has no tessellation
/// stages.
#[derive(Debug, Clone, Copy)]
pub struct MobileBasePassDrawingPolicy<'a> {
    mesh_policy: MeshDrawingPolicy<'a>,
    shaders: StageShaders<'a>,
    light_map: LightMapPolicyTag,
    point_lights: MobilePointLights,
    blend_mode: BlendMode,
}

impl<'a> MobileBasePassDrawingPolicy<'a> {
    /// Resolves the mobile base pass shaders for `light_map` and `point_lights`.
    pub fn new(
        vertex_factory: &'a VertexFactory,
        material_render_proxy: &'a dyn MaterialRenderProxy,
        platform: ShaderPlatform,
        light_map: LightMapPolicyTag,
        point_lights: MobilePointLights,
    ) -> Result<Self, PolicyError> {
        let properties = material_render_proxy.material().properties();
        if properties.domain != MaterialDomain::Surface {
            return Err(PolicyError::NotApplicable {
                pass: "MobileBasePass",
                material: material_render_proxy.id(),
            });
        }
        let mesh_policy = MeshDrawingPolicy::new(vertex_factory, material_render_proxy, platform);
        let shaders = StageShaders::resolve(
            &mesh_policy,
            ShaderType::MobileBasePassVs { light_map },
            None,
            Some(ShaderType::MobileBasePassPs {
                light_map,
                point_lights,
            }),
        )?;
        Ok(Self {
            mesh_policy,
            shaders,
            light_map,
            point_lights,
            blend_mode: properties.blend_mode,
        })
    }

    /// The mobile light-map tag.
    pub fn light_map(&self) -> LightMapPolicyTag {
        self.light_map
    }

    /// The point light permutation.
    pub fn point_lights(&self) -> MobilePointLights {
        self.point_lights
    }

    fn sort_key(&self) -> impl Ord {
        (
            self.shaders.key(),
            self.mesh_policy.key(),
            self.light_map,
            self.point_lights,
            self.blend_mode,
        )
    }
}

impl_policy_ordering!(MobileBasePassDrawingPolicy);

impl<'a> DrawingPolicy<'a> for MobileBasePassDrawingPolicy<'a> {
    type ElementData = LightMapElementData;

    fn mesh_policy(&self) -> &MeshDrawingPolicy<'a> {
        &self.mesh_policy
    }

    fn shaders(&self) -> StageShaders<'a> {
        self.shaders
    }

    fn setup_pipeline_state(&self, state: &mut RenderStateDescriptor, _view: &SceneView) {
        if let Some(blend_state) = translucent_blend_state(self.blend_mode) {
            state.set_blend_state(blend_state);
        }
    }

    fn bind_shared_parameters(
        &self,
        binder: &mut ShaderBinder<'_>,
        cmd: &mut dyn CommandList,
        view: &SceneView,
        _ctx: PolicyContext,
    ) {
        bind_light_map_shared(binder, cmd, self.light_map, view);
        if let Some(buffer) = view.reflection_capture_uniform_buffer {
            binder.set_uniform_buffer(cmd, ShaderParameter::ReflectionCapture, buffer);
        }
    }

    fn bind_mesh_parameters(
        &self,
        binder: &mut ShaderBinder<'_>,
        cmd: &mut dyn CommandList,
        view: &SceneView,
        primitive: Option<&PrimitiveSceneInfo>,
        mesh: &MeshBatch<'_>,
        data: &LightMapElementData,
    ) {
        let sampler = view.global_resources.default_sampler;
        bind_light_map_mesh(binder, cmd, self.light_map, mesh.light_cache, primitive, data, sampler);
        let lights = primitive.map_or(0u32, |p| u32::from(p.num_mobile_dynamic_point_lights));
        let lights = match self.point_lights {
            MobilePointLights::Fixed(count) => lights.min(u32::from(count)),
            MobilePointLights::DynamicBranch => lights,
        };
        binder.set_value(cmd, ShaderParameter::NumDynamicPointLights, &lights);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permutation::ShaderMapBuilder;
    use crate::testing;
    use vesper_core::material::MaterialProperties;
    use vesper_core::renderer::ShaderStage;

    #[test]
    fn mobile_policies_have_no_tessellation_stages() {
        let settings = testing::settings();
        let mut builder = ShaderMapBuilder::new(ShaderPlatform::GlEs3_1, &settings);
        let vf = testing::local_vertex_factory(1);
        let material = testing::compiled_material(1, MaterialProperties::default(), &mut builder, &[&vf]);

        let policy = MobileBasePassDrawingPolicy::new(
            &vf,
            &material,
            ShaderPlatform::GlEs3_1,
            LightMapPolicyTag::MobileMovableDirectionalLight,
            MobilePointLights::DynamicBranch,
        )
        .expect("policy");
        let stages: Vec<_> = policy.shaders().iter().map(|s| s.shader_type.stage()).collect();
        assert_eq!(stages, vec![ShaderStage::Vertex, ShaderStage::Pixel]);
        assert_eq!(policy.point_lights(), MobilePointLights::DynamicBranch);
    }
}

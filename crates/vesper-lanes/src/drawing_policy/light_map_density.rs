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

//! The light-map density debug view drawing policy.

use super::{DrawingPolicy, MeshDrawingPolicy, StageShaders};
use crate::binding::{bind_light_map_mesh, LightMapElementData, ShaderBinder};
use crate::error::PolicyError;
use crate::permutation::uses_default_material_shaders;
use glam::Vec4;
use vesper_core::material::MaterialRenderProxy;
use vesper_core::renderer::{CommandList, LightMapPolicyTag, ShaderParameter, ShaderPlatform, ShaderType};
use vesper_core::scene::{MeshBatch, PrimitiveSceneInfo, SceneView, VertexFactory};

/// Colors meshes by how their light-map texel density compares to the ideal.
#[derive(Debug, Clone, Copy)]
pub struct LightMapDensityDrawingPolicy<'a> {
    mesh_policy: MeshDrawingPolicy<'a>,
    shaders: StageShaders<'a>,
    light_map: LightMapPolicyTag,
}

impl<'a> LightMapDensityDrawingPolicy<'a> {
    /// The material whose shaders draw `material_render_proxy` in this pass.
    pub fn shader_material(
        material_render_proxy: &'a dyn MaterialRenderProxy,
        default_material: &'a dyn MaterialRenderProxy,
    ) -> &'a dyn MaterialRenderProxy {
        if uses_default_material_shaders(material_render_proxy.material().properties()) {
            default_material
        } else {
            material_render_proxy
        }
    }

    /// Creates the policy. `light_map` must be a density tag chosen for the
    /// material returned by [`Self::shader_material`].
    pub fn new(
        vertex_factory: &'a VertexFactory,
        material_render_proxy: &'a dyn MaterialRenderProxy,
        default_material: &'a dyn MaterialRenderProxy,
        platform: ShaderPlatform,
        light_map: LightMapPolicyTag,
    ) -> Result<Self, PolicyError> {
        let properties = material_render_proxy.material().properties();
        if properties.is_translucent() || properties.is_deferred_decal() {
            return Err(PolicyError::NotApplicable {
                pass: "LightMapDensity",
                material: material_render_proxy.id(),
            });
        }
        let shader_proxy = Self::shader_material(material_render_proxy, default_material);
        let mesh_policy = MeshDrawingPolicy::new(vertex_factory, shader_proxy, platform);
        let shaders = StageShaders::resolve(
            &mesh_policy,
            ShaderType::LightMapDensityVs { light_map },
            Some((
                ShaderType::LightMapDensityHs { light_map },
                ShaderType::LightMapDensityDs { light_map },
            )),
            Some(ShaderType::LightMapDensityPs { light_map }),
        )?;
        Ok(Self {
            mesh_policy,
            shaders,
            light_map,
        })
    }

    /// The density tag.
    pub fn light_map(&self) -> LightMapPolicyTag {
        self.light_map
    }

    fn sort_key(&self) -> impl Ord {
        (self.shaders.key(), self.mesh_policy.key(), self.light_map)
    }
}

impl_policy_ordering!(LightMapDensityDrawingPolicy);

impl<'a> DrawingPolicy<'a> for LightMapDensityDrawingPolicy<'a> {
    type ElementData = LightMapElementData;

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
        view: &SceneView,
        primitive: Option<&PrimitiveSceneInfo>,
        mesh: &MeshBatch<'_>,
        data: &LightMapElementData,
    ) {
        let density = view.light_map_density;
        let parameters = Vec4::new(
            density.ideal,
            density.maximum,
            if density.grayscale { 1.0 } else { 0.0 },
            0.0,
        );
        binder.set_value(cmd, ShaderParameter::LightMapDensityParameters, &parameters);
        let sampler = view.global_resources.default_sampler;
        bind_light_map_mesh(binder, cmd, self.light_map, mesh.light_cache, primitive, data, sampler);
    }
}

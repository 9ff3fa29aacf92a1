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

//! The base pass drawing policy, also used by the translucency pass.

use super::blend::{shader_complexity_blend_state, translucent_blend_state};
use super::{
    bind_mesh_stages, DrawingPolicy, MeshDrawingPolicy, PolicyContext, StageShaders, STENCIL_RECEIVE_DECAL_MASK,
};
use crate::binding::{bind_light_map_mesh, bind_light_map_shared, LightMapElementData, ShaderBinder};
use crate::error::PolicyError;
use vesper_core::material::{BlendMode, MaterialDomain, MaterialProperties, MaterialRenderProxy};
use vesper_core::renderer::{
    CommandList, DrawError, LightMapPolicyTag, RenderStateDescriptor, ShaderParameter, ShaderPlatform, ShaderType,
};
use vesper_core::scene::{DebugViewShaderMode, MeshBatch, PrimitiveSceneInfo, SceneView, VertexFactory};
use vesper_core::settings::RendererSettings;

/// Whether the pixel shader reads the scene color and depth textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SceneTextureMode {
    /// Scene textures are render targets and must not be read.
    #[default]
    DontSet,
    /// Scene textures are bound for reading (translucency).
    SetTextures,
}

/// Feature switches of a base pass policy, decided by the pass per mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasePassOptions {
    /// Light-map policy chosen by the selector.
    pub light_map: LightMapPolicyTag,
    /// Scene texture access.
    pub scene_texture_mode: SceneTextureMode,
    /// Sky light permutation.
    pub sky_light: bool,
    /// Atmospheric fog permutation.
    pub atmospheric_fog: bool,
    /// Write the receive-decal stencil bit.
    pub receive_decal_output: bool,
}

/// Sky light permutation rule: lit materials in a scene with a sky light, when the
/// material is translucent or the sky light is stationary and supported.
///
/// `sky_light` is `Some(stationary)` when the scene has a sky light.
pub fn uses_sky_light(material: &MaterialProperties, sky_light: Option<bool>, settings: &RendererSettings) -> bool {
    match sky_light {
        Some(stationary) => {
            material.is_lit()
                && (material.is_translucent() || (stationary && settings.stationary_skylight_enabled()))
        }
        None => false,
    }
}

/// Atmospheric fog permutation rule: translucent materials, in views with fog data.
pub fn uses_atmospheric_fog(material: &MaterialProperties, view: &SceneView, settings: &RendererSettings) -> bool {
    material.is_translucent() && view.fog_inscattering_texture.is_some() && settings.atmospheric_fog_enabled()
}

/// Draws opaque, masked and translucent surfaces with their light-map policy.
#[derive(Debug, Clone, Copy)]
pub struct BasePassDrawingPolicy<'a> {
    mesh_policy: MeshDrawingPolicy<'a>,
    shaders: StageShaders<'a>,
    light_map: LightMapPolicyTag,
    blend_mode: BlendMode,
    scene_texture_mode: SceneTextureMode,
    sky_light: bool,
    atmospheric_fog: bool,
    receive_decal_output: bool,
    shader_complexity: bool,
}

impl<'a> BasePassDrawingPolicy<'a> {
    /// Resolves the base pass shaders of `material_render_proxy` for `vertex_factory`.
    ///
    /// Fails if the material is not a surface material or if a stage is missing from
    /// its shader map; the caller skips the mesh.
    pub fn new(
        vertex_factory: &'a VertexFactory,
        material_render_proxy: &'a dyn MaterialRenderProxy,
        platform: ShaderPlatform,
        debug_view: DebugViewShaderMode,
        options: BasePassOptions,
    ) -> Result<Self, PolicyError> {
        let properties = material_render_proxy.material().properties();
        if properties.domain != MaterialDomain::Surface {
            return Err(PolicyError::NotApplicable {
                pass: "BasePass",
                material: material_render_proxy.id(),
            });
        }
        let BasePassOptions {
            light_map,
            scene_texture_mode,
            sky_light,
            atmospheric_fog,
            receive_decal_output,
        } = options;

        let mesh_policy = MeshDrawingPolicy::new(vertex_factory, material_render_proxy, platform);
        let shaders = StageShaders::resolve(
            &mesh_policy,
            ShaderType::BasePassVs {
                light_map,
                atmospheric_fog,
            },
            Some((
                ShaderType::BasePassHs {
                    light_map,
                    atmospheric_fog: atmospheric_fog && platform.is_metal(),
                },
                ShaderType::BasePassDs { light_map },
            )),
            Some(ShaderType::BasePassPs { light_map, sky_light }),
        )?;

        Ok(Self {
            mesh_policy,
            shaders,
            light_map,
            blend_mode: properties.blend_mode,
            scene_texture_mode,
            sky_light,
            atmospheric_fog,
            receive_decal_output,
            shader_complexity: matches!(
                debug_view,
                DebugViewShaderMode::ShaderComplexity | DebugViewShaderMode::QuadComplexity
            ),
        })
    }

    /// The light-map policy the shaders were resolved with.
    pub fn light_map(&self) -> LightMapPolicyTag {
        self.light_map
    }

    /// Blend mode of the material.
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    fn sort_key(&self) -> impl Ord {
        (
            self.shaders.key(),
            self.mesh_policy.key(),
            self.scene_texture_mode,
            self.sky_light,
            self.receive_decal_output,
            self.light_map,
            self.blend_mode,
            self.shader_complexity,
        )
    }
}

impl_policy_ordering!(BasePassDrawingPolicy);

impl<'a> DrawingPolicy<'a> for BasePassDrawingPolicy<'a> {
    type ElementData = LightMapElementData;

    fn mesh_policy(&self) -> &MeshDrawingPolicy<'a> {
        &self.mesh_policy
    }

    fn shaders(&self) -> StageShaders<'a> {
        self.shaders
    }

    fn setup_pipeline_state(&self, state: &mut RenderStateDescriptor, _view: &SceneView) {
        if self.shader_complexity {
            state.set_blend_state(shader_complexity_blend_state(self.blend_mode));
        } else if let Some(blend_state) = translucent_blend_state(self.blend_mode) {
            state.set_blend_state(blend_state);
        }
        if self.receive_decal_output {
            if let Some(depth_stencil) = state.depth_stencil_state {
                state.set_depth_stencil_state(depth_stencil.with_stencil_replace(STENCIL_RECEIVE_DECAL_MASK));
            }
        }
    }

    fn bind_shared_parameters(
        &self,
        binder: &mut ShaderBinder<'_>,
        cmd: &mut dyn CommandList,
        view: &SceneView,
        ctx: PolicyContext,
    ) {
        bind_light_map_shared(binder, cmd, self.light_map, view);
        if let Some(buffer) = view.reflection_capture_uniform_buffer {
            binder.set_uniform_buffer(cmd, ShaderParameter::ReflectionCapture, buffer);
        }
        if self.atmospheric_fog {
            if let Some(buffer) = view.fog_uniform_buffer {
                binder.set_uniform_buffer(cmd, ShaderParameter::Fog, buffer);
            }
            if let Some(texture) = view.fog_inscattering_texture {
                let sampler = view.global_resources.default_sampler;
                binder.set_texture(cmd, ShaderParameter::FogInscatteringTexture, texture, sampler);
            }
        }
        if let Some(primary) = view.forward_light_data {
            binder.set_uniform_buffer(cmd, ShaderParameter::ForwardLightData, primary.uniform_buffer);
            binder.set_buffer(cmd, ShaderParameter::CulledLightDataGrid, primary.culled_light_grid);
            let secondary = if ctx.instanced_stereo {
                view.instanced_forward_light_data.unwrap_or(primary)
            } else {
                primary
            };
            binder.set_uniform_buffer(cmd, ShaderParameter::InstancedForwardLightData, secondary.uniform_buffer);
            binder.set_buffer(cmd, ShaderParameter::InstancedCulledLightDataGrid, secondary.culled_light_grid);
        }
        if self.scene_texture_mode == SceneTextureMode::SetTextures {
            let sampler = view.global_resources.default_sampler;
            if let Some(texture) = view.scene_color_texture {
                binder.set_texture(cmd, ShaderParameter::SceneColorTexture, texture, sampler);
            }
            if let Some(texture) = view.scene_depth_texture {
                binder.set_texture(cmd, ShaderParameter::SceneDepthTexture, texture, sampler);
            }
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
    }

    fn set_mesh_render_state(
        &self,
        cmd: &mut dyn CommandList,
        view: &SceneView,
        primitive: Option<&PrimitiveSceneInfo>,
        mesh: &MeshBatch<'_>,
        element_index: usize,
        state: &RenderStateDescriptor,
        data: &LightMapElementData,
    ) -> Result<(), DrawError> {
        bind_mesh_stages(self, cmd, view, primitive, mesh, element_index, state, data)?;
        if self.receive_decal_output {
            let bit = u32::from(STENCIL_RECEIVE_DECAL_MASK);
            let receives = primitive.is_some_and(|p| p.receives_decals);
            cmd.set_stencil_ref((state.stencil_ref & !bit) | if receives { bit } else { 0 });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing_policy::draw_mesh_with_policy;
    use crate::permutation::ShaderMapBuilder;
    use crate::testing::{self, RecordingCommandList};
    use vesper_core::material::ShadingModel;
    use vesper_core::renderer::{BlendState, DepthStencilState, UniformBufferId};
    use vesper_core::scene::PrimitiveId;

    fn options(light_map: LightMapPolicyTag) -> BasePassOptions {
        BasePassOptions {
            light_map,
            scene_texture_mode: SceneTextureMode::DontSet,
            sky_light: false,
            atmospheric_fog: false,
            receive_decal_output: false,
        }
    }

    fn pass_state() -> RenderStateDescriptor {
        RenderStateDescriptor::new(UniformBufferId(1))
            .with_blend_state(BlendState::OPAQUE)
            .with_depth_stencil_state(DepthStencilState::DEPTH_WRITE)
    }

    #[test]
    fn unlit_opaque_keeps_the_pass_blend_state() {
        let settings = testing::settings();
        let mut builder = ShaderMapBuilder::new(testing::PLATFORM, &settings);
        let vf = testing::local_vertex_factory(1);
        let unlit = MaterialProperties {
            shading_model: ShadingModel::Unlit,
            ..Default::default()
        };
        let material = testing::compiled_material(1, unlit, &mut builder, &[&vf]);
        let mesh = MeshBatch::new(&vf, &material, vec![testing::element(12)]);
        let view = testing::view();

        let policy = BasePassDrawingPolicy::new(
            &vf,
            &material,
            testing::PLATFORM,
            DebugViewShaderMode::None,
            options(LightMapPolicyTag::NoLightmap),
        )
        .expect("unlit base pass shaders");
        let mut state = pass_state();
        policy.setup_pipeline_state(&mut state, &view);
        assert_eq!(state.blend_state, Some(BlendState::OPAQUE));

        let mut cmd = RecordingCommandList::default();
        let draws = draw_mesh_with_policy(
            &mut cmd,
            &policy,
            &pass_state(),
            &view,
            None,
            &mesh,
            &Default::default(),
            PolicyContext::default(),
        )
        .expect("draw");
        assert_eq!(draws, 1);
        assert_eq!(cmd.draws(), 1);
        assert_eq!(cmd.pipeline_states()[0].blend_state, BlendState::OPAQUE);
    }

    #[test]
    fn translucent_and_complexity_blends() {
        let settings = testing::settings();
        let mut builder = ShaderMapBuilder::new(testing::PLATFORM, &settings);
        let vf = testing::local_vertex_factory(1);
        let translucent = MaterialProperties {
            blend_mode: BlendMode::Additive,
            ..Default::default()
        };
        let material = testing::compiled_material(1, translucent, &mut builder, &[&vf]);
        let view = testing::view();

        let policy = BasePassDrawingPolicy::new(
            &vf,
            &material,
            testing::PLATFORM,
            DebugViewShaderMode::None,
            options(LightMapPolicyTag::NoLightmap),
        )
        .expect("policy");
        let mut state = pass_state();
        policy.setup_pipeline_state(&mut state, &view);
        assert_eq!(state.blend_state, translucent_blend_state(BlendMode::Additive));

        let complexity = BasePassDrawingPolicy::new(
            &vf,
            &material,
            testing::PLATFORM,
            DebugViewShaderMode::ShaderComplexity,
            options(LightMapPolicyTag::NoLightmap),
        )
        .expect("policy");
        let mut state = pass_state();
        complexity.setup_pipeline_state(&mut state, &view);
        assert_eq!(state.blend_state, Some(shader_complexity_blend_state(BlendMode::Additive)));
        assert_ne!(policy, complexity);
    }

    #[test]
    fn receive_decal_bit_follows_the_primitive() {
        let settings = testing::settings();
        let mut builder = ShaderMapBuilder::new(testing::PLATFORM, &settings);
        let vf = testing::local_vertex_factory(1);
        let material = testing::compiled_material(1, MaterialProperties::default(), &mut builder, &[&vf]);
        let mesh = MeshBatch::new(&vf, &material, vec![testing::element(4)]);
        let view = testing::view();
        let policy = BasePassDrawingPolicy::new(
            &vf,
            &material,
            testing::PLATFORM,
            DebugViewShaderMode::None,
            BasePassOptions {
                receive_decal_output: true,
                ..options(LightMapPolicyTag::NoLightmap)
            },
        )
        .expect("policy");

        for (receives, expected) in [(true, 0x08), (false, 0x00)] {
            let mut primitive = PrimitiveSceneInfo::new(PrimitiveId(0), UniformBufferId(7));
            primitive.receives_decals = receives;
            let mut cmd = RecordingCommandList::default();
            draw_mesh_with_policy(
                &mut cmd,
                &policy,
                &pass_state(),
                &view,
                Some(&primitive),
                &mesh,
                &Default::default(),
                PolicyContext::default(),
            )
            .expect("draw");
            assert_eq!(cmd.stencil_refs(), vec![0, expected]);
            assert_eq!(
                cmd.pipeline_states()[0].depth_stencil_state.stencil_write_mask,
                STENCIL_RECEIVE_DECAL_MASK
            );
        }
    }

    #[test]
    fn identical_inputs_compare_equal() {
        let settings = testing::settings();
        let mut builder = ShaderMapBuilder::new(testing::PLATFORM, &settings);
        let vf = testing::local_vertex_factory(1);
        let material = testing::compiled_material(1, MaterialProperties::default(), &mut builder, &[&vf]);
        let make = |light_map| {
            BasePassDrawingPolicy::new(&vf, &material, testing::PLATFORM, DebugViewShaderMode::None, options(light_map))
                .expect("policy")
        };
        let a = make(LightMapPolicyTag::NoLightmap);
        let b = make(LightMapPolicyTag::NoLightmap);
        let hq = make(LightMapPolicyTag::HqLightmap);
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), std::cmp::Ordering::Equal);
        assert_ne!(a, hq);
        assert_eq!(a < hq, hq > a);
    }

    #[test]
    fn decal_materials_are_not_drawn() {
        let settings = testing::settings();
        let mut builder = ShaderMapBuilder::new(testing::PLATFORM, &settings);
        let vf = testing::local_vertex_factory(1);
        let decal = MaterialProperties {
            domain: MaterialDomain::DeferredDecal,
            ..Default::default()
        };
        let material = testing::compiled_material(3, decal, &mut builder, &[&vf]);
        let result = BasePassDrawingPolicy::new(
            &vf,
            &material,
            testing::PLATFORM,
            DebugViewShaderMode::None,
            options(LightMapPolicyTag::NoLightmap),
        );
        assert!(matches!(result, Err(PolicyError::NotApplicable { pass: "BasePass", .. })));
    }

    #[test]
    fn sky_light_rule() {
        let settings = testing::settings();
        let lit = MaterialProperties::default();
        let unlit = MaterialProperties {
            shading_model: ShadingModel::Unlit,
            ..Default::default()
        };
        assert!(uses_sky_light(&lit, Some(true), &settings));
        assert!(!uses_sky_light(&lit, Some(false), &settings));
        assert!(!uses_sky_light(&unlit, Some(true), &settings));
        assert!(!uses_sky_light(&lit, None, &settings));
    }
}

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

//! Shader parameter binding.
//!
//! A [`ShaderBinder`] wraps one compiled shader for the duration of a protocol
//! step. Policies bind the values they have; anything the shader declares but
//! nobody supplied is then bound to an engine fallback by
//! [`ShaderBinder::bind_defaults`], so a shader never samples an unbound slot.

mod light_map;

pub use self::light_map::{bind_light_map_mesh, bind_light_map_shared, LightMapElementData, TranslucentSelfShadow};

use vesper_core::renderer::{
    BufferId, CommandList, CompiledShader, GlobalResources, ParameterFrequency, ParameterKind, SamplerId,
    ShaderParameter, ShaderStage, TextureId, UniformBufferId,
};

/// Binds parameters of one compiled shader, tracking which were set.
#[derive(Debug)]
pub struct ShaderBinder<'s> {
    shader: &'s CompiledShader,
    bound: u64,
}

impl<'s> ShaderBinder<'s> {
    /// Starts a binding step for `shader`.
    pub fn new(shader: &'s CompiledShader) -> Self {
        Self { shader, bound: 0 }
    }

    /// Stage the shader runs in.
    pub fn stage(&self) -> ShaderStage {
        self.shader.stage()
    }

    /// Returns `true` if the shader declares `parameter`.
    pub fn declares(&self, parameter: ShaderParameter) -> bool {
        self.shader.parameters.contains(parameter)
    }

    /// Returns `true` if `parameter` was bound during this step.
    pub fn is_bound(&self, parameter: ShaderParameter) -> bool {
        self.bound & parameter.bit() != 0
    }

    fn slot(&mut self, parameter: ShaderParameter) -> Option<u32> {
        let slot = self.shader.parameters.slot(parameter)?;
        self.bound |= parameter.bit();
        Some(slot)
    }

    /// Binds a uniform buffer. Ignored if the shader does not declare it.
    pub fn set_uniform_buffer(&mut self, cmd: &mut dyn CommandList, parameter: ShaderParameter, buffer: UniformBufferId) {
        debug_assert_eq!(parameter.kind(), ParameterKind::UniformBuffer);
        if let Some(slot) = self.slot(parameter) {
            cmd.set_uniform_buffer(self.stage(), slot, buffer);
        }
    }

    /// Binds a texture with its sampler. Ignored if the shader does not declare it.
    pub fn set_texture(
        &mut self,
        cmd: &mut dyn CommandList,
        parameter: ShaderParameter,
        texture: TextureId,
        sampler: SamplerId,
    ) {
        debug_assert_eq!(parameter.kind(), ParameterKind::Texture);
        if let Some(slot) = self.slot(parameter) {
            cmd.set_shader_texture(self.stage(), slot, texture, sampler);
        }
    }

    /// Binds a structured buffer. Ignored if the shader does not declare it.
    pub fn set_buffer(&mut self, cmd: &mut dyn CommandList, parameter: ShaderParameter, buffer: BufferId) {
        debug_assert_eq!(parameter.kind(), ParameterKind::Buffer);
        if let Some(slot) = self.slot(parameter) {
            cmd.set_shader_buffer(self.stage(), slot, buffer);
        }
    }

    /// Writes a loose value into the stage constant block. Ignored if the shader does
    /// not declare it.
    pub fn set_value<T: bytemuck::Pod>(&mut self, cmd: &mut dyn CommandList, parameter: ShaderParameter, value: &T) {
        debug_assert_eq!(parameter.kind(), ParameterKind::Value);
        if let Some(slot) = self.slot(parameter) {
            cmd.set_shader_value(self.stage(), slot, bytemuck::bytes_of(value));
        }
    }

    /// Binds a fallback to every parameter of `frequency` the shader declares but
    /// that was not bound during this step.
    ///
    /// Uniform buffers get the empty buffer and structured buffers the zero buffer.
    /// Volume textures get the black volume, shadow and occlusion textures get white
    /// (unshadowed, unoccluded) and every other texture gets black. Loose values are
    /// left as they are.
    pub fn bind_defaults(&mut self, cmd: &mut dyn CommandList, frequency: ParameterFrequency, defaults: &GlobalResources) {
        let stage = self.stage();
        let missing: Vec<(ShaderParameter, u32)> = self
            .shader
            .parameters
            .iter()
            .filter(|(parameter, _)| parameter.frequency() == frequency && !self.is_bound(*parameter))
            .collect();
        for (parameter, slot) in missing {
            match parameter.kind() {
                ParameterKind::UniformBuffer => cmd.set_uniform_buffer(stage, slot, defaults.empty_uniform_buffer),
                ParameterKind::Texture => {
                    cmd.set_shader_texture(stage, slot, default_texture(parameter, defaults), defaults.default_sampler)
                }
                ParameterKind::Buffer => cmd.set_shader_buffer(stage, slot, defaults.zero_buffer),
                ParameterKind::Value => continue,
            }
            log::trace!("Bound fallback for {parameter:?} on {:?}.", self.shader.shader_type);
            self.bound |= parameter.bit();
        }
    }
}

fn default_texture(parameter: ShaderParameter, defaults: &GlobalResources) -> TextureId {
    match parameter {
        ShaderParameter::IndirectLightingCacheVolume0
        | ShaderParameter::IndirectLightingCacheVolume1
        | ShaderParameter::IndirectLightingCacheVolume2
        | ShaderParameter::VolumetricLightmapBrickTexture => defaults.black_volume_texture,
        ShaderParameter::SkyOcclusionTexture | ShaderParameter::StaticShadowTexture => defaults.white_texture,
        _ => defaults.black_texture,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesper_core::renderer::{GraphicsPipelineStateInitializer, ShaderId, ShaderParameterMap, ShaderType};
    use vesper_core::scene::VertexFactoryTypeId;

    #[derive(Debug, PartialEq)]
    enum Call {
        UniformBuffer(u32, UniformBufferId),
        Texture(u32, TextureId),
        Buffer(u32, BufferId),
        Value(u32, Vec<u8>),
    }

    #[derive(Default)]
    struct Recorder(Vec<Call>);

    impl CommandList for Recorder {
        fn set_graphics_pipeline_state(&mut self, _: &GraphicsPipelineStateInitializer) {}
        fn set_stencil_ref(&mut self, _: u32) {}
        fn set_uniform_buffer(&mut self, _: ShaderStage, slot: u32, buffer: UniformBufferId) {
            self.0.push(Call::UniformBuffer(slot, buffer));
        }
        fn set_shader_texture(&mut self, _: ShaderStage, slot: u32, texture: TextureId, _: SamplerId) {
            self.0.push(Call::Texture(slot, texture));
        }
        fn set_shader_buffer(&mut self, _: ShaderStage, slot: u32, buffer: BufferId) {
            self.0.push(Call::Buffer(slot, buffer));
        }
        fn set_shader_value(&mut self, _: ShaderStage, slot: u32, data: &[u8]) {
            self.0.push(Call::Value(slot, data.to_vec()));
        }
        fn set_stream_source(&mut self, _: u32, _: BufferId, _: u32) {}
        fn draw_primitive(&mut self, _: u32, _: u32, _: u32) {}
        fn draw_indexed_primitive(&mut self, _: BufferId, _: i32, _: u32, _: u32, _: u32, _: u32, _: u32) {}
    }

    fn pixel_shader(parameters: &[ShaderParameter]) -> CompiledShader {
        CompiledShader {
            id: ShaderId(9),
            shader_type: ShaderType::DepthOnlyPs,
            vertex_factory_type: VertexFactoryTypeId(1),
            parameters: ShaderParameterMap::from_parameters(parameters.iter().copied()),
        }
    }

    #[test]
    fn undeclared_parameters_are_ignored() {
        let shader = pixel_shader(&[ShaderParameter::View]);
        let mut binder = ShaderBinder::new(&shader);
        let mut cmd = Recorder::default();
        binder.set_uniform_buffer(&mut cmd, ShaderParameter::Fog, UniformBufferId(3));
        binder.set_uniform_buffer(&mut cmd, ShaderParameter::View, UniformBufferId(4));
        assert_eq!(cmd.0, vec![Call::UniformBuffer(0, UniformBufferId(4))]);
        assert!(binder.is_bound(ShaderParameter::View));
        assert!(!binder.is_bound(ShaderParameter::Fog));
    }

    #[test]
    fn defaults_fill_only_unbound_slots_of_the_step() {
        let shader = pixel_shader(&[
            ShaderParameter::View,
            ShaderParameter::Fog,
            ShaderParameter::StaticShadowTexture,
            ShaderParameter::LightMapTexture,
            ShaderParameter::IndirectLightingCacheVolume0,
            ShaderParameter::CulledLightDataGrid,
            ShaderParameter::HitProxyColor,
        ]);
        let defaults = GlobalResources::default();
        let mut cmd = Recorder::default();

        let mut shared = ShaderBinder::new(&shader);
        shared.set_uniform_buffer(&mut cmd, ShaderParameter::View, UniformBufferId(4));
        shared.bind_defaults(&mut cmd, ParameterFrequency::Shared, &defaults);
        assert_eq!(
            cmd.0,
            vec![
                Call::UniformBuffer(0, UniformBufferId(4)),
                Call::UniformBuffer(1, defaults.empty_uniform_buffer),
                Call::Texture(2, defaults.black_volume_texture),
                Call::Buffer(0, defaults.zero_buffer),
            ]
        );

        cmd.0.clear();
        let mut mesh = ShaderBinder::new(&shader);
        mesh.set_value(&mut cmd, ShaderParameter::HitProxyColor, &[1.0f32, 0.0, 0.0, 0.0]);
        mesh.bind_defaults(&mut cmd, ParameterFrequency::PerMesh, &defaults);
        assert_eq!(cmd.0.len(), 3);
        assert!(cmd.0.contains(&Call::Texture(0, defaults.white_texture)));
        assert!(cmd.0.contains(&Call::Texture(1, defaults.black_texture)));
    }
}

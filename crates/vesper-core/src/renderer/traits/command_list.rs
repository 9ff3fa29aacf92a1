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

use crate::renderer::api::pipeline::GraphicsPipelineStateInitializer;
use crate::renderer::api::resource::{BufferId, SamplerId, TextureId, UniformBufferId};
use crate::renderer::api::shader::ShaderStage;

/// A trait for an object that records RHI commands on the rendering thread.
///
/// This is the only entry point set the mesh drawing code uses. Implementations
/// translate each call for a concrete backend or record it for later submission.
/// Every method is non-blocking from the caller's point of view.
pub trait CommandList {
    /// Commits a complete pipeline state object for subsequent draws.
    fn set_graphics_pipeline_state(&mut self, initializer: &GraphicsPipelineStateInitializer);

    /// Sets the stencil reference value used by the committed depth-stencil state.
    fn set_stencil_ref(&mut self, value: u32);

    /// Binds a uniform buffer to a slot of a stage.
    fn set_uniform_buffer(&mut self, stage: ShaderStage, slot: u32, buffer: UniformBufferId);

    /// Binds a texture and its sampler to a slot of a stage.
    fn set_shader_texture(&mut self, stage: ShaderStage, slot: u32, texture: TextureId, sampler: SamplerId);

    /// Binds a structured buffer to a slot of a stage.
    fn set_shader_buffer(&mut self, stage: ShaderStage, slot: u32, buffer: BufferId);

    /// Writes loose bytes into a stage's constant block.
    fn set_shader_value(&mut self, stage: ShaderStage, slot: u32, data: &[u8]);

    /// Binds a vertex stream.
    fn set_stream_source(&mut self, stream_index: u32, buffer: BufferId, offset: u32);

    /// Records a non-indexed draw.
    fn draw_primitive(&mut self, base_vertex: u32, num_primitives: u32, num_instances: u32);

    /// Records an indexed draw.
    #[allow(clippy::too_many_arguments)]
    fn draw_indexed_primitive(
        &mut self,
        index_buffer: BufferId,
        base_vertex: i32,
        first_instance: u32,
        num_vertices: u32,
        start_index: u32,
        num_primitives: u32,
        num_instances: u32,
    );
}

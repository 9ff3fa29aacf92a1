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

//! Recording command list and scene fixtures shared by the unit tests.

use crate::permutation::ShaderMapBuilder;
use vesper_core::material::{Material, MaterialInstance, MaterialProperties, MaterialProxyId};
use vesper_core::renderer::{
    BufferId, CommandList, FeatureLevel, GlobalResources, GraphicsPipelineStateInitializer, SamplerId,
    ShaderPlatform, ShaderStage, TextureId, UniformBufferId, VertexDeclarationId,
};
use vesper_core::scene::{
    MeshBatchElement, SceneView, VertexFactory, VertexFactoryId, VertexFactoryType, VertexFactoryTypeId,
    VertexStream,
};
use vesper_core::settings::RendererSettings;

/// One recorded RHI call.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    PipelineState(GraphicsPipelineStateInitializer),
    StencilRef(u32),
    UniformBuffer {
        stage: ShaderStage,
        slot: u32,
        buffer: UniformBufferId,
    },
    Texture {
        stage: ShaderStage,
        slot: u32,
        texture: TextureId,
        sampler: SamplerId,
    },
    Buffer {
        stage: ShaderStage,
        slot: u32,
        buffer: BufferId,
    },
    Value {
        stage: ShaderStage,
        slot: u32,
        data: Vec<u8>,
    },
    StreamSource {
        index: u32,
        buffer: BufferId,
        offset: u32,
    },
    Draw {
        base_vertex: u32,
        num_primitives: u32,
        num_instances: u32,
    },
    DrawIndexed {
        index_buffer: BufferId,
        num_vertices: u32,
        start_index: u32,
        num_primitives: u32,
        num_instances: u32,
    },
}

#[derive(Debug, Default)]
pub struct RecordingCommandList {
    pub calls: Vec<RecordedCall>,
}

impl RecordingCommandList {
    pub fn draws(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, RecordedCall::Draw { .. } | RecordedCall::DrawIndexed { .. }))
            .count()
    }

    pub fn pipeline_states(&self) -> Vec<&GraphicsPipelineStateInitializer> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::PipelineState(init) => Some(init),
                _ => None,
            })
            .collect()
    }

    pub fn stencil_refs(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::StencilRef(value) => Some(*value),
                _ => None,
            })
            .collect()
    }
}

impl CommandList for RecordingCommandList {
    fn set_graphics_pipeline_state(&mut self, initializer: &GraphicsPipelineStateInitializer) {
        self.calls.push(RecordedCall::PipelineState(initializer.clone()));
    }

    fn set_stencil_ref(&mut self, value: u32) {
        self.calls.push(RecordedCall::StencilRef(value));
    }

    fn set_uniform_buffer(&mut self, stage: ShaderStage, slot: u32, buffer: UniformBufferId) {
        self.calls.push(RecordedCall::UniformBuffer { stage, slot, buffer });
    }

    fn set_shader_texture(&mut self, stage: ShaderStage, slot: u32, texture: TextureId, sampler: SamplerId) {
        self.calls.push(RecordedCall::Texture {
            stage,
            slot,
            texture,
            sampler,
        });
    }

    fn set_shader_buffer(&mut self, stage: ShaderStage, slot: u32, buffer: BufferId) {
        self.calls.push(RecordedCall::Buffer { stage, slot, buffer });
    }

    fn set_shader_value(&mut self, stage: ShaderStage, slot: u32, data: &[u8]) {
        self.calls.push(RecordedCall::Value {
            stage,
            slot,
            data: data.to_vec(),
        });
    }

    fn set_stream_source(&mut self, index: u32, buffer: BufferId, offset: u32) {
        self.calls.push(RecordedCall::StreamSource { index, buffer, offset });
    }

    fn draw_primitive(&mut self, base_vertex: u32, num_primitives: u32, num_instances: u32) {
        self.calls.push(RecordedCall::Draw {
            base_vertex,
            num_primitives,
            num_instances,
        });
    }

    fn draw_indexed_primitive(
        &mut self,
        index_buffer: BufferId,
        _base_vertex: i32,
        _first_instance: u32,
        num_vertices: u32,
        start_index: u32,
        num_primitives: u32,
        num_instances: u32,
    ) {
        self.calls.push(RecordedCall::DrawIndexed {
            index_buffer,
            num_vertices,
            start_index,
            num_primitives,
            num_instances,
        });
    }
}

/// A vertex factory with static lighting and position-only support.
pub fn local_vertex_factory(id: u32) -> VertexFactory {
    let n = id as usize;
    VertexFactory {
        id: VertexFactoryId(id),
        ty: VertexFactoryType {
            supports_static_lighting: true,
            supports_position_only: true,
            ..VertexFactoryType::new(VertexFactoryTypeId(1), "LocalVertexFactory")
        },
        declaration: VertexDeclarationId(n * 10),
        position_only_declaration: Some(VertexDeclarationId(n * 10 + 1)),
        streams: vec![
            VertexStream {
                buffer: BufferId(n * 10),
                offset: 0,
            },
            VertexStream {
                buffer: BufferId(n * 10 + 1),
                offset: 0,
            },
        ],
        position_streams: vec![VertexStream {
            buffer: BufferId(n * 10 + 2),
            offset: 0,
        }],
    }
}

/// Compiles `properties` for every vertex factory type in `factories`.
pub fn compiled_material(
    id: u32,
    properties: MaterialProperties,
    builder: &mut ShaderMapBuilder<'_>,
    factories: &[&VertexFactory],
) -> MaterialInstance {
    let types: Vec<VertexFactoryType> = factories.iter().map(|vf| vf.ty).collect();
    let shader_map = builder.build(&properties, &types);
    MaterialInstance::new(
        MaterialProxyId(id),
        Material {
            properties,
            shader_map,
        },
        UniformBufferId(1000 + id as usize),
    )
}

/// The engine default material: opaque, lit, special.
pub fn default_material_properties() -> MaterialProperties {
    MaterialProperties {
        is_special_engine_material: true,
        ..Default::default()
    }
}

pub fn settings() -> RendererSettings {
    RendererSettings::default()
}

pub const PLATFORM: ShaderPlatform = ShaderPlatform::D3dSm5;

pub fn element(num_primitives: u32) -> MeshBatchElement {
    MeshBatchElement {
        num_primitives,
        num_instances: 1,
        ..Default::default()
    }
}

pub fn view() -> SceneView {
    SceneView::new(FeatureLevel::Sm5, PLATFORM, UniformBufferId(1), GlobalResources::default())
}

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

//! A recording command list and scene fixtures for the integration tests.

#![allow(dead_code)]

use vesper_core::material::{Material, MaterialInstance, MaterialProperties, MaterialProxyId};
use vesper_core::renderer::{
    BufferId, CommandList, FeatureLevel, GlobalResources, GraphicsPipelineStateInitializer, SamplerId,
    ShaderPlatform, ShaderStage, TextureId, UniformBufferId, VertexDeclarationId,
};
use vesper_core::scene::{
    MeshBatchElement, SceneView, VertexFactory, VertexFactoryId, VertexFactoryType, VertexFactoryTypeId,
    VertexStream,
};
use vesper_lanes::permutation::ShaderMapBuilder;

pub const PLATFORM: ShaderPlatform = ShaderPlatform::D3dSm5;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Pipeline(GraphicsPipelineStateInitializer),
    StencilRef(u32),
    UniformBuffer(ShaderStage, u32, UniformBufferId),
    Texture(ShaderStage, u32, TextureId, SamplerId),
    Buffer(ShaderStage, u32, BufferId),
    Value(ShaderStage, u32, Vec<u8>),
    Stream(u32, BufferId),
    Draw(u32),
}

#[derive(Debug, Default)]
pub struct MockCommandList {
    pub calls: Vec<Call>,
}

impl MockCommandList {
    pub fn draws(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Draw(_))).count()
    }

    pub fn pipelines(&self) -> Vec<&GraphicsPipelineStateInitializer> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Pipeline(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl CommandList for MockCommandList {
    fn set_graphics_pipeline_state(&mut self, initializer: &GraphicsPipelineStateInitializer) {
        self.calls.push(Call::Pipeline(initializer.clone()));
    }

    fn set_stencil_ref(&mut self, value: u32) {
        self.calls.push(Call::StencilRef(value));
    }

    fn set_uniform_buffer(&mut self, stage: ShaderStage, slot: u32, buffer: UniformBufferId) {
        self.calls.push(Call::UniformBuffer(stage, slot, buffer));
    }

    fn set_shader_texture(&mut self, stage: ShaderStage, slot: u32, texture: TextureId, sampler: SamplerId) {
        self.calls.push(Call::Texture(stage, slot, texture, sampler));
    }

    fn set_shader_buffer(&mut self, stage: ShaderStage, slot: u32, buffer: BufferId) {
        self.calls.push(Call::Buffer(stage, slot, buffer));
    }

    fn set_shader_value(&mut self, stage: ShaderStage, slot: u32, data: &[u8]) {
        self.calls.push(Call::Value(stage, slot, data.to_vec()));
    }

    fn set_stream_source(&mut self, index: u32, buffer: BufferId, _offset: u32) {
        self.calls.push(Call::Stream(index, buffer));
    }

    fn draw_primitive(&mut self, _base_vertex: u32, num_primitives: u32, _num_instances: u32) {
        self.calls.push(Call::Draw(num_primitives));
    }

    fn draw_indexed_primitive(
        &mut self,
        _index_buffer: BufferId,
        _base_vertex: i32,
        _first_instance: u32,
        _num_vertices: u32,
        _start_index: u32,
        num_primitives: u32,
        _num_instances: u32,
    ) {
        self.calls.push(Call::Draw(num_primitives));
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn vertex_factory(id: u32) -> VertexFactory {
    let base = id as usize * 10;
    VertexFactory {
        id: VertexFactoryId(id),
        ty: VertexFactoryType {
            supports_static_lighting: true,
            supports_position_only: true,
            ..VertexFactoryType::new(VertexFactoryTypeId(1), "LocalVertexFactory")
        },
        declaration: VertexDeclarationId(base),
        position_only_declaration: Some(VertexDeclarationId(base + 1)),
        streams: vec![VertexStream {
            buffer: BufferId(base),
            offset: 0,
        }],
        position_streams: vec![VertexStream {
            buffer: BufferId(base + 1),
            offset: 0,
        }],
    }
}

pub fn material(
    id: u32,
    properties: MaterialProperties,
    builder: &mut ShaderMapBuilder<'_>,
    factories: &[&VertexFactory],
) -> MaterialInstance {
    let types: Vec<VertexFactoryType> = factories.iter().map(|vf| vf.ty).collect();
    MaterialInstance::new(
        MaterialProxyId(id),
        Material {
            shader_map: builder.build(&properties, &types),
            properties,
        },
        UniformBufferId(1000 + id as usize),
    )
}

pub fn default_material_properties() -> MaterialProperties {
    MaterialProperties {
        is_special_engine_material: true,
        ..Default::default()
    }
}

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

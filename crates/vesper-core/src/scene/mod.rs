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

//! The scene data model consumed by the mesh drawing code.
//!
//! Primitives, views, mesh batches and vertex factories are produced by the
//! visibility and scene-proxy systems. This module only defines their render-thread
//! shape.

mod mesh;
mod primitive;
mod vertex_factory;
mod view;

pub use self::mesh::{MeshBatch, MeshBatchElement, StaticMesh, StaticMeshId};
pub use self::primitive::{
    IndirectLightingCacheAllocation, IndirectLightingCacheQuality, Mobility, PrimitiveId,
    PrimitiveSceneInfo,
};
pub use self::vertex_factory::{
    VertexFactory, VertexFactoryId, VertexFactoryType, VertexFactoryTypeId, VertexStream,
};
pub use self::view::{
    DebugViewShaderMode, ForwardLightData, LightMapDensitySettings, SceneView, ShowFlags,
};

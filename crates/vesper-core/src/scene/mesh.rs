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

//! Mesh batches: the renderer-visible units of geometry.

use super::primitive::PrimitiveId;
use super::vertex_factory::VertexFactory;
use crate::hit_proxy::HitProxyId;
use crate::material::MaterialRenderProxy;
use crate::renderer::api::pipeline::PrimitiveTopology;
use crate::renderer::api::resource::{BufferId, UniformBufferId};
use crate::renderer::light_map::LightCacheInterface;
use std::fmt;

/// One draw call's worth of a mesh batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshBatchElement {
    /// Per-element primitive uniform buffer, overriding the primitive's own.
    pub primitive_uniform_buffer: Option<UniformBufferId>,
    /// Index buffer, `None` for non-indexed draws.
    pub index_buffer: Option<BufferId>,
    /// First index read.
    pub first_index: u32,
    /// Number of primitives drawn.
    pub num_primitives: u32,
    /// Number of instances drawn.
    pub num_instances: u32,
    /// Lowest vertex index referenced.
    pub min_vertex_index: u32,
    /// Highest vertex index referenced.
    pub max_vertex_index: u32,
}

/// Geometry plus the material and flags needed to draw it.
///
/// Holds non-owning references to its vertex factory, material proxy and static
/// lighting data. Dynamic batches live for one frame; batches inside a
/// [`StaticMesh`] live as long as their primitive.
#[derive(Clone)]
pub struct MeshBatch<'a> {
    /// Vertex streams and their type.
    pub vertex_factory: &'a VertexFactory,
    /// Material the batch renders with.
    pub material_render_proxy: &'a dyn MaterialRenderProxy,
    /// One entry per draw call.
    pub elements: Vec<MeshBatchElement>,
    /// Baked lighting of the batch, if any.
    pub light_cache: Option<&'a LightCacheInterface>,
    /// How vertices are assembled, before tessellation is considered.
    pub topology: PrimitiveTopology,
    /// Disable backface culling for this batch regardless of material.
    pub two_sided: bool,
    /// Flip the winding used for culling (negative-determinant transforms).
    pub reverse_culling: bool,
    /// Force wireframe fill.
    pub wireframe: bool,
    /// Participates in dithered LOD transitions.
    pub dithered_lod_transition: bool,
    /// Drawn in shadow depth passes.
    pub cast_shadow: bool,
}

impl<'a> MeshBatch<'a> {
    /// A triangle-list batch with every flag cleared.
    pub fn new(
        vertex_factory: &'a VertexFactory,
        material_render_proxy: &'a dyn MaterialRenderProxy,
        elements: Vec<MeshBatchElement>,
    ) -> Self {
        Self {
            vertex_factory,
            material_render_proxy,
            elements,
            light_cache: None,
            topology: PrimitiveTopology::TriangleList,
            two_sided: false,
            reverse_culling: false,
            wireframe: false,
            dithered_lod_transition: false,
            cast_shadow: true,
        }
    }

    /// Attaches baked lighting.
    pub fn with_light_cache(mut self, light_cache: &'a LightCacheInterface) -> Self {
        self.light_cache = Some(light_cache);
        self
    }

    /// Number of draw calls.
    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }
}

impl fmt::Debug for MeshBatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshBatch")
            .field("vertex_factory", &self.vertex_factory.id)
            .field("material", &self.material_render_proxy.id())
            .field("elements", &self.elements.len())
            .field("topology", &self.topology)
            .finish_non_exhaustive()
    }
}

/// Index of a static mesh in its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StaticMeshId(pub usize);

/// A mesh batch cached across frames, owned by a primitive.
#[derive(Debug, Clone)]
pub struct StaticMesh<'a> {
    /// Identity, also the bit index in per-view visibility arrays.
    pub id: StaticMeshId,
    /// Owning primitive.
    pub primitive: PrimitiveId,
    /// The batch.
    pub batch: MeshBatch<'a>,
    /// Hit proxy the batch is picked as.
    pub hit_proxy_id: HitProxyId,
}

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

//! Vertex factories: how a mesh's vertex streams are fetched, and what the shaders
//! compiled against them can do.

use crate::renderer::api::resource::{BufferId, VertexDeclarationId};

/// Identity of a vertex factory type. Part of every drawing policy's sort key and of
/// every shader map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexFactoryTypeId(pub u32);

/// Identity of a vertex factory instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexFactoryId(pub u32);

/// Capabilities of a vertex factory type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexFactoryType {
    /// Identity.
    pub id: VertexFactoryTypeId,
    /// Human readable name, for logs.
    pub name: &'static str,
    /// Provides lightmap UVs.
    pub supports_static_lighting: bool,
    /// Can feed hull and domain shaders.
    pub supports_tessellation_shaders: bool,
    /// Has a separate position-only stream for depth passes.
    pub supports_position_only: bool,
}

impl VertexFactoryType {
    /// A type with every capability disabled.
    pub const fn new(id: VertexFactoryTypeId, name: &'static str) -> Self {
        Self {
            id,
            name,
            supports_static_lighting: false,
            supports_tessellation_shaders: false,
            supports_position_only: false,
        }
    }
}

/// One bound vertex stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexStream {
    /// The vertex buffer.
    pub buffer: BufferId,
    /// Byte offset of the first vertex.
    pub offset: u32,
}

/// A vertex factory instance: its type, its declarations and its streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexFactory {
    /// Identity.
    pub id: VertexFactoryId,
    /// Type and capabilities.
    pub ty: VertexFactoryType,
    /// Full vertex declaration.
    pub declaration: VertexDeclarationId,
    /// Declaration of the position-only stream, when the type supports it.
    pub position_only_declaration: Option<VertexDeclarationId>,
    /// Full vertex streams.
    pub streams: Vec<VertexStream>,
    /// Position-only streams.
    pub position_streams: Vec<VertexStream>,
}

impl VertexFactory {
    /// Type identity shortcut.
    pub fn type_id(&self) -> VertexFactoryTypeId {
        self.ty.id
    }

    /// Vertex declaration for the full or position-only stream set.
    pub fn declaration_for(&self, position_only: bool) -> VertexDeclarationId {
        match (position_only, self.position_only_declaration) {
            (true, Some(declaration)) => declaration,
            _ => self.declaration,
        }
    }

    /// Streams for the full or position-only stream set.
    pub fn streams_for(&self, position_only: bool) -> &[VertexStream] {
        if position_only && self.position_only_declaration.is_some() {
            &self.position_streams
        } else {
            &self.streams
        }
    }
}

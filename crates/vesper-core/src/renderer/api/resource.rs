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

//! Opaque handles to GPU resources and the engine-wide fallback resources.

/// An opaque handle to a GPU buffer resource (vertex, index or structured).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub usize);

/// An opaque handle to a GPU texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

/// An opaque handle to a GPU sampler resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SamplerId(pub usize);

/// An opaque handle to a GPU uniform buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformBufferId(pub usize);

/// An opaque handle to a vertex declaration (the input layout of a vertex stream set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexDeclarationId(pub usize);

/// Harmless resources bound to every slot a shader declares but the active
/// light-map policy does not supply. Some backends fault on unbound slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalResources {
    /// 1x1 texture, all channels zero.
    pub black_texture: TextureId,
    /// 1x1 texture, all channels one.
    pub white_texture: TextureId,
    /// 1x1x1 volume texture, all channels zero.
    pub black_volume_texture: TextureId,
    /// Point-clamp sampler used with every fallback texture.
    pub default_sampler: SamplerId,
    /// Small zero-filled structured buffer.
    pub zero_buffer: BufferId,
    /// Zero-filled uniform buffer large enough for any declared block.
    pub empty_uniform_buffer: UniformBufferId,
}

impl Default for GlobalResources {
    fn default() -> Self {
        // Slot 0 of each handle space is reserved for the fallbacks by convention.
        Self {
            black_texture: TextureId(0),
            white_texture: TextureId(1),
            black_volume_texture: TextureId(2),
            default_sampler: SamplerId(0),
            zero_buffer: BufferId(0),
            empty_uniform_buffer: UniformBufferId(0),
        }
    }
}

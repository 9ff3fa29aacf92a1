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

//! Render-thread state of a scene primitive.

use crate::hit_proxy::HitProxyId;
use crate::renderer::api::resource::{BufferId, UniformBufferId};
use glam::{Mat4, Vec4};
use serde::{Deserialize, Serialize};

/// Index of a primitive in its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(pub usize);

/// Whether a primitive can move at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mobility {
    /// Never moves, fully baked lighting.
    #[default]
    Static,
    /// Never moves, lights affecting it may change.
    Stationary,
    /// Moves freely, no baked lighting.
    Movable,
}

/// How a primitive samples the indirect lighting cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndirectLightingCacheQuality {
    /// Never uses the cache.
    Off,
    /// One SH sample at the primitive's center.
    #[default]
    Point,
    /// Interpolated from a volume texture.
    Volume,
}

/// A primitive's slot in the indirect lighting cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndirectLightingCacheAllocation {
    /// `false` until the cache has been populated for the slot.
    pub is_valid: bool,
    /// Single-sample allocation rather than a volume block.
    pub point_sample: bool,
    /// Volume texture UV add.
    pub add: Vec4,
    /// Volume texture UV scale.
    pub scale: Vec4,
    /// Uniform buffer holding the point sample SH coefficients.
    pub uniform_buffer: Option<UniformBufferId>,
    /// Structured buffer of point samples, when the platform reads them that way.
    pub point_samples: Option<BufferId>,
}

/// Render-thread state of one primitive, as the drawing code consults it.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSceneInfo {
    /// Identity.
    pub id: PrimitiveId,
    /// Mobility.
    pub mobility: Mobility,
    /// Current transform.
    pub local_to_world: Mat4,
    /// Previous frame's transform, for velocity.
    pub previous_local_to_world: Mat4,
    /// Per-primitive uniform buffer.
    pub uniform_buffer: UniformBufferId,
    /// Decals project onto this primitive.
    pub receives_decals: bool,
    /// Static lighting settings are usable (e.g. non-zero lightmap resolution).
    pub has_valid_static_lighting: bool,
    /// Lighting is unbuilt and the primitive should use preview lighting.
    pub needs_unbuilt_preview_lighting: bool,
    /// Indirect lighting cache quality.
    pub indirect_lighting_cache_quality: IndirectLightingCacheQuality,
    /// Indirect lighting cache slot, if allocated.
    pub indirect_lighting_cache_allocation: Option<IndirectLightingCacheAllocation>,
    /// Hit proxy the whole primitive is picked as.
    pub hit_proxy_id: HitProxyId,
    /// Dynamic point lights affecting the primitive (mobile).
    pub num_mobile_dynamic_point_lights: u8,
    /// Receives dynamic cascaded shadows alongside static shadowing (mobile).
    pub receives_csm: bool,
    /// Drawn into the depth prepass as an occluder.
    pub use_as_occluder: bool,
    /// Hidden from the picking pass.
    pub selectable: bool,
}

impl PrimitiveSceneInfo {
    /// A static, identity-transformed primitive with default flags.
    pub fn new(id: PrimitiveId, uniform_buffer: UniformBufferId) -> Self {
        Self {
            id,
            mobility: Mobility::Static,
            local_to_world: Mat4::IDENTITY,
            previous_local_to_world: Mat4::IDENTITY,
            uniform_buffer,
            receives_decals: true,
            has_valid_static_lighting: true,
            needs_unbuilt_preview_lighting: false,
            indirect_lighting_cache_quality: IndirectLightingCacheQuality::Point,
            indirect_lighting_cache_allocation: None,
            hit_proxy_id: HitProxyId::INVISIBLE,
            num_mobile_dynamic_point_lights: 0,
            receives_csm: false,
            use_as_occluder: true,
            selectable: true,
        }
    }

    /// Movable mobility.
    pub fn is_movable(&self) -> bool {
        self.mobility == Mobility::Movable
    }

    /// Returns `true` if the transform changed since last frame.
    pub fn has_moved(&self) -> bool {
        self.local_to_world != self.previous_local_to_world
    }
}

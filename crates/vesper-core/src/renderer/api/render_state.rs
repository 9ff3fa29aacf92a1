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

//! The per-draw bundle of fixed-function state a pass hands to a drawing policy.

use super::pipeline::{BlendState, DepthStencilState};
use super::resource::UniformBufferId;
use crate::renderer::error::DrawError;
use bitflags::bitflags;

bitflags! {
    /// View-level overrides composed with a mesh's own rasterizer flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ViewOverrideFlags: u8 {
        /// Disable culling for every mesh.
        const TWO_SIDED = 1 << 0;
        /// The mesh is fading between LODs with a dither pattern.
        const DITHERED_LOD_TRANSITION = 1 << 1;
        /// Force wireframe fill.
        const WIREFRAME = 1 << 2;
        /// Invert the cull mode (mirrored views, planar reflections).
        const REVERSE_CULLING = 1 << 3;
    }
}

/// Which aspects of the bound depth-stencil target a pass may read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthStencilAccess {
    /// Depth and stencil are both writable.
    #[default]
    DepthWriteStencilWrite,
    /// Depth writable, stencil untouched.
    DepthWriteStencilNop,
    /// Depth read-only, stencil untouched.
    DepthReadStencilNop,
    /// Depth read-only, stencil writable.
    DepthReadStencilWrite,
    /// Neither is accessed.
    DepthNopStencilNop,
}

/// Fixed-function state for one draw.
///
/// This is a value type. A pass owns one per pass and clones it per primitive before
/// any mesh-specific change, so a change made for one primitive never leaks into the
/// next.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStateDescriptor {
    /// Blend state of the first render target. Required before commit.
    pub blend_state: Option<BlendState>,
    /// Depth-stencil state. Required before commit.
    pub depth_stencil_state: Option<DepthStencilState>,
    /// Access the pass has to the depth-stencil target.
    pub depth_stencil_access: DepthStencilAccess,
    /// Stencil reference value.
    pub stencil_ref: u32,
    /// The view uniform buffer.
    pub view_uniform_buffer: Option<UniformBufferId>,
    /// The second eye's view uniform buffer in instanced stereo.
    pub instanced_view_uniform_buffer: Option<UniformBufferId>,
    /// View-level overrides.
    pub view_overrides: ViewOverrideFlags,
    /// Alpha of the dithered LOD fade, used when the flag is set.
    pub dithered_lod_transition_alpha: f32,
}

impl RenderStateDescriptor {
    /// A state bound to the given view uniform buffer, with nothing else set.
    pub fn new(view_uniform_buffer: UniformBufferId) -> Self {
        Self {
            blend_state: None,
            depth_stencil_state: None,
            depth_stencil_access: DepthStencilAccess::default(),
            stencil_ref: 0,
            view_uniform_buffer: Some(view_uniform_buffer),
            instanced_view_uniform_buffer: None,
            view_overrides: ViewOverrideFlags::empty(),
            dithered_lod_transition_alpha: 0.0,
        }
    }

    /// Sets the blend state.
    pub fn set_blend_state(&mut self, state: BlendState) {
        self.blend_state = Some(state);
    }

    /// Sets the depth-stencil state.
    pub fn set_depth_stencil_state(&mut self, state: DepthStencilState) {
        self.depth_stencil_state = Some(state);
    }

    /// Sets the stencil reference value.
    pub fn set_stencil_ref(&mut self, value: u32) {
        self.stencil_ref = value;
    }

    /// Builder form of [`Self::set_blend_state`].
    pub fn with_blend_state(mut self, state: BlendState) -> Self {
        self.blend_state = Some(state);
        self
    }

    /// Builder form of [`Self::set_depth_stencil_state`].
    pub fn with_depth_stencil_state(mut self, state: DepthStencilState) -> Self {
        self.depth_stencil_state = Some(state);
        self
    }

    /// Builder that sets the access mode.
    pub fn with_access(mut self, access: DepthStencilAccess) -> Self {
        self.depth_stencil_access = access;
        self
    }

    /// Returns both required states, or the first one missing.
    pub fn resolved_states(&self) -> Result<(BlendState, DepthStencilState), DrawError> {
        let blend = self.blend_state.ok_or(DrawError::MissingBlendState)?;
        let depth_stencil = self
            .depth_stencil_state
            .ok_or(DrawError::MissingDepthStencilState)?;
        Ok((blend, depth_stencil))
    }
}

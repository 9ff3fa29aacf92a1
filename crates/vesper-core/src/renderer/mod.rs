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

//! Provides the public, backend-agnostic rendering contracts for Vesper.
//!
//! This module defines the "common language" shared by the mesh drawing code and
//! rendering backends: the [`CommandList`] trait, fixed-function state
//! descriptors, shader permutations and shader maps, light-map policy tags and the
//! error types of the subsystem. The decisions themselves (which permutation, which
//! state, in which order) live in `vesper-lanes`.

pub mod api;
pub mod command_queue;
pub mod error;
pub mod light_map;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::command_queue::{RenderCommand, RenderCommandQueue, RenderCommandSender};
pub use self::error::{DrawError, HitProxyError, ShaderError};
pub use self::light_map::{
    LightCacheInterface, LightMapInteraction, LightMapInteractionType, LightMapPolicyTag,
    ShadowMapInteraction, ShadowMapInteractionType,
};
pub use self::traits::CommandList;

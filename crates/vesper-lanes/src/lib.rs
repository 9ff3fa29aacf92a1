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

//! # Vesper Lanes
//!
//! The hot path of mesh drawing: capability predicates and shader-map building,
//! light-map policy selection, resource binding, the drawing policies, the static
//! draw list and the per-pass lanes that drive them.
//!
//! Everything here is generic over [`vesper_core::renderer::CommandList`]; nothing
//! in this crate talks to a graphics API directly.

#![warn(missing_docs)]

pub mod binding;
pub mod config;
pub mod drawing_policy;
pub mod error;
pub mod permutation;
pub mod render_lane;
pub mod selector;
pub mod static_draw_list;

#[cfg(test)]
mod testing;

pub use drawing_policy::{DrawingPolicy, PolicyContext};
pub use error::{PolicyError, SettingsError};
pub use render_lane::{FrameContext, FrameSequencer, MeshPassLane, Scene};
pub use selector::{select_light_map_policy, LightingCapabilities};
pub use static_draw_list::StaticDrawList;

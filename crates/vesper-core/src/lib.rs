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

//! # Vesper Core
//!
//! Foundational crate of the mesh drawing system: the RHI contract, fixed-function
//! state descriptors, shader permutations, the material contract, the scene data
//! model, renderer settings and the hit-proxy registry.

#![warn(missing_docs)]

pub mod context;
pub mod hit_proxy;
pub mod material;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod util;

pub use context::RendererContext;
pub use settings::{DepthDrawingMode, RendererSettings};

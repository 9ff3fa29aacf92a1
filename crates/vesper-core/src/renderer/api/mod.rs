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

//! Backend-agnostic rendering API.
//!
//! Organized into several logical sub-modules:
//!
//! - **[`pipeline`]**: Fixed-function state descriptors and the pipeline initializer.
//! - **[`platform`]**: Feature levels and shader platforms.
//! - **[`render_state`]**: The per-draw render state descriptor.
//! - **[`resource`]**: GPU handles and the fallback resources.
//! - **[`shader`]**: Shader permutations, declared parameters and shader maps.

pub mod pipeline;
pub mod platform;
pub mod render_state;
pub mod resource;
pub mod shader;

pub use self::pipeline::*;
pub use self::platform::*;
pub use self::render_state::*;
pub use self::resource::*;
pub use self::shader::*;

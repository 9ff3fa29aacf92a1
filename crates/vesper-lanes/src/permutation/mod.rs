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

//! Capability predicates: which shader permutations exist at all.
//!
//! Each predicate is a pure function of the shader platform, the material's
//! properties, the vertex factory type and the renderer settings. A derived
//! permutation's predicate is always the conjunction of its own condition with
//! the predicate it is derived from, so a derived permutation can never exist
//! without its base.

mod light_map;
mod passes;
mod shader_map_builder;

pub use self::light_map::light_map_policy_should_compile;
pub use self::passes::*;
pub use self::shader_map_builder::{all_shader_types, declared_parameters, ShaderMapBuilder};

use vesper_core::material::MaterialProperties;
use vesper_core::renderer::{FeatureLevel, ShaderPlatform};
use vesper_core::scene::VertexFactoryType;
use vesper_core::settings::RendererSettings;

/// Upper bound of the fixed mobile point light permutations.
pub const MAX_MOBILE_POINT_LIGHTS: u8 = 4;

/// Everything a compile predicate may consult.
#[derive(Debug, Clone, Copy)]
pub struct PermutationContext<'a> {
    /// Target platform.
    pub platform: ShaderPlatform,
    /// Properties of the material being compiled.
    pub material: &'a MaterialProperties,
    /// Vertex factory type being compiled against.
    pub vertex_factory: &'a VertexFactoryType,
    /// Project settings.
    pub settings: &'a RendererSettings,
}

impl<'a> PermutationContext<'a> {
    /// Bundles the predicate inputs.
    pub fn new(
        platform: ShaderPlatform,
        material: &'a MaterialProperties,
        vertex_factory: &'a VertexFactoryType,
        settings: &'a RendererSettings,
    ) -> Self {
        Self {
            platform,
            material,
            vertex_factory,
            settings,
        }
    }

    pub(crate) fn supports(&self, level: FeatureLevel) -> bool {
        self.platform.supports_feature_level(level)
    }

    /// Desktop platforms running the simple forward path.
    pub(crate) fn simple_forward(&self) -> bool {
        self.settings.simple_forward_shading && !self.platform.is_mobile()
    }
}

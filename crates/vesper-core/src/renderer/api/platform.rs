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

//! Feature levels and shader platforms.

use serde::{Deserialize, Serialize};

/// The capability tier of the running RHI. Ordered from least to most capable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureLevel {
    /// OpenGL ES 2 class hardware.
    Es2,
    /// OpenGL ES 3.1 / Metal / Vulkan mobile class hardware.
    Es3_1,
    /// Shader model 4.
    Sm4,
    /// Shader model 5. The only level with tessellation.
    Sm5,
}

impl FeatureLevel {
    /// Returns `true` for the mobile tiers, which use the mobile base pass.
    pub fn is_mobile(self) -> bool {
        self < FeatureLevel::Sm4
    }
}

/// A concrete shader compilation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShaderPlatform {
    /// Direct3D, shader model 5.
    D3dSm5,
    /// Direct3D, shader model 4.
    D3dSm4,
    /// Vulkan, shader model 5.
    VulkanSm5,
    /// Desktop Metal, shader model 5.
    MetalSm5,
    /// Desktop Metal with multiple render targets.
    MetalMrt,
    /// Mobile Metal.
    Metal,
    /// OpenGL ES 3.1.
    GlEs3_1,
    /// Vulkan mobile profile.
    VulkanEs3_1,
    /// OpenGL ES 2.
    GlEs2,
}

impl ShaderPlatform {
    /// Highest feature level this platform compiles for.
    pub fn max_feature_level(self) -> FeatureLevel {
        match self {
            ShaderPlatform::D3dSm5 | ShaderPlatform::VulkanSm5 | ShaderPlatform::MetalSm5 | ShaderPlatform::MetalMrt => {
                FeatureLevel::Sm5
            }
            ShaderPlatform::D3dSm4 => FeatureLevel::Sm4,
            ShaderPlatform::Metal | ShaderPlatform::GlEs3_1 | ShaderPlatform::VulkanEs3_1 => FeatureLevel::Es3_1,
            ShaderPlatform::GlEs2 => FeatureLevel::Es2,
        }
    }

    /// Returns `true` if shaders for `level` are compiled on this platform.
    pub fn supports_feature_level(self, level: FeatureLevel) -> bool {
        self.max_feature_level() >= level
    }

    /// Returns `true` for every Metal flavour.
    pub fn is_metal(self) -> bool {
        matches!(
            self,
            ShaderPlatform::MetalSm5 | ShaderPlatform::MetalMrt | ShaderPlatform::Metal
        )
    }

    /// Returns `true` for platforms that only run the mobile renderer.
    pub fn is_mobile(self) -> bool {
        self.max_feature_level().is_mobile()
    }

    /// Returns `true` if hull and domain shaders can be compiled.
    pub fn supports_tessellation(self) -> bool {
        matches!(
            self,
            ShaderPlatform::D3dSm5 | ShaderPlatform::VulkanSm5 | ShaderPlatform::MetalSm5
        )
    }
}

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

//! State descriptors for the graphics pipeline.
//!
//! These are plain values. A descriptor doubles as the "handle" the RHI receives:
//! two equal descriptors always name the same backend state object.

use super::enums::*;
use crate::renderer::api::shader::BoundShaderState;
use bitflags::bitflags;

bitflags! {
    /// A bitmask to enable or disable writes to individual color channels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorWrites: u8 {
        /// Red channel.
        const R = 0b0001;
        /// Green channel.
        const G = 0b0010;
        /// Blue channel.
        const B = 0b0100;
        /// Alpha channel.
        const A = 0b1000;
        /// Color channels only, destination alpha preserved.
        const RGB = Self::R.bits() | Self::G.bits() | Self::B.bits();
        /// All channels.
        const RGBA = Self::RGB.bits() | Self::A.bits();
    }
}

/// A complete blend equation for either the color or the alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponent {
    /// Operation combining the two terms.
    pub operation: BlendOperation,
    /// Factor applied to the fragment shader output.
    pub src_factor: BlendFactor,
    /// Factor applied to the value already in the render target.
    pub dst_factor: BlendFactor,
}

impl BlendComponent {
    /// `src * 1 + dst * 0`, i.e. blending disabled.
    pub const REPLACE: BlendComponent = BlendComponent::new(
        BlendOperation::Add,
        BlendFactor::One,
        BlendFactor::Zero,
    );

    /// Creates a blend component.
    pub const fn new(operation: BlendOperation, src_factor: BlendFactor, dst_factor: BlendFactor) -> Self {
        Self {
            operation,
            src_factor,
            dst_factor,
        }
    }
}

/// Blend state of the first render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendState {
    /// Channels written by the draw.
    pub write_mask: ColorWrites,
    /// Color blend equation.
    pub color: BlendComponent,
    /// Alpha blend equation.
    pub alpha: BlendComponent,
}

impl BlendState {
    /// Blending disabled, all channels written. The default for opaque and masked passes.
    pub const OPAQUE: BlendState = BlendState::new(
        ColorWrites::RGBA,
        BlendComponent::REPLACE,
        BlendComponent::REPLACE,
    );

    /// Creates a blend state from its parts.
    pub const fn new(write_mask: ColorWrites, color: BlendComponent, alpha: BlendComponent) -> Self {
        Self {
            write_mask,
            color,
            alpha,
        }
    }

    /// Shorthand for a state whose alpha equation leaves the target untouched.
    pub const fn color_only(write_mask: ColorWrites, color: BlendComponent) -> Self {
        Self::new(write_mask, color, BlendComponent::REPLACE)
    }
}

impl Default for BlendState {
    fn default() -> Self {
        Self::OPAQUE
    }
}

/// Stencil test and operations for a single face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StencilFaceState {
    /// Comparison used for the stencil test.
    pub compare: CompareFunction,
    /// Operation when the stencil test fails.
    pub fail_op: StencilOperation,
    /// Operation when the stencil test passes but the depth test fails.
    pub depth_fail_op: StencilOperation,
    /// Operation when both tests pass.
    pub pass_op: StencilOperation,
}

/// Depth and stencil test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    /// If `true`, passing fragments write their depth.
    pub depth_write_enabled: bool,
    /// Depth comparison.
    pub depth_compare: CompareFunction,
    /// If `false`, the stencil faces, masks and reference are ignored.
    pub stencil_enabled: bool,
    /// Stencil state for front faces.
    pub stencil_front: StencilFaceState,
    /// Stencil state for back faces.
    pub stencil_back: StencilFaceState,
    /// Mask applied when reading the stencil buffer.
    pub stencil_read_mask: u8,
    /// Mask applied when writing the stencil buffer.
    pub stencil_write_mask: u8,
}

impl DepthStencilState {
    /// Depth test near-or-equal with depth writes. The base pass default.
    pub const DEPTH_WRITE: DepthStencilState = DepthStencilState::depth(true, CompareFunction::DEPTH_NEAR_OR_EQUAL);

    /// Depth test near-or-equal without depth writes. Translucency and decals.
    pub const DEPTH_READ: DepthStencilState = DepthStencilState::depth(false, CompareFunction::DEPTH_NEAR_OR_EQUAL);

    /// No depth test, no writes.
    pub const DISABLED: DepthStencilState = DepthStencilState::depth(false, CompareFunction::Always);

    /// Creates a depth-only state with stencil disabled.
    pub const fn depth(depth_write_enabled: bool, depth_compare: CompareFunction) -> Self {
        Self {
            depth_write_enabled,
            depth_compare,
            stencil_enabled: false,
            stencil_front: StencilFaceState {
                compare: CompareFunction::Always,
                fail_op: StencilOperation::Keep,
                depth_fail_op: StencilOperation::Keep,
                pass_op: StencilOperation::Keep,
            },
            stencil_back: StencilFaceState {
                compare: CompareFunction::Always,
                fail_op: StencilOperation::Keep,
                depth_fail_op: StencilOperation::Keep,
                pass_op: StencilOperation::Keep,
            },
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
        }
    }

    /// Returns a copy that replaces the masked stencil bits with the reference value on
    /// every fragment passing the depth test. The depth part is kept as is.
    pub fn with_stencil_replace(self, write_mask: u8) -> Self {
        let face = StencilFaceState {
            compare: CompareFunction::Always,
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::Keep,
            pass_op: StencilOperation::Replace,
        };
        Self {
            stencil_enabled: true,
            stencil_front: face,
            stencil_back: face,
            stencil_read_mask: 0xFF,
            stencil_write_mask: write_mask,
            ..self
        }
    }

    /// Returns a copy that only passes fragments whose masked stencil bits equal the reference.
    pub fn with_stencil_test(self, read_mask: u8) -> Self {
        let face = StencilFaceState {
            compare: CompareFunction::Equal,
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::Keep,
            pass_op: StencilOperation::Keep,
        };
        Self {
            stencil_enabled: true,
            stencil_front: face,
            stencil_back: face,
            stencil_read_mask: read_mask,
            stencil_write_mask: 0x00,
            ..self
        }
    }
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self::DEPTH_WRITE
    }
}

/// Rasterizer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RasterizerState {
    /// Solid or wireframe.
    pub fill_mode: FillMode,
    /// Face culling.
    pub cull_mode: CullMode,
}

/// Everything the RHI needs to build a pipeline state object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphicsPipelineStateInitializer {
    /// Shader stages and vertex declaration.
    pub bound_shader_state: BoundShaderState,
    /// Blend state of the first render target.
    pub blend_state: BlendState,
    /// Rasterizer state.
    pub rasterizer_state: RasterizerState,
    /// Depth and stencil state.
    pub depth_stencil_state: DepthStencilState,
    /// How vertices are assembled.
    pub primitive_topology: PrimitiveTopology,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stencil_replace_keeps_depth_part() {
        let state = DepthStencilState::DEPTH_WRITE.with_stencil_replace(0x08);
        assert!(state.depth_write_enabled);
        assert_eq!(state.depth_compare, CompareFunction::GreaterEqual);
        assert!(state.stencil_enabled);
        assert_eq!(state.stencil_write_mask, 0x08);
        assert_eq!(state.stencil_front.pass_op, StencilOperation::Replace);
    }

    #[test]
    fn stencil_test_does_not_write() {
        let state = DepthStencilState::DEPTH_READ.with_stencil_test(0x08);
        assert!(!state.depth_write_enabled);
        assert_eq!(state.stencil_write_mask, 0);
        assert_eq!(state.stencil_back.compare, CompareFunction::Equal);
    }

    #[test]
    fn opaque_blend_is_default() {
        assert_eq!(BlendState::default(), BlendState::OPAQUE);
        assert_eq!(BlendState::OPAQUE.write_mask, ColorWrites::RGBA);
    }
}

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

//! Enums for fixed-function pipeline configuration.

/// Defines how vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Vertices are rendered as a list of isolated points.
    PointList,
    /// Every two vertices form an isolated line.
    LineList,
    /// Every three vertices form an isolated triangle.
    #[default]
    TriangleList,
    /// Vertices are rendered as a connected triangle strip.
    TriangleStrip,
    /// Patches with a fixed number of control points, consumed by the hull shader.
    PatchList {
        /// Number of control points per patch (3 for flat tessellation, 12 for PN triangles).
        control_points: u8,
    },
}

impl PrimitiveTopology {
    /// Returns the number of vertices consumed to emit `num_primitives` primitives.
    pub fn vertex_count(&self, num_primitives: u32) -> u32 {
        match self {
            PrimitiveTopology::PointList => num_primitives,
            PrimitiveTopology::LineList => num_primitives * 2,
            PrimitiveTopology::TriangleList => num_primitives * 3,
            PrimitiveTopology::TriangleStrip => num_primitives + 2,
            PrimitiveTopology::PatchList { control_points } => {
                num_primitives * u32::from(*control_points)
            }
        }
    }

    /// Returns `true` if this topology feeds the tessellation stages.
    pub fn is_patch_list(&self) -> bool {
        matches!(self, PrimitiveTopology::PatchList { .. })
    }
}

/// Defines which face of a triangle to cull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    /// No culling is performed.
    None,
    /// Cull front-facing triangles.
    Front,
    /// Cull back-facing triangles.
    #[default]
    Back,
}

impl CullMode {
    /// Returns the opposite cull mode. `None` stays `None`.
    pub fn inverted(self) -> Self {
        match self {
            CullMode::None => CullMode::None,
            CullMode::Front => CullMode::Back,
            CullMode::Back => CullMode::Front,
        }
    }
}

/// Defines how polygons are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillMode {
    /// Polygons are filled.
    #[default]
    Solid,
    /// Polygons are rendered as outlines.
    Wireframe,
}

/// The comparison function used for depth and stencil testing.
///
/// Depth uses a reversed-Z convention: "near or equal" is [`CompareFunction::GreaterEqual`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    /// The test never passes.
    Never,
    /// Passes if the new value is less than the existing value.
    Less,
    /// Passes if the new value is equal to the existing value.
    Equal,
    /// Passes if the new value is less than or equal to the existing value.
    LessEqual,
    /// Passes if the new value is greater than the existing value.
    Greater,
    /// Passes if the new value is not equal to the existing value.
    NotEqual,
    /// Passes if the new value is greater than or equal to the existing value.
    GreaterEqual,
    /// The test always passes.
    #[default]
    Always,
}

impl CompareFunction {
    /// Depth comparison that accepts fragments nearer than or equal to the stored depth.
    pub const DEPTH_NEAR_OR_EQUAL: CompareFunction = CompareFunction::GreaterEqual;
}

/// An operation to perform on a stencil buffer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOperation {
    /// Keep the existing stencil value.
    #[default]
    Keep,
    /// Set the stencil value to 0.
    Zero,
    /// Replace the stencil value with the reference value.
    Replace,
    /// Bitwise invert the stencil value.
    Invert,
    /// Increment, clamping at the maximum value.
    IncrementClamp,
    /// Decrement, clamping at 0.
    DecrementClamp,
}

/// A factor in a blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// `0.0`
    Zero,
    /// `1.0`
    One,
    /// `src.rgb`
    SrcColor,
    /// `1.0 - src.rgb`
    OneMinusSrcColor,
    /// `src.a`
    SrcAlpha,
    /// `1.0 - src.a`
    OneMinusSrcAlpha,
    /// `dst.rgb`
    DstColor,
    /// `1.0 - dst.rgb`
    OneMinusDstColor,
    /// `dst.a`
    DstAlpha,
    /// `1.0 - dst.a`
    OneMinusDstAlpha,
}

/// The operation used to combine source and destination terms in a blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendOperation {
    /// `source + destination`
    Add,
    /// `source - destination`
    Subtract,
    /// `destination - source`
    ReverseSubtract,
    /// `min(source, destination)`
    Min,
    /// `max(source, destination)`
    Max,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cull_mode_inversion_is_an_involution() {
        for mode in [CullMode::None, CullMode::Front, CullMode::Back] {
            assert_eq!(mode.inverted().inverted(), mode);
        }
        assert_eq!(CullMode::Back.inverted(), CullMode::Front);
        assert_eq!(CullMode::None.inverted(), CullMode::None);
    }

    #[test]
    fn topology_vertex_counts() {
        assert_eq!(PrimitiveTopology::TriangleList.vertex_count(4), 12);
        assert_eq!(PrimitiveTopology::TriangleStrip.vertex_count(4), 6);
        assert_eq!(
            PrimitiveTopology::PatchList { control_points: 12 }.vertex_count(2),
            24
        );
        assert!(PrimitiveTopology::PatchList { control_points: 3 }.is_patch_list());
        assert!(!PrimitiveTopology::LineList.is_patch_list());
    }
}

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

//! The material contract consumed by the mesh drawing code.
//!
//! The material system itself lives outside this crate. Drawing policies only see a
//! [`MaterialRenderProxy`] (identity plus uniform data) and, through it, a
//! [`MaterialResource`] (immutable properties plus compiled shader map).

use crate::renderer::api::resource::UniformBufferId;
use crate::renderer::api::shader::{CompiledShader, ShaderMap, ShaderType};
use crate::renderer::error::ShaderError;
use crate::scene::VertexFactoryTypeId;
use serde::{Deserialize, Serialize};

/// How a material's output combines with the scene color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Fully opaque.
    #[default]
    Opaque,
    /// Opaque with alpha-tested holes.
    Masked,
    /// Alpha blended.
    Translucent,
    /// Added to the scene color.
    Additive,
    /// Multiplied with the scene color.
    Modulate,
    /// Premultiplied alpha.
    AlphaComposite,
}

impl BlendMode {
    /// Every blend mode drawn in the translucency pass.
    pub fn is_translucent(self) -> bool {
        !matches!(self, BlendMode::Opaque | BlendMode::Masked)
    }
}

/// The lighting model a material is shaded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ShadingModel {
    Unlit,
    #[default]
    DefaultLit,
    Subsurface,
    ClearCoat,
    TwoSidedFoliage,
    Hair,
}

impl ShadingModel {
    /// Everything except [`ShadingModel::Unlit`].
    pub fn is_lit(self) -> bool {
        self != ShadingModel::Unlit
    }
}

/// Tessellation requested by a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TessellationMode {
    /// No hull/domain stages.
    #[default]
    NoTessellation,
    /// Flat tessellation of each triangle.
    FlatTessellation,
    /// PN triangles, which need adjacency.
    PnTriangles,
}

impl TessellationMode {
    /// Control points per patch for the patch-list topology.
    pub fn control_points(self) -> Option<u8> {
        match self {
            TessellationMode::NoTessellation => None,
            TessellationMode::FlatTessellation => Some(3),
            TessellationMode::PnTriangles => Some(12),
        }
    }
}

/// What a material is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaterialDomain {
    /// Regular mesh surface.
    #[default]
    Surface,
    /// Decal projected onto, or drawn as a mesh over, the G-buffer.
    DeferredDecal,
    /// Post-process material, never drawn by mesh passes.
    PostProcess,
}

/// Which G-buffer channels a decal material blends into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DecalBlendMode {
    /// Base color, metallic, specular, roughness and normal, alpha blended.
    #[default]
    Translucent,
    /// Base color modulated, the rest alpha blended.
    Stain,
    /// Normal only.
    Normal,
    /// Emissive only, added to scene color.
    Emissive,
}

/// The subset of a compiled material the mesh drawing code consults.
///
/// Immutable for the lifetime of the compiled material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaterialProperties {
    /// Blend mode.
    pub blend_mode: BlendMode,
    /// Shading model.
    pub shading_model: ShadingModel,
    /// Tessellation mode.
    pub tessellation_mode: TessellationMode,
    /// Material domain.
    pub domain: MaterialDomain,
    /// Decal blend mode, used when the domain is [`MaterialDomain::DeferredDecal`].
    pub decal_blend_mode: DecalBlendMode,
    /// Disable backface culling.
    pub two_sided: bool,
    /// Force wireframe fill.
    pub wireframe: bool,
    /// Writes to the distortion accumulation buffer.
    pub is_distorted: bool,
    /// One of the engine's fallback materials (default surface, wireframe, etc.).
    pub is_special_engine_material: bool,
    /// World position offset, displacement or tessellation moves vertices.
    pub may_modify_mesh_position: bool,
}

impl MaterialProperties {
    /// Lit shading model.
    pub fn is_lit(&self) -> bool {
        self.shading_model.is_lit()
    }

    /// Drawn in the translucency pass.
    pub fn is_translucent(&self) -> bool {
        self.blend_mode.is_translucent()
    }

    /// A decal material.
    pub fn is_deferred_decal(&self) -> bool {
        self.domain == MaterialDomain::DeferredDecal
    }

    /// Alpha tested.
    pub fn is_masked(&self) -> bool {
        self.blend_mode == BlendMode::Masked
    }
}

/// A compiled material: its properties and the shader map holding its permutations.
pub trait MaterialResource: Send + Sync {
    /// Immutable properties.
    fn properties(&self) -> &MaterialProperties;

    /// Every compiled permutation.
    fn shader_map(&self) -> &ShaderMap;

    /// Resolves a compiled permutation for a vertex factory type.
    fn get_shader(
        &self,
        shader_type: ShaderType,
        vertex_factory_type: VertexFactoryTypeId,
    ) -> Result<&CompiledShader, ShaderError> {
        self.shader_map().get(shader_type, vertex_factory_type)
    }

    /// Blend mode.
    fn blend_mode(&self) -> BlendMode {
        self.properties().blend_mode
    }

    /// Shading model.
    fn shading_model(&self) -> ShadingModel {
        self.properties().shading_model
    }

    /// Tessellation mode.
    fn tessellation_mode(&self) -> TessellationMode {
        self.properties().tessellation_mode
    }

    /// Decal domain.
    fn is_deferred_decal(&self) -> bool {
        self.properties().is_deferred_decal()
    }

    /// Distortion output.
    fn is_distorted(&self) -> bool {
        self.properties().is_distorted
    }
}

/// Identity of a material render proxy. Part of every drawing policy's sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialProxyId(pub u32);

/// The render-thread view of a material instance: identity, parameter block and
/// the compiled material it renders with.
pub trait MaterialRenderProxy: Send + Sync {
    /// Identity.
    fn id(&self) -> MaterialProxyId;

    /// The compiled material.
    fn material(&self) -> &dyn MaterialResource;

    /// Uniform buffer of material parameters.
    fn uniform_buffer(&self) -> UniformBufferId;
}

/// A plain compiled material.
#[derive(Debug, Clone)]
pub struct Material {
    /// Properties.
    pub properties: MaterialProperties,
    /// Compiled permutations.
    pub shader_map: ShaderMap,
}

impl MaterialResource for Material {
    fn properties(&self) -> &MaterialProperties {
        &self.properties
    }

    fn shader_map(&self) -> &ShaderMap {
        &self.shader_map
    }
}

/// A material instance owning its compiled material.
#[derive(Debug, Clone)]
pub struct MaterialInstance {
    id: MaterialProxyId,
    material: Material,
    uniform_buffer: UniformBufferId,
}

impl MaterialInstance {
    /// Creates a proxy.
    pub fn new(id: MaterialProxyId, material: Material, uniform_buffer: UniformBufferId) -> Self {
        Self {
            id,
            material,
            uniform_buffer,
        }
    }
}

impl MaterialRenderProxy for MaterialInstance {
    fn id(&self) -> MaterialProxyId {
        self.id
    }

    fn material(&self) -> &dyn MaterialResource {
        &self.material
    }

    fn uniform_buffer(&self) -> UniformBufferId {
        self.uniform_buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translucency_classes() {
        assert!(!BlendMode::Opaque.is_translucent());
        assert!(!BlendMode::Masked.is_translucent());
        for mode in [
            BlendMode::Translucent,
            BlendMode::Additive,
            BlendMode::Modulate,
            BlendMode::AlphaComposite,
        ] {
            assert!(mode.is_translucent());
        }
    }

    #[test]
    fn tessellation_control_points() {
        assert_eq!(TessellationMode::NoTessellation.control_points(), None);
        assert_eq!(TessellationMode::FlatTessellation.control_points(), Some(3));
        assert_eq!(TessellationMode::PnTriangles.control_points(), Some(12));
    }
}

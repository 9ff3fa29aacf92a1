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

//! Shader permutation identifiers, declared parameters and the per-material shader map.
//!
//! A shader permutation is addressed by a [`ShaderType`] (which pass, which stage,
//! which light-map policy and feature switches) plus the vertex factory type it was
//! compiled against. The [`ShaderMap`] owns every compiled permutation of one
//! material; drawing policies only hold [`ShaderId`]s and borrowed
//! [`CompiledShader`]s whose lifetime is tied to the material.

use crate::renderer::api::resource::VertexDeclarationId;
use crate::renderer::error::ShaderError;
use crate::renderer::light_map::LightMapPolicyTag;
use crate::scene::VertexFactoryTypeId;
use std::collections::{BTreeMap, HashMap, HashSet};

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Hull (tessellation control) stage.
    Hull,
    /// Domain (tessellation evaluation) stage.
    Domain,
    /// Pixel stage.
    Pixel,
}

/// An opaque handle to one compiled shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub u32);

/// Identity of a material's shader map. Part of every drawing policy's sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderMapId(pub u32);

/// Number of dynamic point lights a mobile base pass pixel shader loops over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MobilePointLights {
    /// Unrolled loop over exactly this many lights.
    Fixed(u8),
    /// A single permutation branching on the runtime light count.
    DynamicBranch,
}

/// A shader permutation, without the vertex factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum ShaderType {
    BasePassVs { light_map: LightMapPolicyTag, atmospheric_fog: bool },
    BasePassHs { light_map: LightMapPolicyTag, atmospheric_fog: bool },
    BasePassDs { light_map: LightMapPolicyTag },
    BasePassPs { light_map: LightMapPolicyTag, sky_light: bool },

    MobileBasePassVs { light_map: LightMapPolicyTag },
    MobileBasePassPs { light_map: LightMapPolicyTag, point_lights: MobilePointLights },

    DepthOnlyVs { position_only: bool },
    DepthOnlyHs,
    DepthOnlyDs,
    DepthOnlyPs,

    DistortionVs,
    DistortionHs,
    DistortionDs,
    DistortionPs,

    MeshDecalVs,
    MeshDecalHs,
    MeshDecalDs,
    MeshDecalPs,

    LightMapDensityVs { light_map: LightMapPolicyTag },
    LightMapDensityHs { light_map: LightMapPolicyTag },
    LightMapDensityDs { light_map: LightMapPolicyTag },
    LightMapDensityPs { light_map: LightMapPolicyTag },

    VelocityVs,
    VelocityHs,
    VelocityDs,
    VelocityPs,

    HitProxyVs,
    HitProxyHs,
    HitProxyDs,
    HitProxyPs,
}

impl ShaderType {
    /// The pipeline stage this permutation runs in.
    pub fn stage(&self) -> ShaderStage {
        use ShaderType::*;
        match self {
            BasePassVs { .. } | MobileBasePassVs { .. } | DepthOnlyVs { .. } | DistortionVs | MeshDecalVs
            | LightMapDensityVs { .. } | VelocityVs | HitProxyVs => ShaderStage::Vertex,
            BasePassHs { .. } | DepthOnlyHs | DistortionHs | MeshDecalHs | LightMapDensityHs { .. } | VelocityHs
            | HitProxyHs => ShaderStage::Hull,
            BasePassDs { .. } | DepthOnlyDs | DistortionDs | MeshDecalDs | LightMapDensityDs { .. } | VelocityDs
            | HitProxyDs => ShaderStage::Domain,
            BasePassPs { .. } | MobileBasePassPs { .. } | DepthOnlyPs | DistortionPs | MeshDecalPs
            | LightMapDensityPs { .. } | VelocityPs | HitProxyPs => ShaderStage::Pixel,
        }
    }

    /// The light-map policy baked into this permutation, if any.
    pub fn light_map_policy(&self) -> Option<LightMapPolicyTag> {
        use ShaderType::*;
        match *self {
            BasePassVs { light_map, .. }
            | BasePassHs { light_map, .. }
            | BasePassDs { light_map }
            | BasePassPs { light_map, .. }
            | MobileBasePassVs { light_map }
            | MobileBasePassPs { light_map, .. }
            | LightMapDensityVs { light_map }
            | LightMapDensityHs { light_map }
            | LightMapDensityDs { light_map }
            | LightMapDensityPs { light_map } => Some(light_map),
            _ => None,
        }
    }
}

/// Whether a declared parameter is a uniform buffer, a texture, a structured buffer
/// or a loose value in the stage's constant block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// A uniform buffer slot.
    UniformBuffer,
    /// A texture + sampler slot.
    Texture,
    /// A structured / typed buffer slot.
    Buffer,
    /// Loose bytes in the stage constant block.
    Value,
}

/// How often a parameter changes while drawing meshes that share a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterFrequency {
    /// Bound once per drawing policy in the shared-state step.
    Shared,
    /// Bound per mesh element in the mesh-state step.
    PerMesh,
}

/// Every resource or value a shader in this renderer can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum ShaderParameter {
    // Uniform buffers.
    View,
    InstancedView,
    Material,
    Primitive,
    PrecomputedLighting,
    IndirectLightingCache,
    ReflectionCapture,
    ForwardLightData,
    InstancedForwardLightData,
    Fog,
    TranslucentSelfShadow,
    MobileDirectionalLight,
    // Textures.
    LightMapTexture,
    SkyOcclusionTexture,
    StaticShadowTexture,
    IndirectLightingCacheVolume0,
    IndirectLightingCacheVolume1,
    IndirectLightingCacheVolume2,
    VolumetricLightmapBrickTexture,
    TranslucentSelfShadowDepth,
    SceneColorTexture,
    SceneDepthTexture,
    FogInscatteringTexture,
    // Buffers.
    CulledLightDataGrid,
    InstancedCulledLightDataGrid,
    PointIndirectLightingSamples,
    // Values.
    LocalToWorld,
    PreviousLocalToWorld,
    DitheredLodTransitionAlpha,
    LightMapCoordinateScaleBias,
    ShadowMapCoordinateScaleBias,
    HitProxyColor,
    LightMapDensityParameters,
    NumDynamicPointLights,
}

impl ShaderParameter {
    /// The slot class this parameter occupies.
    pub fn kind(self) -> ParameterKind {
        use ShaderParameter::*;
        match self {
            View | InstancedView | Material | Primitive | PrecomputedLighting | IndirectLightingCache
            | ReflectionCapture | ForwardLightData | InstancedForwardLightData | Fog | TranslucentSelfShadow
            | MobileDirectionalLight => ParameterKind::UniformBuffer,
            LightMapTexture | SkyOcclusionTexture | StaticShadowTexture | IndirectLightingCacheVolume0
            | IndirectLightingCacheVolume1 | IndirectLightingCacheVolume2 | VolumetricLightmapBrickTexture
            | TranslucentSelfShadowDepth | SceneColorTexture | SceneDepthTexture | FogInscatteringTexture => {
                ParameterKind::Texture
            }
            CulledLightDataGrid | InstancedCulledLightDataGrid | PointIndirectLightingSamples => ParameterKind::Buffer,
            LocalToWorld | PreviousLocalToWorld | DitheredLodTransitionAlpha | LightMapCoordinateScaleBias
            | ShadowMapCoordinateScaleBias | HitProxyColor | LightMapDensityParameters | NumDynamicPointLights => {
                ParameterKind::Value
            }
        }
    }

    /// Which protocol step binds this parameter.
    pub fn frequency(self) -> ParameterFrequency {
        use ShaderParameter::*;
        match self {
            Primitive | PrecomputedLighting | IndirectLightingCache | TranslucentSelfShadow | LightMapTexture
            | SkyOcclusionTexture | StaticShadowTexture | TranslucentSelfShadowDepth | PointIndirectLightingSamples
            | LocalToWorld | PreviousLocalToWorld | DitheredLodTransitionAlpha | LightMapCoordinateScaleBias
            | ShadowMapCoordinateScaleBias | HitProxyColor | LightMapDensityParameters | NumDynamicPointLights => {
                ParameterFrequency::PerMesh
            }
            _ => ParameterFrequency::Shared,
        }
    }

    /// Bit used when tracking which parameters were bound.
    pub fn bit(self) -> u64 {
        1u64 << (self as u32)
    }
}

/// The parameters a compiled shader declares and the slot each one occupies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderParameterMap {
    slots: BTreeMap<ShaderParameter, u32>,
}

impl ShaderParameterMap {
    /// Builds a map, assigning slots in order within each [`ParameterKind`].
    /// Duplicates are ignored.
    pub fn from_parameters(parameters: impl IntoIterator<Item = ShaderParameter>) -> Self {
        let mut slots = BTreeMap::new();
        let mut next = [0u32; 4];
        for parameter in parameters {
            if slots.contains_key(&parameter) {
                continue;
            }
            let counter = &mut next[parameter.kind() as usize];
            slots.insert(parameter, *counter);
            *counter += 1;
        }
        Self { slots }
    }

    /// The slot of `parameter`, or `None` when the shader does not declare it.
    pub fn slot(&self, parameter: ShaderParameter) -> Option<u32> {
        self.slots.get(&parameter).copied()
    }

    /// Returns `true` if the shader declares `parameter`.
    pub fn contains(&self, parameter: ShaderParameter) -> bool {
        self.slots.contains_key(&parameter)
    }

    /// Iterates over `(parameter, slot)` pairs in parameter order.
    pub fn iter(&self) -> impl Iterator<Item = (ShaderParameter, u32)> + '_ {
        self.slots.iter().map(|(p, s)| (*p, *s))
    }

    /// Number of declared parameters.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// One compiled shader permutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledShader {
    /// Handle the RHI knows this shader by.
    pub id: ShaderId,
    /// The permutation.
    pub shader_type: ShaderType,
    /// Vertex factory it was compiled against.
    pub vertex_factory_type: VertexFactoryTypeId,
    /// Declared parameters.
    pub parameters: ShaderParameterMap,
}

impl CompiledShader {
    /// Stage of this shader.
    pub fn stage(&self) -> ShaderStage {
        self.shader_type.stage()
    }
}

/// Every compiled permutation of one material, keyed by (shader type, vertex factory type).
///
/// Permutations rejected by their compile predicate are remembered so that a later
/// lookup can be told apart from a merely missing (out of date) shader.
#[derive(Debug, Clone)]
pub struct ShaderMap {
    id: ShaderMapId,
    shaders: HashMap<(ShaderType, VertexFactoryTypeId), CompiledShader>,
    excluded: HashSet<(ShaderType, VertexFactoryTypeId)>,
}

impl ShaderMap {
    /// Creates an empty shader map.
    pub fn new(id: ShaderMapId) -> Self {
        Self {
            id,
            shaders: HashMap::new(),
            excluded: HashSet::new(),
        }
    }

    /// Identity of this map.
    pub fn id(&self) -> ShaderMapId {
        self.id
    }

    /// Adds a compiled permutation, replacing any previous one with the same key.
    pub fn insert(&mut self, shader: CompiledShader) {
        let key = (shader.shader_type, shader.vertex_factory_type);
        self.excluded.remove(&key);
        self.shaders.insert(key, shader);
    }

    /// Records that a permutation was rejected by its compile predicate.
    pub fn mark_excluded(&mut self, shader_type: ShaderType, vertex_factory_type: VertexFactoryTypeId) {
        self.excluded.insert((shader_type, vertex_factory_type));
    }

    /// Looks up a compiled permutation.
    pub fn get(
        &self,
        shader_type: ShaderType,
        vertex_factory_type: VertexFactoryTypeId,
    ) -> Result<&CompiledShader, ShaderError> {
        let key = (shader_type, vertex_factory_type);
        match self.shaders.get(&key) {
            Some(shader) => Ok(shader),
            None if self.excluded.contains(&key) => Err(ShaderError::ExcludedPermutation {
                shader_type,
                vertex_factory_type,
            }),
            None => Err(ShaderError::NotFound {
                shader_type,
                vertex_factory_type,
            }),
        }
    }

    /// Returns `true` if the permutation was compiled.
    pub fn contains(&self, shader_type: ShaderType, vertex_factory_type: VertexFactoryTypeId) -> bool {
        self.shaders.contains_key(&(shader_type, vertex_factory_type))
    }

    /// Number of compiled permutations.
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    /// Returns `true` if nothing was compiled.
    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    /// Iterates over every compiled permutation in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &CompiledShader> {
        self.shaders.values()
    }
}

/// The shader stages and vertex declaration of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoundShaderState {
    /// Input layout of the vertex streams.
    pub vertex_declaration: VertexDeclarationId,
    /// Vertex shader.
    pub vertex_shader: ShaderId,
    /// Hull shader, tessellated draws only.
    pub hull_shader: Option<ShaderId>,
    /// Domain shader, tessellated draws only.
    pub domain_shader: Option<ShaderId>,
    /// Pixel shader. `None` for depth-only draws with no pixel work.
    pub pixel_shader: Option<ShaderId>,
}

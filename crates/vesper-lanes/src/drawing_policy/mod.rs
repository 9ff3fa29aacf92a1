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

//! Drawing policies: the per-pass values that turn a mesh batch into draw calls.
//!
//! Every pass drives its policies through the same five steps:
//!
//! 1. [`DrawingPolicy::setup_pipeline_state`] adjusts a per-primitive copy of the
//!    pass's [`RenderStateDescriptor`].
//! 2. [`DrawingPolicy::commit_pipeline_state`] builds and sets the pipeline state
//!    object and the stencil reference.
//! 3. [`DrawingPolicy::set_shared_state`] binds everything that is identical for
//!    all meshes drawn with the policy.
//! 4. [`DrawingPolicy::set_mesh_render_state`] binds per-element data.
//! 5. [`DrawingPolicy::draw_mesh`] issues the draw.
//!
//! A policy is a plain value. Two policies that compare equal are interchangeable,
//! which is what lets the static draw lists coalesce meshes.

macro_rules! impl_policy_ordering {
    ($policy:ident) => {
        impl PartialEq for $policy<'_> {
            fn eq(&self, other: &Self) -> bool {
                self.sort_key() == other.sort_key()
            }
        }

        impl Eq for $policy<'_> {}

        impl PartialOrd for $policy<'_> {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $policy<'_> {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.sort_key().cmp(&other.sort_key())
            }
        }
    };
}

mod base_pass;
mod blend;
mod depth;
mod distortion;
mod hit_proxy;
mod light_map_density;
mod mesh_decal;
mod mobile_base_pass;
mod velocity;

pub use self::base_pass::{
    uses_atmospheric_fog, uses_sky_light, BasePassDrawingPolicy, BasePassOptions, SceneTextureMode,
};
pub use self::blend::{decal_blend_state, shader_complexity_blend_state, translucent_blend_state};
pub use self::depth::DepthDrawingPolicy;
pub use self::distortion::{DistortionDrawingPolicy, DISTORTION_ACCUMULATE};
pub use self::hit_proxy::HitProxyDrawingPolicy;
pub use self::light_map_density::LightMapDensityDrawingPolicy;
pub use self::mesh_decal::MeshDecalDrawingPolicy;
pub use self::mobile_base_pass::MobileBasePassDrawingPolicy;
pub use self::velocity::{has_velocity, VelocityDrawingPolicy};

use crate::binding::ShaderBinder;
use crate::permutation::tessellation_control_points;
use glam::Mat4;
use std::fmt;
use vesper_core::material::{MaterialProperties, MaterialProxyId, MaterialRenderProxy, MaterialResource};
use vesper_core::renderer::{
    BoundShaderState, CommandList, CompiledShader, CullMode, DrawError, FillMode, GraphicsPipelineStateInitializer,
    ParameterFrequency, PrimitiveTopology, RasterizerState, RenderStateDescriptor, ShaderError, ShaderId,
    ShaderParameter, ShaderPlatform, ShaderType, ViewOverrideFlags,
};
use vesper_core::scene::{MeshBatch, MeshBatchElement, PrimitiveSceneInfo, SceneView, VertexFactory, VertexFactoryId};

/// Stencil bit written by meshes fading through a dithered LOD transition.
pub const STENCIL_LOD_DITHER_MASK: u8 = 1 << 2;

/// Stencil bit set under every pixel of a primitive that receives decals.
pub const STENCIL_RECEIVE_DECAL_MASK: u8 = 1 << 3;

/// Per-pass context shared by every policy drawn in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PolicyContext {
    /// Both eyes are rendered with one instanced draw.
    pub instanced_stereo: bool,
}

/// Effective cull mode of a draw.
///
/// Two-sidedness from either side disables culling. Otherwise back faces are
/// culled, with the winding flipped when exactly one of the mesh and the view
/// reverses it.
pub fn compute_cull_mode(mesh_two_sided: bool, mesh_reverse: bool, view_two_sided: bool, view_reverse: bool) -> CullMode {
    if mesh_two_sided || view_two_sided {
        CullMode::None
    } else if mesh_reverse ^ view_reverse {
        CullMode::Back.inverted()
    } else {
        CullMode::Back
    }
}

/// The compiled shaders of a policy, one per stage.
#[derive(Debug, Clone, Copy)]
pub struct StageShaders<'a> {
    /// Vertex shader.
    pub vertex: &'a CompiledShader,
    /// Hull shader, tessellated draws only.
    pub hull: Option<&'a CompiledShader>,
    /// Domain shader, tessellated draws only.
    pub domain: Option<&'a CompiledShader>,
    /// Pixel shader, absent for depth-only draws without pixel work.
    pub pixel: Option<&'a CompiledShader>,
}

impl<'a> StageShaders<'a> {
    /// Resolves the stages of a policy. The `(hull, domain)` pair is resolved only
    /// for tessellated draws.
    pub fn resolve(
        mesh_policy: &MeshDrawingPolicy<'a>,
        vertex: ShaderType,
        tessellation: Option<(ShaderType, ShaderType)>,
        pixel: Option<ShaderType>,
    ) -> Result<Self, ShaderError> {
        let tessellation = tessellation.filter(|_| mesh_policy.is_tessellated());
        Ok(Self {
            vertex: mesh_policy.shader(vertex)?,
            hull: tessellation.map(|(hull, _)| mesh_policy.shader(hull)).transpose()?,
            domain: tessellation.map(|(_, domain)| mesh_policy.shader(domain)).transpose()?,
            pixel: pixel.map(|ty| mesh_policy.shader(ty)).transpose()?,
        })
    }

    /// Shader ids in comparison order: vertex, pixel, hull, domain.
    pub fn key(&self) -> (ShaderId, Option<ShaderId>, Option<ShaderId>, Option<ShaderId>) {
        (
            self.vertex.id,
            self.pixel.map(|s| s.id),
            self.hull.map(|s| s.id),
            self.domain.map(|s| s.id),
        )
    }

    /// Every resolved stage, vertex first.
    pub fn iter(&self) -> impl Iterator<Item = &'a CompiledShader> {
        std::iter::once(self.vertex)
            .chain(self.hull)
            .chain(self.domain)
            .chain(self.pixel)
    }
}

/// State every drawing policy shares: the vertex factory, the material proxy whose
/// shaders are used, and how the geometry is assembled.
#[derive(Clone, Copy)]
pub struct MeshDrawingPolicy<'a> {
    vertex_factory: &'a VertexFactory,
    material_render_proxy: &'a dyn MaterialRenderProxy,
    control_points: Option<u8>,
    position_only: bool,
}

impl<'a> MeshDrawingPolicy<'a> {
    /// Creates the shared part of a policy drawing `vertex_factory` with the shaders
    /// of `material_render_proxy` on `platform`.
    pub fn new(
        vertex_factory: &'a VertexFactory,
        material_render_proxy: &'a dyn MaterialRenderProxy,
        platform: ShaderPlatform,
    ) -> Self {
        let properties = material_render_proxy.material().properties();
        Self {
            vertex_factory,
            material_render_proxy,
            control_points: tessellation_control_points(platform, properties, &vertex_factory.ty),
            position_only: false,
        }
    }

    /// Uses the vertex factory's position-only streams, when it has them.
    pub fn with_position_only(mut self, position_only: bool) -> Self {
        self.position_only = position_only && self.vertex_factory.position_only_declaration.is_some();
        self
    }

    /// The vertex factory.
    pub fn vertex_factory(&self) -> &'a VertexFactory {
        self.vertex_factory
    }

    /// The material proxy whose shaders and parameters are used.
    pub fn material_render_proxy(&self) -> &'a dyn MaterialRenderProxy {
        self.material_render_proxy
    }

    /// The compiled material behind the proxy.
    pub fn material(&self) -> &'a dyn MaterialResource {
        self.material_render_proxy.material()
    }

    /// Properties of the material whose shaders are used.
    pub fn properties(&self) -> &'a MaterialProperties {
        self.material().properties()
    }

    /// Hull and domain stages are active.
    pub fn is_tessellated(&self) -> bool {
        self.control_points.is_some()
    }

    /// Position-only streams are bound.
    pub fn is_position_only(&self) -> bool {
        self.position_only
    }

    /// Comparison key: vertex factory, material proxy, stream set.
    pub fn key(&self) -> (VertexFactoryId, MaterialProxyId, bool) {
        (self.vertex_factory.id, self.material_render_proxy.id(), self.position_only)
    }

    /// Resolves one permutation from the material's shader map.
    ///
    /// Looking up an excluded permutation means a selector picked a tag its
    /// predicate rejects: that is a bug and asserts in debug builds.
    pub fn shader(&self, shader_type: ShaderType) -> Result<&'a CompiledShader, ShaderError> {
        self.material()
            .get_shader(shader_type, self.vertex_factory.type_id())
            .map_err(|e| {
                if let ShaderError::ExcludedPermutation { .. } = e {
                    log::error!(
                        "Material {:?} looked up an excluded permutation: {e}.",
                        self.material_render_proxy.id()
                    );
                    debug_assert!(false, "excluded permutation requested: {e}");
                }
                e
            })
    }

    /// Topology of `mesh` under this policy.
    pub fn topology(&self, mesh: &MeshBatch<'_>) -> PrimitiveTopology {
        match self.control_points {
            Some(control_points) => PrimitiveTopology::PatchList { control_points },
            None => mesh.topology,
        }
    }

    /// Rasterizer state of `mesh`, composing the flags of the mesh and of its own
    /// material with the view overrides carried by `state`.
    pub fn rasterizer_state(&self, state: &RenderStateDescriptor, mesh: &MeshBatch<'_>) -> RasterizerState {
        let mesh_material = mesh.material_render_proxy.material().properties();
        let overrides = state.view_overrides;
        let wireframe = mesh.wireframe || mesh_material.wireframe || overrides.contains(ViewOverrideFlags::WIREFRAME);
        RasterizerState {
            fill_mode: if wireframe { FillMode::Wireframe } else { FillMode::Solid },
            cull_mode: compute_cull_mode(
                mesh.two_sided || mesh_material.two_sided,
                mesh.reverse_culling,
                overrides.contains(ViewOverrideFlags::TWO_SIDED),
                overrides.contains(ViewOverrideFlags::REVERSE_CULLING),
            ),
        }
    }

    /// Binds the vertex streams.
    pub fn set_streams(&self, cmd: &mut dyn CommandList) {
        for (index, stream) in self.vertex_factory.streams_for(self.position_only).iter().enumerate() {
            cmd.set_stream_source(index as u32, stream.buffer, stream.offset);
        }
    }

    /// Binds the view and material uniform buffers.
    ///
    /// The instanced view slot receives the second eye in instanced stereo and the
    /// primary view otherwise, so it is never left unbound.
    pub fn bind_view(
        &self,
        binder: &mut ShaderBinder<'_>,
        cmd: &mut dyn CommandList,
        view: &SceneView,
        state: &RenderStateDescriptor,
        ctx: PolicyContext,
    ) {
        let view_buffer = state.view_uniform_buffer.unwrap_or(view.view_uniform_buffer);
        binder.set_uniform_buffer(cmd, ShaderParameter::View, view_buffer);
        let instanced = if ctx.instanced_stereo {
            state
                .instanced_view_uniform_buffer
                .or(view.instanced_view_uniform_buffer)
                .unwrap_or(view_buffer)
        } else {
            view_buffer
        };
        binder.set_uniform_buffer(cmd, ShaderParameter::InstancedView, instanced);
        binder.set_uniform_buffer(cmd, ShaderParameter::Material, self.material_render_proxy.uniform_buffer());
    }

    /// Binds the primitive uniform buffer, transform and dithered LOD alpha of one
    /// element.
    pub fn bind_mesh(
        &self,
        binder: &mut ShaderBinder<'_>,
        cmd: &mut dyn CommandList,
        primitive: Option<&PrimitiveSceneInfo>,
        element: &MeshBatchElement,
        state: &RenderStateDescriptor,
    ) {
        if let Some(buffer) = element.primitive_uniform_buffer.or(primitive.map(|p| p.uniform_buffer)) {
            binder.set_uniform_buffer(cmd, ShaderParameter::Primitive, buffer);
        }
        let local_to_world = primitive.map_or(Mat4::IDENTITY, |p| p.local_to_world);
        binder.set_value(cmd, ShaderParameter::LocalToWorld, &local_to_world);
        binder.set_value(cmd, ShaderParameter::DitheredLodTransitionAlpha, &state.dithered_lod_transition_alpha);
    }

    /// Issues the draw of one element.
    pub fn draw_mesh(
        &self,
        cmd: &mut dyn CommandList,
        mesh: &MeshBatch<'_>,
        element_index: usize,
        ctx: PolicyContext,
    ) -> Result<(), DrawError> {
        let element = element(mesh, element_index)?;
        let instances = element.num_instances.max(1) * if ctx.instanced_stereo { 2 } else { 1 };
        match element.index_buffer {
            Some(index_buffer) => cmd.draw_indexed_primitive(
                index_buffer,
                0,
                0,
                element.max_vertex_index.saturating_sub(element.min_vertex_index) + 1,
                element.first_index,
                element.num_primitives,
                instances,
            ),
            None => cmd.draw_primitive(element.first_index, element.num_primitives, instances),
        }
        Ok(())
    }
}

impl fmt::Debug for MeshDrawingPolicy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshDrawingPolicy")
            .field("vertex_factory", &self.vertex_factory.id)
            .field("material", &self.material_render_proxy.id())
            .field("control_points", &self.control_points)
            .field("position_only", &self.position_only)
            .finish()
    }
}

pub(crate) fn element<'m>(mesh: &'m MeshBatch<'_>, index: usize) -> Result<&'m MeshBatchElement, DrawError> {
    mesh.elements.get(index).ok_or(DrawError::InvalidElement {
        index,
        count: mesh.elements.len(),
    })
}

/// A drawing policy of one pass.
pub trait DrawingPolicy<'a>: Clone + Ord {
    /// Per-element data computed when a mesh is added to a draw list.
    type ElementData: Clone;

    /// The shared part of the policy.
    fn mesh_policy(&self) -> &MeshDrawingPolicy<'a>;

    /// The resolved shader stages.
    fn shaders(&self) -> StageShaders<'a>;

    /// Step 1: adjusts the pass's render state for this policy.
    fn setup_pipeline_state(&self, _state: &mut RenderStateDescriptor, _view: &SceneView) {}

    /// The shader stages plus the vertex declaration.
    fn bound_shader_state(&self) -> BoundShaderState {
        let shaders = self.shaders();
        let mesh_policy = self.mesh_policy();
        BoundShaderState {
            vertex_declaration: mesh_policy.vertex_factory().declaration_for(mesh_policy.is_position_only()),
            vertex_shader: shaders.vertex.id,
            hull_shader: shaders.hull.map(|s| s.id),
            domain_shader: shaders.domain.map(|s| s.id),
            pixel_shader: shaders.pixel.map(|s| s.id),
        }
    }

    /// The pipeline state object `mesh` is drawn with.
    fn pipeline_state_initializer(
        &self,
        state: &RenderStateDescriptor,
        mesh: &MeshBatch<'_>,
    ) -> Result<GraphicsPipelineStateInitializer, DrawError> {
        let (blend_state, depth_stencil_state) = state.resolved_states()?;
        let mesh_policy = self.mesh_policy();
        Ok(GraphicsPipelineStateInitializer {
            bound_shader_state: self.bound_shader_state(),
            blend_state,
            rasterizer_state: mesh_policy.rasterizer_state(state, mesh),
            depth_stencil_state,
            primitive_topology: mesh_policy.topology(mesh),
        })
    }

    /// Step 2: sets the pipeline state object and stencil reference.
    fn commit_pipeline_state(
        &self,
        cmd: &mut dyn CommandList,
        state: &RenderStateDescriptor,
        mesh: &MeshBatch<'_>,
    ) -> Result<(), DrawError> {
        let initializer = self.pipeline_state_initializer(state, mesh)?;
        cmd.set_graphics_pipeline_state(&initializer);
        cmd.set_stencil_ref(state.stencil_ref);
        Ok(())
    }

    /// Binds the policy's own shared parameters on one stage.
    fn bind_shared_parameters(
        &self,
        _binder: &mut ShaderBinder<'_>,
        _cmd: &mut dyn CommandList,
        _view: &SceneView,
        _ctx: PolicyContext,
    ) {
    }

    /// Binds the policy's own per-element parameters on one stage.
    #[allow(clippy::too_many_arguments)]
    fn bind_mesh_parameters(
        &self,
        _binder: &mut ShaderBinder<'_>,
        _cmd: &mut dyn CommandList,
        _view: &SceneView,
        _primitive: Option<&PrimitiveSceneInfo>,
        _mesh: &MeshBatch<'_>,
        _data: &Self::ElementData,
    ) {
    }

    /// Step 3: binds the streams and every shared parameter of every stage.
    fn set_shared_state(
        &self,
        cmd: &mut dyn CommandList,
        view: &SceneView,
        state: &RenderStateDescriptor,
        ctx: PolicyContext,
    ) {
        let mesh_policy = self.mesh_policy();
        mesh_policy.set_streams(cmd);
        for shader in self.shaders().iter() {
            let mut binder = ShaderBinder::new(shader);
            mesh_policy.bind_view(&mut binder, cmd, view, state, ctx);
            self.bind_shared_parameters(&mut binder, cmd, view, ctx);
            binder.bind_defaults(cmd, ParameterFrequency::Shared, &view.global_resources);
        }
    }

    /// Step 4: binds every per-element parameter of every stage.
    #[allow(clippy::too_many_arguments)]
    fn set_mesh_render_state(
        &self,
        cmd: &mut dyn CommandList,
        view: &SceneView,
        primitive: Option<&PrimitiveSceneInfo>,
        mesh: &MeshBatch<'_>,
        element_index: usize,
        state: &RenderStateDescriptor,
        data: &Self::ElementData,
    ) -> Result<(), DrawError> {
        bind_mesh_stages(self, cmd, view, primitive, mesh, element_index, state, data)
    }

    /// Step 5: issues the draw of one element.
    fn draw_mesh(
        &self,
        cmd: &mut dyn CommandList,
        mesh: &MeshBatch<'_>,
        element_index: usize,
        ctx: PolicyContext,
    ) -> Result<(), DrawError> {
        self.mesh_policy().draw_mesh(cmd, mesh, element_index, ctx)
    }
}

/// Per-element binding shared by every policy.
#[allow(clippy::too_many_arguments)]
pub(crate) fn bind_mesh_stages<'a, P: DrawingPolicy<'a> + ?Sized>(
    policy: &P,
    cmd: &mut dyn CommandList,
    view: &SceneView,
    primitive: Option<&PrimitiveSceneInfo>,
    mesh: &MeshBatch<'_>,
    element_index: usize,
    state: &RenderStateDescriptor,
    data: &P::ElementData,
) -> Result<(), DrawError> {
    let element = element(mesh, element_index)?;
    let mesh_policy = policy.mesh_policy();
    for shader in policy.shaders().iter() {
        let mut binder = ShaderBinder::new(shader);
        mesh_policy.bind_mesh(&mut binder, cmd, primitive, element, state);
        policy.bind_mesh_parameters(&mut binder, cmd, view, primitive, mesh, data);
        binder.bind_defaults(cmd, ParameterFrequency::PerMesh, &view.global_resources);
    }
    Ok(())
}

/// Runs the full protocol for one dynamic mesh and returns the number of draws.
///
/// `state` is the pass's render state; the policy works on its own copy of it.
#[allow(clippy::too_many_arguments)]
pub fn draw_mesh_with_policy<'a, P: DrawingPolicy<'a>>(
    cmd: &mut dyn CommandList,
    policy: &P,
    state: &RenderStateDescriptor,
    view: &SceneView,
    primitive: Option<&PrimitiveSceneInfo>,
    mesh: &MeshBatch<'_>,
    data: &P::ElementData,
    ctx: PolicyContext,
) -> Result<usize, DrawError> {
    let mut state = state.clone();
    policy.setup_pipeline_state(&mut state, view);
    policy.commit_pipeline_state(cmd, &state, mesh)?;
    policy.set_shared_state(cmd, view, &state, ctx);
    for element_index in 0..mesh.elements.len() {
        policy.set_mesh_render_state(cmd, view, primitive, mesh, element_index, &state, data)?;
        policy.draw_mesh(cmd, mesh, element_index, ctx)?;
    }
    Ok(mesh.elements.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cull_mode_truth_table() {
        for bits in 0u8..16 {
            let mesh_two_sided = bits & 1 != 0;
            let mesh_reverse = bits & 2 != 0;
            let view_two_sided = bits & 4 != 0;
            let view_reverse = bits & 8 != 0;
            let expected = if mesh_two_sided || view_two_sided {
                CullMode::None
            } else if mesh_reverse != view_reverse {
                CullMode::Front
            } else {
                CullMode::Back
            };
            assert_eq!(
                compute_cull_mode(mesh_two_sided, mesh_reverse, view_two_sided, view_reverse),
                expected,
                "case {bits:04b}"
            );
        }
    }
}

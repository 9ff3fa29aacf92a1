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

//! Render lanes: the pass drivers that feed meshes through drawing policies.
//!
//! Each lane implements one mesh pass. It owns no GPU state: it reads the
//! [`Scene`] and a [`FrameContext`], builds or looks up drawing policies and
//! records commands into a [`CommandList`]. Pass ordering lives in the
//! [`FrameSequencer`].

use crate::drawing_policy::PolicyContext;
use crate::error::PolicyError;
use crate::static_draw_list::DrawListStats;
use ahash::AHashSet;
use std::sync::{Mutex, PoisonError};
use vesper_core::hit_proxy::HitProxyRegistry;
use vesper_core::material::MaterialProxyId;
use vesper_core::renderer::{
    BlendState, CommandList, DepthStencilState, DrawError, RenderStateDescriptor, ShaderError, ShaderType,
    ViewOverrideFlags,
};
use vesper_core::scene::{MeshBatch, PrimitiveSceneInfo, SceneView, ShowFlags};
use vesper_core::settings::RendererSettings;
use vesper_core::RendererContext;

mod base_pass_lane;
mod depth_lane;
mod distortion_lane;
mod hit_proxy_lane;
mod light_map_density_lane;
mod mesh_decal_lane;
mod mobile_base_pass_lane;
mod scene;
mod sequencer;
mod translucency_lane;
mod velocity_lane;

pub use base_pass_lane::*;
pub use depth_lane::*;
pub use distortion_lane::*;
pub use hit_proxy_lane::*;
pub use light_map_density_lane::*;
pub use mesh_decal_lane::*;
pub use mobile_base_pass_lane::*;
pub use scene::*;
pub use sequencer::*;
pub use translucency_lane::*;
pub use velocity_lane::*;

/// A trait defining the behavior of a mesh pass.
///
/// A lane is stateless across frames apart from its diagnostics, so one
/// instance can render any number of views.
pub trait MeshPassLane: Send + Sync {
    /// Returns a human-readable identifier for this pass.
    ///
    /// Used in log output and in the [`PassStats`] of a frame.
    fn pass_name(&self) -> &'static str;

    /// Returns `true` if the pass has anything to do for this view.
    ///
    /// A disabled pass is skipped as a whole; it is a zero-length iteration, not
    /// a cancellation.
    fn is_enabled(&self, frame: &FrameContext<'_>) -> bool {
        let _ = frame;
        true
    }

    /// Records the pass's draws.
    ///
    /// # Arguments
    ///
    /// * `scene`: Static meshes, cached draw lists and this frame's dynamic meshes.
    /// * `frame`: The view being rendered and the renderer settings.
    /// * `cmd`: The command list to record into.
    ///
    /// # Returns
    ///
    /// What the pass submitted. Meshes that cannot be drawn are counted as
    /// skipped and never abort the pass.
    fn render(&self, scene: &Scene<'_>, frame: &FrameContext<'_>, cmd: &mut dyn CommandList) -> PassStats;
}

/// Everything a lane needs to know about the view being rendered.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'f> {
    /// The view.
    pub view: &'f SceneView,
    /// Renderer settings.
    pub settings: &'f RendererSettings,
    /// Picking ids, consulted by the hit-proxy pass.
    pub hit_proxies: Option<&'f HitProxyRegistry>,
}

impl<'f> FrameContext<'f> {
    /// A frame of `view` rendered with the context's settings and registry.
    pub fn new(context: &'f RendererContext, view: &'f SceneView) -> Self {
        Self {
            view,
            settings: &context.settings,
            hit_proxies: Some(context.hit_proxies.as_ref()),
        }
    }

    /// A frame without a hit-proxy registry.
    pub fn with_settings(settings: &'f RendererSettings, view: &'f SceneView) -> Self {
        Self {
            view,
            settings,
            hit_proxies: None,
        }
    }

    /// The per-pass policy context of this view.
    pub fn policy_context(&self) -> PolicyContext {
        PolicyContext {
            instanced_stereo: self.view.instanced_stereo,
        }
    }

    /// The pass-level render state every lane starts from: the view's uniform
    /// buffers and overrides plus the given blend and depth-stencil states.
    pub fn pass_state(&self, blend_state: BlendState, depth_stencil_state: DepthStencilState) -> RenderStateDescriptor {
        let view = self.view;
        let mut state = RenderStateDescriptor::new(view.view_uniform_buffer)
            .with_blend_state(blend_state)
            .with_depth_stencil_state(depth_stencil_state);
        if view.instanced_stereo {
            state.instanced_view_uniform_buffer = view.instanced_view_uniform_buffer;
        }
        state
            .view_overrides
            .set(ViewOverrideFlags::WIREFRAME, view.show_flags.contains(ShowFlags::WIREFRAME));
        state
            .view_overrides
            .set(ViewOverrideFlags::REVERSE_CULLING, view.reverse_culling);
        state
    }
}

/// What one pass submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassStats {
    /// Name of the pass.
    pub pass: &'static str,
    /// Draw calls issued.
    pub draws: usize,
    /// Pipeline state objects set.
    pub pipeline_states: usize,
    /// Meshes that could not be drawn.
    pub skipped: usize,
}

impl PassStats {
    /// Empty statistics for a pass.
    pub fn new(pass: &'static str) -> Self {
        Self {
            pass,
            ..Default::default()
        }
    }

    /// Adds what a static draw list submitted, including the meshes it skipped.
    pub(crate) fn record_list(&mut self, list: DrawListStats) {
        self.draws += list.draws;
        self.pipeline_states += list.pipeline_states;
        self.skipped += list.skipped;
    }

    /// Adds the result of drawing one dynamic mesh.
    pub(crate) fn record_mesh(&mut self, result: Result<usize, DrawError>) {
        match result {
            Ok(draws) => {
                self.draws += draws;
                self.pipeline_states += 1;
            }
            Err(e) => {
                log::warn!("{}: mesh skipped: {e}.", self.pass);
                self.skipped += 1;
            }
        }
    }

    /// Unwraps a freshly built policy. Failures are reported to the scene's skip
    /// log and, unless the pass simply does not draw the material, counted.
    pub(crate) fn record_policy<P>(
        &mut self,
        scene: &Scene<'_>,
        material: MaterialProxyId,
        result: Result<P, PolicyError>,
    ) -> Option<P> {
        match result {
            Ok(policy) => Some(policy),
            Err(e) => {
                if !matches!(e, PolicyError::NotApplicable { .. }) {
                    self.skipped += 1;
                }
                scene.skip_log().report(self.pass, material, &e);
                None
            }
        }
    }
}

/// A mesh drawn by a per-frame pass, with the primitive it belongs to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameMesh<'s, 'a> {
    pub batch: &'s MeshBatch<'a>,
    pub primitive: Option<&'s PrimitiveSceneInfo>,
}

impl FrameMesh<'_, '_> {
    /// Squared distance from the view origin to the primitive's origin.
    pub fn distance_squared(&self, view: &SceneView) -> f32 {
        self.primitive.map_or(0.0, |p| {
            p.local_to_world.w_axis.truncate().distance_squared(view.view_origin)
        })
    }
}

/// The static meshes `view` marks visible followed by this frame's dynamic meshes.
pub(crate) fn frame_meshes<'s, 'a>(scene: &'s Scene<'a>, view: &SceneView) -> Vec<FrameMesh<'s, 'a>> {
    let statics = scene
        .static_meshes()
        .filter(|mesh| view.static_mesh_visibility.is_set(mesh.id.0))
        .map(|mesh| FrameMesh {
            batch: &mesh.batch,
            primitive: scene.primitive(mesh.primitive),
        });
    let dynamics = scene.dynamic_meshes().iter().map(|mesh| FrameMesh {
        batch: &mesh.batch,
        primitive: mesh.primitive.and_then(|id| scene.primitive(id)),
    });
    statics.chain(dynamics).collect()
}

/// Sorts meshes back to front.
pub(crate) fn sort_back_to_front(meshes: &mut [FrameMesh<'_, '_>], view: &SceneView) {
    meshes.sort_by(|a, b| b.distance_squared(view).total_cmp(&a.distance_squared(view)));
}

/// Records which (material, shader) pairs already reported a resolution failure,
/// so that a broken material warns once instead of every frame.
#[derive(Debug, Default)]
pub struct SkipLog {
    reported: Mutex<AHashSet<(MaterialProxyId, Option<ShaderType>)>>,
}

impl SkipLog {
    /// Logs a mesh skipped by `pass` because its policy could not be built.
    ///
    /// Meshes a pass does not draw at all are not worth a warning and are ignored.
    pub fn report(&self, pass: &'static str, material: MaterialProxyId, error: &PolicyError) {
        let shader_type = match error {
            PolicyError::NotApplicable { .. } => return,
            PolicyError::Shader(
                ShaderError::NotFound { shader_type, .. } | ShaderError::ExcludedPermutation { shader_type, .. },
            ) => Some(*shader_type),
        };
        let first = self
            .reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((material, shader_type));
        if first {
            log::warn!("{pass}: skipping meshes of material {material:?}: {error}.");
        }
    }

    /// Number of distinct failures reported.
    pub fn len(&self) -> usize {
        self.reported.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesper_core::renderer::{FeatureLevel, GlobalResources, ShaderPlatform, UniformBufferId};
    use vesper_core::scene::VertexFactoryTypeId;

    #[test]
    fn pass_state_carries_view_overrides() {
        let settings = RendererSettings::default();
        let mut view = SceneView::new(
            FeatureLevel::Sm5,
            ShaderPlatform::D3dSm5,
            UniformBufferId(1),
            GlobalResources::default(),
        );
        view.reverse_culling = true;
        view.show_flags |= ShowFlags::WIREFRAME;
        let frame = FrameContext::with_settings(&settings, &view);

        let state = frame.pass_state(BlendState::OPAQUE, DepthStencilState::DEPTH_WRITE);
        assert!(state.view_overrides.contains(ViewOverrideFlags::REVERSE_CULLING));
        assert!(state.view_overrides.contains(ViewOverrideFlags::WIREFRAME));
        assert_eq!(state.view_uniform_buffer, Some(UniformBufferId(1)));
        assert_eq!(state.instanced_view_uniform_buffer, None);
    }

    #[test]
    fn skip_log_reports_each_failure_once() {
        let log = SkipLog::default();
        let error = PolicyError::Shader(ShaderError::NotFound {
            shader_type: ShaderType::VelocityVs,
            vertex_factory_type: VertexFactoryTypeId(1),
        });
        log.report("Velocity", MaterialProxyId(3), &error);
        log.report("Velocity", MaterialProxyId(3), &error);
        log.report(
            "Velocity",
            MaterialProxyId(3),
            &PolicyError::NotApplicable {
                pass: "Velocity",
                material: MaterialProxyId(3),
            },
        );
        assert_eq!(log.len(), 1);
    }
}

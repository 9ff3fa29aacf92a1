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

//! Static mesh draw lists: meshes cached across frames, bucketed by drawing policy.
//!
//! A list holds at most one entry per `(vertex factory type, policy)` pair. Every
//! static mesh whose policy compares equal to an existing entry is linked into that
//! entry, so shader lookup and shared-state binding happen once per entry instead
//! of once per mesh.
//!
//! Lists are mutated by the rendering thread between frames only. They carry no
//! locking.

use crate::drawing_policy::{DrawingPolicy, PolicyContext};
use ahash::AHashMap;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use vesper_core::renderer::{
    CommandList, DrawError, GraphicsPipelineStateInitializer, RenderStateDescriptor, ViewOverrideFlags,
};
use vesper_core::scene::{PrimitiveId, PrimitiveSceneInfo, SceneView, StaticMesh, StaticMeshId, VertexFactoryTypeId};

/// Resolves the static meshes and primitives referenced by a draw list.
pub trait StaticMeshLookup<'a> {
    /// The static mesh with the given id, if it still exists.
    fn static_mesh(&self, id: StaticMeshId) -> Option<&StaticMesh<'a>>;

    /// The primitive with the given id, if it still exists.
    fn primitive(&self, id: PrimitiveId) -> Option<&PrimitiveSceneInfo>;
}

/// Stable handle of one policy entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolicyLinkHandle(usize);

#[derive(Debug, Clone)]
struct LinkedMesh<D> {
    mesh: StaticMeshId,
    data: D,
}

#[derive(Debug)]
struct PolicyLink<P, D> {
    vertex_factory_type: VertexFactoryTypeId,
    policy: P,
    meshes: Vec<LinkedMesh<D>>,
}

/// What a draw list submitted in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawListStats {
    /// Policy entries with at least one visible mesh.
    pub policies: usize,
    /// Pipeline state objects set.
    pub pipeline_states: usize,
    /// Draw calls issued.
    pub draws: usize,
    /// Visible meshes that failed to draw.
    pub skipped: usize,
}

impl std::ops::AddAssign for DrawListStats {
    fn add_assign(&mut self, other: Self) {
        self.policies += other.policies;
        self.pipeline_states += other.pipeline_states;
        self.draws += other.draws;
        self.skipped += other.skipped;
    }
}

/// Copies the view's dithered LOD fade of `mesh` into a per-primitive render state.
///
/// Meshes fading out use the view's transition alpha, meshes fading in use its
/// complement shifted below zero.
pub fn apply_dithered_lod_transition(state: &mut RenderStateDescriptor, view: &SceneView, mesh: &StaticMesh<'_>) {
    if !mesh.batch.dithered_lod_transition {
        return;
    }
    let index = mesh.id.0;
    let alpha = if view.static_mesh_fade_out_dithered_lod.is_set(index) {
        view.temporal_lod_transition_alpha
    } else if view.static_mesh_fade_in_dithered_lod.is_set(index) {
        view.temporal_lod_transition_alpha - 1.0
    } else {
        return;
    };
    state.view_overrides.insert(ViewOverrideFlags::DITHERED_LOD_TRANSITION);
    state.dithered_lod_transition_alpha = alpha;
}

/// A static draw list for one policy type.
#[derive(Debug)]
pub struct StaticDrawList<P: Ord, D> {
    index: BTreeMap<(VertexFactoryTypeId, P), usize>,
    links: Vec<Option<PolicyLink<P, D>>>,
    free: Vec<usize>,
    mesh_links: AHashMap<StaticMeshId, SmallVec<[usize; 2]>>,
    name: &'static str,
}

impl<P: Ord + Clone, D: Clone> StaticDrawList<P, D> {
    /// Creates an empty list. `name` only appears in log output.
    pub fn new(name: &'static str) -> Self {
        Self {
            index: BTreeMap::new(),
            links: Vec::new(),
            free: Vec::new(),
            mesh_links: AHashMap::new(),
            name,
        }
    }

    /// Returns the entry of `policy`, creating it if no equal policy is cached.
    pub fn get_or_create(&mut self, vertex_factory_type: VertexFactoryTypeId, policy: P) -> PolicyLinkHandle {
        let key = (vertex_factory_type, policy);
        if let Some(&slot) = self.index.get(&key) {
            return PolicyLinkHandle(slot);
        }
        let link = PolicyLink {
            vertex_factory_type,
            policy: key.1.clone(),
            meshes: Vec::new(),
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.links[slot] = Some(link);
                slot
            }
            None => {
                self.links.push(Some(link));
                self.links.len() - 1
            }
        };
        self.index.insert(key, slot);
        log::debug!(
            "{}: created policy entry {slot} ({} entries).",
            self.name,
            self.index.len()
        );
        PolicyLinkHandle(slot)
    }

    /// Links `mesh` into the entry of `policy`.
    pub fn add_mesh(
        &mut self,
        mesh: StaticMeshId,
        vertex_factory_type: VertexFactoryTypeId,
        policy: P,
        data: D,
    ) -> PolicyLinkHandle {
        let handle = self.get_or_create(vertex_factory_type, policy);
        if let Some(link) = self.links[handle.0].as_mut() {
            link.meshes.push(LinkedMesh { mesh, data });
        }
        let links = self.mesh_links.entry(mesh).or_default();
        if !links.contains(&handle.0) {
            links.push(handle.0);
        }
        handle
    }

    /// Unlinks `mesh` from every entry it was added to and drops the entries left
    /// empty. Returns the number of entries the mesh was linked into.
    pub fn remove_mesh(&mut self, mesh: StaticMeshId) -> usize {
        let Some(slots) = self.mesh_links.remove(&mesh) else {
            return 0;
        };
        for &slot in &slots {
            let now_empty = match self.links[slot].as_mut() {
                Some(link) => {
                    link.meshes.retain(|linked| linked.mesh != mesh);
                    link.meshes.is_empty()
                }
                None => false,
            };
            if now_empty {
                if let Some(link) = self.links[slot].take() {
                    self.index.remove(&(link.vertex_factory_type, link.policy));
                    self.free.push(slot);
                    log::debug!(
                        "{}: dropped empty policy entry {slot} ({} entries).",
                        self.name,
                        self.index.len()
                    );
                }
            }
        }
        slots.len()
    }

    /// Number of cached policy entries.
    pub fn num_policies(&self) -> usize {
        self.index.len()
    }

    /// Number of linked meshes, counting a mesh once per entry it is linked into.
    pub fn num_meshes(&self) -> usize {
        self.links.iter().flatten().map(|link| link.meshes.len()).sum()
    }

    /// Returns `true` if `mesh` is linked into the list.
    pub fn contains_mesh(&self, mesh: StaticMeshId) -> bool {
        self.mesh_links.contains_key(&mesh)
    }

    /// The policy of an entry, if the entry still exists.
    pub fn policy(&self, handle: PolicyLinkHandle) -> Option<&P> {
        self.links.get(handle.0)?.as_ref().map(|link| &link.policy)
    }

    /// Every cached policy, in draw order.
    pub fn policies(&self) -> impl Iterator<Item = &P> {
        self.index.values().filter_map(|&slot| self.links[slot].as_ref()).map(|link| &link.policy)
    }

    /// The number of meshes linked into an entry.
    pub fn num_meshes_in(&self, handle: PolicyLinkHandle) -> usize {
        self.links
            .get(handle.0)
            .and_then(Option::as_ref)
            .map_or(0, |link| link.meshes.len())
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.index.clear();
        self.links.clear();
        self.free.clear();
        self.mesh_links.clear();
    }
}

impl<P: Ord + Clone, D: Clone> StaticDrawList<P, D> {
    /// Draws every mesh of the list that `view` marks visible.
    ///
    /// Entries are walked in policy order. Shared state is bound once per entry and
    /// the pipeline state object is only set again when a mesh's differs from the
    /// last one set. A mesh that fails to draw is logged and counted as skipped;
    /// the rest of the list is still drawn.
    pub fn draw_visible<'a, L>(
        &self,
        cmd: &mut dyn CommandList,
        view: &SceneView,
        pass_state: &RenderStateDescriptor,
        ctx: PolicyContext,
        lookup: &L,
    ) -> DrawListStats
    where
        P: DrawingPolicy<'a, ElementData = D>,
        L: StaticMeshLookup<'a> + ?Sized,
    {
        let mut cursor = ListCursor::default();

        for &slot in self.index.values() {
            let Some(link) = self.links[slot].as_ref() else {
                continue;
            };
            let mut shared_state_set = false;
            for linked in &link.meshes {
                if !view.static_mesh_visibility.is_set(linked.mesh.0) {
                    continue;
                }
                let Some(mesh) = lookup.static_mesh(linked.mesh) else {
                    continue;
                };
                let primitive = lookup.primitive(mesh.primitive);
                let target = MeshTarget {
                    mesh,
                    primitive,
                    data: &linked.data,
                };
                if let Err(e) = cursor.draw(&link.policy, cmd, view, pass_state, ctx, target, &mut shared_state_set) {
                    log::warn!("{}: static mesh {} skipped: {e}.", self.name, linked.mesh.0);
                    cursor.stats.skipped += 1;
                }
            }
        }
        cursor.stats
    }
}

struct MeshTarget<'s, 'a, D> {
    mesh: &'s StaticMesh<'a>,
    primitive: Option<&'s PrimitiveSceneInfo>,
    data: &'s D,
}

/// Pipeline state and counters carried across the meshes of one list.
#[derive(Default)]
struct ListCursor {
    committed: Option<GraphicsPipelineStateInitializer>,
    stats: DrawListStats,
}

impl ListCursor {
    #[allow(clippy::too_many_arguments)]
    fn draw<'a, P: DrawingPolicy<'a>>(
        &mut self,
        policy: &P,
        cmd: &mut dyn CommandList,
        view: &SceneView,
        pass_state: &RenderStateDescriptor,
        ctx: PolicyContext,
        target: MeshTarget<'_, '_, P::ElementData>,
        shared_state_set: &mut bool,
    ) -> Result<(), DrawError> {
        let mesh = target.mesh;
        let mut state = pass_state.clone();
        apply_dithered_lod_transition(&mut state, view, mesh);
        policy.setup_pipeline_state(&mut state, view);

        let initializer = policy.pipeline_state_initializer(&state, &mesh.batch)?;
        if self.committed.as_ref() != Some(&initializer) {
            policy.commit_pipeline_state(cmd, &state, &mesh.batch)?;
            self.committed = Some(initializer);
            self.stats.pipeline_states += 1;
        } else {
            cmd.set_stencil_ref(state.stencil_ref);
        }
        if !*shared_state_set {
            policy.set_shared_state(cmd, view, &state, ctx);
            *shared_state_set = true;
            self.stats.policies += 1;
        }
        for element_index in 0..mesh.batch.elements.len() {
            policy.set_mesh_render_state(cmd, view, target.primitive, &mesh.batch, element_index, &state, target.data)?;
            policy.draw_mesh(cmd, &mesh.batch, element_index, ctx)?;
            self.stats.draws += 1;
        }
        Ok(())
    }
}

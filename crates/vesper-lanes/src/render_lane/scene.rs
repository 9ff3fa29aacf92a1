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

//! The render-thread scene: primitives, static meshes and their cached draw lists.

use super::{resolve_hit_proxy_id, SkipLog};
use crate::binding::{LightMapElementData, TranslucentSelfShadow};
use crate::drawing_policy::{
    uses_sky_light, BasePassDrawingPolicy, BasePassOptions, DepthDrawingPolicy, HitProxyDrawingPolicy,
    SceneTextureMode, VelocityDrawingPolicy,
};
use crate::selector::{select_light_map_policy, LightingCapabilities, MobileDirectionalLight};
use crate::static_draw_list::{StaticDrawList, StaticMeshLookup};
use ahash::AHashMap;
use smallvec::SmallVec;
use std::fmt;
use vesper_core::hit_proxy::HitProxyId;
use vesper_core::material::{MaterialDomain, MaterialProperties, MaterialRenderProxy};
use vesper_core::renderer::{FeatureLevel, ShaderPlatform};
use vesper_core::scene::{DebugViewShaderMode, MeshBatch, PrimitiveId, PrimitiveSceneInfo, StaticMesh, StaticMeshId};
use vesper_core::settings::{DepthDrawingMode, RendererSettings};

/// The scene's sky light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SkyLight {
    /// Stationary sky lights have baked shadowing.
    pub stationary: bool,
}

/// Scene-wide lighting the policy selection depends on.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SceneLighting {
    /// The sky light, if any.
    pub sky_light: Option<SkyLight>,
    /// The mobile directional light, if any.
    pub mobile_directional_light: Option<MobileDirectionalLight>,
    /// Volumetric lightmap data was built for the scene.
    pub volumetric_lightmap: bool,
    /// Self shadowing of translucency from the main directional light.
    pub translucent_self_shadow: Option<TranslucentSelfShadow>,
}

/// The two base pass draw lists. Masked meshes are drawn after opaque ones so
/// that they benefit from the opaque depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BasePassDrawListType {
    /// Opaque meshes.
    Default,
    /// Masked meshes.
    Masked,
}

impl BasePassDrawListType {
    /// The list a material's meshes are drawn from.
    pub fn for_material(material: &MaterialProperties) -> Self {
        if material.is_masked() {
            BasePassDrawListType::Masked
        } else {
            BasePassDrawListType::Default
        }
    }
}

/// A mesh batch submitted for one frame only.
#[derive(Debug, Clone)]
pub struct DynamicMesh<'a> {
    /// The batch.
    pub batch: MeshBatch<'a>,
    /// The primitive it belongs to, if any.
    pub primitive: Option<PrimitiveId>,
    /// Hit proxy the batch is picked as.
    pub hit_proxy_id: HitProxyId,
}

/// Which depth list a material's meshes go into, if any.
pub(crate) fn depth_draw_list_for(
    material: &MaterialProperties,
    primitive: Option<&PrimitiveSceneInfo>,
    mode: DepthDrawingMode,
) -> Option<BasePassDrawListType> {
    if material.domain != MaterialDomain::Surface || material.is_translucent() {
        return None;
    }
    let list = BasePassDrawListType::for_material(material);
    match mode {
        DepthDrawingMode::None => None,
        DepthDrawingMode::NonMaskedOnly => (list == BasePassDrawListType::Default).then_some(list),
        DepthDrawingMode::AllOccluders => primitive.map_or(true, |p| p.use_as_occluder).then_some(list),
        DepthDrawingMode::AllOpaque => Some(list),
    }
}

/// Light-map policy, sky light and the rest of the base pass options of one mesh.
pub(crate) fn base_pass_options(
    mesh: &MeshBatch<'_>,
    primitive: Option<&PrimitiveSceneInfo>,
    feature_level: FeatureLevel,
    capabilities: LightingCapabilities,
    lighting: &SceneLighting,
    settings: &RendererSettings,
) -> BasePassOptions {
    let material = mesh.material_render_proxy.material().properties();
    let light_map = select_light_map_policy(
        mesh,
        primitive,
        feature_level,
        settings.simple_forward_shading,
        capabilities,
        settings,
    );
    let sky_light = uses_sky_light(material, lighting.sky_light.map(|s| s.stationary), settings)
        || (light_map.requires_sky_light() && lighting.sky_light.is_some());
    BasePassOptions {
        light_map,
        scene_texture_mode: SceneTextureMode::DontSet,
        sky_light,
        atmospheric_fog: false,
        receive_decal_output: !settings.simple_forward_shading
            && !feature_level.is_mobile()
            && primitive.map_or(true, |p| p.receives_decals),
    }
}

/// Primitives, static meshes and the static draw lists of the deferred passes.
///
/// Static meshes link themselves into every draw list that applies when they are
/// added, and unlink from all of them when removed or invalidated. Everything
/// here is mutated by the rendering thread between frames.
pub struct Scene<'a> {
    platform: ShaderPlatform,
    feature_level: FeatureLevel,
    settings: RendererSettings,
    default_material: &'a dyn MaterialRenderProxy,
    lighting: SceneLighting,
    stencil_lod_dither: bool,

    primitives: Vec<Option<PrimitiveSceneInfo>>,
    free_primitives: Vec<usize>,
    static_meshes: Vec<Option<StaticMesh<'a>>>,
    free_static_meshes: Vec<usize>,
    primitive_meshes: AHashMap<PrimitiveId, SmallVec<[StaticMeshId; 4]>>,
    dynamic_meshes: Vec<DynamicMesh<'a>>,

    depth_draw_list: StaticDrawList<DepthDrawingPolicy<'a>, ()>,
    masked_depth_draw_list: StaticDrawList<DepthDrawingPolicy<'a>, ()>,
    base_pass_draw_list: StaticDrawList<BasePassDrawingPolicy<'a>, LightMapElementData>,
    masked_base_pass_draw_list: StaticDrawList<BasePassDrawingPolicy<'a>, LightMapElementData>,
    velocity_draw_list: StaticDrawList<VelocityDrawingPolicy<'a>, ()>,
    hit_proxy_draw_list: StaticDrawList<HitProxyDrawingPolicy<'a>, HitProxyId>,

    skip_log: SkipLog,
}

impl<'a> Scene<'a> {
    /// Creates an empty scene rendered on `platform`.
    ///
    /// `default_material` draws the depth-like passes of every mesh whose material
    /// neither clips pixels nor moves vertices. It must be a special engine
    /// material compiled for every vertex factory type added to the scene.
    pub fn new(
        platform: ShaderPlatform,
        settings: RendererSettings,
        default_material: &'a dyn MaterialRenderProxy,
    ) -> Self {
        Self {
            platform,
            feature_level: platform.max_feature_level(),
            settings,
            default_material,
            lighting: SceneLighting::default(),
            stencil_lod_dither: false,
            primitives: Vec::new(),
            free_primitives: Vec::new(),
            static_meshes: Vec::new(),
            free_static_meshes: Vec::new(),
            primitive_meshes: AHashMap::new(),
            dynamic_meshes: Vec::new(),
            depth_draw_list: StaticDrawList::new("DepthPass"),
            masked_depth_draw_list: StaticDrawList::new("MaskedDepthPass"),
            base_pass_draw_list: StaticDrawList::new("BasePass"),
            masked_base_pass_draw_list: StaticDrawList::new("MaskedBasePass"),
            velocity_draw_list: StaticDrawList::new("Velocity"),
            hit_proxy_draw_list: StaticDrawList::new("HitProxy"),
            skip_log: SkipLog::default(),
        }
    }

    /// The platform shaders are resolved for.
    pub fn platform(&self) -> ShaderPlatform {
        self.platform
    }

    /// The feature level of the platform.
    pub fn feature_level(&self) -> FeatureLevel {
        self.feature_level
    }

    /// The settings the static draw lists were built with.
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// The engine default material.
    pub fn default_material(&self) -> &'a dyn MaterialRenderProxy {
        self.default_material
    }

    /// Scene-wide lighting.
    pub fn lighting(&self) -> &SceneLighting {
        &self.lighting
    }

    /// What the base and translucency passes may sample when drawing `material`.
    ///
    /// Cached lists and per-frame policies both derive their light-map choice
    /// from this, so a mesh selects the same policy on either path.
    pub fn lighting_capabilities(&self, material: &MaterialProperties) -> LightingCapabilities {
        LightingCapabilities::for_material(
            material,
            self.lighting.volumetric_lightmap,
            self.lighting.translucent_self_shadow.is_some(),
        )
    }

    /// Shader resolution failures reported while building policies.
    pub fn skip_log(&self) -> &SkipLog {
        &self.skip_log
    }

    /// Replaces the scene lighting and rebuilds every static draw list, since the
    /// chosen light-map and sky light permutations depend on it.
    pub fn set_lighting(&mut self, lighting: SceneLighting) {
        if self.lighting != lighting {
            self.lighting = lighting;
            self.relink_all();
        }
    }

    /// Depth prepass draws write the dithered LOD stencil bit.
    pub fn set_stencil_lod_dither(&mut self, enabled: bool) {
        if self.stencil_lod_dither != enabled {
            self.stencil_lod_dither = enabled;
            self.relink_all();
        }
    }

    /// Adds a primitive and returns its id. The `id` field of `info` is overwritten.
    pub fn add_primitive(&mut self, mut info: PrimitiveSceneInfo) -> PrimitiveId {
        let index = match self.free_primitives.pop() {
            Some(index) => index,
            None => {
                self.primitives.push(None);
                self.primitives.len() - 1
            }
        };
        let id = PrimitiveId(index);
        info.id = id;
        self.primitives[index] = Some(info);
        id
    }

    /// Removes a primitive and every static mesh it owns.
    pub fn remove_primitive(&mut self, id: PrimitiveId) -> bool {
        if self.primitives.get(id.0).and_then(Option::as_ref).is_none() {
            return false;
        }
        for mesh in self.primitive_meshes.remove(&id).unwrap_or_default() {
            self.unlink_static_mesh(mesh);
            if let Some(slot) = self.static_meshes.get_mut(mesh.0) {
                *slot = None;
                self.free_static_meshes.push(mesh.0);
            }
        }
        self.primitives[id.0] = None;
        self.free_primitives.push(id.0);
        true
    }

    /// A primitive.
    pub fn primitive(&self, id: PrimitiveId) -> Option<&PrimitiveSceneInfo> {
        self.primitives.get(id.0)?.as_ref()
    }

    /// Changes a primitive, then relinks its static meshes: mobility, lighting
    /// and occluder flags all feed policy selection.
    pub fn update_primitive(&mut self, id: PrimitiveId, update: impl FnOnce(&mut PrimitiveSceneInfo)) -> bool {
        let Some(info) = self.primitives.get_mut(id.0).and_then(Option::as_mut) else {
            return false;
        };
        update(info);
        info.id = id;
        let meshes = self.primitive_meshes.get(&id).cloned().unwrap_or_default();
        for mesh in meshes {
            self.relink_static_mesh(mesh);
        }
        true
    }

    /// Adds a static mesh owned by `primitive` and links it into the draw lists.
    pub fn add_static_mesh(&mut self, primitive: PrimitiveId, batch: MeshBatch<'a>, hit_proxy_id: HitProxyId) -> StaticMeshId {
        let index = match self.free_static_meshes.pop() {
            Some(index) => index,
            None => {
                self.static_meshes.push(None);
                self.static_meshes.len() - 1
            }
        };
        let id = StaticMeshId(index);
        self.static_meshes[index] = Some(StaticMesh {
            id,
            primitive,
            batch,
            hit_proxy_id,
        });
        self.primitive_meshes.entry(primitive).or_default().push(id);
        self.link_static_mesh(id);
        id
    }

    /// Unlinks a static mesh from every draw list and drops it.
    pub fn remove_static_mesh(&mut self, id: StaticMeshId) -> bool {
        let Some(mesh) = self.static_meshes.get_mut(id.0).and_then(Option::take) else {
            return false;
        };
        self.unlink_static_mesh(id);
        if let Some(meshes) = self.primitive_meshes.get_mut(&mesh.primitive) {
            meshes.retain(|m| *m != id);
        }
        self.free_static_meshes.push(id.0);
        true
    }

    /// Replaces the batch of a static mesh, e.g. after a material or vertex
    /// factory change, and relinks it.
    pub fn update_static_mesh(&mut self, id: StaticMeshId, batch: MeshBatch<'a>) -> bool {
        let Some(mesh) = self.static_meshes.get_mut(id.0).and_then(Option::as_mut) else {
            return false;
        };
        mesh.batch = batch;
        self.relink_static_mesh(id);
        true
    }

    /// Every live static mesh.
    pub fn static_meshes(&self) -> impl Iterator<Item = &StaticMesh<'a>> {
        self.static_meshes.iter().flatten()
    }

    /// Number of live static meshes.
    pub fn num_static_meshes(&self) -> usize {
        self.static_meshes().count()
    }

    /// Queues a mesh for this frame only.
    pub fn push_dynamic_mesh(&mut self, mesh: DynamicMesh<'a>) {
        self.dynamic_meshes.push(mesh);
    }

    /// Drops the dynamic meshes of the previous frame.
    pub fn clear_dynamic_meshes(&mut self) {
        self.dynamic_meshes.clear();
    }

    /// This frame's dynamic meshes.
    pub fn dynamic_meshes(&self) -> &[DynamicMesh<'a>] {
        &self.dynamic_meshes
    }

    /// A depth prepass draw list.
    pub fn depth_draw_list(&self, list: BasePassDrawListType) -> &StaticDrawList<DepthDrawingPolicy<'a>, ()> {
        match list {
            BasePassDrawListType::Default => &self.depth_draw_list,
            BasePassDrawListType::Masked => &self.masked_depth_draw_list,
        }
    }

    /// A base pass draw list.
    pub fn base_pass_draw_list(
        &self,
        list: BasePassDrawListType,
    ) -> &StaticDrawList<BasePassDrawingPolicy<'a>, LightMapElementData> {
        match list {
            BasePassDrawListType::Default => &self.base_pass_draw_list,
            BasePassDrawListType::Masked => &self.masked_base_pass_draw_list,
        }
    }

    /// The velocity draw list.
    pub fn velocity_draw_list(&self) -> &StaticDrawList<VelocityDrawingPolicy<'a>, ()> {
        &self.velocity_draw_list
    }

    /// The hit-proxy draw list.
    pub fn hit_proxy_draw_list(&self) -> &StaticDrawList<HitProxyDrawingPolicy<'a>, HitProxyId> {
        &self.hit_proxy_draw_list
    }

    fn relink_all(&mut self) {
        let ids: Vec<StaticMeshId> = self.static_meshes().map(|mesh| mesh.id).collect();
        for id in ids {
            self.relink_static_mesh(id);
        }
    }

    fn relink_static_mesh(&mut self, id: StaticMeshId) {
        self.unlink_static_mesh(id);
        self.link_static_mesh(id);
    }

    fn unlink_static_mesh(&mut self, id: StaticMeshId) {
        self.depth_draw_list.remove_mesh(id);
        self.masked_depth_draw_list.remove_mesh(id);
        self.base_pass_draw_list.remove_mesh(id);
        self.masked_base_pass_draw_list.remove_mesh(id);
        self.velocity_draw_list.remove_mesh(id);
        self.hit_proxy_draw_list.remove_mesh(id);
    }

    fn link_static_mesh(&mut self, id: StaticMeshId) {
        // Mobile passes build their policies per frame.
        if self.platform.is_mobile() {
            return;
        }
        let Some(mesh) = self.static_meshes.get(id.0).and_then(Option::as_ref) else {
            return;
        };
        let primitive = self.primitives.get(mesh.primitive.0).and_then(Option::as_ref);
        let batch = &mesh.batch;
        let vertex_factory = batch.vertex_factory;
        let vertex_factory_type = vertex_factory.type_id();
        let proxy = batch.material_render_proxy;
        let material = proxy.material().properties();
        let platform = self.platform;
        let settings = &self.settings;
        let skip_log = &self.skip_log;

        if let Some(list) = depth_draw_list_for(material, primitive, settings.early_z_pass) {
            let draw_list = match list {
                BasePassDrawListType::Default => &mut self.depth_draw_list,
                BasePassDrawListType::Masked => &mut self.masked_depth_draw_list,
            };
            match DepthDrawingPolicy::new(vertex_factory, proxy, self.default_material, platform, self.stencil_lod_dither)
            {
                Ok(policy) => {
                    draw_list.add_mesh(id, vertex_factory_type, policy, ());
                }
                Err(e) => skip_log.report("DepthPass", proxy.id(), &e),
            }
        }

        let opaque_surface = material.domain == MaterialDomain::Surface && !material.is_translucent();
        if opaque_surface {
            let capabilities = self.lighting_capabilities(material);
            let options = base_pass_options(batch, primitive, self.feature_level, capabilities, &self.lighting, settings);
            let draw_list = match BasePassDrawListType::for_material(material) {
                BasePassDrawListType::Default => &mut self.base_pass_draw_list,
                BasePassDrawListType::Masked => &mut self.masked_base_pass_draw_list,
            };
            match BasePassDrawingPolicy::new(
                vertex_factory,
                proxy,
                platform,
                DebugViewShaderMode::None,
                options,
            ) {
                Ok(policy) => {
                    draw_list.add_mesh(id, vertex_factory_type, policy, LightMapElementData::default());
                }
                Err(e) => skip_log.report("BasePass", proxy.id(), &e),
            }

            let movable = primitive.is_some_and(PrimitiveSceneInfo::is_movable);
            if movable && self.feature_level >= FeatureLevel::Sm4 {
                match VelocityDrawingPolicy::new(vertex_factory, proxy, self.default_material, platform) {
                    Ok(policy) => {
                        self.velocity_draw_list.add_mesh(id, vertex_factory_type, policy, ());
                    }
                    Err(e) => skip_log.report("Velocity", proxy.id(), &e),
                }
            }
        }

        let selectable = primitive.map_or(true, |p| p.selectable);
        let hit_proxy_id = resolve_hit_proxy_id(mesh.hit_proxy_id, primitive);
        if selectable && hit_proxy_id != HitProxyId::INVISIBLE && !material.is_deferred_decal() {
            match HitProxyDrawingPolicy::new(vertex_factory, proxy, self.default_material, platform) {
                Ok(policy) => {
                    self.hit_proxy_draw_list.add_mesh(id, vertex_factory_type, policy, hit_proxy_id);
                }
                Err(e) => skip_log.report("HitProxy", proxy.id(), &e),
            }
        }
    }
}

impl<'a> StaticMeshLookup<'a> for Scene<'a> {
    fn static_mesh(&self, id: StaticMeshId) -> Option<&StaticMesh<'a>> {
        self.static_meshes.get(id.0)?.as_ref()
    }

    fn primitive(&self, id: PrimitiveId) -> Option<&PrimitiveSceneInfo> {
        Scene::primitive(self, id)
    }
}

impl fmt::Debug for Scene<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("platform", &self.platform)
            .field("primitives", &self.primitives.iter().flatten().count())
            .field("static_meshes", &self.num_static_meshes())
            .field("dynamic_meshes", &self.dynamic_meshes.len())
            .field("base_pass_policies", &self.base_pass_draw_list.num_policies())
            .finish_non_exhaustive()
    }
}

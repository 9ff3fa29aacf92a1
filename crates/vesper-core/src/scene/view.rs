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

//! Per-view state the passes and drawing policies read.

use crate::renderer::api::platform::{FeatureLevel, ShaderPlatform};
use crate::renderer::api::resource::{BufferId, GlobalResources, TextureId, UniformBufferId};
use crate::util::SceneBitArray;
use bitflags::bitflags;
use glam::Vec3;

bitflags! {
    /// Which optional passes and visualisations a view renders.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShowFlags: u16 {
        /// Draw everything as wireframe.
        const WIREFRAME = 1 << 0;
        /// Replace the base pass with the light-map density visualisation.
        const LIGHT_MAP_DENSITY = 1 << 1;
        /// Mesh decals.
        const DECALS = 1 << 2;
        /// Distortion accumulation and apply.
        const DISTORTION = 1 << 3;
        /// Translucent meshes.
        const TRANSLUCENCY = 1 << 4;
        /// Velocity output for motion blur and temporal AA.
        const VELOCITY = 1 << 5;
        /// Shader complexity overlay.
        const SHADER_COMPLEXITY = 1 << 6;
    }
}

impl Default for ShowFlags {
    fn default() -> Self {
        ShowFlags::DECALS | ShowFlags::DISTORTION | ShowFlags::TRANSLUCENCY | ShowFlags::VELOCITY
    }
}

/// A debug visualisation that swaps pixel shaders for every mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DebugViewShaderMode {
    /// Regular rendering.
    #[default]
    None,
    /// Instruction count heat map.
    ShaderComplexity,
    /// Quad overdraw heat map.
    QuadComplexity,
    /// Texture streaming scale output.
    OutputMaterialTextureScales,
}

/// Culled light lists for forward shading of one eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardLightData {
    /// Forward light parameters.
    pub uniform_buffer: UniformBufferId,
    /// Light indices per froxel.
    pub culled_light_grid: BufferId,
}

/// Parameters of the light-map density visualisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightMapDensitySettings {
    /// Texels per world unit shown as green.
    pub ideal: f32,
    /// Texels per world unit shown as red.
    pub maximum: f32,
    /// Render the grayscale variant.
    pub grayscale: bool,
}

impl Default for LightMapDensitySettings {
    fn default() -> Self {
        Self {
            ideal: 0.2,
            maximum: 0.8,
            grayscale: false,
        }
    }
}

/// Everything the mesh drawing code reads from a view.
#[derive(Debug, Clone)]
pub struct SceneView {
    /// Feature level of the view family.
    pub feature_level: FeatureLevel,
    /// Shader platform of the view family.
    pub shader_platform: ShaderPlatform,
    /// View uniform buffer.
    pub view_uniform_buffer: UniformBufferId,
    /// World-space eye position, used to sort translucent meshes.
    pub view_origin: Vec3,
    /// The second eye's view uniform buffer in side-by-side instanced stereo.
    pub instanced_view_uniform_buffer: Option<UniformBufferId>,
    /// Both eyes are drawn with one instanced draw.
    pub instanced_stereo: bool,
    /// Mirrored view, invert every cull mode.
    pub reverse_culling: bool,
    /// Optional passes and visualisations.
    pub show_flags: ShowFlags,
    /// Active debug pixel shader mode.
    pub debug_view_mode: DebugViewShaderMode,
    /// Height and atmospheric fog parameters.
    pub fog_uniform_buffer: Option<UniformBufferId>,
    /// Precomputed atmospheric fog inscattering.
    pub fog_inscattering_texture: Option<TextureId>,
    /// Reflection capture parameters.
    pub reflection_capture_uniform_buffer: Option<UniformBufferId>,
    /// Forward lighting data, primary eye.
    pub forward_light_data: Option<ForwardLightData>,
    /// Forward lighting data, second eye.
    pub instanced_forward_light_data: Option<ForwardLightData>,
    /// Mobile directional light parameters.
    pub mobile_directional_light_uniform_buffer: Option<UniformBufferId>,
    /// Volumetric lightmap brick atlas.
    pub volumetric_lightmap_brick_texture: Option<TextureId>,
    /// Indirect lighting cache volume atlases (three SH bands).
    pub indirect_lighting_cache_volumes: Option<[TextureId; 3]>,
    /// Scene color, for passes that read it.
    pub scene_color_texture: Option<TextureId>,
    /// Scene depth, for passes that read it.
    pub scene_depth_texture: Option<TextureId>,
    /// Fallback resources for declared-but-unsupplied slots.
    pub global_resources: GlobalResources,
    /// Static meshes visible in this view, by static mesh id.
    pub static_mesh_visibility: SceneBitArray,
    /// Static meshes fading out, by static mesh id.
    pub static_mesh_fade_out_dithered_lod: SceneBitArray,
    /// Static meshes fading in, by static mesh id.
    pub static_mesh_fade_in_dithered_lod: SceneBitArray,
    /// Progress of the current LOD transition, in [0, 1].
    pub temporal_lod_transition_alpha: f32,
    /// Use the stencil buffer for LOD dithering instead of pixel shader clip.
    pub allow_stencil_dither: bool,
    /// Light-map density visualisation parameters.
    pub light_map_density: LightMapDensitySettings,
}

impl SceneView {
    /// A view with no optional data bound.
    pub fn new(
        feature_level: FeatureLevel,
        shader_platform: ShaderPlatform,
        view_uniform_buffer: UniformBufferId,
        global_resources: GlobalResources,
    ) -> Self {
        Self {
            feature_level,
            shader_platform,
            view_uniform_buffer,
            view_origin: Vec3::ZERO,
            instanced_view_uniform_buffer: None,
            instanced_stereo: false,
            reverse_culling: false,
            show_flags: ShowFlags::default(),
            debug_view_mode: DebugViewShaderMode::None,
            fog_uniform_buffer: None,
            fog_inscattering_texture: None,
            reflection_capture_uniform_buffer: None,
            forward_light_data: None,
            instanced_forward_light_data: None,
            mobile_directional_light_uniform_buffer: None,
            volumetric_lightmap_brick_texture: None,
            indirect_lighting_cache_volumes: None,
            scene_color_texture: None,
            scene_depth_texture: None,
            global_resources,
            static_mesh_visibility: SceneBitArray::new(),
            static_mesh_fade_out_dithered_lod: SceneBitArray::new(),
            static_mesh_fade_in_dithered_lod: SceneBitArray::new(),
            temporal_lod_transition_alpha: 0.0,
            allow_stencil_dither: false,
            light_map_density: LightMapDensitySettings::default(),
        }
    }

    /// Debug pixel shaders replace the material's.
    pub fn uses_debug_view_ps(&self) -> bool {
        self.debug_view_mode != DebugViewShaderMode::None
    }

    /// Marks a static mesh visible.
    pub fn set_static_mesh_visible(&mut self, index: usize, visible: bool) {
        self.static_mesh_visibility.assign(index, visible);
    }
}

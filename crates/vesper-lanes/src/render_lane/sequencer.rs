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

use super::{
    BasePassLane, DepthLane, DistortionLane, FrameContext, HitProxyLane, LightMapDensityLane, MeshDecalLane,
    MeshPassLane, MobileBasePassLane, PassStats, Scene, TranslucencyLane, VelocityLane,
};
use std::fmt;
use vesper_core::hit_proxy::{HitProxyEntry, HitProxyRegistry};
use vesper_core::renderer::{CommandList, ShaderPlatform};

/// What every pass of one frame submitted, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// One entry per pass that ran.
    pub passes: Vec<PassStats>,
}

impl FrameStats {
    /// Draw calls issued by the whole frame.
    pub fn total_draws(&self) -> usize {
        self.passes.iter().map(|pass| pass.draws).sum()
    }

    /// Meshes skipped by the whole frame.
    pub fn total_skipped(&self) -> usize {
        self.passes.iter().map(|pass| pass.skipped).sum()
    }

    /// The statistics of a pass, if it ran.
    pub fn pass(&self, name: &str) -> Option<&PassStats> {
        self.passes.iter().find(|pass| pass.pass == name)
    }
}

/// Runs mesh passes in a fixed order.
///
/// The deferred order is depth prepass, base pass (or the light-map density
/// view in its place), velocity, mesh decals, translucency and distortion. The
/// mobile order is the opaque base pass followed by translucency. Disabled
/// passes are skipped.
pub struct FrameSequencer {
    lanes: Vec<Box<dyn MeshPassLane>>,
}

impl FrameSequencer {
    /// The deferred renderer's passes.
    pub fn deferred() -> Self {
        Self::with_lanes(vec![
            Box::new(DepthLane),
            Box::new(BasePassLane),
            Box::new(LightMapDensityLane),
            Box::new(VelocityLane),
            Box::new(MeshDecalLane),
            Box::new(TranslucencyLane),
            Box::new(DistortionLane),
        ])
    }

    /// The mobile renderer's passes.
    pub fn mobile() -> Self {
        Self::with_lanes(vec![
            Box::new(MobileBasePassLane::opaque()),
            Box::new(MobileBasePassLane::translucent()),
        ])
    }

    /// The sequencer matching a platform.
    pub fn for_platform(platform: ShaderPlatform) -> Self {
        if platform.is_mobile() {
            Self::mobile()
        } else {
            Self::deferred()
        }
    }

    /// A sequencer running `lanes` in the given order.
    pub fn with_lanes(lanes: Vec<Box<dyn MeshPassLane>>) -> Self {
        Self { lanes }
    }

    /// Names of the passes, in order.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.lanes.iter().map(|lane| lane.pass_name()).collect()
    }

    /// Records every enabled pass of one view.
    pub fn render_frame(&self, scene: &Scene<'_>, frame: &FrameContext<'_>, cmd: &mut dyn CommandList) -> FrameStats {
        let mut stats = FrameStats::default();
        for lane in &self.lanes {
            if !lane.is_enabled(frame) {
                continue;
            }
            let pass = lane.render(scene, frame, cmd);
            log::trace!(
                "{}: {} draws, {} pipeline states, {} skipped.",
                pass.pass,
                pass.draws,
                pass.pipeline_states,
                pass.skipped
            );
            stats.passes.push(pass);
        }
        stats
    }
}

impl fmt::Debug for FrameSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameSequencer")
            .field("passes", &self.pass_names())
            .finish()
    }
}

/// The picking frame: renders hit proxy colors and maps read-back pixels to
/// registered objects.
#[derive(Debug, Default, Clone, Copy)]
pub struct HitProxyFrame {
    lane: HitProxyLane,
}

impl HitProxyFrame {
    /// Creates the frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the hit proxy pass.
    pub fn render(&self, scene: &Scene<'_>, frame: &FrameContext<'_>, cmd: &mut dyn CommandList) -> PassStats {
        if !self.lane.is_enabled(frame) {
            return PassStats::new(self.lane.pass_name());
        }
        let pass = self.lane.render(scene, frame, cmd);
        log::trace!("{}: {} draws.", pass.pass, pass.draws);
        pass
    }

    /// The object under a pixel read back from the hit proxy target, or `None`
    /// when nothing pickable was drawn there.
    pub fn pick(&self, registry: &HitProxyRegistry, color: [u8; 3]) -> Option<HitProxyEntry> {
        registry.lookup_color(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use vesper_core::scene::ShowFlags;
    use vesper_core::settings::DepthDrawingMode;

    #[test]
    fn deferred_passes_run_in_order() {
        assert_eq!(
            FrameSequencer::deferred().pass_names(),
            vec![
                "DepthPass",
                "BasePass",
                "LightMapDensity",
                "Velocity",
                "MeshDecal",
                "Translucency",
                "Distortion"
            ]
        );
        assert_eq!(
            FrameSequencer::for_platform(ShaderPlatform::GlEs3_1).pass_names(),
            vec!["MobileBasePass", "MobileTranslucency"]
        );
    }

    #[test]
    fn disabled_passes_are_skipped() {
        let settings = vesper_core::settings::RendererSettings {
            early_z_pass: DepthDrawingMode::None,
            ..testing::settings()
        };
        let properties = testing::default_material_properties();
        let mut builder = crate::permutation::ShaderMapBuilder::new(testing::PLATFORM, &settings);
        let vf = testing::local_vertex_factory(1);
        let default_material = testing::compiled_material(9, properties, &mut builder, &[&vf]);
        let scene = Scene::new(testing::PLATFORM, settings.clone(), &default_material);

        let mut view = testing::view();
        view.show_flags = ShowFlags::empty();
        let frame = FrameContext::with_settings(&settings, &view);
        let mut cmd = testing::RecordingCommandList::default();
        let stats = FrameSequencer::deferred().render_frame(&scene, &frame, &mut cmd);

        let ran: Vec<&str> = stats.passes.iter().map(|pass| pass.pass).collect();
        assert_eq!(ran, vec!["BasePass"]);
        assert_eq!(stats.total_draws(), 0);
        assert!(stats.pass("Velocity").is_none());
    }
}

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

mod common;

use common::{Call, MockCommandList};
use glam::{Mat4, Vec3};
use std::sync::Arc;
use vesper_core::hit_proxy::{HitProxyId, HitProxyRegistry, MouseCursor};
use vesper_core::material::{BlendMode, MaterialInstance, MaterialProperties, ShadingModel};
use vesper_core::renderer::{ShaderStage, TextureId, UniformBufferId};
use vesper_core::scene::{MeshBatch, PrimitiveId, PrimitiveSceneInfo, SceneView, VertexFactory};
use vesper_core::settings::RendererSettings;
use vesper_lanes::permutation::ShaderMapBuilder;
use vesper_lanes::render_lane::{DynamicMesh, HitProxyFrame};
use vesper_lanes::{FrameContext, FrameSequencer, Scene};

struct Fixture {
    vf: VertexFactory,
    default_material: MaterialInstance,
    opaque: MaterialInstance,
    glass: MaterialInstance,
}

impl Fixture {
    fn new(settings: &RendererSettings) -> Self {
        let mut builder = ShaderMapBuilder::new(common::PLATFORM, settings);
        let vf = common::vertex_factory(1);
        let default_material = common::material(90, common::default_material_properties(), &mut builder, &[&vf]);
        let opaque = common::material(1, MaterialProperties::default(), &mut builder, &[&vf]);
        let glass = common::material(
            2,
            MaterialProperties {
                blend_mode: BlendMode::Translucent,
                shading_model: ShadingModel::Unlit,
                ..Default::default()
            },
            &mut builder,
            &[&vf],
        );
        Self {
            vf,
            default_material,
            opaque,
            glass,
        }
    }

    /// One visible opaque static mesh plus one translucent dynamic mesh in front of it.
    fn scene<'a>(&'a self, settings: &RendererSettings, hit_proxy: HitProxyId, view: &mut SceneView) -> Scene<'a> {
        let mut scene = Scene::new(common::PLATFORM, settings.clone(), &self.default_material);
        let wall = scene.add_primitive(PrimitiveSceneInfo {
            local_to_world: Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0)),
            previous_local_to_world: Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0)),
            ..PrimitiveSceneInfo::new(PrimitiveId(0), UniformBufferId(50))
        });
        let window = scene.add_primitive(PrimitiveSceneInfo {
            local_to_world: Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)),
            previous_local_to_world: Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)),
            ..PrimitiveSceneInfo::new(PrimitiveId(0), UniformBufferId(51))
        });
        let mesh = scene.add_static_mesh(
            wall,
            MeshBatch::new(&self.vf, &self.opaque, vec![common::element(12)]),
            hit_proxy,
        );
        view.set_static_mesh_visible(mesh.0, true);
        scene.push_dynamic_mesh(DynamicMesh {
            batch: MeshBatch::new(&self.vf, &self.glass, vec![common::element(2)]),
            primitive: Some(window),
            hit_proxy_id: HitProxyId::INVISIBLE,
        });
        scene
    }
}

fn textures_bound(cmd: &MockCommandList, stage: ShaderStage) -> Vec<TextureId> {
    cmd.calls
        .iter()
        .filter_map(|call| match call {
            Call::Texture(s, _, texture, _) if *s == stage => Some(*texture),
            _ => None,
        })
        .collect()
}

#[test]
fn deferred_frame_draws_every_pass_once() {
    common::init_logger();
    let settings = RendererSettings::default();
    let fixture = Fixture::new(&settings);
    let mut view = common::view();
    let scene = fixture.scene(&settings, HitProxyId::INVISIBLE, &mut view);
    let frame = FrameContext::with_settings(&settings, &view);
    let mut cmd = MockCommandList::default();

    let stats = FrameSequencer::deferred().render_frame(&scene, &frame, &mut cmd);

    assert_eq!(stats.pass("DepthPass").map(|p| p.draws), Some(1));
    assert_eq!(stats.pass("BasePass").map(|p| p.draws), Some(1));
    assert_eq!(stats.pass("Velocity").map(|p| p.draws), Some(0));
    assert_eq!(stats.pass("Translucency").map(|p| p.draws), Some(1));
    assert!(stats.pass("LightMapDensity").is_none());
    assert_eq!(stats.total_draws(), 3);
    assert_eq!(stats.total_skipped(), 0);
    assert_eq!(cmd.draws(), 3);
    assert!(scene.skip_log().is_empty());

    let names: Vec<&str> = stats.passes.iter().map(|pass| pass.pass).collect();
    let depth = names.iter().position(|n| *n == "DepthPass");
    let base = names.iter().position(|n| *n == "BasePass");
    let translucency = names.iter().position(|n| *n == "Translucency");
    assert!(depth < base && base < translucency);
}

#[test]
fn translucency_reads_the_scene_depth_or_its_fallback() {
    common::init_logger();
    let settings = RendererSettings::default();
    let fixture = Fixture::new(&settings);
    let sequencer = FrameSequencer::deferred();

    let mut view = common::view();
    let scene = fixture.scene(&settings, HitProxyId::INVISIBLE, &mut view);
    let mut cmd = MockCommandList::default();
    sequencer.render_frame(&scene, &FrameContext::with_settings(&settings, &view), &mut cmd);
    let fallback = view.global_resources.black_texture;
    assert!(textures_bound(&cmd, ShaderStage::Pixel).contains(&fallback));

    let depth = TextureId(77);
    view.scene_depth_texture = Some(depth);
    cmd.clear();
    sequencer.render_frame(&scene, &FrameContext::with_settings(&settings, &view), &mut cmd);
    assert!(textures_bound(&cmd, ShaderStage::Pixel).contains(&depth));
}

#[test]
fn picked_color_resolves_to_the_registered_object() {
    common::init_logger();
    let settings = RendererSettings::default();
    let fixture = Fixture::new(&settings);
    let registry = HitProxyRegistry::new();
    let id = registry
        .add(Arc::new("wall"), MouseCursor::Hand, false)
        .expect("free slot");

    let mut view = common::view();
    let scene = fixture.scene(&settings, id, &mut view);
    let frame = FrameContext {
        view: &view,
        settings: &settings,
        hit_proxies: Some(&registry),
    };
    let mut cmd = MockCommandList::default();
    let hit_proxies = HitProxyFrame::new();
    let stats = hit_proxies.render(&scene, &frame, &mut cmd);

    // The translucent window is not pickable.
    assert_eq!(stats.draws, 1);
    let color = bytemuck::bytes_of(&id.to_linear()).to_vec();
    assert!(cmd
        .calls
        .iter()
        .any(|call| matches!(call, Call::Value(ShaderStage::Pixel, _, data) if *data == color)));

    let entry = hit_proxies.pick(&registry, id.to_color()).expect("picked");
    assert_eq!(entry.target.downcast_ref::<&str>(), Some(&"wall"));
    assert_eq!(entry.cursor, MouseCursor::Hand);
    assert!(hit_proxies.pick(&registry, HitProxyId::INVISIBLE.to_color()).is_none());
}

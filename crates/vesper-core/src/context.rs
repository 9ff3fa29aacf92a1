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

//! Process-scoped renderer state, created once before any rendering begins.

use crate::hit_proxy::HitProxyRegistry;
use crate::renderer::api::platform::{FeatureLevel, ShaderPlatform};
use crate::renderer::api::resource::{GlobalResources, UniformBufferId};
use crate::scene::SceneView;
use crate::settings::RendererSettings;
use std::sync::Arc;

/// Renderer context providing access to the shared drawing subsystems.
///
/// Passes receive it by reference. There is no global instance: the owner calls
/// [`RendererContext::init`] at startup and [`RendererContext::shutdown`] at exit.
#[derive(Debug)]
pub struct RendererContext {
    /// Project and console settings.
    pub settings: RendererSettings,
    /// The picking id table. Shared with the game thread, which drops hit-testable
    /// objects at arbitrary times.
    pub hit_proxies: Arc<HitProxyRegistry>,
    /// Fallback resources bound to declared-but-unsupplied shader slots.
    pub global_resources: GlobalResources,
}

impl RendererContext {
    /// Creates the context.
    pub fn init(settings: RendererSettings, global_resources: GlobalResources) -> Self {
        log::info!(
            "Renderer context initialized (simple forward: {}, static lighting: {}).",
            settings.simple_forward_shading,
            settings.allow_static_lighting
        );
        Self {
            settings,
            hit_proxies: Arc::new(HitProxyRegistry::new()),
            global_resources,
        }
    }

    /// Creates a view wired to the context's fallback resources.
    pub fn create_view(
        &self,
        feature_level: FeatureLevel,
        shader_platform: ShaderPlatform,
        view_uniform_buffer: UniformBufferId,
    ) -> SceneView {
        SceneView::new(
            feature_level,
            shader_platform,
            view_uniform_buffer,
            self.global_resources,
        )
    }

    /// Tears the context down, releasing every hit proxy still registered.
    pub fn shutdown(self) {
        let remaining = self.hit_proxies.len();
        self.hit_proxies.clear();
        log::info!("Renderer context shut down ({remaining} hit proxies released).");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_proxy::MouseCursor;

    #[test]
    fn shutdown_releases_hit_proxies() {
        let context = RendererContext::init(RendererSettings::default(), GlobalResources::default());
        let registry = Arc::clone(&context.hit_proxies);
        registry
            .add(Arc::new(1u32), MouseCursor::Default, false)
            .expect("id available");
        assert_eq!(registry.len(), 1);

        context.shutdown();
        assert!(registry.is_empty());
    }

    #[test]
    fn views_share_fallback_resources() {
        let context = RendererContext::init(RendererSettings::default(), GlobalResources::default());
        let view = context.create_view(FeatureLevel::Sm5, ShaderPlatform::D3dSm5, UniformBufferId(3));
        assert_eq!(view.global_resources, context.global_resources);
        assert_eq!(view.view_uniform_buffer, UniformBufferId(3));
    }
}

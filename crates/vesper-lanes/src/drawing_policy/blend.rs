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

//! Fixed blend equations of the mesh passes.

use vesper_core::material::{BlendMode, DecalBlendMode};
use vesper_core::renderer::{BlendComponent, BlendFactor, BlendOperation, BlendState, ColorWrites};

const fn add(src_factor: BlendFactor, dst_factor: BlendFactor) -> BlendComponent {
    BlendComponent::new(BlendOperation::Add, src_factor, dst_factor)
}

/// Blend state of a translucent blend mode, or `None` for opaque and masked
/// materials, which keep the pass default.
pub fn translucent_blend_state(blend_mode: BlendMode) -> Option<BlendState> {
    use BlendFactor::*;
    let state = match blend_mode {
        BlendMode::Opaque | BlendMode::Masked => return None,
        BlendMode::Translucent => BlendState::new(
            ColorWrites::RGBA,
            add(SrcAlpha, OneMinusSrcAlpha),
            add(Zero, OneMinusSrcAlpha),
        ),
        BlendMode::Additive => BlendState::new(ColorWrites::RGBA, add(One, One), add(Zero, OneMinusSrcAlpha)),
        BlendMode::Modulate => BlendState::new(ColorWrites::RGB, add(DstColor, Zero), add(Zero, One)),
        BlendMode::AlphaComposite => BlendState::new(
            ColorWrites::RGBA,
            add(One, OneMinusSrcAlpha),
            add(Zero, OneMinusSrcAlpha),
        ),
    };
    Some(state)
}

/// Blend state of the shader complexity overlay. Opaque surfaces replace the
/// accumulated cost, translucent ones add to it.
pub fn shader_complexity_blend_state(blend_mode: BlendMode) -> BlendState {
    if blend_mode.is_translucent() {
        BlendState::new(
            ColorWrites::RGBA,
            add(BlendFactor::One, BlendFactor::One),
            add(BlendFactor::Zero, BlendFactor::One),
        )
    } else {
        BlendState::OPAQUE
    }
}

/// Blend state of a mesh decal.
pub fn decal_blend_state(decal_blend_mode: DecalBlendMode) -> BlendState {
    use BlendFactor::*;
    match decal_blend_mode {
        DecalBlendMode::Translucent | DecalBlendMode::Normal => {
            BlendState::new(ColorWrites::RGB, add(SrcAlpha, OneMinusSrcAlpha), add(Zero, One))
        }
        DecalBlendMode::Stain => BlendState::new(ColorWrites::RGB, add(DstColor, OneMinusSrcAlpha), add(Zero, One)),
        DecalBlendMode::Emissive => BlendState::new(ColorWrites::RGB, add(One, One), add(Zero, One)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_and_masked_keep_pass_default() {
        assert_eq!(translucent_blend_state(BlendMode::Opaque), None);
        assert_eq!(translucent_blend_state(BlendMode::Masked), None);
    }

    #[test]
    fn every_translucent_mode_has_its_own_equation() {
        let states: Vec<_> = [
            BlendMode::Translucent,
            BlendMode::Additive,
            BlendMode::Modulate,
            BlendMode::AlphaComposite,
        ]
        .into_iter()
        .map(|mode| translucent_blend_state(mode).expect("translucent mode"))
        .collect();
        for (i, a) in states.iter().enumerate() {
            for b in &states[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(states[1].color, add(BlendFactor::One, BlendFactor::One));
    }

    #[test]
    fn complexity_overrides_blend() {
        assert_eq!(shader_complexity_blend_state(BlendMode::Masked), BlendState::OPAQUE);
        assert_eq!(
            shader_complexity_blend_state(BlendMode::Additive).color,
            add(BlendFactor::One, BlendFactor::One)
        );
    }

    #[test]
    fn stain_multiplies_base_color() {
        let stain = decal_blend_state(DecalBlendMode::Stain);
        assert_eq!(stain.color.src_factor, BlendFactor::DstColor);
        assert_eq!(decal_blend_state(DecalBlendMode::Emissive).color, add(BlendFactor::One, BlendFactor::One));
    }
}

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

//! Loading [`RendererSettings`] from RON.

use crate::error::SettingsError;
use crate::permutation::MAX_MOBILE_POINT_LIGHTS;
use std::path::Path;
use vesper_core::settings::RendererSettings;

/// Parses settings from RON text. Missing fields keep their defaults.
pub fn settings_from_ron(text: &str) -> Result<RendererSettings, SettingsError> {
    let settings: RendererSettings = ron::from_str(text)?;
    validate(&settings)?;
    Ok(settings)
}

/// Reads and parses a RON settings file.
pub fn load_settings(path: impl AsRef<Path>) -> Result<RendererSettings, SettingsError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = settings_from_ron(&text)?;
    log::info!(
        "Loaded renderer settings from '{}' (early z: {:?}).",
        path.display(),
        settings.early_z_pass
    );
    Ok(settings)
}

/// Serializes settings as pretty RON.
pub fn settings_to_ron(settings: &RendererSettings) -> Result<String, ron::Error> {
    let pretty_config = ron::ser::PrettyConfig::default().indentor("  ".to_string());
    ron::ser::to_string_pretty(settings, pretty_config)
}

fn validate(settings: &RendererSettings) -> Result<(), SettingsError> {
    if settings.mobile_num_dynamic_point_lights > MAX_MOBILE_POINT_LIGHTS {
        return Err(SettingsError::OutOfRange {
            field: "mobile_num_dynamic_point_lights",
            value: u32::from(settings.mobile_num_dynamic_point_lights),
            max: u32::from(MAX_MOBILE_POINT_LIGHTS),
        });
    }
    Ok(())
}

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

//! Error types of the lanes crate.

use std::path::PathBuf;
use thiserror::Error;
use vesper_core::material::MaterialProxyId;
use vesper_core::renderer::ShaderError;

/// Failure to build a drawing policy for a mesh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// A required shader permutation could not be resolved.
    #[error("shader resolution failed: {0}")]
    Shader(#[from] ShaderError),

    /// The material is not drawn by the pass the policy belongs to.
    #[error("material {material:?} is not drawn by the {pass} pass")]
    NotApplicable {
        /// Name of the pass.
        pass: &'static str,
        /// The rejected material.
        material: MaterialProxyId,
    },
}

/// Failure to load renderer settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings file '{path}': {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid RON for the settings structure.
    #[error("invalid settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// A value is outside the range the renderer supports.
    #[error("{field} = {value} exceeds the supported maximum of {max}")]
    OutOfRange {
        /// Offending field.
        field: &'static str,
        /// Value found.
        value: u32,
        /// Largest accepted value.
        max: u32,
    },
}

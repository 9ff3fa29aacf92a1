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

//! Defines the hierarchy of error types for the mesh drawing subsystem.

use crate::renderer::api::shader::ShaderType;
use crate::scene::VertexFactoryTypeId;
use std::fmt;

/// An error related to resolving a shader permutation from a material's shader map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderError {
    /// The permutation is legal but was not compiled (e.g. the shader map is out of date).
    NotFound {
        /// The requested permutation.
        shader_type: ShaderType,
        /// The vertex factory it was requested for.
        vertex_factory_type: VertexFactoryTypeId,
    },
    /// The permutation was rejected by its compile predicate and never exists.
    /// Requesting it is a programming error in the caller.
    ExcludedPermutation {
        /// The requested permutation.
        shader_type: ShaderType,
        /// The vertex factory it was requested for.
        vertex_factory_type: VertexFactoryTypeId,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::NotFound {
                shader_type,
                vertex_factory_type,
            } => {
                write!(
                    f,
                    "Shader {shader_type:?} not found for vertex factory {vertex_factory_type:?}"
                )
            }
            ShaderError::ExcludedPermutation {
                shader_type,
                vertex_factory_type,
            } => {
                write!(
                    f,
                    "Shader {shader_type:?} is excluded for vertex factory {vertex_factory_type:?}"
                )
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error raised while committing or drawing with a drawing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawError {
    /// The render state reached the pipeline commit without a blend state.
    MissingBlendState,
    /// The render state reached the pipeline commit without a depth-stencil state.
    MissingDepthStencilState,
    /// A mesh element index was out of range.
    InvalidElement {
        /// The requested element.
        index: usize,
        /// Number of elements in the mesh batch.
        count: usize,
    },
    /// A shader could not be resolved.
    Shader(ShaderError),
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawError::MissingBlendState => write!(f, "No blend state set before pipeline commit"),
            DrawError::MissingDepthStencilState => {
                write!(f, "No depth-stencil state set before pipeline commit")
            }
            DrawError::InvalidElement { index, count } => {
                write!(f, "Mesh element {index} out of range ({count} elements)")
            }
            DrawError::Shader(e) => write!(f, "Shader resolution failed: {e}"),
        }
    }
}

impl std::error::Error for DrawError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DrawError::Shader(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShaderError> for DrawError {
    fn from(e: ShaderError) -> Self {
        DrawError::Shader(e)
    }
}

/// An error raised by the hit-proxy registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitProxyError {
    /// Every id below the invisible sentinel is in use.
    Exhausted,
}

impl fmt::Display for HitProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HitProxyError::Exhausted => write!(f, "Hit proxy id space exhausted"),
        }
    }
}

impl std::error::Error for HitProxyError {}

//! Shader inputs
//!
//! A shader source file is identified by its base name and extension; the
//! extension doubles as the stage tag used in generated constant names.

pub mod variant;

pub use variant::Variant;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{EmbedError, EmbedResult};

/// Pipeline stage implied by a GLSL file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
    Geometry,
    TessControl,
    TessEvaluation,
    Other,
}

impl ShaderStage {
    /// Detect stage from the extension tag (without the dot)
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "vert" => ShaderStage::Vertex,
            "frag" => ShaderStage::Fragment,
            "comp" => ShaderStage::Compute,
            "geom" => ShaderStage::Geometry,
            "tesc" => ShaderStage::TessControl,
            "tese" => ShaderStage::TessEvaluation,
            _ => ShaderStage::Other,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Compute => "compute",
            ShaderStage::Geometry => "geometry",
            ShaderStage::TessControl => "tessellation control",
            ShaderStage::TessEvaluation => "tessellation evaluation",
            ShaderStage::Other => "unknown",
        };
        f.write_str(name)
    }
}

/// A GLSL source file to be compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    path: PathBuf,
    base_name: String,
    extension: String,
}

impl ShaderSource {
    /// Build from a path, deriving the base name and extension tag.
    ///
    /// Both must be present and valid UTF-8 since they end up in an
    /// identifier.
    pub fn new(path: impl Into<PathBuf>) -> EmbedResult<Self> {
        let path = path.into();
        let invalid = || EmbedError::InvalidShaderPath { path: path.clone() };

        let base_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(invalid)?
            .to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .ok_or_else(invalid)?
            .to_string();

        Ok(Self {
            path,
            base_name,
            extension,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File stem, e.g. `prefix_sum` for `shaders/prefix_sum.comp`
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Extension tag, e.g. `comp`
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn stage(&self) -> ShaderStage {
        ShaderStage::from_extension(&self.extension)
    }

    /// Return a copy whose path is resolved against `base` when relative
    pub fn relative_to(&self, base: &Path) -> Self {
        if self.path.is_absolute() {
            return self.clone();
        }
        Self {
            path: base.join(&self.path),
            base_name: self.base_name.clone(),
            extension: self.extension.clone(),
        }
    }
}

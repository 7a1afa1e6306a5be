//! Shader compiler backends
//!
//! The embedder only sees the `ShaderCompiler` capability. Two backends
//! shell out to external tools:
//! - `GlslcCompiler` asks glslc for C-array text and parses the words
//! - `DelegatedCompiler` runs a helper that prints a finished declaration

pub mod command;
pub mod delegated;
pub mod glslc;

pub use command::ToolCommand;
pub use delegated::DelegatedCompiler;
pub use glslc::{FramingTrim, GlslcCompiler};

use serde::{Deserialize, Serialize};

use crate::error::EmbedResult;
use crate::shader::ShaderSource;

/// What a backend hands back for one shader/variant pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// SPIR-V words, rendered by the embedder as an array constant
    Words(Vec<u32>),

    /// A complete declaration, emitted verbatim
    Declaration(String),
}

/// Everything a backend needs for a single invocation
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    pub shader: &'a ShaderSource,
    pub constant_name: &'a str,
    /// Fixed defines followed by the variant's defines
    pub defines: &'a [String],
    pub optimize: bool,
}

/// Capability to turn a shader source into an embeddable payload
pub trait ShaderCompiler {
    fn compile(&self, request: &CompileRequest<'_>) -> EmbedResult<Payload>;
}

impl<C: ShaderCompiler + ?Sized> ShaderCompiler for &C {
    fn compile(&self, request: &CompileRequest<'_>) -> EmbedResult<Payload> {
        (**self).compile(request)
    }
}

impl<C: ShaderCompiler + ?Sized> ShaderCompiler for Box<C> {
    fn compile(&self, request: &CompileRequest<'_>) -> EmbedResult<Payload> {
        (**self).compile(request)
    }
}

/// How compiled output is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedMode {
    /// glslc `-mfmt=c` output, parsed into words
    #[default]
    PreFormatted,
    /// Helper tool prints the declaration itself
    Delegated,
}

impl EmbedMode {
    /// Build the backend for this mode.
    ///
    /// Delegated mode requires a helper command.
    pub fn backend(
        self,
        compiler: &str,
        helper: Option<ToolCommand>,
    ) -> EmbedResult<Box<dyn ShaderCompiler>> {
        match self {
            EmbedMode::PreFormatted => Ok(Box::new(GlslcCompiler::new(ToolCommand::new(compiler)))),
            EmbedMode::Delegated => {
                let helper = helper.ok_or_else(|| {
                    crate::error::config_error("delegated mode requires a helper command")
                })?;
                Ok(Box::new(DelegatedCompiler::new(helper, compiler)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_mode_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: EmbedMode,
        }

        let parsed: Wrapper = toml::from_str("mode = \"delegated\"").unwrap();
        assert_eq!(parsed.mode, EmbedMode::Delegated);
        let parsed: Wrapper = toml::from_str("mode = \"preformatted\"").unwrap();
        assert_eq!(parsed.mode, EmbedMode::PreFormatted);
        assert_eq!(EmbedMode::default(), EmbedMode::PreFormatted);
    }

    #[test]
    fn test_delegated_backend_needs_helper() {
        let result = EmbedMode::Delegated.backend("glslc", None);
        assert!(result.is_err());

        let result = EmbedMode::Delegated.backend(
            "glslc",
            Some(ToolCommand::parse("python compile_shader.py").unwrap()),
        );
        assert!(result.is_ok());
    }
}

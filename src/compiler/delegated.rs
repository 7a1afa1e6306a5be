//! Delegated mode: a helper tool compiles and formats the declaration

use std::path::PathBuf;

use super::command::{run, ToolCommand};
use super::{CompileRequest, Payload, ShaderCompiler};
use crate::error::{malformed_output, EmbedResult};

/// Invokes `<helper...> <compiler> <shader> <name> [defines...] [-O]`
pub struct DelegatedCompiler {
    helper: ToolCommand,
    compiler: PathBuf,
}

impl DelegatedCompiler {
    /// `compiler` is only forwarded to the helper; it is never run directly.
    pub fn new(helper: ToolCommand, compiler: impl Into<PathBuf>) -> Self {
        Self {
            helper,
            compiler: compiler.into(),
        }
    }
}

impl ShaderCompiler for DelegatedCompiler {
    fn compile(&self, request: &CompileRequest<'_>) -> EmbedResult<Payload> {
        let shader = request.shader.path();

        let mut command = self.helper.command();
        command
            .arg(&self.compiler)
            .arg(shader)
            .arg(request.constant_name)
            .args(request.defines);
        if request.optimize {
            command.arg("-O");
        }

        let stdout = run(command, shader)?;
        let mut declaration =
            String::from_utf8(stdout).map_err(|e| malformed_output(shader, e))?;

        if declaration.trim().is_empty() {
            return Err(malformed_output(shader, "helper produced no output"));
        }
        if !declaration.contains(request.constant_name) {
            log::warn!(
                "helper output for {} does not mention {}",
                shader.display(),
                request.constant_name
            );
        }
        if !declaration.ends_with('\n') {
            log::warn!("helper output for {} lacks a trailing newline", shader.display());
            declaration.push('\n');
        }

        Ok(Payload::Declaration(declaration))
    }
}

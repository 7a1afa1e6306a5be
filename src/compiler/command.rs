//! External tool invocation

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{config_error, EmbedError, EmbedResult};

/// A program plus leading arguments, e.g. `python compile_shader.py`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Build from an argv-style list; the first element is the program
    pub fn from_parts<I, S>(parts: I) -> EmbedResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parts = parts.into_iter().map(Into::into);
        let program = parts
            .next()
            .filter(|p: &String| !p.is_empty())
            .ok_or_else(|| config_error("empty tool command"))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Split a command line on whitespace. No quoting is supported.
    pub fn parse(line: &str) -> EmbedResult<Self> {
        Self::from_parts(line.split_whitespace())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Fresh `Command` with the leading arguments applied
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Run `command` to completion and return its stdout.
///
/// A non-zero exit is reported against `shader` with the captured stderr.
pub fn run(mut command: Command, shader: &Path) -> EmbedResult<Vec<u8>> {
    let program = command.get_program().to_string_lossy().into_owned();
    log::debug!(
        "Running {} {}",
        program,
        command
            .get_args()
            .map(OsStr::to_string_lossy)
            .collect::<Vec<_>>()
            .join(" ")
    );

    let output = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| EmbedError::Spawn {
            program: program.clone(),
            source,
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        log::error!("{} failed on {}: {}", program, shader.display(), stderr.trim());
        return Err(EmbedError::CompilerFailed {
            shader: shader.to_path_buf(),
            status: output.status,
            stderr: stderr.trim().to_string(),
        });
    }

    if !stderr.trim().is_empty() {
        log::warn!("{} ({}): {}", program, shader.display(), stderr.trim());
    }

    Ok(output.stdout)
}

//! Embedder error handling
//!
//! This module provides the crate error type, a result alias and helper
//! functions so fallible operations carry the path or shader they failed on.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Type alias for embedder results
pub type EmbedResult<T> = Result<T, EmbedError>;

#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Shader compilation failed for {} ({}): {}", .shader.display(), .status, .stderr)]
    CompilerFailed {
        shader: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Malformed compiler output for {}: {}", .shader.display(), .reason)]
    MalformedOutput { shader: PathBuf, reason: String },

    #[error("Invalid shader path: {} (expected <name>.<stage>)", .path.display())]
    InvalidShaderPath { path: PathBuf },

    #[error("Duplicate constant {name}: produced by both {first} and {second}")]
    DuplicateConstant {
        name: String,
        first: String,
        second: String,
    },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Failed to parse manifest {}: {}", .path.display(), .source)]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Helper trait for attaching a path to I/O failures
pub trait ErrorContext<T> {
    fn with_path(self, path: impl AsRef<Path>) -> EmbedResult<T>
    where
        Self: Sized;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_path(self, path: impl AsRef<Path>) -> EmbedResult<T> {
        self.map_err(|source| EmbedError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// Create a configuration error
pub fn config_error(message: impl Into<String>) -> EmbedError {
    EmbedError::Config {
        message: message.into(),
    }
}

/// Create a malformed output error
pub fn malformed_output(shader: impl AsRef<Path>, reason: impl std::fmt::Display) -> EmbedError {
    EmbedError::MalformedOutput {
        shader: shader.as_ref().to_path_buf(),
        reason: reason.to_string(),
    }
}

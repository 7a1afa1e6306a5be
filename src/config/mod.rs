//! Embed manifest
//!
//! A TOML file describing one or more output files. Each `[[job]]` names
//! its output, its compiler mode and a list of `[[job.group]]` tables
//! pairing shaders with variants. Relative paths resolve against the
//! manifest's directory. So do helper arguments that name a file present
//! there, such as the helper script; anything else (`python`, flags) is
//! passed through untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::compiler::{EmbedMode, ShaderCompiler, ToolCommand};
use crate::embed::{
    EmbedJob, IterationOrder, ScalarConstant, ShaderGroup, DEFAULT_ARRAY_TYPE, DEFAULT_SUFFIX,
};
use crate::error::{config_error, EmbedError, EmbedResult, ErrorContext};
use crate::shader::{ShaderSource, Variant};

/// Top-level manifest file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Shader compiler; the command line may override it
    #[serde(default)]
    pub compiler: Option<String>,

    #[serde(rename = "job", default)]
    pub jobs: Vec<JobConfig>,
}

/// One `[[job]]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub name: String,
    pub output: PathBuf,

    #[serde(default)]
    pub mode: EmbedMode,

    /// Delegated-mode helper, argv style
    #[serde(default)]
    pub helper: Option<Vec<String>>,

    #[serde(default)]
    pub optimize: bool,

    #[serde(default)]
    pub defines: Vec<String>,

    #[serde(default)]
    pub order: IterationOrder,

    #[serde(default = "default_array_type")]
    pub array_type: String,

    #[serde(default = "default_suffix")]
    pub suffix: String,

    #[serde(rename = "constant", default)]
    pub constants: Vec<ScalarConstant>,

    #[serde(rename = "group", default)]
    pub groups: Vec<GroupConfig>,
}

/// One `[[job.group]]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    pub shaders: Vec<PathBuf>,

    #[serde(default)]
    pub variants: Vec<Variant>,
}

fn default_array_type() -> String {
    DEFAULT_ARRAY_TYPE.to_string()
}

fn default_suffix() -> String {
    DEFAULT_SUFFIX.to_string()
}

impl Manifest {
    /// Read and parse a manifest from disk
    pub fn load(path: &Path) -> EmbedResult<Self> {
        let raw = fs::read_to_string(path).with_path(path)?;
        Self::parse(&raw, path)
    }

    /// Parse manifest text; `path` is only used for error reporting
    pub fn parse(raw: &str, path: &Path) -> EmbedResult<Self> {
        let manifest: Manifest = toml::from_str(raw).map_err(|source| EmbedError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> EmbedResult<()> {
        if self.jobs.is_empty() {
            return Err(config_error("manifest defines no [[job]] tables"));
        }
        for (i, job) in self.jobs.iter().enumerate() {
            if self.jobs[..i].iter().any(|other| other.name == job.name) {
                return Err(config_error(format!("job '{}' is defined twice", job.name)));
            }
            job.validate()?;
        }
        Ok(())
    }

    /// Select jobs by name, or all of them in file order
    pub fn select(&self, name: Option<&str>) -> EmbedResult<Vec<&JobConfig>> {
        match name {
            None => Ok(self.jobs.iter().collect()),
            Some(name) => self
                .jobs
                .iter()
                .find(|job| job.name == name)
                .map(|job| vec![job])
                .ok_or_else(|| config_error(format!("no job named '{}' in manifest", name))),
        }
    }
}

impl JobConfig {
    fn validate(&self) -> EmbedResult<()> {
        if self.groups.is_empty() || self.groups.iter().all(|g| g.shaders.is_empty()) {
            return Err(config_error(format!("job '{}' lists no shaders", self.name)));
        }
        if self.mode == EmbedMode::Delegated && self.helper.as_ref().map_or(true, Vec::is_empty) {
            return Err(config_error(format!(
                "job '{}' uses delegated mode but has no helper",
                self.name
            )));
        }
        if let Some(variant) = self
            .groups
            .iter()
            .flat_map(|g| &g.variants)
            .find(|v| v.name.trim().is_empty())
        {
            return Err(config_error(format!(
                "job '{}' has a variant without a name (defines {:?})",
                self.name, variant.defines
            )));
        }
        Ok(())
    }

    /// Convert to an `EmbedJob`, resolving relative paths against `base_dir`
    pub fn to_job(&self, base_dir: &Path) -> EmbedResult<EmbedJob> {
        let mut job = EmbedJob::new(resolve(base_dir, &self.output));
        job.defines = self.defines.clone();
        job.optimize = self.optimize;
        job.order = self.order;
        job.constants = self.constants.clone();
        job.array_type = self.array_type.clone();
        job.suffix = self.suffix.clone();

        for group in &self.groups {
            let shaders = group
                .shaders
                .iter()
                .map(|path| ShaderSource::new(path.clone()).map(|s| s.relative_to(base_dir)))
                .collect::<EmbedResult<Vec<_>>>()?;
            job.groups.push(ShaderGroup::new(shaders, group.variants.clone()));
        }
        Ok(job)
    }

    /// Helper command with manifest-relative script paths resolved
    pub fn helper_command(&self, base_dir: &Path) -> EmbedResult<Option<ToolCommand>> {
        match &self.helper {
            Some(parts) => Ok(Some(ToolCommand::from_parts(
                parts.iter().map(|part| resolve_existing(base_dir, part)),
            )?)),
            None => Ok(None),
        }
    }

    /// Build the compiler backend for this job
    pub fn backend(&self, compiler: &str, base_dir: &Path) -> EmbedResult<Box<dyn ShaderCompiler>> {
        self.mode.backend(compiler, self.helper_command(base_dir)?)
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn resolve_existing(base_dir: &Path, part: &str) -> String {
    if part.starts_with('-') || Path::new(part).is_absolute() {
        return part.to_string();
    }
    let candidate = base_dir.join(part);
    if candidate.is_file() {
        candidate.display().to_string()
    } else {
        part.to_string()
    }
}

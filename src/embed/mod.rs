//! Shader Variant Embedder
//!
//! Plans one constant per (shader, variant) pair, rejects name collisions
//! before anything is compiled, runs the compiler for each pair and hands
//! the ordered units to `OutputDocument` for rendering.

pub mod document;
pub mod output;

pub use document::{CompiledUnit, OutputDocument, ScalarConstant, ScalarValue};
pub use output::{remove_if_exists, run_job, write_output};

use std::collections::hash_map::{Entry, HashMap};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::compiler::{CompileRequest, ShaderCompiler};
use crate::error::{EmbedError, EmbedResult};
use crate::shader::{ShaderSource, Variant};

/// Default trailing segment of every constant name
pub const DEFAULT_SUFFIX: &str = "spv";

/// Default typed array wrapped around word payloads
pub const DEFAULT_ARRAY_TYPE: &str = "Uint32Array";

/// Nesting of the shader and variant loops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IterationOrder {
    /// For each shader, every variant
    #[serde(alias = "shaders-outer")]
    Shaders,
    /// For each variant, every shader
    #[default]
    #[serde(alias = "variants-outer")]
    Variants,
}

/// Shaders compiled against a shared variant list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderGroup {
    pub shaders: Vec<ShaderSource>,
    /// Empty means each shader is compiled once, without a variant segment
    pub variants: Vec<Variant>,
}

impl ShaderGroup {
    pub fn new(shaders: Vec<ShaderSource>, variants: Vec<Variant>) -> Self {
        Self { shaders, variants }
    }

    /// Number of units this group produces
    pub fn unit_count(&self) -> usize {
        self.shaders.len() * self.variants.len().max(1)
    }
}

/// Everything needed to produce one output file
#[derive(Debug, Clone)]
pub struct EmbedJob {
    pub output: PathBuf,
    pub groups: Vec<ShaderGroup>,
    /// Applied to every invocation, ahead of the variant's own defines
    pub defines: Vec<String>,
    pub optimize: bool,
    pub order: IterationOrder,
    /// Emitted ahead of the shader constants
    pub constants: Vec<ScalarConstant>,
    pub array_type: String,
    pub suffix: String,
}

impl EmbedJob {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            groups: Vec::new(),
            defines: Vec::new(),
            optimize: false,
            order: IterationOrder::default(),
            constants: Vec::new(),
            array_type: DEFAULT_ARRAY_TYPE.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }

    pub fn with_group(mut self, group: ShaderGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn unit_count(&self) -> usize {
        self.groups.iter().map(ShaderGroup::unit_count).sum()
    }
}

/// One planned compiler invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUnit<'a> {
    pub shader: &'a ShaderSource,
    pub variant: Option<&'a Variant>,
    pub name: String,
    pub defines: Vec<String>,
}

/// Build `{base}_{variant}_{ext}_{suffix}`, skipping absent segments
pub fn constant_name(shader: &ShaderSource, variant: Option<&Variant>, suffix: &str) -> String {
    let mut segments = vec![shader.base_name()];
    if let Some(variant) = variant {
        segments.push(&variant.name);
    }
    segments.push(shader.extension());
    if !suffix.is_empty() {
        segments.push(suffix);
    }
    segments.join("_")
}

/// Expand the job into invocations in output order.
///
/// Fails with `DuplicateConstant` if two pairs map to the same name.
pub fn plan(job: &EmbedJob) -> EmbedResult<Vec<PlannedUnit<'_>>> {
    let mut units = Vec::with_capacity(job.unit_count());

    for group in &job.groups {
        let variants: Vec<Option<&Variant>> = if group.variants.is_empty() {
            vec![None]
        } else {
            group.variants.iter().map(Some).collect()
        };

        let pairs: Vec<(&ShaderSource, Option<&Variant>)> = match job.order {
            IterationOrder::Shaders => group
                .shaders
                .iter()
                .flat_map(|s| variants.iter().map(move |v| (s, *v)))
                .collect(),
            IterationOrder::Variants => variants
                .iter()
                .flat_map(|v| group.shaders.iter().map(move |s| (s, *v)))
                .collect(),
        };

        for (shader, variant) in pairs {
            let mut defines = job.defines.clone();
            if let Some(variant) = variant {
                defines.extend(variant.defines.iter().cloned());
            }
            units.push(PlannedUnit {
                shader,
                variant,
                name: constant_name(shader, variant, &job.suffix),
                defines,
            });
        }
    }

    check_unique(&job.constants, &units)?;
    Ok(units)
}

fn describe(unit: &PlannedUnit<'_>) -> String {
    match unit.variant {
        Some(variant) => format!("{} [{}]", unit.shader.path().display(), variant.name),
        None => unit.shader.path().display().to_string(),
    }
}

/// Scalar constants and shader constants share one namespace in the output
fn check_unique(constants: &[ScalarConstant], units: &[PlannedUnit<'_>]) -> EmbedResult<()> {
    let mut seen: HashMap<&str, String> = HashMap::with_capacity(constants.len() + units.len());
    let sources = constants
        .iter()
        .map(|c| (c.name.as_str(), format!("constant {}", c.name)))
        .chain(units.iter().map(|u| (u.name.as_str(), describe(u))));

    for (name, source) in sources {
        match seen.entry(name) {
            Entry::Occupied(first) => {
                return Err(EmbedError::DuplicateConstant {
                    name: name.to_string(),
                    first: first.get().clone(),
                    second: source,
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(source);
            }
        }
    }
    Ok(())
}

/// Compile every planned unit in order. The first failure aborts.
pub fn compile_job(job: &EmbedJob, compiler: &dyn ShaderCompiler) -> EmbedResult<Vec<CompiledUnit>> {
    let planned = plan(job)?;
    log::debug!("{} units planned for {}", planned.len(), job.output.display());

    let mut compiled = Vec::with_capacity(planned.len());
    for unit in &planned {
        log::info!(
            "Embedding {} ({}) as {}",
            unit.shader.path().display(),
            unit.shader.stage(),
            unit.name
        );
        log::debug!("defines: {:?}", unit.defines);

        let payload = compiler.compile(&CompileRequest {
            shader: unit.shader,
            constant_name: &unit.name,
            defines: &unit.defines,
            optimize: job.optimize,
        })?;
        compiled.push(CompiledUnit {
            name: unit.name.clone(),
            payload,
        });
    }
    Ok(compiled)
}

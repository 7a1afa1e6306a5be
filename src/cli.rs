//! Command-line surface of the `spv-embed` binary

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use crate::compiler::{EmbedMode, ToolCommand};
use crate::config::Manifest;
use crate::embed::{
    run_job, EmbedJob, IterationOrder, ScalarConstant, ScalarValue, ShaderGroup,
};
use crate::error::{config_error, EmbedResult};
use crate::shader::{ShaderSource, Variant};

/// Output file used when `--output` is not given
pub const DEFAULT_OUTPUT: &str = "embedded_spv.js";

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct Cli {
    pub verbose: bool,
    pub command: CliCommand,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Embed(EmbedArgs),
    Manifest(ManifestArgs),
}

/// Single job described entirely on the command line
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedArgs {
    pub compiler: String,
    pub shaders: Vec<PathBuf>,
    pub output: PathBuf,
    pub helper: Option<ToolCommand>,
    pub variants: Vec<Variant>,
    pub defines: Vec<String>,
    pub optimize: bool,
    pub order: IterationOrder,
    pub constants: Vec<ScalarConstant>,
    pub array_type: Option<String>,
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManifestArgs {
    pub manifest: PathBuf,
    pub job: Option<String>,
    pub compiler: Option<String>,
}

/// Options that only make sense for a single command-line job
const EMBED_ONLY: &[&str] = &[
    "shaders",
    "output",
    "helper",
    "variant",
    "define",
    "order",
    "const",
    "array-type",
    "suffix",
];

impl Cli {
    /// Argument definitions; also the source of the usage and help text
    pub fn command() -> Command<'static> {
        Command::new("spv-embed")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Compile GLSL shader variants and embed the SPIR-V as constants")
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .action(ArgAction::SetTrue)
                    .help("Debug logging"),
            )
            .arg(
                Arg::new("output")
                    .short('o')
                    .long("output")
                    .takes_value(true)
                    .value_name("PATH")
                    .value_parser(value_parser!(PathBuf))
                    .help("Output file [default: embedded_spv.js]"),
            )
            .arg(
                Arg::new("helper")
                    .long("helper")
                    .takes_value(true)
                    .value_name("COMMAND")
                    .value_parser(parse_helper)
                    .help("Delegated mode: helper that prints declarations"),
            )
            .arg(
                Arg::new("variant")
                    .long("variant")
                    .takes_value(true)
                    .action(ArgAction::Append)
                    .value_name("NAME[=DEFS]")
                    .value_parser(parse_variant)
                    .help("Add a variant; DEFS are comma separated defines"),
            )
            .arg(
                Arg::new("define")
                    .short('D')
                    .takes_value(true)
                    .action(ArgAction::Append)
                    .value_name("DEFINE")
                    .value_parser(value_parser!(String))
                    .help("Define passed to every compilation"),
            )
            .arg(
                Arg::new("optimize")
                    .short('O')
                    .action(ArgAction::SetTrue)
                    .help("Optimize"),
            )
            .arg(
                Arg::new("order")
                    .long("order")
                    .takes_value(true)
                    .value_name("shaders|variants")
                    .value_parser(parse_order)
                    .help("Loop nesting [default: variants]"),
            )
            .arg(
                Arg::new("const")
                    .long("const")
                    .takes_value(true)
                    .action(ArgAction::Append)
                    .value_name("NAME=VALUE")
                    .value_parser(parse_constant)
                    .help("Emit `const NAME = VALUE;` ahead of the shaders"),
            )
            .arg(
                Arg::new("array-type")
                    .long("array-type")
                    .takes_value(true)
                    .value_name("TYPE")
                    .value_parser(value_parser!(String))
                    .help("Typed array for word payloads [default: Uint32Array]"),
            )
            .arg(
                Arg::new("suffix")
                    .long("suffix")
                    .takes_value(true)
                    .value_name("SUFFIX")
                    .value_parser(value_parser!(String))
                    .help("Constant name suffix [default: spv]"),
            )
            .arg(
                Arg::new("manifest")
                    .short('m')
                    .long("manifest")
                    .takes_value(true)
                    .value_name("PATH")
                    .value_parser(value_parser!(PathBuf))
                    .conflicts_with_all(EMBED_ONLY)
                    .help("Run jobs from a TOML manifest"),
            )
            .arg(
                Arg::new("job")
                    .long("job")
                    .takes_value(true)
                    .value_name("NAME")
                    .requires("manifest")
                    .value_parser(value_parser!(String))
                    .help("Only run this manifest job"),
            )
            .arg(
                Arg::new("compiler")
                    .value_name("COMPILER")
                    .required_unless_present("manifest")
                    .value_parser(value_parser!(String))
                    .help("glslc, or the compiler handed to the helper"),
            )
            .arg(
                Arg::new("shaders")
                    .value_name("SHADER")
                    .multiple_values(true)
                    .value_parser(value_parser!(PathBuf))
                    .required_unless_present("manifest")
                    .help("GLSL sources to embed"),
            )
    }

    /// Parse arguments, excluding the program name.
    ///
    /// Help and version requests also come back as errors; see
    /// `clap::Error::use_stderr`.
    pub fn parse<I, S>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString> + Clone,
    {
        let argv = std::iter::once(OsString::from("spv-embed"))
            .chain(args.into_iter().map(Into::into));
        let matches = Self::command().try_get_matches_from(argv)?;
        Ok(Self::from_matches(&matches))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let verbose = matches.get_one::<bool>("verbose").copied().unwrap_or(false);
        let compiler = matches.get_one::<String>("compiler").cloned();

        let command = match matches.get_one::<PathBuf>("manifest") {
            Some(manifest) => CliCommand::Manifest(ManifestArgs {
                manifest: manifest.clone(),
                job: matches.get_one::<String>("job").cloned(),
                compiler,
            }),
            None => CliCommand::Embed(EmbedArgs {
                compiler: compiler.unwrap_or_default(),
                shaders: many(matches, "shaders"),
                output: matches
                    .get_one::<PathBuf>("output")
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
                helper: matches.get_one::<ToolCommand>("helper").cloned(),
                variants: many(matches, "variant"),
                defines: many::<String>(matches, "define")
                    .into_iter()
                    .map(|define| format!("-D{}", define))
                    .collect(),
                optimize: matches.get_one::<bool>("optimize").copied().unwrap_or(false),
                order: matches
                    .get_one::<IterationOrder>("order")
                    .copied()
                    .unwrap_or_default(),
                constants: many(matches, "const"),
                array_type: matches.get_one::<String>("array-type").cloned(),
                suffix: matches.get_one::<String>("suffix").cloned(),
            }),
        };

        Self { verbose, command }
    }
}

fn many<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Vec<T> {
    matches
        .get_many::<T>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn parse_helper(line: &str) -> Result<ToolCommand, String> {
    ToolCommand::parse(line).map_err(|e| e.to_string())
}

fn parse_variant(spec: &str) -> Result<Variant, String> {
    Variant::parse(spec).map_err(|e| e.to_string())
}

fn parse_order(value: &str) -> Result<IterationOrder, String> {
    match value {
        "shaders" => Ok(IterationOrder::Shaders),
        "variants" => Ok(IterationOrder::Variants),
        other => Err(format!("unknown order '{}', expected shaders or variants", other)),
    }
}

fn parse_constant(spec: &str) -> Result<ScalarConstant, String> {
    let (name, literal) = spec
        .split_once('=')
        .filter(|(name, _)| !name.trim().is_empty())
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", spec))?;
    Ok(ScalarConstant::new(name.trim(), ScalarValue::parse(literal.trim())))
}

impl EmbedArgs {
    pub fn to_job(&self) -> EmbedResult<EmbedJob> {
        let shaders = self
            .shaders
            .iter()
            .map(|path| ShaderSource::new(path.clone()))
            .collect::<EmbedResult<Vec<_>>>()?;

        let mut job = EmbedJob::new(&self.output)
            .with_group(ShaderGroup::new(shaders, self.variants.clone()));
        job.defines = self.defines.clone();
        job.optimize = self.optimize;
        job.order = self.order;
        job.constants = self.constants.clone();
        if let Some(array_type) = &self.array_type {
            job.array_type = array_type.clone();
        }
        if let Some(suffix) = &self.suffix {
            job.suffix = suffix.clone();
        }
        Ok(job)
    }

    pub fn mode(&self) -> EmbedMode {
        if self.helper.is_some() {
            EmbedMode::Delegated
        } else {
            EmbedMode::PreFormatted
        }
    }
}

/// Run the parsed command. Returns the output files written.
pub fn execute(command: &CliCommand) -> EmbedResult<Vec<PathBuf>> {
    match command {
        CliCommand::Embed(args) => {
            let job = args.to_job()?;
            let backend = args.mode().backend(&args.compiler, args.helper.clone())?;
            run_job(&job, backend.as_ref())?;
            Ok(vec![job.output])
        }
        CliCommand::Manifest(args) => run_manifest(args),
    }
}

fn run_manifest(args: &ManifestArgs) -> EmbedResult<Vec<PathBuf>> {
    let manifest = Manifest::load(&args.manifest)?;
    let base_dir = args
        .manifest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let compiler = args
        .compiler
        .as_deref()
        .or(manifest.compiler.as_deref())
        .ok_or_else(|| config_error("no compiler given on the command line or in the manifest"))?;

    let mut written = Vec::new();
    for config in manifest.select(args.job.as_deref())? {
        log::info!("Running job '{}'", config.name);
        let job = config.to_job(base_dir)?;
        let backend = config.backend(compiler, base_dir)?;
        run_job(&job, backend.as_ref())?;
        written.push(job.output);
    }
    Ok(written)
}

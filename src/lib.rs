pub mod cli;
pub mod compiler;
pub mod config;
pub mod embed;
pub mod error;
pub mod shader;

pub use compiler::{
    CompileRequest, DelegatedCompiler, EmbedMode, GlslcCompiler, Payload, ShaderCompiler,
    ToolCommand,
};
pub use config::Manifest;
pub use embed::{
    compile_job, plan, run_job, CompiledUnit, EmbedJob, IterationOrder, OutputDocument,
    ScalarConstant, ScalarValue, ShaderGroup,
};
pub use error::{EmbedError, EmbedResult};
pub use shader::{ShaderSource, ShaderStage, Variant};

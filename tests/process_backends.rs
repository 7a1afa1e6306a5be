//! Subprocess backends against shell-script stand-ins for glslc and the helper
#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use spv_embed::cli::{execute, CliCommand, ManifestArgs};
use spv_embed::*;
use tempfile::TempDir;

/// Writes C-array text to the `-o` path like `glslc -mfmt=c`
const FAKE_GLSLC: &str = r#"
out=""
while [ $# -gt 0 ]; do
    case "$1" in
        -o) out="$2"; shift 2 ;;
        *) shift ;;
    esac
done
printf '{0x07230203,0x00010000,0x0000002a}\n' > "$out"
"#;

/// Prints a declaration naming the constant and counting the trailing flags
const FAKE_HELPER: &str = r#"
name="$3"
shift 3
printf 'const %s = new Uint32Array([%d]);\n' "$name" "$#"
"#;

const BROKEN_COMPILER: &str = r#"
echo "a.comp:3: error: 'foo' : undeclared identifier" >&2
exit 1
"#;

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn sh(script: &Path) -> ToolCommand {
    ToolCommand::from_parts(["sh".to_string(), script.display().to_string()]).unwrap()
}

fn shader(dir: &Path, name: &str) -> ShaderSource {
    let path = dir.join(name);
    fs::write(&path, "#version 450\nvoid main() {}\n").unwrap();
    ShaderSource::new(path).unwrap()
}

#[test]
fn test_glslc_words_are_embedded() {
    let dir = TempDir::new().unwrap();
    let glslc = GlslcCompiler::new(sh(&script(dir.path(), "glslc.sh", FAKE_GLSLC)));
    let output = dir.path().join("embedded_spv.js");

    let job = EmbedJob::new(&output).with_group(ShaderGroup::new(
        vec![shader(dir.path(), "simple.comp")],
        vec![],
    ));
    run_job(&job, &glslc).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "const simple_comp_spv = new Uint32Array([0x07230203,0x00010000,0x0000002a]);\n"
    );
}

#[test]
fn test_glslc_failure_reports_stderr() {
    let dir = TempDir::new().unwrap();
    let glslc = GlslcCompiler::new(sh(&script(dir.path(), "glslc.sh", BROKEN_COMPILER)));
    let output = dir.path().join("embedded_spv.js");
    fs::write(&output, "stale").unwrap();

    let job = EmbedJob::new(&output).with_group(ShaderGroup::new(
        vec![shader(dir.path(), "a.comp")],
        vec![],
    ));
    match run_job(&job, &glslc) {
        Err(EmbedError::CompilerFailed { status, stderr, .. }) => {
            assert_eq!(status.code(), Some(1));
            assert!(stderr.contains("undeclared identifier"));
        }
        other => panic!("expected compiler failure, got {:?}", other.map(|d| d.units.len())),
    }
    assert!(!output.exists());
}

#[test]
fn test_delegated_passes_defines_and_optimize() {
    let dir = TempDir::new().unwrap();
    let helper = sh(&script(dir.path(), "compile_shader.sh", FAKE_HELPER));
    let delegated = DelegatedCompiler::new(helper, "glslc");
    let output = dir.path().join("embedded_las_shaders.js");

    let mut job = EmbedJob::new(&output).with_group(ShaderGroup::new(
        vec![shader(dir.path(), "lidar.vert"), shader(dir.path(), "lidar.frag")],
        vec![
            Variant::new("pos", Vec::<String>::new()),
            Variant::new("poscolor", ["-DCOLOR_ATTRIB=1"]),
        ],
    ));
    job.optimize = true;
    run_job(&job, &delegated).unwrap();

    // Trailing flag count is the variant's defines plus -O
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "const lidar_pos_vert_spv = new Uint32Array([1]);\n\
         const lidar_pos_frag_spv = new Uint32Array([1]);\n\
         const lidar_poscolor_vert_spv = new Uint32Array([2]);\n\
         const lidar_poscolor_frag_spv = new Uint32Array([2]);\n"
    );
}

#[test]
fn test_manifest_runs_every_job() {
    let dir = TempDir::new().unwrap();
    let helper = script(dir.path(), "compile_shader.sh", FAKE_HELPER);
    shader(dir.path(), "mandelbrot.comp");
    shader(dir.path(), "zfp_decompress_block.comp");

    let manifest = dir.path().join("embed.toml");
    fs::write(
        &manifest,
        format!(
            r#"
compiler = "glslc"

[[job]]
name = "mandelbrot"
output = "out/embedded_mandelbrot_shaders.js"
mode = "delegated"
helper = ["sh", "{helper}"]
optimize = true

[[job.group]]
shaders = ["mandelbrot.comp"]

[[job]]
name = "zfp"
output = "out/zfp_decompress_spv.js"
mode = "delegated"
helper = ["sh", "{helper}"]

[[job.constant]]
name = "SerialKernels"
value = false

[[job.group]]
shaders = ["zfp_decompress_block.comp"]
"#,
            helper = helper.display()
        ),
    )
    .unwrap();

    let written = execute(&CliCommand::Manifest(ManifestArgs {
        manifest: manifest.clone(),
        job: None,
        compiler: None,
    }))
    .unwrap();
    assert_eq!(written.len(), 2);

    assert_eq!(
        fs::read_to_string(dir.path().join("out/embedded_mandelbrot_shaders.js")).unwrap(),
        "const mandelbrot_comp_spv = new Uint32Array([1]);\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("out/zfp_decompress_spv.js")).unwrap(),
        "const SerialKernels = false;\nconst zfp_decompress_block_comp_spv = new Uint32Array([0]);\n"
    );
}

#[test]
fn test_binary_usage_error_exits_one() {
    let output = Command::new(env!("CARGO_BIN_EXE_spv-embed"))
        .arg("glslc")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("USAGE:"));
    assert!(stderr.contains("<SHADER>"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_binary_compiler_failure_exits_one() {
    let dir = TempDir::new().unwrap();
    let broken = script(dir.path(), "broken.sh", BROKEN_COMPILER);
    let source = shader(dir.path(), "a.comp");
    let output_path = dir.path().join("out.js");

    let output = Command::new(env!("CARGO_BIN_EXE_spv-embed"))
        .arg("--helper")
        .arg(format!("sh {}", broken.display()))
        .arg("-o")
        .arg(&output_path)
        .arg("glslc")
        .arg(source.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("undeclared identifier"));
    assert!(!output_path.exists());
}

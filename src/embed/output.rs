//! Writing the generated file

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{compile_job, EmbedJob, OutputDocument};
use crate::compiler::ShaderCompiler;
use crate::error::{EmbedError, EmbedResult, ErrorContext};

/// Delete `path` if present. Returns whether a file was removed.
///
/// Not-found is fine; any other failure is propagated.
pub fn remove_if_exists(path: &Path) -> EmbedResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_path(path),
    }
}

/// Write `contents` to `path` through a sibling temp file and a rename,
/// so readers never observe a partial file.
pub fn write_output(path: &Path, contents: &str) -> EmbedResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).with_path(&dir)?;

    let mut staged = tempfile::Builder::new()
        .prefix(".spv-embed")
        .tempfile_in(&dir)
        .with_path(&dir)?;
    staged.write_all(contents.as_bytes()).with_path(staged.path())?;
    staged.as_file().sync_all().with_path(staged.path())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .with_path(staged.path())?;
    }

    staged.persist(path).map_err(|e| EmbedError::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// Run one job end to end: clear the old output, compile every unit,
/// render and write.
///
/// The old output is removed first, so a failed run leaves no file behind.
pub fn run_job(job: &EmbedJob, compiler: &dyn ShaderCompiler) -> EmbedResult<OutputDocument> {
    if remove_if_exists(&job.output)? {
        log::debug!("Removed previous {}", job.output.display());
    }

    let units = compile_job(job, compiler)?;
    let document = OutputDocument::new(job.array_type.as_str())
        .with_constants(job.constants.clone())
        .with_units(units);

    write_output(&job.output, &document.render())?;
    log::info!(
        "Wrote {} shader constants to {}",
        document.units.len(),
        job.output.display()
    );
    Ok(document)
}

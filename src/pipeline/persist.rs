//! Writing artifacts to disk.
//!
//! The whole artifact is serialized in memory first, written to a temporary
//! file next to the destination and renamed into place, so a failed write
//! never leaves a truncated file under the requested name.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::generator::Artifact;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::Builder;

/// Mode requested for new files; the process umask still applies.
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o666;

/// Append `.extension` unless `path` already ends with it.
pub fn with_extension(path: &Path, extension: &str) -> PathBuf {
    let has_extension = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false);

    if has_extension {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }
}

/// Replace a leading `~` with the user's home directory.
///
/// Paths without one, or when no home directory is known, are returned as
/// given.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs_next::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Write `artifact` to `path` and return the path actually written.
///
/// `extension` is appended when missing and a leading `~` is expanded only
/// when `expand` is set. Parent directories are not created. A replaced file
/// keeps its permissions; a new one gets the same mode as a plain write.
///
/// # Errors
/// [`PipelineError::Persist`] when the temporary file cannot be created,
/// written or renamed.
pub fn write_artifact(
    artifact: &Artifact,
    path: &Path,
    extension: &str,
    expand: bool,
) -> PipelineResult<PathBuf> {
    let path = if expand {
        expand_home(path)
    } else {
        path.to_path_buf()
    };
    let path = with_extension(&path, extension);
    let content = artifact.to_text()?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let persist_err = |source| PipelineError::Persist {
        path: path.clone(),
        source,
    };

    let mut builder = Builder::new();
    builder.prefix(".cle-assistant");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(NEW_FILE_MODE));
    }

    let mut file = builder.tempfile_in(dir).map_err(persist_err)?;
    file.write_all(content.as_bytes()).map_err(persist_err)?;
    file.flush().map_err(persist_err)?;
    if let Ok(existing) = std::fs::metadata(&path) {
        file.as_file()
            .set_permissions(existing.permissions())
            .map_err(persist_err)?;
    }
    file.persist(&path).map_err(|e| persist_err(e.error))?;

    tracing::info!("Wrote {} bytes to {:?}", content.len(), path);
    Ok(path)
}

//! Loose class-file rewriting.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::RewriteError;
use crate::transform::ClassTransformer;

/// Reads `source`, transforms it and replaces `destination` with the result.
///
/// The new content is written to a temporary file next to `destination` and
/// renamed into place, so a failed rewrite never leaves a partial file behind.
/// The result carries the source's permissions.
pub fn rewrite_class_file(
    source: &Path,
    transformer: &dyn ClassTransformer,
    destination: &Path,
) -> Result<(), RewriteError> {
    let bytes = fs::read(source).map_err(|e| RewriteError::io(source, e))?;
    let permissions = fs::metadata(source)
        .map_err(|e| RewriteError::io(source, e))?
        .permissions();
    let rewritten = transformer
        .transform(&bytes)
        .map_err(|e| RewriteError::Transform {
            path: source.to_path_buf(),
            source: e,
        })?;

    let mut tmp = temp_file_beside(destination)?;
    tmp.write_all(&rewritten)
        .and_then(|()| tmp.flush())
        .map_err(|e| RewriteError::io(tmp.path(), e))?;
    persist(tmp, permissions, destination)
}

pub(crate) fn temp_file_beside(destination: &Path) -> Result<NamedTempFile, RewriteError> {
    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| RewriteError::io(parent, e))?;

    tempfile::Builder::new()
        .prefix(".class-rewriter-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| RewriteError::io(parent, e))
}

/// Applies `permissions` to the temporary file and renames it over `destination`.
pub(crate) fn persist(
    tmp: NamedTempFile,
    permissions: fs::Permissions,
    destination: &Path,
) -> Result<(), RewriteError> {
    tmp.as_file()
        .set_permissions(permissions)
        .map_err(|e| RewriteError::io(tmp.path(), e))?;
    tmp.persist(destination)
        .map(|_| ())
        .map_err(|e| RewriteError::io(destination, e.error))
}

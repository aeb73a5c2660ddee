//! Timestamp-based staleness check.
//!
//! A destination is treated as up to date only when its modification time
//! is strictly later than the source's. Times are compared at millisecond
//! resolution. Equal timestamps rewrite, which means an in-place pass
//! (source == destination) always rewrites.

use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn needs_rewrite(source: &Path, destination: &Path) -> io::Result<bool> {
    let source_mtime = millis(source.metadata()?.modified()?);
    let Some(dest_mtime) = modified_if_exists(destination)? else {
        return Ok(true);
    };
    Ok(source_mtime >= dest_mtime)
}

fn modified_if_exists(path: &Path) -> io::Result<Option<i128>> {
    match path.metadata() {
        Ok(meta) => meta.modified().map(|t| Some(millis(t))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Milliseconds since the epoch, negative before it.
fn millis(time: SystemTime) -> i128 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_millis() as i128,
        Err(before) => -(before.duration().as_millis() as i128),
    }
}

//! Entry-by-entry rewriting of jar/war/ear/zip containers.
//!
//! Class entries are decompressed, transformed and written back with the same
//! name, compression method, timestamp and permissions. Every other entry is
//! CRC-checked and then copied raw (compressed bytes, CRC and header
//! untouched). Entry order is the central directory order of the input.

use anyhow::Context;
use memmap2::Mmap;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use tracing::debug;
use zip::read::ZipFile;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::classify::is_class_name;
use crate::error::{ArchiveError, RewriteError};
use crate::rewrite::{persist, temp_file_beside};
use crate::transform::ClassTransformer;

const MAX_PREALLOC: u64 = 16 * 1024 * 1024;
const ZIP64_THRESHOLD: usize = u32::MAX as usize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
    pub entries: usize,
    pub transformed: usize,
    pub copied: usize,
}

pub fn rewrite_archive<R, W>(
    input: R,
    transformer: &dyn ClassTransformer,
    output: W,
) -> Result<ArchiveSummary, ArchiveError>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let mut archive = ZipArchive::new(input)?;
    let mut writer = ZipWriter::new(output);
    let mut summary = ArchiveSummary::default();

    if let Ok(comment) = std::str::from_utf8(archive.comment())
        && !comment.is_empty()
    {
        writer.set_comment(comment);
    }

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        summary.entries += 1;

        if entry.is_dir() {
            writer.raw_copy_file(entry)?;
            summary.copied += 1;
            continue;
        }

        if !is_class_name(entry.name()) {
            debug!(entry = entry.name(), "copying archive entry");
            // Reading to the end checks the stored CRC before the raw copy.
            io::copy(&mut entry, &mut io::sink())?;
            drop(entry);
            writer.raw_copy_file(archive.by_index_raw(index)?)?;
            summary.copied += 1;
            continue;
        }

        let name = entry.name().to_string();
        let mut payload = Vec::with_capacity(entry.size().min(MAX_PREALLOC) as usize);
        entry.read_to_end(&mut payload)?;
        let options = rewritten_entry_options(&entry);
        drop(entry);

        let rewritten = transformer
            .transform(&payload)
            .map_err(|source| ArchiveError::Transform {
                entry: name.clone(),
                source,
            })?;

        debug!(entry = name.as_str(), "transforming archive entry");
        writer.start_file(name, options.large_file(rewritten.len() >= ZIP64_THRESHOLD))?;
        writer.write_all(&rewritten)?;
        summary.transformed += 1;
    }

    let mut output = writer.finish()?;
    output.flush()?;
    Ok(summary)
}

fn rewritten_entry_options(entry: &ZipFile<'_>) -> FileOptions {
    let method = if entry.compression() == CompressionMethod::Stored {
        CompressionMethod::Stored
    } else {
        CompressionMethod::Deflated
    };

    let options = FileOptions::default()
        .compression_method(method)
        .last_modified_time(entry.last_modified());

    match entry.unix_mode() {
        Some(mode) => options.unix_permissions(mode),
        None => options,
    }
}

/// Rewrites the archive at `source` into `destination`.
///
/// The output is built in a temporary file beside `destination` and renamed
/// over it only after the archive was fully written, with the source's
/// permissions.
pub fn rewrite_archive_file(
    source: &Path,
    transformer: &dyn ClassTransformer,
    destination: &Path,
) -> Result<ArchiveSummary, RewriteError> {
    let file = File::open(source).map_err(|e| RewriteError::io(source, e))?;
    let permissions = file
        .metadata()
        .map_err(|e| RewriteError::io(source, e))?
        .permissions();
    // SAFETY: The file is opened read-only and remains valid for the lifetime of the mmap.
    // The mmap is dropped before the temporary output replaces the destination.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| RewriteError::io(source, e))?;

    let mut tmp = temp_file_beside(destination)?;
    let summary = rewrite_archive(
        Cursor::new(&mmap[..]),
        transformer,
        BufWriter::new(tmp.as_file_mut()),
    )
    .map_err(|e| RewriteError::Archive {
        path: source.to_path_buf(),
        source: e,
    })?;

    drop(mmap);
    drop(file);
    persist(tmp, permissions, destination)?;
    Ok(summary)
}

/// Entry names of the archive at `path`, in stored order.
pub fn entry_names(path: &Path) -> anyhow::Result<Vec<String>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open archive: {}", path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("Failed to read zip structure: {}", path.display()))?;
    Ok(ordered_names(&mut archive)?)
}

fn ordered_names<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> zip::result::ZipResult<Vec<String>> {
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        names.push(archive.by_index(i)?.name().to_string());
    }
    Ok(names)
}

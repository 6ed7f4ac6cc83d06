use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{HufError, Result};
use crate::tools::cli::HufOpts;
use crate::tools::fs::FileSystem;
use crate::tools::report::CompressReport;

use super::archive::{write_single, ArchiveKind, FileRecord};
use super::strategy::build_folder_archive;

/// Extension appended to every archive.
pub const ARCHIVE_EXTENSION: &str = ".huf";

/// Compress the file or folder named in opts (HufOpts) into a sibling `.huf` archive.
pub fn compress<F: FileSystem>(fs: &F, opts: &HufOpts) -> Result<CompressReport> {
    let input = opts.path.as_path();
    let report = if fs.is_dir(input) {
        compress_folder(fs, input, opts)?
    } else if fs.is_file(input) {
        compress_file(fs, input, opts)?
    } else {
        return Err(HufError::InvalidInput(format!(
            "{} is not a file or folder",
            input.display()
        )));
    };
    report.log();
    Ok(report)
}

/// Compress one file into a single file archive.
pub fn compress_file<F: FileSystem>(
    fs: &F,
    input: &Path,
    opts: &HufOpts,
) -> Result<CompressReport> {
    let archive = archive_path_for(input);
    check_overwrite(fs, &archive, opts.force_overwrite)?;

    let content = fs.read_all(input)?;
    if content.is_empty() {
        return Err(HufError::EmptyInput(format!("{} is empty", input.display())));
    }
    info!("Compressing {} ({} bytes).", input.display(), content.len());

    let mut bytes = Vec::with_capacity(content.len() / 2);
    write_single(&mut bytes, &content)?;
    fs.write_all(&archive, &bytes)?;

    Ok(CompressReport {
        kind: ArchiveKind::Single,
        archive,
        files: 1,
        original_size: content.len() as u64,
        compressed_size: bytes.len() as u64,
    })
}

/// Compress every regular file below `input` into a folder archive.
pub fn compress_folder<F: FileSystem>(
    fs: &F,
    input: &Path,
    opts: &HufOpts,
) -> Result<CompressReport> {
    let archive = archive_path_for(input);
    check_overwrite(fs, &archive, opts.force_overwrite)?;

    let entries = fs.list_files(input)?;
    if entries.is_empty() {
        return Err(HufError::EmptyInput(format!(
            "{} holds no files",
            input.display()
        )));
    }
    info!("Found {} files in {}.", entries.len(), input.display());

    // Read every file once; both layouts are built from the same records.
    let files = entries
        .iter()
        .map(|entry| {
            debug!("  {} ({} bytes)", entry.relative_path, entry.size);
            Ok(FileRecord::new(
                entry.relative_path.clone(),
                fs.read_all(&entry.absolute_path)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let built = build_folder_archive(&files, opts.strategy)?;
    fs.write_all(&archive, &built.bytes)?;

    Ok(CompressReport {
        kind: built.kind,
        archive,
        files: files.len(),
        original_size: files.iter().map(FileRecord::original_size).sum(),
        compressed_size: built.bytes.len() as u64,
    })
}

/// The archive name for an input: the input path, less any trailing separator, plus `.huf`.
pub fn archive_path_for(input: &Path) -> PathBuf {
    // Collecting the components drops trailing separators.
    let trimmed: PathBuf = input.components().collect();
    let mut name = trimmed.into_os_string();
    name.push(ARCHIVE_EXTENSION);
    PathBuf::from(name)
}

/// Refuse to replace an existing file unless the user asked for it.
pub(crate) fn check_overwrite<F: FileSystem>(fs: &F, target: &Path, force: bool) -> Result<()> {
    if fs.is_dir(target) {
        return Err(HufError::InvalidInput(format!(
            "{} is a folder",
            target.display()
        )));
    }
    if fs.exists(target) && !force {
        return Err(HufError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            target.display()
        )));
    }
    Ok(())
}

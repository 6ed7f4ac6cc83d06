//! The file system capability the compressor consumes: enumerate a folder, read and write
//! whole files, create directories. DiskFs is the real thing.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use log::trace;
use walkdir::WalkDir;

use crate::error::{HufError, Result};

/// One regular file found under a folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the folder, `/` separated on every platform.
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub size: u64,
}

pub trait FileSystem {
    /// Every regular file under `root`, in a stable order (sorted by name, depth first).
    fn list_files(&self, root: &Path) -> Result<Vec<FileEntry>>;
    fn read_all(&self, path: &Path) -> Result<Vec<u8>>;
    fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<()>;
    fn ensure_dir(&self, path: &Path) -> Result<()>;
    fn is_dir(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn exists(&self, path: &Path) -> bool {
        self.is_dir(path) || self.is_file(path)
    }
}

/// The local disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiskFs;

impl FileSystem for DiskFs {
    fn list_files(&self, root: &Path) -> Result<Vec<FileEntry>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            // Symlinked files count, symlinked folders are not descended into.
            if !entry.path().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(root).map_err(|_| {
                HufError::InvalidInput(format!(
                    "{} is outside {}",
                    entry.path().display(),
                    root.display()
                ))
            })?;
            let relative_path = normalize(relative)?;
            let size = fs::metadata(entry.path())?.len();
            trace!("Found {} ({} bytes).", relative_path, size);
            files.push(FileEntry {
                relative_path,
                absolute_path: entry.path().to_path_buf(),
                size,
            });
        }
        Ok(files)
    }

    fn read_all(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        Ok(fs::write(path, bytes)?)
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        Ok(fs::create_dir_all(path)?)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Join the components of a relative path with `/`.
pub fn normalize(relative: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(|| {
                HufError::InvalidInput(format!("{} is not valid UTF-8", relative.display()))
            })?),
            Component::CurDir => {}
            _ => {
                return Err(HufError::InvalidInput(format!(
                    "{} is not a plain relative path",
                    relative.display()
                )))
            }
        }
    }
    Ok(parts.join("/"))
}

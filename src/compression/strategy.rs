//! Choose between the two folder layouts.
//!
//! Both archives are built in memory from the same buffered files, so the folder is read
//! once and the comparison is exactly what writing both to disk would show.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use log::info;

use super::archive::{write_folder, ArchiveKind, FileRecord};
use crate::error::{HufError, Result};

/// Which folder layout to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Build both layouts and keep the smaller one.
    Auto,
    /// Always use one shared tree.
    Global,
    /// Always use one tree per file.
    Separate,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Auto
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Strategy::Auto),
            "global" => Ok(Strategy::Global),
            "separate" => Ok(Strategy::Separate),
            other => Err(format!(
                "unknown strategy '{}' (expected auto, global or separate)",
                other
            )),
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A finished folder archive and the sizes of the candidates that were built.
#[derive(Debug)]
pub struct FolderArchive {
    pub kind: ArchiveKind,
    pub bytes: Vec<u8>,
    pub global_size: Option<usize>,
    pub separate_size: Option<usize>,
}

/// Build the folder archive the strategy asks for.
pub fn build_folder_archive(files: &[FileRecord], strategy: Strategy) -> Result<FolderArchive> {
    if files.is_empty() {
        return Err(HufError::EmptyInput("folder holds no files".to_string()));
    }

    match strategy {
        Strategy::Global => {
            let bytes = build(ArchiveKind::Global, files)?;
            Ok(FolderArchive {
                kind: ArchiveKind::Global,
                global_size: Some(bytes.len()),
                separate_size: None,
                bytes,
            })
        }
        Strategy::Separate => {
            let bytes = build(ArchiveKind::Separate, files)?;
            Ok(FolderArchive {
                kind: ArchiveKind::Separate,
                global_size: None,
                separate_size: Some(bytes.len()),
                bytes,
            })
        }
        Strategy::Auto => {
            info!("Building global tree archive.");
            let global = build(ArchiveKind::Global, files)?;
            info!("Building separate trees archive.");
            let separate = build(ArchiveKind::Separate, files)?;
            let (global_size, separate_size) = (global.len(), separate.len());

            let kind = pick_smaller(global_size, separate_size);
            let bytes = match kind {
                ArchiveKind::Separate => {
                    info!(
                        "Separate trees are smaller ({} B vs {} B).",
                        separate_size, global_size
                    );
                    separate
                }
                ArchiveKind::Global | ArchiveKind::Single => {
                    info!(
                        "Global tree is smaller or equal ({} B vs {} B).",
                        global_size, separate_size
                    );
                    global
                }
            };
            Ok(FolderArchive {
                kind,
                bytes,
                global_size: Some(global_size),
                separate_size: Some(separate_size),
            })
        }
    }
}

/// The layout to keep given both sizes. Equal sizes go to the global tree, which has
/// fewer trees to decode.
pub fn pick_smaller(global_size: usize, separate_size: usize) -> ArchiveKind {
    if global_size <= separate_size {
        ArchiveKind::Global
    } else {
        ArchiveKind::Separate
    }
}

fn build(kind: ArchiveKind, files: &[FileRecord]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_folder(&mut out, kind, files)?;
    Ok(out)
}

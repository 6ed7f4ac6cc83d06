use std::path::PathBuf;

use log::info;

use crate::compression::archive::ArchiveKind;

/// What a compression run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct CompressReport {
    pub kind: ArchiveKind,
    pub archive: PathBuf,
    pub files: usize,
    /// Input bytes. Folders count each file's relative path as well as its content.
    pub original_size: u64,
    pub compressed_size: u64,
}

impl CompressReport {
    /// Space saved, in percent. Negative when the archive is larger than its input.
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (1.0 - self.compressed_size as f64 / self.original_size as f64) * 100.0
    }

    /// Reports app progress as per the log level.
    pub fn log(&self) {
        info!("Wrote {} archive {}.", self.kind, self.archive.display());
        if self.kind.is_folder() {
            info!("Files: {}", self.files);
        }
        info!("Original size: {} bytes", self.original_size);
        info!("Compressed size: {} bytes", self.compressed_size);
        info!("Compression ratio: {:.2}%", self.ratio());
    }
}

/// What a decompression run produced.
#[derive(Clone, Debug, PartialEq)]
pub struct DecompressReport {
    pub kind: ArchiveKind,
    pub output: PathBuf,
    pub files: usize,
    pub bytes_written: u64,
}

impl DecompressReport {
    pub fn log(&self) {
        info!(
            "Restored {} file(s), {} bytes, to {}.",
            self.files,
            self.bytes_written,
            self.output.display()
        );
    }
}

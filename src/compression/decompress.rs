use std::io::Cursor;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{HufError, Result};
use crate::tools::cli::HufOpts;
use crate::tools::fs::FileSystem;
use crate::tools::report::DecompressReport;

use super::archive::{read_folder, read_single, ArchiveKind};
use super::compress::{check_overwrite, ARCHIVE_EXTENSION};

/// Decompress the archive named in opts (HufOpts) next to itself, without the `.huf` suffix.
pub fn decompress<F: FileSystem>(fs: &F, opts: &HufOpts) -> Result<DecompressReport> {
    let archive = opts.path.as_path();
    let output = output_path_for(archive)?;
    let bytes = fs.read_all(archive)?;

    // The tag byte decides which reader takes over.
    let kind = match bytes.first() {
        Some(&tag) => ArchiveKind::from_tag(tag)?,
        None => return Err(HufError::format("archive is empty")),
    };
    info!(
        "Found a {} archive, restoring to {}.",
        kind,
        output.display()
    );

    let mut input = Cursor::new(bytes.as_slice());
    let report = match kind {
        ArchiveKind::Single => {
            check_overwrite(fs, &output, opts.force_overwrite)?;
            let content = read_single(&mut input)?;
            fs.write_all(&output, &content)?;
            DecompressReport {
                kind,
                output,
                files: 1,
                bytes_written: content.len() as u64,
            }
        }
        ArchiveKind::Global | ArchiveKind::Separate => {
            if fs.is_file(&output) {
                return Err(HufError::InvalidInput(format!(
                    "{} exists and is not a folder",
                    output.display()
                )));
            }
            fs.ensure_dir(&output)?;

            // Files are written as they are decoded; a later failure leaves earlier files in place.
            let mut bytes_written = 0_u64;
            let files = read_folder(&mut input, kind, |record| {
                let target = output.join(&record.path);
                if let Some(parent) = target.parent() {
                    fs.ensure_dir(parent)?;
                }
                fs.write_all(&target, &record.content)?;
                debug!("  {} ({} bytes)", record.path, record.content.len());
                bytes_written += record.content.len() as u64;
                Ok(())
            })?;
            DecompressReport {
                kind,
                output,
                files,
                bytes_written,
            }
        }
    };

    let trailing = bytes.len() - input.position() as usize;
    if trailing > 0 {
        warn!("Ignoring {} trailing bytes after the archive.", trailing);
    }
    report.log();
    Ok(report)
}

/// The output name for an archive: the archive path with its `.huf` suffix removed.
pub fn output_path_for(archive: &Path) -> Result<PathBuf> {
    let stem = archive
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix(ARCHIVE_EXTENSION))
        .filter(|stem| !stem.is_empty());
    match stem {
        Some(stem) => Ok(archive.with_file_name(stem)),
        None => Err(HufError::InvalidInput(format!(
            "{} does not end in {}",
            archive.display(),
            ARCHIVE_EXTENSION
        ))),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compression::compress::compress;
    use crate::compression::strategy::Strategy;
    use crate::tools::cli::Mode;
    use crate::tools::fs::DiskFs;

    fn write(path: &Path, content: &[u8]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    /// Builds a small tree with nesting, an empty file and two files with equal content.
    fn sample_folder(root: &Path) {
        write(&root.join("readme.md"), b"# sample\nsome words, some more words\n");
        write(&root.join("src/main.c"), b"int main(void) { return 0; }\n");
        write(&root.join("src/deep/er/notes.txt"), b"aaaabbbccd");
        write(&root.join("copy_a.bin"), &[0, 1, 2, 3, 255, 254, 0, 0]);
        write(&root.join("copy_b.bin"), &[0, 1, 2, 3, 255, 254, 0, 0]);
        write(&root.join("empty.txt"), b"");
    }

    fn assert_same_tree(left: &Path, right: &Path) {
        let list = |root: &Path| DiskFs.list_files(root).unwrap();
        let (a, b) = (list(left), list(right));
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.relative_path, y.relative_path);
            assert_eq!(
                std::fs::read(&x.absolute_path).unwrap(),
                std::fs::read(&y.absolute_path).unwrap()
            );
        }
    }

    #[test]
    fn output_path_test() {
        assert_eq!(output_path_for(Path::new("a.txt.huf")).unwrap(), PathBuf::from("a.txt"));
        assert_eq!(output_path_for(Path::new("x/dir.huf")).unwrap(), PathBuf::from("x/dir"));
        assert!(output_path_for(Path::new("a.txt")).is_err());
        assert!(output_path_for(Path::new("x/.huf")).is_err());
    }

    #[test]
    fn single_file_round_trip_test() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("scenario.txt");
        write(&input, b"aaaabbbccd");
        let zipped = compress(&DiskFs, &HufOpts::new(Mode::Zip, &input)).unwrap();
        std::fs::remove_file(&input).unwrap();

        let report = decompress(&DiskFs, &HufOpts::new(Mode::Unzip, &zipped.archive)).unwrap();
        assert_eq!(report.kind, ArchiveKind::Single);
        assert_eq!(report.output, input);
        assert_eq!(report.bytes_written, 10);
        assert_eq!(std::fs::read(&input).unwrap(), b"aaaabbbccd");
    }

    #[test]
    fn single_file_needs_force_test() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("one.txt");
        write(&input, b"xxxx");
        let zipped = compress(&DiskFs, &HufOpts::new(Mode::Zip, &input)).unwrap();
        write(&input, b"changed");

        let mut opts = HufOpts::new(Mode::Unzip, &zipped.archive);
        let err = decompress(&DiskFs, &opts).unwrap_err();
        assert!(matches!(err, HufError::InvalidInput(_)));
        assert_eq!(std::fs::read(&input).unwrap(), b"changed");

        opts.force_overwrite = true;
        decompress(&DiskFs, &opts).unwrap();
        assert_eq!(std::fs::read(&input).unwrap(), b"xxxx");
    }

    #[test]
    fn folder_round_trip_every_strategy_test() {
        for strategy in [Strategy::Auto, Strategy::Global, Strategy::Separate] {
            let dir = tempfile::tempdir().unwrap();
            let original = dir.path().join("orig");
            sample_folder(&original);

            let mut opts = HufOpts::new(Mode::Zip, &original);
            opts.strategy = strategy;
            let zipped = compress(&DiskFs, &opts).unwrap();
            assert_eq!(zipped.files, 6);

            // Restore into a fresh location by moving the archive.
            let moved = dir.path().join("restored.huf");
            std::fs::rename(&zipped.archive, &moved).unwrap();
            let report = decompress(&DiskFs, &HufOpts::new(Mode::Unzip, &moved)).unwrap();

            assert_eq!(report.kind, zipped.kind);
            assert_eq!(report.files, 6);
            assert!(dir.path().join("restored/empty.txt").is_file());
            assert_same_tree(&original, &dir.path().join("restored"));
        }
    }

    #[test]
    fn truncated_folder_keeps_earlier_files_test() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("two");
        write(&original.join("a.txt"), b"first file");
        write(&original.join("b.txt"), b"second file, a little longer");

        let mut opts = HufOpts::new(Mode::Zip, &original);
        opts.strategy = Strategy::Separate;
        let zipped = compress(&DiskFs, &opts).unwrap();

        let bytes = std::fs::read(&zipped.archive).unwrap();
        let cut = dir.path().join("cut.huf");
        std::fs::write(&cut, &bytes[..bytes.len() - 3]).unwrap();

        let err = decompress(&DiskFs, &HufOpts::new(Mode::Unzip, &cut)).unwrap_err();
        assert!(err.is_format_error());
        assert_eq!(std::fs::read(dir.path().join("cut/a.txt")).unwrap(), b"first file");
        assert!(!dir.path().join("cut/b.txt").exists());
    }

    #[test]
    fn bad_archives_test() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.huf");
        std::fs::write(&empty, b"").unwrap();
        let unknown = dir.path().join("unknown.huf");
        std::fs::write(&unknown, b"Zjunk").unwrap();

        for path in [&empty, &unknown] {
            let err = decompress(&DiskFs, &HufOpts::new(Mode::Unzip, path)).unwrap_err();
            assert!(err.is_format_error());
        }
        assert!(!dir.path().join("unknown").exists());
    }

    #[test]
    fn trailing_bytes_are_ignored_test() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("t.txt");
        write(&input, b"trailing");
        let zipped = compress(&DiskFs, &HufOpts::new(Mode::Zip, &input)).unwrap();

        let mut bytes = std::fs::read(&zipped.archive).unwrap();
        bytes.extend_from_slice(&[9, 9, 9]);
        std::fs::write(&zipped.archive, &bytes).unwrap();

        let mut opts = HufOpts::new(Mode::Unzip, &zipped.archive);
        opts.force_overwrite = true;
        decompress(&DiskFs, &opts).unwrap();
        assert_eq!(std::fs::read(&input).unwrap(), b"trailing");
    }
}

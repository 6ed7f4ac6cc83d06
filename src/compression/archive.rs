//! The three archive layouts. Each begins with one tag byte.
//!
//! - `F` single file: tree, 4-byte bit count, packed content.
//! - `G` folder, one tree: tree, varint file count, then per file the varint path and
//!   content bit lengths followed by the path and the content, each again behind its own
//!   4-byte bit count.
//! - `S` folder, one tree per file: varint file count, then per file its tree, the varint
//!   path and content bit lengths, and the bare packed path and content.
//!
//! The 4-byte counts (little endian, signed 32 bit) are kept for compatibility with
//! existing archives even though `G` also stores the same values as varints.

use std::fmt::{Display, Formatter};
use std::io::{Read, Write};
use std::path::{Component, Path};

use log::{debug, trace};
use rustc_hash::FxHashSet;

use crate::bitstream::bitpacker::{PackedBits, MAX_PREFIXED_BITS};
use crate::error::{HufError, Result};
use crate::huffman_coding::huffman::HuffmanTree;
use crate::huffman_coding::tree_codec::{read_tree, write_tree};
use crate::tools::freq_count::ByteFrequencies;
use crate::tools::varint;

/// Which layout an archive uses, identified by its leading tag byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    Single,
    Global,
    Separate,
}

impl ArchiveKind {
    /// The tag byte that opens this layout.
    pub const fn tag(self) -> u8 {
        match self {
            ArchiveKind::Single => b'F',
            ArchiveKind::Global => b'G',
            ArchiveKind::Separate => b'S',
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            b'F' => Ok(ArchiveKind::Single),
            b'G' => Ok(ArchiveKind::Global),
            b'S' => Ok(ArchiveKind::Separate),
            other => Err(HufError::format(format!(
                "unknown archive tag 0x{:02x}",
                other
            ))),
        }
    }

    /// True for the two folder layouts.
    pub fn is_folder(self) -> bool {
        match self {
            ArchiveKind::Single => false,
            ArchiveKind::Global | ArchiveKind::Separate => true,
        }
    }
}

impl Display for ArchiveKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArchiveKind::Single => "single file",
            ArchiveKind::Global => "global tree",
            ArchiveKind::Separate => "separate trees",
        };
        write!(f, "{} ({})", name, self.tag() as char)
    }
}

/// One file of a folder archive: its `/` separated path relative to the folder, and its bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    pub path: String,
    pub content: Vec<u8>,
}

impl FileRecord {
    pub fn new<P: Into<String>>(path: P, content: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            content,
        }
    }

    /// Bytes this record stands for before compression (path plus content).
    pub fn original_size(&self) -> u64 {
        (self.path.len() + self.content.len()) as u64
    }
}

/// Read the tag byte and return the layout it names.
pub fn read_kind<R: Read>(input: &mut R) -> Result<ArchiveKind> {
    let mut tag = [0_u8; 1];
    match input.read(&mut tag)? {
        0 => Err(HufError::format("archive is empty")),
        _ => ArchiveKind::from_tag(tag[0]),
    }
}

/// Read the tag byte and insist it is the one for `kind`.
fn expect_kind<R: Read>(input: &mut R, kind: ArchiveKind) -> Result<()> {
    let found = read_kind(input)?;
    if found != kind {
        return Err(HufError::format(format!(
            "expected a {} archive, found {}",
            kind, found
        )));
    }
    Ok(())
}

/// Write a single file archive. Empty content cannot be compressed this way.
pub fn write_single<W: Write>(out: &mut W, content: &[u8]) -> Result<()> {
    let freqs = ByteFrequencies::from_bytes(content);
    debug!("Found {} distinct byte values.", freqs.distinct());
    let tree = HuffmanTree::from_frequencies(&freqs)?;
    let expected = expected_bits(&tree, &freqs, "file content", MAX_PREFIXED_BITS)?;
    debug!("Encoding {} bytes into {} bits.", freqs.total(), expected);
    let bits = tree.encode(content)?;

    out.write_all(&[ArchiveKind::Single.tag()])?;
    write_tree(&tree, out)?;
    bits.write_length_prefixed(out, "file content")?;
    trace!("Encoded {} bytes into {} bits.", content.len(), bits.len());
    Ok(())
}

/// Read a single file archive and return the file's bytes.
pub fn read_single<R: Read>(input: &mut R) -> Result<Vec<u8>> {
    expect_kind(input, ArchiveKind::Single)?;
    let tree = read_tree(input)?;
    let bits = PackedBits::read_length_prefixed(input)?;
    if bits.is_empty() {
        return Err(HufError::format("single file archive holds no encoded data"));
    }
    tree.decode(&bits)
}

/// Write a folder archive in the global tree layout: one tree for every path and content.
pub fn write_global<W: Write>(out: &mut W, files: &[FileRecord]) -> Result<()> {
    let count = file_count(files)?;

    // Paths first, then contents. The order does not change the counts.
    let mut freqs = ByteFrequencies::new();
    files.iter().for_each(|f| freqs.add(f.path.as_bytes()));
    files.iter().for_each(|f| freqs.add(&f.content));
    debug!("Found {} distinct byte values across {} files.", freqs.distinct(), count);
    let tree = HuffmanTree::from_frequencies(&freqs)?;

    out.write_all(&[ArchiveKind::Global.tag()])?;
    write_tree(&tree, out)?;
    varint::write(out, count)?;

    for file in files {
        let path_bits = tree.encode(file.path.as_bytes())?;
        let content_bits = tree.encode(&file.content)?;
        varint::write(out, path_bits.bit_len_u32("path")?)?;
        varint::write(out, content_bits.bit_len_u32("file content")?)?;
        path_bits.write_length_prefixed(out, "path")?;
        content_bits.write_length_prefixed(out, "file content")?;
        trace!(
            "  {} ({} bytes): {} + {} bits",
            file.path,
            file.content.len(),
            path_bits.len(),
            content_bits.len()
        );
    }
    Ok(())
}

/// Read a global tree archive, handing each file to `sink` as soon as it is decoded.
/// Files already handed over stay handed over if a later record is damaged.
pub fn read_global<R, F>(input: &mut R, mut sink: F) -> Result<usize>
where
    R: Read,
    F: FnMut(FileRecord) -> Result<()>,
{
    expect_kind(input, ArchiveKind::Global)?;
    let tree = read_tree(input)?;
    let count = varint::read(input)?;
    debug!("Archive lists {} files.", count);

    let mut seen = FxHashSet::default();
    for index in 0..count {
        let path_len = varint::read(input)?;
        let content_len = varint::read(input)?;
        let path_bits = PackedBits::read_length_prefixed(input)?;
        let content_bits = PackedBits::read_length_prefixed(input)?;
        check_len(index, "path", path_len, &path_bits)?;
        check_len(index, "content", content_len, &content_bits)?;

        sink(decode_record(&tree, &path_bits, &content_bits, &mut seen)?)?;
    }
    Ok(count as usize)
}

/// Write a folder archive in the separate trees layout: each file gets a tree built from
/// its own path and content.
pub fn write_separate<W: Write>(out: &mut W, files: &[FileRecord]) -> Result<()> {
    let count = file_count(files)?;

    out.write_all(&[ArchiveKind::Separate.tag()])?;
    varint::write(out, count)?;

    for file in files {
        let mut freqs = ByteFrequencies::from_bytes(file.path.as_bytes());
        freqs.add(&file.content);
        let tree = HuffmanTree::from_frequencies(&freqs)?;
        let tree_bytes = write_tree(&tree, out)?;

        let path_bits = tree.encode(file.path.as_bytes())?;
        let content_bits = tree.encode(&file.content)?;
        varint::write(out, path_bits.bit_len_u32("path")?)?;
        varint::write(out, content_bits.bit_len_u32("file content")?)?;
        path_bits.write_raw(out)?;
        content_bits.write_raw(out)?;
        trace!(
            "  {} ({} bytes): {} byte tree, {} + {} bits",
            file.path,
            file.content.len(),
            tree_bytes,
            path_bits.len(),
            content_bits.len()
        );
    }
    Ok(())
}

/// Read a separate trees archive, handing each file to `sink` as soon as it is decoded.
pub fn read_separate<R, F>(input: &mut R, mut sink: F) -> Result<usize>
where
    R: Read,
    F: FnMut(FileRecord) -> Result<()>,
{
    expect_kind(input, ArchiveKind::Separate)?;
    let count = varint::read(input)?;
    debug!("Archive lists {} files.", count);

    let mut seen = FxHashSet::default();
    for _ in 0..count {
        let tree = read_tree(input)?;
        let path_len = varint::read(input)?;
        let content_len = varint::read(input)?;
        let path_bits = PackedBits::read_raw(input, path_len as usize)?;
        let content_bits = PackedBits::read_raw(input, content_len as usize)?;

        sink(decode_record(&tree, &path_bits, &content_bits, &mut seen)?)?;
    }
    Ok(count as usize)
}

/// Write either folder layout.
pub fn write_folder<W: Write>(out: &mut W, kind: ArchiveKind, files: &[FileRecord]) -> Result<()> {
    match kind {
        ArchiveKind::Global => write_global(out, files),
        ArchiveKind::Separate => write_separate(out, files),
        ArchiveKind::Single => Err(HufError::InvalidInput(
            "a single file archive cannot hold a folder".to_string(),
        )),
    }
}

/// Read either folder layout.
pub fn read_folder<R, F>(input: &mut R, kind: ArchiveKind, sink: F) -> Result<usize>
where
    R: Read,
    F: FnMut(FileRecord) -> Result<()>,
{
    match kind {
        ArchiveKind::Global => read_global(input, sink),
        ArchiveKind::Separate => read_separate(input, sink),
        ArchiveKind::Single => Err(HufError::format(
            "a single file archive does not hold a folder",
        )),
    }
}

/// Check that a path from an archive stays inside the output folder.
pub fn validate_path(path: &str) -> Result<()> {
    let unsafe_path = || HufError::format(format!("unsafe path {:?} in archive", path));
    if path.is_empty() || path.contains('\0') {
        return Err(unsafe_path());
    }
    if path
        .split('/')
        .any(|part| part.is_empty() || part == "." || part == "..")
    {
        return Err(unsafe_path());
    }
    // Catches roots and drive prefixes on platforms that have them
    if !Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(unsafe_path());
    }
    Ok(())
}

/// Size of the encoding before it is built, so oversized input fails before the work.
fn expected_bits(
    tree: &HuffmanTree,
    freqs: &ByteFrequencies,
    what: &'static str,
    limit: usize,
) -> Result<u64> {
    let bits = tree
        .codes()
        .encoded_bits(freqs)
        .ok_or_else(|| {
            HufError::InvalidInput("frequency table holds a byte the tree lacks".to_string())
        })?;
    if bits > limit as u64 {
        return Err(HufError::Oversize { what, bits });
    }
    Ok(bits)
}

fn file_count(files: &[FileRecord]) -> Result<u32> {
    u32::try_from(files.len()).map_err(|_| {
        HufError::InvalidInput(format!("{} files is more than an archive can list", files.len()))
    })
}

/// The varint length of a global archive record must agree with its 4-byte header.
fn check_len(index: u32, what: &str, declared: u32, bits: &PackedBits) -> Result<()> {
    if declared as usize != bits.len() {
        return Err(HufError::format(format!(
            "file {}: {} length {} does not match its header {}",
            index,
            what,
            declared,
            bits.len()
        )));
    }
    Ok(())
}

/// Decode one folder record and check its path.
fn decode_record(
    tree: &HuffmanTree,
    path_bits: &PackedBits,
    content_bits: &PackedBits,
    seen: &mut FxHashSet<String>,
) -> Result<FileRecord> {
    let path = String::from_utf8(tree.decode(path_bits)?)
        .map_err(|_| HufError::format("file path is not valid UTF-8"))?;
    validate_path(&path)?;
    if !seen.insert(path.clone()) {
        return Err(HufError::format(format!("path {:?} appears twice", path)));
    }
    let content = tree.decode(content_bits)?;
    Ok(FileRecord { path, content })
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_files() -> Vec<FileRecord> {
        vec![
            FileRecord::new("readme.txt", b"hello huffman, hello world".to_vec()),
            FileRecord::new("empty.bin", Vec::new()),
            FileRecord::new("sub/dir/copy_a.txt", b"same same same".to_vec()),
            FileRecord::new("sub/dir/copy_b.txt", b"same same same".to_vec()),
            FileRecord::new("sub/bytes.bin", (0..=255).collect()),
        ]
    }

    fn collect<R: Read>(input: &mut R, kind: ArchiveKind) -> Result<Vec<FileRecord>> {
        let mut files = Vec::new();
        read_folder(input, kind, |record| {
            files.push(record);
            Ok(())
        })?;
        Ok(files)
    }

    #[test]
    fn tags_test() {
        assert_eq!(ArchiveKind::Single.tag(), 0x46);
        assert_eq!(ArchiveKind::Global.tag(), 0x47);
        assert_eq!(ArchiveKind::Separate.tag(), 0x53);
        for kind in [ArchiveKind::Single, ArchiveKind::Global, ArchiveKind::Separate] {
            assert_eq!(ArchiveKind::from_tag(kind.tag()).unwrap(), kind);
        }
        assert!(matches!(ArchiveKind::from_tag(b'Z'), Err(HufError::Format(_))));
        assert!(!ArchiveKind::Single.is_folder());
        assert!(ArchiveKind::Separate.is_folder());
    }

    #[test]
    fn single_layout_test() {
        let mut out = Vec::new();
        write_single(&mut out, b"xxxx").unwrap();
        assert_eq!(out, vec![b'F', 0b0011_1100, 0x00, 4, 0, 0, 0, 0x00]);
        assert_eq!(read_single(&mut out.as_slice()).unwrap(), b"xxxx");
    }

    #[test]
    fn single_round_trip_test() {
        let data = b"aaaabbbccd".repeat(50);
        let mut out = Vec::new();
        write_single(&mut out, &data).unwrap();
        assert_eq!(read_single(&mut out.as_slice()).unwrap(), data);
    }

    #[test]
    fn single_rejects_empty_content_test() {
        let mut out = Vec::new();
        assert!(matches!(
            write_single(&mut out, b""),
            Err(HufError::EmptyInput(_))
        ));
    }

    #[test]
    fn global_layout_test() {
        let mut out = Vec::new();
        write_global(&mut out, &[FileRecord::new("a", b"a".to_vec())]).unwrap();
        assert_eq!(
            out,
            vec![b'G', 0x30, 0x80, 1, 1, 1, 1, 0, 0, 0, 0x00, 1, 0, 0, 0, 0x00]
        );
    }

    #[test]
    fn separate_layout_test() {
        let mut out = Vec::new();
        write_separate(&mut out, &[FileRecord::new("a", b"a".to_vec())]).unwrap();
        assert_eq!(out, vec![b'S', 1, 0x30, 0x80, 1, 1, 0x00, 0x00]);
    }

    #[test]
    fn folder_round_trips_test() {
        let files = sample_files();
        for kind in [ArchiveKind::Global, ArchiveKind::Separate] {
            let mut out = Vec::new();
            write_folder(&mut out, kind, &files).unwrap();
            assert_eq!(out[0], kind.tag());
            assert_eq!(collect(&mut out.as_slice(), kind).unwrap(), files);
        }
    }

    #[test]
    fn tag_mismatch_is_format_error_test() {
        let mut out = Vec::new();
        write_separate(&mut out, &sample_files()).unwrap();
        assert!(matches!(
            collect(&mut out.as_slice(), ArchiveKind::Global),
            Err(HufError::Format(_))
        ));
        assert!(matches!(
            read_single(&mut out.as_slice()),
            Err(HufError::Format(_))
        ));
        assert!(write_folder(&mut out, ArchiveKind::Single, &sample_files()).is_err());
    }

    #[test]
    fn global_length_mismatch_is_format_error_test() {
        let mut out = Vec::new();
        write_global(&mut out, &[FileRecord::new("a", b"a".to_vec())]).unwrap();
        // Path varint says 2 bits, its header says 1
        out[4] = 2;
        assert!(matches!(
            collect(&mut out.as_slice(), ArchiveKind::Global),
            Err(HufError::Format(_))
        ));
    }

    #[test]
    fn separate_huge_declared_length_is_format_error_test() {
        // One record, tree for "a", path 1 bit, content claims u32::MAX bits
        let data = [b'S', 1, 0x30, 0x80, 1, 0xff, 0xff, 0xff, 0xff, 0x0f, 0x00, 0x00];
        let err = collect(&mut data.as_slice(), ArchiveKind::Separate).unwrap_err();
        assert!(matches!(err, HufError::Format(_)));
    }

    #[test]
    fn expected_bits_test() {
        let freqs = ByteFrequencies::from_bytes(b"aaaabbbccd");
        let tree = HuffmanTree::from_frequencies(&freqs).unwrap();
        assert_eq!(expected_bits(&tree, &freqs, "test", 19).unwrap(), 19);
        let err = expected_bits(&tree, &freqs, "test", 18).unwrap_err();
        assert!(matches!(err, HufError::Oversize { bits: 19, .. }));
    }

    #[test]
    fn truncated_folder_keeps_earlier_files_test() {
        let files = sample_files();
        let mut out = Vec::new();
        write_separate(&mut out, &files).unwrap();
        out.truncate(out.len() - 10);

        let mut delivered = Vec::new();
        let result = read_separate(&mut out.as_slice(), |record| {
            delivered.push(record);
            Ok(())
        });
        assert!(matches!(result, Err(HufError::Format(_))));
        assert_eq!(delivered, files[..files.len() - 1].to_vec());
    }

    #[test]
    fn unsafe_and_duplicate_paths_are_rejected_test() {
        for bad in [
            vec![FileRecord::new("../escape", b"x".to_vec())],
            vec![FileRecord::new("/etc/passwd", b"x".to_vec())],
            vec![FileRecord::new("a//b", b"x".to_vec())],
            vec![
                FileRecord::new("twice", b"x".to_vec()),
                FileRecord::new("twice", b"y".to_vec()),
            ],
        ] {
            let mut out = Vec::new();
            write_global(&mut out, &bad).unwrap();
            assert!(matches!(
                collect(&mut out.as_slice(), ArchiveKind::Global),
                Err(HufError::Format(_))
            ));
        }
    }

    #[test]
    fn validate_path_test() {
        assert!(validate_path("a/b/c.txt").is_ok());
        assert!(validate_path(".hidden").is_ok());
        assert!(validate_path("").is_err());
        assert!(validate_path("a/./b").is_err());
        assert!(validate_path("a/").is_err());
    }

    #[test]
    fn read_kind_test() {
        assert_eq!(
            read_kind(&mut [b'S', 0].as_slice()).unwrap(),
            ArchiveKind::Separate
        );
        let empty: [u8; 0] = [];
        assert!(matches!(
            read_kind(&mut empty.as_slice()),
            Err(HufError::Format(_))
        ));
    }
}

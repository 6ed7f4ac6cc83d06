use std::path::PathBuf;
use std::{fmt::Display, fmt::Formatter};

use clap::Parser;
use log::{info, LevelFilter};

use crate::compression::strategy::Strategy;

/// Verbosity of user information
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Errors,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Errors => LevelFilter::Error,
            Verbosity::Info => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
            Verbosity::Trace => LevelFilter::Trace,
        }
    }
}

/// Zip or Unzip
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Zip,
    Unzip,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Everything the user can set to control program behavior.
#[derive(Clone, Debug)]
pub struct HufOpts {
    /// Compress or decompress
    pub op_mode: Mode,
    /// File or folder to compress, or archive to decompress
    pub path: PathBuf,
    /// Folder layout choice
    pub strategy: Strategy,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Verbosity of user information
    pub verbose: Verbosity,
}

impl HufOpts {
    pub fn new(op_mode: Mode, path: impl Into<PathBuf>) -> Self {
        Self {
            op_mode,
            path: path.into(),
            strategy: Strategy::Auto,
            force_overwrite: false,
            verbose: Verbosity::Info,
        }
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    name = "hufzip",
    version,
    about = "A huffman coding file and folder compressor",
    long_about = "
    Compresses a single file into FILE.huf, or a whole folder into FOLDER.huf.
    Folders are encoded twice, once with a single shared huffman tree and once with
    a tree per file, and the smaller archive is kept.

    Decompression reads the archive tag and restores the file or folder next to it."
)]
pub struct HufArgs {
    /// Compress a file or folder into <PATH>.huf
    #[clap(
        short = 'c',
        long = "compress",
        value_name = "PATH",
        parse(from_os_str),
        conflicts_with = "decompress",
        required_unless_present = "decompress"
    )]
    compress: Option<PathBuf>,

    /// Decompress <ARCHIVE>.huf
    #[clap(short = 'd', long = "decompress", value_name = "ARCHIVE", parse(from_os_str))]
    decompress: Option<PathBuf>,

    /// Folder layout: auto keeps the smaller of global and separate
    #[clap(long = "strategy", default_value = "auto", value_name = "auto|global|separate")]
    strategy: Strategy,

    /// Overwrite an existing output file
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Sets verbosity. -v adds per-file detail, -vv is chatty
    #[clap(short = 'v', long = "verbose", parse(from_occurrences))]
    verbose: u64,

    /// Only report errors
    #[clap(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,
}

impl HufArgs {
    /// Put command line information from CLAP into our internal structure.
    pub fn into_opts(self) -> Result<HufOpts, clap::Error> {
        let (op_mode, path) = match (self.compress, self.decompress) {
            (Some(path), None) => (Mode::Zip, path),
            (None, Some(path)) => (Mode::Unzip, path),
            _ => {
                return Err(clap::Error::raw(
                    clap::ErrorKind::ArgumentConflict,
                    "exactly one of --compress or --decompress is required\n",
                ))
            }
        };
        let verbose = match (self.quiet, self.verbose) {
            (true, _) => Verbosity::Errors,
            (false, 0) => Verbosity::Info,
            (false, 1) => Verbosity::Debug,
            (false, _) => Verbosity::Trace,
        };
        Ok(HufOpts {
            op_mode,
            path,
            strategy: self.strategy,
            force_overwrite: self.force,
            verbose,
        })
    }
}

/// Parse an explicit argument list (the first item is the program name).
pub fn hufopts_from<I, T>(args: I) -> Result<HufOpts, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    HufArgs::try_parse_from(args)?.into_opts()
}

/// Parse the process arguments, set the log level, and report the settings.
pub fn hufopts_init() -> Result<HufOpts, clap::Error> {
    let opts = HufArgs::try_parse()?.into_opts()?;

    // Set the log level
    log::set_max_level(opts.verbose.level_filter());

    info!("---- hufzip {} ----", env!("CARGO_PKG_VERSION"));
    info!("Operational mode set to {}", opts.op_mode);
    info!("Input is {}", opts.path.display());
    if opts.op_mode == Mode::Zip {
        info!("Folder strategy set to {}", opts.strategy);
    }
    if opts.force_overwrite {
        info!("Forcing file overwriting")
    };
    Ok(opts)
}

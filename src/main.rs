//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::process;

use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use hufzip::compression::{compress::compress, decompress::decompress};
use hufzip::tools::cli::{hufopts_init, Mode};
use hufzip::tools::fs::DiskFs;

fn main() {
    // Available log levels are Error, Warn, Info, Debug, Trace. The real level is set from the
    // command line once it is parsed.
    if let Err(e) = TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("Unable to start the logger: {}", e);
    }

    let options = match hufopts_init() {
        Ok(options) => options,
        Err(e) => {
            // Help and version requests also arrive here, on stdout with a zero exit code.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    //----- Figure how what we need to do and go do it
    let result = match options.op_mode {
        Mode::Zip => compress(&DiskFs, &options).map(|_| ()),
        Mode::Unzip => decompress(&DiskFs, &options).map(|_| ()),
    };

    match result {
        Ok(()) => info!("Done.\n"),
        Err(e) => {
            error!("{}", e);
            if options.op_mode == Mode::Unzip && e.is_format_error() {
                error!(
                    "{} is damaged or is not a hufzip archive.",
                    options.path.display()
                );
            }
            process::exit(e.exit_code());
        }
    }
}

// Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

mod regfile_gen;

#[derive(Parser)]
#[command(author, version, about, long_about = None, name = "cargo xtask")]
struct Xtask {
    /// Log pipeline progress
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    xtask: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a register file definition without generating anything
    RegfileCheck {
        /// Definition file (.toml or .json)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Generate code or documentation from a register file definition
    RegfileGen {
        /// Definition file (.toml or .json)
        #[arg(short, long)]
        file: PathBuf,

        /// Output target: c-header (c, h), rust (rs) or markdown (md)
        #[arg(short, long, default_value = "c-header")]
        target: String,

        /// Output file (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Identifier prefix, replacing the one derived from the file name
        #[arg(long)]
        prefix: Option<String>,

        /// Additional suffixes to strip from the file name (can be repeated)
        #[arg(long = "strip-suffix")]
        strip_suffixes: Vec<String>,

        /// Prefixes to strip from the file name (can be repeated)
        #[arg(long = "strip-prefix")]
        strip_prefixes: Vec<String>,

        /// Disable default suffix stripping (_regs, _reg, _csr, ...)
        #[arg(long)]
        no_default_strip: bool,

        /// Omit the provenance banner (generator, source, timestamp)
        #[arg(long)]
        no_stamp: bool,
    },
}

fn main() {
    let cli = Xtask::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(err) = SimpleLogger::new().with_level(level).env().init() {
        eprintln!("Failed to initialize logging: {err}");
    }

    let result = match &cli.xtask {
        Commands::RegfileCheck { file } => regfile_gen::check(file),
        Commands::RegfileGen {
            file,
            target,
            output,
            prefix,
            strip_suffixes,
            strip_prefixes,
            no_default_strip,
            no_stamp,
        } => regfile_gen::generate(
            file,
            target,
            output.as_deref(),
            &regfile_gen::NameOptions {
                prefix: prefix.as_deref(),
                strip_suffixes,
                strip_prefixes,
                no_default_strip: *no_default_strip,
            },
            !*no_stamp,
        ),
    };
    result.unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

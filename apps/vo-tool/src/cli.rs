use std::path::PathBuf;

use clap::{Parser, Subcommand};
use votable_core::Pedantic;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Strictness: exception, warn or ignore (overrides config and environment)
    #[arg(long, global = true)]
    pub pedantic: Option<Pedantic>,

    /// Parser configuration file (JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the converter built for every field of a schema
    Inspect {
        /// Schema file (JSON list of fields)
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Convert tab-separated TABLEDATA rows into a BINARY stream
    Encode {
        /// Schema file (JSON list of fields)
        #[arg(short, long)]
        schema: PathBuf,

        /// Input file, one row per line, cells separated by tabs
        #[arg(short, long)]
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Write BINARY2 (per-row null bitmask) instead of BINARY
        #[arg(long)]
        binary2: bool,

        /// Write the stream base64-encoded
        #[arg(long)]
        base64: bool,
    },

    /// Convert a BINARY stream into TABLEDATA
    Decode {
        /// Schema file (JSON list of fields)
        #[arg(short, long)]
        schema: PathBuf,

        /// Input stream
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read BINARY2 (per-row null bitmask) instead of BINARY
        #[arg(long)]
        binary2: bool,

        /// Input is base64-encoded
        #[arg(long)]
        base64: bool,

        /// Write a <TABLEDATA> XML fragment instead of tab-separated rows
        #[arg(long)]
        tabledata: bool,
    },
}

//! CLI tool for VOTable table data.
//!
//! Provides commands for:
//! - Inspecting the converters built for a schema
//! - Encoding tab-separated TABLEDATA rows as BINARY or BINARY2
//! - Decoding BINARY or BINARY2 streams back into TABLEDATA

mod cli;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use votable_core::xml::unescape_cdata;
use votable_core::{decode_base64, encode_base64, ParserConfig, Reporter, Schema, TableCodec};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = load_config(&cli)?;
    tracing::debug!(
        "Parser config: pedantic={}, max_warnings={}",
        config.pedantic,
        config.max_warnings
    );

    match cli.command {
        Commands::Inspect { schema } => inspect(&schema, config),
        Commands::Encode {
            schema,
            input,
            output,
            binary2,
            base64,
        } => encode(&schema, &input, &output, binary2, base64, config),
        Commands::Decode {
            schema,
            input,
            output,
            binary2,
            base64,
            tabledata,
        } => decode(
            &schema,
            &input,
            output.as_deref(),
            DecodeOptions {
                binary2,
                base64,
                tabledata,
            },
            config,
        ),
    }
}

/// Builds the parser configuration: file, then environment, then flags.
fn load_config(cli: &Cli) -> Result<ParserConfig> {
    let mut config = match &cli.config {
        Some(path) => ParserConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ParserConfig::default(),
    };
    config.apply_env_overrides()?;
    if let Some(pedantic) = cli.pedantic {
        config.pedantic = pedantic;
    }
    Ok(config)
}

fn load_codec(schema: &Path, config: ParserConfig) -> Result<TableCodec> {
    let schema = Schema::from_file(schema)
        .with_context(|| format!("Failed to load schema {}", schema.display()))?;
    Ok(TableCodec::new(schema, Reporter::new(config))?)
}

fn report_warnings(codec: &TableCodec) {
    let total = codec.reporter().total();
    if total > 0 {
        tracing::info!("{} conformance warnings raised", total);
    }
}

fn inspect(schema: &Path, config: ParserConfig) -> Result<()> {
    let codec = load_codec(schema, config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "{:<20} {:<14} {:<10} {:<12} {:<9} width",
        "field", "datatype", "arraysize", "shape", "variable"
    )?;
    for (field, converter) in codec.schema().fields.iter().zip(codec.converters()) {
        let width = match converter.binary_width() {
            Some(width) => width.to_string(),
            None => "-".to_string(),
        };
        writeln!(
            out,
            "{:<20} {:<14} {:<10} {:<12} {:<9} {}",
            field.id,
            converter.datatype(),
            field.arraysize.as_deref().unwrap_or("-"),
            format!("{:?}", converter.shape()),
            converter.is_variable(),
            width
        )?;
    }
    report_warnings(&codec);
    Ok(())
}

/// Splits a tab-separated file into rows of raw cell strings.
///
/// Blank lines are skipped.
fn read_tsv(content: &str) -> Vec<Vec<&str>> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('\t').collect())
        .collect()
}

fn encode(
    schema: &Path,
    input: &Path,
    output: &Path,
    binary2: bool,
    base64: bool,
    config: ParserConfig,
) -> Result<()> {
    let codec = load_codec(schema, config)?;
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let rows = codec.parse_rows(&read_tsv(&content))?;

    let data = if binary2 {
        codec.encode_binary2(&rows)?
    } else {
        codec.encode_binary(&rows)?
    };

    if base64 {
        fs::write(output, encode_base64(&data))?;
    } else {
        fs::write(output, &data)?;
    }

    tracing::info!(
        "Encoded {} rows ({} bytes) to {}",
        rows.len(),
        data.len(),
        output.display()
    );
    report_warnings(&codec);
    Ok(())
}

struct DecodeOptions {
    binary2: bool,
    base64: bool,
    tabledata: bool,
}

fn decode(
    schema: &Path,
    input: &Path,
    output: Option<&Path>,
    options: DecodeOptions,
    config: ParserConfig,
) -> Result<()> {
    let codec = load_codec(schema, config)?;
    let raw = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let data = if options.base64 {
        let text = String::from_utf8(raw).context("base64 input is not valid UTF-8")?;
        decode_base64(&text)?
    } else {
        raw
    };

    let rows = if options.binary2 {
        codec.decode_binary2(&data)?
    } else {
        codec.decode_binary(&data)?
    };

    let mut buffer = Vec::new();
    if options.tabledata {
        codec.write_tabledata(&rows, &mut buffer)?;
    } else {
        // TSV cells are raw text; only TABLEDATA keeps the XML escapes.
        for (idx, row) in rows.iter().enumerate() {
            let cells = codec.output_row(row, idx)?;
            let raw: Vec<_> = cells.iter().map(|cell| unescape_cdata(cell)).collect();
            writeln!(buffer, "{}", raw.join("\t"))?;
        }
    }

    match output {
        Some(path) => fs::write(path, &buffer)?,
        None => io::stdout().lock().write_all(&buffer)?,
    }

    tracing::info!("Decoded {} rows", rows.len());
    report_warnings(&codec);
    Ok(())
}

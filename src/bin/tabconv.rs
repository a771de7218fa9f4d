//! Convert records between CSV, TSV and LTSV.
//!
//! Usage:
//!   tabconv -f ltsv -t csv access.log > access.csv
//!   tabconv -f csv -t ltsv --fields id,name -o out.ltsv a.csv b.csv
//!   cat data.tsv | tabconv -f tsv -t csv --input-encoding utf-8
//!
//! Inputs default to stdin (`-`); output defaults to stdout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use encoding_rs::Encoding;
use tabconv::cli;
use tabconv::encoding;
use tabconv::formats::STDIN_PATH;
use tabconv::pipeline::parse_fieldnames;
use tabconv::{convert, ConvertOptions, Dialect, Source};
use tracing::debug;

/// Command-line arguments for `tabconv`.
#[derive(Debug, Parser)]
#[command(
    name = "tabconv",
    version,
    about = "Convert tabular records between csv, tsv and ltsv",
    after_help = "Formats: csv, tsv, csv:excel, tsv:excel, ltsv"
)]
struct Args {
    /// Input format.
    #[arg(short = 'f', long = "from", value_name = "FORMAT")]
    from: String,

    /// Output format.
    #[arg(short = 't', long = "to", value_name = "FORMAT")]
    to: String,

    /// Input encoding (default: shift_jis for csv/tsv, utf-8 for ltsv).
    #[arg(long = "input-encoding", value_name = "ENCODING")]
    input_encoding: Option<String>,

    /// Output encoding (default: shift_jis for csv/tsv, utf-8 for ltsv).
    #[arg(long = "output-encoding", value_name = "ENCODING")]
    output_encoding: Option<String>,

    /// Output file (default: stdout).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<String>,

    /// Comma-separated field names to output, in order.
    #[arg(long = "fields", value_name = "NAMES")]
    fields: Option<String>,

    /// Do not write a header row for csv/tsv output.
    #[arg(short = 'n', long = "no-header")]
    no_header: bool,

    /// Input files; `-` reads stdin.
    #[arg(value_name = "FILE", default_value = STDIN_PATH)]
    inputs: Vec<String>,
}

fn main() -> ExitCode {
    cli::init_tracing();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => cli::report("tabconv", &err),
    }
}

fn resolve_encoding(
    label: Option<&str>,
    dialect: &Dialect,
) -> tabconv::Result<&'static Encoding> {
    label.map_or(Ok(dialect.default_encoding()), encoding::lookup)
}

fn run(args: &Args) -> anyhow::Result<()> {
    let from = Dialect::lookup(&args.from).context("--from")?;
    let to = Dialect::lookup(&args.to).context("--to")?;
    let input_encoding =
        resolve_encoding(args.input_encoding.as_deref(), from).context("--input-encoding")?;
    let output_encoding =
        resolve_encoding(args.output_encoding.as_deref(), to).context("--output-encoding")?;

    let mut options = ConvertOptions::new().with_header(!args.no_header);
    if let Some(fields) = &args.fields {
        options = options.with_fieldnames(parse_fieldnames(fields));
    }

    let mut sources = args
        .inputs
        .iter()
        .map(|path| {
            Source::open(path, from, input_encoding).with_context(|| format!("cannot open {path}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let output: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("cannot create {path}"))?;
            Box::new(BufWriter::new(file))
        },
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    debug!(
        from = %from,
        to = %to,
        input_encoding = input_encoding.name(),
        output_encoding = output_encoding.name(),
        inputs = sources.len(),
        "converting"
    );
    let summary = convert(&mut sources, output, to, output_encoding, &options)?;
    debug!(
        sources = summary.sources,
        records = summary.records,
        "done"
    );
    Ok(())
}

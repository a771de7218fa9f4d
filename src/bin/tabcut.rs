//! Cut columns out of a delimited stream.
//!
//! Usage:
//!   tabcut -f 1,3-5 < input.csv > output.csv
//!   tabcut -f 2 -d tsv < input.tsv
//!
//! Rows are read from stdin and written to stdout in the same dialect.
//! Fields are copied as raw bytes, so the input encoding passes through.

use std::io::{self, BufWriter};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use csv::ByteRecord;
use tabconv::cli;
use tabconv::{Dialect, FieldSpec, RowProjector, TabError};
use tracing::debug;

/// Command-line arguments for `tabcut`.
#[derive(Debug, Parser)]
#[command(
    name = "tabcut",
    version,
    about = "Select and reorder columns of CSV/TSV read from stdin"
)]
struct Args {
    /// Columns to keep, 1-based: numbers and ranges such as `1,3-5,2`.
    #[arg(short = 'f', long = "fields", value_name = "FIELDSPEC")]
    fields: String,

    /// Delimited dialect of both input and output.
    #[arg(
        short = 'd',
        long = "dialect",
        default_value = "csv",
        value_parser = ["csv", "tsv", "csv:excel", "tsv:excel"]
    )]
    dialect: String,
}

fn main() -> ExitCode {
    cli::init_tracing();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => cli::report("tabcut", &err),
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let spec = FieldSpec::parse(&args.fields)?;
    let dialect = Dialect::lookup(&args.dialect)?;
    let rules = dialect
        .delimited_rules()
        .with_context(|| format!("{dialect} is not a delimited format"))?;
    let projector = RowProjector::new(spec);
    debug!(columns = projector.spec().len(), dialect = %dialect, "cutting columns");

    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    let mut reader = rules.reader_builder(false).from_reader(stdin);
    let mut writer = rules.writer_builder().from_writer(stdout);

    let mut row = ByteRecord::new();
    let mut rows = 0usize;
    while reader.read_byte_record(&mut row).map_err(TabError::read)? {
        writer
            .write_byte_record(&projector.project_record(&row))
            .map_err(TabError::write)?;
        rows += 1;
    }
    writer.flush().map_err(TabError::SinkWriteError)?;

    debug!(rows, "done");
    Ok(())
}

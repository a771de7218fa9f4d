//! Conversion pipeline: many sources into one sink.
//!
//! Sources are drained in the order given. Delimited output needs its
//! header before the first row, so unless an explicit field list is
//! supplied, every source is scanned first and the union of their field
//! names (first-seen order) becomes the header.
//!
//! ```
//! use tabconv::dialect::Dialect;
//! use tabconv::formats::Source;
//! use tabconv::pipeline::{convert, ConvertOptions};
//! use std::io::Cursor;
//!
//! let ltsv = Dialect::lookup("ltsv")?;
//! let csv = Dialect::lookup("csv")?;
//! let mut sources = vec![
//!     Source::from_seekable(Cursor::new(b"a:1\tb:2\n".to_vec()), ltsv, encoding_rs::UTF_8)?,
//!     Source::from_seekable(Cursor::new(b"b:3\tc:4\n".to_vec()), ltsv, encoding_rs::UTF_8)?,
//! ];
//!
//! let mut output = Vec::new();
//! let options = ConvertOptions::default();
//! let summary = convert(&mut sources, &mut output, csv, encoding_rs::UTF_8, &options)?;
//! assert_eq!(summary.records, 2);
//! assert_eq!(String::from_utf8(output).unwrap(), "a,b,c\r\n1,2,\r\n,3,4\r\n");
//! # Ok::<(), tabconv::TabError>(())
//! ```

use std::io::Write;

use encoding_rs::Encoding;
use indexmap::IndexSet;
use tracing::debug;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::formats::{RecordSink, RecordSource, Sink, Source};

/// Per-run conversion settings.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    fieldnames: Option<Vec<String>>,
    write_header: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            fieldnames: None,
            write_header: true,
        }
    }
}

impl ConvertOptions {
    /// Create options with auto-discovered fields and a header row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict and order output to these field names.
    ///
    /// Also used as the delimited header, which skips the field-name scan.
    #[must_use]
    pub fn with_fieldnames(mut self, fieldnames: Vec<String>) -> Self {
        self.fieldnames = Some(fieldnames);
        self
    }

    /// Enable or disable the header row of delimited output.
    #[must_use]
    pub fn with_header(mut self, write_header: bool) -> Self {
        self.write_header = write_header;
        self
    }

    /// The explicit field list, if any.
    #[must_use]
    pub fn fieldnames(&self) -> Option<&[String]> {
        self.fieldnames.as_deref()
    }

    /// Whether delimited output gets a header row.
    #[must_use]
    pub fn write_header(&self) -> bool {
        self.write_header
    }
}

/// Split a comma-separated field-name list as given on the command line.
///
/// ```
/// use tabconv::pipeline::parse_fieldnames;
///
/// assert_eq!(parse_fieldnames("id,name"), vec!["id", "name"]);
/// ```
#[must_use]
pub fn parse_fieldnames(list: &str) -> Vec<String> {
    list.split(',').map(ToString::to_string).collect()
}

/// Outcome of a conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSummary {
    /// Number of input sources drained.
    pub sources: usize,
    /// Number of records written.
    pub records: usize,
}

/// Union of the field names of all sources, in first-seen order.
///
/// # Errors
///
/// Returns an error if scanning any source fails.
pub fn union_fieldnames(sources: &mut [Source]) -> Result<Vec<String>> {
    let mut union = IndexSet::new();
    for source in sources.iter_mut() {
        for name in source.all_fieldnames()? {
            union.insert(name);
        }
    }
    Ok(union.into_iter().collect())
}

/// Convert every record of `sources`, in order, to `output`.
///
/// The explicit field list in `options`, when present, reduces each record
/// to exactly those fields (missing ones become absent). Otherwise
/// delimited output uses [`union_fieldnames`] as its columns, and LTSV
/// output writes each record as read without scanning.
///
/// # Errors
///
/// Returns the first read or write error; output written so far is
/// flushed on a best-effort basis when the sink is dropped.
pub fn convert<W: Write>(
    sources: &mut [Source],
    output: W,
    dialect: &Dialect,
    encoding: &'static Encoding,
    options: &ConvertOptions,
) -> Result<ConvertSummary> {
    let columns = match options.fieldnames() {
        Some(names) => names.to_vec(),
        None if dialect.has_header() => union_fieldnames(sources)?,
        None => Vec::new(),
    };
    debug!(
        output = %dialect,
        columns = columns.len(),
        explicit = options.fieldnames().is_some(),
        "starting conversion"
    );

    let mut sink =
        Sink::new(output, dialect, encoding, columns).with_header(options.write_header());

    for source in sources.iter_mut() {
        while let Some(record) = source.read_record()? {
            match options.fieldnames() {
                Some(names) => sink.write_record(&record.project(names))?,
                None => sink.write_record(&record)?,
            }
        }
        debug!(records = source.records_read(), "source drained");
    }
    sink.finish()?;

    Ok(ConvertSummary {
        sources: sources.len(),
        records: sink.records_written(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;
    use std::io::Cursor;

    fn source(dialect: &str, data: &str) -> Source {
        let dialect = Dialect::lookup(dialect).unwrap();
        Source::from_seekable(Cursor::new(data.as_bytes().to_vec()), dialect, UTF_8).unwrap()
    }

    fn streamed(dialect: &str, data: &str) -> Source {
        let dialect = Dialect::lookup(dialect).unwrap();
        Source::from_reader(Cursor::new(data.as_bytes().to_vec()), dialect, UTF_8)
    }

    fn run(sources: &mut [Source], to: &str, options: &ConvertOptions) -> String {
        let mut output = Vec::new();
        convert(sources, &mut output, Dialect::lookup(to).unwrap(), UTF_8, options).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_union_fieldnames_first_seen_order() {
        let mut sources = vec![source("ltsv", "a:1\tb:2\n"), source("ltsv", "b:3\tc:4\n")];
        assert_eq!(union_fieldnames(&mut sources).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_union_across_formats() {
        let mut sources = vec![source("csv", "x,y\n1,2\n"), streamed("ltsv", "y:3\tz:4\n")];
        assert_eq!(union_fieldnames(&mut sources).unwrap(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_ltsv_to_csv_discovers_header() {
        let mut sources = vec![streamed("ltsv", "a:1\tb:2\nb:3\tc:4\n")];
        let output = run(&mut sources, "csv", &ConvertOptions::default());
        assert_eq!(output, "a,b,c\r\n1,2,\r\n,3,4\r\n");
    }

    #[test]
    fn test_csv_to_ltsv() {
        let mut sources = vec![source("csv", "a,b\n1,2\n3\n")];
        let output = run(&mut sources, "ltsv", &ConvertOptions::default());
        assert_eq!(output, "a:1\tb:2\na:3\tb:\n");
    }

    #[test]
    fn test_explicit_fieldnames_project_and_order() {
        let mut sources = vec![source("ltsv", "a:1\tb:2\tc:3\n")];
        let options = ConvertOptions::new().with_fieldnames(parse_fieldnames("c,a,z"));
        let output = run(&mut sources, "tsv", &options);
        assert_eq!(output, "c\ta\tz\r\n3\t1\t\r\n");
    }

    #[test]
    fn test_explicit_fieldnames_for_ltsv_output() {
        let mut sources = vec![source("csv", "a,b\n1,2\n")];
        let options = ConvertOptions::new().with_fieldnames(parse_fieldnames("b"));
        assert_eq!(run(&mut sources, "ltsv", &options), "b:2\n");
    }

    #[test]
    fn test_header_suppression() {
        let mut sources = vec![source("ltsv", "a:1\n")];
        let options = ConvertOptions::new().with_header(false);
        assert_eq!(run(&mut sources, "csv", &options), "1\r\n");
    }

    #[test]
    fn test_sources_concatenated_in_order() {
        let mut sources = vec![source("csv", "n\n1\n2\n"), source("tsv", "n\n3\n")];
        let output = run(&mut sources, "csv", &ConvertOptions::default());
        assert_eq!(output, "n\r\n1\r\n2\r\n3\r\n");
    }

    #[test]
    fn test_ltsv_output_skips_scan_of_streamed_input() {
        let mut sources = vec![streamed("ltsv", "a:1\nb:2\n")];
        let mut output = Vec::new();
        let summary = convert(
            &mut sources,
            &mut output,
            Dialect::lookup("ltsv").unwrap(),
            UTF_8,
            &ConvertOptions::default(),
        )
        .unwrap();
        assert_eq!(summary, ConvertSummary { sources: 1, records: 2 });
        match &sources[0] {
            Source::BufferedLtsv(source) => assert_eq!(source.buffered_len(), 0),
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn test_no_sources_writes_empty_header() {
        let mut sources: Vec<Source> = Vec::new();
        let options = ConvertOptions::new().with_fieldnames(parse_fieldnames("a,b"));
        assert_eq!(run(&mut sources, "csv", &options), "a,b\r\n");
    }
}

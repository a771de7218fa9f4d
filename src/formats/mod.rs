//! Record sources and sinks for every supported dialect.
//!
//! All formats implement the same traits, allowing format-agnostic code.
//! The concrete strategy is picked from the [`Dialect`] and, for LTSV
//! input, from whether the stream can seek.
//!
//! # Supported Formats
//!
//! | Format | Module | Source | Sink |
//! |--------|--------|--------|------|
//! | CSV / TSV | [`delimited`] | [`DelimitedSource`] | [`DelimitedSink`] |
//! | LTSV | [`ltsv`] | [`RewindableLtsvSource`], [`BufferedLtsvSource`] | [`LtsvSink`] |
//!
//! # Format-Agnostic Processing
//!
//! ```
//! use tabconv::dialect::Dialect;
//! use tabconv::formats::{Sink, Source, RecordSink, RecordSource};
//! use std::io::Cursor;
//!
//! let csv = Dialect::lookup("csv")?;
//! let ltsv = Dialect::lookup("ltsv")?;
//!
//! let input = Cursor::new(b"a,b\n1,2\n".to_vec());
//! let mut source = Source::from_seekable(input, csv, encoding_rs::UTF_8)?;
//! let mut output = Vec::new();
//! let mut sink = Sink::new(&mut output, ltsv, encoding_rs::UTF_8, Vec::new());
//! while let Some(record) = source.read_record()? {
//!     sink.write_record(&record)?;
//! }
//! sink.finish()?;
//! drop(sink);
//! assert_eq!(output, b"a:1\tb:2\n");
//! # Ok::<(), tabconv::TabError>(())
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, Write};
use std::path::Path;

use encoding_rs::Encoding;
use tracing::debug;

pub mod delimited;
pub mod ltsv;
mod traits;

pub use delimited::{DelimitedSink, DelimitedSource};
pub use ltsv::{BufferedLtsvSource, LtsvSink, RewindableLtsvSource};
pub use traits::{RecordIterator, RecordSink, RecordSource, RecordSourceExt};

use crate::dialect::{Dialect, Format};
use crate::error::{Result, TabError};
use crate::record::Record;

/// Path that stands for standard input.
pub const STDIN_PATH: &str = "-";

/// A readable, seekable byte stream.
pub trait SeekableRead: BufRead + Seek {}

impl<T: BufRead + Seek> SeekableRead for T {}

/// A record source of any supported dialect.
pub enum Source {
    /// CSV or TSV input.
    Delimited(DelimitedSource<Box<dyn BufRead>>),
    /// LTSV input that can seek back for field-name scans.
    RewindableLtsv(RewindableLtsvSource<Box<dyn SeekableRead>>),
    /// LTSV input that buffers in memory for field-name scans.
    BufferedLtsv(BufferedLtsvSource<Box<dyn BufRead>>),
}

impl Source {
    /// Build a source over a stream that cannot seek.
    pub fn from_reader<R: BufRead + 'static>(
        reader: R,
        dialect: &Dialect,
        encoding: &'static Encoding,
    ) -> Self {
        let reader: Box<dyn BufRead> = Box::new(reader);
        match dialect.format() {
            Format::Delimited(rules) => {
                Source::Delimited(DelimitedSource::new(reader, rules, encoding))
            },
            Format::Ltsv => Source::BufferedLtsv(BufferedLtsvSource::new(reader, encoding)),
        }
    }

    /// Build a source over a seekable stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream position cannot be queried.
    pub fn from_seekable<R: BufRead + Seek + 'static>(
        reader: R,
        dialect: &Dialect,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        Ok(match dialect.format() {
            Format::Delimited(rules) => {
                let reader: Box<dyn BufRead> = Box::new(reader);
                Source::Delimited(DelimitedSource::new(reader, rules, encoding))
            },
            Format::Ltsv => {
                let reader: Box<dyn SeekableRead> = Box::new(reader);
                Source::RewindableLtsv(RewindableLtsvSource::new(reader, encoding)?)
            },
        })
    }

    /// Open a path, or standard input for `-`.
    ///
    /// Files that refuse to report a stream position (pipes, character
    /// devices) are treated like standard input.
    ///
    /// # Errors
    ///
    /// Returns [`TabError::SourceReadError`] if the file cannot be opened.
    pub fn open(path: &str, dialect: &Dialect, encoding: &'static Encoding) -> Result<Self> {
        if path == STDIN_PATH {
            debug!(dialect = %dialect, "reading standard input");
            // Lock per read so a repeated `-` sees the drained stream.
            let stdin = BufReader::new(io::stdin());
            return Ok(Source::from_reader(stdin, dialect, encoding));
        }

        let mut file = File::open(Path::new(path)).map_err(TabError::SourceReadError)?;
        if file.stream_position().is_ok() {
            debug!(path, dialect = %dialect, "opened seekable input");
            Source::from_seekable(BufReader::new(file), dialect, encoding)
        } else {
            debug!(path, dialect = %dialect, "opened non-seekable input");
            Ok(Source::from_reader(BufReader::new(file), dialect, encoding))
        }
    }

    /// Whether field-name scans can seek instead of buffering.
    #[must_use]
    pub fn is_rewindable(&self) -> bool {
        !matches!(self, Source::BufferedLtsv(_))
    }
}

impl RecordSource for Source {
    fn read_record(&mut self) -> Result<Option<Record>> {
        match self {
            Source::Delimited(source) => source.read_record(),
            Source::RewindableLtsv(source) => source.read_record(),
            Source::BufferedLtsv(source) => source.read_record(),
        }
    }

    fn all_fieldnames(&mut self) -> Result<Vec<String>> {
        match self {
            Source::Delimited(source) => source.all_fieldnames(),
            Source::RewindableLtsv(source) => source.all_fieldnames(),
            Source::BufferedLtsv(source) => source.all_fieldnames(),
        }
    }

    fn records_read(&self) -> usize {
        match self {
            Source::Delimited(source) => source.records_read(),
            Source::RewindableLtsv(source) => source.records_read(),
            Source::BufferedLtsv(source) => source.records_read(),
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Delimited(source) => fmt::Debug::fmt(source, f),
            Source::RewindableLtsv(source) => fmt::Debug::fmt(source, f),
            Source::BufferedLtsv(source) => fmt::Debug::fmt(source, f),
        }
    }
}

/// A record sink of any supported dialect.
pub enum Sink<W: Write> {
    /// CSV or TSV output.
    Delimited(DelimitedSink<W>),
    /// LTSV output.
    Ltsv(LtsvSink<W>),
}

impl<W: Write> Sink<W> {
    /// Build a sink for `dialect`.
    ///
    /// `fieldnames` gives the column order and header of delimited output;
    /// LTSV output ignores it.
    pub fn new(
        writer: W,
        dialect: &Dialect,
        encoding: &'static Encoding,
        fieldnames: Vec<String>,
    ) -> Self {
        match dialect.format() {
            Format::Delimited(rules) => {
                Sink::Delimited(DelimitedSink::new(writer, rules, encoding, fieldnames))
            },
            Format::Ltsv => Sink::Ltsv(LtsvSink::new(writer, encoding)),
        }
    }

    /// Enable or disable the header row of delimited output.
    #[must_use]
    pub fn with_header(self, write_header: bool) -> Self {
        match self {
            Sink::Delimited(sink) => Sink::Delimited(sink.with_header(write_header)),
            Sink::Ltsv(sink) => Sink::Ltsv(sink),
        }
    }
}

impl<W: Write> RecordSink for Sink<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        match self {
            Sink::Delimited(sink) => sink.write_record(record),
            Sink::Ltsv(sink) => sink.write_record(record),
        }
    }

    fn finish(&mut self) -> Result<()> {
        match self {
            Sink::Delimited(sink) => sink.finish(),
            Sink::Ltsv(sink) => sink.finish(),
        }
    }

    fn records_written(&self) -> usize {
        match self {
            Sink::Delimited(sink) => sink.records_written(),
            Sink::Ltsv(sink) => sink.records_written(),
        }
    }
}

impl<W: Write> fmt::Debug for Sink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sink::Delimited(sink) => fmt::Debug::fmt(sink, f),
            Sink::Ltsv(sink) => fmt::Debug::fmt(sink, f),
        }
    }
}

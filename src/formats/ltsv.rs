//! LTSV (labeled tab-separated values) sources and sink.
//!
//! Each line is one record: `name:value` pairs joined by tabs. A pair
//! without a colon is a name with an absent value. Tabs inside names and
//! values are written as the two characters `\t` and restored on read.
//!
//! Two source strategies exist because collecting every field name needs
//! a full pass over the input before any rows are emitted:
//!
//! - [`RewindableLtsvSource`] seeks back to the start, scans, and restores
//!   its position.
//! - [`BufferedLtsvSource`] reads the rest of the stream into memory while
//!   scanning and serves later rows from that buffer.

use std::collections::VecDeque;
use std::fmt;
use std::io::{BufRead, Seek, SeekFrom, Write};

use encoding_rs::Encoding;
use indexmap::IndexSet;
use tracing::{debug, warn};

use crate::encoding::{decode, encode};
use crate::error::{Result, TabError};
use crate::formats::{RecordSink, RecordSource};
use crate::record::Record;

const ESCAPED_TAB: &str = "\\t";

/// Escape literal tabs as `\t`.
#[must_use]
pub fn escape(text: &str) -> String {
    text.replace('\t', ESCAPED_TAB)
}

/// Turn `\t` sequences back into tabs.
///
/// Backslashes are not escaped, so text that already held a backslash
/// followed by `t` comes back as a tab.
#[must_use]
pub fn unescape(text: &str) -> String {
    text.replace(ESCAPED_TAB, "\t")
}

/// Parse one LTSV line (without its line terminator) into a record.
///
/// ```
/// use tabconv::formats::ltsv::parse_line;
///
/// let record = parse_line("host:127.0.0.1\tflag\tpath:/a:b");
/// assert_eq!(record.get("host"), Some("127.0.0.1"));
/// assert!(record.contains("flag") && record.get("flag").is_none());
/// assert_eq!(record.get("path"), Some("/a:b"));
/// ```
#[must_use]
pub fn parse_line(line: &str) -> Record {
    line.split('\t')
        .map(|segment| match segment.split_once(':') {
            Some((name, value)) => (unescape(name), Some(unescape(value))),
            None => (unescape(segment), None),
        })
        .collect()
}

/// Format a record as one LTSV line, without the line terminator.
#[must_use]
pub fn format_record(record: &Record) -> String {
    record
        .iter()
        .map(|(name, value)| format!("{}:{}", escape(name), escape(value.unwrap_or(""))))
        .collect::<Vec<_>>()
        .join("\t")
}

/// Line reader shared by both source strategies.
struct LineReader {
    encoding: &'static Encoding,
    buf: Vec<u8>,
    warned_malformed: bool,
}

impl LineReader {
    fn new(encoding: &'static Encoding) -> Self {
        LineReader {
            encoding,
            buf: Vec::new(),
            warned_malformed: false,
        }
    }

    /// Next non-empty line as a record, or `None` at end of stream.
    fn next_record<R: BufRead>(&mut self, reader: &mut R) -> Result<Option<Record>> {
        loop {
            self.buf.clear();
            let read = reader
                .read_until(b'\n', &mut self.buf)
                .map_err(TabError::SourceReadError)?;
            if read == 0 {
                return Ok(None);
            }

            let mut line = self.buf.as_slice();
            if let Some(rest) = line.strip_suffix(b"\n") {
                line = rest;
            }
            if let Some(rest) = line.strip_suffix(b"\r") {
                line = rest;
            }
            if line.is_empty() {
                continue;
            }

            let (text, malformed) = decode(line, self.encoding);
            if malformed && !self.warned_malformed {
                warn!(
                    encoding = self.encoding.name(),
                    "malformed input replaced with U+FFFD"
                );
                self.warned_malformed = true;
            }
            return Ok(Some(parse_line(&text)));
        }
    }
}

fn remember_fieldnames(seen: &mut IndexSet<String>, record: &Record) {
    for name in record.fieldnames() {
        if !seen.contains(name) {
            seen.insert(name.to_string());
        }
    }
}

/// LTSV source over a seekable stream.
///
/// [`all_fieldnames`](RecordSource::all_fieldnames) rescans the stream from
/// the position the source was created at and then restores the read
/// position, so it can be called at any time without disturbing iteration.
pub struct RewindableLtsvSource<R: BufRead + Seek> {
    reader: R,
    lines: LineReader,
    start: u64,
    exhausted: bool,
    records_read: usize,
}

impl<R: BufRead + Seek> RewindableLtsvSource<R> {
    /// Create a source starting at the stream's current position.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream position cannot be queried.
    pub fn new(mut reader: R, encoding: &'static Encoding) -> Result<Self> {
        let start = reader
            .stream_position()
            .map_err(TabError::SourceReadError)?;
        Ok(RewindableLtsvSource {
            reader,
            lines: LineReader::new(encoding),
            start,
            exhausted: false,
            records_read: 0,
        })
    }
}

impl<R: BufRead + Seek> RecordSource for RewindableLtsvSource<R> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        if self.exhausted {
            return Ok(None);
        }
        match self.lines.next_record(&mut self.reader)? {
            Some(record) => {
                self.records_read += 1;
                Ok(Some(record))
            },
            None => {
                self.exhausted = true;
                Ok(None)
            },
        }
    }

    fn all_fieldnames(&mut self) -> Result<Vec<String>> {
        let position = self
            .reader
            .stream_position()
            .map_err(TabError::SourceReadError)?;
        self.reader
            .seek(SeekFrom::Start(self.start))
            .map_err(TabError::SourceReadError)?;

        let mut seen = IndexSet::new();
        let mut scanned = 0usize;
        while let Some(record) = self.lines.next_record(&mut self.reader)? {
            remember_fieldnames(&mut seen, &record);
            scanned += 1;
        }

        self.reader
            .seek(SeekFrom::Start(position))
            .map_err(TabError::SourceReadError)?;
        debug!(
            records = scanned,
            fields = seen.len(),
            "scanned rewindable LTSV source"
        );
        Ok(seen.into_iter().collect())
    }

    fn records_read(&self) -> usize {
        self.records_read
    }
}

impl<R: BufRead + Seek> fmt::Debug for RewindableLtsvSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewindableLtsvSource")
            .field("encoding", &self.lines.encoding.name())
            .field("start", &self.start)
            .field("exhausted", &self.exhausted)
            .field("records_read", &self.records_read)
            .finish_non_exhaustive()
    }
}

/// LTSV source over a stream that cannot seek, such as standard input.
///
/// [`all_fieldnames`](RecordSource::all_fieldnames) drains the remaining
/// stream into an in-memory buffer; [`read_record`](RecordSource::read_record)
/// serves buffered records first. Field names are tracked from the first
/// record read, so the answer covers rows already consumed as well.
pub struct BufferedLtsvSource<R: BufRead> {
    reader: R,
    lines: LineReader,
    buffered: VecDeque<Record>,
    seen: IndexSet<String>,
    stream_done: bool,
    exhausted: bool,
    records_read: usize,
}

impl<R: BufRead> BufferedLtsvSource<R> {
    /// Create a source reading lines from `reader`.
    pub fn new(reader: R, encoding: &'static Encoding) -> Self {
        BufferedLtsvSource {
            reader,
            lines: LineReader::new(encoding),
            buffered: VecDeque::new(),
            seen: IndexSet::new(),
            stream_done: false,
            exhausted: false,
            records_read: 0,
        }
    }

    /// Number of records held in memory awaiting [`read_record`](RecordSource::read_record).
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffered.len()
    }

    fn next_from_stream(&mut self) -> Result<Option<Record>> {
        if self.stream_done {
            return Ok(None);
        }
        let record = self.lines.next_record(&mut self.reader)?;
        match &record {
            Some(record) => remember_fieldnames(&mut self.seen, record),
            None => self.stream_done = true,
        }
        Ok(record)
    }
}

impl<R: BufRead> RecordSource for BufferedLtsvSource<R> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        if self.exhausted {
            return Ok(None);
        }
        let record = match self.buffered.pop_front() {
            Some(record) => Some(record),
            None => self.next_from_stream()?,
        };
        match record {
            Some(record) => {
                self.records_read += 1;
                Ok(Some(record))
            },
            None => {
                self.exhausted = true;
                Ok(None)
            },
        }
    }

    fn all_fieldnames(&mut self) -> Result<Vec<String>> {
        while let Some(record) = self.next_from_stream()? {
            self.buffered.push_back(record);
        }
        debug!(
            buffered = self.buffered.len(),
            fields = self.seen.len(),
            "buffered non-seekable LTSV source"
        );
        Ok(self.seen.iter().cloned().collect())
    }

    fn records_read(&self) -> usize {
        self.records_read
    }
}

impl<R: BufRead> fmt::Debug for BufferedLtsvSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferedLtsvSource")
            .field("encoding", &self.lines.encoding.name())
            .field("buffered", &self.buffered.len())
            .field("stream_done", &self.stream_done)
            .field("exhausted", &self.exhausted)
            .field("records_read", &self.records_read)
            .finish_non_exhaustive()
    }
}

/// Writes records as LTSV lines, one per record, in record field order.
pub struct LtsvSink<W: Write> {
    writer: W,
    encoding: &'static Encoding,
    finished: bool,
    records_written: usize,
    warned_unmappable: bool,
}

impl<W: Write> LtsvSink<W> {
    /// Create a sink writing to `writer`.
    pub fn new(writer: W, encoding: &'static Encoding) -> Self {
        LtsvSink {
            writer,
            encoding,
            finished: false,
            records_written: 0,
            warned_unmappable: false,
        }
    }
}

impl<W: Write> RecordSink for LtsvSink<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.finished {
            return Err(TabError::WriterFinished);
        }

        let mut line = format_record(record);
        line.push('\n');
        let (bytes, unmappable) = encode(&line, self.encoding);
        if unmappable && !self.warned_unmappable {
            warn!(
                encoding = self.encoding.name(),
                "unmappable characters written as numeric character references"
            );
            self.warned_unmappable = true;
        }
        self.writer
            .write_all(&bytes)
            .map_err(TabError::SinkWriteError)?;

        self.records_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().map_err(TabError::SinkWriteError)?;
        self.finished = true;
        Ok(())
    }

    fn records_written(&self) -> usize {
        self.records_written
    }
}

impl<W: Write> fmt::Debug for LtsvSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LtsvSink")
            .field("encoding", &self.encoding.name())
            .field("finished", &self.finished)
            .field("records_written", &self.records_written)
            .finish_non_exhaustive()
    }
}

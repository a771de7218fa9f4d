//! Delimited text (CSV/TSV) sources and sinks.
//!
//! The row splitting and quoting itself is done by the `csv` crate on raw
//! bytes; fields are decoded or encoded individually afterwards, which is
//! what lets legacy encodings such as Shift_JIS pass through the parser.

use std::fmt;
use std::io::{Read, Write};

use csv::ByteRecord;
use encoding_rs::Encoding;
use tracing::{debug, trace, warn};

use crate::dialect::DelimitedRules;
use crate::encoding::{decode, encode};
use crate::error::{Result, TabError};
use crate::formats::{RecordSink, RecordSource};
use crate::record::Record;

/// Reads delimited rows as records keyed by the header row.
///
/// Rows shorter than the header yield absent values for the missing
/// trailing fields; surplus values beyond the header are dropped.
///
/// ```
/// use tabconv::dialect::Dialect;
/// use tabconv::formats::{DelimitedSource, RecordSource};
///
/// let rules = Dialect::lookup("csv")?.delimited_rules().unwrap();
/// let data = "id,name\n1,alice\n2\n";
/// let mut source = DelimitedSource::new(data.as_bytes(), rules, encoding_rs::UTF_8);
///
/// let first = source.read_record()?.unwrap();
/// assert_eq!(first.get("name"), Some("alice"));
/// let second = source.read_record()?.unwrap();
/// assert_eq!(second.get("name"), None);
/// # Ok::<(), tabconv::TabError>(())
/// ```
pub struct DelimitedSource<R: Read> {
    reader: csv::Reader<R>,
    decoder: FieldDecoder,
    fieldnames: Option<Vec<String>>,
    row: ByteRecord,
    exhausted: bool,
    records_read: usize,
}

/// Decodes fields, warning once per source about malformed input.
struct FieldDecoder {
    encoding: &'static Encoding,
    warned: bool,
}

impl FieldDecoder {
    fn decode(&mut self, bytes: &[u8]) -> String {
        let (text, malformed) = decode(bytes, self.encoding);
        if malformed && !self.warned {
            warn!(
                encoding = self.encoding.name(),
                "malformed input replaced with U+FFFD"
            );
            self.warned = true;
        }
        text.into_owned()
    }
}

/// Encodes fields, warning once per sink about unmappable characters.
struct FieldEncoder {
    encoding: &'static Encoding,
    warned: bool,
}

impl FieldEncoder {
    fn encode_row<'a, I>(&mut self, values: I, width: usize) -> ByteRecord
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut row = ByteRecord::with_capacity(0, width);
        for value in values {
            let (bytes, unmappable) = encode(value, self.encoding);
            if unmappable && !self.warned {
                warn!(
                    encoding = self.encoding.name(),
                    "unmappable characters written as numeric character references"
                );
                self.warned = true;
            }
            row.push_field(&bytes);
        }
        row
    }
}

impl<R: Read> DelimitedSource<R> {
    /// Create a source whose first row supplies the field names.
    pub fn new(reader: R, rules: DelimitedRules, encoding: &'static Encoding) -> Self {
        DelimitedSource {
            reader: rules.reader_builder(true).from_reader(reader),
            decoder: FieldDecoder {
                encoding,
                warned: false,
            },
            fieldnames: None,
            row: ByteRecord::new(),
            exhausted: false,
            records_read: 0,
        }
    }

    /// Create a source with explicit field names; the first row is data.
    pub fn with_fieldnames(
        reader: R,
        rules: DelimitedRules,
        encoding: &'static Encoding,
        fieldnames: Vec<String>,
    ) -> Self {
        DelimitedSource {
            reader: rules.reader_builder(false).from_reader(reader),
            decoder: FieldDecoder {
                encoding,
                warned: false,
            },
            fieldnames: Some(fieldnames),
            row: ByteRecord::new(),
            exhausted: false,
            records_read: 0,
        }
    }

    /// Field names for this source, reading the header row on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the header row cannot be read.
    pub fn fieldnames(&mut self) -> Result<&[String]> {
        if self.fieldnames.is_none() {
            let header = self.reader.byte_headers().map_err(TabError::read)?;
            let names = header
                .iter()
                .map(|field| self.decoder.decode(field))
                .collect::<Vec<_>>();
            debug!(fields = names.len(), "read delimited header");
            self.fieldnames = Some(names);
        }
        Ok(self.fieldnames.as_deref().unwrap_or_default())
    }
}

impl<R: Read> RecordSource for DelimitedSource<R> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        if self.exhausted {
            return Ok(None);
        }
        self.fieldnames()?;

        if !self
            .reader
            .read_byte_record(&mut self.row)
            .map_err(TabError::read)?
        {
            self.exhausted = true;
            debug!(records = self.records_read, "delimited source exhausted");
            return Ok(None);
        }

        let names = self.fieldnames.as_deref().unwrap_or_default();
        if self.row.len() > names.len() {
            trace!(
                extra = self.row.len() - names.len(),
                "dropping values beyond the header"
            );
        }

        let mut record = Record::new();
        for (position, name) in names.iter().enumerate() {
            let value = self.row.get(position).map(|field| self.decoder.decode(field));
            record.insert(name.as_str(), value);
        }

        self.records_read += 1;
        Ok(Some(record))
    }

    fn all_fieldnames(&mut self) -> Result<Vec<String>> {
        Ok(self.fieldnames()?.to_vec())
    }

    fn records_read(&self) -> usize {
        self.records_read
    }
}

impl<R: Read> fmt::Debug for DelimitedSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelimitedSource")
            .field("encoding", &self.decoder.encoding.name())
            .field("fieldnames", &self.fieldnames)
            .field("exhausted", &self.exhausted)
            .field("records_read", &self.records_read)
            .finish_non_exhaustive()
    }
}

/// Writes records as delimited rows in a fixed field order.
///
/// A header row with the field names is written before the first record
/// (or on [`finish`](RecordSink::finish) if there are none) unless
/// suppressed with [`with_header`](Self::with_header). Absent values are
/// written as empty fields.
pub struct DelimitedSink<W: Write> {
    writer: csv::Writer<W>,
    encoder: FieldEncoder,
    fieldnames: Vec<String>,
    write_header: bool,
    header_written: bool,
    finished: bool,
    records_written: usize,
}

impl<W: Write> DelimitedSink<W> {
    /// Create a sink writing `fieldnames` as columns.
    pub fn new(
        writer: W,
        rules: DelimitedRules,
        encoding: &'static Encoding,
        fieldnames: Vec<String>,
    ) -> Self {
        DelimitedSink {
            writer: rules.writer_builder().from_writer(writer),
            encoder: FieldEncoder {
                encoding,
                warned: false,
            },
            fieldnames,
            write_header: true,
            header_written: false,
            finished: false,
            records_written: 0,
        }
    }

    /// Enable or disable the header row.
    #[must_use]
    pub fn with_header(mut self, write_header: bool) -> Self {
        self.write_header = write_header;
        self
    }

    /// Column names in output order.
    #[must_use]
    pub fn fieldnames(&self) -> &[String] {
        &self.fieldnames
    }

    fn ensure_header(&mut self) -> Result<()> {
        if self.write_header && !self.header_written {
            let header = self.encoder.encode_row(
                self.fieldnames.iter().map(String::as_str),
                self.fieldnames.len(),
            );
            self.writer
                .write_byte_record(&header)
                .map_err(TabError::write)?;
        }
        self.header_written = true;
        Ok(())
    }
}

impl<W: Write> RecordSink for DelimitedSink<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.finished {
            return Err(TabError::WriterFinished);
        }
        self.ensure_header()?;

        let row = self.encoder.encode_row(
            self.fieldnames
                .iter()
                .map(|name| record.get(name).unwrap_or("")),
            self.fieldnames.len(),
        );
        self.writer.write_byte_record(&row).map_err(TabError::write)?;

        self.records_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.ensure_header()?;
        self.writer.flush().map_err(TabError::SinkWriteError)?;
        self.finished = true;
        Ok(())
    }

    fn records_written(&self) -> usize {
        self.records_written
    }
}

impl<W: Write> fmt::Debug for DelimitedSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelimitedSink")
            .field("encoding", &self.encoder.encoding.name())
            .field("fieldnames", &self.fieldnames)
            .field("write_header", &self.write_header)
            .field("finished", &self.finished)
            .field("records_written", &self.records_written)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use encoding_rs::{SHIFT_JIS, UTF_8};

    fn rules(name: &str) -> DelimitedRules {
        Dialect::lookup(name).unwrap().delimited_rules().unwrap()
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_header_supplies_fieldnames() {
        let data = "a,b\n1,2\n";
        let mut source = DelimitedSource::new(data.as_bytes(), rules("csv"), UTF_8);

        assert_eq!(source.all_fieldnames().unwrap(), names(&["a", "b"]));
        let record = source.read_record().unwrap().unwrap();
        assert_eq!(record.get("a"), Some("1"));
        assert_eq!(record.get("b"), Some("2"));
        assert!(source.read_record().unwrap().is_none());
        assert_eq!(source.records_read(), 1);
    }

    #[test]
    fn test_fieldnames_before_rows_does_not_consume_data() {
        let data = "a\n1\n2\n";
        let mut source = DelimitedSource::new(data.as_bytes(), rules("csv"), UTF_8);
        source.all_fieldnames().unwrap();
        source.all_fieldnames().unwrap();
        assert_eq!(source.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_short_and_long_rows() {
        let data = "a,b,c\n1\n1,2,3,4\n";
        let mut source = DelimitedSource::new(data.as_bytes(), rules("csv"), UTF_8);

        let short = source.read_record().unwrap().unwrap();
        assert_eq!(
            short.iter().collect::<Vec<_>>(),
            vec![("a", Some("1")), ("b", None), ("c", None)]
        );

        let long = source.read_record().unwrap().unwrap();
        assert_eq!(long.len(), 3);
        assert_eq!(long.get("c"), Some("3"));
    }

    #[test]
    fn test_explicit_fieldnames_treat_first_row_as_data() {
        let data = "1,2\n3,4\n";
        let mut source = DelimitedSource::with_fieldnames(
            data.as_bytes(),
            rules("csv"),
            UTF_8,
            names(&["x", "y"]),
        );
        let records = source.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("x"), Some("1"));
        assert_eq!(records[1].get("y"), Some("4"));
    }

    #[test]
    fn test_quoted_fields_and_tsv() {
        let data = "a\tb\n\"x\ty\"\t\"say \"\"hi\"\"\"\n";
        let mut source = DelimitedSource::new(data.as_bytes(), rules("tsv"), UTF_8);
        let record = source.read_record().unwrap().unwrap();
        assert_eq!(record.get("a"), Some("x\ty"));
        assert_eq!(record.get("b"), Some("say \"hi\""));
    }

    #[test]
    fn test_shift_jis_source() {
        let data: &[u8] = b"\x96\xbc\x91\x4f\n\x82\xa0\n";
        let mut source = DelimitedSource::new(data, rules("csv"), SHIFT_JIS);
        assert_eq!(source.all_fieldnames().unwrap(), names(&["名前"]));
        let record = source.read_record().unwrap().unwrap();
        assert_eq!(record.get("名前"), Some("あ"));
    }

    #[test]
    fn test_empty_input_has_no_fields_or_rows() {
        let mut source = DelimitedSource::new(&b""[..], rules("csv"), UTF_8);
        assert!(source.all_fieldnames().unwrap().is_empty());
        assert!(source.read_record().unwrap().is_none());
        assert!(source.read_record().unwrap().is_none());
    }

    #[test]
    fn test_sink_writes_header_and_rows() {
        let mut output = Vec::new();
        {
            let mut sink = DelimitedSink::new(&mut output, rules("csv"), UTF_8, names(&["a", "b"]));
            let record: Record = vec![("b", Some("2".to_string())), ("a", None)]
                .into_iter()
                .collect();
            sink.write_record(&record).unwrap();
            sink.finish().unwrap();
            assert_eq!(sink.records_written(), 1);
        }
        assert_eq!(String::from_utf8(output).unwrap(), "a,b\r\n,2\r\n");
    }

    #[test]
    fn test_sink_quotes_when_needed() {
        let mut output = Vec::new();
        {
            let mut sink = DelimitedSink::new(&mut output, rules("csv"), UTF_8, names(&["v"]))
                .with_header(false);
            let record: Record = std::iter::once(("v", Some("a,\"b\"".to_string()))).collect();
            sink.write_record(&record).unwrap();
            sink.finish().unwrap();
        }
        assert_eq!(String::from_utf8(output).unwrap(), "\"a,\"\"b\"\"\"\r\n");
    }

    #[test]
    fn test_sink_header_only_on_finish() {
        let mut output = Vec::new();
        {
            let mut sink = DelimitedSink::new(&mut output, rules("tsv"), UTF_8, names(&["a", "b"]));
            sink.finish().unwrap();
        }
        assert_eq!(String::from_utf8(output).unwrap(), "a\tb\r\n");
    }

    #[test]
    fn test_sink_suppressed_header_on_empty_input() {
        let mut output = Vec::new();
        {
            let mut sink = DelimitedSink::new(&mut output, rules("csv"), UTF_8, names(&["a"]))
                .with_header(false);
            sink.finish().unwrap();
        }
        assert!(output.is_empty());
    }

    #[test]
    fn test_sink_encodes_shift_jis() {
        let mut output = Vec::new();
        {
            let mut sink =
                DelimitedSink::new(&mut output, rules("csv"), SHIFT_JIS, names(&["名前"]));
            sink.finish().unwrap();
        }
        assert_eq!(output, b"\x96\xbc\x91\x4f\r\n");
    }

    #[test]
    fn test_sink_rejects_write_after_finish() {
        let mut output = Vec::new();
        let mut sink = DelimitedSink::new(&mut output, rules("csv"), UTF_8, names(&["a"]));
        sink.finish().unwrap();
        assert!(matches!(
            sink.write_record(&Record::new()),
            Err(TabError::WriterFinished)
        ));
    }
}

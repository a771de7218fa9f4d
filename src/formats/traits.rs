//! Record source and sink traits.
//!
//! These traits give every physical format the same shape: a source
//! produces [`Record`]s one at a time and can report every field name it
//! contains, a sink accepts records and must be finished to flush output.
//!
//! # Example
//!
//! ```
//! use tabconv::formats::{LtsvSink, RecordSink, RecordSource, RecordSourceExt};
//! use tabconv::formats::BufferedLtsvSource;
//! use std::io::Cursor;
//!
//! let input = Cursor::new(b"a:1\tb:2\nc:3\n".to_vec());
//! let mut source = BufferedLtsvSource::new(input, encoding_rs::UTF_8);
//! let mut output = Vec::new();
//! {
//!     let mut sink = LtsvSink::new(&mut output, encoding_rs::UTF_8);
//!     for record in source.records() {
//!         sink.write_record(&record?)?;
//!     }
//!     sink.finish()?;
//! }
//! assert_eq!(output, b"a:1\tb:2\nc:3\n");
//! # Ok::<(), tabconv::TabError>(())
//! ```

use crate::error::Result;
use crate::record::Record;

/// Trait for readers that produce logical records from a physical stream.
///
/// # Implementation Notes
///
/// Implementations should:
/// - Return `Ok(None)` when the source is exhausted (not an error)
/// - Keep returning `Ok(None)` once exhausted; a consumed source is not
///   restarted by further reads
/// - Leave the row cursor where it was when [`all_fieldnames`](Self::all_fieldnames)
///   returns
pub trait RecordSource: std::fmt::Debug {
    /// Read the next record from the source.
    ///
    /// # Errors
    ///
    /// Returns [`TabError::SourceReadError`](crate::TabError::SourceReadError)
    /// if the underlying stream fails.
    fn read_record(&mut self) -> Result<Option<Record>>;

    /// Every field name the source contains, in first-seen order.
    ///
    /// Records not yet read by [`read_record`](Self::read_record) remain
    /// available afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if scanning the stream fails.
    fn all_fieldnames(&mut self) -> Result<Vec<String>>;

    /// Read all remaining records into a vector.
    ///
    /// # Errors
    ///
    /// Returns an error if any record fails to read.
    fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Returns the number of records read so far.
    fn records_read(&self) -> usize;
}

/// Trait for writers that serialize logical records to a physical stream.
///
/// # Important: Always Call `finish`
///
/// [`finish`](Self::finish) writes anything still pending (such as the
/// header of an empty delimited file) and flushes the output.
pub trait RecordSink: std::fmt::Debug {
    /// Write a single record.
    ///
    /// # Errors
    ///
    /// Returns [`TabError::SinkWriteError`](crate::TabError::SinkWriteError)
    /// if the output fails, or [`TabError::WriterFinished`](crate::TabError::WriterFinished)
    /// after [`finish`](Self::finish).
    fn write_record(&mut self, record: &Record) -> Result<()>;

    /// Finish writing and flush any buffered data.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn finish(&mut self) -> Result<()>;

    /// Returns the number of records written so far.
    fn records_written(&self) -> usize;
}

/// Extension trait providing iterator-style access for record sources.
///
/// This trait is automatically implemented for all types implementing [`RecordSource`].
pub trait RecordSourceExt: RecordSource {
    /// Create an iterator over the remaining records of this source.
    fn records(&mut self) -> RecordIterator<'_, Self>
    where
        Self: Sized,
    {
        RecordIterator { source: self }
    }
}

impl<T: RecordSource> RecordSourceExt for T {}

/// Iterator adapter for [`RecordSource`].
///
/// Created by the [`records`](RecordSourceExt::records) method.
#[derive(Debug)]
pub struct RecordIterator<'a, S: RecordSource> {
    source: &'a mut S,
}

impl<S: RecordSource> Iterator for RecordIterator<'_, S> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.read_record().transpose()
    }
}

#![warn(missing_docs)]

//! # tabconv
//!
//! Convert tabular records between CSV, TSV and LTSV, and cut columns out
//! of delimited streams.
//!
//! ## Quick Start
//!
//! ### Converting LTSV to CSV
//!
//! ```
//! use tabconv::dialect::Dialect;
//! use tabconv::formats::Source;
//! use tabconv::pipeline::{convert, ConvertOptions};
//! use std::io::Cursor;
//!
//! let ltsv = Dialect::lookup("ltsv")?;
//! let csv = Dialect::lookup("csv")?;
//! let input = Cursor::new(b"host:a\tstatus:200\nhost:b\n".to_vec());
//! let mut sources = vec![Source::from_seekable(input, ltsv, encoding_rs::UTF_8)?];
//!
//! let mut output = Vec::new();
//! convert(&mut sources, &mut output, csv, encoding_rs::UTF_8, &ConvertOptions::new())?;
//! assert_eq!(output, b"host,status\r\na,200\r\nb,\r\n");
//! # Ok::<(), tabconv::TabError>(())
//! ```
//!
//! ### Selecting Columns
//!
//! ```
//! use tabconv::{FieldSpec, RowProjector};
//!
//! let projector = RowProjector::new(FieldSpec::parse("3,1-2")?);
//! let row = vec!["a".to_string(), "b".to_string(), "c".to_string()];
//! assert_eq!(projector.project(&row), vec!["c", "a", "b"]);
//! # Ok::<(), tabconv::TabError>(())
//! ```
//!
//! ## Modules
//!
//! - [`record`] — Logical record (ordered name to optional value map)
//! - [`field_spec`] — Column selection syntax (`1,3-5`)
//! - [`projector`] — Positional row projection
//! - [`dialect`] — Registry of named physical formats
//! - [`encoding`] — Character encoding lookup and conversion
//! - [`formats`] — Record sources and sinks for delimited text and LTSV
//! - [`pipeline`] — Many-sources-to-one-sink conversion
//! - [`cli`] — Logging and exit-status helpers for the binaries
//! - [`error`] — Error types and result type

pub mod cli;
pub mod dialect;
pub mod encoding;
pub mod error;
pub mod field_spec;
pub mod formats;
pub mod pipeline;
pub mod projector;
pub mod record;

pub use dialect::Dialect;
pub use error::{Result, TabError};
pub use field_spec::FieldSpec;
pub use formats::{RecordSink, RecordSource, Sink, Source};
pub use pipeline::{convert, ConvertOptions, ConvertSummary};
pub use projector::RowProjector;
pub use record::Record;

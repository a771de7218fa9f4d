//! Common test helpers shared across the integration suite.

#![allow(dead_code)]

use std::io::Cursor;

use encoding_rs::UTF_8;
use tabconv::{convert, ConvertOptions, Dialect, Source};

/// Looks up a registered dialect, panicking on typos in tests.
pub fn dialect(name: &str) -> &'static Dialect {
    Dialect::lookup(name).unwrap_or_else(|_| panic!("unknown dialect {name}"))
}

/// Builds a UTF-8 source over an in-memory, seekable buffer.
pub fn seekable(name: &str, data: &str) -> Source {
    Source::from_seekable(Cursor::new(data.as_bytes().to_vec()), dialect(name), UTF_8)
        .expect("cursor reports its position")
}

/// Builds a UTF-8 source that behaves like standard input.
pub fn streamed(name: &str, data: &str) -> Source {
    Source::from_reader(Cursor::new(data.as_bytes().to_vec()), dialect(name), UTF_8)
}

/// Converts `sources` to the `to` dialect in UTF-8 and returns the output text.
pub fn convert_to(sources: &mut [Source], to: &str, options: &ConvertOptions) -> String {
    let mut output = Vec::new();
    convert(sources, &mut output, dialect(to), UTF_8, options).expect("conversion succeeds");
    String::from_utf8(output).expect("UTF-8 output")
}

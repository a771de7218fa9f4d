//! Named physical formats.
//!
//! A [`Dialect`] describes how records are laid out on disk: either
//! delimited text with quoting rules, or LTSV. The set of dialects is
//! closed and registered once at first use:
//!
//! | Name | Format | Default encoding |
//! |------|--------|------------------|
//! | `csv`, `csv:excel` | comma-delimited, quoted | Shift_JIS |
//! | `tsv`, `tsv:excel` | tab-delimited, quoted | Shift_JIS |
//! | `ltsv` | `name:value` pairs joined by tabs | UTF-8 |
//!
//! ```
//! use tabconv::dialect::{Dialect, Format};
//!
//! let tsv = Dialect::lookup("tsv")?;
//! assert!(matches!(tsv.format(), Format::Delimited(rules) if rules.delimiter == b'\t'));
//! assert!(Dialect::lookup("xml").is_err());
//! # Ok::<(), tabconv::TabError>(())
//! ```

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use encoding_rs::{Encoding, SHIFT_JIS, UTF_8};
use indexmap::IndexMap;
use lazy_static::lazy_static;

use crate::error::{Result, TabError};

/// Quoting and separator rules for delimited text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimitedRules {
    /// Field separator byte.
    pub delimiter: u8,
    /// Quote character; embedded quotes are doubled.
    pub quote: u8,
}

impl DelimitedRules {
    /// Reader configured for these rules.
    ///
    /// The reader is flexible so ragged rows are passed through rather than
    /// rejected.
    #[must_use]
    pub fn reader_builder(&self, has_headers: bool) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .double_quote(true)
            .has_headers(has_headers)
            .flexible(true);
        builder
    }

    /// Writer configured for these rules: minimal quoting, CRLF line ends.
    #[must_use]
    pub fn writer_builder(&self) -> WriterBuilder {
        let mut builder = WriterBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .double_quote(true)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::CRLF)
            .has_headers(false)
            .flexible(true);
        builder
    }
}

/// Physical layout of a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Delimiter-separated values with a header row.
    Delimited(DelimitedRules),
    /// Labeled tab-separated values, self-describing per line.
    Ltsv,
}

/// A registered physical-format descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Dialect {
    name: &'static str,
    format: Format,
    default_encoding: &'static Encoding,
}

const COMMA: DelimitedRules = DelimitedRules {
    delimiter: b',',
    quote: b'"',
};

const TAB: DelimitedRules = DelimitedRules {
    delimiter: b'\t',
    quote: b'"',
};

lazy_static! {
    static ref REGISTRY: IndexMap<&'static str, Dialect> = {
        let mut registry = IndexMap::new();
        for (name, format, default_encoding) in [
            ("csv", Format::Delimited(COMMA), SHIFT_JIS),
            ("tsv", Format::Delimited(TAB), SHIFT_JIS),
            ("csv:excel", Format::Delimited(COMMA), SHIFT_JIS),
            ("tsv:excel", Format::Delimited(TAB), SHIFT_JIS),
            ("ltsv", Format::Ltsv, UTF_8),
        ] {
            registry.insert(
                name,
                Dialect {
                    name,
                    format,
                    default_encoding,
                },
            );
        }
        registry
    };
}

impl Dialect {
    /// Find a dialect by its registered name.
    ///
    /// # Errors
    ///
    /// Returns [`TabError::UnknownDialect`] if no dialect has that name.
    pub fn lookup(name: &str) -> Result<&'static Dialect> {
        REGISTRY
            .get(name)
            .ok_or_else(|| TabError::UnknownDialect(name.to_string()))
    }

    /// Registered name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Physical layout.
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Encoding used when none is given explicitly.
    #[must_use]
    pub fn default_encoding(&self) -> &'static Encoding {
        self.default_encoding
    }

    /// Delimiter rules, or `None` for LTSV.
    #[must_use]
    pub fn delimited_rules(&self) -> Option<DelimitedRules> {
        match self.format {
            Format::Delimited(rules) => Some(rules),
            Format::Ltsv => None,
        }
    }

    /// Whether records in this dialect share a header row.
    #[must_use]
    pub fn has_header(&self) -> bool {
        matches!(self.format, Format::Delimited(_))
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// All registered dialect names, in registration order.
#[must_use]
pub fn names() -> Vec<&'static str> {
    REGISTRY.keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_registered_names() {
        for name in ["csv", "tsv", "csv:excel", "tsv:excel", "ltsv"] {
            let dialect = Dialect::lookup(name).unwrap();
            assert_eq!(dialect.name(), name);
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(matches!(
            Dialect::lookup("CSV"),
            Err(TabError::UnknownDialect(name)) if name == "CSV"
        ));
    }

    #[test]
    fn test_excel_variants_match_plain_rules() {
        let csv = Dialect::lookup("csv").unwrap();
        let csv_excel = Dialect::lookup("csv:excel").unwrap();
        assert_eq!(csv.format(), csv_excel.format());

        let tsv = Dialect::lookup("tsv").unwrap();
        let tsv_excel = Dialect::lookup("tsv:excel").unwrap();
        assert_eq!(tsv.format(), tsv_excel.format());
        assert_eq!(tsv.delimited_rules().unwrap().delimiter, b'\t');
    }

    #[test]
    fn test_default_encodings() {
        assert_eq!(Dialect::lookup("csv").unwrap().default_encoding(), SHIFT_JIS);
        assert_eq!(Dialect::lookup("ltsv").unwrap().default_encoding(), UTF_8);
    }

    #[test]
    fn test_ltsv_has_no_header_or_rules() {
        let ltsv = Dialect::lookup("ltsv").unwrap();
        assert!(!ltsv.has_header());
        assert!(ltsv.delimited_rules().is_none());
        assert_eq!(ltsv.to_string(), "ltsv");
    }

    #[test]
    fn test_names_in_registration_order() {
        assert_eq!(names(), vec!["csv", "tsv", "csv:excel", "tsv:excel", "ltsv"]);
    }
}

//! Column selection syntax.
//!
//! A field specification is a comma-separated list of 1-based column
//! numbers and inclusive ranges, e.g. `1,3-5,2`. Parsing yields the
//! zero-based positions in the order given, duplicates included, so a
//! column can be repeated in the output.
//!
//! ```
//! use tabconv::FieldSpec;
//!
//! let spec: FieldSpec = "1,3-5,2".parse()?;
//! assert_eq!(spec.positions(), &[0, 2, 3, 4, 1]);
//! # Ok::<(), tabconv::TabError>(())
//! ```

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Result, TabError};

lazy_static! {
    static ref SINGLE: Regex = Regex::new(r"^(\d+)$").expect("valid regex");
    static ref RANGE: Regex = Regex::new(r"^(\d+)-(\d+)$").expect("valid regex");
}

/// Upper bound on the number of positions one specification may select.
pub const MAX_POSITIONS: usize = 1 << 20;

/// Parsed column selection: zero-based positions in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    positions: Vec<usize>,
}

impl FieldSpec {
    /// Parse a specification string such as `"2,4-6"`.
    ///
    /// A range `N-M` contributes `N..=M`; a descending range contributes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TabError::InvalidFieldSpec`] if a token is neither a number
    /// nor a range of numbers, if any selected column is 0, or if the ranges
    /// together select more than [`MAX_POSITIONS`] columns.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut indices: Vec<u64> = Vec::new();

        for token in spec.split(',') {
            if let Some(caps) = SINGLE.captures(token) {
                indices.push(parse_index(&caps[1], spec)?);
            } else if let Some(caps) = RANGE.captures(token) {
                let first = parse_index(&caps[1], spec)?;
                let last = parse_index(&caps[2], spec)?;
                let room = MAX_POSITIONS.saturating_sub(indices.len());
                let width = last.saturating_sub(first).saturating_add(1);
                if first <= last && usize::try_from(width).map_or(true, |width| width > room) {
                    return Err(TabError::InvalidFieldSpec(format!(
                        "{spec:?}: range {token:?} selects too many columns"
                    )));
                }
                indices.extend(first..=last);
            } else {
                return Err(TabError::InvalidFieldSpec(format!(
                    "{spec:?}: bad token {token:?}"
                )));
            }
        }

        if indices.iter().any(|&index| index < 1) {
            return Err(TabError::InvalidFieldSpec(format!(
                "{spec:?}: columns are numbered from 1"
            )));
        }

        let positions = indices
            .into_iter()
            .map(|index| {
                usize::try_from(index - 1).map_err(|_| {
                    TabError::InvalidFieldSpec(format!("{spec:?}: column {index} is too large"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FieldSpec { positions })
    }

    /// Zero-based column positions in output order.
    #[must_use]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Number of output columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no columns are selected (only possible via descending ranges).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl FromStr for FieldSpec {
    type Err = TabError;

    fn from_str(s: &str) -> Result<Self> {
        FieldSpec::parse(s)
    }
}

fn parse_index(digits: &str, spec: &str) -> Result<u64> {
    digits
        .parse::<u64>()
        .map_err(|_| TabError::InvalidFieldSpec(format!("{spec:?}: column {digits} is too large")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_indices() {
        let spec = FieldSpec::parse("3,1").unwrap();
        assert_eq!(spec.positions(), &[2, 0]);
    }

    #[test]
    fn test_mixed_indices_and_ranges() {
        let spec = FieldSpec::parse("1,3-5,2").unwrap();
        assert_eq!(spec.positions(), &[0, 2, 3, 4, 1]);
        assert_eq!(spec.len(), 5);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let spec = FieldSpec::parse("2,2,1-2").unwrap();
        assert_eq!(spec.positions(), &[1, 1, 0, 1]);
    }

    #[test]
    fn test_single_element_range() {
        let spec = FieldSpec::parse("4-4").unwrap();
        assert_eq!(spec.positions(), &[3]);
    }

    #[test]
    fn test_descending_range_contributes_nothing() {
        let spec = FieldSpec::parse("5-3,1").unwrap();
        assert_eq!(spec.positions(), &[0]);

        let empty = FieldSpec::parse("5-3").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_zero_is_rejected() {
        assert!(matches!(
            FieldSpec::parse("0"),
            Err(TabError::InvalidFieldSpec(_))
        ));
        assert!(matches!(
            FieldSpec::parse("0-2"),
            Err(TabError::InvalidFieldSpec(_))
        ));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        for bad in ["abc", "", "1,", ",1", "1-", "-3", "1-2-3", " 1", "1.5", "+1"] {
            assert!(
                matches!(FieldSpec::parse(bad), Err(TabError::InvalidFieldSpec(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_overflowing_index_is_rejected() {
        assert!(matches!(
            FieldSpec::parse("99999999999999999999999"),
            Err(TabError::InvalidFieldSpec(_))
        ));
    }

    #[test]
    fn test_huge_range_is_rejected() {
        for huge in ["1-18446744073709551615", "1-2000000", "1,1-1048576"] {
            assert!(
                matches!(FieldSpec::parse(huge), Err(TabError::InvalidFieldSpec(_))),
                "{huge:?} should be rejected"
            );
        }
        assert_eq!(FieldSpec::parse("1-1048576").unwrap().len(), MAX_POSITIONS);
    }

    #[test]
    fn test_from_str() {
        let spec: FieldSpec = "2-3".parse().unwrap();
        assert_eq!(spec.positions(), &[1, 2]);
    }
}

//! Positional row projection for the column filter.
//!
//! Rows here have no header semantics: a [`RowProjector`] picks values by
//! position according to a [`FieldSpec`]. Positions past the end of a
//! ragged row yield empty values instead of failing.

use csv::ByteRecord;

use crate::field_spec::FieldSpec;

/// Applies a [`FieldSpec`] to positional rows.
#[derive(Debug, Clone)]
pub struct RowProjector {
    spec: FieldSpec,
}

impl RowProjector {
    /// Create a projector for the given column selection.
    #[must_use]
    pub fn new(spec: FieldSpec) -> Self {
        RowProjector { spec }
    }

    /// The column selection this projector applies.
    #[must_use]
    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    /// Project a row of values, substituting `T::default()` for missing
    /// positions.
    ///
    /// ```
    /// use tabconv::{FieldSpec, RowProjector};
    ///
    /// let projector = RowProjector::new(FieldSpec::parse("1,3,6")?);
    /// let row = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    /// assert_eq!(projector.project(&row), vec!["a", "c", ""]);
    /// # Ok::<(), tabconv::TabError>(())
    /// ```
    #[must_use]
    pub fn project<T: Clone + Default>(&self, row: &[T]) -> Vec<T> {
        self.spec
            .positions()
            .iter()
            .map(|&position| row.get(position).cloned().unwrap_or_default())
            .collect()
    }

    /// Project a raw delimited row without decoding its bytes.
    #[must_use]
    pub fn project_record(&self, row: &ByteRecord) -> ByteRecord {
        let mut projected = ByteRecord::with_capacity(row.as_slice().len(), self.spec.len());
        for &position in self.spec.positions() {
            projected.push_field(row.get(position).unwrap_or(b""));
        }
        projected
    }
}

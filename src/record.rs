//! Logical record structure shared by every format.
//!
//! A [`Record`] is an ordered mapping from field name to an optional value.
//! Delimited sources fill it in header order; key:value sources fill it in
//! the order fields appear on the line.
//!
//! # Examples
//!
//! ```
//! use tabconv::Record;
//!
//! let mut record = Record::new();
//! record.insert("name", Some("alice".to_string()));
//! record.insert("age", None);
//!
//! assert_eq!(record.get("name"), Some("alice"));
//! assert_eq!(record.get("age"), None);
//! assert_eq!(record.fieldnames().collect::<Vec<_>>(), vec!["name", "age"]);
//! ```

use indexmap::IndexMap;

/// One row of tabular data, independent of its physical encoding.
///
/// Fields are stored in insertion order using `IndexMap`. Inserting a name
/// that is already present overwrites the value but keeps the original
/// position, so the last write wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: IndexMap<String, Option<String>>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Record {
            fields: IndexMap::new(),
        }
    }

    /// Set a field, replacing any earlier value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        self.fields.insert(name.into(), value);
    }

    /// Value of a field, or `None` when the field is missing or absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|value| value.as_deref())
    }

    /// Whether the record has an entry for `name`, present or absent.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in record order.
    pub fn fieldnames(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over `(name, value)` pairs in record order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reduce the record to exactly `names`, in that order.
    ///
    /// Names missing from the record become absent values.
    #[must_use]
    pub fn project(&self, names: &[String]) -> Record {
        names
            .iter()
            .map(|name| {
                let value = self.fields.get(name).cloned().flatten();
                (name.clone(), value)
            })
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

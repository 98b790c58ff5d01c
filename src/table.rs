//! Tabular results with an optional header record
//!
//! All list-like results of an [`AssociationStore`](`crate::AssociationStore`)
//! are returned as [`Table`]s. A table contains the typed rows and
//! remembers whether the caller asked for a leading header record.
//!
//! # Examples
//!
//! ```
//! use subtiwiki::{Gene, Record, Table};
//!
//! let genes = vec![Gene::new("xkdK", "BSU12660", "PBSX protein")];
//! let table = Table::new(genes, true);
//!
//! assert_eq!(table.len(), 1);
//! assert_eq!(table.header(), Some(Gene::HEADER));
//!
//! let records: Vec<Vec<String>> = table.records().collect();
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0][0], "Gene");
//! assert_eq!(records[1][0], "xkdK");
//! ```
use std::fmt::Display;

/// A row type that can be rendered as a record of string fields
pub trait Record {
    /// The names of the fields, in the order of [`Record::fields`]
    const HEADER: &'static [&'static str];

    /// Returns the fields of the row as strings
    fn fields(&self) -> Vec<String>;
}

/// Ordered rows with an optional header record
#[derive(Debug, Clone, PartialEq)]
pub struct Table<T> {
    include_header: bool,
    rows: Vec<T>,
}

impl<T> Table<T> {
    /// Constructs a new [`Table`]
    pub fn new(rows: Vec<T>, include_header: bool) -> Self {
        Self {
            include_header,
            rows,
        }
    }

    /// The data rows, without the header
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Consumes the table and returns the data rows
    pub fn into_rows(self) -> Vec<T> {
        self.rows
    }

    /// The number of data rows, not counting the header
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no data rows
    ///
    /// A table can be empty and still render a header record.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns `true` if the header record was requested
    pub fn has_header(&self) -> bool {
        self.include_header
    }

    /// Iterates the data rows
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }
}

impl<T: Record> Table<T> {
    /// The header record, if it was requested
    pub fn header(&self) -> Option<&'static [&'static str]> {
        self.include_header.then_some(T::HEADER)
    }

    /// Iterates all records as string fields, starting with the header if requested
    pub fn records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.header()
            .map(|header| header.iter().map(|s| (*s).to_string()).collect::<Vec<String>>())
            .into_iter()
            .chain(self.rows.iter().map(T::fields))
    }
}

impl<'a, T> IntoIterator for &'a Table<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Renders all records as tab separated lines
impl<T: Record> Display for Table<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for record in self.records() {
            writeln!(f, "{}", record.join("\t"))?;
        }
        Ok(())
    }
}

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

use std::num::TryFromIntError;
use thiserror::Error;

pub mod annotations;
pub mod parser;
pub mod stats;
pub mod table;
pub mod term;
mod store;

pub use annotations::{Gene, Genes};
pub use store::{AssociationStore, Dataset, StoreConfig, SymbolPolicy};
pub use stats::TermEnrichment;
pub use table::{Record, Table};
pub use term::{Association, Mode, Term, TermType};

/// Name of the gene metadata export table
const GENE_FILENAME: &str = "gene_names_description";
/// Name of the hierarchical category export table
const CATEGORY_FILENAME: &str = "geneCategories.csv";
/// Name of the regulation export table
const REGULATION_FILENAME: &str = "regulations.csv";
/// Name of the operon export table
const OPERON_FILENAME: &str = "operons.csv";

const DEFAULT_NUM_GENES: usize = 5_000;
const DEFAULT_NUM_ASSOCIATIONS: usize = 30_000;

/// Main Error type for this crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SubtiError {
    /// Indicates that a method or feature is not yet implemented
    #[error("not implemented")]
    NotImplemented,
    /// The backing storage could not be opened or read
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    /// Failed to parse the binary snapshot of a dataset
    #[error("unable to parse binary data")]
    ParseBinaryError,
    /// The source data or an argument is not valid
    #[error("invalid input data: {0}")]
    InvalidInput(String),
    /// Failed to convert an integer to or from a smaller type
    #[error("cannot convert int to smaller type")]
    TryFromIntError(#[from] TryFromIntError),
}

/// Shortcut for `Result<T, SubtiError>`
pub type SubtiResult<T> = Result<T, SubtiError>;

/// Returns a `u32` from the 4 first 4 bytes
///
/// # Panics
///
/// Panics when fewer than 4 bytes are provided
fn u32_from_bytes(bytes: &[u8]) -> u32 {
    u32::from_be_bytes(bytes[0..4].try_into().expect("slice with incorrect length"))
}

/// Converts a `usize` length into the `u32` used by the binary format
///
/// # Panics
///
/// Panics if the length does not fit into a `u32`
fn usize_to_u32(n: usize) -> u32 {
    n.try_into().expect("length must fit into u32")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_u32_from_bytes() {
        assert_eq!(u32_from_bytes(&[0, 0, 0, 1]), 1);
        assert_eq!(u32_from_bytes(&[0, 0, 1, 0, 9]), 256);
        assert_eq!(u32_from_bytes(&[1, 0, 0, 0]), 16_777_216);
    }
}

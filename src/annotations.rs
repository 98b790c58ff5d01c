//! Gene metadata
//!
//! [`Gene`]s carry the descriptive information of SubtiWiki genes:
//! their symbol, locus tag, description and literature references.
//! The metadata is independent of the term associations. The set of
//! symbols with metadata defines the gene universe of the enrichment.

mod gene;
pub use gene::{Gene, Genes};

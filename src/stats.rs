//! Statistical analyses of gene sets
//!
//! This module contains methods to calculate the enrichment of [`Term`]s
//! within a set of genes, e.g. the differentially expressed genes of an
//! experiment.
//!
//! At the moment, `subtiwiki` provides only the hypergeometric enrichment
//! analysis, see [`hypergeom::term_enrichment`].

use smallvec::SmallVec;

use crate::table::Record;
use crate::term::{Term, TermType};

pub mod hypergeom;

/// The genes of a query set that are members of a term
///
/// Most enriched terms overlap with only a few query genes,
/// so they are stored inline.
pub type Overlap = SmallVec<[String; 4]>;

/// The p-value and fold enrichment of an enriched [`Term`]
///
/// [`TermEnrichment`] is returned from enrichment methods, such as
/// [`hypergeom::term_enrichment`] and
/// [`AssociationStore::enrich`](`crate::AssociationStore::enrich`).
#[derive(Debug, Clone, PartialEq)]
pub struct TermEnrichment {
    term: Term,
    pvalue: f64,
    overlap: Overlap,
    term_size: u64,
    enrichment: f64,
}

impl TermEnrichment {
    /// Constructs a `TermEnrichment`
    pub fn new(term: Term, pvalue: f64, overlap: Overlap, term_size: u64, enrichment: f64) -> Self {
        Self {
            term,
            pvalue,
            overlap,
            term_size,
            enrichment,
        }
    }

    /// The enriched [`Term`]
    pub fn term(&self) -> &Term {
        &self.term
    }

    /// The [`TermType`] of the enriched term
    pub fn term_type(&self) -> TermType {
        self.term.term_type()
    }

    /// The name of the enriched term
    pub fn name(&self) -> &str {
        self.term.name()
    }

    /// Returns the p-value of the enrichment
    ///
    /// The p-value is the probability to observe at least as many
    /// query genes in the term by chance. It is reported exactly as
    /// calculated, so rounding errors can make it `0` or even slightly
    /// negative for extremely enriched terms.
    pub fn pvalue(&self) -> f64 {
        self.pvalue
    }

    /// The query genes that are members of the term, sorted
    pub fn overlap(&self) -> &[String] {
        &self.overlap
    }

    /// Returns the number of query genes in the term
    pub fn count(&self) -> u64 {
        u64_from_usize(self.overlap.len())
    }

    /// The number of genes in the term
    pub fn term_size(&self) -> u64 {
        self.term_size
    }

    /// Returns the fold enrichment over the background population
    pub fn enrichment(&self) -> f64 {
        self.enrichment
    }
}

impl Record for TermEnrichment {
    const HEADER: &'static [&'static str] = &["Term Type", "Term", "P-value", "Overlapping Genes"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.term_type().to_string(),
            self.name().to_string(),
            format!("{:e}", self.pvalue),
            self.overlap.join(","),
        ]
    }
}

/// Converts a collection size into the `u64` counts of the statistics
fn u64_from_usize(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

/// We have to frequently do divisions starting with u64 values
/// and need to return f64 values. Gene and term counts are far below
/// the 2^52 limit of lossless conversion.
#[allow(clippy::cast_precision_loss)]
fn f64_from_u64(n: u64) -> f64 {
    n as f64
}

#[cfg(test)]
mod test {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn record_fields() {
        let enrichment = TermEnrichment::new(
            Term::new(TermType::Regulations, "Xpf Regulon sigma factor"),
            0.000_054_71,
            smallvec!["xkdF".to_string(), "xkdG".to_string()],
            5,
            8.0,
        );
        let fields = enrichment.fields();
        assert_eq!(fields.len(), TermEnrichment::HEADER.len());
        assert_eq!(fields[0], "regulations");
        assert_eq!(fields[1], "Xpf Regulon sigma factor");
        assert_eq!(fields[2], "5.471e-5");
        assert_eq!(fields[3], "xkdF,xkdG");
        assert_eq!(enrichment.count(), 2);
    }
}

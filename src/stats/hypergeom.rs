//! Calculate the enrichment of terms in a set of genes and the probability
//! of enrichment within the hypergeometric distribution.
//!
//! The gene universe (the population) are all genes with metadata,
//! see [`AssociationStore::all_genes`]. Every term is a sample of marked
//! genes within this population and the query genes are the draws.
//!
//! # Examples
//!
//! ```
//! use subtiwiki::{AssociationStore, Mode};
//! use subtiwiki::stats::hypergeom::term_enrichment;
//!
//! let store = AssociationStore::from_source_tables("tests/data").unwrap();
//!
//! let enrichments = term_enrichment(&store, ["xkdK", "xkdG", "xkdF", "xkdO"], Mode::All);
//!
//! // the results are sorted by ascending p-value
//! assert!(enrichments.first().unwrap().pvalue() < enrichments.last().unwrap().pvalue());
//!
//! for term in enrichments {
//!     println!("{}\t{}\t({})", term.term(), term.pvalue(), term.enrichment());
//! }
//! ```

use statrs::distribution::{DiscreteCDF, Hypergeometric};
use tracing::debug;

use crate::stats::{f64_from_u64, u64_from_usize, Overlap, TermEnrichment};
use crate::term::Mode;
use crate::AssociationStore;

/// Calculates the hypergeometric enrichment of all terms of `mode` within the `query` genes
///
/// For every term, the p-value is the probability to draw at least as many
/// term members as there are in the query when drawing `query.len()` genes
/// from the gene universe.
///
/// The query is deduplicated first. Genes that are not part of the universe
/// still count towards the number of draws.
///
/// Terms are skipped if
/// - none of their members is part of the query
/// - the distribution cannot be built, e.g. because the query is
///   larger than the universe
///
/// The result is sorted by ascending p-value.
///
/// # Examples
///
/// ```
/// use subtiwiki::{AssociationStore, Mode, TermType};
/// use subtiwiki::stats::hypergeom::term_enrichment;
///
/// let store = AssociationStore::from_source_tables("tests/data").unwrap();
///
/// let enrichments = term_enrichment(&store, ["spoIIAA", "spoIIAB", "sigF"], Mode::Operons);
/// let best = enrichments.first().unwrap();
///
/// assert_eq!(best.term_type(), TermType::Operons);
/// assert_eq!(best.name(), "spoIIAA-spoIIAB-sigF");
/// assert_eq!(best.overlap(), ["sigF", "spoIIAA", "spoIIAB"]);
/// assert!(enrichments.iter().all(|term| term.term_type() == TermType::Operons));
/// ```
pub fn term_enrichment<I, S>(store: &AssociationStore, query: I, mode: Mode) -> Vec<TermEnrichment>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let query = store.query_set(query);
    let population = u64_from_usize(store.all_genes().len());
    let draws = u64_from_usize(query.len());

    let mut res = Vec::new();
    if query.is_empty() {
        return res;
    }

    for term in store.terms(mode).iter() {
        let members = store.term_genes(term.name());
        if members.is_empty() {
            debug!("Skipping {}: no members", term);
            continue;
        }
        let overlap: Overlap = query.intersection(&members).cloned().collect();
        if overlap.is_empty() {
            continue;
        }

        let successes = u64_from_usize(members.len());
        let observed_successes = u64_from_usize(overlap.len());
        let Some(pvalue) = pvalue(population, successes, draws, observed_successes) else {
            debug!(
                "Skipping {}: invalid parameters Population: {}, Successes: {}, Draws: {}",
                term, population, successes, draws
            );
            continue;
        };
        let enrichment = (f64_from_u64(observed_successes) / f64_from_u64(draws))
            / (f64_from_u64(successes) / f64_from_u64(population));

        debug!(
            "Term:{}\tPopulation: {}, Successes: {}, Draws: {}, Observed: {}",
            term, population, successes, draws, observed_successes
        );
        res.push(TermEnrichment::new(
            term.clone(),
            pvalue,
            overlap,
            successes,
            enrichment,
        ));
    }

    res.sort_by(|a, b| a.pvalue().total_cmp(&b.pvalue()));
    res
}

/// Returns the probability to observe `observed_successes` or more successes
///
/// - `population`: The number of genes in the universe
/// - `successes`: The number of genes in the term
/// - `draws`: The number of genes in the query
///
/// Returns `None` if the parameters do not describe a valid
/// hypergeometric distribution, i.e. `successes` or `draws` are
/// larger than the `population`.
///
/// The value is calculated as `1 - CDF(observed_successes - 1)` and is
/// returned as is. For very small probabilities it can be `0` or negative.
///
/// # Examples
///
/// ```
/// use subtiwiki::stats::hypergeom::pvalue;
///
/// let p = pvalue(40, 5, 4, 4).unwrap();
/// assert!((p - 5.0 / 91_390.0).abs() < 1e-12);
///
/// assert!(pvalue(40, 41, 4, 1).is_none());
/// ```
pub fn pvalue(
    population: u64,
    successes: u64,
    draws: u64,
    observed_successes: u64,
) -> Option<f64> {
    let hyper = Hypergeometric::new(population, successes, draws).ok()?;
    if observed_successes == 0 {
        return Some(1.0);
    }
    // subtracting 1, because we want to test including observed_successes
    // e.g. "7 or more", but the cdf includes "7" already
    Some(1.0 - hyper.cdf(observed_successes - 1))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Dataset, Gene};

    #[test]
    fn known_pvalue() {
        let p = pvalue(50, 25, 13, 8).unwrap();
        assert!((p - 0.260_097_374_777_381).abs() < 1e-9);
    }

    #[test]
    fn pvalue_decreases_with_overlap() {
        let mut previous = pvalue(50, 25, 13, 0).unwrap();
        for observed in 1..=13 {
            let p = pvalue(50, 25, 13, observed).unwrap();
            assert!(p < previous, "{observed}: {p} >= {previous}");
            previous = p;
        }
    }

    #[test]
    fn rounding_errors_are_not_clamped() {
        let p = pvalue(4000, 30, 30, 29).unwrap();
        assert!(p < 0.0, "{p}");
        assert!(p > -1e-9);
    }

    #[test]
    fn invalid_parameters() {
        assert!(pvalue(10, 11, 2, 1).is_none());
        assert!(pvalue(10, 2, 11, 1).is_none());
    }

    fn store() -> AssociationStore {
        let mut data = Dataset::default();
        for symbol in ["comK", "comS", "degU", "sinR", "spo0A", "abrB"] {
            data.add_gene(Gene::new(symbol, "", ""));
        }
        data.add_category("comK", "Genetic competence", 2).unwrap();
        data.add_category("comS", "Genetic competence", 2).unwrap();
        data.add_category("degU", "Genetic competence", 2).unwrap();
        data.add_regulation("abrB", "Spo0A regulon", Some("repression"));
        data.add_regulation("sinR", "Spo0A regulon", Some("repression"));
        data.add_operon("comS", "comS");
        AssociationStore::new(data)
    }

    #[test]
    fn skips_terms_without_overlap() {
        let store = store();
        let res = term_enrichment(&store, ["comK", "comS"], Mode::All);
        assert_eq!(res.len(), 2);
        assert!(res.iter().all(|t| t.name() != "Spo0A regulon repression"));
        assert_eq!(res[0].name(), "Genetic competence");
        assert_eq!(res[0].overlap(), ["comK", "comS"]);
        assert_eq!(res[1].name(), "comS");
        assert_eq!(res[1].term_size(), 1);
    }

    #[test]
    fn unknown_genes_count_as_draws() {
        let store = store();
        let known = term_enrichment(&store, ["comK"], Mode::Category);
        let unknown = term_enrichment(&store, ["comK", "yqaF"], Mode::Category);
        assert_eq!(known[0].overlap(), unknown[0].overlap());
        assert!(known[0].pvalue() < unknown[0].pvalue());
    }

    #[test]
    fn query_larger_than_universe() {
        let store = store();
        let query = ["comK", "a", "b", "c", "d", "e", "f"];
        assert!(term_enrichment(&store, query, Mode::All).is_empty());
    }

    #[test]
    fn query_larger_than_universe_skips_overlapping_terms() {
        let mut data = Dataset::default();
        for symbol in ["a", "b", "c"] {
            data.add_gene(Gene::new(symbol, "", ""));
        }
        data.add_category("a", "R", 1).unwrap();
        data.add_category("b", "R", 1).unwrap();
        let store = AssociationStore::new(data);

        assert_eq!(term_enrichment(&store, ["a", "b", "x"], Mode::All).len(), 1);
        assert!(term_enrichment(&store, ["a", "b", "x", "y"], Mode::All).is_empty());
    }

    #[test]
    fn duplicate_query_genes() {
        let store = store();
        let once = term_enrichment(&store, ["degU"], Mode::All);
        let twice = term_enrichment(&store, ["degU", "degU"], Mode::All);
        assert_eq!(once, twice);
    }

    #[test]
    fn fold_enrichment() {
        let store = store();
        let res = term_enrichment(&store, ["comK", "comS", "degU"], Mode::Category);
        // (3 / 3) / (3 / 6)
        assert!((res[0].enrichment() - 2.0).abs() < f64::EPSILON);
    }
}

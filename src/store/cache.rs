use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::annotations::{Gene, Genes};
use crate::term::{Mode, Term};

/// Memoized query results of a single [`AssociationStore`](`crate::AssociationStore`)
///
/// Every operation has its own map, keyed by the operation's arguments.
/// Entries are never evicted: the data of a store is immutable and the
/// number of distinct genes and terms is finite. Lookups of unknown genes
/// or terms must not be memoized, they get the shared empty results
/// instead. The cache is dropped together with the data it was built from.
#[derive(Debug, Default)]
pub(crate) struct QueryCache {
    all_genes: OnceLock<Arc<Genes>>,
    terms: RwLock<HashMap<Mode, Arc<Vec<Term>>>>,
    term_genes: RwLock<HashMap<String, Arc<Genes>>>,
    typed_term_genes: RwLock<HashMap<Term, Arc<Genes>>>,
    gene_records: RwLock<HashMap<String, Arc<Vec<Gene>>>>,
    no_genes: Arc<Genes>,
    no_records: Arc<Vec<Gene>>,
}

impl QueryCache {
    pub fn all_genes<F: FnOnce() -> Genes>(&self, compute: F) -> Arc<Genes> {
        Arc::clone(self.all_genes.get_or_init(|| Arc::new(compute())))
    }

    pub fn terms<F: FnOnce() -> Vec<Term>>(&self, mode: Mode, compute: F) -> Arc<Vec<Term>> {
        memoize(&self.terms, &mode, compute)
    }

    pub fn term_genes<F: FnOnce() -> Genes>(&self, name: &str, compute: F) -> Arc<Genes> {
        memoize(&self.term_genes, name, compute)
    }

    pub fn typed_term_genes<F: FnOnce() -> Genes>(&self, term: &Term, compute: F) -> Arc<Genes> {
        memoize(&self.typed_term_genes, term, compute)
    }

    pub fn gene_records<F: FnOnce() -> Vec<Gene>>(
        &self,
        symbol: &str,
        compute: F,
    ) -> Arc<Vec<Gene>> {
        memoize(&self.gene_records, symbol, compute)
    }

    /// The empty gene set, returned for unknown terms
    pub fn no_genes(&self) -> Arc<Genes> {
        Arc::clone(&self.no_genes)
    }

    /// The empty record list, returned for unknown genes
    pub fn no_records(&self) -> Arc<Vec<Gene>> {
        Arc::clone(&self.no_records)
    }

    /// The total number of memoized results
    pub fn len(&self) -> usize {
        usize::from(self.all_genes.get().is_some())
            + entries(&self.terms)
            + entries(&self.term_genes)
            + entries(&self.typed_term_genes)
            + entries(&self.gene_records)
    }
}

/// Returns the cached value for `key` or computes and caches it
///
/// If two threads miss the same key at once, both compute the value
/// but only the first one is stored and returned to both.
fn memoize<K, Q, V, F>(map: &RwLock<HashMap<K, Arc<V>>>, key: &Q, compute: F) -> Arc<V>
where
    K: Borrow<Q> + Hash + Eq,
    Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    F: FnOnce() -> V,
{
    {
        let cache = map.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = cache.get(key) {
            return Arc::clone(hit);
        }
    }
    let value = Arc::new(compute());
    let mut cache = map.write().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(cache.entry(key.to_owned()).or_insert(value))
}

fn entries<K, V>(map: &RwLock<HashMap<K, V>>) -> usize {
    map.read().unwrap_or_else(PoisonError::into_inner).len()
}

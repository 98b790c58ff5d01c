use core::fmt::Debug;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::annotations::{Gene, Genes};
use crate::stats::hypergeom::term_enrichment;
use crate::stats::TermEnrichment;
use crate::table::Table;
use crate::term::{Association, Mode, Term, TermType};
use crate::SubtiResult;

mod cache;
mod config;
mod dataset;
use cache::QueryCache;
pub use config::{StoreConfig, SymbolPolicy};
pub use dataset::Dataset;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// `AssociationStore` is the main interface of the `subtiwiki` crate
///
/// The store holds the gene metadata and all term-gene associations
/// of a [`Dataset`] and answers the four queries of an enrichment
/// analysis:
///
/// - list all genes: [`AssociationStore::all_genes`]
/// - fetch the metadata of genes: [`AssociationStore::gene_info`]
/// - list all terms, optionally of a single type: [`AssociationStore::terms`]
/// - rank terms by enrichment of a gene set: [`AssociationStore::enrich`]
///
/// # Examples
///
/// ```
/// use subtiwiki::{AssociationStore, Mode};
///
/// let store = AssociationStore::from_source_tables("tests/data").unwrap();
///
/// let result = store.enrich(["xkdK", "xkdG", "xkdF", "xkdO"], Mode::All, false);
/// let best = &result.rows()[0];
/// assert_eq!(best.name(), "Xpf Regulon sigma factor");
///
/// for row in &result {
///     println!("{}\t{}\t{:e}", row.term_type(), row.name(), row.pvalue());
/// }
/// ```
///
/// # Construction
///
/// The data is loaded once and never modified afterwards:
///
/// 1. From the SubtiWiki export tables: [`AssociationStore::from_source_tables`]
/// 2. From a binary snapshot: [`AssociationStore::from_binary`].
///    Snapshots are created from a [`Dataset`] with [`Dataset::as_bytes`].
/// 3. From a [`Dataset`] that was filled manually: [`AssociationStore::new`]
///
/// # Layout
///
/// Genes and terms have a many-to-many relationship that is stored as
/// individual associations. Gene metadata is stored independently, so a
/// gene can be associated to terms without having metadata and vice versa.
///
/// ```mermaid
/// erDiagram
///     TERM ||--|{ ASSOCIATION : groups
///     ASSOCIATION }|--|| SYMBOL : links
///     GENE |o--|| SYMBOL : describes
///     TERM {
///         TermType term_type
///         str name
///     }
///     ASSOCIATION {
///         str term
///         str gene
///         TermType term_type
///         u8 level
///     }
///     GENE {
///         str symbol
///         str locus
///         str description
///         str reviews
///         str papers
///     }
/// ```
///
/// # Caching
///
/// All queries are memoized per store. Repeated calls with the same
/// arguments return the same shared result without reading the
/// underlying tables again. The cache is only invalidated by
/// [`AssociationStore::replace_dataset`].
///
/// The store is `Send` and `Sync`, so a single instance can be shared
/// between threads, e.g. inside an `Arc`.
pub struct AssociationStore {
    dataset: Dataset,
    config: StoreConfig,
    genes_by_symbol: HashMap<String, Vec<usize>>,
    rows_by_term: HashMap<String, Vec<usize>>,
    cache: QueryCache,
    storage_reads: AtomicUsize,
}

impl Debug for AssociationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AssociationStore with {} genes and {} associations",
            self.dataset.genes().len(),
            self.dataset.associations().len()
        )
    }
}

/// Construction of the store
impl AssociationStore {
    /// Builds a store from `dataset` with the default [`StoreConfig`]
    pub fn new(dataset: Dataset) -> Self {
        Self::with_config(dataset, StoreConfig::default())
    }

    /// Builds a store from `dataset`
    ///
    /// # Examples
    ///
    /// ```
    /// use subtiwiki::{AssociationStore, Dataset, Gene, StoreConfig, SymbolPolicy};
    ///
    /// let mut data = Dataset::default();
    /// data.add_gene(Gene::new("xkdK", "BSU12660", ""));
    ///
    /// let config = StoreConfig::default().with_symbol_policy(SymbolPolicy::CaseFold);
    /// let store = AssociationStore::with_config(data, config);
    /// assert_eq!(store.gene_info(["XKDK"], false).len(), 1);
    /// ```
    pub fn with_config(dataset: Dataset, config: StoreConfig) -> Self {
        let mut store = Self {
            dataset: Dataset::default(),
            config,
            genes_by_symbol: HashMap::new(),
            rows_by_term: HashMap::new(),
            cache: QueryCache::default(),
            storage_reads: AtomicUsize::new(0),
        };
        store.replace_dataset(dataset);
        store
    }

    /// Loads the store from a binary snapshot
    ///
    /// # Errors
    ///
    /// - The file cannot be opened or read: [`SubtiError::StorageUnavailable`](`crate::SubtiError::StorageUnavailable`)
    /// - The snapshot is malformed: [`SubtiError::ParseBinaryError`](`crate::SubtiError::ParseBinaryError`)
    pub fn from_binary<P: AsRef<Path>>(filename: P) -> SubtiResult<Self> {
        Ok(Self::new(Dataset::from_binary(filename)?))
    }

    /// Parses the store from the SubtiWiki export tables in `folder`
    ///
    /// # Errors
    ///
    /// See [`Dataset::from_source_tables`]
    pub fn from_source_tables<P: AsRef<Path>>(folder: P) -> SubtiResult<Self> {
        Ok(Self::new(Dataset::from_source_tables(folder)?))
    }

    /// Replaces the data of the store
    ///
    /// This rebuilds all indexes and drops every cached result.
    pub fn replace_dataset(&mut self, dataset: Dataset) {
        let policy = self.config.symbol_policy();

        let mut genes_by_symbol: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, gene) in dataset.genes().iter().enumerate() {
            genes_by_symbol
                .entry(policy.canonicalize(gene.symbol()).into_owned())
                .or_default()
                .push(idx);
        }

        let mut rows_by_term: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, association) in dataset.associations().iter().enumerate() {
            rows_by_term
                .entry(association.term().to_string())
                .or_default()
                .push(idx);
        }

        info!(
            "Indexed {} gene records ({} symbols) and {} associations ({} term names)",
            dataset.genes().len(),
            genes_by_symbol.len(),
            dataset.associations().len(),
            rows_by_term.len()
        );

        self.dataset = dataset;
        self.genes_by_symbol = genes_by_symbol;
        self.rows_by_term = rows_by_term;
        self.cache = QueryCache::default();
    }
}

/// Queries of the store
impl AssociationStore {
    /// The underlying [`Dataset`]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The [`StoreConfig`] of the store
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns all distinct gene symbols that have metadata
    ///
    /// This set is the gene universe of the enrichment analysis. Genes that
    /// only appear in associations are not part of it.
    ///
    /// # Examples
    ///
    /// ```
    /// use subtiwiki::AssociationStore;
    ///
    /// let store = AssociationStore::from_source_tables("tests/data").unwrap();
    /// let genes = store.all_genes();
    /// assert!(genes.contains("xkdK"));
    /// assert!(!genes.contains("yqaF"));
    /// ```
    pub fn all_genes(&self) -> Arc<Genes> {
        self.cache.all_genes(|| {
            self.count_read();
            debug!("Collecting the gene universe");
            self.dataset
                .genes()
                .iter()
                .map(|gene| self.canonical(gene.symbol()).into_owned())
                .collect()
        })
    }

    /// Returns the metadata of the requested genes
    ///
    /// The records are returned in the order of `symbols`. Symbols without
    /// metadata are silently skipped. If several records exist for a symbol,
    /// all of them are returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use subtiwiki::{AssociationStore, Gene, Record};
    ///
    /// let store = AssociationStore::from_source_tables("tests/data").unwrap();
    ///
    /// let info = store.gene_info(["xkdK", "foobar", "abrB"], true);
    /// assert_eq!(info.header(), Some(Gene::HEADER));
    /// assert_eq!(info.len(), 2);
    /// assert_eq!(info.rows()[0].symbol(), "xkdK");
    /// assert_eq!(info.rows()[1].symbol(), "abrB");
    /// ```
    pub fn gene_info<I, S>(&self, symbols: I, include_header: bool) -> Table<Gene>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rows = Vec::new();
        for symbol in symbols {
            rows.extend(self.gene_records(symbol.as_ref()).iter().cloned());
        }
        Table::new(rows, include_header)
    }

    /// Returns all metadata records of a single gene
    ///
    /// The result is empty if the gene has no metadata.
    pub fn gene_records(&self, symbol: &str) -> Arc<Vec<Gene>> {
        let symbol = self.canonical(symbol);
        let Some(rows) = self.genes_by_symbol.get(symbol.as_ref()) else {
            return self.cache.no_records();
        };
        self.cache.gene_records(&symbol, || {
            self.count_read();
            rows.iter()
                .map(|idx| self.dataset.genes()[*idx].clone())
                .collect()
        })
    }

    /// Returns all distinct terms that are selected by `mode`
    ///
    /// The terms are listed in the order in which they first
    /// appear in the associations.
    ///
    /// # Examples
    ///
    /// ```
    /// use subtiwiki::{AssociationStore, Mode, TermType};
    ///
    /// let store = AssociationStore::from_source_tables("tests/data").unwrap();
    ///
    /// let operons = store.terms(Mode::Operons);
    /// assert!(!operons.is_empty());
    /// assert!(operons.iter().all(|term| term.term_type() == TermType::Operons));
    /// ```
    pub fn terms(&self, mode: Mode) -> Arc<Vec<Term>> {
        self.cache.terms(mode, || {
            self.count_read();
            debug!("Collecting terms of mode {}", mode);
            let mut seen: HashSet<(TermType, &str)> = HashSet::new();
            self.dataset
                .associations()
                .iter()
                .filter(|association| mode.includes(association.term_type()))
                .filter(|association| seen.insert((association.term_type(), association.term())))
                .map(Association::to_term)
                .collect()
        })
    }

    /// Returns all genes associated with a term name
    ///
    /// The lookup uses the name only: if terms of different types share the
    /// same name, the genes of all of them are returned. Use
    /// [`AssociationStore::term_genes_typed`] to restrict the lookup to a single type.
    ///
    /// The result is empty if no term has this name.
    pub fn term_genes(&self, name: &str) -> Arc<Genes> {
        if !self.rows_by_term.contains_key(name) {
            debug!("No associations for term {}", name);
            return self.cache.no_genes();
        }
        self.cache.term_genes(name, || {
            self.count_read();
            self.member_genes(name, |_| true)
        })
    }

    /// Returns all genes associated with the [`Term`], respecting its type
    pub fn term_genes_typed(&self, term: &Term) -> Arc<Genes> {
        if !self.rows_by_term.contains_key(term.name()) {
            debug!("No associations for term {}", term);
            return self.cache.no_genes();
        }
        self.cache.typed_term_genes(term, || {
            self.count_read();
            self.member_genes(term.name(), |association| {
                association.term_type() == term.term_type()
            })
        })
    }

    /// Ranks all terms of `mode` by the enrichment of the `query` genes
    ///
    /// Terms that do not contain any of the query genes are not part of the
    /// result. Terms are also skipped if the hypergeometric distribution
    /// cannot be built, i.e. if the deduplicated query has more genes than
    /// [`AssociationStore::all_genes`] or the term has more members than
    /// the universe. In that case no term is reported, even terms that
    /// overlap the query. The rows are sorted by ascending p-value; the order of rows
    /// with identical p-values is not defined.
    ///
    /// See [`term_enrichment`] for the details of the calculation.
    ///
    /// # Examples
    ///
    /// ```
    /// use subtiwiki::{AssociationStore, Mode, TermEnrichment, Record};
    ///
    /// let store = AssociationStore::from_source_tables("tests/data").unwrap();
    ///
    /// let result = store.enrich(Vec::<String>::new(), Mode::All, true);
    /// assert!(result.is_empty());
    /// assert_eq!(result.header(), Some(TermEnrichment::HEADER));
    /// ```
    pub fn enrich<I, S>(&self, query: I, mode: Mode, include_header: bool) -> Table<TermEnrichment>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Table::new(term_enrichment(self, query, mode), include_header)
    }

    /// The number of times the underlying tables were read
    ///
    /// Every cache miss reads the tables once, cache hits don't.
    pub fn storage_reads(&self) -> usize {
        self.storage_reads.load(Ordering::Relaxed)
    }

    /// The number of memoized query results
    pub fn cached_results(&self) -> usize {
        self.cache.len()
    }

    /// Deduplicates the query genes, applying the [`SymbolPolicy`]
    pub(crate) fn query_set<I, S>(&self, query: I) -> Genes
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        query
            .into_iter()
            .map(|symbol| self.canonical(symbol.as_ref()).into_owned())
            .collect()
    }

    fn canonical<'a>(&self, symbol: &'a str) -> Cow<'a, str> {
        self.config.symbol_policy().canonicalize(symbol)
    }

    fn member_genes<F>(&self, name: &str, filter: F) -> Genes
    where
        F: Fn(&Association) -> bool,
    {
        let Some(rows) = self.rows_by_term.get(name) else {
            return Genes::new();
        };
        rows.iter()
            .map(|idx| &self.dataset.associations()[*idx])
            .filter(|association| filter(association))
            .map(|association| self.canonical(association.gene()).into_owned())
            .collect()
    }

    fn count_read(&self) {
        self.storage_reads.fetch_add(1, Ordering::Relaxed);
    }
}

use std::collections::HashSet;

use subtiwiki::{AssociationStore, Mode, Record, TermEnrichment, TermType};

const XPF_QUERY: [&str; 4] = ["xkdK", "xkdG", "xkdF", "xkdO"];

fn store() -> AssociationStore {
    AssociationStore::from_source_tables("tests/data").expect("fixture tables must be valid")
}

#[test]
fn xpf_regulon_is_most_enriched() {
    let store = store();
    let result = store.enrich(XPF_QUERY, Mode::All, false);
    assert!(result.len() > 1);
    assert!(result.header().is_none());

    let best = &result.rows()[0];
    assert_eq!(best.name(), "Xpf Regulon sigma factor");
    assert_eq!(best.term_type(), TermType::Regulations);
    assert!(!best.overlap().is_empty());
    assert!(best.overlap().iter().all(|gene| XPF_QUERY.contains(&gene.as_str())));
    for other in &result.rows()[1..] {
        assert!(best.pvalue() < other.pvalue());
    }

    // 4 out of 5 regulon members in a query of 4 from 40 genes
    assert!((best.pvalue() - 5.0 / 91_390.0).abs() < 1e-12);
    assert_eq!(best.term_size(), 5);
}

#[test]
fn results_are_sorted() {
    let store = store();
    let result = store.enrich(["sigF", "spoIIAA", "abrB", "comK", "yqaF"], Mode::All, false);
    assert!(!result.is_empty());
    for pair in result.rows().windows(2) {
        assert!(pair[0].pvalue() <= pair[1].pvalue());
    }
}

#[test]
fn enrichment_is_idempotent() {
    let store = store();
    let first = store.enrich(XPF_QUERY, Mode::All, false);

    // populate other cache entries in between
    store.enrich(["sinR", "sinI"], Mode::Operons, false);
    store.terms(Mode::Category);

    let second = store.enrich(XPF_QUERY.iter().rev(), Mode::All, false);
    let fresh = AssociationStore::from_source_tables("tests/data")
        .unwrap()
        .enrich(XPF_QUERY, Mode::All, false);

    let key = |row: &TermEnrichment| (row.term().clone(), row.pvalue(), row.overlap().to_vec());
    let mut first: Vec<_> = first.iter().map(key).collect();
    let mut second: Vec<_> = second.iter().map(key).collect();
    let mut fresh: Vec<_> = fresh.iter().map(key).collect();
    first.sort_by(|a, b| a.0.cmp(&b.0));
    second.sort_by(|a, b| a.0.cmp(&b.0));
    fresh.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(first, second);
    assert_eq!(first, fresh);
}

#[test]
fn terms_without_overlap_are_absent() {
    let store = store();
    let query = ["comK", "comS"];
    let result = store.enrich(query, Mode::All, false);
    let reported: HashSet<_> = result.iter().map(|row| row.term().clone()).collect();

    for term in store.terms(Mode::All).iter() {
        let members = store.term_genes(term.name());
        let overlaps = query.iter().any(|gene| members.contains(*gene));
        assert_eq!(overlaps, reported.contains(term), "{term}");
    }
}

#[test]
fn mode_restricts_term_types() {
    let store = store();
    for mode in [Mode::Category, Mode::Regulations, Mode::Operons] {
        let result = store.enrich(XPF_QUERY, mode, false);
        assert!(!result.is_empty());
        assert!(result.iter().all(|row| Some(row.term_type()) == mode.term_type()));
    }
}

#[test]
fn mode_partitions_terms() {
    let store = store();
    let all: HashSet<_> = store.terms(Mode::All).iter().cloned().collect();

    let mut union = HashSet::new();
    for term_type in TermType::ALL {
        let terms = store.terms(Mode::from(term_type));
        assert!(terms.iter().all(|term| term.term_type() == term_type));
        union.extend(terms.iter().cloned());
    }
    assert_eq!(union, all);
}

#[test]
fn empty_query() {
    let store = store();
    for mode in Mode::MODES {
        assert!(store.enrich(Vec::<&str>::new(), mode, false).is_empty());
    }

    let with_header = store.enrich(Vec::<&str>::new(), Mode::All, true);
    let records: Vec<Vec<String>> = with_header.records().collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], TermEnrichment::HEADER);
}

#[test]
fn header_record() {
    let store = store();
    let result = store.enrich(XPF_QUERY, Mode::Regulations, true);
    let records: Vec<Vec<String>> = result.records().collect();
    assert_eq!(records[0], ["Term Type", "Term", "P-value", "Overlapping Genes"]);
    assert_eq!(records[1][0], "regulations");
    assert_eq!(records[1][1], "Xpf Regulon sigma factor");
    assert_eq!(records[1][3], "xkdF,xkdG,xkdK,xkdO");
    assert_eq!(records.len(), result.len() + 1);
}

#[test]
fn gene_info_lookup() {
    let store = store();
    let info = store.gene_info(["sigA", "unknown", "xkdK"], false);
    assert_eq!(info.len(), 3);
    assert_eq!(info.rows()[0].symbol(), "sigA");
    assert_eq!(info.rows()[1].symbol(), "sigA");
    assert_eq!(info.rows()[2].symbol(), "xkdK");
    assert_eq!(info.rows()[2].reviews(), "7592387,9158772");
    assert_eq!(info.rows()[2].papers(), "<pubmed>22383849</pubmed>");

    assert!(store.gene_info(["yqaF"], false).is_empty());
    assert_eq!(store.all_genes().len(), 40);
}

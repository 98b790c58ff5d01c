use std::process;

use subtiwiki::{AssociationStore, Mode};

/// Loads the store from a binary snapshot or from a folder of export tables
fn store(source: &str) -> AssociationStore {
    let res = if std::path::Path::new(source).is_dir() {
        AssociationStore::from_source_tables(source)
    } else {
        AssociationStore::from_binary(source)
    };
    match res {
        Ok(store) => store,
        Err(err) => {
            eprintln!("Unable to load {source}: {err}");
            process::exit(1)
        }
    }
}

fn main() {
    simple_logger::init_with_env().unwrap();

    let mut args = std::env::args();
    if args.len() < 3 {
        println!("Show enriched terms of a gene set\n\n");
        println!("Usage\nenrichment <DATA> xkdK,xkdG,xkdF,xkdO <MODE> <N RESULTS>");
        println!("\n<DATA>: folder with SubtiWiki export tables or a binary snapshot");
        println!("<MODE>: all, category, regulations or operons (default: all)\n");
        process::exit(1)
    }

    let store = store(&args.nth(1).unwrap());
    let query = args.next().unwrap();
    let genes: Vec<&str> = query.split(',').map(str::trim).collect();

    let mode = args
        .next()
        .map(|arg| arg.parse::<Mode>().expect("invalid mode"))
        .unwrap_or_default();

    let output_len = args
        .next()
        .map(|arg| arg.parse::<usize>().unwrap_or(10))
        .unwrap_or(10);

    let result = store.enrich(&genes, mode, true);
    let header = result.records().next();
    if let Some(header) = header {
        println!("{}", header.join("\t"));
    }
    for term in result.iter().take(output_len) {
        println!(
            "{}\t{}\t{:e}\t{}\t({:.2})",
            term.term_type(),
            term.name(),
            term.pvalue(),
            term.overlap().join(","),
            term.enrichment()
        );
    }

    println!(
        "\nQuery genes: {}\nTotal genes: {}\nTotal terms: {}",
        genes.len(),
        store.all_genes().len(),
        store.terms(mode).len()
    );
}

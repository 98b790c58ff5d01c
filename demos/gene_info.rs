use subtiwiki::AssociationStore;

fn main() {
    simple_logger::init_with_env().unwrap();

    let mut args = std::env::args();
    if args.len() < 3 {
        println!("Show the metadata of genes\n\n");
        println!("Usage\ngene_info <DATA FOLDER> sigA,xkdK");
        std::process::exit(1)
    }
    let store = AssociationStore::from_source_tables(args.nth(1).unwrap()).unwrap();
    let symbols = args.next().unwrap();

    print!("{}", store.gene_info(symbols.split(','), true));
}

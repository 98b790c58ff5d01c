use std::{fs::File, io::Write};

use subtiwiki::Dataset;

fn main() {
    simple_logger::init_with_env().unwrap();

    let mut args = std::env::args();
    if args.len() == 3 {
        let folder = args.nth(1).unwrap();
        let data = Dataset::from_source_tables(&folder).unwrap();
        println!(
            "Dataset with {} genes and {} associations",
            data.genes().len(),
            data.associations().len()
        );
        let filename = args.next().unwrap();
        let mut fh = File::create(filename).unwrap();
        match fh.write_all(&data.as_bytes()) {
            Ok(_) => println!("Saved output"),
            Err(err) => println!("Error: {}", err),
        };
    } else {
        println!("Please specify the folder of the export tables and an output file")
    }
}

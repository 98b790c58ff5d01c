//! Parsing the SubtiWiki export tables
//!
//! SubtiWiki provides its data as a set of CSV exports. Four of them
//! are needed to build a [`Dataset`]:
//!
//! - `gene_names_description`: gene metadata
//! - `geneCategories.csv`: hierarchical functional categories
//! - `regulations.csv`: regulons and the mode of regulation
//! - `operons.csv`: operons and their member genes
//!
//! All tables are identified by their header row, so the order of the
//! columns does not matter and additional columns are ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, error};

use crate::store::Dataset;
use crate::{SubtiError, SubtiResult};
use crate::{CATEGORY_FILENAME, GENE_FILENAME, OPERON_FILENAME, REGULATION_FILENAME};

pub(crate) mod binary;

/// Parses all export tables in `folder` into `data`
pub(crate) fn load_from_source_tables(folder: &Path, data: &mut Dataset) -> SubtiResult<()> {
    parse_file(&folder.join(GENE_FILENAME), data, gene_names::parse)?;
    parse_file(&folder.join(CATEGORY_FILENAME), data, categories::parse)?;
    parse_file(&folder.join(REGULATION_FILENAME), data, regulations::parse)?;
    parse_file(&folder.join(OPERON_FILENAME), data, operons::parse)?;
    debug!(
        "Parsed {} genes and {} associations from {}",
        data.genes().len(),
        data.associations().len(),
        folder.display()
    );
    Ok(())
}

/// Opens `file` and hands its CSV reader to `parse`
fn parse_file<F>(file: &Path, data: &mut Dataset, parse: F) -> SubtiResult<()>
where
    F: Fn(File, &mut Dataset) -> SubtiResult<()>,
{
    let filename = file.display().to_string();
    let handle = File::open(file).map_err(|err| {
        error!("Unable to open {}: {}", filename, err);
        SubtiError::StorageUnavailable(format!("unable to open {filename}: {err}"))
    })?;
    debug!("Parsing {}", filename);
    parse(handle, data).map_err(|err| match err {
        SubtiError::InvalidInput(msg) => SubtiError::InvalidInput(format!("{filename}: {msg}")),
        err => err,
    })
}

/// Builds a CSV reader for an export table
///
/// Fields may be quoted. Only the header names are trimmed,
/// field values are kept as they are.
fn reader<R: Read>(rdr: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(rdr)
}

fn csv_error(err: csv::Error) -> SubtiError {
    if err.is_io_error() {
        SubtiError::StorageUnavailable(err.to_string())
    } else {
        SubtiError::InvalidInput(err.to_string())
    }
}

/// Returns the index of the column `name`
fn column(headers: &StringRecord, name: &str) -> SubtiResult<usize> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| SubtiError::InvalidInput(format!("missing column {name}")))
}

/// Returns the value of a field, missing values are empty
fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or_default()
}

/// Returns the value of a field that must not be empty
fn required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> SubtiResult<&'a str> {
    match field(record, idx) {
        "" => Err(SubtiError::InvalidInput(format!(
            "empty {name} in line {}",
            record.position().map_or(0, csv::Position::line)
        ))),
        value => Ok(value),
    }
}

/// Module to parse the gene metadata from `gene_names_description`
///
/// ```text
/// "locus", "name", "description", "References.Reviews", "References.Research papers"
/// "BSU12660", "xkdK", "phage-like element PBSX protein", "<pubmed>12345</pubmed>", "<pubmed>23456</pubmed>"
/// ```
pub(crate) mod gene_names {
    use super::{column, csv_error, field, reader, required};
    use crate::annotations::Gene;
    use crate::store::Dataset;
    use crate::{SubtiError, SubtiResult};
    use std::io::{ErrorKind, Read};

    /// Characters that are removed from both ends of the review references
    const REVIEW_MARKUP: &str = "</pubmed>";

    pub fn parse<R: Read>(mut rdr: R, data: &mut Dataset) -> SubtiResult<()> {
        let mut text = String::new();
        rdr.read_to_string(&mut text).map_err(|err| match err.kind() {
            ErrorKind::InvalidData => SubtiError::InvalidInput(err.to_string()),
            _ => SubtiError::StorageUnavailable(err.to_string()),
        })?;
        let text = skip_initial_space(&text);
        let mut reader = reader(text.as_bytes());
        let headers = reader.headers().map_err(csv_error)?.clone();
        let locus = column(&headers, "locus")?;
        let name = column(&headers, "name")?;
        let description = column(&headers, "description")?;
        let reviews = column(&headers, "References.Reviews")?;
        let papers = column(&headers, "References.Research papers")?;

        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            let gene = Gene::new(
                required(&record, name, "name")?,
                field(&record, locus),
                field(&record, description),
            )
            .with_references(
                strip_review_markup(field(&record, reviews)),
                field(&record, papers),
            );
            data.add_gene(gene);
        }
        Ok(())
    }

    /// Removes the spaces after the field separators
    ///
    /// The table separates its fields with `", "`. A quote is only
    /// recognized at the very start of a field, so the spaces must go
    /// before the table is handed to the CSV reader.
    fn skip_initial_space(text: &str) -> String {
        let mut res = String::with_capacity(text.len());
        let mut quoted = false;
        let mut field_start = true;
        for c in text.chars() {
            if field_start && c == ' ' {
                continue;
            }
            field_start = false;
            match c {
                '"' => quoted = !quoted,
                ',' | '\n' if !quoted => field_start = true,
                _ => {}
            }
            res.push(c);
        }
        res
    }

    /// Removes the `<pubmed>` tags around review references
    ///
    /// The tags are removed character-wise from both ends, so this
    /// does not clean up tags between several references.
    fn strip_review_markup(reviews: &str) -> &str {
        reviews.trim_matches(|c| REVIEW_MARKUP.contains(c))
    }

    #[cfg(test)]
    mod test_gene_names {
        use super::*;

        const TABLE: &str = r#""locus", "name", "description", "References.Reviews", "References.Research papers"
"BSU12660", "xkdK", "phage-like element PBSX protein, XkdK", "<pubmed>12345,23456</pubmed>", "<pubmed>34567</pubmed>"
"BSU00370", "abrB", "transcriptional regulator", "", ""
"#;

        #[test]
        fn parse_table() {
            let mut data = Dataset::default();
            parse(TABLE.as_bytes(), &mut data).unwrap();
            assert_eq!(data.genes().len(), 2);

            let gene = &data.genes()[0];
            assert_eq!(gene.symbol(), "xkdK");
            assert_eq!(gene.locus(), "BSU12660");
            assert_eq!(gene.description(), "phage-like element PBSX protein, XkdK");
            assert_eq!(gene.reviews(), "12345,23456");
            assert_eq!(gene.papers(), "<pubmed>34567</pubmed>");

            let gene = &data.genes()[1];
            assert_eq!(gene.symbol(), "abrB");
            assert!(gene.reviews().is_empty());
            assert!(gene.papers().is_empty());
        }

        #[test]
        fn quoted_spaces_are_kept() {
            let table = TABLE.replace(
                "\"transcriptional regulator\"",
                "\"  transcriptional regulator \"",
            );
            let mut data = Dataset::default();
            parse(table.as_bytes(), &mut data).unwrap();
            assert_eq!(data.genes()[1].description(), "  transcriptional regulator ");
        }

        #[test]
        fn initial_spaces() {
            assert_eq!(
                skip_initial_space("\"a\",  \"b, c\"\n \"d\""),
                "\"a\",\"b, c\"\n\"d\""
            );
        }

        #[test]
        fn strip_markup() {
            assert_eq!(strip_review_markup("<pubmed>1,2</pubmed>"), "1,2");
            assert_eq!(
                strip_review_markup("<pubmed>1</pubmed><pubmed>2</pubmed>"),
                "1</pubmed><pubmed>2"
            );
            assert_eq!(strip_review_markup(""), "");
        }

        #[test]
        fn missing_column() {
            let mut data = Dataset::default();
            let table = "\"locus\", \"name\", \"description\"\n\"BSU12660\", \"xkdK\", \"\"\n";
            assert!(parse(table.as_bytes(), &mut data).is_err());
        }

        #[test]
        fn missing_name() {
            let mut data = Dataset::default();
            let table = TABLE.replace("\"abrB\"", "\"\"");
            assert!(parse(table.as_bytes(), &mut data).is_err());
        }
    }
}

/// Module to parse the functional categories from `geneCategories.csv`
///
/// Every gene has up to five categories, from the most general
/// (`category1`) to the most specific (`category5`).
///
/// ```text
/// gene,category1,category2,category3,category4,category5
/// xkdK,Lifestyles,Phage-related functions,,,
/// ```
pub(crate) mod categories {
    use super::{column, csv_error, field, reader, required};
    use crate::store::Dataset;
    use crate::term::MAX_CATEGORY_LEVEL;
    use crate::SubtiResult;
    use std::io::Read;

    pub fn parse<R: Read>(rdr: R, data: &mut Dataset) -> SubtiResult<()> {
        let mut reader = reader(rdr);
        let headers = reader.headers().map_err(csv_error)?.clone();
        let gene = column(&headers, "gene")?;
        let categories = (1..=MAX_CATEGORY_LEVEL)
            .map(|level| column(&headers, &format!("category{level}")).map(|idx| (level, idx)))
            .collect::<SubtiResult<Vec<(u8, usize)>>>()?;

        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            let symbol = required(&record, gene, "gene")?;
            for (level, idx) in &categories {
                match field(&record, *idx) {
                    "" => continue,
                    category => data.add_category(symbol, category, *level)?,
                }
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod test_categories {
        use super::*;

        #[test]
        fn parse_table() {
            let table = "gene,category1,category2,category3,category4,category5\n\
                xkdK,Lifestyles,Phage-related functions,,,\n\
                recA,Genetics,DNA repair,Homologous recombination,,\n";
            let mut data = Dataset::default();
            parse(table.as_bytes(), &mut data).unwrap();

            let rows = data.associations();
            assert_eq!(rows.len(), 5);
            assert_eq!(rows[1].term(), "Phage-related functions");
            assert_eq!(rows[1].gene(), "xkdK");
            assert_eq!(rows[1].level(), 2);
            assert_eq!(rows[4].term(), "Homologous recombination");
            assert_eq!(rows[4].level(), 3);
        }

        #[test]
        fn missing_level() {
            let table = "gene,category1,category2\nxkdK,Lifestyles,\n";
            let mut data = Dataset::default();
            assert!(parse(table.as_bytes(), &mut data).is_err());
        }
    }
}

/// Module to parse the regulons from `regulations.csv`
///
/// The term of a regulation is the regulon name followed by the mode
/// of regulation. If the mode is missing, the term is only the regulon.
///
/// ```text
/// regulon,mode,gene
/// Xpf Regulon,sigma factor,xkdK
/// SigA regulon,,yqaF
/// ```
pub(crate) mod regulations {
    use super::{column, csv_error, field, reader, required};
    use crate::store::Dataset;
    use crate::SubtiResult;
    use std::io::Read;

    pub fn parse<R: Read>(rdr: R, data: &mut Dataset) -> SubtiResult<()> {
        let mut reader = reader(rdr);
        let headers = reader.headers().map_err(csv_error)?.clone();
        let regulon = column(&headers, "regulon")?;
        let mode = column(&headers, "mode")?;
        let gene = column(&headers, "gene")?;

        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            let regulation_mode = match field(&record, mode) {
                "" => None,
                value => Some(value),
            };
            data.add_regulation(
                required(&record, gene, "gene")?,
                required(&record, regulon, "regulon")?,
                regulation_mode,
            );
        }
        Ok(())
    }

    #[cfg(test)]
    mod test_regulations {
        use super::*;

        #[test]
        fn parse_table() {
            let table = "regulon,mode,gene\n\
                Xpf Regulon,sigma factor,xkdK\n\
                SigA regulon,,yqaF\n";
            let mut data = Dataset::default();
            parse(table.as_bytes(), &mut data).unwrap();

            let rows = data.associations();
            assert_eq!(rows[0].term(), "Xpf Regulon sigma factor");
            assert_eq!(rows[0].gene(), "xkdK");
            assert_eq!(rows[1].term(), "SigA regulon");
            assert_eq!(rows[1].level(), 0);
        }

        #[test]
        fn missing_gene() {
            let table = "regulon,mode,gene\nXpf Regulon,sigma factor,\n";
            let mut data = Dataset::default();
            assert!(parse(table.as_bytes(), &mut data).is_err());
        }
    }
}

/// Module to parse the operons from `operons.csv`
///
/// The member genes of an operon are joined by `-`.
///
/// ```text
/// operon,genes
/// spoIIAA-spoIIAB-sigF,spoIIAA-spoIIAB-sigF
/// ```
pub(crate) mod operons {
    use super::{column, csv_error, field, reader, required};
    use crate::store::Dataset;
    use crate::SubtiResult;
    use std::io::Read;

    pub fn parse<R: Read>(rdr: R, data: &mut Dataset) -> SubtiResult<()> {
        let mut reader = reader(rdr);
        let headers = reader.headers().map_err(csv_error)?.clone();
        let operon = column(&headers, "operon")?;
        let genes = column(&headers, "genes")?;

        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            data.add_operon(required(&record, operon, "operon")?, field(&record, genes));
        }
        Ok(())
    }

}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_folder() {
        let mut data = Dataset::default();
        let res = load_from_source_tables(Path::new("tests/data/missing"), &mut data);
        assert!(matches!(res, Err(SubtiError::StorageUnavailable(_))));
    }

    #[test]
    fn fixture_tables() {
        let mut data = Dataset::default();
        load_from_source_tables(Path::new("tests/data"), &mut data).unwrap();
        assert!(data.genes().iter().any(|gene| gene.symbol() == "xkdK"));
        assert!(data
            .associations()
            .iter()
            .any(|a| a.term() == "Xpf Regulon sigma factor" && a.gene() == "xkdK"));
    }
}

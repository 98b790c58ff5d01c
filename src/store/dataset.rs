use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, error};

use crate::annotations::Gene;
use crate::parser;
use crate::parser::binary::{self, Bytes};
use crate::term::Association;
use crate::{SubtiError, SubtiResult, DEFAULT_NUM_ASSOCIATIONS, DEFAULT_NUM_GENES};

/// The raw tables of gene metadata and term-gene associations
///
/// A `Dataset` is the persisted form of an
/// [`AssociationStore`](`crate::AssociationStore`). It is filled once,
/// either by parsing the SubtiWiki export tables or by loading a binary
/// snapshot, and is read-only afterwards.
///
/// The methods to add data mirror the structure of the source tables and
/// are meant for ingestion only. Rows are stored as they are added,
/// including duplicates.
///
/// # Examples
///
/// ```
/// use subtiwiki::{Dataset, Gene};
///
/// let mut data = Dataset::default();
/// data.add_gene(Gene::new("xkdE", "BSU12600", "PBSX prophage protein"));
/// data.add_category("xkdE", "Lifestyles", 1).unwrap();
/// data.add_regulation("xkdE", "Xpf Regulon", Some("sigma factor"));
/// data.add_operon("xkdE-xkdF-xkdG", "xkdE-xkdF-xkdG");
///
/// assert_eq!(data.genes().len(), 1);
/// assert_eq!(data.associations().len(), 5);
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dataset {
    genes: Vec<Gene>,
    associations: Vec<Association>,
}

impl Dataset {
    /// Constructs an empty `Dataset` with capacity for a full SubtiWiki export
    pub fn new() -> Self {
        Self {
            genes: Vec::with_capacity(DEFAULT_NUM_GENES),
            associations: Vec::with_capacity(DEFAULT_NUM_ASSOCIATIONS),
        }
    }

    /// Parses the SubtiWiki export tables from `folder`
    ///
    /// The folder must contain the files `gene_names_description`,
    /// `geneCategories.csv`, `regulations.csv` and `operons.csv`.
    ///
    /// # Errors
    ///
    /// - Any table is missing or unreadable: [`SubtiError::StorageUnavailable`]
    /// - A table is lacking a required column or contains
    ///   an invalid row: [`SubtiError::InvalidInput`]
    ///
    /// # Examples
    ///
    /// ```
    /// use subtiwiki::Dataset;
    ///
    /// let data = Dataset::from_source_tables("tests/data").unwrap();
    /// assert!(!data.is_empty());
    /// ```
    pub fn from_source_tables<P: AsRef<Path>>(folder: P) -> SubtiResult<Self> {
        let mut data = Dataset::new();
        parser::load_from_source_tables(folder.as_ref(), &mut data)?;
        Ok(data)
    }

    /// Loads a `Dataset` from a binary snapshot file
    ///
    /// # Errors
    ///
    /// - The file cannot be opened or read: [`SubtiError::StorageUnavailable`]
    /// - The content is not a valid snapshot, see [`Dataset::from_bytes`]
    pub fn from_binary<P: AsRef<Path>>(filename: P) -> SubtiResult<Self> {
        let filename = filename.as_ref();
        let bytes = match File::open(filename) {
            Ok(mut file) => {
                let len = file
                    .metadata()
                    .map_err(|err| {
                        SubtiError::StorageUnavailable(format!(
                            "unable to get filesize of {}: {err}",
                            filename.display()
                        ))
                    })?
                    .len();
                let mut bytes = Vec::with_capacity(len.try_into()?);
                file.read_to_end(&mut bytes).map_err(|err| {
                    SubtiError::StorageUnavailable(format!(
                        "unable to read from {}: {err}",
                        filename.display()
                    ))
                })?;
                bytes
            }
            Err(err) => {
                error!("Unable to open {}: {}", filename.display(), err);
                return Err(SubtiError::StorageUnavailable(format!(
                    "unable to open {}: {err}",
                    filename.display()
                )));
            }
        };
        Self::from_bytes(&bytes)
    }

    /// Builds a `Dataset` from bytes
    ///
    /// The data must be in the format defined in [`Dataset::as_bytes`].
    ///
    /// # Errors
    ///
    /// - Missing snapshot header or malformed data: [`SubtiError::ParseBinaryError`]
    /// - Unknown snapshot version: [`SubtiError::NotImplemented`]
    ///
    /// # Examples
    ///
    /// ```
    /// use subtiwiki::{Dataset, Gene};
    ///
    /// let mut data = Dataset::default();
    /// data.add_gene(Gene::new("xkdK", "BSU12660", ""));
    /// data.add_regulation("xkdK", "Xpf Regulon", Some("sigma factor"));
    ///
    /// let bytes = data.as_bytes();
    /// assert_eq!(Dataset::from_bytes(&bytes).unwrap(), data);
    ///
    /// assert!(Dataset::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> SubtiResult<Self> {
        let bytes = binary::version(bytes)?;
        debug!("Parsing from bytes v{}", bytes.version());
        let mut data = Dataset::new();

        let (section, rest) = bytes.section()?;
        data.add_genes_from_bytes(section)?;

        let (section, rest) = rest.section()?;
        data.add_associations_from_bytes(section)?;

        if rest.is_empty() {
            Ok(data)
        } else {
            error!("{} bytes left after the last section", rest.len());
            Err(SubtiError::ParseBinaryError)
        }
    }

    /// Returns a binary representation of the `Dataset`
    ///
    /// The binary data starts with the snapshot header (`SUBTI` and the
    /// version byte) and is separated into sections:
    ///
    /// - Genes ([`Gene::as_bytes`])
    /// - Associations ([`Association::as_bytes`])
    ///
    /// Every section starts with 4 bytes to indicate its size
    /// (big-endian encoded `u32`)
    ///
    /// # Panics
    ///
    /// Panics when the buffer length of any section is larger than `u32::MAX`
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut res = binary::header();

        let mut buffer = Vec::new();
        for gene in &self.genes {
            buffer.append(&mut gene.as_bytes());
        }
        binary::push_section(&mut res, buffer);

        let mut buffer = Vec::new();
        for association in &self.associations {
            buffer.append(&mut association.as_bytes());
        }
        binary::push_section(&mut res, buffer);

        res
    }

    /// All gene metadata records, in insertion order
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// All associations, in insertion order
    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    /// Returns `true` if the dataset has neither genes nor associations
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty() && self.associations.is_empty()
    }

    /// Adds gene metadata
    pub fn add_gene(&mut self, gene: Gene) {
        self.genes.push(gene);
    }

    /// Adds a raw association row
    pub fn add_association(&mut self, association: Association) {
        self.associations.push(association);
    }

    /// Associates `gene` with a functional category of the given level
    ///
    /// # Errors
    ///
    /// [`SubtiError::InvalidInput`] if the level is not within 1 to 5
    pub fn add_category(&mut self, gene: &str, category: &str, level: u8) -> SubtiResult<()> {
        self.add_association(Association::category(gene, category, level)?);
        Ok(())
    }

    /// Associates `gene` with a regulon and the optional mode of regulation
    pub fn add_regulation(&mut self, gene: &str, regulon: &str, mode: Option<&str>) {
        self.add_association(Association::regulation(gene, regulon, mode));
    }

    /// Associates every member of an operon with the operon
    ///
    /// `genes` is the `-` separated list of member genes.
    pub fn add_operon(&mut self, operon: &str, genes: &str) {
        self.associations
            .extend(Association::operon_members(operon, genes));
    }

    fn add_genes_from_bytes(&mut self, bytes: Bytes) -> SubtiResult<()> {
        for record in bytes.records() {
            self.add_gene(Gene::try_from(record?)?);
        }
        Ok(())
    }

    fn add_associations_from_bytes(&mut self, bytes: Bytes) -> SubtiResult<()> {
        for record in bytes.records() {
            self.add_association(Association::try_from(record?)?);
        }
        Ok(())
    }
}

use std::collections::BTreeSet;
use std::convert::TryFrom;

use tracing::error;

use crate::parser::binary::{push_str, Fields};
use crate::table::Record;
use crate::{usize_to_u32, SubtiError};

/// A set of gene symbols
///
/// Each symbol can appear only once. The set is ordered, so
/// iterating it always yields the same order.
pub type Genes = BTreeSet<String>;

/// The metadata of a single gene
///
/// The gene symbol is the natural key of a [`Gene`]. Genes are
/// stored independently of the term associations, so a symbol
/// can be associated to terms without having any metadata and vice versa.
///
/// The literature references are kept exactly as the ingestion supplied
/// them. They often contain several PubMed IDs and leftovers of markup in
/// a single string.
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Gene {
    symbol: String,
    locus: String,
    description: String,
    reviews: String,
    papers: String,
}

impl Gene {
    /// Initializes a new Gene
    ///
    /// # Examples
    ///
    /// ```
    /// use subtiwiki::Gene;
    ///
    /// let gene = Gene::new("xkdK", "BSU12660", "phage-like element PBSX protein");
    /// assert_eq!(gene.symbol(), "xkdK");
    /// assert_eq!(gene.locus(), "BSU12660");
    /// assert!(gene.reviews().is_empty());
    /// ```
    pub fn new(symbol: &str, locus: &str, description: &str) -> Gene {
        Gene {
            symbol: symbol.to_string(),
            locus: locus.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    /// Sets the literature references and returns the gene
    ///
    /// Both fields are opaque strings and are not validated.
    #[must_use]
    pub fn with_references(mut self, reviews: &str, papers: &str) -> Gene {
        self.reviews = reviews.to_string();
        self.papers = papers.to_string();
        self
    }

    /// The gene symbol, e.g. `xkdK`
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The locus tag, e.g. `BSU12660`
    pub fn locus(&self) -> &str {
        &self.locus
    }

    /// Free-text description of the gene
    pub fn description(&self) -> &str {
        &self.description
    }

    /// References to review articles
    pub fn reviews(&self) -> &str {
        &self.reviews
    }

    /// References to research papers
    pub fn papers(&self) -> &str {
        &self.papers
    }

    /// Returns a binary representation of the `Gene`
    ///
    /// The binary layout is defined as:
    ///
    /// | Byte offset | Number of bytes | Description |
    /// | --- | --- | --- |
    /// | 0 | 4 | The total length of the binary data blob as big-endian `u32` |
    /// | 4 | 4 + n | The gene symbol, prefixed by its length as big-endian `u32` |
    /// | ... | 4 + n | The locus, prefixed by its length |
    /// | ... | 4 + n | The description, prefixed by its length |
    /// | ... | 4 + n | The review references, prefixed by their length |
    /// | ... | 4 + n | The research paper references, prefixed by their length |
    ///
    /// # Examples
    ///
    /// ```
    /// use subtiwiki::Gene;
    ///
    /// let gene = Gene::new("xkdK", "BSU12660", "");
    /// let bytes = gene.as_bytes();
    ///
    /// assert_eq!(bytes.len(), 4 + (4 + 4) + (4 + 8) + 4 + 4 + 4);
    /// assert_eq!(bytes[4..8], [0u8, 0u8, 0u8, 4u8]);
    /// ```
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut res = vec![0u8; 4];
        push_str(&mut res, &self.symbol);
        push_str(&mut res, &self.locus);
        push_str(&mut res, &self.description);
        push_str(&mut res, &self.reviews);
        push_str(&mut res, &self.papers);

        let size = usize_to_u32(res.len()).to_be_bytes();
        res[0..4].copy_from_slice(&size);
        res
    }
}

impl TryFrom<&[u8]> for Gene {
    type Error = SubtiError;
    /// Returns a [`Gene`] from a bytes vector
    ///
    /// The byte layout for this method is defined in
    /// [`Gene::as_bytes`]
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() < 4 + 5 * 4 {
            error!("Too few bytes for a Gene");
            return Err(SubtiError::ParseBinaryError);
        }
        let mut fields = Fields::new(bytes);
        let gene = Gene {
            symbol: fields.string()?,
            locus: fields.string()?,
            description: fields.string()?,
            reviews: fields.string()?,
            papers: fields.string()?,
        };
        fields.finish()?;
        Ok(gene)
    }
}

impl Record for Gene {
    const HEADER: &'static [&'static str] = &[
        "Gene",
        "Locus",
        "Description",
        "Review PMIDs",
        "Paper PMIDs",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.symbol.clone(),
            self.locus.clone(),
            self.description.clone(),
            self.reviews.clone(),
            self.papers.clone(),
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gene_to_and_from_binary() {
        let gene = Gene::new("sigK", "BSU25760", "RNA polymerase sporulation mother cell-specific (stage IV) sigma factor SigK")
            .with_references("12345,23456", "<pubmed>3456</pubmed>");

        let bin = gene.as_bytes();
        let gene2 = Gene::try_from(&bin[..]).unwrap();

        assert_eq!(gene, gene2);
        assert_eq!(gene2.papers(), "<pubmed>3456</pubmed>");
    }

    #[test]
    fn gene_with_non_ascii_description() {
        let gene = Gene::new("abrB", "BSU00370", "transition state regulator 😀 α-helix");
        let bin = gene.as_bytes();
        let gene2 = Gene::try_from(&bin[..]).expect("Can't build Gene");
        assert_eq!(gene.description(), gene2.description());
    }

    #[test]
    fn gene_with_wrong_length() {
        let gene = Gene::new("foobar", "BSU0001", "");
        let mut bin = gene.as_bytes();
        let len = bin.len();

        assert!(Gene::try_from(&bin[..12]).is_err());
        assert!(Gene::try_from(&bin[..len - 1]).is_err());
        assert!(Gene::try_from(&bin[..]).is_ok());

        bin.push(1);
        assert!(Gene::try_from(&bin[..]).is_err());
    }

    #[test]
    fn gene_record_fields() {
        let gene = Gene::new("comK", "BSU10420", "competence transcription factor")
            .with_references("111", "222");
        let fields = gene.fields();
        assert_eq!(fields.len(), Gene::HEADER.len());
        assert_eq!(fields[0], "comK");
        assert_eq!(fields[3], "111");
        assert_eq!(fields[4], "222");
    }
}

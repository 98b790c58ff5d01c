use tracing::error;

use crate::parser::binary::{push_str, Fields};
use crate::term::{Term, TermType, FLAT_LEVEL, MAX_CATEGORY_LEVEL};
use crate::{usize_to_u32, SubtiError, SubtiResult};

/// A single fact linking one term to one gene
///
/// Associations are the rows of the term-gene table. The same row can
/// occur several times; duplicates are only removed when a query needs
/// set semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Association {
    term: String,
    gene: String,
    term_type: TermType,
    level: u8,
}

impl Association {
    /// Constructs a new [`Association`]
    ///
    /// # Errors
    ///
    /// [`SubtiError::InvalidInput`] if the level does not match the
    /// `term_type`. Categories must have a level of 1 to 5, all other
    /// types the flat level 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use subtiwiki::{Association, TermType};
    ///
    /// assert!(Association::new("Lifestyles", "xkdK", TermType::Category, 1).is_ok());
    /// assert!(Association::new("Lifestyles", "xkdK", TermType::Category, 6).is_err());
    /// assert!(Association::new("SinR regulon", "sinI", TermType::Regulations, 2).is_err());
    /// ```
    pub fn new(term: &str, gene: &str, term_type: TermType, level: u8) -> SubtiResult<Self> {
        let valid = if term_type.is_hierarchical() {
            (1..=MAX_CATEGORY_LEVEL).contains(&level)
        } else {
            level == FLAT_LEVEL
        };
        if !valid {
            return Err(SubtiError::InvalidInput(format!(
                "level {level} is not valid for {term_type} term `{term}`"
            )));
        }
        Ok(Self {
            term: term.to_string(),
            gene: gene.to_string(),
            term_type,
            level,
        })
    }

    /// Associates a gene with a functional category of the given level
    ///
    /// # Errors
    ///
    /// [`SubtiError::InvalidInput`] if the level is not within 1 to 5
    pub fn category(gene: &str, category: &str, level: u8) -> SubtiResult<Self> {
        Self::new(category, gene, TermType::Category, level)
    }

    /// Associates a gene with a regulon
    ///
    /// The term is named after the regulon, followed by the
    /// mode of regulation, if present.
    ///
    /// # Examples
    ///
    /// ```
    /// use subtiwiki::Association;
    ///
    /// let a = Association::regulation("xkdK", "Xpf Regulon", Some("sigma factor"));
    /// assert_eq!(a.term(), "Xpf Regulon sigma factor");
    ///
    /// let a = Association::regulation("sigA", "SigA regulon", None);
    /// assert_eq!(a.term(), "SigA regulon");
    /// ```
    pub fn regulation(gene: &str, regulon: &str, mode: Option<&str>) -> Self {
        let term = match mode {
            Some(mode) => format!("{regulon} {mode}"),
            None => regulon.to_string(),
        };
        Self {
            term,
            gene: gene.to_string(),
            term_type: TermType::Regulations,
            level: FLAT_LEVEL,
        }
    }

    /// Associates a single gene with an operon
    pub fn operon(gene: &str, operon: &str) -> Self {
        Self {
            term: operon.to_string(),
            gene: gene.to_string(),
            term_type: TermType::Operons,
            level: FLAT_LEVEL,
        }
    }

    /// Returns one association for every member of an operon
    ///
    /// The members are provided as a single `-` separated field.
    /// Empty members are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use subtiwiki::Association;
    ///
    /// let rows: Vec<Association> = Association::operon_members("xkdE-xkdF-xkdG", "xkdE-xkdF-xkdG").collect();
    /// assert_eq!(rows.len(), 3);
    /// assert_eq!(rows[1].gene(), "xkdF");
    /// assert_eq!(rows[1].term(), "xkdE-xkdF-xkdG");
    /// ```
    pub fn operon_members<'a>(
        operon: &'a str,
        genes: &'a str,
    ) -> impl Iterator<Item = Association> + 'a {
        genes
            .split('-')
            .filter(|gene| !gene.is_empty())
            .map(move |gene| Association::operon(gene, operon))
    }

    /// The name of the associated term
    pub fn term(&self) -> &str {
        &self.term
    }

    /// The symbol of the associated gene
    pub fn gene(&self) -> &str {
        &self.gene
    }

    /// The [`TermType`] of the associated term
    pub fn term_type(&self) -> TermType {
        self.term_type
    }

    /// The hierarchy level: 1 to 5 for categories, 0 otherwise
    pub fn level(&self) -> u8 {
        self.level
    }

    /// The [`Term`] that this association belongs to
    pub fn to_term(&self) -> Term {
        Term::new(self.term_type, &self.term)
    }

    /// Returns a binary representation of the `Association`
    ///
    /// The binary layout is defined as:
    ///
    /// | Byte offset | Number of bytes | Description |
    /// | --- | --- | --- |
    /// | 0 | 4 | The total length of the binary data blob as big-endian `u32` |
    /// | 4 | 1 | The term type (1: category, 2: regulations, 3: operons) |
    /// | 5 | 1 | The level |
    /// | 6 | 4 + n | The term name, prefixed by its length as big-endian `u32` |
    /// | 10 + n | 4 + m | The gene symbol, prefixed by its length |
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut res = vec![0u8; 4];
        res.push(self.term_type.as_u8());
        res.push(self.level);
        push_str(&mut res, &self.term);
        push_str(&mut res, &self.gene);

        let size = usize_to_u32(res.len()).to_be_bytes();
        res[0..4].copy_from_slice(&size);
        res
    }
}

impl TryFrom<&[u8]> for Association {
    type Error = SubtiError;
    /// Returns an [`Association`] from a bytes vector
    ///
    /// The byte layout for this method is defined in
    /// [`Association::as_bytes`]
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() < 4 + 1 + 1 + 4 + 4 {
            error!("Too few bytes for an Association");
            return Err(SubtiError::ParseBinaryError);
        }
        let mut fields = Fields::new(bytes);
        let term_type = TermType::try_from(fields.u8()?)?;
        let level = fields.u8()?;
        let term = fields.string()?;
        let gene = fields.string()?;
        fields.finish()?;
        Association::new(&term, &gene, term_type, level).map_err(|err| {
            error!("Invalid association in binary data: {}", err);
            SubtiError::ParseBinaryError
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn category_levels() {
        for level in 1..=5 {
            let a = Association::category("xkdK", "Lifestyles", level).unwrap();
            assert_eq!(a.level(), level);
            assert_eq!(a.term_type(), TermType::Category);
        }
        assert!(Association::category("xkdK", "Lifestyles", 0).is_err());
        assert!(Association::operon("xkdK", "xkdK-xkdL").level() == FLAT_LEVEL);
    }

    #[test]
    fn operon_with_empty_members() {
        let rows: Vec<_> = Association::operon_members("spoIIAA-spoIIAB-sigF", "spoIIAA--spoIIAB-sigF-").collect();
        let genes: Vec<&str> = rows.iter().map(Association::gene).collect();
        assert_eq!(genes, ["spoIIAA", "spoIIAB", "sigF"]);
        assert!(rows.iter().all(|a| a.term() == "spoIIAA-spoIIAB-sigF"));
    }

    #[test]
    fn association_to_and_from_binary() {
        let a = Association::regulation("xkdK", "Xpf Regulon", Some("sigma factor"));
        let bin = a.as_bytes();
        assert_eq!(bin.len(), 4 + 1 + 1 + 4 + 24 + 4 + 4);
        assert_eq!(Association::try_from(&bin[..]).unwrap(), a);
    }

    #[test]
    fn invalid_binary_association() {
        let a = Association::category("xkdK", "Lifestyles", 2).unwrap();
        let mut bin = a.as_bytes();

        // unknown term type
        bin[4] = 9;
        assert!(Association::try_from(&bin[..]).is_err());

        // category with the flat level
        bin[4] = 1;
        bin[5] = 0;
        assert!(Association::try_from(&bin[..]).is_err());

        bin[5] = 2;
        assert!(Association::try_from(&bin[..]).is_ok());
        assert!(Association::try_from(&bin[..bin.len() - 2]).is_err());
    }
}

//! Terms are the named gene groups that are tested for enrichment
//!
//! SubtiWiki knows three different kinds of terms:
//!
//! - **category**: functional categories of a fixed, 5-level deep hierarchy
//! - **regulations**: regulons, optionally split up by the mode of regulation,
//!   e.g. `"SinR regulon"` or `"Xpf Regulon sigma factor"`
//! - **operons**: co-transcribed genes, named after their members
//!
//! A [`Term`] is identified by its [`TermType`] *and* its name. Different
//! types can share a name, so name-only lookups (see
//! [`AssociationStore::term_genes`](`crate::AssociationStore::term_genes`))
//! merge them.
use std::fmt::Display;
use std::str::FromStr;

use crate::{SubtiError, SubtiResult};

mod association;
pub use association::Association;

/// The level of regulation and operon terms, which are not hierarchical
pub const FLAT_LEVEL: u8 = 0;

/// The deepest level of the category hierarchy
pub const MAX_CATEGORY_LEVEL: u8 = 5;

/// The kind of a [`Term`]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum TermType {
    /// Functional category, level 1 to 5
    Category,
    /// Regulon, with or without mode
    Regulations,
    /// Operon
    Operons,
}

impl TermType {
    /// All term types, in the order they are listed in results
    pub const ALL: [TermType; 3] = [
        TermType::Category,
        TermType::Regulations,
        TermType::Operons,
    ];

    /// The lowercase identifier of the type, as used in the source data
    ///
    /// # Examples
    ///
    /// ```
    /// use subtiwiki::TermType;
    ///
    /// assert_eq!(TermType::Regulations.as_str(), "regulations");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            TermType::Category => "category",
            TermType::Regulations => "regulations",
            TermType::Operons => "operons",
        }
    }

    /// Returns `true` if terms of this type form a hierarchy with levels
    pub fn is_hierarchical(&self) -> bool {
        matches!(self, TermType::Category)
    }

    pub(crate) fn as_u8(self) -> u8 {
        match self {
            TermType::Category => 1,
            TermType::Regulations => 2,
            TermType::Operons => 3,
        }
    }
}

impl TryFrom<u8> for TermType {
    type Error = SubtiError;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TermType::Category),
            2 => Ok(TermType::Regulations),
            3 => Ok(TermType::Operons),
            _ => Err(SubtiError::ParseBinaryError),
        }
    }
}

impl FromStr for TermType {
    type Err = SubtiError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(TermType::Category),
            "regulations" => Ok(TermType::Regulations),
            "operons" => Ok(TermType::Operons),
            _ => Err(SubtiError::InvalidInput(format!("unknown term type `{s}`"))),
        }
    }
}

impl Display for TermType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Selects which [`Term`]s take part in a query
///
/// `Mode::All` is the union of the three type-specific modes.
///
/// # Examples
///
/// ```
/// use subtiwiki::{Mode, TermType};
///
/// let mode: Mode = "operons".parse().unwrap();
/// assert!(mode.includes(TermType::Operons));
/// assert!(!mode.includes(TermType::Category));
/// assert!(Mode::All.includes(TermType::Category));
///
/// assert!("foobar".parse::<Mode>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum Mode {
    /// Terms of every type
    #[default]
    All,
    /// Only functional categories
    Category,
    /// Only regulons
    Regulations,
    /// Only operons
    Operons,
}

impl Mode {
    /// All modes
    pub const MODES: [Mode; 4] = [Mode::All, Mode::Category, Mode::Regulations, Mode::Operons];

    /// Returns `true` if terms of `term_type` are selected by this mode
    pub fn includes(&self, term_type: TermType) -> bool {
        match self.term_type() {
            None => true,
            Some(t) => t == term_type,
        }
    }

    /// The single [`TermType`] of the mode, `None` for [`Mode::All`]
    pub fn term_type(&self) -> Option<TermType> {
        match self {
            Mode::All => None,
            Mode::Category => Some(TermType::Category),
            Mode::Regulations => Some(TermType::Regulations),
            Mode::Operons => Some(TermType::Operons),
        }
    }

    /// The identifier of the mode, as accepted by `parse`
    pub fn as_str(&self) -> &'static str {
        match self.term_type() {
            None => "all",
            Some(t) => t.as_str(),
        }
    }
}

impl From<TermType> for Mode {
    fn from(term_type: TermType) -> Self {
        match term_type {
            TermType::Category => Mode::Category,
            TermType::Regulations => Mode::Regulations,
            TermType::Operons => Mode::Operons,
        }
    }
}

impl FromStr for Mode {
    type Err = SubtiError;
    fn from_str(s: &str) -> SubtiResult<Self> {
        if s == "all" {
            Ok(Mode::All)
        } else {
            s.parse::<TermType>()
                .map(Mode::from)
                .map_err(|_| SubtiError::InvalidInput(format!("unknown mode `{s}`")))
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named group of genes, identified by its [`TermType`] and name
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Term {
    term_type: TermType,
    name: String,
}

impl Term {
    /// Constructs a new [`Term`]
    pub fn new(term_type: TermType, name: &str) -> Self {
        Self {
            term_type,
            name: name.to_string(),
        }
    }

    /// The [`TermType`] of the term
    pub fn term_type(&self) -> TermType {
        self.term_type
    }

    /// The name of the term
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.term_type, self.name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn term_type_from_str() {
        for t in TermType::ALL {
            assert_eq!(t.as_str().parse::<TermType>().unwrap(), t);
            assert_eq!(TermType::try_from(t.as_u8()).unwrap(), t);
        }
        assert!("Category".parse::<TermType>().is_err());
        assert!(TermType::try_from(0u8).is_err());
    }

    #[test]
    fn mode_selection() {
        assert_eq!(Mode::default(), Mode::All);
        for t in TermType::ALL {
            assert!(Mode::All.includes(t));
            assert!(Mode::from(t).includes(t));
            assert_eq!(Mode::from(t).term_type(), Some(t));
        }
        assert!(!Mode::Regulations.includes(TermType::Operons));
        assert!(!Mode::Operons.includes(TermType::Regulations));
    }

    #[test]
    fn mode_from_str() {
        for mode in Mode::MODES {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
        assert!("ALL".parse::<Mode>().is_err());
        assert!("".parse::<Mode>().is_err());
    }

    #[test]
    fn terms_with_same_name() {
        let a = Term::new(TermType::Category, "Sporulation");
        let b = Term::new(TermType::Operons, "Sporulation");
        assert_ne!(a, b);
        assert_eq!(a.name(), b.name());
        assert_eq!(a.to_string(), "category: Sporulation");
    }
}

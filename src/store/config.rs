use std::borrow::Cow;

/// Defines how gene symbols are matched
///
/// SubtiWiki gene symbols are case-sensitive by convention (`xkdK`,
/// `spoIIAA`), and a query must use the exact same spelling to match.
/// [`SymbolPolicy::CaseFold`] relaxes this by lowercasing every symbol,
/// both when the store is indexed and when it is queried. Results will
/// then also contain the lowercased symbols.
///
/// # Examples
///
/// ```
/// use subtiwiki::SymbolPolicy;
///
/// assert_eq!(SymbolPolicy::Exact.canonicalize("xkdK"), "xkdK");
/// assert_eq!(SymbolPolicy::CaseFold.canonicalize("xkdK"), "xkdk");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SymbolPolicy {
    /// Symbols must match exactly
    #[default]
    Exact,
    /// Symbols are compared case-insensitively
    CaseFold,
}

impl SymbolPolicy {
    /// Returns the canonical form of `symbol` under this policy
    pub fn canonicalize<'a>(&self, symbol: &'a str) -> Cow<'a, str> {
        match self {
            SymbolPolicy::Exact => Cow::Borrowed(symbol),
            SymbolPolicy::CaseFold => {
                if symbol.chars().any(char::is_uppercase) {
                    Cow::Owned(symbol.to_lowercase())
                } else {
                    Cow::Borrowed(symbol)
                }
            }
        }
    }
}

/// Settings of an [`AssociationStore`](`crate::AssociationStore`)
///
/// # Examples
///
/// ```
/// use subtiwiki::{StoreConfig, SymbolPolicy};
///
/// let config = StoreConfig::default();
/// assert_eq!(config.symbol_policy(), SymbolPolicy::Exact);
///
/// let config = StoreConfig::default().with_symbol_policy(SymbolPolicy::CaseFold);
/// assert_eq!(config.symbol_policy(), SymbolPolicy::CaseFold);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreConfig {
    symbol_policy: SymbolPolicy,
}

impl StoreConfig {
    /// The [`SymbolPolicy`] used to match gene symbols
    pub fn symbol_policy(&self) -> SymbolPolicy {
        self.symbol_policy
    }

    /// Sets the [`SymbolPolicy`]
    #[must_use]
    pub fn with_symbol_policy(mut self, policy: SymbolPolicy) -> Self {
        self.symbol_policy = policy;
        self
    }
}

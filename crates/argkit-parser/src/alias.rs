use indexmap::IndexMap;

/// Spelling collection for an alias entry.
///
/// Accepts a single spelling or several via array/slice.
pub trait Spellings<'a> {
    type Iter: Iterator<Item = &'a str>;
    fn iter(self) -> Self::Iter;
}

impl<'a> Spellings<'a> for &'a str {
    type Iter = std::iter::Once<&'a str>;

    fn iter(self) -> Self::Iter {
        std::iter::once(self)
    }
}

impl<'a> Spellings<'a> for &'a [&'a str] {
    type Iter = std::iter::Copied<std::slice::Iter<'a, &'a str>>;

    fn iter(self) -> Self::Iter {
        self.iter().copied()
    }
}

impl<'a> Spellings<'a> for &'a [String] {
    type Iter = std::iter::Map<std::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

    fn iter(self) -> Self::Iter {
        self.iter().map(String::as_str as fn(&'a String) -> &'a str)
    }
}

impl<'a, const N: usize> Spellings<'a> for [&'a str; N] {
    type Iter = std::array::IntoIter<&'a str, N>;

    fn iter(self) -> Self::Iter {
        self.into_iter()
    }
}

/// Canonical option names and the flag spellings that map onto them.
///
/// Spellings are stored without leading dashes (`o`, `output`). The table is
/// never mutated while a tokenizer pass reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    names: IndexMap<String, Vec<String>>,
    strict: bool,
}

impl AliasTable {
    /// Create an empty, case-insensitive table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare spellings case-sensitively.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Declare `canonical` with the given spellings (e.g. `alias("output", ["O", "o"])`).
    pub fn alias<'a, S>(mut self, canonical: impl Into<String>, spellings: S) -> Self
    where
        S: Spellings<'a>,
    {
        self.insert(canonical, spellings);
        self
    }

    /// Declare `canonical` in place.
    ///
    /// Re-declaring a name replaces its spellings but keeps its original
    /// position in resolution order.
    pub fn insert<'a, S>(&mut self, canonical: impl Into<String>, spellings: S)
    where
        S: Spellings<'a>,
    {
        let spellings = spellings.iter().map(|s| s.to_string()).collect();
        self.names.insert(canonical.into(), spellings);
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate canonical names and their spellings in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.names.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Map a flag token (without dashes) to its canonical name.
    ///
    /// The first declared name whose spellings contain `token` wins. Tokens
    /// that match nothing are returned unchanged.
    pub fn resolve<'a>(&'a self, token: &'a str) -> &'a str {
        let found = if self.strict {
            self.names
                .iter()
                .find(|(_, spellings)| spellings.iter().any(|s| s == token))
        } else {
            let folded = token.to_lowercase();
            self.names
                .iter()
                .find(|(_, spellings)| spellings.iter().any(|s| s.to_lowercase() == folded))
        };
        found.map(|(name, _)| name.as_str()).unwrap_or(token)
    }
}

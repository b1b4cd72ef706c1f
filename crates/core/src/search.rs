//! Ingredient name search.
//!
//! Each search term yields a case-insensitive "starts with" predicate and a
//! "contains" predicate. All prefix predicates come first so a ranking
//! backend sees them before the substring ones; matching is still a plain
//! union. No terms means no filtering.

/// One predicate over an ingredient name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePredicate {
    StartsWith(String),
    Contains(String),
}

impl NamePredicate {
    /// The raw search term.
    #[must_use]
    pub fn term(&self) -> &str {
        match self {
            Self::StartsWith(term) | Self::Contains(term) => term,
        }
    }

    /// Case-insensitive in-memory evaluation.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        match self {
            Self::StartsWith(term) => name.starts_with(&term.to_lowercase()),
            Self::Contains(term) => name.contains(&term.to_lowercase()),
        }
    }

    /// `ILIKE` pattern equivalent to this predicate.
    #[must_use]
    pub fn like_pattern(&self) -> String {
        match self {
            Self::StartsWith(term) => format!("{}%", escape_like(term)),
            Self::Contains(term) => format!("%{}%", escape_like(term)),
        }
    }
}

/// OR of name predicates, prefix predicates first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientSearch {
    predicates: Vec<NamePredicate>,
}

impl IngredientSearch {
    /// Build the search from the raw `name` query parameter.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        Self::from_terms(raw.map(split_terms).unwrap_or_default())
    }

    /// Build the search from already split terms.
    #[must_use]
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        let starts = terms.iter().cloned().map(NamePredicate::StartsWith);
        let contains = terms.iter().cloned().map(NamePredicate::Contains);
        Self {
            predicates: starts.chain(contains).collect(),
        }
    }

    /// Predicates in evaluation order.
    #[must_use]
    pub fn predicates(&self) -> &[NamePredicate] {
        &self.predicates
    }

    /// True when there are no terms and every ingredient passes.
    #[must_use]
    pub fn is_pass_through(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Search terms, once each, in the order given.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.predicates
            .iter()
            .filter(|p| matches!(p, NamePredicate::StartsWith(_)))
            .map(NamePredicate::term)
    }

    /// Whether `name` passes the search.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.is_pass_through() || self.predicates.iter().any(|p| p.matches(name))
    }
}

/// Split a raw search parameter on whitespace and commas, dropping NULs.
#[must_use]
pub fn split_terms(raw: &str) -> Vec<String> {
    raw.replace('\0', "")
        .replace(',', " ")
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// Escape `LIKE` metacharacters so user input only matches literally.
#[must_use]
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

//! Recipe list filters.
//!
//! Query parameters are parsed into a [`RecipeQuery`], which expands into
//! a list of [`RecipePredicate`]s for a given viewer. All predicates must
//! hold (AND); the tag predicate itself is an OR over the supplied slugs.

use crate::types::UserId;

/// Errors produced while parsing filter parameters.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("{param} must be a boolean, got {value:?}")]
    InvalidFlag { param: &'static str, value: String },

    #[error("author must be a user id, got {0:?}")]
    InvalidAuthor(String),
}

/// Parsed recipe filter parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeQuery {
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
    pub author: Option<UserId>,
    pub tags: Vec<String>,
}

/// One restriction on the recipe list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipePredicate {
    /// The user marked the recipe as a favorite.
    FavoritedBy(UserId),
    /// The recipe is in the user's shopping cart.
    InCartOf(UserId),
    /// The recipe was written by the user.
    AuthoredBy(UserId),
    /// The recipe carries at least one of the slugs.
    TaggedAny(Vec<String>),
}

/// What a predicate needs to know about a recipe to evaluate it in memory.
#[derive(Debug, Clone, Copy)]
pub struct RecipeFacts<'a> {
    pub author: UserId,
    pub tag_slugs: &'a [String],
    pub favorited_by: &'a [UserId],
    pub in_cart_of: &'a [UserId],
}

impl RecipePredicate {
    /// Evaluate against in-memory facts.
    #[must_use]
    pub fn matches(&self, facts: &RecipeFacts<'_>) -> bool {
        match self {
            Self::FavoritedBy(user) => facts.favorited_by.contains(user),
            Self::InCartOf(user) => facts.in_cart_of.contains(user),
            Self::AuthoredBy(author) => facts.author == *author,
            Self::TaggedAny(slugs) => facts.tag_slugs.iter().any(|s| slugs.contains(s)),
        }
    }
}

/// True when every predicate holds.
#[must_use]
pub fn matches_all(predicates: &[RecipePredicate], facts: &RecipeFacts<'_>) -> bool {
    predicates.iter().all(|p| p.matches(facts))
}

impl RecipeQuery {
    /// Parse from decoded query-string pairs. Unrelated keys (such as
    /// `page` and `limit`) are ignored; `tags` may repeat.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] for malformed flags or author ids.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "is_favorited" => query.is_favorited = parse_flag("is_favorited", value)?,
                "is_in_shopping_cart" => {
                    query.is_in_shopping_cart = parse_flag("is_in_shopping_cart", value)?;
                }
                "author" if !value.is_empty() => {
                    let author = value
                        .parse()
                        .map_err(|_| FilterError::InvalidAuthor(value.to_owned()))?;
                    query.author = Some(author);
                }
                "tags" if !value.is_empty() => query.tags.push(value.to_owned()),
                _ => {}
            }
        }
        Ok(query)
    }

    /// Expand into predicates for `viewer`. Collection flags are no-ops for
    /// anonymous viewers and for false values.
    #[must_use]
    pub fn predicates(&self, viewer: Option<UserId>) -> Vec<RecipePredicate> {
        let mut predicates = Vec::new();

        if let Some(user) = viewer {
            if self.is_favorited == Some(true) {
                predicates.push(RecipePredicate::FavoritedBy(user));
            }
            if self.is_in_shopping_cart == Some(true) {
                predicates.push(RecipePredicate::InCartOf(user));
            }
        }

        if let Some(author) = self.author {
            predicates.push(RecipePredicate::AuthoredBy(author));
        }

        if !self.tags.is_empty() {
            predicates.push(RecipePredicate::TaggedAny(self.tags.clone()));
        }

        predicates
    }
}

/// Parse a boolean query flag. An empty value means "not supplied".
///
/// # Errors
///
/// Returns [`FilterError::InvalidFlag`] for anything but
/// `true/True/1/false/False/0`.
pub fn parse_flag(param: &'static str, value: &str) -> Result<Option<bool>, FilterError> {
    match value {
        "" => Ok(None),
        "true" | "True" | "1" => Ok(Some(true)),
        "false" | "False" | "0" => Ok(Some(false)),
        other => Err(FilterError::InvalidFlag {
            param,
            value: other.to_owned(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn facts<'a>(
        author: i32,
        tags: &'a [String],
        favorited_by: &'a [UserId],
        in_cart_of: &'a [UserId],
    ) -> RecipeFacts<'a> {
        RecipeFacts {
            author: UserId::new(author),
            tag_slugs: tags,
            favorited_by,
            in_cart_of,
        }
    }

    #[test]
    fn test_parse_pairs() {
        let query = RecipeQuery::from_pairs([
            ("page", "2"),
            ("is_favorited", "1"),
            ("author", "5"),
            ("tags", "breakfast"),
            ("tags", "lunch"),
        ])
        .unwrap();

        assert_eq!(query.is_favorited, Some(true));
        assert_eq!(query.is_in_shopping_cart, None);
        assert_eq!(query.author, Some(UserId::new(5)));
        assert_eq!(query.tags, vec!["breakfast", "lunch"]);
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(matches!(
            RecipeQuery::from_pairs([("is_in_shopping_cart", "maybe")]),
            Err(FilterError::InvalidFlag { param: "is_in_shopping_cart", .. })
        ));
        assert_eq!(
            RecipeQuery::from_pairs([("author", "me")]),
            Err(FilterError::InvalidAuthor("me".to_owned()))
        );
    }

    #[test]
    fn test_collection_flags_ignored_for_anonymous() {
        let query = RecipeQuery {
            is_favorited: Some(true),
            is_in_shopping_cart: Some(true),
            ..RecipeQuery::default()
        };
        assert!(query.predicates(None).is_empty());
        assert_eq!(
            query.predicates(Some(UserId::new(1))),
            vec![
                RecipePredicate::FavoritedBy(UserId::new(1)),
                RecipePredicate::InCartOf(UserId::new(1)),
            ]
        );
    }

    #[test]
    fn test_false_flag_is_noop() {
        let query = RecipeQuery::from_pairs([("is_favorited", "false")]).unwrap();
        assert!(query.predicates(Some(UserId::new(1))).is_empty());
    }

    #[test]
    fn test_tags_are_a_union() {
        let query = RecipeQuery::from_pairs([("tags", "breakfast"), ("tags", "dinner")]).unwrap();
        let predicates = query.predicates(None);

        let breakfast = ["breakfast".to_owned()];
        let dinner = ["dinner".to_owned()];
        let lunch = ["lunch".to_owned()];

        assert!(matches_all(&predicates, &facts(1, &breakfast, &[], &[])));
        assert!(matches_all(&predicates, &facts(1, &dinner, &[], &[])));
        assert!(!matches_all(&predicates, &facts(1, &lunch, &[], &[])));
    }

    #[test]
    fn test_filters_combine_with_and() {
        let viewer = UserId::new(9);
        let query = RecipeQuery::from_pairs([("is_favorited", "true"), ("author", "2")]).unwrap();
        let predicates = query.predicates(Some(viewer));

        assert!(matches_all(&predicates, &facts(2, &[], &[viewer], &[])));
        assert!(!matches_all(&predicates, &facts(3, &[], &[viewer], &[])));
        assert!(!matches_all(&predicates, &facts(2, &[], &[], &[])));
    }
}

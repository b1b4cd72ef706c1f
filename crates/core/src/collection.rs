//! Per-user recipe collections (favorites and shopping cart).
//!
//! Both collections are sets of `(user, recipe)` pairs with the same toggle
//! semantics: adding an existing member or removing a missing one is an
//! error, and a successful toggle changes exactly one edge.

use std::fmt;

/// Which collection a toggle targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Favorites,
    ShoppingCart,
}

/// Direction of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Add,
    Remove,
}

/// A toggle that did not change anything.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleError {
    #[error("{}", .0.already_present_message())]
    AlreadyPresent(Collection),

    #[error("{}", .0.not_present_message())]
    NotPresent(Collection),
}

impl Collection {
    /// Backing table name.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Favorites => "favorite",
            Self::ShoppingCart => "shopping_cart",
        }
    }

    #[must_use]
    pub const fn already_present_message(self) -> &'static str {
        match self {
            Self::Favorites => "recipe is already in favorites",
            Self::ShoppingCart => "recipe is already in the shopping cart",
        }
    }

    #[must_use]
    pub const fn not_present_message(self) -> &'static str {
        match self {
            Self::Favorites => "recipe is not in favorites",
            Self::ShoppingCart => "recipe is not in the shopping cart",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Favorites => write!(f, "favorites"),
            Self::ShoppingCart => write!(f, "shopping cart"),
        }
    }
}

impl Toggle {
    /// Map "did the store change an edge" onto the toggle result.
    ///
    /// # Errors
    ///
    /// Returns [`ToggleError`] when `changed` is false.
    pub const fn outcome(self, collection: Collection, changed: bool) -> Result<(), ToggleError> {
        match (self, changed) {
            (_, true) => Ok(()),
            (Self::Add, false) => Err(ToggleError::AlreadyPresent(collection)),
            (Self::Remove, false) => Err(ToggleError::NotPresent(collection)),
        }
    }
}

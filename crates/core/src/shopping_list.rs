//! Shopping-list aggregation.
//!
//! A user's cart is a set of recipes. The shopping list sums the amount of
//! every ingredient across those recipes and renders one line per distinct
//! ingredient:
//!
//! ```text
//! Flour - 150 g
//! Sugar - 20 g
//! ```
//!
//! Lines are ordered by ingredient name, then id, so the same cart always
//! renders the same document.

use std::collections::{BTreeMap, HashMap};

use crate::types::IngredientId;
use crate::views::IngredientView;

/// File name offered to the browser for the rendered list.
pub const SHOPPING_LIST_FILENAME: &str = "shopping_cart.txt";

/// Errors produced while rendering a shopping list.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShoppingListError {
    /// An aggregated id has no catalog entry.
    #[error("ingredient {0} missing from catalog")]
    UnknownIngredient(IngredientId),
}

/// Running totals of ingredient amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingList {
    totals: BTreeMap<IngredientId, i64>,
}

impl ShoppingList {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one recipe's ingredient lines to the totals.
    pub fn add_recipe<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = (IngredientId, i32)>,
    {
        for (ingredient, amount) in lines {
            *self.totals.entry(ingredient).or_insert(0) += i64::from(amount);
        }
    }

    /// Build a list from the ingredient lines of every recipe in a cart.
    #[must_use]
    pub fn from_recipes<R, I>(recipes: R) -> Self
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = (IngredientId, i32)>,
    {
        let mut list = Self::new();
        for lines in recipes {
            list.add_recipe(lines);
        }
        list
    }

    /// Total amount for one ingredient, if it appears in the cart.
    #[must_use]
    pub fn total(&self, ingredient: IngredientId) -> Option<i64> {
        self.totals.get(&ingredient).copied()
    }

    /// Number of distinct ingredients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// True when the cart contributed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Render the list as plain text, one newline-terminated line per
    /// ingredient.
    ///
    /// # Errors
    ///
    /// Returns [`ShoppingListError::UnknownIngredient`] if `catalog` lacks an
    /// ingredient present in the totals.
    pub fn render(
        &self,
        catalog: &HashMap<IngredientId, IngredientView>,
    ) -> Result<String, ShoppingListError> {
        let mut rows = Vec::with_capacity(self.totals.len());
        for (id, total) in &self.totals {
            let ingredient = catalog
                .get(id)
                .ok_or(ShoppingListError::UnknownIngredient(*id))?;
            rows.push((ingredient, *total));
        }

        rows.sort_by(|(a, _), (b, _)| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let mut out = String::new();
        for (ingredient, total) in rows {
            out.push_str(&format!(
                "{} - {} {}\n",
                ingredient.name, total, ingredient.measurement_unit
            ));
        }
        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ingredient(id: i32, name: &str, unit: &str) -> (IngredientId, IngredientView) {
        let id = IngredientId::new(id);
        (
            id,
            IngredientView {
                id,
                name: name.to_owned(),
                measurement_unit: unit.to_owned(),
            },
        )
    }

    fn catalog() -> HashMap<IngredientId, IngredientView> {
        [
            ingredient(1, "flour", "g"),
            ingredient(2, "sugar", "g"),
            ingredient(3, "eggs", "pcs"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_sums_across_recipes() {
        let flour = IngredientId::new(1);
        let sugar = IngredientId::new(2);
        let list = ShoppingList::from_recipes([
            vec![(flour, 100)],
            vec![(flour, 50), (sugar, 20)],
        ]);

        assert_eq!(list.len(), 2);
        assert_eq!(list.total(flour), Some(150));
        assert_eq!(list.total(sugar), Some(20));
        assert_eq!(
            list.render(&catalog()).unwrap(),
            "flour - 150 g\nsugar - 20 g\n"
        );
    }

    #[test]
    fn test_empty_cart_renders_empty_document() {
        let list = ShoppingList::from_recipes(Vec::<Vec<(IngredientId, i32)>>::new());
        assert!(list.is_empty());
        assert_eq!(list.render(&HashMap::new()).unwrap(), "");
    }

    #[test]
    fn test_lines_sorted_by_name() {
        let list = ShoppingList::from_recipes([vec![
            (IngredientId::new(2), 1),
            (IngredientId::new(3), 2),
            (IngredientId::new(1), 3),
        ]]);
        assert_eq!(
            list.render(&catalog()).unwrap(),
            "eggs - 2 pcs\nflour - 3 g\nsugar - 1 g\n"
        );
    }

    #[test]
    fn test_totals_do_not_overflow_i32() {
        let flour = IngredientId::new(1);
        let list = ShoppingList::from_recipes([vec![(flour, i32::MAX)], vec![(flour, i32::MAX)]]);
        assert_eq!(list.total(flour), Some(2 * i64::from(i32::MAX)));
    }

    #[test]
    fn test_missing_catalog_entry() {
        let list = ShoppingList::from_recipes([vec![(IngredientId::new(42), 1)]]);
        assert_eq!(
            list.render(&catalog()),
            Err(ShoppingListError::UnknownIngredient(IngredientId::new(42)))
        );
    }
}

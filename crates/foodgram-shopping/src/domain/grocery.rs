//! Grocery aggregation.
//!
//! Every ingredient line of every recipe in the cart is grouped by
//! `(name, measurement unit)` and the amounts of each group are summed.
//! Units are never converted: `Flour, g` and `Flour, kg` stay separate.

use std::collections::BTreeMap;

use foodgram_core::repository::CartIngredientRecord;
use serde::Serialize;

/// One consolidated line of the shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroceryLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Sums cart rows per `(name, unit)`.
///
/// The result is ordered by name, then unit, comparing bytes; the order of
/// `rows` does not matter.
#[must_use]
pub fn aggregate(rows: &[CartIngredientRecord]) -> Vec<GroceryLine> {
    let mut totals: BTreeMap<(&str, &str), i64> = BTreeMap::new();
    for row in rows {
        let total = totals
            .entry((row.name.as_str(), row.measurement_unit.as_str()))
            .or_insert(0);
        *total = total.saturating_add(row.amount);
    }
    totals
        .into_iter()
        .map(|((name, unit), amount)| GroceryLine {
            name: name.to_owned(),
            measurement_unit: unit.to_owned(),
            amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(recipe_id: i64, name: &str, unit: &str, amount: i64) -> CartIngredientRecord {
        CartIngredientRecord {
            recipe_id,
            name: name.to_owned(),
            measurement_unit: unit.to_owned(),
            amount,
        }
    }

    fn line(name: &str, unit: &str, amount: i64) -> GroceryLine {
        GroceryLine {
            name: name.to_owned(),
            measurement_unit: unit.to_owned(),
            amount,
        }
    }

    #[test]
    fn test_shared_pairs_are_summed_across_recipes() {
        // Arrange
        let rows = vec![
            row(1, "Flour", "g", 200),
            row(1, "Salt", "g", 5),
            row(2, "Flour", "g", 300),
        ];

        // Act
        let lines = aggregate(&rows);

        // Assert
        assert_eq!(lines, vec![line("Flour", "g", 500), line("Salt", "g", 5)]);
    }

    #[test]
    fn test_same_name_with_different_units_stays_separate() {
        let rows = vec![
            row(1, "Milk", "ml", 200),
            row(2, "Milk", "cup", 1),
            row(3, "Milk", "ml", 50),
        ];

        let lines = aggregate(&rows);

        assert_eq!(lines, vec![line("Milk", "cup", 1), line("Milk", "ml", 250)]);
    }

    #[test]
    fn test_empty_cart_yields_no_lines() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_order_of_rows_does_not_matter() {
        // Arrange
        let rows = vec![
            row(1, "eggs", "pcs", 2),
            row(2, "Butter", "g", 50),
            row(3, "eggs", "pcs", 3),
            row(3, "Sugar", "g", 100),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        // Act
        let forward = aggregate(&rows);
        let backward = aggregate(&reversed);

        // Assert
        assert_eq!(forward, backward);
        assert_eq!(forward, aggregate(&rows));
        let names: Vec<&str> = forward.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Butter", "Sugar", "eggs"]);
    }
}

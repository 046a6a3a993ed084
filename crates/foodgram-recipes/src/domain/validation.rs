//! Field validators for recipe commands.

use std::borrow::Cow;
use std::collections::HashSet;

use foodgram_core::repository::IngredientAmount;
use validator::ValidationError;

fn invalid(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// At least one tag, each listed once.
///
/// # Errors
///
/// Returns a `ValidationError` for an empty or repeating list.
pub fn validate_tag_ids(tag_ids: &[i64]) -> Result<(), ValidationError> {
    if tag_ids.is_empty() {
        return Err(invalid("empty_tags", "tags list cannot be empty"));
    }
    let mut seen = HashSet::new();
    if let Some(repeated) = tag_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(invalid(
            "duplicate_tag",
            format!("tag {repeated} is listed more than once"),
        ));
    }
    Ok(())
}

/// At least one ingredient, each listed once with an amount of at least 1.
///
/// # Errors
///
/// Returns a `ValidationError` for an empty list, a repeated ingredient or
/// a non-positive amount.
pub fn validate_ingredient_lines(lines: &[IngredientAmount]) -> Result<(), ValidationError> {
    if lines.is_empty() {
        return Err(invalid("empty_ingredients", "ingredients list cannot be empty"));
    }
    let mut seen = HashSet::new();
    for line in lines {
        if line.amount < 1 {
            return Err(invalid(
                "invalid_amount",
                format!("amount of ingredient {} must be at least 1", line.ingredient_id),
            ));
        }
        if !seen.insert(line.ingredient_id) {
            return Err(invalid(
                "duplicate_ingredient",
                format!("ingredient {} is listed more than once", line.ingredient_id),
            ));
        }
    }
    Ok(())
}

/// Ids from `requested` that are absent from `existing`, in request order.
#[must_use]
pub fn missing_ids(requested: &[i64], existing: &[i64]) -> Vec<i64> {
    requested
        .iter()
        .copied()
        .filter(|id| !existing.contains(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ingredient_id: i64, amount: i32) -> IngredientAmount {
        IngredientAmount {
            ingredient_id,
            amount,
        }
    }

    #[test]
    fn test_tag_ids_must_be_present_and_unique() {
        assert!(validate_tag_ids(&[1, 2]).is_ok());
        assert_eq!(validate_tag_ids(&[]).unwrap_err().code, "empty_tags");
        assert_eq!(validate_tag_ids(&[1, 2, 1]).unwrap_err().code, "duplicate_tag");
    }

    #[test]
    fn test_ingredient_lines_rules() {
        assert!(validate_ingredient_lines(&[line(1, 200), line(2, 1)]).is_ok());
        assert_eq!(
            validate_ingredient_lines(&[]).unwrap_err().code,
            "empty_ingredients"
        );
        assert_eq!(
            validate_ingredient_lines(&[line(1, 0)]).unwrap_err().code,
            "invalid_amount"
        );
        assert_eq!(
            validate_ingredient_lines(&[line(1, 5), line(1, 7)])
                .unwrap_err()
                .code,
            "duplicate_ingredient"
        );
    }

    #[test]
    fn test_missing_ids_keeps_request_order() {
        assert_eq!(missing_ids(&[5, 1, 9], &[1]), vec![5, 9]);
        assert!(missing_ids(&[1], &[1, 2]).is_empty());
    }
}

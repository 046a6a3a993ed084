//! Query handlers for the Shopping list context.

use foodgram_core::error::DomainError;
use foodgram_core::repository::CartRepository;
use tracing::{debug, instrument};

use crate::domain::grocery::{GroceryLine, aggregate};
use crate::domain::render::{
    PDF_CONTENT_TYPE, RenderError, SHOPPING_LIST_FILE_NAME, render_shopping_list,
};

/// A rendered shopping list ready to be sent as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListFile {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Aggregates the groceries for the recipes in the user's cart.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the cart cannot be read.
pub async fn grocery_list(
    user_id: i64,
    cart: &dyn CartRepository,
) -> Result<Vec<GroceryLine>, DomainError> {
    let rows = cart.cart_ingredients(user_id).await?;
    Ok(aggregate(&rows))
}

/// Builds the PDF shopping list for the user's cart.
///
/// Returns `Ok(None)` when the cart holds nothing to buy.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the cart cannot be read or the
/// document cannot be encoded.
#[instrument(skip(cart))]
pub async fn download_shopping_list(
    user_id: i64,
    cart: &dyn CartRepository,
) -> Result<Option<ShoppingListFile>, DomainError> {
    let lines = grocery_list(user_id, cart).await?;
    match render_shopping_list(&lines) {
        Ok(bytes) => {
            debug!(lines = lines.len(), size = bytes.len(), "shopping list rendered");
            Ok(Some(ShoppingListFile {
                file_name: SHOPPING_LIST_FILE_NAME,
                content_type: PDF_CONTENT_TYPE,
                bytes,
            }))
        }
        Err(RenderError::EmptyList) => Ok(None),
        Err(error @ (RenderError::Font(_) | RenderError::Pdf(_))) => Err(DomainError::Infrastructure(error.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use foodgram_core::error::DomainError;
    use foodgram_core::repository::RecipeCollection;
    use foodgram_test_support::{FailingStore, InMemoryStore, fixed_now};

    use super::*;

    #[tokio::test]
    async fn test_grocery_list_sums_cart_recipes_only() {
        // Arrange
        let store = InMemoryStore::new();
        let user = store.add_user("shopper", "hash").id;
        let author = store.add_user("chef", "hash").id;
        let flour = store.add_ingredient("Flour", "g").id;
        let salt = store.add_ingredient("Salt", "g").id;
        let sugar = store.add_ingredient("Sugar", "g").id;
        let a = store.add_recipe(author, "A", &[], &[(flour, 200), (salt, 5)], fixed_now());
        let b = store.add_recipe(author, "B", &[], &[(flour, 300)], fixed_now());
        store.add_recipe(author, "C", &[], &[(sugar, 50)], fixed_now());
        store.collect(RecipeCollection::ShoppingCart, user, a.id);
        store.collect(RecipeCollection::ShoppingCart, user, b.id);

        // Act
        let lines = grocery_list(user, &store).await.unwrap();

        // Assert
        assert_eq!(
            lines,
            vec![
                GroceryLine {
                    name: "Flour".to_owned(),
                    measurement_unit: "g".to_owned(),
                    amount: 500,
                },
                GroceryLine {
                    name: "Salt".to_owned(),
                    measurement_unit: "g".to_owned(),
                    amount: 5,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_download_is_idempotent() {
        // Arrange
        let store = InMemoryStore::new();
        let user = store.add_user("shopper", "hash").id;
        let eggs = store.add_ingredient("Eggs", "pcs").id;
        let recipe = store.add_recipe(user, "Omelette", &[], &[(eggs, 3)], fixed_now());
        store.collect(RecipeCollection::ShoppingCart, user, recipe.id);

        // Act
        let first = download_shopping_list(user, &store).await.unwrap().unwrap();
        let second = download_shopping_list(user, &store).await.unwrap().unwrap();

        // Assert
        assert_eq!(first.file_name, "ShoppingCart.pdf");
        assert_eq!(first.content_type, "application/pdf");
        assert_eq!(grocery_list(user, &store).await.unwrap().len(), 1);
        assert_eq!(first.bytes, second.bytes);
    }

    #[tokio::test]
    async fn test_download_with_empty_cart_returns_none() {
        let store = InMemoryStore::new();
        let user = store.add_user("shopper", "hash").id;

        let file = download_shopping_list(user, &store).await.unwrap();

        assert!(file.is_none());
    }

    #[tokio::test]
    async fn test_download_propagates_infrastructure_error() {
        let result = download_shopping_list(1, &FailingStore).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}

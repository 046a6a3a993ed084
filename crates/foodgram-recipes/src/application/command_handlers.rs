//! Command handlers for the Recipes context.
//!
//! This module contains application-level command handler functions that
//! orchestrate domain logic: validate the command, check references and
//! ownership, persist, and keep stored media in step with recipe rows.

use foodgram_core::clock::Clock;
use foodgram_core::command::Command;
use foodgram_core::error::DomainError;
use foodgram_core::repository::{
    ImageStore, IngredientRepository, RecipeCollection, RecipeCollectionRepository,
    RecipeRecord, RecipeRepository, RecipeWrite, TagRepository,
};
use foodgram_users::application::query_handlers::RecipeSummaryView;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::commands::{
    AddToCollection, CreateRecipe, DeleteRecipe, ImportIngredients, RemoveFromCollection,
    UpdateRecipe,
};
use crate::domain::import::parse_ingredients;
use crate::domain::upload::decode_data_uri;
use crate::domain::validation::missing_ids;

/// Checks that every referenced tag and ingredient exists.
async fn check_references(
    tag_ids: &[i64],
    ingredient_ids: &[i64],
    tags: &dyn TagRepository,
    ingredients: &dyn IngredientRepository,
) -> Result<(), DomainError> {
    let unknown_tags = missing_ids(tag_ids, &tags.existing_tag_ids(tag_ids).await?);
    if !unknown_tags.is_empty() {
        return Err(DomainError::validation(format!(
            "tags: unknown tag ids {unknown_tags:?}"
        )));
    }
    let unknown_ingredients = missing_ids(
        ingredient_ids,
        &ingredients.existing_ingredient_ids(ingredient_ids).await?,
    );
    if !unknown_ingredients.is_empty() {
        return Err(DomainError::validation(format!(
            "ingredients: unknown ingredient ids {unknown_ingredients:?}"
        )));
    }
    Ok(())
}

/// Loads a recipe and checks that `user_id` wrote it.
async fn owned_recipe(
    recipe_id: i64,
    user_id: i64,
    recipes: &dyn RecipeRepository,
) -> Result<RecipeRecord, DomainError> {
    let details = recipes
        .find_recipe(recipe_id)
        .await?
        .ok_or(DomainError::not_found("recipe", recipe_id))?;
    if details.recipe.author_id != user_id {
        return Err(DomainError::PermissionDenied(
            "only the author may change this recipe".into(),
        ));
    }
    Ok(details.recipe)
}

/// Removes a stored image, logging rather than failing on errors.
async fn discard_image(path: &str, images: &dyn ImageStore) {
    if let Err(error) = images.delete_image(path).await {
        warn!(path, %error, "failed to delete stored image");
    }
}

/// Handles the `CreateRecipe` command and returns the new recipe id.
///
/// # Errors
///
/// Returns `DomainError::Validation` for invalid fields, a bad image or
/// unknown tag / ingredient ids; `DomainError::Infrastructure` if
/// persistence fails.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, author_id = command.author_id))]
pub async fn handle_create_recipe(
    command: &CreateRecipe,
    clock: &dyn Clock,
    tags: &dyn TagRepository,
    ingredients: &dyn IngredientRepository,
    recipes: &dyn RecipeRepository,
    images: &dyn ImageStore,
) -> Result<i64, DomainError> {
    command.validate()?;
    let upload = decode_data_uri(&command.image)?;
    let ingredient_ids: Vec<i64> = command
        .ingredients
        .iter()
        .map(|line| line.ingredient_id)
        .collect();
    check_references(&command.tags, &ingredient_ids, tags, ingredients).await?;

    let image = images.save_image(&upload.bytes, upload.extension).await?;
    let write = RecipeWrite {
        author_id: command.author_id,
        name: command.name.clone(),
        image: image.clone(),
        text: command.text.clone(),
        cooking_time: command.cooking_time,
        pub_date: clock.now(),
        tag_ids: command.tags.clone(),
        ingredients: command.ingredients.clone(),
    };
    let recipe_id = match recipes.insert_recipe(write).await {
        Ok(id) => id,
        Err(error) => {
            discard_image(&image, images).await;
            return Err(error);
        }
    };

    info!(command = command.command_type(), recipe_id, "recipe created");
    Ok(recipe_id)
}

/// Handles the `UpdateRecipe` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown recipe,
/// `DomainError::PermissionDenied` if the user is not the author and
/// `DomainError::Validation` as for creation.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, recipe_id = command.recipe_id))]
pub async fn handle_update_recipe(
    command: &UpdateRecipe,
    tags: &dyn TagRepository,
    ingredients: &dyn IngredientRepository,
    recipes: &dyn RecipeRepository,
    images: &dyn ImageStore,
) -> Result<(), DomainError> {
    let existing = owned_recipe(command.recipe_id, command.user_id, recipes).await?;
    command.validate()?;
    let upload = command.image.as_deref().map(decode_data_uri).transpose()?;
    let ingredient_ids: Vec<i64> = command
        .ingredients
        .iter()
        .map(|line| line.ingredient_id)
        .collect();
    check_references(&command.tags, &ingredient_ids, tags, ingredients).await?;

    let new_image = match &upload {
        Some(upload) => Some(images.save_image(&upload.bytes, upload.extension).await?),
        None => None,
    };
    let write = RecipeWrite {
        author_id: existing.author_id,
        name: command.name.clone(),
        image: new_image.clone().unwrap_or_else(|| existing.image.clone()),
        text: command.text.clone(),
        cooking_time: command.cooking_time,
        pub_date: existing.pub_date,
        tag_ids: command.tags.clone(),
        ingredients: command.ingredients.clone(),
    };
    if let Err(error) = recipes.update_recipe(existing.id, write).await {
        if let Some(path) = &new_image {
            discard_image(path, images).await;
        }
        return Err(error);
    }
    if new_image.is_some() {
        discard_image(&existing.image, images).await;
    }

    info!(command = command.command_type(), "recipe updated");
    Ok(())
}

/// Handles the `DeleteRecipe` command, removing the stored image as well.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown recipe and
/// `DomainError::PermissionDenied` if the user is not the author.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, recipe_id = command.recipe_id))]
pub async fn handle_delete_recipe(
    command: &DeleteRecipe,
    recipes: &dyn RecipeRepository,
    images: &dyn ImageStore,
) -> Result<(), DomainError> {
    let existing = owned_recipe(command.recipe_id, command.user_id, recipes).await?;
    if !recipes.delete_recipe(existing.id).await? {
        return Err(DomainError::not_found("recipe", existing.id));
    }
    discard_image(&existing.image, images).await;

    info!(command = command.command_type(), "recipe deleted");
    Ok(())
}

/// Handles the `AddToCollection` command and returns the recipe summary.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown recipe and
/// `DomainError::Validation` if the recipe is already in the collection.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, recipe_id = command.recipe_id))]
pub async fn handle_add_to_collection(
    command: &AddToCollection,
    recipes: &dyn RecipeRepository,
    collections: &dyn RecipeCollectionRepository,
    images: &dyn ImageStore,
) -> Result<RecipeSummaryView, DomainError> {
    let details = recipes
        .find_recipe(command.recipe_id)
        .await?
        .ok_or(DomainError::not_found("recipe", command.recipe_id))?;
    let added = collections
        .add_to_collection(command.collection, command.user_id, command.recipe_id)
        .await?;
    if !added {
        return Err(DomainError::validation(format!(
            "recipe is already in your {}",
            command.collection.label()
        )));
    }

    info!(
        command = command.command_type(),
        user_id = command.user_id,
        "recipe collected"
    );
    Ok(RecipeSummaryView::new(&details.recipe, images))
}

/// Handles the `RemoveFromCollection` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown recipe or one that is not
/// in the collection.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, recipe_id = command.recipe_id))]
pub async fn handle_remove_from_collection(
    command: &RemoveFromCollection,
    recipes: &dyn RecipeRepository,
    collections: &dyn RecipeCollectionRepository,
) -> Result<(), DomainError> {
    if recipes.find_recipe(command.recipe_id).await?.is_none() {
        return Err(DomainError::not_found("recipe", command.recipe_id));
    }
    let removed = collections
        .remove_from_collection(command.collection, command.user_id, command.recipe_id)
        .await?;
    if !removed {
        return Err(DomainError::not_found(
            match command.collection {
                RecipeCollection::Favorites => "favorite",
                RecipeCollection::ShoppingCart => "cart item",
            },
            command.recipe_id,
        ));
    }

    info!(
        command = command.command_type(),
        user_id = command.user_id,
        "recipe removed from collection"
    );
    Ok(())
}

/// Handles the `ImportIngredients` command and returns how many new
/// ingredients were stored.
///
/// # Errors
///
/// Returns `DomainError::Validation` for malformed content.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
pub async fn handle_import_ingredients(
    command: &ImportIngredients,
    ingredients: &dyn IngredientRepository,
) -> Result<u64, DomainError> {
    let rows = parse_ingredients(&command.content, command.format)?;
    let inserted = ingredients.insert_ingredients(&rows).await?;

    info!(
        command = command.command_type(),
        parsed = rows.len(),
        inserted,
        "ingredients imported"
    );
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use foodgram_core::error::DomainError;
    use foodgram_core::repository::IngredientAmount;
    use foodgram_test_support::{FixedClock, InMemoryImageStore, InMemoryStore, fixed_now};
    use image::{ImageBuffer, ImageFormat, Rgb};
    use uuid::Uuid;

    use super::*;
    use crate::domain::import::IngredientFileFormat;

    fn png_data_uri() -> String {
        let pixels = ImageBuffer::from_pixel(1, 1, Rgb([10u8, 200, 10]));
        let mut bytes = Vec::new();
        pixels
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", STANDARD.encode(bytes))
    }

    struct Fixture {
        store: InMemoryStore,
        images: InMemoryImageStore,
        author: i64,
        stranger: i64,
        tag: i64,
        flour: i64,
        sugar: i64,
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let author = store.add_user("chef", "hash").id;
        let stranger = store.add_user("stranger", "hash").id;
        let tag = store.add_tag("Dinner", "#49B64E", "dinner").id;
        let flour = store.add_ingredient("Flour", "g").id;
        let sugar = store.add_ingredient("Sugar", "g").id;
        Fixture {
            store,
            images: InMemoryImageStore::new(),
            author,
            stranger,
            tag,
            flour,
            sugar,
        }
    }

    fn create_command(f: &Fixture) -> CreateRecipe {
        CreateRecipe {
            correlation_id: Uuid::new_v4(),
            author_id: f.author,
            name: "Crepes".to_owned(),
            image: png_data_uri(),
            text: "Mix and fry.".to_owned(),
            cooking_time: 20,
            tags: vec![f.tag],
            ingredients: vec![
                IngredientAmount {
                    ingredient_id: f.flour,
                    amount: 250,
                },
                IngredientAmount {
                    ingredient_id: f.sugar,
                    amount: 30,
                },
            ],
        }
    }

    async fn create(f: &Fixture) -> i64 {
        handle_create_recipe(
            &create_command(f),
            &FixedClock(fixed_now()),
            &f.store,
            &f.store,
            &f.store,
            &f.images,
        )
        .await
        .unwrap()
    }

    fn update_command(f: &Fixture, recipe_id: i64, user_id: i64) -> UpdateRecipe {
        UpdateRecipe {
            correlation_id: Uuid::new_v4(),
            recipe_id,
            user_id,
            name: "Thin crepes".to_owned(),
            image: None,
            text: "Mix, rest, fry.".to_owned(),
            cooking_time: 25,
            tags: vec![f.tag],
            ingredients: vec![IngredientAmount {
                ingredient_id: f.flour,
                amount: 300,
            }],
        }
    }

    #[tokio::test]
    async fn test_create_recipe_stores_image_and_lines() {
        // Arrange
        let f = fixture();

        // Act
        let recipe_id = create(&f).await;

        // Assert
        let details = f.store.find_recipe(recipe_id).await.unwrap().unwrap();
        assert_eq!(details.recipe.name, "Crepes");
        assert_eq!(details.recipe.pub_date, fixed_now());
        assert_eq!(details.ingredients.len(), 2);
        assert_eq!(f.images.stored_paths(), vec![details.recipe.image]);
    }

    #[tokio::test]
    async fn test_create_recipe_rejects_unknown_ingredient() {
        // Arrange
        let f = fixture();
        let mut command = create_command(&f);
        command.ingredients[1].ingredient_id = 999;

        // Act
        let result = handle_create_recipe(
            &command,
            &FixedClock(fixed_now()),
            &f.store,
            &f.store,
            &f.store,
            &f.images,
        )
        .await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(message) => assert!(message.contains("999")),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert!(f.images.stored_paths().is_empty());
    }

    #[tokio::test]
    async fn test_create_recipe_rejects_duplicate_ingredients_and_zero_time() {
        // Arrange
        let f = fixture();
        let mut command = create_command(&f);
        command.ingredients[1].ingredient_id = f.flour;
        command.cooking_time = 0;

        // Act
        let result = handle_create_recipe(
            &command,
            &FixedClock(fixed_now()),
            &f.store,
            &f.store,
            &f.store,
            &f.images,
        )
        .await;

        // Assert
        match result.unwrap_err() {
            DomainError::Validation(message) => {
                assert!(message.contains("cooking_time:"));
                assert!(message.contains("ingredients:"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_recipe_rejects_non_image_payload() {
        let f = fixture();
        let mut command = create_command(&f);
        command.image = format!("data:image/png;base64,{}", STANDARD.encode("nope"));

        let result = handle_create_recipe(
            &command,
            &FixedClock(fixed_now()),
            &f.store,
            &f.store,
            &f.store,
            &f.images,
        )
        .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_recipe_by_stranger_is_denied() {
        // Arrange
        let f = fixture();
        let recipe_id = create(&f).await;

        // Act
        let result = handle_update_recipe(
            &update_command(&f, recipe_id, f.stranger),
            &f.store,
            &f.store,
            &f.store,
            &f.images,
        )
        .await;

        // Assert
        assert!(matches!(result, Err(DomainError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_update_recipe_replaces_lines_and_keeps_image() {
        // Arrange
        let f = fixture();
        let recipe_id = create(&f).await;
        let before = f.store.find_recipe(recipe_id).await.unwrap().unwrap();

        // Act
        handle_update_recipe(
            &update_command(&f, recipe_id, f.author),
            &f.store,
            &f.store,
            &f.store,
            &f.images,
        )
        .await
        .unwrap();

        // Assert
        let after = f.store.find_recipe(recipe_id).await.unwrap().unwrap();
        assert_eq!(after.recipe.name, "Thin crepes");
        assert_eq!(after.recipe.image, before.recipe.image);
        assert_eq!(after.recipe.pub_date, before.recipe.pub_date);
        assert_eq!(after.ingredients.len(), 1);
        assert_eq!(after.ingredients[0].amount, 300);
    }

    #[tokio::test]
    async fn test_update_recipe_with_new_image_drops_old_file() {
        // Arrange
        let f = fixture();
        let recipe_id = create(&f).await;
        let old_image = f.store.find_recipe(recipe_id).await.unwrap().unwrap().recipe.image;
        let mut command = update_command(&f, recipe_id, f.author);
        command.image = Some(png_data_uri());

        // Act
        handle_update_recipe(&command, &f.store, &f.store, &f.store, &f.images)
            .await
            .unwrap();

        // Assert
        let new_image = f.store.find_recipe(recipe_id).await.unwrap().unwrap().recipe.image;
        assert_ne!(new_image, old_image);
        assert_eq!(f.images.stored_paths(), vec![new_image]);
    }

    #[tokio::test]
    async fn test_update_unknown_recipe_is_not_found() {
        let f = fixture();

        let result = handle_update_recipe(
            &update_command(&f, 404, f.author),
            &f.store,
            &f.store,
            &f.store,
            &f.images,
        )
        .await;

        assert!(matches!(
            result,
            Err(DomainError::NotFound { entity: "recipe", id: 404 })
        ));
    }

    #[tokio::test]
    async fn test_delete_recipe_removes_row_and_image() {
        // Arrange
        let f = fixture();
        let recipe_id = create(&f).await;
        let command = DeleteRecipe {
            correlation_id: Uuid::new_v4(),
            recipe_id,
            user_id: f.author,
        };

        // Act
        handle_delete_recipe(&command, &f.store, &f.images)
            .await
            .unwrap();

        // Assert
        assert!(f.store.find_recipe(recipe_id).await.unwrap().is_none());
        assert!(f.images.stored_paths().is_empty());
    }

    #[tokio::test]
    async fn test_add_to_collection_twice_is_rejected() {
        // Arrange
        let f = fixture();
        let recipe_id = create(&f).await;
        let command = AddToCollection {
            correlation_id: Uuid::new_v4(),
            collection: RecipeCollection::ShoppingCart,
            user_id: f.stranger,
            recipe_id,
        };

        // Act
        let first = handle_add_to_collection(&command, &f.store, &f.store, &f.images).await;
        let second = handle_add_to_collection(&command, &f.store, &f.store, &f.images).await;

        // Assert
        let summary = first.unwrap();
        assert_eq!(summary.id, recipe_id);
        assert_eq!(summary.cooking_time, 20);
        assert!(summary.image.starts_with("http://testserver/media/recipes/"));
        assert!(matches!(second, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_unknown_recipe_to_favorites_is_not_found() {
        let f = fixture();
        let command = AddToCollection {
            correlation_id: Uuid::new_v4(),
            collection: RecipeCollection::Favorites,
            user_id: f.stranger,
            recipe_id: 77,
        };

        let result = handle_add_to_collection(&command, &f.store, &f.store, &f.images).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_remove_from_collection() {
        // Arrange
        let f = fixture();
        let recipe_id = create(&f).await;
        f.store
            .collect(RecipeCollection::Favorites, f.stranger, recipe_id);
        let command = RemoveFromCollection {
            correlation_id: Uuid::new_v4(),
            collection: RecipeCollection::Favorites,
            user_id: f.stranger,
            recipe_id,
        };

        // Act
        let first = handle_remove_from_collection(&command, &f.store, &f.store).await;
        let second = handle_remove_from_collection(&command, &f.store, &f.store).await;

        // Assert
        assert!(first.is_ok());
        assert!(matches!(
            second,
            Err(DomainError::NotFound {
                entity: "favorite",
                ..
            })
        ));
        assert_eq!(
            f.store
                .count_collectors(RecipeCollection::Favorites, recipe_id)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_import_ingredients_skips_existing_pairs() {
        // Arrange
        let f = fixture();
        let command = ImportIngredients {
            correlation_id: Uuid::new_v4(),
            format: IngredientFileFormat::Csv,
            content: "Flour,g\nMilk,ml\nEggs,pcs\n".to_owned(),
        };

        // Act
        let inserted = handle_import_ingredients(&command, &f.store).await.unwrap();

        // Assert
        assert_eq!(inserted, 2);
    }
}

//! Commands for the Recipes context.

use foodgram_core::command::Command;
use foodgram_core::repository::{IngredientAmount, RecipeCollection};
use uuid::Uuid;
use validator::Validate;

use super::import::IngredientFileFormat;
use super::validation::{validate_ingredient_lines, validate_tag_ids};

/// Command to publish a new recipe.
#[derive(Debug, Clone, Validate)]
pub struct CreateRecipe {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The authenticated author.
    pub author_id: i64,
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub name: String,
    /// `data:image/<ext>;base64,...` URI.
    pub image: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub text: String,
    /// Minutes.
    #[validate(range(min = 1, message = "must be at least 1 minute"))]
    pub cooking_time: i32,
    #[validate(custom(function = "validate_tag_ids"))]
    pub tags: Vec<i64>,
    #[validate(custom(function = "validate_ingredient_lines"))]
    pub ingredients: Vec<IngredientAmount>,
}

impl Command for CreateRecipe {
    fn command_type(&self) -> &'static str {
        "recipes.create_recipe"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to edit a recipe. Tags and ingredient lines are replaced as a
/// whole; a missing image keeps the stored one.
#[derive(Debug, Clone, Validate)]
pub struct UpdateRecipe {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub recipe_id: i64,
    /// The user attempting the edit; must be the author.
    pub user_id: i64,
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub name: String,
    pub image: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub text: String,
    #[validate(range(min = 1, message = "must be at least 1 minute"))]
    pub cooking_time: i32,
    #[validate(custom(function = "validate_tag_ids"))]
    pub tags: Vec<i64>,
    #[validate(custom(function = "validate_ingredient_lines"))]
    pub ingredients: Vec<IngredientAmount>,
}

impl Command for UpdateRecipe {
    fn command_type(&self) -> &'static str {
        "recipes.update_recipe"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to delete a recipe.
#[derive(Debug, Clone)]
pub struct DeleteRecipe {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub recipe_id: i64,
    /// The user attempting the deletion; must be the author.
    pub user_id: i64,
}

impl Command for DeleteRecipe {
    fn command_type(&self) -> &'static str {
        "recipes.delete_recipe"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to put a recipe into the user's favorites or shopping cart.
#[derive(Debug, Clone)]
pub struct AddToCollection {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub collection: RecipeCollection,
    pub user_id: i64,
    pub recipe_id: i64,
}

impl Command for AddToCollection {
    fn command_type(&self) -> &'static str {
        match self.collection {
            RecipeCollection::Favorites => "recipes.add_favorite",
            RecipeCollection::ShoppingCart => "recipes.add_to_shopping_cart",
        }
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to take a recipe out of the user's favorites or shopping cart.
#[derive(Debug, Clone)]
pub struct RemoveFromCollection {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub collection: RecipeCollection,
    pub user_id: i64,
    pub recipe_id: i64,
}

impl Command for RemoveFromCollection {
    fn command_type(&self) -> &'static str {
        match self.collection {
            RecipeCollection::Favorites => "recipes.remove_favorite",
            RecipeCollection::ShoppingCart => "recipes.remove_from_shopping_cart",
        }
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to bulk-load the ingredient catalog.
#[derive(Debug, Clone)]
pub struct ImportIngredients {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub format: IngredientFileFormat,
    /// Raw file content.
    pub content: String,
}

impl Command for ImportIngredients {
    fn command_type(&self) -> &'static str {
        "recipes.import_ingredients"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

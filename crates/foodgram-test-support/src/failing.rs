//! A store whose every operation fails, for exercising error paths.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use foodgram_core::error::DomainError;
use foodgram_core::pagination::{Page, PageRequest};
use foodgram_core::repository::{
    CartIngredientRecord, CartRepository, ImageStore, IngredientRecord, IngredientRepository,
    NewIngredientRecord, NewUserRecord, RecipeCollection, RecipeCollectionRepository,
    RecipeDetailsRecord, RecipeQuery, RecipeRecord, RecipeRepository, RecipeWrite,
    SubscriptionRepository, TagRecord, TagRepository, TokenRepository, UserRecord,
    UserRepository,
};

/// Implements every repository trait by returning an infrastructure error.
#[derive(Debug, Default)]
pub struct FailingStore;

fn refused<T>() -> Result<T, DomainError> {
    Err(DomainError::Infrastructure("connection refused".into()))
}

#[async_trait]
impl UserRepository for FailingStore {
    async fn insert_user(&self, _user: NewUserRecord) -> Result<UserRecord, DomainError> {
        refused()
    }

    async fn find_user(&self, _id: i64) -> Result<Option<UserRecord>, DomainError> {
        refused()
    }

    async fn find_user_by_email(&self, _email: &str) -> Result<Option<UserRecord>, DomainError> {
        refused()
    }

    async fn find_user_by_username(
        &self,
        _username: &str,
    ) -> Result<Option<UserRecord>, DomainError> {
        refused()
    }

    async fn list_users(&self, _page: PageRequest) -> Result<Page<UserRecord>, DomainError> {
        refused()
    }

    async fn update_password(&self, _user_id: i64, _hash: &str) -> Result<(), DomainError> {
        refused()
    }
}

#[async_trait]
impl TokenRepository for FailingStore {
    async fn insert_token(
        &self,
        _user_id: i64,
        _digest: &str,
        _created_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        refused()
    }

    async fn find_user_by_token(&self, _digest: &str) -> Result<Option<UserRecord>, DomainError> {
        refused()
    }

    async fn delete_token(&self, _digest: &str) -> Result<bool, DomainError> {
        refused()
    }
}

#[async_trait]
impl SubscriptionRepository for FailingStore {
    async fn subscribe(&self, _user_id: i64, _author_id: i64) -> Result<bool, DomainError> {
        refused()
    }

    async fn unsubscribe(&self, _user_id: i64, _author_id: i64) -> Result<bool, DomainError> {
        refused()
    }

    async fn subscribed_author_ids(
        &self,
        _user_id: i64,
        _author_ids: &[i64],
    ) -> Result<Vec<i64>, DomainError> {
        refused()
    }

    async fn list_subscriptions(
        &self,
        _user_id: i64,
        _page: PageRequest,
    ) -> Result<Page<UserRecord>, DomainError> {
        refused()
    }
}

#[async_trait]
impl TagRepository for FailingStore {
    async fn list_tags(&self) -> Result<Vec<TagRecord>, DomainError> {
        refused()
    }

    async fn find_tag(&self, _id: i64) -> Result<Option<TagRecord>, DomainError> {
        refused()
    }

    async fn existing_tag_ids(&self, _ids: &[i64]) -> Result<Vec<i64>, DomainError> {
        refused()
    }
}

#[async_trait]
impl IngredientRepository for FailingStore {
    async fn list_ingredients(
        &self,
        _name_prefix: Option<&str>,
    ) -> Result<Vec<IngredientRecord>, DomainError> {
        refused()
    }

    async fn find_ingredient(&self, _id: i64) -> Result<Option<IngredientRecord>, DomainError> {
        refused()
    }

    async fn existing_ingredient_ids(&self, _ids: &[i64]) -> Result<Vec<i64>, DomainError> {
        refused()
    }

    async fn insert_ingredients(
        &self,
        _ingredients: &[NewIngredientRecord],
    ) -> Result<u64, DomainError> {
        refused()
    }
}

#[async_trait]
impl RecipeRepository for FailingStore {
    async fn insert_recipe(&self, _recipe: RecipeWrite) -> Result<i64, DomainError> {
        refused()
    }

    async fn update_recipe(&self, _id: i64, _recipe: RecipeWrite) -> Result<(), DomainError> {
        refused()
    }

    async fn delete_recipe(&self, _id: i64) -> Result<bool, DomainError> {
        refused()
    }

    async fn find_recipe(&self, _id: i64) -> Result<Option<RecipeDetailsRecord>, DomainError> {
        refused()
    }

    async fn list_recipes(
        &self,
        _query: &RecipeQuery,
        _page: PageRequest,
    ) -> Result<Page<RecipeDetailsRecord>, DomainError> {
        refused()
    }

    async fn count_recipes_by_author(&self, _author_id: i64) -> Result<i64, DomainError> {
        refused()
    }

    async fn recipes_by_author(
        &self,
        _author_id: i64,
        _limit: Option<i64>,
    ) -> Result<Vec<RecipeRecord>, DomainError> {
        refused()
    }
}

#[async_trait]
impl RecipeCollectionRepository for FailingStore {
    async fn add_to_collection(
        &self,
        _collection: RecipeCollection,
        _user_id: i64,
        _recipe_id: i64,
    ) -> Result<bool, DomainError> {
        refused()
    }

    async fn remove_from_collection(
        &self,
        _collection: RecipeCollection,
        _user_id: i64,
        _recipe_id: i64,
    ) -> Result<bool, DomainError> {
        refused()
    }

    async fn collected_recipe_ids(
        &self,
        _collection: RecipeCollection,
        _user_id: i64,
        _recipe_ids: &[i64],
    ) -> Result<Vec<i64>, DomainError> {
        refused()
    }

    async fn count_collectors(
        &self,
        _collection: RecipeCollection,
        _recipe_id: i64,
    ) -> Result<i64, DomainError> {
        refused()
    }
}

#[async_trait]
impl CartRepository for FailingStore {
    async fn cart_ingredients(
        &self,
        _user_id: i64,
    ) -> Result<Vec<CartIngredientRecord>, DomainError> {
        refused()
    }
}

#[async_trait]
impl ImageStore for FailingStore {
    async fn save_image(&self, _bytes: &[u8], _extension: &str) -> Result<String, DomainError> {
        refused()
    }

    async fn delete_image(&self, _path: &str) -> Result<(), DomainError> {
        refused()
    }

    fn public_url(&self, path: &str) -> String {
        format!("http://testserver/media/{path}")
    }
}

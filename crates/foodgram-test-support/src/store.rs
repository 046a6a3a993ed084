//! In-memory implementation of every repository trait.
//!
//! Behaves like the PostgreSQL store for the purposes of unit tests:
//! uniqueness rules, ordering and filtering follow the same contract.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use foodgram_core::error::DomainError;
use foodgram_core::pagination::{Page, PageRequest, paginate_slice};
use foodgram_core::repository::{
    CartIngredientRecord, CartRepository, IngredientAmount, IngredientRecord,
    IngredientRepository, NewIngredientRecord, NewUserRecord, RecipeCollection,
    RecipeCollectionRepository, RecipeDetailsRecord, RecipeIngredientRecord, RecipeQuery,
    RecipeRecord, RecipeRepository, RecipeWrite, SubscriptionRepository, TagRecord, TagRepository,
    TokenRepository, UserRecord, UserRepository,
};

use crate::clock::fixed_now;

#[derive(Debug, Clone)]
struct StoredRecipe {
    record: RecipeRecord,
    tag_ids: Vec<i64>,
    ingredients: Vec<IngredientAmount>,
}

#[derive(Debug, Default)]
struct State {
    users: Vec<UserRecord>,
    tokens: HashMap<String, i64>,
    // (sequence, follower, author)
    subscriptions: Vec<(i64, i64, i64)>,
    tags: Vec<TagRecord>,
    ingredients: Vec<IngredientRecord>,
    recipes: Vec<StoredRecipe>,
    favorites: Vec<(i64, i64)>,
    cart: Vec<(i64, i64)>,
    sequence: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.sequence += 1;
        self.sequence
    }

    fn collection(&self, collection: RecipeCollection) -> &Vec<(i64, i64)> {
        match collection {
            RecipeCollection::Favorites => &self.favorites,
            RecipeCollection::ShoppingCart => &self.cart,
        }
    }

    fn collection_mut(&mut self, collection: RecipeCollection) -> &mut Vec<(i64, i64)> {
        match collection {
            RecipeCollection::Favorites => &mut self.favorites,
            RecipeCollection::ShoppingCart => &mut self.cart,
        }
    }

    fn details(&self, stored: &StoredRecipe) -> RecipeDetailsRecord {
        let mut tags: Vec<TagRecord> = self
            .tags
            .iter()
            .filter(|tag| stored.tag_ids.contains(&tag.id))
            .cloned()
            .collect();
        tags.sort_by_key(|tag| tag.id);
        let ingredients = stored
            .ingredients
            .iter()
            .filter_map(|line| {
                self.ingredients
                    .iter()
                    .find(|ingredient| ingredient.id == line.ingredient_id)
                    .map(|ingredient| RecipeIngredientRecord {
                        ingredient_id: ingredient.id,
                        name: ingredient.name.clone(),
                        measurement_unit: ingredient.measurement_unit.clone(),
                        amount: line.amount,
                    })
            })
            .collect();
        RecipeDetailsRecord {
            recipe: stored.record.clone(),
            tags,
            ingredients,
        }
    }

    fn matches(&self, stored: &StoredRecipe, query: &RecipeQuery) -> bool {
        let id = stored.record.id;
        if query.author_id.is_some_and(|author| author != stored.record.author_id) {
            return false;
        }
        if !query.tag_slugs.is_empty() {
            let has_tag = self.tags.iter().any(|tag| {
                stored.tag_ids.contains(&tag.id) && query.tag_slugs.contains(&tag.slug)
            });
            if !has_tag {
                return false;
            }
        }
        if let Some(user) = query.favorited_by {
            if !self.favorites.contains(&(user, id)) {
                return false;
            }
        }
        if let Some(user) = query.in_cart_of {
            if !self.cart.contains(&(user, id)) {
                return false;
            }
        }
        true
    }
}

/// Thread-safe in-memory store implementing all repository traits.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Seeds a user with `<username>@example.com` as email.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn add_user(&self, username: &str, password_hash: &str) -> UserRecord {
        let mut state = self.lock();
        let user = UserRecord {
            id: state.next_id(),
            email: format!("{username}@example.com"),
            username: username.to_owned(),
            first_name: username.to_owned(),
            last_name: "Tester".to_owned(),
            password_hash: password_hash.to_owned(),
            date_joined: fixed_now(),
        };
        state.users.push(user.clone());
        user
    }

    /// Seeds a tag.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn add_tag(&self, name: &str, color: &str, slug: &str) -> TagRecord {
        let mut state = self.lock();
        let tag = TagRecord {
            id: state.next_id(),
            name: name.to_owned(),
            color: color.to_owned(),
            slug: slug.to_owned(),
        };
        state.tags.push(tag.clone());
        tag
    }

    /// Seeds an ingredient.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn add_ingredient(&self, name: &str, measurement_unit: &str) -> IngredientRecord {
        let mut state = self.lock();
        let ingredient = IngredientRecord {
            id: state.next_id(),
            name: name.to_owned(),
            measurement_unit: measurement_unit.to_owned(),
        };
        state.ingredients.push(ingredient.clone());
        ingredient
    }

    /// Seeds a recipe published at `pub_date`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn add_recipe(
        &self,
        author_id: i64,
        name: &str,
        tag_ids: &[i64],
        ingredients: &[(i64, i32)],
        pub_date: DateTime<Utc>,
    ) -> RecipeRecord {
        let mut state = self.lock();
        let record = RecipeRecord {
            id: state.next_id(),
            author_id,
            name: name.to_owned(),
            image: format!("recipes/{name}.png"),
            text: format!("How to cook {name}"),
            cooking_time: 10,
            pub_date,
        };
        state.recipes.push(StoredRecipe {
            record: record.clone(),
            tag_ids: tag_ids.to_vec(),
            ingredients: ingredients
                .iter()
                .map(|&(ingredient_id, amount)| IngredientAmount {
                    ingredient_id,
                    amount,
                })
                .collect(),
        });
        record
    }

    /// Puts a recipe into a user's collection.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn collect(&self, collection: RecipeCollection, user_id: i64, recipe_id: i64) {
        self.lock()
            .collection_mut(collection)
            .push((user_id, recipe_id));
    }

    /// Records a subscription of `user_id` to `author_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn follow(&self, user_id: i64, author_id: i64) {
        let mut state = self.lock();
        let sequence = state.next_id();
        state.subscriptions.push((sequence, user_id, author_id));
    }

    /// Number of stored token digests.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn token_count(&self) -> usize {
        self.lock().tokens.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert_user(&self, user: NewUserRecord) -> Result<UserRecord, DomainError> {
        let mut state = self.lock();
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::validation("a user with that email already exists"));
        }
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(DomainError::validation("a user with that username already exists"));
        }
        let record = UserRecord {
            id: state.next_id(),
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            date_joined: user.date_joined,
        };
        state.users.push(record.clone());
        Ok(record)
    }

    async fn find_user(&self, id: i64) -> Result<Option<UserRecord>, DomainError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self, page: PageRequest) -> Result<Page<UserRecord>, DomainError> {
        let mut users = self.lock().users.clone();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(paginate_slice(&users, page))
    }

    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<(), DomainError> {
        let mut state = self.lock();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(DomainError::not_found("user", user_id))?;
        password_hash.clone_into(&mut user.password_hash);
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for InMemoryStore {
    async fn insert_token(
        &self,
        user_id: i64,
        digest: &str,
        _created_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.lock().tokens.insert(digest.to_owned(), user_id);
        Ok(())
    }

    async fn find_user_by_token(&self, digest: &str) -> Result<Option<UserRecord>, DomainError> {
        let state = self.lock();
        Ok(state
            .tokens
            .get(digest)
            .and_then(|id| state.users.iter().find(|u| u.id == *id))
            .cloned())
    }

    async fn delete_token(&self, digest: &str) -> Result<bool, DomainError> {
        Ok(self.lock().tokens.remove(digest).is_some())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn subscribe(&self, user_id: i64, author_id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        if state
            .subscriptions
            .iter()
            .any(|&(_, u, a)| u == user_id && a == author_id)
        {
            return Ok(false);
        }
        let sequence = state.next_id();
        state.subscriptions.push((sequence, user_id, author_id));
        Ok(true)
    }

    async fn unsubscribe(&self, user_id: i64, author_id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.subscriptions.len();
        state
            .subscriptions
            .retain(|&(_, u, a)| !(u == user_id && a == author_id));
        Ok(state.subscriptions.len() != before)
    }

    async fn subscribed_author_ids(
        &self,
        user_id: i64,
        author_ids: &[i64],
    ) -> Result<Vec<i64>, DomainError> {
        Ok(self
            .lock()
            .subscriptions
            .iter()
            .filter(|&&(_, u, a)| u == user_id && author_ids.contains(&a))
            .map(|&(_, _, a)| a)
            .collect())
    }

    async fn list_subscriptions(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> Result<Page<UserRecord>, DomainError> {
        let state = self.lock();
        let mut subscriptions: Vec<(i64, i64)> = state
            .subscriptions
            .iter()
            .filter(|&&(_, u, _)| u == user_id)
            .map(|&(sequence, _, author)| (sequence, author))
            .collect();
        subscriptions.sort_by(|a, b| b.0.cmp(&a.0));
        let authors: Vec<UserRecord> = subscriptions
            .iter()
            .filter_map(|(_, author)| state.users.iter().find(|u| u.id == *author).cloned())
            .collect();
        Ok(paginate_slice(&authors, page))
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn list_tags(&self) -> Result<Vec<TagRecord>, DomainError> {
        let mut tags = self.lock().tags.clone();
        tags.sort_by_key(|tag| tag.id);
        Ok(tags)
    }

    async fn find_tag(&self, id: i64) -> Result<Option<TagRecord>, DomainError> {
        Ok(self.lock().tags.iter().find(|tag| tag.id == id).cloned())
    }

    async fn existing_tag_ids(&self, ids: &[i64]) -> Result<Vec<i64>, DomainError> {
        Ok(self
            .lock()
            .tags
            .iter()
            .map(|tag| tag.id)
            .filter(|id| ids.contains(id))
            .collect())
    }
}

#[async_trait]
impl IngredientRepository for InMemoryStore {
    async fn list_ingredients(
        &self,
        name_prefix: Option<&str>,
    ) -> Result<Vec<IngredientRecord>, DomainError> {
        let prefix = name_prefix.map(str::to_lowercase);
        let mut ingredients: Vec<IngredientRecord> = self
            .lock()
            .ingredients
            .iter()
            .filter(|ingredient| {
                prefix
                    .as_deref()
                    .is_none_or(|p| ingredient.name.to_lowercase().starts_with(p))
            })
            .cloned()
            .collect();
        ingredients.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(ingredients)
    }

    async fn find_ingredient(&self, id: i64) -> Result<Option<IngredientRecord>, DomainError> {
        Ok(self
            .lock()
            .ingredients
            .iter()
            .find(|ingredient| ingredient.id == id)
            .cloned())
    }

    async fn existing_ingredient_ids(&self, ids: &[i64]) -> Result<Vec<i64>, DomainError> {
        Ok(self
            .lock()
            .ingredients
            .iter()
            .map(|ingredient| ingredient.id)
            .filter(|id| ids.contains(id))
            .collect())
    }

    async fn insert_ingredients(
        &self,
        ingredients: &[NewIngredientRecord],
    ) -> Result<u64, DomainError> {
        let mut state = self.lock();
        let mut inserted = 0;
        for new in ingredients {
            let exists = state.ingredients.iter().any(|existing| {
                existing.name == new.name && existing.measurement_unit == new.measurement_unit
            });
            if !exists {
                let id = state.next_id();
                state.ingredients.push(IngredientRecord {
                    id,
                    name: new.name.clone(),
                    measurement_unit: new.measurement_unit.clone(),
                });
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

#[async_trait]
impl RecipeRepository for InMemoryStore {
    async fn insert_recipe(&self, recipe: RecipeWrite) -> Result<i64, DomainError> {
        let mut state = self.lock();
        let id = state.next_id();
        state.recipes.push(StoredRecipe {
            record: RecipeRecord {
                id,
                author_id: recipe.author_id,
                name: recipe.name,
                image: recipe.image,
                text: recipe.text,
                cooking_time: recipe.cooking_time,
                pub_date: recipe.pub_date,
            },
            tag_ids: recipe.tag_ids,
            ingredients: recipe.ingredients,
        });
        Ok(id)
    }

    async fn update_recipe(&self, id: i64, recipe: RecipeWrite) -> Result<(), DomainError> {
        let mut state = self.lock();
        let stored = state
            .recipes
            .iter_mut()
            .find(|stored| stored.record.id == id)
            .ok_or(DomainError::not_found("recipe", id))?;
        stored.record.name = recipe.name;
        stored.record.image = recipe.image;
        stored.record.text = recipe.text;
        stored.record.cooking_time = recipe.cooking_time;
        stored.tag_ids = recipe.tag_ids;
        stored.ingredients = recipe.ingredients;
        Ok(())
    }

    async fn delete_recipe(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.recipes.len();
        state.recipes.retain(|stored| stored.record.id != id);
        state.favorites.retain(|&(_, recipe)| recipe != id);
        state.cart.retain(|&(_, recipe)| recipe != id);
        Ok(state.recipes.len() != before)
    }

    async fn find_recipe(&self, id: i64) -> Result<Option<RecipeDetailsRecord>, DomainError> {
        let state = self.lock();
        Ok(state
            .recipes
            .iter()
            .find(|stored| stored.record.id == id)
            .map(|stored| state.details(stored)))
    }

    async fn list_recipes(
        &self,
        query: &RecipeQuery,
        page: PageRequest,
    ) -> Result<Page<RecipeDetailsRecord>, DomainError> {
        let state = self.lock();
        let mut matching: Vec<&StoredRecipe> = state
            .recipes
            .iter()
            .filter(|stored| state.matches(stored, query))
            .collect();
        matching.sort_by(|a, b| {
            b.record
                .pub_date
                .cmp(&a.record.pub_date)
                .then(b.record.id.cmp(&a.record.id))
        });
        let details: Vec<RecipeDetailsRecord> =
            matching.into_iter().map(|stored| state.details(stored)).collect();
        Ok(paginate_slice(&details, page))
    }

    async fn count_recipes_by_author(&self, author_id: i64) -> Result<i64, DomainError> {
        let count = self
            .lock()
            .recipes
            .iter()
            .filter(|stored| stored.record.author_id == author_id)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn recipes_by_author(
        &self,
        author_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<RecipeRecord>, DomainError> {
        let mut recipes: Vec<RecipeRecord> = self
            .lock()
            .recipes
            .iter()
            .filter(|stored| stored.record.author_id == author_id)
            .map(|stored| stored.record.clone())
            .collect();
        recipes.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            recipes.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(recipes)
    }
}

#[async_trait]
impl RecipeCollectionRepository for InMemoryStore {
    async fn add_to_collection(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let members = state.collection_mut(collection);
        if members.contains(&(user_id, recipe_id)) {
            return Ok(false);
        }
        members.push((user_id, recipe_id));
        Ok(true)
    }

    async fn remove_from_collection(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_id: i64,
    ) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let members = state.collection_mut(collection);
        let before = members.len();
        members.retain(|&entry| entry != (user_id, recipe_id));
        Ok(members.len() != before)
    }

    async fn collected_recipe_ids(
        &self,
        collection: RecipeCollection,
        user_id: i64,
        recipe_ids: &[i64],
    ) -> Result<Vec<i64>, DomainError> {
        Ok(self
            .lock()
            .collection(collection)
            .iter()
            .filter(|&&(user, recipe)| user == user_id && recipe_ids.contains(&recipe))
            .map(|&(_, recipe)| recipe)
            .collect())
    }

    async fn count_collectors(
        &self,
        collection: RecipeCollection,
        recipe_id: i64,
    ) -> Result<i64, DomainError> {
        let count = self
            .lock()
            .collection(collection)
            .iter()
            .filter(|&&(_, recipe)| recipe == recipe_id)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn cart_ingredients(
        &self,
        user_id: i64,
    ) -> Result<Vec<CartIngredientRecord>, DomainError> {
        let state = self.lock();
        let mut rows = Vec::new();
        for &(user, recipe_id) in &state.cart {
            if user != user_id {
                continue;
            }
            let Some(stored) = state.recipes.iter().find(|s| s.record.id == recipe_id) else {
                continue;
            };
            for line in state.details(stored).ingredients {
                rows.push(CartIngredientRecord {
                    recipe_id,
                    name: line.name,
                    measurement_unit: line.measurement_unit,
                    amount: i64::from(line.amount),
                });
            }
        }
        Ok(rows)
    }
}

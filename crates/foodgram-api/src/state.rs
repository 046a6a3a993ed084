//! Shared application state.

use std::sync::Arc;

use foodgram_core::clock::Clock;
use foodgram_core::repository::{
    CartRepository, ImageStore, IngredientRepository, RecipeCollectionRepository,
    RecipeRepository, SubscriptionRepository, TagRepository, TokenRepository, UserRepository,
};
use foodgram_recipes::application::query_handlers::{FavoritedCountCache, RecipeReadContext};

/// Request-facing settings taken from the server configuration.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Base URL used for absolute pagination links.
    pub public_url: String,
    /// Default page size of paginated lists.
    pub page_size: u32,
    /// Default number of recipes embedded in a subscription.
    pub recipes_limit: i64,
}

/// A single store implementing every repository trait.
pub trait Store:
    UserRepository
    + TokenRepository
    + SubscriptionRepository
    + TagRepository
    + IngredientRepository
    + RecipeRepository
    + RecipeCollectionRepository
    + CartRepository
    + 'static
{
}

impl<T> Store for T where
    T: UserRepository
        + TokenRepository
        + SubscriptionRepository
        + TagRepository
        + IngredientRepository
        + RecipeRepository
        + RecipeCollectionRepository
        + CartRepository
        + 'static
{
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub ingredients: Arc<dyn IngredientRepository>,
    pub recipes: Arc<dyn RecipeRepository>,
    pub collections: Arc<dyn RecipeCollectionRepository>,
    pub cart: Arc<dyn CartRepository>,
    pub images: Arc<dyn ImageStore>,
    /// Clock for timestamps.
    pub clock: Arc<dyn Clock>,
    /// Read-through cache of per-recipe favorite counts.
    pub favorited_counts: Arc<FavoritedCountCache>,
    pub settings: Arc<ApiSettings>,
}

impl AppState {
    /// Create new application state backed by `store` for every repository.
    #[must_use]
    pub fn new<S: Store>(
        store: Arc<S>,
        images: Arc<dyn ImageStore>,
        clock: Arc<dyn Clock>,
        cache_ttl: chrono::Duration,
        settings: ApiSettings,
    ) -> Self {
        let favorited_counts = Arc::new(FavoritedCountCache::new(cache_ttl, Arc::clone(&clock)));
        Self {
            users: store.clone(),
            tokens: store.clone(),
            subscriptions: store.clone(),
            tags: store.clone(),
            ingredients: store.clone(),
            recipes: store.clone(),
            collections: store.clone(),
            cart: store,
            images,
            clock,
            favorited_counts,
            settings: Arc::new(settings),
        }
    }

    /// Borrowed repositories needed to assemble recipe views.
    #[must_use]
    pub fn recipe_context(&self) -> RecipeReadContext<'_> {
        RecipeReadContext {
            recipes: self.recipes.as_ref(),
            users: self.users.as_ref(),
            subscriptions: self.subscriptions.as_ref(),
            collections: self.collections.as_ref(),
            images: self.images.as_ref(),
        }
    }
}

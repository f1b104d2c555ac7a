//! Service layer for Inkpress
//!
//! Contains the business rules for articles, categories, tags and
//! administrator login. Services are thread-safe and designed for shared
//! use via Arc; they only see storage through the repository traits.

mod article;
mod auth;
mod category;
mod integrity;
mod tag;

pub use article::ArticleService;
pub use auth::AuthService;
pub use category::CategoryService;
pub use tag::TagService;

use crate::config::AppConfig;
use crate::db::{ArticleRepository, CategoryRepository, MemoryStore, SqlStore, TagRepository};
use std::sync::Arc;

/// Service container handed to the HTTP layer
///
/// Cloning is cheap; every service sits behind an `Arc`.
#[derive(Clone)]
pub struct Services {
    pub articles: Arc<ArticleService>,
    pub categories: Arc<CategoryService>,
    pub tags: Arc<TagService>,
    pub auth: Arc<AuthService>,
}

impl Services {
    /// Wire services over arbitrary repository implementations
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        categories: Arc<dyn CategoryRepository>,
        tags: Arc<dyn TagRepository>,
        config: &AppConfig,
    ) -> Self {
        Self {
            articles: Arc::new(ArticleService::new(
                articles,
                categories.clone(),
                tags.clone(),
                &config.content,
            )),
            categories: Arc::new(CategoryService::new(categories)),
            tags: Arc::new(TagService::new(tags, &config.content)),
            auth: Arc::new(AuthService::new(&config.auth)),
        }
    }

    /// Services backed by a SeaORM store
    pub fn with_sql(store: SqlStore, config: &AppConfig) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store.clone(), store, config)
    }

    /// Services backed by a fresh in-memory store
    pub fn in_memory(config: &AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store.clone(), store, config)
    }
}

//! Repository contracts for content storage
//!
//! Services only see these traits, held as `Arc<dyn ...>`; the SeaORM
//! backend and the in-memory store both implement all three. Lookups of an
//! absent id or name fail with [`AppError::NotFound`](crate::errors::AppError),
//! anything else propagates as a storage error.

use crate::domain::{Article, ArticleDraft, Category, CategoryDraft, Tag, TagDraft};
use crate::errors::Result;
use crate::pagination::QueryParams;
use async_trait::async_trait;

/// Storage for articles and their tag links
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Persist a new article with its category and tag links
    async fn create(&self, draft: ArticleDraft) -> Result<Article>;

    /// Fetch one article with its category and tags resolved
    async fn get_by_id(&self, id: i32) -> Result<Article>;

    /// Replace every field of an article, including its tag set
    async fn update(&self, id: i32, draft: ArticleDraft) -> Result<Article>;

    /// Remove an article and its tag links
    async fn delete(&self, id: i32) -> Result<()>;

    /// Filtered, ordered listing; returns the page and the filtered total
    async fn list(&self, params: &QueryParams) -> Result<(Vec<Article>, u64)>;

    async fn list_by_category(
        &self,
        category_id: i32,
        params: &QueryParams,
    ) -> Result<(Vec<Article>, u64)>;

    async fn list_by_tag(&self, tag_id: i32, params: &QueryParams) -> Result<(Vec<Article>, u64)>;
}

/// Storage for categories
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, draft: CategoryDraft) -> Result<Category>;

    async fn get_by_id(&self, id: i32) -> Result<Category>;

    /// Exact, case-sensitive name lookup
    async fn get_by_name(&self, name: &str) -> Result<Category>;

    async fn update(&self, id: i32, draft: CategoryDraft) -> Result<Category>;

    /// Remove a category; articles that referenced it lose their category
    async fn delete(&self, id: i32) -> Result<()>;

    async fn list(&self) -> Result<Vec<Category>>;
}

/// Storage for tags
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn create(&self, draft: TagDraft) -> Result<Tag>;

    async fn get_by_id(&self, id: i32) -> Result<Tag>;

    /// Resolve a set of ids in one call; unknown ids are simply absent from the result
    async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<Tag>>;

    /// Exact, case-sensitive name lookup
    async fn get_by_name(&self, name: &str) -> Result<Tag>;

    async fn update(&self, id: i32, draft: TagDraft) -> Result<Tag>;

    /// Remove a tag and detach it from every article
    async fn delete(&self, id: i32) -> Result<()>;

    async fn list(&self) -> Result<Vec<Tag>>;
}

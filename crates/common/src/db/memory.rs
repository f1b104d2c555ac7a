//! In-process content store
//!
//! Keeps every entity behind one `tokio::sync::RwLock` and follows the same
//! rules as the SQL backend: unique names, cascade-null on category delete,
//! tag links removed with either side, and listings through
//! [`apply_listing`]. Selected with the `memory://` database URL.

use crate::db::repository::{ArticleRepository, CategoryRepository, TagRepository};
use crate::domain::{Article, ArticleDraft, Category, CategoryDraft, Tag, TagDraft};
use crate::errors::{AppError, Result};
use crate::pagination::{apply_listing, ListScope, QueryParams};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

/// Article as stored: relations by id only
#[derive(Debug, Clone)]
struct ArticleRecord {
    title: String,
    content: String,
    summary: String,
    published: bool,
    category_id: Option<i32>,
    tag_ids: BTreeSet<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    articles: BTreeMap<i32, ArticleRecord>,
    categories: BTreeMap<i32, Category>,
    tags: BTreeMap<i32, Tag>,
    last_article_id: i32,
    last_category_id: i32,
    last_tag_id: i32,
}

impl State {
    fn resolve(&self, id: i32, record: &ArticleRecord) -> Article {
        Article {
            id,
            title: record.title.clone(),
            content: record.content.clone(),
            summary: record.summary.clone(),
            published: record.published,
            created_at: record.created_at,
            updated_at: record.updated_at,
            category: record
                .category_id
                .and_then(|category_id| self.categories.get(&category_id).cloned()),
            tags: record
                .tag_ids
                .iter()
                .filter_map(|tag_id| self.tags.get(tag_id).cloned())
                .collect(),
        }
    }

    fn list(&self, params: &QueryParams, scope: ListScope) -> (Vec<Article>, u64) {
        let articles = self
            .articles
            .iter()
            .map(|(id, record)| self.resolve(*id, record));
        apply_listing(articles, params, scope)
    }

    fn category_name_taken(&self, name: &str, except: Option<i32>) -> bool {
        self.categories
            .values()
            .any(|category| category.name == name && Some(category.id) != except)
    }

    fn tag_name_taken(&self, name: &str, except: Option<i32>) -> bool {
        self.tags
            .values()
            .any(|tag| tag.name == name && Some(tag.id) != except)
    }
}

fn duplicate(resource_type: &str, name: &str) -> AppError {
    AppError::Duplicate {
        message: format!("{} {:?} already exists", resource_type, name),
    }
}

/// Content repositories held in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleRepository for MemoryStore {
    async fn create(&self, draft: ArticleDraft) -> Result<Article> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        state.last_article_id += 1;
        let id = state.last_article_id;
        let record = ArticleRecord {
            title: draft.title,
            content: draft.content,
            summary: draft.summary,
            published: draft.published,
            category_id: draft.category_id,
            tag_ids: draft.tag_ids.into_iter().collect(),
            created_at: now,
            updated_at: now,
        };

        let article = state.resolve(id, &record);
        state.articles.insert(id, record);
        Ok(article)
    }

    async fn get_by_id(&self, id: i32) -> Result<Article> {
        let state = self.state.read().await;
        state
            .articles
            .get(&id)
            .map(|record| state.resolve(id, record))
            .ok_or_else(|| AppError::not_found("article", id))
    }

    async fn update(&self, id: i32, draft: ArticleDraft) -> Result<Article> {
        let mut state = self.state.write().await;
        let mut record = state
            .articles
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("article", id))?;

        record.title = draft.title;
        record.content = draft.content;
        record.summary = draft.summary;
        record.published = draft.published;
        record.category_id = draft.category_id;
        record.tag_ids = draft.tag_ids.into_iter().collect();
        record.updated_at = Utc::now().max(record.created_at);

        let article = state.resolve(id, &record);
        state.articles.insert(id, record);
        Ok(article)
    }

    async fn delete(&self, id: i32) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .articles
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("article", id))
    }

    async fn list(&self, params: &QueryParams) -> Result<(Vec<Article>, u64)> {
        Ok(self.state.read().await.list(params, ListScope::All))
    }

    async fn list_by_category(
        &self,
        category_id: i32,
        params: &QueryParams,
    ) -> Result<(Vec<Article>, u64)> {
        Ok(self
            .state
            .read()
            .await
            .list(params, ListScope::Category(category_id)))
    }

    async fn list_by_tag(&self, tag_id: i32, params: &QueryParams) -> Result<(Vec<Article>, u64)> {
        Ok(self.state.read().await.list(params, ListScope::Tag(tag_id)))
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create(&self, draft: CategoryDraft) -> Result<Category> {
        let mut state = self.state.write().await;
        if state.category_name_taken(&draft.name, None) {
            return Err(duplicate("category", &draft.name));
        }

        let now = Utc::now();
        state.last_category_id += 1;
        let category = Category {
            id: state.last_category_id,
            name: draft.name,
            description: draft.description,
            created_at: now,
            updated_at: now,
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn get_by_id(&self, id: i32) -> Result<Category> {
        self.state
            .read()
            .await
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("category", id))
    }

    async fn get_by_name(&self, name: &str) -> Result<Category> {
        self.state
            .read()
            .await
            .categories
            .values()
            .find(|category| category.name == name)
            .cloned()
            .ok_or_else(|| AppError::not_found_by_name("category", name))
    }

    async fn update(&self, id: i32, draft: CategoryDraft) -> Result<Category> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&id) {
            return Err(AppError::not_found("category", id));
        }
        if state.category_name_taken(&draft.name, Some(id)) {
            return Err(duplicate("category", &draft.name));
        }

        let category = state
            .categories
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("category", id))?;
        category.name = draft.name;
        category.description = draft.description;
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    async fn delete(&self, id: i32) -> Result<()> {
        let mut state = self.state.write().await;
        if state.categories.remove(&id).is_none() {
            return Err(AppError::not_found("category", id));
        }

        for record in state.articles.values_mut() {
            if record.category_id == Some(id) {
                record.category_id = None;
            }
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Category>> {
        Ok(self.state.read().await.categories.values().cloned().collect())
    }
}

#[async_trait]
impl TagRepository for MemoryStore {
    async fn create(&self, draft: TagDraft) -> Result<Tag> {
        let mut state = self.state.write().await;
        if state.tag_name_taken(&draft.name, None) {
            return Err(duplicate("tag", &draft.name));
        }

        let now = Utc::now();
        state.last_tag_id += 1;
        let tag = Tag {
            id: state.last_tag_id,
            name: draft.name,
            color: draft.color,
            created_at: now,
            updated_at: now,
        };
        state.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn get_by_id(&self, id: i32) -> Result<Tag> {
        self.state
            .read()
            .await
            .tags
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("tag", id))
    }

    async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<Tag>> {
        let state = self.state.read().await;
        let wanted: BTreeSet<i32> = ids.iter().copied().collect();
        Ok(wanted
            .iter()
            .filter_map(|id| state.tags.get(id).cloned())
            .collect())
    }

    async fn get_by_name(&self, name: &str) -> Result<Tag> {
        self.state
            .read()
            .await
            .tags
            .values()
            .find(|tag| tag.name == name)
            .cloned()
            .ok_or_else(|| AppError::not_found_by_name("tag", name))
    }

    async fn update(&self, id: i32, draft: TagDraft) -> Result<Tag> {
        let mut state = self.state.write().await;
        if !state.tags.contains_key(&id) {
            return Err(AppError::not_found("tag", id));
        }
        if state.tag_name_taken(&draft.name, Some(id)) {
            return Err(duplicate("tag", &draft.name));
        }

        let tag = state
            .tags
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("tag", id))?;
        tag.name = draft.name;
        tag.color = draft.color;
        tag.updated_at = Utc::now();
        Ok(tag.clone())
    }

    async fn delete(&self, id: i32) -> Result<()> {
        let mut state = self.state.write().await;
        if state.tags.remove(&id).is_none() {
            return Err(AppError::not_found("tag", id));
        }

        for record in state.articles.values_mut() {
            record.tag_ids.remove(&id);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        Ok(self.state.read().await.tags.values().cloned().collect())
    }
}

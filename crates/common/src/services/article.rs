//! Article service
//!
//! Validates requests, checks that referenced categories and tags exist,
//! and delegates to the article repository. Also produces backup archives.

use crate::backup::{build_archive, BackupArchive};
use crate::config::ContentConfig;
use crate::db::{ArticleRepository, CategoryRepository, TagRepository};
use crate::domain::{Article, ArticleCreateRequest, ArticleDraft, ArticleUpdateRequest};
use crate::errors::{AppError, BackupStage, Result};
use crate::metrics;
use crate::pagination::{Page, QueryParams};
use crate::services::integrity::{resolve_category, resolve_tags};
use chrono::Local;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use validator::Validate;

pub struct ArticleService {
    articles: Arc<dyn ArticleRepository>,
    categories: Arc<dyn CategoryRepository>,
    tags: Arc<dyn TagRepository>,
    backup_page_size: u64,
}

impl ArticleService {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        categories: Arc<dyn CategoryRepository>,
        tags: Arc<dyn TagRepository>,
        content: &ContentConfig,
    ) -> Self {
        Self {
            articles,
            categories,
            tags,
            backup_page_size: content.backup_page_size,
        }
    }

    /// Validate a request and resolve its relations into a draft
    async fn draft(&self, request: ArticleCreateRequest) -> Result<ArticleDraft> {
        request.validate()?;
        resolve_category(self.categories.as_ref(), request.category_id).await?;
        resolve_tags(self.tags.as_ref(), &request.tag_ids).await?;

        Ok(ArticleDraft {
            title: request.title,
            content: request.content,
            summary: request.summary,
            published: request.published,
            category_id: request.category_id,
            tag_ids: request.tag_ids,
        })
    }

    pub async fn create(&self, request: ArticleCreateRequest) -> Result<Article> {
        let draft = self.draft(request).await?;
        let article = self.articles.create(draft).await?;

        metrics::record_write("article", "create");
        info!(article_id = article.id, tags = article.tags.len(), "Article created");
        Ok(article)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Article> {
        self.articles.get_by_id(id).await
    }

    /// Replace every field of an existing article
    pub async fn update(&self, id: i32, request: ArticleUpdateRequest) -> Result<Article> {
        self.articles.get_by_id(id).await?;
        let draft = self.draft(request).await?;
        let article = self.articles.update(id, draft).await?;

        metrics::record_write("article", "update");
        info!(article_id = id, "Article updated");
        Ok(article)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        self.articles.delete(id).await?;
        metrics::record_write("article", "delete");
        info!(article_id = id, "Article deleted");
        Ok(())
    }

    pub async fn list(&self, params: &QueryParams) -> Result<Page<Article>> {
        let (items, total) = self.articles.list(params).await?;
        Ok(Page::new(items, total, params))
    }

    /// Articles in one category; the category must exist
    pub async fn list_by_category(
        &self,
        category_id: i32,
        params: &QueryParams,
    ) -> Result<Page<Article>> {
        self.categories.get_by_id(category_id).await?;
        let (items, total) = self.articles.list_by_category(category_id, params).await?;
        Ok(Page::new(items, total, params))
    }

    /// Articles carrying one tag; the tag must exist
    pub async fn list_by_tag(&self, tag_id: i32, params: &QueryParams) -> Result<Page<Article>> {
        self.tags.get_by_id(tag_id).await?;
        let (items, total) = self.articles.list_by_tag(tag_id, params).await?;
        Ok(Page::new(items, total, params))
    }

    /// Snapshot every article into a ZIP archive
    pub async fn backup_all(&self) -> Result<BackupArchive> {
        let started = Instant::now();
        let result = self.build_backup().await;

        match &result {
            Ok(archive) => {
                metrics::record_backup(
                    started.elapsed(),
                    archive.article_count,
                    archive.skipped,
                    true,
                );
                info!(
                    articles = archive.article_count,
                    skipped = archive.skipped,
                    bytes = archive.bytes.len(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Backup archive built"
                );
            }
            Err(e) => {
                metrics::record_backup(started.elapsed(), 0, 0, false);
                error!(error = %e, "Backup failed");
            }
        }

        result
    }

    async fn build_backup(&self) -> Result<BackupArchive> {
        let params = QueryParams::paged(1, self.backup_page_size);
        let (articles, _) = self
            .articles
            .list(&params)
            .await
            .map_err(|e| AppError::backup(BackupStage::Listing, e))?;

        build_archive(&articles, Local::now())
    }
}

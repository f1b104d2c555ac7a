//! SeaORM implementation of the content repositories
//!
//! Reads go to the replica when one is configured; writes and the reads
//! that follow them go to the primary. Article writes touch two tables and
//! run in a transaction.

use crate::db::models::*;
use crate::db::repository::{ArticleRepository, CategoryRepository, TagRepository};
use crate::db::DbPool;
use crate::domain::{Article, ArticleDraft, Category, CategoryDraft, Tag, TagDraft};
use crate::errors::{AppError, Result};
use crate::pagination::{ListScope, QueryParams};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbBackend, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, SqlErr,
    TransactionTrait,
};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Content repositories backed by a SeaORM connection pool
#[derive(Clone)]
pub struct SqlStore {
    pool: DbPool,
}

impl SqlStore {
    /// Create a new store with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn list_scoped(
        &self,
        params: &QueryParams,
        scope: ListScope,
    ) -> Result<(Vec<Article>, u64)> {
        let conn = self.pool.read();
        let select = listing_select(conn.get_database_backend(), params, scope);

        let total = select.clone().count(conn).await?;

        let mut ordered = select
            .order_by_desc(ArticleColumn::CreatedAt)
            .order_by_asc(ArticleColumn::Id);
        if let Some(window) = params.window() {
            // Offsets and limits bind as i64; a window past the end selects nothing
            if window.offset >= total {
                return Ok((Vec::new(), total));
            }
            ordered = ordered
                .offset(window.offset)
                .limit(window.limit.min(i64::MAX as u64));
        }

        let rows = ordered.all(conn).await?;
        debug!(?scope, total, returned = rows.len(), "Listed articles");

        Ok((hydrate(conn, rows).await?, total))
    }
}

/// Escape LIKE wildcards so search text matches literally
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// `lower(column) LIKE pattern`, with the pattern already folded by [`fold_case`]
fn contains_ignore_case(column: ArticleColumn, pattern: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

/// Case folding applied to search text before it reaches the database
///
/// PostgreSQL's `lower()` folds full Unicode, like `str::to_lowercase`.
/// SQLite's built-in `lower()` folds ASCII only, so the needle is folded the
/// same way there and non-ASCII text matches exactly.
fn fold_case(backend: DbBackend, text: &str) -> String {
    match backend {
        DbBackend::Sqlite => text.to_ascii_lowercase(),
        _ => text.to_lowercase(),
    }
}

/// Base select carrying the filters of a listing, without order or window
fn listing_select(
    backend: DbBackend,
    params: &QueryParams,
    scope: ListScope,
) -> Select<ArticleEntity> {
    let mut select = ArticleEntity::find();

    if let Some(published) = params.published {
        select = select.filter(ArticleColumn::Published.eq(published));
    }

    match scope {
        ListScope::All => {
            if let Some(text) = params.search_text() {
                let pattern = format!("%{}%", escape_like(&fold_case(backend, text)));
                select = select.filter(
                    Condition::any()
                        .add(contains_ignore_case(ArticleColumn::Title, &pattern))
                        .add(contains_ignore_case(ArticleColumn::Content, &pattern)),
                );
            }
        }
        ListScope::Category(category_id) => {
            select = select.filter(ArticleColumn::CategoryId.eq(category_id));
        }
        ListScope::Tag(tag_id) => {
            select = select.filter(
                ArticleColumn::Id.in_subquery(
                    Query::select()
                        .column(ArticleTagColumn::ArticleId)
                        .from(ArticleTagEntity)
                        .and_where(ArticleTagColumn::TagId.eq(tag_id))
                        .to_owned(),
                ),
            );
        }
    }

    select
}

/// Resolve categories and tags onto article rows, keeping row order
async fn hydrate<C: ConnectionTrait>(conn: &C, rows: Vec<ArticleRow>) -> Result<Vec<Article>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let category_ids: BTreeSet<i32> = rows.iter().filter_map(|row| row.category_id).collect();
    let categories: HashMap<i32, Category> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        CategoryEntity::find()
            .filter(CategoryColumn::Id.is_in(category_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|row| (row.id, Category::from(row)))
            .collect()
    };

    let article_ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
    let links = ArticleTagEntity::find()
        .filter(ArticleTagColumn::ArticleId.is_in(article_ids))
        .all(conn)
        .await?;

    let tag_ids: BTreeSet<i32> = links.iter().map(|link| link.tag_id).collect();
    let tags: HashMap<i32, Tag> = if tag_ids.is_empty() {
        HashMap::new()
    } else {
        TagEntity::find()
            .filter(TagColumn::Id.is_in(tag_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|row| (row.id, Tag::from(row)))
            .collect()
    };

    let mut tags_by_article: HashMap<i32, Vec<Tag>> = HashMap::new();
    for link in links {
        if let Some(tag) = tags.get(&link.tag_id) {
            tags_by_article.entry(link.article_id).or_default().push(tag.clone());
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let mut article_tags = tags_by_article.remove(&row.id).unwrap_or_default();
            article_tags.sort_by_key(|tag| tag.id);
            Article {
                id: row.id,
                title: row.title,
                content: row.content,
                summary: row.summary,
                published: row.published,
                created_at: row.created_at,
                updated_at: row.updated_at,
                category: row.category_id.and_then(|id| categories.get(&id).cloned()),
                tags: article_tags,
            }
        })
        .collect())
}

async fn find_article<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Article> {
    let row = ArticleEntity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("article", id))?;

    hydrate(conn, vec![row])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("article", id))
}

async fn link_tags<C: ConnectionTrait>(conn: &C, article_id: i32, tag_ids: &[i32]) -> Result<()> {
    let unique: BTreeSet<i32> = tag_ids.iter().copied().collect();
    if unique.is_empty() {
        return Ok(());
    }

    let links = unique.into_iter().map(|tag_id| ArticleTagActiveModel {
        article_id: Set(article_id),
        tag_id: Set(tag_id),
    });

    ArticleTagEntity::insert_many(links)
        .exec_without_returning(conn)
        .await?;

    Ok(())
}

/// Map unique-constraint violations on a named entity to `Duplicate`
fn name_conflict(err: DbErr, resource_type: &str, name: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Duplicate {
            message: format!("{} {:?} already exists", resource_type, name),
        },
        _ => err.into(),
    }
}

#[async_trait]
impl ArticleRepository for SqlStore {
    async fn create(&self, draft: ArticleDraft) -> Result<Article> {
        let now = Utc::now();
        let txn = self.pool.write().begin().await?;

        let row = ArticleActiveModel {
            title: Set(draft.title),
            content: Set(draft.content),
            summary: Set(draft.summary),
            published: Set(draft.published),
            category_id: Set(draft.category_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        link_tags(&txn, row.id, &draft.tag_ids).await?;
        txn.commit().await?;

        find_article(self.pool.write(), row.id).await
    }

    async fn get_by_id(&self, id: i32) -> Result<Article> {
        find_article(self.pool.read(), id).await
    }

    async fn update(&self, id: i32, draft: ArticleDraft) -> Result<Article> {
        let txn = self.pool.write().begin().await?;

        let existing = ArticleEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("article", id))?;

        let mut active: ArticleActiveModel = existing.into();
        active.title = Set(draft.title);
        active.content = Set(draft.content);
        active.summary = Set(draft.summary);
        active.published = Set(draft.published);
        active.category_id = Set(draft.category_id);
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;

        ArticleTagEntity::delete_many()
            .filter(ArticleTagColumn::ArticleId.eq(id))
            .exec(&txn)
            .await?;
        link_tags(&txn, id, &draft.tag_ids).await?;
        txn.commit().await?;

        find_article(self.pool.write(), id).await
    }

    async fn delete(&self, id: i32) -> Result<()> {
        let txn = self.pool.write().begin().await?;

        ArticleTagEntity::delete_many()
            .filter(ArticleTagColumn::ArticleId.eq(id))
            .exec(&txn)
            .await?;

        let result = ArticleEntity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("article", id));
        }

        txn.commit().await?;
        Ok(())
    }

    async fn list(&self, params: &QueryParams) -> Result<(Vec<Article>, u64)> {
        self.list_scoped(params, ListScope::All).await
    }

    async fn list_by_category(
        &self,
        category_id: i32,
        params: &QueryParams,
    ) -> Result<(Vec<Article>, u64)> {
        self.list_scoped(params, ListScope::Category(category_id)).await
    }

    async fn list_by_tag(&self, tag_id: i32, params: &QueryParams) -> Result<(Vec<Article>, u64)> {
        self.list_scoped(params, ListScope::Tag(tag_id)).await
    }
}

#[async_trait]
impl CategoryRepository for SqlStore {
    async fn create(&self, draft: CategoryDraft) -> Result<Category> {
        let now = Utc::now();
        let name = draft.name.clone();

        CategoryActiveModel {
            name: Set(draft.name),
            description: Set(draft.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.write())
        .await
        .map(Category::from)
        .map_err(|e| name_conflict(e, "category", &name))
    }

    async fn get_by_id(&self, id: i32) -> Result<Category> {
        CategoryEntity::find_by_id(id)
            .one(self.pool.read())
            .await?
            .map(Category::from)
            .ok_or_else(|| AppError::not_found("category", id))
    }

    async fn get_by_name(&self, name: &str) -> Result<Category> {
        CategoryEntity::find()
            .filter(CategoryColumn::Name.eq(name))
            .one(self.pool.read())
            .await?
            .map(Category::from)
            .ok_or_else(|| AppError::not_found_by_name("category", name))
    }

    async fn update(&self, id: i32, draft: CategoryDraft) -> Result<Category> {
        let conn = self.pool.write();
        let existing = CategoryEntity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("category", id))?;

        let name = draft.name.clone();
        let mut active: CategoryActiveModel = existing.into();
        active.name = Set(draft.name);
        active.description = Set(draft.description);
        active.updated_at = Set(Utc::now());

        active
            .update(conn)
            .await
            .map(Category::from)
            .map_err(|e| name_conflict(e, "category", &name))
    }

    async fn delete(&self, id: i32) -> Result<()> {
        let txn = self.pool.write().begin().await?;

        let detached = ArticleEntity::update_many()
            .col_expr(ArticleColumn::CategoryId, Expr::value(Option::<i32>::None))
            .filter(ArticleColumn::CategoryId.eq(id))
            .exec(&txn)
            .await?;

        let result = CategoryEntity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("category", id));
        }

        txn.commit().await?;
        debug!(category_id = id, detached = detached.rows_affected, "Category deleted");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let rows = CategoryEntity::find()
            .order_by_asc(CategoryColumn::Id)
            .all(self.pool.read())
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }
}

#[async_trait]
impl TagRepository for SqlStore {
    async fn create(&self, draft: TagDraft) -> Result<Tag> {
        let now = Utc::now();
        let name = draft.name.clone();

        TagActiveModel {
            name: Set(draft.name),
            color: Set(draft.color),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.write())
        .await
        .map(Tag::from)
        .map_err(|e| name_conflict(e, "tag", &name))
    }

    async fn get_by_id(&self, id: i32) -> Result<Tag> {
        TagEntity::find_by_id(id)
            .one(self.pool.read())
            .await?
            .map(Tag::from)
            .ok_or_else(|| AppError::not_found("tag", id))
    }

    async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = TagEntity::find()
            .filter(TagColumn::Id.is_in(ids.iter().copied()))
            .order_by_asc(TagColumn::Id)
            .all(self.pool.read())
            .await?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn get_by_name(&self, name: &str) -> Result<Tag> {
        TagEntity::find()
            .filter(TagColumn::Name.eq(name))
            .one(self.pool.read())
            .await?
            .map(Tag::from)
            .ok_or_else(|| AppError::not_found_by_name("tag", name))
    }

    async fn update(&self, id: i32, draft: TagDraft) -> Result<Tag> {
        let conn = self.pool.write();
        let existing = TagEntity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("tag", id))?;

        let name = draft.name.clone();
        let mut active: TagActiveModel = existing.into();
        active.name = Set(draft.name);
        active.color = Set(draft.color);
        active.updated_at = Set(Utc::now());

        active
            .update(conn)
            .await
            .map(Tag::from)
            .map_err(|e| name_conflict(e, "tag", &name))
    }

    async fn delete(&self, id: i32) -> Result<()> {
        let txn = self.pool.write().begin().await?;

        ArticleTagEntity::delete_many()
            .filter(ArticleTagColumn::TagId.eq(id))
            .exec(&txn)
            .await?;

        let result = TagEntity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("tag", id));
        }

        txn.commit().await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        let rows = TagEntity::find()
            .order_by_asc(TagColumn::Id)
            .all(self.pool.read())
            .await?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }
}

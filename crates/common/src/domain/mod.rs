//! Domain model shared by storage backends, services and the gateway
//!
//! Entities are what repositories return: categories and tags already
//! resolved onto their articles. Drafts are what repositories persist,
//! with relations referenced by id only. Requests are the caller-facing
//! payloads, validated before they reach a service.

mod requests;

pub use requests::{
    ArticleCreateRequest, ArticleUpdateRequest, CategoryCreateRequest, CategoryUpdateRequest,
    LoginRequest, LoginResponse, TagCreateRequest, TagUpdateRequest,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A blog article with its category and tags resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl Article {
    /// Whether the article carries the given tag
    pub fn has_tag(&self, tag_id: i32) -> bool {
        self.tags.iter().any(|tag| tag.id == tag_id)
    }

    /// Id of the owning category, if any
    pub fn category_id(&self) -> Option<i32> {
        self.category.as_ref().map(|category| category.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entities that can be matched against a name lookup during uniqueness checks
pub trait Identified {
    fn id(&self) -> i32;
}

impl Identified for Category {
    fn id(&self) -> i32 {
        self.id
    }
}

impl Identified for Tag {
    fn id(&self) -> i32 {
        self.id
    }
}

/// Article fields as persisted; relations were already checked to exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub published: bool,
    pub category_id: Option<i32>,
    pub tag_ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDraft {
    pub name: String,
    pub color: String,
}

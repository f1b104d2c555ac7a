//! Tag service

use crate::config::ContentConfig;
use crate::db::TagRepository;
use crate::domain::{Tag, TagCreateRequest, TagDraft, TagUpdateRequest};
use crate::errors::Result;
use crate::metrics;
use crate::services::integrity::ensure_unique;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

pub struct TagService {
    tags: Arc<dyn TagRepository>,
    default_color: String,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagRepository>, content: &ContentConfig) -> Self {
        Self {
            tags,
            default_color: content.default_tag_color.clone(),
        }
    }

    fn draft(&self, request: TagCreateRequest) -> TagDraft {
        let color = request
            .color
            .filter(|color| !color.is_empty())
            .unwrap_or_else(|| self.default_color.clone());
        TagDraft {
            name: request.name,
            color,
        }
    }

    /// Create a tag; a missing or empty color gets the configured default
    pub async fn create(&self, request: TagCreateRequest) -> Result<Tag> {
        request.validate()?;
        ensure_unique(
            self.tags.get_by_name(&request.name).await,
            "tag",
            &request.name,
            None,
        )?;

        let tag = self.tags.create(self.draft(request)).await?;

        metrics::record_write("tag", "create");
        info!(tag_id = tag.id, name = %tag.name, "Tag created");
        Ok(tag)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Tag> {
        self.tags.get_by_id(id).await
    }

    pub async fn update(&self, id: i32, request: TagUpdateRequest) -> Result<Tag> {
        request.validate()?;
        self.tags.get_by_id(id).await?;
        ensure_unique(
            self.tags.get_by_name(&request.name).await,
            "tag",
            &request.name,
            Some(id),
        )?;

        let tag = self.tags.update(id, self.draft(request)).await?;

        metrics::record_write("tag", "update");
        info!(tag_id = id, "Tag updated");
        Ok(tag)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        self.tags.delete(id).await?;
        metrics::record_write("tag", "delete");
        info!(tag_id = id, "Tag deleted");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Tag>> {
        self.tags.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::errors::AppError;
    use tokio_test::{assert_err, assert_ok};

    fn service() -> TagService {
        TagService::new(Arc::new(MemoryStore::new()), &ContentConfig::default())
    }

    fn request(name: &str, color: Option<&str>) -> TagCreateRequest {
        TagCreateRequest {
            name: name.to_string(),
            color: color.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_default_color() {
        let service = service();
        let tag = assert_ok!(service.create(request("Go", None)).await);
        assert_eq!(tag.color, "#007bff");
        let tag = assert_ok!(service.create(request("Rust", Some(""))).await);
        assert_eq!(tag.color, "#007bff");
        let tag = assert_ok!(service.create(request("Docker", Some("#2496ED"))).await);
        assert_eq!(tag.color, "#2496ED");
    }

    #[tokio::test]
    async fn test_configured_default_color() {
        let content = ContentConfig {
            default_tag_color: "#333333".into(),
            ..Default::default()
        };
        let service = TagService::new(Arc::new(MemoryStore::new()), &content);
        let tag = assert_ok!(service.create(request("Go", None)).await);
        assert_eq!(tag.color, "#333333");
    }

    #[tokio::test]
    async fn test_update_resets_missing_color() {
        let service = service();
        let tag = assert_ok!(service.create(request("Go", Some("#00ADD8"))).await);
        let updated = assert_ok!(service.update(tag.id, request("Go", None)).await);
        assert_eq!(updated.color, "#007bff");
    }

    #[tokio::test]
    async fn test_duplicate_and_invalid() {
        let service = service();
        assert_ok!(service.create(request("Go", None)).await);
        let err = assert_err!(service.create(request("Go", Some("#fff"))).await);
        assert!(matches!(err, AppError::Duplicate { .. }));

        let err = assert_err!(service.create(request("Bad", Some("red"))).await);
        assert!(matches!(err, AppError::InvalidInput { .. }));
    }
}

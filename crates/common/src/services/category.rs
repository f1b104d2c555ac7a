//! Category service

use crate::db::CategoryRepository;
use crate::domain::{Category, CategoryCreateRequest, CategoryDraft, CategoryUpdateRequest};
use crate::errors::Result;
use crate::metrics;
use crate::services::integrity::ensure_unique;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    /// Create a category with a name no other category uses
    pub async fn create(&self, request: CategoryCreateRequest) -> Result<Category> {
        request.validate()?;
        ensure_unique(
            self.categories.get_by_name(&request.name).await,
            "category",
            &request.name,
            None,
        )?;

        let category = self
            .categories
            .create(CategoryDraft {
                name: request.name,
                description: request.description,
            })
            .await?;

        metrics::record_write("category", "create");
        info!(category_id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Category> {
        self.categories.get_by_id(id).await
    }

    /// Replace name and description; keeping the current name is not a conflict
    pub async fn update(&self, id: i32, request: CategoryUpdateRequest) -> Result<Category> {
        request.validate()?;
        self.categories.get_by_id(id).await?;
        ensure_unique(
            self.categories.get_by_name(&request.name).await,
            "category",
            &request.name,
            Some(id),
        )?;

        let category = self
            .categories
            .update(
                id,
                CategoryDraft {
                    name: request.name,
                    description: request.description,
                },
            )
            .await?;

        metrics::record_write("category", "update");
        info!(category_id = id, "Category updated");
        Ok(category)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        self.categories.delete(id).await?;
        metrics::record_write("category", "delete");
        info!(category_id = id, "Category deleted");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        self.categories.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::errors::AppError;
    use tokio_test::{assert_err, assert_ok};

    fn service() -> CategoryService {
        CategoryService::new(Arc::new(MemoryStore::new()))
    }

    fn request(name: &str, description: &str) -> CategoryCreateRequest {
        CategoryCreateRequest {
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_keeps_fields() {
        let service = service();
        let category = assert_ok!(service.create(request("Tech", "Technology articles")).await);
        assert_eq!(category.name, "Tech");
        assert_eq!(category.description, "Technology articles");
        assert_eq!(assert_ok!(service.get_by_id(category.id).await), category);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected_regardless_of_description() {
        let service = service();
        assert_ok!(service.create(request("Tech", "one")).await);
        let err = assert_err!(service.create(request("Tech", "two")).await);
        assert!(matches!(err, AppError::Duplicate { .. }));
        assert_eq!(assert_ok!(service.list().await).len(), 1);
    }

    #[tokio::test]
    async fn test_update_to_own_name() {
        let service = service();
        let category = assert_ok!(service.create(request("Tech", "old")).await);
        let updated = assert_ok!(service.update(category.id, request("Tech", "new")).await);
        assert_eq!(updated.description, "new");
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_update_to_taken_name() {
        let service = service();
        assert_ok!(service.create(request("Tech", "")).await);
        let life = assert_ok!(service.create(request("Life", "")).await);
        let err = assert_err!(service.update(life.id, request("Tech", "")).await);
        assert!(matches!(err, AppError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let service = service();
        let err = assert_err!(service.update(9, request("Tech", "")).await);
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_invalid_request_rejected() {
        let service = service();
        let err = assert_err!(service.create(request("", "")).await);
        assert!(matches!(err, AppError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let service = service();
        let category = assert_ok!(service.create(request("Tech", "")).await);
        assert_ok!(service.delete(category.id).await);
        assert!(assert_err!(service.delete(category.id).await).is_not_found());
    }
}

//! Referential and uniqueness checks run before writes

use crate::db::{CategoryRepository, TagRepository};
use crate::domain::Identified;
use crate::errors::{AppError, Result};

/// Reject a write that names a category which does not exist
pub(crate) async fn resolve_category(
    categories: &dyn CategoryRepository,
    category_id: Option<i32>,
) -> Result<()> {
    if let Some(id) = category_id {
        categories.get_by_id(id).await?;
    }
    Ok(())
}

/// Reject a write unless every tag id resolves
///
/// The resolved count must equal the requested count, so repeated ids are
/// rejected as well.
pub(crate) async fn resolve_tags(tags: &dyn TagRepository, tag_ids: &[i32]) -> Result<()> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    let found = tags.get_by_ids(tag_ids).await?;
    if found.len() != tag_ids.len() {
        return Err(AppError::InvalidInput {
            message: "some tag ids do not exist".to_string(),
        });
    }
    Ok(())
}

/// Interpret a by-name lookup as a uniqueness check
///
/// `updating` is the id of the entity being renamed, which may keep its own name.
pub(crate) fn ensure_unique<T: Identified>(
    lookup: Result<T>,
    resource_type: &str,
    name: &str,
    updating: Option<i32>,
) -> Result<()> {
    match lookup {
        Ok(existing) if Some(existing.id()) == updating => Ok(()),
        Ok(_) => Err(AppError::Duplicate {
            message: format!("{} {:?} already exists", resource_type, name),
        }),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Tag;
    use chrono::Utc;

    fn tag(id: i32) -> Tag {
        Tag {
            id,
            name: "rust".into(),
            color: "#007bff".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_unique_when_absent() {
        let lookup: Result<Tag> = Err(AppError::not_found_by_name("tag", "rust"));
        assert!(ensure_unique(lookup, "tag", "rust", None).is_ok());
    }

    #[test]
    fn test_duplicate_when_another_entity_has_the_name() {
        let err = ensure_unique(Ok(tag(1)), "tag", "rust", None).unwrap_err();
        assert!(matches!(err, AppError::Duplicate { .. }));
        let err = ensure_unique(Ok(tag(1)), "tag", "rust", Some(2)).unwrap_err();
        assert!(matches!(err, AppError::Duplicate { .. }));
    }

    #[test]
    fn test_own_name_is_allowed() {
        assert!(ensure_unique(Ok(tag(3)), "tag", "rust", Some(3)).is_ok());
    }

    #[test]
    fn test_other_lookup_failures_propagate() {
        let lookup: Result<Tag> = Err(AppError::Internal {
            message: "connection reset".into(),
        });
        let err = ensure_unique(lookup, "tag", "rust", None).unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }
}

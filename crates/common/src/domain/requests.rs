//! Request payloads accepted by the services

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ArticleCreateRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1))]
    pub content: String,

    #[serde(default)]
    #[validate(length(max = 500))]
    pub summary: String,

    #[serde(default)]
    pub published: bool,

    #[serde(default)]
    pub category_id: Option<i32>,

    #[serde(default)]
    pub tag_ids: Vec<i32>,
}

/// Updates replace every field, so they carry the same payload as creation
pub type ArticleUpdateRequest = ArticleCreateRequest;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CategoryCreateRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: String,
}

pub type CategoryUpdateRequest = CategoryCreateRequest;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TagCreateRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,

    /// Hex color; absent or empty means the configured default
    #[serde(default)]
    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
}

pub type TagUpdateRequest = TagCreateRequest;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

fn hex_color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$")
            .expect("hex color pattern is valid")
    })
}

fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    if color.is_empty() || hex_color_pattern().is_match(color) {
        Ok(())
    } else {
        Err(ValidationError::new("hexcolor"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, content: &str) -> ArticleCreateRequest {
        ArticleCreateRequest {
            title: title.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_article_title_bounds() {
        assert!(article("Rust ownership", "body").validate().is_ok());
        assert!(article("", "body").validate().is_err());
        assert!(article(&"x".repeat(201), "body").validate().is_err());
        // Limits count characters, not bytes
        assert!(article(&"文".repeat(200), "body").validate().is_ok());
    }

    #[test]
    fn test_article_requires_content() {
        assert!(article("title", "").validate().is_err());
    }

    #[test]
    fn test_summary_limit() {
        let mut request = article("title", "body");
        request.summary = "s".repeat(501);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_category_name_limit() {
        let ok = CategoryCreateRequest {
            name: "n".repeat(100),
            description: String::new(),
        };
        let too_long = CategoryCreateRequest {
            name: "n".repeat(101),
            description: String::new(),
        };
        assert!(ok.validate().is_ok());
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_tag_color_validation() {
        let tag = |color: Option<&str>| TagCreateRequest {
            name: "rust".to_string(),
            color: color.map(str::to_string),
        };
        assert!(tag(None).validate().is_ok());
        assert!(tag(Some("")).validate().is_ok());
        assert!(tag(Some("#fff")).validate().is_ok());
        assert!(tag(Some("#00ADD8")).validate().is_ok());
        assert!(tag(Some("#00ADD8ff")).validate().is_ok());
        assert!(tag(Some("blue")).validate().is_err());
        assert!(tag(Some("#12345")).validate().is_err());
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: ArticleCreateRequest =
            serde_json::from_str(r#"{"title":"t","content":"c"}"#).unwrap();
        assert!(!request.published);
        assert_eq!(request.category_id, None);
        assert!(request.tag_ids.is_empty());
    }
}

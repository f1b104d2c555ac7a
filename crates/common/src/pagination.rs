//! Listing filters and pagination
//!
//! Turns loose query-string values into a [`QueryParams`] and defines the
//! filter, ordering and windowing rules every article listing follows.
//! The SQL backend expresses the same rules as a query; the in-memory
//! backend applies them directly through [`apply_listing`].

use crate::config::ContentConfig;
use crate::domain::Article;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Validated listing parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size
    pub limit: Option<u64>,
    /// Restrict to published (`Some(true)`) or draft (`Some(false)`) articles
    pub published: Option<bool>,
    /// Case-insensitive substring matched against title or content
    pub search: Option<String>,
}

/// Offset/limit pair derived from a page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

/// Page metadata returned alongside a paginated listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_page: u64,
}

/// One listing result: the items, the filtered total and page metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub meta: Option<PageMeta>,
}

/// Extra equality filter applied by scoped listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    Category(i32),
    Tag(i32),
}

impl QueryParams {
    /// Parameters for an explicit page
    pub fn paged(page: u64, limit: u64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            ..Default::default()
        }
    }

    /// The offset/limit window, present only when both page and limit are positive
    pub fn window(&self) -> Option<PageWindow> {
        match (self.page, self.limit) {
            (Some(page), Some(limit)) if page > 0 && limit > 0 => Some(PageWindow {
                offset: (page - 1).saturating_mul(limit),
                limit,
            }),
            _ => None,
        }
    }

    /// Page metadata for a listing with `total` matching items
    pub fn page_meta(&self, total: u64) -> Option<PageMeta> {
        let window = self.window()?;
        Some(PageMeta {
            page: self.page.unwrap_or(1),
            limit: window.limit,
            total,
            total_page: total.div_ceil(window.limit),
        })
    }

    /// Search text, if non-empty
    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref().filter(|text| !text.is_empty())
    }

    /// Whether an article passes the published and search filters of a listing in `scope`
    ///
    /// Search only narrows unscoped listings.
    pub fn matches(&self, article: &Article, scope: ListScope) -> bool {
        if let Some(published) = self.published {
            if article.published != published {
                return false;
            }
        }

        match scope {
            ListScope::All => match self.search_text() {
                Some(text) => {
                    let needle = text.to_lowercase();
                    article.title.to_lowercase().contains(&needle)
                        || article.content.to_lowercase().contains(&needle)
                }
                None => true,
            },
            ListScope::Category(category_id) => article.category_id() == Some(category_id),
            ListScope::Tag(tag_id) => article.has_tag(tag_id),
        }
    }
}

impl<T> Page<T> {
    /// Assemble a page; metadata is attached only for windowed requests
    pub fn new(items: Vec<T>, total: u64, params: &QueryParams) -> Self {
        Self {
            items,
            total,
            meta: params.page_meta(total),
        }
    }
}

/// Listing order: newest first, insertion (id) order among equal timestamps
pub fn listing_order(a: &Article, b: &Article) -> Ordering {
    b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id))
}

/// Filter, order, count and window a set of articles
///
/// Returns the selected page and the number of articles matching the filters.
pub fn apply_listing(
    articles: impl IntoIterator<Item = Article>,
    params: &QueryParams,
    scope: ListScope,
) -> (Vec<Article>, u64) {
    let mut matching: Vec<Article> = articles
        .into_iter()
        .filter(|article| params.matches(article, scope))
        .collect();
    matching.sort_by(listing_order);

    let total = matching.len() as u64;
    let items = match params.window() {
        Some(window) => matching
            .into_iter()
            .skip(usize::try_from(window.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(window.limit).unwrap_or(usize::MAX))
            .collect(),
        None => matching,
    };

    (items, total)
}

/// Raw listing query as it arrives on the query string
///
/// Unparseable values are ignored rather than rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub published: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    /// Normalize into [`QueryParams`] using the configured page-size bounds
    pub fn into_params(self, content: &ContentConfig) -> QueryParams {
        let page = self
            .page
            .as_deref()
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|page| *page > 0);

        let limit = self
            .limit
            .as_deref()
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|limit| (1..=content.max_page_limit).contains(limit))
            .or_else(|| page.map(|_| content.default_page_limit));

        let published = match self.published.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };

        QueryParams {
            page,
            limit,
            published,
            search: self.search.filter(|text| !text.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn article(id: i32, title: &str, published: bool, minutes: i64) -> Article {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap() + Duration::minutes(minutes);
        Article {
            id,
            title: title.to_string(),
            content: format!("content of {}", title),
            summary: String::new(),
            published,
            created_at: created,
            updated_at: created,
            category: None,
            tags: Vec::new(),
        }
    }

    fn query(page: &str, limit: &str) -> ListQuery {
        ListQuery {
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_window_requires_page_and_limit() {
        assert_eq!(QueryParams::default().window(), None);
        assert_eq!(
            QueryParams { page: Some(2), ..Default::default() }.window(),
            None
        );
        assert_eq!(
            QueryParams::paged(3, 10).window(),
            Some(PageWindow { offset: 20, limit: 10 })
        );
        assert_eq!(QueryParams::paged(0, 10).window(), None);
    }

    #[test]
    fn test_total_page_rounds_up() {
        let params = QueryParams::paged(1, 10);
        assert_eq!(params.page_meta(25).map(|m| m.total_page), Some(3));
        assert_eq!(params.page_meta(30).map(|m| m.total_page), Some(3));
        assert_eq!(params.page_meta(1).map(|m| m.total_page), Some(1));
        assert_eq!(params.page_meta(0).map(|m| m.total_page), Some(0));
        assert_eq!(QueryParams::default().page_meta(25), None);
    }

    #[test]
    fn test_limit_defaults_once_page_is_set() {
        let content = ContentConfig::default();
        let params = ListQuery {
            page: Some("2".into()),
            ..Default::default()
        }
        .into_params(&content);
        assert_eq!(params.page, Some(2));
        assert_eq!(params.limit, Some(10));

        let no_page = ListQuery::default().into_params(&content);
        assert_eq!(no_page.page, None);
        assert_eq!(no_page.limit, None);
    }

    #[test]
    fn test_out_of_range_limit_falls_back() {
        let content = ContentConfig::default();
        assert_eq!(query("1", "100").into_params(&content).limit, Some(100));
        assert_eq!(query("1", "101").into_params(&content).limit, Some(10));
        assert_eq!(query("1", "0").into_params(&content).limit, Some(10));
        assert_eq!(query("1", "abc").into_params(&content).limit, Some(10));
        assert_eq!(query("x", "50").into_params(&content).page, None);
    }

    #[test]
    fn test_padded_numbers_are_malformed() {
        let content = ContentConfig::default();
        assert_eq!(query(" 2", "20").into_params(&content).page, None);
        assert_eq!(query("2 ", "20").into_params(&content).page, None);
        assert_eq!(query("2", " 20").into_params(&content).limit, Some(10));
    }

    #[test]
    fn test_published_is_tri_state() {
        let content = ContentConfig::default();
        let parse = |raw: Option<&str>| {
            ListQuery {
                published: raw.map(str::to_string),
                ..Default::default()
            }
            .into_params(&content)
            .published
        };
        assert_eq!(parse(Some("true")), Some(true));
        assert_eq!(parse(Some("false")), Some(false));
        assert_eq!(parse(Some("yes")), None);
        assert_eq!(parse(None), None);
    }

    #[test]
    fn test_search_is_case_insensitive_on_title_or_content() {
        let params = QueryParams {
            search: Some("RUST".into()),
            ..Default::default()
        };
        let mut by_content = article(2, "Ownership", true, 0);
        by_content.content = "notes on rust borrowing".into();

        assert!(params.matches(&article(1, "Learning Rust", true, 0), ListScope::All));
        assert!(params.matches(&by_content, ListScope::All));
        assert!(!params.matches(&article(3, "Go channels", true, 0), ListScope::All));
    }

    #[test]
    fn test_scoped_listing_ignores_search() {
        let params = QueryParams {
            search: Some("nothing matches this".into()),
            ..Default::default()
        };
        let mut tagged = article(1, "Tagged", true, 0);
        tagged.tags.push(crate::domain::Tag {
            id: 4,
            name: "rust".into(),
            color: "#007bff".into(),
            created_at: tagged.created_at,
            updated_at: tagged.created_at,
        });
        assert!(params.matches(&tagged, ListScope::Tag(4)));
        assert!(!params.matches(&tagged, ListScope::Tag(5)));
        assert!(!params.matches(&tagged, ListScope::Category(1)));
    }

    #[test]
    fn test_apply_listing_orders_counts_and_windows() {
        let articles = vec![
            article(1, "oldest", true, 0),
            article(2, "draft", false, 10),
            article(3, "newest", true, 20),
            article(4, "tie-a", true, 5),
            article(5, "tie-b", true, 5),
        ];

        let params = QueryParams {
            published: Some(true),
            ..QueryParams::paged(1, 2)
        };
        let (items, total) = apply_listing(articles.clone(), &params, ListScope::All);
        assert_eq!(total, 4);
        let ids: Vec<i32> = items.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 4]);

        let (rest, _) = apply_listing(
            articles.clone(),
            &QueryParams { published: Some(true), ..QueryParams::paged(2, 2) },
            ListScope::All,
        );
        let ids: Vec<i32> = rest.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![5, 1]);

        let (all, total) = apply_listing(articles, &QueryParams::default(), ListScope::All);
        assert_eq!(total, 5);
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_page_past_the_end_is_empty_but_counted() {
        let articles = (1..=3).map(|id| article(id, "a", true, id as i64));
        let params = QueryParams::paged(5, 10);
        let (items, total) = apply_listing(articles, &params, ListScope::All);
        assert!(items.is_empty());
        assert_eq!(total, 3);
        let page = Page::new(items, total, &params);
        assert_eq!(page.meta.map(|m| m.total_page), Some(1));
    }
}

//! Book model and related types
//!
//! Books are stored normalized (author_id/publisher_id foreign keys) but
//! always read and written through a denormalized view where author and
//! publisher appear as plain name strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Internal row structure for denormalized book queries
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub file_cover: Option<String>,
    pub available: bool,
    pub deleted: bool,
    pub author: String,
    pub publisher: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            description: row.description,
            author: row.author,
            publisher: row.publisher,
            file_cover: row.file_cover,
            available: row.available,
            deleted: row.deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Denormalized book view returned by all read paths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    pub publisher: String,
    pub file_cover: Option<String>,
    pub available: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "publisher must not be empty"))]
    pub publisher: String,
    pub file_cover: Option<String>,
}

/// Partial update request. A field that is absent is left unchanged; a
/// provided empty string is a provided value and overwrites.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub file_cover: Option<String>,
}

/// Book list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct BookQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub query: Option<String>,
    pub sort1: Option<String>,
    pub sort2: Option<String>,
}

/// Pagination metadata: `total` counts all rows matching the filter,
/// ignoring skip/limit
#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
}

/// One page of books plus pagination metadata
#[derive(Debug, Serialize)]
pub struct BookPage {
    pub data: Vec<Book>,
    pub meta: PageMeta,
}

/// Response body for DELETE /book/:id
#[derive(Debug, Serialize)]
pub struct RemovedBook {
    pub id: i32,
}

/// Validate pagination parameters and apply defaults: `skip` is an offset
/// (>= 0, default 0), `limit` a page size (> 0, default 10).
pub fn page_bounds(skip: Option<i64>, limit: Option<i64>) -> AppResult<(i64, i64)> {
    let skip = skip.unwrap_or(0);
    let limit = limit.unwrap_or(10);

    if skip < 0 {
        return Err(AppError::Validation("skip must be >= 0".to_string()));
    }
    if limit <= 0 {
        return Err(AppError::Validation("limit must be > 0".to_string()));
    }

    Ok((skip, limit))
}

/// Whitelisted sort keys for book listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Author,
    Publisher,
    Available,
}

impl SortKey {
    /// SQL expression for this key against the joined book query
    /// (`books b JOIN authors a JOIN publishers p`)
    pub fn column(self) -> &'static str {
        match self {
            SortKey::Title => "b.title",
            SortKey::Author => "a.name",
            SortKey::Publisher => "p.name",
            SortKey::Available => "b.available",
        }
    }
}

/// A parsed sort key with direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub descending: bool,
}

impl SortSpec {
    /// Parse a raw sort parameter (`title`, `-author`, ...). Keys are
    /// whitelisted; anything else is a validation error and is never
    /// interpolated into SQL.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let key = match name {
            "title" => SortKey::Title,
            "author" => SortKey::Author,
            "publisher" => SortKey::Publisher,
            "available" => SortKey::Available,
            other => {
                return Err(AppError::Validation(format!(
                    "Invalid sort key: {}",
                    other
                )))
            }
        };

        Ok(SortSpec { key, descending })
    }

    pub fn to_sql(self) -> String {
        format!(
            "{} {}",
            self.key.column(),
            if self.descending { "DESC" } else { "ASC" }
        )
    }
}

/// Build an ORDER BY clause from up to two sort parameters. Returns an
/// empty string when no sort is requested (natural order prevails).
pub fn order_by_clause(sort1: Option<&str>, sort2: Option<&str>) -> AppResult<String> {
    let mut parts = Vec::new();
    if let Some(raw) = sort1 {
        parts.push(SortSpec::parse(raw)?.to_sql());
    }
    if let Some(raw) = sort2 {
        parts.push(SortSpec::parse(raw)?.to_sql());
    }

    if parts.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ascending_key() {
        let spec = SortSpec::parse("title").unwrap();
        assert_eq!(spec.key, SortKey::Title);
        assert!(!spec.descending);
        assert_eq!(spec.to_sql(), "b.title ASC");
    }

    #[test]
    fn parses_descending_key() {
        let spec = SortSpec::parse("-publisher").unwrap();
        assert_eq!(spec.key, SortKey::Publisher);
        assert!(spec.descending);
        assert_eq!(spec.to_sql(), "p.name DESC");
    }

    #[test]
    fn author_sorts_by_related_name() {
        assert_eq!(SortSpec::parse("author").unwrap().to_sql(), "a.name ASC");
    }

    #[test]
    fn rejects_unknown_key() {
        assert!(matches!(
            SortSpec::parse("createdAt"),
            Err(AppError::Validation(_))
        ));
        // '-' alone carries no key
        assert!(SortSpec::parse("-").is_err());
    }

    #[test]
    fn order_clause_primary_and_tiebreak() {
        let clause = order_by_clause(Some("-title"), Some("author")).unwrap();
        assert_eq!(clause, "ORDER BY b.title DESC, a.name ASC");
    }

    #[test]
    fn order_clause_empty_without_keys() {
        assert_eq!(order_by_clause(None, None).unwrap(), "");
    }

    #[test]
    fn order_clause_second_key_alone() {
        let clause = order_by_clause(None, Some("available")).unwrap();
        assert_eq!(clause, "ORDER BY b.available ASC");
    }

    #[test]
    fn page_bounds_applies_defaults() {
        assert_eq!(page_bounds(None, None).unwrap(), (0, 10));
        assert_eq!(page_bounds(Some(10), Some(5)).unwrap(), (10, 5));
    }

    #[test]
    fn page_bounds_rejects_negative_skip() {
        assert!(matches!(
            page_bounds(Some(-1), None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn page_bounds_rejects_non_positive_limit() {
        assert!(matches!(
            page_bounds(None, Some(0)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            page_bounds(None, Some(-5)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn book_serializes_camel_case() {
        let book = Book {
            id: 1,
            title: "A".to_string(),
            description: None,
            author: "B".to_string(),
            publisher: "C".to_string(),
            file_cover: None,
            available: true,
            deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&book).unwrap();
        assert!(value.get("fileCover").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("file_cover").is_none());
    }
}

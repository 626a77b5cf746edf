//! Request/response shapes of the blog backend.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use blogdesk_auth::Principal;
use blogdesk_core::{BlogPostId, DomainError, RoleId, UserId};

/// Posts per page. The backend ignores any other size.
pub const PAGE_SIZE: u32 = 5;

/// Users and the signed-in principal share one wire shape.
pub type User = Principal;

/// A blog post as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BlogPostId>,
    pub title: String,
    pub text: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
}

impl BlogPost {
    pub fn author_id(&self) -> Option<UserId> {
        self.author.as_ref().and_then(|a| a.id)
    }
}

/// Body of create/update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPostDraft {
    pub title: String,
    pub text: String,
    pub category: String,
}

impl From<&BlogPost> for BlogPostDraft {
    fn from(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            text: post.text.clone(),
            category: post.category.clone(),
        }
    }
}

/// One page of the post list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostPage {
    pub content: Vec<BlogPost>,
    pub total_pages: u32,
    pub total_elements: u64,
    pub current_page: u32,
    pub page_size: u32,
    #[serde(alias = "isFirst")]
    pub first: bool,
    #[serde(alias = "isLast")]
    pub last: bool,
}

impl BlogPostPage {
    pub fn has_previous(&self) -> bool {
        !self.first
    }

    pub fn has_next(&self) -> bool {
        !self.last
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Date,
    Title,
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl core::str::FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "title" => Ok(Self::Title),
            "category" => Ok(Self::Category),
            other => Err(DomainError::validation(format!(
                "unknown sort field '{other}' (expected date, title or category)"
            ))),
        }
    }
}

impl core::str::FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(DomainError::validation(format!(
                "unknown sort order '{other}' (expected asc or desc)"
            ))),
        }
    }
}

/// Query string of `GET /blogpost`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostQuery {
    pub page: u32,
    pub size: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<UserId>,
}

impl Default for BlogPostQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: PAGE_SIZE,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            category: None,
            author_id: None,
        }
    }
}

impl BlogPostQuery {
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = field;
        self.sort_order = order;
        self
    }

    /// Filter by category; a blank category means "no filter".
    pub fn category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = (!category.trim().is_empty()).then_some(category);
        self
    }

    pub fn author(mut self, author_id: UserId) -> Self {
        self.author_id = Some(author_id);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /user/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_page_with_either_flag_spelling() {
        let page: BlogPostPage = serde_json::from_str(
            r#"{"content": [], "totalPages": 3, "totalElements": 11, "currentPage": 0,
                "pageSize": 5, "first": true, "last": false}"#,
        )
        .unwrap();
        assert!(!page.has_previous());
        assert!(page.has_next());

        let page: BlogPostPage = serde_json::from_str(
            r#"{"content": [], "totalPages": 1, "totalElements": 0, "currentPage": 0,
                "pageSize": 5, "isFirst": true, "isLast": true}"#,
        )
        .unwrap();
        assert!(!page.has_next());
    }

    #[test]
    fn decodes_post_with_author_and_timestamps() {
        let post: BlogPost = serde_json::from_str(
            r#"{"id": "3a0f5f5e-8a11-4c1e-9a43-8f1f0e1d2c3b", "title": "Hello world",
                "text": "A first post with enough text.", "category": "Technology",
                "author": {"id": "0b6f4c8e-1d2a-4b3c-8d4e-5f6a7b8c9d0e", "firstName": "Ada",
                           "lastName": "Lovelace", "email": "ada@example.com", "roles": []},
                "createdAt": "2024-05-01T10:15:30.123456", "updatedAt": "2024-05-01T10:15:30"}"#,
        )
        .unwrap();

        assert_eq!(
            post.author_id().map(|id| id.to_string()).as_deref(),
            Some("0b6f4c8e-1d2a-4b3c-8d4e-5f6a7b8c9d0e")
        );
        assert!(post.created_at.is_some());
    }

    #[test]
    fn sort_parsing_is_case_insensitive() {
        assert_eq!("Title".parse::<SortField>().unwrap(), SortField::Title);
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("author".parse::<SortField>().is_err());
    }

    #[test]
    fn blank_category_clears_filter() {
        let q = BlogPostQuery::default().category("Travel").category("  ");
        assert_eq!(q.category, None);
        assert_eq!(q.size, PAGE_SIZE);
        assert_eq!(q.sort_by, SortField::Date);
        assert_eq!(q.sort_order, SortOrder::Desc);
    }
}

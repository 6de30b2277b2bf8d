//! Backend records and the `CatalogApi` seam.
//!
//! The lending backend owns persistence and business rules; this crate only
//! talks to it through [`CatalogApi`]. [`http::HttpCatalog`] is the real
//! implementation, tests substitute mocks or fakes.
//!
pub mod http;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Account role as reported by `GET /api/users`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    /// The role a role-change action switches to.
    pub fn toggled(self) -> Self {
        match self {
            Role::Admin => Role::User,
            Role::User => Role::Admin,
        }
    }

    /// Human label used in confirmation prompts.
    pub fn describe(self) -> &'static str {
        match self {
            Role::Admin => "administrator",
            Role::User => "regular user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "USER" => Some(Role::User),
            _ => None,
        }
    }
}

/// A user's physical copy of a catalog book.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookOwner {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_book_id: String,
    pub is_available: bool,
    #[serde(default)]
    pub location: Option<String>,
}

/// Server-owned catalog record (admin view, includes owners).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogBook {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub stock: u32,
    pub available: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub owners: Vec<BookOwner>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCounts {
    pub user_books: u32,
    pub borrows: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "_count", default)]
    pub counts: UserCounts,
}

/// Result of an ISBN lookup. Providers often omit fields; they default to empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
}

/// Payload of `POST /api/books`.
///
/// Blank optional fields are sent the way the backend expects them:
/// `isbn` as `null`, `description` and `coverImage` as empty strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub description: String,
    pub cover_image: String,
}

/// Payload of `PUT /api/books/:id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookUpdate {
    #[serde(flatten)]
    pub book: NewBook,
    pub stock: u32,
}

/// Operations the dashboard needs from the lending backend.
#[cfg_attr(test, mockall::automock)]
pub trait CatalogApi: Send + Sync {
    /// `GET /api/books/admin`
    fn list_books(&self) -> Result<Vec<CatalogBook>>;
    /// `GET /api/books/search?isbn=...`
    fn lookup_isbn(&self, isbn: &str) -> Result<BookMetadata>;
    /// `POST /api/books`
    fn create_book(&self, book: &NewBook) -> Result<()>;
    /// `PUT /api/books/:id`
    fn update_book(&self, id: &str, update: &BookUpdate) -> Result<()>;
    /// `DELETE /api/books/:id`
    fn delete_book(&self, id: &str) -> Result<()>;
    /// `GET /api/users`
    fn list_users(&self) -> Result<Vec<LibraryUser>>;
    /// `PUT /api/users/:id/role`
    fn change_role(&self, user_id: &str, role: Role) -> Result<()>;
}

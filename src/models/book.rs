//! Book model and catalog request types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book availability, owned exclusively by the loan ledger.
///
/// `Borrowed` holds iff exactly one open loan references the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
pub enum BookStatus {
    Available,
    Borrowed,
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookStatus::Available => write!(f, "Available"),
            BookStatus::Borrowed => write!(f, "Borrowed"),
        }
    }
}

/// Book record from the catalog
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub category: String,
    pub title: String,
    pub author: String,
    pub edition: String,
    pub isbn: String,
    pub publication: String,
    pub status: BookStatus,
}

/// Create book request (new books always start Available)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255))]
    pub category: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub author: String,
    #[validate(length(max = 64))]
    pub edition: String,
    #[validate(length(max = 32))]
    pub isbn: String,
    #[validate(length(max = 255))]
    pub publication: String,
}

/// Update book request. Bibliographic fields only; availability is
/// never writable through the catalog.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255))]
    pub category: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub author: String,
    #[validate(length(max = 64))]
    pub edition: String,
    #[validate(length(max = 32))]
    pub isbn: String,
    #[validate(length(max = 255))]
    pub publication: String,
}

/// Catalog search filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Exact category match
    pub category: Option<String>,
    /// Case-insensitive substring match on the title
    pub title: Option<String>,
}

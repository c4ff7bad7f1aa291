//! Data models for the catalog

pub mod author;
pub mod book;
pub mod genre;
pub mod instance;
pub mod pagination;
pub mod user;

use serde::Serialize;
use utoipa::ToSchema;

// Re-export commonly used types
pub use author::{Author, AuthorDetails, AuthorForm};
pub use book::{Book, BookDetails, BookForm, BookShort};
pub use genre::Genre;
pub use instance::{BookInstance, LoanStatus, LoanedInstance, RenewalForm, RenewalFormView};
pub use pagination::{PageQuery, PageWindow, Paginated};
pub use user::{Permission, UserClaims};

/// What a delete confirmation page shows before the record is removed
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteConfirmation {
    pub id: i32,
    pub label: String,
    /// Records that would block the deletion
    pub dependents: i64,
}

//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{author::Author, genre::Genre, instance::BookInstance};

/// Full book record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub summary: String,
    /// 13 character ISBN, unique across the catalog
    pub isbn: String,
    pub language: Option<String>,
    pub genre_ids: Vec<i32>,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    /// "Last name, First name"
    pub author_name: Option<String>,
    pub isbn: String,
}

/// Book with everything its detail page shows
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    pub book: Book,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
    pub copies: Vec<BookInstance>,
}

/// Create / update book form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct BookForm {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(required(message = "Author is required"))]
    pub author_id: Option<i32>,
    #[validate(length(min = 1, max = 1000, message = "Summary must be 1-1000 characters"))]
    pub summary: String,
    #[validate(length(equal = 13, message = "ISBN must be exactly 13 characters"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Select at least one genre"))]
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    #[validate(length(max = 200, message = "Language must be at most 200 characters"))]
    pub language: Option<String>,
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author_id: book.author_id,
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            genre_ids: book.genre_ids.clone(),
            language: book.language.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> BookForm {
        BookForm {
            title: "the thing".to_string(),
            author_id: Some(1),
            summary: "A story.".to_string(),
            isbn: "9780000000001".to_string(),
            genre_ids: vec![1],
            language: Some("English".to_string()),
        }
    }

    #[test]
    fn accepts_complete_form() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn reports_each_invalid_field() {
        let form = BookForm {
            author_id: None,
            isbn: "123".to_string(),
            genre_ids: vec![],
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("author_id"));
        assert!(fields.contains_key("isbn"));
        assert!(fields.contains_key("genre_ids"));
        assert!(!fields.contains_key("title"));
    }
}

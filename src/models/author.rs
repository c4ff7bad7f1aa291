//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::BookShort;

/// Full author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// "Last name, First name", as authors are listed
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// Author with the books they wrote
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetails {
    pub author: Author,
    pub books: Vec<BookShort>,
}

/// Create / update author form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct AuthorForm {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl From<&Author> for AuthorForm {
    fn from(author: &Author) -> Self {
        Self {
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            date_of_birth: author.date_of_birth,
            date_of_death: author.date_of_death,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_form_is_rejected() {
        let errors = AuthorForm::default().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("first_name"));
        assert!(fields.contains_key("last_name"));
    }

    #[test]
    fn display_name_is_last_first() {
        let author = Author {
            id: 1,
            first_name: "John".to_string(),
            last_name: "Steinbeck".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1902, 2, 27),
            date_of_death: NaiveDate::from_ymd_opt(1968, 12, 20),
        };
        assert_eq!(author.display_name(), "Steinbeck, John");
        assert_eq!(AuthorForm::from(&author).last_name, "Steinbeck");
    }
}

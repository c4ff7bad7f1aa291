//! Page-number pagination shared by list endpoints

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{author::Author, book::BookShort, instance::LoanedInstance};
use crate::error::{AppError, AppResult};

pub const BOOKS_PER_PAGE: i64 = 10;
pub const AUTHORS_PER_PAGE: i64 = 5;
pub const LOANS_PER_PAGE: i64 = 10;

/// `?page=` query parameter
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 1 (default: 1)
    pub page: Option<i64>,
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    BookPage = Paginated<BookShort>,
    AuthorPage = Paginated<Author>,
    LoanPage = Paginated<LoanedInstance>
)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Total number of records across all pages
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub num_pages: i64,
}

/// Slice of a result set selected by a page number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub per_page: i64,
    pub num_pages: i64,
    pub offset: i64,
}

impl PageWindow {
    /// Resolve a requested page against the total row count.
    ///
    /// An empty result still has one (empty) page. Pages below 1 or past the
    /// last page do not exist.
    pub fn resolve(page: Option<i64>, per_page: i64, total: i64) -> AppResult<Self> {
        let page = page.unwrap_or(1);
        let num_pages = ((total + per_page - 1) / per_page).max(1);

        if page < 1 {
            return Err(AppError::NotFound("That page number is less than 1".to_string()));
        }
        if page > num_pages {
            return Err(AppError::NotFound("That page contains no results".to_string()));
        }

        Ok(Self {
            page,
            per_page,
            num_pages,
            offset: (page - 1) * per_page,
        })
    }

    pub fn wrap<T>(self, items: Vec<T>, total: i64) -> Paginated<T> {
        Paginated {
            items,
            total,
            page: self.page,
            per_page: self.per_page,
            num_pages: self.num_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_has_one_page() {
        let window = PageWindow::resolve(None, 10, 0).unwrap();
        assert_eq!(window.page, 1);
        assert_eq!(window.num_pages, 1);
        assert_eq!(window.offset, 0);
        assert!(PageWindow::resolve(Some(2), 10, 0).is_err());
    }

    #[test]
    fn last_partial_page_is_reachable() {
        let window = PageWindow::resolve(Some(3), 5, 11).unwrap();
        assert_eq!(window.num_pages, 3);
        assert_eq!(window.offset, 10);
        assert!(PageWindow::resolve(Some(4), 5, 11).is_err());
    }

    #[test]
    fn exact_multiple_does_not_add_a_page() {
        let window = PageWindow::resolve(Some(2), 10, 20).unwrap();
        assert_eq!(window.num_pages, 2);
        assert!(PageWindow::resolve(Some(3), 10, 20).is_err());
    }

    #[test]
    fn page_zero_is_not_found() {
        assert!(matches!(
            PageWindow::resolve(Some(0), 10, 50),
            Err(AppError::NotFound(_))
        ));
    }
}

//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, dashboard, genres, health, loans, renewal};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Library catalog: books, authors, copies and loans"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Dashboard
        dashboard::get_dashboard,
        // Books
        books::list_books,
        books::get_book,
        books::new_book_form,
        books::create_book,
        books::edit_book_form,
        books::update_book,
        books::confirm_delete_book,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::new_author_form,
        authors::create_author,
        authors::edit_author_form,
        authors::update_author,
        authors::confirm_delete_author,
        authors::delete_author,
        // Genres
        genres::list_genres,
        // Loans
        loans::list_my_loans,
        loans::list_all_loans,
        renewal::renewal_form,
        renewal::renew_instance,
    ),
    components(
        schemas(
            // Catalog
            crate::models::author::Author,
            crate::models::author::AuthorDetails,
            crate::models::author::AuthorForm,
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::BookDetails,
            crate::models::book::BookForm,
            crate::models::genre::Genre,
            crate::models::DeleteConfirmation,
            // Copies and loans
            crate::models::instance::LoanStatus,
            crate::models::instance::BookInstance,
            crate::models::instance::LoanedInstance,
            crate::models::instance::RenewalForm,
            crate::models::instance::RenewalFormView,
            // Pages
            crate::models::pagination::BookPage,
            crate::models::pagination::AuthorPage,
            crate::models::pagination::LoanPage,
            // Dashboard
            crate::services::dashboard::DashboardCounts,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "dashboard", description = "Catalog counters"),
        (name = "books", description = "Book management"),
        (name = "authors", description = "Author management"),
        (name = "genres", description = "Genres"),
        (name = "loans", description = "Loans and renewals")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

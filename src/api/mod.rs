//! API handlers for the catalog REST endpoints

pub mod authors;
pub mod books;
pub mod dashboard;
pub mod form;
pub mod genres;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod renewal;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
    routing::get,
    Router,
};
use axum_extra::{
    extract::WithRejection,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

pub use form::FormBody;

/// Record id taken from the URL; an id that does not parse is a 404
pub type IdPath<T> = WithRejection<Path<T>, AppError>;

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Authentication("Missing or invalid authorization header".to_string()))?;

        let claims = UserClaims::from_token(bearer.token(), &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Home page counters
        .route("/dashboard", get(dashboard::get_dashboard))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/new", get(books::new_book_form))
        .route(
            "/books/:id",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        .route("/books/:id/edit", get(books::edit_book_form))
        .route("/books/:id/delete", get(books::confirm_delete_book))
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route("/authors/new", get(authors::new_author_form))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        .route("/authors/:id/edit", get(authors::edit_author_form))
        .route("/authors/:id/delete", get(authors::confirm_delete_author))
        // Genres
        .route("/genres", get(genres::list_genres))
        // Loans
        .route("/loans", get(loans::list_all_loans))
        .route("/loans/mine", get(loans::list_my_loans))
        .route(
            "/instances/:id/renew",
            get(renewal::renewal_form).post(renewal::renew_instance),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}

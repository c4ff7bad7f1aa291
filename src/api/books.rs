//! Book endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookDetails, BookForm},
        pagination::{BookPage, PageQuery},
        user::Permission,
        DeleteConfirmation,
    },
    AppState,
};

use super::{AuthenticatedUser, FormBody, IdPath};

/// List books by title, ten per page
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of books", body = BookPage),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<BookPage>> {
    let page = state.services.catalog.list_books(query.page).await?;
    Ok(Json(page))
}

/// Get book details with author, genres and copies
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    WithRejection(Path(id), _): IdPath<i32>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Blank book form
#[utoipa::path(
    get,
    path = "/books/new",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Empty form", body = BookForm),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing add_book permission")
    )
)]
pub async fn new_book_form(AuthenticatedUser(claims): AuthenticatedUser) -> AppResult<Json<BookForm>> {
    claims.require(Permission::AddBook)?;
    Ok(Json(BookForm::default()))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookForm,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "ISBN already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    FormBody(form): FormBody<BookForm>,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require(Permission::AddBook)?;

    let created = state.services.catalog.create_book(form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Book form pre-filled from the stored record
#[utoipa::path(
    get,
    path = "/books/{id}/edit",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Pre-filled form", body = BookForm),
        (status = 404, description = "Book not found")
    )
)]
pub async fn edit_book_form(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    WithRejection(Path(id), _): IdPath<i32>,
) -> AppResult<Json<BookForm>> {
    claims.require(Permission::ChangeBook)?;

    let form = state.services.catalog.book_form(id).await?;
    Ok(Json(form))
}

/// Update an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookForm,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    WithRejection(Path(id), _): IdPath<i32>,
    FormBody(form): FormBody<BookForm>,
) -> AppResult<Json<Book>> {
    claims.require(Permission::ChangeBook)?;

    let updated = state.services.catalog.update_book(id, form).await?;
    Ok(Json(updated))
}

/// What deleting this book would involve
#[utoipa::path(
    get,
    path = "/books/{id}/delete",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book label and copies blocking deletion", body = DeleteConfirmation),
        (status = 404, description = "Book not found")
    )
)]
pub async fn confirm_delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    WithRejection(Path(id), _): IdPath<i32>,
) -> AppResult<Json<DeleteConfirmation>> {
    claims.require(Permission::DeleteBook)?;

    let confirmation = state.services.catalog.book_delete_confirmation(id).await?;
    Ok(Json(confirmation))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Copies still reference the book", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    WithRejection(Path(id), _): IdPath<i32>,
) -> AppResult<StatusCode> {
    claims.require(Permission::DeleteBook)?;

    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

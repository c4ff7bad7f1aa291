//! Author endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetails, AuthorForm},
        pagination::{AuthorPage, PageQuery},
        user::Permission,
        DeleteConfirmation,
    },
    AppState,
};

use super::{AuthenticatedUser, FormBody, IdPath};

/// List authors by name, five per page
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of authors", body = AuthorPage),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<AuthorPage>> {
    let page = state.services.catalog.list_authors(query.page).await?;
    Ok(Json(page))
}

/// Get author with their books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetails),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    WithRejection(Path(id), _): IdPath<i32>,
) -> AppResult<Json<AuthorDetails>> {
    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

#[utoipa::path(
    get,
    path = "/authors/new",
    tag = "authors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Empty form", body = AuthorForm),
        (status = 403, description = "Missing add_author permission")
    )
)]
pub async fn new_author_form(AuthenticatedUser(claims): AuthenticatedUser) -> AppResult<Json<AuthorForm>> {
    claims.require(Permission::AddAuthor)?;
    Ok(Json(AuthorForm::default()))
}

#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorForm,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    FormBody(form): FormBody<AuthorForm>,
) -> AppResult<(StatusCode, Json<Author>)> {
    claims.require(Permission::AddAuthor)?;

    let created = state.services.catalog.create_author(form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/authors/{id}/edit",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Pre-filled form", body = AuthorForm),
        (status = 404, description = "Author not found")
    )
)]
pub async fn edit_author_form(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    WithRejection(Path(id), _): IdPath<i32>,
) -> AppResult<Json<AuthorForm>> {
    claims.require(Permission::ChangeAuthor)?;

    let form = state.services.catalog.author_form(id).await?;
    Ok(Json(form))
}

#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = AuthorForm,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    WithRejection(Path(id), _): IdPath<i32>,
    FormBody(form): FormBody<AuthorForm>,
) -> AppResult<Json<Author>> {
    claims.require(Permission::ChangeAuthor)?;

    let updated = state.services.catalog.update_author(id, form).await?;
    Ok(Json(updated))
}

/// What deleting this author would involve
#[utoipa::path(
    get,
    path = "/authors/{id}/delete",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author label and books blocking deletion", body = DeleteConfirmation),
        (status = 404, description = "Author not found")
    )
)]
pub async fn confirm_delete_author(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    WithRejection(Path(id), _): IdPath<i32>,
) -> AppResult<Json<DeleteConfirmation>> {
    claims.require(Permission::DeleteAuthor)?;

    let confirmation = state.services.catalog.author_delete_confirmation(id).await?;
    Ok(Json(confirmation))
}

/// Delete an author
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Books still reference the author", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    WithRejection(Path(id), _): IdPath<i32>,
) -> AppResult<StatusCode> {
    claims.require(Permission::DeleteAuthor)?;

    state.services.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

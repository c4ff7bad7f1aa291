//! Renewal endpoints

use axum::{
    extract::{Path, State},
    http::{header::LOCATION, HeaderName, StatusCode},
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::instance::{BookInstance, RenewalForm, RenewalFormView},
    AppState,
};

use super::{AuthenticatedUser, FormBody, IdPath};

/// Where a successful renewal sends the client
const RENEWED_REDIRECT: &str = "/api/v1/loans";

/// Renewal form for one copy, proposing a date three weeks out
#[utoipa::path(
    get,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Copy and proposed renewal date", body = RenewalFormView),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing can_mark_returned permission"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renewal_form(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    WithRejection(Path(id), _): IdPath<Uuid>,
) -> AppResult<Json<RenewalFormView>> {
    claims.require_mark_returned()?;

    let view = state.services.renewal.render_form(id).await?;
    Ok(Json(view))
}

/// Set a new due date for one copy
#[utoipa::path(
    post,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = RenewalForm,
    responses(
        (status = 303, description = "Renewed, see all loans", body = BookInstance),
        (status = 400, description = "Date refused", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing can_mark_returned permission"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew_instance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    WithRejection(Path(id), _): IdPath<Uuid>,
    FormBody(form): FormBody<RenewalForm>,
) -> AppResult<(StatusCode, [(HeaderName, &'static str); 1], Json<BookInstance>)> {
    claims.require_mark_returned()?;

    let instance = state.services.renewal.submit(id, &form).await?;
    Ok((StatusCode::SEE_OTHER, [(LOCATION, RENEWED_REDIRECT)], Json(instance)))
}

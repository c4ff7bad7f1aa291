//! Loan listing endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::pagination::{LoanPage, PageQuery},
    AppState,
};

use super::AuthenticatedUser;

/// Copies on loan to the current user, soonest due first
#[utoipa::path(
    get,
    path = "/loans/mine",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "The caller's active loans", body = LoanPage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_my_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<LoanPage>> {
    let loans = state
        .services
        .loans
        .list_for_borrower(claims.user_id, query.page)
        .await?;
    Ok(Json(loans))
}

/// Every copy currently on loan (librarians only)
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "All active loans", body = LoanPage),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing can_mark_returned permission")
    )
)]
pub async fn list_all_loans(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<LoanPage>> {
    claims.require_mark_returned()?;

    let loans = state.services.loans.list_all_active(query.page).await?;
    Ok(Json(loans))
}

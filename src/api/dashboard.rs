//! Home page counters

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use crate::{error::AppResult, services::dashboard::DashboardCounts, AppState};

/// Catalog counters plus the number of earlier visits in this session
///
/// A session cookie is issued when the request carries none.
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    responses(
        (status = 200, description = "Catalog counters", body = DashboardCounts),
        (status = 500, description = "Store or session backend failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<DashboardCounts>)> {
    let cookie_name = state.config.session.cookie_name.clone();

    let existing = jar.get(&cookie_name).map(|c| c.value().to_string());

    let (jar, session_id) = match existing {
        Some(id) => (jar, id),
        None => {
            let id = Uuid::new_v4().to_string();
            let cookie = Cookie::build((cookie_name, id.clone()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            (jar.add(cookie), id)
        }
    };

    let counts = state.services.dashboard.compute_counts(&session_id).await?;
    Ok((jar, Json(counts)))
}

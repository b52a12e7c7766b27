//! Page data loaders.
//!
//! Every page gets the root layout data (`session` and the raw `cookies`)
//! merged with its own fields. Loaders in the authenticated area run behind
//! `guard::require_user`, so by the time they execute the session has been
//! resolved and memoised for the request.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use super::hooks::{Locals, UpstreamHeaders, session_failure};
use crate::services::columns::{COLUMNS, ColumnDef, MaterialCells, render_cells};
use crate::services::cookies::RequestCookie;
use crate::services::material::{Material, to_material};
use crate::services::session::SafeSession;
use crate::supabase::types::{Session, User};
use crate::state::AppState;

/// Root layout data shared by every page.
#[derive(Debug, Serialize)]
pub struct PageData<T: Serialize> {
    pub session: Option<Session>,
    pub cookies: Vec<RequestCookie>,
    #[serde(flatten)]
    pub page: T,
}

#[derive(Debug, Default, Serialize)]
pub struct Empty {}

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct DrawingsPage {
    pub materials: Vec<Material>,
    pub columns: &'static [ColumnDef],
    pub rows: Vec<MaterialCells>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl DrawingsPage {
    fn new(materials: Vec<Material>, user: Option<User>) -> Self {
        let rows = materials.iter().map(render_cells).collect();
        Self { materials, columns: COLUMNS, rows, user }
    }
}

#[derive(Debug, Serialize)]
pub struct DrawingPage {
    pub id: String,
}

/// Resolve the session and wrap `page` in the root layout data.
async fn with_layout<T: Serialize>(
    state: &AppState,
    locals: &Locals,
    page: impl FnOnce(&SafeSession) -> T,
) -> Result<PageData<T>, Response> {
    let resolved = locals
        .0
        .safe_get_session(state)
        .await
        .map_err(session_failure)?;
    Ok(PageData {
        session: resolved.session().cloned(),
        cookies: locals.0.cookies().get_all(),
        page: page(resolved),
    })
}

/// `GET /`: root layout only; runs whether or not anyone is signed in.
pub async fn root(State(state): State<AppState>, locals: Locals) -> Response {
    match with_layout(&state, &locals, |_| Empty::default()).await {
        Ok(data) => Json(data).into_response(),
        Err(response) => response,
    }
}

/// `GET /login`
pub async fn login(State(state): State<AppState>, locals: Locals) -> Response {
    match with_layout(&state, &locals, |_| Empty::default()).await {
        Ok(data) => Json(data).into_response(),
        Err(response) => response,
    }
}

/// `GET /home`
pub async fn home(State(state): State<AppState>, locals: Locals) -> Response {
    let data = with_layout(&state, &locals, |resolved| resolved.user().cloned()).await;
    match data {
        Ok(PageData { session, cookies, page: Some(user) }) => {
            Json(PageData { session, cookies, page: HomePage { user } }).into_response()
        }
        // The layout guard already redirected anonymous requests.
        Ok(_) => super::guard::redirect_to_login(),
        Err(response) => response,
    }
}

/// `GET /drawings`: materials table, newest first.
///
/// A failed query degrades to an empty table rather than an error page.
pub async fn drawings(State(state): State<AppState>, locals: Locals) -> Response {
    let resolved = match locals.0.safe_get_session(&state).await {
        Ok(resolved) => resolved,
        Err(e) => return session_failure(e),
    };
    let Some((session, user)) = resolved.principal() else {
        return super::guard::redirect_to_login();
    };

    let (page, upstream) = match state.materials.list_materials(&session.access_token).await {
        Ok(fetched) => {
            let materials = fetched.data.into_iter().map(to_material).collect();
            (DrawingsPage::new(materials, Some(user.clone())), fetched.headers)
        }
        Err(e) => {
            tracing::error!(error = %e, "error fetching materials");
            (DrawingsPage::new(Vec::new(), None), axum::http::HeaderMap::new())
        }
    };

    let data = PageData { session: Some(session.clone()), cookies: locals.0.cookies().get_all(), page };
    let mut response = Json(data).into_response();
    response
        .extensions_mut()
        .insert(UpstreamHeaders(upstream));
    response
}

/// `GET /drawing/{id}`
pub async fn drawing(State(state): State<AppState>, locals: Locals, Path(id): Path<String>) -> Response {
    match with_layout(&state, &locals, |_| DrawingPage { id }).await {
        Ok(data) => Json(data).into_response(),
        Err(response) => response,
    }
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;

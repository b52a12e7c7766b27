//! Material actions on the drawings page: create and delete.
//!
//! Actions are not behind the layout guard; each checks the session itself
//! and answers `401` instead of redirecting.

use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::Form;
use serde::{Deserialize, Serialize};

use super::hooks::{Locals, session_failure};
use crate::services::material::{Material, parse_material_id, to_material};
use crate::supabase::types::NewMaterial;
use crate::state::AppState;

/// Action outcome, mirrored in the HTTP status.
#[derive(Debug, Serialize)]
pub struct ActionResult {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Material>,
}

impl ActionResult {
    fn ok(status: StatusCode, body: Option<Material>) -> Self {
        Self { status: status.as_u16(), error: None, body }
    }

    fn fail(status: StatusCode, error: &'static str) -> Self {
        Self { status: status.as_u16(), error: Some(error), body: None }
    }
}

impl IntoResponse for ActionResult {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteMaterialForm {
    #[serde(default)]
    pub id: Option<String>,
}

/// `POST /drawings/create-material`: insert an untitled, active material.
pub async fn create_material(State(state): State<AppState>, locals: Locals) -> Response {
    let resolved = match locals.0.safe_get_session(&state).await {
        Ok(resolved) => resolved,
        Err(e) => return session_failure(e),
    };
    let Some((session, user)) = resolved.principal() else {
        return ActionResult::fail(StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    };

    let new_material = NewMaterial::untitled(user.id);
    match state
        .materials
        .insert_material(&session.access_token, &new_material)
        .await
    {
        Ok(row) => ActionResult::ok(StatusCode::CREATED, Some(to_material(row))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "error creating material");
            ActionResult::fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create material").into_response()
        }
    }
}

/// `POST /drawings/delete-material`: form field `id`.
pub async fn delete_material(
    State(state): State<AppState>,
    locals: Locals,
    form: Result<Form<DeleteMaterialForm>, FormRejection>,
) -> Response {
    let resolved = match locals.0.safe_get_session(&state).await {
        Ok(resolved) => resolved,
        Err(e) => return session_failure(e),
    };
    let Some((session, _)) = resolved.principal() else {
        return ActionResult::fail(StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    };

    let raw_id = form.ok().and_then(|Form(body)| body.id);
    let Some(id) = parse_material_id(raw_id.as_deref()) else {
        return ActionResult::fail(StatusCode::BAD_REQUEST, "Material ID is required").into_response();
    };

    match state
        .materials
        .delete_material(&session.access_token, id)
        .await
    {
        Ok(()) => ActionResult::ok(StatusCode::OK, None).into_response(),
        Err(e) => {
            tracing::error!(error = %e, id, "error deleting material");
            ActionResult::fail(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete material").into_response()
        }
    }
}

#[cfg(test)]
#[path = "materials_test.rs"]
mod tests;

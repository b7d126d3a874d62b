//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the notebook REST endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::web::{auth, capture, middleware::CurrentUser, state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use scrible_core::{FontStyle, NewNotebook, Notebook, NotebookPatch, PaperStyle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        list_notebooks_handler,
        create_notebook_handler,
        get_notebook_handler,
        update_notebook_handler,
        delete_notebook_handler,
        append_text_handler,
        capture::capture_notebook_handler,
        capture::capture_append_handler,
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
    ),
    components(
        schemas(
            NotebookResponse,
            CreateNotebookRequest,
            UpdateNotebookRequest,
            AppendTextRequest,
            HealthResponse,
            ErrorBody,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::AuthResponse,
        )
    ),
    tags(
        (name = "Scrible API", description = "Saved notebooks of text extracted from handwriting.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A notebook as returned to the browser, with its resolved presentation.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotebookResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub text: String,
    pub paper_style: String,
    pub font_style: String,
    /// CSS class for the paper; unknown styles render as `paper-classic`.
    pub paper_class: String,
    pub font_family: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Notebook> for NotebookResponse {
    fn from(notebook: Notebook) -> Self {
        let paper_class = PaperStyle::from_key(&notebook.paper_style).css_class();
        let font_family = FontStyle::from_key(&notebook.font_style)
            .font_family()
            .to_string();
        Self {
            id: notebook.id,
            user_id: notebook.user_id,
            title: notebook.title,
            text: notebook.text,
            paper_style: notebook.paper_style,
            font_style: notebook.font_style,
            paper_class,
            font_family,
            created_at: notebook.created_at,
            updated_at: notebook.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotebookRequest {
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_paper_style")]
    pub paper_style: String,
    #[serde(default = "default_font_style")]
    pub font_style: String,
}

pub(crate) fn default_paper_style() -> String {
    PaperStyle::default().key().to_string()
}

pub(crate) fn default_font_style() -> String {
    FontStyle::default().key().to_string()
}

/// Fields to change; omitted fields stay as they are.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotebookRequest {
    pub title: Option<String>,
    pub text: Option<String>,
    pub paper_style: Option<String>,
    pub font_style: Option<String>,
}

impl UpdateNotebookRequest {
    /// A blank title keeps the current one, like the editor's save button.
    fn into_patch(self) -> NotebookPatch {
        NotebookPatch {
            title: self
                .title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            text: self.text,
            paper_style: self.paper_style,
            font_style: self.font_style,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct AppendTextRequest {
    pub text: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Notebook {} not found", id))
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "The service is running", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Scrible API is running",
    })
}

/// List the caller's notebooks in the order they were saved.
#[utoipa::path(
    get,
    path = "/notebooks",
    responses(
        (status = 200, description = "The caller's notebooks", body = [NotebookResponse]),
        (status = 401, description = "Nobody is signed in", body = ErrorBody)
    )
)]
pub async fn list_notebooks_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<NotebookResponse>>> {
    let notebooks = state.notebooks.list_by_owner(&user_id)?;
    Ok(Json(notebooks.into_iter().map(Into::into).collect()))
}

/// Save a new notebook.
#[utoipa::path(
    post,
    path = "/notebooks",
    request_body = CreateNotebookRequest,
    responses(
        (status = 201, description = "Notebook saved", body = NotebookResponse),
        (status = 401, description = "Nobody is signed in", body = ErrorBody)
    )
)]
pub async fn create_notebook_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(req): Json<CreateNotebookRequest>,
) -> ApiResult<impl IntoResponse> {
    let notebook = state.notebooks.create(
        &user_id,
        NewNotebook {
            title: req.title,
            text: req.text,
            paper_style: req.paper_style,
            font_style: req.font_style,
        },
    )?;
    Ok((StatusCode::CREATED, Json(NotebookResponse::from(notebook))))
}

/// Fetch one of the caller's notebooks.
#[utoipa::path(
    get,
    path = "/notebooks/{id}",
    params(("id" = String, Path, description = "Notebook id")),
    responses(
        (status = 200, description = "The notebook", body = NotebookResponse),
        (status = 404, description = "No such notebook for this user", body = ErrorBody)
    )
)]
pub async fn get_notebook_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<NotebookResponse>> {
    let notebook = state
        .notebooks
        .get_by_id(&id, &user_id)?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(notebook.into()))
}

/// Change some fields of a notebook.
#[utoipa::path(
    patch,
    path = "/notebooks/{id}",
    params(("id" = String, Path, description = "Notebook id")),
    request_body = UpdateNotebookRequest,
    responses(
        (status = 200, description = "The updated notebook", body = NotebookResponse),
        (status = 404, description = "No such notebook for this user", body = ErrorBody)
    )
)]
pub async fn update_notebook_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateNotebookRequest>,
) -> ApiResult<Json<NotebookResponse>> {
    let notebook = state
        .notebooks
        .update(&id, &user_id, req.into_patch())?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(notebook.into()))
}

/// Delete a notebook. Deleting a missing notebook also succeeds.
#[utoipa::path(
    delete,
    path = "/notebooks/{id}",
    params(("id" = String, Path, description = "Notebook id")),
    responses((status = 204, description = "The notebook is gone"))
)]
pub async fn delete_notebook_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.notebooks.delete(&id, &user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Append text below a stamped separator. Blank text leaves the notebook as is.
#[utoipa::path(
    post,
    path = "/notebooks/{id}/append",
    params(("id" = String, Path, description = "Notebook id")),
    request_body = AppendTextRequest,
    responses(
        (status = 200, description = "The notebook after the append", body = NotebookResponse),
        (status = 404, description = "No such notebook for this user", body = ErrorBody)
    )
)]
pub async fn append_text_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<AppendTextRequest>,
) -> ApiResult<Json<NotebookResponse>> {
    let notebook = state
        .notebooks
        .append_text(&id, &user_id, &req.text)?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(notebook.into()))
}

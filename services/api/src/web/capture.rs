//! services/api/src/web/capture.rs
//!
//! Upload endpoints: a photo, or the first page of a PDF, is sent to the OCR
//! backend and the extracted text is saved as a new notebook or appended to an
//! existing one. Nothing is written unless extraction succeeds.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use scrible_core::{capture_text, default_title, Clock, NewNotebook, ScanFile};
use std::sync::Arc;
use tracing::info;

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::web::middleware::CurrentUser;
use crate::web::rest::{default_font_style, default_paper_style, NotebookResponse};
use crate::web::state::AppState;

/// The parts of a capture form.
#[derive(Default)]
struct CaptureForm {
    file: Option<ScanFile>,
    title: Option<String>,
    paper_style: Option<String>,
    font_style: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> ApiResult<CaptureForm> {
    let mut form = CaptureForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("capture").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read file bytes: {}", e))
                })?;
                form.file = Some(ScanFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "title" | "paperStyle" | "fontStyle" => {
                let value = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read field {}: {}", name, e))
                })?;
                let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                match name.as_str() {
                    "title" => form.title = value,
                    "paperStyle" => form.paper_style = value,
                    _ => form.font_style = value,
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

fn require_file(form: &CaptureForm) -> ApiResult<&ScanFile> {
    form.file
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))
}

/// Extract text from an upload and save it as a new notebook.
#[utoipa::path(
    post,
    path = "/captures",
    request_body(content_type = "multipart/form-data", description = "`file` plus optional `title`, `paperStyle` and `fontStyle`."),
    responses(
        (status = 201, description = "Notebook saved from the extracted text", body = NotebookResponse),
        (status = 400, description = "No file uploaded", body = ErrorBody),
        (status = 422, description = "Unsupported file, unreadable PDF or no text found", body = ErrorBody),
        (status = 502, description = "The OCR backend failed", body = ErrorBody)
    )
)]
pub async fn capture_notebook_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = read_form(multipart).await?;
    let text = capture_text(
        state.converter.as_ref(),
        state.extractor.as_ref(),
        require_file(&form)?,
    )
    .await?;

    let notebook = state.notebooks.create(
        &user_id,
        NewNotebook {
            title: form
                .title
                .unwrap_or_else(|| default_title(state.clock.now())),
            text,
            paper_style: form.paper_style.unwrap_or_else(default_paper_style),
            font_style: form.font_style.unwrap_or_else(default_font_style),
        },
    )?;
    info!("Saved capture as notebook {}", notebook.id);

    Ok((StatusCode::CREATED, Json(NotebookResponse::from(notebook))))
}

/// Extract text from an upload and append it to an existing notebook.
#[utoipa::path(
    post,
    path = "/notebooks/{id}/capture",
    params(("id" = String, Path, description = "Notebook id")),
    request_body(content_type = "multipart/form-data", description = "The `file` to extract text from."),
    responses(
        (status = 200, description = "The notebook after the append", body = NotebookResponse),
        (status = 404, description = "No such notebook for this user", body = ErrorBody),
        (status = 422, description = "Unsupported file, unreadable PDF or no text found", body = ErrorBody),
        (status = 502, description = "The OCR backend failed", body = ErrorBody)
    )
)]
pub async fn capture_append_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<NotebookResponse>> {
    // Ownership is checked before any OCR round trip.
    if state.notebooks.get_by_id(&id, &user_id)?.is_none() {
        return Err(ApiError::NotFound(format!("Notebook {} not found", id)));
    }

    let form = read_form(multipart).await?;
    let text = capture_text(
        state.converter.as_ref(),
        state.extractor.as_ref(),
        require_file(&form)?,
    )
    .await?;

    let notebook = state
        .notebooks
        .append_text(&id, &user_id, &text)?
        .ok_or_else(|| ApiError::NotFound(format!("Notebook {} not found", id)))?;
    Ok(Json(notebook.into()))
}

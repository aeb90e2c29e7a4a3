//! Project endpoints.

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::warn;
use uuid::Uuid;

use super::error::from_rejection;
use super::{AppState, Caller};
use crate::error::{Error, Result};
use crate::types::ProjectUpdate;

const NAME_FIELD: &str = "ProjectName";
const ARCHIVE_FIELD: &str = "ProjectArchive";

/// Fields read from an upload form.
#[derive(Debug, Default)]
struct UploadForm {
    name: Option<String>,
    archive: Option<Vec<u8>>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Multipart parsing error: {}", e);
        from_rejection(e.status(), e.body_text())
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            NAME_FIELD => {
                form.name = Some(field.text().await.map_err(|e| {
                    warn!("Error reading {} field: {}", NAME_FIELD, e);
                    from_rejection(e.status(), e.body_text())
                })?);
            }
            ARCHIVE_FIELD => {
                let bytes = field.bytes().await.map_err(|e| {
                    warn!("Error reading {} field: {}", ARCHIVE_FIELD, e);
                    from_rejection(e.status(), e.body_text())
                })?;
                form.archive = Some(bytes.to_vec());
            }
            _ => {
                warn!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    Ok(form)
}

fn project_id(path: std::result::Result<Path<Uuid>, PathRejection>) -> Result<Uuid> {
    path.map(|Path(id)| id)
        .map_err(|_| Error::BadRequest("Invalid project id".to_string()))
}

/// `POST /projects/upload`
pub async fn upload(
    State(state): State<AppState>,
    Caller(caller): Caller,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let form = read_form(multipart).await?;

    let name = form
        .name
        .ok_or_else(|| Error::BadRequest(format!("{} is required", NAME_FIELD)))?;
    let archive = form.archive.unwrap_or_default();

    let record = state.artifacts.create(&name, &archive, caller).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /projects/{id}`
pub async fn get_project(
    State(state): State<AppState>,
    Caller(caller): Caller,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse> {
    let id = project_id(path)?;
    let record = state.artifacts.get(id, caller).await?;
    Ok(Json(record))
}

/// `PATCH /projects/{id}/data`
pub async fn update_data(
    State(state): State<AppState>,
    Caller(caller): Caller,
    path: std::result::Result<Path<Uuid>, PathRejection>,
    body: std::result::Result<Json<ProjectUpdate>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let id = project_id(path)?;
    let Json(update) = body.map_err(|e| {
        warn!("Rejected metadata update body: {}", e);
        from_rejection(e.status(), e.body_text())
    })?;

    let record = state.artifacts.update_metadata(id, update, caller).await?;
    Ok(Json(record))
}

/// `PATCH /projects/{id}/files`
pub async fn update_files(
    State(state): State<AppState>,
    Caller(caller): Caller,
    path: std::result::Result<Path<Uuid>, PathRejection>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let id = project_id(path)?;
    let form = read_form(multipart).await?;
    let archive = form.archive.unwrap_or_default();

    let record = state.artifacts.update_archive(id, &archive, caller).await?;
    Ok(Json(record))
}

/// `GET /projects/{id}/files`
pub async fn download(
    State(state): State<AppState>,
    Caller(caller): Caller,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse> {
    let id = project_id(path)?;
    let artifact = state.artifacts.read(id, caller).await?;

    let disposition = format!(
        "attachment; filename=\"{}.zip\"",
        attachment_name(&artifact.record.project.name)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    ))
}

/// Make a project name safe to embed in a quoted header value.
fn attachment_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' | '/' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}

use crate::api::error::AppError;
use crate::models::UploadResponse;
use crate::utils::validation::{sanitize_filename, validate_part_size};
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError},
    },
    http::StatusCode,
};
use bytes::{Bytes, BytesMut};

struct ReceivedPart {
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Reads a part chunk by chunk, failing as soon as it grows past `max_size`.
async fn read_part(mut field: Field<'_>, max_size: usize) -> Result<Bytes, AppError> {
    let mut data = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        validate_part_size(data.len() + chunk.len(), max_size)
            .map_err(|e| AppError::PayloadTooLarge(e.to_string()))?;
        data.extend_from_slice(&chunk);
    }
    Ok(data.freeze())
}

#[utoipa::path(
    post,
    path = "/upload_file",
    request_body(content = Multipart, description = "One or more files under the configured field name"),
    responses(
        (status = 200, description = "Files stored", body = UploadResponse),
        (status = 413, description = "A part exceeds the per-part size limit"),
        (status = 422, description = "No file part under the configured field name, or a plain value under it")
    ),
    tag = "files"
)]
pub async fn upload_files(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let config = &state.config;
    let mut received = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name != config.field_name {
            tracing::debug!("Skipping multipart field '{}'", name);
            continue;
        }

        let Some(original_filename) = field.file_name().map(|s| s.to_string()) else {
            return Err(AppError::Unprocessable(format!(
                "Field '{}' must carry a file, not a plain value",
                name
            )));
        };
        let content_type = field.content_type().map(|s| s.to_string());

        let filename = sanitize_filename(&original_filename)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let data = read_part(field, config.max_part_size).await?;

        received.push(ReceivedPart {
            filename,
            content_type,
            data,
        });
    }

    if received.is_empty() {
        return Err(AppError::Unprocessable(format!(
            "No file provided under field '{}'",
            config.field_name
        )));
    }

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    for part in &received {
        let path = config.upload_dir.join(&part.filename);
        tokio::fs::write(&path, &part.data).await?;
        tracing::info!("Stored {} ({} bytes)", path.display(), part.data.len());
    }

    Ok(Json(UploadResponse {
        filename: received.iter().map(|p| p.filename.clone()).collect(),
        content_type: received.into_iter().map(|p| p.content_type).collect(),
    }))
}

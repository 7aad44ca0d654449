use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use tracing::info;

use crate::common::error::{AppError, AppResult};
use crate::common::upload::stream_to_disk;
use crate::modules::upload::model::UploadedAsset;
use crate::modules::upload::service::UploadService;
use crate::state::AppState;

/// POST /upload. Accepts one multipart `video` field, persists it under a
/// fresh id, and blocks until the rendition set is encoded. The body limit
/// layer caps the stream while it is read; the Content-Length check here
/// lets an honestly-declared oversized body fail before a single byte of it
/// is written anywhere.
pub async fn upload_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    reject_declared_oversize(&headers, state.config.max_upload_bytes)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::client(format!("cannot read multipart body: {e}")))?
    {
        if field.name() != Some("video") {
            continue;
        }
        let client_filename = field.file_name().unwrap_or_default().to_string();
        let asset = UploadedAsset::new(&state.config.raw_dir, &client_filename)?;
        info!("upload '{client_filename}' accepted as asset {}", asset.id);

        let written = stream_to_disk(field, &asset.raw_storage_path).await?;
        info!("asset {}: {written} bytes stored", asset.id);

        let stream_url = UploadService::transcode(&state, &asset).await?;
        return Ok((
            StatusCode::OK,
            format!(
                "File uploaded and encoded. Video ID: {}, Stream URL: {}",
                asset.id, stream_url
            ),
        ));
    }

    Err(AppError::client("missing 'video' field in multipart request"))
}

fn reject_declared_oversize(headers: &HeaderMap, ceiling: usize) -> AppResult<()> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    match declared {
        Some(len) if len > ceiling as u64 => Err(AppError::client(format!(
            "upload exceeds the {} byte limit",
            ceiling
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_oversize_is_rejected_a_byte_over_the_ceiling() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_LENGTH, "1001".parse().unwrap());
        assert!(reject_declared_oversize(&headers, 1000).is_err());

        headers.insert(header::CONTENT_LENGTH, "1000".parse().unwrap());
        assert!(reject_declared_oversize(&headers, 1000).is_ok());
    }

    #[test]
    fn chunked_bodies_pass_the_header_check() {
        // no Content-Length at all; the streaming limit still applies
        assert!(reject_declared_oversize(&HeaderMap::new(), 1000).is_ok());
    }
}

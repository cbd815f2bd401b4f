use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::Result;
use crate::state::AppState;

/// Serves a stored object with the content type and cache directive it was
/// uploaded with.
pub async fn serve_object(
    State(state): State<AppState>,
    Path((bucket, path)): Path<(String, String)>,
) -> Result<Response> {
    let (object, bytes) = state
        .blobs
        .download(&bucket, path.trim_start_matches('/'))
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, object.content_type),
            (header::CACHE_CONTROL, object.cache_control),
        ],
        bytes,
    )
        .into_response())
}

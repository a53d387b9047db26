use axum::{
    body::Body,
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::error::ApiError;
use crate::state::AppState;

// Runs when the bundle has no file for the path: hand back the UI's root
// page so client side routes resolve, or a JSON 404 when no bundle is built.
pub async fn index_fallback(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let index = state.static_dir.join("index.html");

    if tokio::fs::try_exists(&index).await.unwrap_or(false) {
        let Ok(res) = ServeFile::new(index).oneshot(request).await;
        return res.map(Body::new);
    }

    ApiError::NotFound.into_response()
}

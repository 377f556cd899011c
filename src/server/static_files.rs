//! Theme static files

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use super::{SharedState, STATIC_CACHE};
use crate::assets::AssetError;

/// Serve `themes/<theme>/static/<path>`, falling back to the default theme
pub(super) async fn serve(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(path): Path<String>,
) -> Response {
    let theme = state.theme_for(&headers);
    let path = path.trim_start_matches('/');
    let store = state.assets.store();

    let found = store
        .read(&format!("themes/{}/static/{}", theme, path))
        .or_else(|_| {
            store.read(&format!(
                "themes/{}/static/{}",
                state.themes.default_theme(),
                path
            ))
        });

    match found {
        Ok(bytes) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [
                    (header::CONTENT_TYPE, mime.to_string()),
                    (header::CACHE_CONTROL, STATIC_CACHE.to_string()),
                ],
                bytes.into_owned(),
            )
                .into_response()
        }
        Err(AssetError::NotFound(_)) | Err(AssetError::InvalidPath(_)) => {
            (StatusCode::NOT_FOUND, "404 Not Found").into_response()
        }
        Err(e) => {
            tracing::error!("Failed to read static file {:?}: {}", path, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error").into_response()
        }
    }
}

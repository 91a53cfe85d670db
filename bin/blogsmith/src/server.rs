//! Static file server for live mode

use std::path::Path;

use axum::{Router, http::StatusCode};
use tower_http::{
    services::{ServeDir, ServeFile},
    set_status::SetStatus,
};

/// Name of the generated not-found page inside the output directory.
pub const NOT_FOUND_PAGE: &str = "404.html";

/// Create the preview server router.
///
/// The output directory is mounted under `base_path` so generated links
/// resolve the same way they do in production. Unknown paths, inside or
/// outside the base path, get the generated 404 page with a 404 status.
pub fn create_router(output_dir: &Path, base_path: &str) -> Router {
    let not_found = output_dir.join(NOT_FOUND_PAGE);
    let serve = ServeDir::new(output_dir).not_found_service(ServeFile::new(&not_found));

    if base_path.is_empty() {
        tracing::debug!(dir = %output_dir.display(), "serving output at /");
        return Router::new().fallback_service(serve);
    }

    tracing::debug!(dir = %output_dir.display(), base_path, "serving output under base path");
    Router::new()
        .nest_service(base_path, serve)
        .fallback_service(SetStatus::new(
            ServeFile::new(not_found),
            StatusCode::NOT_FOUND,
        ))
}

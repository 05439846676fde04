// src/web/file_handlers.rs
use crate::core::BlobStore;
use crate::web::types::ApiError;
use rocket::http::ContentType;
use rocket::State;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Serve a stored object. Public URLs handed out at upload time point here.
pub async fn get_file_handler(
    path: PathBuf,
    store: &State<BlobStore>,
) -> Result<(ContentType, Vec<u8>), ApiError> {
    let key = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");

    let bytes = store.download(&key).await.map_err(|e| {
        warn!("File request for {} failed: {}", key, e);
        ApiError::from(e)
    })?;

    let content_type = crate::utils::get_file_extension(&key)
        .and_then(|ext| ContentType::from_extension(&ext))
        .unwrap_or(ContentType::Binary);

    debug!("Serving {} ({} bytes)", key, bytes.len());
    Ok((content_type, bytes))
}

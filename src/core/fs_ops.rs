// src/core/fs_ops.rs
//! Small async file system helpers shared by config and storage code.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::info;

pub struct FsOps;

impl FsOps {
    /// Create the directory and its parents if missing.
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }

    /// Remove a file, treating "already gone" as success.
    pub async fn remove_file_if_exists(path: &Path) -> Result<bool> {
        match fs::remove_file(path).await {
            Ok(()) => {
                info!("Removed file: {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove file: {}", path.display()))
            }
        }
    }
}

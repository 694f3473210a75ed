use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::{
    config::StorageConfig,
    error::{AppError, Result},
    integrations::BlobStorage,
};

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// 10 MB
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Lowercased extension of `filename` if it is an accepted image type.
pub fn image_extension(filename: &str) -> Result<String> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .ok_or_else(|| AppError::Validation("Invalid filename".to_string()))?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::Validation(format!(
            "Invalid file type. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    Ok(extension)
}

/// Writes uploads under a local directory that the server exposes at `public_base_url`.
pub struct LocalBlobStorage {
    uploads_dir: PathBuf,
    public_base_url: String,
}

impl LocalBlobStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            uploads_dir: PathBuf::from(&config.uploads_dir),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    fn name(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> Result<()> {
        fs::create_dir_all(&self.uploads_dir)
            .await
            .map_err(|e| AppError::Integration(format!("Uploads directory unavailable: {}", e)))
    }

    async fn store(&self, filename: &str, data: &[u8]) -> Result<String> {
        if data.is_empty() {
            return Err(AppError::Validation("File is empty".to_string()));
        }
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::Validation("File too large (max 10 MB)".to_string()));
        }
        let extension = image_extension(filename)?;

        fs::create_dir_all(&self.uploads_dir).await.map_err(|e| {
            AppError::Internal(format!("Failed to create uploads directory: {}", e))
        })?;

        let stored_name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.uploads_dir.join(&stored_name);

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create file: {}", e)))?;
        file.write_all(data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write file: {}", e)))?;

        tracing::debug!("Stored upload {} ({} bytes)", stored_name, data.len());
        Ok(format!("{}/{}", self.public_base_url, stored_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("Fern.JPG").unwrap(), "jpg");
        assert!(image_extension("notes.txt").is_err());
        assert!(image_extension("no-extension").is_err());
    }

    #[tokio::test]
    async fn test_store_returns_public_url() {
        let dir = std::env::temp_dir().join(format!("verdant-uploads-{}", Uuid::new_v4()));
        let storage = LocalBlobStorage::new(&StorageConfig {
            uploads_dir: dir.to_string_lossy().to_string(),
            public_base_url: "http://localhost:8080/uploads/".to_string(),
        });

        let url = storage.store("leaf.png", b"not really a png").await.unwrap();
        assert!(url.starts_with("http://localhost:8080/uploads/"));
        assert!(url.ends_with(".png"));

        let stored = url.rsplit('/').next().unwrap();
        assert!(dir.join(stored).exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}

//! Multipart form reading and storage of uploaded files.
//!
//! Forms are read fully before anything touches the disk: callers validate
//! the text fields and the file, and only then call [`store_file`].

use std::collections::HashMap;
use std::path::Path;

use actix_multipart::Multipart;
use futures_util::StreamExt;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Upper bound for a text field of a multipart form.
const MAX_TEXT_FIELD: usize = 64 * 1024;

/// A file part held in memory.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Lowercased extension of the client filename.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.filename)
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Text fields and the first file part of a form.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl MultipartForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn require_file(&mut self) -> AppResult<UploadedFile> {
        self.file
            .take()
            .filter(|f| !f.bytes.is_empty())
            .ok_or_else(|| AppError::InvalidInput("Aucun fichier reçu".into()))
    }
}

/// Read a multipart payload. Extra file parts are drained and ignored.
pub async fn read_multipart(payload: &mut Multipart, max_file_size: usize) -> AppResult<MultipartForm> {
    let mut form = MultipartForm::default();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;
        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| AppError::InvalidInput("Missing content disposition".to_string()))?;
        let name = content_disposition.get_name().unwrap_or_default().to_string();
        let filename = content_disposition.get_filename().map(str::to_string);

        match filename {
            Some(filename) if form.file.is_none() => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk =
                        chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
                    if bytes.len() + chunk.len() > max_file_size {
                        return Err(AppError::PayloadTooLarge(format!(
                            "{} dépasse la taille maximale de {} octets",
                            filename, max_file_size
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                form.file = Some(UploadedFile { filename, bytes });
            }
            Some(_) => drain_field(&mut field).await,
            None => {
                let mut value = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk =
                        chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
                    if value.len() + chunk.len() > MAX_TEXT_FIELD {
                        return Err(AppError::InvalidInput(format!("Champ {} trop long", name)));
                    }
                    value.extend_from_slice(&chunk);
                }
                let value = String::from_utf8(value)
                    .map_err(|_| AppError::InvalidInput(format!("Champ {} invalide", name)))?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

/// Drain a multipart field without saving.
async fn drain_field(field: &mut actix_multipart::Field) {
    while let Some(chunk) = field.next().await {
        let _ = chunk;
    }
}

/// Lowercased extension of `filename`, if any.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .filter(|e| !e.is_empty())
}

/// Keep ASCII letters, digits, `.`, `_` and `-`; strip any directory part.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

/// Write `bytes` under `root/subdir/<prefix>_<uuid>.<extension>` and return
/// the path relative to `root`.
pub async fn store_file(
    root: &Path,
    subdir: &str,
    prefix: &str,
    extension: &str,
    bytes: &[u8],
) -> AppResult<String> {
    let dir = root.join(subdir);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::FileSystem(format!("Failed to create directory: {}", e)))?;

    let name = format!("{}_{}.{}", prefix, Uuid::new_v4().simple(), extension);
    tokio::fs::write(dir.join(&name), bytes)
        .await
        .map_err(|e| AppError::FileSystem(format!("Failed to write {}: {}", name, e)))?;

    info!("Saved {}/{} ({} bytes)", subdir, name, bytes.len());
    Ok(format!("{}/{}", subdir, name))
}

/// Remove a stored file; a missing file is not an error.
pub async fn remove_file(path: &Path) -> AppResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::FileSystem(format!(
            "Failed to remove {}: {}",
            path.display(),
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("Scan.PDF").as_deref(), Some("pdf"));
        assert_eq!(extension_of("archive.sql.gz").as_deref(), Some("gz"));
        assert_eq!(extension_of("sans-extension"), None);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\tmp\\ma sauvegarde.sql.gz"), "ma_sauvegarde.sql.gz");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
    }

    #[actix_rt::test]
    async fn test_store_and_remove_file() {
        let dir = tempfile::tempdir().unwrap();
        let relative = store_file(dir.path(), "photos", "edl", "png", b"img")
            .await
            .unwrap();
        assert!(relative.starts_with("photos/edl_"));
        assert!(relative.ends_with(".png"));

        let absolute = dir.path().join(&relative);
        assert!(absolute.exists());
        remove_file(&absolute).await.unwrap();
        assert!(!absolute.exists());
        remove_file(&absolute).await.unwrap();
    }
}

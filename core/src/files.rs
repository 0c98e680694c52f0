// core/src/files.rs

//! Storage for uploaded images (payment proofs, product previews).

use crate::error::{ShopError, ShopResult};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 << 20;

const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"];

/// An upload as received from a client, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
  pub file_name: String,
  pub content_type: String,
  pub bytes: Vec<u8>,
}

impl UploadedFile {
  pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
    Self {
      file_name: file_name.into(),
      content_type: content_type.into(),
      bytes,
    }
  }

  /// Extension including the dot, taken from the file name, or derived from
  /// the content type when the name has none.
  fn extension(&self) -> String {
    if let Some(ext) = Path::new(&self.file_name).extension().and_then(|e| e.to_str()) {
      return format!(".{}", ext.to_ascii_lowercase());
    }
    match self.content_type.as_str() {
      "image/jpeg" | "image/jpg" => ".jpg",
      "image/png" => ".png",
      "image/gif" => ".gif",
      "image/webp" => ".webp",
      _ => "",
    }
    .to_string()
  }
}

pub fn validate_image(file: &UploadedFile, max_bytes: usize) -> ShopResult<()> {
  if file.bytes.is_empty() {
    return Err(ShopError::validation("file is empty"));
  }
  if file.bytes.len() > max_bytes {
    return Err(ShopError::validation(format!(
      "file size exceeds maximum limit of {}MB",
      max_bytes >> 20
    )));
  }
  let content_type = file.content_type.trim().to_ascii_lowercase();
  if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
    return Err(ShopError::validation("invalid file type. Only images are allowed"));
  }
  Ok(())
}

fn unique_file_name(file: &UploadedFile) -> String {
  format!("{}_{}{}", Uuid::new_v4(), Utc::now().timestamp(), file.extension())
}

#[async_trait]
pub trait FileStore: Send + Sync {
  /// Validates and persists `file` under `folder`, returning its stored path.
  async fn store(&self, folder: &str, file: &UploadedFile) -> ShopResult<String>;
  /// Deleting a path that does not exist is not an error.
  async fn delete(&self, path: &str) -> ShopResult<()>;
}

/// Writes files below a root directory on the local filesystem.
pub struct LocalFileStore {
  root: PathBuf,
  max_bytes: usize,
}

impl LocalFileStore {
  pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
    Self {
      root: root.into(),
      max_bytes,
    }
  }
}

#[async_trait]
impl FileStore for LocalFileStore {
  async fn store(&self, folder: &str, file: &UploadedFile) -> ShopResult<String> {
    validate_image(file, self.max_bytes)?;
    let dir = self.root.join(folder);
    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join(unique_file_name(file));
    tokio::fs::write(&path, &file.bytes).await?;
    let stored = path.to_string_lossy().replace('\\', "/");
    debug!(path = %stored, bytes = file.bytes.len(), "Stored upload.");
    Ok(stored)
  }

  async fn delete(&self, path: &str) -> ShopResult<()> {
    if path.is_empty() {
      return Ok(());
    }
    match tokio::fs::remove_file(path).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => {
        warn!(path, error = %e, "Failed to delete stored file.");
        Err(e.into())
      }
    }
  }
}

/// Keeps uploads in memory. Used by tests and local runs without a disk.
pub struct MemoryFileStore {
  files: Mutex<HashMap<String, Vec<u8>>>,
  max_bytes: usize,
}

impl MemoryFileStore {
  pub fn new(max_bytes: usize) -> Self {
    Self {
      files: Mutex::new(HashMap::new()),
      max_bytes,
    }
  }

  pub fn contains(&self, path: &str) -> bool {
    self.files.lock().contains_key(path)
  }

  pub fn len(&self) -> usize {
    self.files.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.files.lock().is_empty()
  }
}

impl Default for MemoryFileStore {
  fn default() -> Self {
    Self::new(DEFAULT_MAX_UPLOAD_BYTES)
  }
}

#[async_trait]
impl FileStore for MemoryFileStore {
  async fn store(&self, folder: &str, file: &UploadedFile) -> ShopResult<String> {
    validate_image(file, self.max_bytes)?;
    let path = format!("{}/{}", folder, unique_file_name(file));
    self.files.lock().insert(path.clone(), file.bytes.clone());
    Ok(path)
  }

  async fn delete(&self, path: &str) -> ShopResult<()> {
    self.files.lock().remove(path);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn png(len: usize) -> UploadedFile {
    UploadedFile::new("proof.PNG", "image/png", vec![7u8; len])
  }

  #[test]
  fn accepts_small_images() {
    assert!(validate_image(&png(128), 1024).is_ok());
  }

  #[test]
  fn rejects_oversized_and_non_images() {
    assert!(matches!(validate_image(&png(2048), 1024), Err(ShopError::Validation(_))));
    let pdf = UploadedFile::new("doc.pdf", "application/pdf", vec![1, 2, 3]);
    assert!(matches!(validate_image(&pdf, 1024), Err(ShopError::Validation(_))));
    assert!(matches!(validate_image(&png(0), 1024), Err(ShopError::Validation(_))));
  }

  #[test]
  fn extension_falls_back_to_content_type() {
    assert_eq!(png(1).extension(), ".png");
    let unnamed = UploadedFile::new("upload", "image/webp", vec![1]);
    assert_eq!(unnamed.extension(), ".webp");
  }

  #[tokio::test]
  async fn memory_store_round_trip() {
    let store = MemoryFileStore::default();
    let path = store.store("payment_proofs", &png(16)).await.unwrap();
    assert!(path.starts_with("payment_proofs/"));
    assert!(path.ends_with(".png"));
    assert!(store.contains(&path));
    store.delete(&path).await.unwrap();
    assert!(store.is_empty());
  }

  #[tokio::test]
  async fn local_store_writes_and_deletes() {
    let root = std::env::temp_dir().join(format!("storefront-files-{}", Uuid::new_v4()));
    let store = LocalFileStore::new(&root, 1024);
    let path = store.store("products", &png(32)).await.unwrap();
    assert_eq!(tokio::fs::read(&path).await.unwrap().len(), 32);
    store.delete(&path).await.unwrap();
    assert!(tokio::fs::metadata(&path).await.is_err());
    store.delete(&path).await.unwrap();
    let _ = tokio::fs::remove_dir_all(&root).await;
  }
}

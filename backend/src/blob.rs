//! Storage for uploaded card images.
//!
//! The pipeline only needs an opaque reference string back from the blob store.
//! `LocalBlobStore` keeps images on disk, named by the MD5 of their contents, so
//! re-uploading the same image yields the same reference.

use md5::Context;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use thiserror::Error;

pub const REFERENCE_SCHEME: &str = "blob://";

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Unsupported image type for '{0}': only JPEG and PNG are accepted")]
    UnsupportedType(String),

    #[error("Image '{0}' is empty")]
    Empty(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait BlobStore: Send + Sync {
    /// Persists `bytes` and returns the reference to store on the card record.
    fn put(&self, file_name: &str, bytes: &[u8]) -> Result<String, BlobError>;
}

/// File extension for an accepted image, resolved from the uploaded file name.
fn image_extension(file_name: &str) -> Option<&'static str> {
    let mime = mime_guess::from_path(file_name).first()?;
    if mime.type_() != mime_guess::mime::IMAGE {
        return None;
    }
    match mime.subtype().as_str() {
        "jpeg" => Some("jpg"),
        "png" => Some("png"),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BlobStore for LocalBlobStore {
    fn put(&self, file_name: &str, bytes: &[u8]) -> Result<String, BlobError> {
        let ext = image_extension(file_name)
            .ok_or_else(|| BlobError::UnsupportedType(file_name.to_string()))?;
        if bytes.is_empty() {
            return Err(BlobError::Empty(file_name.to_string()));
        }

        let mut hasher = Context::new();
        hasher.consume(bytes);
        let name = format!("{:x}.{}", hasher.finalize(), ext);

        fs::create_dir_all(&self.root)?;
        let path = self.root.join(&name);
        if !path.exists() {
            // Each writer gets its own temp file; the last rename wins with
            // identical content.
            let mut tmp = NamedTempFile::new_in(&self.root)?;
            tmp.write_all(bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
        }
        log::info!("Stored image '{}' as {}", file_name, name);

        Ok(format!("{}{}", REFERENCE_SCHEME, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_png_under_content_hash() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("blobs"));

        let reference = store.put("card.PNG", b"png bytes").unwrap();
        let expected = format!("{:x}", md5::compute(b"png bytes"));
        assert_eq!(reference, format!("blob://{}.png", expected));

        let name = reference.strip_prefix(REFERENCE_SCHEME).unwrap();
        let path = dir.path().join("blobs").join(name);
        assert_eq!(fs::read(path).unwrap(), b"png bytes");
    }

    #[test]
    fn same_content_yields_same_reference() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        let a = store.put("a.jpg", b"same").unwrap();
        let b = store.put("b.jpeg", b"same").unwrap();
        assert_eq!(a, b);
        assert!(a.ends_with(".jpg"));
    }

    #[test]
    fn rejects_non_images_and_empty_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        assert!(matches!(
            store.put("card.pdf", b"data"),
            Err(BlobError::UnsupportedType(_))
        ));
        assert!(matches!(
            store.put("noext", b"data"),
            Err(BlobError::UnsupportedType(_))
        ));
        assert!(matches!(store.put("card.png", b""), Err(BlobError::Empty(_))));
    }

    #[test]
    fn concurrent_puts_of_the_same_image_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(LocalBlobStore::new(dir.path().join("blobs")));
        let bytes = std::sync::Arc::new(vec![7u8; 1024 * 1024]);

        for _ in 0..10 {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let store = store.clone();
                    let bytes = bytes.clone();
                    std::thread::spawn(move || store.put("card.png", &bytes))
                })
                .collect();
            let references: Vec<String> = handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect();
            assert!(references.windows(2).all(|w| w[0] == w[1]));
            fs::remove_file(dir.path().join("blobs").join(
                references[0].strip_prefix(REFERENCE_SCHEME).unwrap(),
            ))
            .unwrap();
        }

        let leftovers = fs::read_dir(dir.path().join("blobs")).unwrap().count();
        assert_eq!(leftovers, 0);
    }
}

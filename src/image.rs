//! Opaque handle to one selected image.

use std::path::Path;
use std::sync::Arc;

/// Raw image bytes plus the metadata needed to upload them.
///
/// Bytes are shared, so cloning a handle never copies the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    name: String,
    content_type: String,
    bytes: Arc<[u8]>,
}

impl ImageSource {
    #[must_use]
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self { name: name.into(), content_type: content_type.into(), bytes: bytes.into() }
    }

    /// Read an image from disk, inferring its MIME type from the extension.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be read.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(name, content_type_for(path), bytes))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// MIME type for an image path, by extension.
#[must_use]
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_is_case_insensitive() {
        assert_eq!(content_type_for(Path::new("a/B.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("photo.JPeG")), "image/jpeg");
    }

    #[test]
    fn content_type_unknown_extension_falls_back() {
        assert_eq!(content_type_for(Path::new("notes.txt")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("no_extension")), "application/octet-stream");
    }

    #[tokio::test]
    async fn from_path_reads_bytes_and_name() {
        let dir = std::env::temp_dir().join(format!("bulk-pinner-image-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cat.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let image = ImageSource::from_path(&path).await.unwrap();
        assert_eq!(image.name(), "cat.gif");
        assert_eq!(image.content_type(), "image/gif");
        assert_eq!(image.bytes(), b"GIF89a");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn from_path_missing_file_errors() {
        let missing = std::env::temp_dir().join(format!("bulk-pinner-missing-{}.png", uuid::Uuid::new_v4()));
        assert!(ImageSource::from_path(&missing).await.is_err());
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use thiserror::Error;

use crate::shared::constants::IMAGE_EXTENSIONS;

#[derive(Error, Debug)]
pub enum ImageUploadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is empty")]
    Empty(String),
    #[error("{0} is not a recognized image")]
    NotAnImage(String),
}

/// A single image payload ready to be sent to the detection service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    bytes: Vec<u8>,
    mime_type: String,
}

impl ImageUpload {
    pub fn from_path(path: &Path) -> Result<Self, ImageUploadError> {
        let bytes = fs::read(path).map_err(|e| ImageUploadError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        Self::from_bytes(file_name, bytes)
    }

    /// Builds a payload, sniffing the MIME type from the content and falling
    /// back to the file extension.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ImageUploadError> {
        let file_name = file_name.into();
        if bytes.is_empty() {
            return Err(ImageUploadError::Empty(file_name));
        }
        let format = image::guess_format(&bytes)
            .ok()
            .or_else(|| format_from_extension(&file_name))
            .ok_or_else(|| ImageUploadError::NotAnImage(file_name.clone()))?;
        Ok(Self {
            file_name,
            bytes,
            mime_type: format.to_mime_type().to_string(),
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn format_from_extension(file_name: &str) -> Option<ImageFormat> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_lowercase();
    if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    ImageFormat::from_extension(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_MAGIC: &[u8] = b"\xff\xd8\xff\xe0\0\x10JFIF\0";

    #[test]
    fn test_sniffs_png_regardless_of_name() {
        let upload = ImageUpload::from_bytes("photo.bin", PNG_MAGIC.to_vec()).unwrap();
        assert_eq!(upload.mime_type(), "image/png");
        assert_eq!(upload.file_name(), "photo.bin");
    }

    #[test]
    fn test_sniffs_jpeg() {
        let upload = ImageUpload::from_bytes("crowd.jpg", JPEG_MAGIC.to_vec()).unwrap();
        assert_eq!(upload.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_falls_back_to_extension() {
        let upload = ImageUpload::from_bytes("street.JPG", b"not really magic".to_vec()).unwrap();
        assert_eq!(upload.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_rejects_non_image() {
        let result = ImageUpload::from_bytes("notes.txt", b"hello".to_vec());
        assert!(matches!(result, Err(ImageUploadError::NotAnImage(_))));
    }

    #[test]
    fn test_rejects_empty() {
        let result = ImageUpload::from_bytes("empty.png", Vec::new());
        assert!(matches!(result, Err(ImageUploadError::Empty(_))));
    }

    #[test]
    fn test_from_path_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("people.png");
        fs::write(&path, PNG_MAGIC).unwrap();

        let upload = ImageUpload::from_path(&path).unwrap();
        assert_eq!(upload.file_name(), "people.png");
        assert_eq!(upload.len(), PNG_MAGIC.len());
    }

    #[test]
    fn test_from_path_missing_file() {
        let tmp = TempDir::new().unwrap();
        let result = ImageUpload::from_path(&tmp.path().join("missing.png"));
        assert!(matches!(result, Err(ImageUploadError::Read { .. })));
    }
}

/// Number of detection results shown per page.
pub const PAGE_SIZE: usize = 10;

/// Environment variable consulted for the backend URL when none is given explicitly.
pub const BACKEND_URL_ENV: &str = "DETECTOR_BACKEND_URL";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "tif", "webp"];

/// Multipart form field the service reads the uploaded image from.
pub const UPLOAD_FIELD_NAME: &str = "file";

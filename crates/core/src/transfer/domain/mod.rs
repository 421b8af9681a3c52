pub mod detection_service;
pub mod image_upload;
pub mod transfer_error;

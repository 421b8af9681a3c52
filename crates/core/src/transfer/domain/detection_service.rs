use crate::shared::detection_result::{DetectionResult, ResultId, UploadOutcome};
use crate::transfer::domain::image_upload::ImageUpload;
use crate::transfer::domain::transfer_error::TransferError;

/// Domain interface to the remote detection service.
///
/// Calls block the current thread; front ends run them off the UI thread.
pub trait DetectionService: Send + Sync {
    /// Submits one image for detection.
    fn submit_image(&self, upload: &ImageUpload) -> Result<UploadOutcome, TransferError>;

    /// Fetches the full stored history, in service order.
    fn list_results(&self) -> Result<Vec<DetectionResult>, TransferError>;

    /// Deletes one stored result. Only an explicit "no content" reply counts
    /// as success; deleting an unknown id is an error.
    fn delete_result(&self, id: ResultId) -> Result<(), TransferError>;

    /// Downloads an annotated image by its service-relative URL.
    fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>, TransferError>;
}

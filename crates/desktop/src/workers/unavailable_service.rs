use person_detector_core::shared::detection_result::{DetectionResult, ResultId, UploadOutcome};
use person_detector_core::transfer::domain::detection_service::DetectionService;
use person_detector_core::transfer::domain::image_upload::ImageUpload;
use person_detector_core::transfer::domain::transfer_error::{Operation, TransferError};

/// Stand-in used when the HTTP client could not be created. Every call fails
/// with the same reason so the controllers surface it next to the control
/// that was used.
pub struct UnavailableService {
    reason: String,
}

impl UnavailableService {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail(&self, operation: Operation) -> TransferError {
        TransferError::Network {
            operation,
            message: self.reason.clone(),
        }
    }
}

impl DetectionService for UnavailableService {
    fn submit_image(&self, _upload: &ImageUpload) -> Result<UploadOutcome, TransferError> {
        Err(self.fail(Operation::Upload))
    }

    fn list_results(&self) -> Result<Vec<DetectionResult>, TransferError> {
        Err(self.fail(Operation::ListResults))
    }

    fn delete_result(&self, _id: ResultId) -> Result<(), TransferError> {
        Err(self.fail(Operation::DeleteResult))
    }

    fn fetch_image(&self, _image_url: &str) -> Result<Vec<u8>, TransferError> {
        Err(self.fail(Operation::FetchImage))
    }
}

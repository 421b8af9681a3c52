use crate::shared::detection_result::UploadOutcome;
use crate::shared::endpoint::BaseEndpoint;
use crate::transfer::domain::detection_service::DetectionService;
use crate::transfer::domain::image_upload::ImageUpload;
use crate::transfer::domain::transfer_error::{describe, TransferError};

const SUBMIT_LABEL: &str = "Upload & Detect";
const SUBMITTING_LABEL: &str = "Uploading...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    FileSelected,
    Submitting,
    Succeeded,
    Failed,
}

/// Pairs an upload reply with the submission that requested it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
    generation: u64,
}

/// A submission the caller must deliver to the service, then report back
/// through [`UploadController::complete`].
#[derive(Debug, Clone)]
pub struct PendingSubmit {
    pub ticket: UploadTicket,
    pub upload: ImageUpload,
}

/// State machine for a single image submission:
/// `Idle → FileSelected → Submitting → Succeeded | Failed`.
///
/// At most one upload is in flight. Replies issued before the last
/// [`reset`](Self::reset) are discarded.
#[derive(Debug)]
pub struct UploadController {
    phase: UploadPhase,
    selected: Option<ImageUpload>,
    outcome: Option<UploadOutcome>,
    error: Option<String>,
    generation: u64,
}

impl UploadController {
    pub fn new() -> Self {
        Self {
            phase: UploadPhase::Idle,
            selected: None,
            outcome: None,
            error: None,
            generation: 0,
        }
    }

    /// Picks the file to submit. Ignored while an upload is in flight.
    pub fn select_file(&mut self, upload: ImageUpload) {
        if self.phase == UploadPhase::Submitting {
            log::debug!("Ignoring file selection while an upload is in flight");
            return;
        }
        self.selected = Some(upload);
        self.phase = UploadPhase::FileSelected;
    }

    /// Starts a submission. Returns `None` without any state change when no
    /// file is selected or an upload is already in flight.
    pub fn submit(&mut self) -> Option<PendingSubmit> {
        if self.phase == UploadPhase::Submitting {
            return None;
        }
        let upload = self.selected.clone()?;
        self.phase = UploadPhase::Submitting;
        self.outcome = None;
        self.error = None;
        Some(PendingSubmit {
            ticket: UploadTicket {
                generation: self.generation,
            },
            upload,
        })
    }

    /// Applies the service reply. Returns `false` if the reply was stale and
    /// therefore discarded.
    pub fn complete(
        &mut self,
        ticket: UploadTicket,
        result: Result<UploadOutcome, TransferError>,
    ) -> bool {
        if ticket.generation != self.generation || self.phase != UploadPhase::Submitting {
            log::debug!("Discarding stale upload reply");
            return false;
        }
        match result {
            Ok(outcome) => {
                log::info!("Upload complete: {} person(s) detected", outcome.count);
                self.outcome = Some(outcome);
                self.error = None;
                self.phase = UploadPhase::Succeeded;
            }
            Err(e) => {
                log::warn!("Upload failed: {e}");
                self.error = Some(describe(&e));
                self.outcome = None;
                self.phase = UploadPhase::Failed;
            }
        }
        true
    }

    /// Submits and waits for the reply on the current thread.
    pub fn submit_and_wait(&mut self, service: &dyn DetectionService) {
        if let Some(pending) = self.submit() {
            let result = service.submit_image(&pending.upload);
            self.complete(pending.ticket, result);
        }
    }

    /// Returns to `Idle`, dropping the selection, outcome and error.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.phase = UploadPhase::Idle;
        self.selected = None;
        self.outcome = None;
        self.error = None;
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn selected_file(&self) -> Option<&ImageUpload> {
        self.selected.as_ref()
    }

    pub fn outcome(&self) -> Option<&UploadOutcome> {
        self.outcome.as_ref()
    }

    /// Absolute URL of the annotated image from the latest outcome.
    pub fn outcome_image_url(&self, endpoint: &BaseEndpoint) -> Option<String> {
        self.outcome
            .as_ref()
            .map(|o| endpoint.resolve_image(&o.image_url))
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == UploadPhase::Submitting
    }

    pub fn can_submit(&self) -> bool {
        self.selected.is_some() && !self.is_submitting()
    }

    pub fn button_label(&self) -> &'static str {
        if self.is_submitting() {
            SUBMITTING_LABEL
        } else {
            SUBMIT_LABEL
        }
    }
}

impl Default for UploadController {
    fn default() -> Self {
        Self::new()
    }
}

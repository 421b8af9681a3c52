use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use person_detector_core::results::results_controller::{DeleteTicket, LoadTicket};
use person_detector_core::shared::detection_result::{DetectionResult, UploadOutcome};
use person_detector_core::transfer::domain::detection_service::DetectionService;
use person_detector_core::transfer::domain::transfer_error::TransferError;
use person_detector_core::upload::upload_controller::{PendingSubmit, UploadTicket};

/// A single request to run off the UI thread.
pub enum TransferJob {
    Submit(PendingSubmit),
    List(LoadTicket),
    Delete(DeleteTicket),
    /// `key` is the absolute URL the UI caches the image under.
    FetchImage { image_url: String, key: String },
}

/// Replies sent from worker threads back to the UI.
#[derive(Debug)]
pub enum TransferReply {
    Submitted(UploadTicket, Result<UploadOutcome, TransferError>),
    Listed(LoadTicket, Result<Vec<DetectionResult>, TransferError>),
    Deleted(DeleteTicket, Result<(), TransferError>),
    ImageFetched {
        key: String,
        result: Result<Vec<u8>, TransferError>,
    },
}

/// Runs each job on its own thread against a shared service and collects the
/// replies on one channel. The UI drains the channel while jobs are pending.
pub struct TransferWorker {
    service: Arc<dyn DetectionService>,
    tx: Sender<TransferReply>,
    rx: Receiver<TransferReply>,
    in_flight: usize,
}

impl TransferWorker {
    pub fn new(service: Arc<dyn DetectionService>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded::<TransferReply>();
        Self {
            service,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn dispatch(&mut self, job: TransferJob) {
        self.in_flight += 1;
        let service = self.service.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let reply = run_job(service.as_ref(), job);
            // The receiver is gone once the worker was replaced; drop the reply.
            let _ = tx.send(reply);
        });
    }

    /// Replies that arrived since the last call, in arrival order.
    pub fn drain(&mut self) -> Vec<TransferReply> {
        let replies: Vec<TransferReply> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(replies.len());
        replies
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }
}

fn run_job(service: &dyn DetectionService, job: TransferJob) -> TransferReply {
    match job {
        TransferJob::Submit(pending) => {
            TransferReply::Submitted(pending.ticket, service.submit_image(&pending.upload))
        }
        TransferJob::List(ticket) => TransferReply::Listed(ticket, service.list_results()),
        TransferJob::Delete(ticket) => {
            TransferReply::Deleted(ticket, service.delete_result(ticket.id()))
        }
        TransferJob::FetchImage { image_url, key } => TransferReply::ImageFetched {
            key,
            result: service.fetch_image(&image_url),
        },
    }
}

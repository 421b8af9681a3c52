use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::results::pagination::{clamp_page, page_bounds, total_pages};
use crate::shared::constants::PAGE_SIZE;
use crate::shared::detection_result::{DetectionResult, ResultId};
use crate::transfer::domain::detection_service::DetectionService;
use crate::transfer::domain::transfer_error::{describe, TransferError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Inactive,
    Loading,
    Loaded,
    Failed,
}

/// Pairs a list reply with the activation that requested it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Pairs a delete reply with the row and activation that requested it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteTicket {
    generation: u64,
    id: ResultId,
}

impl DeleteTicket {
    pub fn id(&self) -> ResultId {
        self.id
    }
}

/// Emitted once the service has confirmed a deletion. Feeding it back through
/// [`ResultsController::on_deleted`] drops the row locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultDeleted {
    pub deleted_id: ResultId,
}

#[derive(Debug, Default, Clone)]
struct RowStatus {
    deleting: bool,
    error: Option<String>,
}

/// Owns the fetched detection history, the page currently shown, and the
/// per-row deletion state.
///
/// The collection changes only by full replacement on load and by removing a
/// single row after the service confirms its deletion.
#[derive(Debug)]
pub struct ResultsController {
    results: Vec<DetectionResult>,
    load: LoadPhase,
    list_error: Option<String>,
    current_page: usize,
    rows: HashMap<ResultId, RowStatus>,
    generation: u64,
}

impl ResultsController {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            load: LoadPhase::Inactive,
            list_error: None,
            current_page: 1,
            rows: HashMap::new(),
            generation: 0,
        }
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Starts the single load of this activation. Returns `None` if the
    /// controller is already active.
    pub fn activate(&mut self) -> Option<LoadTicket> {
        if self.load != LoadPhase::Inactive {
            return None;
        }
        self.load = LoadPhase::Loading;
        self.list_error = None;
        Some(LoadTicket {
            generation: self.generation,
        })
    }

    /// Drops all state and invalidates every outstanding ticket.
    pub fn deactivate(&mut self) {
        self.generation += 1;
        self.load = LoadPhase::Inactive;
        self.results.clear();
        self.list_error = None;
        self.current_page = 1;
        self.rows.clear();
    }

    /// Explicit user refresh: a fresh activation.
    pub fn reload(&mut self) -> Option<LoadTicket> {
        self.deactivate();
        self.activate()
    }

    /// Applies a list reply. Returns `false` if it was stale and discarded.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<DetectionResult>, TransferError>,
    ) -> bool {
        if ticket.generation != self.generation || self.load != LoadPhase::Loading {
            log::debug!("Discarding stale results reply");
            return false;
        }
        self.rows.clear();
        match result {
            Ok(results) => {
                log::info!("Loaded {} detection result(s)", results.len());
                self.results = results;
                self.list_error = None;
                self.load = LoadPhase::Loaded;
            }
            Err(e) => {
                log::warn!("Loading results failed: {e}");
                self.results.clear();
                self.list_error = Some(describe(&e));
                self.load = LoadPhase::Failed;
            }
        }
        self.reclamp();
        true
    }

    /// Activates and loads on the current thread.
    pub fn load_and_wait(&mut self, service: &dyn DetectionService) {
        if let Some(ticket) = self.activate() {
            let result = service.list_results();
            self.complete_load(ticket, result);
        }
    }

    // ── Pagination ───────────────────────────────────────────────────

    /// Moves to `page`, clamped into the valid range.
    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = clamp_page(self.results.len(), PAGE_SIZE, page);
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.results.len(), PAGE_SIZE)
    }

    pub fn page_numbers(&self) -> RangeInclusive<usize> {
        1..=self.total_pages()
    }

    pub fn page_items(&self) -> &[DetectionResult] {
        &self.results[page_bounds(self.results.len(), PAGE_SIZE, self.current_page)]
    }

    fn reclamp(&mut self) {
        self.current_page = clamp_page(self.results.len(), PAGE_SIZE, self.current_page);
    }

    // ── Deletion ─────────────────────────────────────────────────────

    /// Starts deleting one row. Returns `None` if the id is not in the
    /// collection or its deletion is already in flight.
    pub fn request_delete(&mut self, id: ResultId) -> Option<DeleteTicket> {
        if !self.results.iter().any(|r| r.id == id) {
            return None;
        }
        let row = self.rows.entry(id).or_default();
        if row.deleting {
            return None;
        }
        row.deleting = true;
        row.error = None;
        Some(DeleteTicket {
            generation: self.generation,
            id,
        })
    }

    /// Applies a delete reply. On confirmation returns the event to feed into
    /// [`on_deleted`](Self::on_deleted); on failure the row stays and carries
    /// its own error.
    pub fn complete_delete(
        &mut self,
        ticket: DeleteTicket,
        result: Result<(), TransferError>,
    ) -> Option<ResultDeleted> {
        if ticket.generation != self.generation {
            log::debug!("Discarding stale delete reply for result {}", ticket.id);
            return None;
        }
        let row = self.rows.get_mut(&ticket.id).filter(|row| row.deleting)?;
        match result {
            // The row stays marked as deleting until on_deleted drops it.
            Ok(()) => Some(ResultDeleted {
                deleted_id: ticket.id,
            }),
            Err(e) => {
                log::warn!("Deleting result {} failed: {e}", ticket.id);
                row.deleting = false;
                row.error = Some(describe(&e));
                None
            }
        }
    }

    /// Removes a confirmed deletion from the collection and keeps the current
    /// page valid.
    pub fn on_deleted(&mut self, event: ResultDeleted) {
        let before = self.results.len();
        self.results.retain(|r| r.id != event.deleted_id);
        self.rows.remove(&event.deleted_id);
        if self.results.len() < before {
            log::info!("Deleted result {}", event.deleted_id);
        }
        self.reclamp();
    }

    /// Deletes one row on the current thread. Returns `true` once removed.
    pub fn delete_and_wait(&mut self, service: &dyn DetectionService, id: ResultId) -> bool {
        let Some(ticket) = self.request_delete(id) else {
            return false;
        };
        let result = service.delete_result(id);
        match self.complete_delete(ticket, result) {
            Some(event) => {
                self.on_deleted(event);
                true
            }
            None => false,
        }
    }

    pub fn is_deleting(&self, id: ResultId) -> bool {
        self.rows.get(&id).is_some_and(|row| row.deleting)
    }

    pub fn row_error(&self, id: ResultId) -> Option<&str> {
        self.rows.get(&id).and_then(|row| row.error.as_deref())
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn results(&self) -> &[DetectionResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn load_phase(&self) -> LoadPhase {
        self.load
    }

    pub fn is_loading(&self) -> bool {
        self.load == LoadPhase::Loading
    }

    pub fn list_error(&self) -> Option<&str> {
        self.list_error.as_deref()
    }
}

impl Default for ResultsController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::detection_result::UploadOutcome;
    use crate::transfer::domain::image_upload::ImageUpload;
    use crate::transfer::domain::transfer_error::Operation;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct StubService {
        listing: Result<Vec<DetectionResult>, TransferError>,
        failing_deletes: HashSet<ResultId>,
        list_calls: Arc<Mutex<usize>>,
        delete_calls: Arc<Mutex<Vec<ResultId>>>,
    }

    impl StubService {
        fn listing(results: Vec<DetectionResult>) -> Self {
            Self {
                listing: Ok(results),
                failing_deletes: HashSet::new(),
                list_calls: Arc::new(Mutex::new(0)),
                delete_calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing_list(error: TransferError) -> Self {
            Self {
                listing: Err(error),
                ..Self::listing(vec![])
            }
        }

        fn with_failing_delete(mut self, id: i64) -> Self {
            self.failing_deletes.insert(ResultId(id));
            self
        }
    }

    impl DetectionService for StubService {
        fn submit_image(&self, _upload: &ImageUpload) -> Result<UploadOutcome, TransferError> {
            unreachable!("results controller never uploads")
        }

        fn list_results(&self) -> Result<Vec<DetectionResult>, TransferError> {
            *self.list_calls.lock().unwrap() += 1;
            self.listing.clone()
        }

        fn delete_result(&self, id: ResultId) -> Result<(), TransferError> {
            self.delete_calls.lock().unwrap().push(id);
            if self.failing_deletes.contains(&id) {
                Err(delete_failed(500))
            } else {
                Ok(())
            }
        }

        fn fetch_image(&self, _image_url: &str) -> Result<Vec<u8>, TransferError> {
            unreachable!("results controller never fetches images")
        }
    }

    // --- Helpers ---

    fn make_results(n: i64) -> Vec<DetectionResult> {
        (1..=n)
            .map(|i| DetectionResult {
                id: ResultId(i),
                timestamp: format!("2024-05-01T10:{:02}:00", i % 60),
                count: (i % 4) as u32,
                image_url: format!("/static/out{i}.jpg"),
            })
            .collect()
    }

    fn loaded(n: i64) -> ResultsController {
        let mut ctl = ResultsController::new();
        let ticket = ctl.activate().unwrap();
        assert!(ctl.complete_load(ticket, Ok(make_results(n))));
        ctl
    }

    fn page_ids(ctl: &ResultsController) -> Vec<i64> {
        ctl.page_items().iter().map(|r| r.id.0).collect()
    }

    fn delete_failed(status: u16) -> TransferError {
        TransferError::Status {
            operation: Operation::DeleteResult,
            status,
        }
    }

    fn confirm_delete(ctl: &mut ResultsController, id: i64) {
        let ticket = ctl.request_delete(ResultId(id)).unwrap();
        let event = ctl.complete_delete(ticket, Ok(())).unwrap();
        ctl.on_deleted(event);
    }

    // --- Loading ---

    #[test]
    fn test_activation_loads_exactly_once() {
        let svc = StubService::listing(make_results(3));
        let calls = svc.list_calls.clone();
        let mut ctl = ResultsController::new();

        ctl.load_and_wait(&svc);
        ctl.load_and_wait(&svc);
        ctl.go_to_page(2);
        confirm_delete(&mut ctl, 1);

        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(ctl.load_phase(), LoadPhase::Loaded);
    }

    #[test]
    fn test_load_keeps_service_order() {
        let mut results = make_results(3);
        results.reverse();
        let mut ctl = ResultsController::new();
        ctl.load_and_wait(&StubService::listing(results));

        assert_eq!(page_ids(&ctl), vec![3, 2, 1]);
    }

    #[test]
    fn test_list_failure_shows_error_and_leaves_collection_empty() {
        let svc = StubService::failing_list(TransferError::Status {
            operation: Operation::ListResults,
            status: 503,
        });
        let mut ctl = ResultsController::new();

        ctl.load_and_wait(&svc);

        assert_eq!(ctl.load_phase(), LoadPhase::Failed);
        assert_eq!(ctl.list_error(), Some("Failed to fetch detection results"));
        assert!(ctl.is_empty());
        assert_eq!(ctl.total_pages(), 1);
        assert_eq!(ctl.current_page(), 1);
    }

    #[test]
    fn test_stale_load_after_deactivate_is_discarded() {
        let mut ctl = ResultsController::new();
        let ticket = ctl.activate().unwrap();
        ctl.deactivate();

        assert!(!ctl.complete_load(ticket, Ok(make_results(5))));
        assert!(ctl.is_empty());
        assert_eq!(ctl.load_phase(), LoadPhase::Inactive);
    }

    #[test]
    fn test_reload_issues_new_ticket_and_drops_old() {
        let mut ctl = ResultsController::new();
        let first = ctl.activate().unwrap();
        let second = ctl.reload().unwrap();

        assert!(!ctl.complete_load(first, Ok(make_results(2))));
        assert!(ctl.complete_load(second, Ok(make_results(4))));
        assert_eq!(ctl.len(), 4);
    }

    // --- Pagination ---

    #[test]
    fn test_twenty_five_items_make_three_pages() {
        let mut ctl = loaded(25);
        assert_eq!(ctl.page_numbers().collect::<Vec<_>>(), vec![1, 2, 3]);

        ctl.go_to_page(3);
        assert_eq!(page_ids(&ctl), vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn test_go_to_page_clamps_out_of_range() {
        let mut ctl = loaded(25);
        ctl.go_to_page(0);
        assert_eq!(ctl.current_page(), 1);
        ctl.go_to_page(42);
        assert_eq!(ctl.current_page(), 3);
        assert_eq!(page_ids(&ctl).len(), 5);
    }

    // --- Deletion ---

    #[test]
    fn test_delete_on_last_page_without_refetch() {
        let svc = StubService::listing(make_results(25));
        let list_calls = svc.list_calls.clone();
        let mut ctl = ResultsController::new();
        ctl.load_and_wait(&svc);
        ctl.go_to_page(3);

        assert!(ctl.delete_and_wait(&svc, ResultId(21)));

        assert_eq!(page_ids(&ctl), vec![22, 23, 24, 25]);
        assert_eq!(ctl.current_page(), 3);
        assert_eq!(ctl.len(), 24);
        assert_eq!(*list_calls.lock().unwrap(), 1);
        assert_eq!(*svc.delete_calls.lock().unwrap(), vec![ResultId(21)]);
    }

    #[test]
    fn test_confirmed_delete_removes_exactly_one() {
        let mut ctl = loaded(12);
        confirm_delete(&mut ctl, 7);

        assert_eq!(ctl.len(), 11);
        assert!(ctl.results().iter().all(|r| r.id != ResultId(7)));
        let remaining: Vec<_> = ctl.results().iter().map(|r| r.id.0).collect();
        assert_eq!(remaining, vec![1, 2, 3, 4, 5, 6, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_deleting_only_item_on_last_page_moves_back() {
        let mut ctl = loaded(21);
        ctl.go_to_page(3);
        assert_eq!(page_ids(&ctl), vec![21]);

        confirm_delete(&mut ctl, 21);

        assert_eq!(ctl.current_page(), 2);
        assert_eq!(page_ids(&ctl), (11..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_deleting_last_item_returns_to_page_one() {
        let mut ctl = loaded(1);
        confirm_delete(&mut ctl, 1);

        assert!(ctl.is_empty());
        assert_eq!(ctl.current_page(), 1);
        assert_eq!(ctl.total_pages(), 1);
        assert!(ctl.page_items().is_empty());
    }

    #[test]
    fn test_failed_delete_keeps_item_with_row_error() {
        let svc = StubService::listing(make_results(5)).with_failing_delete(3);
        let mut ctl = ResultsController::new();
        ctl.load_and_wait(&svc);

        assert!(!ctl.delete_and_wait(&svc, ResultId(3)));

        assert_eq!(ctl.len(), 5);
        assert_eq!(ctl.row_error(ResultId(3)), Some("Failed to delete the record"));
        for id in [1, 2, 4, 5] {
            assert_eq!(ctl.row_error(ResultId(id)), None);
        }
    }

    #[test]
    fn test_retrying_delete_clears_previous_row_error() {
        let mut ctl = loaded(3);
        let ticket = ctl.request_delete(ResultId(2)).unwrap();
        ctl.complete_delete(ticket, Err(delete_failed(404)));
        assert!(ctl.row_error(ResultId(2)).is_some());

        ctl.request_delete(ResultId(2)).unwrap();
        assert_eq!(ctl.row_error(ResultId(2)), None);
        assert!(ctl.is_deleting(ResultId(2)));
    }

    #[test]
    fn test_concurrent_deletes_are_independent() {
        let mut ctl = loaded(6);
        let three = ctl.request_delete(ResultId(3)).unwrap();
        let five = ctl.request_delete(ResultId(5)).unwrap();
        assert!(ctl.is_deleting(ResultId(3)));
        assert!(ctl.is_deleting(ResultId(5)));

        assert!(ctl.complete_delete(five, Err(delete_failed(500))).is_none());
        assert!(ctl.is_deleting(ResultId(3)));
        assert_eq!(ctl.row_error(ResultId(3)), None);

        let event = ctl.complete_delete(three, Ok(())).unwrap();
        assert_eq!(event.deleted_id, ResultId(3));
        ctl.on_deleted(event);

        assert_eq!(ctl.len(), 5);
        assert!(ctl.row_error(ResultId(5)).is_some());
        assert!(!ctl.is_deleting(ResultId(5)));
    }

    #[test]
    fn test_duplicate_delete_request_is_suppressed() {
        let mut ctl = loaded(2);
        assert!(ctl.request_delete(ResultId(1)).is_some());
        assert!(ctl.request_delete(ResultId(1)).is_none());
    }

    #[test]
    fn test_confirmed_row_cannot_be_deleted_again_before_removal() {
        let mut ctl = loaded(3);
        let ticket = ctl.request_delete(ResultId(2)).unwrap();
        let event = ctl.complete_delete(ticket, Ok(())).unwrap();

        assert!(ctl.is_deleting(ResultId(2)));
        assert!(ctl.request_delete(ResultId(2)).is_none());

        ctl.on_deleted(event);
        assert!(!ctl.is_deleting(ResultId(2)));
        assert_eq!(ctl.len(), 2);
    }

    #[test]
    fn test_delete_unknown_id_is_ignored() {
        let mut ctl = loaded(2);
        assert!(ctl.request_delete(ResultId(99)).is_none());
    }

    #[test]
    fn test_collection_untouched_until_confirmation() {
        let mut ctl = loaded(4);
        let ticket = ctl.request_delete(ResultId(4)).unwrap();
        assert_eq!(ctl.len(), 4);

        let event = ctl.complete_delete(ticket, Ok(())).unwrap();
        assert_eq!(ctl.len(), 4);

        ctl.on_deleted(event);
        assert_eq!(ctl.len(), 3);
    }

    #[test]
    fn test_delete_reply_after_deactivate_is_discarded() {
        let mut ctl = loaded(4);
        let ticket = ctl.request_delete(ResultId(2)).unwrap();
        ctl.deactivate();

        assert!(ctl.complete_delete(ticket, Ok(())).is_none());
    }

    #[test]
    fn test_page_stays_valid_through_repeated_deletes() {
        let mut ctl = loaded(37);
        ctl.go_to_page(4);
        while let Some(last) = ctl.results().last().map(|r| r.id.0) {
            confirm_delete(&mut ctl, last);
            assert!(ctl.current_page() >= 1);
            assert!(ctl.current_page() <= ctl.total_pages());
            assert!(ctl.is_empty() || !ctl.page_items().is_empty());
        }
        assert_eq!(ctl.current_page(), 1);
    }
}

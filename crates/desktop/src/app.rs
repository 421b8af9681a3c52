use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, scrollable, stack, text};
use iced::{Element, Length, Subscription, Task, Theme};

use person_detector_core::preview::preview_overlay::{ClickTarget, ImageRef, PreviewOverlay};
use person_detector_core::results::results_controller::{ResultDeleted, ResultsController};
use person_detector_core::shared::constants::IMAGE_EXTENSIONS;
use person_detector_core::shared::detection_result::ResultId;
use person_detector_core::shared::endpoint::{BaseEndpoint, EndpointError};
use person_detector_core::transfer::domain::detection_service::DetectionService;
use person_detector_core::transfer::domain::image_upload::ImageUpload;
use person_detector_core::transfer::domain::transfer_error::describe;
use person_detector_core::transfer::infrastructure::http_detection_service::HttpDetectionService;
use person_detector_core::upload::upload_controller::UploadController;

use crate::image_cache::{ImageCache, ImageState};
use crate::settings::{Appearance, Settings};
use crate::tabs;
use crate::theme;
use crate::widgets::preview_modal;
use crate::workers::transfer_worker::{TransferJob, TransferReply, TransferWorker};
use crate::workers::unavailable_service::UnavailableService;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Tab enum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Results,
    Settings,
}

impl Tab {
    const ALL: &[Tab] = &[Tab::Home, Tab::Results, Tab::Settings];

    fn label(self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Results => "Results",
            Tab::Settings => "Settings",
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    PickFile,
    FilePicked(Option<PathBuf>),
    SubmitUpload,
    ClearUpload,
    GoToPage(usize),
    RefreshResults,
    DeleteResult(ResultId),
    ResultDeleted(ResultDeleted),
    OpenPreview(ImageRef),
    PreviewClicked(ClickTarget),
    OpenPreviewInBrowser,
    BackendUrlEdited(String),
    TimeoutChanged(u32),
    ApplyConnection,
    AppearanceChanged(Appearance),
    PollTransfers,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    active_tab: Tab,
    settings: Settings,
    backend_url_draft: String,
    settings_error: Option<String>,
    endpoint: Option<BaseEndpoint>,
    worker: TransferWorker,
    upload: UploadController,
    pick_error: Option<String>,
    results: ResultsController,
    preview: PreviewOverlay,
    images: ImageCache,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let (endpoint, endpoint_error) = parse_endpoint(&settings.backend_url);
        let (service, service_error) = build_service(endpoint.clone(), &settings);

        (
            Self {
                active_tab: Tab::Home,
                backend_url_draft: settings.backend_url.clone(),
                settings,
                settings_error: endpoint_error.or(service_error),
                endpoint,
                worker: TransferWorker::new(service),
                upload: UploadController::new(),
                pick_error: None,
                results: ResultsController::new(),
                preview: PreviewOverlay::default(),
                images: ImageCache::new(),
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => self.switch_tab(tab),
            Message::PickFile => {
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .set_title("Select an image")
                            .add_filter("Images", IMAGE_EXTENSIONS)
                            .pick_file()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::FilePicked,
                );
            }
            Message::FilePicked(Some(path)) => match ImageUpload::from_path(&path) {
                Ok(upload) => {
                    self.pick_error = None;
                    self.upload.select_file(upload);
                }
                Err(e) => {
                    log::warn!("Rejected {}: {e}", path.display());
                    self.pick_error = Some(e.to_string());
                }
            },
            Message::FilePicked(None) => {}
            Message::SubmitUpload => {
                if let Some(pending) = self.upload.submit() {
                    self.worker.dispatch(TransferJob::Submit(pending));
                }
            }
            Message::ClearUpload => {
                self.upload.reset();
                self.pick_error = None;
                self.sync_images();
            }
            Message::GoToPage(page) => {
                self.results.go_to_page(page);
                self.sync_images();
            }
            Message::RefreshResults => {
                if let Some(ticket) = self.results.reload() {
                    self.worker.dispatch(TransferJob::List(ticket));
                }
                self.sync_images();
            }
            Message::DeleteResult(id) => {
                if let Some(ticket) = self.results.request_delete(id) {
                    self.worker.dispatch(TransferJob::Delete(ticket));
                }
            }
            Message::ResultDeleted(event) => {
                if let Some(deleted) = self
                    .results
                    .results()
                    .iter()
                    .find(|r| r.id == event.deleted_id)
                {
                    self.images
                        .evict(&image_key(self.endpoint.as_ref(), &deleted.image_url));
                }
                self.results.on_deleted(event);
                self.sync_images();
            }
            Message::OpenPreview(image) => self.preview.open(image),
            Message::PreviewClicked(target) => self.preview.click(target),
            Message::OpenPreviewInBrowser => {
                if let Some(image) = self.preview.image() {
                    if let Err(e) = open::that(image.as_str()) {
                        log::warn!("Could not open {}: {e}", image.as_str());
                    }
                }
            }
            Message::BackendUrlEdited(url) => {
                self.backend_url_draft = url;
            }
            Message::TimeoutChanged(secs) => {
                self.settings.timeout_secs = secs;
            }
            Message::ApplyConnection => {
                self.settings.backend_url = self.backend_url_draft.trim().to_string();
                self.settings.save();
                self.reconnect();
            }
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::PollTransfers => {
                let tasks: Vec<Task<Message>> = self
                    .worker
                    .drain()
                    .into_iter()
                    .filter_map(|reply| self.apply_reply(reply))
                    .collect();
                return Task::batch(tasks);
            }
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let tab_bar = row(Tab::ALL
            .iter()
            .map(|&tab| -> Element<'_, Message> {
                let btn = button(text(tab.label()).size(14))
                    .on_press(Message::TabSelected(tab))
                    .padding([6, 14]);
                if tab == self.active_tab {
                    btn.style(button::primary).into()
                } else {
                    btn.style(button::text).into()
                }
            })
            .collect::<Vec<_>>())
        .spacing(2);

        let theme = self.theme();
        let content: Element<'_, Message> = match self.active_tab {
            Tab::Home => tabs::home_tab::view(
                &self.upload,
                self.pick_error.as_deref(),
                self.endpoint.as_ref(),
                &self.images,
                &theme,
            ),
            Tab::Results => tabs::results_tab::view(
                &self.results,
                self.endpoint.as_ref(),
                &self.images,
                &theme,
            ),
            Tab::Settings => tabs::settings_tab::view(
                &self.settings,
                &self.backend_url_draft,
                self.settings_error.as_deref(),
                &theme,
            ),
        };

        let page = column![
            container(tab_bar).padding([8, 12]),
            container(scrollable(content).height(Length::Fill))
                .padding(16)
                .height(Length::Fill),
        ]
        .height(Length::Fill);

        match self.preview.image() {
            Some(image) => stack![page, preview_modal::view(image, self.images.get(image.as_str()))]
                .into(),
            None => page.into(),
        }
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        if self.worker.is_busy() {
            iced::time::every(POLL_INTERVAL).map(|_| Message::PollTransfers)
        } else {
            Subscription::none()
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Leaving a tab tears down its controller so late replies are dropped.
    fn switch_tab(&mut self, tab: Tab) {
        if tab == self.active_tab {
            return;
        }
        match self.active_tab {
            Tab::Home => {
                self.upload.reset();
                self.pick_error = None;
            }
            Tab::Results => self.results.deactivate(),
            Tab::Settings => {}
        }
        self.preview.close();
        self.active_tab = tab;

        if tab == Tab::Results {
            if let Some(ticket) = self.results.activate() {
                self.worker.dispatch(TransferJob::List(ticket));
            }
        }
        self.sync_images();
    }

    fn apply_reply(&mut self, reply: TransferReply) -> Option<Task<Message>> {
        match reply {
            TransferReply::Submitted(ticket, result) => {
                if self.upload.complete(ticket, result) {
                    self.sync_images();
                }
                None
            }
            TransferReply::Listed(ticket, result) => {
                if self.results.complete_load(ticket, result) {
                    self.sync_images();
                }
                None
            }
            TransferReply::Deleted(ticket, result) => self
                .results
                .complete_delete(ticket, result)
                .map(|event| Task::done(Message::ResultDeleted(event))),
            TransferReply::ImageFetched { key, result } => {
                let state = match result {
                    Ok(bytes) => ImageState::Ready(Handle::from_bytes(bytes)),
                    Err(e) => ImageState::Failed(describe(&e)),
                };
                if !self.images.finish(&key, state) {
                    log::debug!("Dropping image fetched after eviction: {key}");
                }
                None
            }
        }
    }

    /// Keeps the cache to the images on screen: the current results page,
    /// the upload outcome, and the open preview. Missing ones are fetched.
    fn sync_images(&mut self) {
        let wanted: Vec<String> = self
            .results
            .page_items()
            .iter()
            .map(|r| r.image_url.clone())
            .chain(self.upload.outcome().map(|o| o.image_url.clone()))
            .collect();

        let mut keep: HashSet<String> = wanted
            .iter()
            .map(|url| image_key(self.endpoint.as_ref(), url))
            .collect();
        if let Some(image) = self.preview.image() {
            keep.insert(image.as_str().to_string());
        }
        self.images.retain_only(&keep);

        for url in wanted {
            self.request_image(&url);
        }
        log::debug!("{} image(s) cached", self.images.len());
    }

    fn request_image(&mut self, image_url: &str) {
        let key = image_key(self.endpoint.as_ref(), image_url);
        if self.images.begin(&key) {
            self.worker.dispatch(TransferJob::FetchImage {
                image_url: image_url.to_string(),
                key,
            });
        }
    }

    /// Rebuilds the service from the current settings and starts every
    /// controller afresh.
    fn reconnect(&mut self) {
        let (endpoint, endpoint_error) = parse_endpoint(&self.settings.backend_url);
        let (service, service_error) = build_service(endpoint.clone(), &self.settings);
        self.settings_error = endpoint_error.or(service_error);
        self.endpoint = endpoint;
        self.worker = TransferWorker::new(service);

        self.upload.reset();
        self.results.deactivate();
        self.preview.close();
        self.images.clear();
        log::info!(
            "Backend set to {}",
            self.endpoint
                .as_ref()
                .map(|e| e.as_str())
                .unwrap_or("<unset>")
        );

        if self.active_tab == Tab::Results {
            if let Some(ticket) = self.results.activate() {
                self.worker.dispatch(TransferJob::List(ticket));
            }
        }
    }
}

/// Cache key and display URL for a service-relative image path.
pub fn image_key(endpoint: Option<&BaseEndpoint>, image_url: &str) -> String {
    match endpoint {
        Some(endpoint) => endpoint.resolve_image(image_url),
        None => image_url.to_string(),
    }
}

/// An empty URL is a valid "not configured yet" state; calls will report it.
fn parse_endpoint(raw: &str) -> (Option<BaseEndpoint>, Option<String>) {
    match BaseEndpoint::parse(raw) {
        Ok(endpoint) => (Some(endpoint), None),
        Err(EndpointError::Unset) => (None, None),
        Err(e) => (None, Some(e.to_string())),
    }
}

/// reqwest's blocking client must not be built on a thread that is inside an
/// async runtime, so construction happens on a scratch thread.
fn build_service(
    endpoint: Option<BaseEndpoint>,
    settings: &Settings,
) -> (Arc<dyn DetectionService>, Option<String>) {
    let timeout = settings.timeout();
    let built = thread::spawn(move || HttpDetectionService::new(endpoint, timeout)).join();
    let reason = match built {
        Ok(Ok(service)) => return (Arc::new(service), None),
        Ok(Err(e)) => format!("could not create HTTP client: {e}"),
        Err(_) => "HTTP client setup panicked".to_string(),
    };
    log::error!("{reason}");
    (Arc::new(UnavailableService::new(reason.clone())), Some(reason))
}

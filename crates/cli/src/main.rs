use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};

use person_detector_core::results::results_controller::ResultsController;
use person_detector_core::shared::constants::{BACKEND_URL_ENV, DEFAULT_TIMEOUT_SECS};
use person_detector_core::shared::detection_result::ResultId;
use person_detector_core::shared::endpoint::BaseEndpoint;
use person_detector_core::transfer::domain::detection_service::DetectionService;
use person_detector_core::transfer::domain::image_upload::ImageUpload;
use person_detector_core::transfer::infrastructure::http_detection_service::HttpDetectionService;
use person_detector_core::upload::upload_controller::UploadController;

/// Submit images for person detection and manage stored results.
#[derive(Parser)]
#[command(name = "person-detector")]
struct Cli {
    /// Base URL of the detection service.
    #[arg(long, env = BACKEND_URL_ENV, global = true)]
    backend_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload an image and print how many persons were detected.
    Upload {
        /// Image file to analyse.
        file: PathBuf,
    },
    /// List stored detection results, one page at a time.
    List {
        /// Page to show (10 results per page).
        #[arg(long, default_value = "1")]
        page: usize,
    },
    /// Delete stored detection results.
    Delete {
        /// Ids of the results to delete.
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let endpoint = cli
        .backend_url
        .as_deref()
        .map(BaseEndpoint::parse)
        .transpose()?;
    if endpoint.is_none() {
        log::warn!("No backend URL given; set --backend-url or {BACKEND_URL_ENV}");
    }
    let service =
        HttpDetectionService::new(endpoint.clone(), Duration::from_secs(cli.timeout_secs))?;

    match cli.command {
        Command::Upload { file } => run_upload(&service, endpoint.as_ref(), &file),
        Command::List { page } => run_list(&service, page),
        Command::Delete { ids } => run_delete(&service, &ids),
    }
}

fn run_upload(
    service: &dyn DetectionService,
    endpoint: Option<&BaseEndpoint>,
    file: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = UploadController::new();
    controller.select_file(ImageUpload::from_path(file)?);
    log::info!("Uploading {}", file.display());
    controller.submit_and_wait(service);

    if let Some(message) = controller.error_message() {
        return Err(message.to_string().into());
    }
    if let Some(outcome) = controller.outcome() {
        println!("{}", outcome.headline());
        match endpoint.and_then(|e| controller.outcome_image_url(e)) {
            Some(url) => println!("Annotated image: {url}"),
            None => println!("Annotated image: {}", outcome.image_url),
        }
    }
    Ok(())
}

fn run_list(service: &dyn DetectionService, page: usize) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = ResultsController::new();
    controller.load_and_wait(service);
    if let Some(message) = controller.list_error() {
        return Err(message.to_string().into());
    }
    if controller.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    controller.go_to_page(page);
    if controller.current_page() != page {
        log::info!(
            "Page {page} is out of range, showing page {}",
            controller.current_page()
        );
    }

    println!("{:>6}  {:<19}  {:>5}  Image", "ID", "Timestamp", "Count");
    for result in controller.page_items() {
        println!(
            "{:>6}  {:<19}  {:>5}  {}",
            result.id,
            result.display_timestamp(),
            result.count,
            result.image_url
        );
    }
    println!(
        "Page {} of {} ({} results)",
        controller.current_page(),
        controller.total_pages(),
        controller.len()
    );
    Ok(())
}

fn run_delete(service: &dyn DetectionService, ids: &[i64]) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = ResultsController::new();
    controller.load_and_wait(service);
    if let Some(message) = controller.list_error() {
        return Err(message.to_string().into());
    }

    let mut failures = 0;
    for &raw in ids {
        let id = ResultId(raw);
        if !controller.results().iter().any(|r| r.id == id) {
            eprintln!("Result {id}: not found");
            failures += 1;
            continue;
        }
        if controller.delete_and_wait(service, id) {
            println!("Result {id}: deleted");
        } else {
            let message = controller.row_error(id).unwrap_or("delete was not confirmed");
            eprintln!("Result {id}: {message}");
            failures += 1;
        }
    }

    if failures > 0 {
        return Err(format!("{failures} of {} deletion(s) failed", ids.len()).into());
    }
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.timeout_secs == 0 {
        return Err("Timeout must be at least 1 second".into());
    }
    match &cli.command {
        Command::Upload { file } if !file.exists() => {
            Err(format!("Input file not found: {}", file.display()).into())
        }
        Command::List { page } if *page == 0 => Err("Page numbers start at 1".into()),
        _ => Ok(()),
    }
}

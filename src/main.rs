use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use drive_csv_sync::{
    config::{DriveConfig, MimeType, Scope, DEFAULT_FILE_NAME},
    drive::{FileClient, DEFAULT_PAGE_SIZE},
    sync::{ReplaceFile, ReplaceMode},
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const ROWS: [[&str; 2]; 2] = [["test1", "ganti update"], ["test2", "ganti baris 2"]];

#[derive(Debug, Parser)]
#[command(
    name = "drive-csv-sync",
    about = "replace a csv file in a google drive folder",
    version
)]
struct Opt {
    /// Path to the service account json key
    #[arg(long, env = "GOOGLE_DRIVE_SERVICE_PATH")]
    service_account: PathBuf,

    /// Id of the destination folder
    #[arg(long, env = "GOOGLE_DRIVE_FOLDER_ID")]
    folder_id: String,

    /// Requested scope, repeatable: drive or drive.file
    #[arg(long = "scope", default_values = ["drive", "drive.file"])]
    scopes: Vec<Scope>,

    /// Name of the file to replace
    #[arg(long, default_value = DEFAULT_FILE_NAME)]
    file_name: String,

    /// Mime type of the uploaded file: png, jpg, jpeg, csv or octet-stream
    #[arg(long, default_value = "csv")]
    mime_type: MimeType,

    /// Number of files listed when looking for the file to replace, from 1 to 1000
    #[arg(
        long,
        default_value_t = DEFAULT_PAGE_SIZE as u16,
        value_parser = clap::value_parser!(u16).range(1..=1000)
    )]
    page_size: u16,

    /// Upload over an existing file instead of deleting it first
    #[arg(long)]
    update_in_place: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

fn init_tracing(log_level: tracing::Level) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let opt = Opt::parse();
    init_tracing(opt.log_level);

    let config = DriveConfig::new(&opt.service_account, &opt.folder_id)
        .with_scopes(opt.scopes)
        .with_file_name(&opt.file_name)
        .with_mime_type(opt.mime_type)
        .with_page_size(usize::from(opt.page_size));

    let client = match FileClient::from_config(&config).await {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "unable to build the drive client");
            return ExitCode::FAILURE;
        }
    };

    let mode = if opt.update_in_place {
        ReplaceMode::UpdateInPlace
    } else {
        ReplaceMode::DeleteAndCreate
    };
    tracing::info!(file_name = %config.file_name, folder_id = %config.folder_id, ?mode, "replacing file");

    let statuses = ReplaceFile::from_config(&config)
        .with_mode(mode)
        .run(&client, ROWS)
        .await;

    if statuses
        .iter()
        .any(|s| matches!(s, Err(e) if e.is_fatal()))
    {
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

//! Replace a CSV file in a Google Drive folder with a service account
//!
//! - auth: service account key (JWT bearer flow), token refreshed when expired
//! - drive: list, delete, create and update files, shared drives included
//! - payload: CSV rows encoded with CRLF record terminators
//! - sync: list, delete files with the target name, upload the new payload
//!
//! Failures of a single step are reported and the next steps still run, see [`sync::ReplaceFile`].
//!
//! # Quick Start
//! ```no_run
//! use drive_csv_sync::{
//!     config::DriveConfig,
//!     drive::{DriveResult, FileClient},
//!     payload,
//! };
//!
//! #[tokio::main]
//! async fn main() -> DriveResult<()> {
//!     let config = DriveConfig::new("service-account.json", "folder_id");
//!     let client = FileClient::from_config(&config).await?;
//!
//!     let payload = payload::encode([["test1", "ganti update"], ["test2", "ganti baris 2"]])?;
//!     let created = client.create(&config.file_metadata(), &payload).await?;
//!     println!("{}", created);
//!
//!     Ok(())
//! }
//! ```
mod gcp;

pub mod config;
pub mod payload;
pub mod sync;

pub use gcp::drive;
pub use gcp::oauth2;
pub use gcp::Client;

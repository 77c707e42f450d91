//! Replace a named file in a Drive folder.
//!
//! Steps run one after another and each one reports its own outcome: a failed
//! listing or deletion is recorded and the upload is still attempted, nothing
//! that already succeeded is rolled back. Only a payload that cannot be
//! encoded stops the run, before anything is uploaded.
//!
//! # Example
//! ```no_run
//! use drive_csv_sync::{
//!     config::DriveConfig,
//!     drive::{DriveResult, FileClient},
//!     sync::ReplaceFile,
//! };
//!
//! #[tokio::main]
//! async fn main() -> DriveResult<()> {
//!     let config = DriveConfig::new("service-account.json", "folder_id");
//!     let client = FileClient::from_config(&config).await?;
//!
//!     let rows = [["test1", "ganti update"], ["test2", "ganti baris 2"]];
//!     for status in ReplaceFile::from_config(&config).run(&client, rows).await {
//!         println!("{:?}", status);
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt::Display;

use crate::{
    config::DriveConfig,
    drive::{DriveResult, File, FileClient, FileList, FilesListRequest},
    oauth2::token::TokenGenerator,
    payload,
};

/// Remote operations needed to replace a file.
#[async_trait::async_trait]
pub trait FileStore: Send + Sync {
    async fn list(&self, request: &FilesListRequest) -> DriveResult<FileList>;
    async fn delete(&self, file_id: &str) -> DriveResult<()>;
    async fn create(&self, metadata: &File, payload: &[u8]) -> DriveResult<File>;
    async fn update(&self, existing_file: &File, payload: &[u8]) -> DriveResult<File>;
}

#[async_trait::async_trait]
impl<T> FileStore for FileClient<T>
where
    T: TokenGenerator,
{
    async fn list(&self, request: &FilesListRequest) -> DriveResult<FileList> {
        FileClient::list(self, request).await
    }

    async fn delete(&self, file_id: &str) -> DriveResult<()> {
        FileClient::delete(self, file_id).await
    }

    async fn create(&self, metadata: &File, payload: &[u8]) -> DriveResult<File> {
        FileClient::create(self, metadata, payload).await
    }

    async fn update(&self, existing_file: &File, payload: &[u8]) -> DriveResult<File> {
        FileClient::update(self, existing_file, payload).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplaceMode {
    /// Delete every file with the target name, then upload a new one.
    #[default]
    DeleteAndCreate,
    /// Upload over the first file with the target name, delete the others.
    UpdateInPlace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceStatus {
    Listed { count: usize, matches: usize },
    Deleted(String),
    Encoded { size: usize },
    Created(File),
    Updated(File),
}

impl Display for ReplaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplaceStatus::Listed { count, matches } => {
                write!(f, "listed {} files, {} to replace", count, matches)
            }
            ReplaceStatus::Deleted(id) => write!(f, "deleted {}", id),
            ReplaceStatus::Encoded { size } => write!(f, "encoded {} bytes", size),
            ReplaceStatus::Created(file) => write!(f, "created {}", file),
            ReplaceStatus::Updated(file) => write!(f, "updated {}", file),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReplaceFile {
    metadata: File,
    page_size: usize,
    mode: ReplaceMode,
}

impl ReplaceFile {
    pub fn new(metadata: File, page_size: usize) -> Self {
        Self {
            metadata,
            page_size,
            mode: ReplaceMode::default(),
        }
    }

    pub fn from_config(config: &DriveConfig) -> Self {
        Self::new(config.file_metadata(), config.page_size)
    }

    pub fn with_mode(mut self, mode: ReplaceMode) -> Self {
        self.mode = mode;
        self
    }

    fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    /// Files of the listing whose name is exactly the target name.
    async fn matches<S: FileStore + ?Sized>(
        &self,
        store: &S,
        statuses: &mut Vec<DriveResult<ReplaceStatus>>,
    ) -> Vec<File> {
        match store.list(&FilesListRequest::first_page(self.page_size)).await {
            Ok(list) => {
                let matches = list.named(self.name()).cloned().collect::<Vec<_>>();
                tracing::info!(
                    count = list.files.len(),
                    matches = matches.len(),
                    name = self.name(),
                    "files listed"
                );
                statuses.push(Ok(ReplaceStatus::Listed {
                    count: list.files.len(),
                    matches: matches.len(),
                }));
                matches
            }
            Err(e) => {
                tracing::warn!(error = %e, "listing failed, nothing will be deleted");
                statuses.push(Err(e));
                vec![]
            }
        }
    }

    async fn delete_all<S: FileStore + ?Sized>(
        store: &S,
        files: &[File],
        statuses: &mut Vec<DriveResult<ReplaceStatus>>,
    ) {
        for file_id in files.iter().filter_map(|f| f.id.as_deref()) {
            let status = store
                .delete(file_id)
                .await
                .map(|()| ReplaceStatus::Deleted(file_id.to_owned()));
            match &status {
                Ok(s) => tracing::info!("{}", s),
                Err(e) => tracing::warn!(error = %e, "delete failed, upload continues"),
            }
            statuses.push(status);
        }
    }

    /// Runs every step and returns their outcomes in order.
    ///
    /// The last outcome is a fatal error when the rows could not be encoded.
    pub async fn run<S, I, R, F>(&self, store: &S, rows: I) -> Vec<DriveResult<ReplaceStatus>>
    where
        S: FileStore + ?Sized,
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = F>,
        F: AsRef<[u8]>,
    {
        let mut statuses = vec![];

        let matches = self.matches(store, &mut statuses).await;
        let (target, extras) = match self.mode {
            ReplaceMode::DeleteAndCreate => (None, matches.as_slice()),
            ReplaceMode::UpdateInPlace => match matches.split_first() {
                Some((first, rest)) if first.id.is_some() => (Some(first), rest),
                _ => (None, matches.as_slice()),
            },
        };
        Self::delete_all(store, extras, &mut statuses).await;

        let payload = match payload::encode(rows) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "payload encoding failed");
                statuses.push(Err(e));
                return statuses;
            }
        };
        statuses.push(Ok(ReplaceStatus::Encoded {
            size: payload.len(),
        }));

        let status = match target {
            Some(existing) => {
                let existing = File {
                    name: self.metadata.name.to_owned(),
                    mime_type: self.metadata.mime_type.to_owned(),
                    ..existing.to_owned()
                };
                store
                    .update(&existing, &payload)
                    .await
                    .map(ReplaceStatus::Updated)
            }
            None => store
                .create(&self.metadata, &payload)
                .await
                .map(ReplaceStatus::Created),
        };
        match &status {
            Ok(s) => tracing::info!("{}", s),
            Err(e) => tracing::warn!(error = %e, "upload failed"),
        }
        statuses.push(status);
        statuses
    }
}

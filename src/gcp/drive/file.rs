use reqwest::Method;

use crate::{
    config::{DriveConfig, MimeType},
    gcp::Client,
    oauth2::token::{ServiceAccountCredentials, TokenGenerator},
};

use super::{
    client::DriveHttpClient,
    resources::file::{Endpoints, File, FileList, FilesListRequest},
    credentials, DriveResult, Error, RemoteError,
};

pub struct FileClient<T> {
    drive_client: DriveHttpClient<T>,
    endpoints: Endpoints,
}

impl<T: TokenGenerator> FileClient<T> {
    /// Acquires a first access token against Google's Drive API.
    pub async fn new(token_generator: T) -> DriveResult<Self> {
        Self::with_endpoints(token_generator, Endpoints::default()).await
    }

    pub async fn with_endpoints(token_generator: T, endpoints: Endpoints) -> DriveResult<Self> {
        let drive_client = DriveHttpClient::new(Client::default(), token_generator)
            .await
            .map_err(Error::bootstrap)?;
        Ok(Self {
            drive_client,
            endpoints,
        })
    }
}

impl FileClient<ServiceAccountCredentials> {
    /// Loads the service account key, then authenticates with the configured scopes.
    pub async fn from_config(config: &DriveConfig) -> DriveResult<Self> {
        let sac =
            credentials::serviceaccount::from_file(&config.credential_path, &config.scopes).await?;
        tracing::info!(client_email = sac.client_email(), "authenticating service account");
        Self::with_endpoints(sac, config.endpoints.to_owned()).await
    }
}

impl<T> FileClient<T>
where
    T: TokenGenerator,
{
    /// Single page listing, truncated to the requested page size.
    pub async fn list(&self, files_list_request: &FilesListRequest) -> DriveResult<FileList> {
        let url = self.endpoints.files_url();
        tracing::debug!(%url, page_size = ?files_list_request.page_size, "listing files");
        let mut list: FileList = self
            .drive_client
            .get_as_json(&url, files_list_request)
            .await
            .map_err(Error::RemoteListError)?;
        if let Some(page_size) = files_list_request.page_size {
            list.files.truncate(page_size);
        }
        Ok(list)
    }

    pub async fn delete(&self, file_id: &str) -> DriveResult<()> {
        let url = self.endpoints.file_url(file_id);
        tracing::debug!(%url, "deleting file");
        self.drive_client
            .delete(&url)
            .await
            .map_err(|error| Error::RemoteDeleteError {
                file_id: file_id.to_owned(),
                error,
            })
    }

    pub async fn create(&self, metadata: &File, payload: &[u8]) -> DriveResult<File> {
        let url = self.endpoints.upload_url();
        tracing::debug!(%url, file = %metadata, size = payload.len(), "creating file");
        self.drive_client
            .send_multipart(
                Method::POST,
                &url,
                metadata,
                media_type(metadata),
                payload,
            )
            .await
            .map_err(|error| Error::RemoteCreateError {
                name: metadata.name.to_owned(),
                error,
            })
    }

    /// Replaces the content of `existing_file` and rewrites its name and mime type.
    pub async fn update(&self, existing_file: &File, payload: &[u8]) -> DriveResult<File> {
        let update_error = |error: RemoteError| Error::RemoteUpdateError {
            file_id: existing_file.id.to_owned(),
            error,
        };
        let file_id = existing_file
            .id
            .as_deref()
            .ok_or_else(|| update_error(RemoteError::MissingFileId))?;

        let url = self.endpoints.upload_file_url(file_id);
        tracing::debug!(%url, file = %existing_file, size = payload.len(), "updating file");
        self.drive_client
            .send_multipart(
                Method::PATCH,
                &url,
                &existing_file.update_metadata(),
                media_type(existing_file),
                payload,
            )
            .await
            .map_err(update_error)
    }
}

fn media_type(file: &File) -> &str {
    file.mime_type
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or(MimeType::OctetStream.as_str())
}

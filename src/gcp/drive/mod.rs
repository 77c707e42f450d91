mod client;
mod file;
mod resources;

pub use file::FileClient;
pub use resources::file::{
    Endpoints, File, FileList, FilesListRequest, DEFAULT_PAGE_SIZE, LIST_FIELDS,
};

pub mod credentials {

    pub mod serviceaccount {

        use crate::config::Scope;
        use crate::gcp::oauth2::token::ServiceAccountCredentials;

        fn joined(scopes: &[Scope]) -> String {
            scopes
                .iter()
                .map(Scope::as_str)
                .collect::<Vec<_>>()
                .join(" ")
        }

        pub fn from_str(
            str: &str,
            scopes: &[Scope],
        ) -> super::super::DriveResult<ServiceAccountCredentials> {
            ServiceAccountCredentials::from(str)
                .map(|x| x.with_scope(&joined(scopes)))
                .map_err(super::super::Error::CredentialError)
        }

        pub async fn from_file<T>(
            file_path: T,
            scopes: &[Scope],
        ) -> super::super::DriveResult<ServiceAccountCredentials>
        where
            T: AsRef<std::path::Path>,
        {
            ServiceAccountCredentials::from_file(file_path)
                .await
                .map(|x| x.with_scope(&joined(scopes)))
                .map_err(super::super::Error::CredentialError)
        }

    }
}

/// A single HTTP exchange with the Drive API failed.
#[derive(Debug)]
pub enum RemoteError {
    Token(super::oauth2::Error),
    Http(reqwest::Error),
    ResourceNotFound {
        url: String,
    },
    UnexpectedResponse {
        url: String,
        status: u16,
        value: String,
    },
    UnexpectedJson {
        url: String,
        expected_type: String,
        json: serde_json::Value,
    },
    InvalidMetadata {
        expected_type: String,
        error: serde_json::Error,
    },
    MissingFileId,
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl std::error::Error for RemoteError {}

impl RemoteError {
    fn invalid_metadata<T>(error: serde_json::Error) -> Self {
        Self::InvalidMetadata {
            expected_type: std::any::type_name::<T>().to_owned(),
            error,
        }
    }

    fn unexpected_response<T, U>(url: T, status: u16, value: U) -> Self
    where
        T: AsRef<str>,
        U: AsRef<str>,
    {
        Self::UnexpectedResponse {
            url: url.as_ref().to_owned(),
            status,
            value: value.as_ref().to_owned(),
        }
    }

    fn unexpected_json<T>(url: &str, json: serde_json::Value) -> Self {
        let expected_type = std::any::type_name::<T>().to_owned();
        Self::UnexpectedJson {
            url: url.to_owned(),
            expected_type,
            json,
        }
    }
}

#[derive(Debug)]
pub enum Error {
    CredentialError(super::oauth2::Error),
    ServiceInitError(super::oauth2::Error),
    RemoteListError(RemoteError),
    RemoteDeleteError {
        file_id: String,
        error: RemoteError,
    },
    RemoteCreateError {
        name: Option<String>,
        error: RemoteError,
    },
    RemoteUpdateError {
        file_id: Option<String>,
        error: RemoteError,
    },
    PayloadEncodingError(csv::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl std::error::Error for Error {}

impl Error {
    /// Token acquisition failed while building a client.
    ///
    /// A rejected scope or an unusable private key is a credential problem,
    /// anything else is a service bootstrap problem.
    pub(crate) fn bootstrap(error: super::oauth2::Error) -> Self {
        match error {
            e @ super::oauth2::Error::JWTError(_) => Self::CredentialError(e),
            e if e.is_scope_rejected() => Self::CredentialError(e),
            e => Self::ServiceInitError(e),
        }
    }

    /// No further step can run after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::CredentialError(_) | Self::ServiceInitError(_) | Self::PayloadEncodingError(_)
        )
    }
}

pub type DriveResult<T> = std::result::Result<T, Error>;
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

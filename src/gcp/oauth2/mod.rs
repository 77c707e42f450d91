pub mod token;

use std::path::Path;

#[derive(Debug)]
pub enum Error {
    DeserializationError {
        expected_type: String,
        error: serde_json::Error,
    },
    IoError {
        message: String,
        path: String,
        error: std::io::Error,
    },
    HttpError(reqwest::Error),
    JWTError(jsonwebtoken::errors::Error),
    MissingScope,
    UnexpectedApiResponse {
        expected_type: String,
        json: serde_json::Value,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl std::error::Error for Error {}

impl Error {
    pub fn unexpected_api_response<T>(json: serde_json::Value) -> Error {
        let expected_type = std::any::type_name::<T>().to_owned();
        Error::UnexpectedApiResponse {
            expected_type,
            json,
        }
    }

    pub fn io_error(message: &str, path: &Path, error: std::io::Error) -> Error {
        Error::IoError {
            message: message.to_owned(),
            path: path.display().to_string(),
            error,
        }
    }

    pub fn deserialization_error<T>(error: serde_json::Error) -> Error {
        let expected_type = std::any::type_name::<T>().to_owned();
        Error::DeserializationError {
            expected_type,
            error,
        }
    }

    /// The token endpoint answered but refused the requested scopes.
    pub fn is_scope_rejected(&self) -> bool {
        match self {
            Error::MissingScope => true,
            Error::UnexpectedApiResponse { json, .. } => {
                json.get("error").and_then(|e| e.as_str()) == Some("invalid_scope")
            }
            _ => false,
        }
    }
}

type TokenResult<T> = std::result::Result<T, Error>;

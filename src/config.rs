use std::{fmt::Display, path::PathBuf, str::FromStr};

use crate::drive::{Endpoints, File};

/// OAuth2 scopes understood by the Drive API.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Scope {
    /// Full access to every file the account can see.
    Drive,
    /// Access to files created or opened by this app only.
    DriveFile,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Drive => "https://www.googleapis.com/auth/drive",
            Scope::DriveFile => "https://www.googleapis.com/auth/drive.file",
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drive" | "https://www.googleapis.com/auth/drive" => Ok(Scope::Drive),
            "drive.file" | "https://www.googleapis.com/auth/drive.file" => Ok(Scope::DriveFile),
            _ => Err(format!(
                "unknown scope {s}, expected one of drive, drive.file"
            )),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MimeType {
    Png,
    Jpg,
    Jpeg,
    Csv,
    OctetStream,
}

impl MimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Png => "image/png",
            MimeType::Jpg => "image/jpg",
            MimeType::Jpeg => "image/jpeg",
            MimeType::Csv => "text/csv",
            MimeType::OctetStream => "application/octet-stream",
        }
    }
}

impl Display for MimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MimeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "png" | "image/png" => Ok(MimeType::Png),
            "jpg" | "image/jpg" => Ok(MimeType::Jpg),
            "jpeg" | "image/jpeg" => Ok(MimeType::Jpeg),
            "csv" | "text/csv" => Ok(MimeType::Csv),
            "octet-stream" | "application/octet-stream" => Ok(MimeType::OctetStream),
            _ => Err(format!(
                "unknown mime type {s}, expected one of png, jpg, jpeg, csv, octet-stream"
            )),
        }
    }
}

pub const DEFAULT_FILE_NAME: &str = "test.csv";

/// Everything needed to replace one file in one Drive folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveConfig {
    pub credential_path: PathBuf,
    pub scopes: Vec<Scope>,
    pub folder_id: String,
    pub file_name: String,
    pub mime_type: MimeType,
    pub page_size: usize,
    pub endpoints: Endpoints,
}

impl DriveConfig {
    pub fn new<P: Into<PathBuf>>(credential_path: P, folder_id: &str) -> Self {
        Self {
            credential_path: credential_path.into(),
            scopes: vec![Scope::Drive, Scope::DriveFile],
            folder_id: folder_id.to_owned(),
            file_name: DEFAULT_FILE_NAME.to_owned(),
            mime_type: MimeType::Csv,
            page_size: crate::drive::DEFAULT_PAGE_SIZE,
            endpoints: Endpoints::default(),
        }
    }

    pub fn with_scopes(mut self, scopes: Vec<Scope>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.file_name = file_name.to_owned();
        self
    }

    pub fn with_mime_type(mut self, mime_type: MimeType) -> Self {
        self.mime_type = mime_type;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Metadata of the file to upload into the configured folder.
    pub fn file_metadata(&self) -> File {
        File::new(
            &self.file_name,
            self.mime_type.as_str(),
            vec![self.folder_id.to_owned()],
        )
    }
}

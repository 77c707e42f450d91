use std::fmt::Display;

/// Fields kept by a listing: identifiers and names only.
pub const LIST_FIELDS: &str = "files(id, name)";
pub const DEFAULT_PAGE_SIZE: usize = 10;

const BASE_URL: &str = "https://www.googleapis.com/drive/v3";
const UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

fn percent_encode(input: &str) -> String {
    percent_encoding::utf8_percent_encode(input, percent_encoding::NON_ALPHANUMERIC).to_string()
}

/// See [Drive list API reference](https://developers.google.com/drive/api/reference/rest/v3/files/list)
#[derive(Debug, PartialEq, Eq, serde::Serialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FilesListRequest {
    /// [Partial Response](https://developers.google.com/drive/api/guides/fields-parameter)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_all_drives: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_items_from_all_drives: Option<bool>,
}

impl FilesListRequest {
    /// First page of ids and names across every drive the account can see.
    pub fn first_page(page_size: usize) -> Self {
        Self {
            fields: Some(LIST_FIELDS.to_owned()),
            page_size: Some(page_size),
            supports_all_drives: Some(true),
            include_items_from_all_drives: Some(true),
        }
    }
}

/// FileList response
#[derive(Debug, serde::Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    pub kind: Option<String>,

    #[serde(default = "Vec::new")]
    pub files: Vec<File>,

    pub next_page_token: Option<String>,

    pub incomplete_search: Option<bool>,
}

impl FileList {
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a File> + 'a {
        self.files
            .iter()
            .filter(move |f| f.name.as_deref() == Some(name))
    }
}

/// Drive file resource. Every field is optional since responses follow the requested projection.
#[derive(Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct File {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    #[serde(skip_serializing)]
    pub kind: Option<String>,
}

impl Display for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({})",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.id.as_deref().unwrap_or("<no id>")
        )
    }
}

impl File {
    pub fn new(name: &str, mime_type: &str, parents: Vec<String>) -> Self {
        Self {
            name: Some(name.to_owned()),
            mime_type: Some(mime_type.to_owned()),
            parents,
            ..Default::default()
        }
    }

    /// Metadata accepted by an update: the id lives in the url and parents are read only there.
    pub(crate) fn update_metadata(&self) -> Self {
        Self {
            name: self.name.to_owned(),
            mime_type: self.mime_type.to_owned(),
            ..Default::default()
        }
    }
}

/// Base urls of the Drive API, Google's by default.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Endpoints {
    base_url: String,
    upload_base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(BASE_URL, UPLOAD_BASE_URL)
    }
}

impl Endpoints {
    pub fn new(base_url: &str, upload_base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            upload_base_url: upload_base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn files_url(&self) -> String {
        format!("{}/files", self.base_url)
    }

    pub fn file_url(&self, file_id: &str) -> String {
        format!(
            "{}/files/{}?supportsAllDrives=true",
            self.base_url,
            percent_encode(file_id)
        )
    }

    pub fn upload_url(&self) -> String {
        format!(
            "{}/files?uploadType=multipart&supportsAllDrives=true",
            self.upload_base_url
        )
    }

    pub fn upload_file_url(&self, file_id: &str) -> String {
        format!(
            "{}/files/{}?uploadType=multipart&supportsAllDrives=true",
            self.upload_base_url,
            percent_encode(file_id)
        )
    }
}

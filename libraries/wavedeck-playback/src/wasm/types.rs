//! JS-compatible type definitions

use crate::error::{PlaybackError, Result};
use crate::source::{AudioSource, ObjectUrl, UploadedFile};
use serde::{Deserialize, Serialize};

/// Catalog entry view handed to the page for selector rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceView {
    pub name: String,
    pub url: String,
}

impl From<&AudioSource> for SourceView {
    fn from(source: &AudioSource) -> Self {
        Self {
            name: source.name.clone(),
            url: source.url().to_string(),
        }
    }
}

/// Default-catalog entry accepted by the constructor
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedEntry {
    pub name: String,
    pub url: String,
}

/// Upload adapter over a browser `File`
///
/// Minted object URLs are revoked through `URL.revokeObjectURL` when the
/// owning handle drops.
pub struct WebFileUpload {
    file: web_sys::File,
}

impl WebFileUpload {
    pub fn new(file: web_sys::File) -> Self {
        Self { file }
    }
}

impl UploadedFile for WebFileUpload {
    fn file_name(&self) -> String {
        self.file.name()
    }

    fn object_url(&self) -> Result<ObjectUrl> {
        let url = web_sys::Url::create_object_url_with_blob(&self.file)
            .map_err(|err| PlaybackError::UploadFailed(format!("{err:?}")))?;

        Ok(ObjectUrl::new(url, |url| {
            let _ = web_sys::Url::revoke_object_url(url);
        }))
    }
}

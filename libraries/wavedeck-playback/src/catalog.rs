//! Source catalog
//!
//! Ordered, append-only list of selectable sources: the seeded defaults
//! first, then every accepted upload in arrival order. Duplicate uploads are
//! allowed and each becomes its own entry.

use crate::error::{PlaybackError, Result};
use crate::source::{AudioSource, SourceRef, UploadedFile};

/// The selectable sources, in selector order
#[derive(Debug, Default)]
pub struct SourceCatalog {
    entries: Vec<AudioSource>,
}

impl SourceCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-populated with the given sources
    pub fn seeded(defaults: impl IntoIterator<Item = AudioSource>) -> Self {
        Self {
            entries: defaults.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AudioSource> {
        self.entries.iter()
    }

    /// Look up a source by selector index
    pub fn get(&self, index: usize) -> Result<&AudioSource> {
        self.entries
            .get(index)
            .ok_or(PlaybackError::InvalidSelection {
                index,
                len: self.entries.len(),
            })
    }

    /// Position of the entry with the given reference, if present
    pub fn index_of(&self, reference: &SourceRef) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.reference == *reference)
    }

    /// Validate and append an uploaded file
    ///
    /// The type policy runs first, so a rejected file never mints an object
    /// URL. Returns the new entry for the caller to select.
    pub fn add_upload(&mut self, file: &dyn UploadedFile) -> Result<AudioSource> {
        let name = file.file_name();
        if !is_mp3(&name) {
            tracing::warn!(file = %name, "upload rejected by type policy");
            return Err(PlaybackError::UnsupportedFileType(name));
        }

        let url = file.object_url()?;
        let source = AudioSource::uploaded(name, url);
        tracing::debug!(name = %source.name, "upload accepted");

        self.entries.push(source.clone());
        Ok(source)
    }

    /// Drop every entry, releasing uploaded object URLs still owned here
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Extension-only check; file contents are never inspected
fn is_mp3(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case("mp3"))
}

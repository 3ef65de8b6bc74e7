//! Audio sources and the owned object-URL handle
//!
//! A source is a named, loadable reference: either a bundled asset URL or a
//! temporary object URL minted for an uploaded file. Object URLs hold a real
//! browser resource, so they are modeled as an owned handle that revokes
//! itself when the last alias is dropped.

use crate::error::Result;
use std::fmt;
use std::rc::Rc;

type Revoker = Box<dyn Fn(&str)>;

/// Owned, revocable object URL
///
/// Wraps a URL string together with the callback that releases it. The
/// revoker runs exactly once, on drop. Catalog entries and the active source
/// alias one handle through [`Rc`], so release happens when the controller
/// lets go of the last reference.
pub struct ObjectUrl {
    url: String,
    revoke: Option<Revoker>,
}

impl ObjectUrl {
    /// Create a handle that calls `revoke` with the URL on drop
    pub fn new(url: impl Into<String>, revoke: impl Fn(&str) + 'static) -> Self {
        Self {
            url: url.into(),
            revoke: Some(Box::new(revoke)),
        }
    }

    /// The underlying URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if let Some(revoke) = self.revoke.take() {
            revoke(&self.url);
        }
    }
}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectUrl").field("url", &self.url).finish()
    }
}

/// A loadable reference to audio data
#[derive(Debug, Clone)]
pub enum SourceRef {
    /// Bundled asset or otherwise stable URL
    Static(String),

    /// Temporary object URL for an uploaded file
    Upload(Rc<ObjectUrl>),
}

impl SourceRef {
    /// The URL handed to the engine's `load`
    pub fn url(&self) -> &str {
        match self {
            SourceRef::Static(url) => url,
            SourceRef::Upload(handle) => handle.url(),
        }
    }
}

// Source identity is the reference itself, not the display name.
impl PartialEq for SourceRef {
    fn eq(&self, other: &Self) -> bool {
        self.url() == other.url()
    }
}

/// A named, loadable audio source
///
/// Duplicate uploads are allowed; each gets its own entry and its own URL.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSource {
    /// Display name shown in the selector and the "Playing:" line
    pub name: String,

    /// Loadable reference; identity is by reference
    pub reference: SourceRef,
}

impl AudioSource {
    /// Create a source backed by a bundled asset URL
    pub fn bundled(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference: SourceRef::Static(url.into()),
        }
    }

    /// Create a source backed by an uploaded file's object URL
    pub fn uploaded(name: impl Into<String>, url: ObjectUrl) -> Self {
        Self {
            name: name.into(),
            reference: SourceRef::Upload(Rc::new(url)),
        }
    }

    /// The URL handed to the engine's `load`
    pub fn url(&self) -> &str {
        self.reference.url()
    }
}

/// A file-like object offered for upload
///
/// Implemented over `web_sys::File` in the browser layer and over plain
/// fakes in tests. `object_url` is only called for files that passed the
/// type policy, so rejected uploads never mint a URL.
pub trait UploadedFile {
    /// The file's own name, used both for the policy check and for display
    fn file_name(&self) -> String;

    /// Mint a temporary playable reference for the file's contents
    fn object_url(&self) -> Result<ObjectUrl>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn revokes_once_on_last_drop() {
        let revoked = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&revoked);
        let handle = ObjectUrl::new("blob:a", move |url| log.borrow_mut().push(url.to_string()));

        let source = AudioSource::uploaded("a.mp3", handle);
        let alias = source.clone();

        drop(source);
        assert!(revoked.borrow().is_empty());

        drop(alias);
        assert_eq!(*revoked.borrow(), vec!["blob:a".to_string()]);
    }

    #[test]
    fn identity_is_by_reference() {
        let a = AudioSource::bundled("First", "/audio/one.mp3");
        let b = AudioSource::bundled("Second", "/audio/one.mp3");
        let c = AudioSource::bundled("First", "/audio/two.mp3");

        assert_eq!(a.reference, b.reference);
        assert_ne!(a.reference, c.reference);
    }
}

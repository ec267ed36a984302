//! Image store collaborators.

use crate::util::{HomingError, HomingResult, Missing};
use crate::view::RawImage;
use std::collections::HashMap;

#[cfg(feature = "image-io")]
use std::path::{Path, PathBuf};

/// Resolves a stored view's filename to decoded pixel data.
pub trait ImageStore {
    /// Returns the decoded image, `NotFound` if absent or `Decode` if unreadable.
    fn load(&self, filename: &str) -> HomingResult<RawImage>;
}

impl<S: ImageStore + ?Sized> ImageStore for &S {
    fn load(&self, filename: &str) -> HomingResult<RawImage> {
        (**self).load(filename)
    }
}

/// In-memory image store, keyed by filename.
#[derive(Clone, Debug, Default)]
pub struct MemoryImageStore {
    images: HashMap<String, RawImage>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the image for `filename`.
    pub fn insert(&mut self, filename: impl Into<String>, image: RawImage) {
        self.images.insert(filename.into(), image);
    }

    /// Removes the image for `filename`, returning it if present.
    pub fn remove(&mut self, filename: &str) -> Option<RawImage> {
        self.images.remove(filename)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageStore for MemoryImageStore {
    fn load(&self, filename: &str) -> HomingResult<RawImage> {
        self.images
            .get(filename)
            .cloned()
            .ok_or_else(|| HomingError::NotFound(Missing::Image(filename.to_owned())))
    }
}

/// Image store reading files below a root directory.
///
/// Available when the `image-io` feature is enabled.
#[cfg(feature = "image-io")]
#[derive(Clone, Debug)]
pub struct DirImageStore {
    root: PathBuf,
}

#[cfg(feature = "image-io")]
impl DirImageStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(feature = "image-io")]
impl ImageStore for DirImageStore {
    fn load(&self, filename: &str) -> HomingResult<RawImage> {
        let path = self.root.join(filename);
        crate::view::io::load_raw_image(&path).map_err(|err| match err {
            HomingError::NotFound(_) => HomingError::NotFound(Missing::Image(filename.to_owned())),
            other => other,
        })
    }
}

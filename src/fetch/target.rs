//! Destination validation.

use crate::error::{FetchError, Result};
use dashgrab_av::Container;
use std::path::{Path, PathBuf};

/// A destination that passed validation: its parent exists, nothing lives at
/// the path yet, and its extension is one the operation produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    path: PathBuf,
    container: Container,
}

impl DownloadTarget {
    /// Validate `path` against the `accepted` containers.
    ///
    /// Checks run in order (parent, existence, extension) and touch nothing
    /// but file metadata.
    pub fn validate(path: &Path, accepted: &[Container]) -> Result<Self> {
        // A bare file name lives in the current directory.
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        if !parent.is_dir() {
            return Err(FetchError::DestinationParentMissing(path.to_path_buf()));
        }

        // symlink_metadata so a dangling symlink still counts as taken.
        if path.symlink_metadata().is_ok() {
            return Err(FetchError::DestinationExists(path.to_path_buf()));
        }

        let container = Container::from_path(path)
            .filter(|c| accepted.contains(c))
            .ok_or_else(|| FetchError::UnsupportedExtension {
                path: path.to_path_buf(),
                expected: Container::describe(accepted),
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            container,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn container(&self) -> Container {
        self.container
    }
}

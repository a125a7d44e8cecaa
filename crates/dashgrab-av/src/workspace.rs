//! Scoped temporary files and finalization.
//!
//! A [`TempArtifact`] names a file in the working directory that belongs to a
//! single fetch. The file is removed when the artifact is dropped, unless it
//! has already been moved into place by [`TempArtifact::persist`].

use crate::{Container, Error, Result};
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// `strftime` pattern used in artifact names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Current local time formatted for artifact names, e.g. `20240131_235959`.
pub fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// File name of an artifact: `tmp_<kind>_<stamp>.<ext>`.
pub fn artifact_name(kind: &str, stamp: &str, container: Container) -> String {
    format!("tmp_{}_{}.{}", kind, stamp, container.extension())
}

/// A temp file owned by one fetch, deleted on drop.
///
/// # Example
///
/// ```no_run
/// use dashgrab_av::{workspace, Container, TempArtifact};
/// use std::path::Path;
///
/// let stamp = workspace::timestamp();
/// let audio = TempArtifact::new(Path::new("."), "audio", &stamp, Container::Opus)?;
/// // ... download into audio.path() ...
/// audio.persist(Path::new("song.opus"))?;
/// # Ok::<(), dashgrab_av::Error>(())
/// ```
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    /// Reserve `dir/tmp_<kind>_<stamp>.<ext>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArtifactExists`] if something already lives at that
    /// path; the artifact would otherwise delete a file it never created.
    pub fn new(dir: &Path, kind: &str, stamp: &str, container: Container) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::InvalidInput(format!(
                "working directory does not exist: {}",
                dir.display()
            )));
        }

        let path = dir.join(artifact_name(kind, stamp, container));

        if path.exists() {
            return Err(Error::ArtifactExists { path });
        }

        tracing::trace!("Reserved temp artifact {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the artifact lives in.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Bare file name of the artifact.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Move the finished artifact to `destination`.
    pub fn persist(self, destination: &Path) -> Result<PathBuf> {
        move_into_place(&self.path, destination)?;
        Ok(destination.to_path_buf())
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed temp artifact {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "Failed to remove temp artifact {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Move `src` to `dest` without ever replacing an existing file.
///
/// On one filesystem the file is hard-linked to `dest` and then unlinked from
/// `src`; the link fails with `AlreadyExists` if anything took `dest` in the
/// meantime. Across filesystems the data is copied into a uniquely named
/// hidden staging file next to `dest`, which is then persisted without
/// clobbering, so `dest` only ever appears complete.
pub fn move_into_place(src: &Path, dest: &Path) -> Result<()> {
    if !src.exists() {
        return Err(Error::InvalidInput(format!(
            "output file does not exist: {}",
            src.display()
        )));
    }

    if dest.symlink_metadata().is_ok() {
        return Err(already_exists(dest));
    }

    match std::fs::hard_link(src, dest) {
        Ok(()) => {
            std::fs::remove_file(src)?;
            tracing::debug!("Moved {} -> {}", src.display(), dest.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(already_exists(dest)),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            tracing::debug!(
                "{} and {} are on different filesystems, copying",
                src.display(),
                dest.display()
            );
            copy_into_place(src, dest)
        }
        Err(e) => Err(e.into()),
    }
}

fn copy_into_place(src: &Path, dest: &Path) -> Result<()> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    // Random name, created exclusively; removed on drop if anything fails.
    let mut staging = tempfile::Builder::new()
        .prefix(".dashgrab-")
        .suffix(".part")
        .tempfile_in(dir)?;

    let mut source = File::open(src)?;
    std::io::copy(&mut source, staging.as_file_mut())?;
    staging.as_file().sync_all()?;
    std::fs::set_permissions(staging.path(), source.metadata()?.permissions())?;

    staging.persist_noclobber(dest).map_err(|e| {
        if e.error.kind() == ErrorKind::AlreadyExists {
            already_exists(dest)
        } else {
            Error::Io(e.error)
        }
    })?;

    if let Err(e) = std::fs::remove_file(src) {
        tracing::warn!("Failed to remove {} after copy: {}", src.display(), e);
    }
    Ok(())
}

fn already_exists(dest: &Path) -> Error {
    Error::Io(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("refusing to overwrite {}", dest.display()),
    ))
}

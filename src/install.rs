//! Installs a built site into a publishing directory (e.g., a repository's
//! `docs/` folder). The target is always rebuilt from scratch: whatever was
//! there before is deleted, then the generated pages, marker files and every
//! non-hidden subdirectory of the source directory are copied in.

use log::debug;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Page templates live next to the pages they produce but are not part of
/// the site.
const TEMPLATE_SUFFIX: &str = "_template.html";
const HTML_EXTENSION: &str = "html";

/// Copies the site in `source_directory` into a fresh `target_directory`.
/// `markers` are file names (like `CNAME` or `.nojekyll`) that are copied when
/// present.
pub fn install_into(
    source_directory: &Path,
    target_directory: &Path,
    markers: &[String],
) -> Result<()> {
    clean(target_directory)?;
    fs::create_dir_all(target_directory).map_err(|err| Error::Create {
        path: target_directory.to_owned(),
        err,
    })?;

    // The target may itself live inside the source directory; never copy it
    // into itself.
    let target_canonical = fs::canonicalize(target_directory)?;

    let mut entries = fs::read_dir(source_directory)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        let path = entry.path();

        // `is_dir` follows symlinks, so linked asset directories are copied
        // like real ones.
        if path.is_dir() {
            if name.starts_with('.') {
                debug!("Skipping hidden directory '{}'", path.display());
            } else if fs::canonicalize(&path)? == target_canonical {
                debug!("Skipping install target '{}'", path.display());
            } else {
                copy_dir(&path, &target_directory.join(&file_name), &target_canonical)?;
            }
        } else if is_page(&path, &name) || markers.iter().any(|m| *m == name) {
            copy_file(&path, &target_directory.join(&file_name))?;
        }
    }

    Ok(())
}

/// Reports whether a top-level file is a generated page (as opposed to a
/// template or some other source file).
fn is_page(path: &Path, name: &str) -> bool {
    path.extension().map_or(false, |ext| ext == HTML_EXTENSION)
        && !name.contains(TEMPLATE_SUFFIX)
        && path.is_file()
}

/// Recursively copies `src` into `dst`, following symlinks. `target` (the
/// canonical install directory) is never descended into, wherever it sits
/// below `src`.
fn copy_dir(src: &Path, dst: &Path, target: &Path) -> Result<()> {
    let walker = WalkDir::new(src)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !is_target(entry, target));
    for result in walker {
        let entry = result?;
        // strip_prefix shouldn't fail since `src` is always an ancestor of
        // the entries WalkDir yields for it
        let relative = entry.path().strip_prefix(src).unwrap_or(Path::new(""));
        let destination = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination).map_err(|err| Error::Create {
                path: destination.clone(),
                err,
            })?;
        } else {
            copy_file(entry.path(), &destination)?;
        }
    }
    Ok(())
}

fn is_target(entry: &walkdir::DirEntry, target: &Path) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let skip = fs::canonicalize(entry.path()).map_or(false, |path| path == target);
    if skip {
        debug!("Skipping install target '{}'", entry.path().display());
    }
    skip
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    debug!("Copying '{}' to '{}'", from.display(), to.display());
    fs::copy(from, to).map_err(|err| Error::Copy {
        from: from.to_owned(),
        to: to.to_owned(),
        err,
    })?;
    Ok(())
}

/// Removes whatever occupies `path`. A missing path is fine.
fn clean(path: &Path) -> Result<()> {
    let result = match fs::symlink_metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => Err(e),
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
    };
    result.map_err(|err| Error::Clean {
        path: path.to_owned(),
        err,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for installing a site. Any filesystem problem aborts the
/// install.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while removing the old target.
    Clean { path: PathBuf, err: io::Error },

    /// Returned for I/O problems while creating directories in the target.
    Create { path: PathBuf, err: io::Error },

    /// Returned for I/O problems while copying a file.
    Copy {
        from: PathBuf,
        to: PathBuf,
        err: io::Error,
    },

    /// Returned for errors walking a subdirectory.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Clean { path, err } => {
                write!(f, "Cleaning install target '{}': {}", path.display(), err)
            }
            Error::Create { path, err } => {
                write!(f, "Creating directory '{}': {}", path.display(), err)
            }
            Error::Copy { from, to, err } => write!(
                f,
                "Copying '{}' to '{}': {}",
                from.display(),
                to.display(),
                err
            ),
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Clean { path: _, err } => Some(err),
            Error::Create { path: _, err } => Some(err),
            Error::Copy { err, .. } => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    /// Converts [`io::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

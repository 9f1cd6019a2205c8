//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the site: finding the markdown pages, rendering each one
//! through the page template ([`crate::write`]), and installing the result
//! into the publishing directory ([`crate::install`]).

use crate::config::Config;
use crate::install::{install_into, Error as InstallError};
use crate::write::{Error as WriteError, Writer};
use log::{info, warn};
use std::fmt;
use std::fs::read_dir;
use std::io;
use std::path::{Path, PathBuf};

const MARKDOWN_EXTENSION: &str = "md";

/// Builds the site from a [`Config`]. Pages are rendered in file-name order;
/// the first failure stops the build, leaving pages already written in place.
/// Returns the paths of the pages written.
pub fn build_site(config: &Config) -> Result<Vec<PathBuf>> {
    let sources = markdown_files(&config.source_directory)?;

    let mut written = Vec::with_capacity(sources.len());
    if sources.is_empty() {
        warn!(
            "No markdown files found in '{}'",
            config.source_directory.display()
        );
    } else {
        let writer = Writer::new(&config.source_directory, &config.template)?;
        for source in &sources {
            let page = writer.write_page(source)?;
            info!("Wrote '{}'", page.display());
            written.push(page);
        }
    }

    if let Some(target) = &config.install_directory {
        install_into(&config.source_directory, target, &config.markers)?;
        info!("Installed site into '{}'", target.display());
    }

    Ok(written)
}

/// Lists the non-hidden `*.md` files directly inside `dir`, sorted by name.
fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for result in read_dir(dir).map_err(|err| Error::ReadSourceDirectory {
        path: dir.to_owned(),
        err,
    })? {
        let entry = result?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden
            && path.extension().map_or(false, |ext| ext == MARKDOWN_EXTENSION)
            && path.is_file()
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during page writing,
/// installing, or reading the source directory.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors rendering or writing a page.
    Write(WriteError),

    /// Returned for errors installing the site.
    Install(InstallError),

    /// Returned when the source directory can't be listed.
    ReadSourceDirectory { path: PathBuf, err: io::Error },

    /// Returned for other I/O errors.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Write(err) => err.fmt(f),
            Error::Install(err) => err.fmt(f),
            Error::ReadSourceDirectory { path, err } => {
                write!(f, "Reading source directory '{}': {}", path.display(), err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Write(err) => Some(err),
            Error::Install(err) => Some(err),
            Error::ReadSourceDirectory { path: _, err } => Some(err),
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

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<InstallError> for Error {
    /// Converts [`InstallError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: InstallError) -> Error {
        Error::Install(err)
    }
}

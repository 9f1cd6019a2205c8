//! Command-line arguments and the optional `site.yaml` project file, merged
//! into a single [`Config`].

use clap::Parser;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

pub const USAGE: &str = "sitebuild <source_dir> [target_dir]";
pub const PROJECT_FILE: &str = "site.yaml";
pub const DEFAULT_TEMPLATE: &str = "basic_template.html";
pub const DEFAULT_MARKERS: [&str; 2] = ["CNAME", ".nojekyll"];

/// Builds every markdown page in a directory into HTML and optionally
/// installs the site into a publishing directory.
#[derive(Parser, Debug, Default)]
#[command(name = "sitebuild", version, override_usage = USAGE)]
pub struct Args {
    /// Directory holding the markdown pages and the page template.
    pub source_dir: Option<PathBuf>,

    /// Directory to install the finished site into. It is deleted and
    /// recreated.
    pub target_dir: Option<PathBuf>,

    /// Page template file name, relative to the source directory.
    #[arg(long)]
    pub template: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct Project {
    #[serde(default)]
    template: Option<String>,

    #[serde(default)]
    markers: Option<Vec<String>>,
}

/// Everything a build needs to know.
#[derive(Debug, PartialEq)]
pub struct Config {
    /// Directory holding the markdown pages. Pages are written next to their
    /// sources and templates are looked up here.
    pub source_directory: PathBuf,

    /// Absolute path of the install target, if installing.
    pub install_directory: Option<PathBuf>,

    /// Page template file name, relative to `source_directory`.
    pub template: String,

    /// Marker files copied into the install target when present.
    pub markers: Vec<String>,
}

impl Config {
    /// Builds a [`Config`] from parsed arguments. A missing source directory
    /// is reported before anything on disk is looked at.
    pub fn from_args(args: Args) -> Result<Config> {
        let source_directory = args.source_dir.ok_or(Error::MissingArgument { usage: USAGE })?;

        // Resolve before anything else so a relative target means relative to
        // where we were invoked.
        let install_directory = match args.target_dir {
            Some(dir) => Some(std::path::absolute(dir)?),
            None => None,
        };

        let project = Config::load_project(&source_directory.join(PROJECT_FILE))?;

        Ok(Config {
            source_directory,
            install_directory,
            template: args
                .template
                .or(project.template)
                .unwrap_or_else(|| DEFAULT_TEMPLATE.to_owned()),
            markers: project
                .markers
                .unwrap_or_else(|| DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect()),
        })
    }

    fn load_project(path: &Path) -> Result<Project> {
        if !path.is_file() {
            return Ok(Project::default());
        }
        let file = File::open(path).map_err(|err| Error::OpenProject {
            path: path.to_owned(),
            err,
        })?;
        serde_yaml::from_reader(file).map_err(|err| Error::DeserializeYaml {
            path: path.to_owned(),
            err,
        })
    }
}

/// Represents the result of loading a [`Config`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a [`Config`].
#[derive(Debug)]
pub enum Error {
    /// Returned when no source directory was given.
    MissingArgument { usage: &'static str },

    /// Returned when `site.yaml` exists but can't be opened.
    OpenProject { path: PathBuf, err: io::Error },

    /// Returned when `site.yaml` isn't valid.
    DeserializeYaml {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned for other I/O errors.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingArgument { usage } => {
                write!(f, "Incorrect arguments. Usage:\n\n{}\n", usage)
            }
            Error::OpenProject { path, err } => {
                write!(f, "Opening project file '{}': {}", path.display(), err)
            }
            Error::DeserializeYaml { path, err } => {
                write!(f, "Loading project file '{}': {}", path.display(), err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingArgument { .. } => None,
            Error::OpenProject { path: _, err } => Some(err),
            Error::DeserializeYaml { path: _, err } => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    /// Converts a [`io::Error`] into an [`Error`]. It allows us to use the `?`
    /// operator for fallible I/O functions.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_missing_source_directory() {
        let err = Config::from_args(args(&["sitebuild"])).unwrap_err();
        assert!(matches!(err, Error::MissingArgument { usage: USAGE }));
        assert!(err.to_string().contains(USAGE));
    }

    #[test]
    fn test_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().to_str().unwrap();
        let config = Config::from_args(args(&["sitebuild", source])).unwrap();
        assert_eq!(
            config,
            Config {
                source_directory: dir.path().to_owned(),
                install_directory: None,
                template: DEFAULT_TEMPLATE.to_owned(),
                markers: vec!["CNAME".to_owned(), ".nojekyll".to_owned()],
            }
        );
    }

    #[test]
    fn test_relative_target_is_made_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().to_str().unwrap();
        let config = Config::from_args(args(&["sitebuild", source, "out/docs"])).unwrap();
        let install = config.install_directory.unwrap();
        assert!(install.is_absolute());
        assert!(install.ends_with("out/docs"));
    }

    #[test]
    fn test_project_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(PROJECT_FILE),
            "template: page_template.html\nmarkers: [CNAME]\n",
        )
        .unwrap();
        let source = dir.path().to_str().unwrap();

        let config = Config::from_args(args(&["sitebuild", source])).unwrap();
        assert_eq!(config.template, "page_template.html");
        assert_eq!(config.markers, vec!["CNAME".to_owned()]);

        let config =
            Config::from_args(args(&["sitebuild", source, "--template", "x_template.html"]))
                .unwrap();
        assert_eq!(config.template, "x_template.html");
    }

    #[test]
    fn test_bad_project_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PROJECT_FILE), "theme: dark\n").unwrap();
        let source = dir.path().to_str().unwrap();
        assert!(matches!(
            Config::from_args(args(&["sitebuild", source])),
            Err(Error::DeserializeYaml { .. })
        ));
    }
}

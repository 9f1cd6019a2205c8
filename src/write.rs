use crate::decorate::decorate;
use crate::hover::HoverFunction;
use crate::markdown;
use log::debug;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tera::{Context, Tera};

/// `{% include "x" %}`, `{% extends "x" %}` and `{% import "x" as y %}`.
static TEMPLATE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{%-?\s*(?:include|extends|import)\s+["']([^"']+)["']"#).unwrap()
});

/// Responsible for templating and writing HTML pages to disk from markdown
/// sources.
pub struct Writer<'a> {
    /// The template engine, holding the page template and every template it
    /// pulls in.
    tera: Tera,

    /// The name the page template is registered under (its file name
    /// relative to the source directory).
    template: &'a str,
}

/// The single value exposed to the page template, available as
/// `{{ session.content }}`.
#[derive(Serialize)]
struct Session<'a> {
    content: &'a str,
}

impl<'a> Writer<'a> {
    /// Loads `template` from `source_directory`, along with any templates it
    /// includes, extends or imports (looked up by name in the same
    /// directory), and registers the `hover` function against that directory.
    ///
    /// Autoescaping is off: the only thing the template ever sees is HTML we
    /// rendered ourselves.
    pub fn new(source_directory: &Path, template: &'a str) -> Result<Writer<'a>> {
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        tera.register_function("hover", HoverFunction::new(source_directory));
        tera.add_raw_templates(load_templates(source_directory, template)?)?;
        Ok(Writer { tera, template })
    }

    /// Converts `markdown` to decorated HTML and renders it through the page
    /// template.
    pub fn render(&self, markdown: &str) -> Result<String> {
        let content = decorate(&markdown::to_html(markdown));
        let mut context = Context::new();
        context.insert("session", &Session { content: &content });
        Ok(self.tera.render(self.template, &context)?)
    }

    /// Renders `markdown_file` and writes the result next to it with an
    /// `.html` extension, overwriting whatever was there. Returns the output
    /// path.
    pub fn write_page(&self, markdown_file: &Path) -> Result<PathBuf> {
        let source = std::fs::read_to_string(markdown_file).map_err(|err| Error::ReadSource {
            path: markdown_file.to_owned(),
            err,
        })?;
        let output = self.render(&source)?;
        let output_path = markdown_file.with_extension("html");
        std::fs::write(&output_path, output).map_err(|err| Error::WriteOutput {
            path: output_path.clone(),
            err,
        })?;
        Ok(output_path)
    }
}

/// Reads `template` and, transitively, the templates it references. The page
/// template must exist; a missing referenced template is left for tera to
/// report at render time (or ignore, for `ignore missing` includes).
fn load_templates(source_directory: &Path, template: &str) -> Result<Vec<(String, String)>> {
    let mut templates = Vec::new();
    let mut seen = HashSet::new();
    seen.insert(template.to_owned());
    let mut pending = vec![template.to_owned()];

    while let Some(name) = pending.pop() {
        let path = source_directory.join(&name);
        let source = match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(err) if name != template && err.kind() == io::ErrorKind::NotFound => {
                debug!("Referenced template '{}' not found", path.display());
                continue;
            }
            Err(err) => {
                return Err(Error::Template(tera::Error::chain(
                    format!("Couldn't open template '{}'", path.display()),
                    err,
                )))
            }
        };
        for caps in TEMPLATE_REF_RE.captures_iter(&source) {
            if seen.insert(caps[1].to_owned()) {
                pending.push(caps[1].to_owned());
            }
        }
        templates.push((name, source));
    }

    Ok(templates)
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error loading or rendering the template.
    Template(tera::Error),

    /// An error reading a markdown source file.
    ReadSource { path: PathBuf, err: io::Error },

    /// An error writing an output file.
    WriteOutput { path: PathBuf, err: io::Error },
}

impl From<tera::Error> for Error {
    /// Converts a [`tera::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible template operations.
    fn from(err: tera::Error) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => write!(f, "Template error: {}", err),
            Error::ReadSource { path, err } => {
                write!(f, "Reading markdown file '{}': {}", path.display(), err)
            }
            Error::WriteOutput { path, err } => {
                write!(f, "Writing page '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            Error::ReadSource { path: _, err } => Some(err),
            Error::WriteOutput { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const TEMPLATE: &str = "basic_template.html";

    fn source_dir(template: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(TEMPLATE), template).unwrap();
        dir
    }

    #[test]
    fn test_write_page() {
        let dir = source_dir("<body>{{ session.content }}</body>");
        fs::write(dir.path().join("a.md"), "# Hello\n\n---\n\nWorld").unwrap();

        let writer = Writer::new(dir.path(), TEMPLATE).unwrap();
        let written = writer.write_page(&dir.path().join("a.md")).unwrap();
        assert_eq!(written, dir.path().join("a.html"));

        let html = fs::read_to_string(&written).unwrap();
        let open = r#"<div class="container bg-light rounded mx-auto"><div class="m-3 p-3">"#;
        assert!(html.starts_with("<body><br/><br/>"));
        assert_eq!(html.matches(open).count(), 2);
        let sections: Vec<&str> = html.split(open).skip(1).collect();
        assert!(sections[0].contains(r#"<h1 id="hello">Hello</h1>"#));
        assert!(!sections[0].contains("World"));
        assert!(sections[1].contains("<p>World</p>"));
    }

    #[test]
    fn test_write_page_overwrites() {
        let dir = source_dir("{{ session.content }}");
        fs::write(dir.path().join("a.md"), "new").unwrap();
        fs::write(dir.path().join("a.html"), "old").unwrap();

        Writer::new(dir.path(), TEMPLATE)
            .unwrap()
            .write_page(&dir.path().join("a.md"))
            .unwrap();
        let html = fs::read_to_string(dir.path().join("a.html")).unwrap();
        assert!(html.contains("<p>new</p>"));
        assert!(!html.contains("old"));
    }

    #[test]
    fn test_hover_in_template() {
        let dir = source_dir(r#"{{ hover(image="cat.png", text="Meow") }}{{ session.content }}"#);
        fs::write(dir.path().join("cat.png"), b"png").unwrap();

        let html = Writer::new(dir.path(), TEMPLATE).unwrap().render("x").unwrap();
        assert!(html.starts_with(r#"<div class="hover-holder" ><img src="cat.png""#));
    }

    #[test]
    fn test_hover_missing_image_fails_render() {
        let dir = source_dir(r#"{{ hover(image="dog.png") }}"#);
        let writer = Writer::new(dir.path(), TEMPLATE).unwrap();
        assert!(matches!(writer.render("x"), Err(Error::Template(_))));
    }

    #[test]
    fn test_template_includes_sibling() {
        let dir = source_dir(r#"{% include "nav.html" %}{{ session.content }}"#);
        fs::write(dir.path().join("nav.html"), "<nav>{% include 'logo.html' %}</nav>").unwrap();
        fs::write(dir.path().join("logo.html"), "LOGO").unwrap();

        let html = Writer::new(dir.path(), TEMPLATE).unwrap().render("hi").unwrap();
        assert!(html.starts_with("<nav>LOGO</nav><br/><br/>"));
        assert!(html.contains("<p>hi</p>"));
    }

    #[test]
    fn test_template_extends_base() {
        let dir = source_dir(
            r#"{% extends "base.html" %}{% block body %}{{ session.content }}{% endblock body %}"#,
        );
        fs::write(
            dir.path().join("base.html"),
            "<html>{% block body %}{% endblock body %}</html>",
        )
        .unwrap();

        let html = Writer::new(dir.path(), TEMPLATE).unwrap().render("hi").unwrap();
        assert!(html.starts_with("<html><br/><br/>"));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn test_missing_included_template() {
        let dir = source_dir(r#"{% include "nav.html" %}{{ session.content }}"#);
        let writer = Writer::new(dir.path(), TEMPLATE).unwrap();
        assert!(matches!(writer.render("hi"), Err(Error::Template(_))));

        let dir = source_dir(r#"{% include "nav.html" ignore missing %}{{ session.content }}"#);
        let writer = Writer::new(dir.path(), TEMPLATE).unwrap();
        assert!(writer.render("hi").unwrap().contains("<p>hi</p>"));
    }

    #[test]
    fn test_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Writer::new(dir.path(), TEMPLATE),
            Err(Error::Template(_))
        ));
    }

    #[test]
    fn test_malformed_template() {
        let dir = source_dir("{{ session.content ");
        assert!(matches!(
            Writer::new(dir.path(), TEMPLATE),
            Err(Error::Template(_))
        ));
    }

    #[test]
    fn test_missing_markdown_file() {
        let dir = source_dir("{{ session.content }}");
        let writer = Writer::new(dir.path(), TEMPLATE).unwrap();
        assert!(matches!(
            writer.write_page(&dir.path().join("nope.md")),
            Err(Error::ReadSource { .. })
        ));
    }
}

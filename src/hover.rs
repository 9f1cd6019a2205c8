//! Markup for "image with hover overlay" widgets. [`Hover`] builds the HTML
//! directly; [`HoverFunction`] exposes the same thing to page templates as
//! `hover(image="...", text="...")`.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tera::Value;

const TEXT_CLASS: &str = "hover-text";
const IMAGE_CLASS: &str = "hover-image";
const ALT_TEXT: &str = "image";

/// The parameters for a single hover widget. Only `image` is required.
#[derive(Clone, Debug, Default)]
pub struct Hover {
    /// Path to the image file. Emitted verbatim as the `src` attribute.
    pub image: String,

    /// Text shown on hover.
    pub text: Option<String>,

    /// Where clicking the image leads.
    pub link: Option<String>,

    /// Raw HTML placed in the overlay after the text.
    pub html: Option<String>,

    /// Extra class for the text, appended to `hover-text`.
    pub text_class: Option<String>,

    /// Extra class for the image, appended to `hover-image`.
    pub image_class: Option<String>,

    /// Alt text for the image. Defaults to `image`.
    pub alt_text: Option<String>,
}

impl Hover {
    pub fn new(image: impl Into<String>) -> Hover {
        Hover {
            image: image.into(),
            ..Hover::default()
        }
    }

    /// Renders the widget. The image must exist; relative image paths are
    /// checked against `base_directory`.
    pub fn to_html(&self, base_directory: &Path) -> Result<String, ImageNotFoundError> {
        let image_path = base_directory.join(&self.image);
        if !image_path.is_file() {
            return Err(ImageNotFoundError(image_path));
        }

        let text_class = join_class(TEXT_CLASS, self.text_class.as_deref());
        let image_class = join_class(IMAGE_CLASS, self.image_class.as_deref());
        let alt_text = self.alt_text.as_deref().unwrap_or(ALT_TEXT);

        let mut out = String::from(r#"<div class="hover-holder" >"#);
        if let Some(link) = &self.link {
            out.push_str(&format!(r#"<a href="{}">"#, link));
        }
        out.push_str(&format!(
            r#"<img src="{}" alt="{}" class="{}">"#,
            self.image, alt_text, image_class
        ));
        out.push_str(r#"<div class="hover-overlay">"#);
        if let Some(text) = &self.text {
            out.push_str(&format!(r#"<div class="{}">{}</div>"#, text_class, text));
        }
        if let Some(html) = &self.html {
            out.push_str(html);
        }
        out.push_str("</div>");
        if self.link.is_some() {
            out.push_str("</a>");
        }
        out.push_str("</div>");
        Ok(out)
    }
}

fn join_class(default: &str, extra: Option<&str>) -> String {
    match extra {
        Some(extra) => format!("{} {}", default, extra),
        None => default.to_owned(),
    }
}

/// The `hover` template function. Image paths are resolved against the
/// directory the templates live in.
pub struct HoverFunction {
    base_directory: PathBuf,
}

impl HoverFunction {
    pub fn new(base_directory: &Path) -> HoverFunction {
        HoverFunction {
            base_directory: base_directory.to_owned(),
        }
    }
}

impl tera::Function for HoverFunction {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let arg = |name: &str| -> tera::Result<Option<String>> {
            match args.get(name) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(other) => Err(tera::Error::msg(format!(
                    "hover: argument `{}` must be a string, got {}",
                    name, other
                ))),
            }
        };

        let hover = Hover {
            image: arg("image")?
                .ok_or_else(|| tera::Error::msg("hover: missing required argument `image`"))?,
            text: arg("text")?,
            link: arg("link")?,
            html: arg("html")?,
            text_class: arg("text_class")?,
            image_class: arg("image_class")?,
            alt_text: arg("alt_text")?,
        };
        let html = hover
            .to_html(&self.base_directory)
            .map_err(|e| tera::Error::chain("hover", e))?;
        Ok(Value::String(html))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// Returned when a hover widget references an image that isn't a file.
#[derive(Debug)]
pub struct ImageNotFoundError(pub PathBuf);

impl fmt::Display for ImageNotFoundError {
    /// Displays an [`ImageNotFoundError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Image file ({}) does not exist.", self.0.display())
    }
}

impl std::error::Error for ImageNotFoundError {}

//! Turns the plain HTML that comes out of [`crate::markdown`] into the styled,
//! sectioned fragment the page template expects. [`decorate`] runs the steps
//! in a fixed order; later steps see the output of earlier ones.
//!
//! 1. [`add_classes`]: `img-fluid` on images, `list-group` on `<ul>` and
//!    `list-group-item` on `<li>`.
//! 2. [`em_dashes`]: every literal `--` becomes `&mdash;`.
//! 3. [`anchor_headings`]: each `<h1>` gets an `id` derived from its text.
//! 4. [`sectionize`]: the document is split on `<hr>` and every section is
//!    wrapped in a card.

use regex::{Captures, Regex};
use std::sync::LazyLock;

pub const IMAGE_CLASS: &str = "img-fluid";
pub const LIST_CLASS: &str = "list-group";
pub const LIST_ITEM_CLASS: &str = "list-group-item";

const SPACER: &str = "<br/><br/>";
const SECTION_OPEN: &str = r#"<div class="container bg-light rounded mx-auto"><div class="m-3 p-3">"#;
const SECTION_CLOSE: &str = "</div></div><br/>";

static IMG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<(img)(\s[^>]*)?>").unwrap());
static UL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<(ul)(\s[^>]*)?>").unwrap());
static LI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<(li)(\s[^>]*)?>").unwrap());

/// An existing `class="..."` attribute inside a tag's attribute list.
static CLASS_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\s)class="([^"]*)""#).unwrap());

/// Only bare `<h1>` tags; headings written with attributes keep them.
static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<h1>(.*?)</h1>").unwrap());

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static HR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<hr\s*/?>").unwrap());

/// Runs every decoration step over `html`. Never fails; malformed input just
/// yields odd-looking output.
pub fn decorate(html: &str) -> String {
    let html = add_classes(html);
    let html = em_dashes(&html);
    let html = anchor_headings(&html);
    sectionize(&html)
}

/// Adds the image and list classes, merging into a `class` attribute when the
/// tag already has one.
pub fn add_classes(html: &str) -> String {
    let html = add_class(html, &IMG_RE, IMAGE_CLASS);
    let html = add_class(&html, &UL_RE, LIST_CLASS);
    add_class(&html, &LI_RE, LIST_ITEM_CLASS)
}

fn add_class(html: &str, tag: &Regex, class: &str) -> String {
    tag.replace_all(html, |caps: &Captures| {
        let name = &caps[1];
        let attrs = caps.get(2).map_or("", |m| m.as_str());
        if CLASS_ATTR_RE.is_match(attrs) {
            let attrs = CLASS_ATTR_RE.replace(attrs, |c: &Captures| {
                format!(r#"{}class="{} {}""#, &c[1], &c[2], class)
            });
            format!("<{}{}>", name, attrs)
        } else {
            format!(r#"<{} class="{}"{}>"#, name, class, attrs)
        }
    })
    .into_owned()
}

/// Replaces every `--` with `&mdash;`. This is plain text substitution, so it
/// also hits comments and code blocks.
pub fn em_dashes(html: &str) -> String {
    html.replace("--", "&mdash;")
}

/// Gives every bare `<h1>` an `id` built from its text content. Each heading
/// is rewritten in place, so two headings with the same text both get an id
/// (the same one).
pub fn anchor_headings(html: &str) -> String {
    H1_RE
        .replace_all(html, |caps: &Captures| {
            let inner = &caps[1];
            format!(r#"<h1 id="{}">{}</h1>"#, anchor(inner), inner)
        })
        .into_owned()
}

/// Lowercased heading text with spaces turned into hyphens.
pub fn anchor(heading_html: &str) -> String {
    TAG_RE
        .replace_all(heading_html, "")
        .to_lowercase()
        .replace(' ', "-")
}

/// Splits on `<hr>` markers (dropping them) and wraps each section in a card,
/// after a leading spacer.
pub fn sectionize(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + 128);
    out.push_str(SPACER);
    for section in HR_RE.split(html) {
        out.push_str(SECTION_OPEN);
        out.push_str(section);
        out.push_str(SECTION_CLOSE);
    }
    out
}

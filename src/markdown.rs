use pulldown_cmark::{html, Options, Parser};

/// Converts markdown to raw HTML. The result still needs
/// [`crate::decorate::decorate`] before it goes into a template.
///
/// Smart punctuation stays off: the decoration step owns the `--` to em-dash
/// conversion.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

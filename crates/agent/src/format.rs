//! Markdown to HTML rendering for model answers.
//!
//! Rendering is best effort: any input yields a string. Raw HTML in the
//! model output is escaped rather than passed through.

use pulldown_cmark::{Event, Options, Parser, html};

/// Render markdown-flavored model output as HTML.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out.truncate(out.trim_end().len());
    out
}

//! HTML rendering for the web front end.

use crate::cache::AnalysisRecord;
use chrono::{DateTime, Utc};
use pulldown_cmark::escape::escape_html;
use pulldown_cmark::{html, Event, Options, Parser};
use std::fmt::Write;

/// Converts a Markdown report to HTML (tables and fenced code enabled)
///
/// Raw HTML inside the Markdown is rendered as escaped text.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        other => other,
    });
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

/// Escapes text for use inside HTML elements and attributes
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    // Writing into a String cannot fail
    let _ = escape_html(&mut escaped, text);
    escaped
}

/// Formats a timestamp as `January 05, 2026 at 14:03:22 UTC`
pub fn format_datetime(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%B %d, %Y at %H:%M:%S UTC").to_string()
}

/// Kind of banner shown above the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    /// Green banner
    Success,
    /// Red banner
    Error,
}

/// A one-off message shown at the top of the page
#[derive(Debug, Clone)]
pub struct Flash {
    /// Banner kind
    pub level: FlashLevel,
    /// Message text (escaped on render)
    pub message: String,
}

impl Flash {
    /// Success banner
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Success, message: message.into() }
    }

    /// Error banner
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Error, message: message.into() }
    }
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Repository Analysis</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; max-width: 1000px; }
        h1 { color: #333; }
        pre { background: #f4f4f4; padding: 10px; border-radius: 5px; overflow-x: auto; }
        code { background: #f4f4f4; padding: 2px 4px; border-radius: 3px; }
        table { border-collapse: collapse; }
        td, th { border: 1px solid #ccc; padding: 4px 8px; }
        .flash { padding: 10px; border-radius: 5px; margin-bottom: 20px; }
        .flash.success { background: #e6f4ea; color: #1e4620; }
        .flash.error { background: #fce8e6; color: #5f2120; }
        .analysis { margin: 20px 0; padding: 15px; background: #f9f9f9; border-radius: 5px; }
        .meta { color: #666; font-size: 0.9em; }
    </style>
</head>
<body>
    <h1>Repository Analysis</h1>
"#;

const PAGE_FORM: &str = r#"    <form method="post" action="/analyze">
        <input type="text" name="repo_url" size="60" placeholder="https://github.com/owner/repository">
        <button type="submit">Analyze</button>
    </form>
"#;

/// Renders the index page
///
/// `current` is the repository URL and report of a run that just finished;
/// `records` are all stored analyses.
pub fn render_index(records: &[AnalysisRecord], current: Option<(&str, &str)>, flash: Option<&Flash>) -> String {
    let mut page = String::from(PAGE_HEAD);

    if let Some(flash) = flash {
        let class = match flash.level {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        };
        let _ = writeln!(page, r#"    <div class="flash {}">{}</div>"#, class, escape(&flash.message));
    }

    page.push_str(PAGE_FORM);

    if let Some((repo_url, report)) = current {
        let _ = writeln!(
            page,
            "    <h2>Current analysis: {}</h2>\n    <div class=\"analysis\">{}</div>",
            escape(repo_url),
            markdown_to_html(report)
        );
    }

    if !records.is_empty() {
        page.push_str("    <h2>Previous analyses</h2>\n");
    }
    for record in records.iter().rev() {
        let _ = writeln!(
            page,
            "    <div class=\"analysis\">\n        <h3>{}</h3>\n        <p class=\"meta\">{}</p>",
            escape(&record.repository),
            format_datetime(&record.timestamp)
        );
        if let Some(commit) = &record.commit {
            let _ = writeln!(
                page,
                "        <p class=\"meta\">Commit by {}: {}</p>",
                escape(&commit.author),
                escape(&commit.message)
            );
        }
        let _ = writeln!(page, "        {}\n    </div>", markdown_to_html(&record.result));
    }

    page.push_str("</body>\n</html>\n");
    page
}

//! Caption composition
//!
//! The Bot API is called with `parse_mode=HTML`, so anything user-controlled
//! that lands in the caption (the commit message) is HTML-escaped first. The
//! template itself is fixed.

use crate::artifact::Artifact;
use std::fmt;

/// Server used for the run URL when `GITHUB_SERVER_URL` is absent
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

/// Pieces of the CI run URL
///
/// Missing repository or run ids render as empty path segments. The link is
/// then broken but the notification still goes out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunLink {
    /// Server base URL (default: "https://github.com")
    pub server_url: Option<String>,
    /// Repository identifier, e.g. "owner/name"
    pub repository: String,
    /// CI run identifier
    pub run_id: String,
}

impl RunLink {
    /// Render `{server}/{repository}/actions/runs/{run_id}`
    pub fn url(&self) -> String {
        let server = self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL);
        format!("{}/{}/actions/runs/{}", server, self.repository, self.run_id)
    }
}

/// Composed message text, built once per run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caption(String);

impl Caption {
    /// The caption as sent on the wire
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Caption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape text for embedding in Telegram HTML
///
/// Escapes `&`, `<`, `>`, `"` and `'`.
///
/// ```
/// use tg_notify::caption::escape_html;
///
/// assert_eq!(escape_html("a < b && c"), "a &lt; b &amp;&amp; c");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Reverse [`escape_html`]
pub fn unescape_html(text: &str) -> String {
    const ENTITIES: &[(&str, char)] = &[
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#x27;", '\''),
    ];

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'outer: while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        for (entity, ch) in ENTITIES {
            if let Some(after) = rest.strip_prefix(entity) {
                out.push(*ch);
                rest = after;
                continue 'outer;
            }
        }
        out.push('&');
        rest = &rest[1..];
    }
    out.push_str(rest);
    out
}

/// Format a byte count as megabytes with exactly two decimals
///
/// ```
/// use tg_notify::caption::format_size_mb;
///
/// assert_eq!(format_size_mb(1), "0.00 MB");
/// assert_eq!(format_size_mb(5 * 1024 * 1024), "5.00 MB");
/// ```
pub fn format_size_mb(size_bytes: u64) -> String {
    format!("{:.2} MB", size_bytes as f64 / 1024.0 / 1024.0)
}

/// Build the caption for an artifact
///
/// `event_label` and `run_url` are embedded verbatim, `commit_text` is escaped.
pub fn compose_caption(
    event_label: &str,
    artifact: &Artifact,
    commit_text: &str,
    run_url: &str,
) -> Caption {
    Caption(format!(
        "🌾 <b>Meta-Hybrid: {label}</b>\n\n\
         ⚖️ <b>重量 (Weight):</b> {size}\n\n\
         📝 <b>新性状 (Commit):</b>\n\
         <pre>{commit}</pre>\n\n\
         🚜 <a href='{run_url}'>查看日志 (View Log)</a>",
        label = event_label,
        size = format_size_mb(artifact.size_bytes),
        commit = escape_html(commit_text),
        run_url = run_url,
    ))
}

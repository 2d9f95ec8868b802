//! HTML fragments that are safe to hand to `innerHTML`.
//!
//! The only way to get a [`Markup`] is [`Markup::escape`] (plain text) or
//! [`Markup::sanitize`] (allow-list: http(s) links, nothing else).

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

static ANCHOR: OnceLock<Regex> = OnceLock::new();

fn anchor_pattern() -> &'static Regex {
    ANCHOR.get_or_init(|| {
        Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*"([^"]*)"[^>]*>(.*?)</a\s*>"#)
            .expect("anchor pattern is valid")
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Markup(String);

impl Markup {
    /// Plain text with every markup-significant character escaped.
    pub fn escape(text: &str) -> Self {
        Markup(escape_html(text))
    }

    /// Keeps `<a href="http(s)://...">label</a>` and neutralizes every other
    /// tag. Kept links always open in a new tab without an opener.
    pub fn sanitize(html: &str) -> Self {
        let mut out = String::with_capacity(html.len());
        let mut last = 0;

        for caps in anchor_pattern().captures_iter(html) {
            let (Some(whole), Some(href), Some(label)) = (caps.get(0), caps.get(1), caps.get(2)) else {
                continue;
            };
            out.push_str(&neutralize(&html[last..whole.start()]));
            let label = neutralize(label.as_str());

            if is_web_url(href.as_str()) {
                out.push_str("<a href=\"");
                out.push_str(&neutralize(href.as_str().trim()));
                out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\">");
                out.push_str(&label);
                out.push_str("</a>");
            } else {
                out.push_str(&label);
            }
            last = whole.end();
        }
        out.push_str(&neutralize(&html[last..]));

        Markup(out)
    }

    /// Builds a link from untrusted parts, or `None` if `url` is not http(s).
    pub fn link(url: &str, label: &str) -> Option<Self> {
        if !is_web_url(url) {
            return None;
        }
        Some(Markup(format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
            escape_html(url.trim()),
            escape_html(label)
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// Entities already present in the source are left alone.
fn neutralize(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn is_web_url(url: &str) -> bool {
    Url::parse(url.trim()).is_ok_and(|parsed| matches!(parsed.scheme(), "http" | "https"))
}

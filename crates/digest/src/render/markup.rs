//! Markup primitives shared by both output flavors.
//!
//! The renderer only ever talks to [`Markup`]; HTML and markdown differ in
//! these few functions and nowhere else.

use notify::ContentFormat;

/// Markup writer for one flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markup(pub ContentFormat);

impl Markup {
    /// Escape user-provided text.
    #[must_use]
    pub fn escape(&self, text: &str) -> String {
        match self.0 {
            ContentFormat::Html => html_escape(text),
            ContentFormat::Markdown => markdown_escape(text),
        }
    }

    /// Document title line.
    #[must_use]
    pub fn title(&self, text: &str) -> String {
        match self.0 {
            ContentFormat::Html => format!("<h1>{}</h1>\n", html_escape(text)),
            ContentFormat::Markdown => format!("# {}\n\n", markdown_escape(text)),
        }
    }

    /// Section heading.
    #[must_use]
    pub fn heading(&self, text: &str) -> String {
        match self.0 {
            ContentFormat::Html => format!("<h2>{}</h2>\n", html_escape(text)),
            ContentFormat::Markdown => format!("## {}\n\n", markdown_escape(text)),
        }
    }

    /// Emphasized text.
    #[must_use]
    pub fn strong(&self, text: &str) -> String {
        match self.0 {
            ContentFormat::Html => format!("<b>{}</b>", html_escape(text)),
            ContentFormat::Markdown => format!("**{}**", markdown_escape(text)),
        }
    }

    /// A link whose label is the url itself.
    #[must_use]
    pub fn link(&self, url: &str) -> String {
        match self.0 {
            ContentFormat::Html => {
                let url = html_escape(url);
                format!("<a href=\"{url}\">{url}</a>")
            }
            ContentFormat::Markdown => {
                let target = url.replace(' ', "%20").replace(')', "%29");
                format!("[{}]({target})", markdown_escape(url))
            }
        }
    }

    /// One line of an item block; `content` must already be escaped.
    #[must_use]
    pub fn line(&self, content: &str) -> String {
        match self.0 {
            ContentFormat::Html => format!("{content}<br>\n"),
            ContentFormat::Markdown => format!("{content}\n"),
        }
    }

    /// Gap between item blocks.
    #[must_use]
    pub fn block_gap(&self) -> &'static str {
        match self.0 {
            ContentFormat::Html => "<br>\n",
            ContentFormat::Markdown => "\n",
        }
    }

    /// Divider between sections.
    #[must_use]
    pub fn divider(&self) -> &'static str {
        match self.0 {
            ContentFormat::Html => "<hr>\n",
            ContentFormat::Markdown => "---\n\n",
        }
    }

    /// Wrap the finished body into a standalone document.
    #[must_use]
    pub fn document(&self, title: &str, body: &str) -> String {
        match self.0 {
            ContentFormat::Html => format!(
                r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>
body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; margin: 0 auto; max-width: 700px; padding: 16px; }}
h2 {{ border-bottom: 1px solid #e5e7eb; padding-bottom: 4px; }}
a {{ color: #0ea5e9; text-decoration: none; }}
</style>
</head>
<body>
{body}</body>
</html>
"#,
                title = html_escape(title),
                body = body,
            ),
            ContentFormat::Markdown => body.to_string(),
        }
    }
}

/// Simple HTML escaping for user content.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Backslash-escape characters markdown treats as formatting.
fn markdown_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

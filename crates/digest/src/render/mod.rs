//! Renders an [`ItemSet`] into a digest body.
//!
//! One code path produces both HTML and markdown; the flavors only differ
//! in the [`Markup`] primitives. Rendering is pure, so the same set and
//! date always give byte-identical output.

pub mod markup;

pub use markup::Markup;

use chrono::NaiveDate;
use notify::{ContentFormat, Message};

use crate::model::{Category, DigestItem, ItemSet};

/// Shown under a category heading when the category has no items.
pub const EMPTY_CATEGORY_PLACEHOLDER: &str = "No new items";

/// A rendered digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    /// One-line subject, e.g. `⚡ Daily Digest (2026-10-19)`.
    pub subject: String,
    /// Rendered body in `format`.
    pub body: String,
    /// Markup flavor of `body`.
    pub format: ContentFormat,
    /// Total items across all categories.
    pub item_count: usize,
}

impl Digest {
    /// Convert into a channel message.
    #[must_use]
    pub fn to_message(&self) -> Message {
        Message::new(self.subject.clone(), self.body.clone(), self.format)
    }
}

/// Subject line for a run on `as_of`.
#[must_use]
pub fn subject_for(as_of: NaiveDate) -> String {
    format!("⚡ Daily Digest ({})", as_of.format("%Y-%m-%d"))
}

/// Digest renderer for one output flavor.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    markup: Markup,
}

impl Renderer {
    #[must_use]
    pub fn new(format: ContentFormat) -> Self {
        Self {
            markup: Markup(format),
        }
    }

    #[must_use]
    pub fn format(&self) -> ContentFormat {
        self.markup.0
    }

    /// Render every category, in fixed order, into one document.
    #[must_use]
    pub fn render(&self, items: &ItemSet, as_of: NaiveDate) -> Digest {
        let subject = subject_for(as_of);
        let m = self.markup;

        let mut body = m.title(&subject);
        for (index, category) in Category::all().iter().enumerate() {
            if index > 0 {
                body.push_str(m.divider());
            }
            self.render_section(&mut body, *category, items);
        }

        Digest {
            body: m.document(&subject, &body),
            subject,
            format: self.format(),
            item_count: items.len(),
        }
    }

    fn render_section(&self, out: &mut String, category: Category, items: &ItemSet) {
        let m = self.markup;
        out.push_str(&m.heading(category.heading()));

        let mut any = false;
        for item in items.by_category(category) {
            if any {
                out.push_str(m.block_gap());
            }
            self.render_item(out, item);
            any = true;
        }

        if !any {
            out.push_str(&m.line(&m.escape(EMPTY_CATEGORY_PLACEHOLDER)));
        }
    }

    fn render_item(&self, out: &mut String, item: &DigestItem) {
        let m = self.markup;
        let category = item.category();

        let mut headline = format!("{} {}", category.icon(), m.strong(item.title()));
        if let Some(metric) = item.metric() {
            headline.push_str(&format!(" ({}{metric})", category.metric_symbol()));
        }
        out.push_str(&m.line(&headline));
        out.push_str(&m.line(&format!("🔗 {}", m.link(item.url()))));

        if let Some(summary) = item.summary() {
            out.push_str(&m.line(&format!("📝 {}", m.escape(summary))));
        }
        if let Some(date) = item.published_or_updated() {
            out.push_str(&m.line(&format!("📅 {}", date.format("%Y-%m-%d"))));
        }
    }
}

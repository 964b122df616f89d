//! Item categories.

use serde::Serialize;
use std::fmt;

/// Kind of item a source produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Code repositories.
    Repository,
    /// Research papers.
    Paper,
}

impl Category {
    /// All categories in display order.
    #[must_use]
    pub fn all() -> &'static [Category] {
        &[Category::Repository, Category::Paper]
    }

    /// Section heading used in the rendered digest.
    #[must_use]
    pub fn heading(&self) -> &'static str {
        match self {
            Category::Repository => "🚀 Repositories",
            Category::Paper => "📚 Papers",
        }
    }

    /// Marker placed before each item's title.
    #[must_use]
    pub fn icon(&self) -> &'static str {
        match self {
            Category::Repository => "📦",
            Category::Paper => "📄",
        }
    }

    /// Symbol used for the metric badge.
    #[must_use]
    pub fn metric_symbol(&self) -> &'static str {
        match self {
            Category::Repository => "⭐",
            Category::Paper => "📈",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Repository => "repositories",
            Category::Paper => "papers",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_order() {
        assert_eq!(Category::all(), &[Category::Repository, Category::Paper]);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Category::Repository.to_string(), "repositories");
        assert_eq!(Category::Paper.to_string(), "papers");
    }
}

//! Domain Value Objects

use crate::domain::entities::BookCopy;

/// Category value that disables the category filter
pub const ALL_CATEGORIES: &str = "All";

/// Catalog search filter
///
/// `text` matches title or author as a case-insensitive substring;
/// `category` must match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    text: Option<String>,
    category: Option<String>,
}

impl CatalogQuery {
    /// Blank values and the `All` category mean "no filter"
    pub fn new(text: Option<String>, category: Option<String>) -> Self {
        let text = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let category = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty() && c != ALL_CATEGORIES);
        Self { text, category }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// `ILIKE` pattern with the user's wildcards escaped
    pub fn like_pattern(&self) -> Option<String> {
        self.text.as_deref().map(|t| format!("%{}%", escape_like(t)))
    }

    pub fn matches(&self, copy: &BookCopy) -> bool {
        let text_ok = match &self.text {
            Some(needle) => {
                let needle = needle.to_lowercase();
                copy.title.to_lowercase().contains(&needle)
                    || copy.author.to_lowercase().contains(&needle)
            }
            None => true,
        };
        let category_ok = match &self.category {
            Some(category) => copy.category == *category,
            None => true,
        };
        text_ok && category_ok
    }
}

/// Escape `\`, `%` and `_` for a LIKE pattern using the default escape char
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> BookCopy {
        BookCopy::new(1, "Dune", "Frank Herbert", "Sci-Fi")
    }

    #[test]
    fn all_and_blank_disable_filters() {
        assert_eq!(
            CatalogQuery::new(Some("  ".into()), Some("All".into())),
            CatalogQuery::default()
        );
        assert!(CatalogQuery::default().matches(&dune()));
    }

    #[test]
    fn text_matches_title_or_author_ignoring_case() {
        assert!(CatalogQuery::new(Some("dun".into()), None).matches(&dune()));
        assert!(CatalogQuery::new(Some("HERBERT".into()), None).matches(&dune()));
        assert!(!CatalogQuery::new(Some("austen".into()), None).matches(&dune()));
    }

    #[test]
    fn category_is_exact() {
        assert!(CatalogQuery::new(None, Some("Sci-Fi".into())).matches(&dune()));
        assert!(!CatalogQuery::new(None, Some("sci-fi".into())).matches(&dune()));
    }

    #[test]
    fn wildcards_are_escaped() {
        let query = CatalogQuery::new(Some("100%_a\\b".into()), None);
        assert_eq!(query.like_pattern().unwrap(), "%100\\%\\_a\\\\b%");
    }
}

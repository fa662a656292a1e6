//! Keyword filtering of extracted links.

use crate::LinkSet;

/// Optional list of substrings a link must contain at least one of.
///
/// An absent or empty list passes every link through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkFilter {
    terms: Option<Vec<String>>,
}

impl LinkFilter {
    pub fn new(terms: Option<Vec<String>>) -> Self {
        Self {
            terms: terms.filter(|t| !t.is_empty()),
        }
    }

    /// Filter that keeps every link
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        self.terms.is_none()
    }

    pub fn matches(&self, link: &str) -> bool {
        match &self.terms {
            None => true,
            Some(terms) => terms.iter().any(|term| link.contains(term.as_str())),
        }
    }

    pub fn apply(&self, links: LinkSet) -> LinkSet {
        if self.is_identity() {
            return links;
        }
        let before = links.len();
        let kept: LinkSet = links.into_iter().filter(|l| self.matches(l)).collect();
        log::info!("filter kept {} of {} links", kept.len(), before);
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(links: &[&str]) -> LinkSet {
        links.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn absent_and_empty_filters_are_identity() {
        let links = set(&["https://x/bern/a", "https://x/bern/b"]);
        assert_eq!(LinkFilter::none().apply(links.clone()), links);
        assert_eq!(LinkFilter::new(Some(vec![])).apply(links.clone()), links);
    }

    #[test]
    fn single_term_keeps_containing_links() {
        let links = set(&["https://x/bern/foo", "https://x/bern/baz"]);
        let filter = LinkFilter::new(Some(vec!["foo".into()]));
        assert_eq!(filter.apply(links), set(&["https://x/bern/foo"]));
    }

    #[test]
    fn terms_are_ored() {
        let links = set(&["/a/sofa", "/a/lamp", "/a/table"]);
        let filter = LinkFilter::new(Some(vec!["sofa".into(), "lamp".into()]));
        assert_eq!(filter.apply(links), set(&["/a/sofa", "/a/lamp"]));
    }

    #[test]
    fn no_match_yields_empty_set() {
        let filter = LinkFilter::new(Some(vec!["chair".into()]));
        assert!(filter.apply(set(&["/a/sofa"])).is_empty());
    }
}

//! Query construction for the listing search.

use crate::config::SiteConfig;
use sha2::{Digest, Sha256};

/// Separator placed between keywords in the `q` parameter.
const KEYWORD_SEPARATOR: &str = "%20";

/// Maximum length of the readable part of a ledger key
const LEDGER_SLUG_LEN: usize = 48;

/// A search against one region (and optionally one category) of the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    keywords: Vec<String>,
    region: String,
    category: Option<String>,
}

impl Query {
    pub fn new(keywords: Vec<String>, region: impl Into<String>, category: Option<String>) -> Self {
        Self {
            keywords,
            region: region.into(),
            category: category.filter(|c| !c.is_empty()),
        }
    }

    /// Split a comma-separated keyword argument, e.g. `sofa,bern`
    pub fn parse_keywords(raw: &str) -> Vec<String> {
        raw.split(',').map(str::to_string).collect()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Build the listing URL for this query.
    ///
    /// Keywords are joined with a literal `%20` and nothing else is encoded,
    /// so malformed input ends up in the URL as-is.
    pub fn url(&self, site: &SiteConfig) -> String {
        let mut url = format!(
            "{}/{}/{}/{}",
            site.origin, site.locale, site.listing_root, self.region
        );
        if let Some(category) = &self.category {
            url.push('/');
            url.push_str(category);
        }
        url.push_str("?q=");
        url.push_str(&self.keywords.join(KEYWORD_SEPARATOR));
        url
    }

    /// Filesystem-safe identity of this query, used to name its ledger.
    ///
    /// A short readable slug followed by a hash of the exact keywords,
    /// region and category, so distinct queries never share a key.
    pub fn ledger_key(&self) -> String {
        let mut parts = vec![self.keywords.join("+"), self.region.clone()];
        if let Some(category) = &self.category {
            parts.push(category.clone());
        }
        let slug: String = parts
            .join("_")
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+') {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .take(LEDGER_SLUG_LEN)
            .collect();
        format!("{}-{}", slug, self.identity_hash())
    }

    fn identity_hash(&self) -> String {
        let mut hasher = Sha256::new();
        // Length-prefixed fields keep the encoding unambiguous
        let mut field = |bytes: &[u8]| {
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        };
        field(&(self.keywords.len() as u64).to_le_bytes());
        for keyword in &self.keywords {
            field(keyword.as_bytes());
        }
        field(self.region.as_bytes());
        match &self.category {
            Some(category) => {
                field(b"\x01");
                field(category.as_bytes());
            }
            None => field(b"\x00"),
        }
        let digest = hasher.finalize();
        hex::encode(&digest[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn url_without_category() {
        let query = Query::new(keywords(&["sofa", "bern"]), "bern", None);
        assert_eq!(
            query.url(&SiteConfig::default()),
            "https://www.tutti.ch/de/li/bern?q=sofa%20bern"
        );
    }

    #[test]
    fn url_with_category() {
        let query = Query::new(
            keywords(&["sofa"]),
            "ganze-schweiz",
            Some("haushalt/moebel".to_string()),
        );
        assert_eq!(
            query.url(&SiteConfig::default()),
            "https://www.tutti.ch/de/li/ganze-schweiz/haushalt/moebel?q=sofa"
        );
    }

    #[test]
    fn empty_category_is_absent() {
        let query = Query::new(keywords(&["lamp"]), "bern", Some(String::new()));
        assert_eq!(query.category(), None);
        assert!(!query.url(&SiteConfig::default()).contains("bern/?"));
    }

    #[test]
    fn keywords_are_not_encoded_further() {
        let query = Query::new(keywords(&["a&b", "ü"]), "bern", None);
        assert!(query.url(&SiteConfig::default()).ends_with("?q=a&b%20ü"));
    }

    #[test]
    fn parse_keywords_splits_on_commas() {
        assert_eq!(Query::parse_keywords("sofa,bern"), keywords(&["sofa", "bern"]));
        assert_eq!(Query::parse_keywords("sofa"), keywords(&["sofa"]));
    }

    #[test]
    fn ledger_key_is_readable_and_stable() {
        let a = Query::new(keywords(&["sofa", "bern"]), "bern", None);
        let key = a.ledger_key();
        assert!(key.starts_with("sofa+bern_bern-"));
        assert_eq!(key.len(), "sofa+bern_bern-".len() + 16);
        assert_eq!(key, Query::new(keywords(&["sofa", "bern"]), "bern", None).ledger_key());
    }

    #[test]
    fn ledger_key_distinguishes_similar_queries() {
        let pairs = [
            (
                Query::new(keywords(&["sofa"]), "bern", Some("x".into())),
                Query::new(keywords(&["sofa"]), "bern_x", None),
            ),
            (
                Query::new(keywords(&["möbel"]), "bern", None),
                Query::new(keywords(&["mäbel"]), "bern", None),
            ),
            (
                Query::new(keywords(&["Sofa"]), "bern", None),
                Query::new(keywords(&["sofa"]), "bern", None),
            ),
            (
                Query::new(keywords(&["a", "b"]), "bern", None),
                Query::new(keywords(&["a+b"]), "bern", None),
            ),
            (
                Query::new(keywords(&["sofa"]), "bern", Some("haushalt/moebel".into())),
                Query::new(keywords(&["sofa"]), "bern", Some("haushalt-moebel".into())),
            ),
        ];
        for (a, b) in &pairs {
            assert_ne!(a.ledger_key(), b.ledger_key(), "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn ledger_key_length_is_bounded() {
        let many: Vec<String> = (0..200).map(|i| format!("keyword{i}")).collect();
        let query = Query::new(many, "ganze-schweiz", Some("haushalt/moebel".into()));
        assert!(query.ledger_key().len() <= LEDGER_SLUG_LEN + 1 + 16);
    }
}

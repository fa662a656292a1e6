//! Listing page fetching and link extraction.
//!
//! Uses reqwest for fetching and scraper for HTML parsing.

use crate::config::HttpConfig;
use crate::LinkSet;
use reqwest::Client;
use scraper::{Html, Selector};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("failed to fetch {url}: {source}")]
    FetchError {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
}

impl ScraperError {
    fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ScraperError::Timeout {
                url: url.to_string(),
            }
        } else {
            ScraperError::FetchError {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Create a configured HTTP client for scraping
pub fn create_client(http: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(http.user_agent.as_str())
        .timeout(http.timeout());
    if !http.use_proxy {
        builder = builder.no_proxy();
    }
    builder.build()
}

/// Fetch a page and return its body. Non-2xx responses are errors.
pub async fn fetch_document(client: &Client, url: &str) -> Result<String, ScraperError> {
    log::info!("fetching {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ScraperError::from_reqwest(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScraperError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| ScraperError::from_reqwest(url, e))
}

/// Extract every anchor target containing `region` and prefix it with `origin`.
///
/// Targets are concatenated onto the origin verbatim, even ones that are
/// already absolute. Targets spanning several lines are dropped since the
/// ledger stores one link per line. Malformed HTML yields whatever anchors the parser
/// recovers, possibly none.
pub fn extract_links(html: &str, region: &str, origin: &str) -> LinkSet {
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").unwrap();

    let links: LinkSet = document
        .select(&anchor_selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| href.contains(region))
        .filter(|href| {
            let single_line = !href.contains(['\n', '\r']);
            if !single_line {
                log::warn!("skipping link target with a line break: {:?}", href);
            }
            single_line
        })
        .map(|href| format!("{}{}", origin, href))
        .collect();

    log::info!("extracted {} links for region {}", links.len(), region);
    for link in &links {
        log::debug!("  {}", link);
    }
    links
}

/// Fetch the listing page and extract its region links
pub async fn fetch_links(
    client: &Client,
    url: &str,
    region: &str,
    origin: &str,
) -> Result<LinkSet, ScraperError> {
    let html = fetch_document(client, url).await?;
    Ok(extract_links(&html, region, origin))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://www.tutti.ch";

    #[test]
    fn keeps_only_region_links() {
        let html = r#"<html><body>
            <a href="/de/bern/foo">foo</a>
            <a href="/de/zurich/bar">bar</a>
            <a href="/de/bern/baz">baz</a>
        </body></html>"#;

        let links = extract_links(html, "bern", ORIGIN);
        let expected: LinkSet = [
            "https://www.tutti.ch/de/bern/foo",
            "https://www.tutti.ch/de/bern/baz",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(links, expected);
    }

    #[test]
    fn duplicates_collapse() {
        let html = r#"<a href="/bern/1">a</a><a href="/bern/1">b</a><a href="/bern/2">c</a><a href="/basel/3">d</a>"#;
        assert_eq!(extract_links(html, "bern", ORIGIN).len(), 2);
    }

    #[test]
    fn absolute_targets_are_still_prefixed() {
        let html = r#"<a href="https://other.example/bern">x</a>"#;
        let links = extract_links(html, "bern", ORIGIN);
        assert!(links.contains("https://www.tutti.chhttps://other.example/bern"));
    }

    #[test]
    fn anchors_without_href_are_skipped() {
        let html = r#"<a name="bern">x</a>"#;
        assert!(extract_links(html, "", ORIGIN).is_empty());
    }

    #[test]
    fn empty_href_is_collected_but_fails_region_check() {
        let html = r#"<a href="">y</a>"#;
        assert_eq!(
            extract_links(html, "", ORIGIN),
            LinkSet::from([ORIGIN.to_string()])
        );
        assert!(extract_links(html, "bern", ORIGIN).is_empty());
    }

    #[test]
    fn targets_with_line_breaks_are_dropped() {
        let html = "<a href=\"/de/bern/a\nb\">x</a><a href=\"/de/bern/c&#13;d\">y</a><a href=\"/de/bern/ok\">z</a>";
        assert_eq!(
            extract_links(html, "bern", ORIGIN),
            LinkSet::from(["https://www.tutti.ch/de/bern/ok".to_string()])
        );
    }

    #[test]
    fn empty_region_matches_every_target() {
        let html = r#"<a href="">y</a><a href="/x">z</a>"#;
        let links = extract_links(html, "", ORIGIN);
        assert!(links.contains(ORIGIN));
        assert!(links.contains("https://www.tutti.ch/x"));
    }

    #[test]
    fn garbage_input_yields_empty_set() {
        assert!(extract_links("\u{0}<<<>>not html at all", "bern", ORIGIN).is_empty());
    }
}

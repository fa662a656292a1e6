//! # tuttibot
//!
//! Watches a tutti.ch listing search and mails links that have not been
//! reported before.
//!
//! ## Pipeline
//!
//! - **Query**: keywords, region and optional category become a listing URL
//! - **Scraper**: fetches the page and keeps anchor targets mentioning the region
//! - **Filter**: optionally narrows links to those containing a filter term
//! - **Ledger**: flat file of already reported links, only unseen ones pass
//! - **Notify**: new links are mailed through a pluggable transport

use std::collections::BTreeSet;

pub mod config;
pub mod filter;
pub mod ledger;
pub mod notify;
pub mod pipeline;
pub mod query;
pub mod scraper;

/// Absolute link URLs, compared by exact string equality
pub type LinkSet = BTreeSet<String>;

pub use config::Config;
pub use filter::LinkFilter;
pub use ledger::Ledger;
pub use pipeline::{run, RunOptions, RunReport};
pub use query::Query;

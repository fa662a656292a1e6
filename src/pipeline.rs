//! One run of the bot: fetch, extract, filter, reconcile, notify.

use crate::config::Config;
use crate::filter::LinkFilter;
use crate::ledger::{Ledger, LedgerError};
use crate::notify::{self, Delivery, Transport};
use crate::query::Query;
use crate::scraper::{self, ScraperError};
use crate::LinkSet;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a run before anything is sent
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Everything a run needs besides the configuration
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub query: Query,
    pub recipient: String,
    pub filter: LinkFilter,
    /// Explicit ledger file; defaults to a per-query file under `ledger.dir`
    pub ledger_path: Option<PathBuf>,
    pub create_ledger: bool,
}

impl RunOptions {
    pub fn new(query: Query, recipient: impl Into<String>) -> Self {
        Self {
            query,
            recipient: recipient.into(),
            filter: LinkFilter::none(),
            ledger_path: None,
            create_ledger: false,
        }
    }

    pub fn ledger_path(&self, config: &Config) -> PathBuf {
        self.ledger_path.clone().unwrap_or_else(|| {
            config
                .ledger
                .dir
                .join(format!("{}.txt", self.query.ledger_key()))
        })
    }
}

/// Outcome of a completed run
#[derive(Debug)]
pub struct RunReport {
    pub url: String,
    pub ledger_path: PathBuf,
    /// Links surviving region and keyword filtering
    pub matched: LinkSet,
    /// Links not seen in any earlier run, now recorded in the ledger
    pub new_links: LinkSet,
    pub delivery: Delivery,
}

/// Run the whole pipeline once.
///
/// The ledger is opened before the network request so a misconfigured ledger
/// fails fast, and new links are committed to it before notification.
pub async fn run(
    options: &RunOptions,
    config: &Config,
    transport: &dyn Transport,
) -> Result<RunReport, RunError> {
    let ledger_path = options.ledger_path(config);
    let ledger = if options.create_ledger || config.ledger.create_missing {
        Ledger::open_or_create(&ledger_path)?
    } else {
        Ledger::open(&ledger_path)?
    };

    let url = options.query.url(&config.site);
    let client = scraper::create_client(&config.http).map_err(RunError::Client)?;
    let extracted = scraper::fetch_links(
        &client,
        &url,
        options.query.region(),
        &config.site.origin,
    )
    .await?;

    let matched = options.filter.apply(extracted);
    let new_links = ledger.reconcile(&matched)?;

    let delivery = notify::notify(
        transport,
        &new_links,
        options.query.keywords(),
        &options.recipient,
    );

    Ok(RunReport {
        url,
        ledger_path,
        matched,
        new_links,
        delivery,
    })
}

//! tuttibot CLI - mail new tutti.ch listings
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tuttibot::notify::{Delivery, DryRun, MailCommand, Transport};
use tuttibot::{Config, LinkFilter, Query, RunOptions};

#[derive(Parser)]
#[command(name = "tuttibot")]
#[command(author, version, about = "Mail newly listed tutti.ch entries", long_about = None)]
struct Cli {
    /// Comma-separated keywords, e.g. `sofa,bern`
    keywords: String,
    /// Region to search in, e.g. `bern` or `ganze-schweiz`
    region: String,
    /// Category path such as `haushalt/moebel`; pass "" for none
    category: String,
    /// Address the new links are mailed to
    recipient: String,
    /// Only report links containing one of these comma-separated terms
    #[arg(long, value_delimiter = ',')]
    filter: Vec<String>,
    /// Ledger file of already reported links (default: one file per query)
    #[arg(long)]
    ledger: Option<PathBuf>,
    /// Create the ledger file if it does not exist yet
    #[arg(long)]
    create_ledger: bool,
    /// Print the message instead of mailing it
    #[arg(long)]
    dry_run: bool,
    /// Path to tuttibot.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let category = Some(cli.category).filter(|c| !c.is_empty());
    let query = Query::new(Query::parse_keywords(&cli.keywords), cli.region, category);

    let mut options = RunOptions::new(query, cli.recipient);
    options.filter = LinkFilter::new(Some(cli.filter));
    options.ledger_path = cli.ledger;
    options.create_ledger = cli.create_ledger;

    let transport: Box<dyn Transport> = if cli.dry_run {
        Box::new(DryRun)
    } else {
        Box::new(MailCommand::new(config.mail.command.clone()))
    };

    let report = tuttibot::run(&options, &config, transport.as_ref()).await?;

    println!(
        "Checked {} ({} matching, {} new)",
        report.url,
        report.matched.len(),
        report.new_links.len()
    );
    match report.delivery {
        Delivery::Skipped => println!("{}", "Nothing to send.".dimmed()),
        Delivery::Sent => println!("{} {}", "Mail sent to".green(), options.recipient),
        Delivery::Failed(e) => eprintln!(
            "{} {} (links are recorded in {})",
            "Warning: notification failed:".yellow(),
            e,
            report.ledger_path.display()
        ),
    }

    Ok(())
}

mod config;
mod crawl;
mod db;
mod detail;
mod fetch;
mod listing;
mod pagination;

use std::time::Instant;

use clap::{Args, Parser, Subcommand};

use config::{CrawlConfig, WarehouseConfig, DEFAULT_BASE_URL, DEFAULT_DELAY_SECS, DEFAULT_INDUSTRY};

#[derive(Parser)]
#[command(name = "industry_scraper", about = "Company directory scraper with a Postgres warehouse")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SiteArgs {
    /// Directory root to crawl
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Industry slug under the directory root
    #[arg(long, default_value = DEFAULT_INDUSTRY)]
    industry: String,
    /// Seconds to wait between successive page fetches
    #[arg(long, default_value_t = DEFAULT_DELAY_SECS)]
    delay: u64,
}

impl SiteArgs {
    fn crawl_config(&self) -> CrawlConfig {
        CrawlConfig::new(self.base_url.clone(), self.industry.clone(), self.delay)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the whole industry and insert every company into the warehouse
    Run {
        #[command(flatten)]
        site: SiteArgs,
        /// Max companies to extract (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Report the listing page count without crawling
    Pages {
        #[command(flatten)]
        site: SiteArgs,
    },
    /// Print the company links on one listing page
    Links {
        #[command(flatten)]
        site: SiteArgs,
        /// Listing page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Extract a single company detail page without inserting it
    Extract {
        /// Detail page URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let client = fetch::client()?;

    let result = match cli.command {
        Commands::Run { site, limit } => {
            let warehouse = db::Warehouse::connect(&WarehouseConfig::from_env()?)?;
            let cfg = site.crawl_config();
            let records = crawl::run(&client, &cfg, &warehouse, limit).await?;
            println!("Inserted {} companies from {}", records.len(), cfg.index_url());
            Ok(())
        }
        Commands::Pages { site } => {
            let pages = pagination::discover(&client, &site.crawl_config()).await?;
            println!("{} listing pages", pages);
            Ok(())
        }
        Commands::Links { site, page } => {
            let links = listing::scrape(&client, &site.crawl_config(), page).await?;
            for link in &links {
                println!("{}", link);
            }
            println!("{} companies on page {}", links.len(), page);
            Ok(())
        }
        Commands::Extract { url } => {
            let record = detail::scrape(&client, &url).await?;
            println!("{:#?}", record);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

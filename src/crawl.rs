use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tracing::info;

use crate::config::CrawlConfig;
use crate::db::{CompanyRecord, CompanySink};
use crate::{detail, listing, pagination};

/// Run the whole crawl: discover the page count, collect company links from
/// every listing page, then fetch, extract, and insert each company in
/// order. Each record is also printed to stdout as it is extracted. The
/// first error aborts the run; rows already inserted stay committed.
pub async fn run(
    client: &Client,
    cfg: &CrawlConfig,
    sink: &dyn CompanySink,
    limit: Option<usize>,
) -> Result<Vec<CompanyRecord>> {
    let pages = pagination::discover(client, cfg).await?;

    let mut links = Vec::new();
    for page in 1..=pages {
        let page_links = listing::scrape(client, cfg, page).await?;
        info!("Page {}/{}: {} companies", page, pages, page_links.len());
        links.extend(page_links);
        if page < pages {
            tokio::time::sleep(cfg.delay).await;
        }
    }

    if let Some(n) = limit {
        links.truncate(n);
    }
    info!("Extracting {} company pages", links.len());

    let pb = ProgressBar::new(links.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let mut records = Vec::with_capacity(links.len());
    for (i, href) in links.iter().enumerate() {
        let url = cfg.detail_url(href)?;
        let record = detail::scrape(client, &url).await?;
        println!("{:?}", record);
        sink.insert(&record).await?;
        records.push(record);
        pb.inc(1);
        if i + 1 < links.len() {
            tokio::time::sleep(cfg.delay).await;
        }
    }

    pb.finish_and_clear();
    info!("Crawl complete: {} companies", records.len());
    Ok(records)
}

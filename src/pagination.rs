use std::sync::LazyLock;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::info;

use crate::config::CrawlConfig;
use crate::fetch;

/// Browser identity for index-page requests.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.3.1 Safari/605.1.1";

static LAST_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[title="Last"]"#).unwrap());
static PAGE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|/)p(\d+)\.html$").unwrap());

/// Fetch the industry index page and return the total listing page count.
pub async fn discover(client: &Client, cfg: &CrawlConfig) -> Result<u32> {
    let url = cfg.index_url();
    info!("Discovering page count from {}", url);
    let html = fetch::fetch_html(client, &url, USER_AGENT).await?;
    let pages = last_page_number(&html)
        .with_context(|| format!("Pagination discovery failed for {}", url))?;
    info!("{} listing pages", pages);
    Ok(pages)
}

/// Read the page count out of the anchor titled "Last", whose href ends in
/// `p<N>.html`. A missing anchor or an href in any other shape is an error;
/// this never falls back to a single page.
pub fn last_page_number(html: &str) -> Result<u32> {
    let doc = Html::parse_document(html);
    let anchor = doc
        .select(&LAST_LINK)
        .next()
        .ok_or_else(|| anyhow!("No anchor titled \"Last\""))?;
    let href = anchor
        .value()
        .attr("href")
        .ok_or_else(|| anyhow!("\"Last\" anchor has no href"))?;

    let caps = PAGE_NUMBER
        .captures(href)
        .ok_or_else(|| anyhow!("Unexpected last-page href: {}", href))?;
    caps[1]
        .parse::<u32>()
        .with_context(|| format!("Page number out of range in {}", href))
}

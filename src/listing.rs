use std::sync::LazyLock;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;

use crate::config::CrawlConfig;
use crate::fetch;

/// Browser identity for listing-page requests.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.3";

static CONTAINER: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".body").unwrap());
static ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static ITEM_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h4 a").unwrap());

/// Fetch listing page `page` and return its company detail hrefs.
pub async fn scrape(client: &Client, cfg: &CrawlConfig, page: u32) -> Result<Vec<String>> {
    let url = cfg.listing_page_url(page);
    let html = fetch::fetch_html(client, &url, USER_AGENT).await?;
    let links =
        company_links(&html).with_context(|| format!("Listing parse failed for {}", url))?;
    debug!("{}: {} companies", url, links.len());
    Ok(links)
}

/// Extract company hrefs from a listing page: every `<li>` under the first
/// element with class `body`, each linking through `<h4><a href>`. Hrefs
/// come back in document order and duplicates are preserved. A page without
/// the container, or an item without its link, is an error.
pub fn company_links(html: &str) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let container = doc
        .select(&CONTAINER)
        .next()
        .ok_or_else(|| anyhow!("No listing container with class \"body\""))?;

    let mut links = Vec::new();
    for item in container.select(&ITEM) {
        let href = item
            .select(&ITEM_LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| anyhow!("Listing item without an h4 link"))?;
        links.push(href.to_string());
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hrefs_in_document_order() {
        let html = std::fs::read_to_string("tests/fixtures/listing.html").unwrap();
        let links = company_links(&html).unwrap();
        assert_eq!(
            links,
            [
                "wood-furniture-companies/acme-wood-industries.html",
                "wood-furniture-companies/birch-brothers.html",
                "wood-furniture-companies/cendana-furniture.html",
            ]
        );
    }

    #[test]
    fn duplicates_are_preserved() {
        let html = r#"
            <div class="body"><ul>
              <li><h4><a href="wood-furniture-companies/acme.html">Acme</a></h4></li>
              <li><h4><a href="wood-furniture-companies/acme.html">Acme (again)</a></h4></li>
            </ul></div>"#;
        let links = company_links(html).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0], links[1]);
    }

    #[test]
    fn missing_container_is_an_error() {
        let html = r#"<div class="content"><li><h4><a href="x.html">X</a></h4></li></div>"#;
        let err = company_links(html).unwrap_err();
        assert!(err.to_string().contains("body"), "got: {}", err);
    }

    #[test]
    fn item_without_link_is_an_error() {
        let html = r#"
            <div class="body"><ul>
              <li><h4><a href="wood-furniture-companies/acme.html">Acme</a></h4></li>
              <li><h4>No link here</h4></li>
            </ul></div>"#;
        assert!(company_links(html).is_err());
    }

    #[test]
    fn empty_container_yields_no_links() {
        let html = r#"<div class="body"><p>Nothing listed this week.</p></div>"#;
        assert_eq!(company_links(html).unwrap().len(), 0);
    }
}

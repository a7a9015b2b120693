use std::sync::LazyLock;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::db::CompanyRecord;
use crate::fetch;

/// Browser identity for detail-page requests.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

static HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static INFO_SECTION: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".the07").unwrap());
static CONTACT_SECTION: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".the09").unwrap());
static ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

// ── Field rules ──

#[derive(Clone, Copy)]
enum Field {
    OperationalAddress,
    Location,
    ContactPerson,
    Telephone,
    Website,
}

/// How a matched item's value is read.
#[derive(Clone, Copy)]
enum Mode {
    /// Text after the label, minus the separating colon and whitespace.
    TrimAfterLabel,
    /// Href of the item's anchor, never its visible text.
    AnchorHref,
}

struct FieldRule {
    label: &'static str,
    field: Field,
    mode: Mode,
}

/// Rules for the company info section. Order matters: the first rule whose
/// label occurs in an item claims that item.
const INFO_RULES: &[FieldRule] = &[
    FieldRule {
        label: "Operational Address",
        field: Field::OperationalAddress,
        mode: Mode::TrimAfterLabel,
    },
    FieldRule {
        label: "Location",
        field: Field::Location,
        mode: Mode::TrimAfterLabel,
    },
];

/// Rules for the contact section.
const CONTACT_RULES: &[FieldRule] = &[
    FieldRule {
        label: "Contact Person",
        field: Field::ContactPerson,
        mode: Mode::TrimAfterLabel,
    },
    FieldRule {
        label: "Telephone",
        field: Field::Telephone,
        mode: Mode::TrimAfterLabel,
    },
    FieldRule {
        label: "Website",
        field: Field::Website,
        mode: Mode::AnchorHref,
    },
];

// ── Extraction ──

/// Fetch a company detail page and extract its record.
pub async fn scrape(client: &Client, url: &str) -> Result<CompanyRecord> {
    let html = fetch::fetch_html(client, url, USER_AGENT).await?;
    extract_company(&html).with_context(|| format!("Extraction failed for {}", url))
}

/// Extract a company record from detail-page HTML. The heading and both
/// sections must exist; individual labels are optional and leave their
/// field unset when absent. When a label repeats, the last item wins.
pub fn extract_company(html: &str) -> Result<CompanyRecord> {
    let doc = Html::parse_document(html);

    let company_name = doc
        .select(&HEADING)
        .next()
        .map(|h| h.text().collect::<String>().trim().to_string())
        .ok_or_else(|| anyhow!("No h1 company name"))?;

    let info = doc
        .select(&INFO_SECTION)
        .next()
        .ok_or_else(|| anyhow!("No info section with class \"the07\""))?;
    let contact = doc
        .select(&CONTACT_SECTION)
        .next()
        .ok_or_else(|| anyhow!("No contact section with class \"the09\""))?;

    let mut record = CompanyRecord {
        company_name,
        operational_address: None,
        location: None,
        contact_person: None,
        telephone: None,
        website: None,
    };
    apply_rules(info, INFO_RULES, &mut record)?;
    apply_rules(contact, CONTACT_RULES, &mut record)?;
    Ok(record)
}

/// Run a rule table over a section's `<li>` items.
fn apply_rules(
    section: ElementRef<'_>,
    rules: &[FieldRule],
    record: &mut CompanyRecord,
) -> Result<()> {
    for item in section.select(&ITEM) {
        let text = item.text().collect::<String>();
        for rule in rules {
            let after = match text.split_once(rule.label) {
                Some((_, rest)) => rest,
                None => continue,
            };
            let value = match rule.mode {
                Mode::TrimAfterLabel => after
                    .trim_start_matches(|c: char| c.is_whitespace() || c == ':')
                    .trim_end()
                    .to_string(),
                Mode::AnchorHref => item
                    .select(&ANCHOR)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(str::to_string)
                    .ok_or_else(|| anyhow!("\"{}\" item has no link", rule.label))?,
            };
            let slot = match rule.field {
                Field::OperationalAddress => &mut record.operational_address,
                Field::Location => &mut record.location,
                Field::ContactPerson => &mut record.contact_person,
                Field::Telephone => &mut record.telephone,
                Field::Website => &mut record.website,
            };
            *slot = Some(value);
            break;
        }
    }
    Ok(())
}

// ── Tests ──

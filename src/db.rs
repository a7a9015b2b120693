use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::config::WarehouseConfig;

/// One extracted company, ready for the warehouse. Fields whose label never
/// appeared on the page stay `None` and land as SQL NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyRecord {
    pub company_name: String,
    pub operational_address: Option<String>,
    pub location: Option<String>,
    pub contact_person: Option<String>,
    pub telephone: Option<String>,
    pub website: Option<String>,
}

/// Destination for extracted records.
#[async_trait]
pub trait CompanySink {
    async fn insert(&self, record: &CompanyRecord) -> Result<()>;
}

const INSERT_COMPANY: &str = r#"
INSERT INTO companies
    (company_name, operational_address, location, contact_person, telephone, website)
VALUES
    ($1, $2, $3, $4, $5, $6)
"#;

/// Postgres-backed sink. The pool holds at most one connection, acquired on
/// the first insert; `connect` never touches the server, though it does
/// parse the URL, so a malformed one fails here rather than on first use.
pub struct Warehouse {
    pool: PgPool,
}

impl Warehouse {
    pub fn connect(cfg: &WarehouseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(&cfg.url())
            .context("Invalid warehouse connection URL")?;
        info!("Warehouse: {}", cfg.masked_url());
        Ok(Self { pool })
    }
}

#[async_trait]
impl CompanySink for Warehouse {
    /// Insert one row. Each statement commits on its own, so rows written
    /// earlier in a run survive a later abort. Duplicates insert again;
    /// there is no upsert.
    async fn insert(&self, record: &CompanyRecord) -> Result<()> {
        sqlx::query(INSERT_COMPANY)
            .bind(&record.company_name)
            .bind(record.operational_address.as_deref())
            .bind(record.location.as_deref())
            .bind(record.contact_person.as_deref())
            .bind(record.telephone.as_deref())
            .bind(record.website.as_deref())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to insert company {}", record.company_name))?;
        debug!("Inserted {}", record.company_name);
        Ok(())
    }
}

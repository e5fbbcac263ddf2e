//! Server configuration.
//!
//! Settings come from environment variables:
//!
//! * `ZIMTAX_BIND_ADDR` - listen address, default `127.0.0.1:3000`.
//! * `ZIMTAX_RATE_DIR` - directory of versioned rate table JSON files.
//!   When unset the built-in 2024 table is used.
//! * `ZIMTAX_TAX_YEAR` - version to pick from the directory; defaults to
//!   the latest version found.

use crate::rates::{load_rate_tables_from_dir, RateTable};
use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub rate_dir: Option<PathBuf>,
    pub tax_year: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw_addr = lookup("ZIMTAX_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse()
            .with_context(|| format!("ZIMTAX_BIND_ADDR is not a socket address: {raw_addr}"))?;
        let rate_dir = lookup("ZIMTAX_RATE_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        let tax_year = lookup("ZIMTAX_TAX_YEAR").filter(|s| !s.trim().is_empty());
        Ok(Self {
            bind_addr,
            rate_dir,
            tax_year,
        })
    }

    /// Resolve and validate the rate table this server will use.
    pub fn load_rate_table(&self) -> Result<RateTable> {
        let table = match &self.rate_dir {
            None => RateTable::zimbabwe_2024(),
            Some(dir) => {
                let tables = load_rate_tables_from_dir(dir)
                    .with_context(|| format!("reading rate tables from {}", dir.display()))?;
                let picked = match &self.tax_year {
                    Some(year) => tables.into_iter().find(|t| &t.version == year),
                    None => tables.into_iter().last(),
                };
                picked.ok_or_else(|| {
                    anyhow!(
                        "no rate table {} in {}",
                        self.tax_year.as_deref().unwrap_or("(any version)"),
                        dir.display()
                    )
                })?
            }
        };
        table.validate()?;
        tracing::info!(version = %table.version, "Rate table loaded");
        Ok(table)
    }
}

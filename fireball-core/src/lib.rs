pub mod aggregate;
pub mod catalog;
pub mod constants;
pub mod coordinate;
pub mod error;
pub mod matcher;
pub mod range;
pub mod session;
pub mod source;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use aggregate::{Leaderboard, QueryOutcome};
pub use catalog::{CatalogRecord, FireballProcessor, ProcessedCatalog, Processor, RawCatalog};
pub use constants::*;
pub use coordinate::{parse_degree, strip_direction, Coordinate, Direction};
pub use error::{FireballError, Result};
pub use matcher::{MatchResult, Query, QueryIssue, QueryReport};
pub use range::{round1, Axis, AxisRange, Grid, Interval};
pub use session::{ReportDecision, Session, SessionState};
pub use source::{CatalogSource, FileFetcher, Fetcher, LoadCatalog};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    #[serde(default = "default_date_min")]
    pub date_min: String,
    #[serde(default = "default_date_max")]
    pub date_max: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            catalog_url: default_catalog_url(),
            date_min: default_date_min(),
            date_max: default_date_max(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        let cfg: Config =
            serde_json::from_slice(&data).map_err(|e| FireballError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.catalog_url.trim().is_empty() {
            return Err(FireballError::Config("catalogUrl must not be empty".into()));
        }
        if self.timeout_ms == 0 {
            return Err(FireballError::Config("timeoutMs must be > 0".into()));
        }
        // ISO dates order lexically.
        if self.date_min >= self.date_max {
            return Err(FireballError::Config(format!(
                "dateMin {} must be before dateMax {}",
                self.date_min, self.date_max
            )));
        }
        Ok(())
    }

    pub fn catalog_url(&self) -> String {
        let sep = if self.catalog_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}date-min={}&date-max={}",
            self.catalog_url, sep, self.date_min, self.date_max
        )
    }
}

/// A named location as typed by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityInput {
    pub city: String,
    pub latitude: String,
    pub longitude: String,
}

impl CityInput {
    /// Parses `NAME:LAT:LON`. The name may itself contain colons.
    pub fn parse_flag(s: &str) -> Result<Self> {
        let mut parts = s.rsplitn(3, ':');
        let (Some(longitude), Some(latitude), Some(city)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(FireballError::Config(format!(
                "city {:?} must look like NAME:LAT:LON",
                s
            )));
        };
        if city.trim().is_empty() {
            return Err(FireballError::Config(format!("city {:?} has no name", s)));
        }
        Ok(CityInput {
            city: city.trim().to_string(),
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
        })
    }

    pub fn load_list<P: AsRef<Path>>(path: P) -> Result<Vec<Self>> {
        let data = fs::read(path)?;
        serde_json::from_slice(&data).map_err(|e| FireballError::Config(e.to_string()))
    }

    pub fn query(&self) -> Query {
        Query::new(&self.city, &self.latitude, &self.longitude)
    }
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_date_min() -> String {
    DEFAULT_DATE_MIN.to_string()
}

fn default_date_max() -> String {
    DEFAULT_DATE_MAX.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_user_agent() -> String {
    format!("fireball-finder/{}", env!("CARGO_PKG_VERSION"))
}

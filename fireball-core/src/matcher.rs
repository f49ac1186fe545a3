use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::QueryOutcome;
use crate::catalog::{CatalogRecord, ProcessedCatalog};
use crate::range::{Axis, AxisRange};
use crate::source::LoadCatalog;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub energy: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub date: Option<String>,
}

impl From<&CatalogRecord> for MatchResult {
    fn from(rec: &CatalogRecord) -> Self {
        MatchResult {
            energy: rec.energy,
            latitude: rec.latitude,
            longitude: rec.longitude,
            date: rec.date.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QueryIssue {
    CatalogUnavailable { message: String },
    InvalidCoordinate { axis: Axis, message: String },
    SkippedRecords { count: usize },
    NoMatch,
}

impl fmt::Display for QueryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryIssue::CatalogUnavailable { message } => {
                write!(f, "catalog unavailable: {}", message)
            }
            QueryIssue::InvalidCoordinate { axis, message } => write!(f, "{}: {}", axis, message),
            QueryIssue::SkippedRecords { count } => {
                write!(f, "{} malformed catalog rows skipped", count)
            }
            QueryIssue::NoMatch => f.write_str("no data found for this query"),
        }
    }
}

/// One city's search window.
#[derive(Debug, Clone)]
pub struct Query {
    pub city: String,
    pub latitude: AxisRange,
    pub longitude: AxisRange,
}

impl Query {
    pub fn new(city: &str, latitude: &str, longitude: &str) -> Self {
        Query {
            city: city.to_string(),
            latitude: AxisRange::from_input(Axis::Latitude, latitude),
            longitude: AxisRange::from_input(Axis::Longitude, longitude),
        }
    }

    pub fn matches(&self, rec: &CatalogRecord) -> bool {
        if rec.is_unlocated() {
            return false;
        }
        self.latitude.contains(rec.latitude) && self.longitude.contains(rec.longitude)
    }

    /// Highest-energy matching record. The earliest record wins a tie.
    pub fn best_match(&self, records: &[CatalogRecord]) -> Option<MatchResult> {
        let mut best: Option<&CatalogRecord> = None;
        for rec in records.iter().filter(|r| self.matches(r)) {
            match best {
                Some(b) if rec.energy <= b.energy => {}
                _ => best = Some(rec),
            }
        }
        best.map(MatchResult::from)
    }

    /// Fetches a fresh catalog and evaluates against it.
    pub fn run(&self, source: &dyn LoadCatalog) -> QueryReport {
        match source.load_catalog() {
            Ok(catalog) => self.evaluate(&catalog),
            Err(err) => {
                warn!("{}: catalog fetch failed: {}", self.city, err);
                let mut report = self.evaluate(&ProcessedCatalog::default());
                report.issues.insert(
                    0,
                    QueryIssue::CatalogUnavailable {
                        message: err.to_string(),
                    },
                );
                report
            }
        }
    }

    pub fn evaluate(&self, catalog: &ProcessedCatalog) -> QueryReport {
        let mut issues = Vec::new();
        for axis in [&self.latitude, &self.longitude] {
            if let Some(message) = &axis.error {
                issues.push(QueryIssue::InvalidCoordinate {
                    axis: axis.axis,
                    message: message.clone(),
                });
            }
        }
        if catalog.skipped > 0 {
            issues.push(QueryIssue::SkippedRecords {
                count: catalog.skipped,
            });
        }

        let best = self.best_match(&catalog.records);
        match &best {
            Some(m) => info!(
                "{}: best energy {} at ({}, {})",
                self.city, m.energy, m.latitude, m.longitude
            ),
            None => issues.push(QueryIssue::NoMatch),
        }

        QueryReport {
            city: self.city.clone(),
            latitude: self.latitude.clone(),
            longitude: self.longitude.clone(),
            best,
            records_scanned: catalog.records.len(),
            catalog_sha256: catalog.sha256.clone(),
            issues,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryReport {
    pub city: String,
    pub latitude: AxisRange,
    pub longitude: AxisRange,
    pub best: Option<MatchResult>,
    pub records_scanned: usize,
    pub catalog_sha256: Option<String>,
    pub issues: Vec<QueryIssue>,
}

impl QueryReport {
    pub fn outcome(&self) -> Option<QueryOutcome> {
        self.best.as_ref().map(|m| QueryOutcome {
            city: self.city.clone(),
            energy: m.energy,
            location: (m.latitude, m.longitude),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::UNKNOWN_COORD;
    use crate::error::{FireballError, Result};

    const SF_LAT: &str = "37.7937007 N";
    const SF_LON: &str = "122.4039064 W";

    fn rec(latitude: f64, longitude: f64, energy: f64) -> CatalogRecord {
        CatalogRecord {
            latitude,
            longitude,
            energy,
            date: None,
        }
    }

    struct FailingSource;

    impl LoadCatalog for FailingSource {
        fn load_catalog(&self) -> Result<ProcessedCatalog> {
            Err(FireballError::Network("connection refused".to_string()))
        }
    }

    struct FixedSource(Vec<CatalogRecord>);

    impl LoadCatalog for FixedSource {
        fn load_catalog(&self) -> Result<ProcessedCatalog> {
            Ok(ProcessedCatalog {
                records: self.0.clone(),
                skipped: 0,
                sha256: Some("abc".to_string()),
            })
        }
    }

    #[test]
    fn scenario_b_record_is_selected() {
        let q = Query::new("San Francisco", SF_LAT, SF_LON);
        let records = vec![rec(40.0, 120.0, 5.2), rec(40.0, 120.0, 1.0), rec(10.0, 120.0, 90.0)];
        let best = q.best_match(&records).unwrap();
        assert_eq!(best.energy, 5.2);
        assert_eq!(best.latitude, 40.0);
        assert_eq!(best.longitude, 120.0);
    }

    #[test]
    fn unlocated_records_never_match() {
        let wide = Query::new("anywhere", "200", "200");
        assert!(!wide.matches(&rec(UNKNOWN_COORD, UNKNOWN_COORD, 100.0)));
        assert_eq!(wide.best_match(&[rec(UNKNOWN_COORD, UNKNOWN_COORD, 100.0)]), None);

        let q = Query::new("San Francisco", SF_LAT, SF_LON);
        assert!(!q.matches(&rec(UNKNOWN_COORD, 120.0, 1.0)));
        assert!(!q.matches(&rec(40.0, UNKNOWN_COORD, 1.0)));
    }

    #[test]
    fn equal_energies_keep_first_record() {
        let q = Query::new("San Francisco", SF_LAT, SF_LON);
        let records = vec![rec(30.0, 110.0, 3.0), rec(45.0, 130.0, 3.0)];
        let best = q.best_match(&records).unwrap();
        assert_eq!(best.latitude, 30.0);
    }

    #[test]
    fn southern_input_is_not_negated() {
        let q = Query::new("Sydney", "33.8688 S", "151.2093 E");
        assert!(q.matches(&rec(33.9, 151.2, 1.0)));
        assert!(!q.matches(&rec(-33.9, 151.2, 1.0)));
    }

    #[test]
    fn membership_follows_grid_rounding() {
        let q = Query::new("Null Island", "0.05", "0.05");
        assert!(q.matches(&rec(-14.9, 15.0, 1.0)));
        assert!(q.matches(&rec(-14.95, 15.04, 1.0)));
        assert!(!q.matches(&rec(-15.0, 0.0, 1.0)));
        assert!(!q.matches(&rec(0.0, 15.06, 1.0)));
    }

    #[test]
    fn invalid_axis_yields_no_match_with_issue() {
        let q = Query::new("Nowhere", "north-ish", SF_LON);
        let report = q.run(&FixedSource(vec![rec(40.0, 120.0, 5.2)]));
        assert_eq!(report.best, None);
        assert!(report.outcome().is_none());
        assert!(matches!(
            report.issues[0],
            QueryIssue::InvalidCoordinate { axis: Axis::Latitude, .. }
        ));
        assert_eq!(report.issues.last(), Some(&QueryIssue::NoMatch));
    }

    #[test]
    fn scenario_d_failed_fetch_is_no_match() {
        let q = Query::new("San Francisco", SF_LAT, SF_LON);
        let report = q.run(&FailingSource);
        assert_eq!(report.best, None);
        assert_eq!(report.records_scanned, 0);
        assert!(matches!(
            report.issues[0],
            QueryIssue::CatalogUnavailable { .. }
        ));
        assert!(report.issues.contains(&QueryIssue::NoMatch));
    }

    #[test]
    fn report_exposes_outcome() {
        let q = Query::new("San Francisco", SF_LAT, SF_LON);
        let report = q.run(&FixedSource(vec![rec(40.0, 120.0, 5.2)]));
        let outcome = report.outcome().unwrap();
        assert_eq!(outcome.city, "San Francisco");
        assert_eq!(outcome.energy, 5.2);
        assert_eq!(outcome.location, (40.0, 120.0));
        assert_eq!(report.catalog_sha256.as_deref(), Some("abc"));
        assert!(report.issues.is_empty());
    }
}

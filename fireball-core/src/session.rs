use std::fmt;

use tracing::debug;

use crate::aggregate::{Leaderboard, QueryOutcome};
use crate::error::{FireballError, Result};
use crate::matcher::{Query, QueryReport};
use crate::source::LoadCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingCityInput,
    Querying,
    AwaitingReportDecision,
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::AwaitingCityInput => "awaiting city input",
            SessionState::Querying => "querying",
            SessionState::AwaitingReportDecision => "awaiting report decision",
            SessionState::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportDecision {
    Report,
    Continue,
    Exit,
}

impl ReportDecision {
    pub fn parse(input: &str) -> Self {
        let s = input.trim();
        if s.eq_ignore_ascii_case("yes") {
            ReportDecision::Report
        } else if s.eq_ignore_ascii_case("exit") {
            ReportDecision::Exit
        } else {
            ReportDecision::Continue
        }
    }
}

/// Drives one interactive run: a query per city, then a report decision.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    board: Leaderboard,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            state: SessionState::AwaitingCityInput,
            board: Leaderboard::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.board
    }

    pub fn submit(
        &mut self,
        city: &str,
        latitude: &str,
        longitude: &str,
        source: &dyn LoadCatalog,
    ) -> Result<QueryReport> {
        self.expect(SessionState::AwaitingCityInput, "submit a city")?;
        self.transition(SessionState::Querying);

        let report = Query::new(city, latitude, longitude).run(source);
        if let Some(outcome) = report.outcome() {
            self.board.record(outcome);
        }

        self.transition(SessionState::AwaitingReportDecision);
        Ok(report)
    }

    /// Applies the user's choice. `Report` hands back the best city so far.
    pub fn decide(&mut self, decision: ReportDecision) -> Result<Option<QueryOutcome>> {
        self.expect(SessionState::AwaitingReportDecision, "decide on a report")?;
        match decision {
            ReportDecision::Report => {
                self.transition(SessionState::AwaitingCityInput);
                Ok(self.board.best().cloned())
            }
            ReportDecision::Continue => {
                self.transition(SessionState::AwaitingCityInput);
                Ok(None)
            }
            ReportDecision::Exit => {
                self.transition(SessionState::Terminated);
                Ok(None)
            }
        }
    }

    /// Ends the session from any state, e.g. on end of input.
    pub fn terminate(&mut self) {
        self.transition(SessionState::Terminated);
    }

    fn expect(&self, want: SessionState, action: &str) -> Result<()> {
        if self.state != want {
            return Err(FireballError::InvalidTransition {
                from: self.state.to_string(),
                action: action.to_string(),
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: SessionState) {
        debug!("session: {} -> {}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogRecord, ProcessedCatalog};

    struct FixedSource(Vec<CatalogRecord>);

    impl LoadCatalog for FixedSource {
        fn load_catalog(&self) -> Result<ProcessedCatalog> {
            Ok(ProcessedCatalog {
                records: self.0.clone(),
                skipped: 0,
                sha256: None,
            })
        }
    }

    fn rec(latitude: f64, longitude: f64, energy: f64) -> CatalogRecord {
        CatalogRecord {
            latitude,
            longitude,
            energy,
            date: None,
        }
    }

    #[test]
    fn parses_decisions() {
        assert_eq!(ReportDecision::parse("YES\n"), ReportDecision::Report);
        assert_eq!(ReportDecision::parse("yes"), ReportDecision::Report);
        assert_eq!(ReportDecision::parse("Exit"), ReportDecision::Exit);
        assert_eq!(ReportDecision::parse(""), ReportDecision::Continue);
        assert_eq!(ReportDecision::parse("y"), ReportDecision::Continue);
    }

    #[test]
    fn walks_states_and_reports_best_city() {
        let source = FixedSource(vec![rec(40.0, 120.0, 5.2), rec(-30.0, 150.0, 8.1)]);
        let mut session = Session::new();

        let report = session
            .submit("San Francisco", "37.7937007 N", "122.4039064 W", &source)
            .unwrap();
        assert_eq!(report.best.as_ref().unwrap().energy, 5.2);
        assert_eq!(session.state(), SessionState::AwaitingReportDecision);
        assert_eq!(session.decide(ReportDecision::Continue).unwrap(), None);
        assert_eq!(session.state(), SessionState::AwaitingCityInput);

        session.submit("Sydney", "-33.8688", "151.2093", &source).unwrap();
        let best = session.decide(ReportDecision::Report).unwrap().unwrap();
        assert_eq!(best.city, "Sydney");
        assert_eq!(best.energy, 8.1);

        session.submit("Nowhere", "0", "0", &source).unwrap();
        assert_eq!(session.leaderboard().len(), 2);
        assert_eq!(session.decide(ReportDecision::Exit).unwrap(), None);
        assert_eq!(session.state(), SessionState::Terminated);
    }

    #[test]
    fn rejects_out_of_order_calls() {
        let source = FixedSource(Vec::new());
        let mut session = Session::new();
        assert!(matches!(
            session.decide(ReportDecision::Report),
            Err(FireballError::InvalidTransition { .. })
        ));
        session.submit("a", "1", "1", &source).unwrap();
        assert!(session.submit("b", "1", "1", &source).is_err());
        session.terminate();
        assert!(session.submit("c", "1", "1", &source).is_err());
    }
}

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    pub city: String,
    pub energy: f64,
    pub location: (f64, f64),
}

/// Outcomes in the order they were recorded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Leaderboard {
    outcomes: Vec<QueryOutcome>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: QueryOutcome) {
        self.outcomes.push(outcome);
    }

    /// Highest energy so far; the earliest outcome wins a tie.
    pub fn best(&self) -> Option<&QueryOutcome> {
        let mut best: Option<&QueryOutcome> = None;
        for o in &self.outcomes {
            match best {
                Some(b) if o.energy <= b.energy => {}
                _ => best = Some(o),
            }
        }
        best
    }

    /// Highest energy first, recording order among equals.
    pub fn ranked(&self) -> Vec<&QueryOutcome> {
        let mut out: Vec<&QueryOutcome> = self.outcomes.iter().collect();
        out.sort_by(|a, b| {
            b.energy
                .partial_cmp(&a.energy)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryOutcome> {
        self.outcomes.iter()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

use crate::model::{MatchConfidence, Reconciliation, ReconSummary, RunReport, UnifiedRecord};

/// Count processed and matched localities over the unified records.
pub fn compute_summary(records: &[UnifiedRecord], election_localities: usize) -> ReconSummary {
    let matched = records
        .iter()
        .filter(|r| r.match_confidence == MatchConfidence::Mapped)
        .count();

    ReconSummary {
        localities_processed: records.len(),
        localities_matched: matched,
        election_localities,
    }
}

/// Machine-readable report for one reconciliation, stamped with the engine
/// version and the current time.
pub fn build_report(result: &Reconciliation) -> RunReport {
    RunReport {
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        run_at: chrono::Utc::now().to_rfc3339(),
        summary: result.summary.clone(),
        match_rate: (result.summary.match_rate() * 100.0).round() / 100.0,
        unmatched: result
            .records
            .iter()
            .filter(|r| r.match_confidence == MatchConfidence::NoMatch)
            .map(|r| r.census.clone())
            .collect(),
    }
}

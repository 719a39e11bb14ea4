use tracing::{debug, info, warn};

use crate::aggregate::{CensusAggregates, ElectionGroup, ElectionGroups};
use crate::config::MatchingConfig;
use crate::evidence::compute_summary;
use crate::matcher::LocationMatcher;
use crate::model::{
    CensusRecord, DemographicTotals, ElectionRecord, ElectionSummary, LocalityKey,
    LocationMapping, MatchConfidence, Reconciliation, UnifiedRecord, Winner,
};

/// Join every census locality with the first election group the matcher ties
/// it to. One output record per census locality, in locality key order.
///
/// Only `options.progress_every` is read here; name similarity uses the
/// threshold the matcher was built with ([`LocationMatcher::with_threshold`]).
pub fn reconcile(
    census: &[CensusRecord],
    election: &[ElectionRecord],
    matcher: &LocationMatcher,
    options: &MatchingConfig,
) -> Reconciliation {
    let aggregates = CensusAggregates::from_records(census);
    let groups = ElectionGroups::from_records(election);
    info!(
        census_localities = aggregates.len(),
        election_localities = groups.len(),
        threshold = matcher.threshold(),
        "loaded localities"
    );

    let progress_every = options.progress_every.max(1);
    let mut records = Vec::with_capacity(aggregates.len());
    let mut matched = 0usize;

    for (processed, (key, stats)) in aggregates.iter().enumerate() {
        let demographics = DemographicTotals::from_stats(stats);
        let record = match bind_group(key, &groups, matcher) {
            Some((group, mapping)) => {
                matched += 1;
                debug!(census = %key, election = %group.key, "mapped");
                unified(key, demographics, Some(mapping), ElectionSummary::from_records(&group.records))
            }
            None => {
                debug!(
                    census = %key,
                    reference_rows = matcher.mappings_for_province(&key.province).len(),
                    "no election locality matched"
                );
                unified(key, demographics, None, ElectionSummary::default())
            }
        };
        records.push(record);

        let processed = processed + 1;
        if processed % progress_every == 0 {
            info!(processed, matched, "reconciling");
        }
    }

    let summary = compute_summary(&records, groups.len());
    info!(
        processed = summary.localities_processed,
        matched = summary.localities_matched,
        match_rate = %format!("{:.2}%", summary.match_rate()),
        "reconciliation complete"
    );
    let unmatched = summary.localities_processed - summary.localities_matched;
    if unmatched > 0 {
        warn!(unmatched, "census localities without an election match");
    }

    Reconciliation { records, summary }
}

/// First election group (in first-seen order) with a reference mapping for
/// the census locality.
fn bind_group<'g, 'a, 'm>(
    key: &LocalityKey,
    groups: &'g ElectionGroups<'a>,
    matcher: &'m LocationMatcher,
) -> Option<(&'g ElectionGroup<'a>, &'m LocationMapping)> {
    groups.iter().find_map(|group| {
        matcher
            .find_location_mapping(key, &group.key)
            .map(|mapping| (group, mapping))
    })
}

fn unified(
    key: &LocalityKey,
    demographics: DemographicTotals,
    mapping: Option<&LocationMapping>,
    election: ElectionSummary,
) -> UnifiedRecord {
    UnifiedRecord {
        province_id: mapping.and_then(|m| m.province_id),
        district_id: mapping.and_then(|m| m.district_id),
        province_name: key.province.clone(),
        district_name: key.district.clone(),
        locality_name: key.locality.clone(),
        census: key.clone(),
        demographics,
        election,
        match_confidence: if mapping.is_some() {
            MatchConfidence::Mapped
        } else {
            MatchConfidence::NoMatch
        },
    }
}

impl ElectionSummary {
    /// Candidate count, vote sum and the first candidate holding the maximum
    /// vote count.
    pub fn from_records(records: &[&ElectionRecord]) -> Self {
        let winner = records.iter().copied().fold(None::<&ElectionRecord>, |best, r| match best {
            Some(b) if b.total_votes >= r.total_votes => Some(b),
            _ => Some(r),
        });
        Self {
            total_candidates: records.len() as i64,
            total_votes: records.iter().map(|r| r.total_votes).sum(),
            winner: winner.map(|w| Winner {
                candidate_name: w.candidate_name.clone(),
                party_name: w.party_name.clone(),
                votes: w.total_votes,
            }),
        }
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Census
// ---------------------------------------------------------------------------

/// One fully-resolved census row after forward-fill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CensusRecord {
    pub province: String,
    pub district: String,
    pub locality: String,
    pub sex: String,
    pub caste_ethnicity: String,
    pub value: f64,
}

impl CensusRecord {
    pub fn locality_key(&self) -> LocalityKey {
        LocalityKey {
            province: self.province.clone(),
            district: self.district.clone(),
            locality: self.locality.clone(),
        }
    }
}

/// Census-side geographic key. Ordered by (province, district, locality).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LocalityKey {
    pub province: String,
    pub district: String,
    pub locality: String,
}

impl fmt::Display for LocalityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.province, self.district, self.locality)
    }
}

// ---------------------------------------------------------------------------
// Election
// ---------------------------------------------------------------------------

/// A candidate result row, projected from the 23-column election schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectionRecord {
    pub candidate_name: String,
    pub gender: String,
    pub age: Option<i64>,
    pub party_name: String,
    pub total_votes: i64,
    pub post_name: String,
    pub ward: Option<i64>,
    pub vdcmun_name: String,
    pub district_name: String,
    pub state_name: String,
}

impl ElectionRecord {
    pub fn election_key(&self) -> ElectionKey {
        ElectionKey {
            state: self.state_name.clone(),
            district: self.district_name.clone(),
            vdcmun: self.vdcmun_name.clone(),
        }
    }
}

/// Election-side geographic key (state, district, municipality).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ElectionKey {
    pub state: String,
    pub district: String,
    pub vdcmun: String,
}

impl fmt::Display for ElectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.state, self.district, self.vdcmun)
    }
}

// ---------------------------------------------------------------------------
// Reference mapping
// ---------------------------------------------------------------------------

/// A row of the bilingual district/palika reference table.
///
/// Unknown JSON fields are ignored; missing fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LocationMapping {
    #[serde(default)]
    pub district_id: Option<i64>,
    #[serde(default)]
    pub province_id: Option<i64>,
    #[serde(default)]
    pub district_en: Option<String>,
    #[serde(default)]
    pub district_np: Option<String>,
    #[serde(default)]
    pub palika_en: Option<String>,
    #[serde(default)]
    pub palika_np: Option<String>,
}

// ---------------------------------------------------------------------------
// Unified output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchConfidence {
    Mapped,
    NoMatch,
}

impl MatchConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mapped => "MAPPED",
            Self::NoMatch => "NO_MATCH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MAPPED" => Some(Self::Mapped),
            "NO_MATCH" => Some(Self::NoMatch),
            _ => None,
        }
    }
}

impl fmt::Display for MatchConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The eight demographic sub-aggregates carried into the unified table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DemographicTotals {
    pub total_population: f64,
    pub male_population: f64,
    pub female_population: f64,
    pub hill_castes: f64,
    pub mountain_hill_janajatis: f64,
    pub tarai_janajatis: f64,
    pub hill_dalits: f64,
    pub others: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElectionSummary {
    pub total_candidates: i64,
    pub total_votes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Winner>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Winner {
    pub candidate_name: String,
    pub party_name: String,
    pub votes: i64,
}

/// One row of `unified_data`: a census locality joined with its election group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedRecord {
    pub province_id: Option<i64>,
    pub district_id: Option<i64>,
    pub province_name: String,
    pub district_name: String,
    pub locality_name: String,
    pub census: LocalityKey,
    pub demographics: DemographicTotals,
    pub election: ElectionSummary,
    pub match_confidence: MatchConfidence,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconSummary {
    pub localities_processed: usize,
    pub localities_matched: usize,
    pub election_localities: usize,
}

impl ReconSummary {
    /// Matched share in percent; 0 when nothing was processed.
    pub fn match_rate(&self) -> f64 {
        if self.localities_processed == 0 {
            return 0.0;
        }
        self.localities_matched as f64 / self.localities_processed as f64 * 100.0
    }
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub records: Vec<UnifiedRecord>,
    pub summary: ReconSummary,
}

/// Machine-readable run report written alongside the unified store.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub engine_version: String,
    pub run_at: String,
    pub summary: ReconSummary,
    pub match_rate: f64,
    pub unmatched: Vec<LocalityKey>,
}

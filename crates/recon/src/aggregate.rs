use std::collections::{BTreeMap, HashMap};

use crate::model::{CensusRecord, DemographicTotals, ElectionKey, ElectionRecord, LocalityKey};

// ---------------------------------------------------------------------------
// Census statistics
// ---------------------------------------------------------------------------

/// Stat label for a (sex, caste) pair: `"{sex}|{caste}"`.
pub fn stat_label(sex: &str, caste: &str) -> String {
    format!("{sex}|{caste}")
}

pub const TOTAL_POPULATION: &str = "Both sexes|All caste";
pub const MALE_POPULATION: &str = "Male|All caste";
pub const FEMALE_POPULATION: &str = "Female|All caste";
pub const HILL_CASTES: &str = "Both sexes|Hill Castes";
pub const MOUNTAIN_HILL_JANAJATIS: &str = "Both sexes|Mountain/Hill Janajatis";
pub const TARAI_JANAJATIS: &str = "Both sexes|Tarai Janajatis";
pub const HILL_DALITS: &str = "Both sexes|Hill Dalits";
pub const OTHERS: &str = "Both sexes|Others, Foreigners & Not stated";

/// Summed census values per locality, keyed by stat label.
pub type LocalityStats = HashMap<String, f64>;

/// Census records grouped by locality, iterated in (province, district,
/// locality) order.
#[derive(Debug, Clone, Default)]
pub struct CensusAggregates {
    localities: BTreeMap<LocalityKey, LocalityStats>,
}

impl CensusAggregates {
    pub fn from_records(records: &[CensusRecord]) -> Self {
        let mut localities: BTreeMap<LocalityKey, LocalityStats> = BTreeMap::new();
        for r in records {
            let stats = localities.entry(r.locality_key()).or_default();
            *stats
                .entry(stat_label(&r.sex, &r.caste_ethnicity))
                .or_insert(0.0) += r.value;
        }
        Self { localities }
    }

    pub fn len(&self) -> usize {
        self.localities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.localities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LocalityKey, &LocalityStats)> {
        self.localities.iter()
    }
}

impl DemographicTotals {
    /// Pick the eight fixed labels out of a locality's stats; absent labels are 0.
    pub fn from_stats(stats: &LocalityStats) -> Self {
        let get = |label: &str| stats.get(label).copied().unwrap_or(0.0);
        Self {
            total_population: get(TOTAL_POPULATION),
            male_population: get(MALE_POPULATION),
            female_population: get(FEMALE_POPULATION),
            hill_castes: get(HILL_CASTES),
            mountain_hill_janajatis: get(MOUNTAIN_HILL_JANAJATIS),
            tarai_janajatis: get(TARAI_JANAJATIS),
            hill_dalits: get(HILL_DALITS),
            others: get(OTHERS),
        }
    }
}

// ---------------------------------------------------------------------------
// Election groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ElectionGroup<'a> {
    pub key: ElectionKey,
    pub records: Vec<&'a ElectionRecord>,
}

/// Election records grouped by (state, district, municipality), in the order
/// each group was first seen.
#[derive(Debug, Clone, Default)]
pub struct ElectionGroups<'a> {
    groups: Vec<ElectionGroup<'a>>,
    index: HashMap<ElectionKey, usize>,
}

impl<'a> ElectionGroups<'a> {
    pub fn from_records(records: &'a [ElectionRecord]) -> Self {
        let mut out = Self::default();
        for r in records {
            let key = r.election_key();
            match out.index.get(&key) {
                Some(&i) => out.groups[i].records.push(r),
                None => {
                    out.index.insert(key.clone(), out.groups.len());
                    out.groups.push(ElectionGroup { key, records: vec![r] });
                }
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, key: &ElectionKey) -> Option<&ElectionGroup<'a>> {
        self.index.get(key).map(|&i| &self.groups[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ElectionGroup<'a>> {
        self.groups.iter()
    }
}

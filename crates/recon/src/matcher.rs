use std::collections::HashMap;

use crate::config::DEFAULT_THRESHOLD;
use crate::model::{ElectionKey, LocalityKey, LocationMapping};

// ---------------------------------------------------------------------------
// Province table
// ---------------------------------------------------------------------------

/// Census province codes with their Devanagari names, in official order
/// (position + 1 is the province number).
const NEPAL_PROVINCES: [(&str, &str); 7] = [
    ("KOSHI", "कोशी प्रदेश"),
    ("MADHESH", "मधेश प्रदेश"),
    ("BAGMATI", "बागमती प्रदेश"),
    ("GANDAKI", "गण्डकी प्रदेश"),
    ("LUMBINI", "लुम्बिनी प्रदेश"),
    ("KARNALI", "कर्णाली प्रदेश"),
    ("SUDURPASCHIM", "सुदूरपश्चिम प्रदेश"),
];

/// Bilingual province lookup, built once and handed to the matcher.
#[derive(Debug, Clone)]
pub struct ProvinceTable {
    to_nepali: HashMap<String, String>,
    to_code: HashMap<String, String>,
    numbers: HashMap<String, i64>,
}

impl ProvinceTable {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut to_nepali = HashMap::new();
        let mut to_code = HashMap::new();
        let mut numbers = HashMap::new();
        for (i, (code, nepali)) in entries.into_iter().enumerate() {
            to_nepali.insert(code.to_string(), nepali.to_string());
            to_code.insert(nepali.to_string(), code.to_string());
            numbers.insert(code.to_string(), i as i64 + 1);
        }
        Self { to_nepali, to_code, numbers }
    }

    pub fn nepal() -> Self {
        Self::new(NEPAL_PROVINCES)
    }

    pub fn nepali_name(&self, code: &str) -> Option<&str> {
        self.to_nepali.get(code).map(String::as_str)
    }

    pub fn code(&self, nepali: &str) -> Option<&str> {
        self.to_code.get(nepali).map(String::as_str)
    }

    /// Province number for a code or a Nepali name.
    pub fn number(&self, code_or_name: &str) -> Option<i64> {
        let code = self.code(code_or_name).unwrap_or(code_or_name);
        self.numbers.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.to_nepali.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_nepali.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Name normalization + fuzzy equality
// ---------------------------------------------------------------------------

/// Administrative-unit words dropped before comparing names. Longer tokens
/// come first so that "rural municipality" goes as a whole.
const ADMIN_TOKENS: [&str; 8] = [
    "rural municipality",
    "sub-metropolitan",
    "metropolitan",
    "municipality",
    "उपमहानगरपालिका",
    "महानगरपालिका",
    "गाउँपालिका",
    "नगरपालिका",
];

/// Lowercase, strip administrative tokens, collapse whitespace, trim.
pub fn normalize_name(text: &str) -> String {
    let mut s = text.to_lowercase();
    // Removal can splice a new token together, so repeat until stable
    loop {
        let before = s.len();
        for token in ADMIN_TOKENS {
            if s.contains(token) {
                s = s.replace(token, "");
            }
        }
        if s.len() == before {
            break;
        }
    }
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Edit distance with unit costs, over Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1) // deletion
                .min(curr[j] + 1) // insertion
                .min(prev[j] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// `1 - distance / max_len` of the normalized forms; 1.0 when both are empty.
pub fn similarity(a: &str, b: &str) -> f64 {
    let (a, b) = (normalize_name(a), normalize_name(b));
    similarity_normalized(&a, &b)
}

fn similarity_normalized(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Approximate name equality: exact or contained normalized forms, else
/// normalized edit-distance similarity at or above `threshold`.
pub fn fuzzy_match(a: Option<&str>, b: Option<&str>, threshold: f64) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return false;
    };
    let a = normalize_name(a);
    let b = normalize_name(b);

    if a == b || a.contains(&b) || b.contains(&a) {
        return true;
    }
    similarity_normalized(&a, &b) >= threshold
}

// ---------------------------------------------------------------------------
// Location matcher
// ---------------------------------------------------------------------------

fn named(value: &str) -> Option<&str> {
    (!normalize_name(value).is_empty()).then_some(value)
}

/// Hierarchical census ↔ election locality lookup through the reference table.
#[derive(Debug, Clone)]
pub struct LocationMatcher {
    provinces: ProvinceTable,
    mappings: Vec<LocationMapping>,
    threshold: f64,
}

impl LocationMatcher {
    pub fn new(provinces: ProvinceTable, mappings: Vec<LocationMapping>) -> Self {
        Self {
            provinces,
            mappings,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// A key value that is blank or only administrative tokens names nothing
    /// and matches nothing.
    fn fuzzy(&self, a: Option<&str>, b: &str) -> bool {
        fuzzy_match(a, named(b), self.threshold)
    }

    /// Census province code vs election state name.
    pub fn match_provinces(&self, census_province: &str, election_province: &str) -> bool {
        if named(census_province).is_none() || named(election_province).is_none() {
            return false;
        }
        if self.provinces.nepali_name(census_province) == Some(election_province) {
            return true;
        }
        if self.provinces.code(election_province) == Some(census_province) {
            return true;
        }
        fuzzy_match(Some(census_province), Some(election_province), self.threshold)
    }

    /// First reference row (table order) tying the census locality to the
    /// election locality, or `None`.
    pub fn find_location_mapping(
        &self,
        census: &LocalityKey,
        election: &ElectionKey,
    ) -> Option<&LocationMapping> {
        if !self.match_provinces(&census.province, &election.state) {
            return None;
        }

        self.mappings
            .iter()
            .filter(|m| {
                self.fuzzy(m.district_en.as_deref(), &census.district)
                    || self.fuzzy(m.district_np.as_deref(), &election.district)
            })
            .find(|m| {
                let en = m.palika_en.as_deref();
                let np = m.palika_np.as_deref();
                self.fuzzy(en, &census.locality)
                    || self.fuzzy(np, &election.vdcmun)
                    || self.fuzzy(en, &election.vdcmun)
                    || self.fuzzy(np, &census.locality)
            })
    }

    /// Reference rows whose `province_id` is the number of the given province
    /// (code or Nepali name). Unknown provinces yield nothing.
    pub fn mappings_for_province(&self, province: &str) -> Vec<&LocationMapping> {
        let Some(number) = self.provinces.number(province) else {
            return Vec::new();
        };
        self.mappings
            .iter()
            .filter(|m| m.province_id == Some(number))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(district_en: &str, district_np: &str, palika_en: &str, palika_np: &str) -> LocationMapping {
        LocationMapping {
            district_id: Some(4),
            province_id: Some(1),
            district_en: Some(district_en.into()),
            district_np: Some(district_np.into()),
            palika_en: Some(palika_en.into()),
            palika_np: Some(palika_np.into()),
        }
    }

    fn census(p: &str, d: &str, l: &str) -> LocalityKey {
        LocalityKey { province: p.into(), district: d.into(), locality: l.into() }
    }

    fn election(s: &str, d: &str, v: &str) -> ElectionKey {
        ElectionKey { state: s.into(), district: d.into(), vdcmun: v.into() }
    }

    #[test]
    fn normalize_strips_admin_tokens() {
        assert_eq!(normalize_name("Damak Municipality"), "damak");
        assert_eq!(normalize_name("  Kathmandu   Metropolitan City "), "kathmandu city");
        assert_eq!(normalize_name("Biratnagar Sub-Metropolitan City"), "biratnagar city");
        assert_eq!(normalize_name("Kachankawal Rural Municipality"), "kachankawal");
        assert_eq!(normalize_name("दमक नगरपालिका"), "दमक");
        assert_eq!(normalize_name("काठमाडौं महानगरपालिका"), "काठमाडौं");
        assert_eq!(normalize_name("विराटनगर उपमहानगरपालिका"), "विराटनगर");
        assert_eq!(normalize_name("कचनकवल गाउँपालिका"), "कचनकवल");
    }

    #[test]
    fn normalize_is_stable_on_spliced_tokens() {
        let once = normalize_name("municmunicipalityipality Damak");
        assert_eq!(once, "damak");
        assert_eq!(normalize_name(&once), once);
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("दमक", "दमक"), 0);
        assert_eq!(levenshtein("दमक", "दामक"), 1);
    }

    #[test]
    fn fuzzy_match_curated_pairs() {
        let cases: &[(&str, &str, bool)] = &[
            ("Kathmandu Metropolitan City", "काठमाडौं महानगरपालिका", false),
            ("Damak Municipality", "Damak", true),
            ("Damak", "damak nagarpalika", true),
            ("Mechinagar", "Mechinager", true),
            ("Birtamod", "Birtamode Municipality", true),
            ("Jhapa", "Morang", false),
            ("Itahari", "Inaruwa", false),
            ("दमक नगरपालिका", "दमक", true),
            ("Lalitpur Metropolitan City", "Lalitpur", true),
        ];
        for (a, b, expected) in cases {
            assert_eq!(
                fuzzy_match(Some(a), Some(b), DEFAULT_THRESHOLD),
                *expected,
                "fuzzy_match({a:?}, {b:?})"
            );
        }
    }

    #[test]
    fn fuzzy_match_absent_side_never_matches() {
        assert!(!fuzzy_match(None, Some("Damak"), DEFAULT_THRESHOLD));
        assert!(!fuzzy_match(Some("Damak"), None, DEFAULT_THRESHOLD));
        assert!(!fuzzy_match(None, None, DEFAULT_THRESHOLD));
    }

    #[test]
    fn fuzzy_match_both_empty_after_normalization() {
        assert!(fuzzy_match(Some("Municipality"), Some("  "), DEFAULT_THRESHOLD));
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        // 1 edit over 10 chars = 0.9
        assert!((similarity("abcdefghij", "abcdefghiX") - 0.9).abs() < 1e-12);
        assert!(fuzzy_match(Some("abcdefghij"), Some("abcdefghiX"), 0.9));
        assert!(!fuzzy_match(Some("abcdefghij"), Some("abcdefghXY"), 0.9));
    }

    #[test]
    fn provinces_match_by_table_or_fuzzy() {
        let m = LocationMatcher::new(ProvinceTable::nepal(), vec![]);
        assert!(m.match_provinces("KOSHI", "कोशी प्रदेश"));
        assert!(m.match_provinces("SUDURPASCHIM", "सुदूरपश्चिम प्रदेश"));
        assert!(!m.match_provinces("KOSHI", "मधेश प्रदेश"));
        assert!(m.match_provinces("Bagmati", "BAGMATI"));
        assert!(m.match_provinces("Gandaki Province", "Gandaki"));
    }

    #[test]
    fn blank_province_matches_nothing() {
        let m = LocationMatcher::new(ProvinceTable::nepal(), vec![]);
        assert!(!m.match_provinces("KOSHI", ""));
        assert!(!m.match_provinces("KOSHI", "   "));
        assert!(!m.match_provinces("", "कोशी प्रदेश"));
    }

    #[test]
    fn province_table_lookups() {
        let table = ProvinceTable::nepal();
        assert_eq!(table.len(), 7);
        assert_eq!(table.nepali_name("LUMBINI"), Some("लुम्बिनी प्रदेश"));
        assert_eq!(table.code("कर्णाली प्रदेश"), Some("KARNALI"));
        assert_eq!(table.number("KOSHI"), Some(1));
        assert_eq!(table.number("सुदूरपश्चिम प्रदेश"), Some(7));
        assert_eq!(table.number("ATLANTIS"), None);
    }

    #[test]
    fn find_mapping_through_english_names() {
        let m = LocationMatcher::new(
            ProvinceTable::nepal(),
            vec![
                mapping("Morang", "मोरङ", "Biratnagar", "विराटनगर"),
                mapping("Jhapa", "झापा", "Mechinagar", "मेचीनगर"),
                mapping("Jhapa", "झापा", "Damak", "दमक"),
            ],
        );
        let found = m
            .find_location_mapping(
                &census("KOSHI", "Jhapa", "Damak Municipality"),
                &election("कोशी प्रदेश", "झापा", "दमक नगरपालिका"),
            )
            .unwrap();
        assert_eq!(found.palika_en.as_deref(), Some("Damak"));
    }

    #[test]
    fn find_mapping_through_nepali_names_only() {
        let m = LocationMatcher::new(
            ProvinceTable::nepal(),
            vec![mapping("Jhapa", "झापा", "Damak", "दमक")],
        );
        // Census uses a different district spelling, election side carries the match
        let found = m.find_location_mapping(
            &census("KOSHI", "Jhapha District", "Damak"),
            &election("कोशी प्रदेश", "झापा", "दमक नगरपालिका"),
        );
        assert!(found.is_some());
    }

    #[test]
    fn find_mapping_requires_matching_province() {
        let m = LocationMatcher::new(
            ProvinceTable::nepal(),
            vec![mapping("Jhapa", "झापा", "Damak", "दमक")],
        );
        let found = m.find_location_mapping(
            &census("KOSHI", "Jhapa", "Damak"),
            &election("मधेश प्रदेश", "झापा", "दमक नगरपालिका"),
        );
        assert!(found.is_none());
    }

    #[test]
    fn find_mapping_returns_first_acceptable_row() {
        let mut first = mapping("Jhapa", "झापा", "Damak", "दमक");
        first.district_id = Some(101);
        let mut second = mapping("Jhapa", "झापा", "Damak", "दमक");
        second.district_id = Some(202);
        let m = LocationMatcher::new(ProvinceTable::nepal(), vec![first, second]);
        let found = m
            .find_location_mapping(
                &census("KOSHI", "Jhapa", "Damak"),
                &election("कोशी प्रदेश", "झापा", "दमक"),
            )
            .unwrap();
        assert_eq!(found.district_id, Some(101));
    }

    #[test]
    fn find_mapping_none_when_locality_unknown() {
        let m = LocationMatcher::new(
            ProvinceTable::nepal(),
            vec![mapping("Jhapa", "झापा", "Damak", "दमक")],
        );
        let found = m.find_location_mapping(
            &census("KOSHI", "Jhapa", "Kankai"),
            &election("कोशी प्रदेश", "झापा", "कन्काई नगरपालिका"),
        );
        assert!(found.is_none());
    }

    #[test]
    fn blank_election_names_are_not_wildcards() {
        let m = LocationMatcher::new(
            ProvinceTable::nepal(),
            vec![mapping("Jhapa", "झापा", "Damak", "दमक")],
        );
        let kankai = census("KOSHI", "Jhapa", "Kankai");
        assert!(m.find_location_mapping(&kankai, &election("कोशी प्रदेश", "झापा", "")).is_none());
        assert!(m
            .find_location_mapping(&kankai, &election("कोशी प्रदेश", "झापा", "नगरपालिका"))
            .is_none());
        assert!(m.find_location_mapping(&kankai, &election("", "झापा", "दमक")).is_none());

        // District blank on the election side: the census district still selects the row
        let damak = census("KOSHI", "Jhapa", "Damak");
        assert!(m.find_location_mapping(&damak, &election("कोशी प्रदेश", "", "")).is_some());
    }

    #[test]
    fn mappings_for_province_filters_by_number() {
        let mut madhesh = mapping("Saptari", "सप्तरी", "Rajbiraj", "राजविराज");
        madhesh.province_id = Some(2);
        let m = LocationMatcher::new(
            ProvinceTable::nepal(),
            vec![mapping("Jhapa", "झापा", "Damak", "दमक"), madhesh],
        );
        assert_eq!(m.mappings_for_province("KOSHI").len(), 1);
        assert_eq!(m.mappings_for_province("मधेश प्रदेश")[0].palika_en.as_deref(), Some("Rajbiraj"));
        assert!(m.mappings_for_province("NOWHERE").is_empty());
    }
}

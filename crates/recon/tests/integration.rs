use palika_recon::cell::CellValue;
use palika_recon::{
    build_report, reconcile, wrangle, ElectionTable, LocationMapping, LocationMatcher,
    MatchConfidence, ProvinceTable, RawRow, ReconConfig,
};

fn t(s: &str) -> CellValue {
    CellValue::Text(s.into())
}

fn n(v: f64) -> CellValue {
    CellValue::Number(v)
}

fn e() -> CellValue {
    CellValue::Empty
}

/// Census sheet in the published layout: column 0 unused, hierarchy written
/// once per block, two preamble rows (start_row = 2 in the config below).
fn census_sheet() -> Vec<RawRow> {
    vec![
        vec![t("Table 1: Population by caste/ethnicity")],
        vec![],
        vec![e(), t("KOSHI"), t("Jhapa"), t("Damak Municipality"), t("Both sexes"), t("All caste"), n(1000.0)],
        vec![e(), e(), e(), e(), e(), t("Hill Castes"), n(400.0)],
        vec![e(), e(), e(), e(), e(), t("Tarai Janajatis"), n(350.0)],
        vec![e(), e(), e(), e(), t("Male"), t("All caste"), n(480.0)],
        vec![e(), e(), e(), e(), t("Female"), t("All caste"), n(520.0)],
        vec![],
        vec![e(), e(), e(), t("Kankai Municipality"), t("Both sexes"), t("All caste"), n(300.0)],
        vec![e(), e(), e(), t("INSTITUTIONAL"), t("Both sexes"), t("All caste"), n(12.0)],
        vec![e(), t("BAGMATI"), t("Kathmandu"), t("Kathmandu Metropolitan City"), t("Both sexes"), t("All caste"), n(5000.0)],
    ]
}

/// Election sheet with spaced, aliased headers after a blank row.
fn election_sheet() -> Vec<RawRow> {
    vec![
        vec![],
        vec![
            t("Candidate Name"),
            t("Party Name"),
            t("Total Vote Received"),
            t("VDC Mun Name"),
            t("District Name"),
            t("Province Name"),
            t("Age"),
        ],
        vec![t("राम"), t("पार्टी क"), n(3000.0), t("दमक नगरपालिका"), t("झापा"), t("कोशी प्रदेश"), n(52.0)],
        vec![t("सीता"), t("पार्टी ख"), n(5000.0), t("दमक नगरपालिका"), t("झापा"), t("कोशी प्रदेश"), n(47.0)],
        vec![t("हरि"), t("पार्टी क"), e(), t("दमक नगरपालिका"), t("झापा"), t("कोशी प्रदेश"), e()],
        vec![t("गीता"), t("पार्टी ग"), n(7000.0), t("मेचीनगर नगरपालिका"), t("झापा"), t("कोशी प्रदेश"), n(60.0)],
    ]
}

fn reference() -> Vec<LocationMapping> {
    serde_json::from_str(
        r#"[
            {"district_id": 4, "province_id": 1, "district_en": "Jhapa", "district_np": "झापा",
             "palika_en": "Damak", "palika_np": "दमक", "palika_type": "Municipality"},
            {"district_id": 27, "province_id": 3, "district_en": "Kathmandu", "district_np": "काठमाडौं",
             "palika_en": "Lalitpur", "palika_np": "ललितपुर"}
        ]"#,
    )
    .unwrap()
}

fn config() -> ReconConfig {
    ReconConfig::from_toml("[census]\nstart_row = 2\n").unwrap()
}

#[test]
fn census_and_election_sheets_reconcile_end_to_end() {
    let config = config();
    let census = wrangle(&census_sheet(), &config.census);
    // Institutional row dropped, everything else resolved
    assert_eq!(census.len(), 7);
    assert!(census.iter().all(|r| r.locality != "INSTITUTIONAL"));

    let table = ElectionTable::from_rows(&election_sheet(), "election.xlsx").unwrap();
    assert_eq!(table.rows.len(), 4);
    let election = table.records();
    assert_eq!(election.len(), 3);

    let matcher = LocationMatcher::new(ProvinceTable::nepal(), reference())
        .with_threshold(config.matching.threshold);
    let result = reconcile(&census, &election, &matcher, &config.matching);

    let names: Vec<_> = result.records.iter().map(|r| r.locality_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Kathmandu Metropolitan City", "Damak Municipality", "Kankai Municipality"]
    );

    // No Bagmati election data at all
    let kathmandu = &result.records[0];
    assert_eq!(kathmandu.match_confidence, MatchConfidence::NoMatch);
    assert_eq!(kathmandu.district_id, None);
    assert_eq!(kathmandu.election.total_candidates, 0);
    assert_eq!(kathmandu.demographics.total_population, 5000.0);

    let damak = &result.records[1];
    assert_eq!(damak.match_confidence, MatchConfidence::Mapped);
    assert_eq!(damak.district_id, Some(4));
    assert_eq!(damak.province_id, Some(1));
    assert_eq!(damak.demographics.total_population, 1000.0);
    assert_eq!(damak.demographics.hill_castes, 400.0);
    assert_eq!(damak.demographics.tarai_janajatis, 350.0);
    assert_eq!(damak.demographics.male_population, 480.0);
    assert_eq!(damak.demographics.female_population, 520.0);
    assert_eq!(damak.election.total_candidates, 2);
    assert_eq!(damak.election.total_votes, 8000);
    assert_eq!(damak.election.winner.as_ref().unwrap().candidate_name, "सीता");

    // Kankai has no reference row, but the first Jhapa group satisfies the
    // election-side comparisons, so it binds there
    let kankai = &result.records[2];
    assert_eq!(kankai.match_confidence, MatchConfidence::Mapped);
    assert_eq!(kankai.district_id, Some(4));
    assert_eq!(kankai.election, damak.election);

    assert_eq!(result.summary.localities_processed, 3);
    assert_eq!(result.summary.localities_matched, 2);
    assert_eq!(result.summary.election_localities, 2);

    let report = build_report(&result);
    assert_eq!(report.match_rate, 66.67);
    assert_eq!(report.unmatched.len(), 1);
    assert_eq!(report.unmatched[0].locality, "Kathmandu Metropolitan City");
}

#[test]
fn report_serializes_to_json() {
    let config = config();
    let census = wrangle(&census_sheet(), &config.census);
    let matcher = LocationMatcher::new(ProvinceTable::nepal(), reference());
    let result = reconcile(&census, &[], &matcher, &config.matching);
    let json = serde_json::to_value(build_report(&result)).unwrap();

    assert_eq!(json["summary"]["localities_processed"], 3);
    assert_eq!(json["summary"]["localities_matched"], 0);
    assert_eq!(json["match_rate"], 0.0);
    assert_eq!(json["unmatched"].as_array().unwrap().len(), 3);
    assert_eq!(json["unmatched"][0]["province"], "BAGMATI");
}

#[test]
fn election_sheet_without_header_is_rejected() {
    let rows: Vec<RawRow> = vec![vec![], vec![e(), e()]];
    let err = ElectionTable::from_rows(&rows, "election.xlsx").unwrap_err();
    assert_eq!(err.to_string(), "no header row found in election.xlsx");
}

#[test]
fn tighter_threshold_drops_typo_matches() {
    let census = vec![palika_recon::CensusRecord {
        province: "KOSHI".into(),
        district: "Jhapa".into(),
        locality: "Mechinager".into(),
        sex: "Both sexes".into(),
        caste_ethnicity: "All caste".into(),
        value: 10.0,
    }];
    let election = vec![palika_recon::ElectionRecord {
        candidate_name: "क".into(),
        gender: String::new(),
        age: None,
        party_name: "ख".into(),
        total_votes: 1,
        post_name: String::new(),
        ward: None,
        vdcmun_name: "x".into(),
        district_name: "झापा".into(),
        state_name: "कोशी प्रदेश".into(),
    }];
    let mapping = vec![LocationMapping {
        district_en: Some("Jhapa".into()),
        palika_en: Some("Mechinagar".into()),
        ..Default::default()
    }];
    let config = ReconConfig::default();

    let loose = LocationMatcher::new(ProvinceTable::nepal(), mapping.clone());
    let result = reconcile(&census, &election, &loose, &config.matching);
    assert_eq!(result.records[0].match_confidence, MatchConfidence::Mapped);

    let strict = LocationMatcher::new(ProvinceTable::nepal(), mapping).with_threshold(0.95);
    let result = reconcile(&census, &election, &strict, &config.matching);
    assert_eq!(result.records[0].match_confidence, MatchConfidence::NoMatch);
}

#[test]
fn blank_municipality_cell_does_not_bind() {
    let config = config();
    let census = wrangle(&census_sheet(), &config.census);
    let rows: Vec<RawRow> = vec![
        vec![t("Candidate Name"), t("Total Vote Received"), t("VDC Mun Name"), t("District Name"), t("Province Name")],
        vec![t("X"), n(5.0), e(), t("झापा"), t("कोशी प्रदेश")],
    ];
    let election = ElectionTable::from_rows(&rows, "election.xlsx").unwrap().records();
    assert_eq!(election.len(), 1);
    assert_eq!(election[0].vdcmun_name, "");

    let only_damak: Vec<LocationMapping> = reference().into_iter().take(1).collect();
    let matcher = LocationMatcher::new(ProvinceTable::nepal(), only_damak);
    let result = reconcile(&census, &election, &matcher, &config.matching);

    let kankai = result
        .records
        .iter()
        .find(|r| r.locality_name == "Kankai Municipality")
        .unwrap();
    assert_eq!(kankai.match_confidence, MatchConfidence::NoMatch);
    assert_eq!(kankai.district_id, None);
    assert!(kankai.election.winner.is_none());
}

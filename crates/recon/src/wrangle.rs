//! Census wrangling: recover the province/district/locality/sex hierarchy from
//! a sheet where each level is only written on the first row of its block.

use crate::cell::{cell_at, RawRow};
use crate::config::CensusLayout;
use crate::model::CensusRecord;

/// Locality label for the non-geographic institutional population block.
pub const INSTITUTIONAL: &str = "INSTITUTIONAL";

/// The six census fields of one sheet row, before forward-fill.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCensusRow {
    pub province: Option<String>,
    pub district: Option<String>,
    pub locality: Option<String>,
    pub sex: Option<String>,
    pub caste: Option<String>,
    pub value: Option<f64>,
}

impl RawCensusRow {
    pub fn from_cells(row: &RawRow, layout: &CensusLayout) -> Self {
        Self {
            province: cell_at(row, layout.province).as_text(),
            district: cell_at(row, layout.district).as_text(),
            locality: cell_at(row, layout.locality).as_text(),
            sex: cell_at(row, layout.sex).as_text(),
            caste: cell_at(row, layout.caste).as_text(),
            value: cell_at(row, layout.value).as_number(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.province.is_none()
            && self.district.is_none()
            && self.locality.is_none()
            && self.sex.is_none()
            && self.caste.is_none()
            && self.value.is_none()
    }
}

/// Read the census fields of every row from `layout.start_row` on.
/// Blank separator rows are skipped here and never reach the fill.
pub fn extract_raw(rows: &[RawRow], layout: &CensusLayout) -> Vec<RawCensusRow> {
    rows.iter()
        .skip(layout.start_row)
        .map(|row| RawCensusRow::from_cells(row, layout))
        .filter(|raw| !raw.is_blank())
        .collect()
}

/// A row whose geography (province, district, locality) is fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledRow {
    pub province: String,
    pub district: String,
    pub locality: String,
    pub sex: Option<String>,
    pub caste: Option<String>,
    pub value: Option<f64>,
}

/// Carry state for the single left-to-right fill.
///
/// Each level remembers the ancestor value it last saw; when that ancestor
/// changes, the level's carried value is cleared before the row is applied.
#[derive(Debug, Default)]
pub struct ForwardFill {
    province: Option<String>,

    district: Option<String>,
    district_parent: Option<String>,

    locality: Option<String>,
    locality_parent: (Option<String>, Option<String>),

    sex: Option<String>,
    sex_parent: Option<(String, String, String)>,
}

impl ForwardFill {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill one row. Returns `None` when province, district or locality is
    /// still unresolved; such rows leave the sex level untouched.
    pub fn apply(&mut self, raw: RawCensusRow) -> Option<FilledRow> {
        if raw.province.is_some() {
            self.province = raw.province;
        }
        let province = self.province.clone();

        if province != self.district_parent {
            self.district = None;
            self.district_parent = province.clone();
        }
        if raw.district.is_some() {
            self.district = raw.district;
        }
        let district = self.district.clone();

        let locality_parent = (province.clone(), district.clone());
        if locality_parent != self.locality_parent {
            self.locality = None;
            self.locality_parent = locality_parent;
        }
        if raw.locality.is_some() {
            self.locality = raw.locality;
        }
        let locality = self.locality.clone();

        let (province, district, locality) = (province?, district?, locality?);

        let sex_parent = (province.clone(), district.clone(), locality.clone());
        if self.sex_parent.as_ref() != Some(&sex_parent) {
            self.sex = None;
            self.sex_parent = Some(sex_parent);
        }
        if raw.sex.is_some() {
            self.sex = raw.sex;
        }

        Some(FilledRow {
            province,
            district,
            locality,
            sex: self.sex.clone(),
            caste: raw.caste,
            value: raw.value,
        })
    }
}

impl FilledRow {
    /// Complete record, or `None` when sex, caste or value is missing or the
    /// locality is the institutional block.
    pub fn finalize(self) -> Option<CensusRecord> {
        if is_institutional(&self.locality) {
            return None;
        }
        Some(CensusRecord {
            province: self.province,
            district: self.district,
            locality: self.locality,
            sex: self.sex?,
            caste_ethnicity: self.caste?,
            value: self.value?,
        })
    }
}

pub fn is_institutional(locality: &str) -> bool {
    locality.trim().eq_ignore_ascii_case(INSTITUTIONAL)
}

/// Forward-fill already extracted rows into census records, in input order.
pub fn fill(raws: impl IntoIterator<Item = RawCensusRow>) -> Vec<CensusRecord> {
    let mut state = ForwardFill::new();
    raws.into_iter()
        .filter_map(|raw| state.apply(raw))
        .filter_map(FilledRow::finalize)
        .collect()
}

/// Full census wrangle over the rows of the first sheet.
pub fn wrangle(rows: &[RawRow], layout: &CensusLayout) -> Vec<CensusRecord> {
    let records = fill(extract_raw(rows, layout));
    tracing::debug!(rows = rows.len(), records = records.len(), "census wrangled");
    records
}

//! 🗂️ The static dataset catalog — one entry per upstream endpoint.
//!
//! Group 1 is the farmland chemistry statistics (`SoilExamStat`), group 2
//! the soil characteristic statistics (`SoilCharacStat`), and group 3 the
//! per-crop suitability statistics (`SoilFitStat`). Groups 1–2 are fixed;
//! group 3 is minted per configured crop code. The catalog does not change
//! at runtime. The catalog does not change for anyone. 🦆

use crate::app_config::DatasetSelection;

/// 📋 How the sink derives the header row for a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPolicy {
    /// 🗳️ Sorted union of every field name observed across the collected
    /// records. Used for the statistics groups, whose upstream schema has
    /// drifted before and will absolutely drift again.
    DynamicUnion,
    /// 📏 A fixed, known column list; records missing a field emit an
    /// empty string, fields outside the list are dropped. Used for the
    /// crop suitability dataset, whose schema is stable and whose
    /// consumers read columns by position like it's 1987.
    Fixed(&'static [&'static str]),
}

/// 📐 Column list imposed on crop-suitability snapshots.
pub const CROP_FIT_HEADER: &[&str] = &[
    "stdg_Cd",
    "bjd_Nm",
    "soil_Crop_Cd",
    "soil_Crop_Nm",
    "high_Suit_Area",
    "suit_Area",
    "poss_Area",
    "low_Suit_Area",
    "etc_Area",
];

const CROP_FIT_PATH: &str = "SoilFitStat/V2/getSoilCropFitInfo";

/// 🗃️ A static descriptor of one upstream endpoint and its output naming.
#[derive(Debug, Clone)]
pub struct DatasetDefinition {
    pub group: u8,
    pub seq: u8,
    /// Human-readable name for logs and the summary table.
    pub name: String,
    /// Endpoint path relative to the configured base URL.
    pub path: &'static str,
    /// Output file stem; the sink writes `{stem}.csv`.
    pub stem: String,
    /// 🌾 Extra `soil_Crop_CD` query parameter, crop-suitability only.
    pub crop_code: Option<String>,
    pub header: HeaderPolicy,
    /// 🔀 Whether records are sorted by region code in a post-pass before
    /// writing. Collection order is interleaved across workers and never
    /// relied on.
    pub sort_by_region: bool,
}

// -- 🗂️ (group, seq, name, endpoint path) for the fixed statistics
// datasets. seventeen endpoints, one government, zero pagination.
const STAT_DATASETS: &[(u8, u8, &str, &str)] = &[
    (1, 1, "chemistry: organic matter", "SoilExamStat/V2/getFarmExamOmInfo"),
    (1, 2, "chemistry: available phosphate", "SoilExamStat/V2/getFarmExamApInfo"),
    (1, 3, "chemistry: potassium", "SoilExamStat/V2/getFarmExamKalInfo"),
    (1, 4, "chemistry: pH", "SoilExamStat/V2/getFarmExamPhInfo"),
    (1, 5, "chemistry: magnesium", "SoilExamStat/V2/getFarmExamMgInfo"),
    (1, 6, "chemistry: available silicate", "SoilExamStat/V2/getFarmExamSaInfo"),
    (1, 7, "chemistry: calcium", "SoilExamStat/V2/getFarmExamCalInfo"),
    (2, 1, "characteristics: drainage grade", "SoilCharacStat/V2/getSoilDrngGradSpecificInfo"),
    (2, 2, "characteristics: erosion grade", "SoilCharacStat/V2/getSoilWashGradSpecificInfo"),
    (2, 3, "characteristics: topsoil gravel", "SoilCharacStat/V2/getSoilTopslGrvSpecificInfo"),
    (2, 4, "characteristics: topography", "SoilCharacStat/V2/getSoilDistrbTopogrpySpecificInfo"),
    (2, 5, "characteristics: accumulation form", "SoilCharacStat/V2/getSoilAmnFormSpecificInfo"),
    (2, 6, "characteristics: soil order", "SoilCharacStat/V2/getSoilTreeSpecificInfo"),
    (2, 7, "characteristics: soil suborder", "SoilCharacStat/V2/getSoilSbrSpecificInfo"),
    (2, 8, "characteristics: main land use", "SoilCharacStat/V2/getSoilMainLandSpecificInfo"),
    (2, 9, "characteristics: paddy suitability grade", "SoilCharacStat/V2/getSoilPaddyGradSpecificInfo"),
    (2, 10, "characteristics: upland suitability grade", "SoilCharacStat/V2/getSoilFieldGradSpecificInfo"),
];

fn stat_dataset(group: u8, seq: u8, name: &str, path: &'static str) -> DatasetDefinition {
    DatasetDefinition {
        group,
        seq,
        name: name.to_string(),
        path,
        stem: format!("{group}-{seq}"),
        crop_code: None,
        header: HeaderPolicy::DynamicUnion,
        sort_by_region: false,
    }
}

fn crop_fit_dataset(seq: u8, crop_code: &str) -> DatasetDefinition {
    DatasetDefinition {
        group: 3,
        seq,
        name: format!("crop suitability: {crop_code}"),
        path: CROP_FIT_PATH,
        stem: format!("fit-{crop_code}"),
        crop_code: Some(crop_code.to_string()),
        header: HeaderPolicy::Fixed(CROP_FIT_HEADER),
        sort_by_region: true,
    }
}

/// 🎯 Resolves a selection against the catalog, in (group, seq) order.
pub fn select(selection: &DatasetSelection) -> Vec<DatasetDefinition> {
    let mut defs: Vec<DatasetDefinition> = STAT_DATASETS
        .iter()
        .filter(|(group, ..)| selection.groups.contains(group))
        .map(|&(group, seq, name, path)| stat_dataset(group, seq, name, path))
        .collect();
    defs.extend(
        selection
            .crop_codes
            .iter()
            .enumerate()
            .map(|(i, crop)| crop_fit_dataset(i as u8 + 1, crop)),
    );
    defs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(groups: Vec<u8>, crop_codes: Vec<String>) -> DatasetSelection {
        DatasetSelection { groups, crop_codes }
    }

    #[test]
    fn the_one_where_everyone_is_invited() {
        let defs = select(&selection(vec![1, 2], vec!["CR005".into()]));
        assert_eq!(defs.len(), 18);
        assert_eq!(defs.iter().filter(|d| d.group == 1).count(), 7);
        assert_eq!(defs.iter().filter(|d| d.group == 2).count(), 10);
    }

    #[test]
    fn the_one_where_the_group_filter_works_the_door() {
        let defs = select(&selection(vec![2], vec![]));
        assert_eq!(defs.len(), 10);
        assert!(defs.iter().all(|d| d.group == 2));
        assert_eq!(defs[0].stem, "2-1");
        assert_eq!(defs[9].stem, "2-10");
    }

    #[test]
    fn the_one_where_crop_datasets_bring_their_own_contract() {
        let defs = select(&selection(vec![], vec!["CR005".into()]));
        assert_eq!(defs.len(), 1);
        let def = &defs[0];
        assert_eq!(def.crop_code.as_deref(), Some("CR005"));
        assert_eq!(def.stem, "fit-CR005");
        assert_eq!(def.header, HeaderPolicy::Fixed(CROP_FIT_HEADER));
        assert!(def.sort_by_region);
    }

    #[test]
    fn the_one_where_stat_datasets_let_the_header_be_itself() {
        let defs = select(&selection(vec![1], vec![]));
        assert!(
            defs.iter()
                .all(|d| d.header == HeaderPolicy::DynamicUnion && !d.sort_by_region)
        );
    }
}

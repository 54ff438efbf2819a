//! 🗄️ Sink — persists one dataset's accumulated records as a CSV snapshot.
//!
//! Snapshots are full rewrites, UTF-8 with a BOM up front so spreadsheet
//! tools that mis-detect plain UTF-8 behave themselves. An empty record
//! set writes nothing at all — consumers distinguish "no snapshot" from
//! "empty snapshot" by the file simply not being there. Absence is a
//! message. A very quiet one. 🦆

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::catalog::{DatasetDefinition, HeaderPolicy};
use crate::common::Record;
use crate::error::SinkError;

// -- 🏷️ the three magic bytes that make Excel believe in UTF-8
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// 💾 Writes `{dir}/{stem}.csv` for `def` and returns the path — or
/// `Ok(None)` without touching the filesystem when `records` is empty.
/// The sink does not do empty gestures.
pub async fn write(
    def: &DatasetDefinition,
    records: &[Record],
    dir: &Path,
) -> Result<Option<PathBuf>, SinkError> {
    if records.is_empty() {
        info!("🫙 [{}] no records collected — skipping the snapshot entirely", def.name);
        return Ok(None);
    }

    let path = dir.join(format!("{}.csv", def.stem));
    let header = header_for(def, records);
    let body = compose(&header, records).map_err(|source| SinkError::Csv {
        path: path.clone(),
        source,
    })?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| SinkError::Io {
            path: path.clone(),
            source,
        })?;
    tokio::fs::write(&path, &body)
        .await
        .map_err(|source| SinkError::Io {
            path: path.clone(),
            source,
        })?;

    info!(
        "💾 [{}] snapshot written: {} records → {}",
        def.name,
        records.len(),
        path.display()
    );
    Ok(Some(path))
}

/// 📋 Either the imposed column list or the sorted union of every field
/// name observed across the records, per the dataset's header policy.
fn header_for(def: &DatasetDefinition, records: &[Record]) -> Vec<String> {
    match def.header {
        HeaderPolicy::Fixed(columns) => columns.iter().map(|c| c.to_string()).collect(),
        HeaderPolicy::DynamicUnion => {
            let union: BTreeSet<&str> = records.iter().flat_map(Record::field_names).collect();
            union.into_iter().map(str::to_string).collect()
        }
    }
}

fn compose(header: &[String], records: &[Record]) -> Result<Vec<u8>, csv::Error> {
    let mut buf = Vec::with_capacity(UTF8_BOM.len() + records.len() * 64);
    buf.extend_from_slice(UTF8_BOM);
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(header)?;
        for record in records {
            // -- 🫥 a record missing a column emits "", extras never asked
            writer.write_record(header.iter().map(|name| record.get(name).unwrap_or("")))?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CROP_FIT_HEADER;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn stat_def() -> DatasetDefinition {
        DatasetDefinition {
            group: 1,
            seq: 1,
            name: "chemistry: organic matter".into(),
            path: "SoilExamStat/V2/getFarmExamOmInfo",
            stem: "1-1".into(),
            crop_code: None,
            header: HeaderPolicy::DynamicUnion,
            sort_by_region: false,
        }
    }

    fn fit_def() -> DatasetDefinition {
        DatasetDefinition {
            group: 3,
            seq: 1,
            name: "crop suitability: CR005".into(),
            path: "SoilFitStat/V2/getSoilCropFitInfo",
            stem: "fit-CR005".into(),
            crop_code: Some("CR005".into()),
            header: HeaderPolicy::Fixed(CROP_FIT_HEADER),
            sort_by_region: true,
        }
    }

    fn parse_rows(bytes: &[u8]) -> (Vec<String>, Vec<Vec<String>>) {
        assert_eq!(&bytes[..3], UTF8_BOM, "💀 Snapshot must start with the BOM. Excel is watching.");
        let mut reader = csv::Reader::from_reader(&bytes[3..]);
        let header = reader
            .headers()
            .expect("💀 A header row should exist.")
            .iter()
            .map(str::to_string)
            .collect();
        let rows = reader
            .records()
            .map(|r| r.expect("💀 A row should parse.").iter().map(str::to_string).collect())
            .collect();
        (header, rows)
    }

    #[tokio::test]
    async fn the_one_where_nothing_in_means_nothing_out() {
        let dir = tempfile::tempdir().expect("💀 Failed to create a temp dir.");
        let written = write(&stat_def(), &[], dir.path())
            .await
            .expect("💀 The empty no-op should still be an Ok.");
        assert!(written.is_none());
        assert!(!dir.path().join("1-1.csv").exists());
    }

    #[tokio::test]
    async fn the_one_where_the_header_is_a_democratic_union() {
        let dir = tempfile::tempdir().expect("💀 Failed to create a temp dir.");
        let records = vec![
            record(&[("stdg_Cd", "0000000100"), ("om", "3.1")]),
            record(&[("stdg_Cd", "0000000200"), ("acid", "5.9")]),
        ];
        let path = write(&stat_def(), &records, dir.path())
            .await
            .expect("💀 The write should succeed.")
            .expect("💀 A file should have been written.");

        let bytes = std::fs::read(path).expect("💀 The snapshot should be readable.");
        let (header, rows) = parse_rows(&bytes);
        // 🧪 sorted union of every field anyone brought, gaps filled with ""
        assert_eq!(header, vec!["acid", "om", "stdg_Cd"]);
        assert_eq!(rows[0], vec!["", "3.1", "0000000100"]);
        assert_eq!(rows[1], vec!["5.9", "", "0000000200"]);
    }

    #[tokio::test]
    async fn the_one_where_the_fixed_header_runs_a_strict_door() {
        let dir = tempfile::tempdir().expect("💀 Failed to create a temp dir.");
        let records = vec![record(&[
            ("stdg_Cd", "1100000000"),
            ("bjd_Nm", "Seoul"),
            ("unexpected", "dropped"),
        ])];
        let path = write(&fit_def(), &records, dir.path())
            .await
            .expect("💀 The write should succeed.")
            .expect("💀 A file should have been written.");

        let bytes = std::fs::read(path).expect("💀 The snapshot should be readable.");
        let (header, rows) = parse_rows(&bytes);
        assert_eq!(header, CROP_FIT_HEADER);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "1100000000");
        assert_eq!(rows[0][1], "Seoul");
        // 🧪 every remaining fixed column is blank; the gatecrasher is gone
        assert!(rows[0][2..].iter().all(String::is_empty));
        assert!(!rows[0].contains(&"dropped".to_string()));
    }

    #[tokio::test]
    async fn the_one_where_the_new_snapshot_evicts_the_old() {
        let dir = tempfile::tempdir().expect("💀 Failed to create a temp dir.");
        let first = vec![record(&[("a", "1")]), record(&[("a", "2")])];
        write(&stat_def(), &first, dir.path())
            .await
            .expect("💀 The first write should succeed.");
        let second = vec![record(&[("a", "9")])];
        let path = write(&stat_def(), &second, dir.path())
            .await
            .expect("💀 The rewrite should succeed.")
            .expect("💀 A file should have been written.");

        let bytes = std::fs::read(path).expect("💀 The snapshot should be readable.");
        let (_, rows) = parse_rows(&bytes);
        // 🧪 full-rewrite semantics: the old two rows do not haunt the file
        assert_eq!(rows, vec![vec!["9".to_string()]]);
    }
}

//! 📦 Common data types — the load-bearing structs of harvex.
//!
//! ---
//!
//! 🎬 COLD OPEN — INT. PROVINCIAL OFFICE — 4:12 AM
//!
//! 🌧️ Rain against the window. A fluorescent tube hums at precisely the
//! frequency of mild despair. On a beige PC, a spreadsheet of region codes
//! waits. Ten digits each. Zero-padded. Unbothered.
//!
//! A `RegionCode` does not know it is about to be sent, one HTTP GET at a
//! time, to ask a government server how the soil is feeling today. It only
//! knows its ten digits. Honestly? That level of self-acceptance is rare.
//!
//! ✅ And when an answer comes back, a `Record` carries the flattened fields
//! home like a responsible adult carrying groceries in one trip (ALL of
//! them, no second trips, this is a point of honor). The `DatasetReport`
//! stands at the door counting heads. Nobody gets lost.
//!
//! 🦆
//!
//! ⚠️ NOTE: when the singularity occurs, the region codes will still be
//! zero-padded to ten digits. The AGI will respect the column contract.
//! The AGI can file a PR.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

// -- 📏 the width the upstream expects for the `STDG_CD` query parameter.
// ten digits. not nine. not eleven. ten.
const REGION_CODE_WIDTH: usize = 10;

/// 🔢 An administrative-division identifier — ten digits, zero-padded,
/// non-negotiable.
///
/// The serving layer slices province / county / township levels straight
/// out of this column by character position, so the padding is a contract,
/// not a fashion statement. Ten digits. Always. Even for regions that
/// could have said it in three.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionCode(String);

impl RegionCode {
    /// 🧰 Trims the raw cell value and left-pads it with `'0'` to ten
    /// digits. Already ten or more characters? Passes through untouched —
    /// we pad, we don't amputate.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.len() >= REGION_CODE_WIDTH {
            Self(trimmed.to_string())
        } else {
            let mut padded = String::with_capacity(REGION_CODE_WIDTH);
            for _ in 0..REGION_CODE_WIDTH - trimmed.len() {
                padded.push('0');
            }
            padded.push_str(trimmed);
            Self(padded)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 📦 One flattened `<item>` from a successful upstream response.
///
/// Field sets are not guaranteed identical across records of the same
/// dataset — the upstream omits fields the way cats omit affection:
/// freely, and without explanation. A `BTreeMap` keeps the names sorted,
/// so deriving the union header at write time is a stroll, not a sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn insert(&mut self, name: String, value: String) {
        self.fields.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, String)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// 🧾 Final tally for one dataset collection.
///
/// Invariant: `succeeded + failed == total()` — exactly one outcome per
/// region code fed in, no silent drops, no creative accounting. Empty
/// results count as failures and get their own line item in `empty`,
/// because "the API said nothing" and "the API said no" deserve
/// different columns.
#[derive(Debug, Clone)]
pub struct DatasetReport {
    pub group: u8,
    pub seq: u8,
    pub name: String,
    pub stem: String,
    pub succeeded: usize,
    pub failed: usize,
    pub empty: usize,
    /// 📁 Path of the written snapshot, `None` when nothing was collected
    /// or the write failed.
    pub output: Option<PathBuf>,
}

impl DatasetReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// 🏁 The whole run: one report per dataset, ordered by (group, seq).
#[derive(Debug)]
pub struct RunSummary {
    pub reports: Vec<DatasetReport>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn total_succeeded(&self) -> usize {
        self.reports.iter().map(|r| r.succeeded).sum()
    }

    pub fn total_requests(&self) -> usize {
        self.reports.iter().map(|r| r.total()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_short_codes_get_their_zeroes() {
        assert_eq!(RegionCode::normalize("42").as_str(), "0000000042");
        assert_eq!(RegionCode::normalize(" 42 ").as_str(), "0000000042");
        assert_eq!(RegionCode::normalize("1100000000").as_str(), "1100000000");
    }

    #[test]
    fn the_one_where_long_codes_are_left_alone() {
        // 🧪 we pad, we don't amputate. twelve digits walk out with twelve.
        assert_eq!(
            RegionCode::normalize("123456789012").as_str(),
            "123456789012"
        );
    }

    #[test]
    fn the_one_where_field_names_queue_up_alphabetically() {
        let record: Record = [
            ("zeta".to_string(), "1".to_string()),
            ("alpha".to_string(), "2".to_string()),
        ]
        .into_iter()
        .collect();
        let names: Vec<&str> = record.field_names().collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn the_one_where_the_tally_actually_adds_up() {
        let report = DatasetReport {
            group: 1,
            seq: 1,
            name: "organic matter".into(),
            stem: "1-1".into(),
            succeeded: 7,
            failed: 3,
            empty: 1,
            output: None,
        };
        assert_eq!(report.total(), 10);
    }
}

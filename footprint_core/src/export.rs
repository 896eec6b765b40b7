//! Machine-readable export of snapshot history.
//!
//! JSON mirrors the persisted snapshot records. CSV flattens them into one
//! row per submission for spreadsheets.

use crate::{History, Result, Snapshot};
use std::io::Write;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    timestamp: String,
    travel: f64,
    electricity: f64,
    diet: f64,
    shopping: f64,
    total: f64,
    level: String,
}

impl From<&Snapshot> for CsvRow {
    fn from(snap: &Snapshot) -> Self {
        CsvRow {
            timestamp: snap.timestamp.to_rfc3339(),
            travel: snap.travel,
            electricity: snap.electricity,
            diet: snap.diet,
            shopping: snap.shopping,
            total: snap.total,
            level: snap.level.to_string(),
        }
    }
}

/// Serialize the history as a pretty-printed JSON array
pub fn to_json(history: &History) -> Result<String> {
    let snapshots: Vec<&Snapshot> = history.iter().collect();
    Ok(serde_json::to_string_pretty(&snapshots)?)
}

/// Write the history as CSV, header first
///
/// Returns the number of rows written.
pub fn to_csv<W: Write>(history: &History, writer: W) -> Result<usize> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    if history.is_empty() {
        // serde only emits headers alongside the first record
        csv_writer.write_record([
            "timestamp",
            "travel",
            "electricity",
            "diet",
            "shopping",
            "total",
            "level",
        ])?;
    }

    for snap in history.iter() {
        csv_writer.serialize(CsvRow::from(snap))?;
    }
    csv_writer.flush()?;

    tracing::debug!("Exported {} snapshots as CSV", history.len());
    Ok(history.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;
    use chrono::{TimeZone, Utc};

    fn sample_history() -> History {
        let mut history = History::new();
        for (i, total) in [4.0, 12.5, 18.0].into_iter().enumerate() {
            history.append(Snapshot {
                timestamp: Utc.with_ymd_and_hms(2024, 6, 1 + i as u32, 12, 0, 0).unwrap(),
                travel: total,
                electricity: 0.0,
                diet: 0.0,
                shopping: 0.0,
                total,
                level: crate::classify::level_for(total),
            });
        }
        history
    }

    #[test]
    fn test_json_export_parses_back() {
        let history = sample_history();
        let json = to_json(&history).unwrap();

        let parsed: Vec<Snapshot> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, history.to_vec());
        assert_eq!(parsed[1].level, Level::Moderate);
    }

    #[test]
    fn test_json_export_empty_is_empty_array() {
        let json = to_json(&History::new()).unwrap();
        assert_eq!(json.trim(), "[]");
    }

    #[test]
    fn test_csv_export() {
        let mut out = Vec::new();
        let rows = to_csv(&sample_history(), &mut out).unwrap();
        assert_eq!(rows, 3);

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "timestamp,travel,electricity,diet,shopping,total,level"
        );
        assert!(lines.next().unwrap().ends_with(",4.0,Low"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_csv_export_empty_has_header() {
        let mut out = Vec::new();
        let rows = to_csv(&History::new(), &mut out).unwrap();
        assert_eq!(rows, 0);
        assert_eq!(
            String::from_utf8(out).unwrap().trim(),
            "timestamp,travel,electricity,diet,shopping,total,level"
        );
    }
}

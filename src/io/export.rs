//! Export a run record to JSON, or its series to CSV.
//!
//! The format follows the file extension: `.csv` writes one row per point,
//! anything else writes the full record as pretty JSON.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::RunRecord;
use crate::error::AppError;

pub fn write_run_record(path: &Path, record: &RunRecord) -> Result<(), AppError> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        write_series_csv(path, record)
    } else {
        write_record_json(path, record)
    }?;
    tracing::info!(path = %path.display(), analysis = %record.analysis, "run exported");
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create export '{}': {e}", path.display())))?;
    Ok(BufWriter::new(file))
}

fn write_record_json(path: &Path, record: &RunRecord) -> Result<(), AppError> {
    let mut out = create(path)?;
    serde_json::to_writer_pretty(&mut out, record)
        .map_err(|e| AppError::config(format!("Failed to write export JSON: {e}")))?;
    out.flush()
        .map_err(|e| AppError::config(format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

/// One row per (series, point). Fitted parameters repeat on every row of
/// their series so the file stays flat.
fn write_series_csv(path: &Path, record: &RunRecord) -> Result<(), AppError> {
    let mut out = create(path)?;
    let err = |e: std::io::Error| AppError::config(format!("Failed to write export CSV: {e}"));

    writeln!(out, "analysis,series,x,y,lambda_l,lambda_k,alpha,fit_error").map_err(err)?;
    let opt = |v: Option<f64>| v.map(|x| format!("{x:.10}")).unwrap_or_default();
    let analysis = csv_field(&record.analysis);
    for s in &record.series {
        let label = csv_field(&s.label);
        let fit_error = csv_field(s.fit_error.as_deref().unwrap_or(""));
        for (x, y) in s.x.iter().zip(&s.y) {
            writeln!(
                out,
                "{analysis},{label},{x},{y:.10},{},{},{},{fit_error}",
                opt(s.lambda_l),
                opt(s.lambda_k),
                opt(s.alpha),
            )
            .map_err(err)?;
        }
    }
    out.flush().map_err(err)?;
    Ok(())
}

/// Quote a text field when it holds a delimiter, quote or line break.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

pub fn read_run_record(path: &Path) -> Result<RunRecord, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open run record '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::config(format!("Invalid run record JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeriesRecord;

    fn sample() -> RunRecord {
        let mut rec = RunRecord::new("simulate");
        rec.backend = Some("local_statevector".to_string());
        rec.scalar("shots", 1000.0);
        rec.series.push(SeriesRecord {
            label: "Chaotic".to_string(),
            x: vec![1.0, 2.0],
            y: vec![0.5, 0.25],
            lambda_l: Some(0.7),
            lambda_k: Some(0.2228),
            alpha: Some(-0.7228),
            fit_error: None,
        });
        rec.series.push(SeriesRecord {
            label: "Syk".to_string(),
            x: vec![1.0],
            y: vec![0.4],
            lambda_l: None,
            lambda_k: None,
            alpha: None,
            fit_error: Some("Need at least 3 points, got 1.".to_string()),
        });
        rec
    }

    #[test]
    fn json_export_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        write_run_record(&path, &sample()).unwrap();
        let back = read_run_record(&path).unwrap();
        assert_eq!(back.analysis, "simulate");
        assert_eq!(back.scalars["shots"], 1000.0);
        assert_eq!(back.series[1].fit_error.as_deref(), Some("Need at least 3 points, got 1."));
        // Absent fit values are omitted, not written as null.
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("null"));
    }

    #[test]
    fn csv_export_has_one_row_per_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.CSV");
        write_run_record(&path, &sample()).unwrap();
        let txt = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("simulate,Chaotic,1,0.5000000000,0.7000000000"));
        assert!(lines[3].ends_with(",,,,\"Need at least 3 points, got 1.\""));
    }

    #[test]
    fn csv_fields_are_quoted_not_rewritten() {
        assert_eq!(csv_field("Chaotic"), "Chaotic");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn missing_directory_is_a_config_error() {
        let err = write_run_record(Path::new("/nonexistent/dir/run.json"), &sample()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}

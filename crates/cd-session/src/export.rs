//! CSV export of aligned rows, and the reader used to inspect an exported file.
//!
//! Files start with a UTF-8 byte order mark so spreadsheet tools pick the right encoding. The
//! file is written to a sibling temp path first and renamed into place, so a failed export
//! never leaves a partial CSV behind.

use crate::error::{SessionError, SessionResult};
use cd_curves::{AlignedRow, RowTag};
use serde::Serialize;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const BOM: &[u8] = b"\xEF\xBB\xBF";

pub const CSV_HEADER: [&str; 5] = ["IGV_deg", "Q_Nm3hr", "Pdis_bar_g", "Power_kW", "comment"];

/// Write the header and all rows, in order, to `writer`.
pub fn write_rows_to<W: Write>(mut writer: W, rows: &[AlignedRow]) -> SessionResult<()> {
    writer.write_all(BOM)?;
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Export rows to `path`, replacing any existing file.
pub fn write_rows(path: &Path, rows: &[AlignedRow]) -> SessionResult<()> {
    let mut buffer = Vec::new();
    write_rows_to(&mut buffer, rows)?;

    let tmp = temp_path(path);
    let result = fs::write(&tmp, &buffer).and_then(|()| fs::rename(&tmp, path));
    if let Err(source) = result {
        let _ = fs::remove_file(&tmp);
        return Err(SessionError::ExportWrite {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

pub fn read_rows_from<R: Read>(mut reader: R) -> SessionResult<Vec<AlignedRow>> {
    let mut content = Vec::new();
    reader.read_to_end(&mut content)?;
    let body = content.strip_prefix(BOM).unwrap_or(content.as_slice());

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body);
    let mut rows = Vec::new();
    for record in csv_reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

pub fn read_rows(path: &Path) -> SessionResult<Vec<AlignedRow>> {
    let file = fs::File::open(path)?;
    read_rows_from(file)
}

/// Per-IGV digest of an exported file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IgvSummary {
    pub igv: f64,
    pub rows: usize,
    pub flow_min: i64,
    pub flow_max: i64,
    /// Flow of the row tagged as design point, if any.
    pub design_point: Option<i64>,
}

/// Group rows by IGV, in order of first appearance.
pub fn summarize(rows: &[AlignedRow]) -> Vec<IgvSummary> {
    let mut out: Vec<IgvSummary> = Vec::new();
    for row in rows {
        let design = (row.comment == Some(RowTag::DesignPoint)).then_some(row.flow);
        match out.iter_mut().find(|s| s.igv == row.igv) {
            Some(summary) => {
                summary.rows += 1;
                summary.flow_min = summary.flow_min.min(row.flow);
                summary.flow_max = summary.flow_max.max(row.flow);
                summary.design_point = summary.design_point.or(design);
            }
            None => out.push(IgvSummary {
                igv: row.igv,
                rows: 1,
                flow_min: row.flow,
                flow_max: row.flow,
                design_point: design,
            }),
        }
    }
    out
}

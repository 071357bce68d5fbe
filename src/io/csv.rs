use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, Writer};

use crate::column::{BooleanColumn, Column, Float64Column, Int64Column, StringColumn};
use crate::error::{Error, Result};
use crate::frame::Frame;

/// Reads a CSV file into a `Frame`.
///
/// Cells are trimmed; empty cells become nulls. Each column is inferred
/// to the narrowest type its non-empty cells all parse to: Int64, then
/// Float64, then Boolean ("true"/"false"), otherwise String.
pub fn read_csv<P: AsRef<Path>>(path: P, has_header: bool) -> Result<Frame> {
    let file = File::open(path.as_ref()).map_err(Error::Io)?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers: Vec<String> = if has_header {
        rdr.headers()
            .map_err(Error::Csv)?
            .iter()
            .map(|h| h.to_string())
            .collect()
    } else {
        match rdr.records().next() {
            Some(first) => {
                let first = first.map_err(Error::Csv)?;
                (0..first.len()).map(|i| format!("column_{}", i)).collect()
            }
            None => return Ok(Frame::new()),
        }
    };

    let mut cells: HashMap<usize, Vec<Option<String>>> = HashMap::new();
    for i in 0..headers.len() {
        cells.insert(i, Vec::new());
    }

    for record in rdr.records() {
        let record = record.map_err(Error::Csv)?;
        for (i, column) in cells.iter_mut() {
            let cell = record.get(*i).unwrap_or("");
            if cell.is_empty() {
                column.push(None);
            } else {
                column.push(Some(cell.to_string()));
            }
        }
    }

    let mut frame = Frame::new();
    for (i, header) in headers.iter().enumerate() {
        let values = cells.remove(&i).unwrap_or_default();
        frame.add_column(header.clone(), infer_column(&values)?)?;
    }
    Ok(frame)
}

/// Writes a `Frame` to a CSV file, nulls as empty cells.
pub fn write_csv<P: AsRef<Path>>(frame: &Frame, path: P) -> Result<()> {
    let file = File::create(path.as_ref()).map_err(Error::Io)?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(frame.column_names()).map_err(Error::Csv)?;
    for row in 0..frame.row_count() {
        let mut record: Vec<String> = Vec::with_capacity(frame.column_count());
        for name in frame.column_names() {
            let value = frame.column(name)?.value(row)?;
            record.push(if value.is_null() {
                String::new()
            } else {
                value.to_string()
            });
        }
        wtr.write_record(&record).map_err(Error::Csv)?;
    }
    wtr.flush().map_err(Error::Io)?;
    Ok(())
}

/// Infers the narrowest column type the non-null cells all parse to.
fn infer_column(values: &[Option<String>]) -> Result<Column> {
    let nulls: Vec<bool> = values.iter().map(|v| v.is_none()).collect();
    let non_null: Vec<&str> = values.iter().flatten().map(|s| s.as_str()).collect();

    if !non_null.is_empty() && non_null.iter().all(|v| v.parse::<i64>().is_ok()) {
        let data = values
            .iter()
            .map(|v| v.as_deref().and_then(|s| s.parse::<i64>().ok()).unwrap_or(0))
            .collect();
        return Ok(Column::Int64(Int64Column::with_nulls(data, nulls)?));
    }
    if !non_null.is_empty() && non_null.iter().all(|v| v.parse::<f64>().is_ok()) {
        let data = values
            .iter()
            .map(|v| v.as_deref().and_then(|s| s.parse::<f64>().ok()).unwrap_or(0.0))
            .collect();
        return Ok(Column::Float64(Float64Column::with_nulls(data, nulls)?));
    }
    if !non_null.is_empty() && non_null.iter().all(|v| *v == "true" || *v == "false") {
        let data = values
            .iter()
            .map(|v| v.as_deref().map(|s| s == "true").unwrap_or(false))
            .collect();
        return Ok(Column::Boolean(BooleanColumn::with_nulls(data, nulls)?));
    }

    Ok(Column::String(StringColumn::from_options(
        values.to_vec(),
    )))
}

use crate::domain::model::{CellValue, Dataset, Record};
use crate::utils::error::{ReconError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

/// Parses an export into a `Dataset`. The first row is the header.
///
/// `.csv` and `.tsv` go through the csv reader; everything else is handed to
/// calamine, which detects the workbook format from the bytes.
pub fn parse_dataset(
    name: &str,
    file_name: &str,
    bytes: Vec<u8>,
    sheet: Option<&str>,
) -> Result<Dataset> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let rows = match extension.as_deref() {
        Some("csv") => read_delimited(&bytes, b',')?,
        Some("tsv") => read_delimited(&bytes, b'\t')?,
        _ => read_workbook(&bytes, sheet)?,
    };

    let dataset = into_dataset(name, rows)?;
    tracing::debug!(
        "Loaded {} from {}: {} columns, {} rows",
        name,
        file_name,
        dataset.columns.len(),
        dataset.len()
    );
    Ok(dataset)
}

fn read_delimited(bytes: &[u8], delimiter: u8) -> Result<Vec<Vec<CellValue>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(CellValue::from_text).collect());
    }
    Ok(rows)
}

fn read_workbook(bytes: &[u8], sheet: Option<&str>) -> Result<Vec<Vec<CellValue>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ReconError::DataError {
                dataset: "workbook".to_string(),
                message: "workbook contains no sheets".to_string(),
            })?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    // Data may not begin at column A; keep positions aligned with the sheet.
    let start_col = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    Ok(range
        .rows()
        .map(|row| {
            std::iter::repeat(CellValue::Empty)
                .take(start_col)
                .chain(row.iter().map(cell_from_data))
                .collect()
        })
        .collect())
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Float(*n),
        Data::Int(n) => CellValue::Int(*n),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        // Dates are not pay values; keep them as text so numeric checks flag them.
        Data::DateTime(dt) => CellValue::Text(dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Header cells become unique column names: blanks are `Unnamed: <index>`,
/// repeats get `.1`, `.2`, ... appended.
fn header_names(header: &[CellValue]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let base = match cell {
                CellValue::Empty => format!("Unnamed: {}", i),
                other => other.label(),
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

fn into_dataset(name: &str, mut rows: Vec<Vec<CellValue>>) -> Result<Dataset> {
    if rows.is_empty() {
        return Err(ReconError::DataError {
            dataset: name.to_string(),
            message: "file has no header row".to_string(),
        });
    }
    let header = rows.remove(0);
    let width = rows.iter().map(Vec::len).fold(header.len(), usize::max);

    let mut padded_header = header;
    padded_header.resize(width, CellValue::Empty);
    let columns = header_names(&padded_header);

    let records = rows
        .into_iter()
        .map(|mut values| {
            values.resize(width, CellValue::Empty);
            Record::new(values)
        })
        .collect();

    Ok(Dataset::new(name, columns, records))
}

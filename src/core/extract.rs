use crate::config::layout::LayoutConfig;
use crate::domain::model::{CellValue, Dataset};
use crate::utils::error::{ReconError, Result};

/// Employee identifiers are integers, but exports carry them as text or floats.
/// Floats outside the `i64` range are rejected rather than saturated.
pub fn coerce_identifier(value: &CellValue) -> Option<i64> {
    match value {
        CellValue::Int(n) => Some(*n),
        CellValue::Float(f)
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
        {
            Some(*f as i64)
        }
        CellValue::Text(s) => match CellValue::from_text(s) {
            CellValue::Text(_) => None,
            parsed => coerce_identifier(&parsed),
        },
        _ => None,
    }
}

fn identity_index(dataset: &Dataset, candidates: &[&str]) -> Result<usize> {
    candidates
        .iter()
        .find_map(|name| dataset.column_index(name))
        .ok_or_else(|| ReconError::MissingColumn {
            dataset: dataset.name.clone(),
            column: candidates.join("' or '"),
        })
}

/// Coerces identity cells in `rows`, skipping separator breaks and repeated
/// header rows (those are reported by the structural checks).
fn collect_ids(
    dataset: &Dataset,
    column: usize,
    rows: std::ops::Range<usize>,
) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(rows.len());
    for row in rows {
        let record = &dataset.records[row];
        if record.is_blank() || record.repeats_header(&dataset.columns) {
            continue;
        }
        let cell = record.get(column);
        let id = coerce_identifier(cell).ok_or_else(|| ReconError::InvalidIdentifier {
            dataset: dataset.name.clone(),
            row: row + 2,
            value: cell.label(),
        })?;
        ids.push(id);
    }
    Ok(ids)
}

pub fn gtn_identity_ids(dataset: &Dataset, layout: &LayoutConfig) -> Result<Vec<i64>> {
    let candidates: Vec<&str> = layout.gtn_identity_candidates().collect();
    let column = identity_index(dataset, &candidates)?;
    collect_ids(dataset, column, 0..dataset.len())
}

/// The payrun export opens with a label row and closes with a totals row;
/// neither is an employee.
pub fn payrun_identity_ids(dataset: &Dataset, layout: &LayoutConfig) -> Result<Vec<i64>> {
    let column = identity_index(dataset, &[layout.identity_column.as_str()])?;
    if dataset.len() < 2 {
        return Ok(Vec::new());
    }
    collect_ids(dataset, column, 1..dataset.len() - 1)
}

pub fn gtn_pay_elements(dataset: &Dataset, layout: &LayoutConfig) -> Result<Vec<String>> {
    if dataset.columns.len() <= layout.gtn_leading_columns {
        return Err(ReconError::DataError {
            dataset: dataset.name.clone(),
            message: format!(
                "expected pay-element columns after the first {} columns, found {} columns",
                layout.gtn_leading_columns,
                dataset.columns.len()
            ),
        });
    }
    Ok(dataset.columns[layout.gtn_leading_columns..].to_vec())
}

/// Pay-element labels from the payrun label row.
///
/// The export merges label cells across columns, which leaves blanks behind.
/// A blank label takes the column's header name instead; dropping those
/// columns would make every merged element look unmapped.
pub fn payrun_pay_elements(dataset: &Dataset, layout: &LayoutConfig) -> Result<Vec<String>> {
    if dataset.columns.len() <= layout.payrun_leading_columns {
        return Err(ReconError::DataError {
            dataset: dataset.name.clone(),
            message: format!(
                "expected pay-element columns after the first {} columns, found {} columns",
                layout.payrun_leading_columns,
                dataset.columns.len()
            ),
        });
    }
    let labels = dataset
        .records
        .get(layout.payrun_label_row)
        .ok_or_else(|| ReconError::DataError {
            dataset: dataset.name.clone(),
            message: format!("no pay-element label row at data row {}", layout.payrun_label_row),
        })?;

    Ok((layout.payrun_leading_columns..dataset.columns.len())
        .map(|i| match labels.get(i) {
            CellValue::Empty => dataset.columns[i].clone(),
            cell => cell.label(),
        })
        .collect())
}

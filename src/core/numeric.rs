use crate::config::layout::LayoutConfig;
use crate::core::extract::gtn_pay_elements;
use crate::core::suite::{loaded, outcome};
use crate::domain::model::{CellValue, CheckKind, CheckOutcome, Dataset, Discrepancy, ReconInputs};
use crate::domain::ports::Check;
use crate::utils::error::Result;

/// Missing cells are fine; anything present must be a number.
fn is_numeric_cell(cell: &CellValue) -> bool {
    cell.is_empty() || cell.is_numeric()
}

/// Pay-element columns holding at least one non-numeric cell, in column order.
pub fn find_non_numeric_columns(dataset: &Dataset, layout: &LayoutConfig) -> Result<Vec<String>> {
    gtn_pay_elements(dataset, layout)?;

    Ok((layout.gtn_leading_columns..dataset.columns.len())
        .filter(|&i| !dataset.column(i).all(is_numeric_cell))
        .map(|i| dataset.columns[i].clone())
        .collect())
}

pub struct NumericValidator {
    layout: LayoutConfig,
}

impl NumericValidator {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }
}

impl Check for NumericValidator {
    fn name(&self) -> &'static str {
        "numeric"
    }

    fn kinds(&self) -> &'static [CheckKind] {
        &[CheckKind::NonNumericGtn]
    }

    fn run(&self, inputs: &ReconInputs) -> Vec<CheckOutcome> {
        let columns = loaded(&inputs.gtn)
            .and_then(|gtn| find_non_numeric_columns(gtn, &self.layout))
            .map(|columns| columns.into_iter().map(Discrepancy::PayElement).collect());
        vec![outcome(CheckKind::NonNumericGtn, columns)]
    }
}

//! Pay-element consistency between the two exports, through the mapping table.
//!
//! Four independent findings, two per direction:
//!
//! * GTN → payrun: mapped GTN elements whose payrun target is not a payrun
//!   column, and GTN elements with neither a mapping nor an exemption.
//! * payrun → GTN: payrun columns targeted by the mapping whose GTN source is
//!   not a GTN column, and payrun columns nothing maps to.
//!
//! Only the GTN side has an exemption list. Unmapped payrun elements are
//! always reported.

use crate::config::layout::LayoutConfig;
use crate::core::extract::{gtn_pay_elements, payrun_pay_elements};
use crate::core::mapping::MappingTable;
use crate::core::suite::{errored_all, loaded};
use crate::domain::model::{
    CheckKind, CheckOutcome, Discrepancy, ReconInputs, ReconciliationResult,
};
use crate::domain::ports::Check;
use crate::utils::error::Result;
use std::collections::HashSet;

/// Keeps first occurrences, in order.
fn unique<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(*item))
        .map(str::to_string)
        .collect()
}

/// Payrun targets of mapped GTN elements that are not payrun columns.
pub fn mapped_missing_from_payrun(
    gtn_elements: &[String],
    payrun_elements: &[String],
    mapping: &MappingTable,
) -> Vec<String> {
    let present: HashSet<&str> = payrun_elements.iter().map(String::as_str).collect();
    unique(
        gtn_elements
            .iter()
            .filter_map(|name| mapping.payrun_for(name))
            .filter(|target| !present.contains(target)),
    )
}

/// GTN elements with no mapping entry that are not exempt.
pub fn unmapped_gtn_elements(gtn_elements: &[String], mapping: &MappingTable) -> Vec<String> {
    unique(
        gtn_elements
            .iter()
            .map(String::as_str)
            .filter(|name| !mapping.is_mapped_gtn(name) && !mapping.is_exempt(name)),
    )
}

/// GTN sources of mapped payrun elements that are not GTN columns.
pub fn mapped_missing_from_gtn(
    gtn_elements: &[String],
    payrun_elements: &[String],
    mapping: &MappingTable,
) -> Vec<String> {
    let present: HashSet<&str> = gtn_elements.iter().map(String::as_str).collect();
    unique(
        payrun_elements
            .iter()
            .flat_map(|id| mapping.entries_for_payrun(id))
            .map(|entry| entry.gtn_element.as_str())
            .filter(|source| !present.contains(source)),
    )
}

/// Payrun elements nothing in the mapping points at.
pub fn unmapped_payrun_elements(payrun_elements: &[String], mapping: &MappingTable) -> Vec<String> {
    unique(
        payrun_elements
            .iter()
            .map(String::as_str)
            .filter(|id| !mapping.is_mapped_payrun(id)),
    )
}

pub struct ElementReconciler {
    layout: LayoutConfig,
}

impl ElementReconciler {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    fn elements(&self, inputs: &ReconInputs) -> Result<(Vec<String>, Vec<String>)> {
        let gtn = gtn_pay_elements(loaded(&inputs.gtn)?, &self.layout)?;
        let payrun = payrun_pay_elements(loaded(&inputs.payrun)?, &self.layout)?;
        tracing::debug!(
            "Comparing {} GTN pay elements with {} payrun pay elements through {} mappings",
            gtn.len(),
            payrun.len(),
            inputs.mapping.len()
        );
        Ok((gtn, payrun))
    }
}

impl Check for ElementReconciler {
    fn name(&self) -> &'static str {
        "elements"
    }

    fn kinds(&self) -> &'static [CheckKind] {
        &[
            CheckKind::ElementsMissingPayrun,
            CheckKind::ElementsUnmappedGtn,
            CheckKind::ElementsMissingGtn,
            CheckKind::ElementsUnmappedPayrun,
        ]
    }

    fn run(&self, inputs: &ReconInputs) -> Vec<CheckOutcome> {
        let (gtn, payrun) = match self.elements(inputs) {
            Ok(elements) => elements,
            Err(e) => return errored_all(self.kinds(), &e),
        };
        let mapping = &inputs.mapping;

        [
            (
                CheckKind::ElementsMissingPayrun,
                mapped_missing_from_payrun(&gtn, &payrun, mapping),
            ),
            (
                CheckKind::ElementsUnmappedGtn,
                unmapped_gtn_elements(&gtn, mapping),
            ),
            (
                CheckKind::ElementsMissingGtn,
                mapped_missing_from_gtn(&gtn, &payrun, mapping),
            ),
            (
                CheckKind::ElementsUnmappedPayrun,
                unmapped_payrun_elements(&payrun, mapping),
            ),
        ]
        .into_iter()
        .map(|(kind, names)| {
            ReconciliationResult::new(kind, names.into_iter().map(Discrepancy::PayElement)).into()
        })
        .collect()
    }
}

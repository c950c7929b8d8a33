use crate::config::layout::LayoutConfig;
use crate::core::extract::{gtn_identity_ids, payrun_identity_ids};
use crate::core::suite::{errored_all, loaded};
use crate::domain::model::{
    CheckKind, CheckOutcome, Discrepancy, ReconInputs, ReconciliationResult,
};
use crate::domain::ports::Check;
use crate::utils::error::Result;
use std::collections::BTreeSet;

/// Identifiers in `right` that are absent from `left`, ascending and unique.
fn exclusive_to(right: &[i64], left: &[i64]) -> Vec<i64> {
    let left: BTreeSet<i64> = left.iter().copied().collect();
    right
        .iter()
        .copied()
        .filter(|id| !left.contains(id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Employees on the payrun but not in the GTN.
pub fn find_missing_from_gtn(gtn_ids: &[i64], payrun_ids: &[i64]) -> Vec<i64> {
    exclusive_to(payrun_ids, gtn_ids)
}

/// Employees in the GTN but not on the payrun.
pub fn find_missing_from_payrun(gtn_ids: &[i64], payrun_ids: &[i64]) -> Vec<i64> {
    exclusive_to(gtn_ids, payrun_ids)
}

pub struct IdentityReconciler {
    layout: LayoutConfig,
}

impl IdentityReconciler {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    fn ids(&self, inputs: &ReconInputs) -> Result<(Vec<i64>, Vec<i64>)> {
        let gtn = gtn_identity_ids(loaded(&inputs.gtn)?, &self.layout)?;
        let payrun = payrun_identity_ids(loaded(&inputs.payrun)?, &self.layout)?;
        tracing::debug!(
            "Comparing {} GTN identifiers with {} payrun identifiers",
            gtn.len(),
            payrun.len()
        );
        Ok((gtn, payrun))
    }
}

impl Check for IdentityReconciler {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn kinds(&self) -> &'static [CheckKind] {
        &[CheckKind::EmployeesMissingGtn, CheckKind::EmployeesMissingPayrun]
    }

    fn run(&self, inputs: &ReconInputs) -> Vec<CheckOutcome> {
        match self.ids(inputs) {
            Ok((gtn, payrun)) => {
                let employees = |ids: Vec<i64>| ids.into_iter().map(Discrepancy::EmployeeId);
                vec![
                    ReconciliationResult::new(
                        CheckKind::EmployeesMissingGtn,
                        employees(find_missing_from_gtn(&gtn, &payrun)),
                    )
                    .into(),
                    ReconciliationResult::new(
                        CheckKind::EmployeesMissingPayrun,
                        employees(find_missing_from_payrun(&gtn, &payrun)),
                    )
                    .into(),
                ]
            }
            Err(e) => errored_all(self.kinds(), &e),
        }
    }
}

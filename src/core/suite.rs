use crate::config::layout::LayoutConfig;
use crate::core::elements::ElementReconciler;
use crate::core::identity::IdentityReconciler;
use crate::core::numeric::NumericValidator;
use crate::core::structural::StructuralValidator;
use crate::domain::model::{
    CheckKind, CheckOutcome, Dataset, DatasetSlot, Discrepancy, ReconInputs, ReconciliationResult,
};
use crate::domain::ports::Check;
use crate::utils::error::{ReconError, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

pub(crate) fn loaded(slot: &DatasetSlot) -> Result<&Dataset> {
    match slot {
        DatasetSlot::Loaded(dataset) => Ok(dataset),
        DatasetSlot::Unavailable { name, reason } => Err(ReconError::DatasetUnavailable {
            dataset: name.clone(),
            reason: reason.clone(),
        }),
    }
}

pub(crate) fn outcome(check: CheckKind, result: Result<Vec<Discrepancy>>) -> CheckOutcome {
    match result {
        Ok(discrepancies) => ReconciliationResult::new(check, discrepancies).into(),
        Err(e) => CheckOutcome::errored(check, e.to_string()),
    }
}

pub(crate) fn errored_all(kinds: &[CheckKind], error: &ReconError) -> Vec<CheckOutcome> {
    let message = error.to_string();
    kinds
        .iter()
        .map(|&kind| CheckOutcome::errored(kind, message.clone()))
        .collect()
}

/// Runs check components side by side and gathers their outcomes.
///
/// Components share nothing but the read-only inputs, so each one gets its own
/// blocking task. A component that fails or panics only costs its own kinds.
pub struct CheckSuite {
    checks: Vec<Arc<dyn Check>>,
    enabled: Vec<CheckKind>,
}

impl CheckSuite {
    pub fn new(checks: Vec<Arc<dyn Check>>) -> Self {
        Self {
            checks,
            enabled: CheckKind::ALL.to_vec(),
        }
    }

    /// The four standard components.
    pub fn standard(layout: &LayoutConfig) -> Self {
        Self::new(vec![
            Arc::new(StructuralValidator::new(layout.clone())),
            Arc::new(IdentityReconciler::new(layout.clone())),
            Arc::new(ElementReconciler::new(layout.clone())),
            Arc::new(NumericValidator::new(layout.clone())),
        ])
    }

    pub fn with_enabled(mut self, enabled: Vec<CheckKind>) -> Self {
        self.enabled = enabled;
        self
    }

    fn wanted(&self, check: &dyn Check) -> bool {
        check.kinds().iter().any(|k| self.enabled.contains(k))
    }

    /// Outcomes for the enabled kinds, in `CheckKind` order.
    pub async fn run(&self, inputs: Arc<ReconInputs>) -> Vec<CheckOutcome> {
        let mut tasks = JoinSet::new();

        for check in self.checks.iter().filter(|c| self.wanted(c.as_ref())) {
            let check = Arc::clone(check);
            let inputs = Arc::clone(&inputs);
            tasks.spawn_blocking(move || {
                let span = tracing::debug_span!("check", name = check.name());
                let _guard = span.enter();
                let started = Instant::now();
                let outcomes = check.run(&inputs);
                tracing::debug!("{} finished in {:?}", check.name(), started.elapsed());
                outcomes
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(batch) => outcomes.extend(batch),
                Err(e) => tracing::error!("Check task failed to complete: {}", e),
            }
        }

        // Kinds whose component died without reporting.
        for &kind in &self.enabled {
            if !outcomes.iter().any(|o| o.check == kind) {
                outcomes.push(CheckOutcome::errored(
                    kind,
                    "check did not complete".to_string(),
                ));
            }
        }

        outcomes.retain(|o| self.enabled.contains(&o.check));
        outcomes.sort_by_key(|o| o.check);

        for outcome in &outcomes {
            if outcome.passed() {
                tracing::debug!("{}: passed", outcome.check);
            } else {
                tracing::warn!(
                    "{}: {} ({} discrepancies)",
                    outcome.check,
                    outcome.status_label(),
                    outcome.discrepancies().len()
                );
            }
        }

        outcomes
    }
}

use crate::core::mapping::MappingTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

static EMPTY: CellValue = CellValue::Empty;

/// A single spreadsheet cell after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Builds a cell from raw text, typing it the way a spreadsheet reader would.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return Self::Int(n);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        match trimmed {
            "true" | "TRUE" | "True" => Self::Bool(true),
            "false" | "FALSE" | "False" => Self::Bool(false),
            _ => Self::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Text form used when a cell doubles as a label (header rows, element names).
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Float(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One data row, positionally aligned with `Dataset::columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Record {
    pub values: Vec<CellValue>,
}

impl Record {
    pub fn new(values: Vec<CellValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> &CellValue {
        self.values.get(index).unwrap_or(&EMPTY)
    }

    /// Every cell missing: a separator break in the sheet.
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(CellValue::is_empty)
    }

    /// Cell-for-cell equal to the header row.
    pub fn repeats_header(&self, columns: &[String]) -> bool {
        !columns.is_empty()
            && columns
                .iter()
                .enumerate()
                .all(|(i, name)| self.get(i).label() == *name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, columns: Vec<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            columns,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.records.iter().map(move |r| r.get(index))
    }
}

/// A dataset as handed to the checks: either loaded, or the reason it wasn't.
#[derive(Debug, Clone)]
pub enum DatasetSlot {
    Loaded(Dataset),
    Unavailable { name: String, reason: String },
}

/// Everything one reconciliation run reads. Immutable once built.
#[derive(Debug, Clone)]
pub struct ReconInputs {
    pub gtn_file: String,
    pub payrun_file: String,
    pub gtn: DatasetSlot,
    pub payrun: DatasetSlot,
    pub mapping: MappingTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Discrepancy {
    EmployeeId(i64),
    PayElement(String),
    Row(usize),
    FileType { file: String, extension: String },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmployeeId(id) => write!(f, "{}", id),
            Self::PayElement(name) => write!(f, "{}", name),
            Self::Row(row) => write!(f, "{}", row),
            Self::FileType { file, extension } => write!(f, "{} ({})", file, extension),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    FileType,
    BlankRows,
    DuplicateHeaders,
    EmployeesMissingGtn,
    EmployeesMissingPayrun,
    ElementsMissingPayrun,
    ElementsUnmappedGtn,
    ElementsMissingGtn,
    ElementsUnmappedPayrun,
    NonNumericGtn,
}

impl CheckKind {
    pub const ALL: [CheckKind; 10] = [
        CheckKind::FileType,
        CheckKind::BlankRows,
        CheckKind::DuplicateHeaders,
        CheckKind::EmployeesMissingGtn,
        CheckKind::EmployeesMissingPayrun,
        CheckKind::ElementsMissingPayrun,
        CheckKind::ElementsUnmappedGtn,
        CheckKind::ElementsMissingGtn,
        CheckKind::ElementsUnmappedPayrun,
        CheckKind::NonNumericGtn,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::FileType => "file_type",
            Self::BlankRows => "blank_rows",
            Self::DuplicateHeaders => "duplicate_headers",
            Self::EmployeesMissingGtn => "employees_missing_gtn",
            Self::EmployeesMissingPayrun => "employees_missing_payrun",
            Self::ElementsMissingPayrun => "elements_missing_payrun",
            Self::ElementsUnmappedGtn => "elements_unmapped_gtn",
            Self::ElementsMissingGtn => "elements_missing_gtn",
            Self::ElementsUnmappedPayrun => "elements_unmapped_payrun",
            Self::NonNumericGtn => "non_numeric_gtn",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Headline shown above the discrepancy list when the check fails.
    pub fn headline(&self) -> &'static str {
        match self {
            Self::FileType => "Input files with an unsupported file type",
            Self::BlankRows => "Line breaks found in the GTN file at the following rows",
            Self::DuplicateHeaders => "Multiple header rows found in the GTN file at the following rows",
            Self::EmployeesMissingGtn => "Employees present in the Payrun file but missing in the GTN",
            Self::EmployeesMissingPayrun => "Employees present in the GTN file but missing in the Payrun file",
            Self::ElementsMissingPayrun => "The following mapped Pay Elements are missing from the Payrun file",
            Self::ElementsUnmappedGtn => "Pay Elements in the GTN which do not have a mapping in the Payrun file",
            Self::ElementsMissingGtn => "The following mapped Pay Elements are missing from the GTN file",
            Self::ElementsUnmappedPayrun => "Pay Elements in the Payrun file which do not have a mapping in the GTN",
            Self::NonNumericGtn => "The following columns in the GTN file contain non-numeric elements",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Findings of one check. No discrepancies means the check passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub check: CheckKind,
    pub discrepancies: Vec<Discrepancy>,
}

impl ReconciliationResult {
    pub fn new(check: CheckKind, discrepancies: impl IntoIterator<Item = Discrepancy>) -> Self {
        Self {
            check,
            discrepancies: discrepancies.into_iter().collect(),
        }
    }

    pub fn passed(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Failed { discrepancies: Vec<Discrepancy> },
    Errored { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub check: CheckKind,
    #[serde(flatten)]
    pub status: CheckStatus,
}

impl CheckOutcome {
    pub fn errored(check: CheckKind, message: impl Into<String>) -> Self {
        Self {
            check,
            status: CheckStatus::Errored {
                message: message.into(),
            },
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self.status, CheckStatus::Passed)
    }

    pub fn discrepancies(&self) -> &[Discrepancy] {
        match &self.status {
            CheckStatus::Failed { discrepancies } => discrepancies,
            _ => &[],
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self.status {
            CheckStatus::Passed => "PASS",
            CheckStatus::Failed { .. } => "FAIL",
            CheckStatus::Errored { .. } => "ERROR",
        }
    }
}

impl From<ReconciliationResult> for CheckOutcome {
    fn from(result: ReconciliationResult) -> Self {
        let status = if result.passed() {
            CheckStatus::Passed
        } else {
            CheckStatus::Failed {
                discrepancies: result.discrepancies,
            }
        };
        Self {
            check: result.check,
            status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub run_name: String,
    pub generated_at: DateTime<Utc>,
    pub outcomes: Vec<CheckOutcome>,
}

impl ReconReport {
    pub fn new(run_name: impl Into<String>, outcomes: Vec<CheckOutcome>) -> Self {
        Self {
            run_name: run_name.into(),
            generated_at: Utc::now(),
            outcomes,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(CheckOutcome::passed)
    }

    pub fn failed_checks(&self) -> Vec<CheckKind> {
        self.outcomes
            .iter()
            .filter(|o| !o.passed())
            .map(|o| o.check)
            .collect()
    }

    pub fn outcome(&self, check: CheckKind) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.check == check)
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }
}

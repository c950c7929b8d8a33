use crate::config::layout::LayoutConfig;
use crate::core::suite::{loaded, outcome};
use crate::domain::model::{CheckKind, CheckOutcome, Dataset, Discrepancy, ReconInputs};
use crate::domain::ports::Check;
use std::path::Path;

/// Spreadsheet rows are 1-based and the header occupies row 1.
const SHEET_ROW_OFFSET: usize = 2;

/// Extension including the leading dot, or an empty string.
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// `None` when the file's extension is on the allow-list.
pub fn check_file_type(file_name: &str, allowed_extensions: &[String]) -> Option<Discrepancy> {
    let extension = file_extension(file_name);
    if allowed_extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
    {
        return None;
    }
    let file = Path::new(file_name)
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(file_name)
        .to_string();
    Some(Discrepancy::FileType { file, extension })
}

pub fn check_blank_separator_rows(dataset: &Dataset) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.is_blank())
        .map(|(i, _)| i + SHEET_ROW_OFFSET)
        .collect()
}

pub fn check_duplicate_header_rows(dataset: &Dataset) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.repeats_header(&dataset.columns))
        .map(|(i, _)| i + SHEET_ROW_OFFSET)
        .collect()
}

/// Layout hygiene of the GTN sheet, plus the file type of both inputs.
pub struct StructuralValidator {
    layout: LayoutConfig,
}

impl StructuralValidator {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }
}

impl Check for StructuralValidator {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn kinds(&self) -> &'static [CheckKind] {
        &[
            CheckKind::FileType,
            CheckKind::BlankRows,
            CheckKind::DuplicateHeaders,
        ]
    }

    fn run(&self, inputs: &ReconInputs) -> Vec<CheckOutcome> {
        let file_types = [&inputs.gtn_file, &inputs.payrun_file]
            .into_iter()
            .filter_map(|file| check_file_type(file, &self.layout.allowed_extensions))
            .collect();

        let breaks = loaded(&inputs.gtn).map(|d| {
            check_blank_separator_rows(d)
                .into_iter()
                .map(Discrepancy::Row)
                .collect()
        });
        let headers = loaded(&inputs.gtn).map(|d| {
            check_duplicate_header_rows(d)
                .into_iter()
                .map(Discrepancy::Row)
                .collect()
        });

        vec![
            outcome(CheckKind::FileType, Ok(file_types)),
            outcome(CheckKind::BlankRows, breaks),
            outcome(CheckKind::DuplicateHeaders, headers),
        ]
    }
}

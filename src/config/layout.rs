use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_positive_number, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 12] = [
    ".xlsx", ".xlsm", ".xlsb", ".xltx", ".xltm", ".xls", ".xlt", ".xml", ".xlam", ".xla", ".xlw",
    ".xlr",
];

fn default_gtn_leading_columns() -> usize {
    4
}

fn default_payrun_leading_columns() -> usize {
    25
}

fn default_identity_column() -> String {
    "Employee ID".to_string()
}

fn default_gtn_identity_aliases() -> Vec<String> {
    vec!["employee_id".to_string()]
}

fn default_allowed_extensions() -> Vec<String> {
    DEFAULT_ALLOWED_EXTENSIONS
        .iter()
        .map(|e| e.to_string())
        .collect()
}

/// Where things live inside the two exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct LayoutConfig {
    /// Number of metadata columns before the first GTN pay element
    #[serde(default = "default_gtn_leading_columns")]
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 4))]
    pub gtn_leading_columns: usize,

    /// Number of metadata columns before the first payrun pay element
    #[serde(default = "default_payrun_leading_columns")]
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 25))]
    pub payrun_leading_columns: usize,

    /// Name of the employee identity column
    #[serde(default = "default_identity_column")]
    #[cfg_attr(feature = "cli", arg(long, default_value = "Employee ID"))]
    pub identity_column: String,

    /// Other names the GTN export uses for the identity column
    #[serde(default = "default_gtn_identity_aliases")]
    #[cfg_attr(
        feature = "cli",
        arg(long, value_delimiter = ',', default_value = "employee_id")
    )]
    pub gtn_identity_aliases: Vec<String>,

    /// Data row (0-based, below the header) holding the payrun pay-element labels
    #[serde(default)]
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 0))]
    pub payrun_label_row: usize,

    /// Worksheet to read; the first sheet when unset
    #[serde(default)]
    #[cfg_attr(feature = "cli", arg(long))]
    pub sheet: Option<String>,

    #[serde(default = "default_allowed_extensions")]
    #[cfg_attr(feature = "cli", arg(skip = default_allowed_extensions()))]
    pub allowed_extensions: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gtn_leading_columns: default_gtn_leading_columns(),
            payrun_leading_columns: default_payrun_leading_columns(),
            identity_column: default_identity_column(),
            gtn_identity_aliases: default_gtn_identity_aliases(),
            payrun_label_row: 0,
            sheet: None,
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl LayoutConfig {
    /// Identity column name followed by the GTN aliases, in lookup order.
    pub fn gtn_identity_candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.identity_column.as_str())
            .chain(self.gtn_identity_aliases.iter().map(String::as_str))
    }
}

impl Validate for LayoutConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("layout.payrun_leading_columns", self.payrun_leading_columns, 1)?;
        validate_non_empty_string("layout.identity_column", &self.identity_column)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_defaults_from_empty_table() {
        let layout: LayoutConfig = toml::from_str("").unwrap();
        assert_eq!(layout, LayoutConfig::default());
        assert_eq!(layout.allowed_extensions.len(), 12);
    }

    #[test]
    fn test_identity_candidates_order() {
        let layout = LayoutConfig::default();
        let names: Vec<&str> = layout.gtn_identity_candidates().collect();
        assert_eq!(names, vec!["Employee ID", "employee_id"]);
    }

    #[test]
    fn test_zero_payrun_block_rejected() {
        let layout = LayoutConfig {
            payrun_leading_columns: 0,
            ..LayoutConfig::default()
        };
        assert!(layout.validate().is_err());
    }
}

use crate::config::layout::LayoutConfig;
use crate::core::ConfigProvider;
use crate::domain::model::CheckKind;
use crate::utils::error::{ReconError, Result};
use crate::utils::validation::{
    parse_check_names, validate_file_extension, validate_path, validate_report_formats, Validate,
};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub run: RunConfig,
    pub inputs: InputsConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub checks: ChecksConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    pub gtn: String,
    pub payrun: String,
    pub mapping: String,
    pub base_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecksConfig {
    /// Check names to run; empty runs all of them.
    #[serde(default)]
    pub enabled: Vec<String>,
}

fn default_output_path() -> String {
    "./output".to_string()
}

fn default_formats() -> Vec<String> {
    vec!["json".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            formats: default_formats(),
        }
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReconError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ReconError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("inputs.gtn", &self.inputs.gtn)?;
        validate_path("inputs.payrun", &self.inputs.payrun)?;
        validate_path("inputs.mapping", &self.inputs.mapping)?;
        validate_file_extension("inputs.mapping", &self.inputs.mapping, &["json"])?;
        if let Some(base_dir) = &self.inputs.base_dir {
            validate_path("inputs.base_dir", base_dir)?;
        }
        validate_path("report.output_path", &self.report.output_path)?;
        validate_report_formats("report.formats", &self.report.formats)?;
        parse_check_names("checks.enabled", &self.checks.enabled)?;
        self.layout.validate()
    }

    pub fn base_dir(&self) -> &str {
        self.inputs.base_dir.as_deref().unwrap_or(".")
    }
}

impl ConfigProvider for TomlConfig {
    fn run_name(&self) -> &str {
        &self.run.name
    }

    fn gtn_path(&self) -> &str {
        &self.inputs.gtn
    }

    fn payrun_path(&self) -> &str {
        &self.inputs.payrun
    }

    fn mapping_path(&self) -> &str {
        &self.inputs.mapping
    }

    fn output_path(&self) -> &str {
        &self.report.output_path
    }

    fn report_formats(&self) -> &[String] {
        &self.report.formats
    }

    fn enabled_checks(&self) -> Vec<CheckKind> {
        parse_check_names("checks.enabled", &self.checks.enabled).unwrap_or_else(|e| {
            tracing::warn!("{}; running all checks", e);
            CheckKind::ALL.to_vec()
        })
    }

    fn layout(&self) -> &LayoutConfig {
        &self.layout
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config() {
        let toml_content = r#"
[run]
name = "march-payroll"

[inputs]
gtn = "GTN.xlsx"
payrun = "Payrun.xlsx"
mapping = "mapping.json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.run_name(), "march-payroll");
        assert_eq!(config.base_dir(), ".");
        assert_eq!(config.layout, LayoutConfig::default());
        assert_eq!(config.report_formats(), &["json".to_string()]);
        assert_eq!(config.enabled_checks().len(), CheckKind::ALL.len());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[run]
name = "april"
description = "April close"

[inputs]
gtn = "GTN.xlsm"
payrun = "Payrun.xlsx"
mapping = "mapping.json"
base_dir = "/srv/payroll/april"

[layout]
gtn_leading_columns = 3
payrun_leading_columns = 20
identity_column = "Emp No"
gtn_identity_aliases = ["emp_no"]
sheet = "Export"

[checks]
enabled = ["employees_missing_gtn", "employees_missing_payrun"]

[report]
output_path = "./reports"
formats = ["json", "csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.base_dir(), "/srv/payroll/april");
        assert_eq!(config.layout.gtn_leading_columns, 3);
        assert_eq!(config.layout.sheet.as_deref(), Some("Export"));
        assert_eq!(config.layout.allowed_extensions.len(), 12);
        assert_eq!(
            config.enabled_checks(),
            vec![CheckKind::EmployeesMissingGtn, CheckKind::EmployeesMissingPayrun]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PAYSLIP_RECON_TEST_DIR", "/data/payroll");

        let toml_content = r#"
[run]
name = "env"

[inputs]
gtn = "GTN.xlsx"
payrun = "Payrun.xlsx"
mapping = "mapping.json"
base_dir = "${PAYSLIP_RECON_TEST_DIR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.base_dir(), "/data/payroll");

        std::env::remove_var("PAYSLIP_RECON_TEST_DIR");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[run]
name = "bad"

[inputs]
gtn = "GTN.xlsx"
payrun = "Payrun.xlsx"
mapping = "mapping.json"

[checks]
enabled = ["employees_missing", "blank_rows"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
        // Unvalidated callers still get every check, with a warning logged.
        assert_eq!(config.enabled_checks(), CheckKind::ALL.to_vec());
    }

    #[test]
    fn test_missing_inputs_section_fails_to_parse() {
        let result = TomlConfig::from_toml_str("[run]\nname = \"x\"\n");
        assert!(matches!(result, Err(ReconError::ConfigValidationError { .. })));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[run]
name = "file-test"

[inputs]
gtn = "GTN.xlsx"
payrun = "Payrun.xlsx"
mapping = "mapping.json"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.run.name, "file-test");
    }
}

pub mod cli;
pub mod layout;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use self::args::CliConfig;

#[cfg(feature = "cli")]
mod args {
    use crate::config::layout::LayoutConfig;
    use crate::core::ConfigProvider;
    use crate::domain::model::CheckKind;
    use crate::utils::error::Result;
    use crate::utils::validation::{
        parse_check_names, validate_file_extension, validate_path, validate_report_formats,
        Validate,
    };
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "payslip-recon")]
    #[command(about = "Reconcile a GTN payroll export against a payrun export")]
    pub struct CliConfig {
        /// GTN (gross-to-net) export
        #[arg(long, default_value = "GTN.xlsx")]
        pub gtn: String,

        /// Payrun export
        #[arg(long, default_value = "Payrun.xlsx")]
        pub payrun: String,

        /// Pay-element mapping document
        #[arg(long, default_value = "mapping.json")]
        pub mapping: String,

        /// Directory relative input paths are resolved against
        #[arg(long, default_value = ".")]
        pub base_dir: String,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        /// Report files to write (json, csv)
        #[arg(long, value_delimiter = ',', default_value = "json")]
        pub format: Vec<String>,

        /// Checks to run; all when omitted
        #[arg(long, value_delimiter = ',')]
        pub checks: Vec<String>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub log_json: bool,

        #[command(flatten)]
        pub layout: LayoutConfig,
    }

    impl ConfigProvider for CliConfig {
        fn run_name(&self) -> &str {
            "cli"
        }

        fn gtn_path(&self) -> &str {
            &self.gtn
        }

        fn payrun_path(&self) -> &str {
            &self.payrun
        }

        fn mapping_path(&self) -> &str {
            &self.mapping
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn report_formats(&self) -> &[String] {
            &self.format
        }

        fn enabled_checks(&self) -> Vec<CheckKind> {
            parse_check_names("checks", &self.checks).unwrap_or_else(|e| {
                tracing::warn!("{}; running all checks", e);
                CheckKind::ALL.to_vec()
            })
        }

        fn layout(&self) -> &LayoutConfig {
            &self.layout
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_path("gtn", &self.gtn)?;
            validate_path("payrun", &self.payrun)?;
            validate_path("mapping", &self.mapping)?;
            validate_file_extension("mapping", &self.mapping, &["json"])?;
            validate_path("output_path", &self.output_path)?;
            validate_report_formats("format", &self.format)?;
            parse_check_names("checks", &self.checks)?;
            self.layout.validate()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = CliConfig::parse_from(["payslip-recon"]);
            assert_eq!(config.gtn, "GTN.xlsx");
            assert_eq!(config.layout, LayoutConfig::default());
            assert_eq!(config.enabled_checks().len(), CheckKind::ALL.len());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_flags() {
            let config = CliConfig::parse_from([
                "payslip-recon",
                "--gtn",
                "march/GTN.xlsm",
                "--checks",
                "blank_rows,duplicate_headers",
                "--format",
                "json,csv",
                "--payrun-leading-columns",
                "20",
            ]);
            assert_eq!(config.gtn_path(), "march/GTN.xlsm");
            assert_eq!(
                config.enabled_checks(),
                vec![CheckKind::BlankRows, CheckKind::DuplicateHeaders]
            );
            assert_eq!(config.report_formats(), &["json".to_string(), "csv".to_string()]);
            assert_eq!(config.layout.payrun_leading_columns, 20);
        }

        #[test]
        fn test_unknown_check_name() {
            let config = CliConfig::parse_from(["payslip-recon", "--checks", "blank_rows,nope"]);
            assert!(config.validate().is_err());
            assert_eq!(config.enabled_checks(), CheckKind::ALL.to_vec());
        }

        #[test]
        fn test_rejects_non_json_mapping() {
            let config = CliConfig::parse_from(["payslip-recon", "--mapping", "mapping.yaml"]);
            assert!(config.validate().is_err());
        }
    }
}

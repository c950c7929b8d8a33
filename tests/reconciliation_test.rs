use anyhow::Result;
use payslip_recon::core::report::{CSV_REPORT, JSON_REPORT};
use payslip_recon::{
    CheckKind, Discrepancy, FilePipeline, LocalStorage, ReconRunner, ReconReport, TomlConfig,
};
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tempfile::TempDir;

const MAPPING: &str = r#"{
    "mappings": {
        "SAL": {"vendor": "Salary"},
        "OT": {"vendor": "Overtime"},
        "Backpay": {"vendor": "Backpay"}
    },
    "not_used": [{"vendor": "Employer NI"}]
}"#;

/// GTN sheet: four metadata columns, five pay elements, a separator break at
/// sheet row 4 and a text value in the Overtime column.
fn write_gtn(path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    let header = [
        "employee_id",
        "Name",
        "Department",
        "Period",
        "Salary",
        "Overtime",
        "Backpay",
        "Bonus2024",
        "Employer NI",
    ];
    for (col, name) in header.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }

    // Sheet row 3 (0-based) is left empty.
    let employees: [(u32, f64, &str); 3] = [(1, 1.0, "Ann"), (2, 2.0, "Bob"), (4, 4.0, "Cy")];
    for (row, id, name) in employees {
        sheet.write_number(row, 0, id)?;
        sheet.write_string(row, 1, name)?;
        sheet.write_string(row, 2, "Ops")?;
        sheet.write_string(row, 3, "2024-03")?;
        sheet.write_number(row, 4, 2500.0)?;
        sheet.write_number(row, 6, 0.0)?;
        sheet.write_number(row, 7, 100.0)?;
        sheet.write_number(row, 8, 230.5)?;
    }
    sheet.write_number(1, 5, 10.0)?;
    sheet.write_number(2, 5, 12.5)?;
    sheet.write_string(4, 5, "N/A")?;

    workbook.save(path)?;
    Ok(())
}

/// Payrun sheet: 25 metadata columns with the identity at column C, a label
/// row whose merged cell left a blank under "OT", and a closing totals row.
fn write_payrun(path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for col in 0..25u16 {
        let name = if col == 2 {
            "Employee ID".to_string()
        } else {
            format!("Field {}", col)
        };
        sheet.write_string(0, col, name)?;
    }
    sheet.write_string(0, 25, "1")?;
    sheet.write_string(0, 26, "OT")?;
    sheet.write_string(0, 27, "3")?;

    sheet.write_string(1, 25, "SAL")?;
    sheet.write_string(1, 27, "PENSION")?;

    for (row, id) in [(2u32, 1.0), (3, 2.0), (4, 3.0)] {
        sheet.write_number(row, 2, id)?;
        sheet.write_number(row, 25, 2500.0)?;
        sheet.write_number(row, 26, 11.0)?;
        sheet.write_number(row, 27, 50.0)?;
    }
    sheet.write_string(5, 2, "Total")?;
    sheet.write_number(5, 25, 7500.0)?;

    workbook.save(path)?;
    Ok(())
}

fn run_file(dir: &Path, extra: &str) -> String {
    let base = dir.to_str().unwrap().replace('\\', "/");
    format!(
        r#"
[run]
name = "march-close"

[inputs]
gtn = "GTN.xlsx"
payrun = "Payrun.xlsx"
mapping = "mapping.json"
base_dir = "{base}"

[report]
output_path = "{base}/output"
formats = ["json", "csv"]
{extra}
"#
    )
}

async fn reconcile(config: TomlConfig) -> Result<ReconReport> {
    let storage = LocalStorage::new(config.base_dir().to_string());
    let runner = ReconRunner::new(FilePipeline::new(storage, config));
    Ok(runner.run().await?)
}

fn elements(names: &[&str]) -> Vec<Discrepancy> {
    names
        .iter()
        .map(|n| Discrepancy::PayElement(n.to_string()))
        .collect()
}

#[tokio::test]
async fn test_workbooks_with_known_defects() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_gtn(&temp_dir.path().join("GTN.xlsx"))?;
    write_payrun(&temp_dir.path().join("Payrun.xlsx"))?;
    std::fs::write(temp_dir.path().join("mapping.json"), MAPPING)?;

    let config = TomlConfig::from_toml_str(&run_file(temp_dir.path(), ""))?;
    let report = reconcile(config).await?;

    let found = |kind: CheckKind| report.outcome(kind).unwrap().discrepancies().to_vec();

    assert!(report.outcome(CheckKind::FileType).unwrap().passed());
    assert_eq!(found(CheckKind::BlankRows), vec![Discrepancy::Row(4)]);
    assert!(report.outcome(CheckKind::DuplicateHeaders).unwrap().passed());
    assert_eq!(found(CheckKind::EmployeesMissingGtn), vec![Discrepancy::EmployeeId(3)]);
    assert_eq!(found(CheckKind::EmployeesMissingPayrun), vec![Discrepancy::EmployeeId(4)]);
    assert_eq!(found(CheckKind::ElementsMissingPayrun), elements(&["Backpay"]));
    assert_eq!(found(CheckKind::ElementsUnmappedGtn), elements(&["Bonus2024"]));
    assert!(report.outcome(CheckKind::ElementsMissingGtn).unwrap().passed());
    assert_eq!(found(CheckKind::ElementsUnmappedPayrun), elements(&["PENSION"]));
    assert_eq!(found(CheckKind::NonNumericGtn), elements(&["Overtime"]));
    assert_eq!(report.exit_code(), 1);

    let output = temp_dir.path().join("output");
    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(output.join(JSON_REPORT))?)?;
    assert_eq!(json["run_name"], "march-close");
    assert_eq!(json["outcomes"].as_array().unwrap().len(), 10);

    let csv = std::fs::read_to_string(output.join(CSV_REPORT))?;
    assert!(csv.contains("elements_unmapped_payrun,FAIL,PENSION"));

    Ok(())
}

#[tokio::test]
async fn test_consistent_csv_exports_pass() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("GTN.csv"),
        "employee_id,Name,Department,Period,Salary,Overtime\n\
         1,Ann,Ops,2024-03,2500,10\n\
         2,Bob,Ops,2024-03,2600,\n",
    )?;

    let leading: Vec<String> = (0..25)
        .map(|i| {
            if i == 0 {
                "Employee ID".to_string()
            } else {
                format!("F{}", i)
            }
        })
        .collect();
    let pad = ",".repeat(24);
    let payrun = format!(
        "{},SAL,OT\n{},,\n1{},2500,10\n2{},2600,0\nTotal{},5100,10\n",
        leading.join(","),
        pad,
        pad,
        pad,
        pad
    );
    std::fs::write(temp_dir.path().join("Payrun.csv"), payrun)?;
    std::fs::write(
        temp_dir.path().join("mapping.json"),
        r#"{"mappings": {"SAL": {"vendor": "Salary"}, "OT": {"vendor": "Overtime"}}, "not_used": []}"#,
    )?;

    let toml = run_file(temp_dir.path(), "\n[layout]\nallowed_extensions = [\".csv\"]\n")
        .replace("GTN.xlsx", "GTN.csv")
        .replace("Payrun.xlsx", "Payrun.csv");
    let config = TomlConfig::from_toml_str(&toml)?;
    let report = reconcile(config).await?;

    let failing: Vec<_> = report
        .outcomes
        .iter()
        .filter(|o| !o.passed())
        .collect();
    assert!(failing.is_empty(), "unexpected failures: {:?}", failing);
    assert_eq!(report.exit_code(), 0);
    Ok(())
}

#[tokio::test]
async fn test_unreadable_gtn_keeps_other_checks_running() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("GTN.xlsx"), b"this is not a workbook")?;
    write_payrun(&temp_dir.path().join("Payrun.xlsx"))?;
    std::fs::write(temp_dir.path().join("mapping.json"), MAPPING)?;

    let config = TomlConfig::from_toml_str(&run_file(temp_dir.path(), ""))?;
    let report = reconcile(config).await?;

    assert!(report.outcome(CheckKind::FileType).unwrap().passed());
    for kind in [
        CheckKind::BlankRows,
        CheckKind::EmployeesMissingGtn,
        CheckKind::ElementsUnmappedGtn,
        CheckKind::NonNumericGtn,
    ] {
        assert_eq!(report.outcome(kind).unwrap().status_label(), "ERROR");
    }
    Ok(())
}

#[tokio::test]
async fn test_broken_mapping_aborts_the_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_gtn(&temp_dir.path().join("GTN.xlsx"))?;
    write_payrun(&temp_dir.path().join("Payrun.xlsx"))?;
    std::fs::write(temp_dir.path().join("mapping.json"), r#"{"mappings": {}}"#)?;

    let config = TomlConfig::from_toml_str(&run_file(temp_dir.path(), ""))?;
    let result = reconcile(config).await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("not_used"));
    Ok(())
}

#[tokio::test]
async fn test_selected_checks_only() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_gtn(&temp_dir.path().join("GTN.xlsx"))?;
    write_payrun(&temp_dir.path().join("Payrun.xlsx"))?;
    std::fs::write(temp_dir.path().join("mapping.json"), MAPPING)?;

    let toml = run_file(
        temp_dir.path(),
        "\n[checks]\nenabled = [\"employees_missing_gtn\", \"employees_missing_payrun\"]\n",
    );
    let report = reconcile(TomlConfig::from_toml_str(&toml)?).await?;

    let kinds: Vec<CheckKind> = report.outcomes.iter().map(|o| o.check).collect();
    assert_eq!(
        kinds,
        vec![CheckKind::EmployeesMissingGtn, CheckKind::EmployeesMissingPayrun]
    );
    Ok(())
}

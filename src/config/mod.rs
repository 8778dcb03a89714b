pub mod local;
pub mod plan;

use crate::core::ConfigProvider;
use crate::domain::model::SplitSpec;
use crate::utils::error::{Result, SplitError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_unique_keys, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "csv-splitter")]
#[command(about = "Split a CSV file into named groups with per-group row quotas")]
pub struct CliConfig {
    /// Input CSV file
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Split group, repeatable; quota omitted or 0 means "share the leftovers"
    #[arg(long = "split", value_name = "NAME:LABEL[:QUOTA]", value_parser = parse_split_arg)]
    pub splits: Vec<SplitSpec>,

    /// TOML plan file replacing the flags above
    #[arg(
        long,
        conflicts_with_all = ["input", "splits", "output_path", "archive", "report"]
    )]
    pub plan: Option<String>,

    /// Bundle all group files into one zip archive with this name
    #[arg(long)]
    pub archive: Option<String>,

    /// Write a split_report.json next to the group files
    #[arg(long)]
    pub report: bool,

    /// Validate and show the plan without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,
}

fn parse_split_arg(raw: &str) -> std::result::Result<SplitSpec, String> {
    let mut parts = raw.splitn(3, ':');
    let name = parts.next().unwrap_or("").trim();
    let label = parts.next().map(str::trim).unwrap_or("");

    if name.is_empty() || label.is_empty() {
        return Err(format!("expected NAME:LABEL[:QUOTA], got '{}'", raw));
    }

    let quota = match parts.next().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(value.parse::<usize>().map_err(|_| {
            format!("quota must be a non-negative integer, got '{}'", value)
        })?),
    };

    Ok(SplitSpec {
        name: name.to_string(),
        label: label.to_string(),
        quota,
    })
}

pub(crate) fn validate_split_specs(field_name: &str, specs: &[SplitSpec]) -> Result<()> {
    if specs.is_empty() {
        return Err(SplitError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    for (index, spec) in specs.iter().enumerate() {
        validate_non_empty_string(&format!("{}[{}].name", field_name, index), &spec.name)?;
        validate_non_empty_string(&format!("{}[{}].label", field_name, index), &spec.label)?;
    }

    let keys: Vec<String> = specs.iter().map(SplitSpec::group_key).collect();
    validate_unique_keys(field_name, &keys)
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        self.input.as_deref().unwrap_or("")
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn splits(&self) -> &[SplitSpec] {
        &self.splits
    }

    fn archive_name(&self) -> Option<&str> {
        self.archive.as_deref()
    }

    fn write_report(&self) -> bool {
        self.report
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", self.input.as_deref().unwrap_or(""))?;
        validate_path("output_path", &self.output_path)?;
        validate_split_specs("split", &self.splits)
    }
}

use crate::core::ConfigProvider;
use crate::domain::model::SplitSpec;
use crate::utils::error::{Result, SplitError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitPlan {
    pub plan: PlanMeta,
    pub input: InputConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub split: Vec<SplitSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMeta {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub report: Option<bool>,
    pub archive: Option<String>,
}

impl SplitPlan {
    /// 從 TOML 檔案載入分組計畫
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SplitError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析分組計畫
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SplitError::ConfigValidationError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${LIST_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        // 使用正規表達式匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證分組計畫的合理性
    pub fn validate_plan(&self) -> Result<()> {
        crate::utils::validation::validate_non_empty_string("plan.name", &self.plan.name)?;
        crate::utils::validation::validate_path("input.path", &self.input.path)?;
        crate::utils::validation::validate_path("output.path", &self.output.path)?;
        crate::config::validate_split_specs("split", &self.split)
    }

    pub fn report_enabled(&self) -> bool {
        self.output.report.unwrap_or(false)
    }
}

impl ConfigProvider for SplitPlan {
    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn splits(&self) -> &[SplitSpec] {
        &self.split
    }

    fn archive_name(&self) -> Option<&str> {
        self.output.archive.as_deref()
    }

    fn write_report(&self) -> bool {
        self.report_enabled()
    }
}

impl Validate for SplitPlan {
    fn validate(&self) -> Result<()> {
        self.validate_plan()
    }
}

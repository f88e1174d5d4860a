// ==========================================
// 商品表格导入器 - 运行配置
// ==========================================
// 职责: 默认值 + 环境变量覆写
// 环境变量:
// - PRODUCT_IMPORTER_DB_PATH
// - PRODUCT_IMPORTER_API_BASE_URL
// - PRODUCT_IMPORTER_SHEETS_BASE_URL
// - PRODUCT_IMPORTER_POLL_INTERVAL_MS
// - PRODUCT_IMPORTER_HTTP_TIMEOUT_SECS
// - PRODUCT_IMPORTER_INVALID_NUMBER_POLICY (reject | omit)
// - PRODUCT_IMPORTER_RULE_PROFILE (standard | presence)
// 注意: 单次导入 1000 条上限为常量，不可配置
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::InvalidNumberPolicy;
use crate::importer::record_validator::RuleProfile;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "PRODUCT_IMPORTER_DB_PATH";
pub const ENV_API_BASE_URL: &str = "PRODUCT_IMPORTER_API_BASE_URL";
pub const ENV_SHEETS_BASE_URL: &str = "PRODUCT_IMPORTER_SHEETS_BASE_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "PRODUCT_IMPORTER_POLL_INTERVAL_MS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "PRODUCT_IMPORTER_HTTP_TIMEOUT_SECS";
pub const ENV_INVALID_NUMBER_POLICY: &str = "PRODUCT_IMPORTER_INVALID_NUMBER_POLICY";
pub const ENV_RULE_PROFILE: &str = "PRODUCT_IMPORTER_RULE_PROFILE";

pub const DEFAULT_API_BASE_URL: &str = "https://app.quotiza.com";
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImporterConfig {
    pub db_path: String,
    pub api_base_url: String,
    pub sheets_base_url: String,
    pub poll_interval_ms: u64,
    pub http_timeout_secs: u64,
    pub invalid_number_policy: InvalidNumberPolicy,
    pub rule_profile: RuleProfile,
}

impl ImporterConfig {
    /// 指定数据库路径，其余取默认值
    pub fn with_db_path(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            sheets_base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            invalid_number_policy: InvalidNumberPolicy::default(),
            rule_profile: RuleProfile::default(),
        }
    }

    /// 默认值 + 进程环境变量
    pub fn from_env() -> ImportResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 默认值 + 任意键值来源（测试中避免改动进程环境）
    ///
    /// 数据库路径只来自 lookup；缺省时才解析用户数据目录
    pub fn from_lookup<F>(lookup: F) -> ImportResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db_path = read(ENV_DB_PATH).unwrap_or_else(get_default_db_path);
        let mut config = Self::with_db_path(db_path);
        if let Some(url) = read(ENV_API_BASE_URL) {
            config.api_base_url = url;
        }
        if let Some(url) = read(ENV_SHEETS_BASE_URL) {
            config.sheets_base_url = url;
        }
        if let Some(raw) = read(ENV_POLL_INTERVAL_MS) {
            config.poll_interval_ms = parse_positive(ENV_POLL_INTERVAL_MS, &raw)?;
        }
        if let Some(raw) = read(ENV_HTTP_TIMEOUT_SECS) {
            config.http_timeout_secs = parse_positive(ENV_HTTP_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = read(ENV_INVALID_NUMBER_POLICY) {
            config.invalid_number_policy = InvalidNumberPolicy::from_str(&raw)?;
        }
        if let Some(raw) = read(ENV_RULE_PROFILE) {
            config.rule_profile = RuleProfile::from_str(&raw)?;
        }
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_positive(key: &str, raw: &str) -> ImportResult<u64> {
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ImportError::ConfigValueError {
            key: key.to_string(),
            value: raw.to_string(),
            message: "expected a positive integer".to_string(),
        }),
    }
}

pub const DB_FILE_NAME: &str = "product_sheet_importer.db";

/// 获取默认数据库路径（PRODUCT_IMPORTER_DB_PATH 未设置时使用）
///
/// 优先级: 用户数据目录 > 当前目录；只计算路径，目录由打开数据库时创建
pub fn get_default_db_path() -> String {
    let path = match dirs::data_dir() {
        Some(data_dir) => data_dir.join("product-sheet-importer").join(DB_FILE_NAME),
        None => PathBuf::from(".").join(DB_FILE_NAME),
    };
    path.to_string_lossy().to_string()
}

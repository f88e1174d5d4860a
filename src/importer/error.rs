// ==========================================
// 商品表格导入器 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 配置 / 校验 / 鉴权 / 网络 / 任务失败 / 数据源 / 存储
// 边界: 全部错误在编排器 / 命令行边界转换为用户可见的状态消息
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 配置错误（处理前阻断）=====
    #[error("SKU, Name and Brand columns are required (unmapped: {fields})")]
    RequiredColumnsUnmapped { fields: String },

    #[error("Invalid column \"{0}\": expected a single letter A-Z")]
    InvalidColumnDesignator(String),

    #[error("Invalid configuration value (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    #[error("Please enter both API Token and Account ID")]
    MissingCredentials,

    #[error("Not logged in: run `login` first")]
    NotLoggedIn,

    #[error("No column mapping saved for spreadsheet {0}: run `map` first")]
    MappingNotFound(String),

    // ===== 校验错误（阻断提交）=====
    #[error("Please fix validation errors before importing ({count} errors)")]
    ValidationFailed { count: usize },

    // ===== 数据源错误 =====
    #[error("No data found in spreadsheet")]
    NoData,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file format: {0} (only .csv/.xlsx/.xls)")]
    UnsupportedFormat(String),

    #[error("Failed to read file: {0}")]
    FileReadError(String),

    #[error("Failed to parse Excel workbook: {0}")]
    ExcelParseError(String),

    #[error("Failed to parse CSV: {0}")]
    CsvParseError(String),

    #[error("Invalid Google Sheets URL: {0}")]
    InvalidSpreadsheetUrl(String),

    // ===== 鉴权错误（原样展示，不重试）=====
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    // ===== 网络错误（可手动重试）=====
    #[error("Network error: {0}")]
    Network(String),

    #[error("Import failed: {0}")]
    SubmissionRejected(String),

    #[error("Unexpected response from service: {0}")]
    InvalidResponse(String),

    // ===== 远端任务错误 =====
    #[error("Import job {job_id} failed: {detail}")]
    JobFailed { job_id: String, detail: String },

    #[error("Status polling for job {0} was cancelled")]
    PollCancelled(String),

    // ===== 流程错误 =====
    #[error("Invalid import state transition: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ===== 存储错误 =====
    #[error(transparent)]
    Storage(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// 错误分类（决定展示与重试策略）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Validation,
    Auth,
    Network,
    JobFailure,
    Source,
    Storage,
    Internal,
}

impl ImportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::RequiredColumnsUnmapped { .. }
            | ImportError::InvalidColumnDesignator(_)
            | ImportError::ConfigValueError { .. }
            | ImportError::MissingCredentials
            | ImportError::NotLoggedIn
            | ImportError::MappingNotFound(_) => ErrorKind::Configuration,

            ImportError::ValidationFailed { .. } => ErrorKind::Validation,

            ImportError::NoData
            | ImportError::FileNotFound(_)
            | ImportError::UnsupportedFormat(_)
            | ImportError::FileReadError(_)
            | ImportError::ExcelParseError(_)
            | ImportError::CsvParseError(_)
            | ImportError::InvalidSpreadsheetUrl(_) => ErrorKind::Source,

            ImportError::AuthFailed(_) | ImportError::PermissionDenied(_) => ErrorKind::Auth,

            ImportError::Network(_)
            | ImportError::SubmissionRejected(_)
            | ImportError::InvalidResponse(_)
            | ImportError::PollCancelled(_) => ErrorKind::Network,

            ImportError::JobFailed { .. } => ErrorKind::JobFailure,

            ImportError::Storage(_) => ErrorKind::Storage,

            ImportError::InvalidStateTransition { .. }
            | ImportError::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// 网络类错误允许用户手动重试（用户主动取消的轮询除外）
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Network && !matches!(self, ImportError::PollCancelled(_))
    }

    /// 用户可见的状态消息
    pub fn user_message(&self) -> String {
        match self.kind() {
            // 鉴权 / 任务失败原样展示
            ErrorKind::Auth
            | ErrorKind::JobFailure
            | ErrorKind::Configuration
            | ErrorKind::Network
            | ErrorKind::Validation => self.to_string(),
            ErrorKind::Source => format!("Could not read spreadsheet data: {}", self),
            ErrorKind::Storage | ErrorKind::Internal => format!("Import failed: {}", self),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl From<reqwest::Error> for ImportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ImportError::InvalidResponse(err.to_string())
        } else {
            ImportError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::InvalidResponse(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

// ==========================================
// 商品表格导入器 - 远端导入任务 / 导入历史
// ==========================================
// 职责: 提交回执、任务状态、历史记录
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 提交回执
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTicket {
    #[serde(alias = "jobId", alias = "id")]
    pub job_id: String,
}

/// 远端任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    /// completed / failed 为终态，轮询到此停止
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }
}

/// 任务状态报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusReport {
    pub status: JobState,
    #[serde(default)]
    pub successes: u64,
    #[serde(default)]
    pub failures: u64,
    #[serde(default)]
    pub errors: Vec<String>,
}

// ==========================================
// ImportHistoryEntry - 导入历史
// ==========================================
// 只保留最近 HISTORY_LIMIT 条，最新在前
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportHistoryEntry {
    pub entry_id: String,
    pub imported_at: DateTime<Utc>,
    pub total_products: usize,
    pub spreadsheet_id: String,
    pub spreadsheet_name: Option<String>,
    pub job_id: Option<String>,
    pub status: JobState,
}

// ==========================================
// 商品表格导入器 - 领域层
// ==========================================
// 职责: 列映射、商品记录、校验结果、会话、远端任务
// ==========================================

pub mod job;
pub mod mapping;
pub mod product;
pub mod session;
pub mod validation;

// 重导出核心类型
pub use job::{ImportHistoryEntry, JobState, JobStatusReport, JobTicket};
pub use mapping::{ColumnDesignator, ColumnMapping, LogicalField, COLUMN_LETTERS, MAX_SHEET_COLUMNS};
pub use product::{CandidateRecord, NumericCell, ProductRecord, TabularRow};
pub use session::Session;
pub use validation::{ImportSummary, Severity, ValidatedBatch, ValidationError};

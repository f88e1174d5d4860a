// ==========================================
// 商品表格导入器 - 核心库
// ==========================================
// 职责: 表格列映射 → 行校验 → 批量提交 → 任务状态轮询
// 技术栈: Rust + tokio + reqwest + SQLite
// 红线: 存在任一校验错误的批次整批不可提交
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 映射 / 校验 / 编排
pub mod importer;

// 客户端层 - 导入服务 / Google Sheets / 轮询
pub mod client;

// 数据仓储层 - 本地存储
pub mod repository;

// 配置层
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 应用层
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    ColumnDesignator, ColumnMapping, ImportHistoryEntry, ImportSummary, JobState,
    JobStatusReport, JobTicket, LogicalField, ProductRecord, Session, ValidatedBatch,
    ValidationError,
};

pub use importer::{
    BatchAssembler, ErrorKind, ImportError, ImportOrchestrator, ImportPhase, ImportResult,
    InvalidNumberPolicy, PreparedImport, RowSource, SheetRef, ValidationRules,
};

pub use client::{JobPoller, PollHandle, SubmissionService};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "商品表格导入器";

/// 单次导入商品上限（不可配置）
pub const MAX_PRODUCTS_PER_IMPORT: usize = 1000;

/// 导入历史保留条数
pub const HISTORY_LIMIT: usize = 10;

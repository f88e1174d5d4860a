// ==========================================
// 商品表格导入器 - 导入层
// ==========================================
// 职责: 表格行 → 列映射 → 候选记录 → 校验批次 → 提交
// 流程: 列解析 → 行映射 → 记录校验 → 批次组装 → 编排（确认/提交）
// 支持: CSV, Excel, Google Sheets（见 client 层）
// ==========================================

// 模块声明
pub mod batch_assembler;
pub mod column_resolver;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod import_orchestrator;
pub mod record_validator;
pub mod row_source;

// 重导出核心类型
pub use batch_assembler::BatchAssembler;
pub use column_resolver::{column_offset, inspect_headers, resolve_column, suggest_mapping, ColumnHeader};
pub use data_cleaner::DataCleaner;
pub use error::{ErrorKind, ImportError, ImportResult};
pub use field_mapper::{FieldMapper, InvalidNumberPolicy};
pub use import_orchestrator::{ImportOrchestrator, ImportPhase, PreparedImport};
pub use record_validator::{RecordValidator, RuleProfile, ValidationRules};
pub use row_source::{FileRowSource, RowSource, SheetRef};

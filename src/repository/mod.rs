// ==========================================
// 商品表格导入器 - 数据仓储层
// ==========================================
// 职责: SQLite 本地存储（会话 / 列映射 / 导入历史）
// ==========================================

pub mod error;
pub mod import_store;
pub mod kv_store;

pub use error::{RepositoryError, RepositoryResult};
pub use import_store::ImportStore;
pub use kv_store::{KvScope, KvStore};

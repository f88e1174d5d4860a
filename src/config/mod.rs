// ==========================================
// 商品表格导入器 - 配置层
// ==========================================
// 职责: 运行配置（默认值 + 环境变量覆写）
// ==========================================

pub mod importer_config;

pub use importer_config::{get_default_db_path, ImporterConfig};

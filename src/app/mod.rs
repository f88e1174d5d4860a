// ==========================================
// 商品表格导入器 - 应用层
// ==========================================
// 职责: 组装配置、存储与服务客户端，供命令行使用
// ==========================================

pub mod state;

// 重导出
pub use state::AppState;

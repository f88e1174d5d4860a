// ==========================================
// 商品表格导入器 - 外部服务客户端
// ==========================================
// 职责: 导入服务（提交 / 状态查询）、Google Sheets 数据源、任务轮询
// ==========================================

pub mod job_poller;
pub mod sheets_client;
pub mod submission_client;

pub use job_poller::{JobPoller, PollCanceller, PollHandle, PollState};
pub use sheets_client::{spreadsheet_id_from_url, GoogleSheetsSource};
pub use submission_client::{HttpSubmissionClient, SubmissionService};

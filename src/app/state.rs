// ==========================================
// 商品表格导入器 - 应用状态
// ==========================================
// 职责: 配置 + 本地存储；会话 / 映射 / 历史的应用级操作
// 约束: 会话显式传递，不存在进程级可变凭据
// ==========================================

use crate::client::{HttpSubmissionClient, JobPoller, SubmissionService};
use crate::config::ImporterConfig;
use crate::domain::job::{ImportHistoryEntry, JobState, JobTicket};
use crate::domain::mapping::ColumnMapping;
use crate::domain::session::Session;
use crate::importer::batch_assembler::BatchAssembler;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::import_orchestrator::ImportOrchestrator;
use crate::importer::row_source::SheetRef;
use crate::repository::{ImportStore, KvStore};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// 应用状态
pub struct AppState {
    pub config: ImporterConfig,
    pub store: ImportStore,
}

impl AppState {
    /// 打开配置中的数据库
    pub fn new(config: ImporterConfig) -> ImportResult<Self> {
        let kv = KvStore::new(&config.db_path)?;
        info!(db_path = %config.db_path, "本地存储已打开");
        Ok(Self::with_store(config, ImportStore::new(kv)))
    }

    pub fn with_store(config: ImporterConfig, store: ImportStore) -> Self {
        Self { config, store }
    }

    // ===== 会话 =====

    /// 登录（两项必填，TRIM 后保存）
    pub fn login(&self, account_id: &str, api_token: &str) -> ImportResult<Session> {
        let session = Session::new(account_id, api_token)?;
        self.store.save_session(&session)?;
        Ok(session)
    }

    /// 登出：清除凭据与全部列映射，历史保留
    pub fn logout(&self) -> ImportResult<()> {
        self.store.logout()?;
        Ok(())
    }

    pub fn require_session(&self) -> ImportResult<Session> {
        self.store.load_session()?.ok_or(ImportError::NotLoggedIn)
    }

    // ===== 列映射 =====

    pub fn save_mapping(&self, spreadsheet_id: &str, mapping: &ColumnMapping) -> ImportResult<()> {
        self.store.save_mapping(spreadsheet_id, mapping)?;
        Ok(())
    }

    pub fn require_mapping(&self, spreadsheet_id: &str) -> ImportResult<ColumnMapping> {
        self.store
            .load_mapping(spreadsheet_id)?
            .ok_or_else(|| ImportError::MappingNotFound(spreadsheet_id.to_string()))
    }

    // ===== 组件装配 =====

    pub fn submission_service(&self) -> ImportResult<Arc<dyn SubmissionService>> {
        let client = HttpSubmissionClient::new(&self.config.api_base_url, self.config.http_timeout())?;
        Ok(Arc::new(client))
    }

    pub fn orchestrator(&self, session: Session, submission: Arc<dyn SubmissionService>) -> ImportOrchestrator {
        ImportOrchestrator::new(session, BatchAssembler::from_config(&self.config), submission)
    }

    pub fn poller(&self, submission: Arc<dyn SubmissionService>) -> JobPoller {
        JobPoller::new(submission, self.config.poll_interval())
    }

    // ===== 历史 =====

    /// 记录一次已提交的导入（状态 queued，轮询结束后更新）
    pub fn record_submission(
        &self,
        sheet: &SheetRef,
        spreadsheet_name: Option<String>,
        total_products: usize,
        ticket: &JobTicket,
    ) -> ImportResult<ImportHistoryEntry> {
        let entry = ImportHistoryEntry {
            entry_id: Uuid::new_v4().to_string(),
            imported_at: Utc::now(),
            total_products,
            spreadsheet_id: sheet.spreadsheet_id.clone(),
            spreadsheet_name,
            job_id: Some(ticket.job_id.clone()),
            status: JobState::Queued,
        };
        self.store.append_history(entry.clone())?;
        Ok(entry)
    }

    pub fn update_job_status(&self, job_id: &str, status: JobState) -> ImportResult<bool> {
        Ok(self.store.update_history_status(job_id, status)?)
    }
}

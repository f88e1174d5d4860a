// ==========================================
// 商品表格导入器 - 导入状态持久化
// ==========================================
// 职责: 会话凭据 / 按表格保存的列映射 / 导入历史
// 存储: KvStore（值为 JSON）
// 约定:
// - credentials/session          → Session
// - column_mapping/{spreadsheet} → ColumnMapping
// - history/entries              → Vec<ImportHistoryEntry>（最新在前，最多 HISTORY_LIMIT 条）
// - 登出: 清除凭据与全部映射，保留历史
// ==========================================

use crate::domain::job::{ImportHistoryEntry, JobState};
use crate::domain::mapping::ColumnMapping;
use crate::domain::session::Session;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::kv_store::{KvScope, KvStore};
use crate::HISTORY_LIMIT;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

const SESSION_KEY: &str = "session";
const HISTORY_KEY: &str = "entries";

#[derive(Clone)]
pub struct ImportStore {
    kv: KvStore,
}

impl ImportStore {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    fn read_json<T: DeserializeOwned>(&self, scope: KvScope, key: &str) -> RepositoryResult<Option<T>> {
        match self.kv.get(scope, key)? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| RepositoryError::CorruptValue {
                    scope: scope.to_string(),
                    key: key.to_string(),
                    message: e.to_string(),
                }),
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, scope: KvScope, key: &str, value: &T) -> RepositoryResult<()> {
        let raw = serde_json::to_string(value)?;
        self.kv.set(scope, key, &raw)
    }

    // ===== 会话 =====

    pub fn save_session(&self, session: &Session) -> RepositoryResult<()> {
        self.write_json(KvScope::Credentials, SESSION_KEY, session)?;
        info!(account_id = %session.account_id, "会话已保存");
        Ok(())
    }

    pub fn load_session(&self) -> RepositoryResult<Option<Session>> {
        self.read_json(KvScope::Credentials, SESSION_KEY)
    }

    pub fn clear_session(&self) -> RepositoryResult<()> {
        self.kv.remove_scope(KvScope::Credentials)?;
        Ok(())
    }

    // ===== 列映射 =====

    /// 保存表格的列映射（覆盖旧值）
    pub fn save_mapping(&self, spreadsheet_id: &str, mapping: &ColumnMapping) -> RepositoryResult<()> {
        self.write_json(KvScope::ColumnMapping, spreadsheet_id, mapping)?;
        debug!(spreadsheet_id, fields = mapping.mapped_fields().count(), "列映射已保存");
        Ok(())
    }

    /// 读取表格的列映射（未保存过则 None）
    pub fn load_mapping(&self, spreadsheet_id: &str) -> RepositoryResult<Option<ColumnMapping>> {
        self.read_json(KvScope::ColumnMapping, spreadsheet_id)
    }

    pub fn clear_mappings(&self) -> RepositoryResult<usize> {
        self.kv.remove_scope(KvScope::ColumnMapping)
    }

    // ===== 导入历史 =====

    /// 最近的导入（最新在前）
    pub fn list_history(&self) -> RepositoryResult<Vec<ImportHistoryEntry>> {
        Ok(self.read_json(KvScope::History, HISTORY_KEY)?.unwrap_or_default())
    }

    /// 追加一条历史（插入到最前，超出上限的旧记录被丢弃）
    pub fn append_history(&self, entry: ImportHistoryEntry) -> RepositoryResult<()> {
        let mut history = self.list_history()?;
        history.insert(0, entry);
        history.truncate(HISTORY_LIMIT);
        self.write_json(KvScope::History, HISTORY_KEY, &history)
    }

    /// 按 job_id 更新历史状态，返回是否找到
    pub fn update_history_status(&self, job_id: &str, status: JobState) -> RepositoryResult<bool> {
        let mut history = self.list_history()?;
        let mut found = false;
        for entry in history.iter_mut().filter(|e| e.job_id.as_deref() == Some(job_id)) {
            entry.status = status;
            found = true;
        }
        if found {
            self.write_json(KvScope::History, HISTORY_KEY, &history)?;
        }
        Ok(found)
    }

    // ===== 登出 =====

    /// 清除凭据与全部列映射（历史保留）
    pub fn logout(&self) -> RepositoryResult<()> {
        self.clear_session()?;
        let removed = self.clear_mappings()?;
        info!(mappings_removed = removed, "已登出");
        Ok(())
    }
}

// ==========================================
// 商品表格导入器 - 本地键值存储
// ==========================================
// 存储: kv_store 表 (scope + key → JSON 文本)
// 作用域: credentials / column_mapping / history
// ==========================================

use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// 存储作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvScope {
    Credentials,
    ColumnMapping,
    History,
}

impl KvScope {
    pub fn as_str(self) -> &'static str {
        match self {
            KvScope::Credentials => "credentials",
            KvScope::ColumnMapping => "column_mapping",
            KvScope::History => "history",
        }
    }
}

impl fmt::Display for KvScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// KvStore - 键值存储
// ==========================================
#[derive(Clone)]
pub struct KvStore {
    conn: Arc<Mutex<Connection>>,
}

impl KvStore {
    /// 打开数据库文件（自动创建上级目录并建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        if let Some(dir) = Path::new(db_path).parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| RepositoryError::DatabaseConnectionError(format!("{}: {}", dir.display(), e)))?;
        }
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 内存数据库（测试 / 临时会话）
    pub fn in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        configure_sqlite_connection(&conn)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn get(&self, scope: KvScope, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE scope = ?1 AND key = ?2",
                params![scope.as_str(), key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入（存在则覆盖）
    pub fn set(&self, scope: KvScope, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO kv_store (scope, key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(scope, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![scope.as_str(), key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// 删除单个键，返回是否存在
    pub fn remove(&self, scope: KvScope, key: &str) -> RepositoryResult<bool> {
        let conn = self.lock()?;
        let affected = conn.execute(
            "DELETE FROM kv_store WHERE scope = ?1 AND key = ?2",
            params![scope.as_str(), key],
        )?;
        Ok(affected > 0)
    }

    /// 清空整个作用域，返回删除条数
    pub fn remove_scope(&self, scope: KvScope) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let affected = conn.execute("DELETE FROM kv_store WHERE scope = ?1", params![scope.as_str()])?;
        Ok(affected)
    }

}

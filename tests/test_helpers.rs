// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、测试表格、Mock 数据源 / 导入服务
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use product_sheet_importer::client::SubmissionService;
use product_sheet_importer::domain::{
    ColumnDesignator, ColumnMapping, JobState, JobStatusReport, JobTicket, LogicalField,
    ProductRecord, Session, TabularRow,
};
use product_sheet_importer::importer::{ImportError, ImportResult, RowSource, SheetRef};
use product_sheet_importer::repository::{ImportStore, KvStore};
use std::collections::VecDeque;
use std::error::Error;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// 创建临时测试数据库（KvStore 打开时自动建表）
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();
    Ok((temp_file, db_path))
}

/// 基于临时数据库文件的 ImportStore
pub fn create_test_store() -> (NamedTempFile, ImportStore) {
    let (temp_file, db_path) = create_test_db().unwrap();
    let kv = KvStore::new(&db_path).unwrap();
    (temp_file, ImportStore::new(kv))
}

/// 写入临时 CSV 文件
pub fn write_csv(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

pub fn rows(data: &[&[&str]]) -> Vec<TabularRow> {
    data.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

pub fn col(letter: char) -> ColumnDesignator {
    ColumnDesignator::from_letter(letter).unwrap()
}

/// sku→A name→B brand→C
pub fn mapping_abc() -> ColumnMapping {
    ColumnMapping::new()
        .with(LogicalField::Sku, col('A'))
        .with(LogicalField::Name, col('B'))
        .with(LogicalField::Brand, col('C'))
}

pub fn test_session() -> Session {
    Session::new("acct-1", "token-1").unwrap()
}

pub fn report(status: JobState) -> JobStatusReport {
    JobStatusReport {
        status,
        successes: 0,
        failures: 0,
        errors: vec![],
    }
}

// ==========================================
// CountingRowSource - 记录读取次数的数据源
// ==========================================
pub struct CountingRowSource {
    rows: Vec<TabularRow>,
    fetches: AtomicUsize,
}

impl CountingRowSource {
    pub fn new(rows: Vec<TabularRow>) -> Self {
        Self {
            rows,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RowSource for CountingRowSource {
    async fn fetch_rows(&self, _sheet: &SheetRef) -> ImportResult<Vec<TabularRow>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.rows.is_empty() {
            return Err(ImportError::NoData);
        }
        Ok(self.rows.clone())
    }
}

// ==========================================
// MockSubmissionService - 可编排的导入服务
// ==========================================
pub struct MockSubmissionService {
    submit_result: Mutex<Option<ImportResult<JobTicket>>>,
    statuses: Mutex<VecDeque<JobStatusReport>>,
    submitted: Mutex<Vec<Vec<ProductRecord>>>,
    polls: AtomicUsize,
}

impl MockSubmissionService {
    /// 提交成功，返回给定 job_id
    pub fn accepting(job_id: &str) -> Self {
        Self::with_submit_result(Ok(JobTicket {
            job_id: job_id.to_string(),
        }))
    }

    /// 提交失败
    pub fn failing(error: ImportError) -> Self {
        Self::with_submit_result(Err(error))
    }

    fn with_submit_result(result: ImportResult<JobTicket>) -> Self {
        Self {
            submit_result: Mutex::new(Some(result)),
            statuses: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
            polls: AtomicUsize::new(0),
        }
    }

    /// 依次返回的状态（最后一个重复返回）
    pub fn with_statuses(self, statuses: Vec<JobStatusReport>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn submitted_batches(&self) -> Vec<Vec<ProductRecord>> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmissionService for MockSubmissionService {
    async fn submit(&self, _session: &Session, products: &[ProductRecord]) -> ImportResult<JobTicket> {
        self.submitted.lock().unwrap().push(products.to_vec());
        self.submit_result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(ImportError::Network("unexpected second submit".to_string())))
    }

    async fn poll_status(&self, _session: &Session, _job_id: &str) -> ImportResult<JobStatusReport> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.statuses.lock().unwrap();
        let next = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().cloned()
        };
        next.ok_or_else(|| ImportError::Network("no status configured".to_string()))
    }
}

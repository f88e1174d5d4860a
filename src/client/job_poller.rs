// ==========================================
// 商品表格导入器 - 任务状态轮询
// ==========================================
// 状态机:
//   Pending → (poll) → InProgress → (等待固定间隔) → poll ...
//                    → Completed / Failed（终态，停止）
//   任意挂起点收到取消 → Cancelled
// 取消: PollHandle 持有 watch::Sender，取消在下一个挂起点生效
// ==========================================

use crate::client::submission_client::SubmissionService;
use crate::domain::job::{JobState, JobStatusReport};
use crate::domain::session::Session;
use crate::importer::error::{ImportError, ImportResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// 轮询状态
#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    Pending,
    InProgress(JobStatusReport),
    Completed(JobStatusReport),
    Failed(JobStatusReport),
    Cancelled,
}

impl PollState {
    /// 根据最新状态报告推进
    pub fn advance(report: JobStatusReport) -> Self {
        match report.status {
            JobState::Queued | JobState::Processing => PollState::InProgress(report),
            JobState::Completed => PollState::Completed(report),
            JobState::Failed => PollState::Failed(report),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollState::Completed(_) | PollState::Failed(_) | PollState::Cancelled
        )
    }
}

/// 等待取消信号；发送端已释放时永不返回
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|flag| *flag).await.is_err() {
        std::future::pending::<()>().await;
    }
}

// ==========================================
// JobPoller - 任务轮询器
// ==========================================
#[derive(Clone)]
pub struct JobPoller {
    service: Arc<dyn SubmissionService>,
    interval: Duration,
}

impl JobPoller {
    pub fn new(service: Arc<dyn SubmissionService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 轮询直到终态
    ///
    /// # 返回
    /// - Ok(report): 任务完成
    /// - Err(JobFailed): 远端处理失败（附远端错误详情）
    /// - Err(PollCancelled): 被取消
    /// - Err(其它): 查询失败（网络 / 鉴权）
    #[instrument(skip(self, session, cancel))]
    pub async fn poll_until_terminal(
        &self,
        session: &Session,
        job_id: &str,
        mut cancel: watch::Receiver<bool>,
    ) -> ImportResult<JobStatusReport> {
        let mut state = PollState::Pending;
        let mut attempts: u32 = 0;

        loop {
            if *cancel.borrow() {
                state = PollState::Cancelled;
            }

            match state {
                PollState::Cancelled => {
                    info!(attempts, "轮询已取消");
                    return Err(ImportError::PollCancelled(job_id.to_string()));
                }
                PollState::Completed(report) => {
                    info!(
                        attempts,
                        successes = report.successes,
                        failures = report.failures,
                        "导入任务完成"
                    );
                    return Ok(report);
                }
                PollState::Failed(report) => {
                    let detail = if report.errors.is_empty() {
                        format!("{} products failed", report.failures)
                    } else {
                        report.errors.join("; ")
                    };
                    warn!(attempts, detail = %detail, "导入任务失败");
                    return Err(ImportError::JobFailed {
                        job_id: job_id.to_string(),
                        detail,
                    });
                }
                PollState::InProgress(ref report) => {
                    debug!(attempts, status = report.status.as_str(), "任务处理中，等待下一次轮询");
                    tokio::select! {
                        _ = tokio::time::sleep(self.interval) => {}
                        _ = cancelled(&mut cancel) => {
                            state = PollState::Cancelled;
                            continue;
                        }
                    }
                }
                PollState::Pending => {}
            }

            attempts += 1;
            state = tokio::select! {
                report = self.service.poll_status(session, job_id) => PollState::advance(report?),
                _ = cancelled(&mut cancel) => PollState::Cancelled,
            };
        }
    }

    /// 在后台启动轮询，返回可取消句柄
    pub fn spawn(&self, session: Session, job_id: String) -> PollHandle {
        let (cancel, receiver) = watch::channel(false);
        let poller = self.clone();
        let task = tokio::spawn(async move {
            poller
                .poll_until_terminal(&session, &job_id, receiver)
                .await
        });
        PollHandle {
            cancel: PollCanceller(Arc::new(cancel)),
            task,
        }
    }
}

/// 取消信号（可跨任务传递）
#[derive(Clone)]
pub struct PollCanceller(Arc<watch::Sender<bool>>);

impl PollCanceller {
    /// 请求取消（在下一个挂起点生效）
    pub fn cancel(&self) {
        // 接收端已结束时无需处理
        let _ = self.0.send(true);
    }
}

/// 后台轮询句柄
pub struct PollHandle {
    cancel: PollCanceller,
    task: JoinHandle<ImportResult<JobStatusReport>>,
}

impl PollHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn canceller(&self) -> PollCanceller {
        self.cancel.clone()
    }

    /// 等待轮询结束
    pub async fn wait(self) -> ImportResult<JobStatusReport> {
        self.task
            .await
            .map_err(|e| ImportError::InternalError(format!("poll task aborted: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(status: JobState) -> JobStatusReport {
        JobStatusReport {
            status,
            successes: 0,
            failures: 0,
            errors: vec![],
        }
    }

    #[test]
    fn test_advance() {
        assert!(matches!(PollState::advance(report(JobState::Queued)), PollState::InProgress(_)));
        assert!(matches!(PollState::advance(report(JobState::Processing)), PollState::InProgress(_)));
        assert!(PollState::advance(report(JobState::Completed)).is_terminal());
        assert!(PollState::advance(report(JobState::Failed)).is_terminal());
        assert!(!PollState::Pending.is_terminal());
    }
}

// ==========================================
// 商品表格导入器 - 导入流程编排
// ==========================================
// 状态机:
//   Idle → Mapped → Validating → ErrorsShown → Mapped
//                              → Confirming → Submitting → Succeeded
//                                           → Mapped（用户取消）
//                                                       → Failed → Mapped
// 红线:
// - 必填列（SKU/Name/Brand）未映射时，读取任何行之前即报配置错误
// - 存在任一校验错误的批次永不提交（不做部分提交）
// - 只有用户确认后才提交
// ==========================================

use crate::client::SubmissionService;
use crate::domain::job::JobTicket;
use crate::domain::mapping::ColumnMapping;
use crate::domain::product::TabularRow;
use crate::domain::session::Session;
use crate::domain::validation::{ImportSummary, ValidatedBatch, ValidationError};
use crate::importer::batch_assembler::BatchAssembler;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::row_source::{RowSource, SheetRef};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

// ==========================================
// ImportPhase - 导入流程阶段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPhase {
    Idle,
    Mapped,
    Validating,
    ErrorsShown,
    Confirming,
    Submitting,
    Succeeded,
    Failed,
}

impl ImportPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportPhase::Idle => "idle",
            ImportPhase::Mapped => "mapped",
            ImportPhase::Validating => "validating",
            ImportPhase::ErrorsShown => "errors_shown",
            ImportPhase::Confirming => "confirming",
            ImportPhase::Submitting => "submitting",
            ImportPhase::Succeeded => "succeeded",
            ImportPhase::Failed => "failed",
        }
    }

    /// 合法迁移表
    pub fn can_transition_to(self, to: ImportPhase) -> bool {
        use ImportPhase::*;
        matches!(
            (self, to),
            (Idle, Mapped)
                | (Mapped, Mapped)
                | (Mapped, Validating)
                // 数据源读取失败回到映射
                | (Validating, Mapped)
                | (Validating, ErrorsShown)
                | (Validating, Confirming)
                | (ErrorsShown, Mapped)
                | (Confirming, Mapped)
                | (Confirming, Submitting)
                | (Submitting, Succeeded)
                | (Submitting, Failed)
                | (Failed, Mapped)
                | (Succeeded, Mapped)
        )
    }
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 校验阶段的结论
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedImport {
    /// 存在错误：全部展示，不可提交
    Rejected {
        total_rows: usize,
        errors: Vec<ValidationError>,
    },
    /// 零错误：展示确认摘要，等待用户确认
    Ready(ImportSummary),
}

// ==========================================
// ImportOrchestrator - 导入编排器
// ==========================================
pub struct ImportOrchestrator {
    session: Session,
    mapping: ColumnMapping,
    assembler: BatchAssembler,
    submission: Arc<dyn SubmissionService>,
    phase: ImportPhase,
    pending: Option<ValidatedBatch>,
}

impl ImportOrchestrator {
    pub fn new(
        session: Session,
        assembler: BatchAssembler,
        submission: Arc<dyn SubmissionService>,
    ) -> Self {
        Self {
            session,
            mapping: ColumnMapping::new(),
            assembler,
            submission,
            phase: ImportPhase::Idle,
            pending: None,
        }
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn transition(&mut self, to: ImportPhase) -> ImportResult<()> {
        if !self.phase.can_transition_to(to) {
            return Err(ImportError::InvalidStateTransition {
                from: self.phase.to_string(),
                to: to.to_string(),
            });
        }
        self.phase = to;
        Ok(())
    }

    /// 设置列映射（允许不完整，必填检查在导入时进行）
    pub fn set_mapping(&mut self, mapping: ColumnMapping) -> ImportResult<()> {
        self.transition(ImportPhase::Mapped)?;
        self.mapping = mapping;
        self.pending = None;
        Ok(())
    }

    /// 读取数据源并校验
    ///
    /// # 参数
    /// - source: 行数据源
    /// - sheet: 表格定位
    ///
    /// # 返回
    /// - Ok(PreparedImport): 校验结论
    /// - Err: 必填列未映射（不读取数据源）/ 数据源错误（回到 Mapped）
    pub async fn prepare_import(
        &mut self,
        source: &dyn RowSource,
        sheet: &SheetRef,
    ) -> ImportResult<PreparedImport> {
        self.mapping.ensure_required()?;
        self.transition(ImportPhase::Validating)?;

        let rows = match source.fetch_rows(sheet).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(spreadsheet_id = %sheet.spreadsheet_id, error = %e, "读取数据源失败");
                self.phase = ImportPhase::Mapped;
                return Err(e);
            }
        };

        self.validate_rows(&rows)
    }

    /// 校验已读取的行
    pub fn validate_rows(&mut self, rows: &[TabularRow]) -> ImportResult<PreparedImport> {
        self.mapping.ensure_required()?;
        if self.phase != ImportPhase::Validating {
            self.transition(ImportPhase::Validating)?;
        }

        let batch = self.assembler.assemble(rows, &self.mapping);

        if !batch.is_submittable() {
            info!(errors = batch.errors.len(), "校验未通过，批次不可提交");
            self.transition(ImportPhase::ErrorsShown)?;
            self.pending = None;
            return Ok(PreparedImport::Rejected {
                total_rows: batch.total_rows,
                errors: batch.errors,
            });
        }

        let summary = batch.summary();
        self.transition(ImportPhase::Confirming)?;
        self.pending = Some(batch);
        Ok(PreparedImport::Ready(summary))
    }

    /// 错误已查看，回到映射
    pub fn acknowledge_errors(&mut self) -> ImportResult<()> {
        if self.phase != ImportPhase::ErrorsShown {
            return Err(ImportError::InvalidStateTransition {
                from: self.phase.to_string(),
                to: ImportPhase::Mapped.to_string(),
            });
        }
        self.transition(ImportPhase::Mapped)
    }

    /// 用户对确认摘要的答复
    ///
    /// # 返回
    /// - Ok(None): 用户取消，回到 Mapped
    /// - Ok(Some(ticket)): 已提交
    /// - Err: 提交失败（阶段为 Failed）
    pub async fn confirm(&mut self, accepted: bool) -> ImportResult<Option<JobTicket>> {
        if self.phase != ImportPhase::Confirming {
            return Err(ImportError::InvalidStateTransition {
                from: self.phase.to_string(),
                to: if accepted {
                    ImportPhase::Submitting.to_string()
                } else {
                    ImportPhase::Mapped.to_string()
                },
            });
        }

        if !accepted {
            info!("用户取消导入");
            self.pending = None;
            self.transition(ImportPhase::Mapped)?;
            return Ok(None);
        }

        let batch = self
            .pending
            .take()
            .ok_or_else(|| ImportError::InternalError("no validated batch to submit".to_string()))?;

        // 再次确认零错误
        if !batch.is_submittable() {
            self.transition(ImportPhase::Mapped)?;
            return Err(ImportError::ValidationFailed {
                count: batch.errors.len(),
            });
        }

        self.transition(ImportPhase::Submitting)?;
        match self.submission.submit(&self.session, &batch.records).await {
            Ok(ticket) => {
                info!(job_id = %ticket.job_id, products = batch.records.len(), "批次已提交");
                self.transition(ImportPhase::Succeeded)?;
                Ok(Some(ticket))
            }
            Err(e) => {
                error!(error = %e, "提交失败");
                self.transition(ImportPhase::Failed)?;
                Err(e)
            }
        }
    }

    /// 从终态 / 确认 / 错误展示回到映射
    pub fn return_to_mapping(&mut self) -> ImportResult<()> {
        if self.phase == ImportPhase::Mapped {
            return Ok(());
        }
        self.pending = None;
        self.transition(ImportPhase::Mapped)
    }
}

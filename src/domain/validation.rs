// ==========================================
// 商品表格导入器 - 校验结果领域模型
// ==========================================
// 职责: 校验错误 / 校验批次 / 导入确认摘要
// 红线: 批次要么零错误可提交，要么整批不可提交（不做部分提交）
// ==========================================

use crate::domain::mapping::LogicalField;
use crate::domain::product::ProductRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 确认摘要中展示的样例商品数
pub const SAMPLE_PRODUCT_COUNT: usize = 3;

/// 错误级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

// ==========================================
// ValidationError - 校验错误
// ==========================================
// row: 表格行号（1 基，第 1 行为表头）；批次级错误无行号
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub row: Option<usize>,
    pub field: Option<LogicalField>,
    pub cell: Option<String>,
    pub message: String,
    pub severity: Severity,
}

impl ValidationError {
    /// 行级错误
    pub fn for_row(
        row: usize,
        field: LogicalField,
        cell: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row: Some(row),
            field: Some(field),
            cell,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// 批次级错误
    pub fn for_batch(message: impl Into<String>) -> Self {
        Self {
            row: None,
            field: None,
            cell: None,
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "Row {}: {}", row, self.message),
            None => f.write_str(&self.message),
        }
    }
}

// ==========================================
// ValidatedBatch - 校验批次
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatedBatch {
    pub total_rows: usize,              // 数据行数（不含表头）
    pub records: Vec<ProductRecord>,    // 通过校验的记录（保持行序）
    pub errors: Vec<ValidationError>,   // 全部错误（按行序）
}

impl ValidatedBatch {
    /// 零错误才可提交
    pub fn is_submittable(&self) -> bool {
        self.errors.is_empty()
    }

    /// 生成确认摘要
    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            total_rows: self.total_rows,
            valid_products: self.records.len(),
            with_category: self.records.iter().filter(|p| p.category.is_some()).count(),
            with_image: self.records.iter().filter(|p| p.image_url.is_some()).count(),
            with_price: self.records.iter().filter(|p| p.base_price.is_some()).count(),
            error_count: self.errors.len(),
            sample_products: self
                .records
                .iter()
                .take(SAMPLE_PRODUCT_COUNT)
                .cloned()
                .collect(),
            can_proceed: self.is_submittable(),
        }
    }
}

// ==========================================
// ImportSummary - 导入确认摘要
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub valid_products: usize,
    pub with_category: usize,
    pub with_image: usize,
    pub with_price: usize,
    pub error_count: usize,
    pub sample_products: Vec<ProductRecord>,
    pub can_proceed: bool,
}

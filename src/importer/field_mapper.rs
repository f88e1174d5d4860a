// ==========================================
// 商品表格导入器 - 行 → 候选记录映射器
// ==========================================
// 职责: 按列映射取单元格 + 类型转换（纯函数，无副作用）
// 规则:
// - 列未映射 / 单元格越界 / 单元格为空 → 字段缺省
// - 文本字段 TRIM
// - 数值字段按 InvalidNumberPolicy 处理非数值单元格
// ==========================================

use crate::domain::mapping::ColumnMapping;
use crate::domain::product::{CandidateRecord, NumericCell};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::ImportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

// ==========================================
// InvalidNumberPolicy - 非数值单元格策略
// ==========================================
// Reject: 保留原文，由校验器报 "... must be a valid number"（默认）
// Omit:   映射阶段直接丢弃该字段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidNumberPolicy {
    #[default]
    Reject,
    Omit,
}

impl InvalidNumberPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            InvalidNumberPolicy::Reject => "reject",
            InvalidNumberPolicy::Omit => "omit",
        }
    }
}

impl fmt::Display for InvalidNumberPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvalidNumberPolicy {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(InvalidNumberPolicy::Reject),
            "omit" => Ok(InvalidNumberPolicy::Omit),
            other => Err(ImportError::ConfigValueError {
                key: "invalid_number_policy".to_string(),
                value: other.to_string(),
                message: "expected `reject` or `omit`".to_string(),
            }),
        }
    }
}

pub struct FieldMapper {
    cleaner: DataCleaner,
    invalid_number_policy: InvalidNumberPolicy,
}

impl FieldMapper {
    pub fn new(invalid_number_policy: InvalidNumberPolicy) -> Self {
        Self {
            cleaner: DataCleaner,
            invalid_number_policy,
        }
    }

    pub fn invalid_number_policy(&self) -> InvalidNumberPolicy {
        self.invalid_number_policy
    }

    /// 将一行映射为候选记录
    ///
    /// # 参数
    /// - row: 表格行
    /// - mapping: 列映射
    /// - row_number: 表格行号（1 基，含表头）
    pub fn map_row(
        &self,
        row: &[String],
        mapping: &ColumnMapping,
        row_number: usize,
    ) -> CandidateRecord {
        let mut record = CandidateRecord::new(row_number);

        for (field, column) in mapping.mapped_fields() {
            // 越界视为空单元格
            let Some(raw) = row.get(column.index()) else {
                continue;
            };
            let Some(value) = self.cleaner.clean_text(raw) else {
                continue;
            };

            if !field.is_numeric() {
                record.set_text(field, value);
                continue;
            }

            match self.cleaner.parse_number(&value) {
                Some(number) => record.set_numeric(field, NumericCell::Number(number)),
                None => match self.invalid_number_policy {
                    InvalidNumberPolicy::Reject => {
                        record.set_numeric(field, NumericCell::Invalid(value))
                    }
                    InvalidNumberPolicy::Omit => {
                        debug!(
                            row_number,
                            field = field.key(),
                            cell = %column.cell_ref(row_number),
                            "非数值单元格，字段省略"
                        );
                    }
                },
            }
        }

        record
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new(InvalidNumberPolicy::default())
    }
}

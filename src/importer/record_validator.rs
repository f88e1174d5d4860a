// ==========================================
// 商品表格导入器 - 记录校验器
// ==========================================
// 职责: 字段级规则 + 批次级规则（行数上限、SKU 唯一）
// 规则（按此顺序逐条收集，不在首个错误处停止）:
// - sku:   必填；最短 3；批内唯一（首次出现不报错）
// - name:  必填；最短 3
// - brand: 必填；最短 2
// - base_price / cost / msrp: 可选；若有值须为数值且 >= 0
// 批次: 数据行 > 1000 时只报一条错误，跳过全部行级校验
// ==========================================

use crate::domain::mapping::{ColumnMapping, LogicalField};
use crate::domain::product::{CandidateRecord, NumericCell, ProductRecord};
use crate::domain::validation::ValidationError;
use crate::importer::error::ImportError;
use crate::MAX_PRODUCTS_PER_IMPORT;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

// ==========================================
// RuleProfile - 可配置的规则档位
// ==========================================
// Standard: 最短长度规则（默认）
// Presence: 只要求必填字段非空
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleProfile {
    #[default]
    Standard,
    Presence,
}

impl RuleProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleProfile::Standard => "standard",
            RuleProfile::Presence => "presence",
        }
    }

    pub fn rules(self) -> ValidationRules {
        match self {
            RuleProfile::Standard => ValidationRules::standard(),
            RuleProfile::Presence => ValidationRules::presence_only(),
        }
    }
}

impl fmt::Display for RuleProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleProfile {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(RuleProfile::Standard),
            "presence" => Ok(RuleProfile::Presence),
            other => Err(ImportError::ConfigValueError {
                key: "rule_profile".to_string(),
                value: other.to_string(),
                message: "expected `standard` or `presence`".to_string(),
            }),
        }
    }
}

// ==========================================
// ValidationRules - 文本字段最短长度
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    pub sku_min_len: usize,
    pub name_min_len: usize,
    pub brand_min_len: usize,
}

impl ValidationRules {
    /// 标准规则（默认）
    pub fn standard() -> Self {
        Self {
            sku_min_len: 3,
            name_min_len: 3,
            brand_min_len: 2,
        }
    }

    /// 仅检查必填非空（不限长度）
    pub fn presence_only() -> Self {
        Self {
            sku_min_len: 1,
            name_min_len: 1,
            brand_min_len: 1,
        }
    }

    fn min_len(&self, field: LogicalField) -> usize {
        match field {
            LogicalField::Sku => self.sku_min_len,
            LogicalField::Name => self.name_min_len,
            LogicalField::Brand => self.brand_min_len,
            _ => 0,
        }
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::standard()
    }
}

pub struct RecordValidator {
    rules: ValidationRules,
}

impl RecordValidator {
    pub fn new(rules: ValidationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> ValidationRules {
        self.rules
    }

    /// 批次行数上限校验
    pub fn validate_batch_size(&self, data_rows: usize) -> Option<ValidationError> {
        if data_rows <= MAX_PRODUCTS_PER_IMPORT {
            return None;
        }
        Some(ValidationError::for_batch(format!(
            "Too many rows: {} data rows exceed the limit of {} products per import",
            data_rows, MAX_PRODUCTS_PER_IMPORT
        )))
    }

    /// 校验单条候选记录
    ///
    /// # 参数
    /// - record: 候选记录
    /// - mapping: 列映射（用于错误中的单元格引用）
    /// - seen_skus: 已出现的 SKU（按行序递增构建）
    ///
    /// # 返回
    /// - Ok(ProductRecord): 全部规则通过
    /// - Err(Vec<ValidationError>): 该行全部违规
    pub fn validate_record(
        &self,
        record: &CandidateRecord,
        mapping: &ColumnMapping,
        seen_skus: &mut HashSet<String>,
    ) -> Result<ProductRecord, Vec<ValidationError>> {
        let row = record.row_number;
        let cell = |field: LogicalField| mapping.get(field).map(|c| c.cell_ref(row));
        let mut errors = Vec::new();

        // ===== 必填文本字段 =====
        for field in LogicalField::REQUIRED {
            match record.text(field) {
                None => {
                    let detail = match cell(field) {
                        Some(cell_ref) => format!("cell {} is empty", cell_ref),
                        None => "column not mapped".to_string(),
                    };
                    errors.push(ValidationError::for_row(
                        row,
                        field,
                        cell(field),
                        format!("{} is required ({})", field.label(), detail),
                    ));
                }
                Some(value) => {
                    let min_len = self.rules.min_len(field);
                    if value.chars().count() < min_len {
                        errors.push(ValidationError::for_row(
                            row,
                            field,
                            cell(field),
                            format!(
                                "{} must be at least {} characters (cell {})",
                                field.label(),
                                min_len,
                                cell(field).unwrap_or_default()
                            ),
                        ));
                    }
                }
            }

            // SKU 唯一：首次出现登记，之后每次出现都报错
            if field == LogicalField::Sku {
                if let Some(sku) = record.text(field) {
                    if !seen_skus.insert(sku.to_string()) {
                        errors.push(ValidationError::for_row(
                            row,
                            field,
                            cell(field),
                            format!("Duplicate SKU \"{}\"", sku),
                        ));
                    }
                }
            }
        }

        // ===== 数值字段 =====
        for field in LogicalField::NUMERIC {
            match record.numeric(field) {
                Some(NumericCell::Invalid(raw)) => errors.push(ValidationError::for_row(
                    row,
                    field,
                    cell(field),
                    format!(
                        "{} must be a valid number (cell {}: \"{}\")",
                        field.label(),
                        cell(field).unwrap_or_default(),
                        raw
                    ),
                )),
                Some(NumericCell::Number(value)) if *value < 0.0 => {
                    errors.push(ValidationError::for_row(
                        row,
                        field,
                        cell(field),
                        format!(
                            "{} must be zero or greater (cell {}: {})",
                            field.label(),
                            cell(field).unwrap_or_default(),
                            value
                        ),
                    ))
                }
                _ => {}
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        match (&record.sku, &record.name, &record.brand) {
            (Some(sku), Some(name), Some(brand)) => Ok(ProductRecord {
                sku: sku.clone(),
                name: name.clone(),
                brand: brand.clone(),
                category: record.category.clone(),
                image_url: record.image_url.clone(),
                base_price: record.base_price.as_ref().and_then(NumericCell::as_number),
                cost: record.cost.as_ref().and_then(NumericCell::as_number),
                msrp: record.msrp.as_ref().and_then(NumericCell::as_number),
                row_number: row,
            }),
            // 必填缺失已在上面报错
            _ => Err(errors),
        }
    }
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self::new(ValidationRules::default())
    }
}

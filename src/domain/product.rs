// ==========================================
// 商品表格导入器 - 商品领域模型
// ==========================================
// 职责: 表格行 / 候选记录 / 提交记录
// 流向: TabularRow → CandidateRecord → ProductRecord
// ==========================================

use crate::domain::mapping::LogicalField;
use serde::{Deserialize, Serialize};

/// 表格行（按位置寻址的单元格文本）
pub type TabularRow = Vec<String>;

// ==========================================
// NumericCell - 数值单元格
// ==========================================
// Invalid 保留原始文本，由校验器报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum NumericCell {
    Number(f64),
    Invalid(String),
}

impl NumericCell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            NumericCell::Number(value) => Some(*value),
            NumericCell::Invalid(_) => None,
        }
    }
}

// ==========================================
// CandidateRecord - 候选记录（校验前）
// ==========================================
// 只有"列已映射且单元格非空"的字段才有值
// 生命周期: 仅在单次导入尝试内
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandidateRecord {
    pub row_number: usize, // 表格行号（1 基，含表头）

    // 文本字段（已 TRIM）
    pub sku: Option<String>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,

    // 数值字段
    pub base_price: Option<NumericCell>,
    pub cost: Option<NumericCell>,
    pub msrp: Option<NumericCell>,
}

impl CandidateRecord {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            ..Self::default()
        }
    }

    /// 文本字段值（数值字段返回 None）
    pub fn text(&self, field: LogicalField) -> Option<&str> {
        match field {
            LogicalField::Sku => self.sku.as_deref(),
            LogicalField::Name => self.name.as_deref(),
            LogicalField::Brand => self.brand.as_deref(),
            LogicalField::Category => self.category.as_deref(),
            LogicalField::ImageUrl => self.image_url.as_deref(),
            LogicalField::BasePrice | LogicalField::Cost | LogicalField::Msrp => None,
        }
    }

    /// 数值字段值（文本字段返回 None）
    pub fn numeric(&self, field: LogicalField) -> Option<&NumericCell> {
        match field {
            LogicalField::BasePrice => self.base_price.as_ref(),
            LogicalField::Cost => self.cost.as_ref(),
            LogicalField::Msrp => self.msrp.as_ref(),
            _ => None,
        }
    }

    pub fn set_text(&mut self, field: LogicalField, value: String) {
        match field {
            LogicalField::Sku => self.sku = Some(value),
            LogicalField::Name => self.name = Some(value),
            LogicalField::Brand => self.brand = Some(value),
            LogicalField::Category => self.category = Some(value),
            LogicalField::ImageUrl => self.image_url = Some(value),
            LogicalField::BasePrice | LogicalField::Cost | LogicalField::Msrp => {}
        }
    }

    pub fn set_numeric(&mut self, field: LogicalField, value: NumericCell) {
        match field {
            LogicalField::BasePrice => self.base_price = Some(value),
            LogicalField::Cost => self.cost = Some(value),
            LogicalField::Msrp => self.msrp = Some(value),
            _ => {}
        }
    }
}

// ==========================================
// ProductRecord - 提交记录（校验通过）
// ==========================================
// 缺省的可选字段不出现在载荷中（而非空字符串）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub sku: String,
    pub name: String,
    pub brand: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msrp: Option<f64>,

    // 元信息（不进入载荷）
    #[serde(skip)]
    pub row_number: usize,
}

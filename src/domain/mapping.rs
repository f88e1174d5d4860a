// ==========================================
// 商品表格导入器 - 列映射领域模型
// ==========================================
// 职责: 逻辑字段 → 表格列标识 的映射
// 约束: sku / name / brand 为必填映射，其余字段可选
// 限制: 单字母列标识，最多支持 26 列（A..Z）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 单字母列标识所能表达的最大列数
pub const MAX_SHEET_COLUMNS: usize = 26;

/// 列字母查找表（下标即零基列偏移）
pub const COLUMN_LETTERS: [char; MAX_SHEET_COLUMNS] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

// ==========================================
// ColumnDesignator - 列标识
// ==========================================
// 不变式: 内部偏移恒在 [0, MAX_SHEET_COLUMNS) 内
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnDesignator(u8);

impl ColumnDesignator {
    /// 由零基偏移构造（超出 26 列返回 None）
    pub fn from_index(index: usize) -> Option<Self> {
        if index < MAX_SHEET_COLUMNS {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// 由列字母构造（大小写不敏感）
    pub fn from_letter(letter: char) -> Option<Self> {
        let upper = letter.to_ascii_uppercase();
        COLUMN_LETTERS
            .iter()
            .position(|&c| c == upper)
            .and_then(Self::from_index)
    }

    /// 零基列偏移
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// 列字母
    pub fn letter(self) -> char {
        COLUMN_LETTERS[self.index()]
    }

    /// 单元格引用，例如 `A5`
    pub fn cell_ref(self, row_number: usize) -> String {
        format!("{}{}", self.letter(), row_number)
    }
}

impl fmt::Display for ColumnDesignator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for ColumnDesignator {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::from_letter(letter)
                .ok_or_else(|| ImportError::InvalidColumnDesignator(trimmed.to_string())),
            _ => Err(ImportError::InvalidColumnDesignator(trimmed.to_string())),
        }
    }
}

impl TryFrom<String> for ColumnDesignator {
    type Error = ImportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColumnDesignator> for String {
    fn from(value: ColumnDesignator) -> Self {
        value.letter().to_string()
    }
}

// ==========================================
// LogicalField - 商品逻辑字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogicalField {
    Sku,
    Name,
    Brand,
    Category,
    ImageUrl,
    BasePrice,
    Cost,
    Msrp,
}

impl LogicalField {
    /// 全部字段（顺序即校验顺序）
    pub const ALL: [LogicalField; 8] = [
        LogicalField::Sku,
        LogicalField::Name,
        LogicalField::Brand,
        LogicalField::Category,
        LogicalField::ImageUrl,
        LogicalField::BasePrice,
        LogicalField::Cost,
        LogicalField::Msrp,
    ];

    /// 必填字段
    pub const REQUIRED: [LogicalField; 3] =
        [LogicalField::Sku, LogicalField::Name, LogicalField::Brand];

    /// 数值字段
    pub const NUMERIC: [LogicalField; 3] =
        [LogicalField::BasePrice, LogicalField::Cost, LogicalField::Msrp];

    /// 映射配置中使用的键名
    pub fn key(self) -> &'static str {
        match self {
            LogicalField::Sku => "sku",
            LogicalField::Name => "name",
            LogicalField::Brand => "brand",
            LogicalField::Category => "category",
            LogicalField::ImageUrl => "imageUrl",
            LogicalField::BasePrice => "basePrice",
            LogicalField::Cost => "cost",
            LogicalField::Msrp => "msrp",
        }
    }

    /// 提交载荷中使用的键名
    pub fn payload_key(self) -> &'static str {
        match self {
            LogicalField::ImageUrl => "image_url",
            LogicalField::BasePrice => "base_price",
            other => other.key(),
        }
    }

    /// 面向用户的字段名
    pub fn label(self) -> &'static str {
        match self {
            LogicalField::Sku => "SKU",
            LogicalField::Name => "Name",
            LogicalField::Brand => "Brand",
            LogicalField::Category => "Category",
            LogicalField::ImageUrl => "Image URL",
            LogicalField::BasePrice => "Base price",
            LogicalField::Cost => "Cost",
            LogicalField::Msrp => "MSRP",
        }
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }

    pub fn is_numeric(self) -> bool {
        Self::NUMERIC.contains(&self)
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for LogicalField {
    type Err = ImportError;

    /// 同时接受映射键名（imageUrl）与载荷键名（image_url）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        LogicalField::ALL
            .iter()
            .copied()
            .find(|f| f.key().eq_ignore_ascii_case(trimmed) || f.payload_key() == trimmed)
            .ok_or_else(|| ImportError::ConfigValueError {
                key: "field".to_string(),
                value: trimmed.to_string(),
                message: "unknown product field".to_string(),
            })
    }
}

// ==========================================
// ColumnMapping - 列映射
// ==========================================
// 每个逻辑字段一个具名可选槽位: None = 未映射
// 生命周期: 按表格标识持久化，登出时清除
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<ColumnDesignator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<ColumnDesignator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<ColumnDesignator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ColumnDesignator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<ColumnDesignator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<ColumnDesignator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<ColumnDesignator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msrp: Option<ColumnDesignator>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取某字段的列标识
    pub fn get(&self, field: LogicalField) -> Option<ColumnDesignator> {
        match field {
            LogicalField::Sku => self.sku,
            LogicalField::Name => self.name,
            LogicalField::Brand => self.brand,
            LogicalField::Category => self.category,
            LogicalField::ImageUrl => self.image_url,
            LogicalField::BasePrice => self.base_price,
            LogicalField::Cost => self.cost,
            LogicalField::Msrp => self.msrp,
        }
    }

    /// 设置（或清除）某字段的列标识
    pub fn set(&mut self, field: LogicalField, column: Option<ColumnDesignator>) {
        let slot = match field {
            LogicalField::Sku => &mut self.sku,
            LogicalField::Name => &mut self.name,
            LogicalField::Brand => &mut self.brand,
            LogicalField::Category => &mut self.category,
            LogicalField::ImageUrl => &mut self.image_url,
            LogicalField::BasePrice => &mut self.base_price,
            LogicalField::Cost => &mut self.cost,
            LogicalField::Msrp => &mut self.msrp,
        };
        *slot = column;
    }

    /// 链式设置，便于构造
    pub fn with(mut self, field: LogicalField, column: ColumnDesignator) -> Self {
        self.set(field, Some(column));
        self
    }

    /// 已映射字段（按 LogicalField::ALL 顺序）
    pub fn mapped_fields(&self) -> impl Iterator<Item = (LogicalField, ColumnDesignator)> + '_ {
        LogicalField::ALL
            .into_iter()
            .filter_map(move |field| self.get(field).map(|column| (field, column)))
    }

    /// 未映射的必填字段
    pub fn missing_required(&self) -> Vec<LogicalField> {
        LogicalField::REQUIRED
            .iter()
            .copied()
            .filter(|&field| self.get(field).is_none())
            .collect()
    }

    /// 必填字段检查（导入前置条件）
    pub fn ensure_required(&self) -> ImportResult<()> {
        let missing = self.missing_required();
        if missing.is_empty() {
            return Ok(());
        }
        Err(ImportError::RequiredColumnsUnmapped {
            fields: missing
                .iter()
                .map(|f| f.label())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.mapped_fields().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(letter: char) -> ColumnDesignator {
        ColumnDesignator::from_letter(letter).unwrap()
    }

    #[test]
    fn test_designator_lookup_bounds() {
        assert_eq!(col('A').index(), 0);
        assert_eq!(col('z').index(), 25);
        assert!(ColumnDesignator::from_index(26).is_none());
        assert!(ColumnDesignator::from_letter('1').is_none());
    }

    #[test]
    fn test_designator_parse_rejects_multi_letter() {
        assert!("AA".parse::<ColumnDesignator>().is_err());
        assert_eq!(" c ".parse::<ColumnDesignator>().unwrap(), col('C'));
    }

    #[test]
    fn test_cell_ref() {
        assert_eq!(col('B').cell_ref(7), "B7");
    }

    #[test]
    fn test_missing_required() {
        let mapping = ColumnMapping::new().with(LogicalField::Name, col('B'));
        assert_eq!(
            mapping.missing_required(),
            vec![LogicalField::Sku, LogicalField::Brand]
        );
        let err = mapping.ensure_required().unwrap_err();
        assert!(err.to_string().contains("SKU, Brand"));
    }

    #[test]
    fn test_mapping_serializes_letters() {
        let mapping = ColumnMapping::new()
            .with(LogicalField::Sku, col('A'))
            .with(LogicalField::BasePrice, col('F'));
        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r#"{"sku":"A","basePrice":"F"}"#);

        let back: ColumnMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mapping);
    }

    #[test]
    fn test_field_from_str_accepts_both_key_styles() {
        assert_eq!("imageUrl".parse::<LogicalField>().unwrap(), LogicalField::ImageUrl);
        assert_eq!("base_price".parse::<LogicalField>().unwrap(), LogicalField::BasePrice);
        assert!("weight".parse::<LogicalField>().is_err());
    }
}

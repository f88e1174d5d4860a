// ==========================================
// 商品表格导入器 - 列标识解析 / 表头检查
// ==========================================
// 职责: 列字母 → 零基偏移；表头行 → 可选列清单
// 限制: 只支持 A..Z（MAX_SHEET_COLUMNS = 26），超出的列不可映射
// ==========================================

use crate::domain::mapping::{ColumnDesignator, ColumnMapping, LogicalField, MAX_SHEET_COLUMNS};
use crate::importer::error::ImportResult;
use serde::Serialize;
use tracing::warn;

/// 解析用户选择的列标识
///
/// # 返回
/// - Ok(None): 空 / 未设置（未映射）
/// - Ok(Some): 合法列字母
/// - Err: 非单字母 A..Z
pub fn resolve_column(designator: &str) -> ImportResult<Option<ColumnDesignator>> {
    if designator.trim().is_empty() {
        return Ok(None);
    }
    designator.parse().map(Some)
}

/// 列标识 → 零基偏移（不检查行宽，越界由映射器处理）
pub fn column_offset(designator: Option<ColumnDesignator>) -> Option<usize> {
    designator.map(ColumnDesignator::index)
}

/// 表头列
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnHeader {
    pub column: ColumnDesignator,
    pub name: String,
}

/// 检查表头行，生成可选列清单
///
/// 空表头显示为 `Column X`；超过 26 列的部分被忽略
pub fn inspect_headers(header_row: &[String]) -> Vec<ColumnHeader> {
    if header_row.len() > MAX_SHEET_COLUMNS {
        warn!(
            columns = header_row.len(),
            max = MAX_SHEET_COLUMNS,
            "表头超过 26 列，超出部分不可映射"
        );
    }

    header_row
        .iter()
        .enumerate()
        .filter_map(|(idx, header)| {
            ColumnDesignator::from_index(idx).map(|column| {
                let trimmed = header.trim();
                let name = if trimmed.is_empty() {
                    format!("Column {}", column)
                } else {
                    trimmed.to_string()
                };
                ColumnHeader { column, name }
            })
        })
        .collect()
}

/// 字段别名（表头名称匹配，大小写不敏感）
fn field_aliases(field: LogicalField) -> &'static [&'static str] {
    match field {
        LogicalField::Sku => &["sku", "item code", "product code", "code"],
        LogicalField::Name => &["name", "product name", "title", "product"],
        LogicalField::Brand => &["brand", "manufacturer", "make"],
        LogicalField::Category => &["category", "product category", "type"],
        LogicalField::ImageUrl => &["image url", "image", "imageurl", "image_url", "picture"],
        LogicalField::BasePrice => &["base price", "price", "baseprice", "base_price"],
        LogicalField::Cost => &["cost", "unit cost"],
        LogicalField::Msrp => &["msrp", "list price", "retail price"],
    }
}

/// 按表头名称推荐映射（每列最多分配给一个字段）
pub fn suggest_mapping(headers: &[ColumnHeader]) -> ColumnMapping {
    let mut mapping = ColumnMapping::new();
    let mut taken: Vec<ColumnDesignator> = Vec::new();

    for field in LogicalField::ALL {
        let aliases = field_aliases(field);
        let found = headers.iter().find(|header| {
            !taken.contains(&header.column)
                && aliases
                    .iter()
                    .any(|alias| header.name.trim().eq_ignore_ascii_case(alias))
        });
        if let Some(header) = found {
            mapping.set(field, Some(header.column));
            taken.push(header.column);
        }
    }

    mapping
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_resolve_column() {
        assert_eq!(resolve_column("").unwrap(), None);
        assert_eq!(resolve_column("  ").unwrap(), None);
        assert_eq!(column_offset(resolve_column("A").unwrap()), Some(0));
        assert_eq!(column_offset(resolve_column("Z").unwrap()), Some(25));
        assert!(resolve_column("AB").is_err());
        assert!(resolve_column("7").is_err());
    }

    #[test]
    fn test_inspect_headers_blank_fallback() {
        let headers = inspect_headers(&row(&["SKU", "", " Brand "]));
        assert_eq!(headers.len(), 3);
        assert_eq!(headers[1].name, "Column B");
        assert_eq!(headers[2].name, "Brand");
        assert_eq!(headers[2].column.letter(), 'C');
    }

    #[test]
    fn test_inspect_headers_caps_at_26_columns() {
        let wide: Vec<String> = (0..30).map(|i| format!("H{}", i)).collect();
        let headers = inspect_headers(&wide);
        assert_eq!(headers.len(), MAX_SHEET_COLUMNS);
        assert_eq!(headers.last().unwrap().column.letter(), 'Z');
    }

    #[test]
    fn test_suggest_mapping_by_header_names() {
        let headers = inspect_headers(&row(&["Product Name", "SKU", "Brand", "Notes", "Price"]));
        let mapping = suggest_mapping(&headers);

        assert_eq!(mapping.sku.map(|c| c.letter()), Some('B'));
        assert_eq!(mapping.name.map(|c| c.letter()), Some('A'));
        assert_eq!(mapping.brand.map(|c| c.letter()), Some('C'));
        assert_eq!(mapping.base_price.map(|c| c.letter()), Some('E'));
        assert_eq!(mapping.category, None);
        assert!(mapping.ensure_required().is_ok());
    }
}

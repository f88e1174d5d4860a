// ==========================================
// 商品表格导入器 - 单元格清洗
// ==========================================
// 职责: TRIM / 空值标准化 / 数值解析 / 空行识别
// ==========================================

pub struct DataCleaner;

impl DataCleaner {
    /// 清洗文本（TRIM，空白视为缺失）
    pub fn clean_text(&self, value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// 解析数值（严格浮点解析，拒绝 NaN / 无穷）
    ///
    /// "12abc" 之类带尾随文本的单元格视为非数值
    pub fn parse_number(&self, value: &str) -> Option<f64> {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
    }

    /// 整行是否为空白
    pub fn is_blank_row(&self, row: &[String]) -> bool {
        row.iter().all(|cell| cell.trim().is_empty())
    }
}

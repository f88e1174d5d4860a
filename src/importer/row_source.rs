// ==========================================
// 商品表格导入器 - 行数据源
// ==========================================
// 职责: 读取表格为按位置寻址的行（表头在第 0 行）
// 支持: CSV (.csv) / Excel (.xlsx/.xls/.xlsm/.ods)
// 约定: 不跳过空行（行号由组装器统一计算）；整表为空 → NoData
// ==========================================

use crate::domain::product::TabularRow;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

// ==========================================
// SheetRef - 表格定位
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    /// 表格标识（Google Sheets id 或本地文件路径）
    pub spreadsheet_id: String,
    /// 工作表名称（None = 第一个工作表）
    pub sheet: Option<String>,
}

impl SheetRef {
    pub fn new(spreadsheet_id: impl Into<String>, sheet: Option<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheet,
        }
    }

    /// 本地文件定位（路径即标识）
    pub fn from_file(path: impl AsRef<Path>, sheet: Option<String>) -> Self {
        Self::new(path.as_ref().display().to_string(), sheet)
    }
}

/// 行数据源 Trait
#[async_trait]
pub trait RowSource: Send + Sync {
    /// 读取全部行（含表头）
    async fn fetch_rows(&self, sheet: &SheetRef) -> ImportResult<Vec<TabularRow>>;
}

// ==========================================
// FileRowSource - 本地文件数据源
// ==========================================
pub struct FileRowSource;

impl FileRowSource {
    /// 同步读取（按扩展名分派）
    pub fn read_rows(&self, path: &Path, sheet: Option<&str>) -> ImportResult<Vec<TabularRow>> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let rows = match ext.as_str() {
            "csv" => read_csv(path)?,
            "xlsx" | "xls" | "xlsm" | "ods" => read_workbook(path, sheet)?,
            _ => return Err(ImportError::UnsupportedFormat(ext)),
        };

        if rows.is_empty() {
            return Err(ImportError::NoData);
        }

        info!(path = %path.display(), rows = rows.len(), "读取表格文件完成");
        Ok(rows)
    }
}

#[async_trait]
impl RowSource for FileRowSource {
    async fn fetch_rows(&self, sheet: &SheetRef) -> ImportResult<Vec<TabularRow>> {
        let path = PathBuf::from(&sheet.spreadsheet_id);
        let sheet_name = sheet.sheet.clone();
        // 文件读取放到阻塞线程池
        tokio::task::spawn_blocking(move || FileRowSource.read_rows(&path, sheet_name.as_deref()))
            .await
            .map_err(|e| ImportError::InternalError(e.to_string()))?
    }
}

fn read_csv(path: &Path) -> ImportResult<Vec<TabularRow>> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false) // 表头作为第 0 行返回
        .flexible(true) // 允许行长度不一致
        .from_reader(file);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn read_workbook(path: &Path, sheet: Option<&str>) -> ImportResult<Vec<TabularRow>> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("workbook has no sheets".to_string()))?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_csv_rows_are_positional_with_header() {
        let file = csv_file("SKU,Name,Brand\nSKU-1,Widget,Acme\nSKU-2,Gadget\n");
        let rows = FileRowSource.read_rows(file.path(), None).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["SKU", "Name", "Brand"]);
        // 短行保持原长度
        assert_eq!(rows[2], vec!["SKU-2", "Gadget"]);
    }

    #[test]
    fn test_csv_blank_rows_are_kept() {
        let file = csv_file("SKU,Name\nSKU-1,Widget\n,\nSKU-2,Gadget\n");
        let rows = FileRowSource.read_rows(file.path(), None).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2], vec!["", ""]);
    }

    #[test]
    fn test_empty_csv_is_no_data() {
        let file = csv_file("");
        let result = FileRowSource.read_rows(file.path(), None);
        assert!(matches!(result, Err(ImportError::NoData)));
    }

    #[test]
    fn test_file_not_found() {
        let result = FileRowSource.read_rows(Path::new("missing_products.csv"), None);
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = FileRowSource.read_rows(file.path(), None);
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "txt"));
    }

    #[tokio::test]
    async fn test_fetch_rows_via_trait() {
        let file = csv_file("SKU,Name,Brand\nSKU-1,Widget,Acme\n");
        let rows = FileRowSource
            .fetch_rows(&SheetRef::from_file(file.path(), None))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }
}

// ==========================================
// 商品表格导入器 - Google Sheets 数据源
// ==========================================
// 职责: 通过 values API 读取 A:Z 列（表头在第 0 行）
// 接口: GET {base}/v4/spreadsheets/{id}/values/{sheet!}A:Z
// 鉴权: Authorization: Bearer <access_token>
// ==========================================

use crate::domain::product::TabularRow;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::row_source::{RowSource, SheetRef};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// URL 中 spreadsheet id 的前缀
const SPREADSHEET_PATH_MARKER: &str = "/spreadsheets/d/";

/// 从 Google Sheets URL 提取 spreadsheet id
///
/// 例: https://docs.google.com/spreadsheets/d/1AbC_x-9/edit#gid=0 → 1AbC_x-9
pub fn spreadsheet_id_from_url(url: &str) -> ImportResult<String> {
    let start = url
        .find(SPREADSHEET_PATH_MARKER)
        .map(|idx| idx + SPREADSHEET_PATH_MARKER.len())
        .ok_or_else(|| ImportError::InvalidSpreadsheetUrl(url.to_string()))?;

    let id: String = url[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    if id.is_empty() {
        return Err(ImportError::InvalidSpreadsheetUrl(url.to_string()));
    }
    Ok(id)
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleErrorBody {
    #[serde(default)]
    error: Option<GoogleErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    #[serde(default)]
    message: String,
}

/// 单元格 JSON 值 → 文本
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ==========================================
// GoogleSheetsSource - values API 数据源
// ==========================================
pub struct GoogleSheetsSource {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl GoogleSheetsSource {
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> ImportResult<Self> {
        let raw = base_url.into();
        let base_url = Url::parse(&raw)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ImportError::ConfigValueError {
                key: "sheets_base_url".to_string(),
                value: raw.clone(),
                message: "expected an absolute http(s) URL".to_string(),
            })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            access_token: access_token.into(),
        })
    }

    /// values API 地址；id 与区间按路径段编码
    fn values_url(&self, sheet: &SheetRef) -> Url {
        let range = match &sheet.sheet {
            // A1 表示法中工作表名内的单引号需写成两个
            Some(name) => format!("'{}'!A:Z", name.replace('\'', "''")),
            None => "A:Z".to_string(),
        };
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v4", "spreadsheets", sheet.spreadsheet_id.as_str(), "values", range.as_str()]);
        }
        url
    }
}

#[async_trait]
impl RowSource for GoogleSheetsSource {
    #[instrument(skip_all, fields(spreadsheet_id = %sheet.spreadsheet_id))]
    async fn fetch_rows(&self, sheet: &SheetRef) -> ImportResult<Vec<TabularRow>> {
        let response = self
            .client
            .get(self.values_url(sheet))
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: GoogleErrorBody = response.json().await.unwrap_or_default();
            let message = body
                .error
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| status.to_string());
            warn!(status = status.as_u16(), message = %message, "读取表格失败");
            return Err(match status {
                StatusCode::UNAUTHORIZED => ImportError::AuthFailed(message),
                StatusCode::FORBIDDEN => ImportError::PermissionDenied(message),
                StatusCode::NOT_FOUND => ImportError::InvalidSpreadsheetUrl(message),
                _ => ImportError::Network(message),
            });
        }

        let range: ValueRange = response.json().await?;
        if range.values.is_empty() {
            return Err(ImportError::NoData);
        }

        let rows: Vec<TabularRow> = range
            .values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        info!(rows = rows.len(), "读取表格完成");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spreadsheet_id_from_url() {
        let id = spreadsheet_id_from_url(
            "https://docs.google.com/spreadsheets/d/1AbC_x-9Yz/edit#gid=0",
        )
        .unwrap();
        assert_eq!(id, "1AbC_x-9Yz");
    }

    #[test]
    fn test_spreadsheet_id_rejects_other_urls() {
        assert!(matches!(
            spreadsheet_id_from_url("https://example.com/sheet"),
            Err(ImportError::InvalidSpreadsheetUrl(_))
        ));
        assert!(spreadsheet_id_from_url("https://docs.google.com/spreadsheets/d/").is_err());
    }

    #[test]
    fn test_values_parsing_stringifies_cells() {
        let range: ValueRange = serde_json::from_str(
            r#"{"range":"Sheet1!A1:Z3","values":[["SKU","Price"],["SKU-1",12.5],["SKU-2"]]}"#,
        )
        .unwrap();
        let rows: Vec<TabularRow> = range
            .values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        assert_eq!(rows[1], vec!["SKU-1", "12.5"]);
        assert_eq!(rows[2], vec!["SKU-2"]);
    }

    #[test]
    fn test_values_url_with_sheet_name() {
        let source = GoogleSheetsSource::new("https://sheets.example/", "tok", Duration::from_secs(5)).unwrap();
        assert_eq!(
            source.values_url(&SheetRef::new("abc", None)).as_str(),
            "https://sheets.example/v4/spreadsheets/abc/values/A:Z"
        );
        assert_eq!(
            source.values_url(&SheetRef::new("abc", Some("Products".to_string()))).as_str(),
            "https://sheets.example/v4/spreadsheets/abc/values/'Products'!A:Z"
        );
    }

    #[test]
    fn test_values_url_escapes_sheet_name() {
        let source = GoogleSheetsSource::new("https://sheets.example", "tok", Duration::from_secs(5)).unwrap();
        let url = source.values_url(&SheetRef::new("abc", Some("Q1 #2?/Bob's".to_string())));

        assert_eq!(
            url.as_str(),
            "https://sheets.example/v4/spreadsheets/abc/values/'Q1%20%232%3F%2FBob''s'!A:Z"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let err = GoogleSheetsSource::new("not a url", "tok", Duration::from_secs(5)).err().unwrap();
        assert!(matches!(err, ImportError::ConfigValueError { .. }));
    }
}

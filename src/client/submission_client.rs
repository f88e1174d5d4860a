// ==========================================
// 商品表格导入器 - 导入服务客户端
// ==========================================
// 职责: 提交校验通过的商品批次；查询远端任务状态
// 接口:
// - POST {base}/api/v1/products/import            body: {account_id, products}
// - GET  {base}/api/v1/products/import/{job_id}?account_id=...
// 鉴权: Authorization: Bearer <api_token>
// 错误: 401 → AuthFailed；403 → PermissionDenied；其它非 2xx → SubmissionRejected
// ==========================================

use crate::domain::job::{JobStatusReport, JobTicket};
use crate::domain::product::ProductRecord;
use crate::domain::session::Session;
use crate::importer::error::{ImportError, ImportResult};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// 导入服务 Trait
#[async_trait]
pub trait SubmissionService: Send + Sync {
    /// 提交商品批次，返回任务回执
    async fn submit(&self, session: &Session, products: &[ProductRecord]) -> ImportResult<JobTicket>;

    /// 查询任务状态
    async fn poll_status(&self, session: &Session, job_id: &str) -> ImportResult<JobStatusReport>;
}

#[derive(Debug, Serialize)]
struct ImportRequest<'a> {
    account_id: &'a str,
    products: &'a [ProductRecord],
}

/// 服务端错误体: {"error": {"message": "..."}} 或 {"message": "..."}
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.error.map(|e| e.message).or(self.message)
    }
}

// ==========================================
// HttpSubmissionClient - HTTP JSON 实现
// ==========================================
pub struct HttpSubmissionClient {
    client: Client,
    base_url: String,
}

impl HttpSubmissionClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ImportResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn import_url(&self) -> String {
        format!("{}/api/v1/products/import", self.base_url)
    }

    fn status_url(&self, job_id: &str) -> String {
        format!("{}/api/v1/products/import/{}", self.base_url, job_id)
    }
}

/// 非 2xx 响应 → ImportError
async fn error_from_response(response: Response) -> ImportError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            if text.trim().is_empty() {
                status.to_string()
            } else {
                text.trim().to_string()
            }
        });

    warn!(status = status.as_u16(), message = %message, "导入服务返回错误");
    match status {
        StatusCode::UNAUTHORIZED => ImportError::AuthFailed(message),
        StatusCode::FORBIDDEN => ImportError::PermissionDenied(message),
        _ => ImportError::SubmissionRejected(message),
    }
}

#[async_trait]
impl SubmissionService for HttpSubmissionClient {
    #[instrument(skip_all, fields(account_id = %session.account_id, products = products.len()))]
    async fn submit(&self, session: &Session, products: &[ProductRecord]) -> ImportResult<JobTicket> {
        let request = ImportRequest {
            account_id: &session.account_id,
            products,
        };

        let response = self
            .client
            .post(self.import_url())
            .bearer_auth(&session.api_token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let ticket: JobTicket = response.json().await?;
        info!(job_id = %ticket.job_id, "导入任务已创建");
        Ok(ticket)
    }

    async fn poll_status(&self, session: &Session, job_id: &str) -> ImportResult<JobStatusReport> {
        let response = self
            .client
            .get(self.status_url(job_id))
            .bearer_auth(&session.api_token)
            .query(&[("account_id", session.account_id.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let report: JobStatusReport = response.json().await?;
        debug!(job_id, status = report.status.as_str(), "任务状态");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> ProductRecord {
        ProductRecord {
            sku: "SKU-1".to_string(),
            name: "Widget".to_string(),
            brand: "Acme".to_string(),
            category: None,
            image_url: None,
            base_price: Some(9.5),
            cost: None,
            msrp: None,
            row_number: 2,
        }
    }

    #[test]
    fn test_request_payload_shape() {
        let products = vec![product()];
        let request = ImportRequest {
            account_id: "acct-1",
            products: &products,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["account_id"], "acct-1");
        assert_eq!(json["products"][0]["sku"], "SKU-1");
        assert_eq!(json["products"][0]["base_price"], 9.5);
        assert!(json["products"][0].get("cost").is_none());
    }

    #[test]
    fn test_error_body_message_extraction() {
        let nested: ErrorBody = serde_json::from_str(r#"{"error":{"message":"quota exceeded"}}"#).unwrap();
        assert_eq!(nested.into_message().as_deref(), Some("quota exceeded"));

        let flat: ErrorBody = serde_json::from_str(r#"{"message":"bad account"}"#).unwrap();
        assert_eq!(flat.into_message().as_deref(), Some("bad account"));
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let client = HttpSubmissionClient::new("https://api.example.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.import_url(), "https://api.example.com/api/v1/products/import");
        assert_eq!(
            client.status_url("job-1"),
            "https://api.example.com/api/v1/products/import/job-1"
        );
    }
}

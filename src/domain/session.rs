// ==========================================
// 商品表格导入器 - 会话凭据
// ==========================================
// 职责: 账户 ID + API Token 的显式会话对象
// 生命周期: 登录成功时创建，登出时清除；不存在全局可变凭据
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub account_id: String,
    pub api_token: String,
}

impl Session {
    /// 创建会话（两项均必填，自动 TRIM）
    pub fn new(account_id: &str, api_token: &str) -> ImportResult<Self> {
        let account_id = account_id.trim();
        let api_token = api_token.trim();
        if account_id.is_empty() || api_token.is_empty() {
            return Err(ImportError::MissingCredentials);
        }
        Ok(Self {
            account_id: account_id.to_string(),
            api_token: api_token.to_string(),
        })
    }
}

// Token 不进日志
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("account_id", &self.account_id)
            .field("api_token", &"****")
            .finish()
    }
}

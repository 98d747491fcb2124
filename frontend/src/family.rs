//! 家庭与邀请码服务

use myhome_shared::protocol::{FamilyHomeRequest, InviteCodeRequest, JoinRequest, VerifyCodeRequest};
use myhome_shared::{CodeVerification, FamilyHome, JoinResponse};

use crate::api::{ApiClient, ApiError};

pub const INVITE_CODE_FIELD: &str = "join-code-input";

/// 输入框中的邀请码格式化为 `XXXX-XXXX-XXXX-XXXX`
pub fn format_invite_code(raw: &str) -> String {
    myhome_shared::normalize_invite_code(raw)
}

pub fn is_complete_code(code: &str) -> bool {
    myhome_shared::is_complete_invite_code(code)
}

pub struct Family {
    api: ApiClient,
}

impl Family {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn home(&self) -> Result<FamilyHome, ApiError> {
        self.api.send(&FamilyHomeRequest).await
    }

    /// 生成新的邀请码，旧码随即失效（仅创建者）
    pub async fn invite_code(&self) -> Result<String, ApiError> {
        Ok(self.api.send(&InviteCodeRequest).await?.invite_code)
    }

    pub async fn verify_code(&self, raw: &str) -> Result<CodeVerification, ApiError> {
        let code = checked(raw)?;
        self.api.send(&VerifyCodeRequest { code }).await
    }

    pub async fn join(&self, raw: &str) -> Result<JoinResponse, ApiError> {
        let invite_code = checked(raw)?;
        let joined = self.api.send(&JoinRequest { invite_code }).await?;
        log_info!("[Family] Joined home {}", joined.home.id);
        Ok(joined)
    }
}

fn checked(raw: &str) -> Result<String, ApiError> {
    let code = format_invite_code(raw);
    if !is_complete_code(&code) {
        return Err(ApiError::validation(INVITE_CODE_FIELD, "请输入完整的 16 位邀请码"));
    }
    Ok(code)
}

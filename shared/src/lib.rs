use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";

/// 注册时密码的最小长度（前后端共用同一规则）
pub const MIN_PASSWORD_LEN: usize = 6;

/// 邀请码有效字符数，不含分隔符
pub const INVITE_CODE_LEN: usize = 16;
const INVITE_CODE_GROUP: usize = 4;

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub room: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: String,
    /// 图片（data URL 或外链），为空表示无图
    #[serde(default)]
    pub image: String,
    pub created_at: DateTime<Utc>,
}

/// 新建物品的请求体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub room: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Member,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Home {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    #[serde(default)]
    pub invite_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<DateTime<Utc>>,
}

// =========================================================
// 响应体 (Response Payloads)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemList {
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEnvelope {
    pub item: Item,
}

/// 通用消息体，错误响应同样使用此结构 `{ "message": "..." }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyHome {
    pub home: Home,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(rename = "isOwner")]
    pub is_owner: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InviteCode {
    pub invite_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeVerification {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinResponse {
    pub message: String,
    pub home: Home,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

// =========================================================
// 邀请码格式
// =========================================================

/// 规范化邀请码输入：转大写、去掉非字母数字字符、每 4 位插入 `-`，
/// 最多保留 16 位有效字符。
pub fn normalize_invite_code(raw: &str) -> String {
    let clean: Vec<char> = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .take(INVITE_CODE_LEN)
        .collect();

    clean
        .chunks(INVITE_CODE_GROUP)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

/// 邀请码是否已输入完整（16 位有效字符）
pub fn is_complete_invite_code(code: &str) -> bool {
    code.chars().filter(|c| c.is_ascii_alphanumeric()).count() == INVITE_CODE_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_invite_code() {
        assert_eq!(normalize_invite_code("ab12"), "AB12");
        assert_eq!(normalize_invite_code("ab12c"), "AB12-C");
        assert_eq!(
            normalize_invite_code("abcd efgh-ijkl_mnop qrst"),
            "ABCD-EFGH-IJKL-MNOP"
        );
        assert_eq!(normalize_invite_code(""), "");
    }

    #[test]
    fn test_is_complete_invite_code() {
        assert!(is_complete_invite_code("ABCD-EFGH-IJKL-MNOP"));
        assert!(!is_complete_invite_code("ABCD-EFGH-IJKL"));
    }

    #[test]
    fn test_family_home_uses_camel_case_owner_flag() {
        let raw = serde_json::json!({
            "home": {
                "id": "h1",
                "name": "Test",
                "owner_id": "u1",
                "invite_code": null,
                "created_at": "2024-01-01T00:00:00Z"
            },
            "members": [],
            "isOwner": true
        });
        let parsed: FamilyHome = serde_json::from_value(raw).unwrap();
        assert!(parsed.is_owner);
        assert!(parsed.home.invite_code.is_none());
    }
}

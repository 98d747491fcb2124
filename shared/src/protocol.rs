use crate::{
    AuthResponse, CodeVerification, FamilyHome, InviteCode, ItemEnvelope, ItemList, JoinResponse,
    MeResponse, MessageResponse, NewItem,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

// =========================================================
// 路由路径（后端路由表与前端请求共用）
// =========================================================

pub mod paths {
    pub const HEALTH: &str = "/health";
    pub const REGISTER: &str = "/auth/register";
    pub const LOGIN: &str = "/auth/login";
    pub const ME: &str = "/auth/me";
    pub const ITEMS: &str = "/api/items";
    pub const ITEM: &str = "/api/items/:id";
    pub const FAMILY_HOME: &str = "/family/home";
    pub const INVITE_CODE: &str = "/family/invite-code";
    pub const VERIFY_CODE: &str = "/family/verify-code/:code";
    pub const JOIN: &str = "/family/join";
}

/// 与 `encodeURIComponent` 相同，保留 `-_.~` 之外全部转义
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// 把路径参数编码为单个路径段
pub fn encode_segment(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SEGMENT).to_string()
}

/// 后端取出路径参数时还原
pub fn decode_segment(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// 只有 POST 携带 JSON 请求体
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// The URL path, with any path parameters already substituted.
    fn path(&self) -> String;
}

// =========================================================
// Request Definitions
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for LoginRequest {
    type Response = AuthResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        paths::LOGIN.to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ApiRequest for RegisterRequest {
    type Response = AuthResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        paths::REGISTER.to_string()
    }
}

/// Fetch the user behind the current bearer token
#[derive(Debug, Serialize)]
pub struct MeRequest;

impl ApiRequest for MeRequest {
    type Response = MeResponse;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        paths::ME.to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct ListItemsRequest;

impl ApiRequest for ListItemsRequest {
    type Response = ItemList;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        paths::ITEMS.to_string()
    }
}

impl ApiRequest for NewItem {
    type Response = ItemEnvelope;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        paths::ITEMS.to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteItemRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for DeleteItemRequest {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        paths::ITEM.replace(":id", &encode_segment(&self.id))
    }
}

#[derive(Debug, Serialize)]
pub struct FamilyHomeRequest;

impl ApiRequest for FamilyHomeRequest {
    type Response = FamilyHome;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        paths::FAMILY_HOME.to_string()
    }
}

/// Rotate and return the caller's home invite code (owner only)
#[derive(Debug, Serialize)]
pub struct InviteCodeRequest;

impl ApiRequest for InviteCodeRequest {
    type Response = InviteCode;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        paths::INVITE_CODE.to_string()
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyCodeRequest {
    #[serde(skip)]
    pub code: String,
}

impl ApiRequest for VerifyCodeRequest {
    type Response = CodeVerification;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        paths::VERIFY_CODE.replace(":code", &encode_segment(&self.code))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    #[serde(default)]
    pub invite_code: String,
}

impl ApiRequest for JoinRequest {
    type Response = JoinResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        paths::JOIN.to_string()
    }
}

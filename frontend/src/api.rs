//! 后端 API 客户端
//!
//! 所有请求都经过 [`ApiClient::send`]：拼接地址、注入 Bearer token、
//! 把非 2xx 响应和网络失败归一化为 [`ApiError`]。

use std::rc::Rc;

use serde_json::Value;
use thiserror::Error;

use myhome_shared::protocol::ApiRequest;
use myhome_shared::{BEARER_PREFIX, HEADER_AUTHORIZATION};

use crate::auth::SessionStore;
use crate::web::http::{HttpClient, HttpRequest, HttpResponse};

/// 调用后端时可能出现的失败
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// 本地校验失败，未发出请求；`field` 为出错输入框的元素 id
    #[error("{message}")]
    Validation { field: &'static str, message: String },
    /// 401/403
    #[error("{0}")]
    Unauthorized(String),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Network error: Unable to reach the server")]
    Network(String),
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Rc<dyn HttpClient>,
    store: Rc<SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, http: Rc<dyn HttpClient>, store: Rc<SessionStore>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            http,
            store,
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn send<R: ApiRequest>(&self, req: &R) -> Result<R::Response, ApiError> {
        let mut request = HttpRequest::new(self.url(&req.path()), R::METHOD)
            .header("Content-Type", "application/json");

        if let Some(token) = self.store.token() {
            request = request.header(HEADER_AUTHORIZATION, &format!("{BEARER_PREFIX}{token}"));
        }

        if R::METHOD.has_body() {
            let body = serde_json::to_string(req).map_err(|e| ApiError::Decode(e.to_string()))?;
            request = request.body(body);
        }

        let response = self.http.send(request).await.map_err(|e| {
            log_warn!("[Api] {} {} failed: {e}", R::METHOD.as_str(), req.path());
            ApiError::Network(e.to_string())
        })?;

        if !response.ok() {
            return Err(error_from_response(&response));
        }

        response
            .json::<R::Response>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// 错误消息优先取 `message`，其次 `error`，都没有时给出带状态码的通用描述
fn error_from_response(response: &HttpResponse) -> ApiError {
    let parsed: Option<Value> = serde_json::from_str(&response.body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.get("error")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {}", response.status));

    match response.status {
        401 | 403 => ApiError::Unauthorized(message),
        status => ApiError::Server { status, message },
    }
}

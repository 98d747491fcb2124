use std::fmt;

use myhome_shared::MessageResponse;
use serde::{Deserialize, Serialize};

// =========================================================
// 错误状态枚举
// =========================================================

/// 错误状态枚举
/// 包含错误对应的语义（状态码）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppErrorStatus {
    /// 400: 业务逻辑校验失败
    InvalidInput,
    /// 400: JSON 解析或序列化错误
    Serialization,
    /// 401: 未登录、令牌无效或已过期
    Unauthorized,
    /// 403: 已登录但无权操作 (如非创建者生成邀请码)
    Forbidden,
    /// 404: 资源未找到
    NotFound,
    /// 409: 资源冲突 (如唯一约束冲突)
    Conflict,
    /// 500: 内部错误 (配置缺失、存储返回了意外结果)
    Store,
    /// 503: 存储服务不可达
    Unavailable,
}

impl AppErrorStatus {
    pub fn status_code(&self) -> u16 {
        match self {
            AppErrorStatus::InvalidInput | AppErrorStatus::Serialization => 400,
            AppErrorStatus::Unauthorized => 401,
            AppErrorStatus::Forbidden => 403,
            AppErrorStatus::NotFound => 404,
            AppErrorStatus::Conflict => 409,
            AppErrorStatus::Store => 500,
            AppErrorStatus::Unavailable => 503,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppErrorStatus::InvalidInput => "INVALID_INPUT",
            AppErrorStatus::Serialization => "JSON_PARSE_ERROR",
            AppErrorStatus::Unauthorized => "UNAUTHORIZED",
            AppErrorStatus::Forbidden => "FORBIDDEN",
            AppErrorStatus::NotFound => "RESOURCE_NOT_FOUND",
            AppErrorStatus::Conflict => "RESOURCE_CONFLICT",
            AppErrorStatus::Store => "INTERNAL_STORE_ERROR",
            AppErrorStatus::Unavailable => "STORE_UNAVAILABLE",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorSpan {
    /// 操作名称，如 "repo.insert_user", "auth.register"
    pub operation: String,
    /// 额外的细节信息，如表名、物品 id 等
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorSpan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: None,
        }
    }

    pub fn with_detail(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: Some(detail.into()),
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 后端统一错误
///
/// - status: 错误语义，决定 HTTP 状态码
/// - message: 面向客户端的消息（5xx 时只写日志，不外泄，503 除外）
/// - source: 原始错误（可选）
/// - spans: 调用追踪栈
#[derive(Debug)]
pub struct AppError {
    pub status: AppErrorStatus,
    pub message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    spans: Vec<ErrorSpan>,
}

impl AppError {
    pub fn new(status: AppErrorStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            source: None,
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(AppErrorStatus::InvalidInput, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(AppErrorStatus::Serialization, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(AppErrorStatus::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(AppErrorStatus::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(AppErrorStatus::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(AppErrorStatus::Conflict, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(AppErrorStatus::Store, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(AppErrorStatus::Unavailable, message)
    }

    // --- Context builders ---

    /// 添加操作追踪（无额外细节）
    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::new(operation));
        self
    }

    /// 添加操作追踪（带额外细节）
    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::with_detail(operation, detail));
        self
    }

    /// 设置原始错误源
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // --- Accessors ---

    pub fn status_code(&self) -> u16 {
        self.status.status_code()
    }

    pub fn error_code(&self) -> &'static str {
        self.status.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }

    /// 返回给客户端的 `{ "message": ... }` 响应体
    pub fn to_body(&self) -> MessageResponse {
        let message = match self.status {
            AppErrorStatus::Store => "Internal Server Error".to_string(),
            _ => self.message.clone(),
        };
        MessageResponse { message }
    }
}

// =========================================================
// Display & Error trait 实现
// =========================================================

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// =========================================================
// 类型转换实现
// =========================================================

impl From<worker::Error> for AppError {
    fn from(e: worker::Error) -> Self {
        AppError::unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::serialization(e.to_string()).with_source(e)
    }
}

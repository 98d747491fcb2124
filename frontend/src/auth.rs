//! 认证模块
//!
//! [`SessionStore`] 负责 token 与用户信息的持久化，[`Session`] 在其上提供
//! 登录、注册、注销和后端校验。会话是显式传递的对象，路由守卫和视图都从
//! 应用控制器拿到同一个 `Rc<Session>`。

use std::rc::Rc;

use myhome_shared::protocol::{LoginRequest, MeRequest, RegisterRequest};
use myhome_shared::{MIN_PASSWORD_LEN, User};

use crate::api::{ApiClient, ApiError};
use crate::web::dom::Location;
use crate::web::route::AppRoute;
use crate::web::router::NavigationTicket;
use crate::web::storage::Storage;

const TOKEN_KEY: &str = "auth_token";
const SESSION_KEY: &str = "myhome_session";

pub const EMAIL_FIELD: &str = "email";
pub const PASSWORD_FIELD: &str = "password";

// ===== 持久化 =====

pub struct SessionStore {
    storage: Rc<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Rc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<User> {
        let raw = self.storage.get(SESSION_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                log_warn!("[Auth] Discarding unreadable session record: {e}");
                self.storage.delete(SESSION_KEY);
                None
            }
        }
    }

    pub fn save(&self, token: &str, user: Option<&User>) {
        self.storage.set(TOKEN_KEY, token);
        if let Some(user) = user {
            self.save_user(user);
        }
    }

    fn save_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(raw) => {
                self.storage.set(SESSION_KEY, &raw);
            }
            Err(e) => log_error!("[Auth] Failed to encode session: {e}"),
        }
    }

    pub fn clear(&self) {
        self.storage.delete(TOKEN_KEY);
        self.storage.delete(SESSION_KEY);
    }
}

// ===== 输入校验 =====

/// 形如 `local@domain.tld`，各段非空且不含空白
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    let clean = |s: &str| !s.is_empty() && !s.contains(|c: char| c.is_whitespace() || c == '@');
    clean(local) && clean(host) && clean(tld)
}

fn validate_login(email: &str, password: &str) -> Result<(), ApiError> {
    if email.trim().is_empty() {
        return Err(ApiError::validation(EMAIL_FIELD, "Email is required"));
    }
    if password.is_empty() {
        return Err(ApiError::validation(PASSWORD_FIELD, "Password is required"));
    }
    Ok(())
}

fn validate_registration(email: &str, password: &str) -> Result<(), ApiError> {
    if !is_valid_email(email.trim()) {
        return Err(ApiError::validation(
            EMAIL_FIELD,
            "Please enter a valid email address",
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(
            PASSWORD_FIELD,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

// ===== 会话 =====

pub struct Session {
    store: Rc<SessionStore>,
    api: ApiClient,
}

impl Session {
    pub fn new(store: Rc<SessionStore>, api: ApiClient) -> Self {
        Self { store, api }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        validate_login(email, password)?;
        let response = self
            .api
            .send(&LoginRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .await?;

        self.store.save(&response.token, Some(&response.user));
        log_info!("[Auth] Logged in as {}", response.user.email);
        Ok(response.user)
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<User, ApiError> {
        validate_registration(email, password)?;
        let response = self
            .api
            .send(&RegisterRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
                name: None,
            })
            .await?;

        self.store.save(&response.token, Some(&response.user));
        log_info!("[Auth] Registered {}", response.user.email);
        Ok(response.user)
    }

    /// 仅清除本地状态，不通知后端
    pub fn logout(&self) {
        self.store.clear();
        log_info!("[Auth] Logged out");
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.token().is_some()
    }

    pub fn current_user(&self) -> Option<User> {
        self.store.user()
    }

    pub fn token(&self) -> Option<String> {
        self.store.token()
    }

    /// 向后端确认 token 仍然有效
    ///
    /// 只有服务端明确拒绝时才清除本地会话；网络或服务端故障只让本次校验失败，
    /// token 保留到下一次导航再确认。
    pub async fn verify_auth(&self) -> bool {
        if !self.is_logged_in() {
            return false;
        }

        match self.api.send(&MeRequest).await {
            Ok(me) => {
                self.store.save_user(&me.user);
                true
            }
            Err(ApiError::Unauthorized(reason)) => {
                log_warn!("[Auth] Session rejected: {reason}");
                self.store.clear();
                false
            }
            Err(e) => {
                log_warn!("[Auth] Could not verify session: {e}");
                false
            }
        }
    }

    /// 校验失败时跳转登录页；若这次导航已被更新的导航取代，则不再跳转
    pub async fn require_auth(&self, navigator: &dyn Location, ticket: &NavigationTicket) -> bool {
        if self.verify_auth().await {
            return true;
        }
        if ticket.is_current() {
            log_info!("[Auth] Access denied, redirecting to login");
            navigator.set_hash(AppRoute::auth_failure_redirect().to_path());
        }
        false
    }
}

//! 密码哈希与访问令牌
//!
//! 令牌为 HS256 JWT，`exp` 不交给 jsonwebtoken 校验（其内部读取系统时间），
//! 而是由注入的时钟比较，便于测试过期逻辑。

use std::rc::Rc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use myhome_shared::{BEARER_PREFIX, User};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

// ===== 密码 =====

/// Argon2id + 随机盐
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::store(format!("Failed to hash password: {e}")).in_op("auth.hash"))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// ===== 令牌 =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

pub type Clock = Rc<dyn Fn() -> DateTime<Utc>>;

pub struct TokenService {
    secret: String,
    ttl: Duration,
    clock: Clock,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, ttl_days: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::days(ttl_days),
            clock: Rc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn issue(&self, user: &User) -> Result<String> {
        let now = self.now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::store(format!("Failed to sign token: {e}")).in_op("auth.issue"))
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|_| AppError::unauthorized("Invalid token"))?;

        if data.claims.exp <= self.now().timestamp() {
            return Err(AppError::unauthorized("Token expired"));
        }
        Ok(data.claims)
    }
}

/// 从 `Authorization` 头中取出 Bearer 令牌
pub fn bearer_token(header: Option<&str>) -> Result<&str> {
    header
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthorized("Authentication required"))
}

use myhome_shared::{
    AuthResponse, CodeVerification, FamilyHome, Home, InviteCode, Item, ItemEnvelope, ItemList,
    JoinResponse, MIN_PASSWORD_LEN, MeResponse, MessageResponse, NewItem, Role, User,
    is_complete_invite_code, normalize_invite_code,
    protocol::{JoinRequest, LoginRequest, RegisterRequest},
};
use uuid::Uuid;

use crate::auth::{Clock, TokenService, hash_password, verify_password};
use crate::error::{AppError, Result};
use crate::repository::{Membership, Repository, UserRecord};

#[cfg(test)]
mod tests;

// 业务逻辑层：纯 Rust，不依赖 worker 的 Env / Request / Response，
// 测试时注入内存仓库。

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// 16 位大写字母数字，按 4 位分组
fn generate_invite_code() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    normalize_invite_code(&raw)
}

async fn membership_of<R: Repository>(repo: &R, user_id: &str) -> Result<Membership> {
    repo.membership_of(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Home not found").in_op_with("membership_of", user_id))
}

// ===== 认证 =====

pub struct AuthLogic<'a, R: Repository> {
    repo: &'a R,
    tokens: &'a TokenService,
}

impl<'a, R: Repository> AuthLogic<'a, R> {
    pub fn new(repo: &'a R, tokens: &'a TokenService) -> Self {
        Self { repo, tokens }
    }

    /// 注册并创建用户自己的家庭（创建者身份）
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse> {
        let email = req.email.trim().to_lowercase();
        if email.is_empty() || req.password.is_empty() {
            return Err(AppError::invalid_input("Email and password are required"));
        }
        if !email.contains('@') {
            return Err(AppError::invalid_input("Please enter a valid email address"));
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.repo.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::invalid_input("Email already registered"));
        }

        let name = req
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let now = self.tokens.now();
        let record = UserRecord {
            id: new_id(),
            email: email.clone(),
            name: name.clone(),
            password_hash: hash_password(&req.password)?,
            created_at: now,
        };
        self.repo.insert_user(&record).await.map_err(|e| {
            // 并发注册同一邮箱时由唯一约束兜底
            if e.status_code() == 409 {
                AppError::invalid_input("Email already registered")
            } else {
                e.in_op("auth.register")
            }
        })?;

        let display = name.unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
        let home = Home {
            id: new_id(),
            name: format!("{display}的家"),
            owner_id: record.id.clone(),
            invite_code: None,
            created_at: now,
        };
        self.repo.insert_home(&home).await?;
        self.repo
            .save_membership(&Membership {
                home_id: home.id.clone(),
                user_id: record.id.clone(),
                role: Role::Owner,
                joined_at: now,
            })
            .await?;

        log_info!("[Auth] Registered user {}", record.id);
        let user = record.to_user();
        Ok(AuthResponse {
            token: self.tokens.issue(&user)?,
            user,
        })
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
        let email = req.email.trim().to_lowercase();
        if email.is_empty() || req.password.is_empty() {
            return Err(AppError::invalid_input("Email and password are required"));
        }
        let record = self
            .repo
            .find_user_by_email(&email)
            .await?
            .filter(|u| verify_password(&req.password, &u.password_hash))
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

        let user = record.to_user();
        Ok(AuthResponse {
            token: self.tokens.issue(&user)?,
            user,
        })
    }

    /// 校验令牌并返回其对应的用户
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.tokens.verify(token)?;
        self.repo
            .find_user(&claims.sub)
            .await?
            .map(|u| u.to_user())
            .ok_or_else(|| AppError::unauthorized("User not found"))
    }

    pub async fn me(&self, token: &str) -> Result<MeResponse> {
        Ok(MeResponse {
            user: self.authenticate(token).await?,
        })
    }
}

// ===== 物品 =====

pub struct ItemLogic<'a, R: Repository> {
    repo: &'a R,
    clock: Clock,
}

impl<'a, R: Repository> ItemLogic<'a, R> {
    pub fn new(repo: &'a R, clock: Clock) -> Self {
        Self { repo, clock }
    }

    /// 当前用户所在家庭的物品，最新的在前
    pub async fn list(&self, user: &User) -> Result<ItemList> {
        let membership = membership_of(self.repo, &user.id).await?;
        Ok(ItemList {
            items: self.repo.list_items(&membership.home_id).await?,
        })
    }

    pub async fn create(&self, user: &User, req: NewItem) -> Result<ItemEnvelope> {
        let name = req.name.trim();
        let room = req.room.trim();
        if name.is_empty() || room.is_empty() {
            return Err(AppError::invalid_input("Name and room are required"));
        }

        let membership = membership_of(self.repo, &user.id).await?;
        let item = Item {
            id: new_id(),
            name: name.to_string(),
            room: room.to_string(),
            category: req
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            notes: req.notes.trim().to_string(),
            image: req.image,
            created_at: (self.clock)(),
        };
        self.repo
            .insert_item(&membership.home_id, &user.id, &item)
            .await
            .map_err(|e| e.in_op_with("items.create", &membership.home_id))?;
        Ok(ItemEnvelope { item })
    }

    pub async fn delete(&self, user: &User, item_id: &str) -> Result<MessageResponse> {
        let membership = membership_of(self.repo, &user.id).await?;
        if !self.repo.delete_item(&membership.home_id, item_id).await? {
            return Err(AppError::not_found("Item not found").in_op_with("items.delete", item_id));
        }
        Ok(MessageResponse {
            message: "Item deleted".to_string(),
        })
    }
}

// ===== 家庭 =====

pub struct FamilyLogic<'a, R: Repository> {
    repo: &'a R,
    clock: Clock,
}

impl<'a, R: Repository> FamilyLogic<'a, R> {
    pub fn new(repo: &'a R, clock: Clock) -> Self {
        Self { repo, clock }
    }

    async fn current_home(&self, user: &User) -> Result<(Membership, Home)> {
        let membership = membership_of(self.repo, &user.id).await?;
        let home = self
            .repo
            .get_home(&membership.home_id)
            .await?
            .ok_or_else(|| AppError::not_found("Home not found"))?;
        Ok((membership, home))
    }

    pub async fn home(&self, user: &User) -> Result<FamilyHome> {
        let (_, home) = self.current_home(user).await?;
        let members = self.repo.list_members(&home.id).await?;
        Ok(FamilyHome {
            is_owner: home.owner_id == user.id,
            home,
            members,
        })
    }

    /// 仅创建者可用；每次调用都生成新的邀请码，旧码随即失效
    pub async fn invite_code(&self, user: &User) -> Result<InviteCode> {
        let (membership, home) = self.current_home(user).await?;
        if membership.role != Role::Owner || home.owner_id != user.id {
            return Err(AppError::forbidden("Only the home owner can generate invite codes"));
        }
        let code = generate_invite_code();
        self.repo.set_invite_code(&home.id, &code).await?;
        log_info!("[Family] Rotated invite code for home {}", home.id);
        Ok(InviteCode { invite_code: code })
    }

    pub async fn verify_code(&self, raw: &str) -> Result<CodeVerification> {
        let code = normalize_invite_code(raw);
        if !is_complete_invite_code(&code) {
            return Ok(CodeVerification {
                valid: false,
                home_name: None,
            });
        }
        let home = self.repo.find_home_by_invite_code(&code).await?;
        Ok(CodeVerification {
            valid: home.is_some(),
            home_name: home.map(|h| h.name),
        })
    }

    /// 加入邀请码对应的家庭，用户的成员关系随之迁移
    pub async fn join(&self, user: &User, req: JoinRequest) -> Result<JoinResponse> {
        let code = normalize_invite_code(&req.invite_code);
        let home = if is_complete_invite_code(&code) {
            self.repo.find_home_by_invite_code(&code).await?
        } else {
            None
        };
        let home = home.ok_or_else(|| AppError::invalid_input("Invalid invite code"))?;

        if let Some(current) = self.repo.membership_of(&user.id).await? {
            if current.home_id == home.id {
                return Err(AppError::invalid_input("You are already a member of this home"));
            }
        }

        self.repo
            .save_membership(&Membership {
                home_id: home.id.clone(),
                user_id: user.id.clone(),
                role: Role::Member,
                joined_at: (self.clock)(),
            })
            .await
            .map_err(|e| e.in_op_with("family.join", &home.id))?;

        log_info!("[Family] User {} joined home {}", user.id, home.id);
        Ok(JoinResponse {
            message: format!("Joined {}", home.name),
            home,
        })
    }
}

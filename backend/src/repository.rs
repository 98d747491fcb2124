use chrono::{DateTime, Utc};
use myhome_shared::{Home, Item, Member, Role, User};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use worker::Url;

use crate::error::{AppError, Result};
use crate::utils::request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};

// =========================================================
// 存储记录
// =========================================================

/// `users` 表中的一行，包含密码哈希，不直接返回给客户端
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            created_at: Some(self.created_at),
        }
    }
}

/// `home_members` 表中的一行；每个用户同一时间只属于一个家庭
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub home_id: String,
    pub user_id: String,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

// 定义仓库 Trait
#[async_trait::async_trait(?Send)]
pub trait Repository {
    // 用户
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;
    async fn find_user(&self, id: &str) -> Result<Option<UserRecord>>;
    async fn insert_user(&self, user: &UserRecord) -> Result<()>;

    // 家庭与成员
    async fn insert_home(&self, home: &Home) -> Result<()>;
    async fn get_home(&self, id: &str) -> Result<Option<Home>>;
    async fn find_home_by_invite_code(&self, code: &str) -> Result<Option<Home>>;
    async fn set_invite_code(&self, home_id: &str, code: &str) -> Result<()>;
    async fn membership_of(&self, user_id: &str) -> Result<Option<Membership>>;
    async fn list_members(&self, home_id: &str) -> Result<Vec<Member>>;
    /// 写入成员关系，替换该用户已有的成员关系
    async fn save_membership(&self, membership: &Membership) -> Result<()>;

    // 物品
    async fn list_items(&self, home_id: &str) -> Result<Vec<Item>>;
    async fn insert_item(&self, home_id: &str, created_by: &str, item: &Item) -> Result<()>;
    async fn delete_item(&self, home_id: &str, item_id: &str) -> Result<bool>;
}

// =========================================================
// Supabase (PostgREST) 实现
// =========================================================

const TABLE_USERS: &str = "users";
const TABLE_HOMES: &str = "homes";
const TABLE_MEMBERS: &str = "home_members";
const TABLE_ITEMS: &str = "items";

const ITEM_COLUMNS: &str = "id,name,room,category,notes,image,created_at";
const MEMBER_COLUMNS: &str = "user_id,role,joined_at,users(email)";

/// PostgreSQL unique_violation
const PG_UNIQUE_VIOLATION: &str = "23505";

#[derive(Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct MemberEmail {
    email: String,
}

#[derive(Deserialize)]
struct MemberRow {
    user_id: String,
    role: Role,
    #[serde(default)]
    joined_at: Option<DateTime<Utc>>,
    #[serde(default)]
    users: Option<MemberEmail>,
}

#[derive(Serialize)]
struct ItemRow<'a> {
    #[serde(flatten)]
    item: &'a Item,
    home_id: &'a str,
    created_by: &'a str,
}

pub struct SupabaseRepository<C: HttpClient> {
    base_url: String,
    key: String,
    http: C,
}

impl<C: HttpClient> SupabaseRepository<C> {
    pub fn new(base_url: &str, key: &str, http: C) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            http,
        }
    }

    fn url(&self, table: &str, query: &[(&str, String)]) -> Result<String> {
        let mut url = Url::parse(&format!("{}/rest/v1/{}", self.base_url, table)).map_err(|e| {
            AppError::store(format!("Invalid store url: {e}")).in_op_with("repo.url", table)
        })?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url.to_string())
    }

    fn request(&self, method: HttpMethod, url: &str) -> HttpRequest {
        HttpRequest::new(url, method)
            .with_header("apikey", &self.key)
            .with_header("Authorization", &format!("Bearer {}", self.key))
            .with_header("Content-Type", "application/json")
    }

    async fn execute(&self, req: HttpRequest, table: &str) -> Result<HttpResponse> {
        let op = format!("repo.{:?}", req.method).to_lowercase();
        let resp = self
            .http
            .send(req)
            .await
            .map_err(|e| e.in_op_with(op.clone(), table))?;
        if resp.is_success() {
            return Ok(resp);
        }
        Err(store_error(&resp).in_op_with(op, table))
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let url = self.url(table, query)?;
        let resp = self.execute(self.request(HttpMethod::Get, &url), table).await?;
        resp.json()
    }

    async fn select_one<T: DeserializeOwned>(&self, table: &str, filter: (&str, String)) -> Result<Option<T>> {
        let query = [filter, ("limit", "1".to_string())];
        let rows: Vec<T> = self.select(table, &query).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert<T: Serialize>(&self, table: &str, row: &T) -> Result<()> {
        let url = self.url(table, &[])?;
        let req = self
            .request(HttpMethod::Post, &url)
            .with_header("Prefer", "return=minimal")
            .with_body(serde_json::to_value(row)?);
        self.execute(req, table).await?;
        Ok(())
    }

    async fn update(&self, table: &str, query: &[(&str, String)], patch: serde_json::Value) -> Result<()> {
        let url = self.url(table, query)?;
        let req = self
            .request(HttpMethod::Patch, &url)
            .with_header("Prefer", "return=minimal")
            .with_body(patch);
        self.execute(req, table).await?;
        Ok(())
    }

    /// 返回被删除的行数
    async fn delete(&self, table: &str, query: &[(&str, String)]) -> Result<usize> {
        let url = self.url(table, query)?;
        let req = self
            .request(HttpMethod::Delete, &url)
            .with_header("Prefer", "return=representation");
        let resp = self.execute(req, table).await?;
        let rows: Vec<serde_json::Value> = resp.json()?;
        Ok(rows.len())
    }
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

fn store_error(resp: &HttpResponse) -> AppError {
    let detail = serde_json::from_str::<PostgrestError>(&resp.body).ok();
    let message = detail
        .as_ref()
        .map(|d| d.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Store responded with status {}", resp.status));
    let unique_violation = detail.is_some_and(|d| d.code == PG_UNIQUE_VIOLATION);

    match resp.status {
        409 => AppError::conflict(message),
        _ if unique_violation => AppError::conflict(message),
        s if s >= 500 => AppError::unavailable("Storage service unavailable")
            .in_op_with("store.status", s.to_string()),
        _ => AppError::store(message),
    }
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient> Repository for SupabaseRepository<C> {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        self.select_one(TABLE_USERS, ("email", eq(email))).await
    }

    async fn find_user(&self, id: &str) -> Result<Option<UserRecord>> {
        self.select_one(TABLE_USERS, ("id", eq(id))).await
    }

    async fn insert_user(&self, user: &UserRecord) -> Result<()> {
        self.insert(TABLE_USERS, user).await
    }

    async fn insert_home(&self, home: &Home) -> Result<()> {
        self.insert(TABLE_HOMES, home).await
    }

    async fn get_home(&self, id: &str) -> Result<Option<Home>> {
        self.select_one(TABLE_HOMES, ("id", eq(id))).await
    }

    async fn find_home_by_invite_code(&self, code: &str) -> Result<Option<Home>> {
        self.select_one(TABLE_HOMES, ("invite_code", eq(code))).await
    }

    async fn set_invite_code(&self, home_id: &str, code: &str) -> Result<()> {
        self.update(
            TABLE_HOMES,
            &[("id", eq(home_id))],
            serde_json::json!({ "invite_code": code }),
        )
        .await
    }

    async fn membership_of(&self, user_id: &str) -> Result<Option<Membership>> {
        self.select_one(TABLE_MEMBERS, ("user_id", eq(user_id))).await
    }

    async fn list_members(&self, home_id: &str) -> Result<Vec<Member>> {
        let query = [
            ("select", MEMBER_COLUMNS.to_string()),
            ("home_id", eq(home_id)),
            ("order", "joined_at.asc".to_string()),
        ];
        let rows: Vec<MemberRow> = self.select(TABLE_MEMBERS, &query).await?;
        Ok(rows
            .into_iter()
            .map(|row| Member {
                user_id: row.user_id,
                email: row.users.map(|u| u.email).unwrap_or_default(),
                role: row.role,
                joined_at: row.joined_at,
            })
            .collect())
    }

    async fn save_membership(&self, membership: &Membership) -> Result<()> {
        self.delete(TABLE_MEMBERS, &[("user_id", eq(&membership.user_id))])
            .await?;
        self.insert(TABLE_MEMBERS, membership).await
    }

    async fn list_items(&self, home_id: &str) -> Result<Vec<Item>> {
        let query = [
            ("select", ITEM_COLUMNS.to_string()),
            ("home_id", eq(home_id)),
            ("order", "created_at.desc".to_string()),
        ];
        self.select(TABLE_ITEMS, &query).await
    }

    async fn insert_item(&self, home_id: &str, created_by: &str, item: &Item) -> Result<()> {
        let row = ItemRow {
            item,
            home_id,
            created_by,
        };
        self.insert(TABLE_ITEMS, &row).await
    }

    async fn delete_item(&self, home_id: &str, item_id: &str) -> Result<bool> {
        let deleted = self
            .delete(TABLE_ITEMS, &[("id", eq(item_id)), ("home_id", eq(home_id))])
            .await?;
        Ok(deleted > 0)
    }
}

// =========================================================
// 内存 Mock 实现
// =========================================================

//! 测试替身：内存地址栏、内存文档和一个模拟后端

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use leptos::prelude::*;
use serde_json::{Value, json};

use myhome_shared::protocol::decode_segment;
use myhome_shared::{
    BEARER_PREFIX, HEADER_AUTHORIZATION, Home, Item, MIN_PASSWORD_LEN, Member, NewItem, Role, User,
};

use crate::web::dom::{ChangeListener, Document, LazyView, Location, ViewContainer};
use crate::web::http::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse};
use crate::web::route::ShellKind;

// ===== Location =====

pub struct MemoryLocation {
    hash: RefCell<String>,
    listener: RefCell<Option<ChangeListener>>,
    pushes: RefCell<Vec<String>>,
    replaces: Cell<usize>,
}

impl MemoryLocation {
    pub fn new(hash: &str) -> Self {
        Self {
            hash: RefCell::new(hash.to_string()),
            listener: RefCell::new(None),
            pushes: RefCell::new(Vec::new()),
            replaces: Cell::new(0),
        }
    }

    /// 模拟浏览器派发 hashchange
    pub async fn fire_change(&self) {
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener().await;
        }
    }

    pub fn pushes(&self) -> Vec<String> {
        self.pushes.borrow().clone()
    }

    pub fn replace_count(&self) -> usize {
        self.replaces.get()
    }
}

impl Location for MemoryLocation {
    fn hash(&self) -> String {
        self.hash.borrow().clone()
    }

    fn set_hash(&self, path: &str) {
        *self.hash.borrow_mut() = format!("#{path}");
        self.pushes.borrow_mut().push(path.to_string());
    }

    fn replace_hash(&self, path: &str) {
        *self.hash.borrow_mut() = format!("#{path}");
        self.replaces.set(self.replaces.get() + 1);
    }

    fn on_change(&self, listener: ChangeListener) {
        *self.listener.borrow_mut() = Some(listener);
    }
}

// ===== Document =====

/// 在独立的响应式 owner 中构建视图并渲染为 HTML
pub fn render_html(view: LazyView) -> String {
    let owner = Owner::new_root(None);
    owner.with(|| view.build().to_html())
}

/// 挂载时立即渲染，保存最近一次的 HTML
#[derive(Default)]
pub struct MemoryContainer {
    html: RefCell<String>,
}

impl ViewContainer for MemoryContainer {
    fn mount(&self, view: LazyView) {
        *self.html.borrow_mut() = render_html(view);
    }
}

/// 每次挂载外壳都会生成新的 `#view`，应用外壳还会生成新的头部节点编号
#[derive(Default)]
pub struct MemoryDocument {
    shell: Cell<Option<ShellKind>>,
    shell_markup: RefCell<String>,
    mounts: Cell<usize>,
    header_id: Cell<Option<u64>>,
    next_node: Cell<u64>,
    view: RefCell<Option<Rc<MemoryContainer>>>,
    active_nav: RefCell<Option<String>>,
}

impl MemoryDocument {
    /// 带有一个预先存在的 `#view`
    pub fn with_view() -> Self {
        let doc = Self::default();
        *doc.view.borrow_mut() = Some(Rc::new(MemoryContainer::default()));
        doc
    }

    pub fn view_html(&self) -> String {
        self.view
            .borrow()
            .as_ref()
            .map(|v| v.html.borrow().clone())
            .unwrap_or_default()
    }

    pub fn shell(&self) -> Option<ShellKind> {
        self.shell.get()
    }

    pub fn shell_markup(&self) -> String {
        self.shell_markup.borrow().clone()
    }

    pub fn mounts(&self) -> usize {
        self.mounts.get()
    }

    pub fn header_id(&self) -> Option<u64> {
        self.header_id.get()
    }

    pub fn active_nav(&self) -> Option<String> {
        self.active_nav.borrow().clone()
    }
}

impl Document for MemoryDocument {
    fn mount_shell(&self, kind: ShellKind, shell: LazyView) {
        let node = self.next_node.get() + 1;
        self.next_node.set(node);
        self.shell.set(Some(kind));
        *self.shell_markup.borrow_mut() = render_html(shell);
        self.mounts.set(self.mounts.get() + 1);
        self.header_id
            .set((kind == ShellKind::App).then_some(node));
        *self.view.borrow_mut() = Some(Rc::new(MemoryContainer::default()));
        *self.active_nav.borrow_mut() = None;
    }

    fn view_container(&self) -> Option<Rc<dyn ViewContainer>> {
        self.view
            .borrow()
            .clone()
            .map(|v| v as Rc<dyn ViewContainer>)
    }

    fn set_active_nav(&self, path: &str) {
        *self.active_nav.borrow_mut() = Some(path.to_string());
    }
}

// ===== Backend =====

struct Account {
    user: User,
    password: String,
    home_id: String,
}

/// 按真实接口约定响应的内存后端
#[derive(Default)]
pub struct FakeBackend {
    accounts: RefCell<Vec<Account>>,
    homes: RefCell<HashMap<String, Home>>,
    items: RefCell<HashMap<String, Vec<Item>>>,
    revoked: RefCell<Vec<String>>,
    offline: Cell<bool>,
    counter: Cell<u64>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl FakeBackend {
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    /// 让某个 token 在服务端失效
    pub fn revoke(&self, token: &str) {
        self.revoked.borrow_mut().push(token.to_string());
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self, path: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.url.ends_with(path))
            .count()
    }

    /// 直接创建账号，返回 token
    pub fn seed_user(&self, email: &str, password: &str) -> String {
        let (status, body) = self.register(json!({ "email": email, "password": password }));
        assert_eq!(status, 201, "seed failed: {body}");
        body["token"].as_str().unwrap_or_default().to_string()
    }

    pub fn seed_item(&self, token: &str, name: &str, room: &str) {
        let (status, _) = self.add_item(
            token,
            NewItem {
                name: name.into(),
                room: room.into(),
                ..Default::default()
            },
        );
        assert_eq!(status, 201);
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        format!("{prefix}-{n}")
    }

    fn now(&self) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::seconds(self.counter.get() as i64)
    }

    fn account_for(&self, req: &HttpRequest) -> Option<(String, String)> {
        let token = req
            .header_value(HEADER_AUTHORIZATION)?
            .strip_prefix(BEARER_PREFIX)?
            .to_string();
        if self.revoked.borrow().contains(&token) {
            return None;
        }
        let user_id = token.strip_prefix("token-")?;
        self.accounts
            .borrow()
            .iter()
            .find(|a| a.user.id == user_id)
            .map(|a| (a.user.id.clone(), a.home_id.clone()))
    }

    fn register(&self, body: Value) -> (u16, Value) {
        let email = body["email"].as_str().unwrap_or_default().to_string();
        let password = body["password"].as_str().unwrap_or_default().to_string();
        if email.is_empty() || password.is_empty() {
            return (400, json!({ "message": "Email and password are required" }));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return (400, json!({ "message": "Password must be at least 6 characters" }));
        }
        if self.accounts.borrow().iter().any(|a| a.user.email == email) {
            return (400, json!({ "message": "Email already registered" }));
        }

        let user = User {
            id: self.next_id("user"),
            email: email.clone(),
            name: None,
            created_at: None,
        };
        let home = Home {
            id: self.next_id("home"),
            name: format!("{email}的家"),
            owner_id: user.id.clone(),
            invite_code: None,
            created_at: self.now(),
        };
        self.homes.borrow_mut().insert(home.id.clone(), home.clone());
        self.accounts.borrow_mut().push(Account {
            user: user.clone(),
            password,
            home_id: home.id,
        });
        (201, json!({ "token": format!("token-{}", user.id), "user": user }))
    }

    fn login(&self, body: Value) -> (u16, Value) {
        let email = body["email"].as_str().unwrap_or_default();
        let password = body["password"].as_str().unwrap_or_default();
        let accounts = self.accounts.borrow();
        match accounts
            .iter()
            .find(|a| a.user.email == email && a.password == password)
        {
            Some(account) => (
                200,
                json!({ "token": format!("token-{}", account.user.id), "user": account.user }),
            ),
            None => (401, json!({ "message": "Invalid email or password" })),
        }
    }

    fn add_item(&self, token: &str, item: NewItem) -> (u16, Value) {
        let req = HttpRequest::new("seed", HttpMethod::Post)
            .header(HEADER_AUTHORIZATION, &format!("{BEARER_PREFIX}{token}"));
        let Some((_, home_id)) = self.account_for(&req) else {
            return (401, json!({ "message": "Unauthorized" }));
        };
        self.create_item(&home_id, item)
    }

    fn create_item(&self, home_id: &str, item: NewItem) -> (u16, Value) {
        if item.name.trim().is_empty() || item.room.trim().is_empty() {
            return (400, json!({ "message": "Name and room are required" }));
        }
        let created = Item {
            id: self.next_id("item"),
            name: item.name,
            room: item.room,
            category: item.category,
            notes: item.notes,
            image: item.image,
            created_at: self.now(),
        };
        self.items
            .borrow_mut()
            .entry(home_id.to_string())
            .or_default()
            .push(created.clone());
        (201, json!({ "item": created }))
    }

    fn members_of(&self, home_id: &str) -> Vec<Member> {
        let homes = self.homes.borrow();
        let owner = homes.get(home_id).map(|h| h.owner_id.clone());
        self.accounts
            .borrow()
            .iter()
            .filter(|a| a.home_id == home_id)
            .map(|a| Member {
                user_id: a.user.id.clone(),
                email: a.user.email.clone(),
                role: if owner.as_deref() == Some(a.user.id.as_str()) {
                    Role::Owner
                } else {
                    Role::Member
                },
                joined_at: None,
            })
            .collect()
    }

    fn route(&self, req: &HttpRequest) -> (u16, Value) {
        let path = req
            .url
            .find("://")
            .and_then(|i| req.url[i + 3..].find('/').map(|j| &req.url[i + 3 + j..]))
            .unwrap_or(&req.url)
            .to_string();
        let body: Value = req
            .body
            .as_deref()
            .and_then(|b| serde_json::from_str(b).ok())
            .unwrap_or(Value::Null);

        match (req.method, path.as_str()) {
            (HttpMethod::Post, "/auth/register") => return self.register(body),
            (HttpMethod::Post, "/auth/login") => return self.login(body),
            _ => {}
        }

        let Some((user_id, home_id)) = self.account_for(req) else {
            return (401, json!({ "message": "Invalid or expired token" }));
        };

        match (req.method, path.as_str()) {
            (HttpMethod::Get, "/auth/me") => {
                let accounts = self.accounts.borrow();
                let user = accounts.iter().find(|a| a.user.id == user_id).map(|a| &a.user);
                (200, json!({ "user": user }))
            }
            (HttpMethod::Get, "/api/items") => {
                let mut items = self.items.borrow().get(&home_id).cloned().unwrap_or_default();
                items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                (200, json!({ "items": items }))
            }
            (HttpMethod::Post, "/api/items") => match serde_json::from_value::<NewItem>(body) {
                Ok(item) => self.create_item(&home_id, item),
                Err(_) => (400, json!({ "message": "Invalid item" })),
            },
            (HttpMethod::Delete, p) if p.starts_with("/api/items/") => {
                let id = decode_segment(&p["/api/items/".len()..]);
                let mut items = self.items.borrow_mut();
                let list = items.entry(home_id).or_default();
                let before = list.len();
                list.retain(|i| i.id != id);
                if list.len() == before {
                    (404, json!({ "message": "Item not found" }))
                } else {
                    (200, json!({ "message": "Item deleted" }))
                }
            }
            (HttpMethod::Get, "/family/home") => {
                let home = self.homes.borrow().get(&home_id).cloned();
                let is_owner = home.as_ref().is_some_and(|h| h.owner_id == user_id);
                (
                    200,
                    json!({ "home": home, "members": self.members_of(&home_id), "isOwner": is_owner }),
                )
            }
            (HttpMethod::Get, "/family/invite-code") => {
                let mut homes = self.homes.borrow_mut();
                let Some(home) = homes.get_mut(&home_id) else {
                    return (404, json!({ "message": "Home not found" }));
                };
                if home.owner_id != user_id {
                    return (403, json!({ "message": "Only the owner can generate invite codes" }));
                }
                let code = myhome_shared::normalize_invite_code(&format!(
                    "{:0>16}",
                    self.next_id("C").replace('-', "")
                ));
                home.invite_code = Some(code.clone());
                (200, json!({ "invite_code": code }))
            }
            (HttpMethod::Get, p) if p.starts_with("/family/verify-code/") => {
                let code = decode_segment(&p["/family/verify-code/".len()..]);
                let homes = self.homes.borrow();
                match homes.values().find(|h| h.invite_code.as_deref() == Some(code.as_str())) {
                    Some(home) => (200, json!({ "valid": true, "home_name": home.name })),
                    None => (200, json!({ "valid": false })),
                }
            }
            (HttpMethod::Post, "/family/join") => {
                let code = body["invite_code"].as_str().unwrap_or_default();
                let target = self
                    .homes
                    .borrow()
                    .values()
                    .find(|h| h.invite_code.as_deref() == Some(code))
                    .cloned();
                let Some(target) = target else {
                    return (404, json!({ "message": "Invalid invite code" }));
                };
                if target.id == home_id {
                    return (400, json!({ "message": "You are already a member of this home" }));
                }
                for account in self.accounts.borrow_mut().iter_mut() {
                    if account.user.id == user_id {
                        account.home_id = target.id.clone();
                    }
                }
                (
                    200,
                    json!({ "message": format!("Joined {}", target.name), "home": target }),
                )
            }
            _ => (404, json!({ "message": "Not Found" })),
        }
    }
}

#[async_trait(?Send)]
impl HttpClient for FakeBackend {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.borrow_mut().push(req.clone());
        if self.offline.get() {
            return Err(HttpError::NetworkError("Failed to fetch".to_string()));
        }
        let (status, body) = self.route(&req);
        Ok(HttpResponse {
            status,
            body: body.to_string(),
        })
    }
}

use super::*;
use crate::error::AppErrorStatus;
use crate::repository::tests::MemoryRepository;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::Cell;
use std::rc::Rc;

// =========================================================
// 辅助函数
// =========================================================

fn tokens() -> TokenService {
    TokenService::new("test-secret", 7)
}

fn clock() -> Clock {
    Rc::new(Utc::now)
}

/// 每次读取都前进一分钟的时钟
fn ticking_clock(start: DateTime<Utc>) -> Clock {
    let ticks = Rc::new(Cell::new(0i64));
    Rc::new(move || {
        let n = ticks.get();
        ticks.set(n + 1);
        start + Duration::minutes(n)
    })
}

fn register_req(email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: password.to_string(),
        name: None,
    }
}

async fn register(repo: &MemoryRepository, tokens: &TokenService, email: &str) -> User {
    AuthLogic::new(repo, tokens)
        .register(register_req(email, "secret1"))
        .await
        .unwrap()
        .user
}

fn new_item(name: &str, room: &str) -> NewItem {
    NewItem {
        name: name.to_string(),
        room: room.to_string(),
        ..Default::default()
    }
}

// =========================================================
// 认证
// =========================================================

#[tokio::test]
async fn test_register_login_me() {
    let repo = MemoryRepository::new();
    let tokens = tokens();
    let auth = AuthLogic::new(&repo, &tokens);

    let registered = auth
        .register(register_req(" Alice@Home.io ", "secret1"))
        .await
        .unwrap();
    assert_eq!(registered.user.email, "alice@home.io");
    assert!(!registered.token.is_empty());

    let logged_in = auth
        .login(LoginRequest {
            email: "alice@home.io".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap();
    assert_eq!(logged_in.user.id, registered.user.id);

    let me = auth.me(&logged_in.token).await.unwrap();
    assert_eq!(me.user.email, "alice@home.io");

    // 密码只以哈希形式保存
    let stored = repo.users.borrow()[0].password_hash.clone();
    assert!(stored.starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_register_creates_owned_home() {
    let repo = MemoryRepository::new();
    let tokens = tokens();
    let user = AuthLogic::new(&repo, &tokens)
        .register(RegisterRequest {
            email: "bob@home.io".into(),
            password: "secret1".into(),
            name: Some("Bob".into()),
        })
        .await
        .unwrap()
        .user;

    let family = FamilyLogic::new(&repo, clock()).home(&user).await.unwrap();
    assert_eq!(family.home.name, "Bob的家");
    assert!(family.is_owner);
    assert_eq!(family.members.len(), 1);
    assert_eq!(family.members[0].role, Role::Owner);
    assert_eq!(family.members[0].email, "bob@home.io");

    // 未提供名字时使用邮箱前缀
    let carol = register(&repo, &tokens, "carol@home.io").await;
    let family = FamilyLogic::new(&repo, clock()).home(&carol).await.unwrap();
    assert_eq!(family.home.name, "carol的家");
}

#[tokio::test]
async fn test_register_validation() {
    let repo = MemoryRepository::new();
    let tokens = tokens();
    let auth = AuthLogic::new(&repo, &tokens);

    let err = auth.register(register_req("a@home.io", "12345")).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(err.message().contains("at least 6"));

    let err = auth.register(register_req("", "secret1")).await.unwrap_err();
    assert_eq!(err.message(), "Email and password are required");

    let err = auth.register(register_req("not-an-email", "secret1")).await.unwrap_err();
    assert_eq!(err.status, AppErrorStatus::InvalidInput);

    register(&repo, &tokens, "a@home.io").await;
    let err = auth.register(register_req("A@home.io", "secret2")).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.message(), "Email already registered");
    assert_eq!(repo.users.borrow().len(), 1);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let repo = MemoryRepository::new();
    let tokens = tokens();
    register(&repo, &tokens, "a@home.io").await;
    let auth = AuthLogic::new(&repo, &tokens);

    for (email, password) in [("a@home.io", "wrong-pass"), ("nobody@home.io", "secret1")] {
        let err = auth
            .login(LoginRequest {
                email: email.into(),
                password: password.into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), "Invalid email or password");
    }
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let repo = MemoryRepository::new();
    let start = Utc::now();
    let days = Rc::new(Cell::new(0i64));
    let clock_days = days.clone();
    let tokens = TokenService::new("test-secret", 7)
        .with_clock(Rc::new(move || start + Duration::days(clock_days.get())));

    let token = AuthLogic::new(&repo, &tokens)
        .register(register_req("a@home.io", "secret1"))
        .await
        .unwrap()
        .token;

    days.set(8);
    let err = AuthLogic::new(&repo, &tokens).me(&token).await.unwrap_err();
    assert_eq!(err.status_code(), 401);

    let err = AuthLogic::new(&repo, &tokens).me("garbage").await.unwrap_err();
    assert_eq!(err.status_code(), 401);
}

#[tokio::test]
async fn test_store_outage_is_unavailable() {
    let repo = MemoryRepository::new();
    repo.offline.set(true);
    let tokens = tokens();
    let err = AuthLogic::new(&repo, &tokens)
        .register(register_req("a@home.io", "secret1"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 503);
}

// =========================================================
// 物品
// =========================================================

#[tokio::test]
async fn test_create_then_delete_item() {
    let repo = MemoryRepository::new();
    let tokens = tokens();
    let user = register(&repo, &tokens, "a@home.io").await;
    let items = ItemLogic::new(&repo, clock());

    let created = items
        .create(
            &user,
            NewItem {
                name: "  Lamp ".into(),
                room: "Bedroom".into(),
                category: Some(" ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .item;
    assert_eq!(created.name, "Lamp");
    assert_eq!(created.category, None);

    let listed = items.list(&user).await.unwrap().items;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);

    items.delete(&user, &created.id).await.unwrap();
    assert!(items.list(&user).await.unwrap().items.is_empty());

    let err = items.delete(&user, &created.id).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_create_item_requires_name_and_room() {
    let repo = MemoryRepository::new();
    let tokens = tokens();
    let user = register(&repo, &tokens, "a@home.io").await;
    let items = ItemLogic::new(&repo, clock());

    for req in [new_item("", "Kitchen"), new_item("Lamp", "  ")] {
        let err = items.create(&user, req).await.unwrap_err();
        assert_eq!(err.status, AppErrorStatus::InvalidInput);
    }
    assert!(repo.items.borrow().is_empty());
}

#[tokio::test]
async fn test_items_are_scoped_to_home_and_newest_first() {
    let repo = MemoryRepository::new();
    let tokens = tokens();
    let alice = register(&repo, &tokens, "alice@home.io").await;
    let bob = register(&repo, &tokens, "bob@home.io").await;

    let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    let items = ItemLogic::new(&repo, ticking_clock(start));
    let old = items.create(&alice, new_item("Old", "Kitchen")).await.unwrap().item;
    let new = items.create(&alice, new_item("New", "Kitchen")).await.unwrap().item;
    assert_eq!(old.created_at, start);
    assert_eq!(new.created_at, start + Duration::minutes(1));

    let names: Vec<String> = items
        .list(&alice)
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names, ["New", "Old"]);

    assert!(items.list(&bob).await.unwrap().items.is_empty());
    let err = items.delete(&bob, &old.id).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert_eq!(repo.items.borrow().len(), 2);
}

#[tokio::test]
async fn test_join_is_stamped_with_injected_clock() {
    let repo = MemoryRepository::new();
    let tokens = tokens();
    let owner = register(&repo, &tokens, "owner@home.io").await;
    let guest = register(&repo, &tokens, "guest@home.io").await;

    let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let family = FamilyLogic::new(&repo, Rc::new(move || at));
    let code = family.invite_code(&owner).await.unwrap().invite_code;
    family
        .join(&guest, JoinRequest { invite_code: code })
        .await
        .unwrap();

    let membership = repo.membership_of(&guest.id).await.unwrap().unwrap();
    assert_eq!(membership.joined_at, at);
}

// =========================================================
// 家庭与邀请码
// =========================================================

#[tokio::test]
async fn test_invite_code_is_owner_only_and_rotates() {
    let repo = MemoryRepository::new();
    let tokens = tokens();
    let owner = register(&repo, &tokens, "owner@home.io").await;
    let family = FamilyLogic::new(&repo, clock());

    let first = family.invite_code(&owner).await.unwrap().invite_code;
    assert!(is_complete_invite_code(&first));
    assert_eq!(first.len(), 19);
    assert_eq!(first, first.to_uppercase());

    let second = family.invite_code(&owner).await.unwrap().invite_code;
    assert_ne!(first, second);
    assert!(!family.verify_code(&first).await.unwrap().valid);

    let verified = family.verify_code(&second.to_lowercase()).await.unwrap();
    assert!(verified.valid);
    assert_eq!(verified.home_name.as_deref(), Some("owner的家"));

    // 加入后成为普通成员，不能生成邀请码
    let kid = register(&repo, &tokens, "kid@home.io").await;
    family
        .join(&kid, JoinRequest { invite_code: second })
        .await
        .unwrap();
    let err = family.invite_code(&kid).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn test_join_moves_membership() {
    let repo = MemoryRepository::new();
    let tokens = tokens();
    let owner = register(&repo, &tokens, "owner@home.io").await;
    let guest = register(&repo, &tokens, "guest@home.io").await;
    let family = FamilyLogic::new(&repo, clock());

    let code = family.invite_code(&owner).await.unwrap().invite_code;
    let joined = family
        .join(&guest, JoinRequest { invite_code: code.replace('-', "") })
        .await
        .unwrap();
    assert_eq!(joined.home.owner_id, owner.id);

    let view = family.home(&guest).await.unwrap();
    assert!(!view.is_owner);
    assert_eq!(view.home.id, joined.home.id);
    assert_eq!(view.members.len(), 2);
    let guest_row = view.members.iter().find(|m| m.user_id == guest.id).unwrap();
    assert_eq!(guest_row.role, Role::Member);

    // 物品随家庭共享
    ItemLogic::new(&repo, clock())
        .create(&owner, new_item("Lamp", "Bedroom"))
        .await
        .unwrap();
    assert_eq!(ItemLogic::new(&repo, clock()).list(&guest).await.unwrap().items.len(), 1);

    let err = family
        .join(&guest, JoinRequest { invite_code: code })
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.message(), "You are already a member of this home");
}

#[tokio::test]
async fn test_invalid_codes() {
    let repo = MemoryRepository::new();
    let tokens = tokens();
    let user = register(&repo, &tokens, "a@home.io").await;
    let family = FamilyLogic::new(&repo, clock());

    let partial = family.verify_code("ABCD-EF").await.unwrap();
    assert!(!partial.valid);
    assert!(partial.home_name.is_none());

    assert!(!family.verify_code("ZZZZ-ZZZZ-ZZZZ-ZZZZ").await.unwrap().valid);

    let err = family
        .join(&user, JoinRequest { invite_code: "ZZZZ-ZZZZ-ZZZZ-ZZZZ".into() })
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.message(), "Invalid invite code");
}

use worker::*;

// =========================================================
// 日志宏 (需在模块声明之前定义)
// =========================================================

#[cfg(target_arch = "wasm32")]
macro_rules! log_info { ($($t:tt)*) => (worker::console_log!($($t)*)) }
#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_info { ($($t:tt)*) => (println!($($t)*)) }

#[cfg(target_arch = "wasm32")]
macro_rules! log_error { ($($t:tt)*) => (worker::console_error!($($t)*)) }
#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_error { ($($t:tt)*) => (eprintln!($($t)*)) }

pub mod auth;
pub mod error;
pub mod logic;
pub mod repository;

pub(crate) mod utils {
    pub mod request;
}

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOCATOR: talc::TalckWasm = unsafe { talc::TalckWasm::new_global() };

use std::rc::Rc;

use auth::{Clock, TokenService};
use chrono::Utc;
use error::AppError;
use logic::{AuthLogic, FamilyLogic, ItemLogic};
use myhome_shared::{
    HEADER_AUTHORIZATION, HealthResponse, MeResponse, NewItem, User,
    protocol::{JoinRequest, LoginRequest, RegisterRequest, decode_segment, paths},
};
use repository::SupabaseRepository;
use utils::request::WorkerHttpClient;

// =========================================================
// 常量定义
// =========================================================
const DEFAULT_SUPABASE_URL_VAR: &str = "SUPABASE_URL";
const DEFAULT_SUPABASE_KEY_NAME: &str = "SUPABASE_KEY";
const DEFAULT_JWT_SECRET_NAME: &str = "JWT_SECRET";
const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

// =========================================================
// 响应处理宏
// =========================================================

// 将 AppError 映射为 `{ "message": ... }` 响应
fn map_error_to_response(e: AppError) -> Result<Response> {
    let status = e.status_code();

    // 对于 5xx 错误，记录完整追踪以便排查
    if status >= 500 {
        log_error!("Internal Error [{}]: {}", e.error_code(), e);
    }

    Ok(Response::from_json(&e.to_body())?.with_status(status))
}

// 统一响应宏
macro_rules! respond {
    (json, $expr:expr) => {
        match $expr {
            Ok(v) => Response::from_json(&v),
            Err(e) => map_error_to_response(e),
        }
    };
    (created, $expr:expr) => {
        match $expr {
            Ok(v) => Response::from_json(&v).map(|r| r.with_status(201)),
            Err(e) => map_error_to_response(e),
        }
    };
}

// 辅助宏：出错时提前返回错误响应
macro_rules! unwrap_or_resp {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => return map_error_to_response(e),
        }
    };
    ($expr:expr, $err_mapper:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => return map_error_to_response($err_mapper(e.to_string())),
        }
    };
}

// =========================================================
// 运行时配置
// =========================================================

struct RuntimeConfig {
    supabase_url_var: String,
    supabase_key_name: String,
    jwt_secret_name: String,
    token_ttl_days: i64,
}

impl RuntimeConfig {
    fn new(env: &Env) -> Self {
        let var = |name: &str, default: &str| {
            env.var(name)
                .map(|v| v.to_string())
                .unwrap_or_else(|_| default.to_string())
        };
        Self {
            supabase_url_var: var("SUPABASE_URL_VAR", DEFAULT_SUPABASE_URL_VAR),
            supabase_key_name: var("SUPABASE_KEY_NAME", DEFAULT_SUPABASE_KEY_NAME),
            jwt_secret_name: var("JWT_SECRET_NAME", DEFAULT_JWT_SECRET_NAME),
            token_ttl_days: env
                .var("TOKEN_TTL_DAYS")
                .ok()
                .and_then(|v| v.to_string().parse().ok())
                .filter(|days: &i64| *days > 0)
                .unwrap_or(DEFAULT_TOKEN_TTL_DAYS),
        }
    }
}

/// 每个请求按需构建的依赖
struct Services {
    repo: SupabaseRepository<WorkerHttpClient>,
    tokens: TokenService,
    clock: Clock,
}

impl Services {
    fn from_env(env: &Env) -> error::Result<Self> {
        let cfg = RuntimeConfig::new(env);

        let url = env
            .var(&cfg.supabase_url_var)
            .map(|v| v.to_string())
            .unwrap_or_default();
        let key = env
            .secret(&cfg.supabase_key_name)
            .map(|s| s.to_string())
            .unwrap_or_default();
        if url.is_empty() || key.is_empty() {
            return Err(AppError::unavailable("Storage service is not configured")
                .in_op_with("config", &cfg.supabase_url_var));
        }

        let secret = env
            .secret(&cfg.jwt_secret_name)
            .map(|s| s.to_string())
            .unwrap_or_default();
        if secret.is_empty() {
            return Err(AppError::store("JWT secret is not configured")
                .in_op_with("config", &cfg.jwt_secret_name));
        }

        let clock: Clock = Rc::new(Utc::now);
        Ok(Self {
            repo: SupabaseRepository::new(&url, &key, WorkerHttpClient),
            tokens: TokenService::new(secret, cfg.token_ttl_days).with_clock(clock.clone()),
            clock,
        })
    }

    async fn current_user(&self, req: &Request) -> error::Result<User> {
        let header = req
            .headers()
            .get(HEADER_AUTHORIZATION)
            .map_err(|e| AppError::invalid_input(e.to_string()))?;
        let token = auth::bearer_token(header.as_deref())?;
        AuthLogic::new(&self.repo, &self.tokens)
            .authenticate(token)
            .await
    }
}

// =========================================================
// API Controllers (适配层)
// =========================================================

/// 路径参数在客户端按路径段编码
fn path_param(ctx: &RouteContext<()>, name: &str) -> Option<String> {
    ctx.param(name).map(|raw| decode_segment(raw))
}

async fn health(_req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    Response::from_json(&HealthResponse {
        status: "ok".to_string(),
        message: "MyHome backend is running".to_string(),
    })
}

async fn preflight(_req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    Response::empty()
}

async fn register(mut req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let body: RegisterRequest =
        unwrap_or_resp!(req.json().await, |e| AppError::serialization(format!(
            "Invalid JSON Body: {}",
            e
        )));
    let svc = unwrap_or_resp!(Services::from_env(&ctx.env));

    let result = AuthLogic::new(&svc.repo, &svc.tokens).register(body).await;
    respond!(created, result)
}

async fn login(mut req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let body: LoginRequest =
        unwrap_or_resp!(req.json().await, |e| AppError::serialization(format!(
            "Invalid JSON Body: {}",
            e
        )));
    let svc = unwrap_or_resp!(Services::from_env(&ctx.env));

    let result = AuthLogic::new(&svc.repo, &svc.tokens).login(body).await;
    respond!(json, result)
}

async fn me(req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let svc = unwrap_or_resp!(Services::from_env(&ctx.env));
    let result = svc.current_user(&req).await.map(|user| MeResponse { user });
    respond!(json, result)
}

async fn list_items(req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let svc = unwrap_or_resp!(Services::from_env(&ctx.env));
    let user = unwrap_or_resp!(svc.current_user(&req).await);

    let result = ItemLogic::new(&svc.repo, svc.clock.clone()).list(&user).await;
    respond!(json, result)
}

async fn create_item(mut req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let svc = unwrap_or_resp!(Services::from_env(&ctx.env));
    let user = unwrap_or_resp!(svc.current_user(&req).await);
    let body: NewItem = unwrap_or_resp!(req.json().await, |e| AppError::serialization(format!(
        "Invalid JSON Body: {}",
        e
    )));

    let result = ItemLogic::new(&svc.repo, svc.clock.clone()).create(&user, body).await;
    respond!(created, result)
}

async fn delete_item(req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let svc = unwrap_or_resp!(Services::from_env(&ctx.env));
    let user = unwrap_or_resp!(svc.current_user(&req).await);
    let Some(id) = path_param(&ctx, "id") else {
        return map_error_to_response(AppError::invalid_input("Missing item id"));
    };

    let result = ItemLogic::new(&svc.repo, svc.clock.clone())
        .delete(&user, &id)
        .await;
    respond!(json, result)
}

async fn family_home(req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let svc = unwrap_or_resp!(Services::from_env(&ctx.env));
    let user = unwrap_or_resp!(svc.current_user(&req).await);

    let result = FamilyLogic::new(&svc.repo, svc.clock.clone()).home(&user).await;
    respond!(json, result)
}

async fn invite_code(req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let svc = unwrap_or_resp!(Services::from_env(&ctx.env));
    let user = unwrap_or_resp!(svc.current_user(&req).await);

    let result = FamilyLogic::new(&svc.repo, svc.clock.clone()).invite_code(&user).await;
    respond!(json, result)
}

async fn verify_code(req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let svc = unwrap_or_resp!(Services::from_env(&ctx.env));
    unwrap_or_resp!(svc.current_user(&req).await);
    let code = path_param(&ctx, "code").unwrap_or_default();

    let result = FamilyLogic::new(&svc.repo, svc.clock.clone()).verify_code(&code).await;
    respond!(json, result)
}

async fn join_home(mut req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let svc = unwrap_or_resp!(Services::from_env(&ctx.env));
    let user = unwrap_or_resp!(svc.current_user(&req).await);
    let body: JoinRequest = unwrap_or_resp!(req.json().await, |e| AppError::serialization(
        format!("Invalid JSON Body: {}", e)
    ));

    let result = FamilyLogic::new(&svc.repo, svc.clock.clone()).join(&user, body).await;
    respond!(json, result)
}

// =========================================================
// Entry Points
// =========================================================

#[event(fetch)]
pub async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    console_error_panic_hook::set_once();

    let cors = Cors::new()
        .with_origins(vec!["*"])
        .with_methods(vec![
            Method::Get,
            Method::Post,
            Method::Delete,
            Method::Options,
        ])
        .with_allowed_headers(vec!["Content-Type", HEADER_AUTHORIZATION]);

    let mut router = Router::new()
        .get_async(paths::HEALTH, health)
        .post_async(paths::REGISTER, register)
        .post_async(paths::LOGIN, login)
        .get_async(paths::ME, me)
        .get_async(paths::ITEMS, list_items)
        .post_async(paths::ITEMS, create_item)
        .delete_async(paths::ITEM, delete_item)
        .get_async(paths::FAMILY_HOME, family_home)
        .get_async(paths::INVITE_CODE, invite_code)
        .get_async(paths::VERIFY_CODE, verify_code)
        .post_async(paths::JOIN, join_home);

    for path in [
        paths::REGISTER,
        paths::LOGIN,
        paths::ME,
        paths::ITEMS,
        paths::ITEM,
        paths::FAMILY_HOME,
        paths::INVITE_CODE,
        paths::VERIFY_CODE,
        paths::JOIN,
    ] {
        router = router.options_async(path, preflight);
    }

    router.run(req, env).await?.with_cors(&cors)
}

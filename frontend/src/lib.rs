//! MyHome 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `guard`: 受保护路由的认证守卫
//! - `shell`: 外壳（头部 + 底部导航）切换
//! - `auth`: 会话状态管理
//! - `views`: leptos 页面组件，交互通过回调发出 `UiAction`
//! - `feedback`: 提示框、字段高亮和邀请码校验的信号
//! - `app`: 装配以上组件并按顺序执行用户操作

// =========================================================
// 跨平台日志宏
// =========================================================

#[cfg(target_arch = "wasm32")]
macro_rules! log_info {
    ($($t:tt)*) => (web_sys::console::log_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_info {
    ($($t:tt)*) => (println!($($t)*))
}

#[cfg(target_arch = "wasm32")]
macro_rules! log_warn {
    ($($t:tt)*) => (web_sys::console::warn_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_warn {
    ($($t:tt)*) => (eprintln!($($t)*))
}

#[cfg(target_arch = "wasm32")]
macro_rules! log_error {
    ($($t:tt)*) => (web_sys::console::error_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_error {
    ($($t:tt)*) => (eprintln!($($t)*))
}

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod family;
pub mod feedback;
pub mod guard;
pub mod inventory;
pub mod shell;
pub mod views;

// 原生 Web API 封装模块
// 领域层只依赖这里定义的 trait，浏览器实现仅在 wasm32 下编译。
pub mod web {
    pub mod dom;
    pub mod http;
    pub mod route;
    pub mod router;
    pub mod storage;

    #[cfg(target_arch = "wasm32")]
    pub mod browser;

    pub use dom::{Document, Location, ViewContainer};
    pub use http::HttpClient;
    pub use storage::Storage;
}

#[cfg(test)]
mod test_support;

/// 浏览器入口：装配真实的 fetch / localStorage / location / DOM 实现并启动应用
#[cfg(target_arch = "wasm32")]
pub fn start() {
    use std::rc::Rc;

    use leptos::prelude::*;

    if leptos::task::Executor::init_wasm_bindgen().is_err() {
        log_warn!("[App] Async executor already initialized");
    }

    let config = config::AppConfig::from_build_env();
    let storage: Rc<dyn web::Storage> = match web::storage::LocalStorage::open() {
        Some(local) => Rc::new(local),
        None => {
            log_warn!("[App] localStorage unavailable, session will not survive reloads");
            Rc::new(web::storage::MemoryStorage::default())
        }
    };

    let app = app::App::new(
        config,
        Rc::new(web::http::FetchClient),
        storage,
        Rc::new(web::browser::BrowserLocation),
        Rc::new(web::browser::BrowserDocument::new("app")),
    );

    let feedback = app.feedback();
    leptos::mount::mount_to_body(move || view! { <feedback::FeedbackLayer feedback=feedback /> });

    let listener = Rc::clone(&app);
    leptos::task::spawn_local(async move {
        listener.listen().await;
    });
    leptos::task::spawn_local(async move {
        app.boot().await;
    });
}

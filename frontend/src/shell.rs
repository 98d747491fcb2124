//! 外壳控制器
//!
//! 应用外壳 = 头部 + `<main id="view">` + 底部导航；认证外壳只有 `<main id="view">`。
//! 只有跨越公开/受保护边界时才重新挂载外壳，同类路由之间仅更新导航高亮，
//! 头部节点保持不变。

use std::cell::Cell;
use std::rc::Rc;

use leptos::prelude::*;

use crate::app::UiAction;
use crate::auth::Session;
use crate::web::dom::{Document, LazyView};
use crate::web::route::{AppRoute, ShellKind};

pub const APP_TITLE: &str = "MyHome";

struct NavEntry {
    route: AppRoute,
    label: &'static str,
    icon: &'static str,
}

const NAV: [NavEntry; 5] = [
    NavEntry {
        route: AppRoute::Home,
        label: "首页",
        icon: r#"<path d="M3 9l9-7 9 7v11a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2z"/>"#,
    },
    NavEntry {
        route: AppRoute::Items,
        label: "物品",
        icon: r#"<rect x="3" y="3" width="7" height="7"/><rect x="14" y="3" width="7" height="7"/><rect x="14" y="14" width="7" height="7"/><rect x="3" y="14" width="7" height="7"/>"#,
    },
    NavEntry {
        route: AppRoute::AddItem,
        label: "添加",
        icon: r#"<line x1="12" y1="5" x2="12" y2="19"/><line x1="5" y1="12" x2="19" y2="12"/>"#,
    },
    NavEntry {
        route: AppRoute::Family,
        label: "家庭",
        icon: r#"<path d="M17 21v-2a4 4 0 0 0-4-4H5a4 4 0 0 0-4 4v2"/><circle cx="9" cy="7" r="4"/>"#,
    },
    NavEntry {
        route: AppRoute::Settings,
        label: "设置",
        icon: r#"<circle cx="12" cy="12" r="3"/>"#,
    },
];

#[component]
fn Header(show_logout: bool, actions: Callback<UiAction>) -> impl IntoView {
    view! {
        <header class="app-header" id="app-header">
            <div class="app-header__logo">
                <div class="app-header__icon">"MH"</div>
                <h1 class="app-header__title">{APP_TITLE}</h1>
            </div>
            <div class="app-header__actions">
                {show_logout.then(move || view! {
                    <button
                        class="app-header__btn"
                        id="header-logout-btn"
                        aria-label="Logout"
                        title="Logout"
                        on:click=move |_| actions.run(UiAction::Logout)
                    >
                        <svg width="20" height="20" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">
                            <path d="M9 21H5a2 2 0 0 1-2-2V5a2 2 0 0 1 2-2h4" />
                            <polyline points="16 17 21 12 16 7" />
                            <line x1="21" y1="12" x2="9" y2="12" />
                        </svg>
                    </button>
                })}
            </div>
        </header>
    }
}

#[component]
fn BottomNav(active_path: String) -> impl IntoView {
    view! {
        <nav class="app-nav" id="app-nav">
            {NAV
                .iter()
                .map(|entry| {
                    let path = entry.route.to_path();
                    let mut class = String::from("app-nav__item");
                    if entry.route == AppRoute::AddItem {
                        class.push_str(" app-nav__item--center");
                    }
                    if path == active_path {
                        class.push_str(" app-nav__item--active");
                    }
                    view! {
                        <a href=format!("#{path}") class=class data-path=path>
                            <svg width="22" height="22" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" inner_html=entry.icon></svg>
                            <span class="app-nav__label">{entry.label}</span>
                        </a>
                    }
                })
                .collect_view()}
        </nav>
    }
}

/// 头部 + `#view` + 底部导航
#[component]
pub fn AppShell(active_path: String, show_logout: bool, actions: Callback<UiAction>) -> impl IntoView {
    view! {
        <Header show_logout=show_logout actions=actions />
        <main class="app-main" id="view"></main>
        <BottomNav active_path=active_path />
    }
}

#[component]
pub fn AuthShell() -> impl IntoView {
    view! { <main class="auth-main" id="view"></main> }
}

/// `sync` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellChange {
    Mounted(ShellKind),
    Kept(ShellKind),
}

pub struct ShellController {
    document: Rc<dyn Document>,
    session: Rc<Session>,
    actions: Callback<UiAction>,
    last: Cell<Option<ShellKind>>,
}

impl ShellController {
    pub fn new(document: Rc<dyn Document>, session: Rc<Session>, actions: Callback<UiAction>) -> Self {
        Self {
            document,
            session,
            actions,
            last: Cell::new(None),
        }
    }

    pub fn current(&self) -> Option<ShellKind> {
        self.last.get()
    }

    /// 确保 `path` 对应的外壳已挂载
    pub fn sync(&self, path: &str) -> ShellChange {
        let kind = ShellKind::for_path(path);
        if self.last.get() == Some(kind) {
            if kind == ShellKind::App {
                self.document.set_active_nav(path);
            }
            return ShellChange::Kept(kind);
        }

        let shell = match kind {
            ShellKind::App => {
                let active_path = path.to_string();
                let show_logout = self.session.is_logged_in();
                let actions = self.actions;
                LazyView::new(move || {
                    view! { <AppShell active_path=active_path show_logout=show_logout actions=actions /> }
                })
            }
            ShellKind::Auth => LazyView::new(|| view! { <AuthShell /> }),
        };
        self.document.mount_shell(kind, shell);
        self.last.set(Some(kind));
        ShellChange::Mounted(kind)
    }
}

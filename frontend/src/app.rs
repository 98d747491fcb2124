//! 应用控制器
//!
//! 装配会话、API 客户端、路由器和外壳控制器，注册七个视图，
//! 并把视图通过 `on:` 事件发出的用户操作（[`UiAction`]）转换为状态变化和界面反馈。
//!
//! 视图只持有一个 [`Callback<UiAction>`]，操作经通道送回 [`App::listen`] 按顺序执行，
//! 执行结果写入 [`Feedback`] 的信号。

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use futures::StreamExt;
use futures::channel::mpsc::{self, UnboundedReceiver};
use futures::future::LocalBoxFuture;
use leptos::prelude::*;

use myhome_shared::NewItem;

use crate::api::{ApiClient, ApiError};
use crate::auth::{Session, SessionStore};
use crate::config::AppConfig;
use crate::family::{self, Family};
use crate::feedback::{CodeCheck, Feedback, FieldError, Toast, ToastKind};
use crate::guard;
use crate::inventory::{ALL_ROOMS, Inventory};
use crate::shell::ShellController;
use crate::views::add_item::AddItemPage;
use crate::views::family::FamilyPage;
use crate::views::home::HomePage;
use crate::views::items::ItemsPage;
use crate::views::login::LoginPage;
use crate::views::register::RegisterPage;
use crate::views::settings::SettingsPage;
use crate::views::{ErrorState, Loading};
use crate::web::dom::{Document, LazyView, Location};
use crate::web::http::HttpClient;
use crate::web::route::AppRoute;
use crate::web::router::{Handler, Rendered, Resolution, RouteContext, Router};
use crate::web::storage::Storage;

/// 跨渲染保留的界面状态
#[derive(Debug, Clone)]
pub struct UiState {
    pub active_room: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_room: ALL_ROOMS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Login {
        email: String,
        password: String,
    },
    Register {
        email: String,
        password: String,
        confirm: String,
    },
    AddItem(NewItem),
    DeleteItem {
        id: String,
        name: String,
    },
    FilterRoom(String),
    Logout,
    GenerateInviteCode,
    VerifyInviteCode(String),
    JoinHome(String),
    Navigate(AppRoute),
    Retry,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOutcome {
    pub toast: Option<Toast>,
    pub navigate: Option<AppRoute>,
    /// 重新解析当前路由
    pub rerender: bool,
    pub field_error: Option<FieldError>,
    /// 邀请码输入框下方的校验结果
    pub code_check: Option<CodeCheck>,
}

impl ActionOutcome {
    fn success(message: impl Into<String>) -> Self {
        Self {
            toast: Some(Toast {
                message: message.into(),
                kind: ToastKind::Success,
            }),
            ..Default::default()
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            toast: Some(Toast {
                message: message.into(),
                kind: ToastKind::Error,
            }),
            ..Default::default()
        }
    }

    /// 校验错误附带字段高亮，`form` 为登录/注册表单的 id 前缀
    fn from_error(err: ApiError, form: Option<&str>) -> Self {
        let mut outcome = Self::error(err.to_string());
        if let ApiError::Validation { field, message } = err {
            let field = match form {
                Some(form) => format!("{form}-{field}"),
                None => field.to_string(),
            };
            outcome.field_error = Some(FieldError { field, message });
        }
        outcome
    }

    fn navigate(mut self, route: AppRoute) -> Self {
        self.navigate = Some(route);
        self
    }

    fn rerender(mut self) -> Self {
        self.rerender = true;
        self
    }
}

fn page<V, F>(build: F) -> Rendered
where
    V: IntoView + 'static,
    F: FnOnce() -> V + 'static,
{
    Rendered::View(LazyView::new(build))
}

fn error_page(message: String, actions: Callback<UiAction>) -> Rendered {
    page(move || view! { <ErrorState message=message actions=actions /> })
}

fn show_loading(ctx: &RouteContext) {
    if ctx.ticket.is_current() {
        ctx.container.mount(LazyView::new(|| view! { <Loading /> }));
    }
}

pub struct App {
    session: Rc<Session>,
    inventory: Rc<Inventory>,
    family: Rc<Family>,
    router: Rc<Router>,
    location: Rc<dyn Location>,
    ui: Rc<RefCell<UiState>>,
    feedback: Feedback,
    actions: Callback<UiAction>,
    inbox: RefCell<Option<UnboundedReceiver<UiAction>>>,
}

impl App {
    pub fn new(
        config: AppConfig,
        http: Rc<dyn HttpClient>,
        storage: Rc<dyn Storage>,
        location: Rc<dyn Location>,
        document: Rc<dyn Document>,
    ) -> Rc<Self> {
        let store = Rc::new(SessionStore::new(storage));
        let api = ApiClient::new(&config.api_base, http, Rc::clone(&store));
        let session = Rc::new(Session::new(store, api.clone()));
        let router = Rc::new(Router::new(Rc::clone(&location), Rc::clone(&document)));

        let (outbox, inbox) = mpsc::unbounded();
        let actions = Callback::new(move |action: UiAction| {
            if outbox.unbounded_send(action).is_err() {
                log_warn!("[App] Action listener stopped, dropping action");
            }
        });

        let shell = ShellController::new(document, Rc::clone(&session), actions);
        router.before_render(move |path| {
            shell.sync(path);
        });

        let app = Rc::new(Self {
            session,
            inventory: Rc::new(Inventory::new(api.clone())),
            family: Rc::new(Family::new(api)),
            router,
            location,
            ui: Rc::new(RefCell::new(UiState::default())),
            feedback: Feedback::default(),
            actions,
            inbox: RefCell::new(Some(inbox)),
        });
        app.register_routes();
        app
    }

    pub fn router(&self) -> &Rc<Router> {
        &self.router
    }

    pub fn session(&self) -> &Rc<Session> {
        &self.session
    }

    pub fn ui(&self) -> UiState {
        self.ui.borrow().clone()
    }

    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    /// 视图发出操作的入口
    pub fn actions(&self) -> Callback<UiAction> {
        self.actions
    }

    fn protect<F, Fut>(&self, route: AppRoute, handler: F)
    where
        F: Fn(RouteContext) -> Fut + 'static,
        Fut: Future<Output = Rendered> + 'static,
    {
        let inner: Handler = Rc::new(move |ctx: RouteContext| -> LocalBoxFuture<'static, Rendered> {
            Box::pin(handler(ctx))
        });
        self.router.register_handler(
            route,
            guard::protected(Rc::clone(&self.session), Rc::clone(&self.location), inner),
        );
    }

    fn register_routes(&self) {
        let actions = self.actions;
        let feedback = self.feedback;

        self.router.register(AppRoute::Login, move |_| async move {
            page(move || view! { <LoginPage actions=actions feedback=feedback /> })
        });
        self.router.register(AppRoute::Register, move |_| async move {
            page(move || view! { <RegisterPage actions=actions feedback=feedback /> })
        });

        let inventory = Rc::clone(&self.inventory);
        self.protect(AppRoute::Home, move |ctx| {
            let inventory = Rc::clone(&inventory);
            async move {
                show_loading(&ctx);
                match inventory.get_all().await {
                    Ok(items) => page(move || view! { <HomePage items=items actions=actions /> }),
                    Err(e) => error_page(e.to_string(), actions),
                }
            }
        });

        let inventory = Rc::clone(&self.inventory);
        let ui = Rc::clone(&self.ui);
        self.protect(AppRoute::Items, move |ctx| {
            let inventory = Rc::clone(&inventory);
            let ui = Rc::clone(&ui);
            async move {
                show_loading(&ctx);
                match inventory.get_all().await {
                    Ok(items) => {
                        let active_room = ui.borrow().active_room.clone();
                        page(move || {
                            view! { <ItemsPage items=items active_room=active_room actions=actions /> }
                        })
                    }
                    Err(e) => error_page(e.to_string(), actions),
                }
            }
        });

        self.protect(AppRoute::AddItem, move |_| async move {
            page(move || view! { <AddItemPage actions=actions feedback=feedback /> })
        });

        let family = Rc::clone(&self.family);
        self.protect(AppRoute::Family, move |ctx| {
            let family = Rc::clone(&family);
            async move {
                show_loading(&ctx);
                match family.home().await {
                    Ok(data) => page(move || {
                        view! { <FamilyPage data=data actions=actions feedback=feedback /> }
                    }),
                    Err(e) => error_page(e.to_string(), actions),
                }
            }
        });

        let session = Rc::clone(&self.session);
        self.protect(AppRoute::Settings, move |_| {
            let user = session.current_user();
            async move { page(move || view! { <SettingsPage user=user actions=actions /> }) }
        });
    }

    /// 初始路由规范化，然后启动路由器
    pub async fn boot(&self) -> Resolution {
        let logged_in = self.session.is_logged_in();
        let hash = self.location.hash();

        if matches!(hash.as_str(), "" | "#" | "#/") {
            let landing = if logged_in {
                AppRoute::auth_success_redirect()
            } else {
                AppRoute::auth_failure_redirect()
            };
            self.location.replace_hash(landing.to_path());
        } else {
            match AppRoute::from_path(&self.router.current_path()) {
                Some(route) if route.requires_auth() && !logged_in => {
                    self.location
                        .replace_hash(AppRoute::auth_failure_redirect().to_path());
                }
                Some(route) if route.should_redirect_when_authenticated() && logged_in => {
                    self.location
                        .replace_hash(AppRoute::auth_success_redirect().to_path());
                }
                _ => {}
            }
        }

        log_info!("[App] MyHome starting at {}", self.router.current_path());
        self.router.start().await
    }

    /// 按发出顺序执行视图送来的操作
    pub async fn listen(&self) {
        let Some(mut inbox) = self.inbox.borrow_mut().take() else {
            log_warn!("[App] Action listener is already running");
            return;
        };
        while let Some(action) = inbox.next().await {
            self.run(action).await;
        }
    }

    /// `handle` 之后把提示、字段高亮和邀请码校验结果写入反馈信号
    pub async fn run(&self, action: UiAction) -> ActionOutcome {
        let outcome = self.handle(action).await;
        self.feedback
            .show(outcome.toast.clone(), outcome.field_error.clone());
        if let Some(check) = &outcome.code_check {
            self.feedback.code_check.set(check.clone());
        }
        outcome
    }

    /// 执行操作并应用其中的导航和重新渲染，返回剩余的界面反馈
    pub async fn handle(&self, action: UiAction) -> ActionOutcome {
        let outcome = self.dispatch(action).await;
        if let Some(route) = outcome.navigate {
            self.router.navigate(route);
        } else if outcome.rerender {
            self.router.resolve().await;
        }
        outcome
    }

    pub async fn dispatch(&self, action: UiAction) -> ActionOutcome {
        match action {
            UiAction::Login { email, password } => {
                match self.session.login(&email, &password).await {
                    Ok(user) => ActionOutcome::success(format!("Welcome back, {}!", user.email))
                        .navigate(AppRoute::auth_success_redirect()),
                    Err(e) => ActionOutcome::from_error(e, Some("login")),
                }
            }
            UiAction::Register {
                email,
                password,
                confirm,
            } => {
                if password != confirm {
                    return ActionOutcome::from_error(
                        ApiError::validation("confirm", "Passwords do not match"),
                        Some("register"),
                    );
                }
                match self.session.register(&email, &password).await {
                    Ok(_) => ActionOutcome::success("Account created!")
                        .navigate(AppRoute::auth_success_redirect()),
                    Err(e) => ActionOutcome::from_error(e, Some("register")),
                }
            }
            UiAction::AddItem(item) => match self.inventory.add(item).await {
                Ok(created) => ActionOutcome::success(format!("\"{}\" 已添加", created.name))
                    .navigate(AppRoute::Items),
                Err(e) => ActionOutcome::from_error(e, None),
            },
            UiAction::DeleteItem { id, name } => match self.inventory.remove(&id).await {
                Ok(()) => ActionOutcome::success(format!("\"{name}\" 已删除")).rerender(),
                Err(e) => ActionOutcome::error(format!("删除失败：{e}")),
            },
            UiAction::FilterRoom(room) => {
                self.ui.borrow_mut().active_room = room;
                ActionOutcome::default().rerender()
            }
            UiAction::Logout => {
                self.session.logout();
                *self.ui.borrow_mut() = UiState::default();
                ActionOutcome::success("已退出登录").navigate(AppRoute::auth_failure_redirect())
            }
            UiAction::GenerateInviteCode => match self.family.invite_code().await {
                Ok(_) => ActionOutcome::success("邀请码已生成").rerender(),
                Err(e) => ActionOutcome::error(format!("生成失败：{e}")),
            },
            UiAction::VerifyInviteCode(raw) => {
                let check = if !family::is_complete_code(&raw) {
                    CodeCheck::Incomplete
                } else {
                    match self.family.verify_code(&raw).await {
                        Ok(found) if found.valid => {
                            CodeCheck::Found(found.home_name.unwrap_or_else(|| "家庭".to_string()))
                        }
                        Ok(_) => CodeCheck::Invalid,
                        Err(e) => CodeCheck::Failed(e.to_string()),
                    }
                };
                ActionOutcome {
                    code_check: Some(check),
                    ..Default::default()
                }
            }
            UiAction::JoinHome(raw) => match self.family.join(&raw).await {
                Ok(joined) => ActionOutcome::success(joined.message).rerender(),
                Err(e) => ActionOutcome::from_error(e, None),
            },
            UiAction::Navigate(route) => ActionOutcome::default().navigate(route),
            UiAction::Retry => ActionOutcome::default().rerender(),
        }
    }
}

//! 路由服务模块 - 核心引擎
//!
//! 所有对 `location.hash` 的读写都集中在此模块。
//! 实现了"监听 -> 查找 -> 外壳同步 -> 处理 -> 挂载"的导航流程。
//!
//! 每次解析都会领取一张导航票据（递增的代数），处理器异步返回后若票据已过期，
//! 结果会被丢弃，保证视图内容始终对应最后一次导航。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use super::dom::{ChangeListener, Document, LazyView, Location, ViewContainer};
use super::route::{AppRoute, path_from_hash};

/// 处理器的产出
#[derive(Debug)]
pub enum Rendered {
    /// 由路由器挂载到视图容器的视图
    View(LazyView),
    /// 处理器发起了重定向，不写入也不更新导航高亮
    Redirected,
}

/// 导航票据
#[derive(Debug, Clone)]
pub struct NavigationTicket {
    id: u64,
    generation: Rc<Cell<u64>>,
}

impl NavigationTicket {
    /// 是否仍是最新一次导航
    pub fn is_current(&self) -> bool {
        self.generation.get() == self.id
    }
}

/// 传给处理器的上下文
#[derive(Clone)]
pub struct RouteContext {
    pub route: AppRoute,
    pub container: Rc<dyn ViewContainer>,
    pub ticket: NavigationTicket,
}

pub type Handler = Rc<dyn Fn(RouteContext) -> LocalBoxFuture<'static, Rendered>>;

/// 一次解析的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Rendered(AppRoute),
    /// 期间发生了更新的导航，结果已丢弃
    Stale(AppRoute),
    Aborted,
}

/// 路由器服务
pub struct Router {
    routes: RefCell<HashMap<AppRoute, Handler>>,
    current: Cell<Option<AppRoute>>,
    generation: Rc<Cell<u64>>,
    before_render: RefCell<Option<Rc<dyn Fn(&str)>>>,
    location: Rc<dyn Location>,
    document: Rc<dyn Document>,
}

impl Router {
    pub fn new(location: Rc<dyn Location>, document: Rc<dyn Document>) -> Self {
        Self {
            routes: RefCell::new(HashMap::new()),
            current: Cell::new(None),
            generation: Rc::new(Cell::new(0)),
            before_render: RefCell::new(None),
            location,
            document,
        }
    }

    /// 注册路由，同一路由重复注册时后者覆盖前者
    pub fn register<F, Fut>(&self, route: AppRoute, handler: F)
    where
        F: Fn(RouteContext) -> Fut + 'static,
        Fut: Future<Output = Rendered> + 'static,
    {
        let handler: Handler =
            Rc::new(move |ctx: RouteContext| -> LocalBoxFuture<'static, Rendered> {
                Box::pin(handler(ctx))
            });
        self.register_handler(route, handler);
    }

    pub fn register_handler(&self, route: AppRoute, handler: Handler) {
        self.routes.borrow_mut().insert(route, handler);
    }

    /// 每次解析在查找容器之前调用，外壳控制器在这里切换外壳
    pub fn before_render(&self, hook: impl Fn(&str) + 'static) {
        *self.before_render.borrow_mut() = Some(Rc::new(hook));
    }

    /// 设置 hash，实际渲染由随后的 hashchange 触发
    pub fn navigate(&self, route: AppRoute) {
        self.location.set_hash(route.to_path());
    }

    pub fn current_path(&self) -> String {
        path_from_hash(&self.location.hash())
    }

    /// 最近一次开始处理的路由
    pub fn current(&self) -> Option<AppRoute> {
        self.current.get()
    }

    fn lookup(&self, path: &str) -> Option<(AppRoute, Handler)> {
        let route = AppRoute::from_path(path)?;
        let handler = self.routes.borrow().get(&route).cloned()?;
        Some((route, handler))
    }

    /// **核心方法：解析当前 hash 并渲染**
    pub async fn resolve(&self) -> Resolution {
        let path = self.current_path();
        let (route, handler) = match self.lookup(&path) {
            Some(found) => found,
            None => {
                let fallback = AppRoute::default();
                log_warn!("[Router] No route for {path}, redirecting to {fallback}");
                self.location.replace_hash(fallback.to_path());
                match self.lookup(fallback.to_path()) {
                    Some(found) => found,
                    None => {
                        log_error!("[Router] Default route {fallback} is not registered");
                        return Resolution::Aborted;
                    }
                }
            }
        };

        let hook = self.before_render.borrow().clone();
        if let Some(hook) = hook {
            hook(route.to_path());
        }

        let Some(container) = self.document.view_container() else {
            log_error!("[Router] #view container not found, cannot render {route}");
            return Resolution::Aborted;
        };

        let id = self.generation.get() + 1;
        self.generation.set(id);
        let ticket = NavigationTicket {
            id,
            generation: Rc::clone(&self.generation),
        };
        self.current.set(Some(route));

        let rendered = handler(RouteContext {
            route,
            container: Rc::clone(&container),
            ticket: ticket.clone(),
        })
        .await;

        if !ticket.is_current() {
            return Resolution::Stale(route);
        }

        match rendered {
            Rendered::View(view) => container.mount(view),
            Rendered::Redirected => return Resolution::Rendered(route),
        }
        self.document.set_active_nav(route.to_path());
        Resolution::Rendered(route)
    }

    /// 订阅 hashchange 并立即解析一次
    pub async fn start(self: &Rc<Self>) -> Resolution {
        let router = Rc::clone(self);
        let listener: ChangeListener = Rc::new(move || -> LocalBoxFuture<'static, ()> {
            let router = Rc::clone(&router);
            Box::pin(async move {
                router.resolve().await;
            })
        });
        self.location.on_change(listener);
        self.resolve().await
    }
}

//! 地址栏与文档的抽象
//!
//! 路由器、外壳控制器和守卫只通过这些 trait 触碰浏览器，
//! 浏览器实现见 `web::browser`。

use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use leptos::prelude::*;

use super::route::ShellKind;

/// hash 变化时调用的监听器，返回的 future 由平台负责驱动
pub type ChangeListener = Rc<dyn Fn() -> LocalBoxFuture<'static, ()>>;

/// 延迟构建的 leptos 视图
///
/// 组件内部会创建信号和 `NodeRef`，必须在挂载方提供的响应式 owner 里构建，
/// 所以这里只保存构建函数。
pub struct LazyView(Box<dyn FnOnce() -> AnyView>);

impl LazyView {
    pub fn new<V, F>(build: F) -> Self
    where
        V: IntoView + 'static,
        F: FnOnce() -> V + 'static,
    {
        Self(Box::new(move || build().into_any()))
    }

    pub fn build(self) -> AnyView {
        (self.0)()
    }
}

impl fmt::Debug for LazyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LazyView")
    }
}

/// `window.location.hash` 访问
pub trait Location {
    /// 当前 hash，含前导 `#`，可能为空
    fn hash(&self) -> String;

    /// 设置 hash，浏览器随后异步触发 hashchange
    fn set_hash(&self, path: &str);

    /// 替换当前 hash，不产生历史记录也不触发 hashchange
    fn replace_hash(&self, path: &str);

    /// 订阅 hashchange
    fn on_change(&self, listener: ChangeListener);
}

/// 视图容器（`#view` 元素）
pub trait ViewContainer {
    /// 卸载容器中原有的视图并挂载新视图
    fn mount(&self, view: LazyView);
}

pub trait Document {
    /// 替换整个应用根节点的内容
    fn mount_shell(&self, kind: ShellKind, shell: LazyView);

    /// 查找当前的 `#view`，外壳切换后会是新的元素
    fn view_container(&self) -> Option<Rc<dyn ViewContainer>>;

    /// 高亮底部导航中匹配的条目，其余条目取消高亮
    fn set_active_nav(&self, path: &str);
}

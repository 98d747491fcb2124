//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由及其属性。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppRoute {
    /// 首页 (默认路由，需要认证)
    #[default]
    Home,
    /// 物品列表
    Items,
    /// 添加物品
    AddItem,
    /// 家庭成员与邀请码
    Family,
    /// 设置
    Settings,
    /// 登录
    Login,
    /// 注册
    Register,
}

/// 外壳类型：带头部和底部导航的应用外壳，或只有内容区的认证外壳
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    App,
    Auth,
}

impl AppRoute {
    pub const ALL: [AppRoute; 7] = [
        Self::Home,
        Self::Items,
        Self::AddItem,
        Self::Family,
        Self::Settings,
        Self::Login,
        Self::Register,
    ];

    /// 将 hash 路径解析为路由枚举，未注册的路径返回 `None`
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/home" => Some(Self::Home),
            "/items" => Some(Self::Items),
            "/add-item" => Some(Self::AddItem),
            "/family" => Some(Self::Family),
            "/settings" => Some(Self::Settings),
            "/login" => Some(Self::Login),
            "/register" => Some(Self::Register),
            _ => None,
        }
    }

    /// 获取路由对应的 hash 路径
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Home => "/home",
            Self::Items => "/items",
            Self::AddItem => "/add-item",
            Self::Family => "/family",
            Self::Settings => "/settings",
            Self::Login => "/login",
            Self::Register => "/register",
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        !self.is_public()
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// 定义已认证用户是否应该离开此路由（登录、注册页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        self.is_public()
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标
    pub fn auth_success_redirect() -> Self {
        Self::Home
    }

    pub fn shell(&self) -> ShellKind {
        if self.is_public() {
            ShellKind::Auth
        } else {
            ShellKind::App
        }
    }
}

impl ShellKind {
    /// 未知路径按应用外壳处理，随后会被路由器重定向到首页
    pub fn for_path(path: &str) -> Self {
        AppRoute::from_path(path)
            .map(|route| route.shell())
            .unwrap_or(ShellKind::App)
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// 从 `location.hash` 提取路径，空 hash 视为默认路由
pub fn path_from_hash(hash: &str) -> String {
    let path = hash.strip_prefix('#').unwrap_or(hash);
    if path.is_empty() {
        AppRoute::default().to_path().to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_round_trips_through_its_path() {
        for route in AppRoute::ALL {
            assert_eq!(AppRoute::from_path(route.to_path()), Some(route));
        }
        assert_eq!(AppRoute::from_path("/nope"), None);
        assert_eq!(AppRoute::from_path("/"), None);
    }

    #[test]
    fn test_public_and_protected_partition() {
        let public: Vec<_> = AppRoute::ALL.into_iter().filter(|r| r.is_public()).collect();
        assert_eq!(public, vec![AppRoute::Login, AppRoute::Register]);
        assert!(AppRoute::Settings.requires_auth());
        assert_eq!(AppRoute::Register.shell(), ShellKind::Auth);
        assert_eq!(ShellKind::for_path("/unknown"), ShellKind::App);
    }

    #[test]
    fn test_path_from_hash() {
        assert_eq!(path_from_hash(""), "/home");
        assert_eq!(path_from_hash("#"), "/home");
        assert_eq!(path_from_hash("#/items"), "/items");
        assert_eq!(path_from_hash("#/"), "/");
    }
}

//! 前端运行配置

const DEFAULT_API_BASE: &str = "http://localhost:8787";

/// 应用配置
///
/// 后端地址在构建时通过 `MYHOME_API_BASE` 环境变量注入，未设置时使用本地 wrangler 地址。
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base: String,
}

impl AppConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { api_base }
    }

    pub fn from_build_env() -> Self {
        Self::new(option_env!("MYHOME_API_BASE").unwrap_or(DEFAULT_API_BASE))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

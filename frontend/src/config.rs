//! 前端配置
//!
//! 后端地址与 anon key 优先取构建期环境变量，其次取 LocalStorage，
//! 方便同一份构建产物对接不同的项目。

use logbook_router::RouterConfig;

use crate::web::BrowserStorage;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// 缺少任一项时返回 None，此时认证调用全部按失败处理
    pub fn load() -> Option<Self> {
        let url = option_env!("LOGBOOK_SUPABASE_URL")
            .map(str::to_string)
            .or_else(BrowserStorage::supabase_url)?;
        let anon_key = option_env!("LOGBOOK_SUPABASE_ANON_KEY")
            .map(str::to_string)
            .or_else(BrowserStorage::supabase_anon_key)?;
        Some(Self::new(url, anon_key))
    }

    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.url, path)
        } else {
            format!("{}/{}", self.url, path)
        }
    }
}

/// 路由配置：构建期可通过 `LOGBOOK_ROUTER_CONFIG` 注入 JSON 覆盖缺省值
pub fn load_router_config() -> RouterConfig {
    let Some(raw) = option_env!("LOGBOOK_ROUTER_CONFIG") else {
        return RouterConfig::default();
    };
    RouterConfig::from_json_str(raw).unwrap_or_else(|e| {
        log::error!("[Config] {}; falling back to defaults", e);
        RouterConfig::default()
    })
}

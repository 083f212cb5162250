//! 路由运行时配置
//!
//! 守卫重定向用到的路径都在这里集中定义，缺省值对应应用的 URL 约定。

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_REGISTER_PATH: &str = "/register";
const DEFAULT_DASHBOARD_PATH: &str = "/dashboard";
const DEFAULT_UNAUTHORIZED_PATH: &str = "/unauthorized";
const DEFAULT_HOME_PATH: &str = "/home";
const DEFAULT_REDIRECT_QUERY_KEY: &str = "redirect";
const DEFAULT_MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouterConfig {
    /// 未认证访问受保护路由时的去向
    pub login_path: String,
    /// 已认证用户访问 guest-only 页面时的去向
    pub dashboard_path: String,
    /// 角色不满足时的去向
    pub unauthorized_path: String,
    pub home_path: String,
    /// 登录跳转时携带原目标的 query key
    pub redirect_query_key: String,
    /// 已认证用户不应停留的页面，缺省为登录页与注册页
    pub guest_only_paths: Vec<String>,
    /// 单次导航中允许的最大重定向次数
    pub max_redirects: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            dashboard_path: DEFAULT_DASHBOARD_PATH.to_string(),
            unauthorized_path: DEFAULT_UNAUTHORIZED_PATH.to_string(),
            home_path: DEFAULT_HOME_PATH.to_string(),
            redirect_query_key: DEFAULT_REDIRECT_QUERY_KEY.to_string(),
            guest_only_paths: vec![
                DEFAULT_LOGIN_PATH.to_string(),
                DEFAULT_REGISTER_PATH.to_string(),
            ],
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl RouterConfig {
    /// 从 JSON 读取配置，缺失字段使用缺省值
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("loginPath", &self.login_path),
            ("dashboardPath", &self.dashboard_path),
            ("unauthorizedPath", &self.unauthorized_path),
            ("homePath", &self.home_path),
        ];
        for (field, value) in fields {
            if !value.starts_with('/') {
                return Err(ConfigError::RelativePath {
                    field,
                    value: value.clone(),
                });
            }
        }
        if let Some(bad) = self.guest_only_paths.iter().find(|p| !p.starts_with('/')) {
            return Err(ConfigError::RelativePath {
                field: "guestOnlyPaths",
                value: bad.clone(),
            });
        }
        Ok(())
    }
}

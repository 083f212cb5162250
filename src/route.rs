//! 路由定义模块 - 领域模型
//!
//! 纯声明层，不依赖 DOM。每条路由把路径模式映射到视图或重定向，
//! 并附带访问要求 [`RouteMeta`]。

mod pattern;

use std::collections::BTreeSet;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::auth::Role;

pub use pattern::{PathPattern, Segment};

/// 所有可渲染视图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewId {
    /// 公共页面外壳（导航栏 + 子视图）
    HomeViewLayout,
    HomeContent,
    HomeAbout,
    Login,
    Register,
    ForgotPassword,
    VerifyEmail,
    ResetPassword,
    /// 登录后页面外壳
    DashboardLayout,
    Dashboard,
    LogList,
    LogCreate,
    LogDetail,
    LogEdit,
    Profile,
    UserManagement,
    Reports,
    Unauthorized,
}

impl ViewId {
    /// 布局视图会包裹一个嵌套子视图
    pub fn is_layout(&self) -> bool {
        matches!(self, Self::HomeViewLayout | Self::DashboardLayout)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HomeViewLayout => "HomeViewLayout",
            Self::HomeContent => "HomeContent",
            Self::HomeAbout => "HomeAbout",
            Self::Login => "Login",
            Self::Register => "Register",
            Self::ForgotPassword => "ForgotPassword",
            Self::VerifyEmail => "VerifyEmail",
            Self::ResetPassword => "ResetPassword",
            Self::DashboardLayout => "DashboardLayout",
            Self::Dashboard => "Dashboard",
            Self::LogList => "LogList",
            Self::LogCreate => "LogCreate",
            Self::LogDetail => "LogDetail",
            Self::LogEdit => "LogEdit",
            Self::Profile => "Profile",
            Self::UserManagement => "UserManagement",
            Self::Reports => "Reports",
            Self::Unauthorized => "Unauthorized",
        }
    }
}

impl Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 命中路由后的动作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteAction {
    Render(ViewId),
    /// 目标为完整路径
    Redirect(String),
}

/// 路由访问要求
///
/// `roles` 只在链路上某处声明了 `requires_auth` 时才有意义。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    #[serde(default)]
    pub requires_auth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<BTreeSet<Role>>,
}

impl RouteMeta {
    pub fn authenticated() -> Self {
        Self {
            requires_auth: true,
            roles: None,
        }
    }

    pub fn with_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }
}

/// 声明式路由定义
///
/// 子路由以 `/` 开头时为绝对路径，否则拼接到父路径之后。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub path: String,
    pub name: Option<String>,
    pub action: RouteAction,
    pub meta: RouteMeta,
    /// 为 true 时把路径参数作为 props 交给视图
    pub props: bool,
    pub children: Vec<RouteDefinition>,
}

impl RouteDefinition {
    fn new(path: impl Into<String>, action: RouteAction) -> Self {
        Self {
            path: path.into(),
            name: None,
            action,
            meta: RouteMeta::default(),
            props: false,
            children: Vec::new(),
        }
    }

    pub fn view(path: impl Into<String>, view: ViewId) -> Self {
        Self::new(path, RouteAction::Render(view))
    }

    pub fn redirect(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(path, RouteAction::Redirect(target.into()))
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn requires_auth(mut self) -> Self {
        self.meta.requires_auth = true;
        self
    }

    pub fn roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        self.meta = self.meta.with_roles(roles);
        self
    }

    pub fn with_props(mut self) -> Self {
        self.props = true;
        self
    }

    pub fn children(mut self, children: Vec<RouteDefinition>) -> Self {
        self.children = children;
        self
    }
}

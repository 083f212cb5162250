//! Logbook 路由核心
//!
//! 与平台无关的路由与访问控制：
//! - `route` / `table`: 路由定义与路由表（领域模型）
//! - `guard`: 导航守卫（唯一执行授权逻辑的地方）
//! - `navigator`: 路由表 + 守卫的组合（导航引擎）
//! - `auth`: 外部认证服务的抽象
//! - `routes`: 应用实际使用的路由表
//!
//! 浏览器端的 History 与视图渲染见 `frontend/`。

pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod location;
pub mod navigator;
pub mod route;
pub mod routes;
pub mod table;

pub use auth::{AuthProvider, Role, User};
pub use config::RouterConfig;
pub use error::{AuthError, AuthErrorStatus, AuthResult, ConfigError, NavigationError, RouteTableError};
pub use guard::{GuardDecision, GuardRule, NavigationGuard, NavigationRequest};
pub use location::Location;
pub use navigator::{NavigationOutcome, Navigator, ResolvedRoute};
pub use route::{RouteAction, RouteDefinition, RouteMeta, ViewId};
pub use table::{RouteMatch, RouteRecord, RouteTable};

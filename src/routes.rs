//! 应用路由表
//!
//! 公共页面挂在 `HomeViewLayout` 下，登录后的页面挂在
//! `DashboardLayout` 下并统一要求认证。

use crate::config::RouterConfig;
use crate::error::RouteTableError;
use crate::route::{RouteDefinition, ViewId};
use crate::table::RouteTable;

pub const ADMIN_ROLE: &str = "admin";

/// 应用的全部路由定义
pub fn app_routes(config: &RouterConfig) -> Vec<RouteDefinition> {
    let home = config.home_path.as_str();

    vec![
        RouteDefinition::redirect("/", home),
        RouteDefinition::view("/", ViewId::HomeViewLayout).children(vec![
            RouteDefinition::view("/home", ViewId::HomeContent).named("home"),
            RouteDefinition::view("/about", ViewId::HomeAbout).named("about"),
            RouteDefinition::view("/login", ViewId::Login).named("login"),
            RouteDefinition::view("/register", ViewId::Register).named("register"),
            RouteDefinition::view("/forgot-password", ViewId::ForgotPassword)
                .named("forgot-password"),
            RouteDefinition::view("/verify-email", ViewId::VerifyEmail).named("verify-email"),
            RouteDefinition::view("/reset-password", ViewId::ResetPassword)
                .named("reset-password"),
        ]),
        RouteDefinition::view("/", ViewId::DashboardLayout)
            .requires_auth()
            .children(vec![
                RouteDefinition::view("/dashboard", ViewId::Dashboard).named("dashboard"),
                RouteDefinition::view("/logs", ViewId::LogList).named("logs"),
                RouteDefinition::view("/logs/create", ViewId::LogCreate).named("log-create"),
                RouteDefinition::view("/logs/:id", ViewId::LogDetail)
                    .named("log-detail")
                    .with_props(),
                RouteDefinition::view("/logs/:id/edit", ViewId::LogEdit)
                    .named("log-edit")
                    .with_props(),
                RouteDefinition::view("/profile", ViewId::Profile).named("profile"),
                RouteDefinition::view("/user", ViewId::UserManagement)
                    .named("user")
                    .roles([ADMIN_ROLE]),
                RouteDefinition::view("/reports", ViewId::Reports).named("reports"),
            ]),
        RouteDefinition::view("/unauthorized", ViewId::Unauthorized).named("unauthorized"),
        RouteDefinition::redirect("/:pathMatch(.*)*", home).named("not-found"),
    ]
}

/// 构建应用路由表
pub fn app_table(config: &RouterConfig) -> Result<RouteTable, RouteTableError> {
    RouteTable::new(app_routes(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL_SURFACE: [&str; 16] = [
        "/home",
        "/about",
        "/login",
        "/register",
        "/forgot-password",
        "/verify-email",
        "/reset-password",
        "/dashboard",
        "/logs",
        "/logs/create",
        "/logs/3",
        "/logs/3/edit",
        "/profile",
        "/user",
        "/reports",
        "/unauthorized",
    ];

    #[test]
    fn test_every_surface_path_renders_a_view() {
        let table = app_table(&RouterConfig::default()).unwrap();
        for path in URL_SURFACE {
            let matched = table.lookup(path).unwrap();
            assert!(
                matched.leaf().view().is_some(),
                "{} should render a view",
                path
            );
            assert!(!matched.leaf().pattern.is_catch_all(), "{}", path);
        }
    }

    #[test]
    fn test_root_and_unknown_redirect_home() {
        let table = app_table(&RouterConfig::default()).unwrap();
        assert_eq!(table.lookup("/").unwrap().leaf().redirect_target(), Some("/home"));
        assert_eq!(
            table.lookup("/nonexistent").unwrap().leaf().redirect_target(),
            Some("/home")
        );
    }

    #[test]
    fn test_dashboard_pages_require_auth_public_pages_do_not() {
        let table = app_table(&RouterConfig::default()).unwrap();
        for path in ["/dashboard", "/logs", "/logs/3/edit", "/reports", "/user"] {
            assert!(table.lookup(path).unwrap().requires_auth(), "{}", path);
        }
        for path in ["/home", "/about", "/login", "/register", "/unauthorized"] {
            assert!(!table.lookup(path).unwrap().requires_auth(), "{}", path);
        }
    }

    #[test]
    fn test_only_user_page_declares_roles() {
        let table = app_table(&RouterConfig::default()).unwrap();
        for path in URL_SURFACE {
            let declared = table.lookup(path).unwrap().declared_roles().count();
            assert_eq!(declared, usize::from(path == "/user"), "{}", path);
        }
    }

    #[test]
    fn test_home_path_follows_config() {
        let config = RouterConfig {
            home_path: "/welcome".to_string(),
            ..RouterConfig::default()
        };
        let table = app_table(&config).unwrap();
        assert_eq!(
            table.lookup("/missing").unwrap().leaf().redirect_target(),
            Some("/welcome")
        );
    }
}

use super::*;
use crate::auth::User;
use crate::auth::tests::MockAuthProvider;
use crate::route::RouteDefinition;
use crate::routes::app_table;
use uuid::Uuid;

// =========================================================
// 辅助函数
// =========================================================

fn navigator(provider: MockAuthProvider) -> Navigator<MockAuthProvider> {
    let config = RouterConfig::default();
    Navigator::new(app_table(&config).unwrap(), provider, config)
}

fn completed(outcome: NavigationOutcome) -> ResolvedRoute {
    match outcome {
        NavigationOutcome::Completed(route) => route,
        NavigationOutcome::Superseded => panic!("navigation unexpectedly superseded"),
    }
}

fn bob() -> User {
    User::new(Uuid::from_u128(2))
}

// =========================================================
// 场景
// =========================================================

#[tokio::test]
async fn test_root_resolves_to_home() {
    let nav = navigator(MockAuthProvider::new());
    let route = completed(nav.navigate("/").await.unwrap());

    assert_eq!(route.location.path, "/home");
    assert_eq!(route.views, vec![ViewId::HomeViewLayout, ViewId::HomeContent]);
    assert_eq!(route.leaf_view(), Some(ViewId::HomeContent));
    assert_eq!(route.redirected_from, Some(Location::parse("/")));
}

#[tokio::test]
async fn test_unknown_path_resolves_to_home() {
    let nav = navigator(MockAuthProvider::new());
    let route = completed(nav.navigate("/nonexistent").await.unwrap());
    assert_eq!(route.location.path, "/home");
    assert_eq!(route.name.as_deref(), Some("home"));
}

#[tokio::test]
async fn test_route_redirect_keeps_query_and_hash() {
    let nav = navigator(MockAuthProvider::new());
    let route = completed(nav.navigate("/?ref=mail#intro").await.unwrap());
    assert_eq!(route.location.full_path(), "/home?ref=mail#intro");
}

#[tokio::test]
async fn test_protected_path_lands_on_login_with_redirect() {
    let nav = navigator(MockAuthProvider::new());
    let route = completed(nav.navigate("/logs").await.unwrap());

    assert_eq!(route.location.path, "/login");
    assert_eq!(route.location.query_value("redirect"), Some("/logs"));
    assert_eq!(route.leaf_view(), Some(ViewId::Login));
    assert!(route.was_redirected());
}

#[tokio::test]
async fn test_login_redirect_keeps_original_query_text() {
    let nav = navigator(MockAuthProvider::new());
    for original in ["/logs?flag", "/logs?q=a%20b", "/logs?x=1;y=2", "/logs?a=%ZZ"] {
        let route = completed(nav.navigate(original).await.unwrap());
        assert_eq!(route.location.path, "/login");
        assert_eq!(route.location.query_value("redirect"), Some(original));

        // 浏览器地址栏里的编码形式再解析回来仍是原始路径
        let reloaded = Location::parse(&route.location.full_path());
        assert_eq!(reloaded.query_value("redirect"), Some(original));
    }
}

#[tokio::test]
async fn test_signed_in_user_on_login_lands_on_dashboard() {
    let nav = navigator(MockAuthProvider::signed_in(bob()));
    let route = completed(nav.navigate("/login").await.unwrap());

    assert_eq!(route.location.path, "/dashboard");
    assert_eq!(route.views, vec![ViewId::DashboardLayout, ViewId::Dashboard]);
}

#[tokio::test]
async fn test_reports_without_declared_roles_allows() {
    let nav = navigator(MockAuthProvider::signed_in(bob()));
    let route = completed(nav.navigate("/reports").await.unwrap());
    assert_eq!(route.location.path, "/reports");
    assert!(!route.was_redirected());
    assert_eq!(nav.provider().count("get_profile_role"), 0);
}

#[tokio::test]
async fn test_wrong_role_lands_on_unauthorized() {
    let provider = MockAuthProvider::signed_in(bob());
    provider.set_role(bob().id, "member");
    let nav = navigator(provider);

    let route = completed(nav.navigate("/user").await.unwrap());
    assert_eq!(route.location.path, "/unauthorized");
    assert_eq!(route.leaf_view(), Some(ViewId::Unauthorized));
}

#[tokio::test]
async fn test_params_and_props_are_exposed() {
    let nav = navigator(MockAuthProvider::signed_in(bob()));
    let route = completed(nav.navigate("/logs/31/edit").await.unwrap());

    assert_eq!(route.name.as_deref(), Some("log-edit"));
    assert_eq!(route.params, vec![("id".to_string(), "31".to_string())]);
    assert_eq!(route.props, Some(route.params.clone()));

    let route = completed(nav.navigate("/logs/create").await.unwrap());
    assert_eq!(route.props, None);
}

#[tokio::test]
async fn test_current_tracks_last_commit() {
    let nav = navigator(MockAuthProvider::new());
    assert!(nav.current().is_none());

    nav.navigate("/about").await.unwrap();
    assert_eq!(nav.current().map(|r| r.location.path), Some("/about".to_string()));
}

// =========================================================
// 认证状态变化
// =========================================================

#[tokio::test]
async fn test_revalidate_after_sign_out_moves_to_login() {
    let nav = navigator(MockAuthProvider::signed_in(bob()));
    completed(nav.navigate("/profile?tab=security").await.unwrap());

    nav.provider().set_user(None);
    let outcome = nav.revalidate().await.unwrap().unwrap();
    let route = completed(outcome);

    assert_eq!(route.location.path, "/login");
    assert_eq!(
        route.location.query_value("redirect"),
        Some("/profile?tab=security")
    );
}

#[tokio::test]
async fn test_revalidate_after_sign_in_leaves_login() {
    let nav = navigator(MockAuthProvider::new());
    completed(nav.navigate("/login").await.unwrap());

    nav.provider().set_user(Some(bob()));
    let route = completed(nav.revalidate().await.unwrap().unwrap());
    assert_eq!(route.location.path, "/dashboard");
}

#[tokio::test]
async fn test_revalidate_without_current_is_noop() {
    let nav = navigator(MockAuthProvider::new());
    assert_eq!(nav.revalidate().await.unwrap(), None);
    assert_eq!(nav.provider().count("get_current_user"), 0);
}

// =========================================================
// 错误
// =========================================================

#[tokio::test]
async fn test_redirect_loop_is_bounded() {
    let config = RouterConfig {
        max_redirects: 4,
        ..RouterConfig::default()
    };
    let table = RouteTable::new(vec![
        RouteDefinition::redirect("/a", "/b"),
        RouteDefinition::redirect("/b", "/a"),
    ])
    .unwrap();
    let nav = Navigator::new(table, MockAuthProvider::new(), config);

    let err = nav.navigate("/a").await.unwrap_err();
    assert_eq!(
        err,
        NavigationError::RedirectLoop {
            target: "/a".to_string(),
            limit: 4
        }
    );
    assert!(nav.current().is_none());
}

#[tokio::test]
async fn test_no_match_without_catch_all() {
    let table = RouteTable::new(vec![RouteDefinition::view("/home", ViewId::HomeContent)]).unwrap();
    let nav = Navigator::new(table, MockAuthProvider::new(), RouterConfig::default());

    let err = nav.navigate("/missing").await.unwrap_err();
    assert_eq!(err, NavigationError::NoMatch("/missing".to_string()));
}

// =========================================================
// 并发导航
// =========================================================

#[tokio::test]
async fn test_superseded_navigation_is_discarded() {
    let nav = navigator(MockAuthProvider::signed_in(bob()));
    // 第一次身份查询挂起，直到第二次导航完成
    let release = nav.provider().gate_next_identity();

    let (first, second) = futures::join!(nav.navigate("/logs"), async {
        let outcome = nav.navigate("/about").await;
        let _ = release.send(());
        outcome
    });

    assert_eq!(first.unwrap(), NavigationOutcome::Superseded);
    let second = completed(second.unwrap());
    assert_eq!(second.location.path, "/about");
    assert_eq!(nav.current().map(|r| r.location.path), Some("/about".to_string()));
}

#[tokio::test]
async fn test_sequential_navigations_are_not_superseded() {
    let nav = navigator(MockAuthProvider::signed_in(bob()));
    completed(nav.navigate("/logs").await.unwrap());
    completed(nav.navigate("/reports").await.unwrap());
    assert_eq!(nav.current().map(|r| r.location.path), Some("/reports".to_string()));
}

#[tokio::test]
async fn test_custom_guard_rules_are_used() {
    let config = RouterConfig::default();
    let guard = NavigationGuard::with_rules(config.clone(), Vec::new());
    let nav = Navigator::new(app_table(&config).unwrap(), MockAuthProvider::new(), config)
        .with_guard(guard);

    let route = completed(nav.navigate("/logs").await.unwrap());
    assert_eq!(route.location.path, "/logs");
}

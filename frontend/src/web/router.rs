//! 路由服务模块 - 浏览器绑定
//!
//! 封装 web_sys 的 History API：所有对 window.history 的操作都集中在此模块。
//! 导航决策交给 `logbook_router::Navigator`，这里只负责
//! "监听 -> 异步守卫 -> 写回 History -> 更新界面"。

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use logbook_router::{NavigationError, NavigationOutcome, Navigator, ResolvedRoute};
use wasm_bindgen::prelude::*;

use crate::auth::SupabaseAuthProvider;

pub type AppNavigator = Navigator<SupabaseAuthProvider>;

/// 获取当前浏览器完整路径（含 query 与 hash）
fn current_full_path() -> String {
    let Some(location) = web_sys::window().map(|w| w.location()) else {
        return "/".to_string();
    };
    let path = location.pathname().unwrap_or_else(|_| "/".to_string());
    let search = location.search().unwrap_or_default();
    let hash = location.hash().unwrap_or_default();
    format!("{}{}{}", path, search, hash)
}

fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryMode {
    Push,
    /// 初次加载、前进后退、认证变化后的重新评估
    Replace,
}

/// 路由器服务
///
/// 通过注入的认证版本信号与认证系统解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<Option<ResolvedRoute>>,
    set_route: WriteSignal<Option<ResolvedRoute>>,
    navigator: StoredValue<Rc<AppNavigator>, LocalStorage>,
    auth_version: Signal<u64>,
}

impl RouterService {
    fn new(navigator: AppNavigator, auth_version: Signal<u64>) -> Self {
        let (current_route, set_route) = signal(None);
        Self {
            current_route,
            set_route,
            navigator: StoredValue::new_local(Rc::new(navigator)),
            auth_version,
        }
    }

    pub fn current_route(&self) -> ReadSignal<Option<ResolvedRoute>> {
        self.current_route
    }

    /// **核心方法：导航**
    pub fn navigate(&self, path: &str) {
        self.dispatch(path.to_string(), HistoryMode::Push);
    }

    fn dispatch(&self, path: String, mode: HistoryMode) {
        let navigator = self.navigator.get_value();
        let set_route = self.set_route;
        spawn_local(async move {
            let outcome = navigator.navigate(&path).await;
            apply_outcome(outcome, mode, set_route);
        });
    }

    fn revalidate(&self) {
        let navigator = self.navigator.get_value();
        let set_route = self.set_route;
        spawn_local(async move {
            match navigator.revalidate().await {
                Ok(Some(outcome)) => apply_outcome(Ok(outcome), HistoryMode::Replace, set_route),
                Ok(None) => {}
                Err(e) => apply_outcome(Err(e), HistoryMode::Replace, set_route),
            }
        });
    }

    /// 浏览器后退/前进：同样经过守卫
    fn init_popstate_listener(&self) {
        let service = *self;
        let closure = Closure::<dyn Fn()>::new(move || {
            service.dispatch(current_full_path(), HistoryMode::Replace);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 认证状态变化时重新评估当前页面
    fn setup_auth_redirect(&self) {
        let service = *self;
        let auth_version = self.auth_version;
        Effect::new(move |previous: Option<u64>| {
            let version = auth_version.get();
            if previous.is_some_and(|p| p != version) {
                log::info!("[Router] Auth state changed, re-evaluating current route.");
                service.revalidate();
            }
            version
        });
    }
}

/// 把导航结果写回 History 与界面；被取代的结果直接丢弃
fn apply_outcome(
    outcome: Result<NavigationOutcome, NavigationError>,
    mode: HistoryMode,
    set_route: WriteSignal<Option<ResolvedRoute>>,
) {
    match outcome {
        Ok(NavigationOutcome::Completed(route)) => {
            let full_path = route.location.full_path();
            match mode {
                HistoryMode::Push => push_history_state(&full_path),
                HistoryMode::Replace => replace_history_state(&full_path),
            }
            set_route.set(Some(route));
        }
        Ok(NavigationOutcome::Superseded) => {}
        Err(e) => log::error!("[Router] Navigation failed: {}", e),
    }
}

fn provide_router(navigator: AppNavigator, auth_version: Signal<u64>) -> RouterService {
    let router = RouterService::new(navigator, auth_version);

    router.init_popstate_listener();
    router.setup_auth_redirect();
    router.dispatch(current_full_path(), HistoryMode::Replace);

    provide_context(router);
    router
}

pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
#[component]
pub fn Router(
    navigator: AppNavigator,
    /// 认证版本信号
    auth_version: Signal<u64>,
    children: Children,
) -> impl IntoView {
    provide_router(navigator, auth_version);

    children()
}

/// 路由出口组件
///
/// 首次守卫评估完成前不渲染任何内容。
#[component]
pub fn RouterOutlet(
    /// 接收当前路由，返回对应视图（含布局）
    matcher: fn(&ResolvedRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || router.current_route().with(|route| route.as_ref().map(matcher))
}

/// 站内链接，点击时走路由服务而不是整页跳转
#[component]
pub fn Link(
    #[prop(into)] to: String,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let target = to.clone();
    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        router.navigate(&target);
    };

    view! {
        <a href=to class=class on:click=on_click>
            {children()}
        </a>
    }
}

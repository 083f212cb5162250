//! Logbook 前端应用
//!
//! 采用 Context-Driven 的架构：
//! - `logbook_router`: 路由表与导航守卫（平台无关的核心）
//! - `web::router`: 路由服务（浏览器 History 绑定）
//! - `auth`: 认证状态与 Supabase 认证服务
//! - `views`: 视图映射

mod auth;
mod config;
mod views;

use crate::auth::{AuthContext, SupabaseAuthProvider};
use crate::config::{SupabaseConfig, load_router_config};

use leptos::prelude::*;
use logbook_router::Navigator;
use logbook_router::routes::app_table;

// 原生 Web API 封装模块
pub(crate) mod web {
    pub mod router;
    mod storage;

    pub use storage::BrowserStorage;
}

use web::router::{Router, RouterOutlet};

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建认证上下文
    let auth_ctx = AuthContext::new();
    provide_context(auth_ctx);

    // 2. 组装导航器：路由表 + 认证服务
    let router_config = load_router_config();
    let provider = SupabaseAuthProvider::new(SupabaseConfig::load());
    if provider.config().is_none() {
        log::warn!("[App] Supabase is not configured; protected routes will redirect to login.");
    }
    let table = match app_table(&router_config) {
        Ok(table) => table,
        Err(e) => {
            log::error!("[App] Invalid route table: {}", e);
            return view! { <p class="p-6 text-error">"Router configuration error."</p> }
                .into_any();
        }
    };
    let navigator = Navigator::new(table, provider, router_config);

    // 3. 认证版本信号注入路由服务（解耦）
    let auth_version = auth_ctx.version_signal();

    view! {
        <Router navigator=navigator auth_version=auth_version>
            <RouterOutlet matcher=views::route_matcher />
        </Router>
    }
    .into_any()
}

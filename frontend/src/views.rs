//! 视图映射
//!
//! 把 `ViewId` 链渲染为嵌套视图：布局在外，叶子视图在内。
//! 业务页面本身（日志、报表、profile 等）只是占位，数据加载不在路由层处理。

use leptos::prelude::*;
use leptos::task::spawn_local;
use logbook_router::{ResolvedRoute, ViewId};

use crate::auth::{sign_in, sign_out, use_auth};
use crate::config::SupabaseConfig;
use crate::web::router::Link;

/// 路由出口的匹配函数
pub fn route_matcher(route: &ResolvedRoute) -> AnyView {
    let mut content: Option<AnyView> = None;
    for view in route.views.iter().rev() {
        content = Some(render_view(*view, route, content.take()));
    }
    content.unwrap_or_else(|| not_found().into_any())
}

fn render_view(view: ViewId, route: &ResolvedRoute, child: Option<AnyView>) -> AnyView {
    match view {
        ViewId::HomeViewLayout => home_layout(child),
        ViewId::DashboardLayout => view! { <DashboardLayout child=child /> }.into_any(),
        ViewId::HomeContent => page("Logbook", "Keep track of your work, one entry at a time."),
        ViewId::HomeAbout => page("About", "A small logbook for teams."),
        ViewId::Login => view! { <LoginPage /> }.into_any(),
        ViewId::Register => page("Register", "Create an account to start logging."),
        ViewId::ForgotPassword => page("Forgot password", "We will email you a reset link."),
        ViewId::VerifyEmail => page("Verify email", "Check your inbox to confirm your address."),
        ViewId::ResetPassword => page("Reset password", "Choose a new password."),
        ViewId::Dashboard => page("Dashboard", "Recent activity."),
        ViewId::LogList => page("Logs", "All log entries."),
        ViewId::LogCreate => page("New log", "Create a log entry."),
        ViewId::LogDetail => log_page("Log", route),
        ViewId::LogEdit => log_page("Edit log", route),
        ViewId::Profile => page("Profile", "Your account details."),
        ViewId::UserManagement => page("Users", "Manage accounts and roles."),
        ViewId::Reports => page("Reports", "Summaries of logged work."),
        ViewId::Unauthorized => page("Unauthorized", "You do not have access to this page."),
    }
}

fn page(title: &'static str, body: &'static str) -> AnyView {
    view! {
        <section class="p-6">
            <h1 class="text-2xl font-bold">{title}</h1>
            <p class="mt-2 text-base-content/70">{body}</p>
        </section>
    }
    .into_any()
}

/// 日志详情/编辑页：路径参数以 props 形式传入
fn log_page(title: &'static str, route: &ResolvedRoute) -> AnyView {
    let id = route
        .props
        .as_ref()
        .and_then(|props| props.iter().find(|(k, _)| k == "id"))
        .map(|(_, v)| v.clone())
        .unwrap_or_default();

    view! {
        <section class="p-6">
            <h1 class="text-2xl font-bold">{title} " #" {id}</h1>
        </section>
    }
    .into_any()
}

fn not_found() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="text-center">
                <h1 class="text-6xl font-bold text-error">"404"</h1>
                <p class="text-xl mt-4">"Page not found"</p>
            </div>
        </div>
    }
}

// ============================================================================
// 布局
// ============================================================================

fn home_layout(child: Option<AnyView>) -> AnyView {
    view! {
        <div class="min-h-screen bg-base-200">
            <nav class="navbar bg-base-100 shadow gap-2">
                <Link to="/home" class="btn btn-ghost">"Home"</Link>
                <Link to="/about" class="btn btn-ghost">"About"</Link>
                <Link to="/login" class="btn btn-ghost">"Sign in"</Link>
            </nav>
            <main>{child}</main>
        </div>
    }
    .into_any()
}

#[component]
fn DashboardLayout(child: Option<AnyView>) -> impl IntoView {
    let auth = use_auth();

    view! {
        <div class="min-h-screen bg-base-200">
            <nav class="navbar bg-base-100 shadow gap-2">
                <Link to="/dashboard" class="btn btn-ghost">"Dashboard"</Link>
                <Link to="/logs" class="btn btn-ghost">"Logs"</Link>
                <Link to="/reports" class="btn btn-ghost">"Reports"</Link>
                <Link to="/profile" class="btn btn-ghost">"Profile"</Link>
                <button class="btn btn-outline ml-auto" on:click=move |_| sign_out(&auth)>
                    "Sign out"
                </button>
            </nav>
            <main>{child}</main>
        </div>
    }
}

/// 登录页
///
/// 登录成功后不在此处跳转：认证版本变化会让路由服务重新评估，
/// 守卫随即把已登录用户送往面板。
#[component]
fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        set_error_msg.set(None);
        spawn_local(async move {
            let config = SupabaseConfig::load();
            let result = sign_in(&auth, config.as_ref(), &email.get_untracked(), &password.get_untracked()).await;
            if let Err(e) = result {
                log::warn!("[Auth] {}", e);
                set_error_msg.set(Some("Sign in failed.".to_string()));
            }
        });
    };

    view! {
        <form class="card-body max-w-md mx-auto" on:submit=on_submit>
            <Show when=move || error_msg.get().is_some()>
                <div role="alert" class="alert alert-error text-sm py-2">
                    {move || error_msg.get().unwrap_or_default()}
                </div>
            </Show>
            <input
                type="email"
                placeholder="Email"
                class="input input-bordered"
                on:input=move |ev| set_email.set(event_target_value(&ev))
                prop:value=email
            />
            <input
                type="password"
                placeholder="Password"
                class="input input-bordered"
                on:input=move |ev| set_password.set(event_target_value(&ev))
                prop:value=password
            />
            <button class="btn btn-primary mt-4">"Sign in"</button>
        </form>
    }
}

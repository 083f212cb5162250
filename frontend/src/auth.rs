//! 认证模块
//!
//! 会话令牌保存在 LocalStorage，由 [`SupabaseAuthProvider`] 在每次守卫评估时
//! 重新读取并向后端确认。认证状态变化通过 `AuthContext` 的版本信号通知路由服务，
//! 路由服务据此重新评估当前页面。

use async_trait::async_trait;
use gloo_net::http::Request;
use leptos::prelude::*;
use logbook_router::{AuthError, AuthProvider, AuthResult, Role, User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SupabaseConfig;
use crate::web::BrowserStorage;

// =========================================================
// 认证上下文
// =========================================================

/// 认证上下文
///
/// 只携带一个递增版本号：登录、登出都会使其变化。
#[derive(Clone, Copy)]
pub struct AuthContext {
    version: ReadSignal<u64>,
    set_version: WriteSignal<u64>,
}

impl AuthContext {
    pub fn new() -> Self {
        let (version, set_version) = signal(0u64);
        Self {
            version,
            set_version,
        }
    }

    /// 认证版本信号（用于路由服务注入）
    pub fn version_signal(&self) -> Signal<u64> {
        let version = self.version;
        Signal::derive(move || version.get())
    }

    fn bump(&self) {
        self.set_version.update(|v| *v += 1);
    }
}

pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// 邮箱密码登录，成功后保存令牌并通知路由服务
pub async fn sign_in(
    ctx: &AuthContext,
    config: Option<&SupabaseConfig>,
    email: &str,
    password: &str,
) -> AuthResult<()> {
    let config = config.ok_or_else(not_configured)?;
    let url = config.endpoint("/auth/v1/token?grant_type=password");

    let res = Request::post(&url)
        .header("apikey", &config.anon_key)
        .json(&PasswordGrant { email, password })
        .map_err(|e| AuthError::identity_fetch(e.to_string()).in_op("auth.sign_in"))?
        .send()
        .await
        .map_err(|e| AuthError::identity_fetch(e.to_string()).in_op_with("http.post", &url))?;

    if !res.ok() {
        return Err(
            AuthError::identity_fetch(format!("sign in rejected: {}", res.status()))
                .in_op("auth.sign_in"),
        );
    }

    let token: TokenResponse = res
        .json()
        .await
        .map_err(|e| AuthError::identity_fetch(e.to_string()).in_op("auth.sign_in.decode"))?;

    BrowserStorage::set_session_token(&token.access_token);
    ctx.bump();
    Ok(())
}

/// 注销并清除令牌
///
/// 不需要手动导航：路由服务会监听版本变化并重新评估当前页面。
pub fn sign_out(ctx: &AuthContext) {
    BrowserStorage::clear_session_token();
    ctx.bump();
}

fn not_configured() -> AuthError {
    AuthError::identity_fetch("backend is not configured")
}

// =========================================================
// 生产环境实现 (Supabase REST)
// =========================================================

#[derive(Deserialize)]
struct ProfileRow {
    role: Option<Role>,
}

#[derive(Clone, Debug)]
pub struct SupabaseAuthProvider {
    config: Option<SupabaseConfig>,
}

impl SupabaseAuthProvider {
    pub fn new(config: Option<SupabaseConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> Option<&SupabaseConfig> {
        self.config.as_ref()
    }
}

#[async_trait(?Send)]
impl AuthProvider for SupabaseAuthProvider {
    async fn get_current_user(&self) -> AuthResult<Option<User>> {
        let Some(token) = BrowserStorage::session_token() else {
            return Ok(None);
        };
        let config = self.config.as_ref().ok_or_else(not_configured)?;
        let url = config.endpoint("/auth/v1/user");

        let res = Request::get(&url)
            .header("apikey", &config.anon_key)
            .header("Authorization", &format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| AuthError::identity_fetch(e.to_string()).in_op_with("http.get", &url))?;

        // 令牌过期或被吊销：视为未登录
        if matches!(res.status(), 401 | 403) {
            return Ok(None);
        }
        if !res.ok() {
            return Err(
                AuthError::identity_fetch(format!("unexpected status {}", res.status()))
                    .in_op_with("auth.current_user", &url),
            );
        }

        res.json::<User>()
            .await
            .map(Some)
            .map_err(|e| AuthError::identity_fetch(e.to_string()).in_op("auth.current_user.decode"))
    }

    async fn get_profile_role(&self, user_id: &Uuid) -> AuthResult<Option<Role>> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| AuthError::role_lookup("backend is not configured"))?;
        let url = config.endpoint(&format!("/rest/v1/profiles?select=role&id=eq.{}", user_id));

        let mut req = Request::get(&url).header("apikey", &config.anon_key);
        if let Some(token) = BrowserStorage::session_token() {
            req = req.header("Authorization", &format!("Bearer {}", token));
        }

        let res = req
            .send()
            .await
            .map_err(|e| AuthError::role_lookup(e.to_string()).in_op_with("http.get", &url))?;

        if !res.ok() {
            return Err(
                AuthError::role_lookup(format!("unexpected status {}", res.status()))
                    .in_op_with("profiles.role", user_id.to_string()),
            );
        }

        let rows: Vec<ProfileRow> = res
            .json()
            .await
            .map_err(|e| AuthError::role_lookup(e.to_string()).in_op("profiles.role.decode"))?;
        Ok(rows.into_iter().next().and_then(|row| row.role))
    }
}

//! 导航守卫 - 唯一执行授权逻辑的地方
//!
//! 流程：获取身份 -> 计算要求 -> 按顺序套用规则表 -> 输出唯一决策。
//!
//! 规则以数据形式给出（[`GuardRule::DEFAULT_ORDER`]），先命中的规则决定结果，
//! 全部未命中时放行。认证服务的任何失败都降级为"未登录 / 无角色"，
//! 即失败关闭（fail-closed），不会把错误抛给调用方。

use serde::{Deserialize, Serialize};

use crate::auth::{AuthProvider, User};
use crate::config::RouterConfig;
use crate::location::{Location, normalize_path};
use crate::table::RouteMatch;

// =========================================================
// 决策与请求
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardDecision {
    Allow,
    RedirectTo {
        path: String,
        query: Vec<(String, String)>,
    },
}

impl GuardDecision {
    pub fn redirect(path: impl Into<String>) -> Self {
        Self::RedirectTo {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// 重定向目标；放行时为 None
    pub fn location(&self) -> Option<Location> {
        match self {
            Self::Allow => None,
            Self::RedirectTo { path, query } => Some(Location::from_parts(path.clone(), query.clone())),
        }
    }
}

/// 单次导航请求，用完即弃
#[derive(Debug, Clone)]
pub struct NavigationRequest<'a> {
    pub target: Location,
    pub matched: RouteMatch<'a>,
}

impl<'a> NavigationRequest<'a> {
    pub fn new(target: Location, matched: RouteMatch<'a>) -> Self {
        Self { target, matched }
    }
}

// =========================================================
// 规则表
// =========================================================

/// 守卫规则，按 [`GuardRule::DEFAULT_ORDER`] 依次评估
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardRule {
    /// 需要认证但没有用户 -> 登录页（携带原目标）
    RequireSession,
    /// 已登录用户访问登录/注册页 -> 面板
    BounceAuthenticated,
    /// 路由声明了角色且有用户 -> 校验 profile 角色
    EnforceRoles,
}

impl GuardRule {
    pub const DEFAULT_ORDER: [GuardRule; 3] = [
        GuardRule::RequireSession,
        GuardRule::BounceAuthenticated,
        GuardRule::EnforceRoles,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GuardRule::RequireSession => "require_session",
            GuardRule::BounceAuthenticated => "bounce_authenticated",
            GuardRule::EnforceRoles => "enforce_roles",
        }
    }

    /// 规则的前置条件
    pub fn applies(
        &self,
        request: &NavigationRequest<'_>,
        user: Option<&User>,
        config: &RouterConfig,
    ) -> bool {
        match self {
            GuardRule::RequireSession => request.matched.requires_auth() && user.is_none(),
            GuardRule::BounceAuthenticated => {
                user.is_some() && is_guest_only(&request.target, config)
            }
            GuardRule::EnforceRoles => {
                user.is_some() && request.matched.declared_roles().next().is_some()
            }
        }
    }

    /// 前置条件成立后的决策，只有 EnforceRoles 需要再次访问外部服务
    pub async fn decide<P: AuthProvider + ?Sized>(
        &self,
        request: &NavigationRequest<'_>,
        user: Option<&User>,
        config: &RouterConfig,
        provider: &P,
    ) -> GuardDecision {
        match self {
            GuardRule::RequireSession => GuardDecision::RedirectTo {
                path: config.login_path.clone(),
                query: vec![(
                    config.redirect_query_key.clone(),
                    request.target.full_path(),
                )],
            },
            GuardRule::BounceAuthenticated => GuardDecision::redirect(&config.dashboard_path),
            GuardRule::EnforceRoles => {
                let Some(user) = user else {
                    return GuardDecision::redirect(&config.unauthorized_path);
                };
                let role = match provider.get_profile_role(&user.id).await {
                    Ok(role) => role,
                    Err(e) => {
                        log::warn!("[Guard] Role lookup failed, denying: {}", e);
                        None
                    }
                };
                let permitted = role.is_some_and(|role| {
                    request
                        .matched
                        .declared_roles()
                        .all(|roles| roles.contains(&role))
                });
                if permitted {
                    GuardDecision::Allow
                } else {
                    GuardDecision::redirect(&config.unauthorized_path)
                }
            }
        }
    }
}

fn is_guest_only(target: &Location, config: &RouterConfig) -> bool {
    let path = target.normalized_path();
    config
        .guest_only_paths
        .iter()
        .any(|p| normalize_path(p).eq_ignore_ascii_case(&path))
}

// =========================================================
// 守卫
// =========================================================

/// 导航守卫
///
/// 无内部状态，每次导航都重新评估，不缓存任何决策。
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    rules: Vec<GuardRule>,
    config: RouterConfig,
}

impl NavigationGuard {
    pub fn new(config: RouterConfig) -> Self {
        Self::with_rules(config, GuardRule::DEFAULT_ORDER.to_vec())
    }

    /// 使用自定义规则顺序（便于单独测试某条规则）
    pub fn with_rules(config: RouterConfig, rules: Vec<GuardRule>) -> Self {
        Self { rules, config }
    }

    pub fn rules(&self) -> &[GuardRule] {
        &self.rules
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// **核心方法：评估一次导航**
    pub async fn evaluate<P: AuthProvider + ?Sized>(
        &self,
        request: &NavigationRequest<'_>,
        provider: &P,
    ) -> GuardDecision {
        // --- Step 1: 获取身份，失败视为未登录 ---
        let user = match provider.get_current_user().await {
            Ok(user) => user,
            Err(e) => {
                log::warn!("[Guard] Identity fetch failed, treating as signed out: {}", e);
                None
            }
        };

        // --- Step 2: 按顺序套用规则 ---
        for rule in &self.rules {
            if !rule.applies(request, user.as_ref(), &self.config) {
                continue;
            }
            let decision = rule
                .decide(request, user.as_ref(), &self.config, provider)
                .await;
            log::debug!(
                "[Guard] {} -> {:?} (rule: {})",
                request.target,
                decision,
                rule.name()
            );
            return decision;
        }

        log::debug!("[Guard] {} -> Allow", request.target);
        GuardDecision::Allow
    }
}

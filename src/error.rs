use std::fmt;

use serde::{Deserialize, Serialize};

// =========================================================
// 认证错误状态
// =========================================================

/// 认证提供方错误状态
///
/// 两类错误都不会展示给终端用户，守卫会把它们降级为拒绝分支。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthErrorStatus {
    /// 获取当前用户失败 (网络错误、会话服务不可用等)
    IdentityFetch,
    /// 查询 profile 角色失败
    RoleLookup,
}

impl AuthErrorStatus {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthErrorStatus::IdentityFetch => "IDENTITY_FETCH_FAILED",
            AuthErrorStatus::RoleLookup => "ROLE_LOOKUP_FAILED",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSpan {
    /// 操作名称，如 "auth.current_user", "profiles.role"
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorSpan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: None,
        }
    }

    pub fn with_detail(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: Some(detail.into()),
        }
    }
}

// =========================================================
// 认证错误
// =========================================================

/// Auth provider failure
///
/// - status: 失败的是哪一次外部调用
/// - message: 错误消息
/// - source: 原始错误（可选）
/// - spans: 调用追踪
#[derive(Debug)]
pub struct AuthError {
    pub status: AuthErrorStatus,
    pub message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    spans: Vec<ErrorSpan>,
}

impl AuthError {
    pub fn new(status: AuthErrorStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            source: None,
            spans: Vec::new(),
        }
    }

    pub fn identity_fetch(message: impl Into<String>) -> Self {
        Self::new(AuthErrorStatus::IdentityFetch, message)
    }

    pub fn role_lookup(message: impl Into<String>) -> Self {
        Self::new(AuthErrorStatus::RoleLookup, message)
    }

    /// 添加操作追踪（无额外细节）
    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::new(operation));
        self
    }

    /// 添加操作追踪（带额外细节）
    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::with_detail(operation, detail));
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn error_code(&self) -> &'static str {
        self.status.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;

// =========================================================
// 路由表 / 导航 / 配置错误
// =========================================================

/// 路由表构建失败（启动期错误）
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteTableError {
    #[error("duplicate route name `{0}`")]
    DuplicateName(String),
    #[error("invalid path pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("redirect route `{0}` cannot declare children")]
    RedirectWithChildren(String),
}

/// 导航无法得出可渲染路由时的错误
///
/// 只代表路由表配置问题，认证失败不会走到这里。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("no route matches `{0}`")]
    NoMatch(String),
    #[error("too many redirects while navigating to `{target}` (limit {limit})")]
    RedirectLoop { target: String, limit: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid router config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("router config field `{field}` must be an absolute path, got `{value}`")]
    RelativePath { field: &'static str, value: String },
}

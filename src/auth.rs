//! 认证能力抽象
//!
//! 守卫只通过 [`AuthProvider`] 访问外部认证服务，
//! 会话的生命周期完全由提供方管理，本 crate 不持有任何认证状态。

use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthResult;

/// 当前登录用户
///
/// 存在即代表已认证。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    pub fn new(id: Uuid) -> Self {
        Self { id, email: None }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// profile 表中的角色名
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =========================================================
// 抽象认证接口
// =========================================================

/// 外部认证服务
///
/// 浏览器中的 Future 不是 `Send`，因此使用 `?Send`。
#[async_trait(?Send)]
pub trait AuthProvider {
    /// 获取当前会话用户，未登录时返回 `Ok(None)`
    async fn get_current_user(&self) -> AuthResult<Option<User>>;

    /// 查询用户 profile 的角色，profile 不存在或未设置角色时返回 `Ok(None)`
    async fn get_profile_role(&self, user_id: &Uuid) -> AuthResult<Option<Role>>;
}

#[async_trait(?Send)]
impl<P: AuthProvider + ?Sized> AuthProvider for &P {
    async fn get_current_user(&self) -> AuthResult<Option<User>> {
        (**self).get_current_user().await
    }

    async fn get_profile_role(&self, user_id: &Uuid) -> AuthResult<Option<Role>> {
        (**self).get_profile_role(user_id).await
    }
}

#[async_trait(?Send)]
impl<P: AuthProvider + ?Sized> AuthProvider for Rc<P> {
    async fn get_current_user(&self) -> AuthResult<Option<User>> {
        (**self).get_current_user().await
    }

    async fn get_profile_role(&self, user_id: &Uuid) -> AuthResult<Option<Role>> {
        (**self).get_profile_role(user_id).await
    }
}

// =========================================================
// 测试替身
// =========================================================

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::error::AuthError;
    use futures::channel::oneshot;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    /// 可编排的认证服务替身
    ///
    /// 记录每次调用，便于断言调用次数与顺序。
    #[derive(Default)]
    pub struct MockAuthProvider {
        user: RefCell<Option<User>>,
        roles: RefCell<HashMap<Uuid, Role>>,
        fail_identity: Cell<bool>,
        fail_role_lookup: Cell<bool>,
        /// 下一次 get_current_user 会挂起直到收到信号
        identity_gate: RefCell<Option<oneshot::Receiver<()>>>,
        log: RefCell<Vec<String>>,
    }

    impl MockAuthProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn signed_in(user: User) -> Self {
            let mock = Self::new();
            mock.set_user(Some(user));
            mock
        }

        pub fn set_user(&self, user: Option<User>) {
            *self.user.borrow_mut() = user;
        }

        pub fn set_role(&self, user_id: Uuid, role: &str) {
            self.roles.borrow_mut().insert(user_id, Role::new(role));
        }

        pub fn fail_identity(&self, fail: bool) {
            self.fail_identity.set(fail);
        }

        pub fn fail_role_lookup(&self, fail: bool) {
            self.fail_role_lookup.set(fail);
        }

        pub fn gate_next_identity(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            *self.identity_gate.borrow_mut() = Some(rx);
            tx
        }

        pub fn calls(&self) -> Vec<String> {
            self.log.borrow().clone()
        }

        pub fn count(&self, prefix: &str) -> usize {
            self.log
                .borrow()
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }
    }

    #[async_trait(?Send)]
    impl AuthProvider for MockAuthProvider {
        async fn get_current_user(&self) -> AuthResult<Option<User>> {
            self.log.borrow_mut().push("get_current_user".to_string());
            let gate = self.identity_gate.borrow_mut().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if self.fail_identity.get() {
                return Err(AuthError::identity_fetch("Simulated failure"));
            }
            Ok(self.user.borrow().clone())
        }

        async fn get_profile_role(&self, user_id: &Uuid) -> AuthResult<Option<Role>> {
            self.log
                .borrow_mut()
                .push(format!("get_profile_role:{}", user_id));
            if self.fail_role_lookup.get() {
                return Err(AuthError::role_lookup("Simulated failure"));
            }
            Ok(self.roles.borrow().get(user_id).cloned())
        }
    }

    #[tokio::test]
    async fn test_rc_provider_delegates() {
        let mock = Rc::new(MockAuthProvider::signed_in(User::new(Uuid::from_u128(7))));
        let user = mock.get_current_user().await.unwrap();
        assert_eq!(user.map(|u| u.id), Some(Uuid::from_u128(7)));
        assert_eq!(mock.count("get_current_user"), 1);
    }

    #[test]
    fn test_user_deserializes_from_provider_payload() {
        let raw = r#"{"id":"00000000-0000-0000-0000-00000000002a","email":"a@b.c","aud":"authenticated"}"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.id, Uuid::from_u128(42));
        assert_eq!(user.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_role_is_transparent() {
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::from("admin"));
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"admin\"");
    }
}

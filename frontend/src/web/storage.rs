//! 浏览器持久化状态
//!
//! 前端写入 LocalStorage 的全部键都集中在这里，调用方只通过
//! 类型化的访问器读写，不直接拼键名。

const SESSION_TOKEN_KEY: &str = "logbook_access_token";
const SUPABASE_URL_KEY: &str = "logbook_supabase_url";
const SUPABASE_ANON_KEY: &str = "logbook_supabase_anon_key";

/// LocalStorage 中的 Logbook 状态
///
/// 存储不可用（隐私模式、非浏览器环境）时读取一律为 None，写入静默失败。
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// 空白值视为不存在
    fn read(key: &str) -> Option<String> {
        Self::storage()?
            .get_item(key)
            .ok()?
            .filter(|v| !v.trim().is_empty())
    }

    fn write(key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            if storage.set_item(key, value).is_err() {
                log::warn!("[Storage] Failed to write {}", key);
            }
        }
    }

    fn remove(key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }

    // --- 会话令牌 ---

    /// 登录成功后保存的 access token
    pub fn session_token() -> Option<String> {
        Self::read(SESSION_TOKEN_KEY)
    }

    pub fn set_session_token(token: &str) {
        Self::write(SESSION_TOKEN_KEY, token);
    }

    pub fn clear_session_token() {
        Self::remove(SESSION_TOKEN_KEY);
    }

    // --- 后端连接（构建期未注入时的运行期回退）---

    pub fn supabase_url() -> Option<String> {
        Self::read(SUPABASE_URL_KEY)
    }

    pub fn supabase_anon_key() -> Option<String> {
        Self::read(SUPABASE_ANON_KEY)
    }
}

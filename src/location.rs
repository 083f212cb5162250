//! 导航目标位置
//!
//! 把 `path?query#hash` 形式的完整路径拆成结构化的 [`Location`]。

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    /// 保持原始顺序，允许重复 key
    #[serde(default)]
    pub query: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// `parse` 时的原始 query 文本；仅当它仍能解析出 `query` 时用于拼回路径
    #[serde(skip)]
    raw_query: Option<String>,
}

// 原始 query 文本只影响拼接，不参与比较
impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.query == other.query && self.hash == other.hash
    }
}

impl Eq for Location {}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            path: if path.is_empty() { "/".to_string() } else { path },
            query: Vec::new(),
            hash: None,
            raw_query: None,
        }
    }

    /// 由路径与已解码的 query 对构造，拼接时按 form-urlencoded 编码
    pub fn from_parts(path: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            query,
            ..Self::new(path)
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// 解析完整路径（如 `/logs?page=2#top`）
    pub fn parse(full_path: &str) -> Self {
        let (rest, hash) = match full_path.split_once('#') {
            Some((rest, hash)) if !hash.is_empty() => (rest, Some(hash.to_string())),
            Some((rest, _)) => (rest, None),
            None => (full_path, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, query),
            None => (rest, ""),
        };

        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        Self {
            path,
            query: decode_query(query),
            hash,
            raw_query: (!query.is_empty()).then(|| query.to_string()),
        }
    }

    /// 继承另一个位置的 query（含原始文本）
    pub fn inherit_query(&mut self, from: &Location) {
        self.query = from.query.clone();
        self.raw_query = from.raw_query.clone();
    }

    /// 拼回完整路径
    ///
    /// 解析得到且未被修改的 query 原样输出；否则按 form-urlencoded 重新编码。
    pub fn full_path(&self) -> String {
        let mut out = self.path.clone();
        let raw = self
            .raw_query
            .as_deref()
            .filter(|raw| decode_query(raw) == self.query);
        if let Some(raw) = raw {
            out.push('?');
            out.push_str(raw);
        } else if !self.query.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter())
                .finish();
            out.push('?');
            out.push_str(&encoded);
        }
        if let Some(hash) = &self.hash {
            out.push('#');
            out.push_str(hash);
        }
        out
    }

    /// 第一个匹配 key 的 query 值
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 用于匹配的规范化路径
    pub fn normalized_path(&self) -> String {
        normalize_path(&self.path)
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_path())
    }
}

fn decode_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes()).into_owned().collect()
}

/// 合并重复斜杠并去掉末尾斜杠（根路径除外）
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return "/".to_string();
    }
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_query_and_hash() {
        let loc = Location::parse("/logs?page=2&sort=desc#top");
        assert_eq!(loc.path, "/logs");
        assert_eq!(loc.query_value("page"), Some("2"));
        assert_eq!(loc.query_value("sort"), Some("desc"));
        assert_eq!(loc.hash.as_deref(), Some("top"));
    }

    #[test]
    fn test_parse_empty_is_root() {
        assert_eq!(Location::parse("").path, "/");
        assert_eq!(Location::parse("?a=1").path, "/");
    }

    #[test]
    fn test_nested_full_path_survives_encoding() {
        let inner = "/logs/7/edit?tab=notes&x=a b";
        let loc = Location::new("/login").with_query("redirect", inner);
        let full = loc.full_path();
        assert!(full.starts_with("/login?redirect="));
        assert!(!full[1..].contains("/logs"), "inner path must be encoded: {}", full);

        let reparsed = Location::parse(&full);
        assert_eq!(reparsed.query_value("redirect"), Some(inner));
        assert_eq!(reparsed, loc);
    }

    #[test]
    fn test_full_path_keeps_unmodified_raw_query() {
        for original in [
            "/logs?flag",
            "/logs?q=a%20b",
            "/logs?x=1;y=2",
            "/logs?a=%ZZ",
            "/logs?b=2&a=1#top",
        ] {
            assert_eq!(Location::parse(original).full_path(), original);
        }
    }

    #[test]
    fn test_modified_query_is_reencoded() {
        let mut loc = Location::parse("/logs?q=a%20b");
        loc.query.push(("page".to_string(), "2".to_string()));
        assert_eq!(loc.full_path(), "/logs?q=a+b&page=2");

        let loc = Location::parse("/logs?flag").with_query("page", "2");
        assert_eq!(loc.full_path(), "/logs?flag=&page=2");
    }

    #[test]
    fn test_raw_query_does_not_affect_equality() {
        assert_eq!(Location::parse("/logs?q=a%20b"), Location::parse("/logs?q=a+b"));
    }

    #[test]
    fn test_inherit_query_keeps_raw_text() {
        let from = Location::parse("/?x=1;y=2");
        let mut to = Location::parse("/home");
        to.inherit_query(&from);
        assert_eq!(to.full_path(), "/home?x=1;y=2");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("//"), "/");
        assert_eq!(normalize_path("/logs/"), "/logs");
        assert_eq!(normalize_path("/logs//12/"), "/logs/12");
    }
}

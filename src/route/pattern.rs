use crate::error::RouteTableError;
use crate::location::normalize_path;

/// 路径模式中的一段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// 字面量，忽略 ASCII 大小写
    Static(String),
    /// `:id`，匹配一个非空段
    Param(String),
    /// `:name(.*)*`，匹配剩余所有段（可为空），只能出现在末尾
    CatchAll(String),
}

const CATCH_ALL_SUFFIX: &str = "(.*)*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, RouteTableError> {
        let invalid = |reason: &str| RouteTableError::InvalidPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        let normalized = normalize_path(raw);
        let parts: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            let Some(name) = part.strip_prefix(':') else {
                segments.push(Segment::Static(part.to_string()));
                continue;
            };

            let (name, catch_all) = match name.strip_suffix(CATCH_ALL_SUFFIX) {
                Some(name) => (name, true),
                None => (name, false),
            };
            if name.is_empty() {
                return Err(invalid("empty parameter name"));
            }
            if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(invalid("parameter names may only contain [A-Za-z0-9_]"));
            }
            if catch_all {
                if i + 1 != parts.len() {
                    return Err(invalid("catch-all must be the last segment"));
                }
                segments.push(Segment::CatchAll(name.to_string()));
            } else {
                segments.push(Segment::Param(name.to_string()));
            }
        }

        Ok(Self {
            raw: normalized,
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::CatchAll(_)))
    }

    /// 匹配成功时返回捕获的参数（按声明顺序）
    pub fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let normalized = normalize_path(path);
        let parts: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Vec::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Static(literal) => {
                    let part = parts.get(i)?;
                    if !part.eq_ignore_ascii_case(literal) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let part = parts.get(i)?;
                    params.push((name.clone(), part.to_string()));
                }
                Segment::CatchAll(name) => {
                    let rest = parts.get(i..).map(|p| p.join("/")).unwrap_or_default();
                    params.push((name.clone(), rest));
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    /// 反向生成路径；缺少参数或模式为 catch-all 时返回 None
    pub fn build(&self, params: &[(&str, &str)]) -> Option<String> {
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Static(literal) => parts.push(literal.clone()),
                Segment::Param(name) => {
                    let (_, value) = params.iter().find(|(k, _)| *k == name.as_str())?;
                    if value.is_empty() || value.contains('/') {
                        return None;
                    }
                    parts.push(value.to_string());
                }
                Segment::CatchAll(_) => return None,
            }
        }
        Some(format!("/{}", parts.join("/")))
    }
}

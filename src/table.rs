//! 路由表
//!
//! 启动时把嵌套的 [`RouteDefinition`] 展开为扁平记录，运行期只读。
//! 匹配顺序即声明顺序（深度优先，子路由先于父路由），先命中者胜出。

use std::collections::{BTreeSet, HashSet};

use crate::auth::Role;
use crate::error::RouteTableError;
use crate::route::{PathPattern, RouteAction, RouteDefinition, RouteMeta, ViewId};

/// 展开后的单条路由记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub name: Option<String>,
    /// 绝对路径模式
    pub pattern: PathPattern,
    pub action: RouteAction,
    pub meta: RouteMeta,
    pub props: bool,
    parent: Option<usize>,
}

impl RouteRecord {
    pub fn view(&self) -> Option<ViewId> {
        match &self.action {
            RouteAction::Render(view) => Some(*view),
            RouteAction::Redirect(_) => None,
        }
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match &self.action {
            RouteAction::Redirect(target) => Some(target),
            RouteAction::Render(_) => None,
        }
    }
}

/// 一次查找的结果：命中的记录链（祖先在前）与路径参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub chain: Vec<&'a RouteRecord>,
    pub params: Vec<(String, String)>,
}

impl<'a> RouteMatch<'a> {
    /// 最深的记录，即真正命中的那条
    pub fn leaf(&self) -> &'a RouteRecord {
        // chain 在构造时至少包含命中记录本身
        self.chain[self.chain.len() - 1]
    }

    /// 链路上任一记录声明 requires_auth 即需要认证
    pub fn requires_auth(&self) -> bool {
        self.chain.iter().any(|r| r.meta.requires_auth)
    }

    /// 链路上所有声明过的角色集合
    pub fn declared_roles(&self) -> impl Iterator<Item = &'a BTreeSet<Role>> + '_ {
        self.chain
            .iter()
            .copied()
            .filter_map(|r| r.meta.roles.as_ref())
    }

    /// leaf 声明 props 时交给视图的参数
    pub fn props(&self) -> Option<&[(String, String)]> {
        self.leaf().props.then_some(self.params.as_slice())
    }

    /// 从外到内的视图链（布局在前）
    pub fn views(&self) -> Vec<ViewId> {
        self.chain.iter().filter_map(|r| r.view()).collect()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    records: Vec<RouteRecord>,
    /// 匹配顺序（records 的下标）
    order: Vec<usize>,
}

impl RouteTable {
    pub fn new(definitions: Vec<RouteDefinition>) -> Result<Self, RouteTableError> {
        let mut table = Self {
            records: Vec::new(),
            order: Vec::new(),
        };
        let mut names = HashSet::new();
        table.flatten(definitions, None, "/", &mut names)?;
        table.warn_orphan_roles();
        Ok(table)
    }

    fn flatten(
        &mut self,
        definitions: Vec<RouteDefinition>,
        parent: Option<usize>,
        parent_path: &str,
        names: &mut HashSet<String>,
    ) -> Result<(), RouteTableError> {
        for def in definitions {
            let path = if def.path.starts_with('/') {
                def.path.clone()
            } else {
                format!("{}/{}", parent_path.trim_end_matches('/'), def.path)
            };
            let pattern = PathPattern::parse(&path)?;

            if let Some(name) = &def.name {
                if !names.insert(name.clone()) {
                    return Err(RouteTableError::DuplicateName(name.clone()));
                }
            }
            if matches!(def.action, RouteAction::Redirect(_)) && !def.children.is_empty() {
                return Err(RouteTableError::RedirectWithChildren(path));
            }

            let index = self.records.len();
            self.records.push(RouteRecord {
                name: def.name,
                pattern,
                action: def.action,
                meta: def.meta,
                props: def.props,
                parent,
            });

            if def.children.is_empty() {
                self.order.push(index);
            } else {
                // 布局只通过子路由命中
                self.flatten(def.children, Some(index), &path, names)?;
            }
        }
        Ok(())
    }

    fn warn_orphan_roles(&self) {
        for index in 0..self.records.len() {
            let chain = self.chain_of(index);
            let has_roles = chain.iter().any(|r| r.meta.roles.is_some());
            let requires_auth = chain.iter().any(|r| r.meta.requires_auth);
            if has_roles && !requires_auth {
                log::warn!(
                    "[RouteTable] `{}` declares roles without requiresAuth; roles only apply to signed-in users",
                    self.records[index].pattern.as_str()
                );
            }
        }
    }

    fn chain_of(&self, index: usize) -> Vec<&RouteRecord> {
        let mut chain = Vec::new();
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            chain.push(&self.records[i]);
            cursor = self.records[i].parent;
        }
        chain.reverse();
        chain
    }

    /// 查找路径，返回第一条命中的记录链
    pub fn lookup(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.order.iter().find_map(|&index| {
            let params = self.records[index].pattern.matches(path)?;
            Some(RouteMatch {
                chain: self.chain_of(index),
                params,
            })
        })
    }

    /// 按名字反向生成路径
    pub fn path_for(&self, name: &str, params: &[(&str, &str)]) -> Option<String> {
        self.records
            .iter()
            .find(|r| r.name.as_deref() == Some(name))
            .and_then(|r| r.pattern.build(params))
    }

    pub fn records(&self) -> &[RouteRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

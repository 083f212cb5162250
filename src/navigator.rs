//! 导航器 - 路由表 + 守卫的组合
//!
//! 实现"解析 -> 重定向 -> 守卫 -> 提交"的导航流程，与平台无关；
//! 浏览器 History 的读写由前端负责。
//!
//! 单线程协作式调度：守卫是挂起点。每次导航领取一个递增的代号，
//! 恢复执行时若发现已有更新的导航开始，则丢弃自身结果，从不提交。

use std::cell::{Cell, RefCell};

use serde::{Deserialize, Serialize};

use crate::auth::AuthProvider;
use crate::config::RouterConfig;
use crate::error::NavigationError;
use crate::guard::{NavigationGuard, NavigationRequest};
use crate::location::Location;
use crate::route::ViewId;
use crate::table::{RouteMatch, RouteTable};

/// 通过守卫后最终落地的路由
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRoute {
    pub location: Location,
    pub name: Option<String>,
    /// 布局在前，叶子视图在后
    pub views: Vec<ViewId>,
    pub params: Vec<(String, String)>,
    /// 仅当路由声明 props 时存在
    pub props: Option<Vec<(String, String)>>,
    /// 发生过重定向时记录最初请求的位置
    pub redirected_from: Option<Location>,
}

impl ResolvedRoute {
    fn from_match(location: Location, matched: &RouteMatch<'_>, requested: &Location) -> Self {
        Self {
            redirected_from: (location != *requested).then(|| requested.clone()),
            location,
            name: matched.leaf().name.clone(),
            views: matched.views(),
            params: matched.params.clone(),
            props: matched.props().map(<[_]>::to_vec),
        }
    }

    pub fn leaf_view(&self) -> Option<ViewId> {
        self.views.last().copied()
    }

    pub fn was_redirected(&self) -> bool {
        self.redirected_from.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Completed(ResolvedRoute),
    /// 被更新的导航取代，结果已丢弃
    Superseded,
}

pub struct Navigator<P: AuthProvider> {
    table: RouteTable,
    guard: NavigationGuard,
    provider: P,
    config: RouterConfig,
    generation: Cell<u64>,
    current: RefCell<Option<ResolvedRoute>>,
}

impl<P: AuthProvider> Navigator<P> {
    pub fn new(table: RouteTable, provider: P, config: RouterConfig) -> Self {
        Self {
            table,
            guard: NavigationGuard::new(config.clone()),
            provider,
            config,
            generation: Cell::new(0),
            current: RefCell::new(None),
        }
    }

    /// 替换守卫（例如自定义规则顺序）
    pub fn with_guard(mut self, guard: NavigationGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// 最近一次提交的路由
    pub fn current(&self) -> Option<ResolvedRoute> {
        self.current.borrow().clone()
    }

    /// **核心方法：导航**
    ///
    /// 路由级重定向与守卫重定向共享 `max_redirects` 上限。
    pub async fn navigate(&self, target: &str) -> Result<NavigationOutcome, NavigationError> {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        let requested = Location::parse(target);
        let mut location = requested.clone();
        let mut hops = 0usize;

        loop {
            let matched = self
                .table
                .lookup(&location.path)
                .ok_or_else(|| NavigationError::NoMatch(location.full_path()))?;

            // --- Step 1: 路由级重定向（保留 query 与 hash）---
            if let Some(to) = matched.leaf().redirect_target() {
                hops = self.count_hop(hops, &requested)?;
                let mut next = Location::parse(to);
                if next.query.is_empty() {
                    next.inherit_query(&location);
                }
                if next.hash.is_none() {
                    next.hash = location.hash.clone();
                }
                log::debug!("[Router] {} redirects to {}", location, next);
                location = next;
                continue;
            }

            // --- Step 2: 守卫（挂起点）---
            let request = NavigationRequest::new(location.clone(), matched);
            let decision = self.guard.evaluate(&request, &self.provider).await;

            if self.generation.get() != generation {
                log::debug!("[Router] Navigation to {} superseded, discarding", location);
                return Ok(NavigationOutcome::Superseded);
            }

            // --- Step 3: 提交或跟随守卫重定向 ---
            match decision.location() {
                None => {
                    let resolved = ResolvedRoute::from_match(location, &request.matched, &requested);
                    *self.current.borrow_mut() = Some(resolved.clone());
                    log::info!("[Router] Navigated to {}", resolved.location);
                    return Ok(NavigationOutcome::Completed(resolved));
                }
                Some(next) => {
                    hops = self.count_hop(hops, &requested)?;
                    log::info!("[Router] Guard redirected {} to {}", location, next);
                    location = next;
                }
            }
        }
    }

    /// 用当前位置重新导航（认证状态变化后调用）
    pub async fn revalidate(&self) -> Result<Option<NavigationOutcome>, NavigationError> {
        let Some(current) = self.current() else {
            return Ok(None);
        };
        self.navigate(&current.location.full_path()).await.map(Some)
    }

    fn count_hop(&self, hops: usize, requested: &Location) -> Result<usize, NavigationError> {
        let hops = hops + 1;
        if hops > self.config.max_redirects {
            log::error!("[Router] Redirect loop while navigating to {}", requested);
            return Err(NavigationError::RedirectLoop {
                target: requested.full_path(),
                limit: self.config.max_redirects,
            });
        }
        Ok(hops)
    }
}

#[cfg(test)]
mod tests;

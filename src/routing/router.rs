//! Trie-based router
//!
//! Paths are split on `/` and stored one segment per node. A segment written
//! as `{name}` captures whatever the request has in that position. Static
//! segments always win over captures at the same depth.

use super::{Route, RouteHandler};
use std::collections::HashMap;

/// Result of a successful lookup
pub struct RouteMatch {
    pub handler: RouteHandler,
    pub params: HashMap<String, String>,
}

#[derive(Default)]
struct TrieNode {
    static_children: HashMap<String, TrieNode>,
    param_child: Option<(String, Box<TrieNode>)>,
    handlers: HashMap<String, RouteHandler>,
}

#[derive(Default)]
pub struct Router {
    root: TrieNode,
    route_count: usize,
}

enum PathSegment {
    Static(String),
    Parameter(String),
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_route(&mut self, route: Route) {
        let mut current = &mut self.root;

        for segment in Self::parse_path(&route.path) {
            current = match segment {
                PathSegment::Static(name) => current.static_children.entry(name).or_default(),
                PathSegment::Parameter(name) => current
                    .param_child
                    .get_or_insert_with(|| (name, Box::default()))
                    .1
                    .as_mut(),
            };
        }

        if current
            .handlers
            .insert(route.method.clone(), route.handler)
            .is_some()
        {
            log::warn!("Route {} {} registered twice, keeping the last one", route.method, route.path);
        } else {
            self.route_count += 1;
        }
    }

    pub fn add_routes(&mut self, routes: Vec<Route>) {
        for route in routes {
            self.add_route(route);
        }
    }

    /// Match a method and path (query string ignored)
    pub fn match_route(&self, method: &str, path: &str) -> Option<RouteMatch> {
        let path_only = path.split('?').next().unwrap_or(path);
        let segments: Vec<&str> = path_only.split('/').filter(|s| !s.is_empty()).collect();

        let mut params = HashMap::new();
        let node = Self::match_segments(&self.root, &segments, &mut params)?;
        let handler = *node.handlers.get(&method.to_uppercase())?;

        Some(RouteMatch { handler, params })
    }

    pub fn route_count(&self) -> usize {
        self.route_count
    }

    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }

    fn parse_path(path: &str) -> Vec<PathSegment> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(name) => PathSegment::Parameter(name.to_string()),
                    None => PathSegment::Static(segment.to_string()),
                }
            })
            .collect()
    }

    fn match_segments<'a>(
        node: &'a TrieNode,
        segments: &[&str],
        params: &mut HashMap<String, String>,
    ) -> Option<&'a TrieNode> {
        let Some((first, rest)) = segments.split_first() else {
            return Some(node);
        };

        if let Some(child) = node.static_children.get(*first) {
            if let Some(found) = Self::match_segments(child, rest, params) {
                return Some(found);
            }
        }

        if let Some((name, child)) = &node.param_child {
            params.insert(name.clone(), first.to_string());
            if let Some(found) = Self::match_segments(child, rest, params) {
                return Some(found);
            }
            params.remove(name);
        }

        None
    }
}

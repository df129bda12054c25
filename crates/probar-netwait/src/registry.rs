//! Route and operation registry
//!
//! Holds the method + path patterns and GraphQL operation names a test has
//! declared. Patterns are kept in registration order; the first pattern that
//! matches a request wins.

use crate::request::{CapturedRequest, HttpMethod, OperationKind};
use crate::result::{NetwaitError, NetwaitResult};
use regex::Regex;

/// A registered `(method, path-pattern)` pair
///
/// Path patterns support `:name` segments (one non-empty path component)
/// and `*` wildcards. Absolute patterns (`https://host/todos/:id`) match the
/// full URL, path-only patterns (`/todos/:id`) match the URL's path. Query
/// strings and fragments are ignored on both sides.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    method: HttpMethod,
    pattern: String,
    absolute: bool,
    matcher: Regex,
}

impl RoutePattern {
    /// Compile a route pattern
    pub fn new(method: HttpMethod, pattern: &str) -> NetwaitResult<Self> {
        if pattern.trim().is_empty() {
            return Err(NetwaitError::InvalidPattern {
                pattern: pattern.to_string(),
                message: "pattern is empty".to_string(),
            });
        }
        let absolute = pattern.contains("://");
        let source = compile_pattern(crate::request::strip_query(pattern));
        let matcher = Regex::new(&source).map_err(|e| NetwaitError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            method,
            pattern: pattern.to_string(),
            absolute,
            matcher,
        })
    }

    /// HTTP method this route answers
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Pattern as registered
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Canonical key: `METHOD:pattern`
    #[must_use]
    pub fn key(&self) -> String {
        route_key(self.method, &self.pattern)
    }

    /// Check if a concrete URL matches the path pattern (method ignored)
    #[must_use]
    pub fn matches_url(&self, url: &str) -> bool {
        let target = if self.absolute {
            crate::request::strip_query(url)
        } else {
            crate::request::url_path(url)
        };
        self.matcher.is_match(target)
    }

    /// Check method and path against a request
    #[must_use]
    pub fn matches(&self, request: &CapturedRequest) -> bool {
        self.method.accepts(request.method) && self.matches_url(&request.url)
    }
}

/// `METHOD:pattern`, also used for the unregistered fallback `METHOD:url`
#[must_use]
pub fn route_key(method: HttpMethod, pattern: &str) -> String {
    format!("{}:{}", method.as_str(), pattern)
}

/// Translate a route pattern into an anchored regex
fn compile_pattern(pattern: &str) -> String {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();
    let mut prev = '\0';
    while let Some(c) = chars.next() {
        match c {
            ':' if prev == '/' && chars.peek().is_some_and(|n| is_param_char(*n)) => {
                while chars.peek().is_some_and(|n| is_param_char(*n)) {
                    chars.next();
                }
                out.push_str("[^/]+");
                prev = 'p';
                continue;
            }
            '*' => out.push_str(".*"),
            other => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
        prev = c;
    }
    if !pattern.ends_with('/') && !pattern.ends_with('*') {
        out.push_str("/?");
    }
    out.push('$');
    out
}

fn is_param_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Registered routes and GraphQL operations for the current test
#[derive(Debug, Clone, Default)]
pub struct Registry {
    routes: Vec<RoutePattern>,
    operations: Vec<(OperationKind, String)>,
}

impl Registry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route and return its key
    ///
    /// Re-registering the same method and pattern keeps the original
    /// position so the key and its entry stay stable.
    pub fn register_route(&mut self, method: HttpMethod, pattern: &str) -> NetwaitResult<String> {
        let key = route_key(method, pattern);
        if !self.routes.iter().any(|r| r.key() == key) {
            self.routes.push(RoutePattern::new(method, pattern)?);
        }
        Ok(key)
    }

    /// Register a GraphQL operation and return its key (the name)
    pub fn register_operation(&mut self, kind: OperationKind, name: &str) -> String {
        if !self.has_operation(kind, name) {
            self.operations.push((kind, name.to_string()));
        }
        name.to_string()
    }

    /// First registered route matching the request
    #[must_use]
    pub fn resolve_route(&self, request: &CapturedRequest) -> Option<&RoutePattern> {
        self.routes.iter().find(|route| route.matches(request))
    }

    /// Whether an operation name was declared for this kind
    #[must_use]
    pub fn has_operation(&self, kind: OperationKind, name: &str) -> bool {
        self.operations.iter().any(|(k, n)| *k == kind && n == name)
    }

    /// Registered routes in order
    #[must_use]
    pub fn routes(&self) -> &[RoutePattern] {
        &self.routes
    }

    /// Number of registered routes
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Number of registered operations
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }
}

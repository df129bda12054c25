//! Observed requests
//!
//! The request snapshot captured by the interception layer, the HTTP method
//! enum used for route matching, and GraphQL operation metadata extraction.

use crate::result::{NetwaitError, NetwaitResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request method a route is registered for
///
/// `Any` is the wildcard a route gets when its method is unknown or omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// Wildcard, displayed as `*`
    Any,
}

/// Concrete methods paired with their wire spelling
const METHOD_NAMES: [(HttpMethod, &str); 7] = [
    (HttpMethod::Get, "GET"),
    (HttpMethod::Post, "POST"),
    (HttpMethod::Put, "PUT"),
    (HttpMethod::Delete, "DELETE"),
    (HttpMethod::Patch, "PATCH"),
    (HttpMethod::Head, "HEAD"),
    (HttpMethod::Options, "OPTIONS"),
];

impl HttpMethod {
    /// Lenient parse used by install commands
    ///
    /// Case and surrounding whitespace are ignored; anything unrecognised
    /// becomes the wildcard.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        METHOD_NAMES
            .iter()
            .find(|(_, spelling)| spelling.eq_ignore_ascii_case(name))
            .map_or(Self::Any, |&(method, _)| method)
    }

    /// Uppercase wire spelling, `*` for the wildcard
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        METHOD_NAMES
            .iter()
            .find(|(method, _)| method == self)
            .map_or("*", |&(_, spelling)| spelling)
    }

    /// Whether a route registered for `self` accepts a request sent with `sent`
    #[must_use]
    pub fn accepts(self, sent: Self) -> bool {
        matches!((self, sent), (Self::Any, _) | (_, Self::Any)) || self == sent
    }
}

impl From<&str> for HttpMethod {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of GraphQL operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// `query { ... }`
    Query,
    /// `mutation { ... }`
    Mutation,
}

impl OperationKind {
    /// Lowercase keyword
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GraphQL operation metadata carried in a request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphqlOperation {
    /// Query or mutation
    pub kind: OperationKind,
    /// `operationName` field
    pub name: String,
}

/// A captured network request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedRequest {
    /// Identifier assigned by the interception layer, unique per attempt
    pub id: String,
    /// Request URL
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: Option<Vec<u8>>,
    /// Timestamp (milliseconds since interception start)
    pub timestamp_ms: u64,
}

impl CapturedRequest {
    /// Create a new captured request with no id yet
    #[must_use]
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            id: String::new(),
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
            timestamp_ms: 0,
        }
    }

    /// Shorthand for a GET request
    #[must_use]
    pub fn get(url: &str) -> Self {
        Self::new(url, HttpMethod::Get)
    }

    /// Build a GraphQL POST request carrying `operationName` and `query`
    #[must_use]
    pub fn graphql(url: &str, operation_name: &str, query: &str) -> Self {
        let body = serde_json::json!({
            "operationName": operation_name,
            "query": query,
            "variables": {},
        });
        Self::new(url, HttpMethod::Post)
            .with_header("content-type", "application/json")
            .with_body(body.to_string().into_bytes())
    }

    /// Set request id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Set body
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Set JSON body
    pub fn with_json<T: Serialize>(mut self, data: &T) -> NetwaitResult<Self> {
        self.body = Some(serde_json::to_vec(data)?);
        Ok(self)
    }

    /// Get body as string
    #[must_use]
    pub fn body_string(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).to_string())
    }

    /// Parse body as JSON
    pub fn body_json<T: for<'de> Deserialize<'de>>(&self) -> NetwaitResult<T> {
        let body = self.body.as_ref().ok_or_else(|| NetwaitError::InvalidState {
            message: format!("request {} has no body", self.id),
        })?;
        Ok(serde_json::from_slice(body)?)
    }

    /// URL with query string and fragment removed
    #[must_use]
    pub fn url_without_query(&self) -> &str {
        strip_query(&self.url)
    }

    /// Path component of the URL, without query string or fragment
    #[must_use]
    pub fn path(&self) -> &str {
        url_path(&self.url)
    }

    /// GraphQL metadata, if the body names an operation
    ///
    /// A body whose `query` text starts with `mutation` (any case) is a
    /// mutation, everything else carrying an `operationName` is a query.
    #[must_use]
    pub fn graphql_operation(&self) -> Option<GraphqlOperation> {
        let body = self.body.as_ref()?;
        let value: serde_json::Value = serde_json::from_slice(body).ok()?;
        let name = value.get("operationName")?.as_str()?;
        if name.is_empty() {
            return None;
        }
        let query = value.get("query").and_then(|q| q.as_str()).unwrap_or("");
        let head = query.trim_start();
        let is_mutation = head
            .get(..8)
            .is_some_and(|kw| kw.eq_ignore_ascii_case("mutation"));
        Some(GraphqlOperation {
            kind: if is_mutation {
                OperationKind::Mutation
            } else {
                OperationKind::Query
            },
            name: name.to_string(),
        })
    }
}

/// Drop `?query` and `#fragment` from a URL
pub(crate) fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Path component of an absolute or relative URL
pub(crate) fn url_path(url: &str) -> &str {
    let url = strip_query(url);
    match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            match rest.find('/') {
                Some(slash) => &rest[slash..],
                None => "/",
            }
        }
        None => url,
    }
}

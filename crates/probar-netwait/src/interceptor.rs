//! Interception layer boundary
//!
//! The interception layer observes outbound requests, may synthesize
//! responses through installed handlers, and reports lifecycle events to
//! subscribed observers. Delivery is at-least-once per network event with no
//! ordering guarantee across distinct request ids.

use crate::registry::RoutePattern;
use crate::request::{CapturedRequest, OperationKind};
use crate::response::{MockResponse, ResponseComposer};
use crate::result::NetwaitResult;
use std::sync::Arc;

/// User callback that builds a mock response for a matched request
pub type ResponseBuilder =
    Arc<dyn Fn(&CapturedRequest, &ResponseComposer) -> NetwaitResult<MockResponse> + Send + Sync>;

/// Wrap a closure as a [`ResponseBuilder`]
pub fn response_builder<F>(f: F) -> ResponseBuilder
where
    F: Fn(&CapturedRequest, &ResponseComposer) -> NetwaitResult<MockResponse>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Lifecycle events emitted by the interception layer
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    /// A request started
    RequestObserved(CapturedRequest),
    /// A handler produced a mocked response
    ResponseResolved {
        /// Id of the request being answered
        request_id: String,
        /// Copy of the response delivered to the page
        response: MockResponse,
    },
    /// The request went to the network unmocked
    ResponsePassthrough {
        /// Id of the request being answered
        request_id: String,
        /// Copy of the response delivered to the page
        response: MockResponse,
    },
}

impl NetworkEvent {
    /// Request id the event refers to
    #[must_use]
    pub fn request_id(&self) -> &str {
        match self {
            Self::RequestObserved(request) => &request.id,
            Self::ResponseResolved { request_id, .. }
            | Self::ResponsePassthrough { request_id, .. } => request_id,
        }
    }
}

/// Receiver of lifecycle events
///
/// Implementations must not panic or block; they run inside the
/// interception layer's delivery path.
pub trait LifecycleObserver: Send + Sync {
    /// Handle one event
    fn on_event(&self, event: &NetworkEvent);
}

/// What a handler answers
#[derive(Debug, Clone)]
pub enum HandlerMatcher {
    /// Method + path pattern
    Route(RoutePattern),
    /// GraphQL operation by kind and name
    Operation {
        /// Query or mutation
        kind: OperationKind,
        /// Operation name
        name: String,
    },
}

impl HandlerMatcher {
    /// Check a request against this matcher
    #[must_use]
    pub fn matches(&self, request: &CapturedRequest) -> bool {
        match self {
            Self::Route(route) => route.matches(request),
            Self::Operation { kind, name } => request
                .graphql_operation()
                .is_some_and(|op| op.kind == *kind && op.name == *name),
        }
    }

    /// Identity used to replace an earlier handler for the same target
    #[must_use]
    pub fn identity(&self) -> String {
        match self {
            Self::Route(route) => route.key(),
            Self::Operation { kind, name } => format!("{kind} {name}"),
        }
    }
}

/// A handler installed with the interception layer
#[derive(Clone)]
pub struct RequestHandler {
    /// Requests this handler answers
    pub matcher: HandlerMatcher,
    /// Response builder; `None` lets the request pass through
    pub builder: Option<ResponseBuilder>,
}

impl std::fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandler")
            .field("matcher", &self.matcher)
            .field("has_builder", &self.builder.is_some())
            .finish()
    }
}

impl RequestHandler {
    /// Create a handler
    #[must_use]
    pub fn new(matcher: HandlerMatcher, builder: Option<ResponseBuilder>) -> Self {
        Self { matcher, builder }
    }
}

/// The external interception layer
pub trait InterceptionLayer: Send + Sync {
    /// Install a handler; replaces an existing handler with the same identity
    fn use_handler(&self, handler: RequestHandler);

    /// Drop every installed handler
    fn reset_handlers(&self);

    /// Register an observer for lifecycle events
    ///
    /// The layer must not keep the observer alive: once the caller drops
    /// its last handle, delivery stops.
    fn subscribe(&self, observer: Arc<dyn LifecycleObserver>);

    /// Begin intercepting
    fn start(&self) -> NetwaitResult<()>;

    /// Stop intercepting
    fn stop(&self);

    /// Whether the layer is intercepting
    fn is_active(&self) -> bool;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::request::HttpMethod;

    #[test]
    fn test_route_matcher() {
        let route = RoutePattern::new(HttpMethod::Get, "/todos/:id").unwrap();
        let matcher = HandlerMatcher::Route(route);
        assert!(matcher.matches(&CapturedRequest::get("https://api.test/todos/3")));
        assert_eq!(matcher.identity(), "GET:/todos/:id");
    }

    #[test]
    fn test_operation_matcher_checks_kind() {
        let matcher = HandlerMatcher::Operation {
            kind: OperationKind::Mutation,
            name: "UpdateCourse".to_string(),
        };
        let mutation =
            CapturedRequest::graphql("/graphql", "UpdateCourse", "mutation { update { id } }");
        let query = CapturedRequest::graphql("/graphql", "UpdateCourse", "query { course { id } }");
        assert!(matcher.matches(&mutation));
        assert!(!matcher.matches(&query));
        assert_eq!(matcher.identity(), "mutation UpdateCourse");
    }

    #[test]
    fn test_event_request_id() {
        let event = NetworkEvent::ResponseResolved {
            request_id: "abc".to_string(),
            response: MockResponse::default(),
        };
        assert_eq!(event.request_id(), "abc");
        let event = NetworkEvent::RequestObserved(CapturedRequest::get("/").with_id("xyz"));
        assert_eq!(event.request_id(), "xyz");
    }

    #[test]
    fn test_handler_debug_hides_closure() {
        let handler = RequestHandler::new(
            HandlerMatcher::Operation {
                kind: OperationKind::Query,
                name: "Courses".to_string(),
            },
            Some(response_builder(|_, ctx| Ok(ctx.empty()))),
        );
        let debug = format!("{handler:?}");
        assert!(debug.contains("has_builder: true"));
    }
}

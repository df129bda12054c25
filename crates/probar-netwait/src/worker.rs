//! In-process interception layer
//!
//! [`MockServiceWorker`] stands in for a browser's request-intercepting
//! worker: pages under test call [`MockServiceWorker::fetch`], handlers
//! answer or pass through, and every step is reported to subscribers.

use crate::interceptor::{InterceptionLayer, LifecycleObserver, NetworkEvent, RequestHandler};
use crate::request::CapturedRequest;
use crate::response::{MockResponse, ResponseComposer};
use crate::result::NetwaitResult;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

/// Where unmocked requests go
pub type Upstream = Arc<dyn Fn(&CapturedRequest) -> MockResponse + Send + Sync>;

struct WorkerState {
    handlers: Vec<RequestHandler>,
    observers: Vec<Weak<dyn LifecycleObserver>>,
    upstream: Upstream,
    active: bool,
    start_time: Instant,
}

/// Interception layer backed by in-memory handlers
///
/// Handlers are tried in installation order, the same order the registry
/// resolves keys in, so the handler that answers a request is the one whose
/// key records it. Re-installing a handler replaces it in place. The first
/// matching handler decides: without a builder the request passes through to
/// the upstream (404 by default).
///
/// Observers are held weakly: once every owner of an observer drops it, the
/// worker forgets it on the next request.
pub struct MockServiceWorker {
    state: Mutex<WorkerState>,
}

impl std::fmt::Debug for MockServiceWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        let observers = state.observers.iter().filter(|o| o.strong_count() > 0).count();
        f.debug_struct("MockServiceWorker")
            .field("handlers", &state.handlers.len())
            .field("observers", &observers)
            .field("active", &state.active)
            .finish()
    }
}

impl Default for MockServiceWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockServiceWorker {
    /// Create an inactive worker with the default 404 upstream
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WorkerState {
                handlers: Vec::new(),
                observers: Vec::new(),
                upstream: Arc::new(|_| MockResponse::error(404, "No route matched")),
                active: false,
                start_time: Instant::now(),
            }),
        }
    }

    /// Replace the upstream that answers unmocked requests
    #[must_use]
    pub fn with_upstream<F>(self, upstream: F) -> Self
    where
        F: Fn(&CapturedRequest) -> MockResponse + Send + Sync + 'static,
    {
        self.lock().upstream = Arc::new(upstream);
        self
    }

    fn lock(&self) -> MutexGuard<'_, WorkerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of installed handlers
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.lock().handlers.len()
    }

    /// Number of subscribed observers still alive
    #[must_use]
    pub fn observer_count(&self) -> usize {
        let mut state = self.lock();
        state.observers.retain(|o| o.strong_count() > 0);
        state.observers.len()
    }

    fn emit(observers: &[Arc<dyn LifecycleObserver>], event: &NetworkEvent) {
        for observer in observers {
            observer.on_event(event);
        }
    }

    /// Send a request through the worker
    ///
    /// Assigns an id if the request has none, reports the request, runs the
    /// first matching handler (honouring its delay), reports the resolution,
    /// and returns the response to the caller.
    pub async fn fetch(&self, mut request: CapturedRequest) -> MockResponse {
        let (builder, observers, upstream) = {
            let mut state = self.lock();
            if !state.active {
                let upstream = Arc::clone(&state.upstream);
                drop(state);
                return upstream(&request);
            }
            if request.id.is_empty() {
                request.id = uuid::Uuid::new_v4().to_string();
            }
            request.timestamp_ms = state.start_time.elapsed().as_millis() as u64;
            let builder = state
                .handlers
                .iter()
                .find(|h| h.matcher.matches(&request))
                .and_then(|h| h.builder.clone());
            state.observers.retain(|o| o.strong_count() > 0);
            let observers: Vec<Arc<dyn LifecycleObserver>> =
                state.observers.iter().filter_map(Weak::upgrade).collect();
            (builder, observers, Arc::clone(&state.upstream))
        };

        Self::emit(&observers, &NetworkEvent::RequestObserved(request.clone()));

        let request_id = request.id.clone();
        let (response, mocked) = match builder {
            Some(builder) => {
                let response = builder(&request, &ResponseComposer).unwrap_or_else(|err| {
                    tracing::warn!(
                        request_id = %request_id,
                        url = %request.url,
                        error = %err,
                        "response builder failed"
                    );
                    MockResponse::error(500, &err.to_string())
                });
                (response, true)
            }
            None => (upstream(&request), false),
        };

        if response.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(response.delay_ms)).await;
        }

        let event = if mocked {
            NetworkEvent::ResponseResolved {
                request_id,
                response: response.clone(),
            }
        } else {
            NetworkEvent::ResponsePassthrough {
                request_id,
                response: response.clone(),
            }
        };
        Self::emit(&observers, &event);
        response
    }
}

impl InterceptionLayer for MockServiceWorker {
    fn use_handler(&self, handler: RequestHandler) {
        let identity = handler.matcher.identity();
        let mut state = self.lock();
        match state
            .handlers
            .iter_mut()
            .find(|h| h.matcher.identity() == identity)
        {
            Some(existing) => *existing = handler,
            None => state.handlers.push(handler),
        }
    }

    fn reset_handlers(&self) {
        self.lock().handlers.clear();
    }

    fn subscribe(&self, observer: Arc<dyn LifecycleObserver>) {
        self.lock().observers.push(Arc::downgrade(&observer));
    }

    fn start(&self) -> NetwaitResult<()> {
        let mut state = self.lock();
        state.active = true;
        state.start_time = Instant::now();
        tracing::debug!("mock service worker started");
        Ok(())
    }

    fn stop(&self) {
        self.lock().active = false;
    }

    fn is_active(&self) -> bool {
        self.lock().active
    }
}

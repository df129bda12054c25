//! Event pipeline
//!
//! Turns interception-layer events into correlation-store updates:
//! request start registers a pending call, response resolution decodes the
//! body once and completes the call. Nothing here returns an error; events
//! that cannot be correlated are logged and dropped.

use crate::classifier::classify;
use crate::context::EngineState;
use crate::interceptor::NetworkEvent;
use crate::request::CapturedRequest;
use crate::response::MockResponse;
use crate::store::{Call, Completion};

/// What an event did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Applied {
    /// A new pending call was registered
    Registered,
    /// The request id had already been classified
    AlreadyClassified,
    /// A call completed
    Completed,
    /// Completion for an already-complete call
    Duplicate,
    /// Completion with nothing to attach to
    Orphan,
}

impl Applied {
    /// Whether waiters should re-check the store
    pub(crate) const fn changed_store(self) -> bool {
        matches!(self, Self::Registered | Self::Completed)
    }
}

/// Apply one lifecycle event
pub(crate) fn apply(state: &mut EngineState, event: &NetworkEvent) -> Applied {
    match event {
        NetworkEvent::RequestObserved(request) => observe_request(state, request),
        NetworkEvent::ResponseResolved {
            request_id,
            response,
        }
        | NetworkEvent::ResponsePassthrough {
            request_id,
            response,
        } => complete_response(state, request_id, response),
    }
}

/// Classify a started request and register a pending call
///
/// Classification is recorded once per request id; repeated observations
/// of the same id are no-ops.
pub(crate) fn observe_request(state: &mut EngineState, request: &CapturedRequest) -> Applied {
    let classification = classify(request, &state.registry);
    if !state
        .classifications
        .record(&request.id, classification.clone())
    {
        return Applied::AlreadyClassified;
    }
    tracing::debug!(
        request_id = %request.id,
        category = %classification.category,
        key = %classification.key,
        "request observed"
    );
    state.store.register_call(
        classification.category,
        &classification.key,
        Call::pending(request.clone()),
    );
    Applied::Registered
}

/// Decode a response and complete the matching call
pub(crate) fn complete_response(
    state: &mut EngineState,
    request_id: &str,
    response: &MockResponse,
) -> Applied {
    let Some(classification) = state.classifications.get(request_id) else {
        tracing::debug!(request_id, "dropping response for unknown request");
        return Applied::Orphan;
    };
    let category = classification.category;
    let key = classification.key.clone();

    let decoded = response.decode();
    match state.store.complete_call(category, &key, request_id, decoded) {
        Completion::Completed => {
            tracing::debug!(request_id, key = %key, status = response.status, "call completed");
            Applied::Completed
        }
        Completion::Duplicate => {
            tracing::debug!(request_id, key = %key, "duplicate resolution ignored");
            Applied::Duplicate
        }
        Completion::Orphan => {
            tracing::debug!(request_id, key = %key, "no call to complete");
            Applied::Orphan
        }
    }
}

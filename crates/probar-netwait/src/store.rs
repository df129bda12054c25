//! Correlation store
//!
//! Three independent key → entry tables (requests, queries, mutations).
//! Entries are append-only within a test; each call completes at most once.

use crate::classifier::Category;
use crate::request::CapturedRequest;
use crate::response::DecodedResponse;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One observed request and, once resolved, its decoded response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// Request id assigned by the interception layer
    pub id: String,
    /// Request snapshot
    pub request: CapturedRequest,
    /// Whether the response has arrived
    pub complete: bool,
    /// Decoded response, set exactly once
    pub response: Option<DecodedResponse>,
}

impl Call {
    /// A call that has started but not resolved
    #[must_use]
    pub fn pending(request: CapturedRequest) -> Self {
        Self {
            id: request.id.clone(),
            request,
            complete: false,
            response: None,
        }
    }
}

/// Per-key completion state plus ordered call history
///
/// `complete` mirrors the most recently added call only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Whether the latest call has completed
    pub complete: bool,
    /// Calls in arrival order
    pub calls: Vec<Call>,
}

impl Entry {
    /// Most recent call
    #[must_use]
    pub fn latest(&self) -> Option<&Call> {
        self.calls.last()
    }
}

/// Outcome of a completion attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Response attached
    Completed,
    /// Call had already completed; first response kept
    Duplicate,
    /// No entry or no call with that id
    Orphan,
}

/// Requests, queries and mutations tables
#[derive(Debug, Clone, Default)]
pub struct CorrelationStore {
    requests: HashMap<String, Entry>,
    queries: HashMap<String, Entry>,
    mutations: HashMap<String, Entry>,
}

impl CorrelationStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, category: Category) -> &HashMap<String, Entry> {
        match category {
            Category::Request => &self.requests,
            Category::Query => &self.queries,
            Category::Mutation => &self.mutations,
        }
    }

    fn table_mut(&mut self, category: Category) -> &mut HashMap<String, Entry> {
        match category {
            Category::Request => &mut self.requests,
            Category::Query => &mut self.queries,
            Category::Mutation => &mut self.mutations,
        }
    }

    /// Start a call under `key`, creating the entry if needed
    ///
    /// The entry flips back to incomplete: a new call has begun.
    pub fn register_call(&mut self, category: Category, key: &str, call: Call) {
        let entry = self.table_mut(category).entry(key.to_string()).or_default();
        entry.complete = false;
        entry.calls.push(call);
    }

    /// Attach a response to the call with `request_id`
    ///
    /// Unknown keys or ids are a silent no-op. A second resolution for a
    /// call that already completed leaves the first response in place.
    pub fn complete_call(
        &mut self,
        category: Category,
        key: &str,
        request_id: &str,
        response: DecodedResponse,
    ) -> Completion {
        let Some(entry) = self.table_mut(category).get_mut(key) else {
            return Completion::Orphan;
        };
        let Some(call) = entry.calls.iter_mut().find(|c| c.id == request_id) else {
            return Completion::Orphan;
        };
        if call.complete {
            return Completion::Duplicate;
        }
        call.complete = true;
        call.response = Some(response);
        entry.complete = entry.calls.last().is_some_and(|c| c.complete);
        Completion::Completed
    }

    /// Entry under `key`
    #[must_use]
    pub fn entry(&self, category: Category, key: &str) -> Option<&Entry> {
        self.table(category).get(key)
    }

    /// Latest call under `key`, only if the entry is complete
    #[must_use]
    pub fn latest_complete(&self, category: Category, key: &str) -> Option<&Call> {
        self.entry(category, key)
            .filter(|entry| entry.complete)
            .and_then(Entry::latest)
    }

    /// Full call history under `key`
    #[must_use]
    pub fn calls(&self, category: Category, key: &str) -> Option<&[Call]> {
        self.entry(category, key).map(|entry| entry.calls.as_slice())
    }

    /// Number of keys in a table
    #[must_use]
    pub fn key_count(&self, category: Category) -> usize {
        self.table(category).len()
    }

    /// Whether all three tables are empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty() && self.queries.is_empty() && self.mutations.is_empty()
    }
}

//! Network context
//!
//! [`NetworkContext`] owns every table the engine uses (registry,
//! classification log, correlation store, aliases) for the current test and
//! exposes the wait and call-count commands. Install commands live in
//! [`crate::installer`].
//!
//! # Example
//!
//! ```ignore
//! let worker = Arc::new(MockServiceWorker::new());
//! worker.start()?;
//! let ctx = NetworkContext::new(worker.clone(), NetwaitConfig::default());
//!
//! ctx.install_request("GET", "https://api.test/todos/:id", InstallOptions::new().alias("todos"))?;
//! worker.fetch(CapturedRequest::get("https://api.test/todos/1")).await;
//!
//! let call = ctx.wait_for_request("@todos").await?;
//! assert_eq!(ctx.get_request_calls("@todos")?.len(), 1);
//! ```

use crate::alias::AliasManager;
use crate::classifier::{Category, ClassificationLog};
use crate::config::NetwaitConfig;
use crate::interceptor::{InterceptionLayer, LifecycleObserver, NetworkEvent};
use crate::pipeline;
use crate::registry::Registry;
use crate::result::{NetwaitError, NetwaitResult};
use crate::store::{Call, CorrelationStore};
use crate::wait::{wait_for_call, WaitOptions};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// Every table scoped to one test
#[derive(Debug, Default)]
pub(crate) struct EngineState {
    pub(crate) generation: u64,
    pub(crate) registry: Registry,
    pub(crate) classifications: ClassificationLog,
    pub(crate) store: CorrelationStore,
    pub(crate) aliases: AliasManager,
}

/// Engine state plus the notification waiters park on
///
/// Registered with the interception layer as its lifecycle observer.
#[derive(Debug, Default)]
pub(crate) struct EngineShared {
    state: Mutex<EngineState>,
    changed: Notify,
}

impl EngineShared {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the state
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut EngineState) -> R) -> R {
        f(&mut self.lock())
    }

    pub(crate) fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub(crate) fn changed(&self) -> &Notify {
        &self.changed
    }

    /// Apply an event and wake waiters if the store moved
    pub(crate) fn dispatch(&self, event: &NetworkEvent) {
        let applied = self.with_state(|state| pipeline::apply(state, event));
        if applied.changed_store() {
            self.changed.notify_waiters();
        }
    }

    /// Swap in fresh tables and abandon pending waits
    pub(crate) fn reset(&self) {
        {
            let mut state = self.lock();
            let generation = state.generation + 1;
            *state = EngineState {
                generation,
                ..EngineState::default()
            };
        }
        self.changed.notify_waiters();
    }
}

impl LifecycleObserver for EngineShared {
    fn on_event(&self, event: &NetworkEvent) {
        self.dispatch(event);
    }
}

/// Per-suite handle to the correlation and wait engine
///
/// Cheap to clone; clones share the same tables.
#[derive(Clone)]
pub struct NetworkContext {
    pub(crate) shared: Arc<EngineShared>,
    pub(crate) layer: Arc<dyn InterceptionLayer>,
    pub(crate) config: NetwaitConfig,
}

impl std::fmt::Debug for NetworkContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkContext")
            .field("generation", &self.shared.generation())
            .field("layer_active", &self.layer.is_active())
            .field("config", &self.config)
            .finish()
    }
}

impl NetworkContext {
    /// Create a context and subscribe it to the interception layer
    #[must_use]
    pub fn new(layer: Arc<dyn InterceptionLayer>, config: NetwaitConfig) -> Self {
        let shared = Arc::new(EngineShared::default());
        layer.subscribe(Arc::clone(&shared) as Arc<dyn LifecycleObserver>);
        Self {
            shared,
            layer,
            config,
        }
    }

    /// Configuration in effect
    #[must_use]
    pub fn config(&self) -> &NetwaitConfig {
        &self.config
    }

    /// Reset for the next test: drop handlers and start from empty tables
    ///
    /// Waits still pending from the previous test fail with
    /// `WaitAbandoned`.
    pub fn reset(&self) {
        self.layer.reset_handlers();
        self.shared.reset();
        tracing::debug!(generation = self.shared.generation(), "network context reset");
    }

    /// Point an alias at a key
    pub fn set_alias(&self, alias: &str, key: &str) {
        self.shared
            .with_state(|state| state.aliases.set_alias(alias, key));
    }

    /// Resolve `@alias` or a raw key
    pub fn resolve(&self, alias_or_key: &str) -> NetwaitResult<String> {
        self.shared
            .with_state(|state| state.aliases.resolve(alias_or_key))
    }

    /// Alias-annotated label for a key
    #[must_use]
    pub fn describe(&self, key: &str) -> String {
        self.shared.with_state(|state| state.aliases.describe(key))
    }

    /// Wait for the latest REST call under `alias_or_key` to complete
    pub async fn wait_for_request(&self, alias_or_key: &str) -> NetwaitResult<Call> {
        self.wait_for(Category::Request, alias_or_key, &self.config.wait)
            .await
    }

    /// Wait for the latest GraphQL query under `alias_or_key` to complete
    pub async fn wait_for_query(&self, alias_or_key: &str) -> NetwaitResult<Call> {
        self.wait_for(Category::Query, alias_or_key, &self.config.wait)
            .await
    }

    /// Wait for the latest GraphQL mutation under `alias_or_key` to complete
    pub async fn wait_for_mutation(&self, alias_or_key: &str) -> NetwaitResult<Call> {
        self.wait_for(Category::Mutation, alias_or_key, &self.config.wait)
            .await
    }

    /// Wait with explicit options instead of the configured defaults
    pub async fn wait_for(
        &self,
        category: Category,
        alias_or_key: &str,
        options: &WaitOptions,
    ) -> NetwaitResult<Call> {
        options.validate()?;
        let key = self.resolve(alias_or_key)?;
        let label = self.describe(&key);
        tracing::info!(label = %label, table = %category, "waiting for {}", category);
        wait_for_call(&self.shared, category, &key, &label, options).await
    }

    /// Every REST call recorded under `alias_or_key`
    pub fn get_request_calls(&self, alias_or_key: &str) -> NetwaitResult<Vec<Call>> {
        self.get_calls(Category::Request, alias_or_key)
    }

    /// Every GraphQL query call recorded under `alias_or_key`
    pub fn get_query_calls(&self, alias_or_key: &str) -> NetwaitResult<Vec<Call>> {
        self.get_calls(Category::Query, alias_or_key)
    }

    /// Every GraphQL mutation call recorded under `alias_or_key`
    pub fn get_mutation_calls(&self, alias_or_key: &str) -> NetwaitResult<Vec<Call>> {
        self.get_calls(Category::Mutation, alias_or_key)
    }

    /// Call history for a key; `NotFound` if no call was ever recorded
    pub fn get_calls(&self, category: Category, alias_or_key: &str) -> NetwaitResult<Vec<Call>> {
        let key = self.resolve(alias_or_key)?;
        let calls = self.shared.with_state(|state| {
            state.store.calls(category, &key).map(<[Call]>::to_vec)
        });
        match calls {
            Some(calls) => {
                tracing::info!(
                    label = %self.describe(&key),
                    table = %category,
                    count = calls.len(),
                    "get calls"
                );
                Ok(calls)
            }
            None => Err(NetwaitError::NotFound { key }),
        }
    }
}

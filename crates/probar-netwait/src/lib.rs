//! Probar Netwait: deterministic waits on mocked network calls
//!
//! Declare the REST routes and GraphQL operations a test cares about, let the
//! page under test run, then wait for each call to be observed and answered
//! without polling network internals or guessing timing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                    NETWAIT Architecture                           │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐   handlers   ┌──────────────────┐               │
//! │   │ Installer  │─────────────►│ Interception     │               │
//! │   │ (+ alias)  │              │ Layer (worker)   │               │
//! │   └─────┬──────┘              └────────┬─────────┘               │
//! │         │ register                     │ lifecycle events        │
//! │         ▼                              ▼                         │
//! │   ┌────────────┐   classify   ┌──────────────────┐               │
//! │   │ Registry   │◄─────────────│ Pipeline         │               │
//! │   └────────────┘              └────────┬─────────┘               │
//! │                                        │ register / complete     │
//! │   ┌────────────┐    notify    ┌────────▼─────────┐               │
//! │   │ Wait       │◄─────────────│ Correlation      │               │
//! │   │ Primitive  │─────────────►│ Store            │               │
//! │   └────────────┘    lookup    └──────────────────┘               │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use probar_netwait::prelude::*;
//!
//! let worker = Arc::new(MockServiceWorker::new());
//! let mut suite = InterceptionSuite::new(worker.clone(), NetwaitConfig::default());
//! suite.setup()?;
//! let ctx = suite.before_each()?.clone();
//!
//! ctx.install_mutation(
//!     "UpdateCourse",
//!     InstallOptions::new()
//!         .alias("updateCourse")
//!         .respond(|_, res| res.data(&json!({ "updateCourse": { "id": 7 } }))),
//! )?;
//!
//! // ... the page fires the mutation through `worker.fetch(...)` ...
//!
//! let call = ctx.wait_for_mutation("@updateCourse").await?;
//! assert_eq!(ctx.get_mutation_calls("@updateCourse")?.len(), 1);
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Alias → key mapping for diagnostics and `@alias` arguments
pub mod alias;

/// Request categorization and key resolution
pub mod classifier;

#[allow(clippy::missing_errors_doc)]
pub mod config;

/// Per-suite engine handle: waits and call lookups
pub mod context;

/// Install commands for routes, operations and fixtures
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod installer;

/// Boundary with the external interception layer
pub mod interceptor;

pub mod logging;

mod pipeline;

/// Route patterns and GraphQL operation names
pub mod registry;

pub mod request;

#[allow(clippy::missing_const_for_fn)]
pub mod response;

mod result;

/// Three-table call store
pub mod store;

pub mod suite;

/// Wait options and the wait loop
pub mod wait;

/// In-process interception layer
pub mod worker;

pub use alias::AliasManager;
pub use classifier::{classify, Category, Classification, ClassificationLog};
pub use config::NetwaitConfig;
pub use context::NetworkContext;
pub use installer::{FixtureMock, InstallOptions};
pub use interceptor::{
    response_builder, HandlerMatcher, InterceptionLayer, LifecycleObserver, NetworkEvent,
    RequestHandler, ResponseBuilder,
};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use registry::{route_key, Registry, RoutePattern};
pub use request::{CapturedRequest, GraphqlOperation, HttpMethod, OperationKind};
pub use response::{DecodedResponse, MockResponse, ResponseBody, ResponseComposer};
pub use result::{NetwaitError, NetwaitResult};
pub use store::{Call, Completion, CorrelationStore, Entry};
pub use suite::{Fixture, InterceptionSuite, SuiteState};
pub use wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
pub use worker::{MockServiceWorker, Upstream};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::classifier::*;
    pub use super::config::*;
    pub use super::context::*;
    pub use super::installer::*;
    pub use super::interceptor::*;
    pub use super::logging::*;
    pub use super::request::*;
    pub use super::response::*;
    pub use super::result::*;
    pub use super::store::*;
    pub use super::suite::*;
    pub use super::wait::*;
    pub use super::worker::*;
    pub use serde_json::json;
    pub use std::sync::Arc;
}

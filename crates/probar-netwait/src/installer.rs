//! Interception installer
//!
//! Declares interest in a route or GraphQL operation, records it in the
//! registry so future calls resolve to a stable key, optionally names it with
//! an alias, and installs the matching handler with the interception layer.
//!
//! Re-installing the same method and pattern (or operation) replaces the
//! handler but keeps the key, so calls keep accumulating under one entry.

use crate::context::NetworkContext;
use crate::interceptor::{response_builder, HandlerMatcher, RequestHandler, ResponseBuilder};
use crate::registry::RoutePattern;
use crate::request::{CapturedRequest, HttpMethod, OperationKind};
use crate::response::{MockResponse, ResponseComposer};
use crate::result::{NetwaitError, NetwaitResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Optional parts of an install command
#[derive(Clone, Default)]
pub struct InstallOptions {
    /// Builds the mocked response; `None` tracks the call and lets it pass
    pub builder: Option<ResponseBuilder>,
    /// Alias to expose the key under
    pub alias: Option<String>,
}

impl std::fmt::Debug for InstallOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallOptions")
            .field("has_builder", &self.builder.is_some())
            .field("alias", &self.alias)
            .finish()
    }
}

impl InstallOptions {
    /// Track only, no alias
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer matching requests with `f`
    #[must_use]
    pub fn respond<F>(mut self, f: F) -> Self
    where
        F: Fn(&CapturedRequest, &ResponseComposer) -> NetwaitResult<MockResponse>
            + Send
            + Sync
            + 'static,
    {
        self.builder = Some(response_builder(f));
        self
    }

    /// Answer matching requests with an existing builder
    #[must_use]
    pub fn with_builder(mut self, builder: ResponseBuilder) -> Self {
        self.builder = Some(builder);
        self
    }

    /// Always answer with a clone of `response`
    #[must_use]
    pub fn reply(self, response: MockResponse) -> Self {
        self.respond(move |_, _| Ok(response.clone()))
    }

    /// Expose the key under `alias`
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

const fn default_enabled() -> bool {
    true
}

const fn default_status() -> u16 {
    200
}

/// Response served from a JSON fixture file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureMock {
    /// When false the route is tracked but not mocked
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// HTTP status to answer with
    #[serde(default = "default_status")]
    pub status: u16,
    /// Fixture name, resolved to `<fixtures_dir>/<fixture>.json`
    pub fixture: String,
    /// Response delay in milliseconds
    #[serde(default)]
    pub delay_ms: u64,
}

impl FixtureMock {
    /// Serve `fixture` with status 200 and no delay
    #[must_use]
    pub fn new(fixture: impl Into<String>) -> Self {
        Self {
            enabled: true,
            status: 200,
            fixture: fixture.into(),
            delay_ms: 0,
        }
    }

    /// Set the status
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Set the delay
    #[must_use]
    pub const fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Track without mocking
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// File this fixture is read from
    #[must_use]
    pub fn path_in(&self, fixtures_dir: &Path) -> PathBuf {
        if Path::new(&self.fixture).extension().is_some_and(|ext| ext == "json") {
            fixtures_dir.join(&self.fixture)
        } else {
            fixtures_dir.join(format!("{}.json", self.fixture))
        }
    }

    /// Read and parse the fixture into a response
    pub fn load(&self, fixtures_dir: &Path) -> NetwaitResult<MockResponse> {
        let path = self.path_in(fixtures_dir);
        let content = std::fs::read_to_string(&path).map_err(|err| NetwaitError::Fixture {
            name: self.fixture.clone(),
            message: format!("cannot read {}: {err}", path.display()),
        })?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|err| NetwaitError::Fixture {
                name: self.fixture.clone(),
                message: format!("invalid JSON in {}: {err}", path.display()),
            })?;
        Ok(MockResponse::json(&value)?
            .with_status(self.status)
            .with_delay(self.delay_ms))
    }
}

/// Wrap a builder so every synthesized response is logged under `label`
fn logged(builder: ResponseBuilder, label: String) -> ResponseBuilder {
    response_builder(move |request, composer| {
        let response = builder(request, composer)?;
        tracing::info!(
            label = %label,
            request_id = %request.id,
            method = %request.method,
            url = %request.url,
            status = response.status,
            "fetch [mock]"
        );
        Ok(response)
    })
}

impl NetworkContext {
    /// Install a REST handler for `method` + `route` and return its key
    ///
    /// `method` is matched without regard to case; unknown methods match any.
    /// When patterns overlap, the first one installed both answers and
    /// records a matching request, so install specific routes first.
    pub fn install_request(
        &self,
        method: &str,
        route: &str,
        options: InstallOptions,
    ) -> NetwaitResult<String> {
        let method = HttpMethod::parse(method);
        let pattern = RoutePattern::new(method, route)?;
        let key = self
            .shared
            .with_state(|state| state.registry.register_route(method, route))?;
        self.install(HandlerMatcher::Route(pattern), key, options, "install request")
    }

    /// Install a GraphQL query handler and return its key
    pub fn install_query(&self, name: &str, options: InstallOptions) -> NetwaitResult<String> {
        self.install_operation(OperationKind::Query, name, options)
    }

    /// Install a GraphQL mutation handler and return its key
    pub fn install_mutation(&self, name: &str, options: InstallOptions) -> NetwaitResult<String> {
        self.install_operation(OperationKind::Mutation, name, options)
    }

    fn install_operation(
        &self,
        kind: OperationKind,
        name: &str,
        options: InstallOptions,
    ) -> NetwaitResult<String> {
        if name.trim().is_empty() {
            return Err(NetwaitError::InvalidState {
                message: format!("{kind} name must not be empty"),
            });
        }
        let key = self
            .shared
            .with_state(|state| state.registry.register_operation(kind, name));
        let matcher = HandlerMatcher::Operation {
            kind,
            name: name.to_string(),
        };
        let command = match kind {
            OperationKind::Query => "install query",
            OperationKind::Mutation => "install mutation",
        };
        self.install(matcher, key, options, command)
    }

    /// Install a REST handler that serves a JSON fixture
    ///
    /// The fixture is read once, now, from the configured fixtures
    /// directory. A disabled mock only tracks the route.
    pub fn install_fixture_request(
        &self,
        method: &str,
        route: &str,
        alias: Option<&str>,
        mock: &FixtureMock,
    ) -> NetwaitResult<String> {
        let mut options = InstallOptions::new();
        if let Some(alias) = alias {
            options = options.alias(alias);
        }
        if mock.enabled {
            let response = mock.load(&self.config.fixtures_dir)?;
            options = options.reply(response);
        }
        self.install_request(method, route, options)
    }

    fn install(
        &self,
        matcher: HandlerMatcher,
        key: String,
        options: InstallOptions,
        command: &str,
    ) -> NetwaitResult<String> {
        if let Some(alias) = &options.alias {
            self.set_alias(alias, &key);
        }
        let label = self.describe(&key);
        let mocked = options.builder.is_some();
        let builder = options
            .builder
            .map(|builder| logged(builder, label.clone()));

        self.layer.use_handler(RequestHandler::new(matcher, builder));
        tracing::info!(label = %label, key = %key, mocked, "{}", command);
        Ok(key)
    }
}

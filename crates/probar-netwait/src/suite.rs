//! Suite lifecycle
//!
//! Wires the interception layer to a [`NetworkContext`] once per suite and
//! resets it between tests.
//!
//! ```ignore
//! let worker = Arc::new(MockServiceWorker::new());
//! let mut suite = InterceptionSuite::new(worker.clone(), NetwaitConfig::default());
//! suite.setup()?;
//!
//! let ctx = suite.before_each()?;
//! ctx.install_query("Courses", InstallOptions::new())?;
//! // ... test body ...
//!
//! suite.teardown()?;
//! ```

use crate::config::NetwaitConfig;
use crate::context::NetworkContext;
use crate::interceptor::InterceptionLayer;
use crate::result::{NetwaitError, NetwaitResult};
use std::sync::Arc;

/// Something set up before tests and torn down after
pub trait Fixture: Send + Sync {
    /// Set up the fixture before test execution.
    ///
    /// # Errors
    ///
    /// Returns an error if fixture setup fails.
    fn setup(&mut self) -> NetwaitResult<()>;

    /// Tear down the fixture after test execution.
    ///
    /// # Errors
    ///
    /// Returns an error if fixture teardown fails.
    fn teardown(&mut self) -> NetwaitResult<()>;

    /// Get the fixture name for logging/debugging.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Where a suite is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteState {
    /// Created, layer not started
    Registered,
    /// Layer started, context available
    SetUp,
    /// Layer stopped
    TornDown,
}

/// Suite-level owner of the interception layer and its context
pub struct InterceptionSuite {
    layer: Arc<dyn InterceptionLayer>,
    config: NetwaitConfig,
    context: Option<NetworkContext>,
    state: SuiteState,
    tests_started: usize,
}

impl std::fmt::Debug for InterceptionSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptionSuite")
            .field("state", &self.state)
            .field("tests_started", &self.tests_started)
            .field("config", &self.config)
            .finish()
    }
}

impl InterceptionSuite {
    /// Create a suite around a layer
    #[must_use]
    pub fn new(layer: Arc<dyn InterceptionLayer>, config: NetwaitConfig) -> Self {
        Self {
            layer,
            config,
            context: None,
            state: SuiteState::Registered,
            tests_started: 0,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> SuiteState {
        self.state
    }

    /// Number of `before_each` calls so far
    #[must_use]
    pub const fn tests_started(&self) -> usize {
        self.tests_started
    }

    /// Context of the current test
    pub fn context(&self) -> NetwaitResult<&NetworkContext> {
        self.context.as_ref().ok_or_else(|| NetwaitError::InvalidState {
            message: "suite has not been set up".to_string(),
        })
    }

    /// Prepare for the next test
    ///
    /// Drops every handler and mock from the previous test and empties the
    /// tables. Waits still pending from that test fail with `WaitAbandoned`.
    pub fn before_each(&mut self) -> NetwaitResult<&NetworkContext> {
        if self.state != SuiteState::SetUp {
            return Err(NetwaitError::InvalidState {
                message: format!("before_each called in state {:?}", self.state),
            });
        }
        self.tests_started += 1;
        let ctx = self.context()?;
        ctx.reset();
        tracing::debug!(test = self.tests_started, "interception state reset for test");
        Ok(ctx)
    }
}

impl Fixture for InterceptionSuite {
    fn setup(&mut self) -> NetwaitResult<()> {
        self.config.validate()?;
        self.layer.start()?;
        if self.context.is_none() {
            self.context = Some(NetworkContext::new(
                Arc::clone(&self.layer),
                self.config.clone(),
            ));
        }
        self.state = SuiteState::SetUp;
        tracing::debug!("interception suite set up");
        Ok(())
    }

    fn teardown(&mut self) -> NetwaitResult<()> {
        self.layer.reset_handlers();
        self.layer.stop();
        self.context = None;
        self.state = SuiteState::TornDown;
        tracing::debug!(tests = self.tests_started, "interception suite torn down");
        Ok(())
    }

    fn name(&self) -> &str {
        "interception-suite"
    }
}

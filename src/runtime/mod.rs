//! Runtime wiring
//!
//! A [`Runtime`] owns the document store for the lifetime of a process and
//! hands out evaluators over it. There is no global store: callers that need
//! one construct a runtime and pass it (or its store) around explicitly.
//!
//! # Example
//!
//! ```rust
//! use regula::ast::{Body, Expr, Term};
//! use regula::runtime::{Runtime, RuntimeConfig};
//!
//! let runtime = Runtime::init(RuntimeConfig::default()).unwrap();
//! let body = Body::new(vec![Expr::lt(Term::lit(1), Term::lit(2))]);
//! assert_eq!(runtime.query(&body).unwrap(), "true\n");
//! ```

pub mod config;

pub use config::RuntimeConfig;

use crate::ast::{Body, Rule};
use crate::error::Result;
use crate::eval::{Evaluator, RuleOutcome};
use crate::format;
use crate::storage::DataStore;
use std::sync::Arc;
use tracing::{info, instrument};

/// Process-level state: the store and the effective configuration
#[derive(Debug, Clone)]
pub struct Runtime {
    store: Arc<DataStore>,
    config: RuntimeConfig,
}

impl Runtime {
    /// Build a runtime, loading every configured base document.
    #[instrument(skip(config), fields(paths = config.paths.len()))]
    pub fn init(config: RuntimeConfig) -> Result<Self> {
        let store = DataStore::from_files(&config.paths)?;
        info!(format = %config.output_format, "Runtime initialized");
        Ok(Self::with_store(Arc::new(store), config))
    }

    /// Build a runtime around an existing store
    pub fn with_store(store: Arc<DataStore>, config: RuntimeConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// An evaluator over the store, bounded by `max_rows` if configured
    pub fn evaluator(&self) -> Evaluator<'_> {
        let evaluator = Evaluator::new(&self.store);
        match self.config.max_rows {
            Some(limit) => evaluator.with_limit(limit),
            None => evaluator,
        }
    }

    /// Evaluate `body` and render the rows in the configured format
    pub fn query(&self, body: &Body) -> Result<String> {
        let rows = self.evaluator().evaluate(body)?;
        format::render_rows(&rows, self.config.output_format)
    }

    pub fn check_rule(&self, rule: &Rule) -> Result<RuleOutcome> {
        Ok(self.evaluator().eval_rule(rule)?)
    }
}

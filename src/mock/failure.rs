//! Failure Injection for Mock Node
//!
//! Supports configurable failure injection for testing error paths.

use std::collections::HashMap;

/// How an exchange of a given request kind misbehaves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// Reply with the request's default response carrying this error message
    Remote(String),
    /// End the exchange without any reply
    DropExchange,
}

impl MockFailure {
    /// Remote error with the given diagnostic text
    pub fn remote(message: impl Into<String>) -> Self {
        MockFailure::Remote(message.into())
    }
}

/// Failure configuration for a request kind
#[derive(Debug, Clone)]
pub struct FailureConfig {
    pub failure: MockFailure,
    /// Number of times to fail before succeeding (None = always fail)
    pub fail_count: Option<u32>,
}

impl FailureConfig {
    pub fn always(failure: MockFailure) -> Self {
        Self {
            failure,
            fail_count: None,
        }
    }

    /// Set the number of times to fail before succeeding
    pub fn with_fail_count(mut self, count: u32) -> Self {
        self.fail_count = Some(count);
        self
    }
}

/// Failure injector for the mock node, keyed by request kind
#[derive(Debug, Default)]
pub struct FailureInjector {
    configs: HashMap<&'static str, FailureConfig>,
    /// Exchanges seen per kind (for fail_count tracking)
    call_counts: HashMap<&'static str, u32>,
}

impl FailureInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a failure for a request kind
    pub fn inject(&mut self, kind: &'static str, config: FailureConfig) {
        self.configs.insert(kind, config);
        self.call_counts.insert(kind, 0);
    }

    /// Clear all failure injections
    pub fn clear(&mut self) {
        self.configs.clear();
        self.call_counts.clear();
    }

    /// Count one exchange of `kind` and return the failure it should suffer
    pub fn check(&mut self, kind: &'static str) -> Option<&MockFailure> {
        let config = self.configs.get(kind)?;
        let count = self.call_counts.entry(kind).or_insert(0);
        *count += 1;

        if let Some(fail_limit) = config.fail_count {
            if *count > fail_limit {
                return None;
            }
        }

        Some(&config.failure)
    }
}

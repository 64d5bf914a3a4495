//! Error handling for trace topology discovery
//!
//! This module defines the error taxonomy shared by the descriptor readers,
//! the port resolver, the component parsers and the event facade, plus a
//! Result alias for use throughout the crate.

use thiserror::Error;

/// Main error type for topology discovery operations
#[derive(Error, Debug)]
pub enum TopologyError {
    /// A mandatory scalar, string or reference property is absent or mistyped
    #[error("Missing property '{0}'")]
    MissingProperty(String),

    /// A cell-array property is absent or does not have the expected arity
    #[error("Malformed array property '{name}': expected {expected} cells")]
    MalformedArray { name: String, expected: usize },

    /// A port-group container (`input_port` / `output_port`) is absent
    #[error("Missing port container '{0}'")]
    MissingContainer(String),

    /// A port's `endpoint` reference does not lead to a peer node
    #[error("Unresolvable endpoint on port '{port}'")]
    UnresolvableEndpoint { port: String },

    /// The registry could not grow to hold another component
    #[error("Allocation failure while registering component")]
    AllocationFailure,

    /// A port points at an address no registered component owns
    #[error("Dangling link on {component} port {port}: no component at 0x{addr:x}")]
    DanglingLink {
        component: String,
        port: String,
        addr: u64,
    },

    /// No encoder is registered for the requested processor
    #[error("No encoder registered for cpu {0}")]
    NoEncoderForCpu(u32),

    /// The registry holds no component that could serve the request
    #[error("Topology is empty")]
    EmptyTopology,

    /// A registry or per-component lock was poisoned by a panicking holder
    #[error("Lock poisoned")]
    LockPoisoned,

    /// The host event framework rejected an operation
    #[error("Host error: {0}")]
    Host(String),

    /// Errors related to configuration or description loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<TopologyError>,
    },
}

impl TopologyError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        TopologyError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a missing named property
    pub fn missing(name: impl Into<String>) -> Self {
        TopologyError::MissingProperty(name.into())
    }

    /// Shorthand for a malformed cell array
    pub fn malformed(name: impl Into<String>, expected: usize) -> Self {
        TopologyError::MalformedArray {
            name: name.into(),
            expected,
        }
    }

    /// Strip any context wrappers and return the underlying error
    pub fn root(&self) -> &TopologyError {
        match self {
            TopologyError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for topology operations
pub type Result<T> = std::result::Result<T, TopologyError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

//! Kyro Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all Kyro crates.

use serde::{Deserialize, Serialize};

/// Configuration for call-site limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    /// Maximum number of arguments accepted at a single call site
    pub max_call_args: usize,
    /// Maximum number of entries accepted in one method table
    pub max_table_entries: usize,
}

/// Configuration for diagnostic tracing of the extension bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Emit a log event for every module/function registration
    pub trace_registration: bool,
    /// Emit a log event for every dispatched native call
    pub trace_calls: bool,
}

/// Runtime subsystem enum for phase-specific configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Registry,
    Dispatch,
    Native,
}

impl Phase {
    /// Get the string name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Registry => "registry",
            Phase::Dispatch => "dispatch",
            Phase::Native => "native",
        }
    }

    /// Get the log target name for this phase
    pub fn target(&self) -> String {
        format!("kyro::{}", self.as_str())
    }
}

/// Top-level runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KyroConfig {
    #[serde(default)]
    pub limits: LimitConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_call_args: 256,
            max_table_entries: 1024,
        }
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            trace_registration: false,
            trace_calls: false,
        }
    }
}

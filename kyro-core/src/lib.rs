//! Kyro Core - Managed values and the native extension call bridge (pure logic, no IO)
//!
//! Contains the NaN-boxed value representation, the extension method-table
//! bridge (classifier, trampolines, factory, result boundary), the module
//! registry, and the built-in extension modules.
//! Only operates on in-memory data structures, no file IO or terminal output.
//!
//! Configuration is passed explicitly via parameters, not via global state.

pub mod runtime;

// Re-export common types
pub use runtime::errors::{CallError, ExcKind, RaisedError, RegisterError};
pub use runtime::ext::convention::CallConv;
pub use runtime::ext::method::{flags, MethodDef, RawFn, RawResult};
pub use runtime::ext::trampoline::KwArgs;
pub use runtime::registry::{ModuleTable, Runtime};
pub use runtime::value::Value;

// Re-export config types from kyro-config
pub use kyro_config::{KyroConfig, LimitConfig, Phase, TraceConfig};

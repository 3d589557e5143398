//! Kyro API - Host orchestration layer
//!
//! Provides the unified embedding interface, including:
//! - Module installation from static method tables
//! - The three call shapes (plain / keyword / exploded) under the
//!   interpretation lock
//! - Configuration abstraction (RunConfig)
//! - Unified error handling (KyroError)
//!
//! For CLI convenience, this crate provides a global config singleton.
//! For library use, prefer an explicit `Host`.
//!
//! # Quick Start
//!
//! ```
//! use kyro_api::{Host, RunConfig};
//! use kyro_core::Value;
//!
//! let host = Host::new(RunConfig::default());
//! let out = host.call("builtins.sum", &[Value::int(1), Value::int(2)]).unwrap();
//! assert_eq!(out.rendered, "3");
//! ```

use kyro_core::runtime::gil;
use kyro_core::Runtime;

// Re-export config
pub mod config;
pub use config::{config as get_config, init as init_config, is_initialized, RunConfig};

// Re-export config types from kyro_config
pub use kyro_config::{KyroConfig, LimitConfig, Phase, TraceConfig};

// Re-export error and types
pub mod error;
pub mod types;
pub use error::{CallError, ErrorReport, KyroError, RegisterError};
pub use types::{CallOutput, FunctionInfo, ModuleInfo};

// Re-export core types
pub use kyro_config;
pub use kyro_core::{
    flags, CallConv, KwArgs, MethodDef, ModuleTable, RawFn, RawResult, Value,
};

/// 解析 "module.function" 形式的调用目标
pub fn parse_target(target: &str) -> Result<(&str, &str), KyroError> {
    match target.split_once('.') {
        Some((module, function)) if !module.is_empty() && !function.is_empty() => {
            Ok((module, function))
        }
        _ => Err(KyroError::BadTarget(target.to_string())),
    }
}

/// 运行时宿主
///
/// 持有运行时与执行配置，按 "module.function" 目标驱动三种调用形态。
/// 每次调用在分派前取得解释执行权，返回前释放。
pub struct Host {
    runtime: Runtime,
    config: RunConfig,
}

impl Host {
    /// 创建宿主并装入内建扩展模块
    pub fn new(config: RunConfig) -> Self {
        Self {
            runtime: Runtime::with_builtins(),
            config,
        }
    }

    /// 装载一张扩展模块注册表
    pub fn install(&mut self, table: &ModuleTable) -> Result<Value, KyroError> {
        if table.methods.len() > self.config.limits.max_table_entries {
            return Err(KyroError::TableTooLarge {
                module: table.name.to_string(),
                entries: table.methods.len(),
                limit: self.config.limits.max_table_entries,
            });
        }
        Ok(self.runtime.install(table)?)
    }

    /// 已装载模块的元数据（按模块名排序）
    pub fn modules(&self) -> Vec<ModuleInfo> {
        let mut out = Vec::new();
        for name in self.runtime.module_names() {
            let Some(module_value) = self.runtime.module(name) else {
                continue;
            };
            let Some(module_ptr) = module_value.as_module() else {
                continue;
            };
            let module = unsafe { &*module_ptr };
            let mut functions = Vec::new();
            for export in module.export_names() {
                let Some(value) = module.get(export) else {
                    continue;
                };
                let Some(func_ptr) = value.as_ext_function() else {
                    continue;
                };
                let func = unsafe { &*func_ptr };
                functions.push(FunctionInfo {
                    name: func.name.to_string(),
                    convention: func.conv.name(),
                    doc: func.doc.map(str::to_string),
                });
            }
            out.push(ModuleInfo {
                name: module.name.clone(),
                doc: module.doc.clone(),
                functions,
            });
        }
        out
    }

    /// 查询一个调用目标的元数据
    pub fn describe(&self, target: &str) -> Result<FunctionInfo, KyroError> {
        let callee = self.resolve(target)?;
        let Some(func_ptr) = callee.as_ext_function() else {
            // 目标存在但不是扩展函数
            return Err(KyroError::Call(kyro_core::CallError::NotCallable {
                type_name: callee.type_name(),
            }));
        };
        let func = unsafe { &*func_ptr };
        Ok(FunctionInfo {
            name: func.qualname(),
            convention: func.conv.name(),
            doc: func.doc.map(str::to_string),
        })
    }

    /// 解出调用目标背后的可调用对象
    pub fn resolve(&self, target: &str) -> Result<Value, KyroError> {
        let (module, function) = parse_target(target)?;
        if self.runtime.module(module).is_none() {
            return Err(KyroError::UnknownModule(module.to_string()));
        }
        self.runtime
            .lookup(module, function)
            .ok_or_else(|| KyroError::UnknownFunction {
                module: module.to_string(),
                function: function.to_string(),
            })
    }

    /// Plain 形态调用
    pub fn call(&self, target: &str, args: &[Value]) -> Result<CallOutput, KyroError> {
        self.check_arg_limit(args.len())?;
        let callee = self.resolve(target)?;
        self.trace_call(target, args.len(), 0);
        let _interp = gil::acquire();
        let value = self.runtime.call(callee, args)?;
        Ok(CallOutput {
            rendered: value.to_string(),
            value,
        })
    }

    /// Keyword 形态调用
    pub fn call_with_keywords(
        &self,
        target: &str,
        args: &[Value],
        kw: &KwArgs<'_>,
    ) -> Result<CallOutput, KyroError> {
        self.check_arg_limit(args.len() + kw.len())?;
        let callee = self.resolve(target)?;
        self.trace_call(target, args.len(), kw.len());
        let _interp = gil::acquire();
        let value = self.runtime.call_keywords(callee, args, kw)?;
        Ok(CallOutput {
            rendered: value.to_string(),
            value,
        })
    }

    /// Generic 形态调用（已组装好的序列 + 映射对象）
    pub fn call_exploded(
        &self,
        target: &str,
        seq: Value,
        mapping: Value,
    ) -> Result<CallOutput, KyroError> {
        let callee = self.resolve(target)?;
        self.trace_call(target, 0, 0);
        let _interp = gil::acquire();
        let value = self.runtime.call_generic(callee, seq, mapping)?;
        Ok(CallOutput {
            rendered: value.to_string(),
            value,
        })
    }

    fn check_arg_limit(&self, got: usize) -> Result<(), KyroError> {
        let limit = self.config.limits.max_call_args;
        if got > limit {
            Err(KyroError::TooManyArguments { got, limit })
        } else {
            Ok(())
        }
    }

    fn trace_call(&self, target: &str, argc: usize, kwargc: usize) {
        if self.config.trace.trace_calls {
            tracing::debug!(
                target: "kyro::dispatch",
                call = target,
                argc,
                kwargc,
                "host call"
            );
        }
    }
}

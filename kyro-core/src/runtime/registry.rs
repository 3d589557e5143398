//! 模块注册与调用分派
//!
//! 每张方法表在模块加载时被一次性消费，产出一个模块对象和若干扩展函数；
//! 注册错误在加载期致命，零原生调用发生。调用分派按调用形态路由到扩展
//! 函数上缓存的 trampoline 三元组。
//!
//! 本层假定调用线程持有解释执行权（由嵌入方 / 解释循环负责取得）。

use std::collections::HashMap;

use super::errors::{CallError, RegisterError};
use super::ext::factory;
use super::ext::method::MethodDef;
use super::ext::trampoline::KwArgs;
use super::object::{alloc, ObjExtFunction, ObjModule};
use super::value::Value;

/// 一张模块注册表 —— 模块在加载时提供的有序方法表
#[derive(Clone, Copy, Debug)]
pub struct ModuleTable {
    pub name: &'static str,
    pub doc: Option<&'static str>,
    pub methods: &'static [MethodDef],
}

/// 运行时：模块表的宿主与调用分派入口
///
/// 单一逻辑解释线程拥有它并驱动所有调用。
#[derive(Default)]
pub struct Runtime {
    modules: HashMap<String, Value>,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建运行时并装入内建扩展模块
    pub fn with_builtins() -> Self {
        let mut runtime = Self::new();
        for table in super::stdlib::builtin_tables() {
            // 内建表是静态可信数据，装载失败属于致命缺陷
            if let Err(err) = runtime.install(table) {
                panic!("broken builtin module table: {}", err);
            }
        }
        runtime
    }

    /// 装载一张模块注册表
    ///
    /// 每条目产出一个可调用对象；任何条目非法都让整次装载失败。
    pub fn install(&mut self, table: &ModuleTable) -> Result<Value, RegisterError> {
        let module_ptr = alloc(ObjModule::new(
            table.name.to_string(),
            table.doc.map(str::to_string),
        ));
        for def in table.methods {
            let exports = unsafe { &mut (*module_ptr).exports };
            if exports.contains_key(def.name) {
                return Err(RegisterError::DuplicateName {
                    function: def.name,
                    module: table.name.to_string(),
                });
            }
            let func = factory::create_function(def, table.name, None)?;
            exports.insert(def.name.to_string(), func);
        }
        let module_value = Value::module(module_ptr);
        self.modules.insert(table.name.to_string(), module_value);
        tracing::debug!(
            target: "kyro::registry",
            module = table.name,
            functions = table.methods.len(),
            "installed extension module"
        );
        Ok(module_value)
    }

    pub fn module(&self, name: &str) -> Option<Value> {
        self.modules.get(name).copied()
    }

    /// 已装载模块名（按名字排序）
    pub fn module_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// 按 "module" + "function" 查找导出的可调用对象
    pub fn lookup(&self, module: &str, function: &str) -> Option<Value> {
        let module_ptr = self.module(module)?.as_module()?;
        unsafe { (*module_ptr).get(function) }
    }

    // ==================== 调用分派 ====================

    /// Plain 形态：N 个位置实参，无关键字
    pub fn call(&self, callee: Value, args: &[Value]) -> Result<Value, CallError> {
        let func = resolve(callee)?;
        tracing::trace!(
            target: "kyro::dispatch",
            function = %func.qualname(),
            argc = args.len(),
            shape = "plain",
            "dispatch"
        );
        (func.trampolines.plain)(func, args)
    }

    /// Keyword 形态：位置实参 + 关键字映射
    pub fn call_keywords(
        &self,
        callee: Value,
        args: &[Value],
        kw: &KwArgs<'_>,
    ) -> Result<Value, CallError> {
        let func = resolve(callee)?;
        tracing::trace!(
            target: "kyro::dispatch",
            function = %func.qualname(),
            argc = args.len(),
            kwargc = kw.len(),
            shape = "keyword",
            "dispatch"
        );
        (func.trampolines.keyword)(func, args, kw)
    }

    /// Generic 形态：已组装好的位置序列对象 + 关键字映射对象
    pub fn call_generic(
        &self,
        callee: Value,
        seq: Value,
        mapping: Value,
    ) -> Result<Value, CallError> {
        let func = resolve(callee)?;
        tracing::trace!(
            target: "kyro::dispatch",
            function = %func.qualname(),
            shape = "generic",
            "dispatch"
        );
        (func.trampolines.generic)(func, seq, mapping)
    }
}

/// 解出可调用对象背后的扩展函数
///
/// 绑定方法与 classmethod 描述符都解包到其内部函数；接收者在构建时已经
/// 写入函数的 self 槽位，分派不再另行传递。
fn resolve(callee: Value) -> Result<&'static ObjExtFunction, CallError> {
    if let Some(ptr) = callee.as_ext_function() {
        return Ok(unsafe { &*ptr });
    }
    if let Some(ptr) = callee.as_bound_method() {
        let func = unsafe { (*ptr).function };
        return Ok(unsafe { &*func });
    }
    if let Some(ptr) = callee.as_class_method() {
        return resolve(unsafe { (*ptr).callable });
    }
    Err(CallError::NotCallable {
        type_name: callee.type_name(),
    })
}

// ==================== 测试 ====================

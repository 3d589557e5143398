//! Kyro 运行时核心
//!
//! 受管值表示与原生扩展调用桥：
//! - `value` / `object`: NaN-boxed Value 与堆对象
//! - `errors`: 错误分类与线程范围的挂起错误信号
//! - `gil`: 全局解释执行权
//! - `ext`: 调用桥（方法表、分类器、trampoline、结果边界、工厂）
//! - `registry`: 模块装载与调用分派
//! - `stdlib`: 内建扩展模块

pub mod errors;
pub mod ext;
pub mod gil;
pub mod intern;
pub mod object;
pub mod registry;
pub mod stdlib;
pub mod value;

// ==================== 常用类型重导出 ====================

pub use errors::{CallError, ExcKind, RaisedError, RegisterError};
pub use ext::convention::CallConv;
pub use ext::method::{flags, MethodDef, RawFn, RawResult};
pub use ext::trampoline::{KwArgs, TrampolineSet};
pub use object::{
    ObjBoundMethod, ObjClassMethod, ObjDict, ObjExtFunction, ObjModule, ObjString, ObjTuple,
};
pub use registry::{ModuleTable, Runtime};
pub use value::Value;

//! 方法表条目与原生入口指针
//!
//! 扩展模块在加载时提供一张有序方法表，每条记录 {名字, 原生入口, 约定标志,
//! 文档}。标志位取值与既有 C 扩展 ABI 的方法表逐位兼容。
//!
//! 原生入口按 ABI 的四种签名形状分类（多个约定共用同一形状，和 C 侧一致）：
//! - `Plain`:            (self, packed)            NoArgs / OneArg / VarArgs
//! - `WithKeywords`:     (self, tuple, dict|null)  VarArgsKeywords
//! - `Fast`:             (self, &[args])           FastCall
//! - `FastWithKeywords`: (self, &[args], dict|null) FastCallKeywords

use crate::runtime::value::Value;

/// 原生调用的裸结果：`None` 即 ABI 的 NULL 失败哨兵
///
/// 失败哨兵不是语言层 null —— `Some(Value::NULL)` 是一次成功的 null 返回。
pub type RawResult = Option<Value>;

/// (self, packed) 形状入口
pub type CFunction = fn(Value, Value) -> RawResult;

/// (self, tuple, dict|null) 形状入口
pub type CFunctionWithKeywords = fn(Value, Value, Value) -> RawResult;

/// (self, args) 形状入口：位置参数借用为连续切片
pub type CFunctionFast = fn(Value, &[Value]) -> RawResult;

/// (self, args, dict|null) 形状入口
pub type CFunctionFastWithKeywords = fn(Value, &[Value], Value) -> RawResult;

/// 原生入口指针（按签名形状打标签）
#[derive(Clone, Copy)]
pub enum RawFn {
    Plain(CFunction),
    WithKeywords(CFunctionWithKeywords),
    Fast(CFunctionFast),
    FastWithKeywords(CFunctionFastWithKeywords),
}

impl RawFn {
    /// 签名形状名（注册错误消息用）
    pub fn shape_name(&self) -> &'static str {
        match self {
            RawFn::Plain(_) => "plain",
            RawFn::WithKeywords(_) => "with-keywords",
            RawFn::Fast(_) => "fast",
            RawFn::FastWithKeywords(_) => "fast-with-keywords",
        }
    }
}

impl std::fmt::Debug for RawFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawFn::{}", self.shape_name())
    }
}

// ==================== 约定标志位 ====================

/// ABI 约定标志位（与 C 扩展方法表逐位兼容）
pub mod flags {
    /// 位置变参：入口收到打包后的元组
    pub const VARARGS: u32 = 0x0001;
    /// 关键字支持：与 VARARGS 或 FASTCALL 组合
    pub const KEYWORDS: u32 = 0x0002;
    /// 零实参
    pub const NOARGS: u32 = 0x0004;
    /// 恰好一个实参
    pub const O: u32 = 0x0008;
    /// classmethod 修饰位（只影响包装，不影响实参编组）
    pub const CLASS: u32 = 0x0010;
    /// staticmethod 修饰位
    pub const STATIC: u32 = 0x0020;
    /// 槽位共存修饰位
    pub const COEXIST: u32 = 0x0040;
    /// 快速调用：入口直接收到连续实参切片
    pub const FASTCALL: u32 = 0x0080;
}

// ==================== 方法表条目 ====================

/// 一条方法表条目 —— 每个注册的原生函数的静态元数据
#[derive(Clone, Copy, Debug)]
pub struct MethodDef {
    /// 函数名
    pub name: &'static str,
    /// 原生入口指针
    pub raw: RawFn,
    /// 约定标志位（可叠加修饰位）
    pub flags: u32,
    /// 文档字符串
    pub doc: Option<&'static str>,
}

impl MethodDef {
    pub const fn new(name: &'static str, raw: RawFn, flags: u32) -> Self {
        Self {
            name,
            raw,
            flags,
            doc: None,
        }
    }

    pub const fn with_doc(name: &'static str, raw: RawFn, flags: u32, doc: &'static str) -> Self {
        Self {
            name,
            raw,
            flags,
            doc: Some(doc),
        }
    }
}

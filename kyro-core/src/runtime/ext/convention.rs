//! 调用约定分类
//!
//! 从约定标志位到六种受支持约定的全映射。修饰位（CLASS/STATIC/COEXIST）
//! 只影响可调用对象的包装方式，不影响实参编组，分类前一律剥除 —— 剥除而
//! 不拒绝，已有扩展表依赖这一宽容行为。剥除后不在六种组合之内的值是
//! 注册期硬错误，绝不静默降级、绝不推迟到调用期。

use super::method::{flags, MethodDef, RawFn};
use crate::runtime::errors::RegisterError;

/// 六种受支持的调用约定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallConv {
    NoArgs,
    OneArg,
    VarArgs,
    VarArgsKeywords,
    FastCall,
    FastCallKeywords,
}

/// 修饰位掩码：分类前剥除
pub const MODIFIER_MASK: u32 = flags::CLASS | flags::STATIC | flags::COEXIST;

const VARARGS_KEYWORDS: u32 = flags::VARARGS | flags::KEYWORDS;
const FASTCALL_KEYWORDS: u32 = flags::FASTCALL | flags::KEYWORDS;

impl CallConv {
    /// 约定名（错误消息与 CLI 输出用）
    pub fn name(self) -> &'static str {
        match self {
            CallConv::NoArgs => "NoArgs",
            CallConv::OneArg => "OneArg",
            CallConv::VarArgs => "VarArgs",
            CallConv::VarArgsKeywords => "VarArgsKeywords",
            CallConv::FastCall => "FastCall",
            CallConv::FastCallKeywords => "FastCallKeywords",
        }
    }

    /// 该约定是否原生接受关键字实参
    pub fn accepts_keywords(self) -> bool {
        matches!(self, CallConv::VarArgsKeywords | CallConv::FastCallKeywords)
    }
}

/// 分类一个约定标志值
///
/// 纯函数：剥除修饰位后穷举匹配，六种组合之外一律 `UnsupportedConvention`。
pub fn classify(function: &'static str, raw_flags: u32) -> Result<CallConv, RegisterError> {
    match raw_flags & !MODIFIER_MASK {
        flags::NOARGS => Ok(CallConv::NoArgs),
        flags::O => Ok(CallConv::OneArg),
        flags::VARARGS => Ok(CallConv::VarArgs),
        VARARGS_KEYWORDS => Ok(CallConv::VarArgsKeywords),
        flags::FASTCALL => Ok(CallConv::FastCall),
        FASTCALL_KEYWORDS => Ok(CallConv::FastCallKeywords),
        other => Err(RegisterError::UnsupportedConvention {
            function,
            flags: other,
        }),
    }
}

/// 校验方法表条目的入口签名形状与分类出的约定一致
///
/// NoArgs/OneArg/VarArgs 共用 plain 形状，其余各用专属形状；不一致说明
/// 扩展表写错，同样是注册期硬错误。
pub fn check_entry(def: &MethodDef, conv: CallConv) -> Result<(), RegisterError> {
    let ok = matches!(
        (conv, &def.raw),
        (CallConv::NoArgs, RawFn::Plain(_))
            | (CallConv::OneArg, RawFn::Plain(_))
            | (CallConv::VarArgs, RawFn::Plain(_))
            | (CallConv::VarArgsKeywords, RawFn::WithKeywords(_))
            | (CallConv::FastCall, RawFn::Fast(_))
            | (CallConv::FastCallKeywords, RawFn::FastWithKeywords(_))
    );
    if ok {
        Ok(())
    } else {
        Err(RegisterError::MalformedEntry {
            function: def.name,
            entry: def.raw.shape_name(),
            conv: conv.name(),
        })
    }
}

// ==================== 测试 ====================

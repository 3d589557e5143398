//! Trampoline 集合 —— 核心分派协议
//!
//! 每个 (约定 × 调用形态) 对应一个分派入口，共 6 × 3 = 18 条编组路径。
//! 入口把调用点实参编组成约定要求的原生实参形状，调用原生入口指针，再把
//! 裸结果交给结果边界。实参个数 / 关键字校验一律发生在原生指针被调用之前
//! （快速失败，不留半次原生调用）。
//!
//! 三种调用形态：
//! - Plain:   N 个位置实参，无关键字
//! - Keyword: 位置实参 + 关键字映射；空映射对不支持关键字的约定透明降级为 Plain
//! - Generic: 已组装好的位置序列对象 + 关键字映射对象（反射 / splat 调用点）
//!
//! 本层不加锁：它信任自己始终在持有解释执行权时运行。

use super::boundary;
use super::convention::CallConv;
use super::method::{
    CFunction, CFunctionFast, CFunctionFastWithKeywords, CFunctionWithKeywords,
};
use crate::runtime::errors::CallError;
use crate::runtime::object::{alloc, ObjDict, ObjExtFunction, ObjTuple};
use crate::runtime::value::Value;

// ==================== 入口类型 ====================

/// Plain 形态入口
pub type PlainEntry = fn(&ObjExtFunction, &[Value]) -> Result<Value, CallError>;

/// Keyword 形态入口
pub type KeywordEntry = fn(&ObjExtFunction, &[Value], &KwArgs<'_>) -> Result<Value, CallError>;

/// Generic 形态入口（位置序列对象 + 关键字映射对象）
pub type GenericEntry = fn(&ObjExtFunction, Value, Value) -> Result<Value, CallError>;

/// 一个约定的三个分派入口
///
/// 选定是全映射：每种受支持的约定恰好对应一个三元组，注册时计算一次并
/// 缓存在扩展函数对象上，调用期不再重算。
#[derive(Clone, Copy)]
pub struct TrampolineSet {
    pub plain: PlainEntry,
    pub keyword: KeywordEntry,
    pub generic: GenericEntry,
}

impl std::fmt::Debug for TrampolineSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TrampolineSet")
    }
}

/// 按约定选定三元组（穷举，全映射）
pub fn select(conv: CallConv) -> TrampolineSet {
    match conv {
        CallConv::NoArgs => TrampolineSet {
            plain: no_args_plain,
            keyword: no_args_keyword,
            generic: no_args_generic,
        },
        CallConv::OneArg => TrampolineSet {
            plain: one_arg_plain,
            keyword: one_arg_keyword,
            generic: one_arg_generic,
        },
        CallConv::VarArgs => TrampolineSet {
            plain: var_args_plain,
            keyword: var_args_keyword,
            generic: var_args_generic,
        },
        CallConv::VarArgsKeywords => TrampolineSet {
            plain: var_args_kw_plain,
            keyword: var_args_kw_keyword,
            generic: var_args_kw_generic,
        },
        CallConv::FastCall => TrampolineSet {
            plain: fast_plain,
            keyword: fast_keyword,
            generic: fast_generic,
        },
        CallConv::FastCallKeywords => TrampolineSet {
            plain: fast_kw_plain,
            keyword: fast_kw_keyword,
            generic: fast_kw_generic,
        },
    }
}

// ==================== 调用点关键字视图 ====================

/// 关键字实参的调用点只读视图
///
/// 仅在一次 trampoline 调用内存活，不发生所有权转移。
#[derive(Clone, Copy)]
pub struct KwArgs<'a> {
    pairs: &'a [(&'a str, Value)],
}

impl<'a> KwArgs<'a> {
    /// 空映射
    pub const EMPTY: KwArgs<'static> = KwArgs { pairs: &[] };

    pub const fn new(pairs: &'a [(&'a str, Value)]) -> Self {
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self) -> &'a [(&'a str, Value)] {
        self.pairs
    }

    /// 物化为字典对象（只在关键字确实要跨过原生边界时才分配）
    fn to_dict_value(self) -> Value {
        Value::dict(alloc(ObjDict::from_pairs(self.pairs)))
    }
}

// ==================== 原生入口提取 ====================
// 签名形状与约定的一致性在注册期校验过，这里的分支不可能走到。

fn raw_plain(func: &ObjExtFunction) -> CFunction {
    match func.raw {
        super::method::RawFn::Plain(f) => f,
        _ => unreachable!("entry shape verified at registration"),
    }
}

fn raw_with_keywords(func: &ObjExtFunction) -> CFunctionWithKeywords {
    match func.raw {
        super::method::RawFn::WithKeywords(f) => f,
        _ => unreachable!("entry shape verified at registration"),
    }
}

fn raw_fast(func: &ObjExtFunction) -> CFunctionFast {
    match func.raw {
        super::method::RawFn::Fast(f) => f,
        _ => unreachable!("entry shape verified at registration"),
    }
}

fn raw_fast_with_keywords(func: &ObjExtFunction) -> CFunctionFastWithKeywords {
    match func.raw {
        super::method::RawFn::FastWithKeywords(f) => f,
        _ => unreachable!("entry shape verified at registration"),
    }
}

// ==================== 编组辅助 ====================

/// 位置实参打包为元组对象
fn pack_tuple(args: &[Value]) -> Value {
    Value::tuple(alloc(ObjTuple::new(args.to_vec())))
}

/// 解包 Generic 形态的位置序列（必须是元组对象）
fn seq_items<'a>(func: &ObjExtFunction, seq: Value) -> Result<&'a [Value], CallError> {
    match seq.as_tuple() {
        Some(ptr) => Ok(unsafe { (*ptr).items.as_slice() }),
        None => Err(CallError::InvalidArgSequence {
            function: func.qualname(),
            got: seq.type_name(),
        }),
    }
}

/// 校验不支持关键字的约定收到的映射对象：null 或空字典通过，非空拒绝
fn ensure_no_keywords(func: &ObjExtFunction, mapping: Value) -> Result<(), CallError> {
    if mapping.is_null() {
        return Ok(());
    }
    match mapping.as_dict() {
        Some(ptr) => {
            if unsafe { (*ptr).is_empty() } {
                Ok(())
            } else {
                Err(CallError::KeywordsNotAccepted {
                    function: func.qualname(),
                })
            }
        }
        None => Err(CallError::InvalidKwMapping {
            function: func.qualname(),
            got: mapping.type_name(),
        }),
    }
}

/// 校验支持关键字的约定收到的映射对象：null 原样、字典原样转发（含空字典）
fn keyword_mapping(func: &ObjExtFunction, mapping: Value) -> Result<Value, CallError> {
    if mapping.is_null() || mapping.as_dict().is_some() {
        Ok(mapping)
    } else {
        Err(CallError::InvalidKwMapping {
            function: func.qualname(),
            got: mapping.type_name(),
        })
    }
}

// ==================== NoArgs ====================

fn no_args_plain(func: &ObjExtFunction, args: &[Value]) -> Result<Value, CallError> {
    if !args.is_empty() {
        return Err(CallError::NoArgsExpected {
            function: func.qualname(),
            got: args.len(),
        });
    }
    boundary::check(func, (raw_plain(func))(func.self_value, Value::NULL))
}

fn no_args_keyword(
    func: &ObjExtFunction,
    args: &[Value],
    kw: &KwArgs<'_>,
) -> Result<Value, CallError> {
    if !kw.is_empty() {
        return Err(CallError::KeywordsNotAccepted {
            function: func.qualname(),
        });
    }
    no_args_plain(func, args)
}

fn no_args_generic(func: &ObjExtFunction, seq: Value, mapping: Value) -> Result<Value, CallError> {
    ensure_no_keywords(func, mapping)?;
    let items = seq_items(func, seq)?;
    no_args_plain(func, items)
}

// ==================== OneArg ====================

fn one_arg_plain(func: &ObjExtFunction, args: &[Value]) -> Result<Value, CallError> {
    if args.len() != 1 {
        return Err(CallError::OneArgExpected {
            function: func.qualname(),
            got: args.len(),
        });
    }
    boundary::check(func, (raw_plain(func))(func.self_value, args[0]))
}

fn one_arg_keyword(
    func: &ObjExtFunction,
    args: &[Value],
    kw: &KwArgs<'_>,
) -> Result<Value, CallError> {
    if !kw.is_empty() {
        return Err(CallError::KeywordsNotAccepted {
            function: func.qualname(),
        });
    }
    one_arg_plain(func, args)
}

fn one_arg_generic(func: &ObjExtFunction, seq: Value, mapping: Value) -> Result<Value, CallError> {
    ensure_no_keywords(func, mapping)?;
    let items = seq_items(func, seq)?;
    one_arg_plain(func, items)
}

// ==================== VarArgs ====================

fn var_args_plain(func: &ObjExtFunction, args: &[Value]) -> Result<Value, CallError> {
    boundary::check(func, (raw_plain(func))(func.self_value, pack_tuple(args)))
}

fn var_args_keyword(
    func: &ObjExtFunction,
    args: &[Value],
    kw: &KwArgs<'_>,
) -> Result<Value, CallError> {
    if !kw.is_empty() {
        return Err(CallError::KeywordsNotAccepted {
            function: func.qualname(),
        });
    }
    var_args_plain(func, args)
}

fn var_args_generic(func: &ObjExtFunction, seq: Value, mapping: Value) -> Result<Value, CallError> {
    ensure_no_keywords(func, mapping)?;
    // 调用点已持有原生入口想要的元组，直接转发，不拆包重装
    seq_items(func, seq)?;
    boundary::check(func, (raw_plain(func))(func.self_value, seq))
}

// ==================== VarArgsKeywords ====================

fn var_args_kw_plain(func: &ObjExtFunction, args: &[Value]) -> Result<Value, CallError> {
    boundary::check(
        func,
        (raw_with_keywords(func))(func.self_value, pack_tuple(args), Value::NULL),
    )
}

fn var_args_kw_keyword(
    func: &ObjExtFunction,
    args: &[Value],
    kw: &KwArgs<'_>,
) -> Result<Value, CallError> {
    let mapping = if kw.is_empty() {
        Value::NULL
    } else {
        kw.to_dict_value()
    };
    boundary::check(
        func,
        (raw_with_keywords(func))(func.self_value, pack_tuple(args), mapping),
    )
}

fn var_args_kw_generic(
    func: &ObjExtFunction,
    seq: Value,
    mapping: Value,
) -> Result<Value, CallError> {
    seq_items(func, seq)?;
    let mapping = keyword_mapping(func, mapping)?;
    boundary::check(
        func,
        (raw_with_keywords(func))(func.self_value, seq, mapping),
    )
}

// ==================== FastCall ====================

fn fast_plain(func: &ObjExtFunction, args: &[Value]) -> Result<Value, CallError> {
    boundary::check(func, (raw_fast(func))(func.self_value, args))
}

fn fast_keyword(
    func: &ObjExtFunction,
    args: &[Value],
    kw: &KwArgs<'_>,
) -> Result<Value, CallError> {
    if !kw.is_empty() {
        return Err(CallError::KeywordsNotAccepted {
            function: func.qualname(),
        });
    }
    fast_plain(func, args)
}

fn fast_generic(func: &ObjExtFunction, seq: Value, mapping: Value) -> Result<Value, CallError> {
    ensure_no_keywords(func, mapping)?;
    let items = seq_items(func, seq)?;
    boundary::check(func, (raw_fast(func))(func.self_value, items))
}

// ==================== FastCallKeywords ====================

fn fast_kw_plain(func: &ObjExtFunction, args: &[Value]) -> Result<Value, CallError> {
    boundary::check(
        func,
        (raw_fast_with_keywords(func))(func.self_value, args, Value::NULL),
    )
}

fn fast_kw_keyword(
    func: &ObjExtFunction,
    args: &[Value],
    kw: &KwArgs<'_>,
) -> Result<Value, CallError> {
    let mapping = if kw.is_empty() {
        Value::NULL
    } else {
        kw.to_dict_value()
    };
    boundary::check(
        func,
        (raw_fast_with_keywords(func))(func.self_value, args, mapping),
    )
}

fn fast_kw_generic(func: &ObjExtFunction, seq: Value, mapping: Value) -> Result<Value, CallError> {
    let items = seq_items(func, seq)?;
    let mapping = keyword_mapping(func, mapping)?;
    boundary::check(
        func,
        (raw_fast_with_keywords(func))(func.self_value, items, mapping),
    )
}

// ==================== 测试 ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ext::method::RawFn;

    fn make(conv: CallConv, raw: RawFn) -> ObjExtFunction {
        ObjExtFunction {
            name: "probe",
            module: "t",
            doc: None,
            conv,
            raw,
            trampolines: select(conv),
            self_value: Value::NULL,
        }
    }

    fn echo_packed(_self_value: Value, packed: Value) -> Option<Value> {
        Some(packed)
    }

    fn count_fast(_self_value: Value, args: &[Value]) -> Option<Value> {
        Some(Value::int(args.len() as i32))
    }

    #[test]
    fn test_no_args_rejects_positionals() {
        let func = make(CallConv::NoArgs, RawFn::Plain(echo_packed));
        let err = (func.trampolines.plain)(&func, &[Value::int(1)]).unwrap_err();
        assert!(matches!(err, CallError::NoArgsExpected { got: 1, .. }));
    }

    #[test]
    fn test_no_args_receives_null_packed() {
        let func = make(CallConv::NoArgs, RawFn::Plain(echo_packed));
        let out = (func.trampolines.plain)(&func, &[]).unwrap();
        assert!(out.is_null());
    }

    #[test]
    fn test_one_arg_passes_value_through() {
        let func = make(CallConv::OneArg, RawFn::Plain(echo_packed));
        let out = (func.trampolines.plain)(&func, &[Value::int(42)]).unwrap();
        assert_eq!(out.as_int(), Some(42));

        assert!((func.trampolines.plain)(&func, &[]).is_err());
        assert!((func.trampolines.plain)(&func, &[Value::NULL, Value::NULL]).is_err());
    }

    #[test]
    fn test_var_args_packs_tuple() {
        let func = make(CallConv::VarArgs, RawFn::Plain(echo_packed));
        let out = (func.trampolines.plain)(&func, &[Value::int(1), Value::int(2)]).unwrap();
        let tuple = out.as_tuple().expect("packed tuple");
        assert_eq!(unsafe { (*tuple).len() }, 2);
    }

    #[test]
    fn test_fast_call_forwards_slice() {
        let func = make(CallConv::FastCall, RawFn::Fast(count_fast));
        let out =
            (func.trampolines.plain)(&func, &[Value::NULL, Value::NULL, Value::NULL]).unwrap();
        assert_eq!(out.as_int(), Some(3));
    }

    #[test]
    fn test_empty_kwargs_degrades_to_plain() {
        let func = make(CallConv::OneArg, RawFn::Plain(echo_packed));
        let out =
            (func.trampolines.keyword)(&func, &[Value::int(9)], &KwArgs::EMPTY).unwrap();
        assert_eq!(out.as_int(), Some(9));
    }

    #[test]
    fn test_nonempty_kwargs_rejected_for_fast_call() {
        let func = make(CallConv::FastCall, RawFn::Fast(count_fast));
        let pairs = [("x", Value::int(1))];
        let kw = KwArgs::new(&pairs);
        let err = (func.trampolines.keyword)(&func, &[], &kw).unwrap_err();
        assert!(matches!(err, CallError::KeywordsNotAccepted { .. }));
    }

    #[test]
    fn test_generic_rejects_non_tuple_sequence() {
        let func = make(CallConv::VarArgs, RawFn::Plain(echo_packed));
        let err = (func.trampolines.generic)(&func, Value::int(3), Value::NULL).unwrap_err();
        assert!(matches!(err, CallError::InvalidArgSequence { got: "int", .. }));
    }

    #[test]
    fn test_generic_rejects_non_dict_mapping() {
        let func = make(CallConv::VarArgs, RawFn::Plain(echo_packed));
        let seq = pack_tuple(&[]);
        let err = (func.trampolines.generic)(&func, seq, Value::int(1)).unwrap_err();
        assert!(matches!(err, CallError::InvalidKwMapping { got: "int", .. }));
    }
}

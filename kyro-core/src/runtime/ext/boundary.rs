//! 结果/错误边界
//!
//! 每条 trampoline 的原生返回值都经过这唯一的检查点转换为受管控制流：
//! 1. 正常值 → 原样返回（装箱由原生侧完成，边界不再复制）
//! 2. 失败哨兵 + 已记录挂起错误 → 原样转发挂起载荷
//! 3. 失败哨兵 + 无挂起错误 → 合成内部一致性错误并指名出错函数
//!
//! 挂起错误槽位只在观察到失败哨兵后才读取；一次成功返回不会动它。

use super::method::RawResult;
use crate::runtime::errors::{self, CallError};
use crate::runtime::object::ObjExtFunction;
use crate::runtime::value::Value;

/// 检查一次原生调用的结果
pub fn check(function: &ObjExtFunction, ret: RawResult) -> Result<Value, CallError> {
    match ret {
        Some(value) => Ok(value),
        None => match errors::take_pending() {
            Some(raised) => {
                tracing::trace!(
                    target: "kyro::native",
                    function = %function.qualname(),
                    kind = raised.kind.as_str(),
                    "native call raised"
                );
                Err(CallError::Raised(raised))
            }
            None => {
                tracing::debug!(
                    target: "kyro::native",
                    function = %function.qualname(),
                    "failure sentinel without a pending error"
                );
                Err(CallError::InconsistentReturn {
                    function: function.qualname(),
                })
            }
        },
    }
}

// ==================== 测试 ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::errors::{clear_pending, is_pending, raise, ExcKind};
    use crate::runtime::ext::convention::CallConv;
    use crate::runtime::ext::method::RawFn;
    use crate::runtime::ext::trampoline;

    fn stub(_self_value: Value, _packed: Value) -> super::RawResult {
        Some(Value::NULL)
    }

    fn test_function() -> ObjExtFunction {
        ObjExtFunction {
            name: "stub",
            module: "testmod",
            doc: None,
            conv: CallConv::NoArgs,
            raw: RawFn::Plain(stub),
            trampolines: trampoline::select(CallConv::NoArgs),
            self_value: Value::NULL,
        }
    }

    #[test]
    fn test_value_passes_through() {
        clear_pending();
        let func = test_function();
        assert_eq!(check(&func, Some(Value::int(7))), Ok(Value::int(7)));
        // 成功路径不读挂起槽位
        raise(ExcKind::Runtime, "left alone");
        assert_eq!(check(&func, Some(Value::TRUE)), Ok(Value::TRUE));
        assert!(is_pending());
        clear_pending();
    }

    #[test]
    fn test_sentinel_with_pending_propagates() {
        clear_pending();
        let func = test_function();
        raise(ExcKind::Value, "bad input");
        let err = check(&func, None).unwrap_err();
        match err {
            CallError::Raised(raised) => {
                assert_eq!(raised.kind, ExcKind::Value);
                assert_eq!(raised.message, "bad input");
            }
            other => panic!("expected Raised, got {:?}", other),
        }
        // 载荷已被取走
        assert!(!is_pending());
    }

    #[test]
    fn test_sentinel_without_pending_is_internal_error() {
        clear_pending();
        let func = test_function();
        let err = check(&func, None).unwrap_err();
        match err {
            CallError::InconsistentReturn { function } => {
                assert_eq!(function, "testmod.stub");
            }
            other => panic!("expected InconsistentReturn, got {:?}", other),
        }
    }
}

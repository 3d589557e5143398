//! 内建扩展模块
//!
//! 运行时启动即装载的原生模块，全部经由方法表 + 工厂注册，和第三方扩展
//! 走同一条桥。六种调用约定各有至少一个内建函数覆盖。
//!
//! 约定俗成：原生函数失败时先 `raise` 记录挂起错误，再返回失败哨兵。

use crate::runtime::errors::{self, ExcKind};
use crate::runtime::ext::method::{flags, MethodDef, RawFn, RawResult};
use crate::runtime::gil;
use crate::runtime::object::{alloc, ObjDict, ObjString};
use crate::runtime::registry::ModuleTable;
use crate::runtime::value::Value;

/// 全部内建模块的注册表
pub fn builtin_tables() -> &'static [ModuleTable] {
    TABLES
}

static TABLES: &[ModuleTable] = &[
    ModuleTable {
        name: "builtins",
        doc: Some("core native functions"),
        methods: BUILTINS_METHODS,
    },
    ModuleTable {
        name: "digest",
        doc: Some("bulk hashing over string payloads"),
        methods: DIGEST_METHODS,
    },
];

static BUILTINS_METHODS: &[MethodDef] = &[
    MethodDef::with_doc("ping", RawFn::Plain(ping), flags::NOARGS, "ping() -> 'pong'"),
    MethodDef::with_doc(
        "type_name",
        RawFn::Plain(type_name),
        flags::O,
        "type_name(value) -> name of the value's type",
    ),
    MethodDef::with_doc(
        "concat",
        RawFn::Plain(concat),
        flags::VARARGS,
        "concat(*values) -> values rendered and joined",
    ),
    MethodDef::with_doc(
        "format",
        RawFn::WithKeywords(format_fn),
        flags::VARARGS | flags::KEYWORDS,
        "format(*values, **fields) -> rendered line",
    ),
    MethodDef::with_doc(
        "sum",
        RawFn::Fast(sum),
        flags::FASTCALL,
        "sum(*numbers) -> numeric sum",
    ),
    MethodDef::with_doc(
        "record",
        RawFn::FastWithKeywords(record),
        flags::FASTCALL | flags::KEYWORDS,
        "record(*values, **fields) -> dict of fields plus 'argc'",
    ),
    MethodDef::with_doc(
        "require",
        RawFn::Plain(require),
        flags::VARARGS,
        "require(condition[, message]) -> null, raises ValueError when falsy",
    ),
];

static DIGEST_METHODS: &[MethodDef] = &[
    MethodDef::with_doc(
        "blake3",
        RawFn::Plain(blake3_fn),
        flags::O,
        "blake3(data) -> hex digest of a string payload",
    ),
    MethodDef::with_doc(
        "keyed",
        RawFn::Plain(keyed),
        flags::VARARGS,
        "keyed(key, data) -> hex digest under a derived key",
    ),
];

// ==================== 读取辅助 ====================

/// 读取 VarArgs 家族入口收到的元组载荷
fn packed_items<'a>(function: &str, packed: Value) -> Result<&'a [Value], ()> {
    match packed.as_tuple() {
        Some(ptr) => Ok(unsafe { (*ptr).items.as_slice() }),
        None => {
            errors::raise(
                ExcKind::Type,
                format!("{}() argument payload must be a tuple", function),
            );
            Err(())
        }
    }
}

/// 读取字符串实参
fn str_arg<'a>(function: &str, value: Value) -> Result<&'a str, ()> {
    match value.as_string() {
        Some(ptr) => Ok(unsafe { (*ptr).as_str() }),
        None => {
            errors::raise(
                ExcKind::Type,
                format!("{}() expected a str, got '{}'", function, value.type_name()),
            );
            Err(())
        }
    }
}

fn boxed_str(s: String) -> Value {
    Value::string(alloc(ObjString::new(s)))
}

// ==================== builtins ====================

/// NoArgs: 第二个入参恒为 null
fn ping(_self_value: Value, _ignored: Value) -> RawResult {
    Some(boxed_str("pong".to_string()))
}

/// OneArg: 单个实参原样可见
fn type_name(_self_value: Value, arg: Value) -> RawResult {
    Some(boxed_str(arg.type_name().to_string()))
}

/// VarArgs: 收到打包元组
fn concat(_self_value: Value, packed: Value) -> RawResult {
    let items = match packed_items("concat", packed) {
        Ok(items) => items,
        Err(()) => return None,
    };
    let mut out = String::new();
    for item in items {
        out.push_str(&item.to_string());
    }
    Some(boxed_str(out))
}

/// VarArgsKeywords: 元组 + 字典（无关键字时为 null）
fn format_fn(_self_value: Value, packed: Value, kwargs: Value) -> RawResult {
    let items = match packed_items("format", packed) {
        Ok(items) => items,
        Err(()) => return None,
    };
    let mut out = items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    if !kwargs.is_null() {
        let dict = match kwargs.as_dict() {
            Some(ptr) => unsafe { &*ptr },
            None => {
                errors::raise(ExcKind::Type, "format() keyword payload must be a dict");
                return None;
            }
        };
        if !dict.is_empty() {
            let fields = dict
                .sorted_entries()
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect::<Vec<_>>()
                .join(", ");
            if !out.is_empty() {
                out.push(' ');
            }
            out.push('[');
            out.push_str(&fields);
            out.push(']');
        }
    }
    Some(boxed_str(out))
}

/// FastCall: 连续实参切片，零拷贝
fn sum(_self_value: Value, args: &[Value]) -> RawResult {
    let mut int_acc: i64 = 0;
    let mut float_acc: f64 = 0.0;
    let mut saw_float = false;
    for arg in args {
        if let Some(n) = arg.as_int() {
            int_acc += n as i64;
            float_acc += n as f64;
        } else if let Some(f) = arg.as_float() {
            saw_float = true;
            float_acc += f;
        } else {
            errors::raise(
                ExcKind::Type,
                format!("sum() expected numbers, got '{}'", arg.type_name()),
            );
            return None;
        }
    }
    if saw_float {
        Some(Value::float(float_acc))
    } else if (i32::MIN as i64..=i32::MAX as i64).contains(&int_acc) {
        Some(Value::int(int_acc as i32))
    } else {
        errors::raise(ExcKind::Overflow, "sum() result out of int range");
        None
    }
}

/// FastCallKeywords: 切片 + 字典（无关键字时为 null）
fn record(_self_value: Value, args: &[Value], kwargs: Value) -> RawResult {
    let mut dict = ObjDict::new();
    dict.insert("argc", Value::int(args.len() as i32));
    if !kwargs.is_null() {
        let fields = match kwargs.as_dict() {
            Some(ptr) => unsafe { &*ptr },
            None => {
                errors::raise(ExcKind::Type, "record() keyword payload must be a dict");
                return None;
            }
        };
        for (key, value) in fields.entries.iter() {
            dict.insert(key, *value);
        }
    }
    Some(Value::dict(alloc(dict)))
}

/// require(condition[, message]): 条件为假时抛 ValueError
fn require(_self_value: Value, packed: Value) -> RawResult {
    let items = match packed_items("require", packed) {
        Ok(items) => items,
        Err(()) => return None,
    };
    let message = match items {
        [condition] => {
            if condition.is_truthy() {
                return Some(Value::NULL);
            }
            "requirement failed".to_string()
        }
        [condition, message] => {
            if condition.is_truthy() {
                return Some(Value::NULL);
            }
            match str_arg("require", *message) {
                Ok(s) => s.to_string(),
                Err(()) => return None,
            }
        }
        _ => {
            errors::raise(
                ExcKind::Type,
                format!("require() takes 1 or 2 arguments ({} given)", items.len()),
            );
            return None;
        }
    };
    errors::raise(ExcKind::Value, message);
    None
}

// ==================== digest ====================

/// 单参哈希：围绕散列计算释放解释执行权
fn blake3_fn(_self_value: Value, arg: Value) -> RawResult {
    let data = match str_arg("blake3", arg) {
        Ok(s) => s,
        Err(()) => return None,
    };
    // 散列只读原始字节、不触碰受管值，重新取得执行权后才装箱结果
    let hex = gil::allow_threads(|| blake3::hash(data.as_bytes()).to_hex());
    Some(boxed_str(hex.as_str().to_string()))
}

/// keyed(key, data): 由 key 派生 256 位密钥后做带键哈希
fn keyed(_self_value: Value, packed: Value) -> RawResult {
    let items = match packed_items("keyed", packed) {
        Ok(items) => items,
        Err(()) => return None,
    };
    let [key, data] = items else {
        errors::raise(
            ExcKind::Type,
            format!("keyed() takes exactly 2 arguments ({} given)", items.len()),
        );
        return None;
    };
    let key = match str_arg("keyed", *key) {
        Ok(s) => s,
        Err(()) => return None,
    };
    let data = match str_arg("keyed", *data) {
        Ok(s) => s,
        Err(()) => return None,
    };
    let hex = gil::allow_threads(|| {
        let derived = blake3::derive_key("kyro digest keyed", key.as_bytes());
        blake3::keyed_hash(&derived, data.as_bytes()).to_hex()
    });
    Some(boxed_str(hex.as_str().to_string()))
}

// ==================== 测试 ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::errors::{clear_pending, take_pending};
    use crate::runtime::object::ObjTuple;

    fn tuple_of(items: Vec<Value>) -> Value {
        Value::tuple(alloc(ObjTuple::new(items)))
    }

    #[test]
    fn test_sum_ints() {
        clear_pending();
        let out = sum(Value::NULL, &[Value::int(1), Value::int(2), Value::int(3)]).unwrap();
        assert_eq!(out.as_int(), Some(6));
    }

    #[test]
    fn test_sum_mixed_promotes_to_float() {
        clear_pending();
        let out = sum(Value::NULL, &[Value::int(1), Value::float(0.5)]).unwrap();
        assert_eq!(out.as_float(), Some(1.5));
    }

    #[test]
    fn test_sum_rejects_non_number() {
        clear_pending();
        assert!(sum(Value::NULL, &[Value::TRUE]).is_none());
        let raised = take_pending().unwrap();
        assert_eq!(raised.kind, ExcKind::Type);
    }

    #[test]
    fn test_require_raises_value_error() {
        clear_pending();
        assert!(require(Value::NULL, tuple_of(vec![Value::FALSE])).is_none());
        let raised = take_pending().unwrap();
        assert_eq!(raised.kind, ExcKind::Value);
        assert_eq!(raised.message, "requirement failed");
    }

    #[test]
    fn test_blake3_digest_shape() {
        clear_pending();
        let _gil = gil::acquire();
        let out = blake3_fn(Value::NULL, boxed_str("hello".to_string())).unwrap();
        let again = blake3_fn(Value::NULL, boxed_str("hello".to_string())).unwrap();
        let other = blake3_fn(Value::NULL, boxed_str("hellp".to_string())).unwrap();
        let hex = unsafe { &(*out.as_string().unwrap()).chars };
        let hex_again = unsafe { &(*again.as_string().unwrap()).chars };
        let hex_other = unsafe { &(*other.as_string().unwrap()).chars };
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hex, hex_again);
        assert_ne!(hex, hex_other);
    }

    #[test]
    fn test_keyed_depends_on_key() {
        clear_pending();
        let _gil = gil::acquire();
        let a = keyed(
            Value::NULL,
            tuple_of(vec![boxed_str("k1".to_string()), boxed_str("data".to_string())]),
        )
        .unwrap();
        let b = keyed(
            Value::NULL,
            tuple_of(vec![boxed_str("k2".to_string()), boxed_str("data".to_string())]),
        )
        .unwrap();
        let hex_a = unsafe { &(*a.as_string().unwrap()).chars };
        let hex_b = unsafe { &(*b.as_string().unwrap()).chars };
        assert_ne!(hex_a, hex_b);
    }
}

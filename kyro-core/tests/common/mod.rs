//! 测试辅助工具
//!
//! 构造受管值与读取结果的小工具，供各集成测试共用。

#![allow(dead_code)]

use kyro_core::runtime::object::{alloc, ObjDict, ObjString, ObjTuple};
use kyro_core::Value;

/// 构造字符串值
pub fn str_of(s: &str) -> Value {
    Value::string(alloc(ObjString::new(s.to_string())))
}

/// 构造元组值
pub fn tuple_of(items: Vec<Value>) -> Value {
    Value::tuple(alloc(ObjTuple::new(items)))
}

/// 构造字典值
pub fn dict_of(pairs: &[(&str, Value)]) -> Value {
    Value::dict(alloc(ObjDict::from_pairs(pairs)))
}

/// 读取字符串值内容
pub fn read_str(value: Value) -> String {
    let ptr = value.as_string().expect("expected a str value");
    unsafe { (*ptr).chars.clone() }
}

/// 读取元组值内容
pub fn read_tuple(value: Value) -> Vec<Value> {
    let ptr = value.as_tuple().expect("expected a tuple value");
    unsafe { (*ptr).items.clone() }
}

/// 读取字典值中的一项
pub fn read_dict_entry(value: Value, key: &str) -> Option<Value> {
    let ptr = value.as_dict().expect("expected a dict value");
    unsafe { (*ptr).get(key) }
}

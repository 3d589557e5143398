//! 扩展函数工厂
//!
//! 围绕一条方法表条目构建受管可调用对象：经分类器选定 trampoline 三元组，
//! 连同原生入口指针、文档与模块元数据装进扩展函数对象；按需包装为绑定
//! 方法或 classmethod 描述符。所有失败都发生在构建期，调用期不再校验。

use super::convention;
use super::method::MethodDef;
use super::trampoline;
use crate::runtime::errors::RegisterError;
use crate::runtime::intern::intern;
use crate::runtime::object::{alloc, ObjBoundMethod, ObjClassMethod, ObjExtFunction};
use crate::runtime::value::Value;

/// 构建扩展函数对象（公共路径）
fn build(
    def: &MethodDef,
    module: &str,
    self_value: Value,
) -> Result<*mut ObjExtFunction, RegisterError> {
    let conv = convention::classify(def.name, def.flags)?;
    convention::check_entry(def, conv)?;
    tracing::debug!(
        target: "kyro::registry",
        function = def.name,
        module,
        conv = conv.name(),
        "registered native function"
    );
    Ok(alloc(ObjExtFunction {
        name: intern(def.name),
        module: intern(module),
        doc: def.doc,
        conv,
        raw: def.raw,
        trampolines: trampoline::select(conv),
        self_value,
    }))
}

/// 接收者描述（绑定错误消息用）
fn describe_receiver(receiver: Value) -> String {
    match receiver.as_module() {
        Some(ptr) => format!("module '{}'", unsafe { &(*ptr).name }),
        None => format!("'{}' value", receiver.type_name()),
    }
}

/// 构建扩展函数；给出接收者时包装为绑定方法
///
/// 受检路径：接收者必须是名字与声明模块一致的模块对象。约定不受支持或
/// 方法表条目写错时返回注册错误（修饰位不在此列 —— 分类前剥除，不拒绝）。
pub fn create_function(
    def: &MethodDef,
    module: &str,
    receiver: Option<Value>,
) -> Result<Value, RegisterError> {
    match receiver {
        None => Ok(Value::ext_function(build(def, module, Value::NULL)?)),
        Some(receiver) => {
            let matches_module = receiver
                .as_module()
                .map(|ptr| unsafe { (*ptr).name == module })
                .unwrap_or(false);
            if !matches_module {
                return Err(RegisterError::ReceiverMismatch {
                    function: def.name,
                    expected: intern(module),
                    got: describe_receiver(receiver),
                });
            }
            let func = build(def, module, receiver)?;
            Ok(Value::bound_method(alloc(ObjBoundMethod::new(
                func, receiver,
            ))))
        }
    }
}

/// 构建 classmethod 描述符
///
/// 只用于静态声明的可信原生表；构建失败说明扩展表本身坏了，是不可恢复的
/// 致命错误而不是用户错误。
///
/// # Panics
/// 方法表条目非法时 panic。
pub fn create_class_method(def: &MethodDef, module: &str, owner: Value) -> Value {
    let func = match build(def, module, owner) {
        Ok(func) => func,
        Err(err) => panic!("broken extension table for {}(): {}", def.name, err),
    };
    Value::class_method(alloc(ObjClassMethod::new(
        Value::ext_function(func),
        owner,
    )))
}

/// 宽松绑定路径：不校验接收者
///
/// 与 `create_function` 相同的构建流程，但接收者既不要求是模块对象，也不
/// 与声明模块比对 —— 已知缺口，调用方不被验证为声明接收者类型的子类型。
/// 刻意保留而非修复：收紧会改变既有扩展可观察的分派行为。
pub fn create_bound_method_loose(
    def: &MethodDef,
    module: &str,
    receiver: Value,
) -> Result<Value, RegisterError> {
    let func = build(def, module, receiver)?;
    Ok(Value::bound_method(alloc(ObjBoundMethod::new(
        func, receiver,
    ))))
}

// ==================== 测试 ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ext::convention::CallConv;
    use crate::runtime::ext::method::{flags, RawFn, RawResult};
    use crate::runtime::object::ObjModule;

    fn echo_self(self_value: Value, _packed: Value) -> RawResult {
        Some(self_value)
    }

    fn def_one_arg() -> MethodDef {
        MethodDef::new("echo_self", RawFn::Plain(echo_self), flags::O)
    }

    fn make_module(name: &str) -> Value {
        Value::module(alloc(ObjModule::new(name.to_string(), None)))
    }

    #[test]
    fn test_create_function_caches_convention() {
        let value = create_function(&def_one_arg(), "m", None).unwrap();
        let func = value.as_ext_function().unwrap();
        unsafe {
            assert_eq!((*func).conv, CallConv::OneArg);
            assert_eq!((*func).name, "echo_self");
            assert_eq!((*func).module, "m");
            assert!((*func).self_value.is_null());
        }
    }

    #[test]
    fn test_create_function_rejects_unsupported() {
        let def = MethodDef::new("bad", RawFn::Plain(echo_self), flags::KEYWORDS);
        assert!(matches!(
            create_function(&def, "m", None),
            Err(RegisterError::UnsupportedConvention { .. })
        ));
    }

    #[test]
    fn test_checked_binding_requires_matching_module() {
        let module = make_module("m");
        let bound = create_function(&def_one_arg(), "m", Some(module)).unwrap();
        assert!(bound.as_bound_method().is_some());

        // 非模块接收者被受检路径拒绝
        let err = create_function(&def_one_arg(), "m", Some(Value::int(5))).unwrap_err();
        assert!(matches!(err, RegisterError::ReceiverMismatch { .. }));

        // 模块名不符也被拒绝
        let other = make_module("other");
        assert!(create_function(&def_one_arg(), "m", Some(other)).is_err());
    }

    #[test]
    fn test_loose_binding_skips_receiver_check() {
        // 已知缺口：原始值接收者照样绑定成功，这是明确允许的弱类型情形
        let bound = create_bound_method_loose(&def_one_arg(), "m", Value::int(5)).unwrap();
        let method = bound.as_bound_method().unwrap();
        unsafe {
            assert_eq!((*method).receiver.as_int(), Some(5));
            // 接收者原样成为原生入口的 self
            assert_eq!((*(*method).function).self_value.as_int(), Some(5));
        }
    }

    #[test]
    fn test_create_class_method() {
        let owner = make_module("owner");
        let descriptor = create_class_method(&def_one_arg(), "owner", owner);
        let ptr = descriptor.as_class_method().unwrap();
        unsafe {
            assert!((*ptr).callable.as_ext_function().is_some());
            assert_eq!((*ptr).owner, owner);
        }
    }

    #[test]
    #[should_panic(expected = "broken extension table")]
    fn test_class_method_invalid_table_panics() {
        let def = MethodDef::new("bad", RawFn::Plain(echo_self), 0x4000);
        let owner = make_module("owner");
        let _ = create_class_method(&def, "owner", owner);
    }
}

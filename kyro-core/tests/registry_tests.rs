//! 注册与工厂测试
//!
//! 注册错误全部在装载期暴露：不受支持的约定、写错的方法表条目、重名。
//! 修饰位剥除而不拒绝。绑定路径的受检 / 宽松差异在这里钉死。

mod common;

use kyro_core::runtime::ext::factory;
use kyro_core::runtime::object::{alloc, ObjModule};
use kyro_core::{
    flags, CallConv, MethodDef, ModuleTable, RawFn, RawResult, RegisterError, Runtime, Value,
};
use std::sync::atomic::{AtomicUsize, Ordering};

fn echo_self(self_value: Value, _packed: Value) -> RawResult {
    Some(self_value)
}

fn echo_fast(_self_value: Value, args: &[Value]) -> RawResult {
    Some(Value::int(args.len() as i32))
}

// ==================== 注册失败 ====================

#[test]
fn test_unsupported_convention_fails_with_zero_calls() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    fn counting(_self_value: Value, _packed: Value) -> RawResult {
        CALLS.fetch_add(1, Ordering::SeqCst);
        Some(Value::NULL)
    }
    // 裸 KEYWORDS 不是合法约定
    static METHODS: &[MethodDef] =
        &[MethodDef::new("f", RawFn::Plain(counting), flags::KEYWORDS)];
    static TABLE: ModuleTable = ModuleTable {
        name: "bad_conv",
        doc: None,
        methods: METHODS,
    };

    let mut runtime = Runtime::new();
    let err = runtime.install(&TABLE).unwrap_err();
    assert!(matches!(err, RegisterError::UnsupportedConvention { .. }));
    assert_eq!(CALLS.load(Ordering::SeqCst), 0);
    // 装载失败的模块不可见
    assert!(runtime.module("bad_conv").is_none());
}

#[test]
fn test_unknown_flag_bits_fail_registration() {
    static METHODS: &[MethodDef] = &[MethodDef::new("f", RawFn::Plain(echo_self), 0x4000)];
    static TABLE: ModuleTable = ModuleTable {
        name: "unknown_bits",
        doc: None,
        methods: METHODS,
    };
    let mut runtime = Runtime::new();
    assert!(runtime.install(&TABLE).is_err());
}

#[test]
fn test_malformed_entry_shape_fails_registration() {
    // fast 入口配 VARARGS 约定：方法表写错
    static METHODS: &[MethodDef] = &[MethodDef::new("f", RawFn::Fast(echo_fast), flags::VARARGS)];
    static TABLE: ModuleTable = ModuleTable {
        name: "malformed",
        doc: None,
        methods: METHODS,
    };
    let mut runtime = Runtime::new();
    assert!(matches!(
        runtime.install(&TABLE).unwrap_err(),
        RegisterError::MalformedEntry { entry: "fast", .. }
    ));
}

// ==================== 修饰位 ====================

#[test]
fn test_modifier_bits_masked_not_rejected() {
    // CLASS/STATIC/COEXIST 只影响包装，编组按剥除后的约定进行
    static METHODS: &[MethodDef] = &[
        MethodDef::new(
            "classy",
            RawFn::Plain(echo_self),
            flags::NOARGS | flags::CLASS,
        ),
        MethodDef::new(
            "static_coexist",
            RawFn::Plain(echo_self),
            flags::O | flags::STATIC | flags::COEXIST,
        ),
    ];
    static TABLE: ModuleTable = ModuleTable {
        name: "modifiers",
        doc: None,
        methods: METHODS,
    };

    let mut runtime = Runtime::new();
    runtime.install(&TABLE).unwrap();

    let classy = runtime.lookup("modifiers", "classy").unwrap();
    let func = classy.as_ext_function().unwrap();
    unsafe { assert_eq!((*func).conv, CallConv::NoArgs) };
    runtime.call(classy, &[]).unwrap();

    let loose_flags = runtime.lookup("modifiers", "static_coexist").unwrap();
    runtime.call(loose_flags, &[Value::int(1)]).unwrap();
}

// ==================== 绑定路径 ====================

fn def_echo_self() -> MethodDef {
    MethodDef::new("echo_self", RawFn::Plain(echo_self), flags::O)
}

#[test]
fn test_checked_binding_routes_receiver_as_self() {
    let module = Value::module(alloc(ObjModule::new("owner".to_string(), None)));
    let bound = factory::create_function(&def_echo_self(), "owner", Some(module)).unwrap();

    let runtime = Runtime::new();
    let out = runtime.call(bound, &[Value::int(0)]).unwrap();
    // 原生入口收到的 self 就是绑定的接收者
    assert_eq!(out, module);
}

#[test]
fn test_checked_binding_rejects_foreign_receiver() {
    let err = factory::create_function(&def_echo_self(), "owner", Some(Value::int(9))).unwrap_err();
    assert!(matches!(err, RegisterError::ReceiverMismatch { .. }));

    let other = Value::module(alloc(ObjModule::new("elsewhere".to_string(), None)));
    assert!(factory::create_function(&def_echo_self(), "owner", Some(other)).is_err());
}

#[test]
fn test_loose_binding_gap_is_permitted() {
    // 已知缺口：宽松路径不校验接收者类型，这是明确允许的弱类型情形，
    // 不是失败 —— 原始值接收者照样绑定并作为 self 穿过原生边界。
    let bound =
        factory::create_bound_method_loose(&def_echo_self(), "owner", Value::int(9)).unwrap();

    let runtime = Runtime::new();
    let out = runtime.call(bound, &[Value::int(0)]).unwrap();
    assert_eq!(out.as_int(), Some(9));
}

#[test]
fn test_class_method_descriptor_dispatch() {
    let owner = Value::module(alloc(ObjModule::new("owner".to_string(), None)));
    let descriptor = factory::create_class_method(&def_echo_self(), "owner", owner);

    let runtime = Runtime::new();
    // classmethod 描述符解包到内部函数，self 即所属者
    let out = runtime.call(descriptor, &[Value::int(0)]).unwrap();
    assert_eq!(out, owner);
}

// ==================== 内建装载 ====================

#[test]
fn test_with_builtins_installs_tables() {
    let runtime = Runtime::with_builtins();
    assert_eq!(runtime.module_names(), vec!["builtins", "digest"]);
    assert!(runtime.lookup("builtins", "ping").is_some());
    assert!(runtime.lookup("builtins", "sum").is_some());
    assert!(runtime.lookup("digest", "blake3").is_some());
}

#[test]
fn test_builtin_doc_and_convention_metadata() {
    let runtime = Runtime::with_builtins();
    let func = runtime
        .lookup("builtins", "sum")
        .unwrap()
        .as_ext_function()
        .unwrap();
    unsafe {
        assert_eq!((*func).conv, CallConv::FastCall);
        assert!((*func).doc.unwrap().contains("sum"));
        assert_eq!((*func).module, "builtins");
    }
}

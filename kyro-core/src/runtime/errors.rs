//! 错误类型与挂起错误信号
//!
//! 三类错误，严格区分：
//! - `RegisterError`: 模块加载期致命错误，绝不推迟到调用期
//! - `CallError`: 调用形态错误（参数个数 / 关键字）、原生回传错误、内部一致性错误
//! - 挂起错误信号: 线程范围的标志 + 载荷，原生被调方通过 `raise` 记录，
//!   结果边界在观察到失败哨兵后读取并转发

use std::cell::RefCell;
use thiserror::Error;

// ==================== 挂起错误载荷 ====================

/// 原生被调方抛出的异常类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcKind {
    Type,
    Value,
    Runtime,
    Overflow,
}

impl ExcKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExcKind::Type => "TypeError",
            ExcKind::Value => "ValueError",
            ExcKind::Runtime => "RuntimeError",
            ExcKind::Overflow => "OverflowError",
        }
    }
}

/// 挂起错误的载荷：类别 + 消息
#[derive(Debug, Clone, PartialEq)]
pub struct RaisedError {
    pub kind: ExcKind,
    pub message: String,
}

impl std::fmt::Display for RaisedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

thread_local! {
    /// 线程范围的挂起错误槽位
    static PENDING: RefCell<Option<RaisedError>> = const { RefCell::new(None) };
}

/// 记录一个挂起错误（覆盖已有错误）
///
/// 原生被调方在返回失败哨兵前调用。
pub fn raise(kind: ExcKind, message: impl Into<String>) {
    PENDING.with(|slot| {
        *slot.borrow_mut() = Some(RaisedError {
            kind,
            message: message.into(),
        });
    });
}

/// 取走挂起错误（槽位清空）
pub fn take_pending() -> Option<RaisedError> {
    PENDING.with(|slot| slot.borrow_mut().take())
}

/// 是否有挂起错误
pub fn is_pending() -> bool {
    PENDING.with(|slot| slot.borrow().is_some())
}

/// 清空挂起错误（测试与嵌入方使用）
pub fn clear_pending() {
    PENDING.with(|slot| *slot.borrow_mut() = None);
}

// ==================== 注册错误 ====================

/// 模块加载期错误 - 致命，零原生调用发生
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegisterError {
    /// 约定标志位（剥除修饰位后）不在六种受支持组合之内
    #[error("unsupported calling convention flags 0x{flags:02x} for {function}()")]
    UnsupportedConvention { function: &'static str, flags: u32 },

    /// 原生入口指针的签名形状与约定不一致（方法表写错）
    #[error("method table entry {function}() pairs a '{entry}' entry point with convention {conv}")]
    MalformedEntry {
        function: &'static str,
        entry: &'static str,
        conv: &'static str,
    },

    /// 同一模块内的重名条目
    #[error("duplicate method name {function}() in module '{module}'")]
    DuplicateName {
        function: &'static str,
        module: String,
    },

    /// 受检绑定路径：接收者与声明的所属模块不符
    #[error("{function}() cannot bind to {got} (declared module '{expected}')")]
    ReceiverMismatch {
        function: &'static str,
        expected: &'static str,
        got: String,
    },
}

// ==================== 调用错误 ====================

/// 调用期错误
///
/// `Raised` 与 `InconsistentReturn` 永不混同：前者是原生被调方明确记录的
/// 错误原样转发，后者是"返回失败哨兵却没有说明原因"的内部一致性错误。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallError {
    #[error("{function}() takes no arguments ({got} given)")]
    NoArgsExpected { function: String, got: usize },

    #[error("{function}() takes exactly one argument ({got} given)")]
    OneArgExpected { function: String, got: usize },

    #[error("{function}() takes no keyword arguments")]
    KeywordsNotAccepted { function: String },

    #[error("{function}() argument list must be a tuple, got '{got}'")]
    InvalidArgSequence { function: String, got: &'static str },

    #[error("{function}() keyword mapping must be a dict, got '{got}'")]
    InvalidKwMapping { function: String, got: &'static str },

    #[error("'{type_name}' object is not callable")]
    NotCallable { type_name: &'static str },

    /// 原生被调方记录的挂起错误，原样转发
    #[error("{0}")]
    Raised(RaisedError),

    /// 失败哨兵 + 无挂起错误：内部一致性错误，指名出错函数
    #[error("internal error: {function}() returned a failure sentinel without raising an error")]
    InconsistentReturn { function: String },
}

impl CallError {
    /// 稳定的错误类别名（结构化报告用）
    pub fn kind(&self) -> &'static str {
        match self {
            CallError::NoArgsExpected { .. }
            | CallError::OneArgExpected { .. } => "ArityError",
            CallError::KeywordsNotAccepted { .. } => "KeywordsNotAccepted",
            CallError::InvalidArgSequence { .. } => "InvalidArgSequence",
            CallError::InvalidKwMapping { .. } => "InvalidKwMapping",
            CallError::NotCallable { .. } => "NotCallable",
            CallError::Raised(raised) => raised.kind.as_str(),
            CallError::InconsistentReturn { .. } => "InconsistentReturn",
        }
    }
}

// ==================== 测试 ====================

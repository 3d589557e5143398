//! API 错误类型
//!
//! 提供统一的错误类型和结构化错误报告。

use thiserror::Error;

/// 注册错误（结构化）
pub use kyro_core::RegisterError;

/// 调用错误（结构化）
pub use kyro_core::CallError;

/// Kyro 错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KyroError {
    /// 模块装载错误（装载期致命）
    #[error("{0}")]
    Register(#[from] RegisterError),

    /// 调用期错误（形态错误 / 原生回传 / 内部一致性）
    #[error("{0}")]
    Call(#[from] CallError),

    /// 未装载的模块
    #[error("unknown module '{0}'")]
    UnknownModule(String),

    /// 模块没有该导出
    #[error("module '{module}' has no function '{function}'")]
    UnknownFunction { module: String, function: String },

    /// 调用目标不是 "module.function" 形式
    #[error("call target must be 'module.function', got '{0}'")]
    BadTarget(String),

    /// 关键字实参字面量不是 name=value 形式
    #[error("invalid keyword argument '{0}', expected name=value")]
    BadKeyword(String),

    /// 超出调用点实参上限
    #[error("too many arguments: {got} (limit {limit})")]
    TooManyArguments { got: usize, limit: usize },

    /// 超出方法表条目上限
    #[error("method table for module '{module}' has {entries} entries (limit {limit})")]
    TableTooLarge {
        module: String,
        entries: usize,
        limit: usize,
    },
}

impl KyroError {
    /// 获取错误阶段名称
    pub fn phase(&self) -> &'static str {
        match self {
            KyroError::Register(_) => "registry",
            KyroError::Call(CallError::Raised(_))
            | KyroError::Call(CallError::InconsistentReturn { .. }) => "native",
            KyroError::Call(_) => "dispatch",
            KyroError::UnknownModule(_)
            | KyroError::UnknownFunction { .. }
            | KyroError::BadTarget(_)
            | KyroError::BadKeyword(_)
            | KyroError::TooManyArguments { .. } => "dispatch",
            KyroError::TableTooLarge { .. } => "registry",
        }
    }

    /// 错误类别名（可用于程序化处理）
    pub fn error_kind(&self) -> String {
        match self {
            KyroError::Register(RegisterError::UnsupportedConvention { .. }) => {
                "UnsupportedConvention".to_string()
            }
            KyroError::Register(RegisterError::MalformedEntry { .. }) => {
                "MalformedEntry".to_string()
            }
            KyroError::Register(RegisterError::DuplicateName { .. }) => "DuplicateName".to_string(),
            KyroError::Register(RegisterError::ReceiverMismatch { .. }) => {
                "ReceiverMismatch".to_string()
            }
            KyroError::Call(call) => call.kind().to_string(),
            KyroError::UnknownModule(_) => "UnknownModule".to_string(),
            KyroError::UnknownFunction { .. } => "UnknownFunction".to_string(),
            KyroError::BadTarget(_) => "BadTarget".to_string(),
            KyroError::BadKeyword(_) => "BadKeyword".to_string(),
            KyroError::TooManyArguments { .. } => "TooManyArguments".to_string(),
            KyroError::TableTooLarge { .. } => "TableTooLarge".to_string(),
        }
    }

    /// 相关函数的限定名（如果有）
    pub fn function(&self) -> Option<String> {
        match self {
            KyroError::Call(call) => match call {
                CallError::NoArgsExpected { function, .. }
                | CallError::OneArgExpected { function, .. }
                | CallError::KeywordsNotAccepted { function }
                | CallError::InvalidArgSequence { function, .. }
                | CallError::InvalidKwMapping { function, .. }
                | CallError::InconsistentReturn { function } => Some(function.clone()),
                CallError::NotCallable { .. } | CallError::Raised(_) => None,
            },
            KyroError::UnknownFunction { module, function } => {
                Some(format!("{}.{}", module, function))
            }
            _ => None,
        }
    }

    /// 转换为结构化错误报告
    ///
    /// CLI 可以直接打印，上层应用可以序列化为 JSON。
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            phase: self.phase(),
            error_kind: self.error_kind(),
            function: self.function(),
            message: self.to_string(),
        }
    }
}

/// 结构化错误报告
///
/// 上层应用（CLI、Web、嵌入方）可以根据自己的需求格式化。
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    /// 错误阶段: registry, dispatch, native
    pub phase: &'static str,
    /// 错误类型（可用于程序化处理）
    pub error_kind: String,
    /// 相关函数的限定名（如果有）
    pub function: Option<String>,
    /// 人类可读的错误消息
    pub message: String,
}

impl std::fmt::Display for ErrorReport {
    /// 默认的 CLI 友好格式
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.function {
            Some(function) => write!(
                f,
                "[{}] {} error in {}: {}",
                self.phase, self.error_kind, function, self.message
            ),
            None => write!(f, "[{}] {} error: {}", self.phase, self.error_kind, self.message),
        }
    }
}

impl ErrorReport {
    /// 转换为 JSON 格式（工具集成使用）
    ///
    /// 不依赖 serde，手动构建 JSON 字符串。
    pub fn to_json(&self) -> String {
        let function = self
            .function
            .as_ref()
            .map(|name| format!("\"{}\"", escape_json(name)))
            .unwrap_or_else(|| "null".to_string());
        format!(
            r#"{{"phase":"{}","error_kind":"{}","function":{},"message":"{}"}}"#,
            self.phase,
            escape_json(&self.error_kind),
            function,
            escape_json(&self.message)
        )
    }

    /// 简洁格式（适合终端）
    pub fn to_short(&self) -> String {
        format!("{}: {}", self.phase, self.message)
    }
}

/// 简单的 JSON 字符串转义
fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

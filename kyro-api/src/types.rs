//! API 类型定义
//!
//! 调用与列表输出类型。

use kyro_core::Value;

/// 一次调用的输出
#[derive(Debug)]
pub struct CallOutput {
    /// 返回值
    pub value: Value,
    /// 返回值的文本渲染（CLI 输出用）
    pub rendered: String,
}

/// 一个导出函数的元数据
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    /// 函数名
    pub name: String,
    /// 调用约定名
    pub convention: &'static str,
    /// 文档字符串
    pub doc: Option<String>,
}

/// 一个已装载模块的元数据
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInfo {
    /// 模块名
    pub name: String,
    /// 模块文档
    pub doc: Option<String>,
    /// 导出函数（按名字排序）
    pub functions: Vec<FunctionInfo>,
}

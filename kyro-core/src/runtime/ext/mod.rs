//! 扩展函数调用桥
//!
//! 把按约定标志注册的原生函数接入受管调用路径：
//! - `method`: 方法表条目与原生入口指针（ABI 兼容的标志位）
//! - `convention`: 标志位 → 六种调用约定的全映射分类器
//! - `trampoline`: (约定 × 调用形态) 的 18 条编组路径
//! - `boundary`: 原生返回值的唯一检查点
//! - `factory`: 围绕方法表条目构建受管可调用对象

pub mod boundary;
pub mod convention;
pub mod factory;
pub mod method;
pub mod trampoline;

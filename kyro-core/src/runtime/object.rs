//! 运行时对象定义
//!
//! 纯类型定义。堆对象统一通过 `Box::into_raw` 分配，生命周期与所属模块一致
//! （本层不做回收，GC 属于外部协作方）。
//! ObjXxx 中存储 Value 的地方直接使用 Value 类型，避免与 Value 形成循环依赖。

use super::ext::convention::CallConv;
use super::ext::method::RawFn;
use super::ext::trampoline::TrampolineSet;
use super::value::Value;
use std::collections::HashMap;

/// 分配堆对象并返回稳定指针
#[inline]
pub fn alloc<T>(obj: T) -> *mut T {
    Box::into_raw(Box::new(obj))
}

// ==================== String ====================

/// 字符串对象
#[derive(Debug)]
pub struct ObjString {
    pub chars: String,
}

impl ObjString {
    pub fn new(chars: String) -> Self {
        Self { chars }
    }

    pub fn as_str(&self) -> &str {
        &self.chars
    }
}

// ==================== Tuple & Dict ====================

/// 元组对象 - 定长位置参数序列
#[derive(Debug)]
pub struct ObjTuple {
    pub items: Vec<Value>,
}

impl ObjTuple {
    pub fn new(items: Vec<Value>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// 字典对象 - 关键字实参映射（字符串键）
#[derive(Debug, Default)]
pub struct ObjDict {
    pub entries: HashMap<String, Value>,
}

impl ObjDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: &[(&str, Value)]) -> Self {
        let mut entries = HashMap::with_capacity(pairs.len());
        for (key, value) in pairs {
            entries.insert((*key).to_string(), *value);
        }
        Self { entries }
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按键排序的条目视图（HashMap 迭代序不稳定，输出必须确定）
    pub fn sorted_entries(&self) -> Vec<(&String, &Value)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

// ==================== Module ====================

/// 模块对象 - 一次模块加载产生的导出表
#[derive(Debug)]
pub struct ObjModule {
    pub name: String,
    pub doc: Option<String>,
    pub exports: HashMap<String, Value>,
}

impl ObjModule {
    pub fn new(name: String, doc: Option<String>) -> Self {
        Self {
            name,
            doc,
            exports: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.exports.get(name).copied()
    }

    /// 按名字排序的导出名（CLI 列表输出用）
    pub fn export_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.exports.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

// ==================== Extension Function ====================

/// 扩展函数对象
///
/// 一条方法表条目注册产生一个扩展函数。约定与三个分派入口在构造时确定，
/// 此后不可变：任何调用形态都只会进入与注册约定兼容的 trampoline。
#[derive(Clone, Copy)]
pub struct ObjExtFunction {
    /// 驻留后的函数名
    pub name: &'static str,
    /// 所属模块名（弱引用：仅名字，不持有模块对象，避免与模块成环）
    pub module: &'static str,
    /// 文档字符串
    pub doc: Option<&'static str>,
    /// 注册时分类出的调用约定
    pub conv: CallConv,
    /// 原生入口指针
    pub raw: RawFn,
    /// 按约定选定的分派入口三元组，构造时缓存，每次调用直接取用
    pub trampolines: TrampolineSet,
    /// 传给原生入口的 self 值（未绑定时为 null）
    pub self_value: Value,
}

impl ObjExtFunction {
    /// 限定名 "module.name"（错误归因用）
    pub fn qualname(&self) -> String {
        if self.module.is_empty() {
            self.name.to_string()
        } else {
            format!("{}.{}", self.module, self.name)
        }
    }
}

impl std::fmt::Debug for ObjExtFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjExtFunction")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("conv", &self.conv)
            .finish()
    }
}

// ==================== Bound Method & ClassMethod ====================

/// 绑定方法对象 - 扩展函数与接收者的配对
#[derive(Debug)]
pub struct ObjBoundMethod {
    pub function: *mut ObjExtFunction,
    pub receiver: Value,
}

impl ObjBoundMethod {
    pub fn new(function: *mut ObjExtFunction, receiver: Value) -> Self {
        Self { function, receiver }
    }
}

/// classmethod 描述符对象 - 扩展函数与所属者的配对
#[derive(Debug)]
pub struct ObjClassMethod {
    pub callable: Value,
    pub owner: Value,
}

impl ObjClassMethod {
    pub fn new(callable: Value, owner: Value) -> Self {
        Self { callable, owner }
    }
}

// ==================== 测试 ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dict_sorted_entries() {
        let mut dict = ObjDict::new();
        dict.insert("zeta", Value::int(1));
        dict.insert("alpha", Value::int(2));
        dict.insert("mid", Value::int(3));

        let keys: Vec<&str> = dict
            .sorted_entries()
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_dict_from_pairs() {
        let dict = ObjDict::from_pairs(&[("a", Value::int(1)), ("b", Value::TRUE)]);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("a"), Some(Value::int(1)));
        assert_eq!(dict.get("missing"), None);
    }

    #[test]
    fn test_module_export_names_sorted() {
        let mut module = ObjModule::new("m".to_string(), None);
        module.exports.insert("b".to_string(), Value::NULL);
        module.exports.insert("a".to_string(), Value::NULL);
        assert_eq!(module.export_names(), vec!["a", "b"]);
        assert_eq!(module.get("a"), Some(Value::NULL));
    }
}

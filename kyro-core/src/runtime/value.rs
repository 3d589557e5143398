//! NaN-boxed Value 实现（6-bit Tag 版本）
//!
//! 基于 IEEE 754 double 的 NaN 空间存储非浮点值
//! 位布局: [1位符号][11位指数][1位QNaN][6位Tag][45位Payload]

use super::object::{
    ObjBoundMethod, ObjClassMethod, ObjDict, ObjExtFunction, ObjModule, ObjString, ObjTuple,
};

/// NaN-boxed 值 (64-bit)
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq)]
pub struct Value(u64);

// ==================== 常量定义 ====================

/// Quiet NaN 基础值: E=0x7FF, bit 51 = 1
/// 指数位全 1 且 bit 51 置位时才可能是 boxing 值
const QNAN: u64 = 0x7FF8_0000_0000_0000;

/// Tag 位移: Tag 占 bits 50-45
const TAG_SHIFT: u64 = 45;

/// Tag 掩码 (6 位)
const TAG_MASK: u64 = 0x3F << TAG_SHIFT;

/// Payload 掩码: bits 44-0 (45 位)
const PAYLOAD_MASK: u64 = (1 << TAG_SHIFT) - 1;

// ==================== Tag 定义 ====================
// 0: 语言级 NaN（保持浮点语义）
// 1-7: 立即值
const TAG_NULL: u64 = 1 << TAG_SHIFT;
const TAG_TRUE: u64 = 2 << TAG_SHIFT;
const TAG_FALSE: u64 = 3 << TAG_SHIFT;
const TAG_INT: u64 = 4 << TAG_SHIFT; // 32 位有符号整数

// 8+: 堆类型
const TAG_STRING: u64 = 8 << TAG_SHIFT;
const TAG_TUPLE: u64 = 9 << TAG_SHIFT;
const TAG_DICT: u64 = 10 << TAG_SHIFT;
const TAG_MODULE: u64 = 11 << TAG_SHIFT;
const TAG_EXT_FUNCTION: u64 = 12 << TAG_SHIFT;
const TAG_BOUND_METHOD: u64 = 13 << TAG_SHIFT;
const TAG_CLASS_METHOD: u64 = 14 << TAG_SHIFT;
// 15-63: 预留其他堆类型

impl Value {
    // ==================== 常量值 ====================

    pub const NULL: Value = Value(QNAN | TAG_NULL);
    pub const TRUE: Value = Value(QNAN | TAG_TRUE);
    pub const FALSE: Value = Value(QNAN | TAG_FALSE);

    // ==================== 构造方法 ====================

    /// 创建整数（32 位，直接放入 Payload 低 32 位）
    #[inline]
    pub fn int(n: i32) -> Self {
        Self(QNAN | TAG_INT | (n as u32 as u64))
    }

    /// 创建浮点数
    #[inline]
    pub fn float(f: f64) -> Self {
        Self(f.to_bits())
    }

    /// 创建布尔值
    #[inline]
    pub fn bool_from(b: bool) -> Self {
        if b {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }

    /// 内部: 编码堆指针
    #[inline]
    fn encode_heap_ptr<T>(ptr: *mut T, tag: u64) -> Self {
        let addr = ptr as u64;
        debug_assert!(addr & 0x7 == 0, "Pointer must be 8-byte aligned");
        // 右移 3 位压缩地址（低 3 位恒为 0），45 位 payload 可覆盖 48 位地址
        let compressed = (addr >> 3) & PAYLOAD_MASK;
        Self(QNAN | tag | compressed)
    }

    /// 内部: 解码堆指针
    #[inline]
    fn decode_heap_ptr<T>(&self) -> *mut T {
        ((self.0 & PAYLOAD_MASK) << 3) as *mut T
    }

    /// 创建字符串对象
    #[inline]
    pub fn string(ptr: *mut ObjString) -> Self {
        Self::encode_heap_ptr(ptr, TAG_STRING)
    }

    /// 创建元组对象
    #[inline]
    pub fn tuple(ptr: *mut ObjTuple) -> Self {
        Self::encode_heap_ptr(ptr, TAG_TUPLE)
    }

    /// 创建字典对象
    #[inline]
    pub fn dict(ptr: *mut ObjDict) -> Self {
        Self::encode_heap_ptr(ptr, TAG_DICT)
    }

    /// 创建模块对象
    #[inline]
    pub fn module(ptr: *mut ObjModule) -> Self {
        Self::encode_heap_ptr(ptr, TAG_MODULE)
    }

    /// 创建扩展函数对象
    #[inline]
    pub fn ext_function(ptr: *mut ObjExtFunction) -> Self {
        Self::encode_heap_ptr(ptr, TAG_EXT_FUNCTION)
    }

    /// 创建绑定方法对象
    #[inline]
    pub fn bound_method(ptr: *mut ObjBoundMethod) -> Self {
        Self::encode_heap_ptr(ptr, TAG_BOUND_METHOD)
    }

    /// 创建 classmethod 描述符对象
    #[inline]
    pub fn class_method(ptr: *mut ObjClassMethod) -> Self {
        Self::encode_heap_ptr(ptr, TAG_CLASS_METHOD)
    }

    // ==================== 判定方法 ====================

    /// 是否为 boxing 值（非浮点）
    #[inline]
    fn is_boxed(&self) -> bool {
        (self.0 & QNAN) == QNAN && (self.0 & TAG_MASK) != 0
    }

    /// 取 Tag（浮点值返回 None）
    #[inline]
    fn tag(&self) -> Option<u64> {
        if self.is_boxed() {
            Some(self.0 & TAG_MASK)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.0 == Self::NULL.0
    }

    #[inline]
    pub fn is_false(&self) -> bool {
        self.0 == Self::FALSE.0
    }

    #[inline]
    pub fn is_float(&self) -> bool {
        !self.is_boxed()
    }

    /// 真值判定: null/false/0/0.0 为假，其余为真
    pub fn is_truthy(&self) -> bool {
        match self.tag() {
            Some(TAG_NULL) | Some(TAG_FALSE) => false,
            Some(TAG_TRUE) => true,
            Some(TAG_INT) => self.as_int() != Some(0),
            Some(_) => true,
            None => f64::from_bits(self.0) != 0.0,
        }
    }

    // ==================== 访问方法 ====================

    #[inline]
    pub fn as_int(&self) -> Option<i32> {
        match self.tag() {
            Some(TAG_INT) => Some((self.0 & 0xFFFF_FFFF) as u32 as i32),
            _ => None,
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        if self.is_float() {
            Some(f64::from_bits(self.0))
        } else {
            None
        }
    }

    /// 数值访问：整数提升为 f64
    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        self.as_int()
            .map(|n| n as f64)
            .or_else(|| self.as_float())
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self.tag() {
            Some(TAG_TRUE) => Some(true),
            Some(TAG_FALSE) => Some(false),
            _ => None,
        }
    }

    #[inline]
    pub fn as_string(&self) -> Option<*mut ObjString> {
        match self.tag() {
            Some(TAG_STRING) => Some(self.decode_heap_ptr()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_tuple(&self) -> Option<*mut ObjTuple> {
        match self.tag() {
            Some(TAG_TUPLE) => Some(self.decode_heap_ptr()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_dict(&self) -> Option<*mut ObjDict> {
        match self.tag() {
            Some(TAG_DICT) => Some(self.decode_heap_ptr()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_module(&self) -> Option<*mut ObjModule> {
        match self.tag() {
            Some(TAG_MODULE) => Some(self.decode_heap_ptr()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_ext_function(&self) -> Option<*mut ObjExtFunction> {
        match self.tag() {
            Some(TAG_EXT_FUNCTION) => Some(self.decode_heap_ptr()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bound_method(&self) -> Option<*mut ObjBoundMethod> {
        match self.tag() {
            Some(TAG_BOUND_METHOD) => Some(self.decode_heap_ptr()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_class_method(&self) -> Option<*mut ObjClassMethod> {
        match self.tag() {
            Some(TAG_CLASS_METHOD) => Some(self.decode_heap_ptr()),
            _ => None,
        }
    }

    /// 类型名（用于错误消息和 CLI 输出）
    pub fn type_name(&self) -> &'static str {
        match self.tag() {
            None => "float",
            Some(TAG_NULL) => "null",
            Some(TAG_TRUE) | Some(TAG_FALSE) => "bool",
            Some(TAG_INT) => "int",
            Some(TAG_STRING) => "str",
            Some(TAG_TUPLE) => "tuple",
            Some(TAG_DICT) => "dict",
            Some(TAG_MODULE) => "module",
            Some(TAG_EXT_FUNCTION) => "native function",
            Some(TAG_BOUND_METHOD) => "bound method",
            Some(TAG_CLASS_METHOD) => "classmethod",
            Some(_) => "object",
        }
    }
}

// ==================== 格式化 ====================

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.tag() {
            None => write!(f, "{}", f64::from_bits(self.0)),
            Some(TAG_NULL) => write!(f, "null"),
            Some(TAG_TRUE) => write!(f, "true"),
            Some(TAG_FALSE) => write!(f, "false"),
            Some(TAG_INT) => write!(f, "{}", self.as_int().unwrap_or(0)),
            Some(TAG_STRING) => {
                let s: *mut ObjString = self.decode_heap_ptr();
                write!(f, "{}", unsafe { &(*s).chars })
            }
            Some(TAG_TUPLE) => {
                let t: *mut ObjTuple = self.decode_heap_ptr();
                let items = unsafe { &(*t).items };
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Some(TAG_DICT) => {
                let d: *mut ObjDict = self.decode_heap_ptr();
                let dict = unsafe { &*d };
                write!(f, "{{")?;
                for (i, (key, value)) in dict.sorted_entries().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Some(TAG_MODULE) => {
                let m: *mut ObjModule = self.decode_heap_ptr();
                write!(f, "<module '{}'>", unsafe { &(*m).name })
            }
            Some(TAG_EXT_FUNCTION) => {
                let func: *mut ObjExtFunction = self.decode_heap_ptr();
                write!(f, "<native function {}>", unsafe { (*func).qualname() })
            }
            Some(TAG_BOUND_METHOD) => {
                let m: *mut ObjBoundMethod = self.decode_heap_ptr();
                let func = unsafe { (*m).function };
                write!(f, "<bound native method {}>", unsafe { (*func).qualname() })
            }
            Some(TAG_CLASS_METHOD) => write!(f, "<classmethod descriptor>"),
            Some(_) => write!(f, "<object>"),
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Value({})", self)
    }
}

// ==================== 测试 ====================

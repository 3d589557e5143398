//! 字符串驻留
//!
//! 方法名与模块名在注册时驻留为 `&'static str`，调用期比较和错误归因
//! 都不再复制字符串。驻留池只增不减，与扩展函数同生命周期。

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashSet;

static POOL: Lazy<Mutex<HashSet<&'static str>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// 驻留一个字符串，返回池中唯一的 `'static` 引用
pub fn intern(s: &str) -> &'static str {
    let mut pool = POOL.lock();
    if let Some(&hit) = pool.get(s) {
        return hit;
    }
    let leaked: &'static str = Box::leak(s.to_string().into_boxed_str());
    pool.insert(leaked);
    leaked
}

//! 全局解释执行权
//!
//! 单一逻辑解释线程持有执行权并驱动所有 trampoline 调用。原生被调方可以
//! 围绕长时间、无分配的原生工作临时让出执行权，但在触碰任何受管值之前
//! （包括装箱结果、记录错误）必须重新取得。
//!
//! 释放点（原生被调方内部）不是取得点（解释线程），所以底层用裸互斥量
//! 而不是守卫式互斥量；对外仍然只暴露作用域化的 API，所有退出路径
//! （包括 panic 展开）都会恢复锁状态。

use parking_lot::lock_api::RawMutex as _;
use parking_lot::RawMutex;
use std::marker::PhantomData;

static GIL: RawMutex = RawMutex::INIT;

/// 解释执行权守卫：存在即持有，drop 即释放
pub struct InterpGuard {
    // 执行权必须在取得它的线程上释放
    _not_send: PhantomData<*mut ()>,
}

/// 取得解释执行权（阻塞直到可用）
pub fn acquire() -> InterpGuard {
    GIL.lock();
    InterpGuard {
        _not_send: PhantomData,
    }
}

/// 尝试取得解释执行权（嵌入方使用）
pub fn try_acquire() -> Option<InterpGuard> {
    if GIL.try_lock() {
        Some(InterpGuard {
            _not_send: PhantomData,
        })
    } else {
        None
    }
}

impl Drop for InterpGuard {
    fn drop(&mut self) {
        unsafe { GIL.unlock() };
    }
}

/// 作用域结束（含 panic 展开）时重新取得执行权
struct Restore;

impl Drop for Restore {
    fn drop(&mut self) {
        GIL.lock();
    }
}

/// 围绕无分配的原生工作释放解释执行权
///
/// 契约：调用线程必须正持有执行权。`f` 内不得触碰任何受管值。
pub fn allow_threads<R>(f: impl FnOnce() -> R) -> R {
    unsafe { GIL.unlock() };
    let _restore = Restore;
    f()
}

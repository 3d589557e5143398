//! API 层配置
//!
//! 包含执行配置 RunConfig 和全局单例（供 CLI 使用）

use kyro_config::{LimitConfig, TraceConfig};
use once_cell::sync::OnceCell;

/// Execution configuration
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Call-site limits
    pub limits: LimitConfig,
    /// Bridge tracing switches
    pub trace: TraceConfig,
}

// Global config singleton for CLI convenience
static GLOBAL_CONFIG: OnceCell<RunConfig> = OnceCell::new();

/// Initialize global configuration (must be called once before any operation)
///
/// # Panics
/// If config is already initialized
pub fn init(config: RunConfig) {
    GLOBAL_CONFIG
        .set(config)
        .expect("Config already initialized");
}

/// Get global config reference
///
/// # Panics
/// If config is not initialized
pub fn config() -> &'static RunConfig {
    GLOBAL_CONFIG.get().expect("Config not initialized")
}

/// Check if config is initialized
pub fn is_initialized() -> bool {
    GLOBAL_CONFIG.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_run_config() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.limits.max_call_args, 256);
        assert!(!cfg.trace.trace_calls);
    }

    #[test]
    fn test_run_config_clone() {
        let cfg = RunConfig::default();
        let cloned = cfg.clone();
        assert_eq!(cfg.limits.max_call_args, cloned.limits.max_call_args);
    }

    #[test]
    fn test_global_config_init_and_get() {
        // 全局状态：若其他测试已初始化则跳过
        if !is_initialized() {
            let cfg = RunConfig::default();
            init(cfg);
            assert!(is_initialized());
            let retrieved = config();
            assert_eq!(retrieved.limits.max_call_args, 256);
        }
    }
}

//! CLI 项目配置文件
//!
//! 可选的 kyro.json：运行时限额、桥追踪开关与日志配置。

use kyro_api::KyroConfig;
use std::path::Path;

/// kyro.json 结构
#[derive(Debug, Default, serde::Deserialize)]
pub struct ProjectJson {
    /// 运行时配置（限额 + 追踪开关）
    #[serde(default)]
    pub runtime: KyroConfig,
    /// 日志级别: "off", "error", "warn", "info", "debug", "trace"
    pub log_level: Option<String>,
    /// 日志格式: "pretty", "compact", "json"
    pub log_format: Option<String>,
}

/// Read and parse a project file
pub fn read_project_json(path: &Path) -> Result<ProjectJson, String> {
    if !path.exists() {
        return Err(format!("configuration file '{}' not found", path.display()));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("cannot parse '{}': {}", path.display(), e))
}

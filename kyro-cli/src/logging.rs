//! CLI 日志系统初始化
//!
//! 基于 `tracing-subscriber` 实现按子系统的日志控制。

use kyro_config::Phase;
use std::io;
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer,
};

/// 日志输出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// 彩色格式化（开发使用）
    Pretty,
    /// 紧凑格式
    Compact,
    /// JSON 格式（工具集成）
    Json,
}

/// Parse log level string
pub fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.to_lowercase().as_str() {
        "off" | "silent" => Some(LevelFilter::OFF),
        "error" => Some(LevelFilter::ERROR),
        "warn" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}

/// Parse log format string
pub fn parse_format(s: &str) -> Option<LogFormat> {
    match s.to_lowercase().as_str() {
        "pretty" => Some(LogFormat::Pretty),
        "compact" => Some(LogFormat::Compact),
        "json" => Some(LogFormat::Json),
        _ => None,
    }
}

/// 使用指定级别与格式初始化日志系统
pub fn init(level: LevelFilter, format: LogFormat) {
    // Build filter targets per bridge subsystem
    let mut targets = Targets::new().with_default(level);
    for phase in [Phase::Registry, Phase::Dispatch, Phase::Native] {
        targets = targets.with_target(phase.target(), level);
    }

    let layer = create_format_layer(format, io::stderr).with_filter(targets);
    tracing_subscriber::registry().with(layer).init();
}

/// Create formatter layer based on format
fn create_format_layer<W, F>(
    format: LogFormat,
    make_writer: F,
) -> impl Layer<tracing_subscriber::Registry>
where
    W: io::Write + Send + Sync + 'static,
    F: Fn() -> W + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
    }
}

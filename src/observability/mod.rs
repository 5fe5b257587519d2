//! 可观测性：日志同时输出到 stdout 与本地文件

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 初始化日志：默认 info，可通过 RUST_LOG 覆盖；log_file 以追加模式打开（无 ANSI 颜色）
pub fn init(log_file: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .init();
    Ok(())
}

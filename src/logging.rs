// ==========================================
// 企业培训管理系统 - 日志初始化
// ==========================================
// 日志写 stderr,stdout 留给 CLI 的 JSON 输出
// - RUST_LOG: 过滤器（默认 info,例如 training_mgmt=debug,perf=info）
// - TRAINING_MGMT_LOG_JSON=1: JSON 行格式
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG_JSON: &str = "TRAINING_MGMT_LOG_JSON";

fn json_requested() -> bool {
    std::env::var(ENV_LOG_JSON)
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// 初始化进程级日志（CLI 入口调用一次）
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    if json_requested() {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// 集成测试用: 输出交给 libtest 捕获,重复调用无副作用
pub fn init_test() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("training_mgmt=debug,perf=info"));
    let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
}

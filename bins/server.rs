use std::process::ExitCode;

use dotenvy::dotenv;
use tokio::runtime::Runtime;
use tracing::{error, info};
use uuid::Uuid;

fn build_runtime(worker_threads: Option<usize>) -> std::io::Result<Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all().thread_name("tracks-worker");
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }
    builder.build()
}

fn main() -> ExitCode {
    // 提前加载 .env，使得 RUST_LOG / DATABASE_URL 等变量生效
    dotenv().ok();

    let cfg = match server::startup::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "tracks", event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    server::startup::init_logging(&cfg);

    let service_id = Uuid::new_v4();
    let pid = std::process::id();

    // Panic 钩子：记录到日志而不是只打印到 stderr
    std::panic::set_hook(Box::new(move |info| {
        error!(service = "tracks", event = "panic", %service_id, pid, message = %info, "unhandled panic occurred");
    }));

    let worker_threads = cfg.server.worker_threads;
    let rt = match build_runtime(worker_threads) {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "tracks", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "tracks",
        event = "start",
        %service_id,
        pid,
        version = env!("CARGO_PKG_VERSION"),
        threads = worker_threads.unwrap_or_default(),
        "tracks server starting"
    );

    // server 内部监听 Ctrl+C 并优雅停机，返回即表示已经停止
    match rt.block_on(server::run_with_config(cfg)) {
        Ok(()) => {
            info!(service = "tracks", event = "stop", %service_id, pid, "server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "tracks", event = "run_failed", %service_id, error = %e, "server exited with error");
            ExitCode::FAILURE
        }
    }
}

mod supervisor;
mod ipc;
mod config;
mod python_env;
mod process_monitor;
mod utils;

use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("GlobeTrotter dev daemon starting");

    let cfg = config::DevServerConfig::load()?;
    let listen_addr = format!("127.0.0.1:{}", cfg.listen_port);
    let odoo_url = cfg.odoo_url();

    tracing::info!("Module path: {}", cfg.module_path.display());
    tracing::info!("Dashboard:   http://{}", listen_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  - Module info:   http://{}/api/module/info", listen_addr);
    tracing::info!("  - Odoo status:   http://{}/api/odoo/status", listen_addr);
    tracing::info!("  - Odoo start:    POST http://{}/api/odoo/start", listen_addr);
    tracing::info!("  - Validate:      http://{}/api/module/validate", listen_addr);
    tracing::info!("Odoo (when running): {}", odoo_url);

    let supervisor = Arc::new(supervisor::Supervisor::new(cfg));
    let server = ipc::DashboardServer::new(supervisor, &listen_addr);

    // Graceful shutdown: 관리 대상 프로세스는 분리되어 있으므로
    // 데몬 종료 시 정리할 자식이 없다. 로그만 남기고 빠진다.
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received, exiting");
        std::process::exit(0);
    });

    if let Err(e) = server.start().await {
        tracing::error!("Dashboard server error: {}", e);
    }

    tracing::info!("GlobeTrotter dev daemon shutting down");
    Ok(())
}

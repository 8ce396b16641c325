//! 대시보드 HTTP 서버 — JSON API 4종 + HTML 대시보드 1장.
//!
//! 모든 핸들러는 베스트 에포트 JSON으로 강등한다: 프로브 실패·파일
//! 읽기 실패는 핸들러 안에서 흡수되고, 이 서버 자체는 그런 이유로
//! 절대 죽지 않는다 (요청당 5xx도 내지 않는다).

mod dashboard;

use anyhow::Result;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::supervisor::Supervisor;

/// Dashboard HTTP Server State
#[derive(Clone)]
pub struct DashboardServer {
    pub supervisor: Arc<Supervisor>,
    pub listen_addr: String,
}

impl DashboardServer {
    pub fn new(supervisor: Arc<Supervisor>, listen_addr: &str) -> Self {
        Self {
            supervisor,
            listen_addr: listen_addr.to_string(),
        }
    }

    /// 라우터 구성 — 테스트에서 oneshot으로 직접 호출할 수 있도록 분리
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index))
            .route("/api/module/info", get(module_info))
            .route("/api/odoo/status", get(odoo_status))
            .route("/api/odoo/start", post(odoo_start))
            .route("/api/module/validate", get(module_validate))
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone())
    }

    pub async fn start(self) -> Result<()> {
        tracing::info!("Dashboard HTTP server starting on {}", self.listen_addr);

        let router = self.router();
        let listener = tokio::net::TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("Dashboard listening on http://{}", self.listen_addr);

        axum::serve(listener, router).await?;
        Ok(())
    }
}

/// GET / - HTML 대시보드
async fn index(State(state): State<DashboardServer>) -> impl IntoResponse {
    Html(dashboard::render(
        &state.supervisor.config.module_display_name,
        state.supervisor.config.odoo_port,
    ))
}

/// GET /api/module/info - 파일 카운트 + 매니페스트 선언 정보
async fn module_info(State(state): State<DashboardServer>) -> impl IntoResponse {
    Json(state.supervisor.module_info().await)
}

/// GET /api/odoo/status - 헬스 체크 (프로브 실패도 정상 응답)
async fn odoo_status(State(state): State<DashboardServer>) -> impl IntoResponse {
    Json(state.supervisor.check_status().await)
}

/// POST /api/odoo/start - Odoo 기동 시퀀스 실행
async fn odoo_start(State(state): State<DashboardServer>) -> impl IntoResponse {
    Json(state.supervisor.start_odoo().await)
}

/// GET /api/module/validate - 모듈 구조 휴리스틱 검증
async fn module_validate(State(state): State<DashboardServer>) -> impl IntoResponse {
    Json(state.supervisor.validate_module().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DevServerConfig;

    #[test]
    fn test_server_construction() {
        let supervisor = Arc::new(Supervisor::new(DevServerConfig::default()));
        let server = DashboardServer::new(supervisor, "127.0.0.1:3000");
        assert_eq!(server.listen_addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_router_builds() {
        let supervisor = Arc::new(Supervisor::new(DevServerConfig::default()));
        let server = DashboardServer::new(supervisor, "127.0.0.1:3000");
        let _router = server.router();
    }
}

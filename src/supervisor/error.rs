//! Supervisor 전용 에러 타입 — 에러 종류를 구분하여 HTTP 핸들러에서
//! 적절한 상태 코드를 반환할 수 있게 합니다.
//!
//! 프로브 실패·파일 읽기 실패는 에러가 아니라 도메인 결과(running:false,
//! 0 카운트)로 처리되므로, 여기에 오는 것은 진짜 내부 장애뿐입니다.

use axum::http::StatusCode;

/// Supervisor 작업 중 발생할 수 있는 에러 유형
#[derive(thiserror::Error, Debug)]
pub enum SupervisorError {
    #[error("Required package '{0}' is not importable")]
    DependencyMissing(String),

    #[error("Failed to spawn managed process: {0}")]
    SpawnFailed(String),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl SupervisorError {
    /// HTTP 상태 코드 매핑
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DependencyMissing(_) => StatusCode::PRECONDITION_FAILED,
            Self::SpawnFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON 에러 응답 생성
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "success": false,
            "error": self.to_string(),
            "error_code": self.error_code(),
        })
    }

    /// 머신 리더블 에러 코드
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DependencyMissing(_) => "DEPENDENCY_MISSING",
            Self::SpawnFailed(_) => "SPAWN_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// axum 핸들러에서 SupervisorError를 직접 반환할 수 있도록 IntoResponse 구현
impl axum::response::IntoResponse for SupervisorError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = axum::Json(self.to_json());
        (status, body).into_response()
    }
}

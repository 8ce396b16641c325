//! 개발 데몬 설정 — 고정 상수 대신 명시적인 설정 구조체를 사용합니다.
//!
//! `config/devserver.toml`이 있으면 읽고, 없거나 파싱에 실패하면
//! 내장 기본값으로 동작합니다. 모든 핸들러는 이 구조체를
//! 읽기 전용으로 공유하므로 락이 필요 없습니다.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Clone)]
pub struct DevServerConfig {
    /// 대시보드 HTTP 포트
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// 관리 대상 Odoo 서버 포트
    #[serde(default = "default_odoo_port")]
    pub odoo_port: u16,
    /// Odoo 데이터베이스 이름
    #[serde(default = "default_database")]
    pub database: String,
    /// 관리 대상 애드온 모듈 디렉토리
    #[serde(default = "default_module_path")]
    pub module_path: PathBuf,
    /// 대시보드에 표시할 모듈 이름
    #[serde(default = "default_display_name")]
    pub module_display_name: String,
    /// 프로세스 테이블 검색 패턴 (pgrep -f 대응)
    #[serde(default = "default_process_pattern")]
    pub process_pattern: String,
    /// venv가 없을 때 사용할 시스템 인터프리터
    #[serde(default = "default_system_python")]
    pub system_python: String,
    /// 의존성 프로브에서 import할 패키지 이름
    #[serde(default = "default_required_package")]
    pub required_package: String,
    /// 스폰 후 첫 상태 재확인까지의 대기 시간 (초)
    #[serde(default = "default_settle_delay")]
    pub settle_delay_secs: u64,
    /// 헬스 프로브 타임아웃 (초)
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

fn default_listen_port() -> u16 {
    3000
}

fn default_odoo_port() -> u16 {
    8069
}

fn default_database() -> String {
    "globetrotter_db".to_string()
}

fn default_module_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_display_name() -> String {
    "GlobeTrotter Smart Planner".to_string()
}

fn default_process_pattern() -> String {
    "odoo".to_string()
}

fn default_system_python() -> String {
    "python3".to_string()
}

fn default_required_package() -> String {
    "odoo".to_string()
}

fn default_settle_delay() -> u64 {
    3
}

fn default_probe_timeout() -> u64 {
    2
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            odoo_port: default_odoo_port(),
            database: default_database(),
            module_path: default_module_path(),
            module_display_name: default_display_name(),
            process_pattern: default_process_pattern(),
            system_python: default_system_python(),
            required_package: default_required_package(),
            settle_delay_secs: default_settle_delay(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

impl DevServerConfig {
    pub fn load() -> anyhow::Result<Self> {
        let s = std::fs::read_to_string("config/devserver.toml").unwrap_or_default();
        let mut cfg: Self = toml::from_str(&s).unwrap_or_default();

        // 환경변수 오버라이드 — 모듈 트리 위치만 외부에서 바꿀 수 있음
        if let Ok(path) = std::env::var("GLOBETROTTER_MODULE_PATH") {
            cfg.module_path = PathBuf::from(path);
        }

        Ok(cfg)
    }

    /// 관리 대상 서버의 기본 URL
    pub fn odoo_url(&self) -> String {
        format!("http://localhost:{}", self.odoo_port)
    }

    /// Odoo `--addons-path`로 넘길 값: 모듈 디렉토리의 부모
    pub fn addons_path(&self) -> PathBuf {
        self.module_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| self.module_path.clone())
    }

    /// Odoo `-i`로 넘길 값: 모듈 디렉토리의 이름
    pub fn module_name(&self) -> String {
        self.module_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "globetrotter".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let cfg = DevServerConfig::default();
        assert_eq!(cfg.listen_port, 3000);
        assert_eq!(cfg.odoo_port, 8069);
        assert_eq!(cfg.database, "globetrotter_db");
        assert_eq!(cfg.process_pattern, "odoo");
        assert_eq!(cfg.settle_delay_secs, 3);
        assert_eq!(cfg.probe_timeout_secs, 2);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg: DevServerConfig = toml::from_str("odoo_port = 9999").unwrap();
        assert_eq!(cfg.odoo_port, 9999);
        assert_eq!(cfg.listen_port, 3000);
        assert_eq!(cfg.database, "globetrotter_db");
    }

    #[test]
    fn test_odoo_url() {
        let cfg = DevServerConfig::default();
        assert_eq!(cfg.odoo_url(), "http://localhost:8069");
    }

    #[test]
    fn test_addons_path_is_parent_of_module() {
        let mut cfg = DevServerConfig::default();
        cfg.module_path = PathBuf::from("/srv/addons/globetrotter");
        assert_eq!(cfg.addons_path(), PathBuf::from("/srv/addons"));
        assert_eq!(cfg.module_name(), "globetrotter");
    }

    #[test]
    fn test_load_never_fails() {
        // 설정 파일이 없어도 기본값으로 동작해야 함
        let cfg = DevServerConfig::load();
        assert!(cfg.is_ok());
    }
}

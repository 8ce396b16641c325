//! Python 인터프리터 해석 및 Odoo 의존성 프로브
//!
//! 모듈 디렉토리 안의 venv(`venv/bin/python3`)가 있으면 그것을 쓰고,
//! 없으면 시스템 인터프리터로 폴백합니다. 서버를 띄우기 전에
//! `python -c "import odoo"`로 패키지가 실제로 import 가능한지 확인하고,
//! 실패하면 스폰 없이 구조화된 해결 가이드를 돌려줍니다.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::utils::apply_creation_flags;

/// 의존성 누락 시 사용자에게 제시할 설치 가이드
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Solution {
    pub step1: String,
    pub step2: String,
    pub step3: String,
}

/// 의존성 프로브 결과
#[derive(Debug, Clone)]
pub enum DependencyProbe {
    /// import 성공 — 서버 기동 가능
    Available,
    /// import 실패 — stderr 요약과 함께 반환
    Missing { detail: String },
}

/// 모듈 venv 내 Python 실행 파일 경로
pub fn venv_python_exe(module_path: &Path) -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        module_path.join("venv").join("Scripts").join("python.exe")
    }
    #[cfg(not(target_os = "windows"))]
    {
        module_path.join("venv").join("bin").join("python3")
    }
}

/// 사용할 인터프리터 결정: venv 우선, 없으면 시스템 인터프리터
pub fn resolve_interpreter(module_path: &Path, system_python: &str) -> String {
    let venv = venv_python_exe(module_path);
    if venv.exists() {
        tracing::debug!("Using venv interpreter: {}", venv.display());
        venv.to_string_lossy().into_owned()
    } else {
        system_python.to_string()
    }
}

/// `<python> -c "import <package>"` 실행으로 패키지 존재 여부 확인
///
/// 인터프리터 자체가 없어서 실행이 실패하는 경우도 Missing으로
/// 취급합니다 — 어느 쪽이든 서버를 띄울 수 없는 상태이므로.
pub async fn probe_package(python: &str, package: &str) -> DependencyProbe {
    let script = format!("import {}", package);
    let mut cmd = Command::new(python);
    cmd.args(["-c", &script]);
    apply_creation_flags(&mut cmd);

    match cmd.output().await {
        Ok(output) if output.status.success() => DependencyProbe::Available,
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!("Dependency probe failed for '{}': {}", package, stderr.trim());
            DependencyProbe::Missing {
                detail: format!("{} Python package not found", capitalize(package)),
            }
        }
        Err(e) => {
            tracing::debug!("Interpreter '{}' unavailable: {}", python, e);
            DependencyProbe::Missing {
                detail: format!("Interpreter '{}' could not be executed: {}", python, e),
            }
        }
    }
}

/// 의존성 누락 시 제시할 설치 가이드 생성
pub fn remediation_steps(odoo_port: u16) -> Solution {
    Solution {
        step1: "Run: npm run setup".to_string(),
        step2: "Or manually: source venv/bin/activate && pip install odoo".to_string(),
        step3: format!(
            "Or use Docker: docker run -d -p {port}:{port} -v $(pwd):/mnt/extra-addons odoo:latest",
            port = odoo_port
        ),
    }
}

/// 시스템 인터프리터가 실제로 실행 가능한지 확인 (진단용)
#[allow(dead_code)] // 테스트 및 수동 점검에서 사용
pub async fn verify_python(python: &str) -> bool {
    let mut cmd = Command::new(python);
    cmd.arg("--version");
    apply_creation_flags(&mut cmd);
    matches!(cmd.output().await, Ok(o) if o.status.success())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_venv_python_exe_path() {
        let dir = PathBuf::from(if cfg!(target_os = "windows") {
            "C:\\module"
        } else {
            "/srv/module"
        });
        let exe = venv_python_exe(&dir);
        #[cfg(target_os = "windows")]
        assert!(exe.to_string_lossy().contains("Scripts\\python.exe"));
        #[cfg(not(target_os = "windows"))]
        assert!(exe.to_string_lossy().ends_with("venv/bin/python3"));
    }

    #[test]
    fn test_resolve_interpreter_falls_back_to_system() {
        // venv가 없는 경로 → 시스템 인터프리터 이름 그대로
        let dir = std::env::temp_dir().join("no-venv-here-417");
        let python = resolve_interpreter(&dir, "python3");
        assert_eq!(python, "python3");
    }

    #[test]
    fn test_remediation_steps_mention_port() {
        let solution = remediation_steps(8069);
        assert!(solution.step3.contains("8069:8069"));
        assert!(solution.step2.contains("pip install odoo"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("odoo"), "Odoo");
        assert_eq!(capitalize(""), "");
    }

    #[tokio::test]
    async fn test_probe_missing_interpreter() {
        // 존재하지 않는 인터프리터 → Missing, 패닉/에러 없음
        let probe = probe_package("definitely-not-a-python-binary-417", "odoo").await;
        assert!(matches!(probe, DependencyProbe::Missing { .. }));
    }

    #[tokio::test]
    async fn test_probe_importable_stdlib_package() {
        // 시스템 Python이 있으면 표준 라이브러리 import는 성공해야 함
        if !verify_python("python3").await {
            println!("⚠ python3 not found, skipping");
            return;
        }
        let probe = probe_package("python3", "sys").await;
        assert!(matches!(probe, DependencyProbe::Available));
    }
}

//! 애드온 모듈 트리 스캔 — 파일 카운트, 매니페스트 추출, 구조 검증
//!
//! 모든 값은 요청 시점에 디렉토리를 다시 걸어서 계산합니다 (캐시 없음).
//! 읽기 실패는 호출자에게 전파하지 않고 0 카운트 / false 플래그로
//! 흡수합니다 — 개발 도우미가 파일 하나 없다고 죽어서는 안 되므로.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Odoo 애드온 매니페스트 파일 이름
pub const MANIFEST_FILE: &str = "__manifest__.py";

/// 추적 대상 확장자
pub const TRACKED_EXTENSIONS: (&str, &str) = (".py", ".xml");

/// 확장자별 파일 카운트
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileCounts {
    pub python: usize,
    pub xml: usize,
    pub total: usize,
}

/// 매니페스트에서 추출한 선언 정보. 없거나 매칭 실패 시 "Unknown".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestInfo {
    pub name: String,
    pub version: String,
}

/// 모듈 구조 검증 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub files: ValidationFiles,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFiles {
    pub python: usize,
    pub xml: usize,
    pub manifest: bool,
}

/// 디렉토리 트리에서 특정 확장자로 끝나는 파일 수를 재귀적으로 셉니다.
/// 읽기 실패한 하위 트리는 0으로 취급.
pub fn count_files(dir: &Path, ext: &str) -> usize {
    fn walk(dir: &Path, ext: &str) -> usize {
        let mut count = 0;
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    count += walk(&path, ext);
                } else if path.to_string_lossy().ends_with(ext) {
                    count += 1;
                }
            }
        }
        count
    }
    walk(dir, ext)
}

/// 트리 전체의 파일 수 (디렉토리 제외)
pub fn count_all_files(dir: &Path) -> usize {
    fn walk(dir: &Path) -> usize {
        let mut count = 0;
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    count += walk(&path);
                } else {
                    count += 1;
                }
            }
        }
        count
    }
    walk(dir)
}

/// 추적 확장자 2종 + 전체 카운트를 한 번에 계산
pub fn scan_file_counts(dir: &Path) -> FileCounts {
    FileCounts {
        python: count_files(dir, TRACKED_EXTENSIONS.0),
        xml: count_files(dir, TRACKED_EXTENSIONS.1),
        total: count_all_files(dir),
    }
}

/// 매니페스트 존재 여부
pub fn manifest_exists(module_path: &Path) -> bool {
    module_path.join(MANIFEST_FILE).exists()
}

/// 매니페스트 본문에서 `'name'` / `'version'` 값을 패턴 매칭으로 추출.
///
/// Odoo 매니페스트는 Python dict 리터럴이라 제대로 파싱하지 않고
/// 따옴표 패턴만 봅니다. 홑/쌍따옴표 모두 허용.
pub fn extract_manifest_info(manifest: &str) -> ManifestInfo {
    ManifestInfo {
        name: extract_field(manifest, "name"),
        version: extract_field(manifest, "version"),
    }
}

fn extract_field(manifest: &str, field: &str) -> String {
    let pattern = format!(r#"['"]{}['"]\s*:\s*['"]([^'"]+)['"]"#, field);
    match Regex::new(&pattern) {
        Ok(re) => re
            .captures(manifest)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "Unknown".to_string()),
        Err(e) => {
            tracing::error!("Invalid manifest pattern for field '{}': {}", field, e);
            "Unknown".to_string()
        }
    }
}

/// 매니페스트 파일을 읽어 선언 정보를 추출. 없거나 읽기 실패 시 None.
pub fn read_manifest_info(module_path: &Path) -> Option<ManifestInfo> {
    let manifest_path = module_path.join(MANIFEST_FILE);
    match std::fs::read_to_string(&manifest_path) {
        Ok(content) => Some(extract_manifest_info(&content)),
        Err(e) => {
            tracing::debug!("Manifest not readable at {}: {}", manifest_path.display(), e);
            None
        }
    }
}

/// 휴리스틱 구조 검증: 매니페스트 존재 AND .py ≥ 1 AND .xml ≥ 1.
/// 스키마 검증이 아니라 "애드온처럼 생겼는가" 수준의 체크.
pub fn validate_module(module_path: &Path) -> ValidationResult {
    let python = count_files(module_path, TRACKED_EXTENSIONS.0);
    let xml = count_files(module_path, TRACKED_EXTENSIONS.1);
    let manifest = manifest_exists(module_path);

    ValidationResult {
        valid: manifest && python > 0 && xml > 0,
        files: ValidationFiles {
            python,
            xml,
            manifest,
        },
        message: if manifest {
            "Module structure is valid".to_string()
        } else {
            "Manifest missing".to_string()
        },
    }
}

// ── Async wrappers ─────────────────────────────────────────
// 트리 워크는 동기 파일시스템 I/O이므로 핸들러에서는
// spawn_blocking 래퍼를 통해 호출합니다.

/// `scan_file_counts`의 비동기 래퍼.
pub async fn scan_file_counts_async(dir: &Path) -> FileCounts {
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || scan_file_counts(&dir))
        .await
        .unwrap_or(FileCounts {
            python: 0,
            xml: 0,
            total: 0,
        })
}

/// `validate_module`의 비동기 래퍼.
pub async fn validate_module_async(module_path: &Path) -> ValidationResult {
    let dir = module_path.to_path_buf();
    tokio::task::spawn_blocking(move || validate_module(&dir))
        .await
        .unwrap_or(ValidationResult {
            valid: false,
            files: ValidationFiles {
                python: 0,
                xml: 0,
                manifest: false,
            },
            message: "Validation task failed".to_string(),
        })
}

/// `read_manifest_info`의 비동기 래퍼.
pub async fn read_manifest_info_async(module_path: &Path) -> Option<ManifestInfo> {
    let dir = module_path.to_path_buf();
    tokio::task::spawn_blocking(move || read_manifest_info(&dir))
        .await
        .unwrap_or(None)
}

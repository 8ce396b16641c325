use serde::{Deserialize, Serialize};
use sysinfo::System;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningProcess {
    pub pid: u32,
    pub name: String,
    /// 프로세스 커맨드라인 인수 (예: ["python3", "-m", "odoo"])
    #[serde(default)]
    pub cmd: Vec<String>,
}

/// 크로스 플랫폼: 실행 중인 모든 프로세스 목록 가져오기
pub fn get_running_processes() -> Vec<RunningProcess> {
    let mut sys = System::new_all();
    sys.refresh_all();

    let processes: Vec<RunningProcess> = sys
        .processes()
        .iter()
        .map(|(pid, process)| RunningProcess {
            pid: pid.as_u32(),
            name: process.name().to_string(),
            cmd: process.cmd().to_vec(),
        })
        .collect();

    tracing::debug!("Found {} running processes", processes.len());
    processes
}

/// 커맨드라인 패턴으로 프로세스 검색 (`pgrep -f <pattern>` 대응)
///
/// 프로세스 이름 또는 커맨드라인 전체 문자열에 패턴이 포함되면 매칭.
/// 대소문자 무시. 쉘 pgrep 대신 네이티브 프로세스 테이블 스캔 사용.
pub fn find_by_cmdline(pattern: &str) -> Vec<RunningProcess> {
    let pattern_lower = pattern.to_lowercase();

    get_running_processes()
        .into_iter()
        .filter(|p| {
            if p.name.to_lowercase().contains(&pattern_lower) {
                return true;
            }
            let cmdline = p.cmd.join(" ").to_lowercase();
            cmdline.contains(&pattern_lower)
        })
        .collect()
}

/// pgrep 스타일 출력: 매칭된 PID들을 개행으로 연결, 없으면 None
pub fn pgrep_style(pattern: &str) -> Option<String> {
    let matches = find_by_cmdline(pattern);
    if matches.is_empty() {
        return None;
    }
    Some(
        matches
            .iter()
            .map(|p| p.pid.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

// ── Async wrappers ─────────────────────────────────────────
// sysinfo 시스템 콜은 동기적으로 OS 프로세스 테이블 전체를 스캔합니다.
// tokio 워커 스레드에서 직접 호출하면 런타임 전체가 블로킹되므로,
// spawn_blocking을 통해 전용 블로킹 스레드풀에서 실행합니다.

/// `pgrep_style`의 비동기 래퍼.
pub async fn pgrep_style_async(pattern: &str) -> Option<String> {
    let pattern = pattern.to_string();
    tokio::task::spawn_blocking(move || pgrep_style(&pattern))
        .await
        .unwrap_or(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_running_processes_not_empty() {
        // 테스트 프로세스 자신은 항상 존재
        let processes = get_running_processes();
        assert!(!processes.is_empty());
    }

    #[test]
    fn test_find_by_cmdline_no_match() {
        let matches = find_by_cmdline("this-process-name-cannot-possibly-exist-417");
        assert!(matches.is_empty());
    }

    #[test]
    fn test_pgrep_style_none_when_no_match() {
        let out = pgrep_style("this-process-name-cannot-possibly-exist-417");
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn test_async_wrapper_matches_sync() {
        let pattern = "this-process-name-cannot-possibly-exist-417";
        let sync = pgrep_style(pattern);
        let async_ = pgrep_style_async(pattern).await;
        assert_eq!(sync, async_);
    }
}

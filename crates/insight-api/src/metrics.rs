//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 생성 파이프라인 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// 레코더는 프로세스당 한 번만 설치할 수 있으며, 두 번째 호출은 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .set_buckets_for_metric(
            Matcher::Full("generation_duration_seconds".to_string()),
            &[0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 생성 파이프라인 메트릭
// ============================================================================

/// 캐시 조회 결과 기록 (namespace: generate / compose).
pub fn record_cache_lookup(namespace: &str, hit: bool) {
    counter!(
        "response_cache_lookups_total",
        "namespace" => namespace.to_string(),
        "result" => if hit { "hit" } else { "miss" }
    )
    .increment(1);
}

/// provider 호출 결과 기록.
///
/// `outcome`은 `generated`, `degraded`, `unconfigured` 중 하나입니다.
pub fn record_generation(provider: &str, outcome: &str, duration_secs: f64) {
    counter!(
        "generation_requests_total",
        "provider" => provider.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    histogram!("generation_duration_seconds", "provider" => provider.to_string())
        .record(duration_secs);
}

// ============================================================================
// 경로 정규화 유틸리티
// ============================================================================

/// 경로에서 동적 세그먼트를 정규화합니다.
///
/// 라우트에 매칭되지 않은 요청의 라벨 폭증을 막기 위해 숫자, UUID, 긴 hex 세그먼트를
/// `:id`로 바꿉니다. 예: `/sessions/3f9a...` → `/sessions/:id`
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let is_uuid = segment.len() == 36 && segment.chars().filter(|c| *c == '-').count() == 4;
            let is_numeric = !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());
            let is_token = segment.len() >= 32 && segment.chars().all(|c| c.is_ascii_hexdigit());

            if is_uuid || is_numeric || is_token {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

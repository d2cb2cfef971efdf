//! 캐시 키 fingerprint.
//!
//! 구조화된 값을 키 정렬된 canonical JSON으로 직렬화한 뒤 SHA-256으로 해시합니다.
//! 필드 삽입 순서와 프로세스 재시작에 관계없이 같은 내용은 같은 키가 됩니다.

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::PreferenceDocument;

/// 생성 결과 캐시 네임스페이스.
pub const GENERATE_NAMESPACE: &str = "generate";

/// compose 결과 캐시 네임스페이스.
pub const COMPOSE_NAMESPACE: &str = "compose";

/// 객체 키를 재귀적으로 정렬한 값을 반환합니다.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// 값의 canonical JSON 문자열.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    serde_json::to_string(&canonicalize(&value))
}

/// `<namespace>:<sha256 hex>` 형식의 캐시 키.
pub fn fingerprint<T: Serialize + ?Sized>(
    namespace: &str,
    value: &T,
) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(value)?;
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(format!("{}:{}", namespace, hex::encode(digest)))
}

/// (user_id, 선호도 문서 전체)에 대한 생성 캐시 키.
///
/// 문서의 `updated_at`이 포함되므로 저장 이후의 문서는 저장 이전에 기록된 키와 겹치지 않습니다.
pub fn generation_cache_key(
    user_id: &str,
    prefs: &PreferenceDocument,
) -> Result<String, serde_json::Error> {
    #[derive(Serialize)]
    struct KeyInput<'a> {
        user_id: &'a str,
        prefs: &'a PreferenceDocument,
    }

    fingerprint(GENERATE_NAMESPACE, &KeyInput { user_id, prefs })
}

/// 네임스페이스 전체를 가리키는 패턴 (`generate:*`).
pub fn namespace_pattern(namespace: &str) -> String {
    format!("{}:*", namespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChartType, FinanceMetric, PreferenceSettings};
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    fn sample_doc() -> PreferenceDocument {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        PreferenceDocument {
            user_id: "alice".to_string(),
            settings: PreferenceSettings::new(ChartType::Bar, FinanceMetric::Revenue),
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_key_format() {
        let key = generation_cache_key("alice", &sample_doc()).unwrap();
        let (ns, digest) = key.split_once(':').unwrap();
        assert_eq!(ns, GENERATE_NAMESPACE);
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_is_stable() {
        let a = generation_cache_key("alice", &sample_doc()).unwrap();
        let b = generation_cache_key("alice", &sample_doc()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_changes_with_content() {
        let base = sample_doc();
        let base_key = generation_cache_key("alice", &base).unwrap();

        let mut changed = base.clone();
        changed.settings.show_news = true;
        assert_ne!(generation_cache_key("alice", &changed).unwrap(), base_key);

        let mut resaved = base.clone();
        resaved.updated_at = base.updated_at + Duration::seconds(1);
        assert_ne!(generation_cache_key("alice", &resaved).unwrap(), base_key);

        assert_ne!(generation_cache_key("bob", &base).unwrap(), base_key);
    }

    #[test]
    fn test_canonicalize_nested() {
        let value = json!({"b": {"z": 1, "a": [{"y": 2, "x": 1}]}, "a": null});
        assert_eq!(
            serde_json::to_string(&canonicalize(&value)).unwrap(),
            r#"{"a":null,"b":{"a":[{"x":1,"y":2}],"z":1}}"#
        );
    }

    #[test]
    fn test_namespace_pattern() {
        assert_eq!(namespace_pattern(GENERATE_NAMESPACE), "generate:*");
    }
}

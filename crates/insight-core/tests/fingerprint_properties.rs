//! 캐시 키 fingerprint 속성 테스트.
//!
//! 필드 순서만 다른 동일 문서는 항상 같은 키를 가져야 합니다.

use chrono::{TimeZone, Utc};
use insight_core::{
    canonical_json, generation_cache_key, ChartType, Currency, FinanceMetric, Granularity,
    PreferenceDocument, PreferenceSettings, Theme, TimeRange,
};
use proptest::prelude::*;
use serde_json::{Map, Value};

// =============================================================================
// Generators
// =============================================================================

fn arb_settings() -> impl Strategy<Value = PreferenceSettings> {
    (
        prop::sample::select(ChartType::ALL),
        prop::sample::select(FinanceMetric::ALL),
        prop::sample::select(TimeRange::ALL),
        prop::sample::select(Currency::ALL),
        prop::sample::select(Granularity::ALL),
        prop::sample::select(Theme::ALL),
        any::<bool>(),
    )
        .prop_map(
            |(chart_type, finance_metric, time_range, currency, granularity, theme, show_news)| {
                PreferenceSettings {
                    chart_type,
                    finance_metric,
                    time_range,
                    currency,
                    granularity,
                    theme,
                    show_news,
                }
            },
        )
}

fn arb_document() -> impl Strategy<Value = PreferenceDocument> {
    ("[a-z0-9_]{1,16}", arb_settings(), 0i64..2_000_000_000).prop_map(
        |(user_id, settings, secs)| {
            let ts = Utc.timestamp_opt(secs, 0).unwrap();
            PreferenceDocument {
                user_id,
                settings,
                created_at: ts,
                updated_at: ts,
            }
        },
    )
}

/// 문서를 주어진 키 순서의 JSON 텍스트로 직렬화합니다.
fn to_json_in_order(doc: &PreferenceDocument, order: &[String]) -> String {
    let value = serde_json::to_value(doc).unwrap();
    let fields = value.as_object().unwrap();
    let parts: Vec<String> = order
        .iter()
        .map(|key| format!("{}:{}", Value::String(key.clone()), fields[key]))
        .collect();
    format!("{{{}}}", parts.join(","))
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// 필드 순서가 다른 JSON에서 읽은 문서는 같은 키를 가진다.
    #[test]
    fn prop_fingerprint_ignores_field_order(
        (doc, order) in arb_document().prop_flat_map(|doc| {
            let keys: Vec<String> = serde_json::to_value(&doc)
                .unwrap()
                .as_object()
                .unwrap()
                .keys()
                .cloned()
                .collect();
            (Just(doc), Just(keys).prop_shuffle())
        })
    ) {
        let reordered: PreferenceDocument =
            serde_json::from_str(&to_json_in_order(&doc, &order)).unwrap();

        prop_assert_eq!(
            generation_cache_key(&doc.user_id, &doc).unwrap(),
            generation_cache_key(&reordered.user_id, &reordered).unwrap()
        );
    }

    /// canonical JSON은 맵 삽입 순서와 무관하다.
    #[test]
    fn prop_canonical_json_ignores_insertion_order(
        entries in prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 1..12)
            .prop_flat_map(|map| {
                let pairs: Vec<(String, i64)> = map.into_iter().collect();
                (Just(pairs.clone()), Just(pairs).prop_shuffle())
            })
    ) {
        let (sorted, shuffled) = entries;
        let build = |pairs: &[(String, i64)]| {
            let mut map = Map::new();
            for (k, v) in pairs {
                map.insert(k.clone(), Value::from(*v));
            }
            Value::Object(map)
        };

        prop_assert_eq!(
            canonical_json(&build(&sorted)).unwrap(),
            canonical_json(&build(&shuffled)).unwrap()
        );
    }

    /// 다른 설정은 다른 키를 가진다.
    #[test]
    fn prop_fingerprint_distinguishes_settings(a in arb_document(), b in arb_settings()) {
        prop_assume!(a.settings != b);
        let mut other = a.clone();
        other.settings = b;

        prop_assert_ne!(
            generation_cache_key(&a.user_id, &a).unwrap(),
            generation_cache_key(&other.user_id, &other).unwrap()
        );
    }
}

//! 사용자 선호도 문서.
//!
//! 사용자별 차트/지표/기간 등 화면 구성 설정을 표현합니다.
//! 열거형 필드는 wire 문자열과 1:1로 대응하며, 알 수 없는 값은 역직렬화 단계에서 거부됩니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 요청에 user_id가 없을 때 사용하는 사용자 식별자.
pub const DEFAULT_USER_ID: &str = "default_user";

/// 열거형 필드 파싱 실패.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field} value: {value}")]
pub struct InvalidPreferenceValue {
    pub field: &'static str,
    pub value: String,
}

/// wire 문자열과 대응하는 선호도 열거형을 정의합니다.
macro_rules! preference_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// 허용되는 모든 값.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// wire 문자열 표현.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = InvalidPreferenceValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(InvalidPreferenceValue {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

preference_enum! {
    /// 차트 종류.
    ChartType, "chart_type" {
        Bar => "bar",
        Line => "line",
        Pie => "pie",
    }
}

preference_enum! {
    /// 재무 지표.
    FinanceMetric, "finance_metric" {
        Revenue => "revenue",
        Expenses => "expenses",
        Growth => "growth",
    }
}

preference_enum! {
    /// 조회 기간.
    #[derive(Default)]
    TimeRange, "time_range" {
        OneMonth => "1M",
        #[default]
        ThreeMonths => "3M",
        SixMonths => "6M",
        OneYear => "1Y",
        FiveYears => "5Y",
    }
}

preference_enum! {
    /// 표시 통화.
    #[derive(Default)]
    Currency, "currency" {
        #[default]
        Usd => "USD",
        Eur => "EUR",
        Gbp => "GBP",
        Inr => "INR",
    }
}

preference_enum! {
    /// 집계 단위.
    #[derive(Default)]
    Granularity, "granularity" {
        Daily => "daily",
        Weekly => "weekly",
        #[default]
        Monthly => "monthly",
    }
}

preference_enum! {
    /// UI 테마.
    #[derive(Default)]
    Theme, "theme" {
        #[default]
        Light => "light",
        Dark => "dark",
    }
}

/// 기본값이 모두 채워진 선호도 설정.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct PreferenceSettings {
    pub chart_type: ChartType,
    pub finance_metric: FinanceMetric,
    pub time_range: TimeRange,
    pub currency: Currency,
    pub granularity: Granularity,
    pub theme: Theme,
    pub show_news: bool,
}

impl PreferenceSettings {
    /// 필수 필드만 지정하고 나머지는 기본값으로 채웁니다.
    pub fn new(chart_type: ChartType, finance_metric: FinanceMetric) -> Self {
        Self {
            chart_type,
            finance_metric,
            time_range: TimeRange::default(),
            currency: Currency::default(),
            granularity: Granularity::default(),
            theme: Theme::default(),
            show_news: false,
        }
    }
}

/// 저장된 선호도 문서.
///
/// 사용자당 하나만 존재하며 저장 요청마다 `updated_at`이 갱신됩니다.
/// `created_at`은 최초 삽입 시에만 설정됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct PreferenceDocument {
    pub user_id: String,
    #[serde(flatten)]
    pub settings: PreferenceSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 선호도 저장 요청.
///
/// `chart_type`과 `finance_metric`만 필수이며, 생략된 필드는
/// 3M / USD / monthly / light / false 기본값으로 저장됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct PreferencesInput {
    #[serde(default)]
    pub user_id: Option<String>,
    pub chart_type: ChartType,
    pub finance_metric: FinanceMetric,
    #[serde(default)]
    pub time_range: Option<TimeRange>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub granularity: Option<Granularity>,
    #[serde(default)]
    pub theme: Option<Theme>,
    #[serde(default)]
    pub show_news: Option<bool>,
}

impl PreferencesInput {
    /// 사용자 식별자와 기본값이 채워진 설정으로 분해합니다.
    pub fn resolve(self) -> (String, PreferenceSettings) {
        let user_id = resolve_user_id(self.user_id.as_deref());
        let settings = PreferenceSettings {
            chart_type: self.chart_type,
            finance_metric: self.finance_metric,
            time_range: self.time_range.unwrap_or_default(),
            currency: self.currency.unwrap_or_default(),
            granularity: self.granularity.unwrap_or_default(),
            theme: self.theme.unwrap_or_default(),
            show_news: self.show_news.unwrap_or(false),
        };
        (user_id, settings)
    }
}

/// 비어 있거나 누락된 user_id를 기본 사용자로 대체합니다.
pub fn resolve_user_id(user_id: Option<&str>) -> String {
    match user_id.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => DEFAULT_USER_ID.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_substituted_on_resolve() {
        let input: PreferencesInput = serde_json::from_value(json!({
            "chart_type": "line",
            "finance_metric": "growth"
        }))
        .unwrap();

        let (user_id, settings) = input.resolve();
        assert_eq!(user_id, DEFAULT_USER_ID);
        assert_eq!(settings.time_range, TimeRange::ThreeMonths);
        assert_eq!(settings.currency, Currency::Usd);
        assert_eq!(settings.granularity, Granularity::Monthly);
        assert_eq!(settings.theme, Theme::Light);
        assert!(!settings.show_news);
    }

    #[test]
    fn test_unknown_enum_value_rejected() {
        let result: Result<PreferencesInput, _> = serde_json::from_value(json!({
            "chart_type": "radar",
            "finance_metric": "revenue"
        }));
        assert!(result.is_err());

        let result: Result<PreferencesInput, _> = serde_json::from_value(json!({
            "chart_type": "bar",
            "finance_metric": "revenue",
            "time_range": "2Y"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_wire_strings() {
        assert_eq!(serde_json::to_value(TimeRange::OneYear).unwrap(), json!("1Y"));
        assert_eq!(serde_json::to_value(Currency::Inr).unwrap(), json!("INR"));
        assert_eq!("5Y".parse::<TimeRange>().unwrap(), TimeRange::FiveYears);
        assert_eq!(
            "usd".parse::<Currency>().unwrap_err().to_string(),
            "invalid currency value: usd"
        );
        for metric in FinanceMetric::ALL {
            assert_eq!(metric.as_str().parse::<FinanceMetric>().unwrap(), *metric);
        }
    }

    #[test]
    fn test_document_serializes_flat() {
        let now = Utc::now();
        let doc = PreferenceDocument {
            user_id: "alice".to_string(),
            settings: PreferenceSettings::new(ChartType::Pie, FinanceMetric::Expenses),
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["chart_type"], "pie");
        assert_eq!(value["time_range"], "3M");
        assert_eq!(value["user_id"], "alice");

        let parsed: PreferenceDocument = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_blank_user_id_uses_default() {
        assert_eq!(resolve_user_id(Some("  ")), DEFAULT_USER_ID);
        assert_eq!(resolve_user_id(None), DEFAULT_USER_ID);
        assert_eq!(resolve_user_id(Some("bob")), "bob");
    }
}

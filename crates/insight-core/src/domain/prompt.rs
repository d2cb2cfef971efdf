//! 프롬프트 빌더.
//!
//! 선호도 문서와 compose 요청을 LLM 지시문으로 변환하는 순수 함수들입니다.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::PreferenceSettings;

/// 선호도 기반 인사이트 프롬프트를 생성합니다.
///
/// 모든 필드에 값이 있으므로 실패하지 않습니다.
pub fn build_prompt(prefs: &PreferenceSettings) -> String {
    let mut prompt = format!(
        "Generate a concise finance insight for the metric '{metric}'. \
         Use a time range of {range} with {granularity} granularity. \
         Assume currency {currency}. \
         If helpful, suggest how to visualize it using a {chart} chart. \
         Respond in a brand-appropriate, clear tone.",
        metric = prefs.finance_metric,
        range = prefs.time_range,
        granularity = prefs.granularity,
        currency = prefs.currency,
        chart = prefs.chart_type,
    );

    if prefs.show_news {
        prompt.push_str(" Include 1-2 brief related news headlines as bullet points if relevant.");
    }

    prompt
}

// =============================================================================
// Compose
// =============================================================================

const FORMAL_TONE: &str = "Use a professional and concise tone.";
const INFORMAL_TONE: &str = "Use a friendly and conversational tone.";
const SHORT_LENGTH: &str = "Keep the response brief (3-5 sentences).";
const LONG_LENGTH: &str = "Provide a detailed response (6-12 sentences).";

/// compose 요청의 시스템 프롬프트.
///
/// 알 수 없는 tone은 formal로, 알 수 없는 length는 short로 처리합니다.
pub fn build_compose_system_prompt(tone: &str, length: &str, include_charts: bool) -> String {
    let tone_instr = match tone.to_lowercase().as_str() {
        "informal" => INFORMAL_TONE,
        _ => FORMAL_TONE,
    };
    let length_instr = match length.to_lowercase().as_str() {
        "long" => LONG_LENGTH,
        _ => SHORT_LENGTH,
    };
    let chart_instr = if include_charts {
        "Also summarize up to 5 key categories with numeric values appropriate for a simple chart. \
         At the very end of the message, output a single line starting with CHART_JSON= followed by a JSON array \n\
         like [{\"label\":\"Category\",\"value\":12}], or null if no chart is needed."
    } else {
        "At the very end of the message, output a single line: CHART_JSON=null"
    };

    format!(
        "You are an assistant for a website that customizes responses based on user preferences.\n\
         {tone_instr}\n\
         {length_instr}\n\
         {chart_instr}\n\
         Do not wrap the CHART_JSON line in code fences."
    )
}

/// 차트 데이터 포인트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

static CHART_JSON_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CHART_JSON\s*=\s*(.+)").expect("Invalid regex pattern"));

/// 응답 텍스트에서 `CHART_JSON=...` 줄을 분리합니다.
///
/// 줄은 본문에서 제거되며, 페이로드가 `null`이거나 파싱할 수 없으면 차트 데이터는 `None`입니다.
pub fn extract_chart_json(text: &str) -> (String, Option<Vec<ChartPoint>>) {
    let trimmed = text.trim();
    let Some(caps) = CHART_JSON_LINE.captures(trimmed) else {
        return (trimmed.to_string(), None);
    };

    let line = &caps[0];
    let payload = caps[1].trim();
    let main_text = text.replace(line, "").trim().to_string();

    if payload.eq_ignore_ascii_case("null") {
        return (main_text, None);
    }

    let chart = serde_json::from_str::<Vec<ChartPoint>>(payload).ok();
    (main_text, chart)
}

//! 관련 뉴스 endpoint.
//!
//! 명시적 `q`가 없으면 저장된 선호도의 지표로 검색어를 만듭니다.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use insight_core::{resolve_user_id, ServiceError};
use insight_provider::{clamp_max_results, NewsItem};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use utoipa::{IntoParams, ToSchema};

use crate::error::{into_api_error, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 선호도를 읽을 수 없을 때의 검색어.
pub const DEFAULT_NEWS_QUERY: &str = "latest finance news";

/// 뉴스 검색 쿼리.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct NewsQuery {
    pub user_id: Option<String>,
    /// 검색어 (생략 시 선호도에서 유도)
    pub q: Option<String>,
    /// 결과 수 (기본 5, 1..=10으로 제한)
    pub max_results: Option<i64>,
}

/// 뉴스 검색 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewsResponse {
    pub user_id: String,
    pub query: String,
    #[schema(value_type = Vec<Object>)]
    pub news: Vec<NewsItem>,
}

/// 관련 뉴스 조회.
#[utoipa::path(
    get,
    path = "/api/news",
    params(NewsQuery),
    responses(
        (status = 200, description = "검색 성공", body = NewsResponse),
        (status = 500, description = "검색 키 미설정", body = ApiErrorResponse),
        (status = 502, description = "검색 API 실패", body = ApiErrorResponse)
    ),
    tag = "news"
)]
pub async fn related_news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsQuery>,
) -> ApiResult<Json<NewsResponse>> {
    let news = state.news.clone().ok_or_else(|| {
        into_api_error(ServiceError::NotConfigured(
            "Tavily API key not configured".to_string(),
        ))
    })?;

    let user_id = resolve_user_id(query.user_id.as_deref());
    let search_query = match query.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => derive_query(&state, &user_id).await,
    };
    let max_results = clamp_max_results(query.max_results);

    debug!(query = %search_query, max_results, "Searching news");

    let items = news
        .search(&search_query, max_results)
        .await
        .map_err(|e| into_api_error(ServiceError::Upstream(format!("News provider error: {}", e))))?;

    Ok(Json(NewsResponse {
        user_id,
        query: search_query,
        news: items,
    }))
}

/// 저장된 선호도의 지표로 검색어를 만듭니다. 어떤 실패든 기본 검색어로 대체합니다.
async fn derive_query(state: &AppState, user_id: &str) -> String {
    let Some(store) = &state.preferences else {
        return DEFAULT_NEWS_QUERY.to_string();
    };

    match store.get(user_id).await {
        Ok(Some(prefs)) => format!("{} about {}", DEFAULT_NEWS_QUERY, prefs.settings.finance_metric),
        Ok(None) => DEFAULT_NEWS_QUERY.to_string(),
        Err(e) => {
            warn!(error = %e, "Preference lookup for news query failed");
            DEFAULT_NEWS_QUERY.to_string()
        }
    }
}

pub fn news_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/news", get(related_news))
}
